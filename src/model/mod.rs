//! 数据模型
//!
//! `generic` 是展示层使用的通用模型，`request` 定义了请求、结果与补全目标。

pub mod generic;
pub mod request;
