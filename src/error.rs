//! 定义了整个 `hatchet-info` 库的错误类型 `HatchetError`。

use std::io;
use thiserror::Error;

use crate::model::request::RequestKind;

/// `hatchet-info` 库的通用错误枚举。
#[derive(Error, Debug)]
pub enum HatchetError {
    /// 无法识别的请求类型，或该类型没有对应的 API 端点
    #[error("无效的请求类型: '{0}'")]
    InvalidRequestKind(String),

    /// 参数无法被编码进查询字符串
    #[error("参数编码失败: {0}")]
    Encoding(String),

    /// 缺少构建查询所必需的参数
    #[error("缺少必需的参数: '{0}'")]
    MissingParameter(&'static str),

    /// 该请求需要用户身份，但当前无法解析出用户 ID
    #[error("请求类型 {0} 需要用户身份，但未能解析出用户 ID")]
    MissingUserScope(RequestKind),

    /// 网络请求失败 (源自 `reqwest::Error`)
    #[error("网络请求失败: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// 更通用的上游错误，供非 reqwest 的传输层使用
    #[error("上游请求失败: {0}")]
    Upstream(String),

    /// JSON 解析失败 (源自 `serde_json::Error`)
    #[error("JSON 解析失败: {0}")]
    Decode(#[from] serde_json::Error),

    /// I/O 错误 (源自 `io::Error`)
    #[error("I/O 错误: {0}")]
    Io(#[from] io::Error),

    /// 账户凭据存储读写失败
    #[error("凭据存储错误: {0}")]
    CredentialStore(String),
}

impl HatchetError {
    /// 是否为传输层（连接、TLS、上游）错误。
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Reqwest(_) | Self::Upstream(_))
    }
}

/// `HatchetError` 的 `Result` 类型别名，方便在函数签名中使用。
pub type Result<T> = std::result::Result<T, HatchetError>;
