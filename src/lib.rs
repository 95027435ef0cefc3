#![warn(missing_docs)]

//! # Hatchet Info RS
//!
//! 一个用于从 Hatchet 元数据服务获取艺术家、专辑、歌曲、歌单与搜索结果的 Rust 库。
//!
//! ## 主要功能
//!
//! - **查询构建**: 把请求类型和参数映射为 Hatchet API 的 URL，参数顺序与重复键都会保留。
//! - **响应拼接**: Hatchet 的响应由若干并列数组组成，数组之间只通过 ID 互相引用。
//!   本库会发出必要的后续请求，并按 ID 把这些数组拼接为完整的结果。
//! - **用户身份**: 需要用户身份的请求会自动解析当前用户的 ID，并在进程内缓存。
//! - **请求调度**: 一批请求在后台任务中处理，完成后通过通道报告；可以为请求登记补全目标，
//!   让结果直接写入调用方持有的 `Artist` 或 `Album`。
//!
//! ## 示例
//!
//! ```rust,no_run
//! use std::sync::{Arc, RwLock};
//!
//! use hatchet_info_rs::{
//!     FileCredentialStore, FillTarget, InfoRequest, Params, RequestDispatcher, RequestKind,
//!     config::load_config, model::generic::Artist,
//! };
//!
//! async {
//!     let config = load_config().unwrap();
//!     let store = Arc::new(FileCredentialStore::open_default().unwrap());
//!     let (dispatcher, mut reports) = RequestDispatcher::from_config(&config, store).unwrap();
//!
//!     let artist = Arc::new(RwLock::new(Artist::default()));
//!     let request = InfoRequest::new(
//!         RequestKind::ArtistsTopHits,
//!         Params::new().with("name", "Sigur Rós"),
//!     );
//!     dispatcher.submit_with_target(request, FillTarget::Artist(Arc::downgrade(&artist)));
//!
//!     if let Some(report) = reports.recv().await {
//!         println!("完成了 {} 个请求。", report.done.len());
//!         println!("热门歌曲共 {} 首。", artist.read().unwrap().top_hits.len());
//!     }
//! };
//! ```
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod hatchet;
pub mod identity;
pub mod model;
pub mod utils;

pub use crate::{
    dispatcher::{BatchReport, RequestDispatcher},
    error::{HatchetError, Result},
    hatchet::{HatchetClient, query::Params, stitcher::ResponseStitcher},
    identity::{
        Account, CredentialStore, FileCredentialStore, MemoryCredentialStore, UserIdentityResolver,
    },
    model::request::{FillTarget, InfoRequest, InfoResult, RequestId, RequestKind, RequestState},
};
