//! 此模块实现了与 Hatchet 元数据 API 的交互。
//! API 文档见 <https://api.hatchet.is/apidocs/>

use std::{sync::Arc, time::Duration};

use serde::de::DeserializeOwned;
use tracing::trace;

use crate::{
    config::HatchetConfig,
    error::Result,
    hatchet::{
        query::{Params, QueryBuilder},
        transport::{ReqwestTransport, Transport},
    },
    model::request::RequestKind,
};

pub mod convert;
pub mod models;
pub mod query;
pub mod stitcher;
pub mod transport;

pub(crate) const BASE_URL_HATCHET: &str = "https://api.hatchet.is";
pub(crate) const HATCHET_VERSION: &str = "v1";

pub(crate) const HATCHET_ARTISTS: &str = "artists";
pub(crate) const HATCHET_ARTISTS_TOPHITS: &str = "topHits";
pub(crate) const HATCHET_ALBUMS: &str = "albums";
pub(crate) const HATCHET_TRACKS: &str = "tracks";
pub(crate) const HATCHET_USERS: &str = "users";
pub(crate) const HATCHET_PLAYLISTS: &str = "playlists";
pub(crate) const HATCHET_PLAYLISTS_ENTRIES: &str = "entries";
pub(crate) const HATCHET_SEARCHES: &str = "searches";

/// 按名称查询时使用的参数名。
pub const PARAM_NAME: &str = "name";
/// 嵌入路径的实体 ID 参数名。
pub const PARAM_ID: &str = "id";
/// 按 ID 批量查询时使用的数组参数名。
pub const PARAM_IDARRAY: &str = "ids[]";
/// 按艺术家名过滤时使用的参数名。
pub const PARAM_ARTIST_NAME: &str = "artist_name";
/// 搜索关键词参数名。
pub const PARAM_TERM: &str = "term";

/// Hatchet API 客户端：负责构建查询、发出请求并解码 JSON。
#[derive(Clone)]
pub struct HatchetClient {
    transport: Arc<dyn Transport>,
    query_builder: QueryBuilder,
}

impl HatchetClient {
    /// 根据配置创建一个使用 `reqwest` 传输层的客户端。
    pub fn new(config: &HatchetConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(Duration::from_secs(config.request_timeout_secs))?;
        Ok(Self::with_transport(Arc::new(transport), config))
    }

    /// 使用自定义传输层创建客户端。
    pub fn with_transport(transport: Arc<dyn Transport>, config: &HatchetConfig) -> Self {
        Self {
            transport,
            query_builder: QueryBuilder::new(&config.base_url, &config.api_version),
        }
    }

    /// 客户端使用的查询构建器。
    pub fn query_builder(&self) -> &QueryBuilder {
        &self.query_builder
    }

    /// 底层传输层。
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// 为给定类型构建查询、发出 GET 请求，并将响应解码为 `R`。
    pub async fn fetch<R: DeserializeOwned>(&self, kind: RequestKind, params: &Params) -> Result<R> {
        let url = self.query_builder.build(kind, params)?;
        let response_text = self.transport.get(&url).await?;

        trace!(
            url = %url,
            response.body = %response_text,
            "原始 JSON 响应"
        );

        Ok(serde_json::from_str(&response_text)?)
    }
}

impl std::fmt::Debug for HatchetClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HatchetClient")
            .field("query_builder", &self.query_builder)
            .finish_non_exhaustive()
    }
}
