//! 定义了信息请求及其结果的数据结构。
//!
//! 一个 `InfoRequest` 由调用方创建，交给调度器处理后连同结果一起在 `BatchReport` 中交还。

use std::{
    collections::HashMap,
    fmt,
    str::FromStr,
    sync::{RwLock, Weak},
};

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::{
    error::{HatchetError, Result},
    hatchet::{
        PARAM_ID,
        models::{
            AlbumInfo, ArtistInfo, Artists, ChartItem, Image, PlaylistEntries, PlaylistInfo,
            Playlists, TrackInfo, Tracks, Users,
        },
        query::Params,
    },
    model::generic::{Album, Artist},
};

/// Hatchet API 支持的请求类型。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    /// 按用户名查找用户。
    Users,
    /// 某个用户的歌单列表。
    UsersPlaylists,
    /// 某个歌单的条目。
    PlaylistsEntries,
    /// 当前用户的全部歌单及其条目（组合请求）。
    UsersPlaylistsAll,
    /// 按名称查找艺术家。
    Artists,
    /// 艺术家的全部专辑及专辑歌曲（组合请求）。
    ArtistsAlbums,
    /// 艺术家的热门歌曲榜（组合请求）。
    ArtistsTopHits,
    /// 按名称查找专辑及其歌曲。
    Albums,
    /// 按 ID 批量获取歌曲。
    Tracks,
    /// 全文搜索专辑和艺术家。
    Searches,
}

impl RequestKind {
    /// 从名称解析请求类型，无法识别时返回 `InvalidRequestKind`。
    pub fn parse(name: &str) -> Result<Self> {
        Self::from_str(name).map_err(|_| HatchetError::InvalidRequestKind(name.to_string()))
    }

    /// 该类型的请求在给定参数下是否需要当前用户的 ID。
    pub fn needs_user_scope(&self, params: &Params) -> bool {
        match self {
            Self::UsersPlaylistsAll => true,
            Self::UsersPlaylists => params.first(PARAM_ID).is_none(),
            _ => false,
        }
    }
}

/// 请求的唯一标识。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(String);

impl RequestId {
    /// 生成一个新的随机 ID。
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// 以字符串形式返回 ID。
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 请求在调度过程中的状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestState {
    /// 已提交，尚未处理。
    #[default]
    Pending,
    /// 正在解析用户身份。
    ResolvingIdentity,
    /// 正在请求并拼接数据。
    Fetching,
    /// 拼接完成，结果已写入。
    Stitched,
    /// 处理失败，不会有结果。
    Failed,
    /// 已向调用方报告。
    Reported,
}

/// 艺术家专辑组合请求的结果。
#[derive(Debug, Clone, Default)]
pub struct ArtistAlbums {
    /// 第一个匹配到的艺术家。
    pub artist: Option<ArtistInfo>,
    /// 艺术家的专辑，保持响应中的顺序。
    pub albums: Vec<AlbumInfo>,
    /// 专辑 → 封面（第一张引用的图片）。
    pub images: HashMap<AlbumInfo, Image>,
    /// 专辑 → 该专辑的歌曲。
    pub tracks: HashMap<AlbumInfo, Tracks>,
}

/// 艺术家热门歌曲组合请求的结果。
#[derive(Debug, Clone, Default)]
pub struct TopHits {
    /// 第一个匹配到的艺术家。
    pub artist: Option<ArtistInfo>,
    /// 按排名排列的榜单条目及其歌曲；引用了未知歌曲的条目对应 `None`。
    /// 条目按 ID 去重，每个 ID 只出现一次。
    pub entries: Vec<(ChartItem, Option<TrackInfo>)>,
}

/// 专辑请求的结果。
#[derive(Debug, Clone, Default)]
pub struct AlbumDetails {
    /// 第一个匹配到的专辑。
    pub album: Option<AlbumInfo>,
    /// 专辑艺术家。
    pub artist: Option<ArtistInfo>,
    /// 专辑 → 封面。
    pub images: HashMap<AlbumInfo, Image>,
    /// 专辑 → 该专辑的歌曲。
    pub tracks: HashMap<AlbumInfo, Tracks>,
}

/// 搜索请求转换后的结果。
#[derive(Debug, Clone, Default)]
pub struct SearchResults {
    /// 分数达标的专辑，保持搜索结果中的顺序。
    pub albums: Vec<Album>,
    /// 分数达标的艺术家，保持搜索结果中的顺序。
    pub artists: Vec<Artist>,
}

/// 请求的结果，每种请求类型对应一个变体。
#[derive(Debug, Clone)]
pub enum InfoResult {
    /// 用户列表。
    Users(Users),
    /// 歌单列表。
    Playlists(Playlists),
    /// 单个歌单的条目。
    PlaylistEntries(PlaylistEntries),
    /// 全部歌单 → 各自的条目。
    AllPlaylists(HashMap<PlaylistInfo, PlaylistEntries>),
    /// 原始的艺术家响应。
    Artists(Artists),
    /// 艺术家专辑。
    ArtistAlbums(ArtistAlbums),
    /// 艺术家热门歌曲。
    ArtistTopHits(TopHits),
    /// 专辑详情。
    Album(AlbumDetails),
    /// 原始的歌曲响应。
    Tracks(Tracks),
    /// 搜索结果。
    Search(SearchResults),
}

/// 一个信息请求。
#[derive(Debug)]
pub struct InfoRequest {
    id: RequestId,
    kind: RequestKind,
    params: Params,
    pub(crate) result: Option<InfoResult>,
    pub(crate) error: Option<HatchetError>,
    pub(crate) state: RequestState,
}

impl InfoRequest {
    /// 创建一个新的请求，并为其分配唯一 ID。
    pub fn new(kind: RequestKind, params: Params) -> Self {
        Self {
            id: RequestId::new(),
            kind,
            params,
            result: None,
            error: None,
            state: RequestState::Pending,
        }
    }

    /// 请求 ID。
    pub fn id(&self) -> &RequestId {
        &self.id
    }

    /// 请求类型。
    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    /// 请求参数。
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// 拼接得到的结果，失败或尚未处理时为 `None`。
    pub fn result(&self) -> Option<&InfoResult> {
        self.result.as_ref()
    }

    /// 取出结果。
    pub fn take_result(&mut self) -> Option<InfoResult> {
        self.result.take()
    }

    /// 当前状态。
    pub fn state(&self) -> RequestState {
        self.state
    }

    /// 失败时的错误。
    pub fn error(&self) -> Option<&HatchetError> {
        self.error.as_ref()
    }

    /// 是否已成功拿到结果。
    pub fn succeeded(&self) -> bool {
        self.result.is_some()
    }
}

/// 等待被补全的调用方对象。
///
/// 调度器只持有弱引用；调用方丢弃对象后，补全会被静默跳过。
#[derive(Debug, Clone)]
pub enum FillTarget {
    /// 一位艺术家。
    Artist(Weak<RwLock<Artist>>),
    /// 一张专辑。
    Album(Weak<RwLock<Album>>),
}
