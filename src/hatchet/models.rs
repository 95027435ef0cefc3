//! 此模块定义了所有用于反序列化 Hatchet API 响应的 `struct` 数据结构。
//! API 文档见 <https://api.hatchet.is/apidocs/>
//!
//! Hatchet 的响应是扁平的：一个 JSON 对象的顶层字段是若干并列的数组，
//! 数组元素之间只通过 ID 互相引用（例如 `album.images[0]` 指向同一响应中 `images` 数组的某一项）。
//! 所有数组都带有 `#[serde(default)]`，缺失的字段与空数组等价。

use std::{
    collections::HashMap,
    hash::{Hash, Hasher},
};

use serde::{Deserialize, Serialize};

/// 为实体实现基于 `id` 的相等性与哈希，使同一次拼接中 ID 相同的实体被视为同一个。
macro_rules! impl_identity_by_id {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl PartialEq for $ty {
                fn eq(&self, other: &Self) -> bool {
                    self.id == other.id
                }
            }

            impl Eq for $ty {}

            impl Hash for $ty {
                fn hash<H: Hasher>(&self, state: &mut H) {
                    self.id.hash(state);
                }
            }
        )+
    };
}

/// 按 ID 为一组实体建立索引。
pub fn index_by_id<T, F>(items: &[T], id: F) -> HashMap<&str, &T>
where
    F: Fn(&T) -> &str,
{
    items.iter().map(|item| (id(item), item)).collect()
}

// =================================================================
// 实体
// =================================================================

/// 一张图片。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Image {
    /// 图片 ID。
    pub id: String,
    /// 图片 URL。
    #[serde(default)]
    pub url: String,
    /// 宽度（像素）。
    #[serde(default)]
    pub width: u32,
    /// 高度（像素）。
    #[serde(default)]
    pub height: u32,
}

/// 艺术家信息。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtistInfo {
    /// 艺术家 ID。
    pub id: String,
    /// 艺术家姓名。
    #[serde(default)]
    pub name: String,
    /// 引用的图片 ID 列表。
    #[serde(default)]
    pub images: Vec<String>,
}

/// 专辑信息。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumInfo {
    /// 专辑 ID。
    pub id: String,
    /// 专辑名。
    #[serde(default)]
    pub name: String,
    /// 专辑艺术家的 ID。
    pub artist: Option<String>,
    /// 引用的图片 ID 列表。
    #[serde(default)]
    pub images: Vec<String>,
    /// 引用的歌曲 ID 列表。
    #[serde(default)]
    pub tracks: Vec<String>,
    /// 发行日期，格式为 `yyyy-MM-ddTHH:mm:ssZ`。
    pub release_date: Option<String>,
}

/// 歌曲信息。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackInfo {
    /// 歌曲 ID。
    pub id: String,
    /// 歌曲名。
    #[serde(default)]
    pub name: String,
    /// 艺术家 ID。
    pub artist: Option<String>,
    /// 时长（秒）。
    pub duration: Option<u64>,
}

/// 排行榜中的一项，引用一首歌曲。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChartItem {
    /// 条目 ID。
    pub id: String,
    /// 引用的歌曲 ID。
    pub track: Option<String>,
    /// 排名。
    pub rank: Option<u32>,
}

/// 歌单信息。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistInfo {
    /// 歌单 ID。
    pub id: String,
    /// 歌单标题。
    #[serde(default)]
    pub title: String,
    /// 所属用户 ID。
    pub user: Option<String>,
    /// 创建时间。
    pub created: Option<String>,
    /// 当前修订版本。
    pub current_revision: Option<String>,
}

/// 歌单中的一个条目。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaylistEntry {
    /// 条目 ID。
    pub id: String,
    /// 引用的歌曲 ID。
    pub track: Option<String>,
    /// 所属歌单 ID。
    pub playlist: Option<String>,
    /// 创建时间。
    pub created: Option<String>,
}

/// 用户信息。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserInfo {
    /// 用户 ID。
    pub id: String,
    /// 用户名。
    #[serde(default)]
    pub username: String,
    /// 显示名。
    pub name: Option<String>,
}

/// 搜索结果条目指向的实体类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchItemType {
    /// 专辑
    Album,
    /// 艺术家
    Artist,
    /// 其他暂不处理的类型
    #[default]
    #[serde(other)]
    Other,
}

/// 一条搜索结果，通过 ID 引用同一响应中的专辑或艺术家。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchItem {
    /// 匹配分数。
    #[serde(default)]
    pub score: f64,
    /// 指向的实体类型。
    #[serde(rename = "type", default)]
    pub item_type: SearchItemType,
    /// 当类型为专辑时，专辑的 ID。
    pub album: Option<String>,
    /// 当类型为艺术家时，艺术家的 ID。
    pub artist: Option<String>,
}

impl_identity_by_id!(
    Image,
    ArtistInfo,
    AlbumInfo,
    TrackInfo,
    ChartItem,
    PlaylistInfo,
    PlaylistEntry,
    UserInfo,
);

// =================================================================
// 响应信封
// =================================================================

/// `/users/` 接口的响应。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Users {
    /// 用户列表。
    #[serde(default)]
    pub users: Vec<UserInfo>,
}

/// `/users/{id}/playlists` 接口的响应。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Playlists {
    /// 歌单列表。
    #[serde(default)]
    pub playlists: Vec<PlaylistInfo>,
}

/// `/playlists/{id}/entries` 接口的响应。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistEntries {
    /// 歌单条目。
    #[serde(default)]
    pub playlist_entries: Vec<PlaylistEntry>,
    /// 条目引用的歌曲。
    #[serde(default)]
    pub tracks: Vec<TrackInfo>,
    /// 歌曲引用的艺术家。
    #[serde(default)]
    pub artists: Vec<ArtistInfo>,
}

/// `/artists/` 接口的响应。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Artists {
    /// 艺术家列表。
    #[serde(default)]
    pub artists: Vec<ArtistInfo>,
    /// 艺术家引用的图片。
    #[serde(default)]
    pub images: Vec<Image>,
}

/// `/albums/` 接口的响应。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Albums {
    /// 专辑列表。
    #[serde(default)]
    pub albums: Vec<AlbumInfo>,
    /// 专辑引用的图片。
    #[serde(default)]
    pub images: Vec<Image>,
    /// 专辑引用的艺术家。
    #[serde(default)]
    pub artists: Vec<ArtistInfo>,
}

/// `/tracks/` 接口的响应。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tracks {
    /// 歌曲列表。
    #[serde(default)]
    pub tracks: Vec<TrackInfo>,
    /// 歌曲引用的艺术家。
    #[serde(default)]
    pub artists: Vec<ArtistInfo>,
}

/// 艺术家专辑与热门歌曲两个“榜单”接口共用的响应。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Charts {
    /// 专辑列表。
    #[serde(default)]
    pub albums: Vec<AlbumInfo>,
    /// 引用的图片。
    #[serde(default)]
    pub images: Vec<Image>,
    /// 引用的歌曲。
    #[serde(default)]
    pub tracks: Vec<TrackInfo>,
    /// 引用的艺术家。
    #[serde(default)]
    pub artists: Vec<ArtistInfo>,
    /// 榜单条目，按排名顺序排列。
    #[serde(default)]
    pub chart_items: Vec<ChartItem>,
}

/// `/searches/` 接口的响应。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Search {
    /// 搜索结果，按相关度排列。
    #[serde(default)]
    pub search_results: Vec<SearchItem>,
    /// 结果引用的专辑。
    #[serde(default)]
    pub albums: Vec<AlbumInfo>,
    /// 结果引用的艺术家。
    #[serde(default)]
    pub artists: Vec<ArtistInfo>,
    /// 专辑与艺术家引用的图片。
    #[serde(default)]
    pub images: Vec<Image>,
}
