//! 定义了面向展示层的通用数据模型。
//!
//! 这些结构体（如 `Artist`, `Album`, `Track`）是 Hatchet 的扁平 JSON 响应在拼接后
//! 需要转换成的目标格式，同时也是调用方交给调度器进行异步补全的对象。

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::{cache_key, duration_to_string};

/// 代表一张图片的通用模型。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// 图片的地址，可以是 URL 或本地路径。
    pub path: String,
    /// 原始宽度（像素）。
    pub width: u32,
    /// 原始高度（像素）。
    pub height: u32,
    /// 是否来自 Hatchet，只有 Hatchet 图片支持按宽度缩放。
    pub is_hatchet_image: bool,
}

impl Image {
    /// 用于图片缓存的键。
    pub fn cache_key(&self) -> String {
        cache_key(&[&self.path])
    }
}

/// 代表一首歌曲的通用模型。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// 歌曲名。
    pub name: String,
    /// 演唱者姓名。
    pub artist_name: Option<String>,
    /// 所属专辑名。
    pub album_name: Option<String>,
    /// 歌曲时长。
    pub duration: Option<Duration>,
}

impl Track {
    /// 形如 `mm:ss` 的时长文本。
    pub fn duration_string(&self) -> Option<String> {
        self.duration.map(duration_to_string)
    }

    /// 用于缓存的键。
    pub fn cache_key(&self) -> String {
        cache_key(&[
            &self.name,
            self.album_name.as_deref().unwrap_or_default(),
            self.artist_name.as_deref().unwrap_or_default(),
        ])
    }
}

/// 代表一张专辑的通用模型。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Album {
    /// 专辑名。
    pub name: String,
    /// 专辑艺术家姓名。
    pub artist_name: Option<String>,
    /// 专辑封面。
    pub image: Option<Image>,
    /// 发行日期。
    pub release_date: Option<DateTime<Utc>>,
    /// 专辑包含的歌曲。
    pub tracks: Vec<Track>,
}

impl Album {
    /// 用于缓存的键。
    pub fn cache_key(&self) -> String {
        cache_key(&[&self.name, self.artist_name.as_deref().unwrap_or_default()])
    }
}

/// 代表一位艺术家的通用模型。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    /// 艺术家姓名。
    pub name: String,
    /// 艺术家图片。
    pub image: Option<Image>,
    /// 艺术家的专辑列表。
    pub albums: Vec<Album>,
    /// 按排名排列的热门歌曲。
    pub top_hits: Vec<Track>,
}

impl Artist {
    /// 用于缓存的键。
    pub fn cache_key(&self) -> String {
        cache_key(&[&self.name])
    }
}
