//! 响应拼接。
//!
//! 每种请求类型对应一个操作：构建查询 → 发出请求 → 解码 JSON → 按 ID 交叉引用同级数组 → 生成结果。
//! 组合请求会发出多次依赖前一次响应的请求，任何一步失败都会让整个请求失败，不会留下部分结果。

use std::{collections::HashMap, sync::Arc, time::Instant};

use tracing::{debug, instrument};

use crate::{
    error::{HatchetError, Result},
    hatchet::{
        HatchetClient, PARAM_ID, PARAM_IDARRAY,
        convert::{album_info_to_album, artist_info_to_artist},
        models::{
            AlbumInfo, Albums, ArtistInfo, Artists, ChartItem, Charts, Image, PlaylistEntries,
            PlaylistInfo, Playlists, Search, SearchItemType, TrackInfo, Tracks, Users, index_by_id,
        },
        query::Params,
    },
    model::request::{AlbumDetails, ArtistAlbums, InfoResult, RequestKind, SearchResults, TopHits},
};

/// 默认的搜索结果最低分数（不含）。
pub const HATCHET_SEARCHITEM_MIN_SCORE: f64 = 5.0;

/// 负责执行请求并把扁平响应拼接为结果。
#[derive(Debug, Clone)]
pub struct ResponseStitcher {
    client: Arc<HatchetClient>,
    min_search_score: f64,
}

impl ResponseStitcher {
    /// 创建一个新的拼接器。
    pub fn new(client: Arc<HatchetClient>, min_search_score: f64) -> Self {
        Self {
            client,
            min_search_score,
        }
    }

    /// 拼接器使用的客户端。
    pub fn client(&self) -> &Arc<HatchetClient> {
        &self.client
    }

    /// 按请求类型分派到对应的拼接操作。
    ///
    /// # 参数
    /// * `kind` - 请求类型。
    /// * `params` - 调用方提供的参数。
    /// * `user_id` - 已解析的当前用户 ID，需要用户身份的请求缺少它时返回 `MissingUserScope`。
    #[instrument(skip(self, params, user_id))]
    pub async fn stitch(
        &self,
        kind: RequestKind,
        params: &Params,
        user_id: Option<&str>,
    ) -> Result<InfoResult> {
        let start = Instant::now();
        let result = match kind {
            RequestKind::Users => InfoResult::Users(self.client.fetch::<Users>(kind, params).await?),
            RequestKind::UsersPlaylists => {
                let params = if params.first(PARAM_ID).is_some() {
                    params.clone()
                } else {
                    let user_id = user_id.ok_or(HatchetError::MissingUserScope(kind))?;
                    params.clone().with(PARAM_ID, user_id)
                };
                InfoResult::Playlists(self.client.fetch(kind, &params).await?)
            }
            RequestKind::PlaylistsEntries => {
                InfoResult::PlaylistEntries(self.client.fetch(kind, params).await?)
            }
            RequestKind::UsersPlaylistsAll => {
                let user_id = user_id.ok_or(HatchetError::MissingUserScope(kind))?;
                InfoResult::AllPlaylists(self.fetch_all_user_playlists(user_id).await?)
            }
            RequestKind::Artists => InfoResult::Artists(self.client.fetch(kind, params).await?),
            RequestKind::ArtistsAlbums => {
                InfoResult::ArtistAlbums(self.fetch_artist_albums(params).await?)
            }
            RequestKind::ArtistsTopHits => {
                InfoResult::ArtistTopHits(self.fetch_artist_top_hits(params).await?)
            }
            RequestKind::Albums => InfoResult::Album(self.fetch_album(params).await?),
            RequestKind::Tracks => InfoResult::Tracks(self.client.fetch(kind, params).await?),
            RequestKind::Searches => InfoResult::Search(self.fetch_search(params).await?),
        };
        debug!("请求 {} 完成，耗时 {}ms", kind, start.elapsed().as_millis());
        Ok(result)
    }

    /// 获取用户的全部歌单，并为每个歌单依次获取条目。
    pub async fn fetch_all_user_playlists(
        &self,
        user_id: &str,
    ) -> Result<HashMap<PlaylistInfo, PlaylistEntries>> {
        let params = Params::new().with(PARAM_ID, user_id);
        let playlists: Playlists = self
            .client
            .fetch(RequestKind::UsersPlaylists, &params)
            .await?;

        let mut entries_map = HashMap::with_capacity(playlists.playlists.len());
        for playlist in playlists.playlists {
            let params = Params::new().with(PARAM_ID, playlist.id.as_str());
            let entries: PlaylistEntries = self
                .client
                .fetch(RequestKind::PlaylistsEntries, &params)
                .await?;
            entries_map.insert(playlist, entries);
        }
        Ok(entries_map)
    }

    /// 获取艺术家的全部专辑、专辑封面以及每张专辑的歌曲。
    pub async fn fetch_artist_albums(&self, params: &Params) -> Result<ArtistAlbums> {
        let Some(artist) = self.fetch_first_artist(params).await? else {
            return Ok(ArtistAlbums::default());
        };

        let charts: Charts = self
            .client
            .fetch(
                RequestKind::ArtistsAlbums,
                &Params::new().with(PARAM_ID, artist.id.as_str()),
            )
            .await?;

        let images = album_covers(&charts.albums, &charts.images);
        let mut tracks = HashMap::new();
        for album in charts.albums.iter().filter(|a| !a.tracks.is_empty()) {
            tracks.insert(album.clone(), self.fetch_album_tracks(album).await?);
        }

        Ok(ArtistAlbums {
            artist: Some(artist),
            albums: charts.albums,
            images,
            tracks,
        })
    }

    /// 获取艺术家的热门歌曲榜，保持榜单顺序。
    pub async fn fetch_artist_top_hits(&self, params: &Params) -> Result<TopHits> {
        let Some(artist) = self.fetch_first_artist(params).await? else {
            return Ok(TopHits::default());
        };

        let charts: Charts = self
            .client
            .fetch(
                RequestKind::ArtistsTopHits,
                &Params::new().with(PARAM_ID, artist.id.as_str()),
            )
            .await?;

        Ok(TopHits {
            artist: Some(artist),
            entries: stitch_top_hits(charts),
        })
    }

    /// 获取第一个匹配的专辑、它的封面、艺术家以及歌曲。
    pub async fn fetch_album(&self, params: &Params) -> Result<AlbumDetails> {
        let albums: Albums = self.client.fetch(RequestKind::Albums, params).await?;
        let Some(album) = albums.albums.first().cloned() else {
            return Ok(AlbumDetails::default());
        };

        let artist = album
            .artist
            .as_deref()
            .and_then(|id| albums.artists.iter().find(|a| a.id == id))
            .cloned();
        let images = album_covers(std::slice::from_ref(&album), &albums.images);
        let mut tracks = HashMap::new();
        if !album.tracks.is_empty() {
            tracks.insert(album.clone(), self.fetch_album_tracks(&album).await?);
        }

        Ok(AlbumDetails {
            album: Some(album),
            artist,
            images,
            tracks,
        })
    }

    /// 搜索专辑和艺术家，只保留分数超过阈值的结果。
    pub async fn fetch_search(&self, params: &Params) -> Result<SearchResults> {
        let search: Search = self.client.fetch(RequestKind::Searches, params).await?;
        Ok(stitch_search(&search, self.min_search_score))
    }

    async fn fetch_first_artist(&self, params: &Params) -> Result<Option<ArtistInfo>> {
        let artists: Artists = self.client.fetch(RequestKind::Artists, params).await?;
        if artists.artists.is_empty() {
            debug!("未找到匹配的艺术家。");
        }
        Ok(artists.artists.into_iter().next())
    }

    /// 用一次请求获取专辑引用的全部歌曲。
    async fn fetch_album_tracks(&self, album: &AlbumInfo) -> Result<Tracks> {
        let params: Params = album
            .tracks
            .iter()
            .map(|id| (PARAM_IDARRAY, id.as_str()))
            .collect();
        self.client.fetch(RequestKind::Tracks, &params).await
    }
}

/// 为每张引用了图片的专辑找出封面（第一张引用的图片）。
///
/// 图片 ID 在同级 `images` 数组中找不到时，该专辑没有封面。
pub fn album_covers(albums: &[AlbumInfo], images: &[Image]) -> HashMap<AlbumInfo, Image> {
    let images = index_by_id(images, |i| i.id.as_str());
    albums
        .iter()
        .filter_map(|album| {
            let image = album.images.first().and_then(|id| images.get(id.as_str()))?;
            Some((album.clone(), (*image).clone()))
        })
        .collect()
}

/// 按榜单顺序把每个条目与它引用的歌曲配对，引用了未知歌曲的条目对应 `None`。
///
/// ID 相同的条目只保留一项：位置取第一次出现处，歌曲取最后一次出现时引用的。
pub fn stitch_top_hits(charts: Charts) -> Vec<(ChartItem, Option<TrackInfo>)> {
    let tracks = index_by_id(&charts.tracks, |t| t.id.as_str());
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut entries: Vec<(ChartItem, Option<TrackInfo>)> = Vec::new();

    for item in &charts.chart_items {
        let track = item
            .track
            .as_deref()
            .and_then(|id| tracks.get(id))
            .map(|t| (*t).clone());
        match positions.get(item.id.as_str()) {
            Some(&index) => entries[index].1 = track,
            None => {
                positions.insert(item.id.as_str(), entries.len());
                entries.push((item.clone(), track));
            }
        }
    }
    entries
}

/// 过滤并转换搜索结果。
///
/// 只保留分数严格大于 `min_score` 的条目；条目引用的实体在同级数组中找不到时跳过。
pub fn stitch_search(search: &Search, min_score: f64) -> SearchResults {
    let albums = index_by_id(&search.albums, |a| a.id.as_str());
    let artists = index_by_id(&search.artists, |a| a.id.as_str());
    let images = index_by_id(&search.images, |i| i.id.as_str());
    let first_image = |ids: &[String]| {
        ids.first()
            .and_then(|id| images.get(id.as_str()))
            .copied()
    };

    let mut results = SearchResults::default();
    for item in search.search_results.iter().filter(|i| i.score > min_score) {
        match item.item_type {
            SearchItemType::Album => {
                let Some(album) = item.album.as_deref().and_then(|id| albums.get(id)) else {
                    continue;
                };
                let artist_name = album
                    .artist
                    .as_deref()
                    .and_then(|id| artists.get(id))
                    .map(|a| a.name.as_str());
                results.albums.push(album_info_to_album(
                    album,
                    artist_name,
                    None,
                    first_image(&album.images),
                ));
            }
            SearchItemType::Artist => {
                let Some(artist) = item.artist.as_deref().and_then(|id| artists.get(id)) else {
                    continue;
                };
                results
                    .artists
                    .push(artist_info_to_artist(artist, first_image(&artist.images)));
            }
            SearchItemType::Other => {}
        }
    }
    results
}
