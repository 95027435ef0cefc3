//! 将 Hatchet 的原始实体转换为展示层模型，并用拼接结果补全调用方的对象。

use std::{
    sync::{PoisonError, RwLock},
    time::Duration,
};

use tracing::debug;

use crate::{
    hatchet::models::{self, AlbumInfo, ArtistInfo, TrackInfo, Tracks, index_by_id},
    model::{
        generic::{Album, Artist, Image, Track},
        request::{AlbumDetails, ArtistAlbums, FillTarget, InfoResult, TopHits},
    },
    utils::parse_api_date,
};

impl From<&models::Image> for Image {
    fn from(image: &models::Image) -> Self {
        Image {
            path: image.url.clone(),
            width: image.width,
            height: image.height,
            is_hatchet_image: true,
        }
    }
}

/// 将艺术家信息转换为 `Artist`。
pub fn artist_info_to_artist(info: &ArtistInfo, image: Option<&models::Image>) -> Artist {
    Artist {
        name: info.name.clone(),
        image: image.map(Image::from),
        ..Default::default()
    }
}

/// 将专辑信息转换为 `Album`。
pub fn album_info_to_album(
    info: &AlbumInfo,
    artist_name: Option<&str>,
    tracks: Option<&Tracks>,
    image: Option<&models::Image>,
) -> Album {
    Album {
        name: info.name.clone(),
        artist_name: artist_name.map(str::to_string),
        image: image.map(Image::from),
        release_date: info.release_date.as_deref().and_then(parse_api_date),
        tracks: tracks
            .map(|t| tracks_to_tracks(t, Some(info.name.as_str())))
            .unwrap_or_default(),
    }
}

/// 将歌曲信息转换为 `Track`。
pub fn track_info_to_track(
    info: &TrackInfo,
    artist_name: Option<&str>,
    album_name: Option<&str>,
) -> Track {
    Track {
        name: info.name.clone(),
        artist_name: artist_name.map(str::to_string),
        album_name: album_name.map(str::to_string),
        duration: info.duration.map(Duration::from_secs),
    }
}

/// 转换一个歌曲响应，通过同级的 `artists` 数组解析艺术家姓名。
pub fn tracks_to_tracks(tracks: &Tracks, album_name: Option<&str>) -> Vec<Track> {
    let artists = index_by_id(&tracks.artists, |a| a.id.as_str());
    tracks
        .tracks
        .iter()
        .map(|track| {
            let artist_name = track
                .artist
                .as_deref()
                .and_then(|id| artists.get(id))
                .map(|a| a.name.as_str());
            track_info_to_track(track, artist_name, album_name)
        })
        .collect()
}

/// 用艺术家信息补全 `Artist`。
pub fn fill_artist_with_artist_info(
    artist: &mut Artist,
    info: &ArtistInfo,
    image: Option<&models::Image>,
) {
    if !info.name.is_empty() {
        artist.name = info.name.clone();
    }
    if let Some(image) = image {
        artist.image = Some(image.into());
    }
}

/// 用专辑列表补全 `Artist`。
pub fn fill_artist_with_albums(artist: &mut Artist, albums: &ArtistAlbums) {
    let artist_name = albums.artist.as_ref().map(|a| a.name.as_str());
    artist.albums = albums
        .albums
        .iter()
        .map(|info| {
            album_info_to_album(
                info,
                artist_name,
                albums.tracks.get(info),
                albums.images.get(info),
            )
        })
        .collect();
}

/// 用热门歌曲补全 `Artist`，引用了未知歌曲的榜单条目会被跳过。
pub fn fill_artist_with_top_hits(artist: &mut Artist, top_hits: &TopHits) {
    let artist_name = top_hits.artist.as_ref().map(|a| a.name.as_str());
    artist.top_hits = top_hits
        .entries
        .iter()
        .filter_map(|(_, track)| track.as_ref())
        .map(|track| track_info_to_track(track, artist_name, None))
        .collect();
}

/// 用专辑信息和封面补全 `Album`。
pub fn fill_album_with_album_info(
    album: &mut Album,
    info: &AlbumInfo,
    artist: Option<&ArtistInfo>,
    image: Option<&models::Image>,
) {
    if !info.name.is_empty() {
        album.name = info.name.clone();
    }
    if let Some(artist) = artist {
        album.artist_name = Some(artist.name.clone());
    }
    if let Some(date) = info.release_date.as_deref().and_then(parse_api_date) {
        album.release_date = Some(date);
    }
    if let Some(image) = image {
        album.image = Some(image.into());
    }
}

/// 用歌曲列表补全 `Album`。
pub fn fill_album_with_tracks(album: &mut Album, tracks: &Tracks) {
    album.tracks = tracks_to_tracks(tracks, Some(album.name.as_str()));
}

/// 根据结果类型和目标类型，把拼接结果写入调用方的对象。
///
/// 目标已被丢弃、或结果与目标类型不匹配时什么也不做。
pub fn apply_to_target(result: &InfoResult, target: &FillTarget) {
    match (result, target) {
        (InfoResult::Artists(artists), FillTarget::Artist(weak)) => {
            let Some(info) = artists.artists.first() else {
                return;
            };
            let image = info
                .images
                .first()
                .and_then(|id| artists.images.iter().find(|img| img.id == *id));
            with_target(weak.upgrade().as_deref(), |artist| {
                fill_artist_with_artist_info(artist, info, image)
            });
        }
        (InfoResult::ArtistAlbums(albums), FillTarget::Artist(weak)) => {
            with_target(weak.upgrade().as_deref(), |artist| {
                fill_artist_with_albums(artist, albums)
            });
        }
        (InfoResult::ArtistTopHits(top_hits), FillTarget::Artist(weak)) => {
            with_target(weak.upgrade().as_deref(), |artist| {
                fill_artist_with_top_hits(artist, top_hits)
            });
        }
        (InfoResult::Album(details), FillTarget::Album(weak)) => {
            fill_album_target(details, weak.upgrade().as_deref());
        }
        _ => debug!("结果类型与补全目标不匹配，跳过补全。"),
    }
}

fn fill_album_target(details: &AlbumDetails, target: Option<&RwLock<Album>>) {
    let Some(info) = details.album.as_ref() else {
        return;
    };
    with_target(target, |album| {
        fill_album_with_album_info(
            album,
            info,
            details.artist.as_ref(),
            details.images.get(info),
        );
        if let Some(tracks) = details.tracks.get(info) {
            fill_album_with_tracks(album, tracks);
        }
    });
}

fn with_target<T>(target: Option<&RwLock<T>>, fill: impl FnOnce(&mut T)) {
    match target {
        Some(lock) => {
            let mut guard = lock.write().unwrap_or_else(PoisonError::into_inner);
            fill(&mut *guard);
        }
        None => debug!("补全目标已被释放，跳过补全。"),
    }
}
