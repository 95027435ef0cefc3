mod common;

use std::sync::Arc;

use common::{MockTransport, stitcher};
use hatchet_info_rs::{
    HatchetError, InfoResult, Params, RequestKind,
    hatchet::{PARAM_ARTIST_NAME, PARAM_ID, PARAM_NAME, PARAM_TERM},
};

fn sigur_ros_transport() -> MockTransport {
    MockTransport::new()
        .route("artists/?name=Sigur%20R%C3%B3s", "artists_sigur_ros.json")
        .route("artists/ar1/albums/", "artist_albums.json")
        .route("artists/ar1/topHits/", "top_hits.json")
        .route("tracks/?ids%5B%5D=t1&ids%5B%5D=t2", "album_tracks.json")
        .route(
            "albums/?name=Takk...&artist_name=Sigur%20R%C3%B3s",
            "albums_takk.json",
        )
        .route("searches/?term=sigur", "search_sigur.json")
}

#[test_log::test(tokio::test)]
async fn test_artist_albums_stitches_covers_and_tracks() {
    let transport = Arc::new(sigur_ros_transport());
    let stitcher = stitcher(transport.clone());

    let result = stitcher
        .stitch(
            RequestKind::ArtistsAlbums,
            &Params::new().with(PARAM_NAME, "Sigur Rós"),
            None,
        )
        .await
        .unwrap();

    let InfoResult::ArtistAlbums(albums) = result else {
        panic!("结果类型应为 ArtistAlbums");
    };
    assert_eq!(albums.artist.as_ref().map(|a| a.id.as_str()), Some("ar1"));
    let names: Vec<&str> = albums.albums.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["Takk...", "Inni"]);

    let takk = &albums.albums[0];
    assert_eq!(albums.images[takk].url, "https://img.hatchet.is/i2.png");
    assert_eq!(albums.tracks[takk].tracks.len(), 2);

    let inni = &albums.albums[1];
    assert!(!albums.images.contains_key(inni), "未知的图片 ID 不应产生封面");
    assert!(!albums.tracks.contains_key(inni), "没有歌曲的专辑不应发出歌曲请求");

    assert_eq!(
        transport.calls(),
        vec![
            "https://api.hatchet.is/v1/artists/?name=Sigur%20R%C3%B3s",
            "https://api.hatchet.is/v1/artists/ar1/albums/",
            "https://api.hatchet.is/v1/tracks/?ids%5B%5D=t1&ids%5B%5D=t2",
        ]
    );
}

#[test_log::test(tokio::test)]
async fn test_artist_albums_without_artist_is_empty() {
    let transport = Arc::new(MockTransport::new().route("artists/?name=Nobody", "artists_empty.json"));
    let stitcher = stitcher(transport.clone());

    let result = stitcher
        .stitch(
            RequestKind::ArtistsAlbums,
            &Params::new().with(PARAM_NAME, "Nobody"),
            None,
        )
        .await
        .unwrap();

    let InfoResult::ArtistAlbums(albums) = result else {
        panic!("结果类型应为 ArtistAlbums");
    };
    assert!(albums.artist.is_none());
    assert!(albums.albums.is_empty());
    assert_eq!(transport.calls().len(), 1, "没有艺术家时不应继续请求");
}

#[test_log::test(tokio::test)]
async fn test_top_hits_preserve_rank_order() {
    let transport = Arc::new(sigur_ros_transport());
    let stitcher = stitcher(transport);

    let result = stitcher
        .stitch(
            RequestKind::ArtistsTopHits,
            &Params::new().with(PARAM_NAME, "Sigur Rós"),
            None,
        )
        .await
        .unwrap();

    let InfoResult::ArtistTopHits(top_hits) = result else {
        panic!("结果类型应为 ArtistTopHits");
    };
    let entries: Vec<(&str, Option<&str>)> = top_hits
        .entries
        .iter()
        .map(|(item, track)| (item.id.as_str(), track.as_ref().map(|t| t.name.as_str())))
        .collect();
    assert_eq!(
        entries,
        vec![
            ("c1", Some("Hoppípolla")),
            ("c2", None),
            ("c3", Some("Glósóli")),
        ]
    );
}

#[test_log::test(tokio::test)]
async fn test_album_fetches_all_tracks_in_one_call() {
    let transport = Arc::new(sigur_ros_transport());
    let stitcher = stitcher(transport.clone());
    let params = Params::new()
        .with(PARAM_NAME, "Takk...")
        .with(PARAM_ARTIST_NAME, "Sigur Rós");

    let result = stitcher
        .stitch(RequestKind::Albums, &params, None)
        .await
        .unwrap();

    let InfoResult::Album(details) = result else {
        panic!("结果类型应为 Album");
    };
    let album = details.album.as_ref().unwrap();
    assert_eq!(album.name, "Takk...");
    assert_eq!(details.artist.as_ref().map(|a| a.name.as_str()), Some("Sigur Rós"));
    assert_eq!(details.images[album].id, "i2");

    let track_names: Vec<&str> = details.tracks[album]
        .tracks
        .iter()
        .map(|t| t.name.as_str())
        .collect();
    assert_eq!(track_names, vec!["Glósóli", "Hoppípolla"]);
    assert_eq!(transport.calls_to("tracks/"), 1);
}

#[test_log::test(tokio::test)]
async fn test_search_keeps_scores_above_threshold() {
    let transport = Arc::new(sigur_ros_transport());
    let stitcher = stitcher(transport);

    let result = stitcher
        .stitch(
            RequestKind::Searches,
            &Params::new().with(PARAM_TERM, "sigur"),
            None,
        )
        .await
        .unwrap();

    let InfoResult::Search(results) = result else {
        panic!("结果类型应为 Search");
    };
    assert!(results.artists.is_empty());
    assert_eq!(results.albums.len(), 1);
    assert_eq!(results.albums[0].name, "Takk...");
    assert_eq!(results.albums[0].artist_name.as_deref(), Some("Sigur Rós"));
}

#[test_log::test(tokio::test)]
async fn test_all_playlists_with_zero_playlists() {
    let transport =
        Arc::new(MockTransport::new().route("users/u42/playlists", "playlists_empty.json"));
    let stitcher = stitcher(transport.clone());

    let result = stitcher
        .stitch(RequestKind::UsersPlaylistsAll, &Params::new(), Some("u42"))
        .await
        .unwrap();

    let InfoResult::AllPlaylists(playlists) = result else {
        panic!("结果类型应为 AllPlaylists");
    };
    assert!(playlists.is_empty());
    assert_eq!(transport.calls_to("playlists/"), 0);
}

#[test_log::test(tokio::test)]
async fn test_all_playlists_maps_each_playlist_to_entries() {
    let transport = Arc::new(
        MockTransport::new()
            .route("users/u42/playlists", "playlists_u42.json")
            .route("playlists/p1/entries", "entries_p1.json")
            .route("playlists/p2/entries", "entries_p2.json"),
    );
    let stitcher = stitcher(transport.clone());

    let result = stitcher
        .stitch(RequestKind::UsersPlaylistsAll, &Params::new(), Some("u42"))
        .await
        .unwrap();

    let InfoResult::AllPlaylists(playlists) = result else {
        panic!("结果类型应为 AllPlaylists");
    };
    assert_eq!(playlists.len(), 2);
    let mut sizes: Vec<(String, usize)> = playlists
        .iter()
        .map(|(p, e)| (p.title.clone(), e.playlist_entries.len()))
        .collect();
    sizes.sort();
    assert_eq!(sizes, vec![("Kvöld".to_string(), 0), ("Morgunn".to_string(), 2)]);
}

#[test_log::test(tokio::test)]
async fn test_all_playlists_fails_as_a_whole() {
    let transport = Arc::new(
        MockTransport::new()
            .route("users/u42/playlists", "playlists_u42.json")
            .route("playlists/p1/entries", "entries_p1.json"),
    );
    let stitcher = stitcher(transport);

    let result = stitcher
        .stitch(RequestKind::UsersPlaylistsAll, &Params::new(), Some("u42"))
        .await;

    assert!(matches!(result, Err(e) if e.is_upstream()));
}

#[test_log::test(tokio::test)]
async fn test_user_scoped_kinds_need_identity() {
    let transport = Arc::new(MockTransport::new().route("users/u7/playlists", "playlists_empty.json"));
    let stitcher = stitcher(transport.clone());

    let result = stitcher
        .stitch(RequestKind::UsersPlaylistsAll, &Params::new(), None)
        .await;
    assert!(matches!(
        result,
        Err(HatchetError::MissingUserScope(RequestKind::UsersPlaylistsAll))
    ));

    let result = stitcher
        .stitch(
            RequestKind::UsersPlaylists,
            &Params::new().with(PARAM_ID, "u7"),
            None,
        )
        .await;
    assert!(result.is_ok(), "显式给出 id 时不需要用户身份");
    assert_eq!(transport.calls().len(), 1);
}

#[test_log::test(tokio::test)]
async fn test_malformed_json_is_decode_error() {
    let transport = Arc::new(MockTransport::new().route_raw("artists/?name=Broken", "{ \"artists\": ["));
    let stitcher = stitcher(transport);

    let result = stitcher
        .stitch(
            RequestKind::Artists,
            &Params::new().with(PARAM_NAME, "Broken"),
            None,
        )
        .await;

    assert!(matches!(result, Err(HatchetError::Decode(_))));
}

#[test_log::test(tokio::test)]
async fn test_artist_albums_fail_when_a_tracks_call_fails() {
    let transport = Arc::new(
        MockTransport::new()
            .route("artists/?name=Sigur%20R%C3%B3s", "artists_sigur_ros.json")
            .route("artists/ar1/albums/", "artist_albums.json"),
    );
    let stitcher = stitcher(transport.clone());

    let result = stitcher
        .stitch(
            RequestKind::ArtistsAlbums,
            &Params::new().with(PARAM_NAME, "Sigur Rós"),
            None,
        )
        .await;

    assert!(matches!(result, Err(e) if e.is_upstream()), "任一歌曲请求失败都应使整个请求失败");
    assert_eq!(transport.calls_to("tracks/"), 1);
}

#[test_log::test(tokio::test)]
async fn test_top_hits_fail_when_chart_call_fails() {
    let transport = Arc::new(
        MockTransport::new().route("artists/?name=Sigur%20R%C3%B3s", "artists_sigur_ros.json"),
    );
    let stitcher = stitcher(transport.clone());

    let result = stitcher
        .stitch(
            RequestKind::ArtistsTopHits,
            &Params::new().with(PARAM_NAME, "Sigur Rós"),
            None,
        )
        .await;

    assert!(matches!(result, Err(e) if e.is_upstream()));
    assert_eq!(transport.calls_to("artists/ar1/topHits/"), 1);
}

#[test_log::test(tokio::test)]
async fn test_album_fails_when_tracks_call_fails() {
    let transport = Arc::new(MockTransport::new().route(
        "albums/?name=Takk...&artist_name=Sigur%20R%C3%B3s",
        "albums_takk.json",
    ));
    let stitcher = stitcher(transport.clone());
    let params = Params::new()
        .with(PARAM_NAME, "Takk...")
        .with(PARAM_ARTIST_NAME, "Sigur Rós");

    let result = stitcher.stitch(RequestKind::Albums, &params, None).await;

    assert!(matches!(result, Err(e) if e.is_upstream()));
    assert_eq!(transport.calls_to("tracks/"), 1);
}

#[test_log::test(tokio::test)]
async fn test_top_hits_without_artist_is_empty() {
    let transport = Arc::new(MockTransport::new().route("artists/?name=Nobody", "artists_empty.json"));
    let stitcher = stitcher(transport.clone());

    let result = stitcher
        .stitch(
            RequestKind::ArtistsTopHits,
            &Params::new().with(PARAM_NAME, "Nobody"),
            None,
        )
        .await
        .unwrap();

    let InfoResult::ArtistTopHits(top_hits) = result else {
        panic!("结果类型应为 ArtistTopHits");
    };
    assert!(top_hits.artist.is_none());
    assert!(top_hits.entries.is_empty());
    assert_eq!(transport.calls().len(), 1, "没有艺术家时不应请求榜单");
}
