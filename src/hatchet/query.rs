//! 查询 URL 的构建。
//!
//! `QueryBuilder` 是一个纯函数式的组件：根据请求类型和参数生成完整的查询 URL，
//! 不做任何网络请求，也不持有共享状态。

use crate::{
    error::{HatchetError, Result},
    hatchet::{
        BASE_URL_HATCHET, HATCHET_ALBUMS, HATCHET_ARTISTS, HATCHET_ARTISTS_TOPHITS,
        HATCHET_PLAYLISTS, HATCHET_PLAYLISTS_ENTRIES, HATCHET_SEARCHES, HATCHET_TRACKS,
        HATCHET_USERS, HATCHET_VERSION, PARAM_ID,
    },
    model::request::RequestKind,
};

/// 有序的多值参数表。
///
/// 键按首次插入的顺序排列，同一个键的多个值保持插入顺序（用于 `ids[]` 这类数组参数）。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<(String, Vec<String>)>,
}

impl Params {
    /// 创建一个空参数表。
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个键值对并返回自身，便于链式构建。
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    /// 追加一个键值对。
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((key, vec![value])),
        }
    }

    /// 某个键的第一个值。
    pub fn first(&self, key: &str) -> Option<&str> {
        self.get_all(key).first().map(String::as_str)
    }

    /// 某个键的全部值。
    pub fn get_all(&self, key: &str) -> &[String] {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.as_slice())
            .unwrap_or_default()
    }

    /// 移除某个键并返回它的全部值。
    pub fn remove_all(&mut self, key: &str) -> Vec<String> {
        match self.entries.iter().position(|(k, _)| k == key) {
            Some(index) => self.entries.remove(index).1,
            None => Vec::new(),
        }
    }

    /// 键值对的总数。
    pub fn len(&self) -> usize {
        self.entries.iter().map(|(_, values)| values.len()).sum()
    }

    /// 是否没有任何参数。
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 按顺序遍历所有键值对。
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .flat_map(|(k, values)| values.iter().map(move |v| (k.as_str(), v.as_str())))
    }

    /// 编码为 `key=value&key=value` 形式的查询字符串。
    pub fn to_query_string(&self) -> Result<String> {
        let mut pairs = Vec::with_capacity(self.len());
        for (key, value) in self.iter() {
            check_encodable(key, value)?;
            pairs.push(format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            ));
        }
        Ok(pairs.join("&"))
    }

    /// 解析查询字符串，是 `to_query_string` 的逆操作。
    pub fn from_query_string(query: &str) -> Result<Self> {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut params = Self::new();
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            params.push(decode_component(key)?, decode_component(value)?);
        }
        Ok(params)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.push(key, value);
        }
        params
    }
}

fn check_encodable(key: &str, value: &str) -> Result<()> {
    if key.is_empty() {
        return Err(HatchetError::Encoding(format!(
            "参数名不能为空 (值为 '{value}')"
        )));
    }
    Ok(())
}

fn decode_component(component: &str) -> Result<String> {
    urlencoding::decode(component)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| HatchetError::Encoding(format!("无法解码 '{component}': {e}")))
}

/// 根据请求类型生成查询 URL。
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    base_url: String,
    api_version: String,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new(BASE_URL_HATCHET, HATCHET_VERSION)
    }
}

impl QueryBuilder {
    /// 使用给定的 API 根地址和版本创建构建器。
    pub fn new(base_url: impl Into<String>, api_version: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_version: api_version.into(),
        }
    }

    /// 构建查询 URL。
    ///
    /// 需要把 ID 嵌入路径的请求类型会消耗参数表中的 `id`，其余参数全部编码后附加为查询字符串。
    ///
    /// # 错误
    /// * `InvalidRequestKind` - 该类型没有对应的端点（组合请求 `UsersPlaylistsAll`）。
    /// * `MissingParameter` - 需要路径 ID 但参数中没有非空的 `id`。
    /// * `Encoding` - 参数无法编码。
    pub fn build(&self, kind: RequestKind, params: &Params) -> Result<String> {
        let mut params = params.clone();
        let root = format!("{}/{}", self.base_url, self.api_version);

        let mut url = match kind {
            RequestKind::Users => format!("{root}/{HATCHET_USERS}/"),
            RequestKind::UsersPlaylists => {
                let id = take_path_id(&mut params)?;
                format!("{root}/{HATCHET_USERS}/{id}/{HATCHET_PLAYLISTS}")
            }
            RequestKind::PlaylistsEntries => {
                let id = take_path_id(&mut params)?;
                format!("{root}/{HATCHET_PLAYLISTS}/{id}/{HATCHET_PLAYLISTS_ENTRIES}")
            }
            RequestKind::Artists => format!("{root}/{HATCHET_ARTISTS}/"),
            RequestKind::ArtistsAlbums => {
                let id = take_path_id(&mut params)?;
                format!("{root}/{HATCHET_ARTISTS}/{id}/{HATCHET_ALBUMS}/")
            }
            RequestKind::ArtistsTopHits => {
                let id = take_path_id(&mut params)?;
                format!("{root}/{HATCHET_ARTISTS}/{id}/{HATCHET_ARTISTS_TOPHITS}/")
            }
            RequestKind::Tracks => format!("{root}/{HATCHET_TRACKS}/"),
            RequestKind::Albums => format!("{root}/{HATCHET_ALBUMS}/"),
            RequestKind::Searches => format!("{root}/{HATCHET_SEARCHES}/"),
            RequestKind::UsersPlaylistsAll => {
                return Err(HatchetError::InvalidRequestKind(kind.to_string()));
            }
        };

        // 附加所有未被消耗的参数
        if !params.is_empty() {
            url.push('?');
            url.push_str(&params.to_query_string()?);
        }
        Ok(url)
    }
}

/// 取出并移除 `id` 参数，编码为路径段。
fn take_path_id(params: &mut Params) -> Result<String> {
    let id = params
        .remove_all(PARAM_ID)
        .into_iter()
        .next()
        .filter(|id| !id.is_empty())
        .ok_or(HatchetError::MissingParameter(PARAM_ID))?;
    Ok(urlencoding::encode(&id).into_owned())
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;
    use crate::hatchet::{PARAM_ARTIST_NAME, PARAM_IDARRAY, PARAM_NAME, PARAM_TERM};

    #[test]
    fn test_build_path_embedded_id() {
        let builder = QueryBuilder::default();
        let params = Params::new().with(PARAM_ID, "a1");

        assert_eq!(
            builder.build(RequestKind::ArtistsAlbums, &params).unwrap(),
            "https://api.hatchet.is/v1/artists/a1/albums/"
        );
        assert_eq!(
            builder.build(RequestKind::ArtistsTopHits, &params).unwrap(),
            "https://api.hatchet.is/v1/artists/a1/topHits/"
        );
        assert_eq!(
            builder.build(RequestKind::UsersPlaylists, &params).unwrap(),
            "https://api.hatchet.is/v1/users/a1/playlists"
        );
        assert_eq!(
            builder.build(RequestKind::PlaylistsEntries, &params).unwrap(),
            "https://api.hatchet.is/v1/playlists/a1/entries"
        );
    }

    #[test]
    fn test_build_appends_unused_params_in_order() {
        let builder = QueryBuilder::default();
        let params = Params::new()
            .with(PARAM_NAME, "Sigur Rós")
            .with(PARAM_ARTIST_NAME, "AC/DC")
            .with(PARAM_NAME, "Jónsi");

        let url = builder.build(RequestKind::Albums, &params).unwrap();
        insta::assert_snapshot!(url, @"https://api.hatchet.is/v1/albums/?name=Sigur%20R%C3%B3s&name=J%C3%B3nsi&artist_name=AC%2FDC");
    }

    #[test]
    fn test_build_id_array_as_repeated_pairs() {
        let params: Params = [(PARAM_IDARRAY, "t1"), (PARAM_IDARRAY, "t2")]
            .into_iter()
            .collect();
        let url = QueryBuilder::default()
            .build(RequestKind::Tracks, &params)
            .unwrap();

        assert_eq!(
            url,
            "https://api.hatchet.is/v1/tracks/?ids%5B%5D=t1&ids%5B%5D=t2"
        );
    }

    #[test]
    fn test_build_consumes_only_id() {
        let params = Params::new()
            .with(PARAM_ID, "u1")
            .with(PARAM_TERM, "x");
        let url = QueryBuilder::new("https://example.org/", "v2")
            .build(RequestKind::UsersPlaylists, &params)
            .unwrap();

        assert_eq!(url, "https://example.org/v2/users/u1/playlists?term=x");
        assert_eq!(params.len(), 2, "调用方的参数表不应被修改");
    }

    #[test]
    fn test_build_errors() {
        let builder = QueryBuilder::default();

        assert!(matches!(
            builder.build(RequestKind::UsersPlaylistsAll, &Params::new()),
            Err(HatchetError::InvalidRequestKind(_))
        ));
        assert!(matches!(
            builder.build(RequestKind::ArtistsAlbums, &Params::new()),
            Err(HatchetError::MissingParameter("id"))
        ));
        assert!(matches!(
            builder.build(RequestKind::Searches, &Params::new().with("", "orphan")),
            Err(HatchetError::Encoding(_))
        ));
    }

    #[test]
    fn test_control_characters_are_percent_encoded() {
        let params = Params::new().with(PARAM_TERM, "Sigur\tRós\nTakk\u{0}");

        let url = QueryBuilder::default()
            .build(RequestKind::Searches, &params)
            .unwrap();
        assert_eq!(
            url,
            "https://api.hatchet.is/v1/searches/?term=Sigur%09R%C3%B3s%0ATakk%00"
        );

        let query = params.to_query_string().unwrap();
        assert_eq!(Params::from_query_string(&query).unwrap(), params);
    }

    #[test]
    fn test_every_single_call_kind_has_an_endpoint() {
        let builder = QueryBuilder::default();
        let params = Params::new().with(PARAM_ID, "x");

        for kind in RequestKind::iter().filter(|k| *k != RequestKind::UsersPlaylistsAll) {
            let url = builder
                .build(kind, &params)
                .unwrap_or_else(|e| panic!("{kind} 无法构建 URL: {e}"));
            assert!(url.starts_with("https://api.hatchet.is/v1/"), "{kind}: {url}");
        }
    }

    #[test]
    fn test_query_string_round_trip() {
        let params = Params::new()
            .with("ids[]", "b")
            .with("term", "a & b = c")
            .with("ids[]", "a")
            .with("empty", "");

        let query = params.to_query_string().unwrap();
        let parsed = Params::from_query_string(&query).unwrap();

        assert_eq!(parsed, params);
        assert_eq!(parsed.get_all("ids[]"), ["b", "a"]);
    }
}
