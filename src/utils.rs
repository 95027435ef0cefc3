//! 通用的辅助函数：字符串距离、时长与日期格式化、缓存键以及图片地址处理。

use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;

use crate::model::generic::Image;

/// Hatchet API 使用的日期格式。
const API_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// 计算两个字符串之间的编辑距离（按字符计）。
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    strsim::levenshtein(a, b)
}

/// 将时长格式化为 `mm:ss`。
pub fn duration_to_string(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// 解析 API 返回的 `yyyy-MM-ddTHH:mm:ssZ` 格式日期，失败时返回 `None`。
pub fn parse_api_date(raw: &str) -> Option<DateTime<Utc>> {
    match NaiveDateTime::parse_from_str(raw, API_DATE_FORMAT) {
        Ok(naive) => Some(naive.and_utc()),
        Err(e) => {
            warn!("无法解析日期 '{}': {}", raw, e);
            None
        }
    }
}

/// 由若干字段拼出缓存键：每个字段转为小写，并以两个制表符作为前缀。
pub fn cache_key(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|part| format!("\t\t{}", part.to_lowercase()))
        .collect()
}

/// 当前的网络连接类型，影响请求的图片尺寸。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connection {
    /// Wi-Fi，按完整宽度请求。
    Wifi,
    /// 计费网络，按一半宽度请求。
    Metered,
}

/// 将密度无关像素换算为设备像素。
pub fn dp_to_px(dp: u32, density_dpi: u32) -> u32 {
    (dp as f32 * (density_dpi as f32 / 160.0)) as u32
}

/// 为图片生成合适尺寸的加载地址。
///
/// 只有 Hatchet 图片支持 `?width=` 缩放，且只在原图比目标宽度更大时才会附加。
pub fn build_image_path(
    image: &Image,
    width_dp: u32,
    density_dpi: u32,
    connection: Connection,
) -> String {
    if image.is_hatchet_image {
        let square_width = image.width.min(image.height);
        let width = dp_to_px(width_dp, density_dpi);
        let target = match connection {
            Connection::Wifi => width,
            Connection::Metered => width / 2,
        };
        if square_width > target {
            return format!("{}?width={}", image.path, target);
        }
    }
    image.path.clone()
}

/// 本地路径加上 `file:` 前缀，网络地址原样返回。
pub fn prepare_image_path(path: &str) -> String {
    if path.is_empty() || path.contains("https://") || path.contains("http://") {
        path.to_string()
    } else {
        format!("file:{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use tracing_test::traced_test;

    #[test]
    fn test_levenshtein_distance() {
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
        assert_eq!(levenshtein_distance("", "abc"), 3);
        assert_eq!(levenshtein_distance("Björk", "Bjork"), 1);
    }

    #[test]
    fn test_duration_to_string() {
        assert_eq!(duration_to_string(Duration::from_millis(61_500)), "01:01");
        assert_eq!(duration_to_string(Duration::from_secs(3_600)), "60:00");
    }

    #[test]
    #[traced_test]
    fn test_parse_api_date() {
        let date = parse_api_date("2013-08-27T14:05:09Z").unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2013, 8, 27));
        assert_eq!((date.hour(), date.minute(), date.second()), (14, 5, 9));

        assert!(parse_api_date("27.08.2013").is_none());
        assert!(logs_contain("无法解析日期"));
    }

    #[test]
    fn test_cache_key() {
        assert_eq!(cache_key(&["Sigur Rós", "Takk"]), "\t\tsigur rós\t\ttakk");
    }

    #[test]
    fn test_build_image_path() {
        let image = Image {
            path: "https://img.hatchet.is/i1.png".into(),
            width: 800,
            height: 600,
            is_hatchet_image: true,
        };

        assert_eq!(
            build_image_path(&image, 200, 320, Connection::Wifi),
            "https://img.hatchet.is/i1.png?width=400"
        );
        assert_eq!(
            build_image_path(&image, 200, 320, Connection::Metered),
            "https://img.hatchet.is/i1.png?width=200"
        );
        assert_eq!(
            build_image_path(&image, 400, 320, Connection::Wifi),
            "https://img.hatchet.is/i1.png",
            "原图不比目标大时不应缩放"
        );

        let local = Image {
            path: "/music/cover.jpg".into(),
            width: 1000,
            height: 1000,
            is_hatchet_image: false,
        };
        assert_eq!(build_image_path(&local, 100, 160, Connection::Wifi), "/music/cover.jpg");
    }

    #[test]
    fn test_prepare_image_path() {
        assert_eq!(prepare_image_path("/sdcard/a.png"), "file:/sdcard/a.png");
        assert_eq!(
            prepare_image_path("https://img.hatchet.is/i1.png"),
            "https://img.hatchet.is/i1.png"
        );
        assert_eq!(prepare_image_path(""), "");
    }
}
