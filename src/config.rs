//! 负责处理应用的持久化配置。

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::info;

use crate::{
    error::Result,
    hatchet::{BASE_URL_HATCHET, HATCHET_VERSION, stitcher::HATCHET_SEARCHITEM_MIN_SCORE},
};

const CONFIG_DIR_NAME: &str = "hatchet-info";
const CONFIG_FILE_NAME: &str = "config.json";

/// Hatchet API 客户端的配置项。
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct HatchetConfig {
    /// API 根地址，不带末尾的 `/`。
    pub base_url: String,
    /// API 版本段，例如 `"v1"`。
    pub api_version: String,
    /// 本地账户中用于识别 Hatchet 账户的认证器名称。
    pub authenticator_name: String,
    /// 搜索结果被采纳的最低分数（不含）。
    pub min_search_score: f64,
    /// 单个 HTTP 请求的超时时间（秒）。
    pub request_timeout_secs: u64,
}

impl Default for HatchetConfig {
    fn default() -> Self {
        Self {
            base_url: BASE_URL_HATCHET.to_string(),
            api_version: HATCHET_VERSION.to_string(),
            authenticator_name: "hatchet".to_string(),
            min_search_score: HATCHET_SEARCHITEM_MIN_SCORE,
            request_timeout_secs: 30,
        }
    }
}

/// 获取应用配置目录下指定文件的完整路径。
///
/// # 参数
/// * `filename` - 目标配置文件的名称，例如 "accounts.json"。
pub fn get_config_file_path(filename: &str) -> Result<PathBuf> {
    if let Some(mut config_dir) = dirs::config_dir() {
        config_dir.push(CONFIG_DIR_NAME);
        fs::create_dir_all(&config_dir)?;
        config_dir.push(filename);
        Ok(config_dir)
    } else {
        Err(std::io::Error::new(std::io::ErrorKind::NotFound, "无法找到用户配置目录").into())
    }
}

/// 从配置文件加载配置，文件不存在时返回默认配置。
pub fn load_config() -> Result<HatchetConfig> {
    let config_path = get_config_file_path(CONFIG_FILE_NAME)?;

    match fs::read_to_string(&config_path) {
        Ok(content) => {
            let config: HatchetConfig = serde_json::from_str(&content)?;
            info!("已从 {:?} 加载配置。", config_path);
            Ok(config)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("配置文件不存在，将使用默认配置。");
            Ok(HatchetConfig::default())
        }
        Err(e) => Err(e.into()),
    }
}

/// 将配置序列化为 JSON 并保存到文件。
pub fn save_config(config: &HatchetConfig) -> Result<()> {
    let config_path = get_config_file_path(CONFIG_FILE_NAME)?;
    let content = serde_json::to_string_pretty(config)?;
    fs::write(config_path, content)?;
    info!("配置已保存。");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_falls_back_to_defaults() {
        let config: HatchetConfig =
            serde_json::from_str(r#"{ "base_url": "https://staging.hatchet.is" }"#).unwrap();

        assert_eq!(config.base_url, "https://staging.hatchet.is");
        assert_eq!(config.api_version, "v1");
        assert_eq!(config.min_search_score, 5.0);
    }
}
