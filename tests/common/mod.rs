#![allow(dead_code)]

use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use hatchet_info_rs::{
    CredentialStore, HatchetClient, HatchetError, Params, RequestDispatcher, Result,
    ResponseStitcher, UserIdentityResolver, config::HatchetConfig, dispatcher::BatchReport,
    hatchet::transport::Transport,
};
use tokio::sync::mpsc;

pub const API_ROOT: &str = "https://api.hatchet.is/v1";

pub fn load_test_data(filename: &str) -> String {
    let path = Path::new("tests/test_data").join(filename);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("读取测试文件 '{:?}' 失败: {}", path, e))
}

/// 不联网的传输层：按完整 URL 返回预置的响应，并记录每次请求的 URL。
#[derive(Default)]
pub struct MockTransport {
    routes: HashMap<String, String>,
    calls: Mutex<Vec<String>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为 `API_ROOT` 之下的路径登记一个测试文件作为响应。
    pub fn route(mut self, path: &str, filename: &str) -> Self {
        self.routes
            .insert(format!("{API_ROOT}/{path}"), load_test_data(filename));
        self
    }

    /// 为 `API_ROOT` 之下的路径登记一段原始响应文本。
    pub fn route_raw(mut self, path: &str, body: &str) -> Self {
        self.routes
            .insert(format!("{API_ROOT}/{path}"), body.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, path_prefix: &str) -> usize {
        let prefix = format!("{API_ROOT}/{path_prefix}");
        self.calls()
            .iter()
            .filter(|url| url.starts_with(&prefix))
            .count()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, url: &str) -> Result<String> {
        self.calls.lock().unwrap().push(url.to_string());
        // 让出一次调度，使并发的请求能够交错执行。
        tokio::task::yield_now().await;
        self.routes
            .get(url)
            .cloned()
            .ok_or_else(|| HatchetError::Upstream(format!("没有为 {url} 预置响应")))
    }

    async fn post_form(&self, url: &str, _params: &Params) -> Result<String> {
        Err(HatchetError::Upstream(format!("不支持 POST: {url}")))
    }

    async fn post_json(&self, url: &str, _body: &serde_json::Value) -> Result<String> {
        Err(HatchetError::Upstream(format!("不支持 POST: {url}")))
    }
}

pub fn stitcher(transport: Arc<MockTransport>) -> ResponseStitcher {
    let config = HatchetConfig::default();
    let client = HatchetClient::with_transport(transport, &config);
    ResponseStitcher::new(Arc::new(client), config.min_search_score)
}

pub fn dispatcher(
    transport: Arc<MockTransport>,
    store: Arc<dyn CredentialStore>,
) -> (RequestDispatcher, mpsc::UnboundedReceiver<BatchReport>) {
    let config = HatchetConfig::default();
    let client = Arc::new(HatchetClient::with_transport(transport, &config));
    let stitcher = Arc::new(ResponseStitcher::new(
        client.clone(),
        config.min_search_score,
    ));
    let identity = Arc::new(UserIdentityResolver::new(
        client,
        store,
        config.authenticator_name,
    ));
    RequestDispatcher::new(stitcher, identity)
}
