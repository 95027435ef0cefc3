//! HTTPS 传输层。
//!
//! `Transport` 是与网络交互的唯一接缝，测试中可以替换为不联网的实现。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Client, Response,
    header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue},
};
use tracing::{instrument, warn};

use crate::{error::Result, hatchet::query::Params};

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// 定义了获取原始响应文本的通用接口。
///
/// 非 2xx 的响应不视为错误，其响应体同样以文本形式返回。
#[async_trait]
pub trait Transport: Send + Sync {
    /// 发送 GET 请求并返回响应体。
    async fn get(&self, url: &str) -> Result<String>;

    /// 以表单编码发送 POST 请求并返回响应体。
    async fn post_form(&self, url: &str, params: &Params) -> Result<String>;

    /// 以 JSON 发送 POST 请求并返回响应体。
    async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<String>;
}

/// 基于 `reqwest` 的仅 HTTPS 传输层。
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http_client: Client,
}

impl ReqwestTransport {
    /// 创建一个新的传输层实例。
    pub fn new(timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(JSON_CONTENT_TYPE));

        let http_client = Client::builder()
            .https_only(true)
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { http_client })
    }

    async fn read_body(url: &str, response: Response) -> Result<String> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            warn!(url, %status, "Hatchet 返回了非 2xx 状态码，仍将返回响应体");
        }
        Ok(body)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[instrument(skip(self))]
    async fn get(&self, url: &str) -> Result<String> {
        let response = self
            .http_client
            .get(url)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .send()
            .await?;
        Self::read_body(url, response).await
    }

    #[instrument(skip(self, params))]
    async fn post_form(&self, url: &str, params: &Params) -> Result<String> {
        let body = params.to_query_string()?;
        let response = self
            .http_client
            .post(url)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(body)
            .send()
            .await?;
        Self::read_body(url, response).await
    }

    #[instrument(skip(self, body))]
    async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<String> {
        let response = self
            .http_client
            .post(url)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(body.to_string())
            .send()
            .await?;
        Self::read_body(url, response).await
    }
}
