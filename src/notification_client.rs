use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::{header, Certificate, ClientBuilder, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::config::BackendConfig;
use crate::error::WidgetError;
use crate::model::notification::{
    AcknowledgementBody, AcknowledgementStatus, Notification, NotificationId,
    NotificationListBody, NotificationSummary,
};

pub const CSRF_HEADER: &str = "X-CSRFToken";

// RFC 3986 中路径段可以不编码的字符
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[async_trait]
pub trait NotificationApi: Send + Sync {
    async fn fetch_count(&self) -> Result<NotificationSummary, WidgetError>;

    async fn fetch_list(&self) -> Result<Vec<Notification>, WidgetError>;

    async fn mark_as_read(
        &self,
        id: &NotificationId,
        csrf_token: Option<&str>,
    ) -> Result<AcknowledgementStatus, WidgetError>;

    async fn mark_all_as_read(
        &self,
        csrf_token: Option<&str>,
    ) -> Result<AcknowledgementStatus, WidgetError>;
}

pub struct HttpNotificationClient {
    config: BackendConfig,
    request_client: reqwest::Client,
}

impl HttpNotificationClient {
    pub fn new(config: BackendConfig, cookie: &str) -> Result<Self, WidgetError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        if !cookie.is_empty() {
            // 浏览器同源请求会自动带上cookie，会话和CSRF校验都依赖它
            let value = header::HeaderValue::from_str(cookie).map_err(|e| {
                WidgetError::config_err("page.cookie包含非法字符", &e.to_string())
            })?;
            headers.insert(header::COOKIE, value);
        }

        let mut builder = ClientBuilder::new()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(config.connect_timeout))
            .timeout(Duration::from_secs(config.whole_timeout))
            .pool_idle_timeout(Duration::from_secs(config.pool_idle_timeout));
        if config.no_proxy {
            builder = builder.no_proxy();
        }
        if !config.root_cert.is_empty() {
            let pem = std::fs::read(&config.root_cert)?;
            let cert = Certificate::from_pem(&pem).map_err(|e| {
                WidgetError::config_err(
                    "backend.root_cert不是合法的PEM证书",
                    &format!("{}: {}", config.root_cert, e),
                )
            })?;
            builder = builder.add_root_certificate(cert);
        }
        let request_client = builder.build()?;

        Ok(Self {
            config,
            request_client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    pub fn mark_as_read_url(&self, id: &NotificationId) -> String {
        let segment = utf8_percent_encode(&id.to_string(), PATH_SEGMENT).to_string();
        self.url(&self.config.mark_as_read_path.replace("{id}", &segment))
    }

    fn post(&self, url: &str, csrf_token: Option<&str>) -> RequestBuilder {
        let mut request = self
            .request_client
            .post(url)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = csrf_token {
            request = request.header(CSRF_HEADER, token);
        }
        request
    }

    // 与页面脚本一致：不论状态码如何都按JSON解析响应体
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, WidgetError> {
        let response = request.send().await.map_err(|e| {
            tracing::debug!("发送请求失败: {}", e);
            e
        })?;
        let status = response.status();
        let url = response.url().to_string();
        let body = response.bytes().await?;
        serde_json::from_slice::<T>(&body).map_err(|e| {
            WidgetError::decode_err(
                &format!("{} 的响应不是预期的JSON", url),
                &format!(
                    "状态码: {}, 错误: {}, 内容: {}",
                    status.as_str(),
                    e,
                    String::from_utf8_lossy(&body)
                ),
            )
        })
    }
}

#[async_trait]
impl NotificationApi for HttpNotificationClient {
    async fn fetch_count(&self) -> Result<NotificationSummary, WidgetError> {
        let url = self.url(&self.config.count_path);
        self.send(self.request_client.get(url)).await
    }

    async fn fetch_list(&self) -> Result<Vec<Notification>, WidgetError> {
        let url = self.url(&self.config.list_path);
        let body: NotificationListBody = self.send(self.request_client.get(url)).await?;
        Ok(body.notifications)
    }

    async fn mark_as_read(
        &self,
        id: &NotificationId,
        csrf_token: Option<&str>,
    ) -> Result<AcknowledgementStatus, WidgetError> {
        let url = self.mark_as_read_url(id);
        let body: AcknowledgementBody = self.send(self.post(&url, csrf_token)).await?;
        Ok(body.into())
    }

    async fn mark_all_as_read(
        &self,
        csrf_token: Option<&str>,
    ) -> Result<AcknowledgementStatus, WidgetError> {
        let url = self.url(&self.config.mark_all_as_read_path);
        let body: AcknowledgementBody = self.send(self.post(&url, csrf_token)).await?;
        Ok(body.into())
    }
}
