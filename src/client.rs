// src/client.rs

use crate::{
    config::AppConfig,
    constants,
    error::*,
    models::{HttpMethod, RetrievalDescriptor},
};
use reqwest::{
    IntoUrl, Response, StatusCode,
    header::{HeaderMap, HeaderValue, COOKIE},
};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use std::sync::Arc;

/// 带重试中间件的 HTTP 客户端。所有请求自动携带会话 Cookie,
/// 401/403 统一折叠为会话失效错误。
#[derive(Clone)]
pub struct RobustClient {
    pub client: ClientWithMiddleware,
}

impl RobustClient {
    pub fn new(config: Arc<AppConfig>) -> AppResult<Self> {
        let mut default_headers = HeaderMap::new();
        if let Some(cookie) = &config.session_cookie {
            let value = format!("{}={}", constants::moodle::SESSION_COOKIE_NAME, cookie);
            let mut value = HeaderValue::from_str(&value)
                .map_err(|e| AppError::UserInputError(format!("Cookie 含非法字符: {}", e)))?;
            value.set_sensitive(true);
            default_headers.insert(COOKIE, value);
        }

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(
            reqwest::Client::builder()
                .user_agent(config.user_agent.clone())
                .default_headers(default_headers)
                .connect_timeout(config.connect_timeout)
                .timeout(config.timeout)
                .build()?,
        )
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build();

        Ok(Self { client })
    }

    pub async fn get<T: IntoUrl>(&self, url: T) -> AppResult<Response> {
        let res = self.client.get(url).send().await?;
        Self::check_session(res)
    }

    /// 只取响应头, 用于解析 URL 型资源的最终跳转目标。
    pub async fn resolve_redirect<T: IntoUrl>(&self, url: T) -> AppResult<String> {
        let res = self.client.head(url).send().await?;
        let res = Self::check_session(res)?;
        Ok(res.url().to_string())
    }

    pub async fn fetch_page<T: IntoUrl>(&self, url: T) -> AppResult<String> {
        Ok(self.get(url).await?.text().await?)
    }

    /// 按描述符的请求形状发起取回。
    pub async fn execute(&self, descriptor: &RetrievalDescriptor) -> AppResult<Response> {
        let mut request = match descriptor.method {
            HttpMethod::Get => self.client.get(&descriptor.endpoint),
            HttpMethod::Post => self.client.post(&descriptor.endpoint),
        };
        for header in &descriptor.headers {
            request = request.header(header.name.as_str(), header.value.as_str());
        }
        if let Some(body) = &descriptor.body {
            request = request.body(body.clone());
        }
        Self::check_session(request.send().await?)
    }

    fn check_session(res: Response) -> AppResult<Response> {
        if res.status() == StatusCode::UNAUTHORIZED || res.status() == StatusCode::FORBIDDEN {
            return Err(AppError::SessionInvalid);
        }
        Ok(res.error_for_status()?)
    }
}
