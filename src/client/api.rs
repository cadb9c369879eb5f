//! # 카탈로그 API 클라이언트
//!
//! 상품 목록/검색/등록/추천어 엔드포인트를 호출하는 타입 있는 HTTP 클라이언트입니다.
//! 서버가 돌려준 `{ "error": "..." }` 메시지를 `ClientError::Api`에 담고,
//! 메시지가 없으면 호출별 기본 메시지를 씁니다.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Response;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Product, ProductQuery, ResultPage, SuggestionResponse};

/// 모든 요청에 적용되는 타임아웃
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// API 호출 실패
#[derive(Debug, Error)]
pub enum ClientError {
    /// 연결 실패, 타임아웃, 응답 본문 해석 실패
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// 2xx가 아닌 응답
    #[error("{message} (status {status})")]
    Api { status: u16, message: String },
}

impl ClientError {
    /// 서버가 응답한 경우 그 HTTP 상태 코드
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Transport(e) => e.status().map(|s| s.as_u16()),
        }
    }
}

/// `POST /products` 요청 본문
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProductBody {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: String,
    pub tenant: String,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_stock: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// 자동완성 컨트롤러가 추천어를 가져오는 곳
#[async_trait]
pub trait SuggestionSource: Send + Sync {
    async fn suggestions(&self, q: &str) -> Result<Vec<String>, ClientError>;
}

/// 카탈로그 서버 HTTP 클라이언트
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: String,
}

impl CatalogClient {
    /// `base_url` 예: `http://localhost:3000`
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `GET /products`
    pub async fn list_products(
        &self,
        query: &ProductQuery,
    ) -> Result<ResultPage<Product>, ClientError> {
        let response = self.http.get(self.url("/products")).query(query).send().await?;
        decode(response, "Failed to fetch products. Please try again.").await
    }

    /// `GET /products/search`
    pub async fn search_products(
        &self,
        query: &ProductQuery,
    ) -> Result<ResultPage<Product>, ClientError> {
        let response = self
            .http
            .get(self.url("/products/search"))
            .query(query)
            .send()
            .await?;
        decode(response, "Failed to perform product search. Please try again.").await
    }

    /// 검색어가 있으면 검색, 없으면 목록 조회를 합니다.
    pub async fn browse(&self, query: &ProductQuery) -> Result<ResultPage<Product>, ClientError> {
        let has_text = query.q.as_deref().is_some_and(|q| !q.trim().is_empty());
        if has_text {
            self.search_products(query).await
        } else {
            let listing = ProductQuery {
                q: None,
                ..query.clone()
            };
            self.list_products(&listing).await
        }
    }

    /// `POST /products`
    pub async fn create_product(&self, body: &NewProductBody) -> Result<Product, ClientError> {
        let response = self.http.post(self.url("/products")).json(body).send().await?;
        decode(response, "Failed to add product.").await
    }

    /// `GET /products/suggestions`
    pub async fn fetch_suggestions(&self, q: &str) -> Result<Vec<String>, ClientError> {
        let response = self
            .http
            .get(self.url("/products/suggestions"))
            .query(&[("q", q)])
            .send()
            .await?;
        let body: SuggestionResponse =
            decode(response, "Failed to fetch autocomplete suggestions.").await?;
        Ok(body.suggestions)
    }
}

#[async_trait]
impl SuggestionSource for CatalogClient {
    async fn suggestions(&self, q: &str) -> Result<Vec<String>, ClientError> {
        self.fetch_suggestions(q).await
    }
}

/// 2xx면 본문을 `T`로, 아니면 서버의 에러 메시지를 담은 `ClientError::Api`로 바꿉니다.
async fn decode<T: DeserializeOwned>(response: Response, fallback: &str) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|b| b.error)
        .unwrap_or_else(|_| fallback.to_string());
    tracing::error!("[API Error {}]: {}", status.as_u16(), message);

    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}
