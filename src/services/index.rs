//! # 보조 역색인(Elasticsearch) 클라이언트
//!
//! 자동완성 추천어를 조회하는 외부 역색인 서비스와 통신합니다.
//! 기본 저장소(SQLite)와는 별개로 채워지는 best-effort 인덱스이므로,
//! 이 모듈의 모든 실패는 `IndexError`로 표현되고 상위에서 "기능 저하"로 취급됩니다.
//!
//! ## 사용하는 REST API
//! | 메서드 | 경로 | 용도 |
//! |--------|------|------|
//! | POST | /{index}/_search | phrase-prefix 추천어 조회 |
//! | HEAD | /{index} | 인덱스 존재 확인 |
//! | PUT | /{index} | 인덱스 생성 (name, description 텍스트 매핑) |

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::Config;

/// 역색인 서비스 호출 실패
#[derive(Debug, Error)]
pub enum IndexError {
    /// 연결 거부, 타임아웃 등 전송 계층 실패
    #[error("request to index service failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// 2xx가 아닌 응답
    #[error("index service responded with status {0}")]
    Status(u16),

    /// 응답 본문을 해석할 수 없음
    #[error("unexpected index service response: {0}")]
    Malformed(String),
}

/// 추천어 조회에 필요한 역색인 기능
///
/// `SuggestionService`는 이 트레이트에만 의존하므로
/// 실제 Elasticsearch 대신 테스트용 구현을 끼워 넣을 수 있습니다.
#[async_trait]
pub trait SuggestionIndex: Send + Sync {
    /// `name`과 `description` 두 필드에 대해 phrase-prefix 매칭을 수행하고
    /// 최대 `size`개의 히트에서 `name` 값을 순서대로 반환합니다. (중복 포함)
    async fn phrase_prefix(&self, query: &str, size: usize) -> Result<Vec<String>, IndexError>;
}

/// Elasticsearch REST API 클라이언트
#[derive(Debug, Clone)]
pub struct ElasticsearchIndex {
    http: reqwest::Client,
    base_url: String,
    index: String,
}

// `_search` 응답에서 필요한 부분만 역직렬화합니다.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: Hits,
}

#[derive(Debug, Deserialize)]
struct Hits {
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_source")]
    source: Option<HitSource>,
}

#[derive(Debug, Deserialize)]
struct HitSource {
    name: Option<String>,
}

impl ElasticsearchIndex {
    /// 새 클라이언트를 만듭니다. 모든 요청에 `timeout`이 적용됩니다.
    pub fn new(
        base_url: impl Into<String>,
        index: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, IndexError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            index: index.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, IndexError> {
        Self::new(
            &config.elasticsearch_url,
            &config.elasticsearch_index,
            config.elasticsearch_timeout,
        )
    }

    pub fn index_name(&self) -> &str {
        &self.index
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}{}", self.base_url, self.index, path)
    }

    /// 인덱스가 없으면 `name`, `description` 텍스트 매핑으로 생성합니다.
    ///
    /// # 반환값
    /// - `Ok(true)`: 새로 생성함
    /// - `Ok(false)`: 이미 존재함
    pub async fn ensure_index(&self) -> Result<bool, IndexError> {
        let response = self.http.head(self.url("")).send().await?;
        match response.status() {
            status if status.is_success() => return Ok(false),
            StatusCode::NOT_FOUND => {}
            status => return Err(IndexError::Status(status.as_u16())),
        }

        let mapping = json!({
            "mappings": {
                "properties": {
                    "name": { "type": "text" },
                    "description": { "type": "text" }
                }
            }
        });
        let response = self.http.put(self.url("")).json(&mapping).send().await?;
        if !response.status().is_success() {
            return Err(IndexError::Status(response.status().as_u16()));
        }
        Ok(true)
    }
}

/// 히트의 `_source.name`을 순서대로 꺼냅니다. `name`이 없는 히트는 건너뜁니다.
fn names_from(response: SearchResponse) -> Vec<String> {
    response
        .hits
        .hits
        .into_iter()
        .filter_map(|hit| hit.source.and_then(|s| s.name))
        .collect()
}

/// phrase-prefix 추천어 쿼리 본문
pub(crate) fn suggestion_query(query: &str, size: usize) -> Value {
    json!({
        "size": size,
        "_source": ["name"],
        "query": {
            "bool": {
                "should": [
                    { "match_phrase_prefix": { "name": query } },
                    { "match_phrase_prefix": { "description": query } }
                ]
            }
        }
    })
}

#[async_trait]
impl SuggestionIndex for ElasticsearchIndex {
    async fn phrase_prefix(&self, query: &str, size: usize) -> Result<Vec<String>, IndexError> {
        let response = self
            .http
            .post(self.url("/_search"))
            .json(&suggestion_query(query, size))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(IndexError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let parsed: SearchResponse =
            serde_json::from_str(&body).map_err(|e| IndexError::Malformed(e.to_string()))?;

        Ok(names_from(parsed))
    }
}
