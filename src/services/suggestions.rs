//! # 자동완성 추천어 서비스
//!
//! 검증된 검색어로 보조 역색인을 조회하고, 중복을 제거한 상품 이름 목록을 만듭니다.
//!
//! "매칭 없음"(빈 목록)과 "서비스 장애"(`AppError::Index`)는 반드시 구분됩니다.
//! 인프라 실패를 빈 목록으로 숨기지 않습니다.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::AppError;
use crate::services::index::SuggestionIndex;

/// 역색인에 요청하는 최대 히트 수
pub const MAX_SUGGESTIONS: usize = 10;

/// 추천어 서비스
///
/// 역색인 핸들을 `Arc`로 들고 있어 clone이 가볍습니다 (AppState에 그대로 넣습니다).
#[derive(Clone)]
pub struct SuggestionService {
    index: Arc<dyn SuggestionIndex>,
}

impl SuggestionService {
    pub fn new(index: Arc<dyn SuggestionIndex>) -> Self {
        Self { index }
    }

    /// `query`에 대한 추천어를 반환합니다.
    ///
    /// `query`는 이미 `validate_suggestion_query`를 통과한 값이어야 합니다.
    /// 결과는 처음 등장한 순서를 유지하며 중복이 없고, 최대 10개입니다.
    pub async fn suggest(&self, query: &str) -> Result<Vec<String>, AppError> {
        let names = self.index.phrase_prefix(query, MAX_SUGGESTIONS).await?;
        let suggestions = dedup(names);
        tracing::debug!(query, count = suggestions.len(), "suggestions served");
        Ok(suggestions)
    }
}

fn dedup(names: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(names.len());
    names
        .into_iter()
        .filter(|name| seen.insert(name.clone()))
        .take(MAX_SUGGESTIONS)
        .collect()
}
