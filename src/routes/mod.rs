//! # 라우트 핸들러 모듈
//!
//! HTTP 요청을 처리하는 핸들러 함수들과 라우터 구성을 모아둔 모듈입니다.
//!
//! 각 하위 모듈:
//! - `health`: 서버 상태 확인 (헬스체크)
//! - `products`: 상품 목록/등록/검색/추천어 핸들러

pub mod health;
pub mod products;

pub use health::*;
pub use products::*;

use axum::{routing::get, Router}; // get(): GET 메서드 라우팅, Router: 라우터 빌더
use sqlx::SqlitePool;             // SQLite 연결 풀 (clone이 가벼움)

use crate::error::AppError;
use crate::services::SuggestionService;

/// 애플리케이션 공유 상태
///
/// 모든 요청 핸들러가 `State(state): State<AppState>`로 접근합니다.
/// 요청 간에 공유되는 가변 상태는 없고, 외부 자원(저장소, 역색인)의 핸들만 담습니다.
#[derive(Clone)]
pub struct AppState {
    /// 기본 상품 저장소 (SQLite 연결 풀, 내부적으로 Arc로 공유)
    pub pool: SqlitePool,
    /// 보조 역색인 기반 추천어 서비스
    pub suggestions: SuggestionService,
}

/// 전체 API 라우터를 구성합니다.
///
/// 미들웨어(CORS, 트레이싱)는 `main.rs`에서 덧붙입니다.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/products", get(list_products).post(create_product))
        .route("/products/search", get(search_products))
        .route("/products/suggestions", get(suggest_products))
        // 매칭되지 않는 경로와 메서드는 모두 404 `{ "error": "Route Not Found" }`
        .fallback(route_not_found)
        .method_not_allowed_fallback(route_not_found)
        // with_state: 모든 핸들러가 State<AppState>로 상태를 꺼낼 수 있게 합니다.
        .with_state(state)
}

async fn route_not_found() -> AppError {
    AppError::NotFound
}
