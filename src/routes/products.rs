//! # 상품(Product) 라우트 핸들러
//!
//! ## 엔드포인트
//! | 메서드 | 경로 | 설명 |
//! |--------|------|------|
//! | GET | /products | 필터 + 정렬 + 페이지 목록 |
//! | POST | /products | 상품 등록 (201) |
//! | GET | /products/search?q=키워드 | 자유 텍스트 검색 |
//! | GET | /products/suggestions?q=접두어 | 자동완성 추천어 |
//!
//! 모든 핸들러는 저장소/역색인에 접근하기 **전에** 파라미터를 검증합니다.
//! 검증 실패는 400, 저장소 실패는 500, 역색인 실패는 503으로 응답합니다.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection}, // 추출 실패를 직접 처리하기 위한 타입
        Query, State,                               // 쿼리 문자열, 공유 상태 추출기
    },
    http::StatusCode, // 201 Created
    Json,             // JSON 요청/응답 래퍼
};
use serde::Deserialize; // 쿼리 문자열 → 구조체 역직렬화

use crate::{
    db,
    error::AppError,
    models::{CreateProductRequest, Product, ProductQuery, ResultPage, SuggestionResponse},
    routes::AppState,
    services::validation,
};

/// `GET /products/suggestions?q=...` 쿼리 파라미터
#[derive(Debug, Deserialize)]
pub struct SuggestionQuery {
    pub q: Option<String>,
}

/// 쿼리 문자열 자체를 해석할 수 없는 경우(중복 키 등)도 검증 에러로 응답합니다.
fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    query
        .map(|Query(inner)| inner)
        .map_err(|rejection| AppError::validation(rejection.body_text()))
}

/// `GET /products` — 필터 목록을 조회합니다.
///
/// 응답: `{ "meta": { total, page, limit, totalPages }, "results": [...] }`
pub async fn list_products(
    State(state): State<AppState>,
    query: Result<Query<ProductQuery>, QueryRejection>,
) -> Result<Json<ResultPage<Product>>, AppError> {
    let raw = query_params(query)?;
    let params = validation::validate_listing(&raw)?;
    let page = db::list_products(&state.pool, &params).await?;
    Ok(Json(page))
}

/// `POST /products` — 새 상품을 등록합니다.
///
/// JSON이 아닌 본문도 `{ "error": ... }` 형태의 400으로 돌려줍니다.
pub async fn create_product(
    State(state): State<AppState>,
    payload: Result<Json<CreateProductRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    // 추출기를 Result로 받으면 axum 기본 거절 응답 대신 { "error": ... } 400을 돌려줄 수 있습니다.
    let Json(req) = payload.map_err(|rejection| AppError::validation(rejection.body_text()))?;
    let new_product = validation::validate_new_product(&req)?;

    let product = db::insert_product(&state.pool, &new_product).await?;
    tracing::info!(id = %product.id, tenant = %product.tenant, "product created");

    Ok((StatusCode::CREATED, Json(product)))
}

/// `GET /products/search` — 이름/설명에 대한 자유 텍스트 검색
///
/// `q`는 필수이며, `sortBy=score`이면 전문검색 관련도순으로 정렬합니다.
pub async fn search_products(
    State(state): State<AppState>,
    query: Result<Query<ProductQuery>, QueryRejection>,
) -> Result<Json<ResultPage<Product>>, AppError> {
    let raw = query_params(query)?;
    let params = validation::validate_search(&raw)?;
    let page = db::search_products(&state.pool, &params).await?;
    Ok(Json(page))
}

/// `GET /products/suggestions` — 자동완성 추천어
///
/// 역색인 장애는 빈 목록이 아니라 503으로 응답합니다.
/// 클라이언트(자동완성 컨트롤러)는 이를 "자동완성 비활성화"로 해석합니다.
pub async fn suggest_products(
    State(state): State<AppState>,
    query: Result<Query<SuggestionQuery>, QueryRejection>,
) -> Result<Json<SuggestionResponse>, AppError> {
    let raw = query_params(query)?;
    let q = validation::validate_suggestion_query(raw.q.as_deref())?;
    let suggestions = state.suggestions.suggest(&q).await?;
    Ok(Json(SuggestionResponse { suggestions }))
}
