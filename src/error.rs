//! # 에러 처리 모듈
//!
//! 애플리케이션에서 발생할 수 있는 모든 에러 타입을 정의합니다.
//! Rust에서는 예외(exception) 대신 `Result<T, E>` 타입으로 에러를 처리합니다.
//!
//! 이 모듈의 핵심:
//! - `AppError` 열거형(enum): 모든 에러 종류를 하나의 타입으로 통합
//! - `ErrorKind`: 호출자가 분기할 때 쓰는 에러 분류 (클라이언트 잘못 / 저장소 / 역색인)
//! - `IntoResponse` 구현: 에러를 HTTP 응답으로 자동 변환

use axum::{
    http::StatusCode,                   // HTTP 상태 코드 (400, 404, 500, 503)
    response::{IntoResponse, Response}, // Axum의 응답 변환 트레이트
    Json,                               // JSON 응답 래퍼
};
use serde_json::json; // json! 매크로: { "error": ... } 본문 생성
use thiserror::Error; // #[derive(Error)]로 Display + std::error::Error 자동 구현

use crate::services::index::IndexError; // 역색인 호출 실패
use crate::services::validation::ValidationError; // 요청 검증 실패

/// 에러의 분류
///
/// 핸들러와 테스트는 메시지 문자열이 아니라 이 값으로 분기합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 잘못된/누락된 입력 (항상 클라이언트 책임, HTTP 400)
    Validation,
    /// 기본 저장소 연결 실패 또는 쿼리 실패 (HTTP 500)
    Storage,
    /// 보조 역색인 서비스 장애 (HTTP 503)
    Index,
    /// 매칭되는 라우트 없음 (HTTP 404)
    NotFound,
}

/// 애플리케이션에서 발생할 수 있는 모든 에러 종류
///
/// 핸들러에서 `Result<T, AppError>`를 반환하면,
/// Axum이 자동으로 `IntoResponse`를 호출하여 HTTP 응답으로 변환합니다.
// #[error("...")]는 variant의 Display 메시지입니다.
// #[from]이 붙은 variant는 `?` 연산자로 원래 에러 타입에서 자동 변환됩니다.
#[derive(Debug, Error)]
pub enum AppError {
    /// 요청 파라미터 검증 실패
    /// #[from]: `?` 연산자로 ValidationError가 자동 변환됩니다.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// 데이터베이스 오류
    /// sqlx 함수의 에러는 `?`로 자동으로 AppError::Storage가 됩니다.
    #[error("Database error: {0}")]
    Storage(#[from] sqlx::Error),

    /// 보조 역색인(자동완성) 서비스 오류
    #[error("Suggestion index error: {0}")]
    Index(#[from] IndexError),

    /// 저장소 계층의 그 밖의 내부 오류 (예: 방금 저장한 행을 다시 읽지 못함)
    #[error("Internal error: {0}")]
    Internal(String),

    /// 매칭되는 라우트 없음
    #[error("Route Not Found")]
    NotFound,
}

impl AppError {
    /// 편의 생성자: 검증 에러를 메시지로 바로 만듭니다.
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(ValidationError::new(message))
    }

    /// 이 에러가 속한 분류를 반환합니다.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Validation(_) => ErrorKind::Validation,
            AppError::Storage(_) | AppError::Internal(_) => ErrorKind::Storage,
            AppError::Index(_) => ErrorKind::Index,
            AppError::NotFound => ErrorKind::NotFound,
        }
    }
}

impl IntoResponse for AppError {
    /// AppError를 HTTP 응답으로 변환합니다.
    ///
    /// 응답 본문은 `{ "error": "메시지" }` 형태입니다.
    /// 내부 에러(Storage, Internal, Index)는 실제 에러 내용을 로그에만 기록하고,
    /// 클라이언트에는 일반적인 메시지만 반환합니다.
    fn into_response(self) -> Response {
        // ref: self를 소비하지 않고 내부 값을 빌려 매칭합니다 (NotFound의 to_string()에 필요).
        let (status, message) = match self {
            AppError::Validation(ref e) => (StatusCode::BAD_REQUEST, e.to_string()),
            AppError::Storage(ref e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Index(ref e) => {
                // 역색인 장애는 기능 저하일 뿐이므로 warn 수준으로 기록합니다.
                tracing::warn!("Suggestion index unavailable: {}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Suggestion service is unavailable".to_string(),
                )
            }
            AppError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
        };

        // (상태 코드, JSON 본문) 튜플도 IntoResponse를 구현합니다.
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_separate_client_and_server_faults() {
        assert_eq!(AppError::validation("bad").kind(), ErrorKind::Validation);
        assert_eq!(
            AppError::Storage(sqlx::Error::PoolTimedOut).kind(),
            ErrorKind::Storage
        );
        assert_eq!(
            AppError::Internal("lost row".into()).kind(),
            ErrorKind::Storage
        );
        assert_eq!(
            AppError::Index(IndexError::Status(502)).kind(),
            ErrorKind::Index
        );
        assert_eq!(AppError::NotFound.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn status_codes_follow_kind() {
        let cases = [
            (AppError::validation("Page should be a whole number"), StatusCode::BAD_REQUEST),
            (AppError::Storage(sqlx::Error::PoolTimedOut), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::Index(IndexError::Status(500)), StatusCode::SERVICE_UNAVAILABLE),
            (AppError::NotFound, StatusCode::NOT_FOUND),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
