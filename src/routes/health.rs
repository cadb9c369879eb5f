//! # 헬스체크(Health Check) 핸들러
//!
//! - `GET /health` → `{ "status": "OK", "message": "Server is healthy" }`
//!
//! 로드밸런서나 컨테이너 오케스트레이터의 상태 확인용입니다.

use axum::Json;                // JSON 응답 래퍼
use serde_json::{json, Value}; // JSON 생성 유틸리티

/// `GET /health` — 서버 상태를 확인합니다.
///
/// 저장소나 역색인에 접근하지 않으므로 이 핸들러는 실패하지 않습니다.
pub async fn health_check() -> Json<Value> {
    // 반환 타입이 Json<Value>이므로 Content-Type: application/json, 200 OK
    Json(json!({
        "status": "OK",
        "message": "Server is healthy"
    }))
}
