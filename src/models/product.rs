use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 기본 저장소(products 테이블)의 상품 레코드
///
/// JSON으로는 camelCase(`inStock`, `createdAt`)로 직렬화됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    /// 판매처. 인증 개념이 아니라 정확 일치 필터용 값입니다.
    pub tenant: String,
    pub price: f64,
    pub in_stock: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// `POST /products` 요청 본문
///
/// 타입이 틀린 값(예: 숫자 이름)도 검증 단계에서 사람이 읽을 수 있는
/// 메시지로 거절하기 위해 각 필드를 원시 JSON 값으로 받습니다.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateProductRequest {
    pub name: Option<Value>,
    pub description: Option<Value>,
    pub category: Option<Value>,
    pub tenant: Option<Value>,
    pub price: Option<Value>,
    pub in_stock: Option<Value>,
}

/// 검증을 통과한 새 상품 데이터
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub category: String,
    pub tenant: String,
    pub price: f64,
    pub in_stock: bool,
}
