//! # 요청 검증(Request Validation) 서비스
//!
//! 문자열로 들어오거나 아예 없을 수도 있는 원시 입력값을
//! 타입이 정해진, 제약을 만족하는 값으로 바꾸는 순수 함수 모음입니다.
//!
//! - 목록 조회, 검색, 추천어, 상품 생성 경로가 모두 이 모듈을 공유합니다.
//! - 부작용이 없으며, 실패는 항상 `ValidationError`로 돌아옵니다.
//!   핸들러는 이 에러를 저장소 에러와 구분해 HTTP 400으로 응답합니다.
//! - 기본값 적용(page=1, limit=10, sortBy=createdAt, order=desc)도 여기 한 곳에서만 합니다.

use serde_json::Value;
use thiserror::Error;

use crate::models::{
    CreateProductRequest, NewProduct, ProductQuery, QueryParams, SortField, SortOrder,
    DEFAULT_PAGE, DEFAULT_PAGE_LIMIT,
};

/// 사람이 읽을 수 있는 사유를 담은 검증 실패
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

type Validated<T> = Result<T, ValidationError>;

// ── 기본 검증 함수 ──

/// 문자열 값을 검증하고 앞뒤 공백을 제거해 반환합니다.
///
/// 값이 없거나 빈 문자열이면 "You must provide a ..." 에러,
/// 공백만 있으면 "... cannot be an empty string or just spaces" 에러입니다.
pub fn valid_string(value: Option<&str>, label: &str) -> Validated<String> {
    let value = match value {
        Some(v) if !v.is_empty() => v,
        _ => return Err(ValidationError::new(format!("You must provide a {label}"))),
    };

    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(format!(
            "{label} cannot be an empty string or just spaces"
        )));
    }
    Ok(trimmed.to_string())
}

/// JSON 본문의 문자열 필드를 검증합니다. 문자열이 아닌 타입은 거절합니다.
pub fn valid_json_string(value: Option<&Value>, label: &str) -> Validated<String> {
    match value {
        None => valid_string(None, label),
        Some(v) if !is_truthy(v) => valid_string(None, label),
        Some(Value::String(s)) => valid_string(Some(s), label),
        Some(_) => Err(ValidationError::new(format!(
            "{label} should be of type string"
        ))),
    }
}

/// 유한한 숫자인지 확인합니다 (NaN, ±무한대는 거절).
pub fn valid_number(value: f64, label: &str) -> Validated<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValidationError::new(format!("{label} should be a valid number")))
    }
}

/// 문자열을 숫자로 해석합니다. 해석할 수 없으면 "valid number" 에러입니다.
pub fn parse_number(raw: &str, label: &str) -> Validated<f64> {
    let parsed = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| ValidationError::new(format!("{label} should be a valid number")))?;
    valid_number(parsed, label)
}

/// 0 이상의 정수(whole number)인지 검증합니다.
///
/// 소수나 음수는 "whole number" 에러, 숫자가 아니면 "valid number" 에러입니다.
/// `1e2`처럼 지수 표기된 정수도 허용합니다.
pub fn valid_whole_number(raw: &str, label: &str) -> Validated<u32> {
    let number = parse_number(raw, label)?;
    if number.fract() != 0.0 || number < 0.0 {
        return Err(ValidationError::new(format!(
            "{label} should be a whole number"
        )));
    }
    if number > f64::from(u32::MAX) {
        return Err(ValidationError::new(format!("{label} is too large")));
    }
    Ok(number as u32)
}

/// 허용된 정렬 필드(price, name, createdAt, score)인지 검증합니다.
pub fn valid_sort_field(raw: &str, label: &str) -> Validated<SortField> {
    SortField::parse(raw).ok_or_else(|| {
        let allowed: Vec<&str> = SortField::ALL.iter().map(|f| f.as_str()).collect();
        ValidationError::new(format!("{label} must be one of: {}", allowed.join(", ")))
    })
}

/// 정렬 방향(asc, desc)을 대소문자 구분 없이 검증합니다.
pub fn valid_sort_order(raw: &str, label: &str) -> Validated<SortOrder> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "asc" => Ok(SortOrder::Asc),
        "desc" => Ok(SortOrder::Desc),
        _ => Err(ValidationError::new(format!("{label} must be one of: asc, desc"))),
    }
}

/// JSON 값의 참/거짓 판정 (null, false, 0, NaN, 빈 문자열만 거짓)
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

// ── 요청 단위 검증 ──

/// 쿼리 문자열의 빈 값(`?category=`)은 생략된 것으로 봅니다.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// `GET /products` 파라미터를 검증하고 기본값을 적용합니다.
pub fn validate_listing(raw: &ProductQuery) -> Validated<QueryParams> {
    resolve_params(raw, None)
}

/// `GET /products/search` 파라미터를 검증합니다. 검색어 `q`는 필수입니다.
pub fn validate_search(raw: &ProductQuery) -> Validated<QueryParams> {
    let q = present(&raw.q)
        .ok_or_else(|| ValidationError::new("Search query (q) is required"))?;
    let q = valid_string(Some(q), "Search text")?;
    resolve_params(raw, Some(q))
}

/// `GET /products/suggestions`의 검색어를 검증합니다.
pub fn validate_suggestion_query(q: Option<&str>) -> Validated<String> {
    valid_string(q, "Query")
}

/// 목록과 검색이 공유하는 필터/페이지/정렬 파라미터 처리
fn resolve_params(raw: &ProductQuery, q: Option<String>) -> Validated<QueryParams> {
    let category = present(&raw.category)
        .map(|c| valid_string(Some(c), "Category"))
        .transpose()?;
    let tenant = present(&raw.tenant)
        .map(|t| valid_string(Some(t), "Tenant"))
        .transpose()?;

    // 0은 "지정 안 함"으로 보고 기본값을 씁니다.
    let page = match present(&raw.page) {
        Some(p) => match valid_whole_number(p, "Page")? {
            0 => DEFAULT_PAGE,
            n => n,
        },
        None => DEFAULT_PAGE,
    };
    let limit = match present(&raw.limit) {
        Some(l) => match valid_whole_number(l, "Limit")? {
            0 => DEFAULT_PAGE_LIMIT,
            n => n,
        },
        None => DEFAULT_PAGE_LIMIT,
    };

    let sort_by = present(&raw.sort_by)
        .map(|s| valid_sort_field(s, "Sort By"))
        .transpose()?
        .unwrap_or(SortField::CreatedAt);
    let order = present(&raw.order)
        .map(|o| valid_sort_order(o, "Order"))
        .transpose()?
        .unwrap_or(SortOrder::Desc);

    Ok(QueryParams {
        q,
        category,
        tenant,
        page,
        limit,
        sort_by,
        order,
    })
}

/// `POST /products` 본문을 검증합니다.
///
/// - `description`은 없거나 거짓 값이면 빈 문자열
/// - `price`는 JSON 숫자 또는 숫자 문자열이며 0 이상이어야 함
/// - `inStock`은 참/거짓 판정으로 변환하고, 없으면 true
pub fn validate_new_product(req: &CreateProductRequest) -> Validated<NewProduct> {
    let name = valid_json_string(req.name.as_ref(), "Product name")?;
    let description = match req.description.as_ref() {
        Some(v) if is_truthy(v) => valid_json_string(Some(v), "Description")?,
        _ => String::new(),
    };
    let category = valid_json_string(req.category.as_ref(), "Category")?;
    let tenant = valid_json_string(req.tenant.as_ref(), "Tenant")?;

    let price = match req.price.as_ref() {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => parse_number(s, "Price")?,
        _ => f64::NAN,
    };
    let price = valid_number(price, "Price")?;
    if price < 0.0 {
        return Err(ValidationError::new("Price cannot be negative"));
    }

    let in_stock = req.in_stock.as_ref().map(is_truthy).unwrap_or(true);

    Ok(NewProduct {
        name,
        description,
        category,
        tenant,
        price,
        in_stock,
    })
}
