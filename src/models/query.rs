//! 목록/검색 요청 파라미터와 페이지 응답 구조체

use serde::{Deserialize, Serialize};

/// 페이지 번호 기본값
pub const DEFAULT_PAGE: u32 = 1;

/// 페이지 크기 기본값
pub const DEFAULT_PAGE_LIMIT: u32 = 10;

/// URL 쿼리 문자열 그대로의 요청 파라미터
///
/// 모든 필드가 `Option<String>`이므로 axum의 `Query` 추출 단계에서는
/// 절대 실패하지 않고, 검증은 `services::validation`이 한 곳에서 담당합니다.
/// 클라이언트(`client::api`)도 같은 구조체를 쿼리 문자열로 직렬화해 보냅니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
}

impl ProductQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn q(mut self, q: impl Into<String>) -> Self {
        self.q = Some(q.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page.to_string());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit.to_string());
        self
    }

    pub fn sort(mut self, sort_by: SortField, order: SortOrder) -> Self {
        self.sort_by = Some(sort_by.as_str().to_string());
        self.order = Some(order.as_str().to_string());
        self
    }
}

/// 정렬 가능한 필드 (와이어 값: `price`, `name`, `createdAt`, `score`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortField {
    #[serde(rename = "price")]
    Price,
    #[serde(rename = "name")]
    Name,
    #[serde(rename = "createdAt")]
    CreatedAt,
    /// 전문검색 관련도 점수. 검색에서만 의미가 있습니다.
    #[serde(rename = "score")]
    Score,
}

impl SortField {
    pub const ALL: [SortField; 4] = [
        SortField::Price,
        SortField::Name,
        SortField::CreatedAt,
        SortField::Score,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortField::Price => "price",
            SortField::Name => "name",
            SortField::CreatedAt => "createdAt",
            SortField::Score => "score",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.as_str() == raw)
    }
}

/// 정렬 방향
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    /// SQL `ORDER BY` 키워드
    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// 검증과 기본값 적용이 끝난 요청 파라미터
///
/// 목록 조회와 검색이 같은 구조체를 공유하므로 페이지/정렬 의미가 어긋나지 않습니다.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParams {
    /// 검색어 (목록 조회에서는 항상 None)
    pub q: Option<String>,
    pub category: Option<String>,
    pub tenant: Option<String>,
    /// 1부터 시작하는 페이지 번호
    pub page: u32,
    pub limit: u32,
    pub sort_by: SortField,
    pub order: SortOrder,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            q: None,
            category: None,
            tenant: None,
            page: DEFAULT_PAGE,
            limit: DEFAULT_PAGE_LIMIT,
            sort_by: SortField::CreatedAt,
            order: SortOrder::Desc,
        }
    }
}

impl QueryParams {
    /// 건너뛸 행 수: `(page - 1) * limit`
    pub fn offset(&self) -> i64 {
        let skip = u64::from(self.page.saturating_sub(1)) * u64::from(self.limit);
        i64::try_from(skip).unwrap_or(i64::MAX)
    }
}

/// 페이지 응답의 메타데이터
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    /// 필터에 매칭되는 전체 레코드 수 (skip/limit과 무관)
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    /// `ceil(total / limit)`
    pub total_pages: u64,
}

impl PageMeta {
    pub fn new(total: u64, page: u32, limit: u32) -> Self {
        let total_pages = if limit == 0 {
            0
        } else {
            total.div_ceil(u64::from(limit))
        };
        Self {
            total,
            page,
            limit,
            total_pages,
        }
    }
}

/// `{ meta, results }` 형태의 페이지 응답
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultPage<T> {
    pub meta: PageMeta,
    pub results: Vec<T>,
}

/// `GET /products/suggestions` 응답
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionResponse {
    #[serde(default)]
    pub suggestions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(PageMeta::new(0, 1, 10).total_pages, 0);
        assert_eq!(PageMeta::new(1, 1, 10).total_pages, 1);
        assert_eq!(PageMeta::new(10, 1, 10).total_pages, 1);
        assert_eq!(PageMeta::new(11, 1, 10).total_pages, 2);
        assert_eq!(PageMeta::new(2500, 3, 7).total_pages, 358);
    }

    #[test]
    fn offset_is_zero_based() {
        let mut params = QueryParams::default();
        assert_eq!(params.offset(), 0);
        params.page = 3;
        params.limit = 25;
        assert_eq!(params.offset(), 50);
    }

    #[test]
    fn query_serializes_only_present_fields() {
        let query = ProductQuery::new()
            .category("Tools")
            .page(2)
            .sort(SortField::CreatedAt, SortOrder::Asc);
        let value = serde_json::to_value(&query).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "category": "Tools",
                "page": "2",
                "sortBy": "createdAt",
                "order": "asc"
            })
        );
    }
}
