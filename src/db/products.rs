//! # 상품 조회/저장 쿼리 모듈
//!
//! `products` 테이블에 대한 삽입, 필터 목록 조회, 자유 텍스트 검색을 구현합니다.
//!
//! ## 두 가지 조회 경로
//! - **목록 조회** (`list_products`): category/tenant 정확 일치 필터
//! - **검색** (`search_products`): 검색어 토큰이 순서대로 나타나는 상품
//!   (`name` 또는 `description`), 여기에 category/tenant 필터를 AND로 추가
//!
//! 두 경로 모두 같은 `fetch_page`를 거치므로 페이지/정렬 의미가 같습니다.
//! 전체 개수(COUNT)와 페이지 조회는 같은 조건으로 **동시에** 실행되고,
//! 둘 중 하나라도 실패하면 부분 결과 없이 전체가 실패합니다.
//! 트랜잭션 스냅샷은 쓰지 않으므로 동시 쓰기가 있으면 `total`과 `results`가
//! 약간 다른 시점을 반영할 수 있습니다.
//!
//! ## 대소문자 무시 비교
//! SQLite 내장 `NOCASE`와 `LIKE`의 대소문자 무시는 ASCII에만 적용되므로, 접힌 값끼리 비교합니다.
//! - category/tenant 필터와 LIKE 검색: 저장 시 채운 `*_folded` 컬럼을 접은 값과 비교
//!   ("PÂTISSERIE" == "Pâtisserie")
//! - 이름 정렬: `CATALOG_CI` 콜레이션 ("Éclair"는 "apple"과 "Zebra" 사이)

use chrono::{SecondsFormat, Utc}; // 생성/수정 시각 (RFC 3339, 밀리초)
use sqlx::{QueryBuilder, Sqlite, SqlitePool}; // QueryBuilder: 조건에 따라 SQL을 조립하고 값은 바인딩

use super::collation::{fold, CATALOG_COLLATION};
use crate::error::AppError;
use crate::models::{NewProduct, PageMeta, Product, QueryParams, ResultPage, SortField};

const PRODUCT_COLUMNS: &str = "p.id, p.name, p.description, p.category, p.tenant, \
     p.price, p.in_stock, p.created_at, p.updated_at";

/// 자유 텍스트 검색 조건
///
/// - `like_pattern`: 접힌(`fold`) 토큰으로 만든 `%tok1%tok2%` 형태. 토큰이 이 순서로 나타나기만 하면 되고
///   붙어 있을 필요는 없습니다. `%`, `_`, `\`는 이스케이프되어 글자 그대로 매칭됩니다.
/// - `fts_query`: 관련도 점수 계산용 FTS5 쿼리 (`"tok1"* OR "tok2"*`).
///   단어 문자가 하나도 없는 검색어면 None입니다.
#[derive(Debug, Clone, PartialEq)]
pub struct TextMatch {
    pub like_pattern: String,
    pub fts_query: Option<String>,
}

impl TextMatch {
    /// 검색어를 공백으로 나눠 매칭 조건을 만듭니다. 토큰이 없으면 None.
    pub fn from_query(q: &str) -> Option<Self> {
        let folded = fold(q);
        let tokens: Vec<&str> = folded.split_whitespace().collect();
        if tokens.is_empty() {
            return None;
        }

        let escaped: Vec<String> = tokens.iter().map(|t| escape_like(t)).collect();
        let like_pattern = format!("%{}%", escaped.join("%"));

        let fts_terms: Vec<String> = tokens
            .iter()
            .filter(|t| t.chars().any(char::is_alphanumeric))
            .map(|t| format!("\"{}\"*", t.replace('"', "\"\"")))
            .collect();
        let fts_query = (!fts_terms.is_empty()).then(|| fts_terms.join(" OR "));

        Some(Self {
            like_pattern,
            fts_query,
        })
    }
}

/// LIKE 와일드카드를 글자 그대로 매칭되도록 이스케이프합니다. (ESCAPE '\')
fn escape_like(token: &str) -> String {
    let mut out = String::with_capacity(token.len());
    for ch in token.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// 목록/검색 공통 WHERE 조건
#[derive(Debug, Clone, Default)]
struct ProductFilter {
    category: Option<String>,
    tenant: Option<String>,
    text: Option<TextMatch>,
}

impl ProductFilter {
    fn from_params(params: &QueryParams) -> Self {
        Self {
            category: params.category.clone(),
            tenant: params.tenant.clone(),
            text: None,
        }
    }

    fn push_where(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        qb.push(" WHERE 1 = 1");
        if let Some(category) = &self.category {
            qb.push(" AND p.category_folded = ").push_bind(fold(category));
        }
        if let Some(tenant) = &self.tenant {
            qb.push(" AND p.tenant_folded = ").push_bind(fold(tenant));
        }
        if let Some(text) = &self.text {
            qb.push(" AND (p.name_folded LIKE ")
                .push_bind(text.like_pattern.clone())
                .push(" ESCAPE '\\' OR p.description_folded LIKE ")
                .push_bind(text.like_pattern.clone())
                .push(" ESCAPE '\\')");
        }
    }

    /// 관련도 정렬에 쓸 FTS5 쿼리 (검색 + 단어가 있는 경우만)
    fn relevance_query(&self) -> Option<&str> {
        self.text.as_ref().and_then(|t| t.fts_query.as_deref())
    }
}

/// 새 상품을 저장하고, 저장된 레코드를 다시 읽어 반환합니다.
///
/// `id`(UUIDv7)와 `created_at`/`updated_at`(UTC, 밀리초)은 여기서 부여합니다.
/// 필터/검색용 `*_folded` 컬럼도 여기서 채웁니다.
/// FTS 인덱스는 마이그레이션의 트리거가 함께 갱신합니다.
pub async fn insert_product(pool: &SqlitePool, product: &NewProduct) -> Result<Product, AppError> {
    let id = uuid::Uuid::now_v7().to_string(); // 시간순 정렬 가능한 UUID
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

    sqlx::query(
        r#"
        INSERT INTO products
            (id, name, description, category, tenant, price, in_stock, created_at, updated_at,
             name_folded, description_folded, category_folded, tenant_folded)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&product.name)
    .bind(&product.description)
    .bind(&product.category)
    .bind(&product.tenant)
    .bind(product.price)
    .bind(product.in_stock)
    .bind(&now)
    .bind(&now)
    .bind(fold(&product.name))
    .bind(fold(&product.description))
    .bind(fold(&product.category))
    .bind(fold(&product.tenant))
    .execute(pool)
    .await?;

    get_product(pool, &id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created product".to_string()))
}

/// ID로 단일 상품을 조회합니다.
pub async fn get_product(pool: &SqlitePool, id: &str) -> Result<Option<Product>, AppError> {
    let product = sqlx::query_as::<_, Product>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products p WHERE p.id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(product)
}

/// 필터 목록 조회 (`GET /products`)
pub async fn list_products(
    pool: &SqlitePool,
    params: &QueryParams,
) -> Result<ResultPage<Product>, AppError> {
    let filter = ProductFilter::from_params(params);
    fetch_page(pool, &filter, params).await
}

/// 자유 텍스트 검색 (`GET /products/search`)
///
/// `params.q`가 없거나 공백뿐이면 저장소에 접근하지 않고 검증 에러를 반환합니다.
pub async fn search_products(
    pool: &SqlitePool,
    params: &QueryParams,
) -> Result<ResultPage<Product>, AppError> {
    let text = params
        .q
        .as_deref()
        .and_then(TextMatch::from_query)
        .ok_or_else(|| AppError::validation("Search query (q) is required"))?;

    let filter = ProductFilter {
        text: Some(text),
        ..ProductFilter::from_params(params)
    };
    fetch_page(pool, &filter, params).await
}

/// COUNT와 페이지 조회를 동시에 실행해 `ResultPage`를 만듭니다.
async fn fetch_page(
    pool: &SqlitePool,
    filter: &ProductFilter,
    params: &QueryParams,
) -> Result<ResultPage<Product>, AppError> {
    let count = async {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM products p");
        filter.push_where(&mut qb);
        qb.build_query_scalar::<i64>().fetch_one(pool).await
    };

    let rows = async {
        let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {PRODUCT_COLUMNS} FROM products p"));

        // 관련도 정렬일 때만 FTS5 점수를 붙입니다. 매칭되지 않은 행은 점수 0.
        let relevance = match (params.sort_by, filter.relevance_query()) {
            (SortField::Score, Some(fts_query)) => {
                qb.push(
                    " LEFT JOIN (SELECT rowid AS doc_rowid, -bm25(products_fts) AS relevance \
                     FROM products_fts WHERE products_fts MATCH ",
                )
                .push_bind(fts_query.to_string())
                .push(") s ON s.doc_rowid = p.rowid");
                true
            }
            _ => false,
        };

        filter.push_where(&mut qb);

        let direction = params.order.as_sql();
        let sort_expr = match params.sort_by {
            SortField::Name => format!("p.name COLLATE {CATALOG_COLLATION}"),
            SortField::Price => "p.price".to_string(),
            SortField::CreatedAt => "p.created_at".to_string(),
            SortField::Score if relevance => "COALESCE(s.relevance, 0.0)".to_string(),
            // 검색어가 없으면 관련도가 정의되지 않으므로 생성 시각으로 정렬합니다.
            SortField::Score => "p.created_at".to_string(),
        };
        qb.push(format!(" ORDER BY {sort_expr} {direction}, p.rowid {direction}"));

        qb.push(" LIMIT ")
            .push_bind(i64::from(params.limit))
            .push(" OFFSET ")
            .push_bind(params.offset());

        qb.build_query_as::<Product>().fetch_all(pool).await
    };

    // try_join!: 두 future를 동시에 실행하고, 하나라도 Err면 즉시 그 에러를 반환합니다.
    let (total, results) = tokio::try_join!(count, rows)?;

    Ok(ResultPage {
        meta: PageMeta::new(total.max(0) as u64, params.page, params.limit),
        results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::error::ErrorKind;
    use crate::models::SortOrder;

    async fn pool() -> SqlitePool {
        let pool = db::memory_pool().await.unwrap();
        db::migrate(&pool).await.unwrap();
        pool
    }

    fn product(name: &str, description: &str, category: &str, tenant: &str, price: f64) -> NewProduct {
        NewProduct {
            name: name.into(),
            description: description.into(),
            category: category.into(),
            tenant: tenant.into(),
            price,
            in_stock: true,
        }
    }

    async fn seed(pool: &SqlitePool, items: &[NewProduct]) {
        for item in items {
            insert_product(pool, item).await.unwrap();
        }
    }

    fn names(page: &ResultPage<Product>) -> Vec<&str> {
        page.results.iter().map(|p| p.name.as_str()).collect()
    }

    fn search_params(q: &str) -> QueryParams {
        QueryParams {
            q: Some(q.into()),
            ..QueryParams::default()
        }
    }

    #[test]
    fn like_pattern_keeps_token_order() {
        let text = TextMatch::from_query("  red   shoe ").unwrap();
        assert_eq!(text.like_pattern, "%red%shoe%");
        assert_eq!(text.fts_query.as_deref(), Some("\"red\"* OR \"shoe\"*"));
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        let text = TextMatch::from_query("50% off_x a\\b").unwrap();
        assert_eq!(text.like_pattern, "%50\\%%off\\_x%a\\\\b%");
    }

    #[test]
    fn punctuation_only_query_has_no_fts_terms() {
        let text = TextMatch::from_query("- ..").unwrap();
        assert_eq!(text.fts_query, None);
        assert!(TextMatch::from_query("   ").is_none());
    }

    #[tokio::test]
    async fn insert_assigns_id_and_timestamps() {
        let pool = pool().await;
        let created = insert_product(&pool, &product("Widget", "", "Tools", "Acme", 9.99))
            .await
            .unwrap();
        assert!(!created.id.is_empty());
        assert!(created.in_stock);
        assert_eq!(created.created_at, created.updated_at);
        assert_eq!(get_product(&pool, &created.id).await.unwrap(), Some(created));
    }

    #[tokio::test]
    async fn pagination_math() {
        let pool = pool().await;
        let items: Vec<NewProduct> = (0..23)
            .map(|i| product(&format!("Item {i:02}"), "", "Tools", "Acme", f64::from(i)))
            .collect();
        seed(&pool, &items).await;

        let mut params = QueryParams {
            limit: 10,
            ..QueryParams::default()
        };
        let mut seen = Vec::new();
        for (page, expected) in [(1, 10), (2, 10), (3, 3), (4, 0)] {
            params.page = page;
            let result = list_products(&pool, &params).await.unwrap();
            assert_eq!(result.results.len(), expected);
            assert_eq!(result.meta.total, 23);
            assert_eq!(result.meta.total_pages, 3);
            assert_eq!(result.meta.page, page);
            assert_eq!(result.meta.limit, 10);
            seen.extend(result.results.into_iter().map(|p| p.id));
        }
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 23);
    }

    #[tokio::test]
    async fn filters_are_case_insensitive_equality() {
        let pool = pool().await;
        seed(
            &pool,
            &[
                product("Hammer", "", "Tools", "Acme", 10.0),
                product("Wrench", "", "Tools", "Globex", 12.0),
                product("Novel", "", "Books", "Acme", 8.0),
                product("Toolset", "", "Tools Deluxe", "Acme", 80.0),
            ],
        )
        .await;

        let params = QueryParams {
            category: Some("tools".into()),
            ..QueryParams::default()
        };
        let result = list_products(&pool, &params).await.unwrap();
        assert_eq!(result.meta.total, 2);

        let params = QueryParams {
            category: Some("Tools".into()),
            tenant: Some("Acme".into()),
            ..QueryParams::default()
        };
        let result = list_products(&pool, &params).await.unwrap();
        assert_eq!(names(&result), vec!["Hammer"]);
    }

    #[tokio::test]
    async fn name_sort_ignores_case() {
        let pool = pool().await;
        seed(
            &pool,
            &[
                product("banana", "", "Fruit", "Acme", 1.0),
                product("Apple", "", "Fruit", "Acme", 1.0),
                product("cherry", "", "Fruit", "Acme", 1.0),
                product("apple", "", "Fruit", "Acme", 1.0),
            ],
        )
        .await;

        let params = QueryParams {
            sort_by: SortField::Name,
            order: SortOrder::Asc,
            ..QueryParams::default()
        };
        let result = list_products(&pool, &params).await.unwrap();
        let sorted = names(&result);
        assert_eq!(sorted[0].to_lowercase(), "apple");
        assert_eq!(sorted[1].to_lowercase(), "apple");
        assert_eq!(&sorted[2..], &["banana", "cherry"]);
    }

    #[tokio::test]
    async fn price_sort_both_directions() {
        let pool = pool().await;
        seed(
            &pool,
            &[
                product("Mid", "", "Tools", "Acme", 20.0),
                product("Low", "", "Tools", "Acme", 5.0),
                product("High", "", "Tools", "Acme", 99.5),
            ],
        )
        .await;

        let mut params = QueryParams {
            sort_by: SortField::Price,
            order: SortOrder::Asc,
            ..QueryParams::default()
        };
        assert_eq!(names(&list_products(&pool, &params).await.unwrap()), vec!["Low", "Mid", "High"]);

        params.order = SortOrder::Desc;
        assert_eq!(names(&list_products(&pool, &params).await.unwrap()), vec!["High", "Mid", "Low"]);
    }

    #[tokio::test]
    async fn default_order_is_newest_first() {
        let pool = pool().await;
        seed(
            &pool,
            &[
                product("First", "", "Tools", "Acme", 1.0),
                product("Second", "", "Tools", "Acme", 1.0),
                product("Third", "", "Tools", "Acme", 1.0),
            ],
        )
        .await;

        let result = list_products(&pool, &QueryParams::default()).await.unwrap();
        assert_eq!(names(&result), vec!["Third", "Second", "First"]);
    }

    #[tokio::test]
    async fn repeated_listing_is_identical() {
        let pool = pool().await;
        let items: Vec<NewProduct> = (0..12)
            .map(|i| product(&format!("Same {}", i % 3), "", "Tools", "Acme", 1.0))
            .collect();
        seed(&pool, &items).await;

        let params = QueryParams {
            page: 2,
            limit: 5,
            sort_by: SortField::Name,
            ..QueryParams::default()
        };
        let first = list_products(&pool, &params).await.unwrap();
        let second = list_products(&pool, &params).await.unwrap();
        assert_eq!(first, second);
    }

    async fn seed_pastries(pool: &SqlitePool) {
        seed(
            pool,
            &[
                product("éclair", "", "Pâtisserie", "Boulangerie Émile", 3.0),
                product("Zebra", "striped cake", "Pâtisserie", "Boulangerie Émile", 4.0),
                product("Éclair", "au chocolat", "Pâtisserie", "Boulangerie Émile", 3.5),
                product("apple", "tarte", "Pâtisserie", "Boulangerie Émile", 2.0),
            ],
        )
        .await;
    }

    #[tokio::test]
    async fn name_sort_places_accented_letters_with_base_letter() {
        let pool = pool().await;
        seed_pastries(&pool).await;

        let params = QueryParams {
            sort_by: SortField::Name,
            order: SortOrder::Asc,
            ..QueryParams::default()
        };
        let result = list_products(&pool, &params).await.unwrap();
        assert_eq!(names(&result), vec!["apple", "éclair", "Éclair", "Zebra"]);
    }

    #[tokio::test]
    async fn filters_fold_non_ascii_case() {
        let pool = pool().await;
        seed_pastries(&pool).await;

        let params = QueryParams {
            category: Some("PÂTISSERIE".into()),
            tenant: Some("boulangerie émile".into()),
            ..QueryParams::default()
        };
        let result = list_products(&pool, &params).await.unwrap();
        assert_eq!(result.meta.total, 4);

        // 악센트는 다른 글자로 취급합니다.
        let params = QueryParams {
            category: Some("Patisserie".into()),
            ..QueryParams::default()
        };
        assert_eq!(list_products(&pool, &params).await.unwrap().meta.total, 0);
    }

    #[tokio::test]
    async fn search_folds_non_ascii_case() {
        let pool = pool().await;
        seed_pastries(&pool).await;

        let result = search_products(&pool, &search_params("ÉCLAIR")).await.unwrap();
        assert_eq!(result.meta.total, 2);

        let result = search_products(&pool, &search_params("AU CHOCOLAT")).await.unwrap();
        assert_eq!(names(&result), vec!["Éclair"]);
    }

    #[tokio::test]
    async fn search_tokens_in_order_not_adjacent() {
        let pool = pool().await;
        seed(
            &pool,
            &[
                product("red running shoe", "", "Shoes", "Acme", 50.0),
                product("Red leather shoe", "", "Shoes", "Acme", 70.0),
                product("Shoe polish", "keeps red leather shiny", "Care", "Acme", 5.0),
                product("Blue shoe", "", "Shoes", "Acme", 40.0),
                product("Trainer", "A RED canvas SHOE for kids", "Shoes", "Globex", 30.0),
            ],
        )
        .await;

        let result = search_products(&pool, &search_params("red shoe")).await.unwrap();
        let mut found = names(&result);
        found.sort();
        assert_eq!(found, vec!["Red leather shoe", "Trainer", "red running shoe"]);
        assert_eq!(result.meta.total, 3);
    }

    #[tokio::test]
    async fn search_applies_filters() {
        let pool = pool().await;
        seed(
            &pool,
            &[
                product("Red shoe", "", "Shoes", "Acme", 50.0),
                product("Red shoe", "", "Shoes", "Globex", 55.0),
                product("Red shoe box", "", "Storage", "Acme", 5.0),
            ],
        )
        .await;

        let params = QueryParams {
            category: Some("Shoes".into()),
            tenant: Some("Globex".into()),
            ..search_params("red shoe")
        };
        let result = search_products(&pool, &params).await.unwrap();
        assert_eq!(result.meta.total, 1);
        assert_eq!(result.results[0].tenant, "Globex");
    }

    #[tokio::test]
    async fn search_matches_wildcards_literally() {
        let pool = pool().await;
        seed(
            &pool,
            &[
                product("50% off hat", "", "Hats", "Acme", 10.0),
                product("500 hats", "", "Hats", "Acme", 10.0),
            ],
        )
        .await;

        let result = search_products(&pool, &search_params("50%")).await.unwrap();
        assert_eq!(names(&result), vec!["50% off hat"]);
    }

    #[tokio::test]
    async fn relevance_sort_puts_best_match_first() {
        let pool = pool().await;
        let mut items = vec![
            product("Boot", "a red boot that is not a shoe", "Shoes", "Acme", 1.0),
            product("Red Shoe", "red shoe with red laces, the reddest red shoe", "Shoes", "Acme", 1.0),
        ];
        // 관련 없는 문서를 섞어 IDF가 양수가 되도록 합니다.
        for i in 0..6 {
            items.push(product(&format!("Lamp {i}"), "warm light for the desk", "Home", "Acme", 1.0));
        }
        seed(&pool, &items).await;

        let params = QueryParams {
            sort_by: SortField::Score,
            order: SortOrder::Desc,
            ..search_params("red shoe")
        };
        let result = search_products(&pool, &params).await.unwrap();
        assert_eq!(result.meta.total, 2);
        assert_eq!(result.results[0].name, "Red Shoe");
    }

    #[tokio::test]
    async fn score_sort_without_query_falls_back_to_creation_time() {
        let pool = pool().await;
        seed(
            &pool,
            &[
                product("Old", "", "Tools", "Acme", 1.0),
                product("New", "", "Tools", "Acme", 1.0),
            ],
        )
        .await;

        let params = QueryParams {
            sort_by: SortField::Score,
            ..QueryParams::default()
        };
        let result = list_products(&pool, &params).await.unwrap();
        assert_eq!(names(&result), vec!["New", "Old"]);
    }

    #[tokio::test]
    async fn punctuation_search_with_score_sort_does_not_fail() {
        let pool = pool().await;
        seed(&pool, &[product("A - B", "", "Misc", "Acme", 1.0)]).await;

        let params = QueryParams {
            sort_by: SortField::Score,
            ..search_params("-")
        };
        let result = search_products(&pool, &params).await.unwrap();
        assert_eq!(result.meta.total, 1);
    }

    #[tokio::test]
    async fn search_without_q_is_a_validation_fault() {
        let pool = pool().await;
        let err = search_products(&pool, &QueryParams::default()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = search_products(&pool, &search_params("   ")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn closed_store_is_a_storage_fault() {
        let pool = pool().await;
        pool.close().await;
        let err = list_products(&pool, &QueryParams::default()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Storage);
    }
}
