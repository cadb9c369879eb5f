//! # 데이터베이스 접근 계층 (Data Access Layer)
//!
//! 기본 상품 저장소(SQLite)와 직접 상호작용하는 함수들을 모아둔 모듈입니다.
//! 라우트 핸들러(routes/)에서 이 모듈의 함수를 호출하여 DB 작업을 수행합니다.
//!
//! 하위 모듈:
//! - `products`: 상품 저장, 필터 목록 조회, 자유 텍스트 검색
//! - `collation`: 유니코드 대소문자 무시 비교 (접힌 컬럼 값, 이름 정렬 콜레이션)
//!
//! 풀의 모든 연결에는 `CATALOG_CI` 콜레이션이 등록됩니다.
//! 이 모듈의 함수를 거치지 않고 만든 풀에서는 이름 정렬 쿼리가 실패합니다.

pub mod collation;
pub mod products;

// `crate::db::list_products`처럼 바로 접근할 수 있게 재공개합니다.
pub use products::*;

use std::str::FromStr; // 문자열 URL → SqliteConnectOptions 변환

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

/// URL에서 연결 옵션을 만들고 카탈로그 콜레이션을 등록합니다.
fn connect_options(database_url: &str) -> Result<SqliteConnectOptions, sqlx::Error> {
    Ok(SqliteConnectOptions::from_str(database_url)?
        .collation(collation::CATALOG_COLLATION, collation::compare))
}

/// 파일 기반 SQLite 연결 풀을 만듭니다.
///
/// 파일이 없을 때 자동으로 만들려면 URL에 `?mode=rwc`를 붙입니다.
/// (예: `sqlite:data/catalog.db?mode=rwc`)
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(connect_options(database_url)?)
        .await
}

/// 인메모리 SQLite 풀 (테스트/로컬 실험용)
///
/// 인메모리 DB는 연결마다 따로 생기므로 연결을 하나로 고정하고,
/// 유휴 연결이 닫혀 데이터가 사라지지 않도록 만료를 끕니다.
pub async fn memory_pool() -> Result<SqlitePool, sqlx::Error> {
    SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(connect_options("sqlite::memory:")?)
        .await
}

/// `./migrations`의 스키마(상품 테이블, FTS5 인덱스, 동기화 트리거)를 적용합니다.
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
