//! # 애플리케이션 설정(Configuration) 모듈
//!
//! 환경변수에서 서버 설정값을 읽어오는 모듈입니다.
//! `.env` 파일이나 시스템 환경변수에서 값을 가져옵니다.
//!
//! 설정 항목:
//! - `DATABASE_URL`: SQLite 데이터베이스 경로 (기본 상품 저장소)
//! - `ELASTICSEARCH_URL`: 자동완성용 보조 역색인 서비스 주소 (기본값: http://localhost:9200)
//! - `ELASTICSEARCH_INDEX`: 역색인 이름
//! - `ELASTICSEARCH_TIMEOUT_MS`: 역색인 요청 타임아웃(밀리초)
//! - `HOST`: 서버 바인딩 주소
//! - `PORT`: 서버 포트 번호

use std::env;           // 환경변수 읽기
use std::time::Duration; // 역색인 타임아웃 표현

/// 기본 역색인 서비스 주소
///
/// 역색인은 best-effort이므로 주소가 없어도 서버는 뜨고, 추천어만 503이 됩니다.
pub const DEFAULT_INDEX_URL: &str = "http://localhost:9200";

/// 기본 역색인 이름
pub const DEFAULT_INDEX_NAME: &str = "products";

/// 역색인 요청의 기본 타임아웃 (10초)
pub const DEFAULT_INDEX_TIMEOUT_MS: u64 = 10_000;

/// 애플리케이션 전체 설정을 담는 구조체
///
/// 서버 시작 시 환경변수에서 한 번 읽어온 후,
/// 필요한 컴포넌트(저장소 풀, 역색인 클라이언트)를 만드는 데 사용됩니다.
/// 전역 싱글턴 대신 이 값을 명시적으로 전달합니다.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite 데이터베이스 URL (예: "sqlite:data/catalog.db?mode=rwc")
    pub database_url: String,
    /// 역색인 서비스 기본 URL (예: "http://localhost:9200")
    pub elasticsearch_url: String,
    /// 추천어를 조회할 인덱스 이름 (기본값: "products")
    pub elasticsearch_index: String,
    /// 역색인 요청 타임아웃
    pub elasticsearch_timeout: Duration,
    /// 서버가 바인딩할 호스트 주소 (기본값: "0.0.0.0")
    pub host: String,
    /// 서버 포트 번호 (기본값: 3000)
    pub port: u16,
}

impl Config {
    /// 환경변수에서 설정값을 읽어 Config 인스턴스를 생성합니다.
    ///
    /// # 에러
    /// `DATABASE_URL`만 필수이며, 없으면 에러가 발생합니다.
    /// 나머지 설정은 기본값이 있어 환경변수가 없어도 동작합니다.
    pub fn from_env() -> Result<Self, env::VarError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 키 → 값 조회 함수로 설정을 만듭니다. (`from_env`는 프로세스 환경변수를 넘깁니다)
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, env::VarError> {
        Ok(Self {
            database_url: var("DATABASE_URL").ok_or(env::VarError::NotPresent)?,
            elasticsearch_url: var("ELASTICSEARCH_URL")
                .unwrap_or_else(|| DEFAULT_INDEX_URL.to_string()),

            elasticsearch_index: var("ELASTICSEARCH_INDEX")
                .unwrap_or_else(|| DEFAULT_INDEX_NAME.to_string()),

            // 숫자로 파싱할 수 없으면 기본값을 사용합니다.
            elasticsearch_timeout: Duration::from_millis(
                var("ELASTICSEARCH_TIMEOUT_MS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_INDEX_TIMEOUT_MS),
            ),

            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: var("PORT").and_then(|v| v.parse().ok()).unwrap_or(3000),
        })
    }
}
