//! # 카탈로그 웹 서버 진입점
//!
//! 이 파일이 수행하는 작업:
//! 1. 환경변수(.env) 로딩
//! 2. 로깅(tracing) 초기화
//! 3. SQLite 데이터베이스 연결 풀 생성
//! 4. 데이터베이스 마이그레이션 실행 (상품 테이블 + FTS5 인덱스)
//! 5. 역색인(Elasticsearch) 클라이언트 생성 및 인덱스 확인
//! 6. API 라우터 설정
//! 7. HTTP 서버 시작

use std::sync::Arc; // 역색인 클라이언트를 트레이트 객체로 공유

use anyhow::Result; // main 함수의 범용 에러 타입
use catalog::{
    config::Config,
    db,
    routes::{self, AppState},
    services::{ElasticsearchIndex, SuggestionService},
};
use tower_http::{
    cors::{Any, CorsLayer}, // CORS 미들웨어
    trace::TraceLayer,      // HTTP 요청/응답 로깅 미들웨어
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt}; // .with(), .init() 메서드

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1단계: 환경변수 로딩 ──
    // .env 파일이 없어도 에러 없이 넘어갑니다.
    dotenvy::dotenv().ok();

    // ── 2단계: 로깅(tracing) 초기화 ──
    // RUST_LOG가 없으면 catalog, tower_http, axum 모듈을 debug 레벨로 설정
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "catalog=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // ── 3단계: 설정 로딩 ──
    let config = Config::from_env()?;
    tracing::info!("Starting catalog server on {}:{}", config.host, config.port);

    // ── 4단계: SQLite 연결 풀 생성 + 마이그레이션 ──
    let pool = db::connect(&config.database_url).await?;
    tracing::info!("Running database migrations...");
    db::migrate(&pool).await?;

    // ── 5단계: 역색인 클라이언트 ──
    // 역색인은 best-effort입니다. 준비에 실패해도 서버는 계속 뜨고,
    // 추천어 엔드포인트만 503으로 응답하게 됩니다.
    let index = ElasticsearchIndex::from_config(&config)?;
    match index.ensure_index().await {
        Ok(true) => tracing::info!("Created search index: {}", index.index_name()),
        Ok(false) => tracing::info!("Search index already exists: {}", index.index_name()),
        Err(e) => {
            tracing::warn!("Search index unavailable ({}); autocomplete suggestions will be disabled", e)
        }
    }

    // ── 6단계: 애플리케이션 상태와 라우터 ──
    let state = AppState {
        pool: pool.clone(),
        suggestions: SuggestionService::new(Arc::new(index)),
    };

    // 개발 환경 기준으로 모든 출처를 허용합니다.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // ── 7단계: 서버 시작 ──
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
