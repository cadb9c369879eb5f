//! # 상품 카탈로그 조회 서비스
//!
//! 멀티 테넌트 상품 카탈로그의 목록 조회, 자유 텍스트 검색, 자동완성 추천어를 제공합니다.
//!
//! 모듈 구성:
//! - `config`: 환경변수 설정
//! - `error`: 에러 타입과 HTTP 응답 변환
//! - `models`: 상품, 요청 파라미터, 페이지 응답 구조체
//! - `db`: 기본 저장소(SQLite) 쿼리
//! - `services`: 요청 검증, 역색인 클라이언트, 추천어 서비스
//! - `routes`: HTTP 핸들러와 라우터
//! - `client`: API 클라이언트와 자동완성 컨트롤러

pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
