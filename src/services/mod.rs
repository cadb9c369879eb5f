//! # 서비스 계층
//!
//! 라우트 핸들러와 저장소 사이의 비즈니스 로직입니다.
//! - `validation`: 요청 파라미터 검증과 기본값 적용
//! - `index`: 보조 역색인(Elasticsearch) 클라이언트
//! - `suggestions`: 자동완성 추천어 서비스

pub mod index;
pub mod suggestions;
pub mod validation;

pub use index::{ElasticsearchIndex, IndexError, SuggestionIndex};
pub use suggestions::SuggestionService;
