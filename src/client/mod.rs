//! # 클라이언트 측 모듈
//!
//! 카탈로그 서버를 사용하는 쪽(검색 화면)의 로직입니다.
//! - `api`: 카탈로그 HTTP API 클라이언트
//! - `autocomplete`: 디바운스 + 서킷 브레이커 자동완성 컨트롤러

pub mod api;
pub mod autocomplete;

pub use api::{CatalogClient, ClientError, NewProductBody, SuggestionSource};
pub use autocomplete::{
    AutocompleteController, AutocompleteMachine, AutocompleteState, AutocompleteView,
};
