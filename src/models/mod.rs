//! # 데이터 모델 모듈
//!
//! 애플리케이션에서 사용하는 데이터 구조체(struct)들을 정의합니다.
//! - `product`: 상품 레코드와 생성 요청
//! - `query`: 목록/검색 요청 파라미터, 정렬 필드, 페이지 응답
//!
//! `pub use X::*;`로 재공개하므로 `crate::models::Product`처럼 짧게 접근할 수 있습니다.

pub mod product;
pub mod query;

pub use product::*;
pub use query::*;
