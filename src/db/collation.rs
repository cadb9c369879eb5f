//! # 유니코드 대소문자 무시 비교
//!
//! SQLite 내장 `NOCASE`와 `LIKE`는 ASCII(A-Z)만 대소문자를 접습니다.
//! "Éclair"와 "éclair", "PÂTISSERIE"와 "Pâtisserie"를 같은 값으로 다루기 위해
//! 두 가지를 제공합니다.
//!
//! - `fold`: 저장/조회 시 값을 접은 형태(NFC + 유니코드 소문자)로 바꿉니다.
//!   `*_folded` 컬럼과 필터/검색 바인딩 값이 모두 이 함수를 거칩니다.
//! - `compare`: 연결마다 등록되는 `CATALOG_CI` 콜레이션 함수. 이름 정렬에 사용합니다.
//!   1차 비교는 악센트를 뗀 기본 글자, 2차 비교는 악센트이며 대소문자는 무시합니다.
//!   (ICU의 strength 2와 같은 규칙)

use std::cmp::Ordering;

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// `ORDER BY ... COLLATE CATALOG_CI`로 참조하는 콜레이션 이름
pub const CATALOG_COLLATION: &str = "CATALOG_CI";

/// 대소문자를 접은 비교용 문자열 (악센트는 유지)
pub fn fold(value: &str) -> String {
    value.nfc().collect::<String>().to_lowercase()
}

// 악센트를 뗀 1차 정렬 키: "Éclair" → "eclair"
fn base_key(value: &str) -> String {
    value
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// `CATALOG_CI` 콜레이션
pub fn compare(a: &str, b: &str) -> Ordering {
    base_key(a)
        .cmp(&base_key(b))
        .then_with(|| fold(a).cmp(&fold(b)))
}
