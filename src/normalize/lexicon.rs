//! Fixed word lists and precompiled patterns used by the normalizer stages.
//!
//! Every literal is matched case-insensitively as a raw substring, in the
//! order listed, so an entry only sees text that survived the entries before
//! it (the single-letter size codes strip `xl` down before `xl` itself runs).

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

pub const GENDER_WORDS: &[&str] = &[
    "남성", "여성", "남자", "여자", "남녀공용", "공용", "소년", "소녀", "남녀", "남여",
    "men", "women", "male", "female", "unisex", "mens", "womens",
];

pub const COLOR_WORDS: &[&str] = &[
    // Korean
    "빨강", "빨간", "주황", "주황색", "노랑", "노란", "노란색", "초록", "초록색",
    "파랑", "파란", "파란색", "남색", "보라", "보라색", "자주", "자주색",
    "검정", "검은", "검은색", "흰색", "흰", "회색", "회", "은색", "은",
    "베이지", "네이비", "카키", "핑크", "레드", "블루", "그린", "옐로우", "오렌지",
    "차콜", "샌드", "아이보리", "크림", "와인", "버건디", "코랄", "민트", "라벤더",
    "올리브", "머스타드", "터키", "스카이", "로얄", "다크", "라이트", "브라운",
    // English
    "red", "blue", "green", "yellow", "black", "white", "gray", "grey", "pink", "purple", "orange",
    "navy", "beige", "khaki", "brown", "ivory", "cream", "maroon", "olive", "teal",
    "coral", "mint", "lavender", "turquoise", "sky", "royal", "dark", "light", "burgundy",
    "wine", "sand", "charcoal", "salmon", "peach", "lime", "cyan", "magenta", "indigo",
    "violet", "amber", "bronze", "copper", "gold", "silver", "platinum", "tan", "camel",
];

pub const COLOR_ABBREVIATIONS: &[&str] = &[
    "blk", "wht", "blu", "grn", "yel", "red", "pnk", "prp", "org", "brn",
    "gry", "nvy", "bge", "khk", "ivr", "crm", "mrn", "olv", "tel",
];

pub const SIZE_WORDS: &[&str] = &[
    "xs", "s", "m", "l", "xl", "xxl", "xxxl",
    "사이즈", "크기", "size",
    // clothing
    "90", "95", "100", "105", "110",
    // shoes
    "230", "240", "250", "260", "270", "280",
];

/// Digit run glued to a size code, e.g. `3xl`. Applied one at a time in this order.
pub const SIZE_PATTERNS: &[&str] = &[
    r"\d+xs", r"\d+s", r"\d+m", r"\d+l", r"\d+xl", r"\d+xxl", r"\d+xxxl",
];

pub static WHITESPACE: Lazy<Regex> = Lazy::new(|| compile(r"\s+", false));

pub static BRACKETS: Lazy<Regex> =
    Lazy::new(|| compile(r"\[[^\]]*\]|\([^)]*\)|\{[^}]*\}", false));

/// One or more Hangul syllables directly followed by `색` ("color").
pub static COLOR_SUFFIX: Lazy<Regex> = Lazy::new(|| compile(r"[가-힣]+색", false));

pub static LONE_DIGIT_RUN: Lazy<Regex> = Lazy::new(|| compile(r"\b\d(\s+\d)+\b", false));

pub static GENDER: Lazy<Vec<Regex>> = Lazy::new(|| literal_matchers(GENDER_WORDS));
pub static COLORS: Lazy<Vec<Regex>> = Lazy::new(|| literal_matchers(COLOR_WORDS));
pub static COLOR_ABBRS: Lazy<Vec<Regex>> = Lazy::new(|| literal_matchers(COLOR_ABBREVIATIONS));
pub static SIZES: Lazy<Vec<Regex>> = Lazy::new(|| literal_matchers(SIZE_WORDS));

pub static SIZE_SUFFIXED: Lazy<Vec<Regex>> =
    Lazy::new(|| SIZE_PATTERNS.iter().map(|p| compile(p, true)).collect());

fn literal_matchers(words: &[&str]) -> Vec<Regex> {
    words
        .iter()
        .map(|word| compile(&regex::escape(word), true))
        .collect()
}

// Fixed patterns; `every_pattern_compiles` covers them.
fn compile(pattern: &str, case_insensitive: bool) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .build()
        .unwrap_or_else(|e| panic!("invalid lexicon pattern {pattern:?}: {e}"))
}
