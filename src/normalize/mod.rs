//! Description cleaning: strips gender, color and size tokens from free-text
//! product descriptions.
//!
//! The pipeline is a fixed sequence of [`Stage`]s. Each stage deletes its
//! matches, then collapses whitespace runs to one space and trims, so the next
//! stage never scans across a gap left behind by the previous one.

pub mod lexicon;

use regex::Regex;
use std::fmt;

/// One removal pass of the cleaning pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// `[...]`, `(...)` and `{...}` spans, delimiters included. Not nesting-aware.
    Brackets,
    Gender,
    /// Hangul run ending in `색`, e.g. `검은색` inside `검은색원피스`.
    ColorSuffix,
    Colors,
    ColorAbbreviations,
    /// Digits glued to a size code, e.g. `3xl`.
    SizePatterns,
    Sizes,
    /// Two or more single digits separated only by whitespace.
    LoneDigits,
}

impl Stage {
    /// Pipeline order. Later stages rely on the deletions of earlier ones.
    pub const ALL: [Stage; 8] = [
        Stage::Brackets,
        Stage::Gender,
        Stage::ColorSuffix,
        Stage::Colors,
        Stage::ColorAbbreviations,
        Stage::SizePatterns,
        Stage::Sizes,
        Stage::LoneDigits,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Stage::Brackets => "brackets",
            Stage::Gender => "gender",
            Stage::ColorSuffix => "color_suffix",
            Stage::Colors => "colors",
            Stage::ColorAbbreviations => "color_abbreviations",
            Stage::SizePatterns => "size_patterns",
            Stage::Sizes => "sizes",
            Stage::LoneDigits => "lone_digits",
        }
    }

    /// Runs this stage alone, including the trailing whitespace cleanup.
    pub fn apply(self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let stripped = match self {
            Stage::Brackets => lexicon::BRACKETS.replace_all(text, "").into_owned(),
            Stage::Gender => remove_all(text, &lexicon::GENDER),
            Stage::ColorSuffix => lexicon::COLOR_SUFFIX.replace_all(text, "").into_owned(),
            Stage::Colors => remove_all(text, &lexicon::COLORS),
            Stage::ColorAbbreviations => remove_all(text, &lexicon::COLOR_ABBRS),
            Stage::SizePatterns => remove_all(text, &lexicon::SIZE_SUFFIXED),
            Stage::Sizes => remove_all(text, &lexicon::SIZES),
            Stage::LoneDigits => lexicon::LONE_DIGIT_RUN.replace_all(text, "").into_owned(),
        };

        collapse_whitespace(&stripped)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Cleans a description. Total: empty input comes back empty and text that
/// is nothing but tokens comes back as `""`.
pub fn normalize(text: &str) -> String {
    Stage::ALL
        .iter()
        .fold(text.to_string(), |acc, stage| stage.apply(&acc))
}

/// [`normalize`] for nullable columns: `None` stays `None`.
pub fn normalize_opt(text: Option<&str>) -> Option<String> {
    text.map(normalize)
}

/// Output after every stage, in pipeline order.
pub fn trace(text: &str) -> Vec<(Stage, String)> {
    let mut current = text.to_string();
    Stage::ALL
        .iter()
        .map(|&stage| {
            current = stage.apply(&current);
            (stage, current.clone())
        })
        .collect()
}

fn remove_all(text: &str, patterns: &[Regex]) -> String {
    patterns
        .iter()
        .fold(text.to_string(), |acc, re| re.replace_all(&acc, "").into_owned())
}

fn collapse_whitespace(text: &str) -> String {
    lexicon::WHITESPACE
        .replace_all(text, " ")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brackets_drop_span_and_contents() {
        assert_eq!(Stage::Brackets.apply("원피스 [블랙/S] (여름) {new}"), "원피스");
    }

    #[test]
    fn brackets_do_not_nest() {
        assert_eq!(Stage::Brackets.apply("a [b [c] d] e"), "a d] e");
    }

    #[test]
    fn gender_is_substring_and_case_insensitive() {
        assert_eq!(Stage::Gender.apply("남성용 티셔츠"), "용 티셔츠");
        assert_eq!(Stage::Gender.apply("UNISEX hoodie"), "hoodie");
    }

    #[test]
    fn gender_entries_apply_in_lexicon_order() {
        // "men" runs before "women"/"womens" and eats the middle of the word
        assert_eq!(Stage::Gender.apply("Womens Tee"), "Wos Tee");
    }

    #[test]
    fn color_suffix_removes_compound() {
        assert_eq!(Stage::ColorSuffix.apply("빨간색 니트"), "니트");
        assert_eq!(Stage::ColorSuffix.apply("하늘색셔츠"), "셔츠");
    }

    #[test]
    fn colors_and_abbreviations() {
        assert_eq!(Stage::Colors.apply("BLACK 니트"), "니트");
        assert_eq!(Stage::Colors.apply("네이비 니트"), "니트");
        assert_eq!(Stage::ColorAbbreviations.apply("tee BLK"), "tee");
    }

    #[test]
    fn suffix_stage_must_precede_color_words() {
        // run alone, the literal list leaves the orphaned suffix behind
        assert_eq!(Stage::Colors.apply("검은색원피스"), "색원피스");
        assert_eq!(normalize("검은색원피스"), "원피스");
    }

    #[test]
    fn size_patterns_take_digits_with_code() {
        assert_eq!(Stage::SizePatterns.apply("셔츠 95M 3xl"), "셔츠");
    }

    #[test]
    fn size_words() {
        assert_eq!(Stage::Sizes.apply("셔츠 사이즈 260"), "셔츠");
    }

    #[test]
    fn size_letters_strip_one_at_a_time() {
        assert_eq!(Stage::Sizes.apply("XL"), "X");
    }

    #[test]
    fn lone_digits_need_two_or_more() {
        assert_eq!(Stage::LoneDigits.apply("상품 1 1 1 설명"), "상품 설명");
        assert_eq!(Stage::LoneDigits.apply("상품 1 2"), "상품");
        assert_eq!(Stage::LoneDigits.apply("상품 1"), "상품 1");
    }

    #[test]
    fn lone_digits_respect_word_boundaries() {
        assert_eq!(Stage::LoneDigits.apply("12 3 4"), "12");
        assert_eq!(Stage::LoneDigits.apply("1 23"), "1 23");
    }

    #[test]
    fn whitespace_collapses_after_each_stage() {
        assert_eq!(Stage::Brackets.apply("  a \t\n b  "), "a b");
    }

    #[test]
    fn empty_and_absent() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize_opt(None), None);
        assert_eq!(normalize_opt(Some("")), Some(String::new()));
    }

    #[test]
    fn trace_ends_at_normalize_result() {
        let input = "3xl 검정 남성 [세일]";
        let steps = trace(input);
        assert_eq!(steps.len(), Stage::ALL.len());
        assert_eq!(steps[0], (Stage::Brackets, "3xl 검정 남성".to_string()));
        assert_eq!(steps[1], (Stage::Gender, "3xl 검정".to_string()));
        assert_eq!(steps.last().map(|(_, s)| s.as_str()), Some(normalize(input).as_str()));
    }
}
