//! Locale-aware string comparison.
//!
//! Comparison runs in three levels: base letters (case and accents folded),
//! then accents, then case. With numeric collation on, a run of ASCII digits
//! is a single element ordered by its value, so `"2" < "10"`.

use std::cmp::Ordering;

use num_bigint::BigUint;
use num_traits::Num;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

pub const DEFAULT_LOCALE: &str = "en";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sensitivity {
    /// Base letters only: `a = á = A`.
    Base,
    /// Base letters and accents: `a = A`, `a != á`.
    Accent,
    /// Base letters and case: `a = á`, `a != A`.
    Case,
    #[default]
    Variant,
}

impl Sensitivity {
    fn compares_accents(self) -> bool {
        matches!(self, Self::Accent | Self::Variant)
    }

    fn compares_case(self) -> bool {
        matches!(self, Self::Case | Self::Variant)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaseFirst {
    Upper,
    Lower,
    #[default]
    Off,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collator {
    locale: String,
    swedish: bool,
    numeric: bool,
    sensitivity: Sensitivity,
    case_first: CaseFirst,
}

impl Default for Collator {
    fn default() -> Self {
        Self::new(DEFAULT_LOCALE)
    }
}

// Variant order is the primary order: symbols, then digits, then letters.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Primary {
    Symbol(char),
    Digits(BigUint),
    Letter(u32),
    Other(char),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CollationElement {
    primary: Primary,
    secondary: u32,
    tertiary: u8,
}

/// Precomputed collation elements of one string, compared with
/// [`Collator::compare_sort_keys`] by the collator that built it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SortKey {
    elements: Vec<CollationElement>,
}

impl Collator {
    pub fn new(locale: &str) -> Self {
        let locale = locale.trim();
        let locale = if locale.is_empty() {
            DEFAULT_LOCALE
        } else {
            locale
        };
        Self {
            locale: locale.to_string(),
            swedish: locale_family(locale) == "sv",
            numeric: false,
            sensitivity: Sensitivity::default(),
            case_first: CaseFirst::default(),
        }
    }

    pub fn with_numeric(mut self, numeric: bool) -> Self {
        self.numeric = numeric;
        self
    }

    pub fn with_sensitivity(mut self, sensitivity: Sensitivity) -> Self {
        self.sensitivity = sensitivity;
        self
    }

    pub fn with_case_first(mut self, case_first: CaseFirst) -> Self {
        self.case_first = case_first;
        self
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn numeric(&self) -> bool {
        self.numeric
    }

    pub fn sensitivity(&self) -> Sensitivity {
        self.sensitivity
    }

    pub fn case_first(&self) -> CaseFirst {
        self.case_first
    }

    pub fn compare(&self, left: &str, right: &str) -> Ordering {
        self.compare_elements(&self.elements(left), &self.elements(right))
    }

    pub(crate) fn sort_key(&self, text: &str) -> SortKey {
        SortKey {
            elements: self.elements(text),
        }
    }

    pub(crate) fn compare_sort_keys(&self, left: &SortKey, right: &SortKey) -> Ordering {
        self.compare_elements(&left.elements, &right.elements)
    }

    fn compare_elements(&self, left: &[CollationElement], right: &[CollationElement]) -> Ordering {
        let primary = left
            .iter()
            .map(|element| &element.primary)
            .cmp(right.iter().map(|element| &element.primary));
        if primary != Ordering::Equal {
            return primary;
        }

        if self.sensitivity.compares_accents() {
            let secondary = left
                .iter()
                .map(|element| element.secondary)
                .cmp(right.iter().map(|element| element.secondary));
            if secondary != Ordering::Equal {
                return secondary;
            }
        }

        if self.sensitivity.compares_case() {
            return left
                .iter()
                .map(|element| element.tertiary)
                .cmp(right.iter().map(|element| element.tertiary));
        }

        Ordering::Equal
    }

    fn elements(&self, text: &str) -> Vec<CollationElement> {
        let mut out = Vec::with_capacity(text.len());
        let mut chars = text.chars().peekable();

        while let Some(ch) = chars.next() {
            if self.numeric && ch.is_ascii_digit() {
                let mut run = String::from(ch);
                while let Some(next) = chars.next_if(char::is_ascii_digit) {
                    run.push(next);
                }
                let value = BigUint::from_str_radix(&run, 10).unwrap_or_default();
                out.push(CollationElement {
                    primary: Primary::Digits(value),
                    secondary: 0,
                    tertiary: 0,
                });
                continue;
            }

            if is_combining_mark(ch) {
                // a stray mark only weighs on the previous element's accent level
                if let Some(previous) = out.last_mut() {
                    previous.secondary = previous.secondary.saturating_add(ch as u32);
                }
                continue;
            }

            out.push(self.char_element(ch));
        }
        out
    }

    fn char_element(&self, ch: char) -> CollationElement {
        let lower = ch.to_lowercase().next().unwrap_or(ch);
        let is_upper = ch.is_uppercase();
        let tertiary = match (self.case_first, is_upper) {
            (CaseFirst::Upper, true) | (CaseFirst::Lower | CaseFirst::Off, false) => 0,
            _ => 1,
        };

        if self.swedish {
            let tailored = match lower {
                'å' => Some(1),
                'ä' => Some(2),
                'ö' => Some(3),
                _ => None,
            };
            if let Some(offset) = tailored {
                return CollationElement {
                    primary: Primary::Letter('z' as u32 + offset),
                    secondary: 0,
                    tertiary,
                };
            }
        }

        let mut decomposed = std::iter::once(lower).nfd();
        let base = decomposed.next().unwrap_or(lower);
        let secondary = decomposed.map(|mark| mark as u32).sum();

        let primary = if base.is_alphabetic() {
            Primary::Letter(base as u32)
        } else if base.is_ascii_digit() {
            Primary::Digits(BigUint::from(base as u32 - '0' as u32))
        } else if base.is_whitespace() || base.is_ascii_punctuation() || is_general_symbol(base) {
            Primary::Symbol(base)
        } else {
            Primary::Other(base)
        };

        CollationElement {
            primary,
            secondary,
            tertiary,
        }
    }
}

fn is_general_symbol(ch: char) -> bool {
    matches!(ch, '\u{a0}'..='\u{bf}' | '\u{2000}'..='\u{206f}')
}

fn locale_family(locale: &str) -> String {
    locale
        .split(['-', '_'])
        .next()
        .unwrap_or(DEFAULT_LOCALE)
        .to_ascii_lowercase()
}
