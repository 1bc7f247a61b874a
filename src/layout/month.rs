//! Month-token normalization.
//!
//! Header and date rows hold months either as native date cells or as free text such as
//! `Dec.2022`, `Jan 2023` or `January  2023`. Both normalize to the same [`CanonicalMonth`].

use std::ops::Range;

use crate::error::{PipelineError, PipelineResult};
use crate::types::{CanonicalMonth, Cell};

const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Normalize one header/date cell into a [`CanonicalMonth`].
///
/// - Native date cells are truncated to their month.
/// - Text (and plain numbers, rendered as text) is cleaned and parsed with [`parse_month_str`].
/// - Blank, boolean and error cells fail with [`PipelineError::UnparseableMonth`].
pub fn normalize_month(token: &Cell) -> PipelineResult<CanonicalMonth> {
    match token {
        Cell::DateTime(dt) => Ok(CanonicalMonth::containing(dt.date())),
        Cell::Text(s) => parse_month_str(s),
        Cell::Int(_) | Cell::Float(_) => parse_month_str(&token.to_plain_string()),
        other => Err(unparseable(&other.to_plain_string())),
    }
}

/// Parse a free-text month token.
///
/// Double spaces are collapsed and `.` separators removed before parsing. Parsing is fuzzy:
/// the text is split into letter runs and digit runs, and letter runs that are not month names
/// are ignored. Without a month name, a 1-2 digit run is a month only when it touches a `/` or
/// `-` (as in `12/2022` or `2022-12-31`); the first such run is the month (month-first), unless
/// it cannot be a month and the next one can. Of the 4-digit runs, the one closest to the month
/// is the year (the later one on a tie), so `2018=100 Dec 2022` is December 2022.
///
/// Both a year and a month are required.
pub fn parse_month_str(raw: &str) -> PipelineResult<CanonicalMonth> {
    let cleaned = raw.replace("  ", " ").replace('.', "");

    let mut named_month: Option<(usize, u32)> = None;
    let mut years: Vec<(usize, i32)> = Vec::new();
    let mut numbers: Vec<(usize, u32)> = Vec::new();

    for (pos, token) in tokenize(&cleaned).into_iter().enumerate() {
        match token {
            Token::Word(w) => {
                if named_month.is_none() {
                    named_month = month_from_name(w).map(|m| (pos, m));
                }
            }
            Token::Digits { text, dated } => match text.len() {
                4 => {
                    if let Ok(y) = text.parse() {
                        years.push((pos, y));
                    }
                }
                1 | 2 if dated => {
                    if let Ok(n) = text.parse() {
                        numbers.push((pos, n));
                    }
                }
                _ => {}
            },
        }
    }

    let Some((month_pos, month)) = named_month.or_else(|| month_first(&numbers)) else {
        return Err(unparseable(raw));
    };
    // On a tie the year after the month wins.
    let nearest = years
        .iter()
        .min_by_key(|(pos, _)| (pos.abs_diff(month_pos), *pos < month_pos));
    let Some(&(_, year)) = nearest else {
        return Err(unparseable(raw));
    };
    CanonicalMonth::from_ymd(year, month).ok_or_else(|| unparseable(raw))
}

fn unparseable(raw: &str) -> PipelineError {
    PipelineError::UnparseableMonth {
        raw: raw.to_string(),
    }
}

/// Characters that mark a bare number as part of a numeric date.
const DATE_SEPARATORS: &[char] = &['/', '-'];

#[derive(Debug, PartialEq, Eq)]
enum Token<'a> {
    Word(&'a str),
    /// `dated` is set when the run touches a date separator.
    Digits { text: &'a str, dated: bool },
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum CharClass {
    Alpha,
    Digit,
    Other,
}

impl CharClass {
    fn of(c: char) -> Self {
        if c.is_ascii_digit() {
            Self::Digit
        } else if c.is_alphabetic() {
            Self::Alpha
        } else {
            Self::Other
        }
    }
}

/// Split into letter runs and digit runs; everything else separates.
fn tokenize(s: &str) -> Vec<Token<'_>> {
    let mut out = Vec::new();
    let mut run: Option<(usize, CharClass)> = None;
    for (i, c) in s.char_indices() {
        let class = CharClass::of(c);
        match run {
            Some((_, cur)) if cur == class => {}
            Some((from, cur)) => {
                push_token(&mut out, s, from..i, cur);
                run = Some((i, class));
            }
            None => run = Some((i, class)),
        }
    }
    if let Some((from, cur)) = run {
        push_token(&mut out, s, from..s.len(), cur);
    }
    out
}

fn push_token<'a>(out: &mut Vec<Token<'a>>, s: &'a str, span: Range<usize>, class: CharClass) {
    match class {
        CharClass::Alpha => out.push(Token::Word(&s[span])),
        CharClass::Digit => {
            let dated = s[..span.start].ends_with(DATE_SEPARATORS)
                || s[span.end..].starts_with(DATE_SEPARATORS);
            out.push(Token::Digits {
                text: &s[span],
                dated,
            });
        }
        CharClass::Other => {}
    }
}

fn month_from_name(word: &str) -> Option<u32> {
    let w = word.to_lowercase();
    if w == "sept" {
        return Some(9);
    }
    MONTH_NAMES
        .iter()
        .position(|full| w == *full || (w.len() == 3 && full.starts_with(w.as_str())))
        .map(|i| i as u32 + 1)
}

fn month_first(numbers: &[(usize, u32)]) -> Option<(usize, u32)> {
    let valid = |n: u32| (1..=12).contains(&n);
    match numbers {
        [first, ..] if valid(first.1) => Some(*first),
        [_, second, ..] if valid(second.1) => Some(*second),
        _ => None,
    }
}
