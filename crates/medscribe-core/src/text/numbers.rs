//! Spoken-number normalization.
//!
//! Dictated prescriptions say things like "six fifty milligrams". The
//! normalizer rewrites those compound patterns into a form the word-run
//! converter can parse, and the converter turns number-word runs into
//! digit strings for the detail extractor.

use lazy_static::lazy_static;
use regex::Regex;

/// Spelled-out number words and their digit values.
///
/// "half" is included for dosages like "half tablet".
pub const NUMBER_WORDS: &[(&str, f64)] = &[
    ("one", 1.0),
    ("two", 2.0),
    ("three", 3.0),
    ("four", 4.0),
    ("five", 5.0),
    ("six", 6.0),
    ("seven", 7.0),
    ("eight", 8.0),
    ("nine", 9.0),
    ("ten", 10.0),
    ("eleven", 11.0),
    ("twelve", 12.0),
    ("thirteen", 13.0),
    ("fourteen", 14.0),
    ("fifteen", 15.0),
    ("sixteen", 16.0),
    ("seventeen", 17.0),
    ("eighteen", 18.0),
    ("nineteen", 19.0),
    ("twenty", 20.0),
    ("thirty", 30.0),
    ("forty", 40.0),
    ("fifty", 50.0),
    ("sixty", 60.0),
    ("seventy", 70.0),
    ("eighty", 80.0),
    ("ninety", 90.0),
    ("hundred", 100.0),
    ("thousand", 1000.0),
    ("half", 0.5),
];

lazy_static! {
    static ref ONES_TENS: Regex = Regex::new(
        r"(?i)\b(one|two|three|four|five|six|seven|eight|nine)\s+(twenty|thirty|forty|fifty|sixty|seventy|eighty|ninety)\b"
    )
    .expect("spoken-number pattern");
    static ref WORD_SUBS: Vec<(Regex, String)> = NUMBER_WORDS
        .iter()
        .map(|(w, v)| {
            let re = Regex::new(&format!(r"(?i)\b{w}\b")).expect("number-word pattern");
            (re, format_value(*v))
        })
        .collect();
}

/// Regex alternation of every number word, for building larger patterns.
pub fn number_word_alternation() -> String {
    NUMBER_WORDS
        .iter()
        .map(|(w, _)| *w)
        .collect::<Vec<_>>()
        .join("|")
}

/// Rewrite `<ones-word> <tens-word>` as `<ones-word> hundred <tens-word>`.
///
/// "six fifty" becomes "six hundred fifty" so the word-run converter reads
/// it as 650. Text already containing "hundred" between the two words does
/// not match, so re-running never inserts a second "hundred".
pub fn normalize_spoken_numbers(text: &str) -> String {
    ONES_TENS.replace_all(text, "$1 hundred $2").into_owned()
}

fn word_value(word: &str) -> Option<f64> {
    NUMBER_WORDS
        .iter()
        .find(|(w, _)| *w == word)
        .map(|(_, v)| *v)
}

fn format_value(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

/// Replace every standalone number word in `text` with its digit form.
///
/// Used to digitize phrases kept as free text, e.g. "twice a day" stays as
/// is but "three times a day" becomes "3 times a day".
pub fn digitize_number_words(text: &str) -> String {
    let mut out = text.to_string();
    for (re, digits) in WORD_SUBS.iter() {
        out = re.replace_all(&out, digits.as_str()).into_owned();
    }
    out
}

/// Convert a run of number words (or digits) to a digit string.
///
/// Handles single words ("five" → "5"), digit passthrough ("650" → "650"),
/// the compound dictation shorthand ("six fifty" → "650", first value under
/// 100 and second at least 10), and hundred/thousand runs
/// ("six hundred fifty" → "650"). Returns `None` when the segment is not a
/// parseable number run; callers keep the original text in that case.
pub fn words_to_number(segment: &str) -> Option<String> {
    let segment = segment.trim().to_lowercase();
    if segment.is_empty() {
        return None;
    }

    // Digit passthrough.
    if segment.parse::<f64>().is_ok() {
        return Some(segment);
    }

    if let Some(v) = word_value(&segment) {
        return Some(format_value(v));
    }

    let tokens: Vec<&str> = segment.split_whitespace().collect();

    // Compound shorthand: "six fifty" means 650, not 56.
    if tokens.len() == 2 {
        if let (Some(a), Some(b)) = (word_value(tokens[0]), word_value(tokens[1])) {
            if a < 100.0 && b >= 10.0 && b < 100.0 {
                return Some(format_value(a * 100.0 + b));
            }
        }
    }

    // General run with hundred/thousand markers.
    let mut total = 0.0;
    let mut current = 0.0;
    for token in &tokens {
        let value = if let Ok(d) = token.parse::<f64>() {
            d
        } else {
            word_value(token)?
        };
        if (value - 100.0).abs() < f64::EPSILON && *token == "hundred" {
            current = if current == 0.0 { 100.0 } else { current * 100.0 };
        } else if (value - 1000.0).abs() < f64::EPSILON && *token == "thousand" {
            total += if current == 0.0 { 1000.0 } else { current * 1000.0 };
            current = 0.0;
        } else {
            current += value;
        }
    }
    Some(format_value(total + current))
}
