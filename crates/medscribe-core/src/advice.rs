//! General-advice detection.
//!
//! Free-text advice is folded onto a fixed set of canonical sentences so
//! that "drink lots of water", "have plenty of water", and "hydrate" all
//! come out the same way in the note.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref ADVICE_RULES: Vec<(Regex, &'static str)> = [
        (
            r"\b(drink|have|take|give)\s+(plenty\s+of\s+)?water\b|\bhydrate\b",
            "Drink plenty of water.",
        ),
        (r"\b(drink|have|take|give)\s+(some\s+)?juice\b", "Drink juice."),
        (r"\b(eat|have)\s+(fresh\s+)?fruits?\b", "Eat fruits."),
        (
            r"\b(eat|have)\s+(raw\s+)?vegetables?\b|\bveggies\b",
            "Eat raw vegetables.",
        ),
        (r"\b(no|avoid|reduce)\s+(extra\s+)?salt\b", "Avoid excess salt."),
        (r"\b(no|avoid|reduce)\s+(added\s+)?sugar\b", "Avoid excess sugar."),
        (r"\b(avoid|reduce)\s+(oily|fried)\s+food\b", "Avoid oily/fried food."),
        (r"\b(get\s+enough|take)\s+rest\b", "Get adequate rest."),
        (r"\b(do|perform)\s+(light\s+)?exercise\b", "Do light exercise."),
    ]
    .iter()
    .map(|(p, s)| (Regex::new(p).expect("advice pattern"), *s))
    .collect();
}

/// Extract canonical advice sentences present in the note text.
///
/// Each rule fires at most once, so repeated phrasing cannot duplicate a
/// sentence. Output is sorted for a stable wire shape.
pub fn extract_general_advice(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut advice: Vec<String> = ADVICE_RULES
        .iter()
        .filter(|(pattern, _)| pattern.is_match(&lower))
        .map(|(_, sentence)| (*sentence).to_string())
        .collect();
    advice.sort();
    advice
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_water_variants_fold_to_one_sentence() {
        for text in [
            "drink plenty of water",
            "Take water regularly",
            "remember to hydrate",
        ] {
            assert_eq!(extract_general_advice(text), vec!["Drink plenty of water."]);
        }
    }

    #[test]
    fn test_water_and_fruits() {
        let advice = extract_general_advice("drink plenty of water and eat fruits");
        assert_eq!(advice, vec!["Drink plenty of water.", "Eat fruits."]);
    }

    #[test]
    fn test_multiple_rules_sorted() {
        let advice =
            extract_general_advice("Avoid extra salt, eat fresh fruits and get enough rest.");
        assert_eq!(
            advice,
            vec!["Avoid excess salt.", "Eat fruits.", "Get adequate rest."]
        );
    }

    #[test]
    fn test_repeated_phrasing_does_not_duplicate() {
        let advice = extract_general_advice("drink water in the morning and drink water at night");
        assert_eq!(advice, vec!["Drink plenty of water."]);
    }

    #[test]
    fn test_no_advice() {
        assert!(extract_general_advice("take 650 mg twice a day").is_empty());
    }
}
