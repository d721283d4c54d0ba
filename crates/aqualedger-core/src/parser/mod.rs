//! Free-text catch parser
//!
//! Turns an utterance such as "20.5 kilos of Salmon" into a species name and a
//! weight in kilograms. The text is split once into typed tokens (numbers,
//! words, symbols) and a pure reducer picks the first quantity, its optional
//! unit, and any connective word directly touching it.
//!
//! Parsing never fails: at worst the whole trimmed input becomes the species
//! and the weight is unknown.

mod token;

use serde::Serialize;

pub use token::{tokenize, Token, TokenKind};

/// Kilograms per pound
pub const KG_PER_POUND: f64 = 0.453_592;

/// Connective words dropped when they touch the quantity
const FILLER_WORDS: [&str; 7] = ["of", "captured", "caught", "weighing", "is", "a", "an"];

/// Weight units recognised after a number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    Kilograms,
    Pounds,
}

impl WeightUnit {
    /// Match a unit word (`kg`, `kilo`, `kilos`, `lb`, `lbs`, `pound`, `pounds`)
    #[must_use]
    pub fn from_word(word: &str) -> Option<Self> {
        match word.to_lowercase().as_str() {
            "kg" | "kilo" | "kilos" => Some(Self::Kilograms),
            "lb" | "lbs" | "pound" | "pounds" => Some(Self::Pounds),
            _ => None,
        }
    }

    /// Convert a quantity in this unit to kilograms.
    ///
    /// Pounds are rounded to two decimal places.
    #[must_use]
    pub fn to_kilograms(self, value: f64) -> f64 {
        match self {
            Self::Kilograms => value,
            Self::Pounds => round_to_hundredths(value * KG_PER_POUND),
        }
    }
}

/// Why a parse result may need the user's attention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseAmbiguity {
    /// No quantity was found
    MissingWeight,
    /// Nothing but the quantity was said
    MissingSpecies,
}

/// Candidate catch extracted from free text
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedCatch {
    pub species: String,
    pub weight_kg: Option<f64>,
    /// The input exactly as received
    pub original: String,
}

impl ParsedCatch {
    #[must_use]
    pub fn ambiguity(&self) -> Option<ParseAmbiguity> {
        if self.species.is_empty() {
            Some(ParseAmbiguity::MissingSpecies)
        } else if self.weight_kg.is_none() {
            Some(ParseAmbiguity::MissingWeight)
        } else {
            None
        }
    }
}

/// Parse a free-form utterance into a candidate catch.
///
/// Only the first number is a weight; later numbers stay in the species.
/// A number without a recognised unit is taken as kilograms.
///
/// # Examples
///
/// ```
/// use aqualedger_core::parser::parse;
///
/// let parsed = parse("Sea of Galilee Tilapia 2kg");
/// assert_eq!(parsed.species, "Sea of Galilee Tilapia");
/// assert_eq!(parsed.weight_kg, Some(2.0));
/// ```
#[must_use]
pub fn parse(text: &str) -> ParsedCatch {
    let tokens = tokenize(text);

    let quantity = tokens
        .iter()
        .enumerate()
        .find_map(|(index, token)| match token.kind {
            TokenKind::Number(value) => Some((index, value)),
            _ => None,
        });

    let Some((index, value)) = quantity else {
        return ParsedCatch {
            species: finish_species(&render(&tokens)),
            weight_kg: None,
            original: text.to_string(),
        };
    };

    let unit = tokens
        .get(index + 1)
        .filter(|token| token.kind == TokenKind::Word)
        .and_then(|token| WeightUnit::from_word(token.text));
    let end = index + 1 + usize::from(unit.is_some());

    let before = strip_trailing_filler(&tokens[..index]);
    let after = strip_leading_filler(&tokens[end..]);
    let joined = format!("{} {}", render(before), render(after));

    ParsedCatch {
        species: finish_species(&joined),
        weight_kg: Some(unit.unwrap_or(WeightUnit::Kilograms).to_kilograms(value)),
        original: text.to_string(),
    }
}

fn is_filler(token: &Token<'_>) -> bool {
    token.kind == TokenKind::Word
        && FILLER_WORDS
            .iter()
            .any(|filler| token.text.eq_ignore_ascii_case(filler))
}

fn strip_trailing_filler<'t, 'a>(tokens: &'t [Token<'a>]) -> &'t [Token<'a>] {
    match tokens.split_last() {
        Some((last, rest)) if is_filler(last) => rest,
        _ => tokens,
    }
}

fn strip_leading_filler<'t, 'a>(tokens: &'t [Token<'a>]) -> &'t [Token<'a>] {
    match tokens.split_first() {
        Some((first, rest)) if is_filler(first) => rest,
        _ => tokens,
    }
}

/// Rebuild text from tokens, keeping a single space where the input had any.
fn render(tokens: &[Token<'_>]) -> String {
    let mut output = String::new();
    for (position, token) in tokens.iter().enumerate() {
        if position > 0 && token.spaced {
            output.push(' ');
        }
        output.push_str(token.text);
    }
    output
}

/// Collapse whitespace, trim, and capitalise the first character only.
fn finish_species(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut chars = collapsed.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

fn round_to_hundredths(value: f64) -> f64 {
    let scaled = value * 100.0;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn assert_parsed(input: &str, species: &str, weight_kg: Option<f64>) {
        let parsed = parse(input);
        assert_eq!(parsed.species, species, "species for {input:?}");
        match (parsed.weight_kg, weight_kg) {
            (Some(actual), Some(expected)) => assert!(
                (actual - expected).abs() < 0.01,
                "weight for {input:?}: {actual} != {expected}"
            ),
            (actual, expected) => assert_eq!(actual, expected, "weight for {input:?}"),
        }
    }

    #[test]
    fn test_weight_before_and_after_species() {
        assert_parsed("20kg Tuna", "Tuna", Some(20.0));
        assert_parsed("Tuna 20kg", "Tuna", Some(20.0));
    }

    #[test]
    fn test_leading_filler_after_quantity_is_removed() {
        assert_parsed("20.5 kilos of Salmon", "Salmon", Some(20.5));
    }

    #[test]
    fn test_embedded_fillers_survive() {
        assert_parsed("Sea of Galilee Tilapia 2kg", "Sea of Galilee Tilapia", Some(2.0));
        assert_parsed("Jack of all Trades 5kg", "Jack of all Trades", Some(5.0));
    }

    #[test]
    fn test_pounds_are_converted_and_rounded() {
        assert_parsed("Catch of the Day 10 lbs", "Catch of the Day", Some(4.54));
        assert_eq!(parse("Catch of the Day 10 lbs").weight_kg, Some(4.54));
        assert_eq!(parse("3 pounds of cod").weight_kg, Some(1.36));
    }

    #[test]
    fn test_huge_pound_values_stay_finite() {
        let text = format!("{} lbs tuna", "9".repeat(308));
        let parsed = parse(&text);
        assert_eq!(parsed.species, "tuna");
        assert!(parsed.weight_kg.unwrap().is_finite());
    }

    #[test]
    fn test_no_quantity_keeps_whole_text() {
        assert_parsed("Just a fish", "Just a fish", None);
        assert_eq!(
            parse("Just a fish").ambiguity(),
            Some(ParseAmbiguity::MissingWeight)
        );
    }

    #[test]
    fn test_unrecognised_unit_stays_in_species() {
        assert_parsed("500 grams sardines", "Grams sardines", Some(500.0));
    }

    #[test]
    fn test_only_first_number_is_weight() {
        assert_parsed("Tuna 12kg from pier 7", "Tuna from pier 7", Some(12.0));
        assert_parsed("2 kg bass 3 kg pike", "Bass 3 kg pike", Some(2.0));
    }

    #[test]
    fn test_fillers_adjacent_on_both_sides() {
        assert_parsed("Bass caught weighing 3 kg", "Bass caught", Some(3.0));
        assert_parsed("caught a 4 kilo pike", "Caught pike", Some(4.0));
        assert_parsed("an 8lb catfish", "Catfish", Some(3.63));
    }

    #[test]
    fn test_units_are_case_insensitive() {
        assert_parsed("Halibut 7 KG", "Halibut", Some(7.0));
        assert_parsed("Snapper 2 Pounds", "Snapper", Some(0.91));
    }

    #[test]
    fn test_unit_must_be_a_whole_word() {
        // "kgs" is not in the recognised set
        assert_parsed("Trout 2 kgs", "Trout kgs", Some(2.0));
    }

    #[test]
    fn test_every_supported_unit_converts() {
        for (unit, factor) in [
            ("kg", 1.0),
            ("kilo", 1.0),
            ("kilos", 1.0),
            ("lb", KG_PER_POUND),
            ("lbs", KG_PER_POUND),
            ("pound", KG_PER_POUND),
            ("pounds", KG_PER_POUND),
        ] {
            for quantity in [0.5, 1.0, 3.25, 17.0, 120.0] {
                let parsed = parse(&format!("Mullet {quantity} {unit}"));
                let weight = parsed.weight_kg.unwrap();
                assert!(
                    (weight - quantity * factor).abs() < 0.01,
                    "{quantity} {unit} -> {weight}"
                );
                assert_eq!(parsed.species, "Mullet");
            }
        }
    }

    #[test]
    fn test_whitespace_is_collapsed_and_first_letter_capitalised() {
        assert_parsed("   big    red   snapper   9kg  ", "Big red snapper", Some(9.0));
        assert_parsed("émissole 2kg", "Émissole", Some(2.0));
    }

    #[test]
    fn test_quantity_only_is_ambiguous_species() {
        let parsed = parse("20kg");
        assert_eq!(parsed.species, "");
        assert_eq!(parsed.ambiguity(), Some(ParseAmbiguity::MissingSpecies));
    }

    #[test]
    fn test_empty_input_never_panics() {
        let parsed = parse("");
        assert_eq!(parsed.species, "");
        assert_eq!(parsed.weight_kg, None);
        assert_eq!(parse("   \n ").species, "");
    }

    #[test]
    fn test_original_text_is_preserved() {
        assert_eq!(parse("  Tuna 20kg ").original, "  Tuna 20kg ");
    }
}
