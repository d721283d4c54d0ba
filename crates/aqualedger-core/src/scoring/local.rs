//! Offline sustainability heuristic

use crate::models::{Assessment, MAX_SCORE};

const BASELINE_SCORE: i32 = 70;

/// Species keywords and score adjustments, most specific first
const SPECIES_ADJUSTMENTS: &[(&str, i32, &str)] = &[
    ("bluefin", -40, "bluefin stocks are heavily overfished"),
    ("sturgeon", -40, "sturgeon are critically endangered in most waters"),
    ("orange roughy", -35, "orange roughy mature slowly and recover poorly"),
    ("shark", -35, "sharks reproduce slowly and are widely overexploited"),
    ("eel", -30, "eel populations have collapsed"),
    ("swordfish", -20, "swordfish are a highly migratory, pressured stock"),
    ("grouper", -20, "groupers are vulnerable to overfishing at spawning sites"),
    ("tuna", -15, "many tuna stocks are under fishing pressure"),
    ("cod", -15, "cod stocks remain fragile in several regions"),
    ("halibut", -10, "halibut are long-lived and slow to mature"),
    ("snapper", -10, "snapper stocks vary widely by region"),
    ("sardine", 20, "sardines are fast-breeding forage fish"),
    ("anchov", 20, "anchovies are fast-breeding forage fish"),
    ("mackerel", 15, "mackerel stocks are generally abundant"),
    ("herring", 15, "herring stocks are generally abundant"),
    ("tilapia", 15, "tilapia are prolific and widely farmed"),
    ("pollock", 10, "pollock fisheries are well managed"),
    ("catfish", 10, "catfish are hardy and abundant"),
    ("carp", 10, "carp are abundant and often invasive"),
    ("trout", 5, "trout are commonly stocked"),
];

const JUVENILE_LIMIT_KG: f64 = 0.3;
const LARGE_ADULT_KG: f64 = 20.0;
const BREEDER_KG: f64 = 50.0;

/// Deterministic local scorer.
///
/// Pure and synchronous: identical input always yields the same assessment and
/// the score is always within `0..=100`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalScorer;

impl LocalScorer {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Estimate a sustainability score from species and weight (`0` = unknown).
    #[must_use]
    pub fn score(&self, species: &str, weight_kg: f64) -> Assessment {
        let lowered = species.to_lowercase();
        let mut score = BASELINE_SCORE;
        let mut notes = Vec::new();

        match SPECIES_ADJUSTMENTS
            .iter()
            .find(|(keyword, _, _)| lowered.contains(keyword))
        {
            Some((_, adjustment, note)) => {
                score += adjustment;
                notes.push((*note).to_string());
            }
            None => notes.push("no regional stock data for this species".to_string()),
        }

        if !weight_kg.is_finite() || weight_kg <= 0.0 {
            notes.push("weight unknown".to_string());
        } else if weight_kg < JUVENILE_LIMIT_KG {
            score -= 15;
            notes.push(format!(
                "{weight_kg} kg suggests a juvenile that has not yet spawned"
            ));
        } else if weight_kg > BREEDER_KG {
            score -= 15;
            notes.push(format!(
                "{weight_kg} kg is a large breeding adult; releasing it protects the stock"
            ));
        } else if weight_kg > LARGE_ADULT_KG {
            score -= 5;
            notes.push(format!("{weight_kg} kg is a mature specimen"));
        }

        let score = u8::try_from(score.clamp(0, i32::from(MAX_SCORE))).unwrap_or(MAX_SCORE);
        Assessment::new(
            score,
            format!("Local estimate: {}.", notes.join("; ")),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_is_deterministic() {
        let scorer = LocalScorer::new();
        assert_eq!(scorer.score("Bluefin Tuna", 120.0), scorer.score("Bluefin Tuna", 120.0));
    }

    #[test]
    fn score_stays_in_range() {
        let scorer = LocalScorer::new();
        for species in ["Bluefin tuna", "Sturgeon", "Sardines", "Mystery fish", ""] {
            for weight in [0.0, 0.1, 2.0, 25.0, 400.0, -3.0, f64::NAN] {
                let assessment = scorer.score(species, weight);
                assert!(assessment.score <= 100, "{species} {weight}");
            }
        }
    }

    #[test]
    fn specific_keywords_win_over_general_ones() {
        let scorer = LocalScorer::new();
        let bluefin = scorer.score("Atlantic Bluefin Tuna", 10.0);
        let tuna = scorer.score("Skipjack Tuna", 10.0);
        assert!(bluefin.score < tuna.score);
        assert!(bluefin.rationale.contains("bluefin"));
    }

    #[test]
    fn forage_fish_outscore_pressured_species() {
        let scorer = LocalScorer::new();
        assert!(scorer.score("Sardine", 0.5).score > scorer.score("Cod", 0.5).score);
    }

    #[test]
    fn unknown_weight_is_noted_without_penalty() {
        let scorer = LocalScorer::new();
        let unknown = scorer.score("Mackerel", 0.0);
        let typical = scorer.score("Mackerel", 1.0);
        assert_eq!(unknown.score, typical.score);
        assert!(unknown.rationale.contains("weight unknown"));
    }

    #[test]
    fn juveniles_and_breeders_are_penalised() {
        let scorer = LocalScorer::new();
        let typical = scorer.score("Halibut", 5.0).score;
        assert!(scorer.score("Halibut", 0.1).score < typical);
        assert!(scorer.score("Halibut", 80.0).score < typical);
    }
}
