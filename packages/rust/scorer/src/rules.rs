//! Heuristic lead-scoring rules.
//!
//! Four independent, additive rules; each fires at most once when any of its
//! keywords occurs as a case-insensitive substring of the relevant field.
//! Rules are non-exclusive, so scores are sums of subsets of
//! {40, 30, 15, 10} with a ceiling of 95.

/// Points for a paper title signalling liver/tox research intent.
pub const INTENT_POINTS: u32 = 40;

/// Points for a job title fitting the safety/toxicology buyer profile.
pub const ROLE_POINTS: u32 = 30;

/// Points for in-vitro/NAM methodology in either title.
pub const TECH_POINTS: u32 = 15;

/// Points for being located in a life-science hub.
pub const HUB_POINTS: u32 = 10;

/// Highest reachable score (all four rules firing).
pub const MAX_SCORE: u32 = INTENT_POINTS + ROLE_POINTS + TECH_POINTS + HUB_POINTS;

const INTENT_KEYWORDS: &[&str] = &["liver", "toxicology", "dili", "hepat", "3d"];

const ROLE_KEYWORDS: &[&str] = &["toxicology", "safety", "hepatic", "3d"];

const TECH_KEYWORDS: &[&str] = &["in vitro", "in-vitro", "nam", "organoid", "millifluidic"];

const HUB_KEYWORDS: &[&str] = &[
    "boston", "cambridge", "bay area", "basel", "uk", "london", "oxford",
];

// ---------------------------------------------------------------------------
// ScoreInput
// ---------------------------------------------------------------------------

/// The fields a score is computed from. Absent fields must be passed as empty
/// strings (the parsing boundary does this), which match no keyword.
#[derive(Debug, Clone, Copy)]
pub struct ScoreInput<'a> {
    /// `Paper Title` column.
    pub paper_title: &'a str,
    /// `Current Position` column.
    pub current_position: &'a str,
    /// `Locality` column.
    pub locality: &'a str,
}

/// Compute the relevance score for one lead.
///
/// Pure and order-insensitive: the result depends only on the three input
/// fields, and each rule contributes its full point value or nothing.
pub fn score(input: &ScoreInput<'_>) -> u32 {
    let paper_title = input.paper_title.to_lowercase();
    let current_position = input.current_position.to_lowercase();
    let locality = input.locality.to_lowercase();

    let mut total = 0;

    if contains_any(&paper_title, INTENT_KEYWORDS) {
        total += INTENT_POINTS;
    }
    if contains_any(&current_position, ROLE_KEYWORDS) {
        total += ROLE_POINTS;
    }
    if contains_any(&paper_title, TECH_KEYWORDS) || contains_any(&current_position, TECH_KEYWORDS) {
        total += TECH_POINTS;
    }
    if contains_any(&locality, HUB_KEYWORDS) {
        total += HUB_POINTS;
    }

    total
}

/// True if any needle occurs as a substring of the (already lowercased) haystack.
fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input<'a>(title: &'a str, position: &'a str, locality: &'a str) -> ScoreInput<'a> {
        ScoreInput {
            paper_title: title,
            current_position: position,
            locality,
        }
    }

    #[test]
    fn all_rules_fire_for_ideal_lead() {
        let full = input(
            "3D organoid model of hepatic injury",
            "Toxicology Safety Lead",
            "Cambridge, UK",
        );
        assert_eq!(score(&full), 95);
        assert_eq!(MAX_SCORE, 95);
    }

    #[test]
    fn empty_fields_score_zero() {
        assert_eq!(score(&input("", "", "")), 0);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let upper = input("LIVER disease", "", "");
        let lower = input("liver disease", "", "");
        assert_eq!(score(&upper), score(&lower));
        assert_eq!(score(&upper), INTENT_POINTS);
    }

    #[test]
    fn each_rule_contributes_independently() {
        assert_eq!(score(&input("DILI biomarkers", "", "")), INTENT_POINTS);
        assert_eq!(score(&input("", "Head of Safety", "")), ROLE_POINTS);
        assert_eq!(score(&input("", "", "Greater Boston")), HUB_POINTS);
        // Technographic matches either title.
        assert_eq!(score(&input("in-vitro assays", "", "")), TECH_POINTS);
        assert_eq!(score(&input("", "NAMs specialist", "")), TECH_POINTS);
    }

    #[test]
    fn scores_are_subset_sums() {
        let samples = [
            input("", "", ""),
            input("liver", "", ""),
            input("", "safety", ""),
            input("organoid culture", "", ""),
            input("", "", "basel"),
            input("hepatocyte models in vitro", "3D biology director", "London, UK"),
        ];
        let valid: Vec<u32> = (0..16)
            .map(|mask: u32| {
                [INTENT_POINTS, ROLE_POINTS, TECH_POINTS, HUB_POINTS]
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| mask & (1 << i) != 0)
                    .map(|(_, p)| p)
                    .sum()
            })
            .collect();

        for sample in &samples {
            let s = score(sample);
            assert!(valid.contains(&s), "unexpected score {s}");
            assert!(s <= MAX_SCORE);
        }
    }

    #[test]
    fn substring_matches_count() {
        // "hepat" is a deliberate stem: hepatic, hepatocyte, hepatotoxicity.
        assert_eq!(score(&input("Hepatotoxicity screening", "", "")), INTENT_POINTS);
    }
}
