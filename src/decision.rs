use crate::classify::ClassificationResult;

/// label reported when a confident match contradicts the expected symbol
pub const INCORRECT_SYMBOL: &str = "Incorrect Symbol";

/// final outcome of one committed gesture
#[derive(Clone, Debug, PartialEq)]
pub enum Verdict {
    Matched { label: String, score: f64 },
    /// no confident match; carries the rejected best score for display
    Unmatched { score: f64 },
}

impl Verdict {
    pub fn is_matched(&self) -> bool {
        matches!(self, Verdict::Matched { .. })
    }
}

/// Applies the confidence threshold and the optional expected-symbol
/// constraint to a raw classifier result. Three branches, in order:
///
/// 1. a score at or below the threshold is rejected (the boundary itself
///    does not match),
/// 2. a confident match against the wrong expected symbol becomes the
///    `INCORRECT_SYMBOL` override at full confidence,
/// 3. everything else passes through as-is.
///
/// An expected label that is empty after trimming counts as unset.
pub fn decide(
    result: &ClassificationResult,
    minimum_confidence: f64,
    expected: Option<&str>,
) -> Verdict {
    if result.score <= minimum_confidence {
        return Verdict::Unmatched {
            score: result.score,
        };
    }

    match expected.map(str::trim) {
        Some(expected) if !expected.is_empty() && result.label != expected => Verdict::Matched {
            label: INCORRECT_SYMBOL.to_string(),
            score: 1.0,
        },
        _ => Verdict::Matched {
            label: result.label.clone(),
            score: result.score,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(label: &str, score: f64) -> ClassificationResult {
        ClassificationResult {
            label: label.to_string(),
            score,
        }
    }

    #[test]
    fn confident_match_passes_through() {
        let verdict = decide(&result("5", 0.95), 0.90, None);
        assert_eq!(
            verdict,
            Verdict::Matched {
                label: "5".to_string(),
                score: 0.95
            }
        );
    }

    #[test]
    fn low_score_is_unmatched() {
        let verdict = decide(&result("5", 0.85), 0.90, None);
        assert_eq!(verdict, Verdict::Unmatched { score: 0.85 });
    }

    #[test]
    fn score_equal_to_threshold_is_unmatched() {
        let verdict = decide(&result("5", 0.90), 0.90, None);
        assert_eq!(verdict, Verdict::Unmatched { score: 0.90 });
    }

    #[test]
    fn confident_wrong_symbol_is_overridden() {
        let verdict = decide(&result("5", 0.95), 0.90, Some("7"));
        assert_eq!(
            verdict,
            Verdict::Matched {
                label: INCORRECT_SYMBOL.to_string(),
                score: 1.0
            }
        );
    }

    #[test]
    fn matching_expected_symbol_passes_through() {
        let verdict = decide(&result("7", 0.95), 0.90, Some("7"));
        assert_eq!(
            verdict,
            Verdict::Matched {
                label: "7".to_string(),
                score: 0.95
            }
        );
    }

    #[test]
    fn empty_expected_counts_as_unset() {
        let verdict = decide(&result("5", 0.95), 0.90, Some("  "));
        assert_eq!(
            verdict,
            Verdict::Matched {
                label: "5".to_string(),
                score: 0.95
            }
        );
    }

    #[test]
    fn threshold_applies_before_the_expected_check() {
        // a weak match never becomes the override, even when it contradicts
        // the expected symbol
        let verdict = decide(&result("5", 0.50), 0.90, Some("7"));
        assert_eq!(verdict, Verdict::Unmatched { score: 0.50 });
    }

    #[test]
    fn zero_threshold_still_excludes_zero_scores() {
        let verdict = decide(&result("5", 0.0), 0.0, None);
        assert_eq!(verdict, Verdict::Unmatched { score: 0.0 });
    }
}
