use crate::types::Verdict;

/// Scores at or above this value are labelled REAL.
pub const DECISION_THRESHOLD: f64 = 0.5;

pub const INSUFFICIENT_CONFIDENCE: &str = "0.00%";
pub const UNAVAILABLE_CONFIDENCE: &str = "N/A";

/// Maps a score to its label and confidence string.
///
/// The confidence is always the raw score, i.e. the probability of REAL,
/// even when the label is FAKE: a FAKE verdict therefore reads below 50%.
pub fn decide(score: f64) -> (Verdict, String) {
    let verdict = if score >= DECISION_THRESHOLD {
        Verdict::Real
    } else {
        Verdict::Fake
    };
    (verdict, format_confidence(score))
}

/// Formats a probability as a percentage with two decimals, e.g. `88.08%`.
pub fn format_confidence(score: f64) -> String {
    format!("{:.2}%", score * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_is_real() {
        assert_eq!(decide(0.5), (Verdict::Real, "50.00%".to_string()));
        assert_eq!(decide(0.499_999).0, Verdict::Fake);
    }

    #[test]
    fn test_fake_reports_raw_score() {
        let (verdict, confidence) = decide(0.2);
        assert_eq!(verdict, Verdict::Fake);
        assert_eq!(confidence, "20.00%");
    }

    #[test]
    fn test_format_confidence() {
        assert_eq!(format_confidence(0.880_797_077_977_882_3), "88.08%");
        assert_eq!(format_confidence(1.0), "100.00%");
        assert_eq!(format_confidence(0.0), INSUFFICIENT_CONFIDENCE);
    }
}
