use std::fmt;

use serde::Serialize;

/// Placeholder shown wherever the model did not supply a text field.
pub const NOT_AVAILABLE: &str = "N/A";

/// Categorical hiring verdict returned by the model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum Verdict {
    StrongFit,
    ModerateFit,
    NotRecommended,
    /// Anything the model wrote that is not one of the three known labels.
    Other(String),
    #[default]
    Missing,
}

impl Verdict {
    /// Tolerant label parser: ignores case, spacing, underscores, hyphens and
    /// markdown emphasis, so "strong_fit", "**Strong Fit**" and "Strong-Fit."
    /// all map to `StrongFit`.
    pub fn from_label(raw: &str) -> Self {
        let trimmed = raw.trim().trim_matches(|c: char| c == '*' || c == '.' || c == '"');
        let trimmed = trimmed.trim();
        let key: String = trimmed
            .chars()
            .filter(|c| c.is_alphanumeric() || *c == '/')
            .flat_map(char::to_lowercase)
            .collect();

        match key.as_str() {
            "" | "n/a" | "na" | "none" | "null" => Verdict::Missing,
            "strongfit" => Verdict::StrongFit,
            "moderatefit" => Verdict::ModerateFit,
            "notrecommended" => Verdict::NotRecommended,
            _ => Verdict::Other(trimmed.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Verdict::StrongFit => "Strong Fit",
            Verdict::ModerateFit => "Moderate Fit",
            Verdict::NotRecommended => "Not Recommended",
            Verdict::Other(label) => label,
            Verdict::Missing => NOT_AVAILABLE,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<Verdict> for String {
    fn from(verdict: Verdict) -> Self {
        verdict.label().to_string()
    }
}

/// The ten structured fields interpreted from one model reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub score: Option<f64>,
    pub skill_match_pct: Option<f64>,
    pub experience_years: String,
    pub top_strengths: String,
    pub red_flags: String,
    pub fit_justification: String,
    pub why_not_selected: String,
    pub final_verdict: Verdict,
    pub one_line_recommendation: String,
    pub resume_summary: String,
}

impl Default for Evaluation {
    /// Zero for numeric fields, "N/A" for text.
    fn default() -> Self {
        Self {
            score: Some(0.0),
            skill_match_pct: Some(0.0),
            experience_years: NOT_AVAILABLE.to_string(),
            top_strengths: NOT_AVAILABLE.to_string(),
            red_flags: NOT_AVAILABLE.to_string(),
            fit_justification: NOT_AVAILABLE.to_string(),
            why_not_selected: NOT_AVAILABLE.to_string(),
            final_verdict: Verdict::Missing,
            one_line_recommendation: NOT_AVAILABLE.to_string(),
            resume_summary: NOT_AVAILABLE.to_string(),
        }
    }
}

/// Pipeline stage at which a candidate degraded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Extraction,
    Model,
    Interpretation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateIssue {
    pub stage: Stage,
    pub detail: String,
}

/// One row of the result set. Built once after interpretation, never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateResult {
    pub candidate: String,
    #[serde(flatten)]
    pub evaluation: Evaluation,
    /// Verbatim model reply (or the model failure description) for manual review.
    pub raw_reply: String,
    pub issues: Vec<CandidateIssue>,
}

impl CandidateResult {
    pub fn score(&self) -> Option<f64> {
        self.evaluation.score.filter(|s| s.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_known_labels() {
        assert_eq!(Verdict::from_label("Strong Fit"), Verdict::StrongFit);
        assert_eq!(Verdict::from_label("moderate_fit"), Verdict::ModerateFit);
        assert_eq!(Verdict::from_label("**Not Recommended**."), Verdict::NotRecommended);
    }

    #[test]
    fn test_verdict_missing_and_other() {
        assert_eq!(Verdict::from_label("  "), Verdict::Missing);
        assert_eq!(Verdict::from_label("N/A"), Verdict::Missing);
        assert_eq!(
            Verdict::from_label("Maybe later"),
            Verdict::Other("Maybe later".to_string())
        );
    }

    #[test]
    fn test_verdict_serializes_as_label() {
        let json = serde_json::to_string(&Verdict::ModerateFit).unwrap();
        assert_eq!(json, "\"Moderate Fit\"");
        let json = serde_json::to_string(&Verdict::Missing).unwrap();
        assert_eq!(json, "\"N/A\"");
    }

    #[test]
    fn test_non_finite_score_counts_as_missing() {
        let record = CandidateResult {
            candidate: "a.pdf".into(),
            evaluation: Evaluation {
                score: Some(f64::NAN),
                ..Evaluation::default()
            },
            raw_reply: String::new(),
            issues: vec![],
        };
        assert_eq!(record.score(), None);
    }
}
