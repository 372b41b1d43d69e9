//! Results aggregation: threshold filtering, best-candidate selection, chart
//! series and CSV downloads for one screening run.

use std::str::FromStr;

use chrono::{DateTime, TimeZone};
use serde::Serialize;

use crate::models::candidate::{CandidateResult, Verdict};

pub mod export;

use export::{CsvDownload, ExportError};

pub const FILTERED_EXPORT_STEM: &str = "Filtered_Candidates";
pub const BEST_EXPORT_STEM: &str = "Best_Candidate";

/// What to show when no candidate reaches the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyFilterPolicy {
    /// Show the empty set as-is.
    Strict,
    /// Show every candidate and attach a warning.
    FallbackToAll,
}

impl FromStr for EmptyFilterPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(EmptyFilterPolicy::Strict),
            "fallback" | "fallback_to_all" | "lenient" => Ok(EmptyFilterPolicy::FallbackToAll),
            other => Err(format!("unknown empty filter policy '{other}'")),
        }
    }
}

/// One bar of the per-candidate score chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBar {
    pub candidate: String,
    pub score: Option<f64>,
    pub verdict: Verdict,
}

/// One slice of the verdict distribution chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerdictSlice {
    pub verdict: Verdict,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub threshold: u8,
    pub total_candidates: usize,
    /// Candidates whose score reached the threshold.
    pub qualified_count: usize,
    pub warning: Option<String>,
    /// Detail panels for the shown candidates, upload order.
    pub candidates: Vec<CandidateResult>,
    /// Everyone tied at the run's top score.
    pub best: Vec<CandidateResult>,
    pub score_chart: Vec<ScoreBar>,
    pub verdict_chart: Vec<VerdictSlice>,
    pub downloads: Vec<CsvDownload>,
}

/// Records scoring at least `threshold`, in their original order. Missing
/// scores never qualify.
pub fn filter_by_threshold(results: &[CandidateResult], threshold: u8) -> Vec<&CandidateResult> {
    let threshold = f64::from(threshold);
    results
        .iter()
        .filter(|r| r.score().is_some_and(|s| s >= threshold))
        .collect()
}

/// All records tied at the maximum score present. Empty when nobody has a score.
pub fn best_candidates(results: &[CandidateResult]) -> Vec<&CandidateResult> {
    let Some(max) = results.iter().filter_map(|r| r.score()).reduce(f64::max) else {
        return Vec::new();
    };
    results.iter().filter(|r| r.score() == Some(max)).collect()
}

/// Verdict counts in first-seen order.
pub fn verdict_distribution(records: &[&CandidateResult]) -> Vec<VerdictSlice> {
    let mut slices: Vec<VerdictSlice> = Vec::new();
    for record in records {
        let verdict = &record.evaluation.final_verdict;
        match slices.iter_mut().find(|s| &s.verdict == verdict) {
            Some(slice) => slice.count += 1,
            None => slices.push(VerdictSlice {
                verdict: verdict.clone(),
                count: 1,
            }),
        }
    }
    slices
}

pub fn build_dashboard<Tz: TimeZone>(
    results: &[CandidateResult],
    threshold: u8,
    policy: EmptyFilterPolicy,
    now: &DateTime<Tz>,
) -> Result<Dashboard, ExportError>
where
    Tz::Offset: std::fmt::Display,
{
    let qualified = filter_by_threshold(results, threshold);
    let qualified_count = qualified.len();

    let (shown, warning) = match policy {
        EmptyFilterPolicy::FallbackToAll if qualified.is_empty() && !results.is_empty() => (
            results.iter().collect::<Vec<_>>(),
            Some(format!(
                "No candidate reached the minimum score of {threshold}; showing all {} candidates.",
                results.len()
            )),
        ),
        _ => (qualified, None),
    };
    let best = best_candidates(results);

    let score_chart = shown
        .iter()
        .map(|r| ScoreBar {
            candidate: r.candidate.clone(),
            score: r.score(),
            verdict: r.evaluation.final_verdict.clone(),
        })
        .collect();
    let verdict_chart = verdict_distribution(&shown);

    let downloads = vec![
        CsvDownload::build("Download All Filtered Candidates", FILTERED_EXPORT_STEM, &shown, now)?,
        CsvDownload::build("Download Best Candidate(s)", BEST_EXPORT_STEM, &best, now)?,
    ];

    Ok(Dashboard {
        threshold,
        total_candidates: results.len(),
        qualified_count,
        warning,
        candidates: shown.into_iter().cloned().collect(),
        best: best.into_iter().cloned().collect(),
        score_chart,
        verdict_chart,
        downloads,
    })
}
