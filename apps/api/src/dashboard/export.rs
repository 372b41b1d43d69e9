use chrono::{DateTime, TimeZone};
use serde::Serialize;
use thiserror::Error;

use crate::models::candidate::CandidateResult;

pub const CSV_MIME: &str = "text/csv";

pub const CSV_HEADER: [&str; 12] = [
    "Candidate",
    "Score",
    "Final Verdict",
    "Skill Match %",
    "Experience (Years)",
    "Top Strengths",
    "Red Flags",
    "Fit Justification",
    "Why Not Selected",
    "One Line Recommendation",
    "Resume Summary",
    "Full AI Analysis",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV buffer flush failed: {0}")]
    Flush(String),

    #[error("CSV output is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// A downloadable file carried inline in the dashboard response.
#[derive(Debug, Clone, Serialize)]
pub struct CsvDownload {
    pub label: String,
    pub file_name: String,
    pub mime: &'static str,
    pub rows: usize,
    pub content: String,
}

impl CsvDownload {
    pub fn build<Tz: TimeZone>(
        label: &str,
        file_stem: &str,
        records: &[&CandidateResult],
        now: &DateTime<Tz>,
    ) -> Result<Self, ExportError>
    where
        Tz::Offset: std::fmt::Display,
    {
        Ok(Self {
            label: label.to_string(),
            file_name: timestamped_file_name(file_stem, now),
            mime: CSV_MIME,
            rows: records.len(),
            content: to_csv(records)?,
        })
    }
}

/// `<stem>_<YYYY-MM-DD_HH-MM>.csv`, minute resolution.
pub fn timestamped_file_name<Tz: TimeZone>(stem: &str, now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{stem}_{}.csv", now.format("%Y-%m-%d_%H-%M"))
}

/// Renders records as CSV with a header row, one row per record.
pub fn to_csv(records: &[&CandidateResult]) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    for record in records {
        let e = &record.evaluation;
        writer.write_record([
            record.candidate.as_str(),
            format_number(e.score).as_str(),
            e.final_verdict.label(),
            format_number(e.skill_match_pct).as_str(),
            e.experience_years.as_str(),
            e.top_strengths.as_str(),
            e.red_flags.as_str(),
            e.fit_justification.as_str(),
            e.why_not_selected.as_str(),
            e.one_line_recommendation.as_str(),
            e.resume_summary.as_str(),
            record.raw_reply.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Flush(e.to_string()))?;
    Ok(String::from_utf8(bytes)?)
}

/// Whole numbers print without a fractional part; missing values are empty.
pub fn format_number(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() && v.fract() == 0.0 => format!("{v:.0}"),
        Some(v) if v.is_finite() => v.to_string(),
        _ => String::new(),
    }
}
