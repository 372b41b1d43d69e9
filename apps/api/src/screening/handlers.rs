//! Axum route handlers for the Screening API.

use axum::{
    extract::{multipart::Field, Multipart, State},
    Json,
};
use chrono::Local;
use serde::Serialize;
use uuid::Uuid;

use crate::dashboard::{build_dashboard, Dashboard};
use crate::errors::AppError;
use crate::screening::pipeline::{ScreeningRequest, Upload};
use crate::screening::skills::SkillMap;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ScreeningResponse {
    pub run_id: Uuid,
    pub dashboard: Dashboard,
}

/// Raw multipart form before validation.
#[derive(Debug, Default)]
struct ScreeningForm {
    job_title: String,
    job_description: String,
    threshold: Option<String>,
    uploads: Vec<Upload>,
}

impl ScreeningForm {
    async fn read(multipart: &mut Multipart) -> Result<Self, AppError> {
        let mut form = ScreeningForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "job_title" => form.job_title = text(field).await?,
                "job_description" => form.job_description = text(field).await?,
                "threshold" => form.threshold = Some(text(field).await?),
                "resumes" => {
                    if let Some(upload) = read_upload(field).await? {
                        form.uploads.push(upload);
                    }
                }
                other => tracing::debug!(field = other, "Ignoring unknown form field"),
            }
        }

        Ok(form)
    }

    /// The input gate: nothing runs unless this passes.
    fn validate(self, default_threshold: u8) -> Result<ScreeningRequest, AppError> {
        if self.job_description.trim().is_empty() {
            return Err(AppError::Validation(
                "Please fill in all required fields: job_description cannot be empty".to_string(),
            ));
        }
        if self.uploads.is_empty() {
            return Err(AppError::Validation(
                "Please fill in all required fields: upload at least one resume PDF".to_string(),
            ));
        }

        let threshold = match self.threshold.as_deref().map(str::trim) {
            None | Some("") => default_threshold,
            Some(raw) => raw
                .parse::<u8>()
                .ok()
                .filter(|t| *t <= 100)
                .ok_or_else(|| {
                    AppError::Validation(format!(
                        "threshold must be an integer between 0 and 100, got '{raw}'"
                    ))
                })?,
        };

        Ok(ScreeningRequest {
            job_title: self.job_title.trim().to_string(),
            job_description: self.job_description,
            threshold,
            uploads: self.uploads,
        })
    }
}

async fn text(field: Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("unreadable form field: {e}")))
}

/// Empty file parts (no file chosen) are skipped; anything that is not a PDF
/// by name or content type is rejected.
async fn read_upload(field: Field<'_>) -> Result<Option<Upload>, AppError> {
    let file_name = field.file_name().unwrap_or_default().to_string();
    let is_pdf = file_name.to_ascii_lowercase().ends_with(".pdf")
        || field.content_type() == Some("application/pdf");

    let bytes = field
        .bytes()
        .await
        .map_err(|e| AppError::Validation(format!("failed to read upload '{file_name}': {e}")))?;

    if file_name.is_empty() && bytes.is_empty() {
        return Ok(None);
    }
    if !is_pdf {
        return Err(AppError::Validation(format!(
            "only PDF resumes are accepted, got '{file_name}'"
        )));
    }

    tracing::debug!(file_name = %file_name, bytes = bytes.len(), "Resume received");
    Ok(Some(Upload { file_name, bytes }))
}

/// POST /api/v1/screenings
///
/// Screens every uploaded resume against the job, then returns the dashboard:
/// threshold-filtered panels, best candidates, chart series and CSV downloads.
pub async fn handle_screening(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ScreeningResponse>, AppError> {
    let settings = &state.screener.settings;
    let request = ScreeningForm::read(&mut multipart)
        .await?
        .validate(settings.default_threshold)?;

    let run_id = Uuid::new_v4();
    let results = state.screener.screen(run_id, &request).await?;
    let dashboard = build_dashboard(
        &results,
        request.threshold,
        settings.empty_filter_policy,
        &Local::now(),
    )?;

    tracing::info!(
        %run_id,
        qualified = dashboard.qualified_count,
        best = dashboard.best.len(),
        "Dashboard ready"
    );

    Ok(Json(ScreeningResponse { run_id, dashboard }))
}

/// GET /api/v1/skills
///
/// The configured job title → skills map, for populating title pickers.
pub async fn handle_list_skills(State(state): State<AppState>) -> Json<SkillMap> {
    Json(state.screener.skills.as_ref().clone())
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    fn form(description: &str, threshold: Option<&str>, files: usize) -> ScreeningForm {
        ScreeningForm {
            job_title: "  Data Scientist ".into(),
            job_description: description.into(),
            threshold: threshold.map(String::from),
            uploads: (0..files)
                .map(|i| Upload {
                    file_name: format!("{i}.pdf"),
                    bytes: Bytes::from_static(b"%PDF-1.4"),
                })
                .collect(),
        }
    }

    #[test]
    fn test_validate_requires_description() {
        let err = form("   ", None, 1).validate(50).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("job_description")));
    }

    #[test]
    fn test_validate_requires_files() {
        let err = form("Build models", None, 0).validate(50).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("resume")));
    }

    #[test]
    fn test_validate_threshold_defaults_and_bounds() {
        assert_eq!(form("d", None, 1).validate(50).unwrap().threshold, 50);
        assert_eq!(form("d", Some(" "), 1).validate(65).unwrap().threshold, 65);
        assert_eq!(form("d", Some("0"), 1).validate(50).unwrap().threshold, 0);
        assert_eq!(form("d", Some("100"), 1).validate(50).unwrap().threshold, 100);
        assert!(form("d", Some("101"), 1).validate(50).is_err());
        assert!(form("d", Some("-1"), 1).validate(50).is_err());
        assert!(form("d", Some("fifty"), 1).validate(50).is_err());
    }

    #[test]
    fn test_validate_trims_job_title() {
        let request = form("d", None, 2).validate(50).unwrap();
        assert_eq!(request.job_title, "Data Scientist");
        assert_eq!(request.uploads.len(), 2);
    }
}
