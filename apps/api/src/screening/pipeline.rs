//! Batch pipeline: extract → trim → prompt → call → interpret, one candidate
//! at a time in upload order.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::ScreeningSettings;
use crate::errors::AppError;
use crate::extraction::{trim_cv, TextExtractor};
use crate::llm_client::ChatModel;
use crate::models::candidate::{CandidateIssue, CandidateResult, Evaluation, Stage};
use crate::screening::interpreter::interpret;
use crate::screening::prompts::build_prompt;
use crate::screening::skills::SkillMap;

/// One uploaded resume.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Bytes,
}

/// Validated input for one screening run.
#[derive(Debug, Clone)]
pub struct ScreeningRequest {
    pub job_title: String,
    pub job_description: String,
    pub threshold: u8,
    pub uploads: Vec<Upload>,
}

/// Everything a screening run needs. Read-only and cheap to clone.
#[derive(Clone)]
pub struct Screener {
    pub extractor: Arc<dyn TextExtractor>,
    pub model: Arc<dyn ChatModel>,
    pub skills: Arc<SkillMap>,
    pub settings: ScreeningSettings,
}

/// Trimmed resume text for one candidate, plus any extraction failure.
struct PreparedCandidate {
    name: String,
    cv_text: String,
    issues: Vec<CandidateIssue>,
}

impl Screener {
    /// Runs the whole batch. Returns one record per upload, in upload order.
    /// Per-candidate failures are recorded on that candidate and never abort
    /// the batch.
    pub async fn screen(
        &self,
        run_id: Uuid,
        request: &ScreeningRequest,
    ) -> Result<Vec<CandidateResult>, AppError> {
        info!(%run_id, candidates = request.uploads.len(), "Screening run started");

        let prepared = self.prepare(run_id, &request.uploads).await?;

        let mut results = Vec::with_capacity(prepared.len());
        for candidate in prepared {
            results.push(self.evaluate(run_id, request, candidate).await);
        }

        info!(%run_id, candidates = results.len(), "Screening run complete");
        Ok(results)
    }

    /// Writes uploads to a scoped temp dir and extracts each one. The
    /// directory is removed when this returns, whatever the outcome.
    async fn prepare(
        &self,
        run_id: Uuid,
        uploads: &[Upload],
    ) -> Result<Vec<PreparedCandidate>, AppError> {
        let workspace = tempfile::Builder::new()
            .prefix("screener-run-")
            .tempdir()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to create temp dir: {e}")))?;

        let mut taken = HashSet::new();
        let mut prepared = Vec::with_capacity(uploads.len());

        for (index, upload) in uploads.iter().enumerate() {
            let path = workspace_path(workspace.path(), index, &upload.file_name, &mut taken);
            let mut issues = Vec::new();

            let text = match tokio::fs::write(&path, &upload.bytes).await {
                Ok(()) => self.extractor.extract(&path).await,
                Err(e) => Err(e.into()),
            };

            let text = text.unwrap_or_else(|e| {
                warn!(%run_id, candidate = %upload.file_name, stage = "extraction", error = %e, "Could not read resume");
                issues.push(CandidateIssue {
                    stage: Stage::Extraction,
                    detail: e.to_string(),
                });
                // Pages read before the failure stay in front of the error note.
                format!("{}Error reading PDF: {e}", e.partial_text())
            });

            prepared.push(PreparedCandidate {
                name: upload.file_name.clone(),
                cv_text: trim_cv(&text, self.settings.max_cv_lines),
                issues,
            });
        }

        Ok(prepared)
    }

    async fn evaluate(
        &self,
        run_id: Uuid,
        request: &ScreeningRequest,
        candidate: PreparedCandidate,
    ) -> CandidateResult {
        let PreparedCandidate {
            name,
            cv_text,
            mut issues,
        } = candidate;

        let prompt = build_prompt(
            self.settings.response_format,
            &cv_text,
            &request.job_title,
            &request.job_description,
            &self.skills,
        );

        let (evaluation, raw_reply) = match self.model.complete(&prompt).await {
            Ok(reply) => {
                let interpretation = interpret(self.settings.response_format, &reply);
                if !interpretation.problems.is_empty() {
                    warn!(
                        %run_id,
                        candidate = %name,
                        stage = "interpretation",
                        problems = interpretation.problems.len(),
                        "Model reply only partly readable"
                    );
                    issues.push(CandidateIssue {
                        stage: Stage::Interpretation,
                        detail: interpretation.problems.join("; "),
                    });
                }
                (interpretation.evaluation, reply)
            }
            Err(e) => {
                warn!(%run_id, candidate = %name, stage = "model", error = %e, "Model call failed");
                issues.push(CandidateIssue {
                    stage: Stage::Model,
                    detail: e.to_string(),
                });
                let no_reply = Evaluation {
                    score: None,
                    skill_match_pct: None,
                    ..Evaluation::default()
                };
                (no_reply, format!("API Error: {e}"))
            }
        };

        info!(
            %run_id,
            candidate = %name,
            score = ?evaluation.score,
            verdict = %evaluation.final_verdict,
            "Candidate evaluated"
        );

        CandidateResult {
            candidate: name,
            evaluation,
            raw_reply,
            issues,
        }
    }
}

/// On-disk location for an upload: its final path component only, prefixed
/// with the upload index when the name is unusable or already taken.
fn workspace_path(dir: &Path, index: usize, file_name: &str, taken: &mut HashSet<String>) -> PathBuf {
    let base = Path::new(file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .map(String::from);

    let name = match base {
        Some(n) if taken.insert(n.clone()) => n,
        Some(n) => format!("{index}-{n}"),
        None => format!("{index}-upload.pdf"),
    };
    dir.join(name)
}
