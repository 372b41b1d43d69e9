use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use crate::dashboard::EmptyFilterPolicy;
use crate::screening::prompts::ResponseFormat;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub openrouter_api_keys: Vec<String>,
    pub port: u16,
    pub rust_log: String,
    pub skill_map_path: Option<PathBuf>,
    pub max_upload_bytes: usize,
    pub screening: ScreeningSettings,
    pub ocr: OcrSettings,
}

/// Knobs that shape a single screening run.
#[derive(Debug, Clone)]
pub struct ScreeningSettings {
    pub response_format: ResponseFormat,
    pub empty_filter_policy: EmptyFilterPolicy,
    pub max_cv_lines: usize,
    pub default_threshold: u8,
}

impl Default for ScreeningSettings {
    fn default() -> Self {
        Self {
            response_format: ResponseFormat::Json,
            empty_filter_policy: EmptyFilterPolicy::Strict,
            max_cv_lines: 40,
            default_threshold: 50,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OcrSettings {
    pub enabled: bool,
    pub pdftoppm_bin: String,
    pub tesseract_bin: String,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            pdftoppm_bin: "pdftoppm".to_string(),
            tesseract_bin: "tesseract".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let openrouter_api_keys = parse_key_pool(&require_env("OPENROUTER_API_KEYS")?);
        if openrouter_api_keys.is_empty() {
            bail!("OPENROUTER_API_KEYS must contain at least one non-empty key");
        }

        let threshold = optional_env("DEFAULT_THRESHOLD")
            .map(|v| v.parse::<u8>())
            .transpose()
            .context("DEFAULT_THRESHOLD must be an integer between 0 and 100")?
            .unwrap_or(50);
        if threshold > 100 {
            bail!("DEFAULT_THRESHOLD must be an integer between 0 and 100");
        }

        let screening = ScreeningSettings {
            response_format: optional_env("RESPONSE_FORMAT")
                .map(|v| v.parse::<ResponseFormat>())
                .transpose()
                .map_err(anyhow::Error::msg)
                .context("RESPONSE_FORMAT must be 'json' or 'markdown'")?
                .unwrap_or(ResponseFormat::Json),
            empty_filter_policy: optional_env("EMPTY_FILTER_POLICY")
                .map(|v| v.parse::<EmptyFilterPolicy>())
                .transpose()
                .map_err(anyhow::Error::msg)
                .context("EMPTY_FILTER_POLICY must be 'strict' or 'fallback'")?
                .unwrap_or(EmptyFilterPolicy::Strict),
            max_cv_lines: optional_env("MAX_CV_LINES")
                .map(|v| v.parse::<usize>())
                .transpose()
                .context("MAX_CV_LINES must be a positive integer")?
                .unwrap_or(40),
            default_threshold: threshold,
        };

        let ocr = OcrSettings {
            enabled: optional_env("OCR_ENABLED")
                .map(|v| v.parse::<bool>())
                .transpose()
                .context("OCR_ENABLED must be 'true' or 'false'")?
                .unwrap_or(true),
            pdftoppm_bin: optional_env("PDFTOPPM_BIN").unwrap_or_else(|| "pdftoppm".to_string()),
            tesseract_bin: optional_env("TESSERACT_BIN")
                .unwrap_or_else(|| "tesseract".to_string()),
        };

        let max_upload_mb = optional_env("MAX_UPLOAD_MB")
            .map(|v| v.parse::<usize>())
            .transpose()
            .context("MAX_UPLOAD_MB must be a positive integer")?
            .unwrap_or(25);

        Ok(Config {
            openrouter_api_keys,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            skill_map_path: optional_env("SKILL_MAP_PATH").map(PathBuf::from),
            max_upload_bytes: max_upload_mb * 1024 * 1024,
            screening,
            ocr,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Unset and blank variables both count as absent.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Splits a comma-separated credential list, dropping blanks.
fn parse_key_pool(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect()
}
