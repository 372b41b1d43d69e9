use std::path::Path;
use std::process::{Output, Stdio};

use async_trait::async_trait;
use tokio::process::Command;

use super::ExtractionError;

/// Recognises the text of a single PDF page that has no text layer.
#[async_trait]
pub trait PageOcr: Send + Sync {
    /// `page` is 1-based.
    async fn page_text(&self, pdf: &Path, page: usize) -> Result<String, ExtractionError>;
}

/// Pages with no text layer are rasterised at this resolution before OCR.
pub const RENDER_DPI: u32 = 300;

/// OCR backend built on the poppler `pdftoppm` rasteriser and the `tesseract` CLI.
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    pdftoppm_bin: String,
    tesseract_bin: String,
}

impl TesseractOcr {
    pub fn new(pdftoppm_bin: impl Into<String>, tesseract_bin: impl Into<String>) -> Self {
        Self {
            pdftoppm_bin: pdftoppm_bin.into(),
            tesseract_bin: tesseract_bin.into(),
        }
    }
}

#[async_trait]
impl PageOcr for TesseractOcr {
    /// Renders one page of `pdf` and returns the recognised text.
    #[tracing::instrument(skip(self), fields(pdf = %pdf.display()))]
    async fn page_text(&self, pdf: &Path, page: usize) -> Result<String, ExtractionError> {
        let work_dir = tempfile::Builder::new().prefix("screener-ocr-").tempdir()?;
        let image_stem = work_dir.path().join(format!("page-{page}"));
        let page_arg = page.to_string();

        let mut render = Command::new(&self.pdftoppm_bin);
        render
            .arg("-r")
            .arg(RENDER_DPI.to_string())
            .arg("-f")
            .arg(&page_arg)
            .arg("-l")
            .arg(&page_arg)
            .arg("-singlefile")
            .arg("-png")
            .arg(pdf)
            .arg(&image_stem);
        run_tool(&mut render, &self.pdftoppm_bin, page).await?;

        let image = image_stem.with_extension("png");
        let mut recognise = Command::new(&self.tesseract_bin);
        recognise.arg(&image).arg("stdout");
        let output = run_tool(&mut recognise, &self.tesseract_bin, page).await?;

        let text = String::from_utf8_lossy(&output.stdout).to_string();
        tracing::debug!(page, chars = text.len(), "OCR complete");
        Ok(text)
    }
}

async fn run_tool(command: &mut Command, tool: &str, page: usize) -> Result<Output, ExtractionError> {
    let output = command
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ExtractionError::ToolMissing {
                    tool: tool.to_string(),
                }
            } else {
                ExtractionError::Io(e)
            }
        })?;

    if !output.status.success() {
        return Err(ExtractionError::ToolFailed {
            tool: tool.to_string(),
            page,
            code: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(output)
}
