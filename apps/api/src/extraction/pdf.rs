use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use super::{ExtractionError, PageOcr, TextExtractor};

/// Extracts the embedded text layer page by page, falling back to OCR for
/// pages whose text layer is blank (scanned resumes).
#[derive(Clone, Default)]
pub struct PdfTextExtractor {
    ocr: Option<Arc<dyn PageOcr>>,
}

impl PdfTextExtractor {
    pub fn new(ocr: Option<Arc<dyn PageOcr>>) -> Self {
        Self { ocr }
    }

    fn text_layer(bytes: &[u8]) -> Result<Vec<String>, ExtractionError> {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
            .map_err(|e| ExtractionError::Parse(e.to_string()))
    }
}

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    /// Pages are joined in order, each followed by `\n`. If OCR fails on a
    /// page, the pages read so far come back inside `ExtractionError::Incomplete`.
    #[tracing::instrument(skip(self), fields(path = %path.display()))]
    async fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        let bytes = tokio::fs::read(path).await?;

        // pdf-extract is synchronous and may panic on malformed input.
        let pages = tokio::task::spawn_blocking(move || Self::text_layer(&bytes))
            .await
            .map_err(|e| {
                if e.is_panic() {
                    ExtractionError::Parse("PDF parser panicked on malformed input".to_string())
                } else {
                    ExtractionError::Task(e.to_string())
                }
            })??;

        let mut text = String::new();
        let mut ocr_pages = 0usize;

        for (index, page_text) in pages.into_iter().enumerate() {
            let chosen = match &self.ocr {
                Some(ocr) if page_text.trim().is_empty() => {
                    ocr_pages += 1;
                    match ocr.page_text(path, index + 1).await {
                        Ok(recognised) => recognised,
                        Err(e) => {
                            tracing::warn!(page = index + 1, error = %e, "OCR failed; keeping text read so far");
                            return Err(ExtractionError::Incomplete {
                                partial: text,
                                source: Box::new(e),
                            });
                        }
                    }
                }
                _ => page_text,
            };
            text.push_str(&chosen);
            text.push('\n');
        }

        tracing::info!(chars = text.len(), ocr_pages, "PDF text extraction complete");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use super::*;
    use crate::extraction::TesseractOcr;

    /// Builds a minimal PDF with one page per entry; `None` is a page with no
    /// text layer.
    fn pdf_with_pages(pages: &[Option<&str>]) -> Vec<u8> {
        let kids: Vec<String> = (0..pages.len())
            .map(|i| format!("{} 0 R", 4 + 2 * i))
            .collect();

        let mut objects = vec![
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            format!(
                "<< /Type /Pages /Kids [{}] /Count {} >>",
                kids.join(" "),
                pages.len()
            ),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
        ];
        for (i, page) in pages.iter().enumerate() {
            let stream = match page {
                Some(line) => format!("BT /F1 12 Tf 72 720 Td ({line}) Tj ET"),
                None => String::new(),
            };
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
                 /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
                5 + 2 * i
            ));
            objects.push(format!(
                "<< /Length {} >>\nstream\n{stream}\nendstream",
                stream.len()
            ));
        }

        let mut pdf = String::from("%PDF-1.4\n");
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.push_str(&format!("{} 0 obj\n{body}\nendobj\n", i + 1));
        }

        let xref_offset = pdf.len();
        pdf.push_str(&format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1));
        for offset in offsets {
            pdf.push_str(&format!("{offset:010} 00000 n \n"));
        }
        pdf.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
            objects.len() + 1
        ));
        pdf.into_bytes()
    }

    fn write_pdf(pages: &[Option<&str>]) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        file.write_all(&pdf_with_pages(pages)).unwrap();
        file
    }

    /// Answers `OCR page N`, or fails every call when `fail` is set.
    struct RecordingOcr {
        pages: Mutex<Vec<usize>>,
        fail: bool,
    }

    impl RecordingOcr {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                pages: Mutex::new(Vec::new()),
                fail,
            })
        }
    }

    #[async_trait]
    impl PageOcr for RecordingOcr {
        async fn page_text(&self, _pdf: &Path, page: usize) -> Result<String, ExtractionError> {
            self.pages.lock().unwrap().push(page);
            if self.fail {
                return Err(ExtractionError::ToolMissing {
                    tool: "tesseract".into(),
                });
            }
            Ok(format!("OCR page {page}"))
        }
    }

    fn position(haystack: &str, needle: &str) -> usize {
        haystack
            .find(needle)
            .unwrap_or_else(|| panic!("'{needle}' missing from {haystack:?}"))
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = PdfTextExtractor::default();

        let err = extractor
            .extract(&dir.path().join("absent.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Io(_)));
    }

    #[tokio::test]
    async fn test_non_pdf_bytes_fail_without_panicking() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"this is not a pdf at all").unwrap();
        let extractor = PdfTextExtractor::default();

        let err = extractor.extract(file.path()).await.unwrap_err();
        assert!(matches!(err, ExtractionError::Parse(_)));
    }

    #[tokio::test]
    async fn test_text_layer_pages_come_back_in_order() {
        let file = write_pdf(&[Some("Jane Doe Python Engineer"), Some("Referees on request")]);
        let extractor = PdfTextExtractor::default();

        let text = extractor.extract(file.path()).await.unwrap();

        assert!(position(&text, "Jane Doe") < position(&text, "Referees"));
        assert!(text.ends_with('\n'));
    }

    #[tokio::test]
    async fn test_only_blank_pages_go_to_ocr_in_place() {
        let file = write_pdf(&[
            Some("Jane Doe Python Engineer"),
            None,
            Some("Referees on request"),
        ]);
        let ocr = RecordingOcr::new(false);
        let extractor = PdfTextExtractor::new(Some(ocr.clone()));

        let text = extractor.extract(file.path()).await.unwrap();

        assert_eq!(*ocr.pages.lock().unwrap(), vec![2]);
        let first = position(&text, "Jane Doe");
        let scanned = position(&text, "OCR page 2");
        let last = position(&text, "Referees");
        assert!(first < scanned && scanned < last);
    }

    #[tokio::test]
    async fn test_blank_page_without_ocr_is_left_blank() {
        let file = write_pdf(&[Some("Jane Doe Python Engineer"), None]);
        let extractor = PdfTextExtractor::new(None);

        let text = extractor.extract(file.path()).await.unwrap();
        assert!(text.contains("Jane Doe"));
    }

    #[tokio::test]
    async fn test_ocr_failure_keeps_text_read_so_far() {
        let file = write_pdf(&[Some("Jane Doe Python Engineer"), None, Some("Never reached")]);
        let ocr = RecordingOcr::new(true);
        let extractor = PdfTextExtractor::new(Some(ocr.clone()));

        let err = extractor.extract(file.path()).await.unwrap_err();

        assert!(err.partial_text().contains("Jane Doe"));
        assert!(!err.partial_text().contains("Never reached"));
        assert_eq!(err.to_string(), "tesseract not found on PATH");
        assert_eq!(*ocr.pages.lock().unwrap(), vec![2]);
    }

    #[tokio::test]
    async fn test_missing_ocr_tools_keep_text_layer_pages() {
        let file = write_pdf(&[Some("Jane Doe Python Engineer"), None]);
        let ocr = TesseractOcr::new(
            "screener-definitely-missing-pdftoppm",
            "screener-definitely-missing-tesseract",
        );
        let extractor = PdfTextExtractor::new(Some(Arc::new(ocr)));

        let err = extractor.extract(file.path()).await.unwrap_err();

        match err {
            ExtractionError::Incomplete { partial, source } => {
                assert!(partial.contains("Jane Doe"));
                assert!(matches!(*source, ExtractionError::ToolMissing { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
