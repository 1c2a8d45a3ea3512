//! Source file parsing and text extraction.

use axon_core::{AppError, AppResult};
use std::fs;
use std::path::Path;

/// Content type classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Pdf,
    Markdown,
    PlainText,
    Unknown,
}

impl ContentType {
    /// Detect content type from file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("pdf") => Self::Pdf,
            Some("md") | Some("markdown") => Self::Markdown,
            Some("txt") | Some("text") => Self::PlainText,
            _ => Self::Unknown,
        }
    }

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Markdown => "markdown",
            Self::PlainText => "text",
            Self::Unknown => "unknown",
        }
    }
}

/// Parse a source file and extract clean text.
pub fn parse_file(path: &Path) -> AppResult<String> {
    match ContentType::from_path(path) {
        ContentType::Pdf => {
            let bytes = fs::read(path)
                .map_err(|e| AppError::Knowledge(format!("Failed to read {:?}: {}", path, e)))?;
            extract_pdf_text(&bytes)
        }
        ContentType::Markdown => Ok(clean_markdown(&read_text(path)?)),
        ContentType::PlainText => read_text(path),
        ContentType::Unknown => {
            let raw = read_text(path)?;
            if is_likely_text(&raw) {
                Ok(raw)
            } else {
                tracing::warn!("Skipping likely binary file: {:?}", path);
                Err(AppError::Knowledge("Binary file not supported".to_string()))
            }
        }
    }
}

/// Extract the text layer of an in-memory PDF document.
///
/// The PDF parser panics on some malformed inputs; panics are turned into
/// errors so one bad upload cannot take the process down.
pub fn extract_pdf_text(bytes: &[u8]) -> AppResult<String> {
    let extracted = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes))
        .map_err(|_| AppError::Knowledge("PDF parser crashed on malformed input".to_string()))?
        .map_err(|e| AppError::Knowledge(format!("Failed to extract PDF text: {}", e)))?;

    Ok(normalize_whitespace(&extracted))
}

fn read_text(path: &Path) -> AppResult<String> {
    fs::read_to_string(path)
        .map_err(|e| AppError::Knowledge(format!("Failed to read {:?}: {}", path, e)))
}

/// Collapse runs of blank lines and trailing spaces left by PDF extraction.
fn normalize_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut blank_run = 0;

    for line in text.lines() {
        let trimmed = line.trim_end();
        if trimmed.trim().is_empty() {
            blank_run += 1;
            if blank_run == 1 && !result.is_empty() {
                result.push('\n');
            }
            continue;
        }
        blank_run = 0;
        result.push_str(trimmed);
        result.push('\n');
    }

    result.trim().to_string()
}

/// Clean markdown by removing header markers and fences.
fn clean_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for line in text.lines() {
        let trimmed = line.trim_start_matches('#').trim();

        if trimmed.starts_with("---") || trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            continue;
        }

        if trimmed.is_empty() {
            if !result.ends_with("\n\n") {
                result.push('\n');
            }
        } else {
            result.push_str(trimmed);
            result.push('\n');
        }
    }

    result.trim().to_string()
}

/// Check if text is likely text (not binary).
fn is_likely_text(data: &str) -> bool {
    !data.contains('\0')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_detection() {
        assert_eq!(ContentType::from_path(Path::new("policy.pdf")), ContentType::Pdf);
        assert_eq!(ContentType::from_path(Path::new("POLICY.PDF")), ContentType::Pdf);
        assert_eq!(ContentType::from_path(Path::new("notes.md")), ContentType::Markdown);
        assert_eq!(ContentType::from_path(Path::new("file.txt")), ContentType::PlainText);
        assert_eq!(ContentType::from_path(Path::new("archive.zip")), ContentType::Unknown);
    }

    #[test]
    fn test_clean_markdown_keeps_paragraphs() {
        let input = "# Header\n\nSome text\n\n```rust\ncode\n```\n\nMore text";
        let output = clean_markdown(input);
        assert!(output.starts_with("Header"));
        assert!(output.contains("Some text"));
        assert!(output.contains("\n\nMore text"));
        assert!(!output.contains("```"));
    }

    #[test]
    fn test_normalize_whitespace() {
        let input = "Expense policy   \n\n\n\nReceipts are required.\n   \n";
        assert_eq!(normalize_whitespace(input), "Expense policy\n\nReceipts are required.");
    }

    #[test]
    fn test_garbage_pdf_is_an_error() {
        let result = extract_pdf_text(b"definitely not a pdf");
        assert!(matches!(result, Err(AppError::Knowledge(_))));
    }

    #[test]
    fn test_parse_plain_text_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("faq.txt");
        fs::write(&path, "Q: Where?\nA: Here.").unwrap();
        assert_eq!(parse_file(&path).unwrap(), "Q: Where?\nA: Here.");
    }
}
