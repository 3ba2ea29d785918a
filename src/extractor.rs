//! Bounded text extraction from documents.
//!
//! Extraction is dispatched through a capability table mapping extensions to
//! strategies. An extension without a registered strategy yields a typed
//! [`Error::UnsupportedFormat`] rather than a silent empty result, so callers
//! can tell "format we cannot read" apart from "file with no text".

use crate::config::ExtractionConfig;
use crate::error::{Error, Result};
use calamine::{Reader, Xls, Xlsx, open_workbook};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fs;
use std::io::{Read, Seek};
use std::path::Path;
use tracing::{debug, warn};

/// Extraction strategy resolved from a file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractStrategy {
    /// Direct bounded read of UTF-8 text.
    PlainText,
    /// PDF text extraction.
    Pdf,
    /// Word document paragraph/table walk.
    Word,
    /// Spreadsheet sheet/row summary.
    Spreadsheet,
}

static STRATEGIES: Lazy<HashMap<&'static str, ExtractStrategy>> = Lazy::new(|| {
    [
        ("txt", ExtractStrategy::PlainText),
        ("md", ExtractStrategy::PlainText),
        ("csv", ExtractStrategy::PlainText),
        ("srt", ExtractStrategy::PlainText),
        ("pdf", ExtractStrategy::Pdf),
        ("docx", ExtractStrategy::Word),
        ("xlsx", ExtractStrategy::Spreadsheet),
        ("xls", ExtractStrategy::Spreadsheet),
    ]
    .into_iter()
    .collect()
});

/// Extracts representative text from supported document formats.
///
/// Output is bounded: at most `max_text_length` characters per file, and for
/// PDFs at most `max_pdf_pages` pages (where the document marks page breaks).
pub struct ContentExtractor {
    max_text_length: usize,
    max_pdf_pages: usize,
}

impl ContentExtractor {
    /// Creates an extractor from the extraction configuration.
    #[must_use]
    pub fn new(extraction: &ExtractionConfig) -> Self {
        Self {
            max_text_length: extraction.max_text_length,
            max_pdf_pages: extraction.max_pdf_pages,
        }
    }

    /// Resolves the extraction strategy for a file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFormat`] when no strategy is registered
    /// for the file's extension. Legacy binary formats (`doc`, `ppt`,
    /// `pptx`) land here: no pure-Rust capability is wired up for them.
    pub fn strategy_for(path: &Path) -> Result<ExtractStrategy> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        STRATEGIES
            .get(extension.as_str())
            .copied()
            .ok_or_else(|| Error::unsupported(path, extension))
    }

    /// Returns true if an extraction strategy exists for the file.
    #[must_use]
    pub fn supports(path: &Path) -> bool {
        Self::strategy_for(path).is_ok()
    }

    /// Extracts bounded text from a file.
    ///
    /// # Errors
    ///
    /// Returns an error when the format is unsupported or the document
    /// cannot be read or parsed. All errors here are per-file recoverable.
    pub fn extract(&self, path: &Path) -> Result<String> {
        let strategy = Self::strategy_for(path)?;
        debug!("Extracting {:?} via {:?}", path, strategy);

        let text = match strategy {
            ExtractStrategy::PlainText => self.extract_plain_text(path)?,
            ExtractStrategy::Pdf => self.extract_pdf(path)?,
            ExtractStrategy::Word => self.extract_word(path)?,
            ExtractStrategy::Spreadsheet => self.extract_spreadsheet(path)?,
        };

        Ok(clamp_chars(&clean_text(&text), self.max_text_length))
    }

    fn extract_plain_text(&self, path: &Path) -> Result<String> {
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Ok(clamp_chars(&text, self.max_text_length))
    }

    fn extract_pdf(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;

        // pdf-extract can panic on malformed font programs; contain it.
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem(&bytes)
        }));

        let text = match outcome {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                return Err(Error::extraction(path, format!("pdf extraction failed: {e}")));
            }
            Err(_) => {
                warn!("PDF extraction panicked for {:?}", path);
                return Err(Error::extraction(
                    path,
                    "pdf extraction panicked, file may contain malformed fonts",
                ));
            }
        };

        Ok(clamp_pages(&text, self.max_pdf_pages).to_string())
    }

    fn extract_word(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
        let document = docx_rs::read_docx(&bytes)
            .map_err(|e| Error::extraction(path, format!("failed to parse document: {e}")))?;

        let mut text = String::new();
        for child in &document.document.children {
            append_document_child(child, &mut text);
            // Chars are clamped at the end; bytes are a cheap early cutoff.
            if text.len() >= self.max_text_length * 4 {
                break;
            }
        }

        Ok(text)
    }

    fn extract_spreadsheet(&self, path: &Path) -> Result<String> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        // Budget in bytes, roughly proportional to the char bound; the final
        // clamp enforces the exact limit.
        let budget = self.max_text_length * 4;

        let text = if extension == "xls" {
            let mut workbook: Xls<_> = open_workbook(path)
                .map_err(|e| Error::extraction(path, format!("failed to open workbook: {e}")))?;
            collect_sheet_text(&mut workbook, budget)
        } else {
            let mut workbook: Xlsx<_> = open_workbook(path)
                .map_err(|e| Error::extraction(path, format!("failed to open workbook: {e}")))?;
            collect_sheet_text(&mut workbook, budget)
        };

        Ok(text)
    }
}

/// Walks one top-level DOCX element, appending its visible text.
fn append_document_child(child: &docx_rs::DocumentChild, output: &mut String) {
    match child {
        docx_rs::DocumentChild::Paragraph(paragraph) => {
            append_paragraph_children(&paragraph.children, output);
            output.push('\n');
        }
        docx_rs::DocumentChild::Table(table) => {
            for row in &table.rows {
                let docx_rs::TableChild::TableRow(row) = row;
                for cell in &row.cells {
                    let docx_rs::TableRowChild::TableCell(cell) = cell;
                    for content in &cell.children {
                        if let docx_rs::TableCellContent::Paragraph(paragraph) = content {
                            append_paragraph_children(&paragraph.children, output);
                            output.push_str(" | ");
                        }
                    }
                }
                output.push('\n');
            }
        }
        _ => {}
    }
}

/// Appends run text from paragraph children, following hyperlinks one level.
fn append_paragraph_children(children: &[docx_rs::ParagraphChild], output: &mut String) {
    for child in children {
        match child {
            docx_rs::ParagraphChild::Run(run) => append_run_text(run, output),
            docx_rs::ParagraphChild::Hyperlink(link) => {
                for nested in &link.children {
                    if let docx_rs::ParagraphChild::Run(run) = nested {
                        append_run_text(run, output);
                    }
                }
            }
            _ => {}
        }
    }
}

fn append_run_text(run: &docx_rs::Run, output: &mut String) {
    for child in &run.children {
        if let docx_rs::RunChild::Text(text) = child {
            output.push_str(&text.text);
        }
    }
}

/// Summarizes every sheet as `Sheet: <name>` plus ` | `-joined rows, until
/// the byte budget is spent.
fn collect_sheet_text<RS, R>(workbook: &mut R, budget: usize) -> String
where
    RS: Read + Seek,
    R: Reader<RS>,
{
    let mut output = String::new();
    let sheet_names = workbook.sheet_names().to_vec();

    for name in &sheet_names {
        if output.len() >= budget {
            break;
        }
        let Ok(range) = workbook.worksheet_range(name) else {
            continue;
        };

        output.push_str("Sheet: ");
        output.push_str(name);
        output.push('\n');

        for row in range.rows() {
            let cells: Vec<String> = row
                .iter()
                .map(ToString::to_string)
                .filter(|cell| !cell.is_empty())
                .collect();

            if !cells.is_empty() {
                output.push_str(&cells.join(" | "));
                output.push('\n');
            }

            if output.len() >= budget {
                break;
            }
        }
    }

    output
}

/// Drops blank lines and per-line padding from extracted text.
fn clean_text(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Cuts text after the page break that ends page `max_pages`, where the
/// extractor emitted form-feed page markers.
fn clamp_pages(text: &str, max_pages: usize) -> &str {
    let mut page_breaks = 0;
    for (idx, ch) in text.char_indices() {
        if ch == '\x0C' {
            page_breaks += 1;
            if page_breaks >= max_pages {
                return &text[..idx];
            }
        }
    }
    text
}

/// Truncates to at most `max` characters.
fn clamp_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    fn extractor(max_chars: usize) -> ContentExtractor {
        ContentExtractor::new(&ExtractionConfig {
            max_text_length: max_chars,
            ..ExtractionConfig::default()
        })
    }

    #[test]
    fn test_strategy_table() {
        assert_eq!(
            ContentExtractor::strategy_for(Path::new("a.txt")).unwrap(),
            ExtractStrategy::PlainText
        );
        assert_eq!(
            ContentExtractor::strategy_for(Path::new("a.PDF")).unwrap(),
            ExtractStrategy::Pdf
        );
        assert_eq!(
            ContentExtractor::strategy_for(Path::new("a.docx")).unwrap(),
            ExtractStrategy::Word
        );
        assert_eq!(
            ContentExtractor::strategy_for(Path::new("a.xlsx")).unwrap(),
            ExtractStrategy::Spreadsheet
        );
    }

    #[test]
    fn test_unsupported_format_is_typed() {
        let err = ContentExtractor::strategy_for(Path::new("slides.pptx")).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { .. }));

        let err = ContentExtractor::strategy_for(Path::new("no_extension")).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { .. }));

        assert!(!ContentExtractor::supports(Path::new("old.doc")));
        assert!(ContentExtractor::supports(Path::new("new.docx")));
    }

    #[test]
    fn test_plain_text_extraction() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("notes.txt");
        file.write_str("Meeting notes\n\n  about the new warehouse  \n")
            .unwrap();

        let text = extractor(2000).extract(file.path()).unwrap();
        assert_eq!(text, "Meeting notes\nabout the new warehouse");
    }

    #[test]
    fn test_extraction_is_bounded() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("long.txt");
        file.write_str(&"word ".repeat(500)).unwrap();

        let text = extractor(100).extract(file.path()).unwrap();
        assert!(text.chars().count() <= 100);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = extractor(100)
            .extract(Path::new("/nonexistent/notes.txt"))
            .unwrap_err();
        assert!(err.is_io());
    }

    #[test]
    fn test_clamp_pages() {
        let text = "page one\x0Cpage two\x0Cpage three";
        assert_eq!(clamp_pages(text, 1), "page one");
        assert_eq!(clamp_pages(text, 2), "page one\x0Cpage two");
        assert_eq!(clamp_pages(text, 9), text);
    }

    #[test]
    fn test_clamp_chars_respects_boundaries() {
        assert_eq!(clamp_chars("héllo", 2), "hé");
        assert_eq!(clamp_chars("hi", 10), "hi");
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("  a  \n\n\n b \n"), "a\nb");
    }
}
