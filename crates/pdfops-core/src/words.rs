//! Positioned-word model for scanning report PDFs
//!
//! The audit engine consumes `(text, line, box)` word tuples. The default
//! provider lays extracted page text out on a fixed character grid: columns
//! advance by character count, rows by line. That keeps position signatures
//! stable and deterministic, which is what the duplicate-collapse step and
//! the highlight rectangles key on.

use crate::error::PdfOpsError;
use lopdf::Document;
use std::path::Path;

const CHAR_WIDTH: f32 = 6.0;
const LINE_HEIGHT: f32 = 14.0;

/// Axis-aligned box in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WordBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl WordBox {
    /// Smallest box covering both.
    pub fn union(&self, other: &WordBox) -> WordBox {
        WordBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Truncated-coordinate signature; two renderings of the same token at
    /// the same visual position collapse to one signature.
    pub fn signature(&self) -> (i64, i64) {
        (self.x0 as i64, self.y0 as i64)
    }
}

/// One whitespace-delimited token with its visual line and box.
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    pub text: String,
    pub line: u32,
    pub bbox: WordBox,
}

/// Words of one page of `doc`, in reading order.
pub fn page_words(doc: &Document, page_number: u32) -> Vec<Word> {
    let text = doc.extract_text(&[page_number]).unwrap_or_default();
    layout_words(&text)
}

/// Words of every page of the document at `path`, one vector per page in
/// page order.
pub fn document_words(path: &Path) -> Result<Vec<Vec<Word>>, PdfOpsError> {
    let doc = Document::load(path)
        .map_err(|e| PdfOpsError::Parse(format!("{}: {}", path.display(), e)))?;
    Ok(doc
        .get_pages()
        .keys()
        .map(|&number| page_words(&doc, number))
        .collect())
}

/// Lay text out on the fixed grid. Exposed for tests and for callers that
/// already hold extracted text.
pub fn layout_words(text: &str) -> Vec<Word> {
    let mut words = Vec::new();
    for (line_index, line) in text.lines().enumerate() {
        let mut column = 0usize;
        let mut token_start = None;
        for ch in line.chars().chain(std::iter::once(' ')) {
            if ch.is_whitespace() {
                if let Some(start) = token_start.take() {
                    words.push(make_word(line, line_index, start, column));
                }
            } else if token_start.is_none() {
                token_start = Some(column);
            }
            column += 1;
        }
    }
    words
}

fn make_word(line: &str, line_index: usize, start: usize, end: usize) -> Word {
    let text: String = line.chars().skip(start).take(end - start).collect();
    let y0 = line_index as f32 * LINE_HEIGHT;
    Word {
        text,
        line: line_index as u32,
        bbox: WordBox {
            x0: start as f32 * CHAR_WIDTH,
            y0,
            x1: end as f32 * CHAR_WIDTH,
            y1: y0 + LINE_HEIGHT - 2.0,
        },
    }
}
