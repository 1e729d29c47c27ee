use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfOpsError {
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    #[error("PDF operation failed: {0}")]
    Operation(String),

    #[error("text extraction failed: {0}")]
    Extraction(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
