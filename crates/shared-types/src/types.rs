use std::fmt;
use std::path::{Path, PathBuf};

/// Which payer rule set a folder is processed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Mode {
    Aseguradoras,
    Adres,
}

/// The (series, number) pair that joins loose files, folders and report
/// entries. Series comparison is case-insensitive; the series is uppercased
/// at construction so derived equality is enough. The number is kept as the
/// original digit string, leading zeros included.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct InvoiceCode {
    pub series: String,
    pub number: String,
}

impl InvoiceCode {
    pub fn new(series: &str, number: &str) -> Self {
        Self {
            series: series.to_uppercase(),
            number: number.to_string(),
        }
    }

    /// Join key used to index source pools, e.g. `FECR_200`.
    pub fn key(&self) -> String {
        format!("{}_{}", self.series, self.number)
    }
}

impl fmt::Display for InvoiceCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.series, self.number)
    }
}

/// Semantic role a file plays inside a claim folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentRole {
    Invoice(InvoiceCode),
    ResponseVerifiable(InvoiceCode),
    ResponseGlosaRep,
    ResponseGlosaNew,
    CoverLetter(InvoiceCode),
    Epicrisis,
    /// ADRES cost invoice; left in place, never merged.
    CostInvoice,
    Support,
    Unclassified,
}

/// The insurer's objection letter ("carta glosa").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverLetter {
    pub path: PathBuf,
    pub code: InvoiceCode,
}

/// The claimant's reply document ("respuesta glosa"), in one of its three
/// accepted naming shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// `SERIES_NUMBER.pdf`; carries a code that must agree with the cover
    /// letter before merging.
    Verifiable { path: PathBuf, code: InvoiceCode },
    /// `GLOSA_REP*.pdf`.
    GlosaRep { path: PathBuf },
    /// The fixed literal `resp_glosa.pdf`.
    GlosaNew { path: PathBuf },
}

impl Response {
    pub fn path(&self) -> &Path {
        match self {
            Response::Verifiable { path, .. }
            | Response::GlosaRep { path }
            | Response::GlosaNew { path } => path,
        }
    }

    pub fn code(&self) -> Option<&InvoiceCode> {
        match self {
            Response::Verifiable { code, .. } => Some(code),
            _ => None,
        }
    }
}

/// Classification of one folder's PDFs under the Aseguradoras rules.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsurerFolder {
    pub cover_letter: Option<CoverLetter>,
    pub response: Option<Response>,
    pub supports: Vec<PathBuf>,
}

/// Classification of one folder's PDFs under the ADRES rules.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdresFolder {
    pub epicrisis: Option<PathBuf>,
    pub response: Option<PathBuf>,
    pub supports: Vec<PathBuf>,
    /// Invoices and cost invoices: recognized so they are not treated as
    /// supports, but otherwise untouched.
    pub ignored: Vec<PathBuf>,
}
