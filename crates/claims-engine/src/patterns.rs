//! Filename and report-text patterns
//!
//! Every pattern the classifier, the extractor, the reconciliation variants
//! and the audit scan key on, compiled once. The naming conventions are
//! fixed by the upstream billing systems and must be reproduced exactly.

use lazy_static::lazy_static;
use regex::Regex;

/// Carrier series the back office handles. Anything else never matches.
pub const KNOWN_SERIES: [&str; 4] = ["COEX", "FECR", "FERD", "FERR"];

/// Leading token of every claim code inside an objection report.
pub const AUDIT_CODE_PREFIX: &str = "240-";

lazy_static! {
    /// Cover letter ("carta glosa"): optional alphanumeric prefix, series,
    /// number, then at least one more delimited segment. Searched, not
    /// anchored; a secondary delimiter check on the number guards against
    /// accidental short matches.
    pub static ref COVER_LETTER: Regex =
        Regex::new(r"(?i)(?:[a-zA-Z0-9]+[_-])?([A-Z]+)[_-](\d+)[_-].*\.pdf").unwrap();

    /// Verifiable response: series then number, optional underscore between.
    pub static ref RESPONSE_VERIFIABLE: Regex =
        Regex::new(r"(?i)^([A-Z]+)_?(\d+)\.pdf").unwrap();

    pub static ref RESPONSE_GLOSA_REP: Regex =
        Regex::new(r"(?i)^GLOSA_REP\d*\.pdf").unwrap();

    /// Fixed literal used by the newer portal exports.
    pub static ref RESPONSE_GLOSA_NEW: Regex =
        Regex::new(r"(?i)^resp_glosa\.pdf").unwrap();

    pub static ref ADRES_EPICRISIS: Regex =
        Regex::new(r"(?i)^\d+_[A-Z]+\d+_EPICRIS(?:IS)?\.pdf").unwrap();

    pub static ref ADRES_FACOSTE: Regex =
        Regex::new(r"(?i)^\d+_[A-Z]+\d+_FACOSTE\.pdf").unwrap();

    pub static ref ADRES_FACTURA: Regex =
        Regex::new(r"(?i)^\d+_[A-Z]+\d+_FACTURA\.pdf").unwrap();

    /// Invoice document: radicado prefix, series, number.
    pub static ref INVOICE: Regex =
        Regex::new(r"(?i)^\d{4,}_([A-Z]+)(\d+)_FACTURA").unwrap();

    /// Known-series code at the start of a base name (extension stripped).
    pub static ref KNOWN_SERIES_PREFIX: Regex =
        Regex::new(r"(?i)^(COEX|FECR|FERD|FERR)([0-9]+)").unwrap();

    /// Same, but the base name must be nothing else.
    pub static ref KNOWN_SERIES_EXACT: Regex =
        Regex::new(r"(?i)^(COEX|FECR|FERD|FERR)([0-9]+)$").unwrap();

    /// Known-series code anywhere in a base name; used for XML exports,
    /// which decorate the code with prefixes and suffixes.
    pub static ref KNOWN_SERIES_ANYWHERE: Regex =
        Regex::new(r"(?i)(COEX|FECR|FERD|FERR)([0-9]+)").unwrap();

    /// Branch-relocation reference documents, current naming.
    pub static ref SERIES_REFERENCE_NEW: Regex =
        Regex::new(r"(?i)^\d{4,}_([A-Z]+)\d+_(?:FACTURA|EPICRIS)").unwrap();

    /// Branch-relocation reference documents, legacy naming.
    pub static ref SERIES_REFERENCE_LEGACY: Regex =
        Regex::new(r"(?i)^\d{4,}_([A-Z]+)_\d+").unwrap();

    /// Complete claim code inside report text.
    pub static ref AUDIT_CODE: Regex = Regex::new(r"(?i)^240-[A-Z]+-\d+$").unwrap();

    pub static ref AUDIT_CODE_SEARCH: Regex = Regex::new(r"(?i)240-[A-Z]+-\d+").unwrap();

    /// Two-character claim status following a code on the same line.
    pub static ref AUDIT_STATUS: Regex = Regex::new(r"(?i)^C[O12]$").unwrap();

    /// Numeric prefix that names a claim folder on disk.
    pub static ref FOLDER_NUMBER_PREFIX: Regex = Regex::new(r"^\d+").unwrap();

    /// First run of digits anywhere; folder sort key.
    pub static ref FIRST_NUMBER: Regex = Regex::new(r"\d+").unwrap();

    /// Runs of dots left behind by sloppy renames.
    pub static ref DOT_RUNS: Regex = Regex::new(r"\.{2,}").unwrap();
}
