//! Shared data model for the claims document engines
//!
//! Everything the engine crates exchange lives here: invoice codes, document
//! roles, the typed result aggregate of each batch operation, and the
//! progress/cancellation primitives the (external) shell drives them with.

pub mod progress;
pub mod results;
pub mod types;

pub use progress::{CancelToken, NullProgress, ProgressSink};
pub use results::{
    AuditReport, AuditSummary, BranchMove, FolderFailure, FolderSuccess, ItemFailure, MatchRecord,
    MergeRunResult, ReconciliationResult, RelocateResult, ResponsesResult, SearchCopyResult,
    SupportsResult, XmlResult,
};
pub use types::{AdresFolder, CoverLetter, DocumentRole, InsurerFolder, InvoiceCode, Mode, Response};
