//! Business engines for the claims back office
//!
//! Classification of claim-folder documents, the folder merge batch, the
//! generalized reconciliation engine with its five variants, and the
//! invoice audit. Everything here takes plain paths plus a progress sink
//! and a cancellation token, and returns one typed result aggregate; the
//! GUI shell that drives these engines lives elsewhere.

pub mod audit;
pub mod classify;
pub mod extract;
pub mod fs_scan;
pub mod merge_run;
pub mod patterns;
pub mod reconcile;

pub use audit::{delete_surplus_folders, run_audit};
pub use classify::{classify_adres, classify_insurer};
pub use merge_run::run_merge_batch;
pub use reconcile::{
    branch::relocate_by_branch, responses::organize_responses, search::search_and_copy,
    supports::bring_supports, xml::organize_xml, TransferAction,
};
