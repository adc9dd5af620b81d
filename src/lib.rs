//! tcga-fetch - TCGA-BRCA data acquisition from the GDC API
//!
//! Downloads RNA-seq file manifests, clinical annotations and PAM50
//! subtype labels into a local data directory as TSV tables, with
//! fallbacks for when subtype labels are not exposed by the API.

pub mod errors;
pub mod retry;
pub mod gdc;
pub mod table;
pub mod pam50;
pub mod loader;
pub mod display;
pub mod cli;

// Re-export commonly used types
pub use errors::{FetchError, Result};
pub use gdc::GdcClient;
pub use loader::{Dataset, FetchSummary, TcgaLoader};
pub use pam50::{Pam50Label, Pam50Table};
