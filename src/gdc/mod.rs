//! GDC (Genomic Data Commons) API access
//!
//! - `filters`: JSON filter trees and query parameters
//! - `types`: response envelopes and the flat rows built from them
//! - `client`: HTTP client with retries and streamed downloads

pub mod client;
pub mod filters;
pub mod types;

pub use client::{DownloadOutcome, GdcClient};
pub use filters::QueryParams;
pub use types::{AnnotationRecord, ClinicalRecord, ManifestEntry, SupplementaryFile};
