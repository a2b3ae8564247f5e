//! SiteGuard Core Library
//!
//! This crate provides the URL classification core for the SiteGuard
//! safety extension: it normalizes raw URLs into a canonical comparison
//! form, compiles curated list candidates into efficient matchers, and
//! classifies URLs against an immutable snapshot of all five lists with
//! one canonical precedence order.
//!
//! # Architecture
//!
//! Classification reads operate on a pre-compiled [`ListSnapshot`] that is
//! built elsewhere (the list registry) and swapped in atomically. The query
//! path does no I/O and never panics on malformed input: anything that
//! cannot be parsed as a URL classifies as `NoData`.
//!
//! # Modules
//!
//! - `url`: URL normalization into the canonical comparison form
//! - `matcher`: compiled substring/exact membership tests
//! - `snapshot`: immutable compiled view of all classification lists
//! - `classify`: the classifier and its precedence policy
//! - `types`: shared type definitions

pub mod classify;
pub mod matcher;
pub mod snapshot;
pub mod types;
pub mod url;

// Re-export commonly used types
pub use classify::Classifier;
pub use matcher::Matcher;
pub use snapshot::{CompiledList, ListSnapshot};
pub use types::{
    ClassificationResult, ListKind, MatchMode, SiteStatus, SourceFormat,
    CLASSIFICATION_PRECEDENCE,
};
pub use url::{normalize, NormalizedUrl, Scheme};
