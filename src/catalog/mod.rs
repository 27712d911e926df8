// src/catalog/mod.rs

//! Catalog core: listing fetch, filename parsing, snapshot assembly, and
//! the query engine behind search and autocomplete.

pub mod parser;
pub mod query;
pub mod source;
pub mod store;

pub use parser::{parse_filename, ParseRejection, ParsedName};
pub use query::{Category, CourseSelection, Query, QueryEngine};
pub use source::{DriveSource, FileEntry};
pub use store::{CatalogSnapshot, CatalogStore, LoadOutcome, SkippedFile};
