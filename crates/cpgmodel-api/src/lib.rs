//! cpgmodel API
//!
//! Shared types for turning code-property-graph query results into a class model.
//!
//! This crate defines:
//!
//! - **Entity types**: the canonical class, attribute, method and instruction records
//! - **QueryEngine trait**: the request/response boundary to the analysis service
//! - **SourceReader trait**: access to the original `.java` files
//! - **Configuration**: batching thresholds and connection retry policy
//! - **Metrics**: counters and timings for one run
//! - **Error handling**: the terminal error taxonomy of a run
//!
//! # Example
//!
//! ```rust
//! use cpgmodel_api::{ExtractResult, QueryEngine, QueryResponse};
//!
//! /// Engine that answers every query with an empty JSON list
//! struct Silent;
//!
//! impl QueryEngine for Silent {
//!     fn execute(&mut self, _query: &str) -> ExtractResult<QueryResponse> {
//!         Ok(QueryResponse::ok(r#"val res0: String = """[]""""#))
//!     }
//! }
//! ```

pub mod config;
pub mod entities;
pub mod errors;
pub mod metrics;
pub mod traits;

// Re-export commonly used types
pub use config::{ExtractConfig, RetryPolicy};
pub use entities::{
    AttributeEntity, ClassEntity, ClassType, InstructionEntity, MethodEntity, Modifiers,
    Parameter, DEFAULT_CONSTRUCTOR_MARKER, PACKAGE_PRIVATE,
};
pub use errors::{ExtractError, ExtractResult};
pub use metrics::RunMetrics;
pub use traits::{FsSourceReader, QueryEngine, QueryResponse, SourceReader};
