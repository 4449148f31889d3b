//! # cpgmodel-java
//!
//! Normalizes Java code-property-graph query results into the class / attribute /
//! method / instruction model of `cpgmodel-api`.
//!
//! ## Pipeline
//!
//! - Inventory the project's classes with their AST sizes
//! - Retrieve class data in one query or per class, depending on size
//! - Build entities from the raw tuples and cross-reference the source files
//! - Drop classes whose parents live outside the project
//! - Fetch deferred instructions and frame the result for the parent process
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cpgmodel_java::{emit_classes, ExtractConfig, Orchestrator, OutputFormat, RunContext};
//! # use cpgmodel_api::{ExtractResult, QueryEngine, QueryResponse};
//! # struct Engine;
//! # impl QueryEngine for Engine {
//! #     fn execute(&mut self, _query: &str) -> ExtractResult<QueryResponse> {
//! #         Ok(QueryResponse::failed("offline"))
//! #     }
//! # }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let orchestrator = Orchestrator::new(ExtractConfig::default());
//! let mut ctx = RunContext::new(Engine);
//! orchestrator.run(&mut ctx, "/home/dev/app", "cpgmodel-demo")?;
//!
//! let mut stdout = std::io::stdout().lock();
//! emit_classes(&mut stdout, &ctx.classes, OutputFormat::Literal)?;
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod crossref;
pub mod emit;
pub mod filter;
pub mod heuristics;
pub mod orchestrator;
pub mod queries;
pub mod tuples;

// Re-export api types for convenience
pub use cpgmodel_api::{
    ClassEntity, ExtractConfig, ExtractError, ExtractResult, QueryEngine, QueryResponse,
    RunMetrics, SourceReader,
};

pub use emit::{emit_classes, OutputFormat};
pub use filter::{remove_external_classes, ExternalClassFilter};
pub use orchestrator::{Orchestrator, RunContext};
