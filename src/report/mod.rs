// src/report/mod.rs

//! Post-processing of the documentation artifacts written by the capture
//! tool, and the end-of-batch summary.

pub mod mermaid;
pub mod summary;

pub use mermaid::{post_process_mermaid_md, strip_code_fences};
pub use summary::{BatchSummary, ExecutableResult};
