//! Analysis pipeline and error types

pub mod analysis;
pub mod errors;

pub use analysis::AnalysisService;
pub use errors::AnalysisError;
