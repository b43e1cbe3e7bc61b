// Tailoring: allocation, injection, validation, and the pipeline that runs
// them for one job description.

pub mod allocator;
pub mod connectors;
pub mod diagnostics;
pub mod inject;
pub mod pipeline;
pub mod validate;

pub use allocator::{allocate, KeywordBudget, SectionPlan};
pub use connectors::{ConnectorStrategy, RotatingConnectors, SeededConnectors};
pub use diagnostics::Diagnostic;
pub use inject::{InjectionEngine, InjectionLog, InjectionRecord, Strategy};
pub use pipeline::{TailoredResult, Tailor};
pub use validate::{validate, ValidationReport};
