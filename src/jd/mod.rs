// Job description intake: markup cleanup, boilerplate removal, and
// structural classification.

pub mod models;
pub mod normalize;
pub mod structure;

pub use models::{JobDescription, StructureKind};
