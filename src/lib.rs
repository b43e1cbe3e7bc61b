// atsfit: keyword-driven résumé tailoring for applicant tracking systems
//
// This is the library root. Each module corresponds to a stage or
// supporting subsystem of the tailoring pipeline:
//   jd → keywords → tailor (allocate, inject, validate) → output

pub mod config;
pub mod db;
pub mod jd;
pub mod keywords;
pub mod output;
pub mod resume;
pub mod status;
pub mod tailor;
pub mod text;
