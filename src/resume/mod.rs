// Résumé document model and plain-text rendering.

pub mod models;
pub mod render;

pub use models::{Contact, Education, Experience, ResumeDocument, TextLocation};
pub use render::{document_word_count, render_text};
