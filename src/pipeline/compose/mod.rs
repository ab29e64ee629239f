pub mod fonts;
pub mod layout;
pub mod pdf;
pub mod text;

pub use fonts::*;
pub use layout::*;
pub use pdf::*;
pub use text::*;

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Text-rendering resource not found: {name} (searched {} location(s))", .searched.len())]
    ResourceNotFound { name: String, searched: Vec<PathBuf> },

    #[error("Font error: {0}")]
    Font(String),

    #[error("Font {font} cannot render text: {text}")]
    UnsupportedText { font: String, text: String },

    #[error("PDF generation failed: {0}")]
    Pdf(String),
}
