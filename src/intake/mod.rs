//! Form intake: turning raw field values into an `InstallationRecord`.
//!
//! Nothing here touches images or the PDF. The composer trusts records
//! produced by this module and does not re-validate them.

pub mod draft;
pub mod filename;
pub mod phone;
pub mod session;

pub use draft::*;
pub use filename::*;
pub use phone::*;
pub use session::*;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("Invalid {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Invalid work date (expected YYYY-MM-DD): {0}")]
    InvalidWorkDate(String),

    #[error("Form is locked; unlock it before editing")]
    NotEditable,

    #[error("Form is already editable")]
    AlreadyEditable,

    #[error("Basic information has not been saved")]
    NotSaved,
}
