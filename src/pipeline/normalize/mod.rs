pub mod preprocess;

pub use preprocess::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NormalizeError {
    /// Bytes are not a readable image. The caller treats the slot as empty.
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("JPEG encoding failed: {0}")]
    Encode(String),
}
