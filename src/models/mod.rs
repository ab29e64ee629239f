pub mod enums;
pub mod labels;
pub mod photo;
pub mod record;

pub use enums::*;
pub use labels::*;
pub use photo::*;
pub use record::*;
