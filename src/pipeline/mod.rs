pub mod compose; // Page layout + PDF rendering
pub mod normalize; // Photo orientation, padding, downscaling
pub mod submission; // Record + photos -> named PDF
