//! Data models shared by the upload pipeline and the marker flow.

mod candidate;
mod marker;
mod outcome;

pub use candidate::*;
pub use marker::*;
pub use outcome::*;
