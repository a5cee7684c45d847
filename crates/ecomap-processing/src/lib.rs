//! Client-side image processing for the upload pipeline: policy
//! validation, downsampling and public id generation.

pub mod downsample;
pub mod naming;
pub mod validator;

pub use downsample::{image_dimensions, Downsampler};
pub use naming::generate_name;
pub use validator::FileValidator;
