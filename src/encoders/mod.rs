//! Frame encoders
//!
//! Each encoder is a stateless function that appends the frame for one
//! entry to a caller-supplied buffer. None of them hold state, so they are
//! safe to call from any number of threads at once.

pub mod binary;
pub mod json;
pub mod text;

pub use binary::{decode, FrameReader};
