//! # sundayschool-shared
//!
//! Types and helpers shared by every Sunday School Time crate: product
//! constants, the timestamp normalization rule, and its error type.

pub mod constants;
pub mod error;
pub mod timestamp;

pub use error::TimestampError;
pub use timestamp::{normalize_millis, now_millis};
