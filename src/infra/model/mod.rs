//! On-disk model artifacts.
//!
//! [`LinearModel`] is the JSON artifact format written by the offline
//! training job. [`FsModelSource`] picks the newest artifact present in the
//! models directory.

mod fs_source;
mod linear;

pub use fs_source::{FsModelSource, MODEL_CANDIDATES};
pub use linear::LinearModel;
