//! quill-sink — size-rotated file sinks and retention sweeping.
//!
//! A [`RotatingSink`] owns one output file plus its size and backup
//! bookkeeping; [`retention::sweep`] deletes aged base and rotated files
//! while leaving every active sink alone.
//!
//! Sinks are the only serialization point in the pipeline: all writes to a
//! given file go through that sink's mutex, so concurrent producers never
//! interleave partial records and rotation is atomic with respect to any
//! record.

pub mod retention;
pub mod rotating;

pub use retention::{sweep, SweepReport};
pub use rotating::{RotatingSink, SinkError};
