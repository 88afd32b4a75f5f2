//! Abstraction over where captures come from, so the report pipeline runs
//! the same against a live server, saved files, or test fixtures.

use crate::collector::{CaptureKind, CollectError};
use crate::sample::Sample;

/// Supplies one raw text sample per capture kind.
pub trait CaptureSource {
    /// Take one capture.
    ///
    /// # Returns
    /// * `Ok(Some(sample))` - the capture
    /// * `Ok(None)` - an optional capture is not available; its section
    ///   renders empty
    /// * `Err(_)` - the source is broken or a required capture is missing
    fn capture(&mut self, kind: CaptureKind) -> Result<Option<Sample>, CollectError>;
}
