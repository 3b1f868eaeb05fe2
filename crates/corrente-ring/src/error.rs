//! Error type for ring buffer construction.
//!
//! Steady-state operations (`discard`, `commit`, the view accessors) clamp
//! out-of-range counts instead of erroring; the only failure point is
//! establishing the backing memory at creation.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RingError {
    /// The backing memory region could not be established. Any resources
    /// acquired before the failing step have already been released.
    #[error("ring allocation failed ({stage}): {source}")]
    Allocation {
        /// Which mapping step failed.
        stage: &'static str,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(unix)]
impl RingError {
    pub(crate) fn last_os_error(stage: &'static str) -> Self {
        RingError::Allocation {
            stage,
            source: std::io::Error::last_os_error(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RingError>;
