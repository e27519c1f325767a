//! Crate-wide error type.
//!
//! Fetch failures never reach it: the station logs them and keeps the previous values.

/// Errors surfaced by the display, the scheduler, and device setup.
#[derive(Debug, derive_more::Display)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A message is too long to lay out on the panel or in its text buffer.
    #[display("message too long ({_0} bytes)")]
    MessageTooLong(usize),

    /// A deployment setting is unusable.
    #[display("invalid configuration: {_0}")]
    InvalidConfig(&'static str),

    /// An embassy task could not be spawned.
    #[cfg(feature = "embedded")]
    #[display("task spawn failed: {_0:?}")]
    TaskSpawn(embassy_executor::SpawnError),
}

#[cfg(feature = "embedded")]
impl From<embassy_executor::SpawnError> for Error {
    fn from(err: embassy_executor::SpawnError) -> Self {
        Self::TaskSpawn(err)
    }
}

impl core::error::Error for Error {}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;
