//! Timestamps and link counts carried by every node.
//!
//! Metadata is plain data: it is only ever changed as a side effect of the
//! filesystem operations, and the [`Clock`] decides what "now" is.

mod clock;
mod metadata;

pub use clock::{Clock, SteppingClock, SystemClock};
pub(crate) use metadata::Metadata;
pub use metadata::{TIMESTAMP_FORMAT, Timestamp};
