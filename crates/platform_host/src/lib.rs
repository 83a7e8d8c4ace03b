//! Host services consumed by the desktop session runtime.
//!
//! The session core never reads the wall clock directly. It receives time through the
//! [`SessionClock`] trait so that browser, native, and test hosts can each supply their own source.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod clock;
pub mod time;

pub use clock::{ManualClock, SessionClock, SystemClock};
pub use time::{truncate_to_second, unix_time_ms_now};
