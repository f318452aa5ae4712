//! Data-plane transport and framing for the hhe-bench harness
//!
//! This crate carries everything the three benchmark roles share below the
//! crypto layer: the length-prefixed frame format, the process-wide per-path
//! locks that make spool files safe under concurrent append and read, the
//! framed file spools themselves, and the push/pull queue transport with its
//! start/end-of-stream control messages.

pub mod error;
pub mod frame;
pub mod pathlock;
pub mod queue;
pub mod spool;

pub use error::{WireError, WireResult};
pub use frame::{read_frame, write_frame, MAX_FRAME_LEN};
pub use queue::{receive_into_spool, send_spool, PushPool, EOF, SOF};
pub use spool::{append_frame, latest_stamped_file, truncate, SpoolReader};
