//! Orchestration layer of the hhe-bench harness
//!
//! Ties the data plane (`hhe-wire`) and the crypto collaborators
//! (`hhe-cipher`) into the three cooperating roles of a benchmark run:
//!
//! ```text
//!   Client --[Kreyvium ct]--> Server --[TFHE ct]--> TTP --> decrypted bytes
//!   Client -----------------[TFHE ct]------------> TTP        (direct mode)
//! ```
//!
//! Also home to the process-wide run [`Parameters`] and the
//! [`PerfLogger`](perf::PerfLogger) measurement write path.

pub mod error;
pub mod params;
pub mod perf;
pub mod roles;

pub use error::{CoreError, CoreResult};
pub use params::{DataHandling, EncryptionVariant, IntegerSize, Parameters};
pub use perf::PerfLogger;
