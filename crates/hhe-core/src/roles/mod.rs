//! The three role state machines of a benchmark run
//!
//! Each role advances linearly through its batch loop in a single thread;
//! the shared transport below handles what little cross-thread traffic
//! exists. A batch-level error aborts the role; spool content already
//! written stays on disk.

pub mod client;
pub mod server;
pub mod ttp;

pub use client::{Client, ClientEncryptor};
pub use server::Server;
pub use ttp::Ttp;

use crate::params::Parameters;

/// Space-separated decimal rendering of a block, as recorded in the
/// measurement logs.
pub(crate) fn format_block(block: &[u8]) -> String {
    block
        .iter()
        .map(|byte| byte.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Logs the run configuration at role start.
pub(crate) fn log_parameters(params: &Parameters) {
    tracing::info!(
        data_handling = %params.data_handling,
        variant = %params.variant,
        batch_count = params.batch_count,
        batch_size = params.batch_size,
        int_bits = params.int_bits(),
        "run parameters"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_block() {
        assert_eq!(format_block(&[90, 0, 255]), "90 0 255");
        assert_eq!(format_block(&[]), "");
    }
}
