use std::path::PathBuf;

use hhe_cipher::CipherError;
use hhe_wire::WireError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Wire(#[from] WireError),

    #[error(transparent)]
    Cipher(#[from] CipherError),

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("no stamped input spool found in {}", .0.display())]
    MissingSpool(PathBuf),

    #[error("spool ended before the configured record count was read")]
    SpoolExhausted,
}

pub type CoreResult<T> = Result<T, CoreError>;
