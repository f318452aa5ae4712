use hhe_wire::WireError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CipherError {
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Wire(#[from] WireError),

    #[error("ciphertext codec failure: {0}")]
    Codec(String),

    #[error("TFHE parameter set not bound")]
    ParamsUnbound,

    #[error("key material load failed: {0}")]
    KeyLoad(String),
}

pub type CipherResult<T> = Result<T, CipherError>;
