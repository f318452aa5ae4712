use thiserror::Error;

#[derive(Error, Debug)]
pub enum WireError {
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupted frame: {0}")]
    CorruptedFrame(String),

    #[error("frame payload of {0} bytes exceeds the frame size cap")]
    PayloadTooLarge(usize),
}

pub type WireResult<T> = Result<T, WireError>;

impl From<zmq::Error> for WireError {
    fn from(e: zmq::Error) -> Self {
        WireError::Io(e.into())
    }
}
