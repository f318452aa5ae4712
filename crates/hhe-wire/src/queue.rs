//! Push/pull queue transport
//!
//! Point-to-point ZeroMQ PUSH/PULL links carry the ciphertext stream between
//! the three roles. The sender side *binds* its endpoint and the downstream
//! party connects to it; this matches the deployment where the data producer
//! is reachable and consumers dial in. The queue provides message framing,
//! so wire messages carry the raw payload without the 4-byte prefix used on
//! disk.
//!
//! Two single-byte control messages delimit a stream: [`SOF`] primes a
//! freshly connected receiver and is discarded, [`EOF`] terminates a
//! streaming receive.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use crate::error::WireResult;
use crate::spool::{self, SpoolReader};

/// Start-of-stream control byte. Skipped by receivers, never persisted.
pub const SOF: u8 = 0xFE;

/// End-of-stream control byte. Stops a streaming receive, never persisted.
pub const EOF: u8 = 0xFF;

/// Bounds how long queued messages survive an orderly process exit.
const LINGER_MS: i32 = 1_000;

/// Process-wide pool of persistent PUSH sockets, one per endpoint.
///
/// The pool map lock is held only for lookup and insert; the send itself runs
/// under the individual socket's lock, so sends to distinct endpoints proceed
/// in parallel while sends to the same endpoint are serialized.
pub struct PushPool {
    context: zmq::Context,
    sockets: Mutex<HashMap<String, Arc<Mutex<zmq::Socket>>>>,
}

static POOL: OnceLock<PushPool> = OnceLock::new();

impl PushPool {
    pub fn global() -> &'static PushPool {
        POOL.get_or_init(|| PushPool {
            context: zmq::Context::new(),
            sockets: Mutex::new(HashMap::new()),
        })
    }

    /// Sends one message containing exactly `payload` to `endpoint`,
    /// lazily creating and binding the endpoint's socket on first use.
    ///
    /// Blocks while the downstream consumer is absent or flow-controlled.
    pub fn send(&self, endpoint: &str, payload: &[u8]) -> WireResult<()> {
        let socket = self.socket_for(endpoint)?;
        let socket = socket.lock().unwrap_or_else(PoisonError::into_inner);
        socket.send(payload, 0)?;
        Ok(())
    }

    pub fn send_sof(&self, endpoint: &str) -> WireResult<()> {
        self.send(endpoint, &[SOF])
    }

    pub fn send_eof(&self, endpoint: &str) -> WireResult<()> {
        self.send(endpoint, &[EOF])
    }

    fn socket_for(&self, endpoint: &str) -> WireResult<Arc<Mutex<zmq::Socket>>> {
        let mut map = self.sockets.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(socket) = map.get(endpoint) {
            return Ok(socket.clone());
        }

        let socket = self.context.socket(zmq::PUSH)?;
        socket.set_linger(LINGER_MS)?;
        socket.bind(endpoint)?;
        tracing::debug!(endpoint, "bound push socket");

        let socket = Arc::new(Mutex::new(socket));
        map.insert(endpoint.to_string(), socket.clone());
        Ok(socket)
    }
}

/// Connects a PULL socket to `endpoint` and persists every data message as a
/// frame in the spool at `path`, in arrival order.
///
/// Stops when `max_messages` data messages have been stored
/// (`max_messages == 0` means unbounded) or, when `expect_eof` is set, when
/// the [`EOF`] control message arrives; whichever happens first. [`SOF`]
/// messages are skipped. Control messages are never persisted. Returns the
/// number of stored messages.
pub fn receive_into_spool(
    path: &Path,
    endpoint: &str,
    max_messages: usize,
    expect_eof: bool,
) -> WireResult<usize> {
    let context = zmq::Context::new();
    let socket = context.socket(zmq::PULL)?;
    socket.connect(endpoint)?;

    let mut received = 0usize;
    while max_messages == 0 || received < max_messages {
        let message = socket.recv_bytes(0)?;
        if message.len() == 1 && message[0] == SOF {
            continue;
        }
        if expect_eof && message.len() == 1 && message[0] == EOF {
            break;
        }
        spool::append_frame(path, &message)?;
        received += 1;
    }
    tracing::debug!(endpoint, received, "receive finished");
    Ok(received)
}

/// Re-sends every frame of the spool at `path` to `endpoint`, optionally
/// truncating the spool afterwards. Returns the number of frames sent.
pub fn send_spool(path: &Path, endpoint: &str, truncate_after: bool) -> WireResult<usize> {
    let mut reader = SpoolReader::open(path)?;
    let mut sent = 0usize;
    while let Some(payload) = reader.next()? {
        PushPool::global().send(endpoint, &payload)?;
        sent += 1;
    }
    if truncate_after {
        spool::truncate(path)?;
    }
    Ok(sent)
}
