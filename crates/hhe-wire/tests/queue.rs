//! Queue transport contracts over loopback TCP
//!
//! Each test uses its own port; the sender pool keeps endpoints bound for the
//! life of the test process.

use std::thread;

use hhe_wire::{append_frame, receive_into_spool, send_spool, PushPool, SpoolReader};
use tempfile::TempDir;

fn read_all(path: &std::path::Path) -> Vec<Vec<u8>> {
    let mut reader = SpoolReader::open(path).unwrap();
    let mut frames = Vec::new();
    while let Some(frame) = reader.next().unwrap() {
        frames.push(frame);
    }
    frames
}

#[test]
fn test_received_spool_matches_sent_payloads() {
    const ENDPOINT: &str = "tcp://127.0.0.1:5701";

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("received.bin");

    let receiver = {
        let path = path.clone();
        thread::spawn(move || receive_into_spool(&path, ENDPOINT, 3, true).unwrap())
    };

    let pool = PushPool::global();
    let payloads: [&[u8]; 3] = [b"alpha", b"beta", b"gamma"];
    for payload in payloads {
        pool.send(ENDPOINT, payload).unwrap();
    }

    assert_eq!(receiver.join().unwrap(), 3);
    assert_eq!(read_all(&path), payloads.map(<[u8]>::to_vec));
}

#[test]
fn test_eof_stops_receive_before_message_bound() {
    const ENDPOINT: &str = "tcp://127.0.0.1:5702";

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("received.bin");

    let receiver = {
        let path = path.clone();
        thread::spawn(move || receive_into_spool(&path, ENDPOINT, 10, true).unwrap())
    };

    let pool = PushPool::global();
    for payload in [b"one".as_slice(), b"two", b"three"] {
        pool.send(ENDPOINT, payload).unwrap();
    }
    pool.send_eof(ENDPOINT).unwrap();

    assert_eq!(receiver.join().unwrap(), 3);
    // the terminating control message is not persisted
    assert_eq!(read_all(&path).len(), 3);
}

#[test]
fn test_sof_messages_are_skipped_everywhere() {
    const ENDPOINT: &str = "tcp://127.0.0.1:5703";

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("received.bin");

    let receiver = {
        let path = path.clone();
        // unbounded: only the end-of-stream message stops this receive
        thread::spawn(move || receive_into_spool(&path, ENDPOINT, 0, true).unwrap())
    };

    let pool = PushPool::global();
    pool.send_sof(ENDPOINT).unwrap();
    pool.send(ENDPOINT, b"first").unwrap();
    pool.send_sof(ENDPOINT).unwrap();
    pool.send(ENDPOINT, b"second").unwrap();
    pool.send_sof(ENDPOINT).unwrap();
    pool.send_eof(ENDPOINT).unwrap();

    assert_eq!(receiver.join().unwrap(), 2);
    assert_eq!(read_all(&path), vec![b"first".to_vec(), b"second".to_vec()]);
}

#[test]
fn test_send_spool_forwards_frames_and_truncates() {
    const ENDPOINT: &str = "tcp://127.0.0.1:5704";

    let dir = TempDir::new().unwrap();
    let outgoing = dir.path().join("outgoing.bin");
    let incoming = dir.path().join("incoming.bin");

    let payloads: Vec<Vec<u8>> = (0u8..5).map(|i| vec![i + 1; 8]).collect();
    for payload in &payloads {
        append_frame(&outgoing, payload).unwrap();
    }

    let receiver = {
        let incoming = incoming.clone();
        thread::spawn(move || receive_into_spool(&incoming, ENDPOINT, 0, true).unwrap())
    };

    let sent = send_spool(&outgoing, ENDPOINT, true).unwrap();
    PushPool::global().send_eof(ENDPOINT).unwrap();

    assert_eq!(sent, 5);
    assert_eq!(receiver.join().unwrap(), 5);
    assert_eq!(read_all(&incoming), payloads);
    assert!(read_all(&outgoing).is_empty(), "source spool not truncated");
}
