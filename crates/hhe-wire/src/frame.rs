//! Length-prefixed framing
//!
//! Every record in the system, whether it sits in a spool file or crosses the
//! queue as a stored message body, follows one rule: a 4-byte big-endian
//! unsigned length followed by that many payload bytes. The payload is opaque
//! to this module.

use std::io::{ErrorKind, Read, Write};

use byteorder::{BigEndian, WriteBytesExt};

use crate::error::{WireError, WireResult};

/// Sanity cap on a single frame payload (1 GiB).
///
/// Lengths above this are treated as corruption so that a garbled prefix
/// cannot drive a multi-gigabyte allocation during recovery.
pub const MAX_FRAME_LEN: usize = 1 << 30;

/// Writes one frame to `sink`.
///
/// On a partial write the sink is left corrupted; callers must not append to
/// it again without truncating it first.
pub fn write_frame<W: Write>(sink: &mut W, payload: &[u8]) -> WireResult<()> {
    if payload.len() > MAX_FRAME_LEN {
        return Err(WireError::PayloadTooLarge(payload.len()));
    }
    sink.write_u32::<BigEndian>(payload.len() as u32)?;
    sink.write_all(payload)?;
    Ok(())
}

/// Reads the next frame from `source`.
///
/// Returns `Ok(None)` on a clean end of input before any length byte.
/// An end of input between the length prefix and the last payload byte, or a
/// decoded length above [`MAX_FRAME_LEN`], is a [`WireError::CorruptedFrame`].
/// The cap is checked before the payload buffer is allocated.
pub fn read_frame<R: Read>(source: &mut R) -> WireResult<Option<Vec<u8>>> {
    let len = match read_length(source)? {
        Some(len) => len,
        None => return Ok(None),
    };
    if len > MAX_FRAME_LEN {
        return Err(WireError::CorruptedFrame(format!(
            "length prefix {len} exceeds the {MAX_FRAME_LEN} byte cap"
        )));
    }

    let mut payload = vec![0u8; len];
    source.read_exact(&mut payload).map_err(|e| {
        if e.kind() == ErrorKind::UnexpectedEof {
            WireError::CorruptedFrame(format!("payload truncated ({len} bytes expected)"))
        } else {
            WireError::Io(e)
        }
    })?;
    Ok(Some(payload))
}

/// Reads the 4-byte length prefix, distinguishing a clean end (no bytes at
/// all) from a truncated prefix.
fn read_length<R: Read>(source: &mut R) -> WireResult<Option<usize>> {
    let mut prefix = [0u8; 4];
    let mut filled = 0;
    while filled < prefix.len() {
        match source.read(&mut prefix[filled..]) {
            Ok(0) if filled == 0 => return Ok(None),
            Ok(0) => {
                return Err(WireError::CorruptedFrame(
                    "end of input inside length prefix".to_string(),
                ))
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(WireError::Io(e)),
        }
    }
    Ok(Some(u32::from_be_bytes(prefix) as usize))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_roundtrip() {
        let mut buf = Vec::new();
        write_frame(&mut buf, b"hello frames").unwrap();

        let mut cursor = Cursor::new(buf);
        let payload = read_frame(&mut cursor).unwrap().unwrap();
        assert_eq!(payload, b"hello frames");
        assert!(read_frame(&mut cursor).unwrap().is_none());
    }

    #[test]
    fn test_empty_payload() {
        let mut buf = Vec::new();
        write_frame(&mut buf, &[]).unwrap();
        assert_eq!(buf, [0, 0, 0, 0]);

        let mut cursor = Cursor::new(buf);
        assert_eq!(read_frame(&mut cursor).unwrap().unwrap(), Vec::<u8>::new());
        assert!(read_frame(&mut cursor).unwrap().is_none());
    }

    #[test]
    fn test_length_above_cap_is_corruption() {
        // 2 GiB length prefix, no payload at all
        let buf = [0x80u8, 0x00, 0x00, 0x00];
        let mut cursor = Cursor::new(&buf[..]);
        assert!(matches!(
            read_frame(&mut cursor),
            Err(WireError::CorruptedFrame(_))
        ));
    }

    #[test]
    fn test_truncated_length_prefix() {
        for cut in 1..4 {
            let mut buf = Vec::new();
            write_frame(&mut buf, b"abc").unwrap();
            buf.truncate(cut);

            let mut cursor = Cursor::new(buf);
            assert!(matches!(
                read_frame(&mut cursor),
                Err(WireError::CorruptedFrame(_))
            ));
        }
    }

    #[test]
    fn test_truncated_payload() {
        let mut full = Vec::new();
        write_frame(&mut full, b"abcdef").unwrap();

        // every cut point from "length present, no payload" to "one byte short"
        for cut in 4..full.len() {
            let mut buf = full.clone();
            buf.truncate(cut);

            let mut cursor = Cursor::new(buf);
            assert!(matches!(
                read_frame(&mut cursor),
                Err(WireError::CorruptedFrame(_))
            ));
        }
    }
}
