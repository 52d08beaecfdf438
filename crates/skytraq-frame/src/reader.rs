use std::io::{ErrorKind, Read};

use bytes::{BufMut, BytesMut};
use skytraq_transport::SerialChannel;
use tracing::{debug, trace};

use crate::codec::{checksum, Frame, FrameConfig, SYNC, TRAILER};
use crate::error::{FrameError, Result};

/// Reads complete frames from any blocking `Read` channel.
///
/// The reader never buffers ahead: it pulls exactly the bytes the current
/// frame needs, so nothing belonging to the next frame is consumed.
#[derive(Debug)]
pub struct FrameReader<T> {
    inner: T,
    config: FrameConfig,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self { inner, config }
    }

    /// Read the next complete frame (blocking).
    ///
    /// Scans for the start marker first, then reads length, id, payload,
    /// checksum and trailer in order. No step is retried: a channel timeout
    /// surfaces as [`FrameError::Io`] and a malformed frame as the matching
    /// error variant.
    pub fn read_frame(&mut self) -> Result<Frame> {
        self.sync()?;

        let mut length = [0u8; 2];
        self.read_exact(&mut length)?;
        let payload_len = u16::from_be_bytes(length);
        if payload_len == 0 {
            return Err(FrameError::InvalidLength(payload_len));
        }

        let message_id = self.read_u8()?;

        let mut payload = BytesMut::zeroed(usize::from(payload_len) - 1);
        self.read_exact(&mut payload)?;

        let actual = self.read_u8()?;
        let expected = checksum(message_id, &payload);
        if expected != actual {
            return Err(FrameError::ChecksumMismatch { expected, actual });
        }

        let mut trailer = [0u8; 2];
        self.read_exact(&mut trailer)?;
        if trailer != TRAILER {
            return Err(FrameError::InvalidTrailer(trailer));
        }

        debug!(
            message_id = format_args!("{message_id:#04x}"),
            len = payload_len,
            payload = %hex::encode(&payload),
            "RX <-"
        );

        Ok(Frame {
            message_id,
            payload: payload.freeze(),
        })
    }

    /// Consume bytes until the start marker has been read.
    fn sync(&mut self) -> Result<()> {
        let budget = self.config.max_sync_attempts;
        let mut discarded = BytesMut::new();
        let mut prev: Option<u8> = None;
        let mut attempts = 0usize;

        while attempts < budget {
            let byte = match self.read_u8() {
                Ok(byte) => byte,
                Err(err) => {
                    let err = match err {
                        FrameError::ShortRead { .. } => FrameError::ConnectionClosed,
                        other => other,
                    };
                    if !discarded.is_empty() {
                        trace!(
                            skipped = discarded.len(),
                            bytes = %hex::encode(&discarded),
                            error = %err,
                            "channel failed while scanning for frame start"
                        );
                    }
                    return Err(err);
                }
            };
            attempts += 1;

            if prev == Some(SYNC[0]) && byte == SYNC[1] {
                // The first marker byte was recorded before we knew it started a frame.
                let noise = &discarded[..discarded.len() - 1];
                if !noise.is_empty() {
                    trace!(
                        skipped = noise.len(),
                        bytes = %hex::encode(noise),
                        "skipped bytes before frame start"
                    );
                }
                return Ok(());
            }

            discarded.put_u8(byte);
            prev = Some(byte);
        }

        Err(FrameError::SyncTimeout {
            attempts,
            discarded: discarded.freeze(),
        })
    }

    fn read_u8(&mut self) -> Result<u8> {
        let mut byte = [0u8; 1];
        self.read_exact(&mut byte)?;
        Ok(byte[0])
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut filled = 0usize;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => {
                    return Err(FrameError::ShortRead {
                        expected: buf.len(),
                        got: filled,
                    })
                }
                Ok(n) => filled += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
        Ok(())
    }

    /// Borrow the underlying channel.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying channel.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner channel.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Update the start-marker byte budget for subsequent reads.
    pub fn set_max_sync_attempts(&mut self, max_sync_attempts: usize) {
        self.config.max_sync_attempts = max_sync_attempts;
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl FrameReader<SerialChannel> {
    /// Create a frame reader for a serial channel and apply read timeout from config.
    pub fn with_config_serial(mut inner: SerialChannel, config: FrameConfig) -> Result<Self> {
        if let Some(timeout) = config.read_timeout {
            inner
                .set_read_timeout(timeout)
                .map_err(transport_to_frame_error)?;
        }
        Ok(Self::with_config(inner, config))
    }
}

/// Decode exactly one frame from a byte slice.
///
/// Leading noise is skipped within `max_sync_attempts` bytes; anything after
/// the frame's trailer is ignored.
pub fn decode_frame(src: &[u8], max_sync_attempts: usize) -> Result<Frame> {
    let config = FrameConfig {
        max_sync_attempts,
        ..FrameConfig::default()
    };
    FrameReader::with_config(src, config).read_frame()
}

fn transport_to_frame_error(err: skytraq_transport::TransportError) -> FrameError {
    match err {
        skytraq_transport::TransportError::Io(io) => FrameError::Io(io),
        skytraq_transport::TransportError::Serial(serial) => FrameError::Io(serial.into()),
        other => FrameError::Io(std::io::Error::other(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use bytes::{BufMut, Bytes, BytesMut};

    use super::*;
    use crate::codec::{encode_frame, DEFAULT_MAX_SYNC_ATTEMPTS, MAX_PAYLOAD};
    use crate::message::ACK;

    fn wire(message_id: u8, payload: &[u8]) -> Vec<u8> {
        let mut buf = BytesMut::new();
        encode_frame(message_id, payload, &mut buf).unwrap();
        buf.to_vec()
    }

    fn reader(bytes: Vec<u8>) -> FrameReader<Cursor<Vec<u8>>> {
        FrameReader::new(Cursor::new(bytes))
    }

    #[test]
    fn read_single_frame() {
        let mut reader = reader(wire(0x09, &[0x02, 0x01]));
        let frame = reader.read_frame().unwrap();

        assert_eq!(frame.message_id, 0x09);
        assert_eq!(frame.payload.as_ref(), &[0x02, 0x01]);
    }

    #[test]
    fn read_multiple_frames_leaves_nothing_behind() {
        let mut bytes = wire(0x83, &[0x09]);
        bytes.extend(wire(0x80, b"venus"));
        let total = bytes.len() as u64;

        let mut reader = reader(bytes);
        let f1 = reader.read_frame().unwrap();
        let f2 = reader.read_frame().unwrap();

        assert_eq!(f1.message_id, 0x83);
        assert_eq!(f1.payload.as_ref(), &[0x09]);
        assert_eq!(f2.message_id, 0x80);
        assert_eq!(f2.payload.as_ref(), b"venus");
        assert_eq!(reader.get_ref().position(), total);
    }

    #[test]
    fn roundtrip_various_payload_sizes() {
        for len in [0usize, 1, 2, 255, 256, 4096, MAX_PAYLOAD] {
            let payload: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
            let frame = decode_frame(&wire(0x64, &payload), DEFAULT_MAX_SYNC_ATTEMPTS).unwrap();
            assert_eq!(frame.message_id, 0x64);
            assert_eq!(frame.payload.len(), len);
            assert_eq!(frame.payload.as_ref(), payload.as_slice());
        }
    }

    #[test]
    fn empty_payload_has_length_one() {
        let bytes = wire(0x02, &[]);
        assert_eq!(&bytes[2..4], &[0x00, 0x01]);

        let frame = decode_frame(&bytes, DEFAULT_MAX_SYNC_ATTEMPTS).unwrap();
        assert_eq!(frame.message_id, 0x02);
        assert!(frame.payload.is_empty());
    }

    #[test]
    fn any_flipped_bit_is_a_checksum_mismatch() {
        let payload = [0x02, 0x01, 0x7F];
        let clean = wire(0x09, &payload);
        // Message id at offset 4, payload follows.
        for offset in 4..4 + 1 + payload.len() {
            for bit in 0..8 {
                let mut corrupted = clean.clone();
                corrupted[offset] ^= 1 << bit;
                let err = decode_frame(&corrupted, DEFAULT_MAX_SYNC_ATTEMPTS).unwrap_err();
                assert!(
                    matches!(err, FrameError::ChecksumMismatch { actual: 0x75, .. }),
                    "offset {offset} bit {bit}: {err:?}"
                );
            }
        }
    }

    #[test]
    fn checksum_mismatch_reports_both_values() {
        let mut bytes = wire(0x09, &[0x02, 0x01]);
        bytes[7] = 0x55;
        let err = decode_frame(&bytes, DEFAULT_MAX_SYNC_ATTEMPTS).unwrap_err();
        assert!(matches!(
            err,
            FrameError::ChecksumMismatch {
                expected: 0x0A,
                actual: 0x55
            }
        ));
    }

    #[test]
    fn noise_before_frame_is_skipped() {
        // Contains both marker bytes, never adjacent, and ends on a lone 0xA0.
        let mut bytes = b"$GPGGA,123519*47\r\n".to_vec();
        bytes.extend([0xA1, 0x00, 0xA0, 0x55, 0xA1, 0xFF, 0xA0]);
        bytes.extend(wire(ACK, &[0x09]));

        let frame = decode_frame(&bytes, DEFAULT_MAX_SYNC_ATTEMPTS).unwrap();
        assert_eq!(frame.message_id, ACK);
        assert_eq!(frame.payload.as_ref(), &[0x09]);
    }

    #[test]
    fn sync_budget_exhausted() {
        let mut bytes = vec![0x00; DEFAULT_MAX_SYNC_ATTEMPTS];
        bytes.extend(wire(0x80, &[0x01]));

        let mut reader = reader(bytes);
        let err = reader.read_frame().unwrap_err();
        match err {
            FrameError::SyncTimeout {
                attempts,
                discarded,
            } => {
                assert_eq!(attempts, DEFAULT_MAX_SYNC_ATTEMPTS);
                assert_eq!(discarded.len(), DEFAULT_MAX_SYNC_ATTEMPTS);
                assert!(discarded.iter().all(|b| *b == 0));
            }
            other => panic!("expected SyncTimeout, got {other:?}"),
        }

        // Budget counts bytes, so the frame behind the noise is still intact.
        let frame = reader.read_frame().unwrap();
        assert_eq!(frame.message_id, 0x80);
    }

    #[test]
    fn marker_on_last_budgeted_byte_still_syncs() {
        let mut bytes = vec![0x00; 4];
        bytes.extend(wire(0x80, &[]));
        let frame = decode_frame(&bytes, 6).unwrap();
        assert_eq!(frame.message_id, 0x80);

        let err = decode_frame(&bytes, 5).unwrap_err();
        assert!(matches!(err, FrameError::SyncTimeout { attempts: 5, .. }));
    }

    #[test]
    fn zero_length_field_is_invalid() {
        let bytes = vec![0xA0, 0xA1, 0x00, 0x00, 0x09, 0x09, 0x0D, 0x0A];
        let err = decode_frame(&bytes, DEFAULT_MAX_SYNC_ATTEMPTS).unwrap_err();
        assert!(matches!(err, FrameError::InvalidLength(0)));
    }

    #[test]
    fn corrupted_trailer_bytes() {
        let clean = wire(0x09, &[0x02, 0x01]);
        let last = clean.len() - 1;
        for (index, value) in [(last - 1, 0x0A), (last, 0x0D)] {
            let mut corrupted = clean.clone();
            corrupted[index] = value;
            let err = decode_frame(&corrupted, DEFAULT_MAX_SYNC_ATTEMPTS).unwrap_err();
            assert!(matches!(err, FrameError::InvalidTrailer(_)), "{err:?}");
        }

        let mut swapped = clean.clone();
        swapped[last - 1] = 0x0A;
        swapped[last] = 0x0D;
        let err = decode_frame(&swapped, DEFAULT_MAX_SYNC_ATTEMPTS).unwrap_err();
        assert!(matches!(err, FrameError::InvalidTrailer([0x0A, 0x0D])));
    }

    #[test]
    fn connection_closed_cleanly() {
        let mut reader = reader(Vec::new());
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn connection_closed_mid_frame() {
        let mut partial = BytesMut::new();
        partial.put_slice(&SYNC);
        partial.put_u16(16);
        partial.put_u8(0x80);
        partial.put_slice(b"only-part");

        let mut reader = reader(partial.to_vec());
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(
            err,
            FrameError::ShortRead {
                expected: 15,
                got: 9
            }
        ));
    }

    #[test]
    fn partial_read_handling() {
        let byte_reader = ByteByByteReader {
            bytes: wire(0x04, b"slow"),
            pos: 0,
        };
        let mut reader = FrameReader::new(byte_reader);

        let frame = reader.read_frame().unwrap();
        assert_eq!(frame.message_id, 0x04);
        assert_eq!(frame.payload.as_ref(), b"slow");
    }

    #[derive(Debug)]
    struct ByteByByteReader {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for ByteByByteReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pos >= self.bytes.len() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.bytes[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    #[test]
    fn read_timeout_propagates_as_io_error() {
        let reader = TimeoutAfter {
            bytes: vec![0xA0, 0xA1, 0x00],
            pos: 0,
        };
        let mut framed = FrameReader::new(reader);
        let err = framed.read_frame().unwrap_err();
        assert!(err.is_timeout());
        assert!(matches!(err, FrameError::Io(e) if e.kind() == ErrorKind::TimedOut));
    }

    struct TimeoutAfter {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for TimeoutAfter {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pos >= self.bytes.len() {
                return Err(std::io::Error::from(ErrorKind::TimedOut));
            }
            let n = (self.bytes.len() - self.pos).min(buf.len());
            buf[..n].copy_from_slice(&self.bytes[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn read_with_trace<R: Read>(inner: R) -> (FrameError, String) {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let err = tracing::subscriber::with_default(subscriber, || {
            FrameReader::new(inner).read_frame().unwrap_err()
        });
        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        (err, output)
    }

    #[test]
    fn noise_before_close_is_traced() {
        let (err, logs) = read_with_trace(Cursor::new(vec![0xFF, 0x00, 0x42]));
        assert!(matches!(err, FrameError::ConnectionClosed));
        assert!(logs.contains("ff0042"), "{logs}");
    }

    #[test]
    fn noise_before_timeout_is_traced() {
        let (err, logs) = read_with_trace(TimeoutAfter {
            bytes: vec![0x13, 0x37, 0xA0],
            pos: 0,
        });
        assert!(err.is_timeout());
        assert!(logs.contains("1337a0"), "{logs}");
    }

    #[test]
    fn interrupted_read_retries() {
        let reader = InterruptedThenData {
            state: 0,
            bytes: wire(0x08, b"ok"),
            pos: 0,
        };
        let mut framed = FrameReader::new(reader);
        let frame = framed.read_frame().unwrap();

        assert_eq!(frame.message_id, 0x08);
        assert_eq!(frame.payload.as_ref(), b"ok");
    }

    struct InterruptedThenData {
        state: u8,
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for InterruptedThenData {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.state == 0 {
                self.state = 1;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            if self.pos >= self.bytes.len() {
                return Ok(0);
            }
            let n = (self.bytes.len() - self.pos).min(buf.len());
            buf[..n].copy_from_slice(&self.bytes[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    #[test]
    fn sync_budget_can_be_adjusted() {
        let mut reader = reader(vec![0x00; 8]);
        reader.set_max_sync_attempts(3);
        assert_eq!(reader.config().max_sync_attempts, 3);
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(
            err,
            FrameError::SyncTimeout { attempts: 3, ref discarded } if discarded == &Bytes::from_static(&[0, 0, 0])
        ));
    }

    #[test]
    fn accessors_and_into_inner() {
        let mut reader = reader(Vec::new());
        let _ = reader.get_ref();
        let _ = reader.get_mut();
        let _inner = reader.into_inner();
    }
}
