//! Pluggable extraction step turning accumulated bytes into packets.
//!
//! The framing rules of any particular application protocol are a policy
//! supplied by the embedder, not something this crate dictates. Two
//! ready-made policies ship here: [`LengthPrefixedFraming`] for the
//! common prefix-plus-body layout and [`FixedSizeFraming`] for trivially
//! framed protocols.

use std::{marker::PhantomData, num::NonZeroUsize};

use bytes::{Buf, BufMut};

use super::{PendingBuffer, error::FramingError};
use crate::{connection::ConnectionId, packet::Packet};

/// Number of bytes in the prefix used by [`LengthPrefixedFraming`].
pub const LENGTH_PREFIX_BYTES: usize = 4;

/// Default ceiling on a single length-prefixed frame body.
pub const DEFAULT_MAX_FRAME_LEN: NonZeroUsize = NonZeroUsize::new(64 * 1024).unwrap();

/// Protocol-specific extraction step.
///
/// The reassembly worker invokes the policy once per pass over a pending
/// connection, holding the buffer lock so extraction never races a
/// concurrent `submit` for the same connection.
pub trait FramingPolicy: Send + Sync + 'static {
    /// Packet type produced by this policy.
    type Packet: Packet + Send + 'static;

    /// Drain as many complete packets as the accumulated bytes allow.
    ///
    /// Implementations consume whole frames from the front of `buffer`
    /// (via [`PendingBuffer::consume`]) and leave any trailing partial
    /// frame in place for the next delivery.
    ///
    /// # Errors
    ///
    /// Returns [`FramingError`] when the bytes violate the policy's
    /// framing rules. The worker logs the error and resets that
    /// connection's buffer; other connections are unaffected.
    fn extract(
        &self,
        connection: ConnectionId,
        buffer: &mut PendingBuffer,
    ) -> Result<Vec<Self::Packet>, FramingError>;
}

/// Length-prefixed framing: a big-endian `u32` byte count followed by a
/// bincode-encoded packet body.
#[derive(Debug)]
pub struct LengthPrefixedFraming<P> {
    max_frame_len: NonZeroUsize,
    _packet: PhantomData<fn() -> P>,
}

impl<P> LengthPrefixedFraming<P> {
    /// Create a policy rejecting frame bodies larger than `max_frame_len`.
    #[must_use]
    pub const fn new(max_frame_len: NonZeroUsize) -> Self {
        Self {
            max_frame_len,
            _packet: PhantomData,
        }
    }
}

impl<P> Default for LengthPrefixedFraming<P> {
    fn default() -> Self { Self::new(DEFAULT_MAX_FRAME_LEN) }
}

impl<P> FramingPolicy for LengthPrefixedFraming<P>
where
    P: Packet + Send + 'static,
{
    type Packet = P;

    fn extract(
        &self,
        _connection: ConnectionId,
        buffer: &mut PendingBuffer,
    ) -> Result<Vec<P>, FramingError> {
        let mut packets = Vec::new();
        loop {
            let parsed = {
                let bytes = buffer.as_slice();
                if bytes.len() < LENGTH_PREFIX_BYTES {
                    None
                } else {
                    let mut prefix = &bytes[..LENGTH_PREFIX_BYTES];
                    let frame_len = prefix.get_u32() as usize;
                    if frame_len > self.max_frame_len.get() {
                        return Err(FramingError::new(format!(
                            "frame of {frame_len} bytes exceeds the {} byte cap",
                            self.max_frame_len
                        )));
                    }
                    let end = LENGTH_PREFIX_BYTES + frame_len;
                    if bytes.len() < end {
                        None
                    } else {
                        let (packet, _) = P::from_bytes(&bytes[LENGTH_PREFIX_BYTES..end])
                            .map_err(|err| {
                                FramingError::new(format!("frame body decode failed: {err}"))
                            })?;
                        Some((packet, end))
                    }
                }
            };
            match parsed {
                Some((packet, consumed)) => {
                    buffer.consume(consumed);
                    packets.push(packet);
                }
                None => break,
            }
        }
        Ok(packets)
    }
}

/// Fixed-width framing: every `frame_len` bytes form one packet, handed
/// through as the raw window.
#[derive(Clone, Copy, Debug)]
pub struct FixedSizeFraming {
    frame_len: NonZeroUsize,
}

impl FixedSizeFraming {
    /// Create a policy emitting frames of exactly `frame_len` bytes.
    #[must_use]
    pub const fn new(frame_len: NonZeroUsize) -> Self { Self { frame_len } }
}

impl FramingPolicy for FixedSizeFraming {
    type Packet = Vec<u8>;

    fn extract(
        &self,
        _connection: ConnectionId,
        buffer: &mut PendingBuffer,
    ) -> Result<Vec<Vec<u8>>, FramingError> {
        let mut packets = Vec::new();
        let frame_len = self.frame_len.get();
        while buffer.len() >= frame_len {
            packets.push(buffer.as_slice()[..frame_len].to_vec());
            buffer.consume(frame_len);
        }
        Ok(packets)
    }
}

/// Encode `packet` as a single frame in [`LengthPrefixedFraming`] layout.
///
/// # Errors
///
/// Returns [`FramingError`] when the packet fails to encode or its body
/// exceeds the `u32` prefix range.
pub fn length_prefixed_frame<P: Packet>(packet: &P) -> Result<Vec<u8>, FramingError> {
    let body = packet
        .to_bytes()
        .map_err(|err| FramingError::new(format!("frame body encode failed: {err}")))?;
    let len = u32::try_from(body.len()).map_err(|_| {
        FramingError::new(format!(
            "frame body of {} bytes exceeds the u32 prefix",
            body.len()
        ))
    })?;
    let mut frame = Vec::with_capacity(LENGTH_PREFIX_BYTES + body.len());
    frame.put_u32(len);
    frame.extend_from_slice(&body);
    Ok(frame)
}
