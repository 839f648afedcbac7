//! Tests for the bundled framing policies.

use std::num::NonZeroUsize;

use bincode::{BorrowDecode, Encode};

use crate::{
    connection::ConnectionId,
    reassembly::{
        FixedSizeFraming,
        FramingPolicy,
        LengthPrefixedFraming,
        PendingBuffer,
        ReassemblyConfig,
        length_prefixed_frame,
    },
};

#[derive(Clone, Debug, Encode, BorrowDecode, PartialEq, Eq)]
struct ExamplePacket(u32);

fn buffer_with(bytes: &[u8]) -> PendingBuffer {
    PendingBuffer::with_first_chunk(&ReassemblyConfig::default(), bytes)
        .expect("allocation succeeds")
}

fn append(buffer: &mut PendingBuffer, bytes: &[u8]) {
    buffer
        .write(bytes, ReassemblyConfig::default().growth_increment)
        .expect("write succeeds");
}

#[test]
fn length_prefixed_extracts_a_complete_frame() {
    let framing = LengthPrefixedFraming::<ExamplePacket>::default();
    let frame = length_prefixed_frame(&ExamplePacket(11)).expect("frame encodes");
    let mut buffer = buffer_with(&frame);

    let packets = framing
        .extract(ConnectionId::new(1), &mut buffer)
        .expect("extraction succeeds");

    assert_eq!(packets, vec![ExamplePacket(11)]);
    assert!(buffer.is_empty());
}

#[test]
fn length_prefixed_drains_every_complete_frame_in_one_pass() {
    let framing = LengthPrefixedFraming::<ExamplePacket>::default();
    let mut bytes = length_prefixed_frame(&ExamplePacket(1)).expect("frame encodes");
    bytes.extend(length_prefixed_frame(&ExamplePacket(2)).expect("frame encodes"));
    bytes.extend(length_prefixed_frame(&ExamplePacket(3)).expect("frame encodes"));
    let mut buffer = buffer_with(&bytes);

    let packets = framing
        .extract(ConnectionId::new(1), &mut buffer)
        .expect("extraction succeeds");

    assert_eq!(
        packets,
        vec![ExamplePacket(1), ExamplePacket(2), ExamplePacket(3)]
    );
    assert!(buffer.is_empty());
}

#[test]
fn length_prefixed_leaves_a_partial_body_in_place() {
    let framing = LengthPrefixedFraming::<ExamplePacket>::default();
    let frame = length_prefixed_frame(&ExamplePacket(9)).expect("frame encodes");
    let (head, tail) = frame.split_at(frame.len() - 1);
    let mut buffer = buffer_with(head);

    let packets = framing
        .extract(ConnectionId::new(1), &mut buffer)
        .expect("extraction succeeds");
    assert!(packets.is_empty());
    assert_eq!(buffer.len(), head.len(), "partial frame must stay buffered");

    append(&mut buffer, tail);
    let packets = framing
        .extract(ConnectionId::new(1), &mut buffer)
        .expect("extraction succeeds");
    assert_eq!(packets, vec![ExamplePacket(9)]);
    assert!(buffer.is_empty());
}

#[test]
fn length_prefixed_leaves_a_partial_prefix_in_place() {
    let framing = LengthPrefixedFraming::<ExamplePacket>::default();
    let mut buffer = buffer_with(&[0, 0]);

    let packets = framing
        .extract(ConnectionId::new(1), &mut buffer)
        .expect("extraction succeeds");

    assert!(packets.is_empty());
    assert_eq!(buffer.len(), 2);
}

#[test]
fn length_prefixed_rejects_a_frame_beyond_the_cap() {
    let framing =
        LengthPrefixedFraming::<ExamplePacket>::new(NonZeroUsize::new(4).expect("non-zero"));
    let mut buffer = buffer_with(&[0, 0, 1, 0]);

    let err = framing
        .extract(ConnectionId::new(1), &mut buffer)
        .expect_err("oversized frame must be rejected");

    assert!(err.to_string().contains("exceeds"));
}

#[test]
fn length_prefixed_rejects_an_undecodable_body() {
    let framing = LengthPrefixedFraming::<ExamplePacket>::default();
    // Prefix of 1 byte, then a body too short to hold a u32.
    let mut buffer = buffer_with(&[0, 0, 0, 1, 0xFF]);

    framing
        .extract(ConnectionId::new(1), &mut buffer)
        .expect_err("truncated body must be rejected");
}

#[test]
fn fixed_size_framing_emits_whole_windows_and_keeps_the_remainder() {
    let framing = FixedSizeFraming::new(NonZeroUsize::new(4).expect("non-zero"));
    let mut buffer = buffer_with(b"ABCDEFGHij");

    let packets = framing
        .extract(ConnectionId::new(1), &mut buffer)
        .expect("extraction succeeds");

    assert_eq!(packets, vec![b"ABCD".to_vec(), b"EFGH".to_vec()]);
    assert_eq!(buffer.as_slice(), b"ij");
}

#[test]
fn fixed_size_framing_waits_for_a_full_window() {
    let framing = FixedSizeFraming::new(NonZeroUsize::new(4).expect("non-zero"));
    let mut buffer = buffer_with(b"AB");

    let packets = framing
        .extract(ConnectionId::new(1), &mut buffer)
        .expect("extraction succeeds");

    assert!(packets.is_empty());
    assert_eq!(buffer.as_slice(), b"AB");
}
