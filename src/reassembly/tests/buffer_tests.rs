//! Tests for pending-buffer allocation, growth, and consumption.

use std::num::NonZeroUsize;

use rstest::rstest;

use crate::reassembly::{PendingBuffer, ReassemblyConfig};

fn small_config() -> ReassemblyConfig {
    ReassemblyConfig::new(
        NonZeroUsize::new(8).expect("non-zero"),
        NonZeroUsize::new(4).expect("non-zero"),
    )
}

#[test]
fn first_chunk_smaller_than_initial_capacity_uses_initial_capacity() {
    let buffer =
        PendingBuffer::with_first_chunk(&small_config(), b"ab").expect("allocation succeeds");

    assert_eq!(buffer.as_slice(), b"ab");
    assert!(buffer.capacity() >= 8);
}

#[test]
fn first_chunk_larger_than_initial_capacity_sizes_to_chunk() {
    let chunk = vec![7_u8; 32];
    let buffer =
        PendingBuffer::with_first_chunk(&small_config(), &chunk).expect("allocation succeeds");

    assert_eq!(buffer.len(), 32);
    assert!(buffer.capacity() >= 32);
}

#[test]
fn growth_covers_shortfall_plus_increment() {
    let config = small_config();
    let mut buffer =
        PendingBuffer::with_first_chunk(&config, &[0_u8; 8]).expect("allocation succeeds");
    let before = buffer.capacity();

    buffer
        .write(&[1_u8; 8], config.growth_increment)
        .expect("growth succeeds");

    assert_eq!(buffer.len(), 16);
    assert!(buffer.capacity() >= before + 4, "increment headroom missing");
    assert_eq!(&buffer.as_slice()[8..], &[1_u8; 8]);
}

#[test]
fn write_within_capacity_does_not_grow() {
    let config = small_config();
    let mut buffer =
        PendingBuffer::with_first_chunk(&config, b"ab").expect("allocation succeeds");
    let before = buffer.capacity();

    buffer
        .write(b"cd", config.growth_increment)
        .expect("write succeeds");

    assert_eq!(buffer.capacity(), before);
    assert_eq!(buffer.as_slice(), b"abcd");
}

#[rstest]
#[case::empty_first(&[], b"xy")]
#[case::empty_second(b"xy", &[])]
fn zero_length_chunks_are_accepted(#[case] first: &[u8], #[case] second: &[u8]) {
    let config = small_config();
    let mut buffer = PendingBuffer::with_first_chunk(&config, first).expect("allocation succeeds");
    buffer
        .write(second, config.growth_increment)
        .expect("write succeeds");

    assert_eq!(buffer.len(), first.len() + second.len());
}

#[test]
fn consume_drains_from_the_front_and_keeps_the_tail() {
    let config = small_config();
    let mut buffer =
        PendingBuffer::with_first_chunk(&config, b"abcdef").expect("allocation succeeds");

    buffer.consume(4);

    assert_eq!(buffer.as_slice(), b"ef");
    assert!(!buffer.is_empty());
}

#[test]
fn consume_never_shrinks_capacity() {
    let config = small_config();
    let mut buffer =
        PendingBuffer::with_first_chunk(&config, b"abcdef").expect("allocation succeeds");
    let before = buffer.capacity();

    buffer.consume(6);

    assert!(buffer.is_empty());
    assert_eq!(buffer.capacity(), before);
}

#[test]
#[should_panic(expected = "consume past the end")]
fn consume_past_the_end_panics() {
    let mut buffer =
        PendingBuffer::with_first_chunk(&small_config(), b"ab").expect("allocation succeeds");
    buffer.consume(3);
}

#[test]
fn clear_discards_bytes_but_retains_capacity() {
    let config = small_config();
    let mut buffer =
        PendingBuffer::with_first_chunk(&config, b"abcdef").expect("allocation succeeds");
    let before = buffer.capacity();

    buffer.clear();

    assert!(buffer.is_empty());
    assert_eq!(buffer.capacity(), before);
}
