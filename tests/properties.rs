//! Property tests for the reassembly data path.
//!
//! The extraction step must observe exactly the concatenation of
//! submitted chunks, in call order, regardless of how deliveries are
//! fragmented.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use packetloom::{
    ConnectionId,
    FramingError,
    FramingPolicy,
    PendingBuffer,
    ReassemblyConfig,
    StreamReassembler,
};
use proptest::prelude::*;

/// Policy that drains every byte it sees into a shared sink, emitting no
/// packets. What the sink observes is exactly what extraction was handed.
struct DrainToSink(Arc<Mutex<Vec<u8>>>);

impl FramingPolicy for DrainToSink {
    type Packet = Vec<u8>;

    fn extract(
        &self,
        _connection: ConnectionId,
        buffer: &mut PendingBuffer,
    ) -> Result<Vec<Vec<u8>>, FramingError> {
        let observed = buffer.as_slice().to_vec();
        buffer.consume(observed.len());
        self.0.lock().expect("lock").extend_from_slice(&observed);
        Ok(Vec::new())
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn extraction_observes_chunks_concatenated_in_order(
        chunks in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..64), 1..16),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .start_paused(true)
            .build()
            .expect("runtime builds");

        runtime.block_on(async {
            let sink = Arc::new(Mutex::new(Vec::new()));
            let (reassembler, handle) = StreamReassembler::new(
                ReassemblyConfig::default(),
                DrainToSink(Arc::clone(&sink)),
            );
            let worker = tokio::spawn(reassembler.run());

            let connection = ConnectionId::new(1);
            let expected: Vec<u8> = chunks.iter().flatten().copied().collect();
            for chunk in &chunks {
                handle.submit(connection, chunk).expect("submit accepted");
            }

            tokio::time::timeout(Duration::from_secs(2), async {
                while sink.lock().expect("lock").len() < expected.len() {
                    tokio::time::sleep(Duration::from_millis(1)).await;
                }
            })
            .await
            .expect("all bytes observed in time");

            assert_eq!(*sink.lock().expect("lock"), expected, "gap, duplication, or reorder");
            assert_eq!(handle.buffered_bytes(), 0);

            handle.stop();
            worker.await.expect("worker exits cleanly");
        });
    }

    #[test]
    fn buffer_growth_never_loses_bytes(
        chunks in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..128), 1..12),
    ) {
        let config = ReassemblyConfig::default();
        let mut iter = chunks.iter();
        let first = iter.next().expect("at least one chunk");
        let mut buffer = PendingBuffer::with_first_chunk(&config, first)
            .expect("allocation succeeds");

        for chunk in iter {
            let used = buffer.len();
            buffer
                .write(chunk, config.growth_increment)
                .expect("growth succeeds");
            prop_assert!(buffer.capacity() >= used + chunk.len());
        }

        let expected: Vec<u8> = chunks.iter().flatten().copied().collect();
        prop_assert_eq!(buffer.as_slice(), expected.as_slice());
    }
}
