// # 📂 `tests/test_pipeline.rs`

// * ✅ end-to-end encrypt → decrypt correctness for 1..=10 workers
// * ✅ output matches the sequential reference cipher
// * ✅ boundary conditions (empty input, exact block, short final block)
// * ✅ backpressure with minimal queues
// * ✅ configuration errors surface before any thread starts
// * ✅ file, reader/writer and memory sources and sinks

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Write};
    use std::path::PathBuf;
    use std::sync::Arc;

    use parking_lot::Mutex;

    use rand::{Rng, RngCore, SeedableRng};
    use rand::rngs::StdRng;

    use ecu_core::constants::MIN_QUEUE_CAPACITY;
    use ecu_core::crypto::{KeyMaterial, RotatingKeyCipher};
    use ecu_core::pipeline::{
        decrypt_stream, encrypt_stream, run_pipeline, EncryptParams, InputSource, OutputSink,
        PipelineConfig, QueueProfile,
    };
    use ecu_core::pipeline::io::{SharedBuffer, SharedBufferWriter};
    use ecu_core::telemetry::TelemetrySnapshot;
    use ecu_core::types::StreamError;

    // ------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------
    fn random_bytes(rng: &mut StdRng, len: usize) -> Vec<u8> {
        let mut buf = vec![0u8; len];
        rng.fill_bytes(&mut buf);
        buf
    }

    fn random_key(rng: &mut StdRng, len: usize) -> KeyMaterial {
        KeyMaterial::new(random_bytes(rng, len)).unwrap()
    }

    fn run(data: &[u8], config: PipelineConfig) -> Result<(Vec<u8>, TelemetrySnapshot), StreamError> {
        let mut out = Vec::new();
        let snapshot = run_pipeline(Cursor::new(data.to_vec()), &mut out, Arc::new(config))?;
        Ok((out, snapshot))
    }

    /// Per-test scratch path, removed on drop.
    struct TempPath(PathBuf);

    impl TempPath {
        fn new(tag: &str) -> Self {
            Self(std::env::temp_dir().join(format!("ecu-{}-{}.bin", std::process::id(), tag)))
        }
    }

    impl Drop for TempPath {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.0);
        }
    }

    fn roundtrip(data: &[u8], key: &KeyMaterial, threads: usize) {
        let (encrypted, snapshot) = run(data, PipelineConfig::new(key.clone(), threads)).unwrap();
        assert!(snapshot.sanity_check(), "counters out of balance: {:?}", snapshot.counters);

        let reference = RotatingKeyCipher::new(key.clone()).apply_blocks(data, key.block_size());
        assert_eq!(encrypted, reference, "threads={threads}");

        let (decrypted, _) = run(&encrypted, PipelineConfig::new(key.clone(), threads)).unwrap();
        assert_eq!(decrypted, data, "threads={threads}");
    }

    // ------------------------------------------------------------
    // Tests
    // ------------------------------------------------------------
    #[test]
    fn roundtrip_every_worker_count() {
        let mut rng = StdRng::seed_from_u64(0xEC0);
        for threads in 1..=10 {
            let key_len = rng.gen_range(1..=16);
            let key = random_key(&mut rng, key_len);
            let len = rng.gen_range(0..20_000);
            let data = random_bytes(&mut rng, len);
            roundtrip(&data, &key, threads);
        }
    }

    #[test]
    fn empty_input_produces_empty_output() {
        let key = KeyMaterial::new(vec![0x42]).unwrap();
        let (out, snapshot) = run(&[], PipelineConfig::new(key, 3)).unwrap();
        assert!(out.is_empty());
        assert_eq!(snapshot.counters.blocks_dispatched, 0);
        assert_eq!(snapshot.counters.blocks_emitted, 0);
        assert!(snapshot.sanity_check());
    }

    #[test]
    fn exact_multiple_of_block_size() {
        let key = KeyMaterial::new(vec![0x0F, 0xF0]).unwrap();
        let data = vec![0xA5u8; key.block_size() * 2];
        let (out, snapshot) = run(&data, PipelineConfig::new(key.clone(), 2)).unwrap();
        assert_eq!(snapshot.counters.blocks_emitted, 2);
        assert_eq!(out, RotatingKeyCipher::new(key).apply_blocks(&data, 16));
    }

    #[test]
    fn short_final_block_is_written() {
        let key = KeyMaterial::new(vec![0x01]).unwrap();
        let data: Vec<u8> = (0..21u8).collect();
        let (out, snapshot) = run(&data, PipelineConfig::new(key.clone(), 4)).unwrap();
        assert_eq!(out.len(), 21);
        assert_eq!(snapshot.counters.blocks_emitted, 3);
        assert_eq!(out, RotatingKeyCipher::new(key).apply_blocks(&data, 8));
    }

    #[test]
    fn single_byte_input() {
        let key = KeyMaterial::new(vec![0x01]).unwrap();
        let (out, _) = run(&[0x05], PipelineConfig::new(key, 1)).unwrap();
        assert_eq!(out, vec![0x04]);
    }

    #[test]
    fn minimal_queues_still_complete() {
        let mut rng = StdRng::seed_from_u64(7);
        let key = random_key(&mut rng, 3);
        let data = random_bytes(&mut rng, 5_000);
        let queues = QueueProfile {
            dist_capacity: MIN_QUEUE_CAPACITY,
            enc_capacity: MIN_QUEUE_CAPACITY,
            reorder_capacity: 64,
        };
        let config = PipelineConfig::new(key.clone(), 6).with_queues(queues);
        let (out, snapshot) = run(&data, config).unwrap();
        assert_eq!(out, RotatingKeyCipher::new(key).apply_blocks(&data, 24));
        assert!(snapshot.sanity_check());
    }

    #[test]
    fn custom_block_size_roundtrip() {
        let key = KeyMaterial::new(vec![0x33, 0x44, 0x55]).unwrap();
        let data = vec![0x10u8; 1000];
        let config = PipelineConfig::new(key.clone(), 3).with_block_size(7);
        let (out, snapshot) = run(&data, config).unwrap();
        assert_eq!(snapshot.block_size, 7);
        assert_eq!(out, RotatingKeyCipher::new(key.clone()).apply_blocks(&data, 7));

        let (back, _) = run(&out, PipelineConfig::new(key, 5).with_block_size(7)).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn invalid_thread_count_is_rejected() {
        let key = KeyMaterial::new(vec![0x01]).unwrap();
        for threads in [0, 11] {
            let err = run(b"abc", PipelineConfig::new(key.clone(), threads)).unwrap_err();
            assert!(matches!(err, StreamError::Config(_)), "threads={threads}");
            assert!(!err.is_fatal_invariant());
        }
    }

    // ------------------------------------------------------------
    // Public API (sources / sinks)
    // ------------------------------------------------------------
    #[test]
    fn encrypt_then_decrypt_through_memory_sinks() {
        let key = KeyMaterial::from_hex("deadbeef").unwrap();
        let data = b"the quick brown fox jumps over the lazy dog".repeat(50);
        let params = EncryptParams::with_threads(4);

        let enc = encrypt_stream(InputSource::Memory(data.clone()), OutputSink::Memory, &key, &params).unwrap();
        let ciphertext = enc.output.clone().unwrap();
        assert_eq!(ciphertext.len(), data.len());
        assert_ne!(ciphertext, data);

        let dec = decrypt_stream(InputSource::Memory(ciphertext), OutputSink::Memory, &key, &params).unwrap();
        assert_eq!(dec.output.unwrap(), data);
    }

    #[test]
    fn encrypt_stream_rejects_bad_queue_profile() {
        let key = KeyMaterial::new(vec![1]).unwrap();
        let params = EncryptParams {
            queues: Some(QueueProfile { dist_capacity: 2, ..QueueProfile::default() }),
            ..EncryptParams::with_threads(1)
        };
        let err = encrypt_stream(InputSource::Memory(vec![1, 2]), OutputSink::Memory, &key, &params).unwrap_err();
        assert!(matches!(err, StreamError::Config(_)));
    }

    #[test]
    fn snapshot_reports_run_shape() {
        let key = KeyMaterial::new(vec![9, 9]).unwrap();
        let data = vec![1u8; 100];
        let (_, snapshot) = run(&data, PipelineConfig::new(key, 2)).unwrap();
        assert_eq!(snapshot.encryptor_threads, 2);
        assert_eq!(snapshot.block_size, 16);
        assert_eq!(snapshot.counters.bytes_read, 100);
        assert_eq!(snapshot.counters.blocks_dispatched, 7);
        assert_eq!(snapshot.output_bytes(), 100);
    }

    #[test]
    fn file_sources_and_sinks_roundtrip() {
        let mut rng = StdRng::seed_from_u64(0xF11E);
        let key = random_key(&mut rng, 5);
        let data = random_bytes(&mut rng, 12_345);

        let plain = TempPath::new("file-plain");
        let cipher = TempPath::new("file-cipher");
        let back = TempPath::new("file-back");
        std::fs::write(&plain.0, &data).unwrap();

        let params = EncryptParams::with_threads(3);
        let enc = encrypt_stream(InputSource::File(plain.0.clone()), OutputSink::File(cipher.0.clone()), &key, &params)
            .unwrap();
        assert!(enc.output.is_none());
        assert!(enc.sanity_check());

        let ciphertext = std::fs::read(&cipher.0).unwrap();
        assert_eq!(ciphertext, RotatingKeyCipher::new(key.clone()).apply_blocks(&data, key.block_size()));

        decrypt_stream(InputSource::File(cipher.0.clone()), OutputSink::File(back.0.clone()), &key, &params).unwrap();
        assert_eq!(std::fs::read(&back.0).unwrap(), data);
    }

    #[test]
    fn missing_input_file_is_io_error() {
        let key = KeyMaterial::new(vec![1]).unwrap();
        let missing = TempPath::new("does-not-exist");
        let err = encrypt_stream(InputSource::File(missing.0.clone()), OutputSink::Memory, &key, &EncryptParams::default())
            .unwrap_err();
        assert!(matches!(err, StreamError::Io(_)));
        assert!(!err.is_fatal_invariant());
    }

    #[test]
    fn reader_source_into_writer_sink() {
        let key = KeyMaterial::from_hex("c0ffee").unwrap();
        let data = b"boxed reader into boxed writer".repeat(40);
        let captured: SharedBuffer = Arc::new(Mutex::new(Vec::new()));

        encrypt_stream(
            InputSource::Reader(Box::new(Cursor::new(data.clone()))),
            OutputSink::Writer(Box::new(SharedBufferWriter::new(captured.clone()))),
            &key,
            &EncryptParams::with_threads(2),
        )
        .unwrap();

        let ciphertext = captured.lock().clone();
        assert_eq!(ciphertext, RotatingKeyCipher::new(key.clone()).apply_blocks(&data, key.block_size()));
    }

    #[test]
    fn shared_buffer_writer_appends() {
        let buf: SharedBuffer = Arc::new(Mutex::new(vec![1]));
        let mut w = SharedBufferWriter::new(buf.clone());
        w.write_all(&[2, 3]).unwrap();
        w.flush().unwrap();
        assert_eq!(*buf.lock(), vec![1, 2, 3]);
    }
}
