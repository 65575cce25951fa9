// * ✅ reorder draining ([2, 0, 1])
// * ✅ termination on exact multiples and on a short final block
// * ✅ length published after the last block was merged
// * ✅ empty input
// * ✅ reorder overflow and late duplicates

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ecu_core::crypto::KeyMaterial;
    use ecu_core::pipeline::{EncryptedBlock, MergeStatus, Merger, PipelineConfig, QueueProfile};
    use ecu_core::queue::{AdmissionMargin, BlockQueue};
    use ecu_core::types::StreamError;

    // ------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------
    /// One-byte key, so blocks are 8 bytes.
    fn config(reorder_capacity: usize) -> Arc<PipelineConfig> {
        let key = KeyMaterial::new(vec![0x5A]).unwrap();
        let queues = QueueProfile { reorder_capacity, ..QueueProfile::default() };
        Arc::new(PipelineConfig::new(key, 1).with_queues(queues))
    }

    fn queue() -> Arc<BlockQueue<EncryptedBlock>> {
        Arc::new(BlockQueue::new("ENC", 16).unwrap())
    }

    fn block(seq: u32, len: usize) -> EncryptedBlock {
        EncryptedBlock::new(seq, vec![seq as u8; len])
    }

    // ------------------------------------------------------------
    // Tests
    // ------------------------------------------------------------
    #[test]
    fn out_of_order_arrivals_emit_in_sequence() {
        let cfg = config(16);
        cfg.set_total_input_length(24).unwrap();
        let mut out: Vec<u8> = Vec::new();
        {
            let mut m = Merger::new(cfg, queue(), &mut out);
            assert_eq!(m.accept(block(2, 8)).unwrap(), MergeStatus::Pending);
            assert_eq!(m.reorder().sequences(), vec![2]);
            assert_eq!(m.accept(block(0, 8)).unwrap(), MergeStatus::Pending);
            assert_eq!(m.next_expected(), 1);
            assert_eq!(m.accept(block(1, 8)).unwrap(), MergeStatus::Complete);
            assert!(m.reorder().is_empty());
        }
        let mut expected = vec![0u8; 8];
        expected.extend([1u8; 8]);
        expected.extend([2u8; 8]);
        assert_eq!(out, expected);
    }

    #[test]
    fn exact_multiple_terminates_after_last_block() {
        let cfg = config(16);
        cfg.set_total_input_length(16).unwrap();
        let mut out: Vec<u8> = Vec::new();
        let mut m = Merger::new(cfg, queue(), &mut out);
        assert_eq!(m.accept(block(0, 8)).unwrap(), MergeStatus::Pending);
        assert_eq!(m.accept(block(1, 8)).unwrap(), MergeStatus::Complete);
        assert_eq!(m.received(), 2);
    }

    #[test]
    fn short_final_block_is_emitted_before_termination() {
        let cfg = config(16);
        cfg.set_total_input_length(20).unwrap();
        let mut out: Vec<u8> = Vec::new();
        {
            let mut m = Merger::new(cfg, queue(), &mut out);
            assert_eq!(m.accept(block(0, 8)).unwrap(), MergeStatus::Pending);
            assert_eq!(m.accept(block(1, 8)).unwrap(), MergeStatus::Pending);
            assert_eq!(m.accept(block(2, 4)).unwrap(), MergeStatus::Complete);
        }
        assert_eq!(out.len(), 20);
        assert_eq!(&out[16..], &[2u8; 4]);
    }

    #[test]
    fn length_published_after_last_block() {
        let cfg = config(16);
        let mut out: Vec<u8> = Vec::new();
        let mut m = Merger::new(cfg.clone(), queue(), &mut out);
        assert_eq!(m.accept(block(0, 8)).unwrap(), MergeStatus::Pending);
        assert_eq!(m.accept(block(1, 8)).unwrap(), MergeStatus::Pending);
        assert_eq!(m.check_complete().unwrap(), MergeStatus::Pending);

        cfg.set_total_input_length(16).unwrap();
        assert_eq!(m.check_complete().unwrap(), MergeStatus::Complete);
    }

    #[test]
    fn empty_input_completes_immediately() {
        let cfg = config(16);
        cfg.set_total_input_length(0).unwrap();
        let mut out: Vec<u8> = Vec::new();
        let mut m = Merger::new(cfg, queue(), &mut out);
        assert_eq!(m.check_complete().unwrap(), MergeStatus::Complete);
        drop(m);
        assert!(out.is_empty());
    }

    #[test]
    fn reorder_overflow_is_reported() {
        let cfg = config(2);
        let mut out: Vec<u8> = Vec::new();
        let mut m = Merger::new(cfg, queue(), &mut out);
        m.accept(block(1, 8)).unwrap();
        m.accept(block(2, 8)).unwrap();
        let err = m.accept(block(3, 8)).unwrap_err();
        assert!(matches!(err, StreamError::ReorderOverflow { capacity: 2, sequence: 3 }));
        assert!(err.is_fatal_invariant());
    }

    #[test]
    fn late_duplicate_is_rejected() {
        let cfg = config(16);
        let mut out: Vec<u8> = Vec::new();
        let mut m = Merger::new(cfg, queue(), &mut out);
        m.accept(block(0, 8)).unwrap();
        assert!(matches!(m.accept(block(0, 8)), Err(StreamError::Validation(_))));
    }

    #[test]
    fn run_drains_queue_until_complete() {
        let cfg = config(16);
        cfg.set_total_input_length(24).unwrap();
        let q = queue();
        for seq in [1u32, 2, 0] {
            q.push_with(AdmissionMargin::FULL_BLOCK, || block(seq, 8)).unwrap();
        }

        let mut out: Vec<u8> = Vec::new();
        let report = Merger::new(cfg, q.clone(), &mut out).run().unwrap();

        assert_eq!(report.counters.blocks_received, 3);
        assert_eq!(report.counters.blocks_emitted, 3);
        assert_eq!(report.counters.blocks_reordered, 2);
        assert_eq!(report.counters.reorder_high_water, 2);
        assert_eq!(report.counters.bytes_emitted, 24);
        assert_eq!(out.len(), 24);
        assert_eq!(out[0], 0);
        assert_eq!(out[23], 2);
    }

    #[test]
    fn run_fails_when_queue_closes_early() {
        let cfg = config(16);
        let q = queue();
        q.close();
        let mut out: Vec<u8> = Vec::new();
        let err = Merger::new(cfg, q, &mut out).run().unwrap_err();
        assert!(matches!(err, StreamError::Queue(_)));
    }
}
