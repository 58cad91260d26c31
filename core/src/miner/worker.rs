// Copyright 2018 Kodebox, Inc.
// This file is part of InkChain.
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use std::sync::atomic::{AtomicBool, Ordering};

use itypes::{BlockHash, BlockNumber, SignedOperation};

use super::Miner;
use crate::block::{compute_block_hash, encode_ops, Block};
use crate::pow::meets_difficulty;

impl Miner {
    /// The mining worker. Each round snapshots the head and the whole
    /// unmined pool, then walks the nonce space from zero. The interrupt
    /// flag is polled once per attempt: a head switch elsewhere aborts the
    /// search and the next round rebuilds against the new head.
    pub fn run_mining_loop(&self, stop: &AtomicBool) {
        cinfo!(MINER, "Mining worker started");
        while !stop.load(Ordering::SeqCst) {
            // Clear the flag before reading the head: a switch landing in
            // between re-raises it and the first attempt below notices.
            self.interrupt().store(false, Ordering::SeqCst);
            let (prev_hash, height, ops) = self.prepare_candidate();
            let ops_raw = encode_ops(&ops);
            let difficulty = self.settings().required_difficulty(ops.is_empty());

            let mut winner = None;
            for nonce in 0..=u32::MAX {
                if stop.load(Ordering::Relaxed) || self.interrupt().load(Ordering::Relaxed) {
                    break
                }
                let hash = compute_block_hash(height, &prev_hash, &ops_raw, self.public(), nonce);
                if meets_difficulty(&hash, difficulty) {
                    winner = Some(nonce);
                    break
                }
            }

            if let Some(nonce) = winner {
                let block = Block::new(height, prev_hash, ops, *self.public(), nonce);
                if !self.commit_mined(block) {
                    cdebug!(MINER, "Discarded a stale candidate at height {}", height);
                }
            } else if !stop.load(Ordering::Relaxed) && !self.interrupt().load(Ordering::Relaxed) {
                cwarn!(MINER, "Exhausted the nonce space at height {}; rebuilding the candidate", height);
            }
        }
        cinfo!(SHUTDOWN, "Mining worker stopped");
    }

    fn prepare_candidate(&self) -> (BlockHash, BlockNumber, Vec<SignedOperation>) {
        let chain = self.chain.read();
        let canvas = self.canvas.read();
        let head = canvas.head();
        let height = chain.height_of(&head).expect("the head is always stored; qed") + 1;
        (head, height, canvas.pools().unmined_snapshot())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};

    use super::*;
    use crate::pool::PoolStatus;
    use crate::settings::CanvasSettings;
    use crate::test_helpers::{key_pair, settings};

    fn wait_until<F: Fn() -> bool>(condition: F) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while !condition() {
            assert!(Instant::now() < deadline, "timed out waiting for the worker");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn worker_mines_empty_blocks_and_earns_ink() {
        let miner = Arc::new(Miner::new(settings(), key_pair(1)));
        let stop = Arc::new(AtomicBool::new(false));

        let handle = {
            let miner = Arc::clone(&miner);
            let stop = Arc::clone(&stop);
            thread::spawn(move || miner.run_mining_loop(&stop))
        };

        wait_until(|| miner.head() != miner.genesis());
        stop.store(true, Ordering::SeqCst);
        handle.join().unwrap();

        assert!(miner.available_ink() >= CanvasSettings::new_test().ink_per_no_op_block);
    }

    #[test]
    fn worker_packages_pending_ops() {
        let miner = Arc::new(Miner::new(settings(), key_pair(1)));
        let stop = Arc::new(AtomicBool::new(false));

        let handle = {
            let miner = Arc::clone(&miner);
            let stop = Arc::clone(&stop);
            thread::spawn(move || miner.run_mining_loop(&stop))
        };

        // Let the worker earn some ink, then draw.
        wait_until(|| miner.available_ink() > 0);
        let shape = itypes::Shape::new(
            itypes::ShapeKind::Path,
            "M 1 1 L 4 4".into(),
            itypes::TRANSPARENT.into(),
            "black".into(),
            *miner.public(),
        )
        .unwrap();
        let signature = miner.submit_add(1, shape).unwrap();

        wait_until(|| miner.op_status(&signature) == Some(PoolStatus::Validated));
        stop.store(true, Ordering::SeqCst);
        handle.join().unwrap();
    }
}
