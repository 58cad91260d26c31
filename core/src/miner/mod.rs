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

mod worker;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Weak;
use std::time::{SystemTime, UNIX_EPOCH};

use crossbeam_channel::{unbounded, Receiver, Sender};
use ikey::{KeyPair, Public};
use itypes::{
    BlockHash, Error, Ink, OpAction, OpSignature, Operation, Shape, SignedOperation, ValidateDepth,
};
use parking_lot::{Mutex, RwLock};

use crate::block::Block;
use crate::canvas::CanvasState;
use crate::chain::ChainStore;
use crate::chain_notify::ChainNotify;
use crate::pool::PoolStatus;
use crate::settings::CanvasSettings;

/// The process singleton: one identity, one chain view. Owns the chain store,
/// the canvas state (head + pools + ledger, under one writer lock) and the
/// listeners. Every task entry point shares it by `Arc`.
///
/// Lock order is `chain` before `canvas`; the watcher mutex is only taken
/// with both released.
pub struct Miner {
    settings: CanvasSettings,
    keypair: KeyPair,
    chain: RwLock<ChainStore>,
    canvas: RwLock<CanvasState>,
    /// Raised when the head moves; the worker polls it between nonce
    /// attempts and restarts its search.
    interrupt: AtomicBool,
    notify: RwLock<Vec<Weak<dyn ChainNotify>>>,
    watchers: Mutex<HashMap<OpSignature, Vec<Sender<BlockHash>>>>,
}

impl Miner {
    pub fn new(settings: CanvasSettings, keypair: KeyPair) -> Self {
        let genesis = settings.genesis_block_hash;
        Miner {
            settings,
            keypair,
            chain: RwLock::new(ChainStore::new(genesis)),
            canvas: RwLock::new(CanvasState::new(genesis)),
            interrupt: AtomicBool::new(false),
            notify: RwLock::new(Vec::new()),
            watchers: Mutex::new(HashMap::new()),
        }
    }

    pub fn settings(&self) -> &CanvasSettings {
        &self.settings
    }

    pub fn public(&self) -> &Public {
        self.keypair.public()
    }

    pub fn genesis(&self) -> BlockHash {
        self.settings.genesis_block_hash
    }

    pub fn head(&self) -> BlockHash {
        self.canvas.read().head()
    }

    pub fn register_notify(&self, target: Weak<dyn ChainNotify>) {
        self.notify.write().push(target);
    }

    pub(crate) fn interrupt(&self) -> &AtomicBool {
        &self.interrupt
    }

    /// Gateway path: build, sign and admit an add operation for this miner's
    /// identity. Returns the operation signature, the caller-facing shape
    /// hash.
    pub fn submit_add(&self, validate_depth: ValidateDepth, shape: Shape) -> Result<OpSignature, Error> {
        let ink_cost = shape.ink_cost();
        let op = Operation {
            action: OpAction::Add(shape),
            ink_cost,
            validate_depth,
            timestamp: unix_time(),
            requester: *self.keypair.public(),
        };
        let signed = SignedOperation::new_signed(op, self.keypair.private())?;
        self.admit_local(signed)
    }

    /// Gateway path: erase a previously added shape. The refund equals the
    /// original cost.
    pub fn submit_remove(&self, validate_depth: ValidateDepth, target: OpSignature) -> Result<OpSignature, Error> {
        let refund = {
            let canvas = self.canvas.read();
            let target_op = canvas.pools().get(&target).ok_or(Error::InvalidShapeHash)?;
            target_op.shape().ok_or(Error::InvalidShapeHash)?.ink_cost()
        };
        let op = Operation {
            action: OpAction::Remove {
                target,
            },
            ink_cost: refund,
            validate_depth,
            timestamp: unix_time(),
            requester: *self.keypair.public(),
        };
        let signed = SignedOperation::new_signed(op, self.keypair.private())?;
        self.admit_local(signed)
    }

    fn admit_local(&self, op: SignedOperation) -> Result<OpSignature, Error> {
        let signature = op.signature();
        {
            let mut canvas = self.canvas.write();
            if canvas.pools().contains(&signature) {
                return Err(Error::Validation("duplicate operation".into()))
            }
            canvas.validate_op(&op, &self.settings)?;
            canvas.insert_unmined(op.clone());
        }
        cinfo!(POOL, "Accepted local op {:x}", signature);
        self.notify_new_op(&op);
        Ok(signature)
    }

    /// Peer path. `Ok(false)` for an operation we already hold, so the
    /// network layer forwards each operation exactly once.
    pub fn import_op(&self, op: SignedOperation) -> Result<bool, Error> {
        let signature = op.signature();
        {
            let mut canvas = self.canvas.write();
            if canvas.pools().contains(&signature) {
                return Ok(false)
            }
            canvas.validate_op(&op, &self.settings)?;
            canvas.insert_unmined(op.clone());
        }
        cdebug!(POOL, "Accepted external op {:x}", signature);
        self.notify_new_op(&op);
        Ok(true)
    }

    /// Peer path for a pushed block. Verifies the claimed hash, the
    /// proof-of-work class and the parent linkage, stores the block, and
    /// switches the head when the newcomer is taller, or equally tall with
    /// the lexicographically larger hash. `Ok(false)` for a known block.
    pub fn import_block(&self, block: Block, claimed_hash: BlockHash) -> Result<bool, Error> {
        if block.hash() != claimed_hash {
            return Err(Error::InvalidBlockHash)
        }
        if !block.verify_pow(&self.settings) {
            return Err(Error::InvalidBlockHash)
        }
        for op in block.ops() {
            if !op.verify().unwrap_or(false) {
                return Err(Error::InvalidSignature)
            }
        }

        let newly_validated;
        {
            let mut chain = self.chain.write();
            let mut canvas = self.canvas.write();
            if chain.contains(&claimed_hash) {
                return Ok(false)
            }
            let parent_height = chain.height_of(block.prev_hash()).ok_or(Error::InvalidBlockHash)?;
            if block.height() != parent_height + 1 {
                return Err(Error::InvalidBlockHash)
            }
            chain.insert(block.clone());
            canvas.note_mined(&block);

            let head = canvas.head();
            let head_height = chain.height_of(&head).expect("the head is always stored; qed");
            let switch = block.height() > head_height
                || (block.height() == head_height && claimed_hash > head);
            newly_validated = if switch {
                canvas.reconcile(&chain, claimed_hash, &self.settings)?
            } else {
                Vec::new()
            };
            if switch {
                cinfo!(CHAIN, "New head {:x} at height {}", claimed_hash, block.height());
                self.interrupt.store(true, Ordering::SeqCst);
            }
        }

        self.notify_validated(newly_validated);
        self.notify_new_block(&block);
        Ok(true)
    }

    /// Commits a block this miner just sealed. Returns false when the head
    /// moved while the nonce search ran; the worker then restarts.
    pub(crate) fn commit_mined(&self, block: Block) -> bool {
        let hash = block.hash();
        let newly_validated;
        {
            let mut chain = self.chain.write();
            let mut canvas = self.canvas.write();
            if canvas.head() != *block.prev_hash() {
                return false
            }
            chain.insert(block.clone());
            newly_validated = match canvas.reconcile(&chain, hash, &self.settings) {
                Ok(newly) => newly,
                Err(err) => {
                    cerror!(MINER, "Could not reconcile onto own block {:x}: {}", hash, err);
                    return false
                }
            };
            self.interrupt.store(true, Ordering::SeqCst);
        }
        cinfo!(MINER, "Mined block {:x} at height {}", hash, block.height());

        self.notify_validated(newly_validated);
        self.notify_new_block(&block);
        true
    }

    /// Adopts a foreign head-to-genesis chain when it beats ours: taller, or
    /// equally tall with the larger head hash. Used by the startup sync.
    pub fn import_chain(&self, foreign_head: BlockHash, blocks: Vec<Block>) -> Result<bool, Error> {
        if blocks.is_empty() {
            return if foreign_head == self.genesis() {
                Ok(false)
            } else {
                Err(Error::InvalidBlockHash)
            }
        }
        if blocks[0].hash() != foreign_head {
            return Err(Error::InvalidBlockHash)
        }
        for (index, block) in blocks.iter().enumerate() {
            if !block.verify_pow(&self.settings) {
                return Err(Error::InvalidBlockHash)
            }
            let expected_parent = blocks.get(index + 1).map(Block::hash).unwrap_or_else(|| self.genesis());
            if *block.prev_hash() != expected_parent {
                return Err(Error::InvalidBlockHash)
            }
            if block.height() != (blocks.len() - index) as u32 {
                return Err(Error::InvalidBlockHash)
            }
            for op in block.ops() {
                if !op.verify().unwrap_or(false) {
                    return Err(Error::InvalidSignature)
                }
            }
        }

        let newly_validated;
        let adopted;
        {
            let mut chain = self.chain.write();
            let mut canvas = self.canvas.write();
            for block in blocks.iter().rev() {
                if !chain.contains(&block.hash()) {
                    chain.insert(block.clone());
                    canvas.note_mined(block);
                }
            }
            let head = canvas.head();
            let head_height = chain.height_of(&head).expect("the head is always stored; qed");
            let foreign_height = blocks[0].height();
            adopted = foreign_height > head_height || (foreign_height == head_height && foreign_head > head);
            newly_validated = if adopted {
                canvas.reconcile(&chain, foreign_head, &self.settings)?
            } else {
                Vec::new()
            };
            if adopted {
                cinfo!(SYNC, "Adopted chain with head {:x} at height {}", foreign_head, foreign_height);
                self.interrupt.store(true, Ordering::SeqCst);
            }
        }
        self.notify_validated(newly_validated);
        Ok(adopted)
    }

    /// The head and every block beneath it, newest first, for chain-sync
    /// replies.
    pub fn chain_snapshot(&self) -> (BlockHash, Vec<Block>) {
        let chain = self.chain.read();
        let head = self.canvas.read().head();
        let blocks = chain.blocks_to_genesis(&head);
        (head, blocks)
    }

    /// Ink this miner's identity can still spend.
    pub fn available_ink(&self) -> Ink {
        self.canvas.read().available_ink(self.keypair.public())
    }

    pub fn op_status(&self, signature: &OpSignature) -> Option<PoolStatus> {
        self.canvas.read().pools().status(signature)
    }

    /// The rendered SVG fragment of a validated add operation.
    pub fn rendered_svg(&self, signature: &OpSignature) -> Result<String, Error> {
        let canvas = self.canvas.read();
        let entry = canvas.pools().validated_entry(signature).ok_or(Error::InvalidShapeHash)?;
        let shape = entry.op.shape().ok_or(Error::InvalidShapeHash)?;
        Ok(shape.render_svg())
    }

    /// Signatures of the operations a stored block carries.
    pub fn shapes_in_block(&self, hash: &BlockHash) -> Result<Vec<OpSignature>, Error> {
        let chain = self.chain.read();
        if !chain.contains(hash) {
            return Err(Error::InvalidBlockHash)
        }
        Ok(chain
            .block(hash)
            .map(|block| block.ops().iter().map(SignedOperation::signature).collect())
            .unwrap_or_default())
    }

    pub fn children_of(&self, hash: &BlockHash) -> Result<Vec<BlockHash>, Error> {
        let chain = self.chain.read();
        if !chain.contains(hash) {
            return Err(Error::InvalidBlockHash)
        }
        Ok(chain.children_of(hash).to_vec())
    }

    /// A channel that fires with the containing block hash once the
    /// operation reaches the validated pool. Fires immediately when it
    /// already has.
    pub fn subscribe_validation(&self, signature: OpSignature) -> Receiver<BlockHash> {
        let (tx, rx) = unbounded();
        let mut watchers = self.watchers.lock();
        if let Some(entry) = self.canvas.read().pools().validated_entry(&signature) {
            let _ = tx.send(entry.block);
            return rx
        }
        watchers.entry(signature).or_insert_with(Vec::new).push(tx);
        rx
    }

    fn notify_validated(&self, newly_validated: Vec<(OpSignature, BlockHash)>) {
        if newly_validated.is_empty() {
            return
        }
        let mut watchers = self.watchers.lock();
        for (signature, block) in newly_validated {
            ctrace!(POOL, "Op {:x} validated in block {:x}", signature, block);
            if let Some(subscribers) = watchers.remove(&signature) {
                for subscriber in subscribers {
                    let _ = subscriber.send(block);
                }
            }
        }
    }

    fn notify_new_block(&self, block: &Block) {
        for listener in self.notify.read().iter() {
            if let Some(listener) = listener.upgrade() {
                listener.new_block(block);
            }
        }
    }

    fn notify_new_op(&self, op: &SignedOperation) {
        for listener in self.notify.read().iter() {
            if let Some(listener) = listener.upgrade() {
                listener.new_op(op);
            }
        }
    }
}

fn unix_time() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|elapsed| elapsed.as_secs()).unwrap_or(0)
}
