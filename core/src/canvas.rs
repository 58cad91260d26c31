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

use ikey::Public;
use itypes::{BlockHash, BlockNumber, Error, Ink, OpAction, OpSignature, SignedOperation};

use crate::block::Block;
use crate::chain::{tree_route, ChainStore};
use crate::ledger::InkLedger;
use crate::pool::OpPools;
use crate::settings::CanvasSettings;

/// The state a head switch must update as one unit: the head pointer, the
/// three operation pools and the ink ledger. Everything here lives behind a
/// single writer lock in the miner; observers never see it half-reconciled.
#[derive(Clone, Debug, PartialEq)]
pub struct CanvasState {
    head: BlockHash,
    pools: OpPools,
    ledger: InkLedger,
}

impl CanvasState {
    pub fn new(genesis: BlockHash) -> Self {
        CanvasState {
            head: genesis,
            pools: OpPools::new(),
            ledger: InkLedger::new(),
        }
    }

    pub fn head(&self) -> BlockHash {
        self.head
    }

    pub fn pools(&self) -> &OpPools {
        &self.pools
    }

    pub fn ledger(&self) -> &InkLedger {
        &self.ledger
    }

    /// Ink the identity can still spend: its settled balance minus the add
    /// costs waiting in the unmined pool.
    pub fn available_ink(&self, who: &Public) -> Ink {
        self.ledger.balance(who).saturating_sub(self.pools.pending_debit(who))
    }

    pub fn insert_unmined(&mut self, op: SignedOperation) {
        self.pools.insert_unmined(op);
    }

    /// Records that a freshly stored block carries these operations, whether
    /// or not it is on the head's chain yet.
    pub fn note_mined(&mut self, block: &Block) {
        let hash = block.hash();
        for op in block.ops() {
            self.pools.note_mined(&op.signature(), hash);
        }
    }

    /// Admission control for a single operation, shared by the gateway and
    /// the peer paths. The caller has already rejected duplicates.
    pub fn validate_op(&self, op: &SignedOperation, settings: &CanvasSettings) -> Result<(), Error> {
        if !op.verify().unwrap_or(false) {
            return Err(Error::InvalidSignature)
        }
        match &op.action {
            OpAction::Add(shape) => {
                if *shape.owner() != op.requester {
                    return Err(Error::ShapeOwner)
                }
                if !shape.is_inside(settings.x_max, settings.y_max) {
                    return Err(Error::OutOfBounds)
                }
                if op.ink_cost != shape.ink_cost() {
                    return Err(Error::Validation("declared ink cost does not match the shape".into()))
                }
                let available = self.available_ink(&op.requester);
                if available < op.ink_cost {
                    return Err(Error::InsufficientInk {
                        available,
                    })
                }
                for other in self.pools.active_add_ops() {
                    let other_shape = other.shape().expect("active add ops carry shapes");
                    if *other_shape.owner() == op.requester {
                        continue
                    }
                    if shape.overlaps(other_shape) {
                        return Err(Error::ShapeOverlap {
                            conflicting: other.signature(),
                        })
                    }
                }
                Ok(())
            }
            OpAction::Remove {
                target,
            } => {
                let target_op = self.pools.get(target).ok_or(Error::InvalidShapeHash)?;
                let shape = target_op.shape().ok_or(Error::InvalidShapeHash)?;
                if *shape.owner() != op.requester {
                    return Err(Error::ShapeOwner)
                }
                if self.pools.iter_ops().any(|pooled| pooled.remove_target() == Some(*target)) {
                    return Err(Error::InvalidShapeHash)
                }
                if op.ink_cost != shape.ink_cost() {
                    return Err(Error::Validation("declared refund does not match the shape".into()))
                }
                Ok(())
            }
        }
    }

    /// Moves the canvas from the current head to `new_head`: reverts the
    /// abandoned branch, applies the new one, then promotes every operation
    /// that has sunk to its validate-depth. Rewards and op ink effects are
    /// exact inverses on the two passes, so switching back restores every
    /// pool and balance.
    ///
    /// Returns the operations that became validated, with their blocks.
    pub fn reconcile(
        &mut self,
        store: &ChainStore,
        new_head: BlockHash,
        settings: &CanvasSettings,
    ) -> Result<Vec<(OpSignature, BlockHash)>, Error> {
        let mut newly_validated = Vec::new();
        if new_head == self.head {
            return Ok(newly_validated)
        }
        let head_height = store.height_of(&new_head).ok_or(Error::InvalidBlockHash)?;
        let route = tree_route(store, self.head, new_head).ok_or(Error::InvalidBlockHash)?;

        let new_branch_ops: std::collections::HashSet<OpSignature> = route
            .enacted
            .iter()
            .filter_map(|hash| store.block(hash))
            .flat_map(|block| block.ops().iter().map(SignedOperation::signature))
            .collect();

        // Revert the abandoned branch, newest block first.
        for hash in &route.retracted {
            let block = store.block(hash).expect("tree_route only returns stored blocks; qed");
            self.ledger.debit(block.miner(), block.reward(settings));
            for op in block.ops() {
                let signature = op.signature();
                self.reverse_ink(op);
                self.pools.remove(&signature);
                if !new_branch_ops.contains(&signature) {
                    // Back to the unmined pool so the miner may try again.
                    self.pools.insert_unmined(op.clone());
                }
            }
        }

        // Apply the new branch, oldest block first.
        for hash in &route.enacted {
            let block = store.block(hash).expect("tree_route only returns stored blocks; qed");
            self.ledger.credit(block.miner(), block.reward(settings));
            let depth = head_height - block.height();
            for op in block.ops() {
                self.apply_ink(op);
                let validated = depth >= BlockNumber::from(op.validate_depth);
                self.pools.file_mined(op.clone(), *hash, validated);
                if validated {
                    newly_validated.push((op.signature(), *hash));
                }
            }
        }

        self.head = new_head;

        // Promote what the new head has buried deep enough.
        let ready: Vec<OpSignature> = self
            .pools
            .unvalidated_iter()
            .filter_map(|(signature, entry)| {
                let depth = store.depth_below(&new_head, &entry.block)?;
                if depth >= BlockNumber::from(entry.op.validate_depth) {
                    Some(*signature)
                } else {
                    None
                }
            })
            .collect();
        for signature in ready {
            if let Some(block) = self.pools.promote(&signature) {
                newly_validated.push((signature, block));
            }
        }

        debug_assert!(self.ledger.is_settled(), "ink balances must settle non-negative after reconciliation");
        Ok(newly_validated)
    }

    fn apply_ink(&mut self, op: &SignedOperation) {
        match &op.action {
            OpAction::Add(_) => self.ledger.debit(&op.requester, op.ink_cost),
            OpAction::Remove {
                ..
            } => self.ledger.credit(&op.requester, op.ink_cost),
        }
    }

    fn reverse_ink(&mut self, op: &SignedOperation) {
        match &op.action {
            OpAction::Add(_) => self.ledger.credit(&op.requester, op.ink_cost),
            OpAction::Remove {
                ..
            } => self.ledger.debit(&op.requester, op.ink_cost),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{add_op, key_pair, mine, settings};

    fn setup() -> (CanvasSettings, ChainStore, CanvasState) {
        let settings = settings();
        let genesis = settings.genesis_block_hash;
        (settings, ChainStore::new(genesis), CanvasState::new(genesis))
    }

    #[test]
    fn fast_forward_pays_the_miner() {
        let (settings, mut store, mut canvas) = setup();
        let pair = key_pair(1);
        let block = mine(&settings, 1, store.genesis(), vec![], pair.public());
        store.insert(block.clone());

        canvas.reconcile(&store, block.hash(), &settings).unwrap();
        assert_eq!(block.hash(), canvas.head());
        assert_eq!(settings.ink_per_no_op_block, canvas.ledger().balance(pair.public()));
    }

    #[test]
    fn ops_classify_by_depth_and_promote_later() {
        let (settings, mut store, mut canvas) = setup();
        let pair = key_pair(1);

        // Fund the account first.
        let fund = mine(&settings, 1, store.genesis(), vec![], pair.public());
        store.insert(fund.clone());
        canvas.reconcile(&store, fund.hash(), &settings).unwrap();

        let op = add_op(&pair, "M 1 1 L 4 4", 1);
        let signature = op.signature();
        let cost = op.ink_cost;
        canvas.insert_unmined(op.clone());

        let b1 = mine(&settings, 2, fund.hash(), vec![op], pair.public());
        store.insert(b1.clone());
        let validated = canvas.reconcile(&store, b1.hash(), &settings).unwrap();
        assert!(validated.is_empty());
        assert_eq!(Some(crate::pool::PoolStatus::Unvalidated), canvas.pools().status(&signature));
        // The add was debited as soon as its block was enacted.
        assert_eq!(
            settings.ink_per_no_op_block + settings.ink_per_op_block - cost,
            canvas.ledger().balance(pair.public())
        );

        let b2 = mine(&settings, 3, b1.hash(), vec![], pair.public());
        store.insert(b2.clone());
        let validated = canvas.reconcile(&store, b2.hash(), &settings).unwrap();
        assert_eq!(vec![(signature, b1.hash())], validated);
        assert_eq!(Some(crate::pool::PoolStatus::Validated), canvas.pools().status(&signature));
        canvas.pools().assert_disjoint();
    }

    #[test]
    fn depth_zero_ops_validate_immediately() {
        let (settings, mut store, mut canvas) = setup();
        let pair = key_pair(1);
        let fund = mine(&settings, 1, store.genesis(), vec![], pair.public());
        store.insert(fund.clone());
        canvas.reconcile(&store, fund.hash(), &settings).unwrap();

        let op = add_op(&pair, "M 1 1 L 4 4", 0);
        let signature = op.signature();
        let block = mine(&settings, 2, fund.hash(), vec![op], pair.public());
        store.insert(block.clone());
        let validated = canvas.reconcile(&store, block.hash(), &settings).unwrap();
        assert_eq!(vec![(signature, block.hash())], validated);
    }

    #[test]
    fn branch_switch_round_trip_restores_everything() {
        let (settings, mut store, mut canvas) = setup();
        let miner_a = key_pair(1);
        let miner_b = key_pair(2);

        // Fund A, then let A draw on branch A while branch B grows longer.
        let fund = mine(&settings, 1, store.genesis(), vec![], miner_a.public());
        store.insert(fund.clone());
        canvas.reconcile(&store, fund.hash(), &settings).unwrap();

        let op = add_op(&miner_a, "M 1 1 L 4 4", 1);
        canvas.insert_unmined(op.clone());
        let a2 = mine(&settings, 2, fund.hash(), vec![op.clone()], miner_a.public());
        store.insert(a2.clone());
        canvas.reconcile(&store, a2.hash(), &settings).unwrap();

        let snapshot = canvas.clone();

        let b2 = mine(&settings, 2, fund.hash(), vec![], miner_b.public());
        let b3 = mine(&settings, 3, b2.hash(), vec![], miner_b.public());
        store.insert(b2.clone());
        store.insert(b3.clone());

        canvas.reconcile(&store, b3.hash(), &settings).unwrap();
        // The op fell off the canonical chain and is minable again.
        assert_eq!(Some(crate::pool::PoolStatus::Unmined), canvas.pools().status(&op.signature()));
        assert!(canvas.ledger().is_settled());

        canvas.reconcile(&store, a2.hash(), &settings).unwrap();
        assert_eq!(snapshot, canvas);
    }

    #[test]
    fn insufficient_ink_reports_the_available_amount() {
        let (settings, _store, canvas) = setup();
        let pair = key_pair(1);
        let op = add_op(&pair, "M 1 1 L 4 4", 1);
        let result = canvas.validate_op(&op, &settings);
        assert_eq!(
            Err(Error::InsufficientInk {
                available: 0,
            }),
            result
        );
    }

    #[test]
    fn cross_owner_overlap_is_rejected_with_the_conflicting_signature() {
        let (settings, mut store, mut canvas) = setup();
        let alice = key_pair(1);
        let bob = key_pair(2);

        let fund_a = mine(&settings, 1, store.genesis(), vec![], alice.public());
        store.insert(fund_a.clone());
        let fund_b = mine(&settings, 2, fund_a.hash(), vec![], bob.public());
        store.insert(fund_b.clone());
        canvas.reconcile(&store, fund_b.hash(), &settings).unwrap();

        let first = add_op(&alice, "M 1 5 L 9 5", 1);
        canvas.validate_op(&first, &settings).unwrap();
        canvas.insert_unmined(first.clone());

        // Alice may overlap herself.
        let own = add_op(&alice, "M 5 1 L 5 9", 1);
        assert!(canvas.validate_op(&own, &settings).is_ok());

        let crossing = add_op(&bob, "M 5 1 L 5 9", 1);
        assert_eq!(
            Err(Error::ShapeOverlap {
                conflicting: first.signature(),
            }),
            canvas.validate_op(&crossing, &settings)
        );

        let clear = add_op(&bob, "M 20 20 L 28 20", 1);
        assert!(canvas.validate_op(&clear, &settings).is_ok());
    }
}
