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

use std::collections::{HashMap, HashSet};

use ikey::Public;
use itypes::{BlockHash, Ink, OpSignature, SignedOperation};
use linked_hash_map::LinkedHashMap;

/// Which pool a signature currently sits in.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PoolStatus {
    /// Accepted locally, not yet in any block we know.
    Unmined,
    /// In a mined block, not yet deep enough below the head.
    Unvalidated,
    /// At or beyond its validate-depth below the head.
    Validated,
}

/// A mined pool entry: the operation and the block carrying it.
#[derive(Clone, Debug, PartialEq)]
pub struct PoolEntry {
    pub op: SignedOperation,
    pub block: BlockHash,
}

/// The three disjoint operation pools. A signature lives in at most one pool
/// at any time; every mutation below preserves that.
#[derive(Clone, Debug, PartialEq)]
pub struct OpPools {
    /// FIFO, so blocks package operations in arrival order.
    unmined: LinkedHashMap<OpSignature, SignedOperation>,
    unvalidated: HashMap<OpSignature, PoolEntry>,
    validated: HashMap<OpSignature, PoolEntry>,
}

impl OpPools {
    pub fn new() -> Self {
        OpPools {
            unmined: LinkedHashMap::new(),
            unvalidated: HashMap::new(),
            validated: HashMap::new(),
        }
    }

    pub fn status(&self, signature: &OpSignature) -> Option<PoolStatus> {
        if self.unmined.contains_key(signature) {
            Some(PoolStatus::Unmined)
        } else if self.unvalidated.contains_key(signature) {
            Some(PoolStatus::Unvalidated)
        } else if self.validated.contains_key(signature) {
            Some(PoolStatus::Validated)
        } else {
            None
        }
    }

    pub fn contains(&self, signature: &OpSignature) -> bool {
        self.status(signature).is_some()
    }

    pub fn get(&self, signature: &OpSignature) -> Option<&SignedOperation> {
        self.unmined
            .get(signature)
            .or_else(|| self.unvalidated.get(signature).map(|entry| &entry.op))
            .or_else(|| self.validated.get(signature).map(|entry| &entry.op))
    }

    pub fn validated_entry(&self, signature: &OpSignature) -> Option<&PoolEntry> {
        self.validated.get(signature)
    }

    /// The block carrying a mined operation.
    pub fn block_of(&self, signature: &OpSignature) -> Option<BlockHash> {
        self.unvalidated
            .get(signature)
            .or_else(|| self.validated.get(signature))
            .map(|entry| entry.block)
    }

    pub fn insert_unmined(&mut self, op: SignedOperation) {
        let signature = op.signature();
        debug_assert!(!self.unvalidated.contains_key(&signature));
        debug_assert!(!self.validated.contains_key(&signature));
        self.unmined.insert(signature, op);
    }

    /// Removes the signature from whichever pool holds it.
    pub fn remove(&mut self, signature: &OpSignature) -> Option<SignedOperation> {
        if let Some(op) = self.unmined.remove(signature) {
            return Some(op)
        }
        if let Some(entry) = self.unvalidated.remove(signature) {
            return Some(entry.op)
        }
        self.validated.remove(signature).map(|entry| entry.op)
    }

    /// Files an operation that sits in a block on the head's chain.
    pub fn file_mined(&mut self, op: SignedOperation, block: BlockHash, validated: bool) {
        let signature = op.signature();
        self.remove(&signature);
        let entry = PoolEntry {
            op,
            block,
        };
        if validated {
            self.validated.insert(signature, entry);
        } else {
            self.unvalidated.insert(signature, entry);
        }
    }

    /// Marks an unmined operation as sitting in a freshly seen block that is
    /// not (yet) on the head's chain.
    pub fn note_mined(&mut self, signature: &OpSignature, block: BlockHash) {
        if let Some(op) = self.unmined.remove(signature) {
            self.unvalidated.insert(*signature, PoolEntry {
                op,
                block,
            });
        }
    }

    /// Moves an unvalidated entry into the validated pool, returning its
    /// block.
    pub fn promote(&mut self, signature: &OpSignature) -> Option<BlockHash> {
        let entry = self.unvalidated.remove(signature)?;
        let block = entry.block;
        self.validated.insert(*signature, entry);
        Some(block)
    }

    pub fn unmined_is_empty(&self) -> bool {
        self.unmined.is_empty()
    }

    /// The unmined operations in arrival order, for block assembly.
    pub fn unmined_snapshot(&self) -> Vec<SignedOperation> {
        self.unmined.values().cloned().collect()
    }

    pub fn unvalidated_iter(&self) -> impl Iterator<Item = (&OpSignature, &PoolEntry)> {
        self.unvalidated.iter()
    }

    /// Every pooled operation, across all three pools.
    pub fn iter_ops(&self) -> impl Iterator<Item = &SignedOperation> {
        self.unmined
            .values()
            .chain(self.unvalidated.values().map(|entry| &entry.op))
            .chain(self.validated.values().map(|entry| &entry.op))
    }

    /// Add operations whose shape is still on the canvas: those not targeted
    /// by any pooled remove.
    pub fn active_add_ops(&self) -> Vec<&SignedOperation> {
        let removed: HashSet<OpSignature> = self.iter_ops().filter_map(|op| op.remove_target()).collect();
        self.iter_ops()
            .filter(|op| op.shape().is_some() && !removed.contains(&op.signature()))
            .collect()
    }

    /// Unmined add costs of `owner`, not yet reflected in the ledger.
    pub fn pending_debit(&self, owner: &Public) -> Ink {
        self.unmined
            .values()
            .filter(|op| op.requester == *owner && op.shape().is_some())
            .map(|op| op.ink_cost)
            .sum()
    }

    pub fn counts(&self) -> (usize, usize, usize) {
        (self.unmined.len(), self.unvalidated.len(), self.validated.len())
    }

    #[cfg(test)]
    pub fn assert_disjoint(&self) {
        let mut seen: HashSet<OpSignature> = HashSet::new();
        for signature in self
            .unmined
            .keys()
            .chain(self.unvalidated.keys())
            .chain(self.validated.keys())
        {
            assert!(seen.insert(*signature), "signature {:x} is in more than one pool", signature);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{add_op, key_pair, remove_op};

    #[test]
    fn lifecycle_keeps_pools_disjoint() {
        let pair = key_pair(1);
        let op = add_op(&pair, "M 1 1 L 4 4", 2);
        let signature = op.signature();
        let block = BlockHash::default();

        let mut pools = OpPools::new();
        pools.insert_unmined(op.clone());
        assert_eq!(Some(PoolStatus::Unmined), pools.status(&signature));
        pools.assert_disjoint();

        pools.file_mined(op.clone(), block, false);
        assert_eq!(Some(PoolStatus::Unvalidated), pools.status(&signature));
        assert_eq!(Some(block), pools.block_of(&signature));
        pools.assert_disjoint();

        assert_eq!(Some(block), pools.promote(&signature));
        assert_eq!(Some(PoolStatus::Validated), pools.status(&signature));
        pools.assert_disjoint();

        assert!(pools.remove(&signature).is_some());
        assert_eq!(None, pools.status(&signature));
    }

    #[test]
    fn snapshot_preserves_arrival_order() {
        let pair = key_pair(1);
        let first = add_op(&pair, "M 1 1 L 4 4", 0);
        let second = add_op(&pair, "M 6 6 L 9 9", 0);
        let mut pools = OpPools::new();
        pools.insert_unmined(first.clone());
        pools.insert_unmined(second.clone());
        assert_eq!(vec![first, second], pools.unmined_snapshot());
    }

    #[test]
    fn removed_shapes_are_not_active() {
        let pair = key_pair(1);
        let add = add_op(&pair, "M 1 1 L 4 4", 0);
        let remove = remove_op(&pair, add.signature(), add.ink_cost);
        let mut pools = OpPools::new();
        pools.insert_unmined(add.clone());
        assert_eq!(1, pools.active_add_ops().len());
        pools.insert_unmined(remove);
        assert!(pools.active_add_ops().is_empty());
    }

    #[test]
    fn pending_debit_counts_only_unmined_adds() {
        let pair = key_pair(1);
        let other = key_pair(2);
        let add = add_op(&pair, "M 1 1 L 4 4", 0);
        let cost = add.ink_cost;
        let mut pools = OpPools::new();
        pools.insert_unmined(add);
        pools.insert_unmined(add_op(&other, "M 6 6 L 9 9", 0));
        assert_eq!(cost, pools.pending_debit(pair.public()));
        let signature = pools.unmined_snapshot()[0].signature();
        pools.note_mined(&signature, BlockHash::default());
        assert_eq!(0, pools.pending_debit(pair.public()));
    }
}
