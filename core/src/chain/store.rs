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

use std::collections::HashMap;

use itypes::{BlockHash, BlockNumber};

use crate::block::Block;

/// Every block this miner has ever accepted, keyed by hash, with the child
/// sets that make forks navigable. Blocks are never deleted; abandoned
/// branches stay to serve late arrivals. The genesis hash is a well-known
/// constant with no block body, at height zero.
pub struct ChainStore {
    genesis: BlockHash,
    blocks: HashMap<BlockHash, Block>,
    children: HashMap<BlockHash, Vec<BlockHash>>,
}

impl ChainStore {
    pub fn new(genesis: BlockHash) -> Self {
        ChainStore {
            genesis,
            blocks: HashMap::new(),
            children: HashMap::new(),
        }
    }

    pub fn genesis(&self) -> BlockHash {
        self.genesis
    }

    pub fn contains(&self, hash: &BlockHash) -> bool {
        *hash == self.genesis || self.blocks.contains_key(hash)
    }

    pub fn block(&self, hash: &BlockHash) -> Option<&Block> {
        self.blocks.get(hash)
    }

    pub fn height_of(&self, hash: &BlockHash) -> Option<BlockNumber> {
        if *hash == self.genesis {
            return Some(0)
        }
        self.blocks.get(hash).map(Block::height)
    }

    pub fn parent_of(&self, hash: &BlockHash) -> Option<BlockHash> {
        self.blocks.get(hash).map(|block| *block.prev_hash())
    }

    pub fn children_of(&self, hash: &BlockHash) -> &[BlockHash] {
        self.children.get(hash).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Stores a block whose parent is already known. Returns false when the
    /// block was already present.
    pub fn insert(&mut self, block: Block) -> bool {
        let hash = block.hash();
        if self.blocks.contains_key(&hash) {
            return false
        }
        debug_assert!(self.contains(block.prev_hash()));
        self.children.entry(*block.prev_hash()).or_insert_with(Vec::new).push(hash);
        self.blocks.insert(hash, block);
        true
    }

    /// How far `hash` sits below `head`, when it lies on head's chain.
    pub fn depth_below(&self, head: &BlockHash, hash: &BlockHash) -> Option<BlockNumber> {
        let target_height = self.height_of(hash)?;
        let head_height = self.height_of(head)?;
        if target_height > head_height {
            return None
        }
        let mut cursor = *head;
        let mut height = head_height;
        while height > target_height {
            cursor = self.parent_of(&cursor)?;
            height -= 1;
        }
        if cursor == *hash {
            Some(head_height - target_height)
        } else {
            None
        }
    }

    pub fn is_on_chain(&self, hash: &BlockHash, head: &BlockHash) -> bool {
        self.depth_below(head, hash).is_some()
    }

    /// The blocks from `head` down to genesis, newest first.
    pub fn blocks_to_genesis(&self, head: &BlockHash) -> Vec<Block> {
        let mut out = Vec::new();
        let mut cursor = *head;
        while let Some(block) = self.blocks.get(&cursor) {
            cursor = *block.prev_hash();
            out.push(block.clone());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{key_pair, mine, settings};

    #[test]
    fn genesis_is_known_at_height_zero() {
        let genesis = BlockHash::default();
        let store = ChainStore::new(genesis);
        assert!(store.contains(&genesis));
        assert_eq!(Some(0), store.height_of(&genesis));
        assert_eq!(None, store.parent_of(&genesis));
    }

    #[test]
    fn children_track_forks() {
        let settings = settings();
        let pair = key_pair(1);
        let genesis = BlockHash::default();
        let mut store = ChainStore::new(genesis);

        let a1 = mine(&settings, 1, genesis, vec![], pair.public());
        let b1 = mine(&settings, 1, genesis, vec![], key_pair(2).public());
        assert!(store.insert(a1.clone()));
        assert!(store.insert(b1.clone()));
        assert!(!store.insert(a1.clone()));

        let children = store.children_of(&genesis);
        assert_eq!(2, children.len());
        assert!(children.contains(&a1.hash()));
        assert!(children.contains(&b1.hash()));
    }

    #[test]
    fn depth_below_follows_one_branch_only() {
        let settings = settings();
        let pair = key_pair(1);
        let genesis = BlockHash::default();
        let mut store = ChainStore::new(genesis);

        let a1 = mine(&settings, 1, genesis, vec![], pair.public());
        let a2 = mine(&settings, 2, a1.hash(), vec![], pair.public());
        let b1 = mine(&settings, 1, genesis, vec![], key_pair(2).public());
        store.insert(a1.clone());
        store.insert(a2.clone());
        store.insert(b1.clone());

        assert_eq!(Some(0), store.depth_below(&a2.hash(), &a2.hash()));
        assert_eq!(Some(1), store.depth_below(&a2.hash(), &a1.hash()));
        assert_eq!(Some(2), store.depth_below(&a2.hash(), &genesis));
        assert_eq!(None, store.depth_below(&a2.hash(), &b1.hash()));
        assert!(store.is_on_chain(&a1.hash(), &a2.hash()));
        assert!(!store.is_on_chain(&b1.hash(), &a2.hash()));
    }

    #[test]
    fn blocks_to_genesis_walks_newest_first() {
        let settings = settings();
        let pair = key_pair(1);
        let genesis = BlockHash::default();
        let mut store = ChainStore::new(genesis);

        let a1 = mine(&settings, 1, genesis, vec![], pair.public());
        let a2 = mine(&settings, 2, a1.hash(), vec![], pair.public());
        store.insert(a1.clone());
        store.insert(a2.clone());

        let walk = store.blocks_to_genesis(&a2.hash());
        assert_eq!(vec![a2, a1], walk);
    }
}
