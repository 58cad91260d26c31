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

use icrypto::blake128;
use ikey::Public;
use itypes::{BlockHash, BlockNumber, Ink, SignedOperation};
use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};

use crate::pow::meets_difficulty;
use crate::settings::CanvasSettings;

/// A mined block. The hash is the 128-bit digest of the canonical five-item
/// RLP list `(height, prev_hash, ops, miner, nonce)`, computed once at
/// construction; blocks never change after that.
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    height: BlockNumber,
    prev_hash: BlockHash,
    ops: Vec<SignedOperation>,
    miner: Public,
    nonce: u32,
    hash: BlockHash,
}

/// Pre-serializes an operation list so a nonce search only re-streams the
/// five outer items per attempt.
pub fn encode_ops(ops: &[SignedOperation]) -> Vec<u8> {
    rlp::encode_list::<SignedOperation, _>(ops).to_vec()
}

/// The canonical digest for the given parts. `ops_raw` is the RLP list from
/// [`encode_ops`].
pub fn compute_block_hash(
    height: BlockNumber,
    prev_hash: &BlockHash,
    ops_raw: &[u8],
    miner: &Public,
    nonce: u32,
) -> BlockHash {
    let mut s = RlpStream::new_list(5);
    s.append(&height);
    s.append(prev_hash);
    s.append_raw(ops_raw, 1);
    s.append(miner);
    s.append(&nonce);
    blake128(s.out()).into()
}

impl Block {
    pub fn new(
        height: BlockNumber,
        prev_hash: BlockHash,
        ops: Vec<SignedOperation>,
        miner: Public,
        nonce: u32,
    ) -> Self {
        let hash = compute_block_hash(height, &prev_hash, &encode_ops(&ops), &miner, nonce);
        Block {
            height,
            prev_hash,
            ops,
            miner,
            nonce,
            hash,
        }
    }

    pub fn height(&self) -> BlockNumber {
        self.height
    }

    pub fn prev_hash(&self) -> &BlockHash {
        &self.prev_hash
    }

    pub fn ops(&self) -> &[SignedOperation] {
        &self.ops
    }

    pub fn miner(&self) -> &Public {
        &self.miner
    }

    pub fn nonce(&self) -> u32 {
        self.nonce
    }

    pub fn hash(&self) -> BlockHash {
        self.hash
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn required_difficulty(&self, settings: &CanvasSettings) -> u8 {
        settings.required_difficulty(self.is_empty())
    }

    pub fn verify_pow(&self, settings: &CanvasSettings) -> bool {
        meets_difficulty(&self.hash, self.required_difficulty(settings))
    }

    /// The ink the miner earns for this block.
    pub fn reward(&self, settings: &CanvasSettings) -> Ink {
        settings.block_reward(self.is_empty())
    }
}

impl Encodable for Block {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(5);
        s.append(&self.height);
        s.append(&self.prev_hash);
        s.append_list(&self.ops);
        s.append(&self.miner);
        s.append(&self.nonce);
    }
}

impl Decodable for Block {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        let item_count = rlp.item_count()?;
        if item_count != 5 {
            return Err(DecoderError::RlpIncorrectListLen)
        }
        Ok(Block::new(rlp.val_at(0)?, rlp.val_at(1)?, rlp.list_at(2)?, rlp.val_at(3)?, rlp.val_at(4)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{add_op, key_pair, mine, settings};

    #[test]
    fn decoding_recomputes_the_same_hash() {
        let pair = key_pair(1);
        let block = Block::new(1, Default::default(), vec![add_op(&pair, "M 5 5 h 5 v 5 h -5 Z", 1)], *pair.public(), 42);
        let decoded: Block = rlp::decode(&rlp::encode(&block)).unwrap();
        assert_eq!(block, decoded);
        assert_eq!(block.hash(), decoded.hash());
    }

    #[test]
    fn nonce_changes_the_hash() {
        let pair = key_pair(2);
        let a = Block::new(1, Default::default(), vec![], *pair.public(), 0);
        let b = Block::new(1, Default::default(), vec![], *pair.public(), 1);
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn streaming_helper_matches_the_block_hash() {
        let pair = key_pair(3);
        let ops = vec![add_op(&pair, "M 1 1 L 4 4", 0)];
        let ops_raw = encode_ops(&ops);
        let streamed = compute_block_hash(7, &Default::default(), &ops_raw, pair.public(), 9);
        let block = Block::new(7, Default::default(), ops, *pair.public(), 9);
        assert_eq!(streamed, block.hash());
    }

    #[test]
    fn mined_blocks_meet_their_difficulty_class() {
        let settings = settings();
        let pair = key_pair(4);
        let empty = mine(&settings, 1, Default::default(), vec![], pair.public());
        assert!(empty.verify_pow(&settings));
        assert_eq!(settings.ink_per_no_op_block, empty.reward(&settings));

        let full = mine(&settings, 1, Default::default(), vec![add_op(&pair, "M 1 1 L 4 4", 0)], pair.public());
        assert!(full.verify_pow(&settings));
        assert_eq!(settings.ink_per_op_block, full.reward(&settings));
    }
}
