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

use ikey::{KeyPair, Public};
use itypes::{
    BlockHash, BlockNumber, Ink, OpAction, OpSignature, Operation, Shape, ShapeKind, SignedOperation, TRANSPARENT,
};
use primitives::H256;

use crate::block::{compute_block_hash, encode_ops, Block};
use crate::pow::meets_difficulty;
use crate::settings::CanvasSettings;

pub fn settings() -> CanvasSettings {
    CanvasSettings::new_test()
}

/// A deterministic key pair per seed, so tests are reproducible.
pub fn key_pair(seed: u8) -> KeyPair {
    assert_ne!(0, seed);
    KeyPair::from_private(H256::from([seed; 32])).expect("static test keys are valid")
}

pub fn add_op(pair: &KeyPair, svg: &str, validate_depth: u8) -> SignedOperation {
    let shape = Shape::new(ShapeKind::Path, svg.into(), TRANSPARENT.into(), "black".into(), *pair.public())
        .expect("test shapes are well-formed");
    let ink_cost = shape.ink_cost();
    let op = Operation {
        action: OpAction::Add(shape),
        ink_cost,
        validate_depth,
        timestamp: 1_544_000_000,
        requester: *pair.public(),
    };
    SignedOperation::new_signed(op, pair.private()).expect("test keys can sign")
}

pub fn remove_op(pair: &KeyPair, target: OpSignature, refund: Ink) -> SignedOperation {
    let op = Operation {
        action: OpAction::Remove {
            target,
        },
        ink_cost: refund,
        validate_depth: 0,
        timestamp: 1_544_000_001,
        requester: *pair.public(),
    };
    SignedOperation::new_signed(op, pair.private()).expect("test keys can sign")
}

/// Searches the nonce space until the block meets its difficulty class. Test
/// difficulties are low, so this finishes in a handful of attempts.
pub fn mine(
    settings: &CanvasSettings,
    height: BlockNumber,
    prev_hash: BlockHash,
    ops: Vec<SignedOperation>,
    miner: &Public,
) -> Block {
    let ops_raw = encode_ops(&ops);
    let difficulty = settings.required_difficulty(ops.is_empty());
    for nonce in 0u32.. {
        let hash = compute_block_hash(height, &prev_hash, &ops_raw, miner, nonce);
        if meets_difficulty(&hash, difficulty) {
            return Block::new(height, prev_hash, ops, *miner, nonce)
        }
    }
    unreachable!("the nonce space contains a winning hash for test difficulties")
}
