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

use itypes::SignedOperation;

use crate::block::Block;

/// Hooks the network layer registers to gossip fresh chain events. Each hook
/// fires exactly once per item, on first acceptance.
pub trait ChainNotify: Send + Sync {
    /// A block entered the chain store for the first time.
    fn new_block(&self, _block: &Block) {}

    /// A fresh operation entered the unmined pool.
    fn new_op(&self, _op: &SignedOperation) {}
}
