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

extern crate inkchain_crypto as icrypto;
extern crate inkchain_key as ikey;
#[macro_use]
extern crate inkchain_logger as ilogger;
extern crate inkchain_types as itypes;
#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;

mod block;
mod canvas;
mod chain;
mod chain_notify;
mod ledger;
mod miner;
mod pool;
mod pow;
mod settings;

#[cfg(test)]
mod test_helpers;

pub use crate::block::{compute_block_hash, encode_ops, Block};
pub use crate::canvas::CanvasState;
pub use crate::chain::{tree_route, ChainStore, TreeRoute};
pub use crate::chain_notify::ChainNotify;
pub use crate::ledger::InkLedger;
pub use crate::miner::Miner;
pub use crate::pool::{OpPools, PoolEntry, PoolStatus};
pub use crate::pow::{meets_difficulty, zero_suffix_length};
pub use crate::settings::CanvasSettings;
