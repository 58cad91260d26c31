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
extern crate inkchain_geometry as igeometry;
extern crate inkchain_key as ikey;
#[macro_use]
extern crate serde_derive;

mod block_hash;
mod error;
mod op_signature;
mod operation;
mod shape;

pub use crate::block_hash::BlockHash;
pub use crate::error::Error;
pub use crate::op_signature::OpSignature;
pub use crate::operation::{OpAction, Operation, SignedOperation};
pub use crate::shape::{Shape, ShapeKind, MAX_SVG_LENGTH, TRANSPARENT};

pub type BlockNumber = u32;
pub type Ink = u64;
pub type ValidateDepth = u8;
