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

#[macro_use]
extern crate lazy_static;

mod ecdsa;
mod error;
mod keypair;
mod random;

pub use crate::ecdsa::{
    signature_from_rs, signature_r, signature_s, sign_ecdsa as sign, verify_ecdsa as verify, Signature,
    SIGNATURE_LENGTH,
};
pub use crate::error::Error;
pub use crate::keypair::KeyPair;
pub use crate::random::Random;

use primitives::{H256, H512};

/// 32 bytes long signable message.
pub type Message = H256;

pub type Private = H256;
pub type Public = H512;

lazy_static! {
    pub static ref SECP256K1: secp256k1::Secp256k1<secp256k1::All> = secp256k1::Secp256k1::new();
}

/// Generates new keypairs.
pub trait Generator {
    fn generate(&mut self) -> Result<KeyPair, Error>;
}
