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

use rand::rngs::OsRng;

use crate::{Error, Generator, KeyPair, SECP256K1};

pub struct Random;

impl Generator for Random {
    fn generate(&mut self) -> Result<KeyPair, Error> {
        OsRng.generate()
    }
}

impl Generator for OsRng {
    fn generate(&mut self) -> Result<KeyPair, Error> {
        let (sec, publ) = SECP256K1.generate_keypair(self);
        Ok(KeyPair::from_keypair(sec, publ))
    }
}
