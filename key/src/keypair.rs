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

use std::fmt;

use rustc_hex::ToHex;
use secp256k1::{PublicKey, SecretKey};

use crate::{Error, Private, Public, SECP256K1};

/// secp256k1 key pair. The public half is the node's identity on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyPair {
    private: Private,
    public: Public,
}

impl fmt::Display for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        writeln!(f, "private: {}", self.private.as_bytes().to_hex::<String>())?;
        write!(f, "public:  {}", self.public.as_bytes().to_hex::<String>())
    }
}

impl KeyPair {
    /// Create a pair from the private key.
    pub fn from_private(private: Private) -> Result<KeyPair, Error> {
        let context = &SECP256K1;
        let sec = SecretKey::from_slice(private.as_bytes())?;
        let publ = PublicKey::from_secret_key(context, &sec);
        let serialized = publ.serialize_uncompressed();

        let mut public = Public::default();
        public.as_bytes_mut().copy_from_slice(&serialized[1..65]);

        Ok(KeyPair {
            private,
            public,
        })
    }

    pub fn from_keypair(sec: SecretKey, publ: PublicKey) -> Self {
        let serialized = publ.serialize_uncompressed();
        let private = Private::from_slice(&sec.secret_bytes());
        let mut public = Public::default();
        public.as_bytes_mut().copy_from_slice(&serialized[1..65]);

        KeyPair {
            private,
            public,
        }
    }

    pub fn private(&self) -> &Private {
        &self.private
    }

    pub fn public(&self) -> &Public {
        &self.public
    }
}
