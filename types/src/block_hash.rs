// Copyright 2019. Kodebox, Inc.
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

use std::fmt::{self, Display, Formatter, LowerHex};
use std::ops::Deref;

use primitives::H128;
use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};

/// The 128-bit digest of a block's canonical serialization.
#[derive(Clone, Copy, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Debug, Deserialize, Serialize)]
pub struct BlockHash(H128);

impl From<H128> for BlockHash {
    fn from(h: H128) -> Self {
        Self(h)
    }
}

impl Deref for BlockHash {
    type Target = H128;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for BlockHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        Display::fmt(&self.0, f)
    }
}

impl LowerHex for BlockHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        LowerHex::fmt(&self.0, f)
    }
}

impl Encodable for BlockHash {
    fn rlp_append(&self, s: &mut RlpStream) {
        self.0.rlp_append(s);
    }
}

impl Decodable for BlockHash {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        Ok(H128::decode(rlp)?.into())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    use super::*;

    #[test]
    fn hash_of_block_hash_and_h128_are_the_same() {
        let h128 = H128::random();
        let block_hash = BlockHash(h128);

        let mut hasher_of_h128 = DefaultHasher::new();
        let mut hasher_of_block_hash = DefaultHasher::new();

        h128.hash(&mut hasher_of_h128);
        block_hash.hash(&mut hasher_of_block_hash);

        assert_eq!(hasher_of_h128.finish(), hasher_of_block_hash.finish());
    }

    #[test]
    fn rlp_of_block_hash_can_be_decoded_to_h128() {
        let h128 = H128::random();
        let block_hash = BlockHash(h128);

        let encoded = rlp::encode(&block_hash);
        let decoded: H128 = rlp::decode(&encoded).unwrap();

        assert_eq!(h128, decoded);
    }

    #[test]
    fn ordering_matches_the_hex_rendering() {
        let smaller = BlockHash("0123456789abcdef0123456789abcdef".parse::<H128>().unwrap());
        let larger = BlockHash("1123456789abcdef0123456789abcdee".parse::<H128>().unwrap());
        assert!(smaller < larger);
        assert!(format!("{:x}", smaller) < format!("{:x}", larger));
    }
}
