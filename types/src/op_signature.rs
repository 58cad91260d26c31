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

use primitives::H512;
use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};

/// An operation's ECDSA signature in compact form. Also the operation's
/// identifier everywhere: in the pools, on the wire, and as the "shape hash"
/// of the art-node API.
#[derive(Clone, Copy, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Debug, Deserialize, Serialize)]
pub struct OpSignature(H512);

impl From<H512> for OpSignature {
    fn from(h: H512) -> Self {
        Self(h)
    }
}

impl Deref for OpSignature {
    type Target = H512;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for OpSignature {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        Display::fmt(&self.0, f)
    }
}

impl LowerHex for OpSignature {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        LowerHex::fmt(&self.0, f)
    }
}

impl Encodable for OpSignature {
    fn rlp_append(&self, s: &mut RlpStream) {
        self.0.rlp_append(s);
    }
}

impl Decodable for OpSignature {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        Ok(H512::decode(rlp)?.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rlp_of_op_signature_can_be_decoded_to_h512() {
        let h512 = H512::random();
        let signature = OpSignature(h512);

        let encoded = rlp::encode(&signature);
        let decoded: H512 = rlp::decode(&encoded).unwrap();

        assert_eq!(h512, decoded);
    }
}
