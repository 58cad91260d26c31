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

use fixed_hash::construct_fixed_hash;
use impl_rlp::impl_fixed_hash_rlp;
use impl_serde::impl_fixed_hash_serde;

construct_fixed_hash! {
    /// 128-bit hash. The block digest width.
    pub struct H128(16);
}

construct_fixed_hash! {
    /// 256-bit hash. Message digests, nonces and tokens.
    pub struct H256(32);
}

construct_fixed_hash! {
    /// 512-bit hash. Public keys and compact ECDSA signatures.
    pub struct H512(64);
}

impl_fixed_hash_rlp!(H128, 16);
impl_fixed_hash_rlp!(H256, 32);
impl_fixed_hash_rlp!(H512, 64);

impl_fixed_hash_serde!(H128, 16);
impl_fixed_hash_serde!(H256, 32);
impl_fixed_hash_serde!(H512, 64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rlp_of_h128_round_trips() {
        let hash = H128::random();
        let encoded = rlp::encode(&hash);
        let decoded: H128 = rlp::decode(&encoded).unwrap();
        assert_eq!(hash, decoded);
    }

    #[test]
    fn hex_parsing_is_the_inverse_of_lower_hex() {
        let hash = H512::random();
        let hex = format!("{:x}", hash);
        assert_eq!(hex.len(), 128);
        assert_eq!(hash, hex.parse().unwrap());
    }
}
