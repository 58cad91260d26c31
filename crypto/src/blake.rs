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

use blake2::digest::consts::{U16, U32};
use blake2::{Blake2b, Digest};
use primitives::{H128, H256};

/// BLAKE2b-128. The block digest.
pub fn blake128<T: AsRef<[u8]>>(s: T) -> H128 {
    H128::blake(s)
}

/// BLAKE2b-256. Message digests for signing.
pub fn blake256<T: AsRef<[u8]>>(s: T) -> H256 {
    H256::blake(s)
}

pub trait Blake {
    fn blake<T: AsRef<[u8]>>(s: T) -> Self;
}

macro_rules! implement_blake {
    ($self:ident, $size:ty) => {
        impl Blake for $self {
            fn blake<T: AsRef<[u8]>>(s: T) -> Self {
                let mut hasher = Blake2b::<$size>::new();
                hasher.update(s.as_ref());
                $self::from_slice(&hasher.finalize())
            }
        }
    };
}

implement_blake!(H128, U16);
implement_blake!(H256, U32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blake128_is_deterministic() {
        assert_eq!(blake128(b"hello"), blake128(b"hello"));
        assert_ne!(blake128(b"hello"), blake128(b"hello!"));
    }

    #[test]
    fn blake128_of_empty_input_is_not_zero() {
        assert_ne!(blake128([]), H128::zero());
    }

    #[test]
    fn blake256_differs_from_truncated_blake512_family() {
        // Different output lengths parameterize BLAKE2b, so a 128-bit digest
        // is not a prefix of the 256-bit one.
        let wide = blake256(b"hello");
        let narrow = blake128(b"hello");
        assert_ne!(&wide.as_bytes()[0..16], narrow.as_bytes());
    }
}
