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

use primitives::{H256, H512};
use secp256k1::ecdsa::Signature as SecpSignature;
use secp256k1::{Error as SecpError, Message as SecpMessage, PublicKey, SecretKey};

use crate::{Error, Message, Private, Public, SECP256K1};

pub const SIGNATURE_LENGTH: usize = 64;

/// ECDSA signature in its compact `r || s` form. Its value doubles as the
/// signed payload's identifier across the network.
pub type Signature = H512;

/// The `r` component.
pub fn signature_r(signature: &Signature) -> H256 {
    H256::from_slice(&signature.as_bytes()[0..32])
}

/// The `s` component.
pub fn signature_s(signature: &Signature) -> H256 {
    H256::from_slice(&signature.as_bytes()[32..64])
}

pub fn signature_from_rs(r: &H256, s: &H256) -> Signature {
    let mut signature = Signature::default();
    signature.as_bytes_mut()[0..32].copy_from_slice(r.as_bytes());
    signature.as_bytes_mut()[32..64].copy_from_slice(s.as_bytes());
    signature
}

pub fn sign_ecdsa(private: &Private, message: &Message) -> Result<Signature, Error> {
    let context = &SECP256K1;
    let sec = SecretKey::from_slice(private.as_bytes())?;
    let message = SecpMessage::from_digest_slice(message.as_bytes())?;
    let signature = context.sign_ecdsa(&message, &sec);
    Ok(Signature::from_slice(&signature.serialize_compact()))
}

pub fn verify_ecdsa(public: &Public, signature: &Signature, message: &Message) -> Result<bool, Error> {
    let context = &SECP256K1;
    let signature = SecpSignature::from_compact(signature.as_bytes())?;

    let mut serialized = [0u8; 65];
    serialized[0] = 4;
    serialized[1..65].copy_from_slice(public.as_bytes());
    let publ = PublicKey::from_slice(&serialized)?;

    let message = SecpMessage::from_digest_slice(message.as_bytes())?;
    match context.verify_ecdsa(&message, &signature, &publ) {
        Ok(()) => Ok(true),
        Err(SecpError::IncorrectSignature) => Ok(false),
        Err(x) => Err(Error::from(x)),
    }
}

#[cfg(test)]
mod tests {
    use super::{sign_ecdsa, verify_ecdsa};
    use crate::{Generator, Message, Random};

    #[test]
    fn sign_and_verify() {
        let pair = Random.generate().unwrap();
        let message = Message::random();
        let signature = sign_ecdsa(pair.private(), &message).unwrap();
        assert_eq!(Ok(true), verify_ecdsa(pair.public(), &signature, &message));
    }

    #[test]
    fn verify_rejects_other_message() {
        let pair = Random.generate().unwrap();
        let message = Message::random();
        let signature = sign_ecdsa(pair.private(), &message).unwrap();
        assert_eq!(Ok(false), verify_ecdsa(pair.public(), &signature, &Message::random()));
    }

    #[test]
    fn verify_rejects_other_signer() {
        let pair = Random.generate().unwrap();
        let other = Random.generate().unwrap();
        let message = Message::random();
        let signature = sign_ecdsa(pair.private(), &message).unwrap();
        assert_eq!(Ok(false), verify_ecdsa(other.public(), &signature, &message));
    }
}
