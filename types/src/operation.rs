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

use std::ops::Deref;

use icrypto::blake256;
use ikey::{sign, verify, Error as KeyError, Message, Private, Public, Signature};
use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};

use crate::op_signature::OpSignature;
use crate::shape::Shape;
use crate::{Ink, ValidateDepth};

const ACTION_TAG_ADD: u8 = 0x01;
const ACTION_TAG_REMOVE: u8 = 0x02;

#[derive(Clone, Debug, PartialEq)]
pub enum OpAction {
    /// Draw a shape on the canvas.
    Add(Shape),
    /// Erase the shape identified by the signature of its add operation.
    Remove {
        target: OpSignature,
    },
}

/// The canonical operation body. Its RLP digest is what the requester signs.
#[derive(Clone, Debug, PartialEq)]
pub struct Operation {
    pub action: OpAction,
    /// Ink this operation moves: a debit for adds, a refund for removes.
    pub ink_cost: Ink,
    /// Blocks the containing block must sink below the head before the
    /// operation counts as validated.
    pub validate_depth: ValidateDepth,
    /// Seconds since the epoch at creation.
    pub timestamp: u64,
    pub requester: Public,
}

impl Operation {
    pub fn hash(&self) -> Message {
        blake256(rlp::encode(self))
    }

    pub fn shape(&self) -> Option<&Shape> {
        match &self.action {
            OpAction::Add(shape) => Some(shape),
            OpAction::Remove {
                ..
            } => None,
        }
    }

    pub fn remove_target(&self) -> Option<OpSignature> {
        match &self.action {
            OpAction::Add(_) => None,
            OpAction::Remove {
                target,
            } => Some(*target),
        }
    }
}

impl Encodable for Operation {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(6);
        match &self.action {
            OpAction::Add(shape) => {
                s.append(&ACTION_TAG_ADD);
                s.append(shape);
            }
            OpAction::Remove {
                target,
            } => {
                s.append(&ACTION_TAG_REMOVE);
                s.append(target);
            }
        }
        s.append(&self.ink_cost);
        s.append(&self.validate_depth);
        s.append(&self.timestamp);
        s.append(&self.requester);
    }
}

impl Decodable for Operation {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        let item_count = rlp.item_count()?;
        if item_count != 6 {
            return Err(DecoderError::RlpIncorrectListLen)
        }
        let action = match rlp.val_at::<u8>(0)? {
            ACTION_TAG_ADD => OpAction::Add(rlp.val_at(1)?),
            ACTION_TAG_REMOVE => OpAction::Remove {
                target: rlp.val_at(1)?,
            },
            _ => return Err(DecoderError::Custom("Unexpected action tag")),
        };
        Ok(Operation {
            action,
            ink_cost: rlp.val_at(2)?,
            validate_depth: rlp.val_at(3)?,
            timestamp: rlp.val_at(4)?,
            requester: rlp.val_at(5)?,
        })
    }
}

/// An operation with its requester's signature attached. The signature is the
/// operation's identity.
#[derive(Clone, Debug, PartialEq)]
pub struct SignedOperation {
    op: Operation,
    signature: Signature,
}

impl SignedOperation {
    /// Signs the canonical body with the requester's private key.
    pub fn new_signed(op: Operation, private: &Private) -> Result<Self, KeyError> {
        let signature = sign(private, &op.hash())?;
        Ok(SignedOperation {
            op,
            signature,
        })
    }

    /// Wraps an already-signed operation from the wire. Callers verify.
    pub fn new(op: Operation, signature: Signature) -> Self {
        SignedOperation {
            op,
            signature,
        }
    }

    pub fn signature(&self) -> OpSignature {
        OpSignature::from(self.signature)
    }

    /// Recomputes the body digest and checks the signature against the
    /// requester's identity.
    pub fn verify(&self) -> Result<bool, KeyError> {
        verify(&self.op.requester, &self.signature, &self.op.hash())
    }
}

impl Deref for SignedOperation {
    type Target = Operation;

    fn deref(&self) -> &Self::Target {
        &self.op
    }
}

impl Encodable for SignedOperation {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(2);
        s.append(&self.op);
        s.append(&self.signature);
    }
}

impl Decodable for SignedOperation {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        let item_count = rlp.item_count()?;
        if item_count != 2 {
            return Err(DecoderError::RlpIncorrectListLen)
        }
        Ok(SignedOperation {
            op: rlp.val_at(0)?,
            signature: rlp.val_at(1)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use ikey::{Generator, Random};

    use super::*;
    use crate::shape::{ShapeKind, TRANSPARENT};

    fn add_op(requester: Public) -> Operation {
        let shape = Shape::new(
            ShapeKind::Path,
            "M 5 5 h 5 v 5 h -5 Z".into(),
            "red".into(),
            TRANSPARENT.into(),
            requester,
        )
        .unwrap();
        let ink_cost = shape.ink_cost();
        Operation {
            action: OpAction::Add(shape),
            ink_cost,
            validate_depth: 3,
            timestamp: 1_544_000_000,
            requester,
        }
    }

    #[test]
    fn signed_operation_verifies() {
        let pair = Random.generate().unwrap();
        let op = add_op(*pair.public());
        let signed = SignedOperation::new_signed(op, pair.private()).unwrap();
        assert_eq!(Ok(true), signed.verify());
    }

    #[test]
    fn tampering_breaks_verification() {
        let pair = Random.generate().unwrap();
        let signed = SignedOperation::new_signed(add_op(*pair.public()), pair.private()).unwrap();
        let mut tampered = (*signed).clone();
        tampered.ink_cost += 1;
        let forged = SignedOperation::new(tampered, *signed.signature());
        assert_eq!(Ok(false), forged.verify());
    }

    #[test]
    fn rlp_round_trip_preserves_the_signature() {
        let pair = Random.generate().unwrap();
        let signed = SignedOperation::new_signed(add_op(*pair.public()), pair.private()).unwrap();
        let decoded: SignedOperation = rlp::decode(&rlp::encode(&signed)).unwrap();
        assert_eq!(signed, decoded);
        assert_eq!(signed.signature(), decoded.signature());
        assert_eq!(Ok(true), decoded.verify());
    }

    #[test]
    fn remove_round_trips() {
        let pair = Random.generate().unwrap();
        let op = Operation {
            action: OpAction::Remove {
                target: OpSignature::from(primitives::H512::random()),
            },
            ink_cost: 30,
            validate_depth: 1,
            timestamp: 1_544_000_001,
            requester: *pair.public(),
        };
        let signed = SignedOperation::new_signed(op, pair.private()).unwrap();
        let decoded: SignedOperation = rlp::decode(&rlp::encode(&signed)).unwrap();
        assert_eq!(signed, decoded);
    }
}
