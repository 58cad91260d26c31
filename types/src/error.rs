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

use std::fmt::{Display, Formatter, Result as FormatResult};

use crate::op_signature::OpSignature;
use crate::Ink;

/// Every failure an art node or peer can observe, as it crosses the wire.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", content = "content")]
pub enum Error {
    /// The peer or canvas at the given address is gone.
    Disconnected {
        address: String,
    },
    /// The requester cannot afford the operation.
    InsufficientInk {
        available: Ink,
    },
    InvalidShapeSvg(String),
    ShapeSvgTooLong {
        length: usize,
        limit: usize,
    },
    /// No known shape carries this hash.
    InvalidShapeHash,
    /// The shape belongs to a different identity.
    ShapeOwner,
    OutOfBounds,
    /// The shape touches one owned by someone else.
    ShapeOverlap {
        conflicting: OpSignature,
    },
    InvalidBlockHash,
    InvalidShapeFillStroke,
    InvalidSignature,
    InvalidToken,
    Validation(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        match self {
            Error::Disconnected {
                address,
            } => write!(f, "Disconnected from {}", address),
            Error::InsufficientInk {
                available,
            } => write!(f, "Insufficient ink, {} available", available),
            Error::InvalidShapeSvg(reason) => write!(f, "Invalid shape svg: {}", reason),
            Error::ShapeSvgTooLong {
                length,
                limit,
            } => write!(f, "Shape svg is {} bytes, the limit is {}", length, limit),
            Error::InvalidShapeHash => write!(f, "Invalid shape hash"),
            Error::ShapeOwner => write!(f, "The shape is owned by a different identity"),
            Error::OutOfBounds => write!(f, "The shape leaves the canvas"),
            Error::ShapeOverlap {
                conflicting,
            } => write!(f, "The shape overlaps {:x}", conflicting),
            Error::InvalidBlockHash => write!(f, "Invalid block hash"),
            Error::InvalidShapeFillStroke => write!(f, "Fill and stroke cannot both be transparent"),
            Error::InvalidSignature => write!(f, "Invalid signature"),
            Error::InvalidToken => write!(f, "Invalid token"),
            Error::Validation(reason) => write!(f, "Validation failed: {}", reason),
        }
    }
}

impl From<ikey::Error> for Error {
    fn from(_: ikey::Error) -> Self {
        Error::InvalidSignature
    }
}
