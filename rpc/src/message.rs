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

use icore::CanvasSettings;
use itypes::{BlockHash, Error, Ink, OpSignature, ShapeKind, ValidateDepth};
use primitives::H256;

/// Art-node requests, one JSON object per line. Everything past the
/// authentication handshake carries the session token.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum Request {
    Hello,
    /// The signed nonce, as the ECDSA `(r, s)` pair.
    Authenticate {
        nonce: H256,
        r: H256,
        s: H256,
    },
    AddShape {
        token: H256,
        validate_depth: ValidateDepth,
        kind: ShapeKind,
        svg: String,
        fill: String,
        stroke: String,
    },
    DeleteShape {
        token: H256,
        validate_depth: ValidateDepth,
        hash: OpSignature,
    },
    GetSvg {
        token: H256,
        hash: OpSignature,
    },
    GetInk {
        token: H256,
    },
    GetShapes {
        token: H256,
        block: BlockHash,
    },
    GetGenesis {
        token: H256,
    },
    GetChildren {
        token: H256,
        block: BlockHash,
    },
    CloseCanvas {
        token: H256,
    },
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum Response {
    Nonce {
        nonce: H256,
    },
    Authenticated {
        token: H256,
        settings: CanvasSettings,
    },
    /// First phase of AddShape: the operation is accepted locally.
    ShapeAccepted {
        signature: OpSignature,
    },
    /// Second phase: the containing block sank to the validate-depth.
    ShapeValidated {
        signature: OpSignature,
        block: BlockHash,
        ink: Ink,
    },
    DeleteAccepted {
        signature: OpSignature,
    },
    DeleteValidated {
        signature: OpSignature,
        block: BlockHash,
        ink: Ink,
    },
    Svg {
        svg: String,
    },
    Ink {
        ink: Ink,
    },
    Shapes {
        signatures: Vec<OpSignature>,
    },
    Genesis {
        hash: BlockHash,
    },
    Children {
        hashes: Vec<BlockHash>,
    },
    Closed {
        ink: Ink,
    },
    Error {
        error: Error,
    },
}
