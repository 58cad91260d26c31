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

use icore::Block;
use ikey::Public;
use itypes::{BlockHash, SignedOperation};
use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};

const MESSAGE_ID_HANDSHAKE: u8 = 0x01;
const MESSAGE_ID_PING: u8 = 0x02;
const MESSAGE_ID_PONG: u8 = 0x03;
const MESSAGE_ID_BLOCK_PUSH: u8 = 0x04;
const MESSAGE_ID_OP_PUSH: u8 = 0x05;
const MESSAGE_ID_CHAIN_REQUEST: u8 = 0x06;
const MESSAGE_ID_CHAIN_RESPONSE: u8 = 0x07;

/// Everything miners say to each other. The first element of the RLP list is
/// the message ID.
#[derive(Clone, Debug, PartialEq)]
pub enum Message {
    /// The first message on every connection, in both directions: the
    /// sender's listening port and identity, so each side can file (and
    /// redial) the other.
    Handshake {
        port: u16,
        public: Public,
    },
    Ping,
    Pong,
    BlockPush {
        block: Block,
        hash: BlockHash,
    },
    OpPush {
        op: SignedOperation,
    },
    ChainRequest,
    ChainResponse {
        head: BlockHash,
        blocks: Vec<Block>,
    },
}

impl Encodable for Message {
    fn rlp_append(&self, s: &mut RlpStream) {
        match self {
            Message::Handshake {
                port,
                public,
            } => {
                s.begin_list(3);
                s.append(&MESSAGE_ID_HANDSHAKE);
                s.append(port);
                s.append(public);
            }
            Message::Ping => {
                s.begin_list(1);
                s.append(&MESSAGE_ID_PING);
            }
            Message::Pong => {
                s.begin_list(1);
                s.append(&MESSAGE_ID_PONG);
            }
            Message::BlockPush {
                block,
                hash,
            } => {
                s.begin_list(3);
                s.append(&MESSAGE_ID_BLOCK_PUSH);
                s.append(block);
                s.append(hash);
            }
            Message::OpPush {
                op,
            } => {
                s.begin_list(2);
                s.append(&MESSAGE_ID_OP_PUSH);
                s.append(op);
            }
            Message::ChainRequest => {
                s.begin_list(1);
                s.append(&MESSAGE_ID_CHAIN_REQUEST);
            }
            Message::ChainResponse {
                head,
                blocks,
            } => {
                s.begin_list(3);
                s.append(&MESSAGE_ID_CHAIN_RESPONSE);
                s.append(head);
                s.append_list(blocks);
            }
        }
    }
}

impl Decodable for Message {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        let item_count = rlp.item_count()?;
        let expect_items = |expected: usize| {
            if item_count == expected {
                Ok(())
            } else {
                Err(DecoderError::RlpIncorrectListLen)
            }
        };
        match rlp.val_at::<u8>(0)? {
            MESSAGE_ID_HANDSHAKE => {
                expect_items(3)?;
                Ok(Message::Handshake {
                    port: rlp.val_at(1)?,
                    public: rlp.val_at(2)?,
                })
            }
            MESSAGE_ID_PING => {
                expect_items(1)?;
                Ok(Message::Ping)
            }
            MESSAGE_ID_PONG => {
                expect_items(1)?;
                Ok(Message::Pong)
            }
            MESSAGE_ID_BLOCK_PUSH => {
                expect_items(3)?;
                Ok(Message::BlockPush {
                    block: rlp.val_at(1)?,
                    hash: rlp.val_at(2)?,
                })
            }
            MESSAGE_ID_OP_PUSH => {
                expect_items(2)?;
                Ok(Message::OpPush {
                    op: rlp.val_at(1)?,
                })
            }
            MESSAGE_ID_CHAIN_REQUEST => {
                expect_items(1)?;
                Ok(Message::ChainRequest)
            }
            MESSAGE_ID_CHAIN_RESPONSE => {
                expect_items(3)?;
                Ok(Message::ChainResponse {
                    head: rlp.val_at(1)?,
                    blocks: rlp.list_at(2)?,
                })
            }
            _ => Err(DecoderError::Custom("Unexpected message ID")),
        }
    }
}
