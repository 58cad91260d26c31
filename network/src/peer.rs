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

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::{Duration, Instant};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use ikey::Public;
use parking_lot::Mutex;

use crate::message::Message;

/// Frames larger than this are dropped along with their connection.
const MAX_FRAME_BYTES: usize = 8 * 1024 * 1024;

/// One connected miner. The address is the peer's advertised listening
/// address, which keys the peer set; the stream handle is shared with the
/// connection's reader thread.
pub struct Peer {
    address: SocketAddr,
    public: Public,
    stream: Mutex<TcpStream>,
    last_seen: Mutex<Instant>,
}

impl Peer {
    pub fn new(address: SocketAddr, public: Public, stream: TcpStream) -> Self {
        Peer {
            address,
            public,
            stream: Mutex::new(stream),
            last_seen: Mutex::new(Instant::now()),
        }
    }

    pub fn address(&self) -> SocketAddr {
        self.address
    }

    pub fn public(&self) -> &Public {
        &self.public
    }

    pub fn send(&self, message: &Message) -> io::Result<()> {
        write_frame(&mut *self.stream.lock(), message)
    }

    /// Called whenever any message arrives from this peer.
    pub fn touch(&self) {
        *self.last_seen.lock() = Instant::now();
    }

    pub fn idle_for(&self) -> Duration {
        self.last_seen.lock().elapsed()
    }
}

/// Writes a message as a 4-byte big-endian length followed by its RLP.
pub fn write_frame<W: Write>(writer: &mut W, message: &Message) -> io::Result<()> {
    let payload = rlp::encode(message);
    writer.write_u32::<BigEndian>(payload.len() as u32)?;
    writer.write_all(&payload)?;
    writer.flush()
}

pub fn read_frame<R: Read>(reader: &mut R) -> io::Result<Message> {
    let length = reader.read_u32::<BigEndian>()? as usize;
    if length > MAX_FRAME_BYTES {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "oversized frame"))
    }
    let mut payload = vec![0u8; length];
    reader.read_exact(&mut payload)?;
    rlp::decode(&payload).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, format!("bad frame: {}", err)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_round_trip_through_a_buffer() {
        let mut buffer = Vec::new();
        write_frame(&mut buffer, &Message::Ping).unwrap();
        write_frame(&mut buffer, &Message::Handshake {
            port: 9,
            public: Public::random(),
        })
        .unwrap();

        let mut cursor = std::io::Cursor::new(buffer);
        assert_eq!(Message::Ping, read_frame(&mut cursor).unwrap());
        assert!(matches!(read_frame(&mut cursor).unwrap(), Message::Handshake { port: 9, .. }));
        assert!(read_frame(&mut cursor).is_err());
    }

    #[test]
    fn oversized_frames_are_refused() {
        let mut buffer = Vec::new();
        buffer.extend_from_slice(&(u32::max_value()).to_be_bytes());
        let mut cursor = std::io::Cursor::new(buffer);
        assert!(read_frame(&mut cursor).is_err());
    }
}
