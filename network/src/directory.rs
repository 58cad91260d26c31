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

use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpStream};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use icore::CanvasSettings;
use ikey::Public;
use itypes::Error;

use crate::config::CONNECT_TIMEOUT;

/// The heartbeat fires this much earlier than the directory's deadline.
const HEARTBEAT_MARGIN_MILLIS: u64 = 500;

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
enum DirectoryRequest {
    Register { public: Public, address: String },
    GetPeers { public: Public },
    HeartBeat { public: Public },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
enum DirectoryResponse {
    Registered { settings: CanvasSettings, peers: Vec<String> },
    Peers { peers: Vec<String> },
    Ok,
}

/// Line-delimited JSON client for the directory service: registration at
/// startup, peer refills, and the liveness heartbeat. One connection per
/// call; the directory is not chatty.
#[derive(Clone)]
pub struct DirectoryClient {
    address: SocketAddr,
    public: Public,
}

impl DirectoryClient {
    pub fn new(address: SocketAddr, public: Public) -> Self {
        DirectoryClient {
            address,
            public,
        }
    }

    /// Announces this miner and fetches the canvas settings plus a starter
    /// peer list. Failure here is fatal to startup.
    pub fn register(&self, listen_address: SocketAddr) -> Result<(CanvasSettings, Vec<SocketAddr>), Error> {
        let response = self.call(&DirectoryRequest::Register {
            public: self.public,
            address: listen_address.to_string(),
        })?;
        match response {
            DirectoryResponse::Registered {
                settings,
                peers,
            } => Ok((settings, parse_addresses(peers))),
            _ => Err(self.disconnected()),
        }
    }

    pub fn peers(&self) -> Result<Vec<SocketAddr>, Error> {
        let response = self.call(&DirectoryRequest::GetPeers {
            public: self.public,
        })?;
        match response {
            DirectoryResponse::Peers {
                peers,
            } => Ok(parse_addresses(peers)),
            _ => Err(self.disconnected()),
        }
    }

    pub fn heartbeat(&self) -> Result<(), Error> {
        match self.call(&DirectoryRequest::HeartBeat {
            public: self.public,
        })? {
            DirectoryResponse::Ok => Ok(()),
            _ => Err(self.disconnected()),
        }
    }

    /// Spawns the liveness loop: one heartbeat every
    /// `heart_beat_millis - 500`, leaving the directory a safety margin.
    pub fn spawn_heartbeat(&self, heart_beat_millis: u64) -> JoinHandle<()> {
        let client = self.clone();
        let interval = Duration::from_millis(heart_beat_millis.saturating_sub(HEARTBEAT_MARGIN_MILLIS).max(1));
        thread::Builder::new()
            .name("directory-heartbeat".into())
            .spawn(move || loop {
                if let Err(err) = client.heartbeat() {
                    cwarn!(DIRECTORY, "Heartbeat failed: {}", err);
                }
                thread::sleep(interval);
            })
            .expect("the heartbeat thread can always be spawned; qed")
    }

    fn call(&self, request: &DirectoryRequest) -> Result<DirectoryResponse, Error> {
        let mut stream =
            TcpStream::connect_timeout(&self.address, CONNECT_TIMEOUT).map_err(|_| self.disconnected())?;
        let mut line = serde_json::to_string(request).map_err(|_| self.disconnected())?;
        line.push('\n');
        stream.write_all(line.as_bytes()).map_err(|_| self.disconnected())?;

        let mut reader = BufReader::new(stream);
        let mut reply = String::new();
        reader.read_line(&mut reply).map_err(|_| self.disconnected())?;
        serde_json::from_str(&reply).map_err(|_| self.disconnected())
    }

    fn disconnected(&self) -> Error {
        Error::Disconnected {
            address: self.address.to_string(),
        }
    }
}

fn parse_addresses(addresses: Vec<String>) -> Vec<SocketAddr> {
    addresses
        .into_iter()
        .filter_map(|address| match address.parse() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                cwarn!(DIRECTORY, "Ignoring unparsable peer address {:?}", address);
                None
            }
        })
        .collect()
}
