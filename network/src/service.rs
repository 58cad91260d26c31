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

use std::collections::HashMap;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, Weak};
use std::thread;

use icore::{Block, ChainNotify, Miner};
use itypes::{Error, SignedOperation};
use parking_lot::RwLock;

use crate::config::{NetworkConfig, CONNECT_TIMEOUT, PEER_TIMEOUT};
use crate::directory::DirectoryClient;
use crate::message::Message;
use crate::peer::{read_frame, write_frame, Peer};

/// The peer transport: one accept loop, one reader thread per connection,
/// and gossip driven by the miner's fresh-import notifications. Peers are
/// keyed by their advertised listening address; the handshake exists to
/// populate both sides' maps.
pub struct NetworkService {
    miner: Arc<Miner>,
    directory: DirectoryClient,
    listen_address: SocketAddr,
    peers: RwLock<HashMap<SocketAddr, Arc<Peer>>>,
    /// Back-reference so `&self` paths can hand the service to new threads.
    myself: RwLock<Weak<NetworkService>>,
}

impl NetworkService {
    /// Binds the listener (fatal on failure), hooks gossip into the miner,
    /// dials the starter peers and asks each for its chain.
    pub fn start(
        miner: Arc<Miner>,
        directory: DirectoryClient,
        config: &NetworkConfig,
        initial_peers: &[SocketAddr],
    ) -> Result<Arc<NetworkService>, Error> {
        let listener = TcpListener::bind(config.listen_address).map_err(|err| {
            cerror!(NET, "Cannot bind {}: {}", config.listen_address, err);
            Error::Disconnected {
                address: config.listen_address.to_string(),
            }
        })?;
        let listen_address = listener.local_addr().map_err(|_| Error::Disconnected {
            address: config.listen_address.to_string(),
        })?;

        let service = Arc::new(NetworkService {
            miner: Arc::clone(&miner),
            directory,
            listen_address,
            peers: RwLock::new(HashMap::new()),
            myself: RwLock::new(Weak::new()),
        });
        *service.myself.write() = Arc::downgrade(&service);
        miner.register_notify(Arc::downgrade(&(Arc::clone(&service) as Arc<dyn ChainNotify>)));

        {
            let service = Arc::clone(&service);
            thread::Builder::new()
                .name("net-accept".into())
                .spawn(move || {
                    cinfo!(NET, "Listening on {}", service.listen_address);
                    for stream in incoming_streams(&listener) {
                        Self::spawn_reader(&service, stream, false);
                    }
                })
                .expect("the accept thread can always be spawned; qed");
        }

        for address in initial_peers {
            Self::connect(&service, *address);
        }
        Ok(service)
    }

    pub fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    pub fn peer_count(&self) -> usize {
        self.peers.read().len()
    }

    fn handshake(&self) -> Message {
        Message::Handshake {
            port: self.listen_address.port(),
            public: *self.miner.public(),
        }
    }

    /// Dials a peer and opens the handshake. The peer enters the map once
    /// its own handshake arrives.
    fn connect(service: &Arc<NetworkService>, address: SocketAddr) {
        if address == service.listen_address || service.peers.read().contains_key(&address) {
            return
        }
        match TcpStream::connect_timeout(&address, CONNECT_TIMEOUT) {
            Ok(mut stream) => {
                if let Err(err) = write_frame(&mut stream, &service.handshake()) {
                    cwarn!(NET, "Handshake to {} failed: {}", address, err);
                    return
                }
                Self::spawn_reader(service, stream, true);
            }
            Err(err) => cwarn!(NET, "Cannot connect to {}: {}", address, err),
        }
    }

    fn spawn_reader(service: &Arc<NetworkService>, stream: TcpStream, initiated: bool) {
        let service = Arc::clone(service);
        thread::spawn(move || service.reader_loop(stream, initiated));
    }

    fn reader_loop(self: Arc<Self>, mut stream: TcpStream, initiated: bool) {
        let remote_ip = match stream.peer_addr() {
            Ok(address) => address.ip(),
            Err(_) => return,
        };
        let mut peer: Option<Arc<Peer>> = None;

        loop {
            match read_frame(&mut stream) {
                Ok(Message::Handshake {
                    port,
                    public,
                }) => {
                    if peer.is_some() {
                        continue
                    }
                    let address = SocketAddr::new(remote_ip, port);
                    let clone = match stream.try_clone() {
                        Ok(clone) => clone,
                        Err(_) => break,
                    };
                    let new_peer = Arc::new(Peer::new(address, public, clone));
                    self.peers.write().insert(address, Arc::clone(&new_peer));
                    cinfo!(NET, "Peer {} connected", address);
                    if initiated {
                        // We dialed: pull the peer's view of the chain.
                        let _ = new_peer.send(&Message::ChainRequest);
                    } else {
                        // They dialed: finish the bidirectional setup.
                        let _ = new_peer.send(&self.handshake());
                    }
                    peer = Some(new_peer);
                }
                Ok(message) => match &peer {
                    Some(peer) => {
                        peer.touch();
                        self.dispatch(message, peer);
                    }
                    None => {
                        cwarn!(NET, "Message before handshake from {}; closing", remote_ip);
                        break
                    }
                },
                Err(err) => {
                    cdebug!(NET, "Connection from {} closed: {}", remote_ip, err);
                    break
                }
            }
        }

        if let Some(peer) = peer {
            self.drop_peer(peer.address());
        }
    }

    /// Inbound message handling. Invalid peer payloads are logged and
    /// dropped, never answered or propagated.
    fn dispatch(&self, message: Message, peer: &Arc<Peer>) {
        match message {
            Message::Handshake {
                ..
            } => {}
            Message::Ping => {
                let _ = peer.send(&Message::Pong);
            }
            Message::Pong => {}
            Message::BlockPush {
                block,
                hash,
            } => match self.miner.import_block(block, hash) {
                // Freshly accepted blocks are forwarded by the import hook.
                Ok(true) => {}
                Ok(false) => ctrace!(NET, "Known block {:x} from {}", hash, peer.address()),
                Err(err) => cwarn!(NET, "Dropped block {:x} from {}: {}", hash, peer.address(), err),
            },
            Message::OpPush {
                op,
            } => {
                let signature = op.signature();
                match self.miner.import_op(op) {
                    Ok(true) => {}
                    Ok(false) => ctrace!(NET, "Known op {:x} from {}", signature, peer.address()),
                    Err(err) => cwarn!(NET, "Dropped op {:x} from {}: {}", signature, peer.address(), err),
                }
            }
            Message::ChainRequest => {
                let (head, blocks) = self.miner.chain_snapshot();
                let _ = peer.send(&Message::ChainResponse {
                    head,
                    blocks,
                });
            }
            Message::ChainResponse {
                head,
                blocks,
            } => match self.miner.import_chain(head, blocks) {
                Ok(true) => cinfo!(SYNC, "Adopted chain with head {:x} from {}", head, peer.address()),
                Ok(false) => {}
                Err(err) => cwarn!(SYNC, "Rejected chain from {}: {}", peer.address(), err),
            },
        }
    }

    /// Sends to every live peer, pinging first. Unresponsive or unreachable
    /// peers are dropped; the directory refills the set when it thins out.
    fn gossip(&self, message: &Message) {
        let peers: Vec<Arc<Peer>> = self.peers.read().values().cloned().collect();
        let mut dropped = Vec::new();
        for peer in peers {
            if peer.idle_for() > PEER_TIMEOUT {
                cwarn!(NET, "Peer {} unresponsive; dropping", peer.address());
                dropped.push(peer.address());
                continue
            }
            if peer.send(&Message::Ping).is_err() || peer.send(message).is_err() {
                dropped.push(peer.address());
            }
        }
        for address in dropped {
            self.drop_peer(address);
        }
        self.ensure_min_peers();
    }

    fn drop_peer(&self, address: SocketAddr) {
        if self.peers.write().remove(&address).is_some() {
            cinfo!(NET, "Peer {} dropped", address);
        }
    }

    /// Tops the peer set back up from the directory once it falls below the
    /// deployment minimum.
    fn ensure_min_peers(&self) {
        let minimum = self.miner.settings().min_peer_count as usize;
        if self.peers.read().len() >= minimum {
            return
        }
        let service = match self.myself.read().upgrade() {
            Some(service) => service,
            None => return,
        };
        thread::spawn(move || match service.directory.peers() {
            Ok(addresses) => {
                for address in addresses {
                    Self::connect(&service, address);
                }
            }
            Err(err) => cwarn!(DIRECTORY, "Peer refill failed: {}", err),
        });
    }
}

impl ChainNotify for NetworkService {
    fn new_block(&self, block: &Block) {
        self.gossip(&Message::BlockPush {
            hash: block.hash(),
            block: block.clone(),
        });
    }

    fn new_op(&self, op: &SignedOperation) {
        self.gossip(&Message::OpPush {
            op: op.clone(),
        });
    }
}

fn incoming_streams(listener: &TcpListener) -> impl Iterator<Item = TcpStream> + '_ {
    listener.incoming().filter_map(|stream| match stream {
        Ok(stream) => Some(stream),
        Err(err) => {
            cwarn!(NET, "Listener error: {}", err);
            None
        }
    })
}
