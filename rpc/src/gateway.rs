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
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::RecvTimeoutError;
use icore::Miner;
use itypes::{Error, OpSignature, Shape};
use primitives::H256;

use crate::message::{Request, Response};
use crate::session::{SessionManager, SessionStatus};

/// Whether the connection survives the request.
enum Flow {
    Continue,
    Close,
}

/// The art-node gateway: a line-JSON server speaking the token-gated canvas
/// protocol. One handler thread per connection; add/delete requests hold
/// their connection through the validation wait.
pub struct Gateway {
    miner: Arc<Miner>,
    sessions: SessionManager,
    listen_address: SocketAddr,
}

impl Gateway {
    /// Binds the gateway listener; failure is fatal at startup.
    pub fn start(miner: Arc<Miner>, listen_address: SocketAddr) -> Result<Arc<Gateway>, Error> {
        let listener = TcpListener::bind(listen_address).map_err(|err| {
            cerror!(GATEWAY, "Cannot bind {}: {}", listen_address, err);
            Error::Disconnected {
                address: listen_address.to_string(),
            }
        })?;
        let listen_address = listener.local_addr().map_err(|_| Error::Disconnected {
            address: listen_address.to_string(),
        })?;

        let gateway = Arc::new(Gateway {
            miner,
            sessions: SessionManager::new(),
            listen_address,
        });

        {
            let gateway = Arc::clone(&gateway);
            thread::Builder::new()
                .name("gateway-accept".into())
                .spawn(move || {
                    cinfo!(GATEWAY, "Art-node gateway on {}", gateway.listen_address);
                    for stream in listener.incoming() {
                        match stream {
                            Ok(stream) => {
                                let gateway = Arc::clone(&gateway);
                                thread::spawn(move || gateway.handle_connection(stream));
                            }
                            Err(err) => cwarn!(GATEWAY, "Listener error: {}", err),
                        }
                    }
                })
                .expect("the gateway accept thread can always be spawned; qed");
        }

        Ok(gateway)
    }

    pub fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    fn handle_connection(&self, stream: TcpStream) {
        let mut reader = match stream.try_clone() {
            Ok(clone) => BufReader::new(clone),
            Err(_) => return,
        };
        let mut out = stream;
        let mut line = String::new();

        loop {
            line.clear();
            match reader.read_line(&mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
            let request: Request = match serde_json::from_str(line.trim()) {
                Ok(request) => request,
                Err(err) => {
                    cdebug!(GATEWAY, "Unparsable request line: {}", err);
                    let _ = respond(&mut out, &Response::Error {
                        error: Error::Validation("unparsable request".into()),
                    });
                    break
                }
            };
            match self.handle(request, &mut out) {
                Flow::Continue => {}
                Flow::Close => break,
            }
        }
    }

    fn handle(&self, request: Request, out: &mut TcpStream) -> Flow {
        match request {
            Request::Hello => {
                let nonce = self.sessions.issue_nonce();
                answer(out, &Response::Nonce {
                    nonce,
                })
            }
            Request::Authenticate {
                nonce,
                r,
                s,
            } => match self.sessions.authenticate(nonce, r, s, self.miner.public()) {
                Ok(token) => answer(out, &Response::Authenticated {
                    token,
                    settings: self.miner.settings().clone(),
                }),
                Err(error) => answer(out, &Response::Error {
                    error,
                }),
            },
            Request::AddShape {
                token,
                validate_depth,
                kind,
                svg,
                fill,
                stroke,
            } => {
                if let Err(flow) = self.guard(&token, out) {
                    return flow
                }
                let accepted = Shape::new(kind, svg, fill, stroke, *self.miner.public())
                    .and_then(|shape| self.miner.submit_add(validate_depth, shape));
                match accepted {
                    Err(error) => answer(out, &Response::Error {
                        error,
                    }),
                    Ok(signature) => {
                        if let Flow::Close = answer(out, &Response::ShapeAccepted {
                            signature,
                        }) {
                            return Flow::Close
                        }
                        self.await_validation(signature, token, out, true)
                    }
                }
            }
            Request::DeleteShape {
                token,
                validate_depth,
                hash,
            } => {
                if let Err(flow) = self.guard(&token, out) {
                    return flow
                }
                match self.miner.submit_remove(validate_depth, hash) {
                    Err(error) => answer(out, &Response::Error {
                        error,
                    }),
                    Ok(signature) => {
                        if let Flow::Close = answer(out, &Response::DeleteAccepted {
                            signature,
                        }) {
                            return Flow::Close
                        }
                        self.await_validation(signature, token, out, false)
                    }
                }
            }
            Request::GetSvg {
                token,
                hash,
            } => {
                if let Err(flow) = self.guard(&token, out) {
                    return flow
                }
                match self.miner.rendered_svg(&hash) {
                    Ok(svg) => answer(out, &Response::Svg {
                        svg,
                    }),
                    Err(error) => answer(out, &Response::Error {
                        error,
                    }),
                }
            }
            Request::GetInk {
                token,
            } => {
                if let Err(flow) = self.guard(&token, out) {
                    return flow
                }
                answer(out, &Response::Ink {
                    ink: self.miner.available_ink(),
                })
            }
            Request::GetShapes {
                token,
                block,
            } => {
                if let Err(flow) = self.guard(&token, out) {
                    return flow
                }
                match self.miner.shapes_in_block(&block) {
                    Ok(signatures) => answer(out, &Response::Shapes {
                        signatures,
                    }),
                    Err(error) => answer(out, &Response::Error {
                        error,
                    }),
                }
            }
            Request::GetGenesis {
                token,
            } => {
                if let Err(flow) = self.guard(&token, out) {
                    return flow
                }
                answer(out, &Response::Genesis {
                    hash: self.miner.genesis(),
                })
            }
            Request::GetChildren {
                token,
                block,
            } => {
                if let Err(flow) = self.guard(&token, out) {
                    return flow
                }
                match self.miner.children_of(&block) {
                    Ok(hashes) => answer(out, &Response::Children {
                        hashes,
                    }),
                    Err(error) => answer(out, &Response::Error {
                        error,
                    }),
                }
            }
            Request::CloseCanvas {
                token,
            } => {
                if let Err(flow) = self.guard(&token, out) {
                    return flow
                }
                let ink = self.miner.available_ink();
                self.sessions.close(&token);
                cinfo!(GATEWAY, "Canvas closed");
                answer(out, &Response::Closed {
                    ink,
                })
            }
        }
    }

    /// Token gating. Unknown tokens answer `InvalidToken` and close the
    /// connection; a closed canvas answers `Disconnected`.
    fn guard(&self, token: &H256, out: &mut TcpStream) -> Result<(), Flow> {
        match self.sessions.status(token) {
            SessionStatus::Live => Ok(()),
            SessionStatus::Closed => {
                let _ = respond(out, &Response::Error {
                    error: self.disconnected(),
                });
                Err(Flow::Continue)
            }
            SessionStatus::Unknown => {
                let _ = respond(out, &Response::Error {
                    error: Error::InvalidToken,
                });
                Err(Flow::Close)
            }
        }
    }

    /// The second phase of add/delete: wait for the reconciler's push that
    /// the operation reached the validated pool, checking once a second
    /// whether the canvas was closed in the meantime.
    fn await_validation(&self, signature: OpSignature, token: H256, out: &mut TcpStream, add: bool) -> Flow {
        let watcher = self.miner.subscribe_validation(signature);
        loop {
            match watcher.recv_timeout(Duration::from_secs(1)) {
                Ok(block) => {
                    let ink = self.miner.available_ink();
                    let response = if add {
                        Response::ShapeValidated {
                            signature,
                            block,
                            ink,
                        }
                    } else {
                        Response::DeleteValidated {
                            signature,
                            block,
                            ink,
                        }
                    };
                    return answer(out, &response)
                }
                Err(RecvTimeoutError::Timeout) => {
                    if self.sessions.is_closed(&token) {
                        return answer(out, &Response::Error {
                            error: self.disconnected(),
                        })
                    }
                }
                Err(RecvTimeoutError::Disconnected) => return Flow::Close,
            }
        }
    }

    fn disconnected(&self) -> Error {
        Error::Disconnected {
            address: self.listen_address.to_string(),
        }
    }
}

fn respond(out: &mut TcpStream, response: &Response) -> std::io::Result<()> {
    let mut line = serde_json::to_string(response)
        .expect("responses contain no non-serializable values; qed");
    line.push('\n');
    out.write_all(line.as_bytes())
}

/// Writes the response; an unwritable client ends the connection.
fn answer(out: &mut TcpStream, response: &Response) -> Flow {
    match respond(out, response) {
        Ok(()) => Flow::Continue,
        Err(_) => Flow::Close,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use icore::CanvasSettings;
    use ikey::{sign, KeyPair};
    use itypes::ShapeKind;

    use super::*;

    struct TestClient {
        reader: BufReader<TcpStream>,
        out: TcpStream,
    }

    impl TestClient {
        fn connect(address: SocketAddr) -> Self {
            let out = TcpStream::connect(address).unwrap();
            let reader = BufReader::new(out.try_clone().unwrap());
            TestClient {
                reader,
                out,
            }
        }

        fn send(&mut self, request: &Request) {
            let mut line = serde_json::to_string(request).unwrap();
            line.push('\n');
            self.out.write_all(line.as_bytes()).unwrap();
        }

        fn recv(&mut self) -> Response {
            let mut line = String::new();
            assert_ne!(0, self.reader.read_line(&mut line).unwrap(), "gateway closed the connection");
            serde_json::from_str(line.trim()).unwrap()
        }

        fn authenticate(&mut self, pair: &KeyPair) -> H256 {
            self.send(&Request::Hello);
            let nonce = match self.recv() {
                Response::Nonce {
                    nonce,
                } => nonce,
                other => panic!("expected a nonce, got {:?}", other),
            };
            let signature = sign(pair.private(), &nonce).unwrap();
            self.send(&Request::Authenticate {
                nonce,
                r: ikey::signature_r(&signature),
                s: ikey::signature_s(&signature),
            });
            match self.recv() {
                Response::Authenticated {
                    token,
                    settings,
                } => {
                    assert_eq!(CanvasSettings::new_test(), settings);
                    token
                }
                other => panic!("expected a token, got {:?}", other),
            }
        }
    }

    fn key_pair(seed: u8) -> KeyPair {
        KeyPair::from_private(ikey::Private::from([seed; 32])).unwrap()
    }

    /// A gateway over a miner with a live mining worker, so submitted ops
    /// really validate.
    fn start_stack(seed: u8) -> (Arc<Miner>, Arc<Gateway>, Arc<AtomicBool>) {
        let miner = Arc::new(Miner::new(CanvasSettings::new_test(), key_pair(seed)));
        let gateway = Gateway::start(Arc::clone(&miner), "127.0.0.1:0".parse().unwrap()).unwrap();
        let stop = Arc::new(AtomicBool::new(false));
        {
            let miner = Arc::clone(&miner);
            let stop = Arc::clone(&stop);
            thread::spawn(move || miner.run_mining_loop(&stop));
        }
        (miner, gateway, stop)
    }

    #[test]
    fn full_draw_and_erase_session() {
        let (miner, gateway, stop) = start_stack(1);
        let pair = key_pair(1);
        let mut client = TestClient::connect(gateway.listen_address());

        let token = client.authenticate(&pair);

        client.send(&Request::GetGenesis {
            token,
        });
        assert_eq!(
            Response::Genesis {
                hash: miner.genesis(),
            },
            client.recv()
        );

        // Let the worker earn enough ink for the filled square below.
        loop {
            client.send(&Request::GetInk {
                token,
            });
            match client.recv() {
                Response::Ink {
                    ink,
                } if ink >= 30 => break,
                Response::Ink {
                    ..
                } => thread::sleep(Duration::from_millis(20)),
                other => panic!("unexpected {:?}", other),
            }
        }

        client.send(&Request::AddShape {
            token,
            validate_depth: 1,
            kind: ShapeKind::Path,
            svg: "M 5 5 h 5 v 5 h -5 Z".into(),
            fill: "red".into(),
            stroke: "transparent".into(),
        });
        let signature = match client.recv() {
            Response::ShapeAccepted {
                signature,
            } => signature,
            Response::Error {
                error,
            } => panic!("add rejected: {}", error),
            other => panic!("unexpected {:?}", other),
        };
        let block = match client.recv() {
            Response::ShapeValidated {
                signature: validated,
                block,
                ..
            } => {
                assert_eq!(signature, validated);
                block
            }
            other => panic!("unexpected {:?}", other),
        };

        client.send(&Request::GetShapes {
            token,
            block,
        });
        match client.recv() {
            Response::Shapes {
                signatures,
            } => assert!(signatures.contains(&signature)),
            other => panic!("unexpected {:?}", other),
        }

        client.send(&Request::GetSvg {
            token,
            hash: signature,
        });
        match client.recv() {
            Response::Svg {
                svg,
            } => assert!(svg.starts_with("<path")),
            other => panic!("unexpected {:?}", other),
        }

        client.send(&Request::DeleteShape {
            token,
            validate_depth: 1,
            hash: signature,
        });
        assert!(matches!(client.recv(), Response::DeleteAccepted { .. }));
        assert!(matches!(client.recv(), Response::DeleteValidated { .. }));

        client.send(&Request::CloseCanvas {
            token,
        });
        assert!(matches!(client.recv(), Response::Closed { .. }));

        // The spent token now reads as disconnected.
        client.send(&Request::GetInk {
            token,
        });
        assert!(matches!(
            client.recv(),
            Response::Error {
                error: Error::Disconnected { .. }
            }
        ));

        stop.store(true, Ordering::SeqCst);
    }

    #[test]
    fn unknown_token_closes_the_connection() {
        let (_miner, gateway, stop) = start_stack(2);
        let mut client = TestClient::connect(gateway.listen_address());

        client.send(&Request::GetInk {
            token: H256::random(),
        });
        assert!(matches!(
            client.recv(),
            Response::Error {
                error: Error::InvalidToken
            }
        ));
        let mut line = String::new();
        assert_eq!(0, client.reader.read_line(&mut line).unwrap());

        stop.store(true, Ordering::SeqCst);
    }

    #[test]
    fn foreign_key_cannot_open_the_canvas() {
        let (_miner, gateway, stop) = start_stack(3);
        let intruder = key_pair(9);
        let mut client = TestClient::connect(gateway.listen_address());

        client.send(&Request::Hello);
        let nonce = match client.recv() {
            Response::Nonce {
                nonce,
            } => nonce,
            other => panic!("unexpected {:?}", other),
        };
        let signature = sign(intruder.private(), &nonce).unwrap();
        client.send(&Request::Authenticate {
            nonce,
            r: ikey::signature_r(&signature),
            s: ikey::signature_s(&signature),
        });
        assert!(matches!(
            client.recv(),
            Response::Error {
                error: Error::InvalidSignature
            }
        ));

        stop.store(true, Ordering::SeqCst);
    }
}
