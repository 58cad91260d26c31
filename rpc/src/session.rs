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

use std::collections::{HashMap, HashSet};

use ikey::{signature_from_rs, verify, Public};
use itypes::Error;
use parking_lot::{Mutex, RwLock};
use primitives::H256;

/// What a presented token means.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SessionStatus {
    Live,
    /// The canvas was closed; the token is remembered but spent.
    Closed,
    Unknown,
}

/// Nonce and token bookkeeping for the art-node handshake. A nonce is issued
/// on `Hello`, remembered, and consumed by the one authentication attempt
/// that presents it.
pub struct SessionManager {
    nonces: Mutex<HashSet<H256>>,
    tokens: RwLock<HashMap<H256, bool>>,
}

impl SessionManager {
    pub fn new() -> Self {
        SessionManager {
            nonces: Mutex::new(HashSet::new()),
            tokens: RwLock::new(HashMap::new()),
        }
    }

    pub fn issue_nonce(&self) -> H256 {
        let nonce = H256::random();
        self.nonces.lock().insert(nonce);
        nonce
    }

    /// Consumes the nonce and verifies the `(r, s)` signature over it
    /// against the miner's identity. Success issues a fresh token.
    pub fn authenticate(&self, nonce: H256, r: H256, s: H256, identity: &Public) -> Result<H256, Error> {
        if !self.nonces.lock().remove(&nonce) {
            return Err(Error::InvalidSignature)
        }
        let signature = signature_from_rs(&r, &s);
        match verify(identity, &signature, &nonce) {
            Ok(true) => {
                let token = H256::random();
                self.tokens.write().insert(token, false);
                Ok(token)
            }
            _ => Err(Error::InvalidSignature),
        }
    }

    pub fn status(&self, token: &H256) -> SessionStatus {
        match self.tokens.read().get(token) {
            Some(false) => SessionStatus::Live,
            Some(true) => SessionStatus::Closed,
            None => SessionStatus::Unknown,
        }
    }

    pub fn is_closed(&self, token: &H256) -> bool {
        self.status(token) == SessionStatus::Closed
    }

    /// Marks a live token as spent. False when the token is unknown.
    pub fn close(&self, token: &H256) -> bool {
        match self.tokens.write().get_mut(token) {
            Some(closed) => {
                *closed = true;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use ikey::{sign, Generator, Random};

    use super::*;

    #[test]
    fn handshake_happy_path() {
        let pair = Random.generate().unwrap();
        let sessions = SessionManager::new();

        let nonce = sessions.issue_nonce();
        let signature = sign(pair.private(), &nonce).unwrap();
        let r = ikey::signature_r(&signature);
        let s = ikey::signature_s(&signature);

        let token = sessions.authenticate(nonce, r, s, pair.public()).unwrap();
        assert_eq!(SessionStatus::Live, sessions.status(&token));
    }

    #[test]
    fn nonces_are_single_use() {
        let pair = Random.generate().unwrap();
        let sessions = SessionManager::new();

        let nonce = sessions.issue_nonce();
        let signature = sign(pair.private(), &nonce).unwrap();
        let r = ikey::signature_r(&signature);
        let s = ikey::signature_s(&signature);

        sessions.authenticate(nonce, r, s, pair.public()).unwrap();
        assert_eq!(Err(Error::InvalidSignature), sessions.authenticate(nonce, r, s, pair.public()));
    }

    #[test]
    fn wrong_signer_is_rejected_and_still_consumes_the_nonce() {
        let pair = Random.generate().unwrap();
        let intruder = Random.generate().unwrap();
        let sessions = SessionManager::new();

        let nonce = sessions.issue_nonce();
        let signature = sign(intruder.private(), &nonce).unwrap();
        let r = ikey::signature_r(&signature);
        let s = ikey::signature_s(&signature);

        assert_eq!(Err(Error::InvalidSignature), sessions.authenticate(nonce, r, s, pair.public()));
        // A second attempt with the real key no longer works either.
        let signature = sign(pair.private(), &nonce).unwrap();
        let r = ikey::signature_r(&signature);
        let s = ikey::signature_s(&signature);
        assert_eq!(Err(Error::InvalidSignature), sessions.authenticate(nonce, r, s, pair.public()));
    }

    #[test]
    fn closed_tokens_are_remembered() {
        let sessions = SessionManager::new();
        let token = H256::random();
        assert_eq!(SessionStatus::Unknown, sessions.status(&token));
        assert!(!sessions.close(&token));

        sessions.tokens.write().insert(token, false);
        assert!(sessions.close(&token));
        assert_eq!(SessionStatus::Closed, sessions.status(&token));
        assert!(sessions.is_closed(&token));
    }
}
