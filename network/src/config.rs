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

use std::net::SocketAddr;
use std::time::Duration;

/// Local transport knobs. Everything economic comes from the directory's
/// canvas settings instead.
#[derive(Clone, Debug)]
pub struct NetworkConfig {
    /// Address to listen on for peer connections. Port zero asks the OS for
    /// an ephemeral port; the advertised port is read back after binding.
    pub listen_address: SocketAddr,
}

/// Dial timeout for outbound peer and directory connections.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// A peer silent for this long despite pings is dropped at the next gossip.
pub const PEER_TIMEOUT: Duration = Duration::from_secs(30);
