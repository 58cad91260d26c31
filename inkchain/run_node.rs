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

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use inkchain_core::Miner;
use inkchain_network::{DirectoryClient, NetworkConfig, NetworkService};
use inkchain_rpc::Gateway;

use crate::config::Config;

/// Startup order per the network contract: register with the directory
/// (fatal on failure), then bind the peer listener (fatal), the gateway
/// (fatal), start the heartbeat and mine on this thread until ctrl-c.
pub fn run_node(config: Config) -> Result<(), String> {
    let directory = DirectoryClient::new(config.directory_address, *config.key_pair.public());
    let (settings, initial_peers) = directory
        .register(config.net_address)
        .map_err(|err| format!("Cannot register with the directory: {}", err))?;
    cinfo!(
        DIRECTORY,
        "Joined a {}x{} canvas with {} starter peers",
        settings.x_max,
        settings.y_max,
        initial_peers.len()
    );

    let miner = Arc::new(Miner::new(settings.clone(), config.key_pair.clone()));

    let network_config = NetworkConfig {
        listen_address: config.net_address,
    };
    let _network = NetworkService::start(Arc::clone(&miner), directory.clone(), &network_config, &initial_peers)
        .map_err(|err| format!("Cannot start the peer transport: {}", err))?;
    let _gateway = Gateway::start(Arc::clone(&miner), config.gateway_address)
        .map_err(|err| format!("Cannot start the art-node gateway: {}", err))?;
    let _heartbeat = directory.spawn_heartbeat(settings.heart_beat_millis);

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        ctrlc::set_handler(move || {
            cinfo!(SHUTDOWN, "Stopping after the current nonce attempt");
            stop.store(true, Ordering::SeqCst);
        })
        .map_err(|err| format!("Cannot install the signal handler: {}", err))?;
    }

    miner.run_mining_loop(&stop);
    Ok(())
}
