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

extern crate inkchain_key as ikey;
#[macro_use]
extern crate inkchain_logger as ilogger;
#[macro_use]
extern crate log;

mod config;
mod run_node;

use std::process;

use clap::{App, Arg, SubCommand};
use ikey::{Generator, Random};

use crate::config::Config;
use crate::run_node::run_node;

fn main() {
    let matches = App::new("inkchain")
        .version("0.1.0")
        .about("A proof-of-work ink miner for the shared canvas network")
        .subcommand(
            SubCommand::with_name("miner")
                .about("Run a miner node")
                .arg(Arg::with_name("directory").help("Directory service address (ip:port)").required(true))
                .arg(Arg::with_name("public").help("Identity public key, hex").required(true))
                .arg(Arg::with_name("private").help("Identity private key, hex").required(true))
                .arg(
                    Arg::with_name("net-address")
                        .long("net-address")
                        .help("Peer listen address, advertised to the directory")
                        .takes_value(true)
                        .default_value("0.0.0.0:3410"),
                )
                .arg(
                    Arg::with_name("gateway-address")
                        .long("gateway-address")
                        .help("Art-node gateway listen address")
                        .takes_value(true)
                        .default_value("127.0.0.1:3420"),
                ),
        )
        .subcommand(SubCommand::with_name("keygen").about("Generate a fresh identity key pair"))
        .get_matches();

    if let Err(err) = run(&matches) {
        eprintln!("{}", err);
        process::exit(1);
    }
}

fn run(matches: &clap::ArgMatches<'_>) -> Result<(), String> {
    match matches.subcommand() {
        ("keygen", _) => {
            let pair = Random.generate().map_err(|err| format!("Key generation failed: {}", err))?;
            println!("{}", pair);
            Ok(())
        }
        ("miner", Some(matches)) => {
            ilogger::init().map_err(|err| format!("Logger setup failed: {}", err))?;
            let config = Config::load(matches)?;
            run_node(config)
        }
        _ => Err("No command given. Try `inkchain miner --help` or `inkchain keygen`.".to_string()),
    }
}
