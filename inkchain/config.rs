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

use clap::ArgMatches;
use ikey::{KeyPair, Private, Public};
use rustc_hex::FromHex;

pub struct Config {
    pub directory_address: SocketAddr,
    pub key_pair: KeyPair,
    pub net_address: SocketAddr,
    pub gateway_address: SocketAddr,
}

impl Config {
    pub fn load(matches: &ArgMatches<'_>) -> Result<Config, String> {
        let directory_address = parse_address(matches.value_of("directory").expect("required"), "directory")?;
        let net_address = parse_address(matches.value_of("net-address").expect("defaulted"), "net")?;
        let gateway_address = parse_address(matches.value_of("gateway-address").expect("defaulted"), "gateway")?;

        let private = parse_private(matches.value_of("private").expect("required"))?;
        let key_pair =
            KeyPair::from_private(private).map_err(|err| format!("Invalid private key: {}", err))?;
        let public = parse_public(matches.value_of("public").expect("required"))?;
        if *key_pair.public() != public {
            return Err("The given public key does not belong to the given private key".to_string())
        }

        Ok(Config {
            directory_address,
            key_pair,
            net_address,
            gateway_address,
        })
    }
}

fn parse_address(value: &str, what: &str) -> Result<SocketAddr, String> {
    value.parse().map_err(|_| format!("Invalid {} address {:?}", what, value))
}

fn parse_private(value: &str) -> Result<Private, String> {
    let bytes: Vec<u8> = value.from_hex().map_err(|_| "The private key is not valid hex".to_string())?;
    if bytes.len() != 32 {
        return Err(format!("The private key must be 32 bytes, got {}", bytes.len()))
    }
    Ok(Private::from_slice(&bytes))
}

fn parse_public(value: &str) -> Result<Public, String> {
    let bytes: Vec<u8> = value.from_hex().map_err(|_| "The public key is not valid hex".to_string())?;
    if bytes.len() != 64 {
        return Err(format!("The public key must be 64 bytes, got {}", bytes.len()))
    }
    Ok(Public::from_slice(&bytes))
}
