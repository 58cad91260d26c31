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

use itypes::{BlockHash, Ink};

/// The deployment constants every miner fetches from the directory service at
/// startup. Fixed for the lifetime of the network.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CanvasSettings {
    pub x_max: u32,
    pub y_max: u32,
    pub genesis_block_hash: BlockHash,
    pub min_peer_count: u32,
    pub ink_per_op_block: Ink,
    pub ink_per_no_op_block: Ink,
    pub heart_beat_millis: u64,
    /// Trailing `'0'` hex characters required of an op block's hash.
    pub difficulty_op_block: u8,
    /// The same, for blocks carrying no operations.
    pub difficulty_no_op_block: u8,
}

impl CanvasSettings {
    pub fn required_difficulty(&self, empty_block: bool) -> u8 {
        if empty_block {
            self.difficulty_no_op_block
        } else {
            self.difficulty_op_block
        }
    }

    pub fn block_reward(&self, empty_block: bool) -> Ink {
        if empty_block {
            self.ink_per_no_op_block
        } else {
            self.ink_per_op_block
        }
    }

    /// Lenient settings for tests and local development.
    pub fn new_test() -> Self {
        CanvasSettings {
            x_max: 1024,
            y_max: 1024,
            genesis_block_hash: Default::default(),
            min_peer_count: 1,
            ink_per_op_block: 50,
            ink_per_no_op_block: 25,
            heart_beat_millis: 2000,
            difficulty_op_block: 1,
            difficulty_no_op_block: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_match_the_directory_protocol() {
        let settings = CanvasSettings::new_test();
        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains("\"XMax\""));
        assert!(json.contains("\"GenesisBlockHash\""));
        assert!(json.contains("\"HeartBeatMillis\""));
        assert!(json.contains("\"DifficultyNoOpBlock\""));
        let back: CanvasSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(settings, back);
    }
}
