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

use itypes::BlockHash;

use super::store::ChainStore;

/// The path between two chain tips through their most recent common
/// ancestor.
#[derive(Clone, Debug, PartialEq)]
pub struct TreeRoute {
    /// Best common ancestor of the two tips.
    pub ancestor: BlockHash,
    /// Blocks to apply, oldest first. The first is a child of the ancestor.
    pub enacted: Vec<BlockHash>,
    /// Blocks to revert, newest first. The last is a child of the ancestor.
    pub retracted: Vec<BlockHash>,
}

/// Walks `from` and `to` towards genesis until they meet: first the taller
/// side alone until the heights agree, then both in lockstep.
///
/// Returns `None` if either tip is unknown to the store.
pub fn tree_route(store: &ChainStore, from: BlockHash, to: BlockHash) -> Option<TreeRoute> {
    let mut retracted = Vec::new();
    let mut enacted = Vec::new();

    let mut cur_retract = from;
    let mut cur_enact = to;
    let mut retract_height = store.height_of(&from)?;
    let mut enact_height = store.height_of(&to)?;

    while retract_height != enact_height {
        if retract_height > enact_height {
            retracted.push(cur_retract);
            cur_retract = store.parent_of(&cur_retract)?;
            retract_height -= 1;
        } else {
            enacted.push(cur_enact);
            cur_enact = store.parent_of(&cur_enact)?;
            enact_height -= 1;
        }
    }

    while cur_retract != cur_enact {
        retracted.push(cur_retract);
        enacted.push(cur_enact);
        cur_retract = store.parent_of(&cur_retract)?;
        cur_enact = store.parent_of(&cur_enact)?;
    }

    enacted.reverse();

    Some(TreeRoute {
        ancestor: cur_retract,
        enacted,
        retracted,
    })
}
