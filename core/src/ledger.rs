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

use ikey::Public;
use itypes::Ink;

/// Per-identity ink balances. Stored signed: the retract half of a
/// reconciliation may dip an account below zero before the enact half
/// restores it, but every balance settles non-negative.
#[derive(Clone, Debug, PartialEq)]
pub struct InkLedger {
    balances: HashMap<Public, i64>,
}

impl InkLedger {
    pub fn new() -> Self {
        InkLedger {
            balances: HashMap::new(),
        }
    }

    pub fn credit(&mut self, who: &Public, amount: Ink) {
        self.adjust(who, amount as i64);
    }

    pub fn debit(&mut self, who: &Public, amount: Ink) {
        self.adjust(who, -(amount as i64));
    }

    /// Zeroed accounts are dropped so ledgers that went through inverse
    /// updates compare equal to ones that never saw the identity.
    fn adjust(&mut self, who: &Public, delta: i64) {
        let value = self.balances.entry(*who).or_insert(0);
        *value += delta;
        if *value == 0 {
            self.balances.remove(who);
        }
    }

    pub fn balance(&self, who: &Public) -> Ink {
        let value = self.balances.get(who).cloned().unwrap_or(0);
        debug_assert!(value >= 0, "balance of {:?} read mid-reconciliation: {}", who, value);
        value.max(0) as Ink
    }

    /// Every account is non-negative. Holds outside a reconciliation.
    pub fn is_settled(&self) -> bool {
        self.balances.values().all(|value| *value >= 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credit_and_debit() {
        let who = Public::random();
        let mut ledger = InkLedger::new();
        assert_eq!(0, ledger.balance(&who));
        ledger.credit(&who, 50);
        ledger.debit(&who, 20);
        assert_eq!(30, ledger.balance(&who));
        assert!(ledger.is_settled());
    }

    #[test]
    fn transient_negatives_are_visible_to_is_settled() {
        let who = Public::random();
        let mut ledger = InkLedger::new();
        ledger.debit(&who, 10);
        assert!(!ledger.is_settled());
        ledger.credit(&who, 10);
        assert!(ledger.is_settled());
    }
}
