//! The economy ledger - money, lives, and the wave counter.
//!
//! Single source of truth for spending, rewards, and leaks. The ledger is
//! pure state: it reports `out_of_lives` but the driving loop decides when
//! the run is over.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A spend was rejected because the player cannot afford it.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("insufficient funds: need {needed}, have {available}")]
pub struct InsufficientFunds {
    pub needed: u32,
    pub available: u32,
}

/// Money, lives, and the current wave number.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    money: u32,
    lives: i32,
    wave: u32,
}

impl Ledger {
    pub fn new(money: u32, lives: i32) -> Self {
        Self {
            money,
            lives,
            wave: 0,
        }
    }

    pub fn money(&self) -> u32 {
        self.money
    }

    pub fn lives(&self) -> i32 {
        self.lives
    }

    pub fn wave(&self) -> u32 {
        self.wave
    }

    /// Deduct `amount`, or reject without touching any state.
    pub fn spend(&mut self, amount: u32) -> Result<(), InsufficientFunds> {
        if amount > self.money {
            return Err(InsufficientFunds {
                needed: amount,
                available: self.money,
            });
        }
        self.money -= amount;
        Ok(())
    }

    /// Add a reward or refund. Always succeeds.
    pub fn credit(&mut self, amount: u32) {
        self.money = self.money.saturating_add(amount);
    }

    /// An enemy leaked off the end of the path.
    pub fn lose_life(&mut self) {
        self.lives -= 1;
    }

    pub fn out_of_lives(&self) -> bool {
        self.lives <= 0
    }

    /// Increment the wave counter and return the new wave number.
    /// Called exactly once per Idle -> Spawning transition, before the first
    /// enemy of the wave spawns.
    pub fn advance_wave(&mut self) -> u32 {
        self.wave += 1;
        self.wave
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_spend_within_budget() {
        let mut ledger = Ledger::new(100, 10);
        assert!(ledger.spend(60).is_ok());
        assert_eq!(ledger.money(), 40);
    }

    #[test]
    fn test_rejected_spend_leaves_money_untouched() {
        let mut ledger = Ledger::new(40, 10);
        let err = ledger.spend(50).unwrap_err();
        assert_eq!(
            err,
            InsufficientFunds {
                needed: 50,
                available: 40
            }
        );
        assert_eq!(ledger.money(), 40);
    }

    #[test]
    fn test_lives_and_game_over_threshold() {
        let mut ledger = Ledger::new(0, 2);
        assert!(!ledger.out_of_lives());
        ledger.lose_life();
        ledger.lose_life();
        assert!(ledger.out_of_lives());
    }

    #[test]
    fn test_wave_counter_increments_once_per_call() {
        let mut ledger = Ledger::new(0, 10);
        assert_eq!(ledger.advance_wave(), 1);
        assert_eq!(ledger.advance_wave(), 2);
        assert_eq!(ledger.wave(), 2);
    }

    proptest! {
        /// Money never goes negative and accounting stays exact across any
        /// interleaving of credits and (possibly rejected) spends.
        #[test]
        fn prop_money_accounting_is_exact(
            start in 0u32..10_000,
            ops in prop::collection::vec((0u32..2_000, prop::bool::ANY), 0..64),
        ) {
            let mut ledger = Ledger::new(start, 10);
            let mut expected = i64::from(start);
            for (amount, is_credit) in ops {
                if is_credit {
                    ledger.credit(amount);
                    expected += i64::from(amount);
                } else if ledger.spend(amount).is_ok() {
                    expected -= i64::from(amount);
                }
                prop_assert!(expected >= 0);
                prop_assert_eq!(i64::from(ledger.money()), expected);
            }
        }
    }
}
