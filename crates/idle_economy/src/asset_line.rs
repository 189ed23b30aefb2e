//! Single production line: rate, cost and the floor-division growth curve.
//!
//! An upgrade grows both values by `value / divisor` (integer floor), so a
//! divisor of 1 doubles the value, 10 adds 10%, 100 adds 1%.

use crate::errors::EconomyError;
use crate::types::{DeclineReason, Points, UpgradeResult};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU128;

/// One upgradeable production category owned by an account.
///
/// Upgrading raises `production_rate` and `upgrade_cost` but leaves `quantity`
/// alone. Units are never bought through an upgrade; whether quantity should
/// grow is left to the host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetLine {
    quantity: u64,
    production_rate: Points,
    rate_growth_divisor: NonZeroU128,
    upgrade_cost: Points,
    cost_growth_divisor: NonZeroU128,
    level: u32,
}

impl AssetLine {
    pub fn new(
        quantity: u64,
        production_rate: Points,
        rate_growth_divisor: NonZeroU128,
        upgrade_cost: Points,
        cost_growth_divisor: NonZeroU128,
    ) -> Self {
        Self {
            quantity,
            production_rate,
            rate_growth_divisor,
            upgrade_cost,
            cost_growth_divisor,
            level: 0,
        }
    }

    /// Build a line from raw divisors, rejecting zeros.
    pub fn try_new(
        quantity: u64,
        production_rate: Points,
        rate_growth_divisor: Points,
        upgrade_cost: Points,
        cost_growth_divisor: Points,
    ) -> Result<Self, EconomyError> {
        let rate_div = NonZeroU128::new(rate_growth_divisor)
            .ok_or(EconomyError::InvalidParameter("rate_growth_divisor must be positive"))?;
        let cost_div = NonZeroU128::new(cost_growth_divisor)
            .ok_or(EconomyError::InvalidParameter("cost_growth_divisor must be positive"))?;
        Ok(Self::new(
            quantity,
            production_rate,
            rate_div,
            upgrade_cost,
            cost_div,
        ))
    }

    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    pub fn production_rate(&self) -> Points {
        self.production_rate
    }

    pub fn rate_growth_divisor(&self) -> NonZeroU128 {
        self.rate_growth_divisor
    }

    pub fn upgrade_cost(&self) -> Points {
        self.upgrade_cost
    }

    pub fn cost_growth_divisor(&self) -> NonZeroU128 {
        self.cost_growth_divisor
    }

    /// Number of successful upgrades applied to this line.
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Points this line yields per block: `quantity * production_rate`.
    pub fn points_per_block(&self) -> Result<Points, EconomyError> {
        (self.quantity as Points)
            .checked_mul(self.production_rate)
            .ok_or(EconomyError::Overflow("line points per block"))
    }

    /// Points this line yields over `elapsed` blocks.
    pub fn accrual(&self, elapsed: u64) -> Result<Points, EconomyError> {
        self.points_per_block()?
            .checked_mul(elapsed as Points)
            .ok_or(EconomyError::Overflow("line accrual"))
    }

    /// Attempt one upgrade against `available` points.
    ///
    /// Declines without touching the line when `available` is below the
    /// current cost. On approval the returned `charged_cost` is the cost
    /// before growth; the caller is responsible for debiting it.
    pub fn try_upgrade(&mut self, available: Points) -> Result<UpgradeResult, EconomyError> {
        if available < self.upgrade_cost {
            return Ok(UpgradeResult::Declined {
                reason: DeclineReason::InsufficientPoints,
            });
        }

        let charged_cost = self.upgrade_cost;
        let next_rate = grow(self.production_rate, self.rate_growth_divisor)
            .ok_or(EconomyError::Overflow("production_rate growth"))?;
        let next_cost = grow(self.upgrade_cost, self.cost_growth_divisor)
            .ok_or(EconomyError::Overflow("upgrade_cost growth"))?;

        self.production_rate = next_rate;
        self.upgrade_cost = next_cost;
        self.level = self.level.saturating_add(1);

        Ok(UpgradeResult::Approved { charged_cost })
    }
}

/// `value + floor(value / divisor)`, or `None` on overflow.
pub fn grow(value: Points, divisor: NonZeroU128) -> Option<Points> {
    value.checked_add(value / divisor.get())
}
