//! Player account: point balance, accrual checkpoint and the fixed set of
//! asset lines.
//!
//! Every mutator takes `&mut self` and performs no I/O; time only enters as
//! the block height the host passes in. A failed operation leaves the account
//! exactly as it was.

use crate::asset_line::AssetLine;
use crate::config::EconomyConfig;
use crate::errors::{EconomyError, Result};
use crate::types::{
    AssetCategory, BatchUpgrade, BlockHeight, ClaimPolicy, ClaimReceipt, OwnerId, Points,
    PointsPerBlock, RejectReason, UpgradeOutcome, UpgradeResult,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// One line per category, fixed for the lifetime of the account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetLines {
    crops: AssetLine,
    animals: AssetLine,
    workers: AssetLine,
}

impl AssetLines {
    pub fn new(crops: AssetLine, animals: AssetLine, workers: AssetLine) -> Self {
        Self {
            crops,
            animals,
            workers,
        }
    }

    pub fn get(&self, category: AssetCategory) -> &AssetLine {
        match category {
            AssetCategory::Crops => &self.crops,
            AssetCategory::Animals => &self.animals,
            AssetCategory::Workers => &self.workers,
        }
    }

    pub fn get_mut(&mut self, category: AssetCategory) -> &mut AssetLine {
        match category {
            AssetCategory::Crops => &mut self.crops,
            AssetCategory::Animals => &mut self.animals,
            AssetCategory::Workers => &mut self.workers,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (AssetCategory, &AssetLine)> {
        AssetCategory::ALL
            .into_iter()
            .map(move |category| (category, self.get(category)))
    }
}

/// A player's economy state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    owner_id: OwnerId,
    balance: Points,
    last_claim_time: BlockHeight,
    created_at: BlockHeight,
    claim_policy: ClaimPolicy,
    lines: AssetLines,
}

impl Account {
    /// Create an account seeded with the default farm economy.
    pub fn new(owner_id: impl Into<OwnerId>, creation_time: BlockHeight) -> Self {
        Self::with_config(owner_id, creation_time, &EconomyConfig::default())
    }

    /// Create an account from a host-supplied configuration.
    pub fn with_config(
        owner_id: impl Into<OwnerId>,
        creation_time: BlockHeight,
        config: &EconomyConfig,
    ) -> Self {
        Self {
            owner_id: owner_id.into(),
            balance: 0,
            last_claim_time: creation_time,
            created_at: creation_time,
            claim_policy: config.claim_policy,
            lines: config.build_lines(),
        }
    }

    pub fn owner_id(&self) -> &OwnerId {
        &self.owner_id
    }

    pub fn balance(&self) -> Points {
        self.balance
    }

    pub fn last_claim_time(&self) -> BlockHeight {
        self.last_claim_time
    }

    pub fn created_at(&self) -> BlockHeight {
        self.created_at
    }

    pub fn claim_policy(&self) -> ClaimPolicy {
        self.claim_policy
    }

    pub fn lines(&self) -> &AssetLines {
        &self.lines
    }

    pub fn line(&self, category: AssetCategory) -> &AssetLine {
        self.lines.get(category)
    }

    /// Points all lines would produce over `elapsed` blocks. Pure.
    pub fn projected_accrual(&self, elapsed: u64) -> Result<Points> {
        self.lines.iter().try_fold(0 as Points, |acc, (_, line)| {
            acc.checked_add(line.accrual(elapsed)?)
                .ok_or(EconomyError::Overflow("projected accrual"))
        })
    }

    /// Production per block, in total and per category.
    pub fn points_per_block(&self) -> Result<PointsPerBlock> {
        let mut per_category = Vec::with_capacity(AssetCategory::ALL.len());
        let mut total: Points = 0;
        for (category, line) in self.lines.iter() {
            let points = line.points_per_block()?;
            total = total
                .checked_add(points)
                .ok_or(EconomyError::Overflow("points per block"))?;
            per_category.push((category, points));
        }
        Ok(PointsPerBlock {
            total,
            per_category,
        })
    }

    /// Realize accrual since the last checkpoint into the balance.
    pub fn claim(&mut self, current_time: BlockHeight) -> Result<ClaimReceipt> {
        let Some(elapsed) = current_time.checked_sub(self.last_claim_time) else {
            return self.claim_backwards(current_time);
        };

        let accrued = self.projected_accrual(elapsed)?;
        let balance = self
            .balance
            .checked_add(accrued)
            .ok_or(EconomyError::Overflow("balance after claim"))?;

        self.balance = balance;
        self.last_claim_time = current_time;

        debug!(
            owner = %self.owner_id,
            elapsed,
            accrued,
            balance,
            "claimed accrual"
        );

        Ok(ClaimReceipt {
            elapsed,
            accrued,
            balance,
            checkpoint: current_time,
            clamped: false,
        })
    }

    fn claim_backwards(&self, current_time: BlockHeight) -> Result<ClaimReceipt> {
        match self.claim_policy {
            ClaimPolicy::Reject => {
                warn!(
                    owner = %self.owner_id,
                    last_claim = self.last_claim_time,
                    current = current_time,
                    "rejecting claim with negative elapsed time"
                );
                Err(EconomyError::NegativeElapsedTime {
                    last_claim: self.last_claim_time,
                    current: current_time,
                })
            }
            ClaimPolicy::Clamp => {
                warn!(
                    owner = %self.owner_id,
                    last_claim = self.last_claim_time,
                    current = current_time,
                    "clamping claim with negative elapsed time to zero"
                );
                Ok(ClaimReceipt {
                    elapsed: 0,
                    accrued: 0,
                    balance: self.balance,
                    checkpoint: self.last_claim_time,
                    clamped: true,
                })
            }
        }
    }

    /// Spend points to upgrade one category.
    pub fn upgrade(&mut self, category: AssetCategory) -> Result<UpgradeOutcome> {
        let available = self.balance;
        let line = self.lines.get_mut(category);

        match line.try_upgrade(available)? {
            UpgradeResult::Approved { charged_cost } => {
                // try_upgrade only approves when available >= charged_cost
                self.balance = available - charged_cost;
                let line = self.lines.get(category);
                info!(
                    owner = %self.owner_id,
                    %category,
                    charged_cost,
                    new_rate = line.production_rate(),
                    new_cost = line.upgrade_cost(),
                    "upgraded asset line"
                );
                Ok(UpgradeOutcome::Succeeded {
                    category,
                    charged_cost,
                    new_rate: line.production_rate(),
                    new_cost: line.upgrade_cost(),
                })
            }
            UpgradeResult::Declined { reason } => {
                debug!(
                    owner = %self.owner_id,
                    %category,
                    balance = available,
                    cost = line.upgrade_cost(),
                    "upgrade declined"
                );
                Ok(UpgradeOutcome::Failed { category, reason })
            }
        }
    }

    /// Upgrade a category given by name. Unknown names are rejected without
    /// touching the account.
    pub fn upgrade_by_name(&mut self, name: &str) -> Result<UpgradeOutcome> {
        match name.parse::<AssetCategory>() {
            Ok(category) => self.upgrade(category),
            Err(EconomyError::UnknownCategory(name)) => {
                debug!(owner = %self.owner_id, %name, "upgrade rejected: unknown category");
                Ok(UpgradeOutcome::Rejected {
                    reason: RejectReason::UnknownCategory(name),
                })
            }
            Err(other) => Err(other),
        }
    }

    /// Upgrade one category up to `times` times, stopping at the first decline.
    ///
    /// The batch runs against a staged copy of the line and balance; nothing is
    /// written back unless every step succeeds, so an overflow part way through
    /// leaves the account untouched.
    pub fn upgrade_many(&mut self, category: AssetCategory, times: u32) -> Result<BatchUpgrade> {
        let mut line = self.lines.get(category).clone();
        let mut balance = self.balance;
        let mut performed = 0u32;
        let mut total_charged: Points = 0;

        while performed < times {
            match line.try_upgrade(balance)? {
                UpgradeResult::Approved { charged_cost } => {
                    // Approved only when balance >= charged_cost; the running
                    // total never exceeds the starting balance.
                    balance -= charged_cost;
                    total_charged += charged_cost;
                    performed += 1;
                }
                UpgradeResult::Declined { .. } => break,
            }
        }

        let batch = BatchUpgrade {
            category,
            requested: times,
            performed,
            total_charged,
            final_rate: line.production_rate(),
            final_cost: line.upgrade_cost(),
        };
        *self.lines.get_mut(category) = line;
        self.balance = balance;

        info!(
            owner = %self.owner_id,
            %category,
            requested = times,
            performed,
            total_charged,
            balance,
            "batch upgrade applied"
        );
        Ok(batch)
    }

    pub fn peek_upgrade_cost(&self, category: AssetCategory) -> Points {
        self.lines.get(category).upgrade_cost()
    }

    pub fn peek_upgrade_cost_by_name(&self, name: &str) -> Result<Points> {
        let category = name.parse::<AssetCategory>()?;
        Ok(self.peek_upgrade_cost(category))
    }

    /// Add points unconditionally. Callers gate who may use this.
    pub fn credit_admin(&mut self, amount: Points) -> Result<Points> {
        let balance = self
            .balance
            .checked_add(amount)
            .ok_or(EconomyError::Overflow("balance after admin credit"))?;
        self.balance = balance;
        info!(owner = %self.owner_id, amount, balance, "admin credit applied");
        Ok(balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LineConfig;
    use crate::types::DeclineReason;
    use std::num::NonZeroU64;

    #[test]
    fn fresh_account_starts_at_checkpoint() {
        let account = Account::new("0x123", 2);
        assert_eq!(account.owner_id().as_str(), "0x123");
        assert_eq!(account.balance(), 0);
        assert_eq!(account.last_claim_time(), 2);
        assert_eq!(account.created_at(), 2);
        assert_eq!(account.line(AssetCategory::Crops).quantity(), 1);
        assert_eq!(account.line(AssetCategory::Animals).quantity(), 0);
    }

    #[test]
    fn claim_accrues_crops_only() {
        let mut account = Account::new("0x123", 2);

        let receipt = account.claim(4).unwrap();
        assert_eq!(receipt.elapsed, 2);
        assert_eq!(receipt.accrued, 20_000);
        assert_eq!(account.balance(), 20_000);

        account.claim(10).unwrap();
        assert_eq!(account.balance(), 80_000);
        assert_eq!(account.last_claim_time(), 10);
    }

    #[test]
    fn repeated_claim_at_same_height_is_noop() {
        let mut account = Account::new("0x123", 2);
        account.claim(7).unwrap();
        let receipt = account.claim(7).unwrap();
        assert_eq!(receipt.accrued, 0);
        assert_eq!(account.balance(), 50_000);
    }

    #[test]
    fn backwards_claim_rejected_by_default() {
        let mut account = Account::new("0x123", 10);
        let before = account.clone();

        let err = account.claim(5).unwrap_err();

        assert_eq!(
            err,
            EconomyError::NegativeElapsedTime {
                last_claim: 10,
                current: 5
            }
        );
        assert_eq!(account, before);
    }

    #[test]
    fn backwards_claim_clamped_when_configured() {
        let config = EconomyConfig {
            claim_policy: ClaimPolicy::Clamp,
            ..Default::default()
        };
        let mut account = Account::with_config("0x123", 10, &config);
        account.claim(12).unwrap();

        let receipt = account.claim(11).unwrap();
        assert!(receipt.clamped);
        assert_eq!(receipt.accrued, 0);
        assert_eq!(account.balance(), 20_000);
        assert_eq!(account.last_claim_time(), 12);

        // No block is counted twice after the clamp.
        account.claim(13).unwrap();
        assert_eq!(account.balance(), 30_000);
    }

    #[test]
    fn upgrade_debits_pre_growth_cost() {
        let mut account = Account::new("0x123", 0);
        account.credit_admin(1_500_000).unwrap();

        let outcome = account.upgrade(AssetCategory::Crops).unwrap();

        assert_eq!(
            outcome,
            UpgradeOutcome::Succeeded {
                category: AssetCategory::Crops,
                charged_cost: 1_000_000,
                new_rate: 10_100,
                new_cost: 1_100_000,
            }
        );
        assert_eq!(account.balance(), 500_000);
        assert_eq!(account.peek_upgrade_cost(AssetCategory::Crops), 1_100_000);
        assert_eq!(account.line(AssetCategory::Crops).quantity(), 1);
    }

    #[test]
    fn upgrade_declined_below_cost() {
        let mut account = Account::new("0x123", 2);
        account.credit_admin(920_000).unwrap();
        let before = account.clone();

        let outcome = account.upgrade(AssetCategory::Crops).unwrap();

        assert_eq!(
            outcome,
            UpgradeOutcome::Failed {
                category: AssetCategory::Crops,
                reason: DeclineReason::InsufficientPoints,
            }
        );
        assert_eq!(account, before);
    }

    #[test]
    fn upgrade_by_unknown_name_is_rejected() {
        let mut account = Account::new("0x123", 2);
        account.credit_admin(100_000_000).unwrap();
        let before = account.clone();

        let outcome = account.upgrade_by_name("goats").unwrap();

        assert_eq!(
            outcome,
            UpgradeOutcome::Rejected {
                reason: RejectReason::UnknownCategory("goats".into())
            }
        );
        assert_eq!(account, before);
    }

    #[test]
    fn upgrade_by_name_routes_to_line() {
        let mut account = Account::new("0x123", 2);
        account.credit_admin(10_000_000).unwrap();
        let outcome = account.upgrade_by_name("Animals").unwrap();
        assert!(outcome.is_success());
        assert_eq!(account.balance(), 0);
        assert_eq!(account.peek_upgrade_cost(AssetCategory::Animals), 12_000_000);
    }

    #[test]
    fn peek_by_name_reports_unknown_category() {
        let account = Account::new("0x123", 2);
        assert_eq!(account.peek_upgrade_cost_by_name("workers").unwrap(), 15_000_000);
        assert_eq!(
            account.peek_upgrade_cost_by_name("silos"),
            Err(EconomyError::UnknownCategory("silos".into()))
        );
    }

    #[test]
    fn upgrade_many_stops_at_first_decline() {
        let mut account = Account::new("0x123", 0);
        // 1_000_000 + 1_100_000 + 1_210_000 = 3_310_000
        account.credit_admin(3_400_000).unwrap();

        let batch = account.upgrade_many(AssetCategory::Crops, 5).unwrap();

        assert_eq!(batch.requested, 5);
        assert_eq!(batch.performed, 3);
        assert_eq!(batch.total_charged, 3_310_000);
        assert_eq!(batch.final_cost, 1_331_000);
        assert_eq!(account.balance(), 90_000);
        assert_eq!(account.line(AssetCategory::Crops).level(), 3);
    }

    #[test]
    fn upgrade_many_overflow_leaves_account_untouched() {
        // Rate doubles each step and overflows u128 after 64 upgrades.
        let config = EconomyConfig {
            crops: LineConfig {
                quantity: 1,
                production_rate: u64::MAX,
                rate_growth_divisor: NonZeroU64::MIN,
                upgrade_cost: 1,
                cost_growth_divisor: NonZeroU64::MIN,
            },
            ..Default::default()
        };
        let mut account = Account::with_config("0x123", 0, &config);
        account.credit_admin(1 << 100).unwrap();
        let before = account.clone();

        let err = account.upgrade_many(AssetCategory::Crops, 100).unwrap_err();

        assert_eq!(err, EconomyError::Overflow("production_rate growth"));
        assert_eq!(account, before);
        assert_eq!(account.line(AssetCategory::Crops).level(), 0);
        assert_eq!(account.balance(), 1 << 100);
    }

    #[test]
    fn upgrade_many_zero_times_is_noop() {
        let mut account = Account::new("0x123", 0);
        account.credit_admin(5_000_000).unwrap();
        let before = account.clone();

        let batch = account.upgrade_many(AssetCategory::Crops, 0).unwrap();

        assert_eq!(batch.performed, 0);
        assert_eq!(batch.total_charged, 0);
        assert_eq!(account, before);
    }

    #[test]
    fn points_per_block_breaks_down_by_category() {
        let account = Account::new("0x123", 0);
        let ppb = account.points_per_block().unwrap();
        assert_eq!(ppb.total, 10_000);
        assert_eq!(ppb.for_category(AssetCategory::Crops), 10_000);
        assert_eq!(ppb.for_category(AssetCategory::Workers), 0);
        assert_eq!(ppb.per_category.len(), 3);
    }

    #[test]
    fn credit_overflow_leaves_balance() {
        let mut account = Account::new("0x123", 0);
        account.credit_admin(Points::MAX).unwrap();
        assert_eq!(
            account.credit_admin(1),
            Err(EconomyError::Overflow("balance after admin credit"))
        );
        assert_eq!(account.balance(), Points::MAX);
    }

    #[test]
    fn claim_overflow_leaves_checkpoint() {
        let mut account = Account::new("0x123", 0);
        account.credit_admin(Points::MAX - 5).unwrap();
        let before = account.clone();

        let err = account.claim(1).unwrap_err();

        assert_eq!(err, EconomyError::Overflow("balance after claim"));
        assert_eq!(account, before);
    }

    #[test]
    fn default_account_matches_default_config() {
        let from_config = Account::with_config("0x123", 3, &EconomyConfig::default());
        assert_eq!(Account::new("0x123", 3), from_config);
    }
}
