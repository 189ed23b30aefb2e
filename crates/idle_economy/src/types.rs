//! Core types for the idle farm economy
//!
//! Defines point amounts, block heights, owner identifiers and the closed set of
//! asset categories every account holds.

use crate::errors::EconomyError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Point amount. Accrual and upgrade costs are whole points.
pub type Points = u128;

/// Block height supplied by the host clock.
pub type BlockHeight = u64;

/// Opaque account owner identifier (an address, a handle, anything the host uses).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OwnerId(pub String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OwnerId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for OwnerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Production categories. The set is closed: every account owns exactly one
/// line per variant for its whole lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetCategory {
    Crops,
    Animals,
    Workers,
}

impl AssetCategory {
    /// All categories in iteration order.
    pub const ALL: [AssetCategory; 3] = [
        AssetCategory::Crops,
        AssetCategory::Animals,
        AssetCategory::Workers,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetCategory::Crops => "crops",
            AssetCategory::Animals => "animals",
            AssetCategory::Workers => "workers",
        }
    }
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetCategory {
    type Err = EconomyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        AssetCategory::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| EconomyError::UnknownCategory(name.to_string()))
    }
}

/// How `claim` treats a block height earlier than the last checkpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimPolicy {
    /// Fail with `NegativeElapsedTime` and leave the account untouched.
    #[default]
    Reject,
    /// Accrue nothing and keep the existing checkpoint.
    Clamp,
}

/// Why an upgrade was declined by the line itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeclineReason {
    InsufficientPoints,
}

/// Why an upgrade request was refused before reaching any line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    UnknownCategory(String),
}

/// Result of `AssetLine::try_upgrade`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpgradeResult {
    /// The line advanced; `charged_cost` is the cost before the upgrade.
    Approved { charged_cost: Points },
    Declined { reason: DeclineReason },
}

/// Result of `Account::upgrade`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpgradeOutcome {
    Succeeded {
        category: AssetCategory,
        charged_cost: Points,
        new_rate: Points,
        new_cost: Points,
    },
    Failed {
        category: AssetCategory,
        reason: DeclineReason,
    },
    Rejected {
        reason: RejectReason,
    },
}

impl UpgradeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, UpgradeOutcome::Succeeded { .. })
    }

    /// Points removed from the balance by this outcome.
    pub fn charged(&self) -> Points {
        match self {
            UpgradeOutcome::Succeeded { charged_cost, .. } => *charged_cost,
            _ => 0,
        }
    }
}

/// What a `claim` call realized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimReceipt {
    pub elapsed: u64,
    pub accrued: Points,
    pub balance: Points,
    pub checkpoint: BlockHeight,
    /// Set when a backwards height was clamped to zero accrual.
    pub clamped: bool,
}

/// Summary of a repeated upgrade request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchUpgrade {
    pub category: AssetCategory,
    pub requested: u32,
    pub performed: u32,
    pub total_charged: Points,
    pub final_rate: Points,
    pub final_cost: Points,
}

/// Production per block, in total and per category.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsPerBlock {
    pub total: Points,
    pub per_category: Vec<(AssetCategory, Points)>,
}

impl PointsPerBlock {
    pub fn for_category(&self, category: AssetCategory) -> Points {
        self.per_category
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, points)| *points)
            .unwrap_or(0)
    }
}
