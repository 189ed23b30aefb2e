//! In-memory player registry
//!
//! Host-side table of accounts keyed by owner, with an admin identity that
//! gates player removal and point injection. Accounts themselves never check
//! privilege; this layer does.

use crate::account::Account;
use crate::config::EconomyConfig;
use crate::errors::{EconomyError, Result};
use crate::types::{AssetCategory, BlockHeight, ClaimReceipt, OwnerId, Points, UpgradeOutcome};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerRegistry {
    admin: OwnerId,
    config: EconomyConfig,
    players: BTreeMap<OwnerId, Account>,
}

impl PlayerRegistry {
    /// Create a registry with the default economy.
    pub fn new(admin: impl Into<OwnerId>) -> Self {
        Self {
            admin: admin.into(),
            config: EconomyConfig::default(),
            players: BTreeMap::new(),
        }
    }

    /// Create a registry with a custom economy. Idle configurations are
    /// logged but accepted.
    pub fn with_config(admin: impl Into<OwnerId>, config: EconomyConfig) -> Self {
        for warning in config.warnings() {
            warn!("{warning}");
        }
        Self {
            admin: admin.into(),
            config,
            players: BTreeMap::new(),
        }
    }

    pub fn admin(&self) -> &OwnerId {
        &self.admin
    }

    pub fn config(&self) -> &EconomyConfig {
        &self.config
    }

    /// Names of every upgradeable category.
    pub fn categories(&self) -> Vec<&'static str> {
        AssetCategory::ALL.iter().map(|c| c.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.players.values()
    }

    /// Register a new player at `height`.
    pub fn start(&mut self, owner: impl Into<OwnerId>, height: BlockHeight) -> Result<&Account> {
        let owner = owner.into();
        if self.players.contains_key(&owner) {
            return Err(EconomyError::PlayerAlreadyExists { owner });
        }

        let account = Account::with_config(owner.clone(), height, &self.config);
        info!(%owner, height, "player started");
        Ok(self.players.entry(owner).or_insert(account))
    }

    pub fn account(&self, owner: &OwnerId) -> Result<&Account> {
        self.players
            .get(owner)
            .ok_or_else(|| EconomyError::PlayerNotFound {
                owner: owner.clone(),
            })
    }

    pub fn account_mut(&mut self, owner: &OwnerId) -> Result<&mut Account> {
        self.players
            .get_mut(owner)
            .ok_or_else(|| EconomyError::PlayerNotFound {
                owner: owner.clone(),
            })
    }

    pub fn claim(&mut self, owner: &OwnerId, height: BlockHeight) -> Result<ClaimReceipt> {
        self.account_mut(owner)?.claim(height)
    }

    pub fn upgrade(&mut self, owner: &OwnerId, category: &str) -> Result<UpgradeOutcome> {
        self.account_mut(owner)?.upgrade_by_name(category)
    }

    /// Remove a player. Admin only.
    pub fn remove_player(&mut self, caller: &OwnerId, owner: &OwnerId) -> Result<Account> {
        self.ensure_admin(caller)?;
        let account = self
            .players
            .remove(owner)
            .ok_or_else(|| EconomyError::PlayerNotFound {
                owner: owner.clone(),
            })?;
        info!(%owner, "player removed");
        Ok(account)
    }

    /// Credit points to a player. Admin only. Returns the new balance.
    pub fn add_funds(
        &mut self,
        caller: &OwnerId,
        owner: &OwnerId,
        amount: Points,
    ) -> Result<Points> {
        self.ensure_admin(caller)?;
        self.account_mut(owner)?.credit_admin(amount)
    }

    fn ensure_admin(&self, caller: &OwnerId) -> Result<()> {
        if *caller != self.admin {
            warn!(%caller, "unauthorized admin call");
            return Err(EconomyError::Unauthorized {
                caller: caller.clone(),
            });
        }
        Ok(())
    }
}
