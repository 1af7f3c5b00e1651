use anchor_lang::prelude::*;

use crate::{constants::*, errors::VaultError};

/// Bounty accrued by a keeper for triggering harvests
#[account]
pub struct KeeperReward {
    pub vault: Pubkey,

    pub keeper: Pubkey,

    pub accrued: u64,

    /// Last harvest this keeper was credited for; starts the claim lock
    pub last_harvest: i64,

    pub bump: u8,
}

impl KeeperReward {
    pub const SPACE: usize = 8 + 32 + 32 + 8 + 8 + 1;

    pub fn credit(&mut self, amount: u64, now: i64) -> Result<()> {
        self.accrued = self
            .accrued
            .checked_add(amount)
            .ok_or(VaultError::MathOverflow)?;
        self.last_harvest = now;
        Ok(())
    }

    /// Amount claimable at `now`; fails while the lock is running
    pub fn claimable(&self, now: i64) -> Result<u64> {
        require!(self.accrued > 0, VaultError::NothingToClaim);
        require!(
            now >= self.last_harvest.saturating_add(KEEPER_CLAIM_LOCK_SECS),
            VaultError::ClaimLockActive
        );
        Ok(self.accrued)
    }
}
