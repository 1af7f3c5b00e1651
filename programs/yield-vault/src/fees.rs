use anchor_lang::prelude::*;

use crate::{constants::*, errors::VaultError};

/// Fee schedule applied to profit reports and withdrawals, in basis points
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeeConfig {
    /// Share of reported profit routed to the admin
    pub performance_bps: u16,

    /// Share of reported profit routed to the burn sink
    pub burn_bps: u16,

    /// Share of every withdrawal routed to the admin
    pub withdrawal_bps: u16,
}

impl FeeConfig {
    pub const SIZE: usize = 2 + 2 + 2;

    pub fn validate(&self) -> Result<()> {
        require!(
            self.performance_bps <= MAX_PROFIT_FEE_BPS
                && self.burn_bps <= MAX_PROFIT_FEE_BPS
                && self.withdrawal_bps <= MAX_WITHDRAWAL_FEE_BPS,
            VaultError::InvalidFeeConfig
        );
        Ok(())
    }
}

/// How a single profit report is divided
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProfitSplit {
    pub performance_fee: u64,
    pub burn_fee: u64,
    pub keeper_bounty: u64,
    /// What is left for share holders
    pub to_holders: u64,
}

impl ProfitSplit {
    /// Everything that leaves the share holders' pool
    pub fn total_fees(&self) -> u64 {
        self.performance_fee + self.burn_fee + self.keeper_bounty
    }
}

/// How a single withdrawal is divided
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WithdrawalSplit {
    pub payout: u64,
    pub fee: u64,
}

/// `amount * bps / 10000`, floored
pub fn bps_of(amount: u64, bps: u16) -> Result<u64> {
    let value = (amount as u128)
        .checked_mul(bps as u128)
        .ok_or(error!(VaultError::MathOverflow))?
        / BPS_DENOMINATOR as u128;

    u64::try_from(value).map_err(|_| error!(VaultError::MathOverflow))
}

/// Split a realised profit into fees and the holders' remainder.
///
/// Each fee is floored independently; the rounding dust stays with holders.
pub fn split_profit(profit: u64, config: &FeeConfig, keeper_bounty_bps: u16) -> Result<ProfitSplit> {
    let performance_fee = bps_of(profit, config.performance_bps)?;
    let burn_fee = bps_of(profit, config.burn_bps)?;
    let keeper_bounty = bps_of(profit, keeper_bounty_bps)?;

    let to_holders = profit
        .checked_sub(performance_fee)
        .and_then(|v| v.checked_sub(burn_fee))
        .and_then(|v| v.checked_sub(keeper_bounty))
        .ok_or(error!(VaultError::MathOverflow))?;

    Ok(ProfitSplit {
        performance_fee,
        burn_fee,
        keeper_bounty,
        to_holders,
    })
}

/// Split a gross withdrawal into the user's payout and the admin's fee
pub fn split_withdrawal(gross: u64, withdrawal_bps: u16) -> Result<WithdrawalSplit> {
    let fee = bps_of(gross, withdrawal_bps)?;
    Ok(WithdrawalSplit {
        payout: gross - fee,
        fee,
    })
}
