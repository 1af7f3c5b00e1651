use anchor_lang::prelude::*;

use crate::{
    constants::*,
    errors::VaultError,
    fees::{split_withdrawal, FeeConfig, WithdrawalSplit},
};

/// Kind of strategy interaction currently in flight
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperationKind {
    Invest,
    Divest,
    Migrate,
    Panic,
}

/// Correlation record for the single outstanding strategy interaction
///
/// Lives inside `VaultState` only while `processing` is set. A reply must
/// carry `id`, so each record is consumed at most once.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingOperation {
    pub id: u64,
    pub kind: OperationKind,
    /// Strategy expected to reply (unused for `Panic`)
    pub strategy: Pubkey,
    pub amount: u64,
    /// Destination of a migration
    pub migrate_to: Option<Pubkey>,
    pub min_amount_out: u64,
    /// Refunds still expected by a `Panic`
    pub outstanding: u8,
}

impl PendingOperation {
    pub fn new(kind: OperationKind, strategy: Pubkey, amount: u64) -> Self {
        Self {
            id: 0,
            kind,
            strategy,
            amount,
            migrate_to: None,
            min_amount_out: 0,
            outstanding: 0,
        }
    }

    pub fn with_migration(mut self, to: Pubkey, min_amount_out: u64) -> Self {
        self.migrate_to = Some(to);
        self.min_amount_out = min_amount_out;
        self
    }

    pub fn with_outstanding(mut self, outstanding: u8) -> Self {
        self.outstanding = outstanding;
        self
    }

    /// Whether this operation has funds moving to or from `strategy`
    pub fn involves(&self, strategy: &Pubkey) -> bool {
        self.strategy == *strategy || self.migrate_to.as_ref() == Some(strategy)
    }
}

/// Global vault state: accounting, lock and configuration
///
/// Security considerations:
/// - Roles stored in state (not instruction args)
/// - Fees and bounties are booked as liabilities and never count towards PPS
/// - Bumps stored for efficient PDA signing
/// - 128 bytes padding for future upgrades
#[account]
pub struct VaultState {
    /// Configures the vault and receives admin fees
    pub admin: Pubkey,

    /// May pause deposits and force-unlock a stuck operation
    pub recovery_admin: Pubkey,

    /// May push APY updates alongside the admin
    pub apy_oracle: Pubkey,

    /// Mint of the underlying asset token
    pub asset_mint: Pubkey,

    /// Mint of the vault share token
    pub share_mint: Pubkey,

    /// Shares outstanding, including burned-but-unpaid queued shares
    pub total_shares: u64,

    /// Assets held in the vault token account
    pub idle_balance: u64,

    /// Deposits disabled
    pub paused: bool,

    /// A strategy interaction is awaiting its reply
    pub processing: bool,

    pub pending: Option<PendingOperation>,

    pub next_operation_id: u64,

    pub fee_config: FeeConfig,

    pub keeper_bounty_bps: u16,

    /// Token account receiving burn fees from Nova-category strategies
    pub nova_sink: Option<Pubkey>,

    pub accrued_admin_fees: u64,

    pub accrued_burn_fees: u64,

    pub accrued_keeper_rewards: u64,

    /// Timestamp of the most recent accepted profit report
    pub last_harvest: i64,

    /// Bump seed for vault state PDA
    pub bump: u8,

    /// Bump seed for share mint PDA
    pub share_bump: u8,

    /// Bump seed for vault authority PDA
    pub authority_bump: u8,

    // Padding for future upgrades
    pub _reserved: [u8; 128],
}

impl VaultState {
    /// Fees and bounties owed but not yet paid out of the idle balance
    pub fn liabilities(&self) -> Result<u64> {
        self.accrued_admin_fees
            .checked_add(self.accrued_burn_fees)
            .and_then(|v| v.checked_add(self.accrued_keeper_rewards))
            .ok_or(error!(VaultError::MathOverflow))
    }

    /// Idle assets that belong to share holders
    pub fn available_liquidity(&self) -> Result<u64> {
        Ok(self.idle_balance.saturating_sub(self.liabilities()?))
    }

    /// Assets missing from idle before `amount` could be paid without touching liabilities
    pub fn liquidity_shortfall(&self, amount: u64) -> Result<u64> {
        Ok(amount
            .checked_add(self.liabilities()?)
            .ok_or(error!(VaultError::MathOverflow))?
            .saturating_sub(self.idle_balance))
    }

    /// Net assets backing the shares: idle + invested - liabilities
    pub fn total_assets(&self, total_invested: u64) -> Result<u64> {
        Ok(self
            .idle_balance
            .checked_add(total_invested)
            .ok_or(error!(VaultError::MathOverflow))?
            .saturating_sub(self.liabilities()?))
    }

    /// Calculate shares to mint for a given asset amount
    ///
    /// - No shares outstanding: 1:1, which pins PPS at `PPS_PRECISION`
    /// - Otherwise: assets * total_shares / total_assets, floored
    pub fn shares_for_deposit(&self, assets: u64, total_assets: u64) -> Result<u64> {
        if self.total_shares == 0 {
            return Ok(assets);
        }
        require!(total_assets > 0, VaultError::DivisionByZero);

        let shares = (assets as u128)
            .checked_mul(self.total_shares as u128)
            .ok_or(error!(VaultError::MathOverflow))?
            / total_assets as u128;

        u64::try_from(shares).map_err(|_| error!(VaultError::MathOverflow))
    }

    /// Asset value of shares: shares * total_assets / total_shares, floored
    pub fn assets_for_shares(&self, shares: u64, total_assets: u64) -> Result<u64> {
        if self.total_shares == 0 {
            return Ok(0);
        }

        let assets = (shares as u128)
            .checked_mul(total_assets as u128)
            .ok_or(error!(VaultError::MathOverflow))?
            .checked_div(self.total_shares as u128)
            .ok_or(error!(VaultError::DivisionByZero))?;

        u64::try_from(assets).map_err(|_| error!(VaultError::MathOverflow))
    }

    /// Price per share scaled by `PPS_PRECISION`
    pub fn current_pps(&self, total_assets: u64) -> Result<u128> {
        if self.total_shares == 0 {
            return Ok(PPS_PRECISION);
        }

        (total_assets as u128)
            .checked_mul(PPS_PRECISION)
            .ok_or(error!(VaultError::MathOverflow))?
            .checked_div(self.total_shares as u128)
            .ok_or(error!(VaultError::DivisionByZero))
    }

    /// Book a deposit: assets land in idle, shares are issued
    pub fn record_deposit(&mut self, assets: u64, shares: u64) -> Result<()> {
        self.idle_balance = self
            .idle_balance
            .checked_add(assets)
            .ok_or(VaultError::MathOverflow)?;
        self.total_shares = self
            .total_shares
            .checked_add(shares)
            .ok_or(VaultError::MathOverflow)?;
        Ok(())
    }

    /// Value `shares` at the current price and split off the withdrawal fee
    pub fn quote_withdrawal(&self, shares: u64, total_assets: u64) -> Result<(u64, WithdrawalSplit)> {
        let gross = self.assets_for_shares(shares, total_assets)?;
        let split = split_withdrawal(gross, self.fee_config.withdrawal_bps)?;
        Ok((gross, split))
    }

    /// Retire `shares` worth `gross`: the payout leaves idle, the fee stays as an admin liability
    pub fn apply_withdrawal(&mut self, shares: u64, gross: u64, split: &WithdrawalSplit) -> Result<()> {
        require!(gross <= self.available_liquidity()?, VaultError::InsufficientLiquidity);

        self.total_shares = self
            .total_shares
            .checked_sub(shares)
            .ok_or(VaultError::MathOverflow)?;
        self.idle_balance = self
            .idle_balance
            .checked_sub(split.payout)
            .ok_or(VaultError::MathOverflow)?;
        self.accrued_admin_fees = self
            .accrued_admin_fees
            .checked_add(split.fee)
            .ok_or(VaultError::MathOverflow)?;
        Ok(())
    }

    /// Admin and burn fees payable now.
    ///
    /// Admin fees come first. Burn fees are only payable with a sink to
    /// receive them. Both are bounded by idle, never by invested funds.
    pub fn collectable_fees(&self, with_sink: bool) -> (u64, u64) {
        let admin_amount = self.accrued_admin_fees.min(self.idle_balance);
        let burn_amount = if with_sink {
            self.accrued_burn_fees
                .min(self.idle_balance.saturating_sub(admin_amount))
        } else {
            0
        };
        (admin_amount, burn_amount)
    }

    /// Pay out collected fees from idle
    pub fn record_fee_collection(&mut self, admin_amount: u64, burn_amount: u64) -> Result<()> {
        self.accrued_admin_fees = self
            .accrued_admin_fees
            .checked_sub(admin_amount)
            .ok_or(VaultError::MathOverflow)?;
        self.accrued_burn_fees = self
            .accrued_burn_fees
            .checked_sub(burn_amount)
            .ok_or(VaultError::MathOverflow)?;
        self.idle_balance = admin_amount
            .checked_add(burn_amount)
            .and_then(|paid| self.idle_balance.checked_sub(paid))
            .ok_or(VaultError::MathOverflow)?;
        Ok(())
    }

    /// Fail fast if a strategy interaction is in flight
    pub fn ensure_not_processing(&self) -> Result<()> {
        require!(!self.processing, VaultError::AlreadyProcessing);
        Ok(())
    }

    /// Acquire the single-flight lock for `operation`, assigning it a fresh id
    pub fn begin_operation(&mut self, mut operation: PendingOperation) -> Result<PendingOperation> {
        self.ensure_not_processing()?;

        operation.id = self.next_operation_id;
        self.next_operation_id = self
            .next_operation_id
            .checked_add(1)
            .ok_or(VaultError::MathOverflow)?;
        self.pending = Some(operation);
        self.processing = true;
        Ok(operation)
    }

    /// The pending record a reply with `op_id` must match
    pub fn pending_for_reply(&self, op_id: u64) -> Result<PendingOperation> {
        match self.pending {
            Some(pending) if self.processing && pending.id == op_id => Ok(pending),
            _ => err!(VaultError::UnexpectedReply),
        }
    }

    /// Release the lock after a matching reply
    pub fn finish_operation(&mut self) {
        self.pending = None;
        self.processing = false;
    }

    /// Administrative override: clears the lock without reconciling balances
    pub fn force_unlock(&mut self) -> Option<PendingOperation> {
        self.processing = false;
        self.pending.take()
    }

    pub fn is_admin_or_recovery(&self, key: &Pubkey) -> bool {
        *key == self.admin || *key == self.recovery_admin
    }
}
