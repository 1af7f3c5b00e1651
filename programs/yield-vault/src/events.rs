use anchor_lang::prelude::*;

use crate::{fees::FeeConfig, state::StrategyCategory};

/// Event emitted when a new vault is initialized
#[event]
pub struct VaultInitialized {
    pub vault: Pubkey,
    pub admin: Pubkey,
    pub recovery_admin: Pubkey,
    pub asset_mint: Pubkey,
    pub share_mint: Pubkey,
    pub timestamp: i64,
}

/// Event emitted when assets are deposited
#[event]
pub struct Deposited {
    pub vault: Pubkey,
    pub user: Pubkey,
    pub asset_amount: u64,
    pub shares_minted: u64,
    pub total_assets: u64,
    pub total_shares: u64,
    pub pps: u128,
    pub timestamp: i64,
}

/// Event emitted when a withdrawal is paid, immediately or from the queue
#[event]
pub struct WithdrawalPaid {
    pub vault: Pubkey,
    pub requester: Pubkey,
    pub receiver: Pubkey,
    /// Queue position, `None` for an immediate payout
    pub sequence_number: Option<u64>,
    pub shares_burned: u64,
    pub gross: u64,
    pub payout: u64,
    pub fee: u64,
    pub timestamp: i64,
}

#[event]
pub struct WithdrawalQueued {
    pub vault: Pubkey,
    pub requester: Pubkey,
    pub receiver: Pubkey,
    pub sequence_number: u64,
    pub share_amount: u64,
    pub min_asset_out: u64,
    pub timestamp: i64,
}

#[event]
pub struct WithdrawalCancelled {
    pub vault: Pubkey,
    pub requester: Pubkey,
    pub sequence_number: u64,
    pub shares_restored: u64,
    pub timestamp: i64,
}

#[event]
pub struct StrategyAdded {
    pub vault: Pubkey,
    pub strategy: Pubkey,
    pub deposit_account: Pubkey,
    pub weight_bps: u16,
    pub category: StrategyCategory,
    pub timestamp: i64,
}

#[event]
pub struct StrategyAllocationSet {
    pub vault: Pubkey,
    pub strategy: Pubkey,
    pub weight_bps: u16,
    pub active: bool,
    pub timestamp: i64,
}

/// Funds were sent to a strategy; it must confirm or refund `op_id`
#[event]
pub struct InvestRequested {
    pub vault: Pubkey,
    pub strategy: Pubkey,
    pub op_id: u64,
    pub amount: u64,
    pub timestamp: i64,
}

/// A strategy is asked to return `amount` against `op_id`
#[event]
pub struct DivestRequested {
    pub vault: Pubkey,
    pub strategy: Pubkey,
    pub op_id: u64,
    pub amount: u64,
    pub timestamp: i64,
}

#[event]
pub struct StrategyConfirmed {
    pub vault: Pubkey,
    pub strategy: Pubkey,
    pub op_id: u64,
    pub amount: u64,
    pub timestamp: i64,
}

#[event]
pub struct StrategyRefunded {
    pub vault: Pubkey,
    pub strategy: Pubkey,
    pub op_id: u64,
    pub amount: u64,
    pub idle_balance: u64,
    pub withdrawals_paid: u32,
    pub timestamp: i64,
}

/// Event emitted for every accepted profit or loss report
#[event]
pub struct Harvested {
    pub vault: Pubkey,
    pub strategy: Pubkey,
    pub keeper: Pubkey,
    pub previous_value: u64,
    pub new_value: u64,
    pub profit: u64,
    pub loss: u64,
    pub performance_fee: u64,
    pub burn_fee: u64,
    pub keeper_bounty: u64,
    pub pps: u128,
    pub timestamp: i64,
}

#[event]
pub struct ProtocolApyUpdated {
    pub vault: Pubkey,
    pub strategy: Pubkey,
    pub apy_bps: u32,
    /// Weights of every registry entry after optimization, in registry order
    pub weights: Vec<u16>,
    pub timestamp: i64,
}

#[event]
pub struct PanicTriggered {
    pub vault: Pubkey,
    pub admin: Pubkey,
    pub op_id: Option<u64>,
    pub superseded_op_id: Option<u64>,
    pub strategies_recalled: u8,
    pub amount_recalled: u64,
    pub timestamp: i64,
}

#[event]
pub struct PauseToggled {
    pub vault: Pubkey,
    pub by: Pubkey,
    pub paused: bool,
    pub timestamp: i64,
}

#[event]
pub struct ProcessingReset {
    pub vault: Pubkey,
    pub by: Pubkey,
    pub cleared_op_id: Option<u64>,
    pub timestamp: i64,
}

#[event]
pub struct MigrationAborted {
    pub vault: Pubkey,
    pub from: Pubkey,
    pub to: Pubkey,
    pub op_id: u64,
    pub returned: u64,
    pub min_amount_out: u64,
    pub timestamp: i64,
}

#[event]
pub struct FeesUpdated {
    pub vault: Pubkey,
    pub fee_config: FeeConfig,
    pub timestamp: i64,
}

#[event]
pub struct FeesCollected {
    pub vault: Pubkey,
    pub admin_amount: u64,
    pub burn_amount: u64,
    pub timestamp: i64,
}

#[event]
pub struct KeeperRewardClaimed {
    pub vault: Pubkey,
    pub keeper: Pubkey,
    pub amount: u64,
    pub timestamp: i64,
}

#[event]
pub struct NovaSinkSet {
    pub vault: Pubkey,
    pub sink: Option<Pubkey>,
    pub timestamp: i64,
}
