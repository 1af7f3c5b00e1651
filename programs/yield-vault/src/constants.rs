// Constants for the Yield Vault program

/// Seed for vault state PDA
pub const VAULT_SEED: &[u8] = b"vault";

/// Seed for share mint PDA
pub const SHARE_MINT_SEED: &[u8] = b"shares";

/// Seed for vault authority PDA (owns the asset token account, mints shares)
pub const VAULT_AUTHORITY_SEED: &[u8] = b"vault_authority";

/// Seed for the strategy registry PDA
pub const STRATEGY_REGISTRY_SEED: &[u8] = b"strategy_registry";

/// Seed for the withdrawal queue PDA
pub const WITHDRAWAL_QUEUE_SEED: &[u8] = b"withdrawal_queue";

/// Seed for per-keeper reward PDAs
pub const KEEPER_REWARD_SEED: &[u8] = b"keeper_reward";

/// Fixed-point scale for price-per-share
pub const PPS_PRECISION: u128 = 1_000_000_000_000;

/// Basis point denominator
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Hard cap on a single strategy's weight after APY optimization (60%)
pub const MAX_STRATEGY_WEIGHT_BPS: u16 = 6_000;

/// Largest APY a strategy may report (500%)
pub const MAX_APY_BPS: u32 = 50_000;

/// Maximum profit a single report may claim, relative to invested balance (50%)
pub const MAX_PROFIT_REPORT_BPS: u64 = 5_000;

/// Ceiling for performance and burn fees
pub const MAX_PROFIT_FEE_BPS: u16 = 3_000;

/// Ceiling for the withdrawal fee
pub const MAX_WITHDRAWAL_FEE_BPS: u16 = 500;

/// Ceiling for the keeper bounty
pub const MAX_KEEPER_BOUNTY_BPS: u16 = 1_000;

/// Minimum spacing between two profit reports from the same strategy
pub const HARVEST_COOLDOWN_SECS: i64 = 3_600;

/// Keeper bounties unlock this long after the keeper's last harvest
pub const KEEPER_CLAIM_LOCK_SECS: i64 = 7 * 24 * 3_600;

/// Deltas at or below this amount are left alone by rebalancing
pub const MIN_REBALANCE_AMOUNT: u64 = 1_000;

/// Queue entries examined when a strategy refund drains the queue (covers a full queue)
pub const AUTO_DRAIN_LIMIT: u8 = 50;

/// Registry capacity
pub const MAX_STRATEGIES: usize = 10;

/// Withdrawal queue capacity
pub const MAX_QUEUED_WITHDRAWALS: usize = 32;

/// Space for VaultState account (8 discriminator + 3 * 32 roles + 32 asset_mint +
/// 32 share_mint + 8 total_shares + 8 idle_balance + 2 flags +
/// (1 + 8 + 1 + 32 + 8 + 33 + 8 + 1) pending + 8 next_operation_id +
/// 6 fee_config + 2 keeper_bounty_bps + 33 nova_sink + 3 * 8 accrued +
/// 8 last_harvest + 3 bumps + 128 padding)
pub const VAULT_STATE_SIZE: usize = 8
    + 32 * 3
    + 32
    + 32
    + 8
    + 8
    + 2
    + (1 + 8 + 1 + 32 + 8 + 33 + 8 + 1)
    + 8
    + 6
    + 2
    + 33
    + 8 * 3
    + 8
    + 3
    + 128;
