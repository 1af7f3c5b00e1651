// Yield Vault - multi-strategy yield aggregator on Solana
// Security: single-flight strategy settlement, fees booked as liabilities, bounded profit reports
// Architecture: Orchestrator program + strategy registry + FIFO withdrawal queue

use anchor_lang::prelude::*;

pub mod allocation;
pub mod constants;
pub mod errors;
pub mod events;
pub mod fees;
pub mod instructions;
pub mod state;
pub mod transfers;

use fees::FeeConfig;
use instructions::*;
use state::StrategyCategory;

declare_id!("CYJ9kEfqj4aZSYMmYhgmAndKV3sfTZXuDj3DN2Ci1PRg");

#[program]
pub mod yield_vault {
    use super::*;

    /// Initialize a new vault for a given asset token
    ///
    /// Security considerations:
    /// - Validates admin is signer
    /// - Creates vault state, registry and withdrawal queue PDAs
    /// - Creates share mint with the vault authority PDA as mint authority
    /// - Rejects fee schedules above the protocol ceilings
    pub fn initialize(
        ctx: Context<Initialize>,
        recovery_admin: Pubkey,
        apy_oracle: Pubkey,
        fee_config: FeeConfig,
        keeper_bounty_bps: u16,
    ) -> Result<()> {
        instructions::initialize::handler(ctx, recovery_admin, apy_oracle, fee_config, keeper_bounty_bps)
    }

    /// Deposit assets into the vault and receive shares
    ///
    /// Security considerations:
    /// - Validates user token accounts (mint, owner)
    /// - Rejected while paused or while a strategy reply is pending
    /// - `min_shares` bounds slippage
    /// - May forward the deposit to the next strategy in line
    pub fn deposit(ctx: Context<Deposit>, amount: u64, min_shares: u64) -> Result<()> {
        instructions::deposit::handler(ctx, amount, min_shares)
    }

    /// Burn shares and receive assets, or join the withdrawal queue
    ///
    /// Security considerations:
    /// - Only the holder can burn their shares
    /// - Pays only out of liquidity owed neither as fees nor to queued requests
    /// - `min_asset_out` bounds slippage, also for queued requests
    pub fn withdraw(ctx: Context<Withdraw>, shares: u64, min_asset_out: u64) -> Result<()> {
        instructions::withdraw::handler(ctx, shares, min_asset_out)
    }

    /// Remove a queued withdrawal and re-mint its shares
    pub fn cancel_withdrawal(ctx: Context<CancelWithdrawal>, sequence_number: u64) -> Result<()> {
        instructions::cancel_withdrawal::handler(ctx, sequence_number)
    }

    /// Register a strategy
    ///
    /// Security considerations:
    /// - Admin-only function (has_one constraint)
    /// - Rejects duplicates and a full registry
    /// - Funds can only ever move to a registered deposit account
    pub fn add_strategy(
        ctx: Context<AddStrategy>,
        strategy: Pubkey,
        weight_bps: u16,
        category: StrategyCategory,
    ) -> Result<()> {
        instructions::add_strategy::handler(ctx, strategy, weight_bps, category)
    }

    /// Set a strategy's target weight; zero retires it
    pub fn set_strategy_allocation(
        ctx: Context<SetStrategyAllocation>,
        strategy: Pubkey,
        weight_bps: u16,
    ) -> Result<()> {
        instructions::set_strategy_allocation::handler(ctx, strategy, weight_bps)
    }

    /// Recall funds for an underfunded withdrawal queue, else move one
    /// strategy towards its target weight
    ///
    /// Security considerations:
    /// - Step chosen on-chain; funds only reach registered deposit accounts
    /// - Never invests liquidity owed to queued withdrawals
    pub fn rebalance(ctx: Context<Rebalance>) -> Result<()> {
        instructions::rebalance::handler(ctx)
    }

    /// Strategy profit/loss report
    ///
    /// Security considerations:
    /// - Signed by the strategy key itself
    /// - Profit above 50% of the invested balance is rejected
    /// - Per-strategy cooldown between reports
    /// - Fees are booked before PPS moves
    pub fn harvest(ctx: Context<Harvest>, new_assets_value: u64) -> Result<()> {
        instructions::harvest::handler(ctx, new_assets_value)
    }

    /// Record a strategy APY and recompute capped weights
    pub fn update_protocol_apy(
        ctx: Context<UpdateProtocolApy>,
        strategy: Pubkey,
        apy_bps: u32,
    ) -> Result<()> {
        instructions::update_protocol_apy::handler(ctx, strategy, apy_bps)
    }

    /// Recall every strategy's funds
    ///
    /// Security considerations:
    /// - Admin-only function
    /// - Supersedes any in-flight operation
    /// - Holds the lock until every recalled strategy has refunded
    pub fn panic_withdraw(ctx: Context<PanicWithdraw>) -> Result<()> {
        instructions::panic_withdraw::handler(ctx)
    }

    /// Pause or unpause deposits
    pub fn toggle_pause(ctx: Context<TogglePause>, paused: bool) -> Result<()> {
        instructions::toggle_pause::handler(ctx, paused)
    }

    /// Force-clear the processing lock without reconciling balances
    pub fn reset_processing(ctx: Context<ResetProcessing>) -> Result<()> {
        instructions::reset_processing::handler(ctx)
    }

    /// Pay queued withdrawals, at most `limit` examined; recall funds for the rest
    pub fn process_withdrawals<'info>(
        ctx: Context<'_, '_, 'info, 'info, ProcessWithdrawals<'info>>,
        limit: u8,
    ) -> Result<()> {
        instructions::process_withdrawals::handler(ctx, limit)
    }

    /// Move `amount` from one strategy to another
    pub fn migrate_strategy(
        ctx: Context<MigrateStrategy>,
        old_strategy: Pubkey,
        new_strategy: Pubkey,
        amount: u64,
        min_amount_out: u64,
    ) -> Result<()> {
        instructions::migrate_strategy::handler(ctx, old_strategy, new_strategy, amount, min_amount_out)
    }

    pub fn set_fees(
        ctx: Context<SetFees>,
        performance_bps: u16,
        burn_bps: u16,
        withdrawal_bps: u16,
    ) -> Result<()> {
        instructions::set_fees::handler(ctx, performance_bps, burn_bps, withdrawal_bps)
    }

    pub fn set_nova_sink(ctx: Context<SetNovaSink>, sink: Option<Pubkey>) -> Result<()> {
        instructions::set_nova_sink::handler(ctx, sink)
    }

    /// Strategy acknowledges a pending invest; the freed lock may recall funds for the queue
    pub fn strategy_confirmation(ctx: Context<StrategyConfirmation>, op_id: u64) -> Result<()> {
        instructions::strategy_confirmation::handler(ctx, op_id)
    }

    /// Strategy returns funds against the pending operation
    ///
    /// Security considerations:
    /// - Must carry the pending operation id, so each reply settles once
    /// - Only the strategy the operation targets (any recalled one for a panic)
    /// - Drains the withdrawal queue with the freed liquidity
    pub fn strategy_refund<'info>(
        ctx: Context<'_, '_, 'info, 'info, StrategyRefund<'info>>,
        op_id: u64,
        amount: u64,
    ) -> Result<()> {
        instructions::strategy_refund::handler(ctx, op_id, amount)
    }

    /// Keeper collects its harvest bounty after the claim lock
    pub fn claim_reward(ctx: Context<ClaimReward>) -> Result<()> {
        instructions::claim_reward::handler(ctx)
    }

    /// Pay out accrued admin and burn fees
    pub fn collect_fees(ctx: Context<CollectFees>) -> Result<()> {
        instructions::collect_fees::handler(ctx)
    }
}
