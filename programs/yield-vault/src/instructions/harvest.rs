use anchor_lang::prelude::*;

use crate::{allocation, constants::*, events::*, state::*};

/// A strategy reports its current value; profit is split into fees and PPS growth
///
/// Security considerations:
/// - Only the registered strategy key can report for itself
/// - Profit above the ceiling is rejected whole
/// - One report per strategy per cooldown window
#[derive(Accounts)]
pub struct Harvest<'info> {
    #[account(mut)]
    pub strategy: Signer<'info>,

    /// CHECK: Only used as the seed of the keeper's reward account
    pub keeper: UncheckedAccount<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
    )]
    pub vault_state: Account<'info, VaultState>,

    #[account(
        mut,
        seeds = [STRATEGY_REGISTRY_SEED, vault_state.key().as_ref()],
        bump = strategy_registry.bump,
    )]
    pub strategy_registry: Account<'info, StrategyRegistry>,

    #[account(
        init_if_needed,
        payer = strategy,
        space = KeeperReward::SPACE,
        seeds = [KEEPER_REWARD_SEED, vault_state.key().as_ref(), keeper.key().as_ref()],
        bump
    )]
    pub keeper_reward: Account<'info, KeeperReward>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<Harvest>, new_assets_value: u64) -> Result<()> {
    let vault_state = &mut ctx.accounts.vault_state;
    let registry = &mut ctx.accounts.strategy_registry;
    let strategy = ctx.accounts.strategy.key();
    let now = Clock::get()?.unix_timestamp;

    let report = allocation::report_assets(vault_state, registry, &strategy, new_assets_value, now)?;

    let keeper_reward = &mut ctx.accounts.keeper_reward;
    if keeper_reward.vault == Pubkey::default() {
        keeper_reward.vault = vault_state.key();
        keeper_reward.keeper = ctx.accounts.keeper.key();
        keeper_reward.bump = ctx.bumps.keeper_reward;
    }
    keeper_reward.credit(report.split.keeper_bounty, now)?;

    let total_assets = vault_state.total_assets(registry.total_invested()?)?;

    emit!(Harvested {
        vault: vault_state.key(),
        strategy,
        keeper: keeper_reward.keeper,
        previous_value: report.previous_value,
        new_value: new_assets_value,
        profit: report.profit,
        loss: report.loss,
        performance_fee: report.split.performance_fee,
        burn_fee: report.split.burn_fee,
        keeper_bounty: report.split.keeper_bounty,
        pps: vault_state.current_pps(total_assets)?,
        timestamp: now,
    });

    Ok(())
}
