use anchor_lang::prelude::*;

use crate::{allocation, constants::*, errors::*, events::*, state::*};

/// Move funds from one strategy to another in two legs: a divest now and,
/// once the old strategy refunds, an invest into the new one
#[derive(Accounts)]
pub struct MigrateStrategy<'info> {
    pub admin: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
        has_one = admin @ VaultError::NotAdmin,
    )]
    pub vault_state: Account<'info, VaultState>,

    #[account(
        seeds = [STRATEGY_REGISTRY_SEED, vault_state.key().as_ref()],
        bump = strategy_registry.bump,
    )]
    pub strategy_registry: Account<'info, StrategyRegistry>,
}

pub fn handler(
    ctx: Context<MigrateStrategy>,
    old_strategy: Pubkey,
    new_strategy: Pubkey,
    amount: u64,
    min_amount_out: u64,
) -> Result<()> {
    let vault_state = &mut ctx.accounts.vault_state;

    let operation = allocation::begin_migration(
        vault_state,
        &ctx.accounts.strategy_registry,
        &old_strategy,
        &new_strategy,
        amount,
        min_amount_out,
    )?;

    msg!(
        "Migration {} started: {} from {} to {}",
        operation.id,
        amount,
        old_strategy,
        new_strategy
    );

    emit!(DivestRequested {
        vault: vault_state.key(),
        strategy: old_strategy,
        op_id: operation.id,
        amount,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
