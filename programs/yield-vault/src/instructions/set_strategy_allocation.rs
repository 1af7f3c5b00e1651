use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, events::*, state::*};

/// Change one strategy's target weight; zero retires it
#[derive(Accounts)]
pub struct SetStrategyAllocation<'info> {
    pub admin: Signer<'info>,

    #[account(
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
        has_one = admin @ VaultError::NotAdmin,
    )]
    pub vault_state: Account<'info, VaultState>,

    #[account(
        mut,
        seeds = [STRATEGY_REGISTRY_SEED, vault_state.key().as_ref()],
        bump = strategy_registry.bump,
    )]
    pub strategy_registry: Account<'info, StrategyRegistry>,
}

pub fn handler(ctx: Context<SetStrategyAllocation>, strategy: Pubkey, weight_bps: u16) -> Result<()> {
    let registry = &mut ctx.accounts.strategy_registry;

    registry.set_allocation(&strategy, weight_bps)?;

    emit!(StrategyAllocationSet {
        vault: registry.vault,
        strategy,
        weight_bps,
        active: weight_bps > 0,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
