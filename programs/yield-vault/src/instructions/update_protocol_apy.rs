use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, events::*, state::*};

/// Record a strategy's APY and re-derive every weight from the APY table
#[derive(Accounts)]
pub struct UpdateProtocolApy<'info> {
    /// Admin or the configured APY oracle
    pub authority: Signer<'info>,

    #[account(
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
        constraint = vault_state.admin == authority.key()
            || vault_state.apy_oracle == authority.key() @ VaultError::NotAdmin,
    )]
    pub vault_state: Account<'info, VaultState>,

    #[account(
        mut,
        seeds = [STRATEGY_REGISTRY_SEED, vault_state.key().as_ref()],
        bump = strategy_registry.bump,
    )]
    pub strategy_registry: Account<'info, StrategyRegistry>,
}

pub fn handler(ctx: Context<UpdateProtocolApy>, strategy: Pubkey, apy_bps: u32) -> Result<()> {
    let registry = &mut ctx.accounts.strategy_registry;

    registry.record_apy(&strategy, apy_bps)?;

    emit!(ProtocolApyUpdated {
        vault: registry.vault,
        strategy,
        apy_bps,
        weights: registry.strategies.iter().map(|s| s.weight_bps).collect(),
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
