use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, events::*, state::*};

/// Clear a stuck single-flight lock
///
/// Balances are not reconciled: whatever the abandoned operation moved stays
/// booked as it was when the lock was taken.
#[derive(Accounts)]
pub struct ResetProcessing<'info> {
    pub authority: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
        constraint = vault_state.is_admin_or_recovery(&authority.key()) @ VaultError::NotAdmin,
    )]
    pub vault_state: Account<'info, VaultState>,

    #[account(
        mut,
        seeds = [STRATEGY_REGISTRY_SEED, vault_state.key().as_ref()],
        bump = strategy_registry.bump,
    )]
    pub strategy_registry: Account<'info, StrategyRegistry>,
}

pub fn handler(ctx: Context<ResetProcessing>) -> Result<()> {
    let vault_state = &mut ctx.accounts.vault_state;

    let cleared = vault_state.force_unlock();
    for entry in ctx.accounts.strategy_registry.strategies.iter_mut() {
        entry.awaiting_panic_refund = false;
    }

    match cleared {
        Some(op) => msg!(
            "Processing lock force-cleared: operation {} ({:?} {} with {})",
            op.id,
            op.kind,
            op.amount,
            op.strategy
        ),
        None => msg!("Processing reset with no operation pending"),
    }

    emit!(ProcessingReset {
        vault: vault_state.key(),
        by: ctx.accounts.authority.key(),
        cleared_op_id: cleared.map(|op| op.id),
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
