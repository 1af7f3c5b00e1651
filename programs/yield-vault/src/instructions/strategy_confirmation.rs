use anchor_lang::prelude::*;

use crate::{
    allocation, constants::*, events::*, instructions::process_withdrawals::emit_recall, state::*,
};

/// A strategy acknowledges the funds sent with an invest
///
/// Releasing the lock lets a short withdrawal queue recall its funds.
#[derive(Accounts)]
pub struct StrategyConfirmation<'info> {
    pub strategy: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
    )]
    pub vault_state: Account<'info, VaultState>,

    #[account(
        seeds = [STRATEGY_REGISTRY_SEED, vault_state.key().as_ref()],
        bump = strategy_registry.bump,
    )]
    pub strategy_registry: Account<'info, StrategyRegistry>,

    #[account(
        seeds = [WITHDRAWAL_QUEUE_SEED, vault_state.key().as_ref()],
        bump = withdrawal_queue.bump,
    )]
    pub withdrawal_queue: Account<'info, WithdrawalQueue>,
}

pub fn handler(ctx: Context<StrategyConfirmation>, op_id: u64) -> Result<()> {
    let vault_state = &mut ctx.accounts.vault_state;
    let registry = &ctx.accounts.strategy_registry;
    let strategy = ctx.accounts.strategy.key();

    let operation = allocation::confirm(vault_state, registry, &strategy, op_id)?;
    let recall = allocation::recall_for_queue(vault_state, registry, &ctx.accounts.withdrawal_queue)?;

    emit!(StrategyConfirmed {
        vault: vault_state.key(),
        strategy,
        op_id,
        amount: operation.amount,
        timestamp: Clock::get()?.unix_timestamp,
    });
    emit_recall(vault_state, recall)?;

    Ok(())
}
