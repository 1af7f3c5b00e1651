use anchor_lang::prelude::*;

use crate::{allocation, constants::*, errors::*, events::*, state::*};

/// Recall every invested unit back to the vault
#[derive(Accounts)]
pub struct PanicWithdraw<'info> {
    pub admin: Signer<'info>,

    #[account(
        mut,
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

pub fn handler(ctx: Context<PanicWithdraw>) -> Result<()> {
    let vault_state = &mut ctx.accounts.vault_state;
    let registry = &mut ctx.accounts.strategy_registry;
    let now = Clock::get()?.unix_timestamp;

    let plan = allocation::begin_panic(vault_state, registry)?;

    if let Some(superseded) = plan.superseded {
        msg!(
            "Panic supersedes operation {} ({:?} {} with {})",
            superseded.id,
            superseded.kind,
            superseded.amount,
            superseded.strategy
        );
    }

    let op_id = plan.operation.map(|op| op.id);
    let mut amount_recalled = 0u64;
    for &(strategy, amount) in &plan.targets {
        amount_recalled = amount_recalled.saturating_add(amount);
        emit!(DivestRequested {
            vault: vault_state.key(),
            strategy,
            op_id: op_id.unwrap_or_default(),
            amount,
            timestamp: now,
        });
    }

    emit!(PanicTriggered {
        vault: vault_state.key(),
        admin: ctx.accounts.admin.key(),
        op_id,
        superseded_op_id: plan.superseded.map(|op| op.id),
        strategies_recalled: plan.targets.len() as u8,
        amount_recalled,
        timestamp: now,
    });

    Ok(())
}
