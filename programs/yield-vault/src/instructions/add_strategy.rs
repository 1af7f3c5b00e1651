use anchor_lang::prelude::*;
use anchor_spl::token::TokenAccount;

use crate::{constants::*, errors::*, events::*, state::*};

/// Register a strategy the vault may allocate to
#[derive(Accounts)]
pub struct AddStrategy<'info> {
    /// Vault admin - only they can manage strategies
    /// Security: Must be signer and match vault_state.admin
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

    /// Token account that receives the strategy's invested funds
    #[account(
        constraint = strategy_deposit_account.mint == vault_state.asset_mint @ VaultError::InvalidMint,
    )]
    pub strategy_deposit_account: Account<'info, TokenAccount>,
}

pub fn handler(
    ctx: Context<AddStrategy>,
    strategy: Pubkey,
    weight_bps: u16,
    category: StrategyCategory,
) -> Result<()> {
    let registry = &mut ctx.accounts.strategy_registry;
    let deposit_account = ctx.accounts.strategy_deposit_account.key();

    registry.add_strategy(strategy, deposit_account, weight_bps, category)?;

    emit!(StrategyAdded {
        vault: registry.vault,
        strategy,
        deposit_account,
        weight_bps,
        category,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
