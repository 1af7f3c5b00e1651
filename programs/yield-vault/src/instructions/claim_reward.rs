use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::{constants::*, errors::*, events::*, state::*, transfers};

/// Keeper withdraws its accrued harvest bounty once the lock has run out
#[derive(Accounts)]
pub struct ClaimReward<'info> {
    pub keeper: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
    )]
    pub vault_state: Account<'info, VaultState>,

    #[account(
        mut,
        seeds = [KEEPER_REWARD_SEED, vault_state.key().as_ref(), keeper.key().as_ref()],
        bump = keeper_reward.bump,
        has_one = keeper @ VaultError::InvalidOwner,
    )]
    pub keeper_reward: Account<'info, KeeperReward>,

    /// CHECK: PDA used as authority, validated by seeds
    #[account(
        seeds = [VAULT_AUTHORITY_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.authority_bump,
    )]
    pub vault_authority: UncheckedAccount<'info>,

    #[account(
        mut,
        constraint = vault_token_account.mint == vault_state.asset_mint @ VaultError::InvalidMint,
        constraint = vault_token_account.owner == vault_authority.key() @ VaultError::InvalidOwner,
    )]
    pub vault_token_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = keeper_token_account.mint == vault_state.asset_mint @ VaultError::InvalidMint,
        constraint = keeper_token_account.owner == keeper.key() @ VaultError::InvalidOwner,
    )]
    pub keeper_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

pub fn handler(ctx: Context<ClaimReward>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let vault_state = &mut ctx.accounts.vault_state;
    let keeper_reward = &mut ctx.accounts.keeper_reward;

    // CHECKS
    let amount = keeper_reward.claimable(now)?;
    require!(amount <= vault_state.idle_balance, VaultError::InsufficientLiquidity);

    // EFFECTS
    keeper_reward.accrued = 0;
    vault_state.accrued_keeper_rewards = vault_state.accrued_keeper_rewards.saturating_sub(amount);
    vault_state.idle_balance -= amount;

    // INTERACTIONS
    transfers::transfer_from_vault(
        vault_state,
        &ctx.accounts.token_program,
        ctx.accounts.vault_token_account.to_account_info(),
        ctx.accounts.vault_authority.to_account_info(),
        ctx.accounts.keeper_token_account.to_account_info(),
        amount,
    )?;

    emit!(KeeperRewardClaimed {
        vault: vault_state.key(),
        keeper: ctx.accounts.keeper.key(),
        amount,
        timestamp: now,
    });

    Ok(())
}
