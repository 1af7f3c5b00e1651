use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token::{Mint, Token, TokenAccount},
};

use crate::{constants::*, errors::*, events::*, fees::FeeConfig, state::*};

/// Initialize a new vault for a given asset token
#[derive(Accounts)]
pub struct Initialize<'info> {
    /// Vault admin - configures strategies and fees
    /// Security: Must be signer, stored in state
    #[account(mut)]
    pub admin: Signer<'info>,

    /// Vault state PDA
    /// Security: Initialized with proper space and padding for upgrades
    #[account(
        init,
        payer = admin,
        space = VAULT_STATE_SIZE,
        seeds = [VAULT_SEED, asset_mint.key().as_ref()],
        bump
    )]
    pub vault_state: Account<'info, VaultState>,

    /// Asset token mint (the underlying token users deposit)
    pub asset_mint: Account<'info, Mint>,

    /// Share token mint PDA (vault shares)
    /// Security: Mint authority is vault_authority PDA
    #[account(
        init,
        payer = admin,
        seeds = [SHARE_MINT_SEED, asset_mint.key().as_ref()],
        bump,
        mint::decimals = asset_mint.decimals,
        mint::authority = vault_authority,
    )]
    pub share_mint: Account<'info, Mint>,

    /// CHECK: PDA used as mint and token authority, validated by seeds
    #[account(
        seeds = [VAULT_AUTHORITY_SEED, asset_mint.key().as_ref()],
        bump
    )]
    pub vault_authority: UncheckedAccount<'info>,

    /// Vault's token account for holding idle assets
    #[account(
        init,
        payer = admin,
        associated_token::mint = asset_mint,
        associated_token::authority = vault_authority,
    )]
    pub vault_token_account: Account<'info, TokenAccount>,

    #[account(
        init,
        payer = admin,
        space = StrategyRegistry::SPACE,
        seeds = [STRATEGY_REGISTRY_SEED, vault_state.key().as_ref()],
        bump
    )]
    pub strategy_registry: Account<'info, StrategyRegistry>,

    #[account(
        init,
        payer = admin,
        space = WithdrawalQueue::SPACE,
        seeds = [WITHDRAWAL_QUEUE_SEED, vault_state.key().as_ref()],
        bump
    )]
    pub withdrawal_queue: Account<'info, WithdrawalQueue>,

    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
}

pub fn handler(
    ctx: Context<Initialize>,
    recovery_admin: Pubkey,
    apy_oracle: Pubkey,
    fee_config: FeeConfig,
    keeper_bounty_bps: u16,
) -> Result<()> {
    // CHECKS: Fee ceilings
    fee_config.validate()?;
    require!(
        keeper_bounty_bps <= MAX_KEEPER_BOUNTY_BPS,
        VaultError::InvalidFeeConfig
    );

    let vault_state = &mut ctx.accounts.vault_state;

    // EFFECTS: Initialize vault state
    vault_state.admin = ctx.accounts.admin.key();
    vault_state.recovery_admin = recovery_admin;
    vault_state.apy_oracle = apy_oracle;
    vault_state.asset_mint = ctx.accounts.asset_mint.key();
    vault_state.share_mint = ctx.accounts.share_mint.key();
    vault_state.total_shares = 0;
    vault_state.idle_balance = 0;
    vault_state.paused = false;
    vault_state.processing = false;
    vault_state.pending = None;
    vault_state.next_operation_id = 1;
    vault_state.fee_config = fee_config;
    vault_state.keeper_bounty_bps = keeper_bounty_bps;
    vault_state.nova_sink = None;
    vault_state.accrued_admin_fees = 0;
    vault_state.accrued_burn_fees = 0;
    vault_state.accrued_keeper_rewards = 0;
    vault_state.last_harvest = 0;
    vault_state.bump = ctx.bumps.vault_state;
    vault_state.share_bump = ctx.bumps.share_mint;
    vault_state.authority_bump = ctx.bumps.vault_authority;
    vault_state._reserved = [0; 128];

    let registry = &mut ctx.accounts.strategy_registry;
    registry.vault = vault_state.key();
    registry.strategies = Vec::new();
    registry.bump = ctx.bumps.strategy_registry;

    let queue = &mut ctx.accounts.withdrawal_queue;
    queue.vault = vault_state.key();
    queue.next_sequence = 0;
    queue.requests = Vec::new();
    queue.bump = ctx.bumps.withdrawal_queue;

    emit!(VaultInitialized {
        vault: vault_state.key(),
        admin: vault_state.admin,
        recovery_admin,
        asset_mint: vault_state.asset_mint,
        share_mint: vault_state.share_mint,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
