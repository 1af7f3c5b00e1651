use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::{constants::*, errors::*, events::*, state::*, transfers};

/// Pay accrued admin fees to the admin and accrued burn fees to the nova sink
#[derive(Accounts)]
pub struct CollectFees<'info> {
    pub admin: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
        has_one = admin @ VaultError::NotAdmin,
    )]
    pub vault_state: Account<'info, VaultState>,

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
        constraint = admin_token_account.mint == vault_state.asset_mint @ VaultError::InvalidMint,
        constraint = admin_token_account.owner == admin.key() @ VaultError::InvalidOwner,
    )]
    pub admin_token_account: Account<'info, TokenAccount>,

    /// Must be the configured sink; burn fees stay accrued without it
    #[account(
        mut,
        constraint = Some(nova_sink_account.key()) == vault_state.nova_sink @ VaultError::InvalidOwner,
    )]
    pub nova_sink_account: Option<Account<'info, TokenAccount>>,

    pub token_program: Program<'info, Token>,
}

pub fn handler(ctx: Context<CollectFees>) -> Result<()> {
    let vault_state = &mut ctx.accounts.vault_state;

    // CHECKS: fees are paid out of idle, never out of invested funds
    let (admin_amount, burn_amount) =
        vault_state.collectable_fees(ctx.accounts.nova_sink_account.is_some());
    require!(admin_amount > 0 || burn_amount > 0, VaultError::NothingToClaim);

    // EFFECTS
    vault_state.record_fee_collection(admin_amount, burn_amount)?;

    // INTERACTIONS
    transfers::transfer_from_vault(
        vault_state,
        &ctx.accounts.token_program,
        ctx.accounts.vault_token_account.to_account_info(),
        ctx.accounts.vault_authority.to_account_info(),
        ctx.accounts.admin_token_account.to_account_info(),
        admin_amount,
    )?;
    if let Some(sink) = ctx.accounts.nova_sink_account.as_ref() {
        transfers::transfer_from_vault(
            vault_state,
            &ctx.accounts.token_program,
            ctx.accounts.vault_token_account.to_account_info(),
            ctx.accounts.vault_authority.to_account_info(),
            sink.to_account_info(),
            burn_amount,
        )?;
    }

    emit!(FeesCollected {
        vault: vault_state.key(),
        admin_amount,
        burn_amount,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
