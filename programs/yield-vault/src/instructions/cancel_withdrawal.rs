use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::{constants::*, errors::*, events::*, state::*, transfers};

/// Pull a queued withdrawal and get its shares back
#[derive(Accounts)]
pub struct CancelWithdrawal<'info> {
    pub requester: Signer<'info>,

    #[account(
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
    )]
    pub vault_state: Account<'info, VaultState>,

    #[account(
        mut,
        seeds = [WITHDRAWAL_QUEUE_SEED, vault_state.key().as_ref()],
        bump = withdrawal_queue.bump,
    )]
    pub withdrawal_queue: Account<'info, WithdrawalQueue>,

    #[account(
        mut,
        address = vault_state.share_mint,
    )]
    pub share_mint: Account<'info, Mint>,

    /// CHECK: PDA used as mint authority, validated by seeds
    #[account(
        seeds = [VAULT_AUTHORITY_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.authority_bump,
    )]
    pub vault_authority: UncheckedAccount<'info>,

    #[account(
        mut,
        constraint = requester_share_account.mint == vault_state.share_mint @ VaultError::InvalidMint,
        constraint = requester_share_account.owner == requester.key() @ VaultError::InvalidOwner,
    )]
    pub requester_share_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

pub fn handler(ctx: Context<CancelWithdrawal>, sequence_number: u64) -> Result<()> {
    let request = ctx
        .accounts
        .withdrawal_queue
        .cancel(&ctx.accounts.requester.key(), sequence_number)?;

    // Burned shares were never removed from total_shares, so only the token supply is restored
    transfers::mint_shares(
        &ctx.accounts.vault_state,
        &ctx.accounts.token_program,
        ctx.accounts.share_mint.to_account_info(),
        ctx.accounts.vault_authority.to_account_info(),
        ctx.accounts.requester_share_account.to_account_info(),
        request.share_amount,
    )?;

    emit!(WithdrawalCancelled {
        vault: ctx.accounts.vault_state.key(),
        requester: request.requester,
        sequence_number,
        shares_restored: request.share_amount,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
