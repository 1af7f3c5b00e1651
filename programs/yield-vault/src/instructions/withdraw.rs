use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::{
    allocation::{self, WithdrawalPlan},
    constants::*,
    errors::*,
    events::*,
    state::*,
    transfers,
};

/// Burn shares and pay their value, or queue the request when idle
/// liquidity cannot cover it
#[derive(Accounts)]
pub struct Withdraw<'info> {
    #[account(mut)]
    pub user: Signer<'info>,

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

    /// CHECK: PDA used as authority, validated by seeds
    #[account(
        seeds = [VAULT_AUTHORITY_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.authority_bump,
    )]
    pub vault_authority: UncheckedAccount<'info>,

    #[account(
        mut,
        constraint = user_share_account.mint == vault_state.share_mint @ VaultError::InvalidMint,
        constraint = user_share_account.owner == user.key() @ VaultError::InvalidOwner,
    )]
    pub user_share_account: Account<'info, TokenAccount>,

    /// Asset account the payout goes to; need not belong to the user
    #[account(
        mut,
        constraint = receiver.mint == vault_state.asset_mint @ VaultError::InvalidMint,
    )]
    pub receiver: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = vault_token_account.mint == vault_state.asset_mint @ VaultError::InvalidMint,
        constraint = vault_token_account.owner == vault_authority.key() @ VaultError::InvalidOwner,
    )]
    pub vault_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

pub fn handler(ctx: Context<Withdraw>, shares: u64, min_asset_out: u64) -> Result<()> {
    let vault_state = &mut ctx.accounts.vault_state;
    let registry = &ctx.accounts.strategy_registry;
    let queue = &mut ctx.accounts.withdrawal_queue;

    // CHECKS
    let liquidity = allocation::Liquidity::of(vault_state, registry, queue)?;
    let plan = allocation::plan_withdrawal(vault_state, &liquidity, shares, min_asset_out)?;
    let now = Clock::get()?.unix_timestamp;

    // Shares leave the holder either way; queued ones stay in total_shares until paid
    transfers::burn_shares(
        &ctx.accounts.token_program,
        ctx.accounts.share_mint.to_account_info(),
        ctx.accounts.user_share_account.to_account_info(),
        ctx.accounts.user.to_account_info(),
        shares,
    )?;

    if let WithdrawalPlan::Pay { gross, split } = plan {
        // EFFECTS
        vault_state.apply_withdrawal(shares, gross, &split)?;

        // INTERACTIONS
        transfers::transfer_from_vault(
            vault_state,
            &ctx.accounts.token_program,
            ctx.accounts.vault_token_account.to_account_info(),
            ctx.accounts.vault_authority.to_account_info(),
            ctx.accounts.receiver.to_account_info(),
            split.payout,
        )?;

        emit!(WithdrawalPaid {
            vault: vault_state.key(),
            requester: ctx.accounts.user.key(),
            receiver: ctx.accounts.receiver.key(),
            sequence_number: None,
            shares_burned: shares,
            gross,
            payout: split.payout,
            fee: split.fee,
            timestamp: now,
        });
        return Ok(());
    }

    let sequence_number = queue.enqueue(
        ctx.accounts.user.key(),
        ctx.accounts.receiver.key(),
        shares,
        min_asset_out,
    )?;

    emit!(WithdrawalQueued {
        vault: vault_state.key(),
        requester: ctx.accounts.user.key(),
        receiver: ctx.accounts.receiver.key(),
        sequence_number,
        share_amount: shares,
        min_asset_out,
        timestamp: now,
    });

    // Ask for the queue's shortfall back if nothing else is in flight
    if let Some(operation) = allocation::recall_for_queue(vault_state, registry, queue)? {
        emit!(DivestRequested {
            vault: vault_state.key(),
            strategy: operation.strategy,
            op_id: operation.id,
            amount: operation.amount,
            timestamp: now,
        });
    }

    Ok(())
}
