use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::{
    allocation::{self, RefundOutcome},
    constants::*,
    errors::*,
    events::*,
    instructions::process_withdrawals::{eligible_receivers, emit_recall, send_payouts},
    state::*,
    transfers,
};

/// A strategy returns funds against the pending operation
///
/// Settles a bounced invest, a divest, one leg of a panic, or the first leg
/// of a migration. Freed liquidity then pays queued withdrawals whose
/// receivers are passed as remaining accounts, and a divest goes out for
/// whatever the queue still lacks once the lock is free.
#[derive(Accounts)]
pub struct StrategyRefund<'info> {
    pub strategy: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
    )]
    pub vault_state: Account<'info, VaultState>,

    #[account(
        mut,
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

    /// Source of the returned funds
    #[account(
        mut,
        constraint = strategy_token_account.mint == vault_state.asset_mint @ VaultError::InvalidMint,
        constraint = strategy_token_account.owner == strategy.key() @ VaultError::InvalidOwner,
    )]
    pub strategy_token_account: Account<'info, TokenAccount>,

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

    /// Deposit account of a migration's destination strategy
    #[account(mut)]
    pub forward_token_account: Option<Account<'info, TokenAccount>>,

    pub token_program: Program<'info, Token>,
}

pub fn handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, StrategyRefund<'info>>,
    op_id: u64,
    amount: u64,
) -> Result<()> {
    let strategy = ctx.accounts.strategy.key();
    let now = Clock::get()?.unix_timestamp;
    let eligible = eligible_receivers(ctx.accounts.vault_state.asset_mint, ctx.remaining_accounts);

    // EFFECTS
    let settlement = allocation::settle_refund(
        &mut ctx.accounts.vault_state,
        &mut ctx.accounts.strategy_registry,
        &mut ctx.accounts.withdrawal_queue,
        &strategy,
        op_id,
        amount,
        AUTO_DRAIN_LIMIT as usize,
        |receiver| eligible.iter().any(|info| info.key == receiver),
    )?;

    // INTERACTIONS
    if amount > 0 {
        transfers::transfer_to_vault(
            &ctx.accounts.token_program,
            ctx.accounts.strategy_token_account.to_account_info(),
            ctx.accounts.vault_token_account.to_account_info(),
            ctx.accounts.strategy.to_account_info(),
            amount,
        )?;
    }

    let vault_key = ctx.accounts.vault_state.key();

    match settlement.outcome {
        RefundOutcome::Settled(_) => {}
        RefundOutcome::PanicProgress { remaining, .. } => {
            msg!("Panic refund from {}: {} strategies outstanding", strategy, remaining);
        }
        RefundOutcome::Forwarded { next, to_index, .. } => {
            let deposit_account = ctx.accounts.strategy_registry.strategies[to_index].deposit_account;
            let destination = ctx
                .accounts
                .forward_token_account
                .as_ref()
                .filter(|account| account.key() == deposit_account)
                .ok_or(VaultError::MissingStrategyAccount)?;

            transfers::transfer_from_vault(
                &ctx.accounts.vault_state,
                &ctx.accounts.token_program,
                ctx.accounts.vault_token_account.to_account_info(),
                ctx.accounts.vault_authority.to_account_info(),
                destination.to_account_info(),
                next.amount,
            )?;

            emit!(InvestRequested {
                vault: vault_key,
                strategy: next.strategy,
                op_id: next.id,
                amount: next.amount,
                timestamp: now,
            });
        }
        RefundOutcome::MigrationAborted { operation, returned } => {
            msg!(
                "Migration {} aborted: returned {} below minimum {}",
                operation.id,
                returned,
                operation.min_amount_out
            );
            emit!(MigrationAborted {
                vault: vault_key,
                from: operation.strategy,
                to: operation.migrate_to.unwrap_or_default(),
                op_id: operation.id,
                returned,
                min_amount_out: operation.min_amount_out,
                timestamp: now,
            });
        }
    }

    send_payouts(
        &ctx.accounts.vault_state,
        &settlement.queue.payouts,
        &eligible,
        &ctx.accounts.token_program,
        ctx.accounts.vault_token_account.to_account_info(),
        ctx.accounts.vault_authority.to_account_info(),
    )?;
    emit_recall(&ctx.accounts.vault_state, settlement.queue.recall)?;

    emit!(StrategyRefunded {
        vault: vault_key,
        strategy,
        op_id,
        amount,
        idle_balance: ctx.accounts.vault_state.idle_balance,
        withdrawals_paid: settlement.queue.payouts.len() as u32,
        timestamp: now,
    });

    Ok(())
}
