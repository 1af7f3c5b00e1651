use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::{allocation, constants::*, errors::*, events::*, state::*, transfers};

/// Pay queued withdrawals from idle liquidity
///
/// Permissionless. Receiver token accounts of the requests to pay are passed
/// as remaining accounts; requests whose receiver is absent are skipped.
/// If the lock is free and the queue is still short, a divest goes out for
/// the rest.
#[derive(Accounts)]
pub struct ProcessWithdrawals<'info> {
    pub keeper: Signer<'info>,

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

    pub token_program: Program<'info, Token>,
}

pub fn handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, ProcessWithdrawals<'info>>,
    limit: u8,
) -> Result<()> {
    let eligible = eligible_receivers(ctx.accounts.vault_state.asset_mint, ctx.remaining_accounts);

    // EFFECTS
    let settlement = allocation::settle_queue(
        &mut ctx.accounts.vault_state,
        &ctx.accounts.strategy_registry,
        &mut ctx.accounts.withdrawal_queue,
        limit as usize,
        |receiver| eligible.iter().any(|info| info.key == receiver),
    )?;

    // INTERACTIONS
    send_payouts(
        &ctx.accounts.vault_state,
        &settlement.payouts,
        &eligible,
        &ctx.accounts.token_program,
        ctx.accounts.vault_token_account.to_account_info(),
        ctx.accounts.vault_authority.to_account_info(),
    )?;
    emit_recall(&ctx.accounts.vault_state, settlement.recall)?;

    msg!(
        "Paid {} queued withdrawals, {} still queued",
        settlement.payouts.len(),
        ctx.accounts.withdrawal_queue.requests.len()
    );

    Ok(())
}

/// Writable asset-mint token accounts among `receivers`; only these can be paid
pub(crate) fn eligible_receivers<'info>(
    asset_mint: Pubkey,
    receivers: &'info [AccountInfo<'info>],
) -> Vec<&'info AccountInfo<'info>> {
    receivers
        .iter()
        .filter(|info| info.is_writable)
        .filter(|info| {
            Account::<TokenAccount>::try_from(*info)
                .map(|account| account.mint == asset_mint)
                .unwrap_or(false)
        })
        .collect()
}

/// Send each drained payout to its receiver
pub(crate) fn send_payouts<'info>(
    vault_state: &Account<'info, VaultState>,
    payouts: &[WithdrawalPayout],
    eligible: &[&'info AccountInfo<'info>],
    token_program: &Program<'info, Token>,
    vault_token_account: AccountInfo<'info>,
    vault_authority: AccountInfo<'info>,
) -> Result<()> {
    let vault_key = vault_state.key();
    let now = Clock::get()?.unix_timestamp;

    for payout in payouts {
        let receiver = eligible
            .iter()
            .find(|info| *info.key == payout.receiver)
            .ok_or(VaultError::MissingStrategyAccount)?;

        transfers::transfer_from_vault(
            vault_state,
            token_program,
            vault_token_account.clone(),
            vault_authority.clone(),
            (*receiver).clone(),
            payout.payout,
        )?;

        emit!(WithdrawalPaid {
            vault: vault_key,
            requester: payout.requester,
            receiver: payout.receiver,
            sequence_number: Some(payout.sequence_number),
            shares_burned: payout.share_amount,
            gross: payout.gross,
            payout: payout.payout,
            fee: payout.fee,
            timestamp: now,
        });
    }

    Ok(())
}

/// Announce a divest sent to fund the queue
pub(crate) fn emit_recall(vault_state: &Account<VaultState>, recall: Option<PendingOperation>) -> Result<()> {
    if let Some(operation) = recall {
        emit!(DivestRequested {
            vault: vault_state.key(),
            strategy: operation.strategy,
            op_id: operation.id,
            amount: operation.amount,
            timestamp: Clock::get()?.unix_timestamp,
        });
    }
    Ok(())
}
