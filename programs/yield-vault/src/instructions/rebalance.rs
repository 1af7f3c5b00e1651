use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::{
    allocation::{self, AllocationStep},
    constants::*,
    errors::*,
    events::*,
    state::*,
    transfers,
};

/// Take one single-flight step: fund the withdrawal queue, else move towards the target weights
///
/// Architecture: funds only ever move to a registered strategy's deposit account
/// - The step is chosen on-chain, the caller cannot pick the destination
/// - Liquidity owed to queued withdrawals is never invested
/// - An invest needs the deposit account of the chosen strategy
/// - A divest only records the request; the strategy returns funds later
#[derive(Accounts)]
pub struct Rebalance<'info> {
    /// Admin or keeper
    pub caller: Signer<'info>,

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

    /// Deposit account of the strategy being funded; unused for a divest
    #[account(mut)]
    pub strategy_token_account: Option<Account<'info, TokenAccount>>,

    pub token_program: Program<'info, Token>,
}

pub fn handler(ctx: Context<Rebalance>) -> Result<()> {
    let vault_state = &mut ctx.accounts.vault_state;
    let registry = &mut ctx.accounts.strategy_registry;

    // CHECKS
    vault_state.ensure_not_processing()?;

    let liquidity = allocation::Liquidity::of(vault_state, registry, &ctx.accounts.withdrawal_queue)?;
    let step = allocation::next_step(registry, &liquidity)?.ok_or(VaultError::NothingToRebalance)?;
    let now = Clock::get()?.unix_timestamp;

    match step {
        AllocationStep::Invest { index, amount } => {
            let destination = ctx
                .accounts
                .strategy_token_account
                .as_ref()
                .filter(|account| account.key() == registry.strategies[index].deposit_account)
                .ok_or(VaultError::MissingStrategyAccount)?;

            // EFFECTS
            let operation = allocation::send_invest(vault_state, registry, index, amount, liquidity.queued)?;

            // INTERACTIONS
            transfers::transfer_from_vault(
                vault_state,
                &ctx.accounts.token_program,
                ctx.accounts.vault_token_account.to_account_info(),
                ctx.accounts.vault_authority.to_account_info(),
                destination.to_account_info(),
                amount,
            )?;

            emit!(InvestRequested {
                vault: vault_state.key(),
                strategy: operation.strategy,
                op_id: operation.id,
                amount,
                timestamp: now,
            });
        }
        AllocationStep::Divest { index, amount } => {
            let operation = allocation::send_divest(vault_state, registry, index, amount)?;

            emit!(DivestRequested {
                vault: vault_state.key(),
                strategy: operation.strategy,
                op_id: operation.id,
                amount,
                timestamp: now,
            });
        }
    }

    Ok(())
}
