use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::{
    allocation,
    constants::*,
    errors::*,
    events::*,
    state::*,
    transfers,
};

/// Deposit assets into the vault and receive shares
///
/// Security checklist:
/// ✅ 1. SIGNER VALIDATION: User must be signer
/// ✅ 2. ACCOUNT OWNERSHIP: Vault state and registry validated with seeds
/// ✅ 6. MATH SAFETY: Share calculation in checked u128
/// ✅ 7. TOKEN ACCOUNT VALIDATION: Validates mint and owner
/// ✅ 8. BUSINESS LOGIC: Paused and single-flight guards, slippage bound
/// ✅ 10. EVENTS: Emits Deposited (and InvestRequested when funds move on)
#[derive(Accounts)]
pub struct Deposit<'info> {
    #[account(mut)]
    pub user: Signer<'info>,

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
        constraint = user_asset_account.mint == vault_state.asset_mint @ VaultError::InvalidMint,
        constraint = user_asset_account.owner == user.key() @ VaultError::InvalidOwner,
    )]
    pub user_asset_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = user_share_account.mint == vault_state.share_mint @ VaultError::InvalidMint,
        constraint = user_share_account.owner == user.key() @ VaultError::InvalidOwner,
    )]
    pub user_share_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = vault_token_account.mint == vault_state.asset_mint @ VaultError::InvalidMint,
        constraint = vault_token_account.owner == vault_authority.key() @ VaultError::InvalidOwner,
    )]
    pub vault_token_account: Account<'info, TokenAccount>,

    /// Deposit account of the strategy next in line for funds.
    /// Without it the deposit stays idle until the next rebalance.
    #[account(
        mut,
        constraint = strategy_token_account.mint == vault_state.asset_mint @ VaultError::InvalidMint,
    )]
    pub strategy_token_account: Option<Account<'info, TokenAccount>>,

    pub token_program: Program<'info, Token>,
}

pub fn handler(ctx: Context<Deposit>, amount: u64, min_shares: u64) -> Result<()> {
    let vault_state = &mut ctx.accounts.vault_state;
    let registry = &mut ctx.accounts.strategy_registry;

    // CHECKS
    let total_assets = vault_state.total_assets(registry.total_invested()?)?;
    let shares_to_mint = allocation::plan_deposit(vault_state, total_assets, amount, min_shares)?;

    // EFFECTS
    vault_state.record_deposit(amount, shares_to_mint)?;

    // INTERACTIONS
    transfers::transfer_to_vault(
        &ctx.accounts.token_program,
        ctx.accounts.user_asset_account.to_account_info(),
        ctx.accounts.vault_token_account.to_account_info(),
        ctx.accounts.user.to_account_info(),
        amount,
    )?;
    transfers::mint_shares(
        vault_state,
        &ctx.accounts.token_program,
        ctx.accounts.share_mint.to_account_info(),
        ctx.accounts.vault_authority.to_account_info(),
        ctx.accounts.user_share_account.to_account_info(),
        shares_to_mint,
    )?;

    let now = Clock::get()?.unix_timestamp;
    let total_assets = vault_state.total_assets(registry.total_invested()?)?;

    emit!(Deposited {
        vault: vault_state.key(),
        user: ctx.accounts.user.key(),
        asset_amount: amount,
        shares_minted: shares_to_mint,
        total_assets,
        total_shares: vault_state.total_shares,
        pps: vault_state.current_pps(total_assets)?,
        timestamp: now,
    });

    // Forward the new liquidity if the supplied strategy is the next to be funded
    let Some(strategy_account) = ctx.accounts.strategy_token_account.as_ref() else {
        return Ok(());
    };
    let liquidity = allocation::Liquidity::of(vault_state, registry, &ctx.accounts.withdrawal_queue)?;
    let Some((index, amount)) =
        allocation::plan_deposit_invest(registry, &liquidity, &strategy_account.key())?
    else {
        return Ok(());
    };

    let operation = allocation::send_invest(vault_state, registry, index, amount, liquidity.queued)?;
    transfers::transfer_from_vault(
        vault_state,
        &ctx.accounts.token_program,
        ctx.accounts.vault_token_account.to_account_info(),
        ctx.accounts.vault_authority.to_account_info(),
        strategy_account.to_account_info(),
        amount,
    )?;

    emit!(InvestRequested {
        vault: vault_state.key(),
        strategy: operation.strategy,
        op_id: operation.id,
        amount,
        timestamp: now,
    });

    Ok(())
}
