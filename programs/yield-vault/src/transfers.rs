//! Token CPIs signed by the vault authority PDA

use anchor_lang::prelude::*;
use anchor_spl::token::{self, Burn, MintTo, Token, Transfer};

use crate::{constants::*, state::VaultState};

/// Move `amount` out of the vault token account
pub fn transfer_from_vault<'info>(
    vault_state: &VaultState,
    token_program: &Program<'info, Token>,
    vault_token_account: AccountInfo<'info>,
    vault_authority: AccountInfo<'info>,
    destination: AccountInfo<'info>,
    amount: u64,
) -> Result<()> {
    if amount == 0 {
        return Ok(());
    }

    let asset_mint_key = vault_state.asset_mint;
    let authority_seeds: &[&[u8]] = &[
        VAULT_AUTHORITY_SEED,
        asset_mint_key.as_ref(),
        &[vault_state.authority_bump],
    ];
    let signer_seeds = &[authority_seeds];

    let transfer_ctx = CpiContext::new_with_signer(
        token_program.to_account_info(),
        Transfer {
            from: vault_token_account,
            to: destination,
            authority: vault_authority,
        },
        signer_seeds,
    );
    token::transfer(transfer_ctx, amount)
}

/// Mint `amount` shares to `destination`
pub fn mint_shares<'info>(
    vault_state: &VaultState,
    token_program: &Program<'info, Token>,
    share_mint: AccountInfo<'info>,
    vault_authority: AccountInfo<'info>,
    destination: AccountInfo<'info>,
    amount: u64,
) -> Result<()> {
    let asset_mint_key = vault_state.asset_mint;
    let authority_seeds: &[&[u8]] = &[
        VAULT_AUTHORITY_SEED,
        asset_mint_key.as_ref(),
        &[vault_state.authority_bump],
    ];
    let signer_seeds = &[authority_seeds];

    let mint_ctx = CpiContext::new_with_signer(
        token_program.to_account_info(),
        MintTo {
            mint: share_mint,
            to: destination,
            authority: vault_authority,
        },
        signer_seeds,
    );
    token::mint_to(mint_ctx, amount)
}

/// Burn `amount` shares from an account the signer `owner` controls
pub fn burn_shares<'info>(
    token_program: &Program<'info, Token>,
    share_mint: AccountInfo<'info>,
    from: AccountInfo<'info>,
    owner: AccountInfo<'info>,
    amount: u64,
) -> Result<()> {
    let burn_ctx = CpiContext::new(
        token_program.to_account_info(),
        Burn {
            mint: share_mint,
            from,
            authority: owner,
        },
    );
    token::burn(burn_ctx, amount)
}

/// Move `amount` from a signer-owned token account into the vault
pub fn transfer_to_vault<'info>(
    token_program: &Program<'info, Token>,
    source: AccountInfo<'info>,
    vault_token_account: AccountInfo<'info>,
    owner: AccountInfo<'info>,
    amount: u64,
) -> Result<()> {
    let transfer_ctx = CpiContext::new(
        token_program.to_account_info(),
        Transfer {
            from: source,
            to: vault_token_account,
            authority: owner,
        },
    );
    token::transfer(transfer_ctx, amount)
}
