use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, events::*, state::*};

/// Set or clear the token account that receives Nova burn fees
#[derive(Accounts)]
pub struct SetNovaSink<'info> {
    pub admin: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
        has_one = admin @ VaultError::NotAdmin,
    )]
    pub vault_state: Account<'info, VaultState>,
}

pub fn handler(ctx: Context<SetNovaSink>, sink: Option<Pubkey>) -> Result<()> {
    let vault_state = &mut ctx.accounts.vault_state;
    vault_state.nova_sink = sink;

    emit!(NovaSinkSet {
        vault: vault_state.key(),
        sink,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
