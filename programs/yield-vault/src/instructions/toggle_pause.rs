use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, events::*, state::*};

/// Enable or disable deposits
#[derive(Accounts)]
pub struct TogglePause<'info> {
    /// Admin, or the recovery admin when pausing
    pub authority: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
        constraint = vault_state.is_admin_or_recovery(&authority.key()) @ VaultError::NotAdmin,
    )]
    pub vault_state: Account<'info, VaultState>,
}

pub fn handler(ctx: Context<TogglePause>, paused: bool) -> Result<()> {
    let vault_state = &mut ctx.accounts.vault_state;
    let authority = ctx.accounts.authority.key();

    // Only the admin can lift a pause
    require!(paused || authority == vault_state.admin, VaultError::NotAdmin);

    vault_state.paused = paused;

    emit!(PauseToggled {
        vault: vault_state.key(),
        by: authority,
        paused,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
