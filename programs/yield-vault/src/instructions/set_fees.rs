use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, events::*, fees::FeeConfig, state::*};

#[derive(Accounts)]
pub struct SetFees<'info> {
    pub admin: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
        has_one = admin @ VaultError::NotAdmin,
    )]
    pub vault_state: Account<'info, VaultState>,
}

pub fn handler(
    ctx: Context<SetFees>,
    performance_bps: u16,
    burn_bps: u16,
    withdrawal_bps: u16,
) -> Result<()> {
    let fee_config = FeeConfig {
        performance_bps,
        burn_bps,
        withdrawal_bps,
    };
    fee_config.validate()?;

    let vault_state = &mut ctx.accounts.vault_state;
    vault_state.fee_config = fee_config;

    emit!(FeesUpdated {
        vault: vault_state.key(),
        fee_config,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
