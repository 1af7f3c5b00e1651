use anchor_lang::prelude::*;

use crate::{constants::*, errors::VaultError, state::VaultState};

/// A withdrawal that idle liquidity could not cover when requested
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct WithdrawalRequest {
    pub requester: Pubkey,     // 32 bytes

    /// Asset token account the payout goes to
    pub receiver: Pubkey,      // 32 bytes

    /// Shares already burned from the requester, still counted in `total_shares`
    pub share_amount: u64,     // 8 bytes

    pub min_asset_out: u64,    // 8 bytes

    pub sequence_number: u64,  // 8 bytes
}

impl WithdrawalRequest {
    pub const SIZE: usize = 32 + 32 + 8 + 8 + 8;
}

/// A queued request that a drain paid out
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WithdrawalPayout {
    pub sequence_number: u64,
    pub requester: Pubkey,
    pub receiver: Pubkey,
    pub share_amount: u64,
    pub gross: u64,
    pub payout: u64,
    pub fee: u64,
}

/// FIFO of withdrawals waiting for liquidity
#[account]
pub struct WithdrawalQueue {
    pub vault: Pubkey,

    pub next_sequence: u64,

    pub requests: Vec<WithdrawalRequest>,

    pub bump: u8,
}

impl WithdrawalQueue {
    /// 8 (discriminator) + 32 (vault) + 8 (sequence) + 4 (vec len) + requests + 1 (bump) + 64 (padding)
    pub const SPACE: usize =
        8 + 32 + 8 + 4 + (MAX_QUEUED_WITHDRAWALS * WithdrawalRequest::SIZE) + 1 + 64;

    pub fn enqueue(
        &mut self,
        requester: Pubkey,
        receiver: Pubkey,
        share_amount: u64,
        min_asset_out: u64,
    ) -> Result<u64> {
        require!(
            self.requests.len() < MAX_QUEUED_WITHDRAWALS,
            VaultError::WithdrawalQueueFull
        );

        let sequence_number = self.next_sequence;
        self.next_sequence = self
            .next_sequence
            .checked_add(1)
            .ok_or(VaultError::MathOverflow)?;

        self.requests.push(WithdrawalRequest {
            requester,
            receiver,
            share_amount,
            min_asset_out,
            sequence_number,
        });
        Ok(sequence_number)
    }

    /// Take a request out of the queue on behalf of its requester
    pub fn cancel(&mut self, requester: &Pubkey, sequence_number: u64) -> Result<WithdrawalRequest> {
        let index = self
            .requests
            .iter()
            .position(|r| r.sequence_number == sequence_number && r.requester == *requester)
            .ok_or(VaultError::WithdrawalNotFound)?;
        Ok(self.requests.remove(index))
    }

    /// Burned shares still waiting for their payout
    pub fn queued_shares(&self) -> Result<u64> {
        self.requests.iter().try_fold(0u64, |acc, r| {
            acc.checked_add(r.share_amount)
                .ok_or(error!(VaultError::MathOverflow))
        })
    }

    /// Pay queued requests in FIFO order.
    ///
    /// Looks at no more than `limit` requests. A request is paid when its
    /// gross value fits in available liquidity, its net payout meets
    /// `min_asset_out` and `can_pay` accepts its receiver; anything else is
    /// skipped and stays queued. Stops as soon as liquidity runs dry. Paid
    /// requests leave the queue, so a repeated drain cannot pay twice.
    pub fn drain(
        &mut self,
        vault: &mut VaultState,
        total_invested: u64,
        limit: usize,
        can_pay: impl Fn(&Pubkey) -> bool,
    ) -> Result<Vec<WithdrawalPayout>> {
        let mut payouts = Vec::new();
        let mut examined = 0usize;
        let mut index = 0usize;

        while index < self.requests.len() && examined < limit {
            if vault.available_liquidity()? == 0 {
                break;
            }
            examined += 1;

            let request = &self.requests[index];
            let total_assets = vault.total_assets(total_invested)?;
            let (gross, split) = vault.quote_withdrawal(request.share_amount, total_assets)?;

            if gross > vault.available_liquidity()?
                || split.payout < request.min_asset_out
                || !can_pay(&request.receiver)
            {
                msg!(
                    "Withdrawal {} skipped: gross {} payout {}",
                    request.sequence_number,
                    gross,
                    split.payout
                );
                index += 1;
                continue;
            }

            vault.apply_withdrawal(request.share_amount, gross, &split)?;
            let request = self.requests.remove(index);
            payouts.push(WithdrawalPayout {
                sequence_number: request.sequence_number,
                requester: request.requester,
                receiver: request.receiver,
                share_amount: request.share_amount,
                gross,
                payout: split.payout,
                fee: split.fee,
            });
        }

        Ok(payouts)
    }
}
