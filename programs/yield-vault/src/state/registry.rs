use anchor_lang::prelude::*;

use crate::{constants::*, errors::VaultError};

/// Category flag; decides where a strategy's burn fee is routed
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrategyCategory {
    Standard,
    Nova,
}

/// Individual strategy entry
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq)]
pub struct StrategyEntry {
    /// Key the strategy signs its replies and reports with
    pub strategy: Pubkey,            // 32 bytes

    /// Token account receiving invested funds
    pub deposit_account: Pubkey,     // 32 bytes

    /// Target share of total assets, in bps; set by the admin or the APY optimizer
    pub weight_bps: u16,             // 2 bytes

    /// Last-known balance attributed to this strategy
    pub invested: u64,               // 8 bytes

    pub reported_apy_bps: u32,       // 4 bytes

    pub category: StrategyCategory,  // 1 byte

    /// Eligible for funds and APY weighting. Only the admin retires an entry
    /// (weight set to zero); an active entry may still sit at zero weight
    /// while its APY is zero. Retired entries target no funds.
    pub active: bool,                // 1 byte

    /// Divest-all sent by a panic, refund not yet received
    pub awaiting_panic_refund: bool, // 1 byte

    /// Timestamp of the last accepted profit report
    pub last_harvest: i64,           // 8 bytes
}

impl StrategyEntry {
    pub const SIZE: usize = 32 + 32 + 2 + 8 + 4 + 1 + 1 + 1 + 8;
}

/// Ordered registry of strategies the vault may allocate to
///
/// Entries are never removed; insertion order is the tie-break for every
/// allocation decision.
#[account]
pub struct StrategyRegistry {
    /// Vault this registry belongs to
    pub vault: Pubkey,

    pub strategies: Vec<StrategyEntry>,

    /// Bump seed for PDA
    pub bump: u8,
}

impl StrategyRegistry {
    /// 8 (discriminator) + 32 (vault) + 4 (vec len) + entries + 1 (bump) + 128 (padding)
    pub const SPACE: usize = 8 + 32 + 4 + (MAX_STRATEGIES * StrategyEntry::SIZE) + 1 + 128;

    pub fn add_strategy(
        &mut self,
        strategy: Pubkey,
        deposit_account: Pubkey,
        weight_bps: u16,
        category: StrategyCategory,
    ) -> Result<()> {
        require!(weight_bps as u64 <= BPS_DENOMINATOR, VaultError::InvalidWeight);
        require!(
            self.get(&strategy).is_none(),
            VaultError::StrategyAlreadyExists
        );
        require!(
            self.strategies.len() < MAX_STRATEGIES,
            VaultError::RegistryFull
        );

        self.strategies.push(StrategyEntry {
            strategy,
            deposit_account,
            weight_bps,
            invested: 0,
            reported_apy_bps: 0,
            category,
            active: weight_bps > 0,
            awaiting_panic_refund: false,
            last_harvest: 0,
        });
        Ok(())
    }

    pub fn position(&self, strategy: &Pubkey) -> Result<usize> {
        self.strategies
            .iter()
            .position(|s| s.strategy == *strategy)
            .ok_or(error!(VaultError::UnknownStrategy))
    }

    pub fn get(&self, strategy: &Pubkey) -> Option<&StrategyEntry> {
        self.strategies.iter().find(|s| s.strategy == *strategy)
    }

    pub fn get_mut(&mut self, strategy: &Pubkey) -> Option<&mut StrategyEntry> {
        self.strategies.iter_mut().find(|s| s.strategy == *strategy)
    }

    /// Update one entry's weight; zero retires it, anything else reactivates it
    pub fn set_allocation(&mut self, strategy: &Pubkey, weight_bps: u16) -> Result<()> {
        require!(weight_bps as u64 <= BPS_DENOMINATOR, VaultError::InvalidWeight);
        let entry = self
            .get_mut(strategy)
            .ok_or(VaultError::UnknownStrategy)?;
        entry.weight_bps = weight_bps;
        entry.active = weight_bps > 0;
        Ok(())
    }

    pub fn total_invested(&self) -> Result<u64> {
        self.strategies.iter().try_fold(0u64, |acc, s| {
            acc.checked_add(s.invested)
                .ok_or(error!(VaultError::MathOverflow))
        })
    }

    pub fn total_weight(&self) -> u64 {
        self.strategies.iter().map(|s| s.weight_bps as u64).sum()
    }

    /// Store a new APY for `strategy` and re-derive all weights from APYs
    pub fn record_apy(&mut self, strategy: &Pubkey, apy_bps: u32) -> Result<()> {
        require!(apy_bps <= MAX_APY_BPS, VaultError::InvalidApy);
        let entry = self
            .get_mut(strategy)
            .ok_or(VaultError::UnknownStrategy)?;
        entry.reported_apy_bps = apy_bps;
        self.optimize_weights();
        Ok(())
    }

    /// Weights proportional to APY over active entries, each capped at
    /// `MAX_STRATEGY_WEIGHT_BPS`.
    ///
    /// Never changes `active`: an active entry reporting zero APY gets zero
    /// weight but stays eligible for the next report. Retired entries are
    /// left untouched.
    ///
    /// Capped entries are pinned and the leftover budget is shared among the
    /// rest; at most one pass per entry. Flooring dust goes to the first
    /// uncapped entry (registry order) with room under the cap.
    pub fn optimize_weights(&mut self) {
        let cap = MAX_STRATEGY_WEIGHT_BPS as u64;
        let count = self.strategies.len();

        let mut uncapped: Vec<usize> = (0..count)
            .filter(|&i| self.strategies[i].active && self.strategies[i].reported_apy_bps > 0)
            .collect();
        if uncapped.is_empty() {
            return;
        }

        let mut weights = vec![0u64; count];
        let mut budget = BPS_DENOMINATOR;

        for _ in 0..count {
            let total_apy: u64 = uncapped
                .iter()
                .map(|&i| self.strategies[i].reported_apy_bps as u64)
                .sum();
            if uncapped.is_empty() || total_apy == 0 || budget == 0 {
                break;
            }

            let share = |i: usize| budget * self.strategies[i].reported_apy_bps as u64 / total_apy;
            let over_cap: Vec<usize> = uncapped.iter().copied().filter(|&i| share(i) > cap).collect();

            if over_cap.is_empty() {
                let mut assigned = 0u64;
                for &i in &uncapped {
                    weights[i] = share(i);
                    assigned += weights[i];
                }
                let mut dust = budget - assigned;
                for &i in &uncapped {
                    if dust == 0 {
                        break;
                    }
                    let top_up = dust.min(cap - weights[i]);
                    weights[i] += top_up;
                    dust -= top_up;
                }
                break;
            }

            for &i in &over_cap {
                weights[i] = cap;
                budget = budget.saturating_sub(cap);
            }
            uncapped.retain(|i| !over_cap.contains(i));
        }

        for (entry, weight) in self.strategies.iter_mut().zip(weights) {
            if entry.active {
                entry.weight_bps = weight as u16;
            }
        }
    }
}
