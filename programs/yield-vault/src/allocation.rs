//! Allocation and settlement engine.
//!
//! Pure state transitions over `VaultState` and `StrategyRegistry`. The
//! instruction handlers call into this module, then perform the token
//! movements and emit events for whatever it decided.

use anchor_lang::prelude::*;

use crate::{
    constants::*,
    errors::VaultError,
    fees::{bps_of, split_profit, ProfitSplit, WithdrawalSplit},
    state::{
        OperationKind, PendingOperation, StrategyCategory, StrategyRegistry, VaultState,
        WithdrawalPayout, WithdrawalQueue,
    },
};

/// One single-flight step towards the target allocation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AllocationStep {
    Invest { index: usize, amount: u64 },
    Divest { index: usize, amount: u64 },
}

/// Result of a strategy refund
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefundOutcome {
    /// The operation is complete and the lock released
    Settled(PendingOperation),
    /// A panic refund arrived; `remaining` strategies still owe theirs
    PanicProgress { operation: PendingOperation, remaining: u8 },
    /// First migration leg done; `next` is the invest into the new strategy
    Forwarded { operation: PendingOperation, next: PendingOperation, to_index: usize },
    /// Migration refund fell short of its minimum; funds stay idle
    MigrationAborted { operation: PendingOperation, returned: u64 },
}

/// Outcome of a panic
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PanicPlan {
    /// Operation that was in flight and is now abandoned
    pub superseded: Option<PendingOperation>,
    /// Strategies told to divest everything, with their booked balance
    pub targets: Vec<(Pubkey, u64)>,
    /// The panic record holding the lock, if anything had to be recalled
    pub operation: Option<PendingOperation>,
}

/// Outcome of an accepted profit/loss report
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HarvestReport {
    pub previous_value: u64,
    pub profit: u64,
    pub loss: u64,
    pub split: ProfitSplit,
    /// Burn fee went to the nova sink rather than the admin
    pub burn_to_sink: bool,
}

/// Liquidity figures every allocation decision starts from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Liquidity {
    /// Net assets backing all shares, queued ones included
    pub total_assets: u64,
    /// Idle assets not owed as fees
    pub available: u64,
    /// Gross value of every queued withdrawal at the current price
    pub queued: u64,
    /// Idle missing before the queue could be paid in full; zero with an empty queue
    pub shortfall: u64,
}

impl Liquidity {
    pub fn of(vault: &VaultState, registry: &StrategyRegistry, queue: &WithdrawalQueue) -> Result<Self> {
        let total_assets = vault.total_assets(registry.total_invested()?)?;
        let queued = vault.assets_for_shares(queue.queued_shares()?, total_assets)?;
        let shortfall = if queue.requests.is_empty() {
            0
        } else {
            vault.liquidity_shortfall(queued)?
        };
        Ok(Self {
            total_assets,
            available: vault.available_liquidity()?,
            queued,
            shortfall,
        })
    }

    /// Idle liquidity not already promised to queued withdrawals
    pub fn free(&self) -> u64 {
        self.available.saturating_sub(self.queued)
    }

    /// Assets left under management once the queue is paid
    pub fn retained(&self) -> u64 {
        self.total_assets.saturating_sub(self.queued)
    }
}

/// How a withdrawal request is served
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WithdrawalPlan {
    /// Paid now out of free liquidity
    Pay { gross: u64, split: WithdrawalSplit },
    /// Joins the back of the queue
    Queue { gross: u64 },
}

/// Queue drain outcome, plus the divest sent for whatever is still unfunded
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueueSettlement {
    pub payouts: Vec<WithdrawalPayout>,
    pub recall: Option<PendingOperation>,
}

/// Everything a strategy refund set in motion
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefundSettlement {
    pub outcome: RefundOutcome,
    pub queue: QueueSettlement,
}

pub fn target_balance(total_assets: u64, weight_bps: u16) -> Result<u64> {
    bps_of(total_assets, weight_bps)
}

/// `target - invested` for every entry, in registry order. Retired entries target zero.
pub fn strategy_deltas(registry: &StrategyRegistry, total_assets: u64) -> Result<Vec<i128>> {
    registry
        .strategies
        .iter()
        .map(|s| {
            let weight = if s.active { s.weight_bps } else { 0 };
            let target = target_balance(total_assets, weight)?;
            Ok(target as i128 - s.invested as i128)
        })
        .collect()
}

/// Next single-flight step.
///
/// An unfunded queue comes first: the shortfall is recalled from the first
/// funded strategy. Otherwise the first actionable weight delta in registry
/// insertion order, with targets taken over the assets that stay once the
/// queue is paid. Positive deltas invest up to the free liquidity and are
/// skipped when none is left; negative deltas divest the excess. Deltas no
/// larger than `MIN_REBALANCE_AMOUNT` are ignored.
pub fn next_step(registry: &StrategyRegistry, liquidity: &Liquidity) -> Result<Option<AllocationStep>> {
    if liquidity.shortfall > 0 {
        return Ok(deficit_divest(registry, liquidity.shortfall));
    }

    let threshold = MIN_REBALANCE_AMOUNT as i128;
    let free = liquidity.free();

    for (index, delta) in strategy_deltas(registry, liquidity.retained())?.into_iter().enumerate() {
        if delta > threshold {
            let amount = (delta as u64).min(free);
            if amount > MIN_REBALANCE_AMOUNT {
                return Ok(Some(AllocationStep::Invest { index, amount }));
            }
        } else if delta < -threshold {
            return Ok(Some(AllocationStep::Divest {
                index,
                amount: delta.unsigned_abs() as u64,
            }));
        }
    }
    Ok(None)
}

/// Divest aimed at covering `deficit`, from the first strategy holding funds.
///
/// Capped at that strategy's balance; whatever remains is recalled from the
/// next funded strategy once this one has refunded.
pub fn deficit_divest(registry: &StrategyRegistry, deficit: u64) -> Option<AllocationStep> {
    if deficit == 0 {
        return None;
    }
    registry
        .strategies
        .iter()
        .position(|s| s.invested > 0)
        .map(|index| AllocationStep::Divest {
            index,
            amount: deficit.min(registry.strategies[index].invested),
        })
}

/// Shares a deposit of `amount` mints, after the deposit guards
pub fn plan_deposit(vault: &VaultState, total_assets: u64, amount: u64, min_shares: u64) -> Result<u64> {
    require!(!vault.paused, VaultError::Paused);
    require!(amount > 0, VaultError::InsufficientValue);
    vault.ensure_not_processing()?;

    let shares = vault.shares_for_deposit(amount, total_assets)?;
    require!(shares > 0, VaultError::InsufficientValue);
    require!(shares >= min_shares, VaultError::SlippageExceeded);
    Ok(shares)
}

/// Pay `shares` now if free liquidity covers them, otherwise queue them.
///
/// Liquidity promised to earlier queued requests is never used, so a new
/// request cannot overtake the queue.
pub fn plan_withdrawal(
    vault: &VaultState,
    liquidity: &Liquidity,
    shares: u64,
    min_asset_out: u64,
) -> Result<WithdrawalPlan> {
    require!(shares > 0, VaultError::InsufficientValue);

    let (gross, split) = vault.quote_withdrawal(shares, liquidity.total_assets)?;
    require!(gross > 0, VaultError::InsufficientValue);

    if gross <= liquidity.free() {
        require!(split.payout >= min_asset_out, VaultError::SlippageExceeded);
        Ok(WithdrawalPlan::Pay { gross, split })
    } else {
        Ok(WithdrawalPlan::Queue { gross })
    }
}

/// Invest a fresh deposit can be forwarded with: only when the next step is
/// an invest into the strategy whose deposit account was supplied
pub fn plan_deposit_invest(
    registry: &StrategyRegistry,
    liquidity: &Liquidity,
    supplied: &Pubkey,
) -> Result<Option<(usize, u64)>> {
    match next_step(registry, liquidity)? {
        Some(AllocationStep::Invest { index, amount })
            if registry.strategies[index].deposit_account == *supplied =>
        {
            Ok(Some((index, amount)))
        }
        Some(AllocationStep::Invest { index, .. }) => {
            msg!("Deposit left idle: strategy {} is next in line", registry.strategies[index].strategy);
            Ok(None)
        }
        _ => Ok(None),
    }
}

/// Send a divest for the queue's shortfall if the lock is free
pub fn recall_for_queue(
    vault: &mut VaultState,
    registry: &StrategyRegistry,
    queue: &WithdrawalQueue,
) -> Result<Option<PendingOperation>> {
    if vault.processing || queue.requests.is_empty() {
        return Ok(None);
    }

    let liquidity = Liquidity::of(vault, registry, queue)?;
    match deficit_divest(registry, liquidity.shortfall) {
        Some(AllocationStep::Divest { index, amount }) => {
            Ok(Some(send_divest(vault, registry, index, amount)?))
        }
        _ => Ok(None),
    }
}

/// Pay what the queue can take now, then recall funds for the rest
pub fn settle_queue(
    vault: &mut VaultState,
    registry: &StrategyRegistry,
    queue: &mut WithdrawalQueue,
    limit: usize,
    can_pay: impl Fn(&Pubkey) -> bool,
) -> Result<QueueSettlement> {
    let payouts = queue.drain(vault, registry.total_invested()?, limit, can_pay)?;
    let recall = recall_for_queue(vault, registry, queue)?;
    Ok(QueueSettlement { payouts, recall })
}

/// Move `amount` from idle into strategy `index` and take the lock.
///
/// `reserved` is idle liquidity promised elsewhere (queued withdrawals) that
/// the invest may not touch. The balance is booked as invested immediately;
/// a refund reverses it.
pub fn send_invest(
    vault: &mut VaultState,
    registry: &mut StrategyRegistry,
    index: usize,
    amount: u64,
    reserved: u64,
) -> Result<PendingOperation> {
    require!(amount > 0, VaultError::InsufficientValue);
    require!(
        amount <= vault.available_liquidity()?.saturating_sub(reserved),
        VaultError::InsufficientLiquidity
    );
    let entry = registry
        .strategies
        .get_mut(index)
        .ok_or(VaultError::UnknownStrategy)?;

    let operation =
        vault.begin_operation(PendingOperation::new(OperationKind::Invest, entry.strategy, amount))?;

    vault.idle_balance -= amount;
    entry.invested = entry
        .invested
        .checked_add(amount)
        .ok_or(VaultError::MathOverflow)?;
    Ok(operation)
}

/// Ask strategy `index` for `amount` back and take the lock
pub fn send_divest(
    vault: &mut VaultState,
    registry: &StrategyRegistry,
    index: usize,
    amount: u64,
) -> Result<PendingOperation> {
    require!(amount > 0, VaultError::InsufficientValue);
    let entry = registry
        .strategies
        .get(index)
        .ok_or(VaultError::UnknownStrategy)?;
    vault.begin_operation(PendingOperation::new(OperationKind::Divest, entry.strategy, amount))
}

/// Start moving `amount` from `old` to `new`: a divest now, an invest on refund
pub fn begin_migration(
    vault: &mut VaultState,
    registry: &StrategyRegistry,
    old: &Pubkey,
    new: &Pubkey,
    amount: u64,
    min_amount_out: u64,
) -> Result<PendingOperation> {
    require!(amount > 0, VaultError::InsufficientValue);
    require!(old != new, VaultError::InvalidMigration);
    let source = registry.get(old).ok_or(VaultError::UnknownStrategy)?;
    registry.get(new).ok_or(VaultError::UnknownStrategy)?;
    require!(amount <= source.invested, VaultError::InvalidMigration);

    vault.begin_operation(
        PendingOperation::new(OperationKind::Migrate, *old, amount).with_migration(*new, min_amount_out),
    )
}

/// Recall everything from every funded strategy.
///
/// Supersedes whatever was in flight. Holds the lock until each recalled
/// strategy has refunded; with nothing invested the lock is left free.
pub fn begin_panic(vault: &mut VaultState, registry: &mut StrategyRegistry) -> Result<PanicPlan> {
    let superseded = vault.force_unlock();

    let mut targets = Vec::new();
    let mut total = 0u64;
    for entry in registry.strategies.iter_mut() {
        entry.awaiting_panic_refund = entry.invested > 0;
        if entry.awaiting_panic_refund {
            targets.push((entry.strategy, entry.invested));
            total = total
                .checked_add(entry.invested)
                .ok_or(VaultError::MathOverflow)?;
        }
    }

    let operation = if targets.is_empty() {
        None
    } else {
        Some(vault.begin_operation(
            PendingOperation::new(OperationKind::Panic, Pubkey::default(), total)
                .with_outstanding(targets.len() as u8),
        )?)
    };

    Ok(PanicPlan {
        superseded,
        targets,
        operation,
    })
}

/// A strategy acknowledges its pending invest
pub fn confirm(
    vault: &mut VaultState,
    registry: &StrategyRegistry,
    strategy: &Pubkey,
    op_id: u64,
) -> Result<PendingOperation> {
    let pending = vault.pending_for_reply(op_id)?;
    require!(
        pending.kind == OperationKind::Invest && pending.strategy == *strategy,
        VaultError::UnexpectedReply
    );
    registry.position(strategy)?;

    vault.finish_operation();
    Ok(pending)
}

/// A strategy returns `amount` against the pending operation.
///
/// A migration forwards at most the returned funds not `reserved` for
/// queued withdrawals.
pub fn refund(
    vault: &mut VaultState,
    registry: &mut StrategyRegistry,
    strategy: &Pubkey,
    op_id: u64,
    amount: u64,
    reserved: u64,
) -> Result<RefundOutcome> {
    let mut pending = vault.pending_for_reply(op_id)?;
    let index = registry.position(strategy)?;
    let entry = &mut registry.strategies[index];

    if pending.kind == OperationKind::Panic {
        require!(entry.awaiting_panic_refund, VaultError::UnexpectedReply);
    } else {
        require!(pending.strategy == *strategy, VaultError::UnexpectedReply);
    }

    vault.idle_balance = vault
        .idle_balance
        .checked_add(amount)
        .ok_or(VaultError::MathOverflow)?;

    if pending.kind == OperationKind::Panic {
        entry.awaiting_panic_refund = false;
        entry.invested = 0;

        pending.outstanding = pending.outstanding.saturating_sub(1);
        if pending.outstanding == 0 {
            vault.finish_operation();
        } else {
            vault.pending = Some(pending);
        }
        return Ok(RefundOutcome::PanicProgress {
            operation: pending,
            remaining: pending.outstanding,
        });
    }

    entry.invested = entry.invested.saturating_sub(amount);
    vault.finish_operation();

    if pending.kind != OperationKind::Migrate {
        return Ok(RefundOutcome::Settled(pending));
    }

    let destination = pending.migrate_to.ok_or(VaultError::InvalidMigration)?;
    let to_index = registry.position(&destination)?;
    let forward = amount.min(vault.available_liquidity()?.saturating_sub(reserved));

    if forward == 0 || forward < pending.min_amount_out {
        return Ok(RefundOutcome::MigrationAborted {
            operation: pending,
            returned: amount,
        });
    }

    let next = send_invest(vault, registry, to_index, forward, reserved)?;
    Ok(RefundOutcome::Forwarded {
        operation: pending,
        next,
        to_index,
    })
}

/// Settle a refund, then let the freed liquidity serve the queue.
///
/// Queued withdrawals are valued before the refund lands, so a migration
/// never forwards funds the queue is waiting on. Up to `limit` requests are
/// examined; if the lock is free afterwards and the queue is still short, a
/// divest for the rest goes out.
#[allow(clippy::too_many_arguments)]
pub fn settle_refund(
    vault: &mut VaultState,
    registry: &mut StrategyRegistry,
    queue: &mut WithdrawalQueue,
    strategy: &Pubkey,
    op_id: u64,
    amount: u64,
    limit: usize,
    can_pay: impl Fn(&Pubkey) -> bool,
) -> Result<RefundSettlement> {
    let reserved = Liquidity::of(vault, registry, queue)?.queued;
    let outcome = refund(vault, registry, strategy, op_id, amount, reserved)?;
    let queue = settle_queue(vault, registry, queue, limit, can_pay)?;
    Ok(RefundSettlement { outcome, queue })
}

/// Apply a strategy's report of its current value.
///
/// Profit is bounded by `MAX_PROFIT_REPORT_BPS` of the invested balance and
/// rejected whole when above it. Fees are booked as liabilities before the
/// new value lands, so only the holders' remainder moves the price.
pub fn report_assets(
    vault: &mut VaultState,
    registry: &mut StrategyRegistry,
    strategy: &Pubkey,
    new_assets_value: u64,
    now: i64,
) -> Result<HarvestReport> {
    let index = registry.position(strategy)?;
    let entry = &mut registry.strategies[index];

    require!(
        entry.last_harvest == 0 || now >= entry.last_harvest.saturating_add(HARVEST_COOLDOWN_SECS),
        VaultError::HarvestCooldownActive
    );
    if let Some(pending) = vault.pending.filter(|_| vault.processing) {
        require!(
            !pending.involves(strategy) && !entry.awaiting_panic_refund,
            VaultError::AlreadyProcessing
        );
    }

    let mut report = HarvestReport {
        previous_value: entry.invested,
        ..HarvestReport::default()
    };

    if new_assets_value > entry.invested {
        let profit = new_assets_value - entry.invested;
        let ceiling = bps_of(entry.invested, MAX_PROFIT_REPORT_BPS as u16)?;
        require!(profit <= ceiling, VaultError::ExcessiveProfitReport);

        let split = split_profit(profit, &vault.fee_config, vault.keeper_bounty_bps)?;
        let burn_to_sink = entry.category == StrategyCategory::Nova && vault.nova_sink.is_some();

        let admin_share = if burn_to_sink {
            vault.accrued_burn_fees = vault
                .accrued_burn_fees
                .checked_add(split.burn_fee)
                .ok_or(VaultError::MathOverflow)?;
            split.performance_fee
        } else {
            split.performance_fee + split.burn_fee
        };
        vault.accrued_admin_fees = vault
            .accrued_admin_fees
            .checked_add(admin_share)
            .ok_or(VaultError::MathOverflow)?;
        vault.accrued_keeper_rewards = vault
            .accrued_keeper_rewards
            .checked_add(split.keeper_bounty)
            .ok_or(VaultError::MathOverflow)?;

        report.profit = profit;
        report.split = split;
        report.burn_to_sink = burn_to_sink;
    } else {
        report.loss = entry.invested - new_assets_value;
    }

    entry.invested = new_assets_value;
    entry.last_harvest = now;
    vault.last_harvest = now;
    Ok(report)
}
