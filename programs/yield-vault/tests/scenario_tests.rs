/// Scenario tests for the vault engine
///
/// These drive the planning and settlement functions the instruction
/// handlers call, without token CPIs, across whole flows.
///
/// Coverage:
///  Solvency invariant after every step
///  First-deposit bootstrap and monotonic PPS
///  Single-flight lock and reply correlation
///  Rebalance ordering
///  Panic then recover
///  Withdrawal queue idempotence and cancellation
///  Queue liquidity reserved for queued requests and recalled until paid
///  Migration, profit bounds, keeper claim lock
use anchor_lang::prelude::*;
use yield_vault::{
    allocation::{self, AllocationStep, Liquidity, RefundOutcome, WithdrawalPlan},
    constants::*,
    fees::FeeConfig,
    state::*,
};

fn new_vault(fee_config: FeeConfig, keeper_bounty_bps: u16) -> VaultState {
    VaultState {
        admin: Pubkey::new_unique(),
        recovery_admin: Pubkey::new_unique(),
        apy_oracle: Pubkey::new_unique(),
        asset_mint: Pubkey::new_unique(),
        share_mint: Pubkey::new_unique(),
        total_shares: 0,
        idle_balance: 0,
        paused: false,
        processing: false,
        pending: None,
        next_operation_id: 1,
        fee_config,
        keeper_bounty_bps,
        nova_sink: None,
        accrued_admin_fees: 0,
        accrued_burn_fees: 0,
        accrued_keeper_rewards: 0,
        last_harvest: 0,
        bump: 0,
        share_bump: 0,
        authority_bump: 0,
        _reserved: [0; 128],
    }
}

fn new_registry(weights: &[u16]) -> StrategyRegistry {
    let mut registry = StrategyRegistry {
        vault: Pubkey::new_unique(),
        strategies: Vec::new(),
        bump: 0,
    };
    for &weight in weights {
        registry
            .add_strategy(
                Pubkey::new_unique(),
                Pubkey::new_unique(),
                weight,
                StrategyCategory::Standard,
            )
            .unwrap();
    }
    registry
}

fn new_queue() -> WithdrawalQueue {
    WithdrawalQueue {
        vault: Pubkey::new_unique(),
        next_sequence: 0,
        requests: Vec::new(),
        bump: 0,
    }
}

fn total_assets(vault: &VaultState, registry: &StrategyRegistry) -> u64 {
    vault.total_assets(registry.total_invested().unwrap()).unwrap()
}

fn pps(vault: &VaultState, registry: &StrategyRegistry) -> u128 {
    vault.current_pps(total_assets(vault, registry)).unwrap()
}

/// Deposit through the handler's planning, minus the token movements
fn deposit(vault: &mut VaultState, registry: &StrategyRegistry, amount: u64) -> Result<u64> {
    let shares = allocation::plan_deposit(vault, total_assets(vault, registry), amount, 0)?;
    vault.record_deposit(amount, shares)?;
    Ok(shares)
}

/// Run the next rebalance step and settle it with the strategy's reply
fn rebalance_and_settle(
    vault: &mut VaultState,
    registry: &mut StrategyRegistry,
    queue: &mut WithdrawalQueue,
) -> Option<AllocationStep> {
    let liquidity = Liquidity::of(vault, registry, queue).unwrap();
    let step = allocation::next_step(registry, &liquidity).unwrap()?;
    match step {
        AllocationStep::Invest { index, amount } => {
            let op = allocation::send_invest(vault, registry, index, amount, liquidity.queued).unwrap();
            let strategy = registry.strategies[index].strategy;
            allocation::confirm(vault, registry, &strategy, op.id).unwrap();
        }
        AllocationStep::Divest { index, amount } => {
            let op = allocation::send_divest(vault, registry, index, amount).unwrap();
            let strategy = registry.strategies[index].strategy;
            let limit = AUTO_DRAIN_LIMIT as usize;
            allocation::settle_refund(vault, registry, queue, &strategy, op.id, amount, limit, |_| true).unwrap();
        }
    }
    Some(step)
}

/// Queue a withdrawal the way the handler does once shares are burned
fn request_withdrawal(
    vault: &mut VaultState,
    registry: &StrategyRegistry,
    queue: &mut WithdrawalQueue,
    shares: u64,
    receiver: Pubkey,
) -> (WithdrawalPlan, Option<PendingOperation>) {
    let liquidity = Liquidity::of(vault, registry, queue).unwrap();
    let plan = allocation::plan_withdrawal(vault, &liquidity, shares, 0).unwrap();
    match plan {
        WithdrawalPlan::Pay { gross, split } => {
            vault.apply_withdrawal(shares, gross, &split).unwrap();
            (plan, None)
        }
        WithdrawalPlan::Queue { .. } => {
            queue.enqueue(Pubkey::new_unique(), receiver, shares, 0).unwrap();
            (plan, allocation::recall_for_queue(vault, registry, queue).unwrap())
        }
    }
}

/// net_assets == total_shares * pps / PPS_PRECISION, within one unit of rounding
fn assert_solvent(vault: &VaultState, registry: &StrategyRegistry) {
    assert_eq!(vault.processing, vault.pending.is_some());
    if vault.total_shares == 0 {
        return;
    }
    let assets = total_assets(vault, registry) as u128;
    let implied = vault.total_shares as u128 * pps(vault, registry) / PPS_PRECISION;
    assert!(implied <= assets, "implied {} above net assets {}", implied, assets);
    assert!(assets - implied <= 1, "implied {} too far below {}", implied, assets);
}

// =============================================================================
// Full lifecycle
// =============================================================================

#[test]
fn test_deposit_invest_harvest_withdraw_lifecycle() {
    let fees = FeeConfig {
        performance_bps: 500,
        burn_bps: 500,
        withdrawal_bps: 10,
    };
    let mut vault = new_vault(fees, 0);
    let mut registry = new_registry(&[7000, 3000]);
    let mut queue = new_queue();

    // Bootstrap: 1:1 and PPS at precision
    let shares = deposit(&mut vault, &registry, 1_000_000).unwrap();
    assert_eq!(shares, 1_000_000);
    assert_eq!(pps(&vault, &registry), PPS_PRECISION);

    // Two steps fund both strategies in registry order
    assert_eq!(
        rebalance_and_settle(&mut vault, &mut registry, &mut queue),
        Some(AllocationStep::Invest { index: 0, amount: 700_000 })
    );
    assert_eq!(
        rebalance_and_settle(&mut vault, &mut registry, &mut queue),
        Some(AllocationStep::Invest { index: 1, amount: 300_000 })
    );
    assert_eq!(rebalance_and_settle(&mut vault, &mut registry, &mut queue), None);
    assert_eq!(vault.idle_balance, 0);
    assert_solvent(&vault, &registry);

    // 10% profit on the first strategy; 10% of it goes to fees
    let s0 = registry.strategies[0].strategy;
    let before = pps(&vault, &registry);
    let report = allocation::report_assets(&mut vault, &mut registry, &s0, 770_000, 10_000).unwrap();
    assert_eq!(report.profit, 70_000);
    assert_eq!(vault.accrued_admin_fees, 7_000);
    assert_eq!(total_assets(&vault, &registry), 1_063_000);
    assert!(pps(&vault, &registry) > before);
    assert_solvent(&vault, &registry);

    // Nothing idle: the withdrawal queues and recalls the shortfall, fees included
    let receiver = Pubkey::new_unique();
    let (plan, recall) = request_withdrawal(&mut vault, &registry, &mut queue, 100_000, receiver);
    assert_eq!(plan, WithdrawalPlan::Queue { gross: 106_300 });
    let recall = recall.expect("queue shortfall recalled");
    assert_eq!(recall.strategy, s0);
    assert_eq!(recall.amount, 113_300);

    // The refund pays the request straight away
    let settlement = allocation::settle_refund(
        &mut vault,
        &mut registry,
        &mut queue,
        &s0,
        recall.id,
        recall.amount,
        AUTO_DRAIN_LIMIT as usize,
        |r| *r == receiver,
    )
    .unwrap();
    assert_eq!(settlement.outcome, RefundOutcome::Settled(recall));
    assert_eq!(settlement.queue.recall, None);
    let paid = settlement.queue.payouts;
    assert_eq!(paid.len(), 1);
    assert_eq!(paid[0].gross, 106_300);
    assert_eq!(paid[0].fee, 106);
    assert_eq!(paid[0].payout, 106_194);
    assert_eq!(vault.total_shares, 900_000);
    assert_eq!(vault.accrued_admin_fees, 7_106);
    assert_eq!(vault.idle_balance, 7_106);

    // Price unchanged for the holders who stayed
    assert_eq!(pps(&vault, &registry), 1_063_000_000_000);
    assert_solvent(&vault, &registry);
}

// =============================================================================
// Single-flight lock
// =============================================================================

#[test]
fn test_single_flight_blocks_allocation_but_not_idle_withdrawals() {
    let mut vault = new_vault(FeeConfig::default(), 0);
    let mut registry = new_registry(&[5000, 5000]);
    deposit(&mut vault, &registry, 100_000).unwrap();

    let op = allocation::send_invest(&mut vault, &mut registry, 0, 60_000, 0).unwrap();
    let (s0, s1) = (registry.strategies[0].strategy, registry.strategies[1].strategy);

    assert!(deposit(&mut vault, &registry, 1_000).is_err());
    assert!(allocation::send_invest(&mut vault, &mut registry, 1, 10_000, 0).is_err());
    assert!(allocation::send_divest(&mut vault, &registry, 0, 10_000).is_err());
    assert!(allocation::begin_migration(&mut vault, &registry, &s0, &s1, 10_000, 0).is_err());

    // Withdrawals payable from idle still go through
    let (gross, split) = vault.quote_withdrawal(10_000, total_assets(&vault, &registry)).unwrap();
    vault.apply_withdrawal(10_000, gross, &split).unwrap();
    assert_eq!(vault.idle_balance, 30_000);

    // Replies must name the right strategy and operation
    assert!(allocation::confirm(&mut vault, &registry, &s1, op.id).is_err());
    assert!(allocation::confirm(&mut vault, &registry, &s0, op.id + 7).is_err());
    allocation::confirm(&mut vault, &registry, &s0, op.id).unwrap();
    assert!(allocation::confirm(&mut vault, &registry, &s0, op.id).is_err());

    deposit(&mut vault, &registry, 1_000).unwrap();
    assert_solvent(&vault, &registry);
}

#[test]
fn test_forced_unlock_keeps_optimistic_booking() {
    let mut vault = new_vault(FeeConfig::default(), 0);
    let mut registry = new_registry(&[10_000]);
    deposit(&mut vault, &registry, 100_000).unwrap();

    let op = allocation::send_invest(&mut vault, &mut registry, 0, 60_000, 0).unwrap();
    let cleared = vault.force_unlock().unwrap();
    assert_eq!(cleared, op);
    assert_eq!(registry.strategies[0].invested, 60_000);
    assert_eq!(total_assets(&vault, &registry), 100_000);

    // The late confirmation is no longer accepted
    let s0 = registry.strategies[0].strategy;
    assert!(allocation::confirm(&mut vault, &registry, &s0, op.id).is_err());
    assert_solvent(&vault, &registry);
}

// =============================================================================
// Rebalancing
// =============================================================================

#[test]
fn test_rebalance_from_seventy_thirty_to_even() {
    let mut vault = new_vault(FeeConfig::default(), 0);
    let mut registry = new_registry(&[7000, 3000]);
    let mut queue = new_queue();
    deposit(&mut vault, &registry, 100_000).unwrap();
    rebalance_and_settle(&mut vault, &mut registry, &mut queue);
    rebalance_and_settle(&mut vault, &mut registry, &mut queue);
    assert_eq!(registry.strategies[0].invested, 70_000);
    assert_eq!(registry.strategies[1].invested, 30_000);

    let (s0, s1) = (registry.strategies[0].strategy, registry.strategies[1].strategy);
    registry.set_allocation(&s0, 5000).unwrap();
    registry.set_allocation(&s1, 5000).unwrap();

    // Divest from the first, then invest into the second
    assert_eq!(
        rebalance_and_settle(&mut vault, &mut registry, &mut queue),
        Some(AllocationStep::Divest { index: 0, amount: 20_000 })
    );
    assert_eq!(
        rebalance_and_settle(&mut vault, &mut registry, &mut queue),
        Some(AllocationStep::Invest { index: 1, amount: 20_000 })
    );
    assert_eq!(registry.strategies[0].invested, 50_000);
    assert_eq!(registry.strategies[1].invested, 50_000);
    assert_solvent(&vault, &registry);
}

#[test]
fn test_retired_strategy_is_drained_by_rebalance() {
    let mut vault = new_vault(FeeConfig::default(), 0);
    let mut registry = new_registry(&[5000, 5000]);
    let mut queue = new_queue();
    deposit(&mut vault, &registry, 100_000).unwrap();
    rebalance_and_settle(&mut vault, &mut registry, &mut queue);
    rebalance_and_settle(&mut vault, &mut registry, &mut queue);

    let s1 = registry.strategies[1].strategy;
    registry.set_allocation(&s1, 0).unwrap();
    assert!(!registry.strategies[1].active);

    assert_eq!(
        rebalance_and_settle(&mut vault, &mut registry, &mut queue),
        Some(AllocationStep::Divest { index: 1, amount: 50_000 })
    );
    assert_eq!(registry.strategies[1].invested, 0);
    assert_eq!(vault.idle_balance, 50_000);
}

#[test]
fn test_apy_update_drives_allocation() {
    let mut vault = new_vault(FeeConfig::default(), 0);
    let mut registry = new_registry(&[5000, 5000]);
    let mut queue = new_queue();
    let (s0, s1) = (registry.strategies[0].strategy, registry.strategies[1].strategy);
    registry.record_apy(&s0, 2000).unwrap();
    registry.record_apy(&s1, 1000).unwrap();
    assert_eq!(registry.strategies[0].weight_bps, 6000);
    assert_eq!(registry.strategies[1].weight_bps, 4000);

    deposit(&mut vault, &registry, 100_000).unwrap();
    rebalance_and_settle(&mut vault, &mut registry, &mut queue);
    rebalance_and_settle(&mut vault, &mut registry, &mut queue);
    assert_eq!(registry.strategies[0].invested, 60_000);
    assert_eq!(registry.strategies[1].invested, 40_000);
}

// =============================================================================
// Panic and recovery
// =============================================================================

#[test]
fn test_panic_then_recover() {
    let mut vault = new_vault(FeeConfig::default(), 0);
    let mut registry = new_registry(&[5000, 5000]);
    let mut queue = new_queue();
    deposit(&mut vault, &registry, 100_000).unwrap();
    rebalance_and_settle(&mut vault, &mut registry, &mut queue);
    rebalance_and_settle(&mut vault, &mut registry, &mut queue);
    let (s0, s1) = (registry.strategies[0].strategy, registry.strategies[1].strategy);

    let receiver = Pubkey::new_unique();
    queue.enqueue(Pubkey::new_unique(), receiver, 50_000, 0).unwrap();

    let plan = allocation::begin_panic(&mut vault, &mut registry).unwrap();
    assert_eq!(plan.targets, vec![(s0, 50_000), (s1, 50_000)]);
    let op = plan.operation.unwrap();

    // First refund: lock still held, queued withdrawal paid from the freed liquidity
    let settlement = allocation::settle_refund(
        &mut vault,
        &mut registry,
        &mut queue,
        &s0,
        op.id,
        50_000,
        AUTO_DRAIN_LIMIT as usize,
        |r| *r == receiver,
    )
    .unwrap();
    assert!(matches!(settlement.outcome, RefundOutcome::PanicProgress { remaining: 1, .. }));
    assert!(vault.processing);
    assert_eq!(settlement.queue.payouts.len(), 1);
    assert_eq!(settlement.queue.recall, None);
    assert_eq!(vault.idle_balance, 0);
    assert!(deposit(&mut vault, &registry, 1_000).is_err());

    // Second strategy returns less than booked; the loss hits PPS
    allocation::refund(&mut vault, &mut registry, &s1, op.id, 49_000, 0).unwrap();
    assert!(!vault.processing);
    assert_eq!(registry.total_invested().unwrap(), 0);
    assert_eq!(pps(&vault, &registry), 980_000_000_000);
    assert_solvent(&vault, &registry);

    // Recovery: deposits and allocation resume
    let shares = deposit(&mut vault, &registry, 51_000).unwrap();
    assert_eq!(shares, 52_040);
    assert_eq!(
        rebalance_and_settle(&mut vault, &mut registry, &mut queue),
        Some(AllocationStep::Invest { index: 0, amount: 50_000 })
    );
    assert_solvent(&vault, &registry);
}

// =============================================================================
// Withdrawal queue
// =============================================================================

#[test]
fn test_queue_drains_are_idempotent() {
    let mut vault = new_vault(FeeConfig::default(), 0);
    let registry = new_registry(&[]);
    let mut queue = new_queue();
    deposit(&mut vault, &registry, 1_000).unwrap();
    for _ in 0..3 {
        queue.enqueue(Pubkey::new_unique(), Pubkey::new_unique(), 200, 0).unwrap();
    }

    let first = queue.drain(&mut vault, 0, 10, |_| true).unwrap();
    assert_eq!(first.len(), 3);
    let idle = vault.idle_balance;

    let second = queue.drain(&mut vault, 0, 10, |_| true).unwrap();
    assert!(second.is_empty());
    assert_eq!(vault.idle_balance, idle);
    assert_eq!(vault.total_shares, 400);
}

#[test]
fn test_empty_queue_drain_is_safe() {
    let mut vault = new_vault(FeeConfig::default(), 0);
    let mut queue = new_queue();
    assert!(queue.drain(&mut vault, 0, 5, |_| true).unwrap().is_empty());
}

#[test]
fn test_cancelled_request_keeps_share_supply() {
    let mut vault = new_vault(FeeConfig::default(), 0);
    let mut registry = new_registry(&[10_000]);
    let mut queue = new_queue();
    deposit(&mut vault, &registry, 10_000).unwrap();
    rebalance_and_settle(&mut vault, &mut registry, &mut queue);

    let requester = Pubkey::new_unique();
    let seq = queue.enqueue(requester, Pubkey::new_unique(), 4_000, 0).unwrap();
    let price = pps(&vault, &registry);

    let request = queue.cancel(&requester, seq).unwrap();
    assert_eq!(request.share_amount, 4_000);
    assert_eq!(queue.queued_shares().unwrap(), 0);
    // Queued shares never left total_shares, so the price is untouched
    assert_eq!(vault.total_shares, 10_000);
    assert_eq!(pps(&vault, &registry), price);
}

#[test]
fn test_recalled_liquidity_stays_with_the_queue() {
    let mut vault = new_vault(FeeConfig::default(), 0);
    let mut registry = new_registry(&[10_000]);
    let mut queue = new_queue();
    deposit(&mut vault, &registry, 400_000).unwrap();
    rebalance_and_settle(&mut vault, &mut registry, &mut queue);
    assert_eq!(vault.idle_balance, 0);
    let s0 = registry.strategies[0].strategy;

    // A queues and its shortfall is recalled; B queues behind the busy lock
    let (a, b) = (Pubkey::new_unique(), Pubkey::new_unique());
    let (_, first) = request_withdrawal(&mut vault, &registry, &mut queue, 100_000, a);
    let first = first.unwrap();
    assert_eq!(first.amount, 100_000);
    let (_, none) = request_withdrawal(&mut vault, &registry, &mut queue, 200_000, b);
    assert_eq!(none, None);

    // Refund lands without receiver accounts: nothing paid, the rest is recalled
    let settlement = allocation::settle_refund(
        &mut vault,
        &mut registry,
        &mut queue,
        &s0,
        first.id,
        100_000,
        AUTO_DRAIN_LIMIT as usize,
        |_| false,
    )
    .unwrap();
    assert!(settlement.queue.payouts.is_empty());
    let second = settlement.queue.recall.unwrap();
    assert_eq!(second.amount, 200_000);
    assert_eq!(vault.idle_balance, 100_000);

    // The recalled 100k is neither reinvested nor handed to a newer withdrawal
    let liquidity = Liquidity::of(&vault, &registry, &queue).unwrap();
    assert_eq!(liquidity.free(), 0);
    assert!(!matches!(
        allocation::next_step(&registry, &liquidity).unwrap(),
        Some(AllocationStep::Invest { .. })
    ));
    let plan = allocation::plan_withdrawal(&vault, &liquidity, 50_000, 0).unwrap();
    assert_eq!(plan, WithdrawalPlan::Queue { gross: 50_000 });

    // A is paid by a later drain, B by the second refund
    let drained =
        allocation::settle_queue(&mut vault, &registry, &mut queue, 10, |r| *r == a).unwrap();
    assert_eq!(drained.payouts.len(), 1);
    assert_eq!(drained.recall, None);

    let settlement = allocation::settle_refund(
        &mut vault,
        &mut registry,
        &mut queue,
        &s0,
        second.id,
        200_000,
        AUTO_DRAIN_LIMIT as usize,
        |r| *r == b,
    )
    .unwrap();
    assert_eq!(settlement.queue.payouts.len(), 1);
    assert!(queue.requests.is_empty());
    assert!(!vault.processing);
    assert_eq!(vault.total_shares, 100_000);
    assert_eq!(pps(&vault, &registry), PPS_PRECISION);
    assert_solvent(&vault, &registry);
}

#[test]
fn test_queue_larger_than_one_strategy_is_funded_across_strategies() {
    let mut vault = new_vault(FeeConfig::default(), 0);
    let mut registry = new_registry(&[5000, 5000]);
    let mut queue = new_queue();
    deposit(&mut vault, &registry, 100_000).unwrap();
    rebalance_and_settle(&mut vault, &mut registry, &mut queue);
    rebalance_and_settle(&mut vault, &mut registry, &mut queue);
    let (s0, s1) = (registry.strategies[0].strategy, registry.strategies[1].strategy);

    let receiver = Pubkey::new_unique();
    let (_, recall) = request_withdrawal(&mut vault, &registry, &mut queue, 80_000, receiver);
    let recall = recall.unwrap();
    assert_eq!((recall.strategy, recall.amount), (s0, 50_000));

    // 50k back is not enough for 80k; the remaining 30k comes from the next strategy
    let settlement = allocation::settle_refund(
        &mut vault,
        &mut registry,
        &mut queue,
        &s0,
        recall.id,
        50_000,
        AUTO_DRAIN_LIMIT as usize,
        |_| true,
    )
    .unwrap();
    assert!(settlement.queue.payouts.is_empty());
    let next = settlement.queue.recall.unwrap();
    assert_eq!((next.strategy, next.amount), (s1, 30_000));

    let settlement = allocation::settle_refund(
        &mut vault,
        &mut registry,
        &mut queue,
        &s1,
        next.id,
        30_000,
        AUTO_DRAIN_LIMIT as usize,
        |_| true,
    )
    .unwrap();
    assert_eq!(settlement.queue.payouts.len(), 1);
    assert_eq!(settlement.queue.payouts[0].payout, 80_000);
    assert_eq!(settlement.queue.recall, None);
    assert_eq!(registry.total_invested().unwrap(), 20_000);
    assert_solvent(&vault, &registry);
}

#[test]
fn test_rebalance_resumes_a_stalled_queue() {
    let mut vault = new_vault(FeeConfig::default(), 0);
    let mut registry = new_registry(&[10_000]);
    let mut queue = new_queue();
    deposit(&mut vault, &registry, 100_000).unwrap();
    rebalance_and_settle(&mut vault, &mut registry, &mut queue);

    // Queued while an unrelated operation held the lock, then force-unlocked
    let busy = allocation::send_divest(&mut vault, &registry, 0, 5_000).unwrap();
    let (_, recall) = request_withdrawal(&mut vault, &registry, &mut queue, 40_000, Pubkey::new_unique());
    assert_eq!(recall, None);
    assert_eq!(vault.force_unlock(), Some(busy));

    // Whoever rebalances next recalls for the queue first, and it gets paid
    assert_eq!(
        rebalance_and_settle(&mut vault, &mut registry, &mut queue),
        Some(AllocationStep::Divest { index: 0, amount: 40_000 })
    );
    assert!(queue.requests.is_empty());
    assert_eq!(vault.total_shares, 60_000);
    assert_eq!(rebalance_and_settle(&mut vault, &mut registry, &mut queue), None);
    assert_solvent(&vault, &registry);
}

#[test]
fn test_refund_drains_a_full_queue() {
    let mut vault = new_vault(FeeConfig::default(), 0);
    let mut registry = new_registry(&[10_000]);
    let mut queue = new_queue();
    let deposited = MAX_QUEUED_WITHDRAWALS as u64 * 1_000;
    deposit(&mut vault, &registry, deposited).unwrap();
    rebalance_and_settle(&mut vault, &mut registry, &mut queue);
    let s0 = registry.strategies[0].strategy;

    for _ in 0..MAX_QUEUED_WITHDRAWALS {
        queue.enqueue(Pubkey::new_unique(), Pubkey::new_unique(), 1_000, 0).unwrap();
    }
    let recall = allocation::recall_for_queue(&mut vault, &registry, &queue).unwrap().unwrap();
    assert_eq!(recall.amount, deposited);

    let settlement = allocation::settle_refund(
        &mut vault,
        &mut registry,
        &mut queue,
        &s0,
        recall.id,
        deposited,
        AUTO_DRAIN_LIMIT as usize,
        |_| true,
    )
    .unwrap();
    assert_eq!(settlement.queue.payouts.len(), MAX_QUEUED_WITHDRAWALS);
    assert!(queue.requests.is_empty());
    assert_eq!(vault.total_shares, 0);
}

#[test]
fn test_deposit_invest_leaves_queue_funds_idle() {
    let mut vault = new_vault(FeeConfig::default(), 0);
    let mut registry = new_registry(&[10_000]);
    let mut queue = new_queue();
    deposit(&mut vault, &registry, 100_000).unwrap();
    queue.enqueue(Pubkey::new_unique(), Pubkey::new_unique(), 30_000, 0).unwrap();
    let account = registry.strategies[0].deposit_account;

    // 70k is free and 70k is the target once the queue is paid
    let liquidity = Liquidity::of(&vault, &registry, &queue).unwrap();
    let (index, amount) = allocation::plan_deposit_invest(&registry, &liquidity, &account)
        .unwrap()
        .unwrap();
    assert_eq!((index, amount), (0, 70_000));
    allocation::send_invest(&mut vault, &mut registry, index, amount, liquidity.queued).unwrap();
    assert_eq!(vault.idle_balance, 30_000);

    // Anything beyond the free liquidity is refused
    let mut other = new_vault(FeeConfig::default(), 0);
    deposit(&mut other, &new_registry(&[]), 100_000).unwrap();
    assert!(allocation::send_invest(&mut other, &mut new_registry(&[10_000]), 0, 70_001, 30_000).is_err());
}

// =============================================================================
// Migration
// =============================================================================

#[test]
fn test_migration_preserves_net_assets() {
    let mut vault = new_vault(FeeConfig::default(), 0);
    let mut registry = new_registry(&[10_000, 0]);
    let mut queue = new_queue();
    deposit(&mut vault, &registry, 100_000).unwrap();
    rebalance_and_settle(&mut vault, &mut registry, &mut queue);
    let (old, new) = (registry.strategies[0].strategy, registry.strategies[1].strategy);
    let before = total_assets(&vault, &registry);

    let op = allocation::begin_migration(&mut vault, &registry, &old, &new, 100_000, 99_000).unwrap();
    let RefundOutcome::Forwarded { next, .. } =
        allocation::refund(&mut vault, &mut registry, &old, op.id, 100_000, 0).unwrap()
    else {
        panic!("expected forward");
    };
    allocation::confirm(&mut vault, &registry, &new, next.id).unwrap();

    assert_eq!(registry.strategies[0].invested, 0);
    assert_eq!(registry.strategies[1].invested, 100_000);
    assert_eq!(total_assets(&vault, &registry), before);
    assert_solvent(&vault, &registry);
}

// =============================================================================
// Profit reports and keeper bounty
// =============================================================================

#[test]
fn test_excessive_profit_report_leaves_state_untouched() {
    let mut vault = new_vault(FeeConfig::default(), 0);
    let mut registry = new_registry(&[10_000]);
    let mut queue = new_queue();
    deposit(&mut vault, &registry, 10_000).unwrap();
    rebalance_and_settle(&mut vault, &mut registry, &mut queue);
    let s0 = registry.strategies[0].strategy;
    let price = pps(&vault, &registry);

    assert!(allocation::report_assets(&mut vault, &mut registry, &s0, 100_000, 10_000).is_err());
    assert_eq!(registry.strategies[0].invested, 10_000);
    assert_eq!(vault.last_harvest, 0);
    assert_eq!(pps(&vault, &registry), price);
}

#[test]
fn test_keeper_bounty_accrues_and_unlocks() {
    let fees = FeeConfig {
        performance_bps: 1000,
        burn_bps: 0,
        withdrawal_bps: 0,
    };
    let mut vault = new_vault(fees, 100);
    let mut registry = new_registry(&[10_000]);
    let mut queue = new_queue();
    deposit(&mut vault, &registry, 100_000).unwrap();
    rebalance_and_settle(&mut vault, &mut registry, &mut queue);
    let s0 = registry.strategies[0].strategy;

    let mut reward = KeeperReward {
        vault: Pubkey::new_unique(),
        keeper: Pubkey::new_unique(),
        accrued: 0,
        last_harvest: 0,
        bump: 0,
    };

    let now = 50_000;
    let report = allocation::report_assets(&mut vault, &mut registry, &s0, 110_000, now).unwrap();
    reward.credit(report.split.keeper_bounty, now).unwrap();
    assert_eq!(report.split.keeper_bounty, 100);
    assert_eq!(vault.accrued_keeper_rewards, 100);
    // 10_000 profit - 1_000 performance - 100 bounty
    assert_eq!(total_assets(&vault, &registry), 108_900);

    assert!(reward.claimable(now + KEEPER_CLAIM_LOCK_SECS - 1).is_err());
    assert_eq!(reward.claimable(now + KEEPER_CLAIM_LOCK_SECS).unwrap(), 100);

    // Second report inside the cooldown is refused
    assert!(allocation::report_assets(&mut vault, &mut registry, &s0, 111_000, now + 60).is_err());
    assert_solvent(&vault, &registry);
}

#[test]
fn test_pps_is_monotonic_under_valid_profit() {
    let fees = FeeConfig {
        performance_bps: 2000,
        burn_bps: 1000,
        withdrawal_bps: 0,
    };
    let mut vault = new_vault(fees, 500);
    let mut registry = new_registry(&[10_000]);
    let mut queue = new_queue();
    deposit(&mut vault, &registry, 1_000_000).unwrap();
    rebalance_and_settle(&mut vault, &mut registry, &mut queue);
    let s0 = registry.strategies[0].strategy;

    let mut price = pps(&vault, &registry);
    let mut now = 0;
    for _ in 0..5 {
        now += HARVEST_COOLDOWN_SECS;
        let value = registry.strategies[0].invested + 12_345;
        allocation::report_assets(&mut vault, &mut registry, &s0, value, now).unwrap();
        let next = pps(&vault, &registry);
        assert!(next > price);
        price = next;
        assert_solvent(&vault, &registry);
    }
}
