pub mod add_strategy;
pub mod cancel_withdrawal;
pub mod claim_reward;
pub mod collect_fees;
pub mod deposit;
pub mod harvest;
pub mod initialize;
pub mod migrate_strategy;
pub mod panic_withdraw;
pub mod process_withdrawals;
pub mod rebalance;
pub mod reset_processing;
pub mod set_fees;
pub mod set_nova_sink;
pub mod set_strategy_allocation;
pub mod strategy_confirmation;
pub mod strategy_refund;
pub mod toggle_pause;
pub mod update_protocol_apy;
pub mod withdraw;

pub use add_strategy::*;
pub use cancel_withdrawal::*;
pub use claim_reward::*;
pub use collect_fees::*;
pub use deposit::*;
pub use harvest::*;
pub use initialize::*;
pub use migrate_strategy::*;
pub use panic_withdraw::*;
pub use process_withdrawals::*;
pub use rebalance::*;
pub use reset_processing::*;
pub use set_fees::*;
pub use set_nova_sink::*;
pub use set_strategy_allocation::*;
pub use strategy_confirmation::*;
pub use strategy_refund::*;
pub use toggle_pause::*;
pub use update_protocol_apy::*;
pub use withdraw::*;
