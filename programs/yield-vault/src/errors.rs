use anchor_lang::prelude::*;

/// Custom error codes for the Yield Vault program
#[error_code]
pub enum VaultError {
    #[msg("Vault is paused - deposits are disabled")]
    Paused,

    #[msg("Unauthorized - only the vault admin can perform this action")]
    NotAdmin,

    #[msg("An allocation operation is already awaiting a strategy reply")]
    AlreadyProcessing,

    #[msg("Output below the caller's minimum")]
    SlippageExceeded,

    #[msg("Reported profit exceeds the allowed ceiling")]
    ExcessiveProfitReport,

    #[msg("Amount must be greater than zero")]
    InsufficientValue,

    #[msg("Strategy reported too recently")]
    HarvestCooldownActive,

    #[msg("Keeper reward is still locked")]
    ClaimLockActive,

    #[msg("Strategy not found in registry")]
    UnknownStrategy,

    #[msg("Math overflow occurred during calculation")]
    MathOverflow,

    #[msg("Cannot divide by zero - vault has no shares")]
    DivisionByZero,

    #[msg("Invalid token mint - does not match vault asset")]
    InvalidMint,

    #[msg("Invalid token account owner")]
    InvalidOwner,

    #[msg("Strategy already exists in registry")]
    StrategyAlreadyExists,

    #[msg("Strategy registry is full - maximum strategies reached")]
    RegistryFull,

    #[msg("Weight must be at most 10000 bps")]
    InvalidWeight,

    #[msg("Reported APY exceeds maximum allowed")]
    InvalidApy,

    #[msg("Fee configuration exceeds allowed ceilings")]
    InvalidFeeConfig,

    #[msg("Withdrawal queue is full")]
    WithdrawalQueueFull,

    #[msg("Queued withdrawal not found")]
    WithdrawalNotFound,

    #[msg("Not enough idle liquidity")]
    InsufficientLiquidity,

    #[msg("Reply does not match the pending operation")]
    UnexpectedReply,

    #[msg("Required strategy token account was not supplied")]
    MissingStrategyAccount,

    #[msg("Invalid migration request")]
    InvalidMigration,

    #[msg("Every strategy is already at its target")]
    NothingToRebalance,

    #[msg("Nothing to claim")]
    NothingToClaim,
}
