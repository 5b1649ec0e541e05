use std::time::Duration;

use alloy_primitives::{Address, B256, U256};
use thiserror::Error;

use crate::flags::HookFlags;

pub type Result<T> = std::result::Result<T, MinerError>;

#[derive(Debug, Error)]
pub enum MinerError {
    #[error("hook flags {bits:#x} fall outside the permission mask {mask:#06x}")]
    InvalidFlagMask { bits: u64, mask: u16 },
    #[error("unknown hook flag `{0}`")]
    UnknownFlag(String),
    #[error("flag {flag} requires {requires}")]
    InconsistentFlags {
        flag: &'static str,
        requires: &'static str,
    },
    #[error("salt range starting at {start} with {max_iterations} iterations overflows 256 bits")]
    SaltOverflow { start: U256, max_iterations: u64 },
    #[error("no salt in {searched} attempts from {start} yields an address with flags {flags}")]
    NoSaltFound {
        start: U256,
        searched: u64,
        flags: HookFlags,
    },
    #[error("search deadline exceeded after {searched} attempts ({elapsed:?})")]
    DeadlineExceeded { searched: u64, elapsed: Duration },
    #[error("failed to build mining thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Failures after a salt has been mined. None of these are recoverable by
/// retrying the same deployment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerifyError {
    #[error("salt {salt} derives {derived}, not the recorded {recorded}")]
    PredictionMismatch {
        salt: B256,
        recorded: Address,
        derived: Address,
    },
    #[error("address {address} does not carry hook flags {flags}")]
    FlagMismatch { address: Address, flags: HookFlags },
    #[error("init code hash changed from {mined} to {current}; the mined salt is stale")]
    InitCodeDrift { mined: B256, current: B256 },
    #[error("deployed address {actual} does not match predicted {predicted}")]
    AddressMismatch { predicted: Address, actual: Address },
}
