//! Salt mining for Uniswap v4 hook deployments.
//!
//! A hook's permissions are read from the low 14 bits of its address. This
//! crate searches for a CREATE2 salt that lands the hook on an address whose
//! bits match its permissions, and verifies the prediction once deployed.
//!
//! ```no_run
//! use hook_miner::{HookFlags, HookMiner, SearchBudget, CREATE2_DEPLOYER};
//!
//! # fn main() -> hook_miner::Result<()> {
//! let flags = HookFlags::BEFORE_SWAP | HookFlags::AFTER_SWAP;
//! let miner = HookMiner::for_init_code(CREATE2_DEPLOYER, flags, &[0x60, 0x80], &[])?;
//! let mined = miner.find(&SearchBudget::default())?;
//! println!("salt {} -> {}", mined.salt, mined.address);
//! # Ok(())
//! # }
//! ```

pub mod create2;
pub mod error;
pub mod flags;
pub mod miner;
pub mod verify;

pub use create2::{create2_address, encode_address_args, init_code_hash, Create2Hasher};
pub use error::{MinerError, Result, VerifyError};
pub use flags::{HookFlags, ALL_HOOK_MASK};
pub use miner::{
    find_salt, DeployedCode, HookMiner, MinedSalt, NoDeployedCode, SearchBudget,
    CREATE2_DEPLOYER, DEFAULT_MAX_ITERATIONS,
};
pub use verify::verify_deployment;
