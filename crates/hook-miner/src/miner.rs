use std::collections::HashSet;
use std::time::{Duration, Instant};

use alloy_primitives::{address, Address, B256, U256};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::create2::{init_code_hash, Create2Hasher};
use crate::error::{MinerError, Result};
use crate::flags::HookFlags;

/// Deterministic deployment proxy, present at the same address on most chains.
pub const CREATE2_DEPLOYER: Address = address!("4e59b44847b379578588920cA78FbF26c0B4956C");

/// An exact 14 bit match is expected within 2^14 attempts; this leaves
/// roughly a 1 in 18 000 chance of a miss.
pub const DEFAULT_MAX_ITERATIONS: u64 = 160_444;

/// Salts handed to the pool per round in a parallel search.
const PARALLEL_BATCH: u64 = 1 << 16;

/// Salts between deadline checks in a sequential search.
const DEADLINE_CHECK_INTERVAL: u64 = 4096;

/// Addresses that already hold code. CREATE2 to such an address reverts, so
/// the miner skips them even when the flags match.
pub trait DeployedCode: Sync {
    fn has_code(&self, address: &Address) -> bool;
}

pub struct NoDeployedCode;

impl DeployedCode for NoDeployedCode {
    fn has_code(&self, _address: &Address) -> bool {
        false
    }
}

impl DeployedCode for HashSet<Address> {
    fn has_code(&self, address: &Address) -> bool {
        self.contains(address)
    }
}

static NO_DEPLOYED_CODE: NoDeployedCode = NoDeployedCode;

/// Which salts to try, and for how long.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchBudget {
    pub start: U256,
    pub max_iterations: u64,
    pub deadline: Option<Duration>,
}

impl Default for SearchBudget {
    fn default() -> Self {
        Self {
            start: U256::ZERO,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            deadline: None,
        }
    }
}

impl SearchBudget {
    pub fn new(max_iterations: u64) -> Self {
        Self {
            max_iterations,
            ..Self::default()
        }
    }

    pub fn starting_at(mut self, start: U256) -> Self {
        self.start = start;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    fn check_range(&self) -> Result<()> {
        let last = U256::from(self.max_iterations.saturating_sub(1));
        if self.start.checked_add(last).is_none() {
            return Err(MinerError::SaltOverflow {
                start: self.start,
                max_iterations: self.max_iterations,
            });
        }
        Ok(())
    }

    fn check_deadline(&self, started: Instant, searched: u64) -> Result<()> {
        match self.deadline {
            Some(deadline) if started.elapsed() >= deadline => {
                Err(MinerError::DeadlineExceeded {
                    searched,
                    elapsed: started.elapsed(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Caller must have passed `check_range`.
    #[inline]
    fn salt_at(&self, offset: u64) -> B256 {
        B256::from(self.start + U256::from(offset))
    }
}

/// A salt together with everything needed to reproduce its address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinedSalt {
    pub deployer: Address,
    pub init_code_hash: B256,
    pub flags: HookFlags,
    pub salt: B256,
    pub address: Address,
    /// Salts tried, including the winning one.
    pub attempts: u64,
}

/// Searches for the first salt whose CREATE2 address carries exactly the
/// requested hook flags.
pub struct HookMiner<'a> {
    deployer: Address,
    flags: HookFlags,
    init_code_hash: B256,
    deployed: &'a dyn DeployedCode,
}

impl HookMiner<'static> {
    /// Any in-range mask is mined as given. Whether the pool manager will
    /// accept the combination is [`HookFlags::validate`]'s concern.
    pub fn new(deployer: Address, flags: HookFlags, init_code_hash: B256) -> Result<Self> {
        Ok(Self {
            deployer,
            flags,
            init_code_hash,
            deployed: &NO_DEPLOYED_CODE,
        })
    }

    pub fn for_init_code(
        deployer: Address,
        flags: HookFlags,
        creation_code: &[u8],
        constructor_args: &[u8],
    ) -> Result<Self> {
        Self::new(
            deployer,
            flags,
            init_code_hash(creation_code, constructor_args),
        )
    }
}

impl<'a> HookMiner<'a> {
    pub fn skip_deployed<'b>(self, deployed: &'b dyn DeployedCode) -> HookMiner<'b> {
        HookMiner {
            deployer: self.deployer,
            flags: self.flags,
            init_code_hash: self.init_code_hash,
            deployed,
        }
    }

    pub fn init_code_hash(&self) -> B256 {
        self.init_code_hash
    }

    /// Sequential search in salt order.
    pub fn find(&self, budget: &SearchBudget) -> Result<MinedSalt> {
        budget.check_range()?;
        debug!(
            deployer = %self.deployer,
            flags = %self.flags,
            init_code_hash = %self.init_code_hash,
            start = %budget.start,
            max_iterations = budget.max_iterations,
            "Starting sequential salt search"
        );

        let started = Instant::now();
        let mut hasher = Create2Hasher::new(self.deployer, self.init_code_hash);

        for offset in 0..budget.max_iterations {
            if offset % DEADLINE_CHECK_INTERVAL == 0 {
                budget.check_deadline(started, offset)?;
            }

            let salt = budget.salt_at(offset);
            let address = hasher.address(&salt);
            if self.accept(&address) {
                return Ok(self.mined(salt, address, offset + 1, started));
            }
        }

        Err(self.exhausted(budget))
    }

    /// Parallel search over `threads` workers (0 picks one per core).
    ///
    /// Batches are searched in order and each batch keeps its sequentially
    /// first match, so the result is the same salt `find` returns.
    pub fn find_parallel(&self, budget: &SearchBudget, threads: usize) -> Result<MinedSalt> {
        budget.check_range()?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()?;
        debug!(
            deployer = %self.deployer,
            flags = %self.flags,
            init_code_hash = %self.init_code_hash,
            start = %budget.start,
            max_iterations = budget.max_iterations,
            threads = pool.current_num_threads(),
            "Starting parallel salt search"
        );

        let started = Instant::now();
        let mut offset = 0u64;

        while offset < budget.max_iterations {
            budget.check_deadline(started, offset)?;
            let end = offset
                .saturating_add(PARALLEL_BATCH)
                .min(budget.max_iterations);

            let found = pool.install(|| {
                (offset..end)
                    .into_par_iter()
                    .map_init(
                        || Create2Hasher::new(self.deployer, self.init_code_hash),
                        |hasher, i| {
                            let salt = budget.salt_at(i);
                            (i, salt, hasher.address(&salt))
                        },
                    )
                    .find_first(|(_, _, address)| self.accept(address))
            });

            if let Some((i, salt, address)) = found {
                return Ok(self.mined(salt, address, i + 1, started));
            }

            debug!(searched = end, elapsed = ?started.elapsed(), "Batch exhausted");
            offset = end;
        }

        Err(self.exhausted(budget))
    }

    #[inline]
    fn accept(&self, address: &Address) -> bool {
        if !self.flags.matches(address) {
            return false;
        }
        if self.deployed.has_code(address) {
            debug!(%address, "Skipping address that already holds code");
            return false;
        }
        true
    }

    fn mined(&self, salt: B256, address: Address, attempts: u64, started: Instant) -> MinedSalt {
        info!(
            %salt,
            %address,
            attempts,
            elapsed = ?started.elapsed(),
            "Found hook salt"
        );
        MinedSalt {
            deployer: self.deployer,
            init_code_hash: self.init_code_hash,
            flags: self.flags,
            salt,
            address,
            attempts,
        }
    }

    fn exhausted(&self, budget: &SearchBudget) -> MinerError {
        MinerError::NoSaltFound {
            start: budget.start,
            searched: budget.max_iterations,
            flags: self.flags,
        }
    }
}

/// One-shot search with the default budget.
pub fn find_salt(
    deployer: Address,
    flags: HookFlags,
    creation_code: &[u8],
    constructor_args: &[u8],
) -> Result<MinedSalt> {
    HookMiner::for_init_code(deployer, flags, creation_code, constructor_args)?
        .find(&SearchBudget::default())
}
