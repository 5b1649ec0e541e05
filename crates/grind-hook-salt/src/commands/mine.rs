use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use alloy_primitives::{Address, U256};
use clap::Args;
use eyre::{Result, WrapErr};
use hook_miner::{
    HookFlags, HookMiner, MinerError, SearchBudget, CREATE2_DEPLOYER, DEFAULT_MAX_ITERATIONS,
};
use tracing::{info, warn};

use super::{print_mined, InitCodeArgs};

#[derive(Args, Debug)]
pub struct MineArgs {
    /// Hook flags as a mask (`0x1a00`) or names (`before-swap|after-swap`).
    /// Repeat to combine.
    #[arg(long, env = "HOOK_FLAGS", required = true)]
    pub flags: Vec<HookFlags>,

    /// CREATE2 factory that will deploy the hook.
    #[arg(long, env = "DEPLOYER", default_value_t = CREATE2_DEPLOYER)]
    pub deployer: Address,

    #[command(flatten)]
    pub init_code: InitCodeArgs,

    /// First salt to try.
    #[arg(long, default_value_t = U256::ZERO)]
    pub start_salt: U256,

    /// Salts to try before giving up.
    #[arg(long, env = "MAX_ITERATIONS", default_value_t = DEFAULT_MAX_ITERATIONS)]
    pub max_iterations: u64,

    /// Search in parallel on this many threads (0 = one per core). Without it
    /// the search runs on the current thread. Both return the same salt.
    #[arg(long, env = "MINER_THREADS")]
    pub threads: Option<usize>,

    /// Give up after this many seconds.
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// File of addresses that already hold code, one per line.
    #[arg(long)]
    pub occupied: Option<PathBuf>,

    /// Write the result as JSON for `verify` and deployment scripts.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Refuse flag combinations the pool manager will not register, such as
    /// a returns-delta flag without its callback. Without it they only warn.
    #[arg(long)]
    pub strict: bool,
}

pub fn run(args: MineArgs, json: bool) -> Result<()> {
    let flags = args
        .flags
        .iter()
        .fold(HookFlags::NONE, |acc, flag| acc | *flag);
    if let Err(err) = flags.validate() {
        if args.strict {
            return Err(eyre::Report::new(err).wrap_err("--strict refuses this flag combination"));
        }
        warn!(%err, "Mining flags the pool manager will refuse to register");
    }
    let init_code_hash = args.init_code.require()?;

    let occupied = match &args.occupied {
        Some(path) => read_address_list(path)?,
        None => HashSet::new(),
    };

    let mut budget = SearchBudget::new(args.max_iterations).starting_at(args.start_salt);
    if let Some(secs) = args.timeout_secs {
        budget = budget.with_deadline(Duration::from_secs(secs));
    }

    info!(
        deployer = %args.deployer,
        %flags,
        names = ?flags.names(),
        %init_code_hash,
        occupied = occupied.len(),
        "Mining hook salt"
    );

    let miner = HookMiner::new(args.deployer, flags, init_code_hash)?.skip_deployed(&occupied);
    let result = match args.threads {
        Some(threads) => miner.find_parallel(&budget, threads),
        None => miner.find(&budget),
    };

    let mined = result.map_err(|err| match err {
        MinerError::NoSaltFound { .. } | MinerError::DeadlineExceeded { .. } => {
            eyre::Report::new(err).wrap_err(
                "search budget spent; raise --max-iterations or --timeout-secs, \
                 move --start-salt, or change the constructor arguments",
            )
        }
        other => other.into(),
    })?;

    // cheap to recheck before anything is written
    mined.verify()?;

    if let Some(out) = &args.out {
        fs::write(out, serde_json::to_string_pretty(&mined)?)
            .wrap_err_with(|| format!("failed to write {}", out.display()))?;
        info!(path = %out.display(), "Wrote mined salt");
    }

    print_mined(&mined, json)
}

/// One address per line; blank lines and `#` comments are ignored.
fn read_address_list(path: &Path) -> Result<HashSet<Address>> {
    let contents = fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read {}", path.display()))?;
    parse_address_list(&contents)
}

fn parse_address_list(contents: &str) -> Result<HashSet<Address>> {
    contents
        .lines()
        .enumerate()
        .map(|(i, line)| (i, line.split('#').next().unwrap_or("").trim()))
        .filter(|(_, line)| !line.is_empty())
        .map(|(i, line)| {
            line.parse::<Address>()
                .wrap_err_with(|| format!("line {}: invalid address `{line}`", i + 1))
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use alloy_primitives::address;

    fn recorded_args(max_iterations: u64) -> MineArgs {
        MineArgs {
            flags: vec![HookFlags::from_bits(0x1a00).unwrap()],
            deployer: CREATE2_DEPLOYER,
            init_code: InitCodeArgs {
                bytecode: Some("0x6080604052348015600f57600080fd5b50".to_string()),
                constructor_addresses: vec![address!("000000000004444c5dc75cB358380D2e3dE08A90")],
                ..Default::default()
            },
            start_salt: U256::ZERO,
            max_iterations,
            threads: None,
            timeout_secs: None,
            occupied: None,
            out: None,
            strict: false,
        }
    }

    #[test]
    fn test_run_writes_mined_salt() {
        let out = std::env::temp_dir().join(format!(
            "grind_hook_salt_mine_{}.json",
            std::process::id()
        ));
        let args = MineArgs {
            out: Some(out.clone()),
            ..recorded_args(DEFAULT_MAX_ITERATIONS)
        };

        run(args, true).unwrap();

        let written: hook_miner::MinedSalt =
            serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        let _ = fs::remove_file(&out);
        assert_eq!(
            written.address,
            address!("8c1c3abc1e1e1e928db5446ee1cb1601d659da00")
        );
        assert_eq!(written.attempts, 11_058);
    }

    #[test]
    fn test_run_spent_budget_is_reported() {
        // the recorded match is salt 11057, one past this budget
        let err = run(recorded_args(11_057), false).unwrap_err();

        assert!(err.to_string().contains("search budget spent"));
        assert!(matches!(
            err.downcast_ref::<MinerError>(),
            Some(MinerError::NoSaltFound { searched: 11_057, .. })
        ));
    }

    #[test]
    fn test_strict_refuses_inconsistent_flags() {
        let args = MineArgs {
            flags: vec![HookFlags::AFTER_SWAP_RETURNS_DELTA],
            strict: true,
            ..recorded_args(DEFAULT_MAX_ITERATIONS)
        };

        let err = run(args, false).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MinerError>(),
            Some(MinerError::InconsistentFlags { .. })
        ));
    }

    #[test]
    fn test_parse_address_list() {
        let list = "\
            # hooks already on chain\n\
            0x8c1c3abc1e1e1e928db5446ee1cb1601d659da00\n\
            \n\
            0x428a8e69aa69a507da787790290ceb04ed839a00  # second\n";

        let parsed = parse_address_list(list).unwrap();
        assert_eq!(parsed.len(), 2);
        assert!(parsed.contains(&address!("8c1c3abc1e1e1e928db5446ee1cb1601d659da00")));
        assert!(parsed.contains(&address!("428a8e69aa69a507da787790290ceb04ed839a00")));
    }

    #[test]
    fn test_parse_address_list_reports_line() {
        let err = parse_address_list("0x8c1c3abc1e1e1e928db5446ee1cb1601d659da00\nnope\n")
            .unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
