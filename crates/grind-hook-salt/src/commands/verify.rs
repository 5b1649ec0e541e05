use std::fs;
use std::path::PathBuf;

use alloy_primitives::Address;
use clap::Args;
use eyre::{Result, WrapErr};
use hook_miner::MinedSalt;
use tracing::{info, warn};

use super::InitCodeArgs;
use crate::broadcast;

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// JSON written by `mine --out`.
    pub mined: PathBuf,

    /// Address the deployment actually produced.
    #[arg(long, conflicts_with = "broadcast")]
    pub actual: Option<Address>,

    /// Foundry broadcast log to read the deployed address from.
    #[arg(long)]
    pub broadcast: Option<PathBuf>,

    /// Contract name to pick from the broadcast log.
    #[arg(long, requires = "broadcast")]
    pub contract: Option<String>,

    /// Re-hash the current bytecode to catch drift since mining.
    #[command(flatten)]
    pub init_code: InitCodeArgs,
}

pub fn run(args: VerifyArgs) -> Result<()> {
    let json = fs::read_to_string(&args.mined)
        .wrap_err_with(|| format!("failed to read {}", args.mined.display()))?;
    let mined: MinedSalt = serde_json::from_str(&json)
        .wrap_err_with(|| format!("{} is not a mined salt record", args.mined.display()))?;

    mined.verify().wrap_err("recorded prediction does not hold")?;
    info!(salt = %mined.salt, address = %mined.address, "Prediction re-derived");

    match args.init_code.resolve()? {
        Some(current) => mined
            .check_init_code(current)
            .wrap_err("re-mine against the current bytecode before deploying")?,
        None => warn!("No bytecode given; skipping init code drift check"),
    }

    let actual = match (&args.actual, &args.broadcast) {
        (Some(actual), _) => Some(*actual),
        (None, Some(path)) => Some(broadcast::load_deployed_address(
            path,
            args.contract.as_deref(),
        )?),
        (None, None) => None,
    };

    match actual {
        Some(actual) => {
            mined
                .verify_deployment(actual)
                .wrap_err("deployment must be discarded")?;
            println!("verified: {actual} matches the mined prediction");
        }
        None => println!("verified: {} is reproducible", mined.address),
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use alloy_primitives::{address, b256, B256, U256};
    use hook_miner::{HookFlags, VerifyError, CREATE2_DEPLOYER};

    const BYTECODE: &str = "0x6080604052348015600f57600080fd5b50";
    const PREDICTED: Address = address!("8c1c3abc1e1e1e928db5446ee1cb1601d659da00");

    /// Writes the 0x1a00 record for constructor(0x0000…4444c5dc…8a90) and
    /// returns its path.
    fn write_record(name: &str) -> PathBuf {
        let mined = MinedSalt {
            deployer: CREATE2_DEPLOYER,
            init_code_hash: b256!(
                "7cd88fcdd9b467ed75adda4b19ee2b8e4b1cd3c5b2fe03e951a2b85ad29adba2"
            ),
            flags: HookFlags::from_bits(0x1a00).unwrap(),
            salt: B256::from(U256::from(11_057u64)),
            address: PREDICTED,
            attempts: 11_058,
        };
        let path = std::env::temp_dir().join(format!(
            "grind_hook_salt_verify_{name}_{}.json",
            std::process::id()
        ));
        fs::write(&path, serde_json::to_string_pretty(&mined).unwrap()).unwrap();
        path
    }

    fn current_code(constructor_args: &str) -> InitCodeArgs {
        InitCodeArgs {
            bytecode: Some(BYTECODE.to_string()),
            constructor_args: Some(constructor_args.to_string()),
            ..Default::default()
        }
    }

    fn verify_args(mined: PathBuf, actual: Address) -> VerifyArgs {
        VerifyArgs {
            mined,
            actual: Some(actual),
            broadcast: None,
            contract: None,
            init_code: current_code(
                "0x000000000000000000000000000000000004444c5dc75cb358380d2e3de08a90",
            ),
        }
    }

    #[test]
    fn test_matching_deployment_passes() {
        let mined = write_record("match");
        let result = run(verify_args(mined.clone(), PREDICTED));
        let _ = fs::remove_file(&mined);

        result.unwrap();
    }

    #[test]
    fn test_mismatched_deployment_is_fatal() {
        let mined = write_record("mismatch");
        // the next 0x1a00 match, salt 17465
        let actual = address!("428a8e69aa69a507da787790290ceb04ed839a00");
        let result = run(verify_args(mined.clone(), actual));
        let _ = fs::remove_file(&mined);

        let err = result.unwrap_err();
        assert!(err.to_string().contains("deployment must be discarded"));
        assert_eq!(
            err.downcast_ref::<VerifyError>(),
            Some(&VerifyError::AddressMismatch {
                predicted: PREDICTED,
                actual,
            })
        );
    }

    #[test]
    fn test_stale_bytecode_is_fatal() {
        let mined = write_record("stale");
        let args = VerifyArgs {
            // last constructor byte flipped
            init_code: current_code(
                "0x000000000000000000000000000000000004444c5dc75cb358380d2e3de08a91",
            ),
            ..verify_args(mined.clone(), PREDICTED)
        };
        let result = run(args);
        let _ = fs::remove_file(&mined);

        assert!(matches!(
            result.unwrap_err().downcast_ref::<VerifyError>(),
            Some(VerifyError::InitCodeDrift { .. })
        ));
    }

    #[test]
    fn test_broadcast_deployment_is_compared() {
        let mined = write_record("broadcast");
        let log = std::env::temp_dir().join(format!(
            "grind_hook_salt_run_latest_{}.json",
            std::process::id()
        ));
        fs::write(
            &log,
            r#"{"transactions": [{
                "transactionType": "CREATE2",
                "contractName": "PerpsHook",
                "contractAddress": "0x428a8e69aa69a507da787790290ceb04ed839a00"
            }]}"#,
        )
        .unwrap();

        let args = VerifyArgs {
            actual: None,
            broadcast: Some(log.clone()),
            contract: Some("PerpsHook".to_string()),
            ..verify_args(mined.clone(), PREDICTED)
        };
        let result = run(args);
        let _ = fs::remove_file(&mined);
        let _ = fs::remove_file(&log);

        assert!(matches!(
            result.unwrap_err().downcast_ref::<VerifyError>(),
            Some(VerifyError::AddressMismatch { .. })
        ));
    }
}
