pub mod address;
pub mod flags;
pub mod mine;
pub mod verify;

use std::path::PathBuf;

use alloy_primitives::{Address, B256};
use clap::Args;
use eyre::{eyre, Result, WrapErr};
use hook_miner::{encode_address_args, init_code_hash, MinedSalt};
use tracing::debug;

use crate::artifact;

/// Where the init code comes from. The hash must cover the exact bytes the
/// deployment will broadcast.
#[derive(Args, Debug, Default)]
pub struct InitCodeArgs {
    /// Foundry or Hardhat artifact JSON holding the creation bytecode.
    #[arg(long, conflicts_with = "bytecode")]
    pub artifact: Option<PathBuf>,

    /// Creation bytecode as hex, or `@path` to a file holding it.
    #[arg(long)]
    pub bytecode: Option<String>,

    /// ABI-encoded constructor arguments as hex.
    #[arg(long, conflicts_with = "constructor_addresses")]
    pub constructor_args: Option<String>,

    /// An address constructor argument. Repeat in declaration order.
    #[arg(long = "constructor-address")]
    pub constructor_addresses: Vec<Address>,

    /// Precomputed init code hash, instead of bytecode and arguments.
    #[arg(
        long,
        conflicts_with_all = ["artifact", "bytecode", "constructor_args", "constructor_addresses"]
    )]
    pub init_code_hash: Option<B256>,
}

impl InitCodeArgs {
    /// `None` when no init code source was given.
    pub fn resolve(&self) -> Result<Option<B256>> {
        if let Some(hash) = self.init_code_hash {
            return Ok(Some(hash));
        }

        let creation_code = match (&self.artifact, &self.bytecode) {
            (Some(path), _) => artifact::load_artifact(path)?,
            (None, Some(bytecode)) => artifact::load_bytecode(bytecode)?,
            (None, None) => return Ok(None),
        };
        let constructor_args = self.constructor_args()?;
        let hash = init_code_hash(&creation_code, &constructor_args);

        debug!(
            creation_code_len = creation_code.len(),
            constructor_args_len = constructor_args.len(),
            init_code_hash = %hash,
            "Hashed init code"
        );
        Ok(Some(hash))
    }

    pub fn require(&self) -> Result<B256> {
        self.resolve()?
            .ok_or_else(|| eyre!("one of --artifact, --bytecode or --init-code-hash is required"))
    }

    fn constructor_args(&self) -> Result<Vec<u8>> {
        if !self.constructor_addresses.is_empty() {
            return Ok(encode_address_args(&self.constructor_addresses));
        }
        match &self.constructor_args {
            Some(raw) => artifact::decode_hex(raw).wrap_err("invalid --constructor-args"),
            None => Ok(Vec::new()),
        }
    }
}

pub fn print_mined(mined: &MinedSalt, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(mined)?);
        return Ok(());
    }

    println!("salt:           {}", mined.salt);
    println!("address:        {}", mined.address);
    println!(
        "flags:          {} ({})",
        mined.flags,
        mined.flags.names().join(", ")
    );
    println!("deployer:       {}", mined.deployer);
    println!("init code hash: {}", mined.init_code_hash);
    println!("attempts:       {}", mined.attempts);
    Ok(())
}
