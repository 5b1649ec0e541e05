use alloy_primitives::{Address, B256, U256};
use clap::Args;
use eyre::Result;
use hook_miner::{create2_address, HookFlags, CREATE2_DEPLOYER};
use serde_json::json;

use super::InitCodeArgs;

#[derive(Args, Debug)]
pub struct AddressArgs {
    /// Salt as a decimal or 0x-prefixed number.
    #[arg(long)]
    pub salt: U256,

    #[arg(long, env = "DEPLOYER", default_value_t = CREATE2_DEPLOYER)]
    pub deployer: Address,

    #[command(flatten)]
    pub init_code: InitCodeArgs,
}

pub fn run(args: AddressArgs, json: bool) -> Result<()> {
    let init_code_hash = args.init_code.require()?;
    let salt = B256::from(args.salt);
    let address = create2_address(args.deployer, salt, init_code_hash);
    let flags = HookFlags::of_address(&address);

    if json {
        let out = json!({
            "salt": salt,
            "address": address,
            "flags": flags,
            "flagNames": flags.names(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("address: {address}");
        println!("flags:   {flags} ({})", flags.names().join(", "));
    }
    Ok(())
}
