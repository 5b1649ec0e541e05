//! Reads the deployed address out of a Foundry broadcast log
//! (`broadcast/<Script>.s.sol/<chain>/run-latest.json`).

use std::fs;
use std::path::Path;

use alloy_primitives::Address;
use eyre::{bail, eyre, Result, WrapErr};
use serde::Deserialize;

#[derive(Deserialize)]
struct Broadcast {
    transactions: Vec<BroadcastTransaction>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BroadcastTransaction {
    transaction_type: String,
    contract_name: Option<String>,
    contract_address: Option<Address>,
}

pub fn load_deployed_address(path: &Path, contract: Option<&str>) -> Result<Address> {
    let json = fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read broadcast {}", path.display()))?;
    create2_deployment(&json, contract)
        .wrap_err_with(|| format!("no usable CREATE2 deployment in {}", path.display()))
}

/// The address of the single CREATE2 deployment, optionally filtered by
/// contract name.
pub fn create2_deployment(json: &str, contract: Option<&str>) -> Result<Address> {
    let broadcast: Broadcast = serde_json::from_str(json).wrap_err("not a broadcast log")?;

    let candidates: Vec<(Option<String>, Address)> = broadcast
        .transactions
        .into_iter()
        .filter(|tx| tx.transaction_type == "CREATE2")
        .filter(|tx| match contract {
            Some(name) => tx.contract_name.as_deref() == Some(name),
            None => true,
        })
        .filter_map(|tx| tx.contract_address.map(|address| (tx.contract_name, address)))
        .collect();

    match candidates.as_slice() {
        [] => Err(eyre!(
            "no CREATE2 transaction{}",
            contract.map(|name| format!(" for {name}")).unwrap_or_default()
        )),
        [(_, address)] => Ok(*address),
        many => {
            let names: Vec<&str> = many
                .iter()
                .map(|(name, _)| name.as_deref().unwrap_or("<unnamed>"))
                .collect();
            bail!(
                "{} CREATE2 deployments ({}); pick one with --contract",
                many.len(),
                names.join(", ")
            )
        }
    }
}
