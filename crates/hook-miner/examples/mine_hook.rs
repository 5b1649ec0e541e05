use alloy_primitives::{address, Address};
use hex_literal::hex;
use hook_miner::{encode_address_args, HookFlags, HookMiner, SearchBudget, CREATE2_DEPLOYER};

const POOL_MANAGER: Address = address!("000000000004444c5dc75cB358380D2e3dE08A90");
const CREATION_CODE: [u8; 17] = hex!("6080604052348015600f57600080fd5b50");

// To run
//
// cargo run -p hook-miner --example mine_hook
fn main() -> hook_miner::Result<()> {
    let flags = HookFlags::AFTER_INITIALIZE
        | HookFlags::BEFORE_ADD_LIQUIDITY
        | HookFlags::BEFORE_REMOVE_LIQUIDITY;
    let constructor_args = encode_address_args(&[POOL_MANAGER]);

    println!("Starting search for hook salt with flags {flags}...");

    let miner =
        HookMiner::for_init_code(CREATE2_DEPLOYER, flags, &CREATION_CODE, &constructor_args)?;

    match miner.find_parallel(&SearchBudget::default(), 0) {
        Ok(mined) => println!("Found address {} for salt {}", mined.address, mined.salt),
        Err(err) => println!("No matching salt found: {err}"),
    }
    Ok(())
}
