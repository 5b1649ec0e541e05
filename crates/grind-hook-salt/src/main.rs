//! Mine a CREATE2 salt that deploys a Uniswap v4 hook to an address carrying
//! its permission flags, then check the deployment landed there.
//!
//! ```sh
//! # Mine against a Foundry artifact, constructor(IPoolManager)
//! grind-hook-salt mine \
//!     --flags after-initialize --flags before-add-liquidity --flags before-remove-liquidity \
//!     --artifact out/PerpsHook.sol/PerpsHook.json \
//!     --constructor-address 0x000000000004444c5dc75cB358380D2e3dE08A90 \
//!     --threads 0 --out mined.json
//!
//! # After broadcasting with the mined salt
//! grind-hook-salt verify mined.json \
//!     --broadcast broadcast/DeployHook.s.sol/1/run-latest.json --contract PerpsHook
//! ```
//!
//! Settings can also come from a `.env` file: `DEPLOYER`, `HOOK_FLAGS`,
//! `MAX_ITERATIONS`, `MINER_THREADS`. Logs go to stderr, `RUST_LOG` sets the
//! level.

mod artifact;
mod broadcast;
mod commands;

use clap::{Parser, Subcommand};
use eyre::Result;

#[derive(Parser, Debug)]
#[command(
    name = "grind-hook-salt",
    version,
    about = "Mine CREATE2 salts for Uniswap v4 hook addresses"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output results as JSON.
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search for a salt whose address carries the hook flags.
    Mine(commands::mine::MineArgs),

    /// Derive the address for a given salt.
    Address(commands::address::AddressArgs),

    /// Check a mined salt against the bytecode and the deployed address.
    Verify(commands::verify::VerifyArgs),

    /// List hook flags, or decode a mask.
    Flags(commands::flags::FlagsArgs),
}

fn main() -> Result<()> {
    // a missing .env is not an error
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Mine(args) => commands::mine::run(args, cli.json),
        Commands::Address(args) => commands::address::run(args, cli.json),
        Commands::Verify(args) => commands::verify::run(args),
        Commands::Flags(args) => commands::flags::run(args),
    }
}
