use clap::Args;
use eyre::Result;
use hook_miner::HookFlags;

#[derive(Args, Debug)]
pub struct FlagsArgs {
    /// Mask or names to decode. Lists every flag when omitted.
    pub mask: Option<HookFlags>,
}

pub fn run(args: FlagsArgs) -> Result<()> {
    let mask = args.mask.unwrap_or(HookFlags::NONE);

    for (name, flag) in HookFlags::NAMED {
        let mark = if mask.contains(flag) { "x" } else { " " };
        println!("[{mark}] {flag}  {name}");
    }

    if let Some(mask) = args.mask {
        println!();
        println!("mask {mask}");
        if let Err(err) = mask.validate() {
            println!("warning: {err}");
        }
    }
    Ok(())
}
