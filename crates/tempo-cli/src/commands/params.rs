use anyhow::{Context, Result};
use clap::Args;
use tempo_core::params::resolve;

use super::run::InterpolationArgs;
use crate::summary::print_resolved_params;

#[derive(Args)]
pub struct ParamsArgs {
    /// Source frame width in pixels
    #[arg(long)]
    pub width: usize,

    /// Source frame height in pixels
    #[arg(long)]
    pub height: usize,

    #[command(flatten)]
    pub interpolation: InterpolationArgs,
}

pub fn run(args: &ParamsArgs) -> Result<()> {
    let config = args.interpolation.to_config();
    let params = resolve(&config, args.width, args.height).context("Invalid parameters")?;
    print_resolved_params(&params, args.width, args.height);
    Ok(())
}
