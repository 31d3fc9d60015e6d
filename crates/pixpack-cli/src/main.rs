// crates/pixpack-cli/src/main.rs

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd;
mod io;

#[derive(Parser)]
#[command(name = "pixpack")]
#[command(about = "Palette-indexed sprite bundle packer", long_about = None)]
pub struct Cli {
    /// Debug-level logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Pack a directory of PNG sprites into a .pxb bundle
    Pack(cmd::pack::PackArgs),

    /// Inspect a bundle (header, field streams, per-image records)
    Inspect(cmd::inspect::InspectArgs),

    /// Decode every image of a bundle through the reference reader
    Verify(cmd::verify::VerifyArgs),

    /// Decode a bundle back to primary/alternate PNG files
    Unpack(cmd::unpack::UnpackArgs),
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.cmd {
        Commands::Pack(args) => cmd::pack::run(args),
        Commands::Inspect(args) => cmd::inspect::run(args),
        Commands::Verify(args) => cmd::verify::run(args),
        Commands::Unpack(args) => cmd::unpack::run(args),
    }
}
