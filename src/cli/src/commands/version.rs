//! `boxpub version` command.

use clap::Args;

#[derive(Args)]
pub struct VersionArgs;

pub async fn execute(_args: VersionArgs) -> Result<(), Box<dyn std::error::Error>> {
    println!("boxpub {}", boxpub_core::VERSION);
    println!("  publish engine {}", boxpub_runtime::VERSION);
    println!("  post-processor id {}", boxpub_core::artifact::BUILDER_ID);
    Ok(())
}
