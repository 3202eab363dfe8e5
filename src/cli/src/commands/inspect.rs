//! `boxpub inspect` command - box size and metadata.json contents.

use std::path::{Path, PathBuf};

use boxpub_runtime::archive::{read_box_metadata, BoxMetadata};
use clap::Args;

use crate::output::{format_bytes, format_value, new_table};

#[derive(Args)]
pub struct InspectArgs {
    /// Path to the box file
    pub box_file: PathBuf,

    /// Print the metadata as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

pub async fn execute(args: InspectArgs) -> Result<(), Box<dyn std::error::Error>> {
    let size = tokio::fs::metadata(&args.box_file).await?.len();
    let metadata = load_metadata(&args.box_file).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(metadata.entries())?);
        return Ok(());
    }

    println!("Box:  {}", args.box_file.display());
    println!("Size: {}", format_bytes(size));
    println!();

    let mut table = new_table(&["KEY", "VALUE"]);
    for (key, value) in metadata.entries() {
        table.add_row(vec![key.clone(), format_value(value)]);
    }
    println!("{table}");

    Ok(())
}

/// Read box metadata off the async runtime.
pub(crate) async fn load_metadata(path: &Path) -> Result<BoxMetadata, Box<dyn std::error::Error>> {
    let path = path.to_path_buf();
    let metadata = tokio::task::spawn_blocking(move || read_box_metadata(&path)).await??;
    Ok(metadata)
}
