//! `boxpub publish` command.

use std::path::PathBuf;
use std::sync::Arc;

use boxpub_core::artifact::InputArtifact;
use boxpub_core::config::PublishSettings;
use boxpub_core::event::EventEmitter;
use boxpub_runtime::{HttpRegistryClient, HttpTransfer, Publisher};
use clap::Args;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::output::format_event;

#[derive(Args)]
pub struct PublishArgs {
    /// Path to the box file
    pub box_file: PathBuf,

    /// Settings file (YAML or JSON); flags override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Box tag as `registry/box`
    #[arg(long)]
    pub box_tag: Option<String>,

    /// Version to publish
    #[arg(long)]
    pub version: Option<String>,

    /// Producer of the box (vagrant, mitchellh.post-processor.vagrant,
    /// packer.post-processor.artifice)
    #[arg(long, default_value = "vagrant")]
    pub builder_id: String,

    /// Builder name the box was made with; defaults to the provider in the
    /// box metadata
    #[arg(long)]
    pub artifact_id: Option<String>,

    /// Architecture; defaults to the one in the box metadata
    #[arg(long)]
    pub architecture: Option<String>,

    /// Architecture marked as default when first created
    #[arg(long)]
    pub default_architecture: Option<String>,

    /// Host the box at this URL instead of uploading it
    #[arg(long)]
    pub box_download_url: Option<String>,

    /// Checksum as `TYPE:VALUE`
    #[arg(long)]
    pub box_checksum: Option<String>,

    /// Leave the version unreleased
    #[arg(long)]
    pub no_release: bool,

    /// Upload through the registry instead of directly to storage
    #[arg(long)]
    pub no_direct_upload: bool,

    /// Create the box as private
    #[arg(long)]
    pub box_private: bool,

    /// Description for a newly created box
    #[arg(long)]
    pub box_description: Option<String>,

    /// Description for a newly created version
    #[arg(long)]
    pub version_description: Option<String>,

    /// Only print the published artifact
    #[arg(short, long)]
    pub quiet: bool,
}

impl PublishArgs {
    pub(crate) fn settings(&self) -> PublishSettings {
        PublishSettings {
            box_tag: self.box_tag.clone(),
            box_description: self.box_description.clone(),
            box_private: self.box_private,
            version: self.version.clone(),
            version_description: self.version_description.clone(),
            no_release: self.no_release,
            architecture: self.architecture.clone(),
            default_architecture: self.default_architecture.clone(),
            box_download_url: self.box_download_url.clone(),
            no_direct_upload: self.no_direct_upload,
            box_checksum: self.box_checksum.clone(),
            ..Default::default()
        }
    }
}

pub async fn execute(args: PublishArgs) -> Result<(), Box<dyn std::error::Error>> {
    let base = match &args.config {
        Some(path) => PublishSettings::from_file(path)?,
        None => PublishSettings::default(),
    };
    let config = base.merge(args.settings()).resolve()?;

    let artifact_id = match &args.artifact_id {
        Some(id) => id.clone(),
        None => super::inspect::load_metadata(&args.box_file)
            .await?
            .provider()
            .map(str::to_string)
            .ok_or("--artifact-id not given and box metadata names no provider")?,
    };
    let artifact = InputArtifact::new(
        args.builder_id.clone(),
        artifact_id,
        vec![args.box_file.to_string_lossy().to_string()],
    );

    let api = HttpRegistryClient::connect(&config.api).await?;
    let emitter = EventEmitter::default();
    let printer = (!args.quiet).then(|| tokio::spawn(print_events(emitter.subscribe())));

    let publisher = Publisher::new(config, Arc::new(api), Arc::new(HttpTransfer::new()))
        .with_emitter(emitter);

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling publish");
            trigger.cancel();
        }
    });

    let result = publisher.publish(&artifact, cancel).await;

    interrupt.abort();
    // Dropping the publisher closes the event channel so the printer drains and exits
    drop(publisher);
    if let Some(printer) = printer {
        let _ = printer.await;
    }

    let published = result?;
    if args.quiet {
        println!("{}", published.tag);
    } else {
        println!("Published {}", published);
    }
    Ok(())
}

async fn print_events(mut rx: broadcast::Receiver<boxpub_core::event::PublishEvent>) {
    loop {
        match rx.recv().await {
            Ok(event) => println!("{}", format_event(&event)),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "Event printer lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
