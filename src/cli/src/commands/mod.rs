//! CLI command definitions and dispatch.

mod inspect;
mod publish;
mod version;

use clap::{Parser, Subcommand};

/// boxpub - publish boxes to a box registry.
#[derive(Parser)]
#[command(name = "boxpub", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Command {
    /// Publish a box file to the registry
    Publish(publish::PublishArgs),
    /// Show the size and metadata of a box file
    Inspect(inspect::InspectArgs),
    /// Show version information
    Version(version::VersionArgs),
}

/// Dispatch a parsed CLI to the appropriate command handler.
pub async fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Publish(args) => publish::execute(args).await,
        Command::Inspect(args) => inspect::execute(args).await,
        Command::Version(args) => version::execute(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_publish() {
        let cli = Cli::try_parse_from([
            "boxpub",
            "publish",
            "package.box",
            "--box-tag",
            "hashicorp/precise64",
            "--version",
            "0.5",
            "--architecture",
            "arm64",
            "--no-release",
        ])
        .unwrap();

        let Command::Publish(args) = cli.command else {
            panic!("expected publish command");
        };
        assert_eq!(args.box_file, std::path::PathBuf::from("package.box"));
        assert_eq!(args.builder_id, "vagrant");
        assert!(args.no_release);
        assert!(!args.no_direct_upload);

        let settings = args.settings();
        assert_eq!(settings.box_tag.as_deref(), Some("hashicorp/precise64"));
        assert_eq!(settings.version.as_deref(), Some("0.5"));
        assert_eq!(settings.architecture.as_deref(), Some("arm64"));
        assert!(settings.client_id.is_none());
    }

    #[test]
    fn test_parse_inspect() {
        let cli = Cli::try_parse_from(["boxpub", "inspect", "package.box", "--json"]).unwrap();
        assert!(matches!(cli.command, Command::Inspect(ref args) if args.json));
    }

    #[test]
    fn test_publish_requires_box_file() {
        assert!(Cli::try_parse_from(["boxpub", "publish"]).is_err());
    }
}
