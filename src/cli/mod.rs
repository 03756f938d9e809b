pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "chireader")]
#[command(about = "Browse and read web novels from the terminal", long_about = None)]
pub struct Cli {
    /// Config file to use instead of ~/.config/chireader/config.toml
    #[arg(short, long, global = true)]
    pub config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the latest-updates table
    Latest {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show the featured list and latest updates
    Home {
        #[arg(long)]
        json: bool,
    },
    /// Show a novel's details and chapter list
    Novel {
        /// URL of the novel page
        url: String,
        #[arg(long)]
        json: bool,
    },
    /// Print a chapter's text
    Chapter {
        /// URL of the chapter page
        url: String,
        #[arg(long)]
        json: bool,
    },
    /// Open a chapter in the terminal reader
    Read {
        /// URL of the chapter to start from
        url: String,
        /// Novel page used for chapter numbering (default: the chapter's parent page)
        #[arg(long)]
        novel: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_read_with_global_config() {
        let cli = Cli::try_parse_from([
            "chireader",
            "read",
            "https://chireads.com/category/translatedtales/n/chapter-1/",
            "--config",
            "/tmp/c.toml",
        ])
        .unwrap();
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("/tmp/c.toml")));
        match cli.command {
            Commands::Read { url, novel } => {
                assert!(url.ends_with("chapter-1/"));
                assert!(novel.is_none());
            }
            _ => panic!("expected read"),
        }
    }

    #[test]
    fn test_parse_json_flag() {
        let cli = Cli::try_parse_from(["chireader", "latest", "--json"]).unwrap();
        assert!(matches!(cli.command, Commands::Latest { json: true }));
    }
}
