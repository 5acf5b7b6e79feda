use clap::{ArgAction, Args, Parser, Subcommand};

use crate::sources::github::GITHUB_API_URL;

/// labelbot: label GitHub issues from regex rules
#[derive(Parser, Debug, Clone)]
#[command(name = "labelbot", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CliCommand {
    /// Label every unlabeled issue, once or on a fixed schedule
    Console {
        #[command(flatten)]
        common: CommonArgs,

        /// Number of batches to run
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        iterations: u32,

        /// Seconds to sleep between batches
        #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
        interval: u64,
    },

    /// Serve a webhook that labels issues as they are opened
    Web {
        #[command(flatten)]
        common: CommonArgs,

        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:5000")]
        bind: String,
    },
}

impl CliCommand {
    pub fn common(&self) -> &CommonArgs {
        match self {
            CliCommand::Console { common, .. } | CliCommand::Web { common, .. } => common,
        }
    }
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct CommonArgs {
    /// Repository to watch, as owner/name
    #[arg(long, default_value = "mi-pyt-label-robot/r1")]
    pub repo: String,

    /// Path to the file holding the GitHub token
    #[arg(long, default_value = "auth.toml")]
    pub auth_file: String,

    /// Path to the label rules file
    #[arg(long, default_value = "labels.toml")]
    pub label_file: String,

    /// Label applied when no rule matches
    #[arg(long, default_value = "take-a-look-personally")]
    pub default_label: String,

    /// Also search issue comments (true/false)
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub comments: bool,

    /// Append progress lines to this file instead of stdout
    #[arg(long)]
    pub output: Option<String>,

    /// GitHub API base URL
    #[arg(long, default_value = GITHUB_API_URL)]
    pub api_url: String,
}
