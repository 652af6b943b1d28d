use clap::{ArgAction, Parser, Subcommand, ValueHint};

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    help_template = "{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}",
    arg_required_else_help = true
)]
pub struct Args {
    /// Set output verbosity
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress outputs
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output as json
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Provide custom config file
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<String>,

    /// Set proxy
    #[arg(required = false, long, short = 'P', global = true)]
    pub proxy: Option<String>,

    /// Set user agent
    #[arg(required = false, long, short = 'A', global = true)]
    pub user_agent: Option<String>,

    /// Use cached metadata only, without contacting any mirror
    #[arg(long, global = true)]
    pub offline: bool,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Synchronize repository metadata
    #[clap(name = "sync", visible_alias = "S")]
    Sync {
        /// Repository to synchronize (default: every enabled repository)
        #[arg(required = false)]
        repo_name: Option<String>,
    },

    /// List every package of a repository
    #[command(arg_required_else_help = true)]
    #[clap(name = "list", visible_alias = "ls")]
    List {
        /// Repository to list
        #[arg(required = true)]
        repo_name: String,
    },

    /// Find the newest package with the given name
    #[command(arg_required_else_help = true)]
    #[clap(name = "find", visible_alias = "f")]
    Find {
        /// Repository to search
        #[arg(required = true)]
        repo_name: String,

        /// Package name
        #[arg(required = true)]
        name: String,

        /// Only match this exact version
        #[arg(required = false, long)]
        version: Option<String>,

        /// Only match this exact release
        #[arg(required = false, long)]
        release: Option<String>,
    },

    /// Find the newest package satisfying a requirement
    #[command(arg_required_else_help = true)]
    #[clap(name = "provides", visible_alias = "whatprovides")]
    Provides {
        /// Repository to search
        #[arg(required = true)]
        repo_name: String,

        /// Requirement such as `libc.so.6`, `/bin/sh` or `bash >= 5.0`
        #[arg(required = true)]
        requirement: String,
    },

    /// Print the effective configuration
    Config,

    /// Write the default configuration file
    #[clap(name = "defconfig")]
    DefConfig,

    /// View env
    Env,
}
