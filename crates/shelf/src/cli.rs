use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "shelf",
    version,
    about = "Publish game builds as GitHub releases and browse them"
)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'o', value_enum, global = true, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// When to colorize output
    #[arg(long, value_enum, global = true, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a TOML config file
    #[arg(long, env = "SHELF_CONFIG", global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Path to the stored credentials file
    #[arg(long, env = "SHELF_CREDENTIALS", global = true, value_name = "PATH")]
    pub credentials: Option<PathBuf>,

    /// GitHub API base URL (overrides config file)
    #[arg(long, env = "SHELF_API_URL", global = true)]
    pub api_url: Option<String>,

    /// GitHub personal access token (overrides stored credentials)
    #[arg(long, env = "SHELF_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(ValueEnum, Clone, Debug, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(ValueEnum, Clone, Debug, Copy, Default)]
pub enum ColorChoice {
    /// Colorize output if stdout is a terminal
    #[default]
    Auto,
    /// Always colorize output
    Always,
    /// Never colorize output
    Never,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Store a GitHub username and token for publishing
    Login {
        /// GitHub username
        username: String,
        /// Personal access token with `repo` scope (falls back to --token)
        #[arg(value_name = "PAT")]
        pat: Option<String>,
    },
    /// Forget the stored token (the username is kept for browsing)
    Logout,
    /// Show the stored credentials
    Whoami,
    /// List a user's games and their latest builds
    #[command(visible_alias = "ls")]
    Catalog {
        /// GitHub user to browse (defaults to config, then the logged-in user)
        user: Option<String>,
        /// Include repositories without any release
        #[arg(long)]
        all: bool,
    },
    /// Download statistics per game
    Stats {
        /// GitHub user to report on
        user: Option<String>,
    },
    /// Publish a build as a release of one of your repositories
    Publish {
        /// Repository to publish to
        #[arg(long, short = 'r')]
        repo: String,
        /// Version tag (detected from the file name when omitted, e.g. game-v1.2.0.zip)
        #[arg(long, short = 't')]
        tag: Option<String>,
        /// Release notes
        #[arg(long, short = 'n')]
        notes: Option<String>,
        /// Label shown for the uploaded asset
        #[arg(long, default_value = "Game Build")]
        label: String,
        /// Mark the release as a pre-release
        #[arg(long)]
        prerelease: bool,
        /// Open the release page when the upload has to be finished by hand
        #[arg(long)]
        open: bool,
        /// The .zip build to upload
        file: PathBuf,
    },
    /// Repository operations
    Repo {
        #[command(subcommand)]
        action: RepoCommands,
    },
    /// Show configuration
    #[command(visible_alias = "cfg")]
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Cli {
    /// Generate shell completions and write to stdout
    pub fn generate_completions(shell: Shell) {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "shelf", &mut std::io::stdout());
    }
}

#[derive(Subcommand, Debug)]
pub enum RepoCommands {
    /// Create a repository for a new game
    Create {
        /// Repository name
        name: String,
        /// Short description
        #[arg(long, short = 'd')]
        description: Option<String>,
        /// Make the repository private
        #[arg(long)]
        private: bool,
        /// Do not create an initial commit (incompatible with --cover)
        #[arg(long, conflicts_with = "cover")]
        no_init: bool,
        /// Cover image committed as cover.jpg
        #[arg(long, value_name = "PATH")]
        cover: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration (token masked)
    Show,
    /// Print the config and credentials file locations
    Path,
}
