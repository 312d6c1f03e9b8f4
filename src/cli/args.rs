use clap::{Parser, Subcommand, ValueEnum};

/// imgdedup: find exact and visually similar duplicate images
#[derive(Parser, Debug)]
#[command(
    name = "imgdedup",
    version,
    about = "Find and remove duplicate images",
    long_about = "imgdedup scans a directory for byte-identical and visually similar images,\n\
                  keeps the largest copy of each, and removes the rest. Dry run by default.",
    after_help = "EXAMPLES:\n  \
        imgdedup scan ~/Pictures                     Report duplicates\n  \
        imgdedup scan ~/Pictures --threshold 3       Stricter similarity\n  \
        imgdedup scan ~/Pictures --output dups.json  Save results as JSON\n  \
        imgdedup clean ~/Pictures                    Preview what would be deleted\n  \
        imgdedup clean ~/Pictures --no-dry-run       Delete duplicates (asks first)\n  \
        imgdedup clean ~/Pictures --groups 1,3 --no-dry-run --yes\n  \
        imgdedup config show                         Show configuration"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum)]
    pub format: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Quiet mode (minimal output)
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan a directory for duplicate images
    Scan {
        /// Directory to scan
        path: String,

        /// Maximum perceptual distance for similar images (0-64)
        #[arg(long, short)]
        threshold: Option<u32>,

        /// Show every file in each group
        #[arg(long)]
        detailed: bool,

        /// Save results to a JSON file
        #[arg(long, short, value_name = "FILE")]
        output: Option<String>,
    },

    /// Scan, then delete the non-keep files of duplicate groups
    Clean {
        /// Directory to scan
        path: String,

        /// Maximum perceptual distance for similar images (0-64)
        #[arg(long, short)]
        threshold: Option<u32>,

        /// Actually delete files (default is dry run)
        #[arg(long)]
        no_dry_run: bool,

        /// Only these groups (1-based, as printed by `scan`)
        #[arg(
            long,
            value_delimiter = ',',
            value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
        )]
        groups: Option<Vec<usize>>,

        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Print the configuration file location
    Path,

    /// Reset to default configuration
    Reset,

    /// Set a configuration value
    Set {
        /// Configuration key (threshold, dry_run, extensions, workers, output_format)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    Quiet,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}
