use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// nginx-cache-purger: empty an NGINX FastCGI/proxy cache when content changes
#[derive(Parser, Debug)]
#[command(
    name = "nginx-cache-purger",
    version,
    about = "Purge a filesystem-backed NGINX cache",
    long_about = "Empties the NGINX FastCGI/proxy cache directory when site content changes,\n\
                  and gives operators a manual purge. The cache directory itself is kept.",
    after_help = "EXAMPLES:\n  \
        nginx-cache-purger purge                              Purge now (operator action)\n  \
        nginx-cache-purger purge --referer /blog/             Purge and redirect back to /blog/\n  \
        nginx-cache-purger fire save_post                     Purge because a post was saved\n  \
        nginx-cache-purger fire save_post --batch             Ignored: maintenance run\n  \
        nginx-cache-purger events                             List events that purge the cache\n  \
        nginx-cache-purger notice                             Show the pending purge notice once\n  \
        nginx-cache-purger status --format json               Cache directory status as JSON\n\n\
        ENVIRONMENT:\n  \
        NGINX_CACHE_PATH          Cache directory (default /var/run/nginx-cache/)\n  \
        NGINX_CACHE_HELPER_HOME   Data directory (default ~/.nginx-cache-helper)"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Cache directory, overriding NGINX_CACHE_PATH and the config file
    #[arg(long, global = true, value_name = "DIR")]
    pub cache_path: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub format: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Quiet mode, minimal output
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Purge the whole cache now and redirect back (operator action)
    Purge {
        /// Page the operator came from; the redirect goes back there
        #[arg(long, value_name = "URL")]
        referer: Option<String>,

        /// Operator session the purge notice is stored for
        #[arg(long, env = "NGINX_CACHE_SESSION", default_value = "default")]
        session: String,
    },

    /// Raise a content-lifecycle event
    Fire {
        /// Event name, e.g. save_post or after_switch_theme
        event: String,

        /// Raised from a maintenance/batch run; no purge happens
        #[arg(
            long,
            env = "NGINX_CACHE_BATCH",
            value_parser = clap::builder::FalseyValueParser::new()
        )]
        batch: bool,
    },

    /// List events that purge the cache
    Events,

    /// Show and clear the pending purge notice
    Notice {
        /// Operator session to read
        #[arg(long, env = "NGINX_CACHE_SESSION", default_value = "default")]
        session: String,
    },

    /// Show the cache directory and what a purge would remove
    Status,

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

    /// Print the config file location
    Path,

    /// Reset to default configuration
    Reset,

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// Configuration value
        value: String,
    },

    /// Create the data directories and a default config
    Init,
}

#[derive(Debug, Clone, ValueEnum)]
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
