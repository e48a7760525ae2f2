//! rkt stage0 configuration CLI
//!
//! Entry point for the `rkt-config` command-line tool.

use clap::{ArgAction, Parser, Subcommand};
use rkt_config::config::{render_sources, render_stage0, ConfigTree, EmitOptions};
use rkt_config::logging::{init_logging, LogFormat, LoggingConfig};
use rkt_config::EffectiveConfig;
use std::path::PathBuf;
use std::process;
use tracing::{debug, error};

/// OS-shipped configuration tree
const DEFAULT_SYSTEM_CONFIG: &str = "/usr/lib/rkt";

/// Administrator override tree
const DEFAULT_USER_CONFIG: &str = "/etc/rkt";

#[derive(Parser)]
#[command(name = "rkt-config")]
#[command(about = "Inspect the layered rkt stage0 configuration", version)]
struct Cli {
    /// System configuration directory
    #[arg(long, global = true, value_name = "DIR", default_value = DEFAULT_SYSTEM_CONFIG)]
    system_config: PathBuf,

    /// User configuration directory; overrides the system directory
    #[arg(
        long,
        global = true,
        value_name = "DIR",
        visible_alias = "local-config",
        default_value = DEFAULT_USER_CONFIG
    )]
    user_config: PathBuf,

    /// Print debug logs to stderr
    #[arg(long, global = true)]
    debug: bool,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Indent JSON output; `--pretty-print=false` prints a single line
    #[arg(
        long,
        global = true,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value_t = true,
        default_missing_value = "true"
    )]
    pretty_print: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the effective configuration as JSON
    Config {
        /// Print which files each entry came from instead of the records
        #[arg(long)]
        sources: bool,

        /// Replace passwords and tokens with a placeholder
        #[arg(long)]
        redact: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let logging_config = LoggingConfig::from_flags(cli.debug, cli.log_format);
    if let Err(e) = init_logging(&logging_config) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    let trees = [
        ConfigTree::system(&cli.system_config),
        ConfigTree::user(&cli.user_config),
    ];

    match cli.command {
        Commands::Config { sources, redact } => {
            let options = EmitOptions {
                pretty: cli.pretty_print,
                redact,
            };
            run_config(&trees, options, sources);
        }
    }
}

fn run_config(trees: &[ConfigTree], options: EmitOptions, sources: bool) {
    debug!(?trees, "loading configuration");

    let config = match EffectiveConfig::load_trees(trees) {
        Ok(config) => config,
        Err(e) => {
            error!(kind = %e.kind(), "configuration load failed");
            eprintln!("Error loading configuration: {}", e);
            process::exit(1);
        }
    };

    let rendered = if sources {
        render_sources(&config, options.pretty)
    } else {
        render_stage0(&config, options)
    };

    match rendered {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["rkt-config", "config"]).unwrap();
        assert_eq!(cli.system_config, PathBuf::from("/usr/lib/rkt"));
        assert_eq!(cli.user_config, PathBuf::from("/etc/rkt"));
        assert!(cli.pretty_print);
        assert!(!cli.debug);
        let Commands::Config { sources, redact } = cli.command;
        assert!(!sources);
        assert!(!redact);
    }

    #[test]
    fn test_pretty_print_toggle() {
        let cli = Cli::try_parse_from(["rkt-config", "--pretty-print=false", "config"]).unwrap();
        assert!(!cli.pretty_print);

        let cli = Cli::try_parse_from(["rkt-config", "config", "--pretty-print"]).unwrap();
        assert!(cli.pretty_print);
    }

    #[test]
    fn test_bare_pretty_print_before_subcommand() {
        let cli = Cli::try_parse_from(["rkt-config", "--pretty-print", "config"]).unwrap();
        assert!(cli.pretty_print);
        assert!(matches!(cli.command, Commands::Config { .. }));

        let cli = Cli::try_parse_from(["rkt-config", "--pretty-print=true", "config"]).unwrap();
        assert!(cli.pretty_print);
    }

    #[test]
    fn test_local_config_alias() {
        let cli =
            Cli::try_parse_from(["rkt-config", "--local-config", "/tmp/etc", "config"]).unwrap();
        assert_eq!(cli.user_config, PathBuf::from("/tmp/etc"));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "rkt-config",
            "config",
            "--debug",
            "--system-config",
            "/tmp/sys",
            "--sources",
        ])
        .unwrap();
        assert!(cli.debug);
        assert_eq!(cli.system_config, PathBuf::from("/tmp/sys"));
        let Commands::Config { sources, .. } = cli.command;
        assert!(sources);
    }
}
