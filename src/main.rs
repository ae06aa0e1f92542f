use nbparam::cli::commands::{CliArgs, Commands};
use nbparam::cli::handlers::{handle_extract, handle_replace};
use nbparam::util::logging::{init_logging, parse_level, LoggingConfig};
use nbparam::{NbparamConfig, VERSION};

use clap::Parser;
use tracing::{debug, Level};

fn main() {
    let args = CliArgs::parse();
    let config = NbparamConfig::default();
    init_logging_from_args(&args, &config);

    debug!("nbparam v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let exit_code = match &args.command {
        Commands::Extract(extract_args) => handle_extract(extract_args, &config),
        Commands::Replace(replace_args) => handle_replace(replace_args, &config),
    };

    std::process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs, config: &NbparamConfig) {
    let level = if let Some(level_str) = &args.log_level {
        parse_level(level_str)
    } else if args.verbose {
        Level::DEBUG
    } else if args.quiet {
        Level::ERROR
    } else {
        parse_level(&config.log_level)
    };

    init_logging(LoggingConfig::new(level).json(args.log_json || config.log_json));
}
