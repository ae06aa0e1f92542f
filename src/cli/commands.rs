use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Parameterise Jupyter notebooks from the command line
#[derive(Parser, Debug)]
#[command(
    name = "nbparam",
    about = "Read and rewrite the parameters cell of Jupyter notebooks",
    version,
    author,
    long_about = "nbparam finds the parameters cell of a notebook (the first code cell tagged \
                  'Parameters', or else the first code cell), lists the literal assignments it \
                  contains and rewrites them with new values, optionally executing the result."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,

    #[arg(long, global = true, help = "Write logs to stderr as JSON lines")]
    pub log_json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "List the parameters defined in a notebook",
        long_about = "Prints the parameters found in the notebook's parameters cell.\n\n\
                      Examples:\n  \
                      nbparam extract report.ipynb\n  \
                      nbparam extract report.ipynb --format json\n  \
                      nbparam extract report.ipynb --tag params --lang python3"
    )]
    Extract(ExtractArgs),

    #[command(
        about = "Write a copy of a notebook with new parameter values",
        long_about = "Rewrites the parameters cell with the given values and writes the \
                      resulting notebook JSON to stdout or a file.\n\n\
                      VALUE is read as JSON when possible and as a plain string otherwise.\n\n\
                      Examples:\n  \
                      nbparam replace report.ipynb -p stock=GOOG -p days_back=300\n  \
                      nbparam replace report.ipynb -p 'tickers=[\"A\", \"B\"]' -o out.ipynb\n  \
                      nbparam replace report.ipynb -p n=10 --execute -o executed.ipynb"
    )]
    Replace(ReplaceArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct ExtractArgs {
    #[arg(value_name = "NOTEBOOK", help = "Path to the .ipynb file")]
    pub notebook: PathBuf,

    #[arg(
        long,
        value_name = "LANG",
        help = "Kernel language driver to use instead of the notebook's declared language"
    )]
    pub lang: Option<String>,

    #[arg(long, value_name = "TAG", help = "Cell tag marking the parameters cell")]
    pub tag: Option<String>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write output to file instead of stdout"
    )]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct ReplaceArgs {
    #[arg(value_name = "NOTEBOOK", help = "Path to the .ipynb file")]
    pub notebook: PathBuf,

    #[arg(
        short = 'p',
        long = "param",
        value_name = "NAME=VALUE",
        value_parser = parse_assignment,
        help = "New value for a parameter (repeatable)"
    )]
    pub params: Vec<(String, String)>,

    #[arg(
        long,
        value_name = "LANG",
        help = "Kernel language driver to use instead of the notebook's declared language"
    )]
    pub lang: Option<String>,

    #[arg(long, value_name = "TAG", help = "Cell tag marking the parameters cell")]
    pub tag: Option<String>,

    #[arg(long, help = "Drop inline comments from the rewritten definitions")]
    pub no_comments: bool,

    #[arg(long, help = "Execute the notebook after rewriting it")]
    pub execute: bool,

    #[arg(
        long,
        value_name = "DIR",
        requires = "execute",
        help = "Working directory for execution (defaults to the notebook's directory)"
    )]
    pub workdir: Option<PathBuf>,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write the notebook to file instead of stdout"
    )]
    pub output: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

fn parse_assignment(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("Invalid parameter '{}': expected NAME=VALUE", s))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("Invalid parameter '{}': name is empty", s));
    }
    Ok((name.to_string(), value.to_string()))
}
