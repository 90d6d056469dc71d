//! shlower: lower a parsed shell script into pipeline IR.
//!
//! Reads the front end's bracket-dialect AST dump (one node per line) from a
//! file or stdin and writes the lowered IR to stdout, as JSON or as an
//! indented listing. Any error aborts the run without partial output.

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use shlower::config::{Config, OutputFormat};
use shlower::ir::render;

#[derive(Debug, Parser)]
#[command(name = "shlower", version, about = "Lower shell ASTs into pipeline IR")]
struct Cli {
    /// Configuration overlay (default: ~/.config/shlower/config.toml)
    #[arg(long)]
    config: Option<String>,

    /// Output format, overriding the configuration
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// AST dump to read; stdin when omitted
    input: Option<PathBuf>,
}

impl Cli {
    /// Load the configuration and apply command-line overrides.
    fn resolve_config(&self) -> shlower::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load(),
        };
        if let Some(format) = self.format {
            config.output.format = format;
        }
        if self.pretty {
            config.output.pretty = true;
        }
        Ok(config)
    }

    fn read_input(&self) -> shlower::Result<String> {
        match &self.input {
            Some(path) => Ok(std::fs::read_to_string(path)?),
            None => {
                let mut input = String::new();
                std::io::stdin().read_to_string(&mut input)?;
                Ok(input)
            }
        }
    }
}

fn run(cli: &Cli, config: &Config) -> shlower::Result<String> {
    let input = cli.read_input()?;
    let lowered = shlower::lower_str_with(&input, config.lower_options())?;
    log::info!("lowered {} top-level nodes", lowered.len());
    match config.output.format {
        OutputFormat::Json => render::render_json(&lowered, config.output.pretty),
        OutputFormat::Text => Ok(render::render_text(&lowered)),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match cli.resolve_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("shlower: {e}");
            return ExitCode::FAILURE;
        }
    };
    shlower::logging::init(&config.logging);

    match run(&cli, &config) {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("lowering failed: {e}");
            eprintln!("shlower: {e}");
            ExitCode::FAILURE
        }
    }
}
