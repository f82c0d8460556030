#[macro_use]
extern crate log;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use f1_endpoints::consistency;
use f1_endpoints::{EndpointKind, Registry, ResolveRequest, Settings};
use failure::Error;

#[derive(Debug, Parser)]
#[command(
    name = "f1-endpoints",
    about = "Resolve Jolpica F1 API endpoint URLs from the endpoint catalogue",
    version
)]
struct Cli {
    /// YAML endpoint catalogue. The bundled catalogue is used when omitted.
    #[arg(long, global = true, value_name = "path")]
    catalogue: Option<PathBuf>,
    /// TOML settings file.
    #[arg(long, global = true, value_name = "path")]
    settings: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List endpoints with their default URLs.
    List {
        /// Only list endpoints of this kind (static, year or race).
        #[arg(long)]
        kind: Option<EndpointKind>,
    },
    /// Print the URL of one endpoint.
    Resolve {
        name: String,
        #[arg(long)]
        year: Option<u32>,
        #[arg(long)]
        round: Option<u32>,
    },
    /// Fill one of the generic url patterns with an endpoint path.
    Pattern {
        pattern: String,
        endpoint: String,
        #[arg(long)]
        year: Option<u32>,
        #[arg(long)]
        round: Option<u32>,
    },
    /// Report inconsistencies in the catalogue.
    Check {
        /// Exit with an error if anything is reported.
        #[arg(long)]
        strict: bool,
    },
}

fn run(cli: Cli) -> Result<(), Error> {
    let settings = match cli.settings {
        Some(ref path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let catalogue = settings.load_catalogue(cli.catalogue.as_ref().map(PathBuf::as_path))?;

    if let Command::Check { strict } = cli.command {
        let findings = consistency::check(&catalogue);
        if findings.is_empty() {
            println!("catalogue is consistent");
        }
        for finding in &findings {
            warn!("{}", finding);
            println!("{}", finding);
        }
        consistency::enforce(&findings, strict)?;
        return Ok(());
    }

    let registry = Registry::from_catalogue(&catalogue)?;
    match cli.command {
        Command::List { kind } => {
            for descriptor in registry.iter().filter(|d| kind.map_or(true, |k| d.kind == k)) {
                println!("{}\t{}", descriptor.name, descriptor.url);
            }
        }
        Command::Resolve { name, year, round } => {
            let request = ResolveRequest::builder()
                .name(name)
                .year(year)
                .race_round(round)
                .finish()?;
            println!("{}", registry.resolve(&request)?);
        }
        Command::Pattern {
            pattern,
            endpoint,
            year,
            round,
        } => {
            println!(
                "{}",
                registry.resolve_pattern(&pattern, &endpoint, year, round)?
            );
        }
        Command::Check { .. } => {}
    }
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(e) = run(Cli::parse()) {
        eprintln!("f1-endpoints: {}", e);
        process::exit(1);
    }
}
