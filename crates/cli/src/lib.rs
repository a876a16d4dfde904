use anyhow::{Context as AnyhowContext, Result};
use clap::Parser;
use nodefinder_protocol::MalformedPolicy;
use nodefinder_search::{Field, NodeQuery};
use std::io::{self, BufWriter};
use std::path::PathBuf;

use crate::config::Overrides;
use crate::render::OutputMode;

pub mod config;
pub mod loader;
pub mod render;

#[derive(Parser)]
#[command(name = "nodefinder")]
#[command(
    about = "Look up mesh nodes by hostname, MAC, address, autoupdater branch or firmware",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// Filter for specific nodes (repeat to narrow further)
    #[arg(short = 'f', long = "filter", value_name = "MAC/IPv6/HOSTNAME/BRANCH/FW_VERSION")]
    filters: Vec<String>,

    /// Force update data from upstream
    #[arg(short = 'u', long = "update")]
    force_update: bool,

    /// Display only a single information, machine readable
    #[arg(short = 'i', long = "information", value_name = "NAME")]
    information: Option<String>,

    /// Generate a /etc/bat-hosts file
    #[arg(long)]
    gen_bat_hosts: bool,

    /// Print the facts of every matching node as JSON
    #[arg(long)]
    json: bool,

    /// Config file (overrides NODEFINDER_CONFIG)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Registry URL (overrides NODEFINDER_UPSTREAM)
    #[arg(long, value_name = "URL")]
    upstream: Option<String>,

    /// Local copy of the registry (overrides NODEFINDER_CACHE_FILE)
    #[arg(long, value_name = "PATH")]
    cache_file: Option<PathBuf>,

    /// Drop nodes that cannot be decoded instead of failing
    #[arg(long)]
    skip_malformed: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn output_mode(&self) -> Result<OutputMode> {
        if self.gen_bat_hosts {
            return Ok(OutputMode::BatHosts);
        }
        if let Some(name) = &self.information {
            let field: Field = name.parse()?;
            return Ok(OutputMode::Field(field));
        }
        if self.json {
            return Ok(OutputMode::Json);
        }
        Ok(OutputMode::Human)
    }

    fn overrides(&self) -> Overrides {
        Overrides {
            config: self.config.clone(),
            upstream: self.upstream.clone(),
            cache_file: self.cache_file.clone(),
        }
    }

    fn malformed_policy(&self) -> MalformedPolicy {
        if self.skip_malformed {
            MalformedPolicy::Skip
        } else {
            MalformedPolicy::Abort
        }
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    // HTTP internals are noisy at debug level.
    builder.filter_module("hyper_util", log::LevelFilter::Info);
    builder.filter_module("reqwest", log::LevelFilter::Info);
    builder.target(env_logger::Target::Stderr).init();
}

pub async fn main_entry() -> Result<()> {
    let mut cli = Cli::parse();

    let mode = cli.output_mode()?;
    // Keep stderr quiet for machine-readable output.
    if mode.is_machine_readable() {
        cli.quiet = true;
    }
    init_logging(cli.verbose, cli.quiet);

    let settings = config::resolve(&cli.overrides())?;
    let registry =
        loader::load_registry(&settings, cli.force_update, cli.malformed_policy()).await?;

    let query = NodeQuery::new(&registry.nodes).filters(cli.filters.iter().cloned());

    let mut stdout = BufWriter::new(io::stdout().lock());
    match render::render(&mut stdout, mode, query.projections(&settings.links)) {
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other.context("Failed to write output"),
    }
}
