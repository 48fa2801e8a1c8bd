//! Inspect the swap table a browser session would get from the current settings.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use asset_swapper::config::SwapperConfig;
use asset_swapper::interceptor::resolve_request;
use asset_swapper::models::{Diagnostic, SwapEntry};
use asset_swapper::table::generate_swap_table;

#[derive(Parser)]
#[command(name = "swapper", version, about)]
struct Cli {
  /// Settings file; defaults to `swapper.config.json` in the current directory.
  #[arg(long, global = true)]
  config: Option<PathBuf>,
  /// Directory the theme overlay path is resolved against.
  #[arg(long, global = true, default_value = ".")]
  resources: PathBuf,
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Print every entry of the swap table and the diagnostics gathered while building it.
  Table,
  /// Show what happens to a single request URL.
  Resolve {
    /// Request URL as the page would issue it.
    url: String,
  },
}

#[derive(Serialize)]
struct TableReport<'a> {
  entries: Vec<&'a SwapEntry>,
  diagnostics: &'a [Diagnostic],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResolveReport<'a> {
  url: &'a str,
  cancel: bool,
  redirect_url: Option<String>,
}

fn main() -> Result<()> {
  asset_swapper::logging::init("warn");
  let cli = Cli::parse();

  let config = match &cli.config {
    Some(path) => SwapperConfig::from_path(path)
      .with_context(|| format!("failed to load settings from {}", path.display()))?,
    None => {
      let cwd = std::env::current_dir().context("failed to resolve current directory")?;
      SwapperConfig::discover(&cwd)
    }
  };

  let roots = config.scan_roots(&cli.resources);
  let build = generate_swap_table(&roots, &config.normalizer());

  let output = match &cli.command {
    Command::Table => serde_json::to_string_pretty(&TableReport {
      entries: build.table.iter().collect(),
      diagnostics: &build.diagnostics,
    })?,
    Command::Resolve { url } => {
      let decision = resolve_request(&build.table, url);
      serde_json::to_string_pretty(&ResolveReport {
        url,
        cancel: decision.cancel,
        redirect_url: decision.redirect_url,
      })?
    }
  };

  println!("{output}");
  Ok(())
}
