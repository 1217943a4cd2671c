// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! esmify - rewrites the CommonJS modules of a project into ES modules
//!
//! ## Usage
//!
//! ```text
//! esmify <DIR> [--config FILE] [--out FILE] [--verbose] [--no-source-map]
//! ```
//!
//! Every module under `DIR` is transformed in parallel, then the synthetic
//! modules the output refers to are generated. A summary is printed and,
//! with `--out`, everything is written to a JSON manifest.

mod config;
mod host;
mod report;

use anyhow::Context;
use clap::Parser;
use esmify_commonjs::CommonJsPlugin;
use host::FsHost;
use owo_colors::OwoColorize;
use report::Manifest;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "esmify",
    about = "Rewrites CommonJS modules into ES modules",
    version,
    author = "Pegasus Heavy Industries"
)]
struct Cli {
    /// Project directory
    dir: PathBuf,

    /// Options file (defaults to DIR/esmify.json when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write a JSON manifest of every module and synthetic module
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long)]
    verbose: bool,

    /// Do not generate source maps
    #[arg(long)]
    no_source_map: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("esmify=debug,esmify_commonjs=debug")
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("esmify=warn,esmify_commonjs=warn")
            .init();
    }

    match run(&cli) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

/// Returns the number of modules that failed.
fn run(cli: &Cli) -> anyhow::Result<usize> {
    let root = cli
        .dir
        .canonicalize()
        .with_context(|| format!("cannot open {}", cli.dir.display()))?;
    let options = config::load_options(
        &root,
        cli.config.as_deref(),
        config::Overrides {
            no_source_map: cli.no_source_map,
        },
    )?;
    let plugin = CommonJsPlugin::new(options)?;
    let mut warnings = plugin.build_start();
    let host = FsHost::new(plugin);

    let files = host::discover(&root);
    tracing::info!(count = files.len(), root = %root.display(), "discovered modules");
    let results = host.transform_all(&files);
    let synthetic = host.load_synthetic(&results)?;
    warnings.extend(host.plugin().build_end());

    let manifest = Manifest::new(host.plugin(), &results, synthetic, &warnings);
    report::print_summary(&manifest, &root);
    if let Some(out) = &cli.out {
        manifest
            .write(out)
            .with_context(|| format!("failed to write {}", out.display()))?;
    }
    Ok(manifest.error_count())
}
