// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Build summary and JSON manifest.

use crate::host::ModuleResult;
use esmify_commonjs::{CommonJsPlugin, Warning};
use owo_colors::OwoColorize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub modules: Vec<ModuleEntry>,
    /// Synthetic module id to source
    pub synthetic: BTreeMap<String, String>,
    pub warnings: Vec<WarningEntry>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleEntry {
    pub id: String,
    pub classification: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synthetic_named_exports: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorEntry>,
}

#[derive(Debug, Serialize)]
pub struct ErrorEntry {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct WarningEntry {
    pub code: &'static str,
    pub message: String,
    pub ids: Vec<String>,
}

impl From<&Warning> for WarningEntry {
    fn from(warning: &Warning) -> Self {
        Self {
            code: warning.code.as_str(),
            message: warning.message.clone(),
            ids: warning.ids.clone(),
        }
    }
}

impl Manifest {
    pub fn new(
        plugin: &CommonJsPlugin,
        results: &[ModuleResult],
        synthetic: BTreeMap<String, String>,
        warnings: &[Warning],
    ) -> Self {
        let modules = results
            .iter()
            .map(|module| {
                let classification = plugin.classification(&module.id).map(|c| c.as_str());
                match &module.result {
                    Ok(Some(output)) => ModuleEntry {
                        id: module.id.clone(),
                        classification: Some(output.classification.as_str()),
                        code: Some(output.code.clone()),
                        map: output.map.as_ref().map(|map| map.to_json()),
                        synthetic_named_exports: output.synthetic_named_exports,
                        error: None,
                    },
                    Ok(None) => ModuleEntry {
                        id: module.id.clone(),
                        classification,
                        code: None,
                        map: None,
                        synthetic_named_exports: None,
                        error: None,
                    },
                    Err(err) => ModuleEntry {
                        id: module.id.clone(),
                        classification,
                        code: None,
                        map: None,
                        synthetic_named_exports: None,
                        error: Some(ErrorEntry {
                            code: err.code(),
                            message: err.to_string(),
                        }),
                    },
                }
            })
            .collect();
        Self {
            modules,
            synthetic,
            warnings: warnings.iter().map(WarningEntry::from).collect(),
        }
    }

    pub fn error_count(&self) -> usize {
        self.modules.iter().filter(|module| module.error.is_some()).count()
    }

    pub fn write(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Prints one line per module, then the warnings and a total.
pub fn print_summary(manifest: &Manifest, root: &Path) {
    for module in &manifest.modules {
        let id = Path::new(&module.id)
            .strip_prefix(root)
            .map(|relative| relative.display().to_string())
            .unwrap_or_else(|_| module.id.clone());
        match &module.error {
            Some(error) => println!("{} {} {}", "error".red().bold(), id, error.message.dimmed()),
            None => {
                let label = module.classification.unwrap_or("unknown");
                let padded = format!("{label:>16}");
                let padded = match label {
                    "commonjs" | "commonjs-wrapped" => padded.green().to_string(),
                    "ignored" => padded.dimmed().to_string(),
                    _ => padded.cyan().to_string(),
                };
                println!("{padded} {id}");
            }
        }
    }

    for warning in &manifest.warnings {
        println!("{} [{}] {}", "warning".yellow().bold(), warning.code, warning.message);
    }

    let converted = manifest
        .modules
        .iter()
        .filter(|module| matches!(module.classification, Some("commonjs" | "commonjs-wrapped")))
        .count();
    println!(
        "\n{} {} modules, {} converted, {} synthetic, {} errors",
        "esmify".cyan().bold(),
        manifest.modules.len(),
        converted.green(),
        manifest.synthetic.len(),
        manifest.error_count()
    );
}
