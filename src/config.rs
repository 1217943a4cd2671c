// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Plugin options for a project directory.

use anyhow::{Context, Result};
use esmify_commonjs::CommonJsOptions;
use std::path::Path;
use tracing::debug;

/// Options file looked up in the project directory.
pub const CONFIG_FILE: &str = "esmify.json";

/// Command line settings that override the options file.
#[derive(Debug, Default, Clone, Copy)]
pub struct Overrides {
    pub no_source_map: bool,
}

/// Reads `config` (or `<root>/esmify.json` when present) and applies the
/// command line overrides. Relative globs resolve against `root`.
pub fn load_options(root: &Path, config: Option<&Path>, overrides: Overrides) -> Result<CommonJsOptions> {
    let default_path = root.join(CONFIG_FILE);
    let path = match config {
        Some(path) => Some(path.to_path_buf()),
        None => default_path.is_file().then_some(default_path),
    };

    let mut options = match &path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            debug!(path = %path.display(), "loaded options");
            CommonJsOptions::from_json(&content).with_context(|| format!("invalid options in {}", path.display()))?
        }
        None => CommonJsOptions::default(),
    };

    options.cwd = Some(root.to_path_buf());
    if overrides.no_source_map {
        options.source_map = false;
    }
    Ok(options)
}
