use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult, ConfigError};

use super::types::PlanFile;

const DEFAULT_PATHS: [&str; 2] = ["restbench.toml", "restbench.json"];

/// Loads the plan from `path`, or from `restbench.toml` / `restbench.json`
/// in the working directory.
///
/// # Errors
///
/// Returns an error when no plan exists or it cannot be read or parsed.
pub fn load_plan(path: Option<&str>) -> AppResult<PlanFile> {
    if let Some(path) = path {
        return load_plan_file(Path::new(path));
    }

    for candidate in DEFAULT_PATHS {
        let path = PathBuf::from(candidate);
        if path.exists() {
            return load_plan_file(&path);
        }
    }

    Err(AppError::config(ConfigError::NotFound))
}

/// # Errors
///
/// Returns an error when the file cannot be read, has an unsupported
/// extension, or does not parse.
pub fn load_plan_file(path: &Path) -> AppResult<PlanFile> {
    let content = std::fs::read_to_string(path).map_err(|err| {
        AppError::config(ConfigError::ReadConfig {
            path: path.to_path_buf(),
            source: err,
        })
    })?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => toml::from_str(&content).map_err(|err| {
            AppError::config(ConfigError::ParseToml {
                path: path.to_path_buf(),
                source: err,
            })
        }),
        Some("json") => serde_json::from_str(&content).map_err(|err| {
            AppError::config(ConfigError::ParseJson {
                path: path.to_path_buf(),
                source: err,
            })
        }),
        Some(ext) => Err(AppError::config(ConfigError::UnsupportedExtension {
            ext: ext.to_owned(),
        })),
        None => Err(AppError::config(ConfigError::MissingExtension)),
    }
}
