use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;

use crate::constants::open;
use crate::error::{ChdbError, Result};

/// Session data-path configuration: parses `path?key=value&...` URIs, merges
/// caller options, computes the open mode, and generates the engine argument
/// vector.
///
/// A `:memory:` or empty path gets an owned temporary directory that is
/// removed again on [`DataPath::close`] (or drop).
pub struct DataPath {
    dir_path: PathBuf,
    tmp_dir: Option<TempDir>,
    params: Vec<(String, Option<String>)>,
    mode: i32,
}

impl DataPath {
    pub fn new(uri: &str, options: &[(&str, &str)]) -> Result<Self> {
        let (path, mut params) = parse_uri(uri);
        merge_options(&mut params, options);
        let mode = check_params(&params)?;
        let (dir_path, tmp_dir) = resolve_dir(&path, mode)?;
        Ok(Self {
            dir_path,
            tmp_dir,
            params,
            mode,
        })
    }

    pub fn dir_path(&self) -> &Path {
        &self.dir_path
    }

    pub fn mode(&self) -> i32 {
        self.mode
    }

    /// Whether the session runs out of an owned temporary directory.
    pub fn is_tmp(&self) -> bool {
        self.tmp_dir.is_some()
    }

    /// Build the native argument vector for this session.
    pub fn generate_arguments(&self) -> Vec<String> {
        let mut args = vec![
            "clickhouse".to_string(),
            format!("--path={}", self.dir_path.display()),
        ];
        // Bookkeeping keys configure this layer, not the engine.
        let excluded = ["readonly", "readwrite", "flags"];

        for (key, value) in &self.params {
            if excluded.contains(&key.as_str()) {
                continue;
            }
            match key.as_str() {
                "udf_path" => {
                    let udf = value.clone().unwrap_or_default();
                    args.push("--".to_string());
                    args.push(format!("--user_scripts_path={udf}"));
                    args.push(format!(
                        "--user_defined_executable_functions_config={udf}/*.xml"
                    ));
                }
                "--" => args.push("--".to_string()),
                _ => match value {
                    Some(v) => args.push(format!("--{key}={v}")),
                    None => args.push(format!("--{key}")),
                },
            }
        }

        if self.mode & open::READONLY != 0 {
            args.push("--readonly=1".to_string());
        }
        args
    }

    /// Remove the owned temporary directory, if any. Idempotent.
    pub fn close(&mut self) {
        if let Some(tmp) = self.tmp_dir.take() {
            debug!(path = %tmp.path().display(), "removing temporary data directory");
            let _ = tmp.close();
        }
    }
}

fn parse_uri(uri: &str) -> (String, Vec<(String, Option<String>)>) {
    let (path, query) = match uri.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (uri, None),
    };
    let path = path.strip_prefix("file:").unwrap_or(path).to_string();

    let mut params = Vec::new();
    if let Some(query) = query {
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            match pair.split_once('=') {
                Some((key, value)) => set_param(&mut params, key, Some(value)),
                None => set_param(&mut params, pair, None),
            }
        }
    }
    (path, params)
}

fn merge_options(params: &mut Vec<(String, Option<String>)>, options: &[(&str, &str)]) {
    for (key, value) in options {
        set_param(params, key, Some(value));
    }
}

/// Later values win, matching URI query semantics where the last occurrence
/// of a key is the effective one.
fn set_param(params: &mut Vec<(String, Option<String>)>, key: &str, value: Option<&str>) {
    let value = value.map(str::to_string);
    if let Some(entry) = params.iter_mut().find(|(k, _)| k == key) {
        entry.1 = value;
    } else {
        params.push((key.to_string(), value));
    }
}

fn check_params(params: &[(String, Option<String>)]) -> Result<i32> {
    let has = |key: &str| params.iter().any(|(k, _)| k == key);
    let get = |key: &str| {
        params
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_deref())
    };

    let mut mode = open::READWRITE | open::CREATE;
    if has("readonly") {
        mode = open::READONLY;
    }

    if has("readwrite") {
        if has("readonly") {
            return Err(ChdbError::InvalidArgument(
                "conflicting options: readonly and readwrite".into(),
            ));
        }
        mode = open::READWRITE;
    }

    if has("flags") {
        if has("readonly") || has("readwrite") {
            return Err(ChdbError::InvalidArgument(
                "conflicting options: flags with readonly and/or readwrite".into(),
            ));
        }
        mode = get("flags")
            .unwrap_or("")
            .parse::<i32>()
            .map_err(|_| ChdbError::InvalidArgument("flags must be an integer".into()))?;
    }
    Ok(mode)
}

fn resolve_dir(path: &str, mode: i32) -> Result<(PathBuf, Option<TempDir>)> {
    if path.is_empty() || path == ":memory:" {
        let tmp = tempfile::Builder::new().prefix("chdb_").tempdir()?;
        return Ok((tmp.path().to_path_buf(), Some(tmp)));
    }

    let dir = std::path::absolute(path)?;
    if !dir.is_dir() {
        if mode & open::CREATE == 0 {
            return Err(ChdbError::DirectoryNotFound(dir));
        }
        fs::create_dir_all(&dir)?;
    }
    Ok((dir, None))
}
