//! JSON documents on disk: engine configuration, feed snapshots and scoring reports.
//!
//! A path of `-` reads from standard input. Writes go to a sibling `.tmp` file that is then
//! renamed over the target.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub const STDIN: &str = "-";

fn read_document(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == STDIN {
        let mut document = String::new();
        io::stdin()
            .read_to_string(&mut document)
            .context("failed to read standard input")?;
        Ok(document)
    } else {
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
    }
}

/// Decodes a JSON document from `path`, naming the file in any error.
pub fn read_json<D: DeserializeOwned>(path: impl AsRef<Path>) -> anyhow::Result<D> {
    let path = path.as_ref();
    let document = read_document(path)?;
    serde_json::from_str(&document).with_context(|| format!("failed to parse {}", path.display()))
}

fn staging_path(path: &Path) -> PathBuf {
    let mut staging = path.as_os_str().to_owned();
    staging.push(".tmp");
    PathBuf::from(staging)
}

/// Pretty-prints `value` to `path`, creating missing parent directories.
pub fn write_json(path: impl AsRef<Path>, value: &impl Serialize) -> anyhow::Result<()> {
    let path = path.as_ref();
    let document = serde_json::to_string_pretty(value)
        .with_context(|| format!("failed to encode {}", path.display()))?;
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    }
    let staging = staging_path(path);
    fs::write(&staging, document)
        .with_context(|| format!("failed to write {}", staging.display()))?;
    fs::rename(&staging, path).with_context(|| format!("failed to replace {}", path.display()))
}

pub trait ReadJsonFile<D> {
    fn read_json_file(path: impl AsRef<Path>) -> anyhow::Result<D>;
}

impl<D: DeserializeOwned> ReadJsonFile<D> for D {
    fn read_json_file(path: impl AsRef<Path>) -> anyhow::Result<D> {
        read_json(path)
    }
}

pub trait WriteJsonFile<S: Serialize> {
    fn write_json_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()>;
}

impl<S: Serialize> WriteJsonFile<S> for S {
    fn write_json_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        write_json(path, self)
    }
}
