use anyhow::{Context, Result};
use girih::api::BuildReport;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Revision and library version; printed by `girih report`.
#[derive(Debug, Serialize)]
pub struct Header {
    pub code_rev: String,
    pub girih_version: &'static str,
}

impl Header {
    pub fn current() -> Self {
        Self {
            code_rev: code_rev(),
            girih_version: girih::VERSION,
        }
    }
}

/// Contents of `<map>.provenance.json`.
#[derive(Debug, Serialize)]
pub struct Sidecar<'a> {
    #[serde(flatten)]
    pub header: Header,
    pub params: Value,
    pub report: &'a BuildReport,
    pub map: String,
}

/// Write the sidecar next to the map file and return its path.
pub fn write_sidecar(map_path: &Path, params: Value, report: &BuildReport) -> Result<PathBuf> {
    let path = sidecar_path(map_path);
    let sidecar = Sidecar {
        header: Header::current(),
        params,
        report,
        map: map_path.to_string_lossy().into_owned(),
    };
    fs::write(&path, serde_json::to_vec_pretty(&sidecar)?)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

fn sidecar_path(map_path: &Path) -> PathBuf {
    let mut name = map_path
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| "map".into());
    name.push(".provenance.json");
    map_path.with_file_name(name)
}

/// `GIT_COMMIT` if set, else `git rev-parse HEAD`, else "unknown".
fn code_rev() -> String {
    if let Ok(rev) = std::env::var("GIT_COMMIT") {
        if !rev.is_empty() {
            return rev;
        }
    }
    Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn sidecar_sits_next_to_the_map() {
        let path = sidecar_path(Path::new("/tmp/output/star.json"));
        assert_eq!(path, Path::new("/tmp/output/star.provenance.json"));
    }

    #[test]
    fn sidecar_records_params_and_report() {
        let dir = tempdir().unwrap();
        let map_path = dir.path().join("map.json");
        fs::write(&map_path, "{}").unwrap();
        let report = BuildReport {
            vertices: 5,
            edges: 4,
            ..BuildReport::default()
        };
        let written =
            write_sidecar(&map_path, json!({"tiling": "square", "d": 2.0}), &report).unwrap();
        let parsed: Value = serde_json::from_slice(&fs::read(written).unwrap()).unwrap();
        assert_eq!(parsed["map"], map_path.to_string_lossy().as_ref());
        assert_eq!(parsed["params"]["tiling"], "square");
        assert_eq!(parsed["report"]["edges"], 4);
        assert_eq!(parsed["girih_version"], girih::VERSION);
        assert!(parsed["code_rev"].is_string());
    }
}
