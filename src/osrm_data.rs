//! OSRM dataset preparation (download + preprocess).
//!
//! Fetches a Geofabrik extract and runs the OSRM MLD toolchain in docker so
//! integration tests can exercise a real routing backend. Preparation is
//! incremental: existing artifacts are reused across runs.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum OsrmDataError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("{command} exited with status {status}")]
    ProcessFailure { command: String, status: String },
}

/// A Geofabrik extract identified by its region path, e.g.
/// `north-america/us/nevada`.
#[derive(Debug, Clone)]
pub struct GeofabrikRegion {
    path: String,
}

impl GeofabrikRegion {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or("region")
    }

    pub fn url(&self) -> String {
        format!("https://download.geofabrik.de/{}-latest.osm.pbf", self.path)
    }
}

/// A prepared MLD dataset on disk, ready for `osrm-routed`.
#[derive(Debug, Clone)]
pub struct OsrmDataset {
    pub data_dir: PathBuf,
    pub osrm_base: PathBuf,
}

impl OsrmDataset {
    /// Ensure the extract is downloaded and preprocessed under `data_root`.
    pub fn ensure(
        region: &GeofabrikRegion,
        data_root: impl Into<PathBuf>,
    ) -> Result<Self, OsrmDataError> {
        let data_root: PathBuf = data_root.into();
        let data_root = if data_root.is_absolute() {
            data_root
        } else {
            std::env::current_dir()?.join(data_root)
        };
        let data_dir = data_root.join(region.name());
        fs::create_dir_all(&data_dir)?;

        let pbf_path = data_dir.join(format!("{}-latest.osm.pbf", region.name()));
        if !pbf_path.exists() {
            info!(url = %region.url(), "downloading extract");
            download(&region.url(), &pbf_path)?;
        }

        let osrm_base = data_dir.join(format!("{}-latest.osrm", region.name()));
        if !osrm_base.exists() {
            info!(region = region.name(), "extracting road network");
            run_docker(
                &data_dir,
                &[
                    "osrm-extract",
                    "-p",
                    "/opt/car.lua",
                    &format!("/data/{}", file_name(&pbf_path)),
                ],
            )?;
        }

        if !mld_ready(&osrm_base) {
            info!(region = region.name(), "partitioning and customizing cells");
            run_docker(
                &data_dir,
                &["osrm-partition", &format!("/data/{}", file_name(&osrm_base))],
            )?;
            run_docker(
                &data_dir,
                &["osrm-customize", &format!("/data/{}", file_name(&osrm_base))],
            )?;
        }

        Ok(Self {
            data_dir,
            osrm_base,
        })
    }
}

fn download(url: &str, dest: &Path) -> Result<(), OsrmDataError> {
    let response = reqwest::blocking::get(url)?.error_for_status()?;
    // Write to a temp name first so an interrupted download is retried.
    let tmp_path = dest.with_extension("tmp");
    let mut writer = BufWriter::new(File::create(&tmp_path)?);
    writer.write_all(&response.bytes()?)?;
    writer.flush()?;
    fs::rename(tmp_path, dest)?;
    Ok(())
}

fn mld_ready(osrm_base: &Path) -> bool {
    ["osrm.partition", "osrm.mldgr", "osrm.cells"]
        .iter()
        .all(|ext| osrm_base.with_extension(ext).exists())
        && osrm_base.exists()
}

fn run_docker(data_dir: &Path, args: &[&str]) -> Result<(), OsrmDataError> {
    let status = Command::new("docker")
        .args(["run", "--rm", "-t", "-v"])
        .arg(format!("{}:/data", data_dir.display()))
        .arg("osrm/osrm-backend")
        .args(args)
        .status()?;

    if status.success() {
        Ok(())
    } else {
        Err(OsrmDataError::ProcessFailure {
            command: args.join(" "),
            status: status.to_string(),
        })
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default()
        .to_string()
}
