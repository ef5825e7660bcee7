pub mod parser;
pub mod render;

use anyhow::{bail, Context, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use parser::SectionEvent;
use render::Render;

/// The status FastQC assigns to each of its check modules.
#[derive(Debug, Copy, Clone, PartialEq, Eq, clap::ValueEnum)]
pub enum ModuleStatus {
    Pass,
    Warn,
    Fail,
}

impl std::fmt::Display for ModuleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ModuleStatus::Pass => "pass",
            ModuleStatus::Warn => "warn",
            ModuleStatus::Fail => "fail",
        })
    }
}

impl FromStr for ModuleStatus {
    type Err = ();

    /// FastQC writes statuses in lowercase; anything else is unrecognised.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pass" => Ok(ModuleStatus::Pass),
            "warn" => Ok(ModuleStatus::Warn),
            "fail" => Ok(ModuleStatus::Fail),
            _ => Err(()),
        }
    }
}

/// Options controlling which report sections are rendered.
#[derive(Debug, Clone)]
pub struct SummaryOptions {
    /// statuses for which a module's table is rendered
    pub table_if: Vec<ModuleStatus>,
    /// statuses for which a module's plot is rendered
    pub plot_if: Vec<ModuleStatus>,
    /// cap on the number of rows rendered per table, keeping the first rows
    /// in encounter order
    pub max_table_rows: usize,
    /// continue with the remaining archives when one cannot be summarised
    pub keep_going: bool,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        SummaryOptions {
            table_if: vec![ModuleStatus::Pass, ModuleStatus::Warn, ModuleStatus::Fail],
            plot_if: vec![ModuleStatus::Pass, ModuleStatus::Warn, ModuleStatus::Fail],
            max_table_rows: 10,
            keep_going: false,
        }
    }
}

#[derive(Error, Debug)]
pub enum SummariseErr {
    #[error("no report folder found inside {archive}: expected a single top-level directory")]
    MissingReportDir { archive: String },

    #[error("no fastqc_data.txt found inside {archive}")]
    MissingDataFile { archive: String },
}

/// Summarises every `*_fastqc.zip` archive found directly inside `dir`,
/// replaying the parsed report sections into `renderer` in file-then-section
/// encounter order.
///
/// Archives are processed one at a time, in sorted filename order. Each one
/// is extracted into its own temporary directory, which is removed again
/// whether or not the archive could be summarised. A malformed archive stops
/// the scan unless [`SummaryOptions::keep_going`] is set, in which case it is
/// logged and skipped.
pub fn summarize(dir: &str, renderer: &mut dyn Render, opts: &SummaryOptions) -> Result<()> {
    let mut archives: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("Unable to read directory {dir}"))?
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            let name = path.file_name()?.to_str()?;
            (path.is_file() && name.ends_with("_fastqc.zip")).then_some(path)
        })
        .collect();
    archives.sort();

    if archives.is_empty() {
        warn!("No *_fastqc.zip archives found in {dir}");
    }

    for archive in &archives {
        let name = archive
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        renderer.archive(name)?;

        if let Err(e) = summarize_archive(archive, renderer, opts) {
            if !opts.keep_going {
                return Err(e);
            }
            error!("Skipping {}: {e}", archive.display());
        }
    }

    renderer.finish()
}

/// Extracts one FastQC archive into a scoped temporary directory and renders
/// its report. The temporary directory is removed when this function
/// returns, success or failure.
fn summarize_archive(
    archive: &Path,
    renderer: &mut dyn Render,
    opts: &SummaryOptions,
) -> Result<()> {
    let tmp = tempfile::tempdir().context("Unable to create a temporary directory")?;

    let file = File::open(archive)
        .with_context(|| format!("Unable to open {}", archive.display()))?;
    let mut zip = zip::ZipArchive::new(file)
        .with_context(|| format!("Unable to read {} as a zip archive", archive.display()))?;
    zip.extract(tmp.path())
        .with_context(|| format!("Unable to extract {}", archive.display()))?;

    // FastQC zips hold a single folder named after the sequencing file
    let Some(base_dir) = single_subdir(tmp.path())? else {
        bail!(SummariseErr::MissingReportDir {
            archive: archive.display().to_string(),
        });
    };

    let data_path = base_dir.join("fastqc_data.txt");
    if !data_path.is_file() {
        bail!(SummariseErr::MissingDataFile {
            archive: archive.display().to_string(),
        });
    }

    let reader = BufReader::new(
        File::open(&data_path)
            .with_context(|| format!("Unable to open {}", data_path.display()))?,
    );
    let events = parser::parse_report(reader, &base_dir, opts)?;

    // the images referenced by plot events live under the temporary
    // directory, so they must be rendered before it is dropped
    for event in &events {
        match event {
            SectionEvent::Module { name, status } => renderer.module(name, status)?,
            SectionEvent::Table(table) => renderer.table(table)?,
            SectionEvent::Plot { module, image } => renderer.plot(module, image)?,
        }
    }

    Ok(())
}

/// Returns the first directory entry inside `dir`, in sorted order, or
/// `None` when `dir` contains no directories at all.
fn single_subdir(dir: &Path) -> Result<Option<PathBuf>> {
    let mut dirs: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            path.is_dir().then_some(path)
        })
        .collect();
    dirs.sort();

    Ok(dirs.into_iter().next())
}
