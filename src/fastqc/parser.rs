//! A line-oriented parser for the `fastqc_data.txt` file inside a FastQC
//! report archive.
//!
//! The parser is pure: it turns the lines of the report into an ordered
//! sequence of [`SectionEvent`]s and performs no rendering itself, so it can
//! be tested without a display backend and replayed into any [`Render`]
//! implementation.
//!
//! [`Render`]: crate::fastqc::render::Render

use anyhow::Result;
use serde::Serialize;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::{ModuleStatus, SummaryOptions};

/// The FastQC modules whose section body is a data table worth rendering.
pub const TABLE_MODULES: [&str; 3] = [
    "Basic Statistics",
    "Overrepresented sequences",
    "Kmer Content",
];

/// Maps a FastQC module name to the plot it writes under `Images/`, for the
/// ten standard plot-bearing modules.
pub fn plot_image(module: &str) -> Option<&'static str> {
    Some(match module {
        "Per base sequence quality" => "per_base_quality.png",
        "Per tile sequence quality" => "per_tile_quality.png",
        "Per sequence quality scores" => "per_sequence_quality.png",
        "Per base sequence content" => "per_base_sequence_content.png",
        "Per sequence GC content" => "per_sequence_gc_content.png",
        "Per base N content" => "per_base_n_content.png",
        "Sequence Length Distribution" => "sequence_length_distribution.png",
        "Sequence Duplication Levels" => "duplication_levels.png",
        "Kmer Content" => "kmer_profiles.png",
        "Adapter Content" => "adapter_content.png",
        _ => return None,
    })
}

/// One row of a module's data table, keyed by its first column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub key: String,
    pub values: Vec<String>,
}

/// The data table carried by a module section. `columns` holds one label per
/// value column; the label of the key column is kept separately.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleTable {
    pub key_label: String,
    pub columns: Vec<String>,
    pub rows: Vec<TableRow>,
}

/// An ordered rendering instruction produced while scanning a report.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionEvent {
    /// A module section started. Emitted for every module, whatever its
    /// status; the status is kept as written so unrecognised values still
    /// show up in the output.
    Module { name: String, status: String },

    /// A table-bearing module section ended with an accumulated table.
    Table(ModuleTable),

    /// A plot-bearing module section referenced an image on disk.
    Plot { module: String, image: PathBuf },
}

enum State {
    /// outside any module section, or inside one with nothing to accumulate
    Idle,
    /// inside a table-bearing module, column header row not yet seen
    InModule,
    /// inside a table-bearing module, accumulating data rows
    InTable(ModuleTable),
}

/// An explicit finite-state machine over report lines. Feed it one line at a
/// time; it yields the events that line completes.
pub struct ReportParser<'a> {
    opts: &'a SummaryOptions,
    images_dir: PathBuf,
    state: State,
}

impl<'a> ReportParser<'a> {
    /// `base_dir` is the extracted report folder; plot events point into its
    /// `Images/` subfolder.
    pub fn new(opts: &'a SummaryOptions, base_dir: &Path) -> Self {
        ReportParser {
            opts,
            images_dir: base_dir.join("Images"),
            state: State::Idle,
        }
    }

    /// Consume one line of `fastqc_data.txt` and return the events it
    /// produces: none for body lines, one or two for section boundaries (a
    /// module start can announce both the module and its plot).
    pub fn feed(&mut self, line: &str) -> Vec<SectionEvent> {
        let line = line.trim();

        let Some(rest) = line.strip_prefix(">>") else {
            // not a section boundary: either a table row or ignorable body
            match &mut self.state {
                State::Idle => {}
                State::InModule => {
                    // the first line of a table section is its column header;
                    // the first token labels the key column
                    let mut columns = line.split('\t').map(String::from);
                    let key_label = columns.next().unwrap_or_default();
                    self.state = State::InTable(ModuleTable {
                        key_label,
                        columns: columns.collect(),
                        rows: Vec::new(),
                    });
                }
                State::InTable(table) => {
                    let mut values = line.split('\t').map(String::from);
                    let key = values.next().unwrap_or_default();
                    table.rows.push(TableRow {
                        key,
                        values: values.collect(),
                    });
                }
            }
            return Vec::new();
        };

        if rest.starts_with("END_MODULE") {
            let state = std::mem::replace(&mut self.state, State::Idle);
            if let State::InTable(mut table) = state {
                table.rows.truncate(self.opts.max_table_rows);
                return vec![SectionEvent::Table(table)];
            }
            return Vec::new();
        }

        // a module start line: `>>Module Name\tstatus`
        let mut parts = rest.splitn(2, '\t');
        let name = parts.next().unwrap_or_default().to_string();
        let status = parts.next().unwrap_or_default().to_string();

        let parsed = ModuleStatus::from_str(&status).ok();
        let table_wanted = parsed.is_some_and(|s| self.opts.table_if.contains(&s));
        let plot_wanted = parsed.is_some_and(|s| self.opts.plot_if.contains(&s));

        // table and plot classification are independent; both may fire for
        // the same module (Kmer Content carries both)
        self.state = if table_wanted && TABLE_MODULES.contains(&name.as_str()) {
            State::InModule
        } else {
            State::Idle
        };

        let mut events = vec![SectionEvent::Module {
            name: name.clone(),
            status,
        }];

        if plot_wanted {
            if let Some(image) = plot_image(&name) {
                events.push(SectionEvent::Plot {
                    module: name,
                    image: self.images_dir.join(image),
                });
            }
        }

        events
    }
}

/// Parses a whole `fastqc_data.txt` stream into its ordered section events.
pub fn parse_report<R: BufRead>(
    reader: R,
    base_dir: &Path,
    opts: &SummaryOptions,
) -> Result<Vec<SectionEvent>> {
    let mut parser = ReportParser::new(opts, base_dir);
    let mut events = Vec::new();

    for line in reader.lines() {
        events.extend(parser.feed(&line?));
    }

    Ok(events)
}
