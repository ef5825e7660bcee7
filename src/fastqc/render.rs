//! Rendering backends for the FastQC summary.
//!
//! The parser produces section events; a [`Render`] implementation turns
//! them into something a person can look at. Two backends are provided: a
//! self-contained html report (the plots are embedded, so it outlives the
//! temporary extraction directories) and a plain-text renderer for the
//! terminal.

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use itertools::Itertools;
use serde::Serialize;
use serde_json::json;
use std::io::Write;
use std::path::Path;

use super::parser::ModuleTable;

// encode the template HTML file at compile time as a string literal
const TEMPLATE_HTML: &str = include_str!("report_template.html");

/// A display surface for FastQC report sections. Calls arrive in
/// file-then-section encounter order; `finish` is called once after the last
/// archive.
pub trait Render {
    /// A new archive's sections follow.
    fn archive(&mut self, name: &str) -> Result<()>;

    /// A module heading, with its status as written in the report.
    fn module(&mut self, name: &str, status: &str) -> Result<()>;

    /// The table accumulated for the preceding module.
    fn table(&mut self, table: &ModuleTable) -> Result<()>;

    /// A plot for the preceding module. `image` is only readable for the
    /// duration of this call; implementations must copy what they need.
    fn plot(&mut self, module: &str, image: &Path) -> Result<()>;

    /// All archives have been rendered.
    fn finish(&mut self) -> Result<()>;
}

#[derive(Serialize)]
struct ModuleHeading {
    name: String,
    status: String,
}

#[derive(Serialize)]
struct Plot {
    module: String,
    data_uri: String,
}

/// One rendered block. Exactly one of the fields is set; the template picks
/// the block type off whichever is present.
#[derive(Serialize, Default)]
struct Section {
    #[serde(skip_serializing_if = "Option::is_none")]
    module: Option<ModuleHeading>,
    #[serde(skip_serializing_if = "Option::is_none")]
    table: Option<ModuleTable>,
    #[serde(skip_serializing_if = "Option::is_none")]
    plot: Option<Plot>,
}

#[derive(Serialize)]
struct ArchiveReport {
    name: String,
    sections: Vec<Section>,
}

/// Collects sections per archive and renders them through the handlebars
/// template into a single self-contained html file at `finish`.
pub struct HtmlRenderer {
    output: String,
    archives: Vec<ArchiveReport>,
}

impl HtmlRenderer {
    pub fn new(output: &str) -> Self {
        HtmlRenderer {
            output: output.to_string(),
            archives: Vec::new(),
        }
    }

    fn push(&mut self, section: Section) -> Result<()> {
        self.archives
            .last_mut()
            .context("Section rendered before any archive")?
            .sections
            .push(section);
        Ok(())
    }
}

impl Render for HtmlRenderer {
    fn archive(&mut self, name: &str) -> Result<()> {
        self.archives.push(ArchiveReport {
            name: name.to_string(),
            sections: Vec::new(),
        });
        Ok(())
    }

    fn module(&mut self, name: &str, status: &str) -> Result<()> {
        self.push(Section {
            module: Some(ModuleHeading {
                name: name.to_string(),
                status: status.to_string(),
            }),
            ..Section::default()
        })
    }

    fn table(&mut self, table: &ModuleTable) -> Result<()> {
        self.push(Section {
            table: Some(table.clone()),
            ..Section::default()
        })
    }

    fn plot(&mut self, module: &str, image: &Path) -> Result<()> {
        // the source file disappears with the archive's temporary directory,
        // so embed it as a data uri rather than linking to it
        let bytes = std::fs::read(image)
            .with_context(|| format!("Unable to read plot {}", image.display()))?;

        self.push(Section {
            plot: Some(Plot {
                module: module.to_string(),
                data_uri: format!("data:image/png;base64,{}", BASE64.encode(bytes)),
            }),
            ..Section::default()
        })
    }

    fn finish(&mut self) -> Result<()> {
        let data = json!({
            "version": crate::cli::VERSION,
            "date": chrono::Local::now().format("%Y-%m-%d %H:%M").to_string(),
            "archives": &self.archives,
        });

        let file = std::fs::File::create(&self.output)
            .with_context(|| format!("Unable to create {}", self.output))?;
        let reg = handlebars::Handlebars::new();
        reg.render_template_to_write(TEMPLATE_HTML, &data, file)?;

        Ok(())
    }
}

/// Writes headings and aligned tables straight to a text sink. Plots cannot
/// be inlined in a terminal, so only their file names are mentioned.
pub struct TextRenderer<W: Write> {
    writer: W,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(writer: W) -> Self {
        TextRenderer { writer }
    }
}

impl<W: Write> Render for TextRenderer<W> {
    fn archive(&mut self, name: &str) -> Result<()> {
        writeln!(self.writer, "\n=== {name} ===")?;
        Ok(())
    }

    fn module(&mut self, name: &str, status: &str) -> Result<()> {
        writeln!(self.writer, "{name} : {status}")?;
        Ok(())
    }

    fn table(&mut self, table: &ModuleTable) -> Result<()> {
        // pad every column to the width of its widest cell
        let mut widths: Vec<usize> = Vec::new();
        let all_rows = std::iter::once((&table.key_label, &table.columns))
            .chain(table.rows.iter().map(|r| (&r.key, &r.values)));
        for (key, values) in all_rows.clone() {
            for (i, cell) in std::iter::once(key).chain(values.iter()).enumerate() {
                if i >= widths.len() {
                    widths.push(0);
                }
                widths[i] = widths[i].max(cell.len());
            }
        }

        for (key, values) in all_rows {
            let line = std::iter::once(key)
                .chain(values.iter())
                .enumerate()
                .map(|(i, cell)| format!("{cell:width$}", width = widths[i]))
                .join("  ");
            writeln!(self.writer, "  {}", line.trim_end())?;
        }
        Ok(())
    }

    fn plot(&mut self, _module: &str, image: &Path) -> Result<()> {
        let name = image.file_name().and_then(|n| n.to_str()).unwrap_or("?");
        writeln!(self.writer, "  [plot: {name}]")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
