use clap::builder::styling::AnsiColor;
use clap::builder::Styles;
use clap::{Parser, Subcommand};

use crate::fastqc::ModuleStatus;

const fn extra_build_info() -> &'static str {
    match option_env!("CARGO_BUILD_DESC") {
        Some(e) => e,
        None => env!("CARGO_PKG_VERSION"),
    }
}
pub const VERSION: &str = extra_build_info();
const INFO_STRING: &str = "
🧹 seqtidy version ";
const AFTER_STRING: &str = "
   ──────────────────────────────────
   tools for tidying GENCODE fasta files and summarising FastQC reports";

// colouring of the help
const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().bold())
    .usage(AnsiColor::BrightMagenta.on_default().bold())
    .literal(AnsiColor::BrightMagenta.on_default())
    .placeholder(AnsiColor::White.on_default());

#[derive(Parser)]
#[command(
    version = VERSION,
    about = format!("{}{}{}", INFO_STRING, VERSION, AFTER_STRING),
    arg_required_else_help = true,
    flatten_help = true,
    styles = STYLES
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract the pipe-delimited metadata from GENCODE fasta headers into a
    /// tab-separated table
    #[command(arg_required_else_help = true)]
    Info {
        /// the input fasta file, plain or gzipped (detected from the file name)
        fasta: String,

        /// the output tsv file
        #[arg(short, default_value = "gencode_info.tsv")]
        output: String,
    },

    /// Rewrite a GENCODE fasta file so each header keeps only the sequence ID
    #[command(arg_required_else_help = true)]
    Clean {
        /// the input fasta file, plain or gzipped (detected from the file name)
        fasta: String,

        /// the output fasta file, gzipped if the name ends in `gz`
        #[arg(short, default_value = "gencode_clean.fa.gz")]
        output: String,
    },

    /// Summarise the zipped FastQC reports in a directory into a single report
    #[command(arg_required_else_help = true)]
    Qc {
        /// directory containing `*_fastqc.zip` archives (not searched
        /// recursively)
        dir: String,

        /// the output html report
        #[arg(short, default_value = "summary.html")]
        output: String,

        /// render a module's table only when its status is one of these
        #[arg(long, value_delimiter = ',', default_value = "pass,warn,fail")]
        table_if: Vec<ModuleStatus>,

        /// render a module's plot only when its status is one of these
        #[arg(long, value_delimiter = ',', default_value = "pass,warn,fail")]
        plot_if: Vec<ModuleStatus>,

        /// maximum number of rows rendered per table
        #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
        max_table_rows: u32,

        /// log and move on to the next archive when one cannot be read,
        /// instead of stopping at the first failure
        #[arg(long)]
        keep_going: bool,

        /// render plain text to stdout instead of writing an html report
        #[arg(long, conflicts_with = "output")]
        text: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fastqc::ModuleStatus;

    #[test]
    fn qc_defaults() {
        let cli = Cli::try_parse_from(["seqtidy", "qc", "fastqc_results"]).unwrap();
        let Commands::Qc {
            table_if,
            plot_if,
            max_table_rows,
            keep_going,
            text,
            ..
        } = cli.command
        else {
            panic!("expected qc subcommand");
        };

        assert_eq!(
            table_if,
            vec![ModuleStatus::Pass, ModuleStatus::Warn, ModuleStatus::Fail]
        );
        assert_eq!(plot_if.len(), 3);
        assert_eq!(max_table_rows, 10);
        assert!(!keep_going);
        assert!(!text);
    }

    #[test]
    fn qc_status_filters() {
        let cli = Cli::try_parse_from([
            "seqtidy",
            "qc",
            "fastqc_results",
            "--table-if",
            "warn,fail",
            "--plot-if",
            "fail",
        ])
        .unwrap();
        let Commands::Qc {
            table_if, plot_if, ..
        } = cli.command
        else {
            panic!("expected qc subcommand");
        };

        assert_eq!(table_if, vec![ModuleStatus::Warn, ModuleStatus::Fail]);
        assert_eq!(plot_if, vec![ModuleStatus::Fail]);
    }

    #[test]
    fn max_table_rows_must_be_positive() {
        let res = Cli::try_parse_from(["seqtidy", "qc", "dir", "--max-table-rows", "0"]);
        assert!(res.is_err());
    }
}
