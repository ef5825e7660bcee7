use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::Path;

use crate::file;

/// Column names for the transcript info table, in the order GENCODE packs
/// them into its pipe-delimited fasta headers.
pub const INFO_COLUMNS: [&str; 8] = [
    "GENCODE_transcript_id",
    "GENCODE_gene_id",
    "HAVANA_gene_id",
    "HAVANA_transcript_id",
    "transcript_name",
    "gene_name",
    "length",
    "RNA_type",
];

/// Parses the header lines of a GENCODE transcript fasta file into a
/// tab-separated info table, one row per sequence header.
///
/// Each `>` line is split on `|`, every field is trimmed, and the fields are
/// written out as one row in input order. The row is written exactly as
/// found: a header with fewer or more than eight fields produces a shorter or
/// longer row, with no padding, truncation or validation. Sequence lines are
/// ignored.
///
/// # Arguments
///
/// * `input` - Path to the fasta file, plain or gzipped (detected from the
///   file name).
/// * `output` - Path to the tsv file to write.
///
/// # Returns
///
/// The number of header lines found.
pub fn extract_info(input: &str, output: &str) -> Result<usize> {
    let reader = file::open_text(Path::new(input))?;

    // the info table is always written as plain text, whatever its name;
    // only the input is suffix-detected
    let out = std::fs::File::create(output)
        .with_context(|| format!("Unable to create {output}"))?;
    // rows are written exactly as found, so quoting must never kick in,
    // even for fields holding a quote character or for a bare `>` header
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(std::io::BufWriter::new(out));

    wtr.write_record(INFO_COLUMNS)
        .context("Could not write the info table header")?;

    let mut nseq = 0;
    for line in reader.lines() {
        let line = line.with_context(|| format!("Could not read from {input}"))?;

        if let Some(fields) = line.strip_prefix('>') {
            wtr.write_record(fields.split('|').map(str::trim))?;
            nseq += 1;
        }
    }

    wtr.flush()?;
    Ok(nseq)
}

/// Rewrites a GENCODE transcript fasta file so that each header line keeps
/// only the sequence ID: the first pipe-delimited, trimmed field of the
/// original header. Every other line is copied through as read, including
/// its line terminator.
///
/// To keep a record of the discarded header fields, run [`extract_info`]
/// beforehand.
///
/// # Arguments
///
/// * `input` - Path to the fasta file, plain or gzipped (detected from the
///   file name).
/// * `output` - Path to the fasta file to write, gzipped when the file name
///   ends in `gz`.
///
/// # Returns
///
/// The number of header lines rewritten.
pub fn clean_headers(input: &str, output: &str) -> Result<usize> {
    let mut reader = file::open_text(Path::new(input))?;
    let mut writer = file::create_text(Path::new(output))?;

    let mut nseq = 0;
    let mut line = String::new();
    loop {
        line.clear();
        let n = reader
            .read_line(&mut line)
            .with_context(|| format!("Could not read from {input}"))?;
        if n == 0 {
            break;
        }

        // a header line is any line whose first character is `>`; an empty
        // line is body content and is passed through untouched
        if let Some(fields) = line.strip_prefix('>') {
            let id = fields.split('|').next().unwrap_or("").trim();
            writeln!(writer, ">{id}")?;
            nseq += 1;
        } else {
            writer.write_all(line.as_bytes())?;
        }
    }

    writer.flush()?;
    Ok(nseq)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use std::io::{Read, Write};

    const GENCODE_FASTA: &str = indoc! {"
        >ENST001|ENSG001|OTTHUMG1|OTTHUMT1|TX1|GENE1|500|protein_coding
        ACGT
    "};

    fn write_fixture(dir: &tempfile::TempDir, name: &str, contents: &str) -> String {
        let path = dir.path().join(name);
        let mut wtr = crate::file::create_text(&path).unwrap();
        wtr.write_all(contents.as_bytes()).unwrap();
        wtr.flush().unwrap();
        path.to_str().unwrap().to_string()
    }

    #[test]
    fn info_single_record() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_fixture(&dir, "tx.fa", GENCODE_FASTA);
        let output = dir.path().join("info.tsv");

        let nseq = extract_info(&input, output.to_str().unwrap()).unwrap();
        assert_eq!(nseq, 1);

        let expected = "GENCODE_transcript_id\tGENCODE_gene_id\tHAVANA_gene_id\t\
                        HAVANA_transcript_id\ttranscript_name\tgene_name\tlength\tRNA_type\n\
                        ENST001\tENSG001\tOTTHUMG1\tOTTHUMT1\tTX1\tGENE1\t500\tprotein_coding\n";
        assert_eq!(std::fs::read_to_string(output).unwrap(), expected);
    }

    #[test]
    fn info_row_count_matches_header_count() {
        let fasta = indoc! {"
            >ENST001|ENSG001
            ACGT
            ACGT

            >ENST002|ENSG002|OTTHUMG2
            GGCC
            >ENST003
            TTAA
        "};

        let dir = tempfile::tempdir().unwrap();
        let input = write_fixture(&dir, "tx.fa", fasta);
        let output = dir.path().join("info.tsv");

        let nseq = extract_info(&input, output.to_str().unwrap()).unwrap();
        assert_eq!(nseq, 3);

        // one row per header, regardless of field count, plus the column row
        let table = std::fs::read_to_string(output).unwrap();
        let rows: Vec<&str> = table.lines().collect();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[1], "ENST001\tENSG001");
        assert_eq!(rows[2], "ENST002\tENSG002\tOTTHUMG2");
        assert_eq!(rows[3], "ENST003");
    }

    #[test]
    fn info_trims_whitespace_around_fields() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_fixture(&dir, "tx.fa", "> ENST001 | ENSG001 |500\nACGT\n");
        let output = dir.path().join("info.tsv");

        extract_info(&input, output.to_str().unwrap()).unwrap();

        let table = std::fs::read_to_string(output).unwrap();
        assert_eq!(table.lines().nth(1).unwrap(), "ENST001\tENSG001\t500");
    }

    #[test]
    fn info_writes_awkward_fields_raw() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_fixture(&dir, "tx.fa", ">\nACGT\n>ENST9|5\" oligo|rna\nGGCC\n");
        let output = dir.path().join("info.tsv");

        let nseq = extract_info(&input, output.to_str().unwrap()).unwrap();
        assert_eq!(nseq, 2);

        // a bare `>` header yields an empty row, and a quote character in a
        // field passes through untouched
        let table = std::fs::read_to_string(output).unwrap();
        let rows: Vec<&str> = table.lines().collect();
        assert_eq!(rows[1], "");
        assert_eq!(rows[2], "ENST9\t5\" oligo\trna");
    }

    #[test]
    fn info_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_fixture(&dir, "tx.fa", GENCODE_FASTA);
        let out_a = dir.path().join("a.tsv");
        let out_b = dir.path().join("b.tsv");

        extract_info(&input, out_a.to_str().unwrap()).unwrap();
        extract_info(&input, out_b.to_str().unwrap()).unwrap();

        assert_eq!(
            std::fs::read(out_a).unwrap(),
            std::fs::read(out_b).unwrap()
        );
    }

    #[test]
    fn clean_single_record() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_fixture(&dir, "tx.fa", GENCODE_FASTA);
        let output = dir.path().join("clean.fa");

        let nseq = clean_headers(&input, output.to_str().unwrap()).unwrap();
        assert_eq!(nseq, 1);
        assert_eq!(std::fs::read_to_string(output).unwrap(), ">ENST001\nACGT\n");
    }

    #[test]
    fn clean_passes_body_lines_through() {
        let fasta = ">ENST001|ENSG001\nACGT\n\nNNNN\n";

        let dir = tempfile::tempdir().unwrap();
        let input = write_fixture(&dir, "tx.fa", fasta);
        let output = dir.path().join("clean.fa");

        clean_headers(&input, output.to_str().unwrap()).unwrap();

        // the empty line is body content, not a header, and survives as-is
        assert_eq!(
            std::fs::read_to_string(output).unwrap(),
            ">ENST001\nACGT\n\nNNNN\n"
        );
    }

    #[test]
    fn clean_reads_and_writes_gzip_by_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_fixture(&dir, "tx.fa.gz", GENCODE_FASTA);
        let output = dir.path().join("clean.fa.gz");

        let nseq = clean_headers(&input, output.to_str().unwrap()).unwrap();
        assert_eq!(nseq, 1);

        let mut contents = String::new();
        crate::file::open_text(&output)
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, ">ENST001\nACGT\n");
    }

    #[test]
    fn clean_then_info_yields_single_column() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_fixture(&dir, "tx.fa", GENCODE_FASTA);
        let cleaned = dir.path().join("clean.fa");
        let info = dir.path().join("info.tsv");

        clean_headers(&input, cleaned.to_str().unwrap()).unwrap();
        extract_info(cleaned.to_str().unwrap(), info.to_str().unwrap()).unwrap();

        // a cleaned header has a single pipe field: the original ID
        let table = std::fs::read_to_string(info).unwrap();
        assert_eq!(table.lines().nth(1).unwrap(), "ENST001");
    }
}
