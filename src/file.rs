use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Returns true when `path` names a gzip-compressed file.
///
/// Detection is a filename heuristic only: the last two characters of the
/// file name, lower-cased, must be exactly `gz`. File content is never
/// inspected, so `reads.GZ` counts as gzip while `reads.gzip` does not.
pub fn is_gzip_path(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };

    let bytes = name.as_bytes();
    bytes.len() >= 2 && bytes[bytes.len() - 2..].eq_ignore_ascii_case(b"gz")
}

/// Open a text file for buffered line-oriented reading, decompressing on the
/// fly when the file name says it is gzipped.
pub fn open_text(path: &Path) -> Result<Box<dyn BufRead>> {
    let file =
        File::open(path).with_context(|| format!("Unable to open {}", path.display()))?;

    Ok(if is_gzip_path(path) {
        Box::new(BufReader::new(MultiGzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    })
}

/// Create a text file for buffered writing, compressing on the fly when the
/// file name says it should be gzipped.
///
/// The caller should flush the writer before dropping it so that write
/// failures surface as errors rather than being swallowed on drop.
pub fn create_text(path: &Path) -> Result<Box<dyn Write>> {
    let file =
        File::create(path).with_context(|| format!("Unable to create {}", path.display()))?;

    Ok(if is_gzip_path(path) {
        Box::new(BufWriter::new(GzEncoder::new(file, Compression::default())))
    } else {
        Box::new(BufWriter::new(file))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn gzip_suffix_heuristic() {
        assert!(is_gzip_path(Path::new("transcripts.fa.gz")));
        assert!(is_gzip_path(Path::new("transcripts.fa.GZ")));
        assert!(is_gzip_path(Path::new("gz")));

        assert!(!is_gzip_path(Path::new("transcripts.fa")));
        assert!(!is_gzip_path(Path::new("transcripts.gzip")));
        assert!(!is_gzip_path(Path::new("g")));
        assert!(!is_gzip_path(Path::new("")));
    }

    #[test]
    fn round_trip_gzipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lines.txt.gz");

        let mut wtr = create_text(&path).unwrap();
        wtr.write_all(b">ENST001|ENSG001\nACGT\n").unwrap();
        wtr.flush().unwrap();
        drop(wtr);

        // the file on disk should actually be gzip data
        let mut magic = [0u8; 2];
        File::open(&path).unwrap().read_exact(&mut magic).unwrap();
        assert_eq!(magic, [0x1f, 0x8b]);

        let mut contents = String::new();
        open_text(&path)
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, ">ENST001|ENSG001\nACGT\n");
    }

    #[test]
    fn round_trip_plain() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lines.txt");

        let mut wtr = create_text(&path).unwrap();
        wtr.write_all(b"plain text\n").unwrap();
        wtr.flush().unwrap();
        drop(wtr);

        assert_eq!(std::fs::read(&path).unwrap(), b"plain text\n");

        let mut contents = String::new();
        open_text(&path)
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "plain text\n");
    }

    #[test]
    fn open_missing_file_names_the_path() {
        let Err(err) = open_text(Path::new("does_not_exist.fa")) else {
            panic!("opening a missing file should fail");
        };
        assert!(err.to_string().contains("does_not_exist.fa"));
    }
}
