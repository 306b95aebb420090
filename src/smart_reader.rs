use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::Context;
use flate2::read::MultiGzDecoder;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Opens a text file, transparently decompressing GZIP or BGZF content.
///
/// Detection is by magic bytes, so the extension does not matter.
pub fn open_input(path: &Path) -> anyhow::Result<Box<dyn BufRead + Send>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut reader = BufReader::new(file);

    let is_gzip = {
        let buf = reader
            .fill_buf()
            .with_context(|| format!("failed to read {}", path.display()))?;
        buf.starts_with(&GZIP_MAGIC)
    };

    if is_gzip {
        tracing::debug!(path = %path.display(), "detected GZIP/BGZF layer");
        // MultiGzDecoder walks every BGZF block, not just the first member
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(reader))))
    } else {
        Ok(Box::new(reader))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::{Compression, write::GzEncoder};
    use std::io::{Read, Write};

    #[test]
    fn reads_plain_and_gzip_alike() {
        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("plain.txt");
        std::fs::write(&plain, "hello\n").unwrap();

        let gz = dir.path().join("packed.txt.gz");
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"hello\n").unwrap();
        std::fs::write(&gz, encoder.finish().unwrap()).unwrap();

        for path in [plain, gz] {
            let mut text = String::new();
            open_input(&path).unwrap().read_to_string(&mut text).unwrap();
            assert_eq!(text, "hello\n");
        }
    }

    #[test]
    fn empty_file_is_readable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        std::fs::write(&path, "").unwrap();
        let mut text = String::new();
        open_input(&path).unwrap().read_to_string(&mut text).unwrap();
        assert!(text.is_empty());
    }

    #[test]
    fn missing_file_names_path() {
        let err = open_input(Path::new("/nonexistent/cohort.csv"))
            .err()
            .expect("opening a missing file should fail");
        assert!(err.to_string().contains("/nonexistent/cohort.csv"));
    }
}
