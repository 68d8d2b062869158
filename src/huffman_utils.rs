//! File-level wrappers that compress and decompress files on disk.
use std::{
    fs::{self, File},
    path::{Path, PathBuf},
};

use crate::bitio::{BitInputStream, BitOutputStream};
use crate::config::DebugLevel;
use crate::error::Result;
use crate::processor::{self, Summary};

/// Suffix appended to compressed files.
pub const HUFF_EXTENSION: &str = "huff";

/// Compresses a file using Huffman coding.
///
/// # Arguments
///
/// * `file_path` - The file to be compressed.
///
/// * `output` - Where to write the compressed stream, `<file_path>.huff` if `None`.
///
/// * `debug` - Diagnostic output level.
///
/// # Errors
///
/// Returns an error if the file cannot be opened, read, or written to.
pub fn huff(file_path: &Path, output: Option<&Path>, debug: DebugLevel) -> Result<Summary> {
    let out_path = output.map_or_else(|| huff_path(file_path), Path::to_path_buf);

    let mut input = BitInputStream::new(File::open(file_path)?);
    let mut f_out = BitOutputStream::new(File::create(&out_path)?);

    let summary = processor::compress_with(&mut input, &mut f_out, debug)?;
    log::debug!("wrote {}", out_path.display());
    Ok(summary)
}

/// Decompresses a file that was compressed using [`huff`].
///
/// On failure the partially written output file is removed.
///
/// # Arguments
///
/// * `file_path` - The compressed file.
///
/// * `output` - Where to write the restored bytes, see [`puff_path`] if `None`.
///
/// * `debug` - Diagnostic output level.
///
/// # Errors
///
/// Returns an error if the files cannot be opened, read, or written to, or if the
/// input is not a valid compressed stream.
pub fn puff(file_path: &Path, output: Option<&Path>, debug: DebugLevel) -> Result<Summary> {
    let out_path = output.map_or_else(|| puff_path(file_path), Path::to_path_buf);

    let mut input = BitInputStream::new(File::open(file_path)?);
    let mut f_out = BitOutputStream::new(File::create(&out_path)?);

    match processor::decompress_with(&mut input, &mut f_out, debug) {
        Ok(summary) => {
            log::debug!("wrote {}", out_path.display());
            Ok(summary)
        }
        Err(err) => {
            drop(f_out);
            if let Err(remove_err) = fs::remove_file(&out_path) {
                log::warn!("could not remove {}: {}", out_path.display(), remove_err);
            }
            Err(err)
        }
    }
}

/// `notes.txt` becomes `notes.txt.huff`.
pub fn huff_path(file_path: &Path) -> PathBuf {
    let mut name = file_path.as_os_str().to_owned();
    name.push(".");
    name.push(HUFF_EXTENSION);
    PathBuf::from(name)
}

/// `dir/notes.txt.huff` becomes `dir/out_notes.txt`; the `.huff` suffix is optional.
pub fn puff_path(file_path: &Path) -> PathBuf {
    let stem = match file_path.extension() {
        Some(ext) if ext == HUFF_EXTENSION => file_path.with_extension(""),
        _ => file_path.to_path_buf(),
    };
    let name = stem
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    stem.with_file_name(format!("out_{}", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use tempfile::tempdir;

    #[test]
    fn test_output_paths() {
        assert_eq!(huff_path(Path::new("notes.txt")), PathBuf::from("notes.txt.huff"));
        assert_eq!(puff_path(Path::new("dir/notes.txt.huff")), PathBuf::from("dir/out_notes.txt"));
        assert_eq!(puff_path(Path::new("archive")), PathBuf::from("out_archive"));
    }

    #[test]
    fn test_huff_then_puff() {
        let dir = tempdir().unwrap();
        let original = dir.path().join("poem.txt");
        let text = b"Tyger Tyger, burning bright,\nIn the forests of the night;\n".repeat(20);
        fs::write(&original, &text).unwrap();

        let packed = huff(&original, None, DebugLevel::Off).unwrap();
        assert_eq!(packed.bits_read, text.len() as u64 * 8);

        let compressed = dir.path().join("poem.txt.huff");
        assert!(fs::metadata(&compressed).unwrap().len() < text.len() as u64);

        puff(&compressed, None, DebugLevel::Low).unwrap();
        assert_eq!(fs::read(dir.path().join("out_poem.txt")).unwrap(), text);
    }

    #[test]
    fn test_failed_puff_removes_output() {
        let dir = tempdir().unwrap();
        let bogus = dir.path().join("bogus.huff");
        fs::write(&bogus, b"definitely not compressed").unwrap();
        let restored = dir.path().join("restored");

        let err = puff(&bogus, Some(&restored), DebugLevel::Off).unwrap_err();
        assert!(matches!(err, Error::InvalidMagic(_)));
        assert!(!restored.exists());
    }

    #[test]
    fn test_missing_input() {
        let dir = tempdir().unwrap();
        let err = huff(&dir.path().join("absent"), None, DebugLevel::Off).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
