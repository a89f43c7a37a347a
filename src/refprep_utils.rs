use std::io::BufRead;
use std::path::{Path, PathBuf};

/// Tests if the stream underlying `reader` is gzipped or not by examining the
/// first 2 bytes for the magic header. This function *requires*, but does not
/// check, that none of the stream has yet been consumed (i.e. that no read
/// calls have yet been issued to `reader`). It will fill the buffer to examine
/// the first two bytes, but will not consume them.
///
/// If the first 2 bytes could be succesfully read, this returns
/// [Ok]`(true)` if the file is a gzipped file
/// [Ok]`(false)` if it is not a gzipped file
///
/// If the first 2 bytes could not be succesfully read, then this
/// returns the relevant [std::io::Error].
///
/// Notes: implementation taken from
/// <https://github.com/zaeleus/noodles/blob/ba1b34ce22e72c2df277b20ce4c5c7b75d75a199/noodles-util/src/variant/reader/builder.rs#L131>
pub fn is_gzipped<T: BufRead>(reader: &mut T) -> std::io::Result<bool> {
    const GZIP_MAGIC_NUMBER: [u8; 2] = [0x1f, 0x8b];

    let src = reader.fill_buf()?;
    if src.get(..2) == Some(&GZIP_MAGIC_NUMBER) {
        Ok(true)
    } else {
        Ok(false)
    }
}

/// Returns `path` with `.ext` appended after any existing extension, so
/// `genome.fa` becomes `genome.fa.fai`. [Path::with_extension] would replace
/// the existing extension instead, which is not what tools like
/// `samtools faidx` produce.
pub fn append_extension<T: AsRef<Path>>(path: T, ext: &str) -> PathBuf {
    let mut s = path.as_ref().as_os_str().to_os_string();
    s.push(".");
    s.push(ext);
    PathBuf::from(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_gzip_magic() {
        let mut gz: &[u8] = &[0x1f, 0x8b, 0x08, 0x00];
        assert!(is_gzipped(&mut gz).unwrap());

        let mut plain: &[u8] = b"chr1\tsource\texon\n";
        assert!(!is_gzipped(&mut plain).unwrap());
    }

    #[test]
    fn appends_after_existing_extension() {
        assert_eq!(
            append_extension("genome.fa", "fai"),
            PathBuf::from("genome.fa.fai")
        );
        assert_eq!(
            append_extension(Path::new("/data/ref/genome"), "fai"),
            PathBuf::from("/data/ref/genome.fai")
        );
    }
}
