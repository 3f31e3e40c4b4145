//! `/proc/meminfo` acquisition.
//!
//! The file is plain text, one statistic per line in the form
//! `<Label>:<whitespace><integer><whitespace>kB`. Only `MemTotal` and
//! `MemAvailable` are needed; every other line is ignored.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use rammon_core::{MemoryStats, ReadError};

/// Kernel memory statistics on Linux.
pub const MEMINFO_PATH: &str = "/proc/meminfo";

const MEM_TOTAL: &str = "MemTotal";
const MEM_AVAILABLE: &str = "MemAvailable";

/// Anything that can produce one [`MemoryStats`] per call.
///
/// Closures returning `Result<MemoryStats, ReadError>` implement this too,
/// which is handy for hosts feeding the sampler from somewhere else.
pub trait MemorySource {
    fn read(&mut self) -> Result<MemoryStats, ReadError>;
}

impl<F> MemorySource for F
where
    F: FnMut() -> Result<MemoryStats, ReadError>,
{
    fn read(&mut self) -> Result<MemoryStats, ReadError> {
        self()
    }
}

/// Reads [`MemoryStats`] from a meminfo-formatted file.
#[derive(Debug, Clone)]
pub struct ProcMeminfo {
    path: PathBuf,
}

impl ProcMeminfo {
    pub fn new() -> Self {
        Self::at(MEMINFO_PATH)
    }

    /// Read from `path` instead of `/proc/meminfo`.
    pub fn at(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for ProcMeminfo {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySource for ProcMeminfo {
    /// Open errors, and I/O errors part way through, are
    /// [`ReadError::Unavailable`]; the next tick simply tries again.
    fn read(&mut self) -> Result<MemoryStats, ReadError> {
        let file = File::open(&self.path)?;
        parse_meminfo(BufReader::new(file))
    }
}

/// Scan meminfo text for `MemTotal` and `MemAvailable`.
///
/// Lines are matched as bytes, so an unrelated line that isn't valid UTF-8
/// is skipped like any other unknown label. Stops reading as soon as both
/// fields are found. A label whose value is not an integer followed by `kB`
/// counts as absent.
pub fn parse_meminfo<R: BufRead>(mut reader: R) -> Result<MemoryStats, ReadError> {
    let mut total = None;
    let mut available = None;
    let mut line = Vec::with_capacity(80);

    while total.is_none() || available.is_none() {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }

        if total.is_none() {
            if let Some(kb) = field_kb(&line, MEM_TOTAL) {
                total = Some(kb);
                continue;
            }
        }
        if available.is_none() {
            available = field_kb(&line, MEM_AVAILABLE);
        }
    }

    match (total, available) {
        (Some(total_kb), Some(available_kb)) => Ok(MemoryStats { total_kb, available_kb }),
        (total, available) => {
            let mut missing = Vec::with_capacity(2);
            if total.is_none() {
                missing.push(MEM_TOTAL);
            }
            if available.is_none() {
                missing.push(MEM_AVAILABLE);
            }
            Err(ReadError::MissingFields(missing))
        }
    }
}

/// Value of `label` in kB if `line` is exactly `<label>: <int> kB`.
fn field_kb(line: &[u8], label: &str) -> Option<u64> {
    let rest = line.strip_prefix(label.as_bytes())?.strip_prefix(b":")?;
    let rest = std::str::from_utf8(rest).ok()?;
    let mut parts = rest.split_whitespace();
    let value = parts.next()?.parse::<u64>().ok()?;
    match (parts.next(), parts.next()) {
        (Some("kB"), None) => Some(value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rammon_core::FailureKind;
    use std::io::{self, Cursor, Read, Write};

    /// Fails every read, like a device vanishing mid-scan.
    struct Broken;

    impl Read for Broken {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "device gone"))
        }
    }

    const SAMPLE: &str = "\
MemTotal:       16304284 kB
MemFree:         8123456 kB
MemAvailable:    8967832 kB
Buffers:          412340 kB
Cached:          3012456 kB
";

    fn parse(text: &str) -> Result<MemoryStats, ReadError> {
        parse_meminfo(Cursor::new(text))
    }

    #[test]
    fn parses_required_fields() {
        let stats = parse(SAMPLE).unwrap();
        assert_eq!(stats.total_kb, 16_304_284);
        assert_eq!(stats.available_kb, 8_967_832);
    }

    #[test]
    fn field_order_does_not_matter() {
        let stats = parse("Cached: 1 kB\nMemAvailable: 400000 kB\nMemTotal: 1000000 kB\n").unwrap();
        assert_eq!(stats, MemoryStats { total_kb: 1_000_000, available_kb: 400_000 });
    }

    #[test]
    fn unknown_labels_are_ignored() {
        let text = "HugePages_Total:       0\nMemTotal: 10 kB\nFoo: bar\nMemAvailable: 5 kB\n";
        assert!(parse(text).is_ok());
    }

    #[test]
    fn missing_available_is_a_parse_failure() {
        let err = parse("MemTotal: 1000000 kB\nMemFree: 1 kB\n").unwrap_err();
        assert_eq!(err.kind(), FailureKind::Parse);
        assert!(matches!(err, ReadError::MissingFields(ref m) if m == &["MemAvailable"]));
    }

    #[test]
    fn empty_input_misses_both_fields() {
        let err = parse("").unwrap_err();
        assert!(matches!(err, ReadError::MissingFields(ref m) if m == &["MemTotal", "MemAvailable"]));
    }

    #[test]
    fn malformed_value_counts_as_missing() {
        let err = parse("MemTotal: lots kB\nMemAvailable: 5 kB\n").unwrap_err();
        assert!(matches!(err, ReadError::MissingFields(ref m) if m == &["MemTotal"]));
    }

    #[test]
    fn wrong_unit_counts_as_missing() {
        assert!(parse("MemTotal: 10 MB\nMemAvailable: 5 kB\n").is_err());
    }

    #[test]
    fn similar_label_prefix_does_not_match() {
        assert!(parse("MemTotalish: 10 kB\nMemAvailable: 5 kB\n").is_err());
    }

    #[test]
    fn non_utf8_line_is_ignored() {
        let text = &b"MemTotal: 1000 kB\nWeird\xff: 1 kB\nMemAvailable: 400 kB\n"[..];
        let stats = parse_meminfo(Cursor::new(text)).unwrap();
        assert_eq!(stats, MemoryStats { total_kb: 1_000, available_kb: 400 });
    }

    #[test]
    fn non_utf8_value_counts_as_missing() {
        let text = &b"MemTotal: 10\xff kB\nMemAvailable: 400 kB\n"[..];
        let err = parse_meminfo(Cursor::new(text)).unwrap_err();
        assert_eq!(err.kind(), FailureKind::Parse);
    }

    #[test]
    fn io_error_mid_read_is_soft() {
        let reader = io::BufReader::new(Cursor::new("MemTotal: 10 kB\n").chain(Broken));
        let err = parse_meminfo(reader).unwrap_err();
        assert_eq!(err.kind(), FailureKind::Soft);
    }

    #[test]
    fn stops_once_both_fields_are_found() {
        let head = Cursor::new("MemTotal: 10 kB\nMemAvailable: 5 kB\n");
        let stats = parse_meminfo(io::BufReader::new(head.chain(Broken))).unwrap();
        assert_eq!(stats, MemoryStats { total_kb: 10, available_kb: 5 });
    }

    #[test]
    fn trailing_garbage_after_fields_is_never_read() {
        let text = &b"MemAvailable: 5 kB\nMemTotal: 10 kB\n\xff\xfe not meminfo\n"[..];
        assert!(parse_meminfo(Cursor::new(text)).is_ok());
    }

    #[test]
    fn reads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{SAMPLE}").unwrap();
        let stats = ProcMeminfo::at(file.path()).read().unwrap();
        assert_eq!(stats.total_kb, 16_304_284);
    }

    #[test]
    fn unreadable_source_is_soft() {
        let dir = tempfile::tempdir().unwrap();
        let err = ProcMeminfo::at(dir.path().join("absent")).read().unwrap_err();
        assert_eq!(err.kind(), FailureKind::Soft);
    }
}
