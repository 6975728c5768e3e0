//! Read-only access to a binary key trace.
//!
//! A trace file is a flat array of little-endian `u32` keys. Its last entry
//! is a sentinel equal to the size of the key space (`nr_keys`); replay only
//! feeds entries below it to a policy.
//!
//! ```text
//!   offset  0        4        8              4(N-1)
//!           ┌────────┬────────┬─── ... ───┬────────┐
//!           │ key 0  │ key 1  │           │nr_keys │  (LE u32 each)
//!           └────────┴────────┴─── ... ───┴────────┘
//! ```
//!
//! Files are memory-mapped; [`Trace::from_entries`] builds an owned trace
//! for tests and the generator.

use std::fs::File;
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use tracing::{debug, info};

use crate::ds::Bitmap;
use crate::error::{ReplayError, Result};

const ENTRY_BYTES: usize = std::mem::size_of::<u32>();

#[derive(Debug)]
enum Backing {
    Mapped(Mmap),
    Owned(Vec<u32>),
}

/// An immutable key trace, either mapped from disk or held in memory.
#[derive(Debug)]
pub struct Trace {
    backing: Backing,
    len: usize,
    nr_keys: u32,
    source: Option<PathBuf>,
}

impl Trace {
    /// Maps the trace file at `path` read-only.
    ///
    /// # Errors
    ///
    /// - [`ReplayError::Io`] if the file cannot be opened, inspected, or mapped.
    /// - [`ReplayError::MalformedTrace`] if it is empty, its length is not a
    ///   multiple of 4, or its sentinel is `u32::MAX`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let io_err = |source| ReplayError::Io {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(io_err)?;
        let bytes = file.metadata().map_err(io_err)?.len();
        if bytes == 0 {
            return Err(ReplayError::MalformedTrace(format!(
                "{} is empty",
                path.display()
            )));
        }
        if bytes % ENTRY_BYTES as u64 != 0 {
            return Err(ReplayError::MalformedTrace(format!(
                "{} is {bytes} bytes, not a whole number of u32 entries",
                path.display()
            )));
        }

        // SAFETY: the mapping is read-only and traces are not modified while a
        // run is in progress.
        let mmap = unsafe { Mmap::map(&file) }.map_err(io_err)?;
        let len = mmap.len() / ENTRY_BYTES;
        let trace = Self::from_backing(Backing::Mapped(mmap), len, Some(path.to_path_buf()))?;
        info!(
            path = %path.display(),
            entries = trace.len,
            nr_keys = trace.nr_keys,
            "mapped trace"
        );
        Ok(trace)
    }

    /// Builds a trace from keys already in memory.
    ///
    /// The last entry is taken as the key-space sentinel, as for files.
    ///
    /// # Example
    ///
    /// ```
    /// use mrckit::trace::Trace;
    ///
    /// let trace = Trace::from_entries(vec![0, 1, 2, 1, 3]).unwrap();
    /// assert_eq!(trace.len(), 5);
    /// assert_eq!(trace.nr_keys(), 3);
    /// assert_eq!(trace.distinct_keys().unwrap(), 3);
    /// ```
    pub fn from_entries(entries: Vec<u32>) -> Result<Self> {
        let len = entries.len();
        if len == 0 {
            return Err(ReplayError::MalformedTrace(
                "trace has no entries".to_string(),
            ));
        }
        Self::from_backing(Backing::Owned(entries), len, None)
    }

    fn from_backing(backing: Backing, len: usize, source: Option<PathBuf>) -> Result<Self> {
        let mut trace = Self {
            backing,
            len,
            nr_keys: 0,
            source,
        };
        let sentinel = trace.get(len - 1);
        if sentinel == u32::MAX {
            return Err(ReplayError::MalformedTrace(
                "key-space sentinel must be below u32::MAX".to_string(),
            ));
        }
        trace.nr_keys = sentinel;
        Ok(trace)
    }

    /// Number of entries, sentinel included.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always `false`: an empty trace is rejected at construction.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Size of the key space: the value of the last entry.
    #[inline]
    pub fn nr_keys(&self) -> u32 {
        self.nr_keys
    }

    /// Path the trace was mapped from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Returns entry `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= len()`.
    #[inline]
    pub fn get(&self, idx: usize) -> u32 {
        match &self.backing {
            Backing::Owned(entries) => entries[idx],
            Backing::Mapped(mmap) => {
                let at = idx * ENTRY_BYTES;
                let mut word = [0u8; ENTRY_BYTES];
                word.copy_from_slice(&mmap[at..at + ENTRY_BYTES]);
                u32::from_le_bytes(word)
            },
        }
    }

    /// Iterates every entry in order, sentinel included.
    pub fn iter(&self) -> TraceIter<'_> {
        TraceIter {
            trace: self,
            next: 0,
        }
    }

    /// Counts distinct values over all entries.
    ///
    /// The sentinel equals `nr_keys` and so lands outside a bitmap of
    /// `nr_keys` bits; it is never counted.
    ///
    /// # Errors
    ///
    /// [`ReplayError::Alloc`] if the bitmap cannot be allocated.
    pub fn distinct_keys(&self) -> Result<u64> {
        let mut seen = Bitmap::try_new(u64::from(self.nr_keys))?;
        for key in self.iter() {
            seen.set1(u64::from(key));
        }
        debug!(distinct = seen.count(), nr_keys = self.nr_keys, "counted distinct keys");
        Ok(seen.count())
    }
}

/// Iterator over trace entries; see [`Trace::iter`].
#[derive(Debug, Clone)]
pub struct TraceIter<'a> {
    trace: &'a Trace,
    next: usize,
}

impl Iterator for TraceIter<'_> {
    type Item = u32;

    #[inline]
    fn next(&mut self) -> Option<u32> {
        if self.next >= self.trace.len {
            return None;
        }
        let key = self.trace.get(self.next);
        self.next += 1;
        Some(key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.trace.len - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TraceIter<'_> {}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_file(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file.flush().unwrap();
        file
    }

    fn le_bytes(keys: &[u32]) -> Vec<u8> {
        keys.iter().flat_map(|k| k.to_le_bytes()).collect()
    }

    #[test]
    fn open_reads_little_endian_entries() {
        let file = write_file(&le_bytes(&[5, 5, 5, 2, 9, 10]));
        let trace = Trace::open(file.path()).unwrap();
        assert_eq!(trace.len(), 6);
        assert_eq!(trace.nr_keys(), 10);
        assert_eq!(trace.iter().collect::<Vec<_>>(), vec![5, 5, 5, 2, 9, 10]);
        assert_eq!(trace.distinct_keys().unwrap(), 3);
        assert_eq!(trace.source(), Some(file.path()));
    }

    #[test]
    fn open_missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.bin");
        let err = Trace::open(&path).unwrap_err();
        assert!(matches!(err, ReplayError::Io { .. }));
        assert!(err.to_string().contains("nope.bin"));
    }

    #[test]
    fn open_rejects_empty_file() {
        let file = write_file(&[]);
        let err = Trace::open(file.path()).unwrap_err();
        assert!(matches!(err, ReplayError::MalformedTrace(_)));
    }

    #[test]
    fn open_rejects_partial_entry() {
        let file = write_file(&[1, 0, 0, 0, 7]);
        let err = Trace::open(file.path()).unwrap_err();
        assert!(matches!(err, ReplayError::MalformedTrace(_)));
        assert!(err.to_string().contains("5 bytes"));
    }

    #[test]
    fn sentinel_of_u32_max_is_rejected() {
        assert!(matches!(
            Trace::from_entries(vec![1, u32::MAX]),
            Err(ReplayError::MalformedTrace(_))
        ));
        assert!(Trace::from_entries(Vec::new()).is_err());
    }

    #[test]
    fn sentinel_only_trace_has_no_keys() {
        let trace = Trace::from_entries(vec![0]).unwrap();
        assert_eq!(trace.nr_keys(), 0);
        assert_eq!(trace.distinct_keys().unwrap(), 0);
    }

    #[test]
    fn distinct_keys_never_counts_the_sentinel() {
        let trace = Trace::from_entries(vec![0, 1, 2, 1, 3]).unwrap();
        assert_eq!(trace.nr_keys(), 3);
        assert_eq!(trace.distinct_keys().unwrap(), 3);

        // Keys at or past the sentinel value are outside the key space too.
        let trace = Trace::from_entries(vec![4, 9, 0, 2]).unwrap();
        assert_eq!(trace.distinct_keys().unwrap(), 1);
    }

    #[test]
    fn iter_reports_exact_size() {
        let trace = Trace::from_entries(vec![1, 2, 3, 4]).unwrap();
        let mut iter = trace.iter();
        assert_eq!(iter.len(), 4);
        iter.next();
        assert_eq!(iter.len(), 3);
    }
}
