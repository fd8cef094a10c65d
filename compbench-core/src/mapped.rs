//! MappedFile - read-only memory mapping of a benchmark input.
//!
//! Wraps `mmap`/`munmap` so the mapped bytes are released when the handle is
//! dropped. All unsafe operations are encapsulated here.

use std::ffi::c_void;
use std::fs::File;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;

use nix::sys::mman::{mmap, munmap, MapFlags, ProtFlags};

use crate::error::{BenchError, BenchResult};

/// What a mapped file is used for. Selects the error reported on open failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRole {
    /// The buffer every worker compresses.
    Input,
    /// Preset dictionary handed to the encoders.
    Dictionary,
}

/// A file mapped read-only into memory.
///
/// The mapping is private and never written, so the slice is stable for the
/// lifetime of the handle. Empty files are not mapped at all.
pub struct MappedFile {
    path: PathBuf,
    /// Start of the mapping, `None` for an empty file.
    ptr: Option<NonNull<u8>>,
    len: usize,
}

// SAFETY: the mapping is read-only and owned by this handle.
unsafe impl Send for MappedFile {}

// SAFETY: nobody writes through the mapping, so shared access is sound.
unsafe impl Sync for MappedFile {}

impl MappedFile {
    /// Open `path` read-only and map its full contents.
    ///
    /// # Errors
    /// `InputFileOpen`/`DictionaryFileOpen` (per `role`) if the file cannot be
    /// opened or inspected, `MapFailed` if `mmap` fails.
    pub fn open(path: impl AsRef<Path>, role: FileRole) -> BenchResult<Self> {
        let path = path.as_ref().to_path_buf();

        let open_error = |source: std::io::Error| match role {
            FileRole::Input => BenchError::InputFileOpen {
                path: path.clone(),
                source,
            },
            FileRole::Dictionary => BenchError::DictionaryFileOpen {
                path: path.clone(),
                source,
            },
        };

        let file = File::open(&path).map_err(open_error)?;
        let metadata = file.metadata().map_err(open_error)?;

        let len = usize::try_from(metadata.len()).map_err(|_| BenchError::MapFailed {
            path: path.clone(),
            reason: format!("file too large to map: {} bytes", metadata.len()),
        })?;

        let Some(length) = NonZeroUsize::new(len) else {
            tracing::debug!(path = %path.display(), ?role, "Mapped empty file");
            return Ok(Self {
                path,
                ptr: None,
                len: 0,
            });
        };

        // SAFETY: the file is open for reading, length matches its size, and
        // the private read-only mapping is never written through.
        let ptr = unsafe {
            mmap(
                None,
                length,
                ProtFlags::PROT_READ,
                MapFlags::MAP_PRIVATE,
                &file,
                0,
            )
        }
        .map_err(|errno| BenchError::MapFailed {
            path: path.clone(),
            reason: format!("mmap failed: {}", errno),
        })?;

        tracing::debug!(path = %path.display(), size = len, ?role, "Mapped file");

        Ok(Self {
            path,
            ptr: Some(ptr.cast::<u8>()),
            len,
        })
    }

    /// Path the mapping was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size of the mapped file in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the file is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The mapped bytes.
    pub fn as_slice(&self) -> &[u8] {
        match self.ptr {
            // SAFETY: ptr/len describe a live read-only mapping owned by self.
            Some(ptr) => unsafe { std::slice::from_raw_parts(ptr.as_ptr(), self.len) },
            None => &[],
        }
    }
}

impl AsRef<[u8]> for MappedFile {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl std::fmt::Debug for MappedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappedFile")
            .field("path", &self.path)
            .field("len", &self.len)
            .finish()
    }
}

impl Drop for MappedFile {
    fn drop(&mut self) {
        let Some(ptr) = self.ptr.take() else {
            return;
        };

        // SAFETY: ptr and len were returned by mmap in `open` and the mapping
        // is unmapped exactly once.
        if let Err(errno) = unsafe { munmap(ptr.cast::<c_void>(), self.len) } {
            tracing::error!(
                path = %self.path.display(),
                error = %errno,
                "Failed to unmap file"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_map_contents() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"hello mapped world").unwrap();
        file.flush().unwrap();

        let mapped = MappedFile::open(file.path(), FileRole::Input).unwrap();
        assert_eq!(mapped.len(), 18);
        assert_eq!(mapped.as_slice(), b"hello mapped world");
        assert_eq!(mapped.path(), file.path());
    }

    #[test]
    fn test_empty_file() {
        let file = NamedTempFile::new().unwrap();
        let mapped = MappedFile::open(file.path(), FileRole::Input).unwrap();
        assert!(mapped.is_empty());
        assert!(mapped.as_slice().is_empty());
    }

    #[test]
    fn test_missing_input() {
        let err = MappedFile::open("/nonexistent/compbench/input", FileRole::Input).unwrap_err();
        assert!(matches!(err, BenchError::InputFileOpen { .. }));
    }

    #[test]
    fn test_missing_dictionary() {
        let err =
            MappedFile::open("/nonexistent/compbench/dict", FileRole::Dictionary).unwrap_err();
        assert!(matches!(err, BenchError::DictionaryFileOpen { .. }));
    }
}
