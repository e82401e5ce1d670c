//! Random-access byte sources an ORC file can be read from
//!
//! Every read is positioned: callers pass the absolute offset and the source
//! keeps no cursor, so a shared `&S` can serve reads from several threads.

use std::fs::File;
use std::io;
use std::path::Path;

use bytes::Bytes;

/// A named, randomly readable, closable byte source
pub trait RandomAccessSource {
    /// Reads up to `buf.len()` bytes starting at `offset`, returning the count read
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize>;

    /// Total length of the source in bytes
    fn len(&self) -> io::Result<u64>;

    /// Returns true when the source holds no bytes
    fn is_empty(&self) -> io::Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Name used in error and log messages
    fn name(&self) -> &str;

    /// Releases the source
    fn close(self) -> io::Result<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}

/// Fills as much of `buf` as the source holds from `offset` on.
///
/// Returns the number of bytes read, which is less than `buf.len()` only when
/// the end of the source was reached.
pub fn read_full_at<S: RandomAccessSource + ?Sized>(
    source: &S,
    buf: &mut [u8],
    offset: u64,
) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read_at(&mut buf[filled..], offset + filled as u64) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Reads exactly `len` bytes at `offset`, failing on a short read.
pub fn read_range<S: RandomAccessSource + ?Sized>(
    source: &S,
    offset: u64,
    len: u64,
) -> io::Result<Vec<u8>> {
    let len = usize::try_from(len).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("range of {} bytes does not fit in memory", len),
        )
    })?;
    let mut buf = vec![0; len];
    let read = read_full_at(source, &mut buf, offset)?;
    if read < len {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!(
                "short read from {}: wanted {} bytes at offset {}, got {}",
                source.name(),
                len,
                offset,
                read
            ),
        ));
    }
    Ok(buf)
}

/// A file on the local filesystem
#[derive(Debug)]
pub struct LocalFile {
    file: File,
    name: String,
}

impl LocalFile {
    /// Opens the file at `path` for reading
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Ok(Self {
            file,
            name: path.display().to_string(),
        })
    }
}

impl RandomAccessSource for LocalFile {
    #[cfg(unix)]
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        std::os::unix::fs::FileExt::read_at(&self.file, buf, offset)
    }

    #[cfg(windows)]
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        std::os::windows::fs::FileExt::seek_read(&self.file, buf, offset)
    }

    fn len(&self) -> io::Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn close(self) -> io::Result<()> {
        drop(self.file);
        Ok(())
    }
}

/// An in-memory buffer, e.g. an object fetched from remote storage
#[derive(Debug, Clone)]
pub struct InMemorySource {
    data: Bytes,
    name: String,
}

impl InMemorySource {
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            name: name.into(),
        }
    }
}

impl RandomAccessSource for InMemorySource {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        let len = self.data.len() as u64;
        if offset >= len {
            return Ok(0);
        }
        let start = offset as usize;
        let n = buf.len().min(self.data.len() - start);
        buf[..n].copy_from_slice(&self.data[start..start + n]);
        Ok(n)
    }

    fn len(&self) -> io::Result<u64> {
        Ok(self.data.len() as u64)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
