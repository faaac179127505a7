// Copyright 2024 Adobe. All rights reserved.
// This file is licensed to you under the Apache License,
// Version 2.0 (http://www.apache.org/licenses/LICENSE-2.0)
// or the MIT license (http://opensource.org/licenses/MIT),
// at your option.

// Unless required by applicable law or agreed to in writing,
// this software is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR REPRESENTATIONS OF ANY KIND, either express or
// implied. See the LICENSE-MIT and LICENSE-APACHE files for the
// specific language governing permissions and limitations under
// each license.

//! Capability-tagged wrapper around arbitrary I/O backends.
//!
//! A [`StreamAdapter`] presents any backend implementing [`RawStream`] as a
//! standard `Read + Write + Seek` object. Operations the backend does not
//! support fail with [`std::io::ErrorKind::InvalidInput`] instead of
//! panicking, and a failed read or write latches the adapter into an error
//! state until the next seek.
//!
//! A single adapter is not meant to be shared between threads.

use std::io::{self, Read, Seek, SeekFrom, Write};

/// The operations a stream backend supports besides seeking.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Capabilities {
    pub read: bool,
    pub write: bool,
}

impl Capabilities {
    pub const READ: Capabilities = Capabilities {
        read: true,
        write: false,
    };
    pub const WRITE: Capabilities = Capabilities {
        read: false,
        write: true,
    };
    pub const READ_WRITE: Capabilities = Capabilities {
        read: true,
        write: true,
    };
}

/// The error returned for an operation a backend does not support.
pub fn unsupported(op: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("stream does not support {op}"),
    )
}

/// A byte-oriented backend with an optional subset of read and write.
///
/// Every backend must be able to seek. The default `read`, `write` and
/// `flush` implementations reject the call.
pub trait RawStream {
    fn capabilities(&self) -> Capabilities;

    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(unsupported("read"))
    }

    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(unsupported("write"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(unsupported("flush"))
    }

    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64>;
}

/// Backend over a readable, seekable object.
pub struct ReadOnly<T>(pub T);

impl<T: Read + Seek> RawStream for ReadOnly<T> {
    fn capabilities(&self) -> Capabilities {
        Capabilities::READ
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }

    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.0.seek(pos)
    }
}

/// Backend over a writable, seekable object.
pub struct WriteOnly<T>(pub T);

impl<T: Write + Seek> RawStream for WriteOnly<T> {
    fn capabilities(&self) -> Capabilities {
        Capabilities::WRITE
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }

    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.0.seek(pos)
    }
}

/// Backend over an object that can read, write and seek.
pub struct ReadWrite<T>(pub T);

impl<T: Read + Write + Seek> RawStream for ReadWrite<T> {
    fn capabilities(&self) -> Capabilities {
        Capabilities::READ_WRITE
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }

    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.0.seek(pos)
    }
}

/// Uniform `Read + Write + Seek` view of a [`RawStream`].
pub struct StreamAdapter<S> {
    inner: S,
    failed: Option<io::ErrorKind>,
}

impl<T: Read + Seek> StreamAdapter<ReadOnly<T>> {
    pub fn reader(inner: T) -> Self {
        Self::new(ReadOnly(inner))
    }
}

impl<T: Write + Seek> StreamAdapter<WriteOnly<T>> {
    pub fn writer(inner: T) -> Self {
        Self::new(WriteOnly(inner))
    }
}

impl<T: Read + Write + Seek> StreamAdapter<ReadWrite<T>> {
    pub fn read_write(inner: T) -> Self {
        Self::new(ReadWrite(inner))
    }
}

impl<S: RawStream> StreamAdapter<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            failed: None,
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        self.inner.capabilities()
    }

    /// True if a previous read or write failed and no seek has happened since.
    pub fn is_failed(&self) -> bool {
        self.failed.is_some()
    }

    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    fn check_state(&self) -> io::Result<()> {
        match self.failed {
            Some(kind) => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("stream is in a failed state ({kind}); seek to recover"),
            )),
            None => Ok(()),
        }
    }

    fn latch<T>(&mut self, result: io::Result<T>) -> io::Result<T> {
        if let Err(e) = &result {
            if e.kind() != io::ErrorKind::Interrupted {
                log::debug!("stream operation failed: {e}");
                self.failed = Some(e.kind());
            }
        }
        result
    }
}

impl<S: RawStream> Read for StreamAdapter<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.capabilities().read {
            return Err(unsupported("read"));
        }
        self.check_state()?;
        let result = self.inner.read(buf);
        self.latch(result)
    }
}

impl<S: RawStream> Write for StreamAdapter<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.capabilities().write {
            return Err(unsupported("write"));
        }
        self.check_state()?;
        let result = self.inner.write(buf);
        self.latch(result)
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.capabilities().write {
            return Err(unsupported("flush"));
        }
        let result = self.inner.flush();
        self.latch(result)
    }
}

impl<S: RawStream> Seek for StreamAdapter<S> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        // seeking is the recovery path after a failed read or write
        self.failed = None;
        self.inner.seek(pos)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::io::Cursor;

    use super::*;

    struct Flaky {
        data: Cursor<Vec<u8>>,
        fail_next: bool,
    }

    impl RawStream for Flaky {
        fn capabilities(&self) -> Capabilities {
            Capabilities::READ
        }

        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.fail_next {
                self.fail_next = false;
                return Err(io::Error::other("disk error"));
            }
            self.data.read(buf)
        }

        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            self.data.seek(pos)
        }
    }

    #[test]
    fn eof_is_not_an_error() {
        let mut s = StreamAdapter::reader(Cursor::new(vec![1u8, 2, 3]));
        let mut buf = [0u8; 8];
        assert_eq!(s.read(&mut buf).unwrap(), 3);
        assert_eq!(s.read(&mut buf).unwrap(), 0);
        assert!(!s.is_failed());
    }

    #[test]
    fn read_only_rejects_writes() {
        let mut s = StreamAdapter::reader(Cursor::new(vec![0u8; 4]));
        let err = s.write(b"x").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        let err = s.flush().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn write_only_rejects_reads() {
        let mut s = StreamAdapter::writer(Cursor::new(Vec::new()));
        s.write_all(b"abc").unwrap();
        let mut buf = [0u8; 2];
        assert_eq!(
            s.read(&mut buf).unwrap_err().kind(),
            io::ErrorKind::InvalidInput
        );
        assert_eq!(s.into_inner().0.into_inner(), b"abc");
    }

    #[test]
    fn seek_reports_absolute_position() {
        let mut s = StreamAdapter::read_write(Cursor::new(vec![0u8; 10]));
        assert_eq!(s.seek(SeekFrom::End(-2)).unwrap(), 8);
        assert_eq!(s.seek(SeekFrom::Current(-3)).unwrap(), 5);
        assert_eq!(s.seek(SeekFrom::Start(1)).unwrap(), 1);
        assert!(s.seek(SeekFrom::Current(-5)).is_err());
    }

    #[test]
    fn failure_latches_until_seek() {
        let mut s = StreamAdapter::new(Flaky {
            data: Cursor::new(vec![7u8; 4]),
            fail_next: true,
        });
        let mut buf = [0u8; 4];

        assert_eq!(s.read(&mut buf).unwrap_err().kind(), io::ErrorKind::Other);
        assert!(s.is_failed());
        assert_eq!(
            s.read(&mut buf).unwrap_err().kind(),
            io::ErrorKind::InvalidInput
        );

        s.seek(SeekFrom::Start(0)).unwrap();
        assert!(!s.is_failed());
        assert_eq!(s.read(&mut buf).unwrap(), 4);
        assert_eq!(buf, [7u8; 4]);
    }
}
