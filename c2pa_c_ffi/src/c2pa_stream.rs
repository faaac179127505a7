// Copyright 2023 Adobe. All rights reserved.
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

use std::{
    io::{self, Cursor, Read, Seek, SeekFrom, Write},
    os::raw::c_int,
    slice,
};

use c2pa_pipeline::stream_adapter::{Capabilities, RawStream, StreamAdapter};

use crate::{ffi_utils::get_handles, Error};

#[repr(C)]
#[derive(Debug)]
/// An opaque struct to hold a context value for the stream callbacks.
pub struct StreamContext;

#[repr(C)]
#[derive(Debug)]
/// Defines the seek mode for the seek callback.
pub enum C2paSeekMode {
    /// Seeks from the start of the stream.
    Start = 0,

    /// Seeks from the current position in the stream.
    Current = 1,

    /// Seeks from the end of the stream.
    End = 2,
}

/// Defines a callback to read from a stream.
///
/// The return value is the number of bytes read, or a negative number for an error.
pub type ReadCallback =
    unsafe extern "C" fn(context: *mut StreamContext, data: *mut u8, len: isize) -> isize;

/// Defines a callback to seek to an offset in a stream.
///
/// The return value is the new position in the stream, or a negative number for an error.
pub type SeekCallback =
    unsafe extern "C" fn(context: *mut StreamContext, offset: isize, mode: C2paSeekMode) -> isize;

/// Defines a callback to write to a stream.
///
/// The return value is the number of bytes written, or a negative number for an error.
pub type WriteCallback =
    unsafe extern "C" fn(context: *mut StreamContext, data: *const u8, len: isize) -> isize;

/// Defines a callback to flush a stream.
///
/// The return value is 0 for success, or a negative number for an error.
pub type FlushCallback = unsafe extern "C" fn(context: *mut StreamContext) -> isize;

/// A stream implemented by C callbacks.
///
/// Only seeking is mandatory. A stream without a read callback cannot be
/// used as a source and one without a write callback cannot be used as a
/// destination.
#[derive(Debug)]
pub struct C2paStream {
    context: *mut StreamContext,
    reader: Option<ReadCallback>,
    seeker: SeekCallback,
    writer: Option<WriteCallback>,
    flusher: Option<FlushCallback>,
}

// The context is owned by the caller, who keeps it valid and usable from the
// thread that drives the stream for the stream's lifetime.
unsafe impl Send for C2paStream {}

/// What the C side holds a handle to.
pub type C2paStreamAdapter = StreamAdapter<C2paStream>;

impl C2paStream {
    /// Creates a new C2paStream from context with callbacks.
    ///
    /// # Safety
    /// The context and the callbacks must remain valid for the lifetime of
    /// the C2paStream.
    pub unsafe fn new(
        context: *mut StreamContext,
        reader: Option<ReadCallback>,
        seeker: SeekCallback,
        writer: Option<WriteCallback>,
        flusher: Option<FlushCallback>,
    ) -> Self {
        Self {
            context,
            reader,
            seeker,
            writer,
            flusher,
        }
    }

    /// Extracts the context from the C2paStream (used for testing in Rust).
    pub fn into_context(self) -> *mut StreamContext {
        self.context
    }
}

fn check_len(len: usize) -> io::Result<isize> {
    isize::try_from(len)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "buffer is too large"))
}

// A negative callback result carries its error through errno.
fn check_result(result: isize) -> io::Result<usize> {
    if result < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(result as usize)
}

impl RawStream for C2paStream {
    fn capabilities(&self) -> Capabilities {
        Capabilities {
            read: self.reader.is_some(),
            write: self.writer.is_some(),
        }
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let Some(reader) = self.reader else {
            return Err(c2pa_pipeline::stream_adapter::unsupported("read"));
        };
        let len = check_len(buf.len())?;
        check_result(unsafe { reader(self.context, buf.as_mut_ptr(), len) })
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let Some(writer) = self.writer else {
            return Err(c2pa_pipeline::stream_adapter::unsupported("write"));
        };
        let len = check_len(buf.len())?;
        check_result(unsafe { writer(self.context, buf.as_ptr(), len) })
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.flusher {
            Some(flusher) => check_result(unsafe { flusher(self.context) }).map(|_| ()),
            None => Ok(()),
        }
    }

    fn seek(&mut self, from: SeekFrom) -> io::Result<u64> {
        let (pos, mode) = match from {
            SeekFrom::Current(pos) => (pos, C2paSeekMode::Current),
            SeekFrom::Start(pos) => (
                i64::try_from(pos)
                    .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "seek overflow"))?,
                C2paSeekMode::Start,
            ),
            SeekFrom::End(pos) => (pos, C2paSeekMode::End),
        };
        let pos = isize::try_from(pos)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "seek overflow"))?;
        check_result(unsafe { (self.seeker)(self.context, pos, mode) }).map(|p| p as u64)
    }
}

/// Creates a new C2paStream from context with callbacks.
///
/// This allows implementing streams in other languages. `seeker` is
/// required; `reader`, `writer` and `flusher` may be NULL when the stream
/// does not support them.
///
/// # Safety
/// The context must remain valid for the lifetime of the C2paStream.
///
/// The resulting C2paStream must be released by calling c2pa_release_stream.
#[no_mangle]
pub unsafe extern "C" fn c2pa_create_stream(
    context: *mut StreamContext,
    reader: Option<ReadCallback>,
    seeker: Option<SeekCallback>,
    writer: Option<WriteCallback>,
    flusher: Option<FlushCallback>,
) -> *mut C2paStream {
    let Some(seeker) = seeker else {
        Error::NullParameter("seeker".to_string()).set_last();
        return std::ptr::null_mut();
    };
    let stream = C2paStream::new(context, reader, seeker, writer, flusher);
    let result: crate::Result<C2paStreamAdapter> = Ok(StreamAdapter::new(stream));
    return_handle!(result, C2paStream)
}

/// Releases a C2paStream allocated by Rust.
///
/// Returns 0 on success (NULL is accepted), or -1 if the pointer is not a
/// live stream.
///
/// # Safety
/// Can only be released once and is invalid after this call.
#[no_mangle]
pub unsafe extern "C" fn c2pa_release_stream(stream: *mut C2paStream) -> c_int {
    free_handle!(stream, C2paStreamAdapter)
}

/// An in-memory stream driven through the C callbacks.
///
/// It is exported in Rust so that it may be used externally.
pub struct TestC2paStream {
    cursor: Cursor<Vec<u8>>,
}

impl TestC2paStream {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            cursor: Cursor::new(data),
        }
    }

    unsafe fn from_context<'a>(context: *mut StreamContext) -> &'a mut Self {
        &mut *(context as *mut TestC2paStream)
    }

    unsafe extern "C" fn reader(context: *mut StreamContext, data: *mut u8, len: isize) -> isize {
        let stream = Self::from_context(context);
        let data = slice::from_raw_parts_mut(data, len as usize);
        match stream.cursor.read(data) {
            Ok(bytes) => bytes as isize,
            Err(_) => -1,
        }
    }

    unsafe extern "C" fn seeker(
        context: *mut StreamContext,
        offset: isize,
        mode: C2paSeekMode,
    ) -> isize {
        let stream = Self::from_context(context);
        let from = match mode {
            C2paSeekMode::Start if offset < 0 => return -1,
            C2paSeekMode::Start => SeekFrom::Start(offset as u64),
            C2paSeekMode::Current => SeekFrom::Current(offset as i64),
            C2paSeekMode::End => SeekFrom::End(offset as i64),
        };
        match stream.cursor.seek(from) {
            Ok(pos) => pos as isize,
            Err(_) => -1,
        }
    }

    unsafe extern "C" fn writer(context: *mut StreamContext, data: *const u8, len: isize) -> isize {
        let stream = Self::from_context(context);
        let data = slice::from_raw_parts(data, len as usize);
        match stream.cursor.write(data) {
            Ok(bytes) => bytes as isize,
            Err(_) => -1,
        }
    }

    unsafe extern "C" fn flusher(_context: *mut StreamContext) -> isize {
        0
    }

    pub fn into_c_stream(self) -> C2paStream {
        unsafe {
            C2paStream::new(
                Box::into_raw(Box::new(self)) as *mut StreamContext,
                Some(Self::reader),
                Self::seeker,
                Some(Self::writer),
                Some(Self::flusher),
            )
        }
    }

    pub fn from_bytes(data: Vec<u8>) -> C2paStreamAdapter {
        StreamAdapter::new(Self::new(data).into_c_stream())
    }

    /// Recover the bytes behind a stream made by [`TestC2paStream::into_c_stream`].
    pub fn into_bytes(c_stream: C2paStream) -> Vec<u8> {
        let context = c_stream.into_context() as *mut TestC2paStream;
        unsafe { Box::from_raw(context) }.cursor.into_inner()
    }

    /// Register an in-memory stream as a handle, as `c2pa_create_stream` does.
    pub fn create(data: Vec<u8>) -> *mut C2paStream {
        let stream = Self::new(data).into_c_stream();
        unsafe {
            c2pa_create_stream(
                stream.into_context(),
                Some(Self::reader),
                Some(Self::seeker),
                Some(Self::writer),
                Some(Self::flusher),
            )
        }
    }

    /// Release a handle made by [`TestC2paStream::create`], returning its bytes.
    pub fn release(stream: *mut C2paStream) -> crate::Result<Vec<u8>> {
        let handle = crate::ffi_utils::ptr_to_handle(stream);
        let adapter = get_handles().remove::<C2paStreamAdapter>(handle)?;
        Ok(Self::into_bytes(adapter.into_inner()))
    }
}
