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

//! FFI Utilities
//!
//! Everything handed to C is registered here so it can be checked when it
//! comes back:
//! - objects (readers, builders, signers, streams) live in a [`HandleMap`]
//!   and C only ever sees an opaque handle disguised as a pointer
//! - strings and byte arrays are real allocations, tracked by address
//!
//! Releasing something that was never handed out, was already released, or
//! is of another kind fails with an error instead of touching memory.

use std::{
    any::Any,
    collections::HashMap,
    os::raw::{c_char, c_uchar},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, MutexGuard, OnceLock, PoisonError, RwLock, TryLockError,
    },
};

use crate::error::{Error, Result};

// ============================================================================
// Handle Management System
// ============================================================================

pub type Handle = u64;
pub type HandleValue = Arc<Mutex<Box<dyn Any + Send>>>;

pub struct HandleMap {
    map: RwLock<HashMap<Handle, HandleValue>>,
    next_id: AtomicU64,
}

impl HandleMap {
    fn new() -> Self {
        Self {
            map: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1), // 0 = NULL
        }
    }

    /// Insert a value and return its handle
    pub fn insert<T: Any + Send + 'static>(&self, value: T) -> Handle {
        let handle = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut map = self.map.write().unwrap_or_else(PoisonError::into_inner);
        map.insert(handle, Arc::new(Mutex::new(Box::new(value))));
        handle
    }

    /// Get a shared reference to the slot, without locking it.
    pub fn get(&self, handle: Handle) -> Result<HandleValue> {
        let map = self.map.read().unwrap_or_else(PoisonError::into_inner);
        map.get(&handle)
            .cloned()
            .ok_or(Error::InvalidHandle(handle))
    }

    /// Remove and return a value.
    ///
    /// The value stays registered if it is of another type or in use.
    pub fn remove<T: Any + 'static>(&self, handle: Handle) -> Result<T> {
        let mut map = self.map.write().unwrap_or_else(PoisonError::into_inner);
        let slot = map.get(&handle).ok_or(Error::InvalidHandle(handle))?;
        if Arc::strong_count(slot) > 1 {
            return Err(Error::Other(format!("handle {handle} is in use")));
        }
        if !lock_handle(slot, handle)?.is::<T>() {
            return Err(Error::WrongHandleType(handle));
        }

        let slot = map.remove(&handle).ok_or(Error::InvalidHandle(handle))?;
        drop(map);

        // the write lock kept anyone else from cloning the slot
        let mutex = Arc::try_unwrap(slot)
            .map_err(|_| Error::Other(format!("handle {handle} is in use")))?;
        mutex
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .downcast::<T>()
            .map(|b| *b)
            .map_err(|_| Error::WrongHandleType(handle))
    }

    fn len(&self) -> usize {
        self.map.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Drop for HandleMap {
    fn drop(&mut self) {
        let count = self.len();
        if count > 0 {
            log::warn!("{count} handle(s) were not freed at shutdown");
        }
    }
}

pub fn get_handles() -> &'static HandleMap {
    static HANDLES: OnceLock<HandleMap> = OnceLock::new();
    HANDLES.get_or_init(HandleMap::new)
}

/// Lock a handle's slot.
///
/// A slot that is already locked means the same handle was passed twice to
/// one call, or used from two threads at once. Both are reported rather
/// than waited on.
pub fn lock_handle(
    slot: &HandleValue,
    handle: Handle,
) -> Result<MutexGuard<'_, Box<dyn Any + Send>>> {
    match slot.try_lock() {
        Ok(guard) => Ok(guard),
        Err(TryLockError::Poisoned(poisoned)) => {
            log::warn!("mutex poisoned for handle {handle}, recovering");
            Ok(poisoned.into_inner())
        }
        Err(TryLockError::WouldBlock) => Err(Error::Other(format!(
            "handle {handle} is already in use"
        ))),
    }
}

/// Convert a typed pointer to a handle
pub fn ptr_to_handle<T>(ptr: *const T) -> Handle {
    ptr as usize as Handle
}

/// Convert a handle to a typed pointer
pub fn handle_to_ptr<T>(handle: Handle) -> *mut T {
    handle as usize as *mut T
}

// ============================================================================
// Raw Pointer Allocation Tracking
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AllocationType {
    String,
    ByteArray,
}

struct AllocationInfo {
    allocation_type: AllocationType,
    size: usize,
}

struct AllocationTracker {
    allocations: Mutex<HashMap<usize, AllocationInfo>>,
}

impl AllocationTracker {
    fn new() -> Self {
        Self {
            allocations: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<usize, AllocationInfo>> {
        self.allocations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn track(&self, ptr: *const u8, size: usize, allocation_type: AllocationType) {
        if !ptr.is_null() {
            self.lock().insert(
                ptr as usize,
                AllocationInfo {
                    allocation_type,
                    size,
                },
            );
        }
    }

    /// Untrack an allocation of the given type, returning its size.
    fn untrack(&self, ptr: *const u8, allocation_type: AllocationType) -> Result<usize> {
        let mut allocations = self.lock();
        match allocations.get(&(ptr as usize)) {
            None => Err(Error::InvalidHandle(ptr as usize as Handle)),
            Some(info) if info.allocation_type != allocation_type => {
                Err(Error::WrongHandleType(ptr as usize as Handle))
            }
            Some(_) => Ok(allocations
                .remove(&(ptr as usize))
                .map(|info| info.size)
                .unwrap_or_default()),
        }
    }
}

impl Drop for AllocationTracker {
    fn drop(&mut self) {
        let allocations = self.lock();
        if !allocations.is_empty() {
            let bytes: usize = allocations.values().map(|info| info.size).sum();
            log::warn!(
                "{} raw allocation(s) ({bytes} bytes) were not freed at shutdown",
                allocations.len()
            );
        }
    }
}

fn get_allocations() -> &'static AllocationTracker {
    static ALLOCATIONS: OnceLock<AllocationTracker> = OnceLock::new();
    ALLOCATIONS.get_or_init(AllocationTracker::new)
}

// ============================================================================
// Buffer Safety Utilities
// ============================================================================

/// Validates that a buffer size is within safe bounds and doesn't cause integer overflow
/// when used with pointer arithmetic.
pub fn is_safe_buffer_size(size: usize, ptr: *const c_uchar) -> bool {
    if size == 0 || size > isize::MAX as usize {
        return false;
    }
    // the buffer must not wrap around the address space
    (ptr as usize).checked_add(size).is_some()
}

/// Creates a slice from raw parts after null and bounds checks.
///
/// # Safety
/// `ptr` must be valid for reads of `len` bytes for the returned lifetime.
pub unsafe fn safe_slice_from_raw_parts<'a>(
    ptr: *const c_uchar,
    len: usize,
    param_name: &str,
) -> Result<&'a [u8]> {
    if ptr.is_null() {
        return Err(Error::NullParameter(param_name.to_string()));
    }
    if !is_safe_buffer_size(len, ptr) {
        return Err(Error::InvalidArgument(format!(
            "buffer size {len} is invalid for parameter '{param_name}'"
        )));
    }
    Ok(std::slice::from_raw_parts(ptr, len))
}

/// Converts a Rust String to a tracked C string.
///
/// Returns null if the string holds a NUL byte. The result must be freed
/// with [`free_c_string`].
pub fn to_c_string(s: String) -> *mut c_char {
    let len = s.len() + 1;
    match std::ffi::CString::new(s) {
        Ok(c_str) => {
            let ptr = c_str.into_raw();
            get_allocations().track(ptr as *const u8, len, AllocationType::String);
            ptr
        }
        Err(_) => {
            Error::Encoding("string contains a NUL byte".to_string()).set_last();
            std::ptr::null_mut()
        }
    }
}

/// Converts bytes to a tracked C byte array.
///
/// The result must be freed with [`free_c_bytes`].
pub fn to_c_bytes(bytes: Vec<u8>) -> *const c_uchar {
    let len = bytes.len();
    let ptr = Box::into_raw(bytes.into_boxed_slice()) as *const c_uchar;
    get_allocations().track(ptr, len, AllocationType::ByteArray);
    ptr
}

/// Frees a string returned by [`to_c_string`]. NULL is ignored.
///
/// # Safety
/// Untracked pointers are rejected without being dereferenced.
pub unsafe fn free_c_string(ptr: *mut c_char) -> Result<()> {
    if ptr.is_null() {
        return Ok(());
    }
    get_allocations().untrack(ptr as *const u8, AllocationType::String)?;
    drop(std::ffi::CString::from_raw(ptr));
    Ok(())
}

/// Frees a byte array returned by [`to_c_bytes`]. NULL is ignored.
///
/// # Safety
/// Untracked pointers are rejected without being dereferenced.
pub unsafe fn free_c_bytes(ptr: *const c_uchar) -> Result<()> {
    if ptr.is_null() {
        return Ok(());
    }
    let len = get_allocations().untrack(ptr, AllocationType::ByteArray)?;
    let slice = std::ptr::slice_from_raw_parts_mut(ptr as *mut c_uchar, len);
    drop(Box::from_raw(slice));
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_handles_are_typed() {
        let handle = get_handles().insert(String::from("reader"));
        assert!(matches!(
            get_handles().remove::<Vec<u8>>(handle),
            Err(Error::WrongHandleType(h)) if h == handle
        ));
        // still registered after the failed removal
        assert_eq!(get_handles().remove::<String>(handle).unwrap(), "reader");
        assert!(matches!(
            get_handles().remove::<String>(handle),
            Err(Error::InvalidHandle(_))
        ));
    }

    #[test]
    fn test_locked_handle_is_reported() {
        let handle = get_handles().insert(7u32);
        let slot = get_handles().get(handle).unwrap();
        let guard = lock_handle(&slot, handle).unwrap();
        let again = get_handles().get(handle).unwrap();
        assert!(lock_handle(&again, handle).is_err());
        drop(guard);
        drop((slot, again));
        assert_eq!(get_handles().remove::<u32>(handle).unwrap(), 7);
    }

    #[test]
    fn test_string_double_free_is_rejected() {
        let c_string = to_c_string("tracked".to_string());
        assert!(!c_string.is_null());
        unsafe {
            assert!(free_c_string(c_string).is_ok());
            assert!(matches!(
                free_c_string(c_string),
                Err(Error::InvalidHandle(_))
            ));
        }
    }

    #[test]
    fn test_bytes_are_not_strings() {
        let bytes = to_c_bytes(vec![1u8, 2, 3, 4, 5]);
        unsafe {
            assert!(matches!(
                free_c_string(bytes as *mut c_char),
                Err(Error::WrongHandleType(_))
            ));
            assert!(free_c_bytes(bytes).is_ok());
            assert!(free_c_bytes(bytes).is_err());
        }
    }

    #[test]
    fn test_null_frees_are_ignored() {
        unsafe {
            assert!(free_c_string(std::ptr::null_mut()).is_ok());
            assert!(free_c_bytes(std::ptr::null()).is_ok());
        }
    }

    #[test]
    fn test_nul_in_string_gives_null() {
        assert!(to_c_string("Hello\0World".to_string()).is_null());
        assert!(Error::take_last().is_some());
    }

    #[test]
    fn test_buffer_bounds() {
        let data = [1u8, 2, 3];
        assert!(!is_safe_buffer_size(0, data.as_ptr()));
        assert!(!is_safe_buffer_size(usize::MAX, data.as_ptr()));
        let slice = unsafe { safe_slice_from_raw_parts(data.as_ptr(), 3, "data") }.unwrap();
        assert_eq!(slice, &data);
        assert!(matches!(
            unsafe { safe_slice_from_raw_parts(std::ptr::null(), 3, "data") },
            Err(Error::NullParameter(_))
        ));
    }
}
