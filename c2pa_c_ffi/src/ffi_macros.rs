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

//! FFI Helper Macros
//!
//! Null checks, bounded C string conversion, result handling and handle
//! guards for the exported functions. Every macro that can leave the
//! calling function early has `_or_return` in its name, and every early
//! return latches an error first.

/// Maximum length for C strings when using bounded conversion (64KB)
pub const MAX_CSTRING_LEN: usize = 65536;

/// Check pointer not null or early-return with error value
#[macro_export]
macro_rules! ptr_or_return {
    ($ptr:expr, $err_val:expr) => {
        if $ptr.is_null() {
            $crate::Error::NullParameter(stringify!($ptr).to_string()).set_last();
            return $err_val;
        }
    };
}

/// Read a NUL terminated string of at most [`MAX_CSTRING_LEN`] bytes.
///
/// # Safety
/// `ptr` must be non-null and point to a NUL terminated string.
#[doc(hidden)]
pub unsafe fn bounded_cstr(ptr: *const std::os::raw::c_char, name: &str) -> crate::Result<String> {
    let mut len = 0;
    while *ptr.add(len) != 0 {
        len += 1;
        if len >= MAX_CSTRING_LEN {
            return Err(crate::Error::StringTooLong(name.to_string()));
        }
    }
    let bytes = std::slice::from_raw_parts(ptr as *const u8, len);
    Ok(String::from_utf8_lossy(bytes).into_owned())
}

/// Convert C string with bounded length check or early-return with error value
#[macro_export]
macro_rules! cstr_or_return {
    ($ptr:expr, $err_val:expr) => {{
        let ptr = $ptr;
        if ptr.is_null() {
            $crate::Error::NullParameter(stringify!($ptr).to_string()).set_last();
            return $err_val;
        }
        match $crate::ffi_macros::bounded_cstr(ptr, stringify!($ptr)) {
            Ok(s) => s,
            Err(err) => {
                err.set_last();
                return $err_val;
            }
        }
    }};
}

/// Convert an optional C string; null gives `None`, an overlong string
/// early-returns with the error value.
#[macro_export]
macro_rules! cstr_option_or_return {
    ($ptr:expr, $err_val:expr) => {{
        let ptr = $ptr;
        if ptr.is_null() {
            None
        } else {
            match $crate::ffi_macros::bounded_cstr(ptr, stringify!($ptr)) {
                Ok(s) => Some(s),
                Err(err) => {
                    err.set_last();
                    return $err_val;
                }
            }
        }
    }};
}

/// Handle Result or early-return with error value.
///
/// Any error convertible into the FFI error type is accepted.
#[macro_export]
macro_rules! ok_or_return {
    ($result:expr, $transform:expr, $err_val:expr) => {
        match $result {
            Ok(value) => $transform(value),
            Err(err) => {
                $crate::Error::from(err).set_last();
                return $err_val;
            }
        }
    };
}

/// Handle Result, early-return with -1 (negative) on error
#[macro_export]
macro_rules! ok_or_return_int {
    ($result:expr) => {
        $crate::ok_or_return!($result, |v| v, -1)
    };
}

/// Handle Result, early-return with null on error
#[macro_export]
macro_rules! ok_or_return_null {
    ($result:expr) => {
        $crate::ok_or_return!($result, |v| v, std::ptr::null_mut())
    };
}

/// If the expression is null, set the last error and return null.
#[macro_export]
macro_rules! ptr_or_return_null {
    ($ptr:expr) => {
        $crate::ptr_or_return!($ptr, std::ptr::null_mut())
    };
}

/// If the expression is null, set the last error and return -1.
#[macro_export]
macro_rules! ptr_or_return_int {
    ($ptr:expr) => {
        $crate::ptr_or_return!($ptr, -1)
    };
}

#[macro_export]
macro_rules! cstr_or_return_null {
    ($ptr:expr) => {
        $crate::cstr_or_return!($ptr, std::ptr::null_mut())
    };
}

#[macro_export]
macro_rules! cstr_or_return_int {
    ($ptr:expr) => {
        $crate::cstr_or_return!($ptr, -1)
    };
}

// ============================================================================
// Handle Management Macros
// ============================================================================

/// Register a Result's value and return its handle as a typed pointer.
#[macro_export]
macro_rules! return_handle {
    ($result:expr, $type:ty) => {
        match $result {
            Ok(value) => {
                let handle = $crate::ffi_utils::get_handles().insert(value);
                $crate::ffi_utils::handle_to_ptr::<$type>(handle)
            }
            Err(err) => {
                $crate::Error::from(err).set_last();
                std::ptr::null_mut()
            }
        }
    };
}

/// Free a typed pointer (handle). Returns 0, or -1 with the error latched.
#[macro_export]
macro_rules! free_handle {
    ($ptr:expr, $type:ty) => {{
        if $ptr.is_null() {
            return 0; // NULL is considered already freed
        }
        let handle = $crate::ffi_utils::ptr_to_handle($ptr);
        match $crate::ffi_utils::get_handles().remove::<$type>(handle) {
            Ok(_) => 0,
            Err(err) => {
                err.set_last();
                -1
            }
        }
    }};
}

/// Guard a handle parameter, binding `$name` to `&mut $type` for the rest of
/// the calling scope. Early-returns the error value if the pointer is null,
/// unknown, busy or of another type.
#[macro_export]
macro_rules! guard_handle_or_return {
    ($ptr:expr, $type:ty, $name:ident, $err_val:expr) => {
        $crate::ptr_or_return!($ptr, $err_val);
        let __handle = $crate::ffi_utils::ptr_to_handle($ptr);
        let __slot = $crate::ok_or_return!(
            $crate::ffi_utils::get_handles().get(__handle),
            |v| v,
            $err_val
        );
        let mut __guard = $crate::ok_or_return!(
            $crate::ffi_utils::lock_handle(&__slot, __handle),
            |v| v,
            $err_val
        );
        let $name = match __guard.downcast_mut::<$type>() {
            Some(val) => val,
            None => {
                $crate::Error::WrongHandleType(__handle).set_last();
                return $err_val;
            }
        };
    };
}

/// Guard a handle parameter, returning -1 on error
#[macro_export]
macro_rules! guard_handle_or_return_neg {
    ($ptr:expr, $type:ty, $name:ident) => {
        $crate::guard_handle_or_return!($ptr, $type, $name, -1);
    };
}

/// Guard a handle parameter, returning null on error
#[macro_export]
macro_rules! guard_handle_or_null {
    ($ptr:expr, $type:ty, $name:ident) => {
        $crate::guard_handle_or_return!($ptr, $type, $name, std::ptr::null_mut());
    };
}
