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
    ffi::c_void,
    os::raw::{c_char, c_int, c_uchar},
};

use c2pa_pipeline::{
    settings, BoxedSigner, Builder, CAIRead, CallbackSigner, DataHash, Error as PipelineError,
    Reader, SigningAlg,
};

#[cfg(feature = "file_io")]
use crate::json_api::{read_file, read_ingredient_file, sign_file};
use crate::{
    c2pa_stream::{C2paStream, C2paStreamAdapter},
    ffi_utils::{free_c_bytes, free_c_string, safe_slice_from_raw_parts, to_c_bytes, to_c_string},
    signer_info::SignerInfo,
    Error,
};

// Work around limitations in cbindgen.
mod cbindgen_fix {
    #[repr(C)]
    #[allow(dead_code)]
    pub struct C2paBuilder;

    #[repr(C)]
    #[allow(dead_code)]
    pub struct C2paReader;
}

pub use cbindgen_fix::{C2paBuilder, C2paReader};

/// List of supported signing algorithms.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub enum C2paSigningAlg {
    Es256,
    Es384,
    Es512,
    Ps256,
    Ps384,
    Ps512,
    Ed25519,
}

impl From<C2paSigningAlg> for SigningAlg {
    fn from(alg: C2paSigningAlg) -> Self {
        match alg {
            C2paSigningAlg::Es256 => SigningAlg::Es256,
            C2paSigningAlg::Es384 => SigningAlg::Es384,
            C2paSigningAlg::Es512 => SigningAlg::Es512,
            C2paSigningAlg::Ps256 => SigningAlg::Ps256,
            C2paSigningAlg::Ps384 => SigningAlg::Ps384,
            C2paSigningAlg::Ps512 => SigningAlg::Ps512,
            C2paSigningAlg::Ed25519 => SigningAlg::Ed25519,
        }
    }
}

/// A signer held behind a `C2paSigner` handle.
pub struct C2paSigner {
    pub signer: BoxedSigner,
}

#[repr(C)]
/// Defines the configuration for a Signer.
///
/// The signer is created from the sign_cert and private_key fields.
/// The optional time authority URL is recorded with the signer.
pub struct C2paSignerInfo {
    /// The signing algorithm.
    pub alg: *const c_char,
    /// The public certificate chain in PEM format.
    pub sign_cert: *const c_char,
    /// The private key in PEM format.
    pub private_key: *const c_char,
    /// The timestamp authority URL or NULL.
    pub ta_url: *const c_char,
}

impl C2paSignerInfo {
    // Copies the C strings; null fields other than ta_url are rejected.
    unsafe fn to_signer_info(&self) -> crate::Result<SignerInfo> {
        let required = |ptr: *const c_char, name: &str| -> crate::Result<String> {
            if ptr.is_null() {
                return Err(Error::NullParameter(name.to_string()));
            }
            crate::ffi_macros::bounded_cstr(ptr, name)
        };
        Ok(SignerInfo {
            alg: required(self.alg, "signer_info.alg")?,
            sign_cert: required(self.sign_cert, "signer_info.sign_cert")?.into_bytes(),
            private_key: required(self.private_key, "signer_info.private_key")?.into_bytes(),
            ta_url: if self.ta_url.is_null() {
                None
            } else {
                Some(crate::ffi_macros::bounded_cstr(
                    self.ta_url,
                    "signer_info.ta_url",
                )?)
            },
        })
    }
}

/// Defines a callback that signs data.
///
/// # Parameters
/// * context: the context value given to c2pa_signer_create.
/// * data: the bytes to sign.
/// * len: the number of bytes to sign.
/// * signed_bytes: the buffer that receives the signature.
/// * signed_len: the capacity of signed_bytes, equal to the signer's reserve size.
///
/// Returns the length of the signature, or a negative value on failure.
pub type SignerCallback = unsafe extern "C" fn(
    context: *const (),
    data: *const c_uchar,
    len: usize,
    signed_bytes: *mut c_uchar,
    signed_len: usize,
) -> isize;

// Hands bytes to C, returning their length.
unsafe fn return_bytes(bytes: Vec<u8>, bytes_ptr: *mut *const c_uchar) -> i64 {
    let len = bytes.len() as i64;
    if !bytes_ptr.is_null() {
        *bytes_ptr = to_c_bytes(bytes);
    }
    len
}

/// Returns a version string for logging.
///
/// # Safety
/// The returned value MUST be released by calling c2pa_string_free
/// and it is no longer valid after that call.
#[no_mangle]
pub unsafe extern "C" fn c2pa_version() -> *mut c_char {
    let version = format!(
        "{}/{} {}/{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        c2pa_pipeline::NAME,
        c2pa_pipeline::VERSION
    );
    to_c_string(version)
}

/// Returns and clears the last error message of the calling thread.
///
/// The string is empty if there is no error.
///
/// # Safety
/// The returned value MUST be released by calling c2pa_string_free
/// and it is no longer valid after that call.
#[no_mangle]
pub unsafe extern "C" fn c2pa_error() -> *mut c_char {
    to_c_string(
        Error::take_last()
            .map(|err| err.to_string())
            .unwrap_or_default(),
    )
}

/// Sets the last error message.
///
/// This is used by callbacks so they can set a return error message.
/// The error should be in the form of "ErrorType: ErrorMessage".
/// If ErrorType is missing or invalid, it will be set to "Other"
/// and the message will include the original error string.
/// Returns -1 if the error string is NULL.
///
/// # Safety
/// Reads from NULL-terminated C strings.
#[no_mangle]
pub unsafe extern "C" fn c2pa_error_set_last(error_str: *const c_char) -> c_int {
    let error_str = cstr_or_return_int!(error_str);
    Error::from(error_str).set_last();
    0
}

/// Loads settings for the calling thread from a JSON or TOML string.
///
/// # Errors
/// Returns -1 if there were errors, otherwise returns 0.
/// The error string can be retrieved by calling c2pa_error.
///
/// # Safety
/// Reads from NULL-terminated C strings.
#[no_mangle]
pub unsafe extern "C" fn c2pa_load_settings(
    settings: *const c_char,
    format: *const c_char,
) -> c_int {
    let settings = cstr_or_return_int!(settings);
    let format = cstr_or_return_int!(format);
    let result = settings::load_settings_from_str(&settings, &format);
    ok_or_return!(result, |_| 0, -1)
}

/// Returns a manifest store JSON string from a file path.
///
/// Any thumbnails or other binary resources will be written to data_dir if provided.
///
/// # Errors
/// Returns NULL if there were errors, otherwise returns a JSON string.
/// A file without a manifest gives NULL with a ManifestNotFound error.
/// The error string can be retrieved by calling c2pa_error.
///
/// # Safety
/// Reads from NULL-terminated C strings.
/// The returned value MUST be released by calling c2pa_string_free
/// and it is no longer valid after that call.
#[cfg(feature = "file_io")]
#[no_mangle]
pub unsafe extern "C" fn c2pa_read_file(
    path: *const c_char,
    data_dir: *const c_char,
) -> *mut c_char {
    let path = cstr_or_return_null!(path);
    let data_dir = cstr_option_or_return!(data_dir, std::ptr::null_mut());

    match read_file(&path, data_dir) {
        Ok(Some(json)) => to_c_string(json),
        Ok(None) => {
            Error::ManifestNotFound(format!("no manifest found in {path}")).set_last();
            std::ptr::null_mut()
        }
        Err(err) => {
            err.set_last();
            std::ptr::null_mut()
        }
    }
}

/// Returns an Ingredient JSON string from a file path.
///
/// Any thumbnail or C2PA data will be written to data_dir.
///
/// # Errors
/// Returns NULL if there were errors, otherwise returns a JSON string
/// containing the Ingredient.
/// The error string can be retrieved by calling c2pa_error.
///
/// # Safety
/// Reads from NULL-terminated C strings.
/// The returned value MUST be released by calling c2pa_string_free
/// and it is no longer valid after that call.
#[cfg(feature = "file_io")]
#[no_mangle]
pub unsafe extern "C" fn c2pa_read_ingredient_file(
    path: *const c_char,
    data_dir: *const c_char,
) -> *mut c_char {
    let path = cstr_or_return_null!(path);
    let data_dir = cstr_or_return_null!(data_dir);
    let result = read_ingredient_file(&path, &data_dir);
    ok_or_return!(result, to_c_string, std::ptr::null_mut())
}

/// Add a signed manifest to the file at path with the given signer information.
///
/// # Errors
/// Returns NULL if there were errors, otherwise an empty string.
/// The error string can be retrieved by calling c2pa_error.
///
/// # Safety
/// Reads from NULL-terminated C strings.
/// The returned value MUST be released by calling c2pa_string_free
/// and it is no longer valid after that call.
#[cfg(feature = "file_io")]
#[no_mangle]
pub unsafe extern "C" fn c2pa_sign_file(
    source_path: *const c_char,
    dest_path: *const c_char,
    manifest: *const c_char,
    signer_info: *const C2paSignerInfo,
    data_dir: *const c_char,
) -> *mut c_char {
    let source_path = cstr_or_return_null!(source_path);
    let dest_path = cstr_or_return_null!(dest_path);
    let manifest = cstr_or_return_null!(manifest);
    ptr_or_return_null!(signer_info);
    let data_dir = cstr_option_or_return!(data_dir, std::ptr::null_mut());
    let signer_info = ok_or_return_null!((*signer_info).to_signer_info());

    let result = sign_file(&source_path, &dest_path, &manifest, &signer_info, data_dir);
    ok_or_return!(result, |_| to_c_string(String::new()), std::ptr::null_mut())
}

/// Frees a string allocated by Rust.
///
/// Deprecated: for backward api compatibility only.
///
/// # Safety
/// The string must not have been modified in C.
/// The string can only be freed once and is invalid after this call.
#[no_mangle]
pub unsafe extern "C" fn c2pa_release_string(s: *mut c_char) -> c_int {
    c2pa_string_free(s)
}

/// Frees a string allocated by Rust.
///
/// Returns 0, or -1 if the pointer is not a live string returned by this
/// library. NULL is accepted.
///
/// # Safety
/// The string must not have been modified in C.
/// The string can only be freed once and is invalid after this call.
#[no_mangle]
pub unsafe extern "C" fn c2pa_string_free(s: *mut c_char) -> c_int {
    ok_or_return!(free_c_string(s), |_| 0, -1)
}

/// Creates and verifies a C2paReader from an asset stream with the given format.
///
/// # Parameters
/// * format: pointer to a C string with the mime type or extension.
/// * stream: pointer to a readable C2paStream.
///
/// # Errors
/// Returns NULL if there were errors, otherwise returns a pointer to a C2paReader.
/// The error string can be retrieved by calling c2pa_error.
///
/// # Safety
/// Reads from NULL-terminated C strings.
/// The returned value MUST be released by calling c2pa_reader_free
/// and it is no longer valid after that call.
///
/// # Example
/// ```c
/// auto result = c2pa_reader_from_stream("image/jpeg", stream);
/// if (result == NULL) {
///     let error = c2pa_error();
///     printf("Error: %s\n", error);
///     c2pa_string_free(error);
/// }
/// ```
#[no_mangle]
pub unsafe extern "C" fn c2pa_reader_from_stream(
    format: *const c_char,
    stream: *mut C2paStream,
) -> *mut C2paReader {
    let format = cstr_or_return_null!(format);
    guard_handle_or_null!(stream, C2paStreamAdapter, stream);

    let result = Reader::from_stream(&format, &mut *stream);
    return_handle!(result, C2paReader)
}

/// Creates and verifies a C2paReader from a file path.
///
/// # Errors
/// Returns NULL if there were errors, otherwise returns a pointer to a C2paReader.
/// The error string can be retrieved by calling c2pa_error.
///
/// # Safety
/// Reads from NULL-terminated C strings.
/// The returned value MUST be released by calling c2pa_reader_free
/// and it is no longer valid after that call.
#[cfg(feature = "file_io")]
#[no_mangle]
pub unsafe extern "C" fn c2pa_reader_from_file(path: *const c_char) -> *mut C2paReader {
    let path = cstr_or_return_null!(path);
    let result = Reader::from_file(&path);
    return_handle!(result, C2paReader)
}

/// Creates and verifies a C2paReader from an asset stream with the given format and manifest data.
///
/// # Parameters
/// * format: pointer to a C string with the mime type or extension.
/// * stream: pointer to a readable C2paStream.
/// * manifest_data: pointer to the manifest data bytes.
/// * manifest_size: size of the manifest data bytes.
///
/// # Errors
/// Returns NULL if there were errors, otherwise returns a pointer to a C2paReader.
/// The error string can be retrieved by calling c2pa_error.
///
/// # Safety
/// Reads from NULL-terminated C strings.
/// manifest_data must be valid for reads of manifest_size bytes.
/// The returned value MUST be released by calling c2pa_reader_free
/// and it is no longer valid after that call.
#[no_mangle]
pub unsafe extern "C" fn c2pa_reader_from_manifest_data_and_stream(
    format: *const c_char,
    stream: *mut C2paStream,
    manifest_data: *const c_uchar,
    manifest_size: usize,
) -> *mut C2paReader {
    let format = cstr_or_return_null!(format);
    let manifest_bytes = ok_or_return_null!(safe_slice_from_raw_parts(
        manifest_data,
        manifest_size,
        "manifest_data"
    ));
    guard_handle_or_null!(stream, C2paStreamAdapter, stream);

    let result = Reader::from_manifest_data_and_stream(manifest_bytes, &format, &mut *stream);
    return_handle!(result, C2paReader)
}

/// Frees a C2paReader allocated by Rust.
///
/// Returns 0, or -1 if the pointer is not a live reader. NULL is accepted.
///
/// # Safety
/// The C2paReader can only be freed once and is invalid after this call.
#[no_mangle]
pub unsafe extern "C" fn c2pa_reader_free(reader_ptr: *mut C2paReader) -> c_int {
    free_handle!(reader_ptr, Reader)
}

/// Returns a JSON string generated from a C2paReader.
///
/// # Safety
/// The returned value MUST be released by calling c2pa_string_free
/// and it is no longer valid after that call.
#[no_mangle]
pub unsafe extern "C" fn c2pa_reader_json(reader_ptr: *mut C2paReader) -> *mut c_char {
    guard_handle_or_null!(reader_ptr, Reader, reader);
    to_c_string(reader.json())
}

/// Writes a C2paReader resource to a stream given a URI.
///
/// The resource uri should match an identifier in the manifest store.
///
/// # Parameters
/// * reader_ptr: pointer to a C2paReader.
/// * uri: pointer to a C string with the URI to identify the resource.
/// * stream: pointer to a writable C2paStream.
///
/// # Errors
/// Returns -1 if there were errors, otherwise returns size of stream written.
///
/// # Safety
/// Reads from NULL-terminated C strings.
///
/// # Example
/// ```c
/// auto result = c2pa_reader_resource_to_stream(reader, "uri", stream);
/// if (result < 0) {
///     auto error = c2pa_error();
///     printf("Error: %s\n", error);
///     c2pa_string_free(error);
/// }
/// ```
#[no_mangle]
pub unsafe extern "C" fn c2pa_reader_resource_to_stream(
    reader_ptr: *mut C2paReader,
    uri: *const c_char,
    stream: *mut C2paStream,
) -> i64 {
    let uri = cstr_or_return_int!(uri);
    guard_handle_or_return_neg!(reader_ptr, Reader, reader);
    guard_handle_or_return_neg!(stream, C2paStreamAdapter, stream);

    let result = reader.resource_to_stream(&uri, &mut *stream);
    ok_or_return!(result, |len| len as i64, -1)
}

/// Creates a C2paBuilder from a JSON manifest definition string.
///
/// # Errors
/// Returns NULL if there were errors, otherwise returns a pointer to a C2paBuilder.
/// The error string can be retrieved by calling c2pa_error.
///
/// # Safety
/// Reads from NULL-terminated C strings.
/// The returned value MUST be released by calling c2pa_builder_free
/// and it is no longer valid after that call.
///
/// # Example
/// ```c
/// auto result = c2pa_builder_from_json(manifest_json);
/// if (result == NULL) {
///     auto error = c2pa_error();
///     printf("Error: %s\n", error);
///     c2pa_string_free(error);
/// }
/// ```
#[no_mangle]
pub unsafe extern "C" fn c2pa_builder_from_json(manifest_json: *const c_char) -> *mut C2paBuilder {
    let manifest_json = cstr_or_return_null!(manifest_json);
    let result = Builder::from_json(&manifest_json);
    return_handle!(result, C2paBuilder)
}

/// Create a C2paBuilder from an archive stream.
///
/// # Errors
/// Returns NULL if there were errors, otherwise returns a pointer to a C2paBuilder.
/// The error string can be retrieved by calling c2pa_error.
///
/// # Safety
/// The returned value MUST be released by calling c2pa_builder_free
/// and it is no longer valid after that call.
#[no_mangle]
pub unsafe extern "C" fn c2pa_builder_from_archive(stream: *mut C2paStream) -> *mut C2paBuilder {
    guard_handle_or_null!(stream, C2paStreamAdapter, stream);
    let result = Builder::from_archive(&mut *stream);
    return_handle!(result, C2paBuilder)
}

/// Frees a C2paBuilder allocated by Rust.
///
/// Returns 0, or -1 if the pointer is not a live builder. NULL is accepted.
///
/// # Safety
/// The C2paBuilder can only be freed once and is invalid after this call.
#[no_mangle]
pub unsafe extern "C" fn c2pa_builder_free(builder_ptr: *mut C2paBuilder) -> c_int {
    free_handle!(builder_ptr, Builder)
}

/// Sets the no-embed flag on the Builder.
///
/// When set, the builder will not embed a C2PA manifest store into the asset when signing.
/// This is useful when creating cloud or sidecar manifests.
///
/// # Errors
/// Returns -1 if builder_ptr is not a live builder, otherwise returns 0.
///
/// # Safety
/// builder_ptr must be a pointer returned by this library.
#[no_mangle]
pub unsafe extern "C" fn c2pa_builder_set_no_embed(builder_ptr: *mut C2paBuilder) -> c_int {
    guard_handle_or_return_neg!(builder_ptr, Builder, builder);
    builder.set_no_embed(true);
    0
}

/// Sets the remote URL on the Builder.
///
/// The URL is validated and recorded in the builder state.
///
/// # Errors
/// Returns -1 if there were errors, otherwise returns 0.
/// The error string can be retrieved by calling c2pa_error.
///
/// # Safety
/// Reads from NULL-terminated C strings.
#[no_mangle]
pub unsafe extern "C" fn c2pa_builder_set_remote_url(
    builder_ptr: *mut C2paBuilder,
    remote_url: *const c_char,
) -> c_int {
    let remote_url = cstr_or_return_int!(remote_url);
    guard_handle_or_return_neg!(builder_ptr, Builder, builder);
    let result = builder.set_remote_url(remote_url);
    ok_or_return!(result, |_| 0, -1)
}

/// Sets the folder that resource and ingredient paths in the definition are relative to.
///
/// # Errors
/// Returns -1 if there were errors, otherwise returns 0.
/// The error string can be retrieved by calling c2pa_error.
///
/// # Safety
/// Reads from NULL-terminated C strings.
#[cfg(feature = "file_io")]
#[no_mangle]
pub unsafe extern "C" fn c2pa_builder_set_base_path(
    builder_ptr: *mut C2paBuilder,
    base_path: *const c_char,
) -> c_int {
    let base_path = cstr_or_return_int!(base_path);
    guard_handle_or_return_neg!(builder_ptr, Builder, builder);
    builder.set_base_path(base_path);
    0
}

/// Adds a resource to the C2paBuilder.
///
/// The resource uri should match an identifier in the manifest definition.
/// A uri that is already bound is rejected.
///
/// # Parameters
/// * builder_ptr: pointer to a C2paBuilder.
/// * uri: pointer to a C string with the URI to identify the resource.
/// * stream: pointer to a readable C2paStream.
///
/// # Errors
/// Returns -1 if there were errors, otherwise returns 0.
/// The error string can be retrieved by calling c2pa_error.
///
/// # Safety
/// Reads from NULL-terminated C strings
#[no_mangle]
pub unsafe extern "C" fn c2pa_builder_add_resource(
    builder_ptr: *mut C2paBuilder,
    uri: *const c_char,
    stream: *mut C2paStream,
) -> c_int {
    let uri = cstr_or_return_int!(uri);
    guard_handle_or_return_neg!(builder_ptr, Builder, builder);
    guard_handle_or_return_neg!(stream, C2paStreamAdapter, stream);

    let result = builder.add_resource(&uri, &mut *stream);
    ok_or_return!(result, |_| 0, -1)
}

/// Adds an ingredient to the C2paBuilder.
///
/// # Parameters
/// * builder_ptr: pointer to a C2paBuilder.
/// * ingredient_json: pointer to a C string with the JSON ingredient definition.
/// * format: pointer to a C string with the mime type or extension.
/// * source: pointer to a readable C2paStream.
///
/// # Errors
/// Returns -1 if there were errors, otherwise returns 0.
/// The error string can be retrieved by calling c2pa_error.
///
/// # Safety
/// Reads from NULL-terminated C strings.
#[no_mangle]
pub unsafe extern "C" fn c2pa_builder_add_ingredient_from_stream(
    builder_ptr: *mut C2paBuilder,
    ingredient_json: *const c_char,
    format: *const c_char,
    source: *mut C2paStream,
) -> c_int {
    let ingredient_json = cstr_or_return_int!(ingredient_json);
    let format = cstr_or_return_int!(format);
    guard_handle_or_return_neg!(builder_ptr, Builder, builder);
    guard_handle_or_return_neg!(source, C2paStreamAdapter, source);

    let result = builder.add_ingredient_from_stream(&ingredient_json, &format, &mut *source);
    ok_or_return!(result, |_| 0, -1)
}

/// Same as [`c2pa_builder_add_ingredient_from_stream`].
///
/// # Safety
/// Reads from NULL-terminated C strings.
#[no_mangle]
pub unsafe extern "C" fn c2pa_builder_add_ingredient(
    builder_ptr: *mut C2paBuilder,
    ingredient_json: *const c_char,
    format: *const c_char,
    source: *mut C2paStream,
) -> c_int {
    c2pa_builder_add_ingredient_from_stream(builder_ptr, ingredient_json, format, source)
}

/// Writes an Archive of the Builder to the destination stream.
///
/// # Parameters
/// * builder_ptr: pointer to a C2paBuilder.
/// * stream: pointer to a writable C2paStream.
///
/// # Errors
/// Returns -1 if there were errors, otherwise returns 0.
/// The error string can be retrieved by calling c2pa_error.
///
/// # Safety
/// builder_ptr and stream must be pointers returned by this library.
///
/// # Example
/// ```c
/// auto result = c2pa_builder_to_archive(builder, stream);
/// if (result < 0) {
///     auto error = c2pa_error();
///     printf("Error: %s\n", error);
///     c2pa_string_free(error);
/// }
/// ```
#[no_mangle]
pub unsafe extern "C" fn c2pa_builder_to_archive(
    builder_ptr: *mut C2paBuilder,
    stream: *mut C2paStream,
) -> c_int {
    guard_handle_or_return_neg!(builder_ptr, Builder, builder);
    guard_handle_or_return_neg!(stream, C2paStreamAdapter, stream);

    let result = builder.to_archive(&mut *stream);
    ok_or_return!(result, |_| 0, -1)
}

/// Creates and writes signed manifest from the C2paBuilder to the destination stream.
///
/// # Parameters
/// * builder_ptr: pointer to a C2paBuilder.
/// * format: pointer to a C string with the mime type or extension.
/// * source: pointer to a readable C2paStream.
/// * dest: pointer to a readable and writable C2paStream, distinct from source.
/// * signer_ptr: pointer to a C2paSigner.
/// * manifest_bytes_ptr: pointer to a pointer to a c_uchar to return manifest_bytes (optional, can be NULL).
///
/// # Errors
/// Returns -1 if there were errors, otherwise returns the size of the manifest bytes.
/// The error string can be retrieved by calling c2pa_error.
///
/// # Safety
/// Reads from NULL-terminated C strings.
/// If manifest_bytes_ptr is not NULL, the returned value MUST be released by calling c2pa_manifest_bytes_free
/// and it is no longer valid after that call.
#[no_mangle]
pub unsafe extern "C" fn c2pa_builder_sign(
    builder_ptr: *mut C2paBuilder,
    format: *const c_char,
    source: *mut C2paStream,
    dest: *mut C2paStream,
    signer_ptr: *mut C2paSigner,
    manifest_bytes_ptr: *mut *const c_uchar,
) -> i64 {
    let format = cstr_or_return_int!(format);
    if !source.is_null() && source == dest {
        Error::InvalidArgument("source and dest must be different streams".to_string())
            .set_last();
        return -1;
    }
    guard_handle_or_return_neg!(builder_ptr, Builder, builder);
    guard_handle_or_return_neg!(signer_ptr, C2paSigner, c2pa_signer);
    guard_handle_or_return_neg!(source, C2paStreamAdapter, source);
    guard_handle_or_return_neg!(dest, C2paStreamAdapter, dest);

    let result = builder.sign(c2pa_signer.signer.as_ref(), &format, source, dest);
    ok_or_return!(
        result,
        |manifest_bytes| return_bytes(manifest_bytes, manifest_bytes_ptr),
        -1
    )
}

/// Frees manifest bytes returned by this library.
///
/// Returns 0, or -1 if the pointer was not returned by this library or was
/// already freed. NULL is accepted.
///
/// # Safety
/// The bytes can only be freed once and are invalid after this call.
#[no_mangle]
pub unsafe extern "C" fn c2pa_manifest_bytes_free(manifest_bytes_ptr: *const c_uchar) -> c_int {
    ok_or_return!(free_c_bytes(manifest_bytes_ptr), |_| 0, -1)
}

/// Creates a data hashed placeholder from a Builder.
///
/// The placeholder is used to reserve size in an asset for later signing.
///
/// # Parameters
/// * builder_ptr: pointer to a C2paBuilder.
/// * reserved_size: the size required for a signature from the intended signer.
/// * format: pointer to a C string with the mime type or extension.
/// * manifest_bytes_ptr: pointer to a pointer to a c_uchar to return manifest_bytes.
///
/// # Errors
/// Returns -1 if there were errors, otherwise returns the size of the manifest_bytes.
/// The error string can be retrieved by calling c2pa_error.
///
/// # Safety
/// Reads from NULL-terminated C strings.
/// The returned bytes MUST be released by calling c2pa_manifest_bytes_free
/// and are no longer valid after that call.
#[no_mangle]
pub unsafe extern "C" fn c2pa_builder_data_hashed_placeholder(
    builder_ptr: *mut C2paBuilder,
    reserved_size: usize,
    format: *const c_char,
    manifest_bytes_ptr: *mut *const c_uchar,
) -> i64 {
    ptr_or_return_int!(manifest_bytes_ptr);
    let format = cstr_or_return_int!(format);
    guard_handle_or_return_neg!(builder_ptr, Builder, builder);

    let result = builder.data_hashed_placeholder(reserved_size, &format);
    ok_or_return!(
        result,
        |manifest_bytes| return_bytes(manifest_bytes, manifest_bytes_ptr),
        -1
    )
}

/// Sign a Builder using the specified signer and data hash.
///
/// The data hash is a JSON string containing DataHash information for the asset.
/// This is a low-level method for advanced use cases where the caller handles embedding the manifest.
///
/// # Parameters
/// * builder_ptr: pointer to a C2paBuilder.
/// * signer_ptr: pointer to a C2paSigner.
/// * data_hash: pointer to a C string with the JSON data hash.
/// * format: pointer to a C string with the mime type or extension.
/// * asset: pointer to a readable C2paStream (may be NULL to use a precalculated hash).
/// * manifest_bytes_ptr: pointer to a pointer to a c_uchar to return manifest_bytes.
///
/// # Errors
/// Returns -1 if there were errors, otherwise returns the size of the manifest_bytes.
/// The error string can be retrieved by calling c2pa_error.
///
/// # Safety
/// Reads from NULL-terminated C strings.
/// The returned bytes MUST be released by calling c2pa_manifest_bytes_free
/// and are no longer valid after that call.
#[no_mangle]
pub unsafe extern "C" fn c2pa_builder_sign_data_hashed_embeddable(
    builder_ptr: *mut C2paBuilder,
    signer_ptr: *mut C2paSigner,
    data_hash: *const c_char,
    format: *const c_char,
    asset: *mut C2paStream,
    manifest_bytes_ptr: *mut *const c_uchar,
) -> i64 {
    ptr_or_return_int!(manifest_bytes_ptr);
    let data_hash_json = cstr_or_return_int!(data_hash);
    let format = cstr_or_return_int!(format);
    let data_hash = ok_or_return_int!(serde_json::from_str::<DataHash>(&data_hash_json));

    guard_handle_or_return_neg!(builder_ptr, Builder, builder);
    guard_handle_or_return_neg!(signer_ptr, C2paSigner, c2pa_signer);
    let signer = c2pa_signer.signer.as_ref();

    let result = if asset.is_null() {
        builder.sign_data_hashed_embeddable(signer, &data_hash, &format, None)
    } else {
        guard_handle_or_return_neg!(asset, C2paStreamAdapter, asset);
        let asset: &mut dyn CAIRead = asset;
        builder.sign_data_hashed_embeddable(signer, &data_hash, &format, Some(asset))
    };
    ok_or_return!(
        result,
        |manifest_bytes| return_bytes(manifest_bytes, manifest_bytes_ptr),
        -1
    )
}

/// Convert a binary c2pa manifest into an embeddable version for the given format.
///
/// A raw manifest (in application/c2pa format) can be uploaded to the cloud but
/// it cannot be embedded directly into an asset without extra processing.
/// This method converts the raw manifest into an embeddable version that can be
/// embedded into an asset.
///
/// # Parameters
/// * format: pointer to a C string with the mime type or extension.
/// * manifest_bytes_ptr: pointer to a c_uchar with the raw manifest bytes.
/// * manifest_bytes_size: the size of the manifest_bytes.
/// * result_bytes_ptr: pointer to a pointer to a c_uchar to return the embeddable manifest bytes.
///
/// # Errors
/// Returns -1 if there were errors, otherwise returns the size of the result_bytes.
/// The error string can be retrieved by calling c2pa_error.
///
/// # Safety
/// Reads from NULL-terminated C strings.
/// The returned value MUST be released by calling c2pa_manifest_bytes_free
/// and it is no longer valid after that call.
#[no_mangle]
pub unsafe extern "C" fn c2pa_format_embeddable(
    format: *const c_char,
    manifest_bytes_ptr: *const c_uchar,
    manifest_bytes_size: usize,
    result_bytes_ptr: *mut *const c_uchar,
) -> i64 {
    ptr_or_return_int!(result_bytes_ptr);
    let format = cstr_or_return_int!(format);
    let bytes = ok_or_return_int!(safe_slice_from_raw_parts(
        manifest_bytes_ptr,
        manifest_bytes_size,
        "manifest_bytes_ptr"
    ));

    let result = Builder::format_embeddable(&format, bytes);
    ok_or_return!(
        result,
        |result_bytes| return_bytes(result_bytes, result_bytes_ptr),
        -1
    )
}

/// Creates a C2paSigner from a callback and configuration.
///
/// The callback receives a buffer of the signer's reserve size and must
/// write the signature into it. A negative return, or a length larger than
/// the buffer, fails the signing operation. A callback may call
/// c2pa_error_set_last before failing to describe the failure.
///
/// # Parameters
/// * context: a value passed back to every callback invocation.
/// * callback: a callback function to sign data.
/// * alg: the signing algorithm.
/// * certs: a pointer to a NULL-terminated string containing the certificate chain in PEM format.
/// * tsa_url: a pointer to a NULL-terminated string containing the RFC 3161 compliant timestamp authority URL, or NULL.
///
/// # Errors
/// Returns NULL if there were errors, otherwise returns a pointer to a C2paSigner.
/// The error string can be retrieved by calling c2pa_error.
///
/// # Safety
/// Reads from NULL-terminated C strings.
/// The returned value MUST be released by calling c2pa_signer_free
/// and it is no longer valid after that call.
/// The context and callback are owned by the caller and must stay valid
/// while the signer is alive.
///
/// # Example
/// ```c
/// auto result = c2pa_signer_create(context, callback, alg, certs, tsa_url);
/// if (result == NULL) {
///     auto error = c2pa_error();
///     printf("Error: %s\n", error);
///     c2pa_string_free(error);
/// }
/// ```
#[no_mangle]
pub unsafe extern "C" fn c2pa_signer_create(
    context: *const c_void,
    callback: Option<SignerCallback>,
    alg: C2paSigningAlg,
    certs: *const c_char,
    tsa_url: *const c_char,
) -> *mut C2paSigner {
    let Some(callback) = callback else {
        Error::NullParameter("callback".to_string()).set_last();
        return std::ptr::null_mut();
    };
    let certs = cstr_or_return_null!(certs);
    let tsa_url = cstr_option_or_return!(tsa_url, std::ptr::null_mut());
    let signed_len = 10000 + certs.len();

    let c_callback = move |context: *const (), data: &[u8]| {
        let mut signed_bytes = vec![0u8; signed_len];
        let written = unsafe {
            callback(
                context,
                data.as_ptr(),
                data.len(),
                signed_bytes.as_mut_ptr(),
                signed_len,
            )
        };
        if written < 0 {
            let message = Error::take_last()
                .map(|err| err.to_string())
                .unwrap_or_else(|| format!("signer callback returned {written}"));
            return Err(PipelineError::SigningFailed(message));
        }
        let written = written as usize;
        if written > signed_len {
            log::error!("signer callback returned {written} bytes, {signed_len} reserved");
            return Err(PipelineError::CoseSigboxTooSmall);
        }
        signed_bytes.truncate(written);
        Ok(signed_bytes)
    };

    let result = CallbackSigner::new(c_callback, alg.into(), &certs).map(|signer| {
        let signer = signer
            .set_context(context as *const ())
            .set_reserve_size(signed_len);
        let signer = match tsa_url {
            Some(url) => signer.set_tsa_url(url),
            None => signer,
        };
        C2paSigner {
            signer: Box::new(signer),
        }
    });
    return_handle!(result, C2paSigner)
}

/// Creates a C2paSigner from a SignerInfo.
///
/// The signer is created from the sign_cert and private_key fields.
///
/// # Parameters
/// * signer_info: pointer to a C2paSignerInfo.
///
/// # Errors
/// Returns NULL if there were errors, otherwise returns a pointer to a C2paSigner.
/// The error string can be retrieved by calling c2pa_error.
///
/// # Safety
/// Reads from NULL-terminated C strings.
/// The returned value MUST be released by calling c2pa_signer_free
/// and it is no longer valid after that call.
#[no_mangle]
pub unsafe extern "C" fn c2pa_signer_from_info(
    signer_info: *const C2paSignerInfo,
) -> *mut C2paSigner {
    ptr_or_return_null!(signer_info);
    let result = (*signer_info)
        .to_signer_info()
        .and_then(|info| info.signer())
        .map(|signer| C2paSigner { signer });
    return_handle!(result, C2paSigner)
}

/// Returns the size to reserve for the signature for this signer.
///
/// # Errors
/// Returns -1 if there were errors, otherwise returns the size to reserve.
/// The error string can be retrieved by calling c2pa_error.
///
/// # Safety
/// The signer_ptr must be a pointer returned by this library.
#[no_mangle]
pub unsafe extern "C" fn c2pa_signer_reserve_size(signer_ptr: *mut C2paSigner) -> i64 {
    guard_handle_or_return_neg!(signer_ptr, C2paSigner, c2pa_signer);
    c2pa_signer.signer.reserve_size() as i64
}

/// Frees a C2paSigner allocated by Rust.
///
/// Returns 0, or -1 if the pointer is not a live signer. NULL is accepted.
///
/// # Safety
/// The C2paSigner can only be freed once and is invalid after this call.
#[no_mangle]
pub unsafe extern "C" fn c2pa_signer_free(signer_ptr: *mut C2paSigner) -> c_int {
    free_handle!(signer_ptr, C2paSigner)
}
