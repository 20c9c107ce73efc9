//! # `dgram` C API
//!
//! The ABI-flat surface the managed host calls. Handles cross the boundary
//! as `intptr_t` so both Unix file descriptors and Winsock `SOCKET` values
//! fit; include `<stdint.h>` in your C code to use `intptr_t`.
//!
//! ## Status convention
//!
//! Every call returns a status: [`DGRAM_SUCCESS`] (or, for send/receive,
//! the non-negative byte count) on success, a negative value on failure.
//! Calls taking an `errorcode` out-parameter additionally write the
//! platform error code there on failure, byte-for-byte as the OS reported
//! it; there is no shim-level translation table, callers interpret the
//! platform's codes themselves. Calls without an `errorcode` parameter
//! return the platform code directly in place of the status.
//!
//! ## Buffer Ownership Model
//!
//! `dgram_sendmsg` and `dgram_recvmsg` take an array of
//! [`RawIoVec`] entries referencing caller-owned buffers. The shim borrows
//! them only for the duration of the call and never retains or frees them.
//!
//! Cancellation is not supported: a blocking call can only be interrupted
//! by closing the handle out from under it, which is platform-dependent
//! and must not be relied upon.
#![allow(clippy::not_unsafe_ptr_arg_deref)]

use std::{
  io::{self, IoSlice, IoSliceMut},
  slice,
};

use crate::{addr::RawAddress, lifecycle, socket, sys, sys::RawSocket};

/// Fixed success status shared by every call.
pub const DGRAM_SUCCESS: i32 = 0;

/// Sentinel written into the caller's handle slot by [`dgram_close`].
///
/// Invalid on every platform, so a cleared handle can never alias a live
/// socket and a second close fails with a deterministic status.
pub const DGRAM_SOCKET_EMPTY: libc::intptr_t = -1;

/// A (length, pointer) view over one caller-owned buffer of a scatter or
/// gather sequence. Field order matches the boundary contract.
#[repr(C)]
pub struct RawIoVec {
  pub length: i32,
  pub data: *mut u8,
}

fn status(res: io::Result<()>) -> i32 {
  match res {
    Ok(()) => DGRAM_SUCCESS,
    Err(err) => err.raw_os_error().unwrap_or(-1),
  }
}

fn fail(err: &io::Error, errorcode: *mut i32) -> i32 {
  if !errorcode.is_null() {
    // SAFETY: a non-null errorcode points at caller-owned storage.
    unsafe { *errorcode = err.raw_os_error().unwrap_or(-1) };
  }
  -1
}

/// Increments the process-wide user count; the first call starts the OS
/// network stack where that is required. Always returns [`DGRAM_SUCCESS`].
#[unsafe(no_mangle)]
pub extern "C" fn dgram_initialize() -> i32 {
  lifecycle::initialize();
  DGRAM_SUCCESS
}

/// Decrements the process-wide user count; the last terminate tears the
/// network stack back down. Always returns [`DGRAM_SUCCESS`].
#[unsafe(no_mangle)]
pub extern "C" fn dgram_terminate() -> i32 {
  lifecycle::terminate();
  DGRAM_SUCCESS
}

/// Creates a UDP socket of `address`'s family (dual-stack for IPv6) and
/// binds it.
///
/// # Parameters
/// - `socket_handle`: out; receives the bound handle on success
/// - `address`: local address to bind; `length` must match the active
///   variant
/// - `errorcode`: out; receives the platform error code on failure
///
/// The bound local address is not reported back; query it with
/// [`dgram_get_socket_address`].
#[unsafe(no_mangle)]
pub extern "C" fn dgram_create_and_bind(
  socket_handle: *mut libc::intptr_t,
  address: *const RawAddress,
  errorcode: *mut i32,
) -> i32 {
  // SAFETY: the caller passes a fully populated address structure.
  let address = unsafe { &*address };
  match socket::create_and_bind_raw(address) {
    Ok(sock) => {
      // SAFETY: non-null out-parameter per the call contract.
      unsafe { *socket_handle = sock as libc::intptr_t };
      DGRAM_SUCCESS
    }
    Err(err) => fail(&err, errorcode),
  }
}

/// Puts the socket in non-blocking mode: subsequent send/receive calls
/// report would-block instead of parking the calling thread.
#[unsafe(no_mangle)]
pub extern "C" fn dgram_set_nonblocking(socket_handle: libc::intptr_t) -> i32 {
  status(socket::set_nonblocking(socket_handle as RawSocket))
}

/// Requests an OS send-buffer size; accepted best-effort by the OS.
#[unsafe(no_mangle)]
pub extern "C" fn dgram_set_send_buffer_size(
  socket_handle: libc::intptr_t,
  size: i32,
) -> i32 {
  status(sys::set_send_buffer_size(socket_handle as RawSocket, size))
}

/// Requests an OS receive-buffer size; accepted best-effort by the OS.
#[unsafe(no_mangle)]
pub extern "C" fn dgram_set_receive_buffer_size(
  socket_handle: libc::intptr_t,
  size: i32,
) -> i32 {
  status(sys::set_receive_buffer_size(socket_handle as RawSocket, size))
}

/// Controls connection-reset reporting on the receive path. Meaningful on
/// Windows only; a defined no-op returning success elsewhere.
#[unsafe(no_mangle)]
pub extern "C" fn dgram_set_connection_reset(
  socket_handle: libc::intptr_t,
  value: i32,
) -> i32 {
  status(socket::set_connection_reset(socket_handle as RawSocket, value != 0))
}

/// Queries the local address the socket is bound to.
///
/// # Parameters
/// - `own_address`: in/out; `length` must hold the storage capacity on
///   entry and is overwritten with the actual address size
/// - `errorcode`: out; receives the platform error code on failure
#[unsafe(no_mangle)]
pub extern "C" fn dgram_get_socket_address(
  socket_handle: libc::intptr_t,
  own_address: *mut RawAddress,
  errorcode: *mut i32,
) -> i32 {
  // SAFETY: the caller owns the output structure.
  let own_address = unsafe { &mut *own_address };
  match sys::local_addr(socket_handle as RawSocket, own_address) {
    Ok(()) => DGRAM_SUCCESS,
    Err(err) => fail(&err, errorcode),
  }
}

/// Sends one datagram assembled from `iov_len` buffers in order, addressed
/// to `address`. Returns the byte count the OS accepted, or a negative
/// status with `errorcode` set.
#[unsafe(no_mangle)]
pub extern "C" fn dgram_sendmsg(
  socket_handle: libc::intptr_t,
  iov: *const RawIoVec,
  iov_len: i32,
  address: *const RawAddress,
  errorcode: *mut i32,
) -> i32 {
  // SAFETY: the caller passes `iov_len` valid entries, each referencing a
  // buffer that stays alive for the duration of this call.
  let entries = unsafe { slice::from_raw_parts(iov, iov_len.max(0) as usize) };
  let bufs: Vec<IoSlice<'_>> = entries
    .iter()
    .map(|entry| {
      // SAFETY: same caller contract as above.
      IoSlice::new(unsafe {
        slice::from_raw_parts(entry.data, entry.length.max(0) as usize)
      })
    })
    .collect();
  // SAFETY: fully populated address per the call contract.
  let address = unsafe { &*address };

  match sys::send_to(socket_handle as RawSocket, &bufs, address) {
    Ok(sent) => sent as i32,
    Err(err) => fail(&err, errorcode),
  }
}

/// Receives the next queued datagram gathered into `iov_len` buffers in
/// order, writing the sender into `remote` (whose `length` must hold the
/// storage capacity on entry). Returns the byte count, or a negative
/// status with `errorcode` set, including the platform's would-block code
/// on an empty queue in non-blocking mode.
#[unsafe(no_mangle)]
pub extern "C" fn dgram_recvmsg(
  socket_handle: libc::intptr_t,
  iov: *const RawIoVec,
  iov_len: i32,
  remote: *mut RawAddress,
  errorcode: *mut i32,
) -> i32 {
  // SAFETY: the caller passes `iov_len` valid entries, each referencing a
  // writable buffer that stays alive for the duration of this call.
  let entries = unsafe { slice::from_raw_parts(iov, iov_len.max(0) as usize) };
  let mut bufs: Vec<IoSliceMut<'_>> = entries
    .iter()
    .map(|entry| {
      // SAFETY: same caller contract as above.
      IoSliceMut::new(unsafe {
        slice::from_raw_parts_mut(entry.data, entry.length.max(0) as usize)
      })
    })
    .collect();
  // SAFETY: the caller owns the output address structure.
  let remote = unsafe { &mut *remote };

  match sys::recv_from(socket_handle as RawSocket, &mut bufs, remote) {
    Ok(received) => received as i32,
    Err(err) => fail(&err, errorcode),
  }
}

/// Releases the socket and clears the caller's handle slot to
/// [`DGRAM_SOCKET_EMPTY`] whether or not the OS close succeeded, so a
/// stale handle cannot be reused. A failed close still reports its
/// platform code via `errorcode`.
#[unsafe(no_mangle)]
pub extern "C" fn dgram_close(
  socket_handle: *mut libc::intptr_t,
  errorcode: *mut i32,
) -> i32 {
  // SAFETY: non-null in/out handle slot per the call contract.
  let handle = unsafe { *socket_handle };
  let result = socket::close(handle as RawSocket);
  // SAFETY: same slot as above.
  unsafe { *socket_handle = DGRAM_SOCKET_EMPTY };
  match result {
    Ok(()) => DGRAM_SUCCESS,
    Err(err) => fail(&err, errorcode),
  }
}
