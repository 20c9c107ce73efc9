//! The socket operation layer: create+bind, configuration, vectored
//! send/receive, address query, close.
//!
//! Every operation is a direct, stateless mapping onto one OS handle owned
//! by the caller. The shim keeps no per-socket state, performs no retries,
//! and logs nothing; error visibility is entirely the caller's
//! responsibility. Operations on an invalid or already-closed handle are
//! the caller's contract and are not guarded.

use std::{
  io::{self, IoSlice, IoSliceMut},
  net::SocketAddr,
};

use crate::{addr::RawAddress, sys, sys::RawSocket};

/// Creates a UDP socket matching `addr`'s family, disables the v6-only
/// restriction for IPv6 sockets so dual-stack hosts also deliver
/// IPv4-mapped traffic, and binds it to `addr`.
///
/// On failure no handle is leaked: a partially created socket is closed
/// before the error is returned. The bound local address is not reported
/// back; query it with [`local_addr`].
pub fn create_and_bind(addr: SocketAddr) -> io::Result<RawSocket> {
  create_and_bind_raw(&RawAddress::from_socket_addr(addr))
}

pub(crate) fn create_and_bind_raw(addr: &RawAddress) -> io::Result<RawSocket> {
  let sock = sys::socket(addr.is_ipv6())?;
  if addr.is_ipv6() {
    if let Err(err) = sys::set_dual_stack(sock) {
      let _ = sys::close(sock);
      return Err(err);
    }
  }
  if let Err(err) = sys::bind(sock, addr) {
    let _ = sys::close(sock);
    return Err(err);
  }
  Ok(sock)
}

/// Puts the socket in non-blocking mode: send and receive return a
/// [`io::ErrorKind::WouldBlock`] error instead of parking the calling
/// thread. Idempotent.
pub fn set_nonblocking(sock: RawSocket) -> io::Result<()> {
  sys::set_nonblocking(sock)
}

/// Requests an OS send-buffer size. Best effort: the OS may clamp or round
/// the value. Idempotent.
pub fn set_send_buffer_size(sock: RawSocket, size: usize) -> io::Result<()> {
  sys::set_send_buffer_size(sock, i32::try_from(size).unwrap_or(i32::MAX))
}

/// Requests an OS receive-buffer size. Best effort, as above. Idempotent.
pub fn set_receive_buffer_size(
  sock: RawSocket,
  size: usize,
) -> io::Result<()> {
  sys::set_receive_buffer_size(sock, i32::try_from(size).unwrap_or(i32::MAX))
}

/// Controls whether an ICMP port-unreachable triggered by an earlier send
/// surfaces as a connection-reset error on this socket's receive path.
///
/// Only Winsock has this notion; on other platforms the call is a defined
/// no-op returning success. Idempotent.
pub fn set_connection_reset(sock: RawSocket, enabled: bool) -> io::Result<()> {
  sys::set_connection_reset(sock, enabled)
}

/// Queries the local address the socket is currently bound to. After
/// binding port 0, this reports the port the OS actually assigned.
pub fn local_addr(sock: RawSocket) -> io::Result<SocketAddr> {
  let mut raw = RawAddress::unspecified();
  sys::local_addr(sock, &mut raw)?;
  raw.to_socket_addr()
}

/// Sends one datagram assembled from `bufs` in order to `remote`.
///
/// True scatter I/O: the buffers are handed to the OS as a vector and never
/// copied into an intermediate contiguous region. For UDP the OS accepts
/// the whole datagram or the call fails; a partial count is not a valid
/// outcome.
pub fn send_to(
  sock: RawSocket,
  bufs: &[IoSlice<'_>],
  remote: SocketAddr,
) -> io::Result<usize> {
  sys::send_to(sock, bufs, &RawAddress::from_socket_addr(remote))
}

/// Receives the next queued datagram, gathered into `bufs` in order, and
/// reports the sender's address.
///
/// If the combined buffer capacity is smaller than the datagram the result
/// is platform-defined (typically truncation); the shim does not retry or
/// resize. On an empty queue a non-blocking socket fails with
/// [`io::ErrorKind::WouldBlock`]; a blocking one parks the thread until a
/// datagram arrives.
pub fn recv_from(
  sock: RawSocket,
  bufs: &mut [IoSliceMut<'_>],
) -> io::Result<(usize, SocketAddr)> {
  let mut remote = RawAddress::unspecified();
  let received = sys::recv_from(sock, bufs, &mut remote)?;
  Ok((received, remote.to_socket_addr()?))
}

/// Releases the OS handle. The handle is invalid afterwards regardless of
/// the result; closing it again fails with a deterministic bad-handle
/// status rather than crashing.
///
/// Closing a handle out from under a call blocked on another thread is
/// platform-dependent behavior and must not be relied upon for
/// cancellation.
pub fn close(sock: RawSocket) -> io::Result<()> {
  sys::close(sock)
}
