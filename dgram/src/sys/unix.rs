use std::{
  io::{self, IoSlice, IoSliceMut},
  mem,
};

use crate::addr::RawAddress;

/// OS-owned socket handle. The shim never wraps it in state of its own.
pub type RawSocket = std::os::fd::RawFd;

/// No network-stack startup is required on POSIX systems.
pub(crate) fn startup() -> io::Result<()> {
  Ok(())
}

pub(crate) fn cleanup() {}

pub(crate) fn socket(ipv6: bool) -> io::Result<RawSocket> {
  let family = if ipv6 { libc::AF_INET6 } else { libc::AF_INET };
  syscall!(socket(family, libc::SOCK_DGRAM, libc::IPPROTO_UDP))
}

/// Clears `IPV6_V6ONLY` so an IPv6 socket also accepts IPv4-mapped traffic
/// on dual-stack hosts.
pub(crate) fn set_dual_stack(sock: RawSocket) -> io::Result<()> {
  let off: libc::c_int = 0;
  syscall!(setsockopt(
    sock,
    libc::IPPROTO_IPV6,
    libc::IPV6_V6ONLY,
    (&off as *const libc::c_int).cast(),
    mem::size_of::<libc::c_int>() as libc::socklen_t,
  ))
  .map(|_| ())
}

pub(crate) fn bind(sock: RawSocket, addr: &RawAddress) -> io::Result<()> {
  syscall!(bind(sock, addr.sockaddr_ptr(), addr.length as libc::socklen_t))
    .map(|_| ())
}

/// `getsockname`, treating `out.length` as capacity in, actual size out.
pub(crate) fn local_addr(
  sock: RawSocket,
  out: &mut RawAddress,
) -> io::Result<()> {
  let mut len = out.length as libc::socklen_t;
  syscall!(getsockname(sock, out.sockaddr_mut_ptr(), &mut len))?;
  out.length = len as i32;
  Ok(())
}

pub(crate) fn set_nonblocking(sock: RawSocket) -> io::Result<()> {
  let flags = syscall!(fcntl(sock, libc::F_GETFL, 0))?;
  syscall!(fcntl(sock, libc::F_SETFL, flags | libc::O_NONBLOCK)).map(|_| ())
}

pub(crate) fn set_send_buffer_size(
  sock: RawSocket,
  size: i32,
) -> io::Result<()> {
  set_buffer_size(sock, libc::SO_SNDBUF, size)
}

pub(crate) fn set_receive_buffer_size(
  sock: RawSocket,
  size: i32,
) -> io::Result<()> {
  set_buffer_size(sock, libc::SO_RCVBUF, size)
}

fn set_buffer_size(
  sock: RawSocket,
  option: libc::c_int,
  size: libc::c_int,
) -> io::Result<()> {
  syscall!(setsockopt(
    sock,
    libc::SOL_SOCKET,
    option,
    (&size as *const libc::c_int).cast(),
    mem::size_of::<libc::c_int>() as libc::socklen_t,
  ))
  .map(|_| ())
}

/// ICMP-triggered resets on a connectionless socket are a Winsock notion;
/// defined as a successful no-op here.
pub(crate) fn set_connection_reset(
  _sock: RawSocket,
  _enabled: bool,
) -> io::Result<()> {
  Ok(())
}

pub(crate) fn send_to(
  sock: RawSocket,
  bufs: &[IoSlice<'_>],
  remote: &RawAddress,
) -> io::Result<usize> {
  // SAFETY: `msghdr` is a plain C struct for which all-zero bytes are valid.
  let mut msg: libc::msghdr = unsafe { mem::zeroed() };
  msg.msg_name = remote.sockaddr_ptr() as *mut libc::c_void;
  msg.msg_namelen = remote.length as libc::socklen_t;
  // `IoSlice` is ABI-compatible with `iovec`, so the slice is handed to the
  // kernel as-is; the buffers are only borrowed for this call.
  msg.msg_iov = bufs.as_ptr() as *mut libc::iovec;
  msg.msg_iovlen = bufs.len() as _;

  syscall!(sendmsg(sock, &msg, 0)).map(|sent| sent as usize)
}

/// Gathers the next datagram into `bufs` and records the sender in
/// `remote`, overwriting its `length` with the actual address size.
pub(crate) fn recv_from(
  sock: RawSocket,
  bufs: &mut [IoSliceMut<'_>],
  remote: &mut RawAddress,
) -> io::Result<usize> {
  // SAFETY: `msghdr` is a plain C struct for which all-zero bytes are valid.
  let mut msg: libc::msghdr = unsafe { mem::zeroed() };
  msg.msg_name = remote.sockaddr_mut_ptr().cast();
  msg.msg_namelen = remote.length as libc::socklen_t;
  msg.msg_iov = bufs.as_mut_ptr() as *mut libc::iovec;
  msg.msg_iovlen = bufs.len() as _;

  let received = syscall!(recvmsg(sock, &mut msg, 0))?;
  remote.length = msg.msg_namelen as i32;
  Ok(received as usize)
}

pub(crate) fn close(sock: RawSocket) -> io::Result<()> {
  syscall!(close(sock)).map(|_| ())
}
