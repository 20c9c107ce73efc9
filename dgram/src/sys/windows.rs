use std::{
  ffi::c_void,
  io::{self, IoSlice, IoSliceMut},
  mem, ptr,
};

use windows_sys::Win32::Networking::WinSock::{
  AF_INET, AF_INET6, FIONBIO, INVALID_SOCKET, IPPROTO_IPV6, IPPROTO_UDP,
  IPV6_V6ONLY, SIO_UDP_CONNRESET, SO_RCVBUF, SO_SNDBUF, SOCK_DGRAM, SOCKET,
  SOCKET_ERROR, SOL_SOCKET, WSABUF, WSACleanup, WSADATA, WSAGetLastError,
  WSAIoctl, WSARecvFrom, WSASendTo, WSAStartup, bind as c_bind, closesocket,
  getsockname, ioctlsocket, setsockopt, socket as c_socket,
};

use crate::addr::RawAddress;

/// OS-owned socket handle. The shim never wraps it in state of its own.
pub type RawSocket = SOCKET;

fn last_error() -> io::Error {
  // SAFETY: trivially safe FFI call.
  io::Error::from_raw_os_error(unsafe { WSAGetLastError() })
}

/// One-time Winsock startup, requesting version 2.2.
pub(crate) fn startup() -> io::Result<()> {
  // SAFETY: WSADATA is a plain output struct.
  let mut data: WSADATA = unsafe { mem::zeroed() };
  // 0x0202 == MAKEWORD(2, 2)
  let ret = unsafe { WSAStartup(0x0202, &mut data) };
  if ret != 0 {
    return Err(io::Error::from_raw_os_error(ret));
  }
  Ok(())
}

pub(crate) fn cleanup() {
  // SAFETY: balanced against a successful startup by the lifecycle counter.
  unsafe { WSACleanup() };
}

pub(crate) fn socket(ipv6: bool) -> io::Result<RawSocket> {
  let family = if ipv6 { AF_INET6 } else { AF_INET };
  // SAFETY: trivially safe FFI call.
  let sock =
    unsafe { c_socket(family as i32, SOCK_DGRAM as i32, IPPROTO_UDP as i32) };
  if sock == INVALID_SOCKET {
    return Err(last_error());
  }
  Ok(sock)
}

/// Clears `IPV6_V6ONLY` so an IPv6 socket also accepts IPv4-mapped traffic
/// on dual-stack hosts.
pub(crate) fn set_dual_stack(sock: RawSocket) -> io::Result<()> {
  let off: i32 = 0;
  // SAFETY: the option value lives on the stack for the whole call.
  let ret = unsafe {
    setsockopt(
      sock,
      IPPROTO_IPV6 as i32,
      IPV6_V6ONLY as i32,
      (&off as *const i32).cast(),
      mem::size_of::<i32>() as i32,
    )
  };
  if ret == SOCKET_ERROR {
    return Err(last_error());
  }
  Ok(())
}

pub(crate) fn bind(sock: RawSocket, addr: &RawAddress) -> io::Result<()> {
  // SAFETY: `addr` is fully populated and `length` matches its variant.
  let ret = unsafe { c_bind(sock, addr.sockaddr_ptr(), addr.length) };
  if ret == SOCKET_ERROR {
    return Err(last_error());
  }
  Ok(())
}

/// `getsockname`, treating `out.length` as capacity in, actual size out.
pub(crate) fn local_addr(
  sock: RawSocket,
  out: &mut RawAddress,
) -> io::Result<()> {
  // SAFETY: `out` owns both the storage and the in/out length field.
  let ret =
    unsafe { getsockname(sock, out.sockaddr_mut_ptr(), &mut out.length) };
  if ret == SOCKET_ERROR {
    return Err(last_error());
  }
  Ok(())
}

pub(crate) fn set_nonblocking(sock: RawSocket) -> io::Result<()> {
  let mut arg: u32 = 1;
  // SAFETY: trivially safe FFI call.
  let ret = unsafe { ioctlsocket(sock, FIONBIO, &mut arg) };
  if ret == SOCKET_ERROR {
    return Err(last_error());
  }
  Ok(())
}

pub(crate) fn set_send_buffer_size(
  sock: RawSocket,
  size: i32,
) -> io::Result<()> {
  set_buffer_size(sock, SO_SNDBUF as i32, size)
}

pub(crate) fn set_receive_buffer_size(
  sock: RawSocket,
  size: i32,
) -> io::Result<()> {
  set_buffer_size(sock, SO_RCVBUF as i32, size)
}

fn set_buffer_size(sock: RawSocket, option: i32, size: i32) -> io::Result<()> {
  // SAFETY: the option value lives on the stack for the whole call.
  let ret = unsafe {
    setsockopt(
      sock,
      SOL_SOCKET as i32,
      option,
      (&size as *const i32).cast(),
      mem::size_of::<i32>() as i32,
    )
  };
  if ret == SOCKET_ERROR {
    return Err(last_error());
  }
  Ok(())
}

/// `SIO_UDP_CONNRESET`: controls whether an ICMP port-unreachable from an
/// earlier send surfaces as a connection-reset error on the receive path.
pub(crate) fn set_connection_reset(
  sock: RawSocket,
  enabled: bool,
) -> io::Result<()> {
  let mut value: u32 = enabled as u32;
  let mut bytes_returned: u32 = 0;
  // SAFETY: in-buffer and byte counter live on the stack for the call; no
  // out-buffer or overlapped completion is used.
  let ret = unsafe {
    WSAIoctl(
      sock,
      SIO_UDP_CONNRESET,
      (&mut value as *mut u32).cast::<c_void>(),
      mem::size_of::<u32>() as u32,
      ptr::null_mut(),
      0,
      &mut bytes_returned,
      ptr::null_mut(),
      None,
    )
  };
  if ret == SOCKET_ERROR {
    return Err(last_error());
  }
  Ok(())
}

pub(crate) fn send_to(
  sock: RawSocket,
  bufs: &[IoSlice<'_>],
  remote: &RawAddress,
) -> io::Result<usize> {
  let mut sent: u32 = 0;
  // SAFETY: `IoSlice` is ABI-compatible with `WSABUF`; the buffers and the
  // address are only borrowed for the duration of this call.
  let ret = unsafe {
    WSASendTo(
      sock,
      bufs.as_ptr() as *const WSABUF,
      bufs.len() as u32,
      &mut sent,
      0,
      remote.sockaddr_ptr(),
      remote.length,
      ptr::null_mut(),
      None,
    )
  };
  if ret == SOCKET_ERROR {
    return Err(last_error());
  }
  Ok(sent as usize)
}

/// Gathers the next datagram into `bufs` and records the sender in
/// `remote`, overwriting its `length` with the actual address size.
pub(crate) fn recv_from(
  sock: RawSocket,
  bufs: &mut [IoSliceMut<'_>],
  remote: &mut RawAddress,
) -> io::Result<usize> {
  let mut received: u32 = 0;
  let mut flags: u32 = 0;
  // SAFETY: `IoSliceMut` is ABI-compatible with `WSABUF`; `remote` owns
  // both the storage and the in/out length field.
  let ret = unsafe {
    WSARecvFrom(
      sock,
      bufs.as_mut_ptr() as *const WSABUF,
      bufs.len() as u32,
      &mut received,
      &mut flags,
      remote.sockaddr_mut_ptr(),
      &mut remote.length,
      ptr::null_mut(),
      None,
    )
  };
  if ret == SOCKET_ERROR {
    return Err(last_error());
  }
  Ok(received as usize)
}

pub(crate) fn close(sock: RawSocket) -> io::Result<()> {
  // SAFETY: trivially safe FFI call.
  let ret = unsafe { closesocket(sock) };
  if ret == SOCKET_ERROR {
    return Err(last_error());
  }
  Ok(())
}
