//! Address representation at the shim boundary.
//!
//! Internally addresses are [`std::net::SocketAddr`], which carries its own
//! family discriminant. The managed caller instead hands us a fixed-size
//! union of the OS-native sockaddr structures together with an explicit
//! `length` field; [`RawAddress`] mirrors that layout byte for byte so the
//! structure can be passed straight to the OS calls on either platform.

use std::{
  io, mem,
  net::{Ipv4Addr, Ipv6Addr, SocketAddr, SocketAddrV4, SocketAddrV6},
};

#[cfg(unix)]
use libc::{AF_INET, AF_INET6, sockaddr, sockaddr_in, sockaddr_in6};
#[cfg(windows)]
use windows_sys::Win32::Networking::WinSock::{
  AF_INET, AF_INET6, SOCKADDR as sockaddr, SOCKADDR_IN as sockaddr_in,
  SOCKADDR_IN6 as sockaddr_in6,
};

#[cfg(unix)]
const AFNOSUPPORT: i32 = libc::EAFNOSUPPORT;
#[cfg(windows)]
const AFNOSUPPORT: i32 =
  windows_sys::Win32::Networking::WinSock::WSAEAFNOSUPPORT;

/// Fixed-size storage able to hold a socket address of either family.
#[repr(C)]
#[derive(Clone, Copy)]
pub union RawAddressStorage {
  pub base: sockaddr,
  pub v4: sockaddr_in,
  pub v6: sockaddr_in6,
}

/// The address structure crossing the ABI boundary.
///
/// `length` records the byte size of the variant that was last written and
/// doubles as an input parameter: receive and address-query operations read
/// it as the available capacity and overwrite it with the actual size. An
/// operation either fully populates the active variant or fails without
/// touching it.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct RawAddress {
  pub storage: RawAddressStorage,
  pub length: i32,
}

impl RawAddress {
  /// Byte capacity of the storage union.
  pub const CAPACITY: i32 = mem::size_of::<RawAddressStorage>() as i32;

  /// An all-zero address whose `length` is pre-set to the full storage
  /// capacity, ready to be filled in by a receive or address-query call.
  pub fn unspecified() -> Self {
    // SAFETY: the sockaddr variants are plain C structs for which all-zero
    // bytes are a valid (if meaningless) value.
    RawAddress { storage: unsafe { mem::zeroed() }, length: Self::CAPACITY }
  }

  /// Encodes `addr` into its OS-native form, setting `length` to the size
  /// of the active variant.
  pub fn from_socket_addr(addr: SocketAddr) -> Self {
    let mut raw = Self::unspecified();
    match addr {
      SocketAddr::V4(v4) => {
        raw.storage.v4 = encode_v4(v4);
        raw.length = mem::size_of::<sockaddr_in>() as i32;
      }
      SocketAddr::V6(v6) => {
        raw.storage.v6 = encode_v6(v6);
        raw.length = mem::size_of::<sockaddr_in6>() as i32;
      }
    }
    raw
  }

  /// Decodes the active variant, failing with the platform's
  /// address-family-not-supported code if the family tag is neither IPv4
  /// nor IPv6.
  pub fn to_socket_addr(&self) -> io::Result<SocketAddr> {
    if self.family() == AF_INET as u16 {
      // SAFETY: the family tag says the v4 variant is active.
      let v4 = unsafe { self.storage.v4 };
      let ip = Ipv4Addr::from(u32::from_be(v4_addr_bits(&v4)));
      let port = u16::from_be(v4.sin_port);
      Ok(SocketAddr::from(SocketAddrV4::new(ip, port)))
    } else if self.family() == AF_INET6 as u16 {
      // SAFETY: the family tag says the v6 variant is active.
      let v6 = unsafe { self.storage.v6 };
      let ip = Ipv6Addr::from(v6_addr_octets(&v6));
      let port = u16::from_be(v6.sin6_port);
      Ok(SocketAddr::from(SocketAddrV6::new(
        ip,
        port,
        v6.sin6_flowinfo,
        v6_scope_id(&v6),
      )))
    } else {
      Err(io::Error::from_raw_os_error(AFNOSUPPORT))
    }
  }

  /// Address family tag of the active variant.
  pub fn family(&self) -> u16 {
    // SAFETY: every variant of the union starts with the family field, and
    // the storage is always at least zero-initialized.
    unsafe { self.storage.base.sa_family as u16 }
  }

  pub fn is_ipv6(&self) -> bool {
    self.family() == AF_INET6 as u16
  }

  pub(crate) fn sockaddr_ptr(&self) -> *const sockaddr {
    (&self.storage as *const RawAddressStorage).cast()
  }

  pub(crate) fn sockaddr_mut_ptr(&mut self) -> *mut sockaddr {
    (&mut self.storage as *mut RawAddressStorage).cast()
  }
}

#[cfg(unix)]
fn encode_v4(addr: SocketAddrV4) -> sockaddr_in {
  // SAFETY: plain C struct, all-zero bytes are a valid value.
  let mut out: sockaddr_in = unsafe { mem::zeroed() };

  #[cfg(bsd)]
  {
    out.sin_len = mem::size_of::<sockaddr_in>() as u8;
  }
  out.sin_family = AF_INET as libc::sa_family_t;
  out.sin_port = addr.port().to_be();
  out.sin_addr = libc::in_addr { s_addr: u32::from(*addr.ip()).to_be() };

  out
}

#[cfg(windows)]
fn encode_v4(addr: SocketAddrV4) -> sockaddr_in {
  use windows_sys::Win32::Networking::WinSock::{IN_ADDR, IN_ADDR_0};

  // SAFETY: plain C struct, all-zero bytes are a valid value.
  let mut out: sockaddr_in = unsafe { mem::zeroed() };

  out.sin_family = AF_INET;
  out.sin_port = addr.port().to_be();
  out.sin_addr =
    IN_ADDR { S_un: IN_ADDR_0 { S_addr: u32::from(*addr.ip()).to_be() } };

  out
}

#[cfg(unix)]
fn encode_v6(addr: SocketAddrV6) -> sockaddr_in6 {
  // SAFETY: plain C struct, all-zero bytes are a valid value.
  let mut out: sockaddr_in6 = unsafe { mem::zeroed() };

  #[cfg(bsd)]
  {
    out.sin6_len = mem::size_of::<sockaddr_in6>() as u8;
  }
  out.sin6_family = AF_INET6 as libc::sa_family_t;
  out.sin6_port = addr.port().to_be();
  out.sin6_flowinfo = addr.flowinfo();
  out.sin6_addr = libc::in6_addr { s6_addr: addr.ip().octets() };
  out.sin6_scope_id = addr.scope_id();

  out
}

#[cfg(windows)]
fn encode_v6(addr: SocketAddrV6) -> sockaddr_in6 {
  use windows_sys::Win32::Networking::WinSock::{
    IN6_ADDR, IN6_ADDR_0, SOCKADDR_IN6_0,
  };

  // SAFETY: plain C struct, all-zero bytes are a valid value.
  let mut out: sockaddr_in6 = unsafe { mem::zeroed() };

  out.sin6_family = AF_INET6;
  out.sin6_port = addr.port().to_be();
  out.sin6_flowinfo = addr.flowinfo();
  out.sin6_addr = IN6_ADDR { u: IN6_ADDR_0 { Byte: addr.ip().octets() } };
  out.Anonymous = SOCKADDR_IN6_0 { sin6_scope_id: addr.scope_id() };

  out
}

#[cfg(unix)]
fn v4_addr_bits(sa: &sockaddr_in) -> u32 {
  sa.sin_addr.s_addr
}

#[cfg(windows)]
fn v4_addr_bits(sa: &sockaddr_in) -> u32 {
  // SAFETY: `S_addr` spans the whole 4-byte address union.
  unsafe { sa.sin_addr.S_un.S_addr }
}

#[cfg(unix)]
fn v6_addr_octets(sa: &sockaddr_in6) -> [u8; 16] {
  sa.sin6_addr.s6_addr
}

#[cfg(windows)]
fn v6_addr_octets(sa: &sockaddr_in6) -> [u8; 16] {
  // SAFETY: `Byte` spans the whole 16-byte address union.
  unsafe { sa.sin6_addr.u.Byte }
}

#[cfg(unix)]
fn v6_scope_id(sa: &sockaddr_in6) -> u32 {
  sa.sin6_scope_id
}

#[cfg(windows)]
fn v6_scope_id(sa: &sockaddr_in6) -> u32 {
  // SAFETY: `sin6_scope_id` spans the whole 4-byte scope union.
  unsafe { sa.Anonymous.sin6_scope_id }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn v4_roundtrip() {
    let addr: SocketAddr = "192.0.2.7:4242".parse().unwrap();
    let raw = RawAddress::from_socket_addr(addr);

    assert_eq!(raw.length as usize, mem::size_of::<sockaddr_in>());
    assert!(!raw.is_ipv6());
    assert_eq!(raw.to_socket_addr().unwrap(), addr);
  }

  #[test]
  fn v6_roundtrip() {
    let addr: SocketAddr = "[2001:db8::1]:9000".parse().unwrap();
    let raw = RawAddress::from_socket_addr(addr);

    assert_eq!(raw.length as usize, mem::size_of::<sockaddr_in6>());
    assert!(raw.is_ipv6());
    assert_eq!(raw.to_socket_addr().unwrap(), addr);
  }

  #[test]
  fn unspecified_has_full_capacity_and_no_family() {
    let raw = RawAddress::unspecified();

    assert_eq!(raw.length, RawAddress::CAPACITY);
    let err = raw.to_socket_addr().unwrap_err();
    assert_eq!(err.raw_os_error(), Some(AFNOSUPPORT));
  }

  #[test]
  fn layout_matches_boundary_contract() {
    // The union sits at offset 0 so the whole structure can be cast to a
    // sockaddr pointer, with the explicit length trailing it.
    assert_eq!(mem::offset_of!(RawAddress, storage), 0);
    assert!(
      mem::size_of::<RawAddressStorage>() >= mem::size_of::<sockaddr_in6>()
    );
  }
}
