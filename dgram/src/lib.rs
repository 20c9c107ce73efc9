//! # dgram
//!
//! A thin, synchronous, cross-platform UDP transport shim.
//!
//! `dgram` exposes a small set of stateless socket operations (create and
//! bind, configure, vectored send/receive, address query, close) over the
//! raw OS handle, plus a process-wide init/terminate reference count for
//! the platforms whose network stack needs explicit startup. Behavioral
//! differences between the platform socket APIs (dual-stack binding,
//! non-blocking mode, connection-reset reporting) are absorbed behind one
//! uniform surface.
//!
//! The crate has two faces:
//!
//! - a safe Rust API ([`create_and_bind`], [`send_to`], [`recv_from`], ...)
//!   built on [`std::net::SocketAddr`] and [`std::io::IoSlice`];
//! - an ABI-flat C API in [`ffi`] (`dgram_*`), suitable for a `cdylib`
//!   loaded from a managed host via P/Invoke-style bindings.
//!
//! ## Example
//!
//! ```no_run
//! use std::io::{IoSlice, IoSliceMut};
//!
//! fn main() -> std::io::Result<()> {
//!   dgram::initialize();
//!
//!   let server = dgram::create_and_bind("127.0.0.1:0".parse().unwrap())?;
//!   let client = dgram::create_and_bind("0.0.0.0:0".parse().unwrap())?;
//!   let server_addr = dgram::local_addr(server)?;
//!
//!   dgram::send_to(client, &[IoSlice::new(b"ping")], server_addr)?;
//!
//!   let mut buf = [0u8; 64];
//!   let (received, remote) =
//!     dgram::recv_from(server, &mut [IoSliceMut::new(&mut buf)])?;
//!   assert_eq!(&buf[..received], b"ping");
//!   assert_eq!(remote.port(), dgram::local_addr(client)?.port());
//!
//!   dgram::close(client)?;
//!   dgram::close(server)?;
//!   dgram::terminate();
//!   Ok(())
//! }
//! ```

#[cfg(unix)]
#[macro_use]
mod macros;

pub mod addr;
pub mod ffi;
mod lifecycle;
pub mod socket;
mod sys;

pub use addr::{RawAddress, RawAddressStorage};
pub use lifecycle::{initialize, terminate};
pub use socket::{
  close, create_and_bind, local_addr, recv_from, send_to,
  set_connection_reset, set_nonblocking, set_receive_buffer_size,
  set_send_buffer_size,
};
pub use sys::RawSocket;
