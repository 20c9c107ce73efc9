//! Platform divergence lives here: one implementation of the socket
//! capability surface per target OS, selected at build time. The operation
//! layer in [`crate::socket`] is written once against this module.

#[cfg(unix)]
mod unix;
#[cfg(unix)]
pub use unix::*;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use windows::*;
