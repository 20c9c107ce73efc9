//! Process-wide init/terminate reference count gating the one-time
//! network-stack startup that Winsock requires.

use std::sync::Mutex;

use crate::sys;

static USERS: Mutex<u32> = Mutex::new(0);

/// Increments the process-wide user count; the 0 -> 1 transition performs
/// the one-time OS network-stack startup (a no-op outside Windows).
///
/// Safe to call concurrently: the counter is guarded by a single lock, so
/// racing init/terminate pairs can never run the startup or teardown work
/// twice.
pub fn initialize() {
  let mut users = USERS.lock().unwrap_or_else(|e| e.into_inner());
  if *users == 0 {
    // The boundary has no failure path here; a failed startup surfaces on
    // the first socket operation instead.
    let _ = sys::startup();
  }
  *users += 1;
}

/// Decrements the user count, never below zero; the 1 -> 0 transition tears
/// the network stack back down.
pub fn terminate() {
  let mut users = USERS.lock().unwrap_or_else(|e| e.into_inner());
  if *users == 0 {
    return;
  }
  *users -= 1;
  if *users == 0 {
    sys::cleanup();
  }
}
