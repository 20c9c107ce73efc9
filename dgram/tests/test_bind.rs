use std::net::SocketAddr;

#[test]
fn test_bind_ipv4_ephemeral_port() {
  dgram::initialize();

  let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
  let sock = dgram::create_and_bind(addr).unwrap();

  let bound = dgram::local_addr(sock).unwrap();
  assert!(!bound.is_ipv6());
  assert_ne!(bound.port(), 0, "port 0 must be replaced by a real port");

  dgram::close(sock).unwrap();
  dgram::terminate();
}

#[test]
fn test_bind_ipv6_loopback() {
  dgram::initialize();

  let addr: SocketAddr = "[::1]:0".parse().unwrap();
  // Not every runner has IPv6 configured.
  let Ok(sock) = dgram::create_and_bind(addr) else {
    dgram::terminate();
    return;
  };

  let bound = dgram::local_addr(sock).unwrap();
  assert!(bound.is_ipv6());
  assert_ne!(bound.port(), 0);

  dgram::close(sock).unwrap();
  dgram::terminate();
}

#[test]
fn test_bind_conflicting_port_fails_with_os_code() {
  dgram::initialize();

  let first = dgram::create_and_bind("127.0.0.1:0".parse().unwrap()).unwrap();
  let taken = dgram::local_addr(first).unwrap();

  let err = dgram::create_and_bind(taken).unwrap_err();
  assert!(err.raw_os_error().is_some(), "expected a raw OS error code");

  dgram::close(first).unwrap();
  dgram::terminate();
}
