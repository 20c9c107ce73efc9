use std::{
  io::{IoSlice, IoSliceMut},
  net::SocketAddr,
};

use proptest::{
  prelude::any,
  prop_assert_eq,
  test_runner::{Config, TestCaseError, TestRunner},
};

fn loopback_pair() -> (dgram::RawSocket, dgram::RawSocket, SocketAddr) {
  let server = dgram::create_and_bind("127.0.0.1:0".parse().unwrap()).unwrap();
  let client = dgram::create_and_bind("127.0.0.1:0".parse().unwrap()).unwrap();
  let server_addr = dgram::local_addr(server).unwrap();
  (server, client, server_addr)
}

#[test]
fn test_single_buffer_roundtrip() {
  dgram::initialize();
  let (server, client, server_addr) = loopback_pair();

  let payload = b"Hello Networked World!";
  let sent =
    dgram::send_to(client, &[IoSlice::new(payload)], server_addr).unwrap();
  assert_eq!(sent, payload.len());

  let mut buf = [0u8; 64];
  let (received, remote) =
    dgram::recv_from(server, &mut [IoSliceMut::new(&mut buf)]).unwrap();
  assert_eq!(&buf[..received], payload);
  assert_eq!(remote.port(), dgram::local_addr(client).unwrap().port());

  dgram::close(client).unwrap();
  dgram::close(server).unwrap();
  dgram::terminate();
}

#[test]
fn test_scatter_send_gather_receive() {
  dgram::initialize();
  let (server, client, server_addr) = loopback_pair();

  // A 3+19 scatter send arrives as one 22-byte datagram.
  let head = b"Hel";
  let tail = b"lo Networked World!";
  let sent = dgram::send_to(
    client,
    &[IoSlice::new(head), IoSlice::new(tail)],
    server_addr,
  )
  .unwrap();
  assert_eq!(sent, head.len() + tail.len());

  // Gather into a 22+0 split: the second buffer stays untouched.
  let mut first = [0u8; 22];
  let mut second = [0u8; 0];
  let (received, _) = dgram::recv_from(
    server,
    &mut [IoSliceMut::new(&mut first), IoSliceMut::new(&mut second)],
  )
  .unwrap();
  assert_eq!(received, 22);
  assert_eq!(&first[..], b"Hello Networked World!");

  dgram::close(client).unwrap();
  dgram::close(server).unwrap();
  dgram::terminate();
}

#[test]
fn test_roundtrip_arbitrary_partitions() {
  dgram::initialize();
  let (server, client, server_addr) = loopback_pair();

  let mut runner = TestRunner::new(Config { cases: 64, ..Config::default() });

  runner
    .run(&(1usize..=1200, any::<u64>()), |(len, seed)| {
      // Deterministic per-case payload and split points.
      let mut rng = fastrand::Rng::with_seed(seed);
      let payload: Vec<u8> = (0..len).map(|_| rng.u8(..)).collect();
      let cut = rng.usize(0..=len);

      let (head, tail) = payload.split_at(cut);
      let sent = dgram::send_to(
        client,
        &[IoSlice::new(head), IoSlice::new(tail)],
        server_addr,
      )
      .map_err(|e| TestCaseError::fail(e.to_string()))?;
      prop_assert_eq!(sent, len);

      let recv_cut = rng.usize(0..=len);
      let mut first = vec![0u8; recv_cut];
      let mut second = vec![0u8; len - recv_cut];
      let (received, _) = dgram::recv_from(
        server,
        &mut [IoSliceMut::new(&mut first), IoSliceMut::new(&mut second)],
      )
      .map_err(|e| TestCaseError::fail(e.to_string()))?;
      prop_assert_eq!(received, len);

      first.extend_from_slice(&second);
      prop_assert_eq!(first, payload);
      Ok(())
    })
    .unwrap();

  dgram::close(client).unwrap();
  dgram::close(server).unwrap();
  dgram::terminate();
}
