//! Smoke test driving the C surface end to end, the way a host runtime
//! would: init, bind a server and a client, exchange one datagram, close
//! both, terminate. Exits non-zero on the first failed step.

use std::{mem, process};

use dgram::{
  RawAddress,
  ffi::{
    DGRAM_SOCKET_EMPTY, DGRAM_SUCCESS, RawIoVec, dgram_close,
    dgram_create_and_bind, dgram_get_socket_address, dgram_initialize,
    dgram_recvmsg, dgram_sendmsg, dgram_terminate,
  },
};

fn check(step: &str, ok: bool, errorcode: i32) {
  if !ok {
    eprintln!("{step} failed (errorcode {errorcode})");
    process::exit(1);
  }
}

fn main() {
  println!("sizeof(RawAddress) == {}", mem::size_of::<RawAddress>());

  check("initialize", dgram_initialize() == DGRAM_SUCCESS, 0);

  let mut errorcode = 0;

  let server_bind = RawAddress::from_socket_addr("127.0.0.1:0".parse().unwrap());
  let mut server = DGRAM_SOCKET_EMPTY;
  let ret = dgram_create_and_bind(&mut server, &server_bind, &mut errorcode);
  check("server bind", ret == DGRAM_SUCCESS, errorcode);

  let client_bind = RawAddress::from_socket_addr("0.0.0.0:0".parse().unwrap());
  let mut client = DGRAM_SOCKET_EMPTY;
  let ret = dgram_create_and_bind(&mut client, &client_bind, &mut errorcode);
  check("client bind", ret == DGRAM_SUCCESS, errorcode);

  let mut server_addr = RawAddress::unspecified();
  let ret = dgram_get_socket_address(server, &mut server_addr, &mut errorcode);
  check("server address query", ret == DGRAM_SUCCESS, errorcode);

  let mut payload = *b"Hello Networked World!\0";
  let iov = RawIoVec {
    length: payload.len() as i32,
    data: payload.as_mut_ptr(),
  };
  let sent = dgram_sendmsg(client, &iov, 1, &server_addr, &mut errorcode);
  check("send", sent == payload.len() as i32, errorcode);

  let mut received_payload = [0u8; 64];
  let recv_iov = RawIoVec {
    length: received_payload.len() as i32,
    data: received_payload.as_mut_ptr(),
  };
  let mut remote = RawAddress::unspecified();
  let received = dgram_recvmsg(server, &recv_iov, 1, &mut remote, &mut errorcode);
  check("receive", received == sent, errorcode);
  check(
    "payload comparison",
    received_payload[..received as usize] == payload[..],
    0,
  );

  let ret = dgram_close(&mut client, &mut errorcode);
  check("client close", ret == DGRAM_SUCCESS, errorcode);
  check("client handle cleared", client == DGRAM_SOCKET_EMPTY, 0);

  let ret = dgram_close(&mut server, &mut errorcode);
  check("server close", ret == DGRAM_SUCCESS, errorcode);
  check("server handle cleared", server == DGRAM_SOCKET_EMPTY, 0);

  check("terminate", dgram_terminate() == DGRAM_SUCCESS, 0);

  println!("all passed!");
}
