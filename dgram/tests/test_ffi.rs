use dgram::{
  RawAddress,
  ffi::{
    DGRAM_SOCKET_EMPTY, DGRAM_SUCCESS, RawIoVec, dgram_close,
    dgram_create_and_bind, dgram_get_socket_address, dgram_initialize,
    dgram_recvmsg, dgram_sendmsg, dgram_set_connection_reset,
    dgram_set_nonblocking, dgram_set_receive_buffer_size,
    dgram_set_send_buffer_size, dgram_terminate,
  },
};

fn bind_loopback(errorcode: &mut i32) -> libc::intptr_t {
  let bind = RawAddress::from_socket_addr("127.0.0.1:0".parse().unwrap());
  let mut handle = DGRAM_SOCKET_EMPTY;
  assert_eq!(dgram_create_and_bind(&mut handle, &bind, errorcode), DGRAM_SUCCESS);
  handle
}

#[test]
fn test_ffi_scatter_roundtrip() {
  assert_eq!(dgram_initialize(), DGRAM_SUCCESS);
  let mut errorcode = 0;

  let server = bind_loopback(&mut errorcode);
  let client = bind_loopback(&mut errorcode);

  let mut server_addr = RawAddress::unspecified();
  assert_eq!(
    dgram_get_socket_address(server, &mut server_addr, &mut errorcode),
    DGRAM_SUCCESS
  );

  // Two-entry scatter send coalesces into one datagram on the wire.
  let mut head = *b"scatter ";
  let mut tail = *b"gather";
  let send_iov = [
    RawIoVec { length: head.len() as i32, data: head.as_mut_ptr() },
    RawIoVec { length: tail.len() as i32, data: tail.as_mut_ptr() },
  ];
  let sent = dgram_sendmsg(
    client,
    send_iov.as_ptr(),
    send_iov.len() as i32,
    &server_addr,
    &mut errorcode,
  );
  assert_eq!(sent, (head.len() + tail.len()) as i32);

  let mut buf = [0u8; 32];
  let recv_iov =
    RawIoVec { length: buf.len() as i32, data: buf.as_mut_ptr() };
  let mut remote = RawAddress::unspecified();
  let received =
    dgram_recvmsg(server, &recv_iov, 1, &mut remote, &mut errorcode);
  assert_eq!(received, sent);
  assert_eq!(&buf[..received as usize], b"scatter gather");

  let mut client_addr = RawAddress::unspecified();
  assert_eq!(
    dgram_get_socket_address(client, &mut client_addr, &mut errorcode),
    DGRAM_SUCCESS
  );
  assert_eq!(
    remote.to_socket_addr().unwrap().port(),
    client_addr.to_socket_addr().unwrap().port()
  );

  let mut client = client;
  let mut server = server;
  assert_eq!(dgram_close(&mut client, &mut errorcode), DGRAM_SUCCESS);
  assert_eq!(dgram_close(&mut server, &mut errorcode), DGRAM_SUCCESS);
  assert_eq!(dgram_terminate(), DGRAM_SUCCESS);
}

#[test]
fn test_ffi_config_and_would_block() {
  assert_eq!(dgram_initialize(), DGRAM_SUCCESS);
  let mut errorcode = 0;

  let mut sock = bind_loopback(&mut errorcode);

  assert_eq!(dgram_set_nonblocking(sock), DGRAM_SUCCESS);
  assert_eq!(dgram_set_send_buffer_size(sock, 64 * 1024), DGRAM_SUCCESS);
  assert_eq!(dgram_set_receive_buffer_size(sock, 64 * 1024), DGRAM_SUCCESS);
  assert_eq!(dgram_set_connection_reset(sock, 1), DGRAM_SUCCESS);
  assert_eq!(dgram_set_connection_reset(sock, 0), DGRAM_SUCCESS);

  // Empty queue on a non-blocking socket: -1 status, platform would-block
  // code in the out-parameter.
  let mut buf = [0u8; 16];
  let recv_iov =
    RawIoVec { length: buf.len() as i32, data: buf.as_mut_ptr() };
  let mut remote = RawAddress::unspecified();
  let received = dgram_recvmsg(sock, &recv_iov, 1, &mut remote, &mut errorcode);
  assert_eq!(received, -1);
  #[cfg(unix)]
  assert!(errorcode == libc::EAGAIN || errorcode == libc::EWOULDBLOCK);

  assert_eq!(dgram_close(&mut sock, &mut errorcode), DGRAM_SUCCESS);
  assert_eq!(dgram_terminate(), DGRAM_SUCCESS);
}
