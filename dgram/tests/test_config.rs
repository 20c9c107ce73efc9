#[test]
fn test_config_calls_are_idempotent() {
  dgram::initialize();

  let sock = dgram::create_and_bind("127.0.0.1:0".parse().unwrap()).unwrap();

  for _ in 0..3 {
    dgram::set_nonblocking(sock).unwrap();
    dgram::set_connection_reset(sock, false).unwrap();
    dgram::set_connection_reset(sock, true).unwrap();
  }

  dgram::close(sock).unwrap();
  dgram::terminate();
}

#[test]
fn test_buffer_sizes_accepted_best_effort() {
  dgram::initialize();

  let sock = dgram::create_and_bind("127.0.0.1:0".parse().unwrap()).unwrap();

  // The OS may clamp or round these, but the calls themselves succeed.
  dgram::set_send_buffer_size(sock, 256 * 1024).unwrap();
  dgram::set_receive_buffer_size(sock, 256 * 1024).unwrap();
  dgram::set_send_buffer_size(sock, 4096).unwrap();
  dgram::set_receive_buffer_size(sock, 4096).unwrap();

  dgram::close(sock).unwrap();
  dgram::terminate();
}
