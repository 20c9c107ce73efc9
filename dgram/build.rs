fn main() {
  cfg_aliases::cfg_aliases! {
      linux: { target_os = "linux" },
      apple: { target_vendor = "apple" },
      // Platforms whose sockaddr structures carry a length prefix.
      bsd: { any(
        target_vendor = "apple",
        target_os = "freebsd",
        target_os = "openbsd",
        target_os = "netbsd",
        target_os = "dragonfly"
      ) }
  }

  #[cfg(feature = "cheader")]
  {
    let bindings = cbindgen::generate(".").unwrap();

    std::fs::create_dir_all("./include").unwrap();

    let file = std::fs::OpenOptions::new()
      .create(true)
      .write(true)
      .open("./include/dgram.h")
      .unwrap();

    bindings.write(file);
  }
}
