use std::{env, process::Command, str::from_utf8};

fn main() {
    let rustc = env::var("RUSTC").unwrap();
    let package_version = env::var("CARGO_PKG_VERSION").unwrap();

    let rustc_version = Command::new(rustc)
        .arg("--version")
        .output()
        .ok()
        .filter(|result| result.status.success())
        .expect("Failed to query rustc version");

    println!("cargo:rustc-env=TRISAT_VERSION={}", package_version);
    println!(
        "cargo:rustc-env=TRISAT_RUSTC_VERSION={}",
        from_utf8(rustc_version.stdout.as_slice()).unwrap()
    );
    println!(
        "cargo:rustc-env=TRISAT_PROFILE={}",
        env::var("PROFILE").unwrap()
    );
}
