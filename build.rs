use std::env;

fn main() {
    // Exposed to the CLI --version and the HTTP user agent
    let version = env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "0.0.0".to_string());
    println!("cargo:rustc-env=CAMPUS_ROUTE_VERSION={version}");

    println!("cargo:rerun-if-changed=Cargo.toml");
}
