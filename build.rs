fn main() {
    let version = env!("CARGO_PKG_VERSION").to_string();

    println!("cargo:rustc-env=APP_VERSION={}", version);
    println!("cargo:rerun-if-changed=build.rs");
}
