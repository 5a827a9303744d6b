//! Build script for locsvc-firmware
//!
//! embassy-stm32 provides memory.x (`memory-x` feature); this only adds the
//! cortex-m-rt and defmt linker scripts.

fn main() {
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    println!("cargo:rerun-if-changed=build.rs");
}
