//! Build script for the Grove node firmware
//!
//! Puts the project directory on the linker search path so a board-specific
//! `memory.x` there overrides the one embassy-stm32 generates.

fn main() {
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");

    if let Ok(dir) = std::env::var("CARGO_MANIFEST_DIR") {
        println!("cargo:rustc-link-search={dir}");
    }
}
