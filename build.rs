// Build script for flutter_rust_bridge code generation
//
// Dart bindings are generated out of band with the CLI tool:
//   cargo install flutter_rust_bridge_codegen
//   flutter_rust_bridge_codegen generate
//
// Running codegen from build.rs interferes with plain cargo builds, so this
// script only tracks the API surface.

fn main() {
    println!("cargo:rerun-if-changed=src/api.rs");
    println!("cargo:rerun-if-changed=src/api/types.rs");
}
