//! # Voxel World Demo Entry Point
//!
//! Runs the library's `run()` demo: an observer walks across a generated world while
//! chunks stream in and out around it. Set `RUST_LOG=debug` to see every chunk being
//! generated and evicted.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release
//! ```

fn main() {
    voxel_world::run();
}
