#![allow(dead_code)]

pub mod synthetic_image;

/// Install a test logger once per binary.
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
