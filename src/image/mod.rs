//! Image views, owned buffers, sampling and file I/O.

pub mod f32;
pub mod i32;
pub mod io;
pub mod sample;
pub mod traits;
pub mod u8;

pub use self::f32::ImageF32;
pub use self::i32::ImageI32;
pub use self::sample::ImageSampler;
pub use self::traits::{ImageView, Rows};
pub use self::u8::ImageU8;
