pub mod client;
pub mod image;
pub mod types;

pub use image::GeminiImageClient;
