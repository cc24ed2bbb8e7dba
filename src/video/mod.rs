pub mod capture;
pub mod clock;
pub mod controller;
pub mod ffmpeg;


pub use capture::*;
pub use clock::*;
pub use controller::*;
pub use ffmpeg::*;
