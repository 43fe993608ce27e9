pub mod image_io;

pub use image_io::{frame_path, load_sequence, save_video_frame, OutputFormat};
