//! Audio I/O helpers

pub mod audio_decoder;
pub mod resample;

pub use audio_decoder::{decode_audio_file, DecodedAudio};
pub use resample::resample_mono;
