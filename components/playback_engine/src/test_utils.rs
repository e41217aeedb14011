//! Audio fixtures for tests in this and dependent crates.

use std::path::{Path, PathBuf};

/// Writes a silent mono 16-bit WAV of `frames` samples at `sample_rate`.
///
/// Panics if the file can't be written; meant for tests only.
pub fn write_wav(dir: &Path, name: &str, sample_rate: u32, frames: u32) -> PathBuf {
    let path = dir.join(name);
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).expect("create wav fixture");
    for _ in 0..frames {
        writer.write_sample(0i16).expect("write wav sample");
    }
    writer.finalize().expect("finalize wav fixture");
    path
}
