use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

use playd_protocol::messages;
use symphonia::core::{
    codecs::{DecoderOptions, CODEC_TYPE_NULL},
    errors::Error as SymphoniaError,
    formats::{FormatOptions, FormatReader},
    io::MediaSourceStream,
    meta::MetadataOptions,
    probe::Hint,
};
use time_primitives::Micros;

use crate::error::AudioError;

/// What we learn about a file when opening it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackInfo {
    pub sample_rate: u32,
    pub audio_channels: u16,
    pub length: Micros,
}

/// Opens `path` and checks that it holds a decodable audio stream.
///
/// Every failure here is the file's fault, so all errors are
/// [`AudioError::File`].
pub fn probe(path: &Path) -> Result<TrackInfo, AudioError> {
    tracing::debug!("Probing file: {:?}", path);

    let file = File::open(path)
        .map_err(|e| AudioError::file(format!("Couldn't open {}: {}", path.display(), e)))?;

    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(extension);
    }

    let mss = MediaSourceStream::new(Box::new(file), Default::default());
    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| {
            tracing::debug!("Probe of {:?} failed: {}", path, e);
            AudioError::file(messages::DECODE_NOAUDIO)
        })?;
    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or_else(|| AudioError::file(messages::DECODE_NOSTREAM))?;
    if track.codec_params.codec == CODEC_TYPE_NULL {
        return Err(AudioError::file(messages::DECODE_NOCODEC));
    }
    let track_id = track.id;
    let params = track.codec_params.clone();

    symphonia::default::get_codecs()
        .make(&params, &DecoderOptions::default())
        .map_err(|e| {
            tracing::debug!("No decoder for {:?}: {}", path, e);
            AudioError::file(messages::DECODE_NOCODEC)
        })?;

    let sample_rate = params
        .sample_rate
        .filter(|rate| *rate > 0)
        .ok_or_else(|| AudioError::file(messages::DECODE_BADRATE))?;
    let audio_channels = params.channels.map(|c| c.count()).unwrap_or(2) as u16;

    // Containers that don't declare a frame count get their packets summed.
    let frames = match params.n_frames {
        Some(frames) => frames,
        None => count_frames(format.as_mut(), track_id)?,
    };

    Ok(TrackInfo {
        sample_rate,
        audio_channels,
        length: Micros::from_frames(frames, sample_rate),
    })
}

fn count_frames(format: &mut dyn FormatReader, track_id: u32) -> Result<u64, AudioError> {
    let mut frames = 0u64;
    loop {
        match format.next_packet() {
            Ok(packet) if packet.track_id() == track_id => {
                frames = frames.saturating_add(packet.dur);
            }
            Ok(_) => {}
            Err(SymphoniaError::IoError(e)) if e.kind() == ErrorKind::UnexpectedEof => {
                return Ok(frames);
            }
            Err(e) => {
                tracing::debug!("Packet scan failed: {}", e);
                return Err(AudioError::file(messages::DECODE_FAIL));
            }
        }
    }
}
