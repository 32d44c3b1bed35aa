use std::collections::HashSet;
use std::sync::LazyLock;

use garde::{Unvalidated, Valid, Validate};
use num::rational::Ratio;
use serde::{Deserialize, Serialize};
use snafu::{ensure, Snafu};

#[cfg(test)]
mod tests;

/// Exact frame rate of the 525-line, 60 field (NTSC) system.
static NTSC_FRAME_RATE: LazyLock<Ratio<u32>> = LazyLock::new(|| Ratio::new(30_000, 1_001));
/// Exact frame rate of the 625-line, 50 field (PAL/SECAM) system.
static PAL_FRAME_RATE: LazyLock<Ratio<u32>> = LazyLock::new(|| Ratio::from(25));

static VALID_AUDIO_SAMPLE_RATES: LazyLock<HashSet<u32>> =
    LazyLock::new(|| HashSet::from([32_000, 44_100, 48_000]));

/// Identifies which broadcast television system a DV file's video was recorded for.
///
/// This determines a number of fixed, standards-mandated constants used elsewhere in this crate,
/// such as the number of DIF sequences per channel.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum System {
    /// 525-line, 59.94 Hz system, commonly called NTSC.
    Sys525_60,

    /// 625-line, 50 Hz system, commonly called PAL or SECAM.
    Sys625_50,
}

impl System {
    /// Number of DIF sequences recorded per channel, per frame.
    ///
    /// This is fixed by the broadcast system and does not vary with the number of channels
    /// recorded in the file.
    fn dif_sequence_count(self) -> u8 {
        match self {
            System::Sys525_60 => 10,
            System::Sys625_50 => 12,
        }
    }

    /// Size, in bytes, of a single channel's worth of DIF blocks within a frame.
    fn base_frame_size(self) -> u32 {
        u32::from(self.dif_sequence_count()) * 150 * 80
    }
}

/// Top-level metadata about a DV file.
///
/// This information is supplied by an external probe - for example, one that inspects a capture
/// container - and is used throughout this crate to interpret and validate frame data correctly.
/// This crate has no opinion on how the caller obtains it.
#[derive(Debug, Eq, PartialEq, Clone, Copy, Validate, Serialize, Deserialize)]
pub struct Info {
    /// Size of the DV file in bytes.
    #[garde(skip)]
    pub file_size: u64,

    /// Frame rate of the video stream.
    #[garde(custom(check_video_frame_rate))]
    pub video_frame_rate: Ratio<u32>,

    /// Total duration of the video stream.
    #[garde(custom(check_video_duration(&self)))]
    pub video_duration: Ratio<u128>,

    /// Number of stereo audio streams recorded per channel.
    ///
    /// This is zero if the tape has no audio recorded on it.
    #[garde(skip)]
    pub audio_stereo_stream_count: u8,

    /// Sample rate of the audio streams, if any are present.
    #[garde(custom(check_audio_sample_rate(&self)))]
    pub audio_sample_rate: Option<u32>,
}

/// A validated [`Info`] structure.
pub type ValidInfo = Valid<Info>;

/// An [`Info`] structure that has not yet been validated.
pub type UnvalidatedInfo = Unvalidated<Info>;

fn check_video_frame_rate(value: &Ratio<u32>, _ctx: &()) -> garde::Result {
    if *value == *NTSC_FRAME_RATE || *value == *PAL_FRAME_RATE {
        Ok(())
    } else {
        Err(garde::Error::new(format!(
            "Video frame rate {value} is not a supported NTSC/PAL/SECAM rate"
        )))
    }
}

fn check_video_duration(info: &Info) -> impl FnOnce(&Ratio<u128>, &()) -> garde::Result + '_ {
    move |video_duration, _ctx| {
        let rate = info.video_frame_rate;
        let wide_rate = Ratio::<u128>::new(u128::from(*rate.numer()), u128::from(*rate.denom()));
        let total = wide_rate * video_duration;
        if !total.is_integer() {
            return Err(garde::Error::new(format!(
                "Total video frame count {total} is not an integer; it resulted from \
                multiplying video frame rate {rate} by video duration {video_duration}"
            )));
        }
        let frame_count = *total.numer();
        if frame_count == 0 {
            return Err(garde::Error::new(
                "Video frame count is zero, so cannot calculate the frame size",
            ));
        }
        if u128::from(info.file_size) % frame_count != 0 {
            return Err(garde::Error::new(format!(
                "File size {} is not evenly divisible by video frame count {frame_count}",
                info.file_size
            )));
        }
        let frame_size = u128::from(info.file_size) / frame_count;
        if frame_size != u128::from(System::Sys525_60.base_frame_size())
            && frame_size != u128::from(System::Sys625_50.base_frame_size())
            && frame_size % u128::from(System::Sys525_60.base_frame_size()) != 0
            && frame_size % u128::from(System::Sys625_50.base_frame_size()) != 0
        {
            return Err(garde::Error::new(format!("Unsupported frame size {frame_size}")));
        }
        Ok(())
    }
}

fn check_audio_sample_rate(info: &Info) -> impl FnOnce(&Option<u32>, &()) -> garde::Result + '_ {
    move |audio_sample_rate, _ctx| match (info.audio_stereo_stream_count, *audio_sample_rate) {
        (0, None) => Ok(()),
        (0, Some(_)) => Err(garde::Error::new(
            "Audio sample rate cannot be provided if there are no audio streams",
        )),
        (_, None) => {
            Err(garde::Error::new("Could not detect sample rate for audio streams"))
        }
        (_, Some(rate)) => {
            if VALID_AUDIO_SAMPLE_RATES.contains(&rate) {
                Ok(())
            } else {
                Err(garde::Error::new(format!("Unsupported audio sample rate {rate}")))
            }
        }
    }
}

/// Methods available on a validated [`Info`] structure.
///
/// These derive additional facts about the DV file - the broadcast system, the number of channels
/// recorded, and so forth - that are implied by, but not directly stored in, [`Info`]'s fields.
pub trait ValidInfoMethods {
    /// The broadcast television system that the video was recorded for.
    fn system(&self) -> System;

    /// Total number of frames recorded in the video stream.
    fn video_frame_count(&self) -> u64;

    /// Size, in bytes, of a single video frame, including all channels.
    fn video_frame_size(&self) -> u32;

    /// Number of channels (i.e. simultaneously recorded tracks of DIF sequences) per frame.
    fn video_frame_channel_count(&self) -> u8;

    /// Number of DIF sequences recorded per channel, per frame.
    fn video_frame_dif_sequence_count(&self) -> u8;

    /// The ideal, non-integer number of audio samples that should be present in a single video
    /// frame, given the audio sample rate and the video frame rate.
    ///
    /// Returns `None` if there is no audio present in the file.
    fn ideal_audio_samples_per_frame(&self) -> Option<Ratio<u32>>;

    /// Verifies that `self` and `other` describe files recorded on equivalent hardware: same
    /// frame rate, frame size, and audio configuration.
    ///
    /// This is used to confirm that frames being combined together - for example, when
    /// reconstructing a whole file from multiple partial captures - are actually compatible with
    /// one another.
    fn check_similar(&self, other: &Self) -> Result<(), CheckSimilarError>;
}

impl ValidInfoMethods for ValidInfo {
    fn system(&self) -> System {
        if self.video_frame_rate == *NTSC_FRAME_RATE {
            System::Sys525_60
        } else {
            System::Sys625_50
        }
    }

    fn video_frame_count(&self) -> u64 {
        let rate = self.video_frame_rate;
        let wide_rate = Ratio::<u128>::new(u128::from(*rate.numer()), u128::from(*rate.denom()));
        let total = wide_rate * self.video_duration;
        u64::try_from(*total.numer()).expect("frame count validated to fit")
    }

    fn video_frame_size(&self) -> u32 {
        u32::try_from(u128::from(self.file_size) / u128::from(self.video_frame_count()))
            .expect("frame size validated to fit")
    }

    fn video_frame_channel_count(&self) -> u8 {
        u8::try_from(self.video_frame_size() / self.system().base_frame_size())
            .expect("channel count validated to fit")
    }

    fn video_frame_dif_sequence_count(&self) -> u8 {
        self.system().dif_sequence_count()
    }

    fn ideal_audio_samples_per_frame(&self) -> Option<Ratio<u32>> {
        self.audio_sample_rate.map(|rate| Ratio::new(rate, 1) / self.video_frame_rate)
    }

    fn check_similar(&self, other: &Self) -> Result<(), CheckSimilarError> {
        ensure!(
            self.video_frame_rate == other.video_frame_rate,
            FrameRateSnafu { other: other.video_frame_rate, expected: self.video_frame_rate }
        );
        ensure!(
            self.video_frame_size() == other.video_frame_size(),
            FrameSizeSnafu { other: other.video_frame_size(), expected: self.video_frame_size() }
        );
        ensure!(
            self.audio_stereo_stream_count == other.audio_stereo_stream_count,
            AudioStreamCountSnafu {
                other: other.audio_stereo_stream_count,
                expected: self.audio_stereo_stream_count
            }
        );
        if let (Some(expected), Some(other)) = (self.audio_sample_rate, other.audio_sample_rate) {
            ensure!(expected == other, AudioSampleRateSnafu { other, expected });
        }
        Ok(())
    }
}

/// Error returned by [`ValidInfoMethods::check_similar`].
#[derive(Debug, Snafu)]
pub enum CheckSimilarError {
    /// Video frame rate does not match.
    #[snafu(display("Video frame rate {other} does not match {expected}"))]
    FrameRate { other: Ratio<u32>, expected: Ratio<u32> },

    /// Video frame size does not match.
    #[snafu(display("Video frame size {other} does not match {expected}"))]
    FrameSize { other: u32, expected: u32 },

    /// Audio stereo stream count does not match.
    #[snafu(display("Audio stereo stream count {other} does not match {expected}"))]
    AudioStreamCount { other: u8, expected: u8 },

    /// Audio sample rate does not match.
    #[snafu(display("Audio sample rate {other} does not match {expected}"))]
    AudioSampleRate { other: u32, expected: u32 },
}

