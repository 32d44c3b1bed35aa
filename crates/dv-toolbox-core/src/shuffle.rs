//! Audio sample shuffling, as defined in IEC 61834-2:1998 Section 6.7 - Shuffling method.
//!
//! Consecutive audio samples are not stored consecutively on tape. Instead, they are distributed
//! ("shuffled") across the audio blocks of a video frame so that a short tape dropout only causes
//! a handful of samples spread throughout the recording to be lost, rather than a contiguous run
//! of audio.

use std::{collections::HashMap, sync::LazyLock};

/// Position of an audio sample within the audio blocks of a video frame.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct SamplePosition {
    /// DIF sequence number within the given audio block (a.k.a. track number), relative to the
    /// start of that audio block's half of the channel.
    pub dif_sequence_offset: u32,

    /// Number of the audio DIF block within a sequence (a.k.a. sync block number); `0..9`.
    pub dif_block: u32,

    /// Sample-based offset into a DIF block's audio data. Multiply by 2 for 16-bit samples, or by
    /// 3 for dual-channel 12-bit samples, to obtain a byte offset.
    pub data_offset: u32,
}

/// Identifies a single audio DIF block's position, ignoring the sample offset within it.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct BlockPosition {
    /// DIF sequence number within the given audio block (a.k.a. track number).
    pub dif_sequence_offset: u32,

    /// Number of the audio DIF block within a sequence (a.k.a. sync block number).
    pub dif_block: u32,
}

fn shuffle_audio_sample_numbers(
    video_frame_dif_sequence_count: u32,
    max_sample_count: u32,
) -> Vec<SamplePosition> {
    assert!(video_frame_dif_sequence_count == 10 || video_frame_dif_sequence_count == 12);
    let half_dif_sequence = video_frame_dif_sequence_count / 2;

    (0..max_sample_count)
        .map(|n| SamplePosition {
            dif_sequence_offset: (n / 3 + 2 * (n % 3)) % half_dif_sequence,
            dif_block: 3 * (n % 3) + (n % (9 * half_dif_sequence)) / (3 * half_dif_sequence),
            data_offset: n / (9 * half_dif_sequence),
        })
        .collect()
}

fn reverse_shuffled_positions(
    sample_positions: &[SamplePosition],
) -> HashMap<BlockPosition, Vec<u32>> {
    let mut block_info: HashMap<BlockPosition, Vec<u32>> = HashMap::new();
    for (sample_number, sample_position) in sample_positions.iter().enumerate() {
        let key = BlockPosition {
            dif_sequence_offset: sample_position.dif_sequence_offset,
            dif_block: sample_position.dif_block,
        };
        let list = block_info.entry(key).or_default();
        assert_eq!(list.len() as u32, sample_position.data_offset);
        list.push(sample_number as u32);
    }
    block_info
}

/// Maps a video frame's DIF sequence count (10 or 12) to the shuffled sample position of every
/// audio sample in the frame, indexed by overall sample number.
pub static AUDIO_SAMPLE_POSITIONS: LazyLock<HashMap<u32, Vec<SamplePosition>>> = LazyLock::new(
    || HashMap::from([(10, shuffle_audio_sample_numbers(10, 1620)), (12, shuffle_audio_sample_numbers(12, 1944))]),
);

/// Maps a video frame's DIF sequence count (10 or 12), and a DIF block position within that
/// frame, to the list of overall audio sample numbers stored in that block, in the order that
/// they appear within the block's audio data.
pub static SAMPLE_POSITIONS_TO_NUMBERS: LazyLock<HashMap<u32, HashMap<BlockPosition, Vec<u32>>>> =
    LazyLock::new(|| {
        AUDIO_SAMPLE_POSITIONS
            .iter()
            .map(|(&count, positions)| (count, reverse_shuffled_positions(positions)))
            .collect()
    });

#[cfg(test)]
mod tests {
    use googletest::prelude::*;

    use super::*;

    #[googletest::test]
    fn test_shuffle_is_bijective() {
        for &count in &[10_u32, 12_u32] {
            let positions = &AUDIO_SAMPLE_POSITIONS[&count];
            let reversed = &SAMPLE_POSITIONS_TO_NUMBERS[&count];

            for (sample_number, position) in positions.iter().enumerate() {
                let key = BlockPosition {
                    dif_sequence_offset: position.dif_sequence_offset,
                    dif_block: position.dif_block,
                };
                expect_that!(
                    reversed[&key][position.data_offset as usize],
                    eq(sample_number as u32)
                );
            }
        }
    }

    #[googletest::test]
    fn test_shuffle_within_block_never_goes_backwards() {
        // Within a given DIF block, the audio samples never go backwards in time: i.e. the
        // data_offset sequence observed for a fixed block position must be 0, 1, 2, ...
        for &count in &[10_u32, 12_u32] {
            let reversed = &SAMPLE_POSITIONS_TO_NUMBERS[&count];
            for samples in reversed.values() {
                for (offset, &sample_number) in samples.iter().enumerate() {
                    let position = &AUDIO_SAMPLE_POSITIONS[&count][sample_number as usize];
                    expect_that!(position.data_offset, eq(offset as u32));
                }
            }
        }
    }
}
