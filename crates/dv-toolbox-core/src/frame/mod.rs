//! Top-level assembly of a DV video frame from its constituent DIF blocks.
//!
//! A frame is transmitted as a fixed sequence of 80-byte DIF blocks per DIF sequence (see
//! [`BLOCK_TRANSMISSION_ORDER`]). [`parse_binary`] walks that sequence, aggregating per-block
//! observations (which frequently disagree due to tape dropouts) into a single consistent
//! [`data::Data`] record by majority vote. [`to_binary`] does the reverse.

use std::sync::LazyLock;

pub use data::Data;
use snafu::prelude::*;

use crate::{block, file, pack};

mod data;
mod tally;

use tally::Tally;

/// Transmission order of DIF block types within one DIF sequence (one tape track).
///
/// - IEC 61834-2:1998 Figure 65 - Transmission order of DIF blocks in a DIF sequence
/// - SMPTE 306M-2002 Section 11.2 - Data structure
pub static BLOCK_TRANSMISSION_ORDER: LazyLock<Vec<block::BlockType>> = LazyLock::new(|| {
    let mut order = vec![block::BlockType::Header];
    order.extend([block::BlockType::Subcode; 2]);
    order.extend([block::BlockType::VAUX; 3]);
    for _ in 0..9 {
        order.push(block::BlockType::Audio);
        order.extend([block::BlockType::Video; 15]);
    }
    order
});

/// DIF block number (within its section type) of every position in [`BLOCK_TRANSMISSION_ORDER`].
pub static BLOCK_NUMBER: LazyLock<Vec<u8>> = LazyLock::new(|| {
    let mut counts = [0u8; 5];
    BLOCK_TRANSMISSION_ORDER
        .iter()
        .map(|ty| {
            let idx = block_type_index(*ty);
            let n = counts[idx];
            counts[idx] += 1;
            n
        })
        .collect()
});

fn block_type_index(ty: block::BlockType) -> usize {
    match ty {
        block::BlockType::Header => 0,
        block::BlockType::Subcode => 1,
        block::BlockType::VAUX => 2,
        block::BlockType::Audio => 3,
        block::BlockType::Video => 4,
    }
}

/// Number of audio/video DIF blocks forming one audio block channel (half of a DIF sequence
/// count's worth of audio blocks).
fn sequences_per_audio_block(video_frame_dif_sequence_count: u8) -> u8 {
    video_frame_dif_sequence_count / 2
}

/// Error assembling or disassembling a whole video frame.
#[derive(Debug, Snafu)]
pub enum FrameError {
    /// A DIF block failed to parse.
    #[snafu(display(
        "Error while parsing input binary data for channel {channel}, DIF sequence/track \
            {sequence}, block {blk}"
    ))]
    Block { channel: u8, sequence: u8, blk: usize, source: block::BlockError },

    /// A DIF block was present, but not in the position the transmission order requires.
    #[snafu(display("{message}"))]
    Misordered { message: String },

    /// The frame model could not be serialized because required data was missing.
    #[snafu(display("{message}"))]
    MissingData { message: String },

    /// The frame model failed its own internal consistency checks.
    #[snafu(display("{message}"))]
    Invalid { message: String },
}

fn no_info_pack(ctx: &pack::PackContext) -> pack::Pack {
    pack::Pack::from_raw(&[0xFF; 5], ctx).0
}

/// Parses a whole binary video frame.
pub fn parse_binary(
    frame_bytes: &[u8],
    file_info: &file::ValidInfo,
    ctx: &pack::PackContext,
) -> Result<Data, FrameError> {
    use file::ValidInfoMethods;

    let channels = file_info.video_frame_channel_count() as usize;
    let sequences = file_info.video_frame_dif_sequence_count() as usize;
    let order = &*BLOCK_TRANSMISSION_ORDER;
    let numbers = &*BLOCK_NUMBER;

    let mut sequence_tally: Tally<u8> = Tally::new();

    let mut header_dif_sequence_count: Tally<u8> = Tally::new();
    let mut header_track_pitch: Tally<block::TrackPitch> = Tally::new();
    let mut header_pilot_frame: Tally<u8> = Tally::new();
    let mut header_application_id_track: Tally<block::ApplicationIdTrack> = Tally::new();
    let mut header_application_id_1: Tally<block::ApplicationId1> = Tally::new();
    let mut header_application_id_2: Tally<block::ApplicationId2> = Tally::new();
    let mut header_application_id_3: Tally<block::ApplicationId3> = Tally::new();

    let mut subcode_index: Tally<bool> = Tally::new();
    let mut subcode_skip: Tally<bool> = Tally::new();
    let mut subcode_picture: Tally<bool> = Tally::new();
    let mut subcode_application_id_track: Tally<block::ApplicationIdTrack> = Tally::new();
    let mut subcode_application_id_3: Tally<block::ApplicationId3> = Tally::new();
    let mut subcode_blank_flag: Tally<block::BlankFlag> = Tally::new();
    let mut subcode_atn_2 = vec![vec![Tally::<u8>::new(); sequences]; channels];
    let mut subcode_atn_1 = vec![vec![Tally::<u8>::new(); sequences]; channels];
    let mut subcode_atn_0 = vec![vec![Tally::<u8>::new(); sequences]; channels];

    let mut subcode_title_timecode: Tally<pack::Pack> = Tally::new();
    let mut subcode_title_binary_group: Tally<pack::Pack> = Tally::new();
    let mut subcode_vaux_recording_date: Tally<pack::Pack> = Tally::new();
    let mut subcode_vaux_recording_time: Tally<pack::Pack> = Tally::new();
    let mut subcode_aaux_recording_date: Tally<pack::Pack> = Tally::new();
    let mut subcode_aaux_recording_time: Tally<pack::Pack> = Tally::new();

    let mut vaux_source: Tally<pack::Pack> = Tally::new();
    let mut vaux_source_control: Tally<pack::Pack> = Tally::new();
    let mut vaux_recording_date: Tally<pack::Pack> = Tally::new();
    let mut vaux_recording_time: Tally<pack::Pack> = Tally::new();
    let mut vaux_binary_group: Tally<pack::Pack> = Tally::new();
    let mut vaux_camera_consumer_1: Tally<pack::Pack> = Tally::new();
    let mut vaux_camera_consumer_2: Tally<pack::Pack> = Tally::new();
    let mut vaux_camera_shutter: Tally<pack::Pack> = Tally::new();

    let mut aaux_source = vec![[Tally::<pack::Pack>::new(), Tally::<pack::Pack>::new()]; channels];
    let mut aaux_source_control =
        vec![[Tally::<pack::Pack>::new(), Tally::<pack::Pack>::new()]; channels];
    let mut aaux_recording_date =
        vec![[Tally::<pack::Pack>::new(), Tally::<pack::Pack>::new()]; channels];
    let mut aaux_recording_time =
        vec![[Tally::<pack::Pack>::new(), Tally::<pack::Pack>::new()]; channels];
    let mut aaux_binary_group =
        vec![[Tally::<pack::Pack>::new(), Tally::<pack::Pack>::new()]; channels];

    let mut subcode_absolute_track_numbers = vec![vec![None; sequences]; channels];
    let mut subcode_pack_types = vec![vec![[0u8; 12]; sequences]; channels];
    let mut vaux_pack_types = vec![vec![[0u8; 45]; sequences]; channels];
    let mut aaux_pack_types = vec![vec![[0u8; 9]; sequences]; channels];
    let mut audio_data = vec![vec![[[0u8; 72]; 9]; sequences]; channels];
    let mut video_data = vec![vec![[[0u8; 76]; 135]; sequences]; channels];
    let mut video_status = vec![vec![[0u8; 135]; sequences]; channels];
    let mut video_data_errors = vec![vec![[false; 135]; sequences]; channels];

    let dsf = file_info.video_frame_dif_sequence_count();

    for channel in 0..channels {
        for dif_sequence in 0..sequences {
            for (blk, &block_type) in order.iter().enumerate() {
                let b_start = ((channel * sequences + dif_sequence) * order.len() + blk)
                    * block::BLOCK_SIZE;
                let raw: &[u8; block::BLOCK_SIZE] =
                    frame_bytes[b_start..b_start + block::BLOCK_SIZE].try_into().unwrap();
                let parsed = block::parse_binary(raw, ctx, dsf).context(BlockSnafu {
                    channel: channel as u8,
                    sequence: dif_sequence as u8,
                    blk,
                })?;

                let id = parsed.block_id();
                if id.section_type != block_type {
                    return Err(FrameError::Misordered {
                        message: format!(
                            "DIF block at channel {channel}, sequence {dif_sequence}, position \
                                {blk} has unexpected section type."
                        ),
                    });
                }
                if id.channel as usize != channel
                    || id.dif_sequence as usize != dif_sequence
                    || id.dif_block != numbers[blk]
                {
                    return Err(FrameError::Misordered {
                        message: format!(
                            "DIF block at channel {channel}, sequence {dif_sequence}, position \
                                {blk} has an unexpected block ID."
                        ),
                    });
                }

                if !matches!(block_type, block::BlockType::Header | block::BlockType::Subcode) {
                    sequence_tally.count(id.sequence);
                }

                match parsed {
                    block::Block::Header(_, h) => {
                        header_dif_sequence_count.count(h.video_frame_dif_sequence_count);
                        header_track_pitch.count_if_present(h.track_pitch);
                        header_pilot_frame.count_if_present(h.pilot_frame);
                        header_application_id_track.count_if_present(h.application_id_track);
                        header_application_id_1.count_if_present(h.application_id_1);
                        header_application_id_2.count_if_present(h.application_id_2);
                        header_application_id_3.count_if_present(h.application_id_3);
                    }
                    block::Block::Subcode(_, s) => {
                        for v in s.index {
                            subcode_index.count_if_present(v);
                        }
                        for v in s.skip {
                            subcode_skip.count_if_present(v);
                        }
                        for v in s.picture {
                            subcode_picture.count_if_present(v);
                        }
                        subcode_application_id_track.count_if_present(s.application_id_track);
                        subcode_application_id_3.count_if_present(s.application_id_3);
                        for v in s.absolute_track_number_2 {
                            subcode_atn_2[channel][dif_sequence].count_if_present(v);
                        }
                        for v in s.absolute_track_number_1 {
                            subcode_atn_1[channel][dif_sequence].count_if_present(v);
                        }
                        for v in s.absolute_track_number_0 {
                            subcode_atn_0[channel][dif_sequence].count_if_present(v);
                        }
                        for v in s.blank_flag {
                            subcode_blank_flag.count_if_present(v);
                        }

                        for (i, p) in s.packs.iter().enumerate() {
                            let overall = numbers[blk] as usize * 6 + i;
                            subcode_pack_types[channel][dif_sequence][overall] =
                                p.pack_type().into();
                            match p.pack_type() {
                                pack::Type::TitleTimecode => subcode_title_timecode.count(*p),
                                pack::Type::TitleBinaryGroup => {
                                    subcode_title_binary_group.count(*p);
                                }
                                pack::Type::VAUXRecordingDate => {
                                    subcode_vaux_recording_date.count(*p);
                                }
                                pack::Type::VAUXRecordingTime => {
                                    subcode_vaux_recording_time.count(*p);
                                }
                                pack::Type::AAUXRecordingDate => {
                                    subcode_aaux_recording_date.count(*p);
                                }
                                pack::Type::AAUXRecordingTime => {
                                    subcode_aaux_recording_time.count(*p);
                                }
                                pack::Type::NoInfo => {}
                                other => {
                                    return Err(FrameError::Block {
                                        channel: channel as u8,
                                        sequence: dif_sequence as u8,
                                        blk,
                                        source: block::BlockError::Invalid {
                                            message: format!(
                                                "Pack type {:#x} is not currently supported in \
                                                    the subcode block.",
                                                u8::from(other)
                                            ),
                                        },
                                    });
                                }
                            }
                        }
                    }
                    block::Block::VAUX(_, v) => {
                        for (i, p) in v.packs.iter().enumerate() {
                            let overall = numbers[blk] as usize * 15 + i;
                            vaux_pack_types[channel][dif_sequence][overall] = p.pack_type().into();
                            match p.pack_type() {
                                pack::Type::VAUXSource => vaux_source.count(*p),
                                pack::Type::VAUXSourceControl => vaux_source_control.count(*p),
                                pack::Type::VAUXRecordingDate => vaux_recording_date.count(*p),
                                pack::Type::VAUXRecordingTime => vaux_recording_time.count(*p),
                                pack::Type::VAUXBinaryGroup => vaux_binary_group.count(*p),
                                pack::Type::CameraConsumer1 => vaux_camera_consumer_1.count(*p),
                                pack::Type::CameraConsumer2 => vaux_camera_consumer_2.count(*p),
                                pack::Type::CameraShutter => vaux_camera_shutter.count(*p),
                                pack::Type::NoInfo => {}
                                other => {
                                    return Err(FrameError::Block {
                                        channel: channel as u8,
                                        sequence: dif_sequence as u8,
                                        blk,
                                        source: block::BlockError::Invalid {
                                            message: format!(
                                                "Pack type {:#x} is not currently supported in \
                                                    the VAUX block.",
                                                u8::from(other)
                                            ),
                                        },
                                    });
                                }
                            }
                        }
                    }
                    block::Block::Audio(_, a) => {
                        let audio_block =
                            dif_sequence / sequences_per_audio_block(dsf) as usize;
                        aaux_pack_types[channel][dif_sequence][numbers[blk] as usize] =
                            a.pack_data.pack_type().into();
                        match a.pack_data.pack_type() {
                            pack::Type::AAUXSource => {
                                aaux_source[channel][audio_block].count(a.pack_data);
                            }
                            pack::Type::AAUXSourceControl => {
                                aaux_source_control[channel][audio_block].count(a.pack_data);
                            }
                            pack::Type::AAUXRecordingDate => {
                                aaux_recording_date[channel][audio_block].count(a.pack_data);
                            }
                            pack::Type::AAUXRecordingTime => {
                                aaux_recording_time[channel][audio_block].count(a.pack_data);
                            }
                            pack::Type::AAUXBinaryGroup => {
                                aaux_binary_group[channel][audio_block].count(a.pack_data);
                            }
                            pack::Type::NoInfo => {}
                            other => {
                                return Err(FrameError::Block {
                                    channel: channel as u8,
                                    sequence: dif_sequence as u8,
                                    blk,
                                    source: block::BlockError::Invalid {
                                        message: format!(
                                            "Pack type {:#x} is not currently supported in the \
                                                audio AAUX block.",
                                            u8::from(other)
                                        ),
                                    },
                                });
                            }
                        }
                        audio_data[channel][dif_sequence][numbers[blk] as usize] = a.audio_data;
                    }
                    block::Block::Video(_, v) => {
                        video_data[channel][dif_sequence][numbers[blk] as usize] = v.dct_blocks;
                        video_status[channel][dif_sequence][numbers[blk] as usize] =
                            (v.status << 4) | v.quantization_number;
                        video_data_errors[channel][dif_sequence][numbers[blk] as usize] =
                            v.has_video_errors();
                    }
                }
            }
        }
    }

    // Combine the three absolute-track-number tallies into one frame-level value per track.
    for channel in 0..channels {
        for seq in 0..sequences {
            let atn2 = subcode_atn_2[channel][seq].most_common();
            let atn1 = subcode_atn_1[channel][seq].most_common();
            let atn0 = subcode_atn_0[channel][seq].most_common();
            subcode_absolute_track_numbers[channel][seq] = match (atn2, atn1, atn0) {
                (Some(a2), Some(a1), Some(a0)) => {
                    Some((u32::from(a2) << 15) | (u32::from(a1) << 7) | u32::from(a0))
                }
                _ => None,
            };
        }
    }

    // Error detection: audio.
    let sequences_per_block = sequences_per_audio_block(dsf) as usize;
    let aaux_source_common: Vec<[Option<pack::Pack>; 2]> =
        aaux_source.iter().map(|c| [c[0].most_common(), c[1].most_common()]).collect();
    let mut audio_data_errors = vec![vec![[false; 9]; sequences]; channels];
    for channel in 0..channels {
        for seq in 0..sequences {
            let audio_block = seq / sequences_per_block;
            let source = aaux_source_common[channel][audio_block];
            for (b, sample_block) in audio_data[channel][seq].iter().enumerate() {
                audio_data_errors[channel][seq][b] = match source {
                    Some(p @ pack::Pack::AAUXSource(s)) => {
                        let dif_sequence_offset = seq as u32 % sequences_per_block as u32;
                        block::Audio { pack_data: p, audio_data: *sample_block }.has_audio_errors(
                            u32::from(dsf),
                            dif_sequence_offset,
                            b as u32,
                            u32::from(s.audio_frame_size),
                            s.quantization,
                        )
                    }
                    _ => true,
                };
            }
        }
    }
    let mut audio_data_error_summary = vec![[0.0f64; 2]; channels];
    for channel in 0..channels {
        for audio_block in 0..2 {
            let start = audio_block * sequences_per_block;
            let end = start + sequences_per_block;
            let mut total = 0u32;
            let mut errors = 0u32;
            for seq_errors in &audio_data_errors[channel][start..end] {
                for &e in seq_errors {
                    total += 1;
                    if e {
                        errors += 1;
                    }
                }
            }
            audio_data_error_summary[channel][audio_block] = f64::from(errors) / f64::from(total);
        }
    }

    // Error detection: video. Each macro block's status is checked independently as the blocks
    // are parsed (no majority vote needed); this just summarizes the totals.
    let mut video_total = 0u32;
    let mut video_errors = 0u32;
    for channel in 0..channels {
        for seq in 0..sequences {
            for &has_error in &video_data_errors[channel][seq] {
                video_total += 1;
                if has_error {
                    video_errors += 1;
                }
            }
        }
    }
    let video_data_error_summary = f64::from(video_errors) / f64::from(video_total);

    let data = Data {
        sequence: sequence_tally.most_common_or(0),
        header_video_frame_dif_sequence_count: header_dif_sequence_count.most_common_or(dsf),
        header_track_pitch: header_track_pitch.most_common(),
        header_pilot_frame: header_pilot_frame.most_common(),
        header_application_id_track: header_application_id_track.most_common(),
        header_application_id_1: header_application_id_1.most_common(),
        header_application_id_2: header_application_id_2.most_common(),
        header_application_id_3: header_application_id_3.most_common(),

        subcode_index: subcode_index.most_common(),
        subcode_skip: subcode_skip.most_common(),
        subcode_picture: subcode_picture.most_common(),
        subcode_application_id_track: subcode_application_id_track.most_common(),
        subcode_application_id_3: subcode_application_id_3.most_common(),
        subcode_absolute_track_numbers,
        subcode_blank_flag: subcode_blank_flag.most_common(),

        subcode_pack_types,
        subcode_title_timecode: subcode_title_timecode.most_common_or(no_info_pack(ctx)),
        subcode_title_binary_group: subcode_title_binary_group.most_common_or(no_info_pack(ctx)),
        subcode_vaux_recording_date: subcode_vaux_recording_date.most_common_or(no_info_pack(ctx)),
        subcode_vaux_recording_time: subcode_vaux_recording_time.most_common_or(no_info_pack(ctx)),
        subcode_aaux_recording_date: subcode_aaux_recording_date.most_common_or(no_info_pack(ctx)),
        subcode_aaux_recording_time: subcode_aaux_recording_time.most_common_or(no_info_pack(ctx)),

        vaux_pack_types,
        vaux_source: vaux_source.most_common_or(no_info_pack(ctx)),
        vaux_source_control: vaux_source_control.most_common_or(no_info_pack(ctx)),
        vaux_recording_date: vaux_recording_date.most_common_or(no_info_pack(ctx)),
        vaux_recording_time: vaux_recording_time.most_common_or(no_info_pack(ctx)),
        vaux_binary_group: vaux_binary_group.most_common_or(no_info_pack(ctx)),
        vaux_camera_consumer_1: vaux_camera_consumer_1.most_common_or(no_info_pack(ctx)),
        vaux_camera_consumer_2: vaux_camera_consumer_2.most_common_or(no_info_pack(ctx)),
        vaux_camera_shutter: vaux_camera_shutter.most_common_or(no_info_pack(ctx)),

        aaux_pack_types,
        aaux_source: aaux_source
            .iter()
            .map(|c| [c[0].most_common_or(no_info_pack(ctx)), c[1].most_common_or(no_info_pack(ctx))])
            .collect(),
        aaux_source_control: aaux_source_control
            .iter()
            .map(|c| [c[0].most_common_or(no_info_pack(ctx)), c[1].most_common_or(no_info_pack(ctx))])
            .collect(),
        aaux_recording_date: aaux_recording_date
            .iter()
            .map(|c| [c[0].most_common_or(no_info_pack(ctx)), c[1].most_common_or(no_info_pack(ctx))])
            .collect(),
        aaux_recording_time: aaux_recording_time
            .iter()
            .map(|c| [c[0].most_common_or(no_info_pack(ctx)), c[1].most_common_or(no_info_pack(ctx))])
            .collect(),
        aaux_binary_group: aaux_binary_group
            .iter()
            .map(|c| [c[0].most_common_or(no_info_pack(ctx)), c[1].most_common_or(no_info_pack(ctx))])
            .collect(),

        audio_data: Some(audio_data),
        audio_data_errors: Some(audio_data_errors),
        audio_data_error_summary,

        video_data: Some(video_data),
        video_status: Some(video_status),
        video_data_errors: Some(video_data_errors),
        video_data_error_summary,
    };
    data.validate(file_info).map_err(|message| FrameError::Invalid { message })?;
    Ok(data)
}

/// Serializes a frame record back to its binary representation.
pub fn to_binary(
    frame: &Data,
    file_info: &file::ValidInfo,
    ctx: &pack::PackContext,
) -> Result<Vec<u8>, FrameError> {
    use file::ValidInfoMethods;

    let channels = file_info.video_frame_channel_count() as usize;
    let sequences = file_info.video_frame_dif_sequence_count() as usize;
    let dsf = file_info.video_frame_dif_sequence_count();
    let order = &*BLOCK_TRANSMISSION_ORDER;
    let numbers = &*BLOCK_NUMBER;

    let audio_data = frame
        .audio_data
        .as_ref()
        .ok_or_else(|| FrameError::MissingData { message: "Audio data is missing.".to_string() })?;
    let video_data = frame
        .video_data
        .as_ref()
        .ok_or_else(|| FrameError::MissingData { message: "Video data is missing.".to_string() })?;
    let video_status = frame
        .video_status
        .as_ref()
        .ok_or_else(|| FrameError::MissingData { message: "Video status is missing.".to_string() })?;

    let mut out = vec![0u8; file_info.video_frame_size() as usize];
    let mut b_start = 0usize;

    for channel in 0..channels {
        for dif_sequence in 0..sequences {
            for (blk, &block_type) in order.iter().enumerate() {
                let block_number = numbers[blk];
                let sequence = if matches!(
                    block_type,
                    block::BlockType::Header | block::BlockType::Subcode
                ) {
                    0xF
                } else {
                    frame.sequence
                };
                let id = block::BlockId {
                    section_type: block_type,
                    sequence,
                    channel: channel as u8,
                    dif_sequence: dif_sequence as u8,
                    dif_block: block_number,
                };

                let blk_data = match block_type {
                    block::BlockType::Header => block::Block::Header(
                        id,
                        block::Header {
                            video_frame_dif_sequence_count: frame
                                .header_video_frame_dif_sequence_count,
                            track_pitch: frame.header_track_pitch,
                            pilot_frame: frame.header_pilot_frame,
                            application_id_track: frame.header_application_id_track,
                            application_id_1: frame.header_application_id_1,
                            application_id_2: frame.header_application_id_2,
                            application_id_3: frame.header_application_id_3,
                        },
                    ),
                    block::BlockType::Subcode => build_subcode_block(
                        id,
                        frame,
                        channel,
                        dif_sequence,
                        block_number,
                        ctx,
                    )?,
                    block::BlockType::VAUX => {
                        let pack_types = &frame.vaux_pack_types[channel][dif_sequence]
                            [15 * block_number as usize..15 * block_number as usize + 15];
                        let mut packs = [no_info_pack(ctx); 15];
                        for (i, &ty) in pack_types.iter().enumerate() {
                            packs[i] = select_vaux_pack(frame, ty, ctx)?;
                        }
                        block::Block::VAUX(id, block::VAUX { packs })
                    }
                    block::BlockType::Audio => {
                        let audio_block =
                            dif_sequence / sequences_per_audio_block(dsf) as usize;
                        let ty = frame.aaux_pack_types[channel][dif_sequence][block_number as usize];
                        let pack_data = select_aaux_pack(frame, channel, audio_block, ty, ctx)?;
                        block::Block::Audio(
                            id,
                            block::Audio {
                                pack_data,
                                audio_data: audio_data[channel][dif_sequence]
                                    [block_number as usize],
                            },
                        )
                    }
                    block::BlockType::Video => {
                        let raw_status =
                            video_status[channel][dif_sequence][block_number as usize];
                        block::Block::Video(
                            id,
                            block::Video {
                                status: (raw_status >> 4) & 0xF,
                                quantization_number: raw_status & 0xF,
                                dct_blocks: video_data[channel][dif_sequence]
                                    [block_number as usize],
                            },
                        )
                    }
                };

                let raw = blk_data.to_binary(ctx, dsf);
                out[b_start..b_start + block::BLOCK_SIZE].copy_from_slice(&raw);
                b_start += block::BLOCK_SIZE;
            }
        }
    }

    Ok(out)
}

fn select_vaux_pack(frame: &Data, ty: u8, ctx: &pack::PackContext) -> Result<pack::Pack, FrameError> {
    let pack_type = pack::Type::from(ty);
    Ok(match pack_type {
        pack::Type::NoInfo => no_info_pack(ctx),
        pack::Type::VAUXSource => frame.vaux_source,
        pack::Type::VAUXSourceControl => frame.vaux_source_control,
        pack::Type::VAUXRecordingDate => frame.vaux_recording_date,
        pack::Type::VAUXRecordingTime => frame.vaux_recording_time,
        pack::Type::VAUXBinaryGroup => frame.vaux_binary_group,
        pack::Type::CameraConsumer1 => frame.vaux_camera_consumer_1,
        pack::Type::CameraConsumer2 => frame.vaux_camera_consumer_2,
        pack::Type::CameraShutter => frame.vaux_camera_shutter,
        _ => {
            return Err(FrameError::MissingData {
                message: format!("Pack type {ty:#x} is not supported in the VAUX block."),
            })
        }
    })
}

fn select_aaux_pack(
    frame: &Data,
    channel: usize,
    audio_block: usize,
    ty: u8,
    ctx: &pack::PackContext,
) -> Result<pack::Pack, FrameError> {
    let pack_type = pack::Type::from(ty);
    Ok(match pack_type {
        pack::Type::NoInfo => no_info_pack(ctx),
        pack::Type::AAUXSource => frame.aaux_source[channel][audio_block],
        pack::Type::AAUXSourceControl => frame.aaux_source_control[channel][audio_block],
        pack::Type::AAUXRecordingDate => frame.aaux_recording_date[channel][audio_block],
        pack::Type::AAUXRecordingTime => frame.aaux_recording_time[channel][audio_block],
        pack::Type::AAUXBinaryGroup => frame.aaux_binary_group[channel][audio_block],
        _ => {
            return Err(FrameError::MissingData {
                message: format!("Pack type {ty:#x} is not supported in the audio AAUX block."),
            })
        }
    })
}

#[allow(clippy::too_many_arguments)]
fn build_subcode_block(
    id: block::BlockId,
    frame: &Data,
    channel: usize,
    dif_sequence: usize,
    block_number: u8,
    ctx: &pack::PackContext,
) -> Result<block::Block, FrameError> {
    let tag_element_count = if block_number == 0 { 5 } else { 4 };
    let mut index = [frame.subcode_index; 5];
    let mut skip = [frame.subcode_skip; 5];
    let mut picture = [frame.subcode_picture; 5];
    for v in index.iter_mut().skip(tag_element_count) {
        *v = None;
    }
    for v in skip.iter_mut().skip(tag_element_count) {
        *v = None;
    }
    for v in picture.iter_mut().skip(tag_element_count) {
        *v = None;
    }
    let mut application_id_track = frame.subcode_application_id_track;
    let mut application_id_3 = frame.subcode_application_id_3;
    let mut blank_flag = [frame.subcode_blank_flag; 2];

    let abst = frame.subcode_absolute_track_numbers[channel][dif_sequence];
    let mut abst_parts: [[Option<u8>; 2]; 3] = match abst {
        Some(a) => [
            [Some((a & 0x7F) as u8); 2],
            [Some((((a << 1) & 0x00FF00) >> 8) as u8); 2],
            [Some((((a << 1) & 0xFF0000) >> 16) as u8); 2],
        ],
        None => [[None; 2]; 3],
    };

    for sync_block_number in 0..6usize {
        let mut any_missing = if sync_block_number == 0 {
            application_id_3.is_none()
        } else if block_number == 1 && sync_block_number == 5 {
            application_id_track.is_none()
        } else {
            let tag_index = sync_block_number - 1;
            index[tag_index].is_none() || skip[tag_index].is_none() || picture[tag_index].is_none()
        };

        let abst_part_num = sync_block_number % 3;
        let abst_copy_num = sync_block_number / 3;
        any_missing = any_missing || abst_parts[abst_part_num][abst_copy_num].is_none();
        if abst_part_num == 0 {
            any_missing = any_missing || blank_flag[abst_copy_num].is_none();
        }

        if any_missing {
            if sync_block_number == 0 {
                application_id_3 = None;
            } else if block_number == 1 && sync_block_number == 5 {
                application_id_track = None;
            } else {
                let tag_index = sync_block_number - 1;
                index[tag_index] = None;
                skip[tag_index] = None;
                picture[tag_index] = None;
            }
            abst_parts[abst_part_num][abst_copy_num] = None;
            if abst_part_num == 0 {
                blank_flag[abst_copy_num] = None;
            }
        }
    }

    let pack_types = &frame.subcode_pack_types[channel][dif_sequence]
        [6 * block_number as usize..6 * block_number as usize + 6];
    let mut packs = [no_info_pack(ctx); 6];
    for (i, &ty) in pack_types.iter().enumerate() {
        packs[i] = select_subcode_pack(frame, ty, ctx)?;
    }

    Ok(block::Block::Subcode(
        id,
        block::Subcode {
            index,
            skip,
            picture,
            application_id_track,
            application_id_3,
            absolute_track_number_0: abst_parts[0],
            absolute_track_number_1: abst_parts[1],
            absolute_track_number_2: abst_parts[2],
            blank_flag,
            packs,
        },
    ))
}

fn select_subcode_pack(
    frame: &Data,
    ty: u8,
    ctx: &pack::PackContext,
) -> Result<pack::Pack, FrameError> {
    let pack_type = pack::Type::from(ty);
    Ok(match pack_type {
        pack::Type::NoInfo => no_info_pack(ctx),
        pack::Type::TitleTimecode => frame.subcode_title_timecode,
        pack::Type::TitleBinaryGroup => frame.subcode_title_binary_group,
        pack::Type::VAUXRecordingDate => frame.subcode_vaux_recording_date,
        pack::Type::VAUXRecordingTime => frame.subcode_vaux_recording_time,
        pack::Type::AAUXRecordingDate => frame.subcode_aaux_recording_date,
        pack::Type::AAUXRecordingTime => frame.subcode_aaux_recording_time,
        _ => {
            return Err(FrameError::MissingData {
                message: format!("Pack type {ty:#x} is not supported in the subcode block."),
            })
        }
    })
}

#[cfg(test)]
mod tests {
    use googletest::prelude::*;
    use num::rational::Ratio;

    use super::*;
    use crate::file::{Info, UnvalidatedInfo, ValidInfo, ValidInfoMethods};

    fn ntsc_info() -> ValidInfo {
        UnvalidatedInfo::new(Info {
            file_size: 120_000,
            video_frame_rate: Ratio::<u32>::new(30_000, 1_001),
            video_duration: Ratio::<u128>::new(1_001, 30_000),
            audio_stereo_stream_count: 1,
            audio_sample_rate: Some(48_000),
        })
        .validate()
        .unwrap()
    }

    fn ntsc_ctx() -> pack::PackContext {
        pack::PackContext { file_info: ntsc_info() }
    }

    /// An "empty tape" frame: no markers, no recognized packs, silent audio, blank video. Every
    /// derived (non-stored) field is set to what a real parse of such a frame would compute, so
    /// that re-parsing the serialized bytes reproduces this record exactly.
    fn empty_frame(ctx: &pack::PackContext, channels: usize, sequences: usize) -> Data {
        let np = no_info_pack(ctx);
        Data {
            sequence: 5,
            header_video_frame_dif_sequence_count: sequences as u8,
            header_track_pitch: None,
            header_pilot_frame: None,
            header_application_id_track: None,
            header_application_id_1: None,
            header_application_id_2: None,
            header_application_id_3: None,

            subcode_index: None,
            subcode_skip: None,
            subcode_picture: None,
            subcode_application_id_track: None,
            subcode_application_id_3: None,
            subcode_absolute_track_numbers: vec![vec![None; sequences]; channels],
            subcode_blank_flag: None,

            subcode_pack_types: vec![vec![[0xFFu8; 12]; sequences]; channels],
            subcode_title_timecode: np,
            subcode_title_binary_group: np,
            subcode_vaux_recording_date: np,
            subcode_vaux_recording_time: np,
            subcode_aaux_recording_date: np,
            subcode_aaux_recording_time: np,

            vaux_pack_types: vec![vec![[0xFFu8; 45]; sequences]; channels],
            vaux_source: np,
            vaux_source_control: np,
            vaux_recording_date: np,
            vaux_recording_time: np,
            vaux_binary_group: np,
            vaux_camera_consumer_1: np,
            vaux_camera_consumer_2: np,
            vaux_camera_shutter: np,

            aaux_pack_types: vec![vec![[0xFFu8; 9]; sequences]; channels],
            aaux_source: vec![[np, np]; channels],
            aaux_source_control: vec![[np, np]; channels],
            aaux_recording_date: vec![[np, np]; channels],
            aaux_recording_time: vec![[np, np]; channels],
            aaux_binary_group: vec![[np, np]; channels],

            // No AAUXSource pack was ever observed, so error detection can't establish a sample
            // count and treats every audio block as errored - matching what parse_binary computes.
            audio_data: Some(vec![vec![[[0xFFu8; 72]; 9]; sequences]; channels]),
            audio_data_errors: Some(vec![vec![[true; 9]; sequences]; channels]),
            audio_data_error_summary: vec![[1.0; 2]; channels],

            video_data: Some(vec![vec![[[0u8; 76]; 135]; sequences]; channels]),
            video_status: Some(vec![vec![[0u8; 135]; sequences]; channels]),
            video_data_errors: Some(vec![vec![[false; 135]; sequences]; channels]),
            video_data_error_summary: 0.0,
        }
    }

    #[googletest::test]
    fn test_empty_frame_round_trips() {
        let ctx = ntsc_ctx();
        let info = ntsc_info();
        let frame = empty_frame(&ctx, 1, 10);

        let raw = to_binary(&frame, &info, &ctx).unwrap();
        expect_that!(raw.len(), eq(info.video_frame_size() as usize));

        let parsed = parse_binary(&raw, &info, &ctx).unwrap();
        expect_that!(parsed, eq(frame));

        let raw2 = to_binary(&parsed, &info, &ctx).unwrap();
        expect_that!(raw2, eq(raw));
    }

    #[googletest::test]
    fn test_video_status_round_trips_through_concealment() {
        let ctx = ntsc_ctx();
        let info = ntsc_info();
        let mut frame = empty_frame(&ctx, 1, 10);
        // Flag a couple of macro blocks as concealed (nonzero STA), as a head-clog would.
        frame.video_status.as_mut().unwrap()[0][2][7] = 0x3_u8 << 4;
        frame.video_data_errors = Some({
            let mut errs = vec![vec![[false; 135]; 10]; 1];
            errs[0][2][7] = true;
            errs
        });
        frame.video_data_error_summary = 1.0 / (1.0 * 10.0 * 135.0);

        let raw = to_binary(&frame, &info, &ctx).unwrap();
        let parsed = parse_binary(&raw, &info, &ctx).unwrap();
        expect_that!(parsed.video_status, eq(frame.video_status));
        expect_that!(parsed.video_data_errors, eq(frame.video_data_errors));
    }

    #[googletest::test]
    fn test_corrupted_block_id_is_rejected() {
        let ctx = ntsc_ctx();
        let info = ntsc_info();
        let frame = empty_frame(&ctx, 1, 10);
        let mut raw = to_binary(&frame, &info, &ctx).unwrap();
        // Swap the first block ID's two bytes, which clobbers its always-set reserved nibble.
        raw.swap(0, 1);
        expect_that!(parse_binary(&raw, &info, &ctx), err(anything()));
    }
}
