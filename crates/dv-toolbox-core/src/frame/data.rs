use crate::{block, file, pack};

/// Top-level, consolidated record for a single DV video frame.
///
/// A frame is assembled from many individual DIF blocks, some of which disagree with each other
/// (tape dropouts, or fields that are simply expected to repeat). This record holds the
/// majority-voted, single consistent view of the frame, plus the raw per-block matrices needed to
/// losslessly reconstruct the original bytes via [`super::to_binary`].
#[derive(Debug, PartialEq, Clone)]
pub struct Data {
    /// Per-frame sequence nonce, reproduced in the `BlockId` of every non-Header/Subcode block.
    pub sequence: u8,

    // ===== Header block =====
    /// Number of DIF sequences in a video frame: 10 for the 525-60 system, 12 for the 625-50
    /// system.
    pub header_video_frame_dif_sequence_count: u8,
    /// See [`block::TrackPitch`].
    pub header_track_pitch: Option<block::TrackPitch>,
    /// `0` or `1`.
    pub header_pilot_frame: Option<u8>,
    /// See [`block::ApplicationIdTrack`].
    pub header_application_id_track: Option<block::ApplicationIdTrack>,
    /// See [`block::ApplicationId1`].
    pub header_application_id_1: Option<block::ApplicationId1>,
    /// See [`block::ApplicationId2`].
    pub header_application_id_2: Option<block::ApplicationId2>,
    /// See [`block::ApplicationId3`].
    pub header_application_id_3: Option<block::ApplicationId3>,

    // ===== Subcode block: ID part =====
    /// Index search marker. `None` if no sync block in the frame could supply it.
    pub subcode_index: Option<bool>,
    /// Skip search marker.
    pub subcode_skip: Option<bool>,
    /// Still picture marker.
    pub subcode_picture: Option<bool>,
    /// Track application ID, as reproduced in subcode.
    pub subcode_application_id_track: Option<block::ApplicationIdTrack>,
    /// Area 3 application ID, as reproduced in subcode.
    pub subcode_application_id_3: Option<block::ApplicationId3>,
    /// Absolute track number, indexed `[channel][dif_sequence]`. `None` if not recoverable.
    pub subcode_absolute_track_numbers: Vec<Vec<Option<u32>>>,
    /// See [`block::BlankFlag`].
    pub subcode_blank_flag: Option<block::BlankFlag>,

    // ===== Subcode block: pack part =====
    /// Pack type byte observed at each slot, indexed `[channel][dif_sequence][sync_block: 12]`.
    pub subcode_pack_types: Vec<Vec<[u8; 12]>>,
    /// Majority-voted [`pack::Pack::TitleTimecode`] (or [`pack::Pack::NoInfo`] if never observed).
    pub subcode_title_timecode: pack::Pack,
    /// Majority-voted [`pack::Pack::TitleBinaryGroup`].
    pub subcode_title_binary_group: pack::Pack,
    /// Majority-voted [`pack::Pack::VAUXRecordingDate`].
    pub subcode_vaux_recording_date: pack::Pack,
    /// Majority-voted [`pack::Pack::VAUXRecordingTime`].
    pub subcode_vaux_recording_time: pack::Pack,
    /// Majority-voted [`pack::Pack::AAUXRecordingDate`].
    pub subcode_aaux_recording_date: pack::Pack,
    /// Majority-voted [`pack::Pack::AAUXRecordingTime`].
    pub subcode_aaux_recording_time: pack::Pack,

    // ===== VAUX block =====
    /// Pack type byte observed at each slot, indexed `[channel][dif_sequence][sync_block: 45]`.
    pub vaux_pack_types: Vec<Vec<[u8; 45]>>,
    /// Majority-voted [`pack::Pack::VAUXSource`].
    pub vaux_source: pack::Pack,
    /// Majority-voted [`pack::Pack::VAUXSourceControl`].
    pub vaux_source_control: pack::Pack,
    /// Majority-voted [`pack::Pack::VAUXRecordingDate`].
    pub vaux_recording_date: pack::Pack,
    /// Majority-voted [`pack::Pack::VAUXRecordingTime`].
    pub vaux_recording_time: pack::Pack,
    /// Majority-voted [`pack::Pack::VAUXBinaryGroup`].
    pub vaux_binary_group: pack::Pack,
    /// Majority-voted [`pack::Pack::CameraConsumer1`].
    pub vaux_camera_consumer_1: pack::Pack,
    /// Majority-voted [`pack::Pack::CameraConsumer2`].
    pub vaux_camera_consumer_2: pack::Pack,
    /// Majority-voted [`pack::Pack::CameraShutter`].
    pub vaux_camera_shutter: pack::Pack,

    // ===== Audio block: AAUX =====
    /// Pack type byte observed at each slot, indexed `[channel][dif_sequence][sync_block: 9]`.
    pub aaux_pack_types: Vec<Vec<[u8; 9]>>,
    /// Majority-voted [`pack::Pack::AAUXSource`], indexed `[channel][audio_block]`.
    pub aaux_source: Vec<[pack::Pack; 2]>,
    /// Majority-voted [`pack::Pack::AAUXSourceControl`], indexed `[channel][audio_block]`.
    pub aaux_source_control: Vec<[pack::Pack; 2]>,
    /// Majority-voted [`pack::Pack::AAUXRecordingDate`], indexed `[channel][audio_block]`.
    pub aaux_recording_date: Vec<[pack::Pack; 2]>,
    /// Majority-voted [`pack::Pack::AAUXRecordingTime`], indexed `[channel][audio_block]`.
    pub aaux_recording_time: Vec<[pack::Pack; 2]>,
    /// Majority-voted [`pack::Pack::AAUXBinaryGroup`], indexed `[channel][audio_block]`.
    pub aaux_binary_group: Vec<[pack::Pack; 2]>,

    /// Raw PCM audio samples, indexed `[channel][dif_sequence][audio_block: 9]`. `None` if audio
    /// data was not captured/requested.
    pub audio_data: Option<Vec<Vec<[[u8; 72]; 9]>>>,
    /// Whether the corresponding audio block has dropout errors, same shape as `audio_data`.
    pub audio_data_errors: Option<Vec<Vec<[bool; 9]>>>,
    /// Proportion `[0.0, 1.0]` of audio blocks with errors, indexed `[channel][audio_block]`.
    pub audio_data_error_summary: Vec<[f64; 2]>,

    // ===== Video block =====
    /// Raw compressed macro blocks, indexed `[channel][dif_sequence][video_block: 135]`. `None`
    /// if video data was not captured/requested.
    pub video_data: Option<Vec<Vec<[[u8; 76]; 135]>>>,
    /// Raw STA (high nibble) / QNO (low nibble) byte observed for each macro block, same shape
    /// as `video_data`. Preserved so that writing the frame back out reproduces the same
    /// concealment status rather than fabricating a clean one.
    pub video_status: Option<Vec<Vec<[u8; 135]>>>,
    /// Whether the corresponding macro block has a (potentially concealed) error, same shape as
    /// `video_data`.
    pub video_data_errors: Option<Vec<Vec<[bool; 135]>>>,
    /// Proportion `[0.0, 1.0]` of video blocks across the whole frame with errors.
    pub video_data_error_summary: f64,
}

impl Data {
    /// Checks this frame's array dimensions for internal consistency against `file_info`.
    ///
    /// Detailed per-field validation is the responsibility of the blocks and packs that this
    /// frame was assembled from; this only double-checks array shapes.
    pub fn validate(&self, file_info: &file::ValidInfo) -> Result<(), String> {
        use file::ValidInfoMethods;

        let channels = file_info.video_frame_channel_count() as usize;
        let sequences = file_info.video_frame_dif_sequence_count() as usize;

        let check_outer = |name: &str, len: usize| -> Result<(), String> {
            if len != channels {
                return Err(format!(
                    "Frame field {name} has {len} channels, but expected {channels}."
                ));
            }
            Ok(())
        };
        check_outer("subcode_absolute_track_numbers", self.subcode_absolute_track_numbers.len())?;
        check_outer("subcode_pack_types", self.subcode_pack_types.len())?;
        check_outer("vaux_pack_types", self.vaux_pack_types.len())?;
        check_outer("aaux_pack_types", self.aaux_pack_types.len())?;
        check_outer("aaux_source", self.aaux_source.len())?;
        check_outer("aaux_source_control", self.aaux_source_control.len())?;
        check_outer("aaux_recording_date", self.aaux_recording_date.len())?;
        check_outer("aaux_recording_time", self.aaux_recording_time.len())?;
        check_outer("aaux_binary_group", self.aaux_binary_group.len())?;
        check_outer("audio_data_error_summary", self.audio_data_error_summary.len())?;
        if let Some(ad) = &self.audio_data {
            check_outer("audio_data", ad.len())?;
        }
        if let Some(ve) = &self.video_data {
            check_outer("video_data", ve.len())?;
        }
        if let Some(vs) = &self.video_status {
            check_outer("video_status", vs.len())?;
        }

        for channel in 0..channels {
            if self.subcode_absolute_track_numbers[channel].len() != sequences {
                return Err("subcode_absolute_track_numbers has wrong sequence count.".to_string());
            }
            if self.subcode_pack_types[channel].len() != sequences
                || self.vaux_pack_types[channel].len() != sequences
                || self.aaux_pack_types[channel].len() != sequences
            {
                return Err("Pack type matrix has wrong sequence count.".to_string());
            }
            if let Some(ad) = &self.audio_data {
                if ad[channel].len() != sequences {
                    return Err("audio_data has wrong sequence count.".to_string());
                }
            }
            if let Some(ve) = &self.video_data {
                if ve[channel].len() != sequences {
                    return Err("video_data has wrong sequence count.".to_string());
                }
            }
            if let Some(vs) = &self.video_status {
                if vs[channel].len() != sequences {
                    return Err("video_status has wrong sequence count.".to_string());
                }
            }
        }
        Ok(())
    }
}
