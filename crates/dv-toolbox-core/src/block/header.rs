use super::BlockError;
use crate::file;

/// Track pitch.
///
/// - IEC 61834-1:1998 Section 6.4 - TIA (track information area)
/// - IEC 61834-1:1998 Amendment 1 - LP mode (long play mode with narrow track pitch)
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TrackPitch {
    /// Standard play, as defined in IEC 61834-1. The track pitch is actually 10 um on DV tapes.
    StandardPlay,
    /// Some form of long play; the exact physical track pitch is not standardized.
    LongPlay,
    /// Defined in SMPTE 306M-2002 Table 17 - Application ID of track information.
    D7StandardFormat,
    /// Reserved value.
    Reserved3,
}

impl TrackPitch {
    fn from_bits(value: u8) -> Self {
        match value {
            0x3 => Self::StandardPlay,
            0x2 => Self::LongPlay,
            0x1 => Self::D7StandardFormat,
            _ => Self::Reserved3,
        }
    }

    fn to_bits(self) -> u8 {
        match self {
            Self::StandardPlay => 0x3,
            Self::LongPlay => 0x2,
            Self::D7StandardFormat => 0x1,
            Self::Reserved3 => 0x0,
        }
    }
}

macro_rules! application_id_enum {
    ($name:ident) => {
        /// Application ID.
        #[derive(Debug, PartialEq, Eq, Clone, Copy)]
        #[allow(missing_docs)]
        pub enum $name {
            ConsumerDigitalVcr,
            D7StandardFormat,
            Reserved2,
            Reserved3,
            Reserved4,
            Reserved5,
            Reserved6,
        }

        impl $name {
            fn from_bits(value: u8) -> Option<Self> {
                match value {
                    0x0 => Some(Self::ConsumerDigitalVcr),
                    0x1 => Some(Self::D7StandardFormat),
                    0x2 => Some(Self::Reserved2),
                    0x3 => Some(Self::Reserved3),
                    0x4 => Some(Self::Reserved4),
                    0x5 => Some(Self::Reserved5),
                    0x6 => Some(Self::Reserved6),
                    _ => None,
                }
            }

            fn to_bits(self) -> u8 {
                match self {
                    Self::ConsumerDigitalVcr => 0x0,
                    Self::D7StandardFormat => 0x1,
                    Self::Reserved2 => 0x2,
                    Self::Reserved3 => 0x3,
                    Self::Reserved4 => 0x4,
                    Self::Reserved5 => 0x5,
                    Self::Reserved6 => 0x6,
                }
            }
        }
    };
}

application_id_enum!(ApplicationIdTrack);
application_id_enum!(ApplicationId1);
application_id_enum!(ApplicationId2);
application_id_enum!(ApplicationId3);

/// Header DIF block: exactly one per DIF sequence, holding data that is not stored on tape but is
/// instead reconstructed by the tape deck's digital interface.
///
/// - IEC 61834-2:1998 Section 11.4.2 - Data part - Header section
/// - SMPTE 306M-2002 Section 11.2.2.1 / Table 56 - Header section
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Header {
    /// Number of DIF sequences in a video frame: 10 for the 525-60 system, 12 for the 625-50
    /// system.
    pub video_frame_dif_sequence_count: u8,

    /// Track pitch and pilot frame must be both present or both absent.
    pub track_pitch: Option<TrackPitch>,
    /// `0` or `1`.
    pub pilot_frame: Option<u8>,

    /// Track application ID (APT).
    pub application_id_track: Option<ApplicationIdTrack>,
    /// Area 1 application ID (AP1).
    pub application_id_1: Option<ApplicationId1>,
    /// Area 2 application ID (AP2).
    pub application_id_2: Option<ApplicationId2>,
    /// Area 3 application ID (AP3).
    pub application_id_3: Option<ApplicationId3>,
}

impl Header {
    /// Checks this block's contents for internal consistency, given context about the file it
    /// came from.
    pub fn validate(&self, file_info: &file::ValidInfo) -> Result<(), String> {
        use crate::file::ValidInfoMethods;

        if self.video_frame_dif_sequence_count != 10 && self.video_frame_dif_sequence_count != 12 {
            return Err("DIF header block must specify sequence count of 10 or 12.".to_string());
        }
        let expected_count = file_info.video_frame_dif_sequence_count();
        if self.video_frame_dif_sequence_count != expected_count {
            return Err(format!(
                "DIF header block does not match with expected system (expected {expected_count} \
                    DIF sequences, got {}).",
                self.video_frame_dif_sequence_count
            ));
        }
        if self.track_pitch.is_some() != self.pilot_frame.is_some() {
            return Err("Track pitch and pilot frame must be both present or absent together.".to_string());
        }
        if let Some(pilot_frame) = self.pilot_frame {
            if pilot_frame > 1 {
                return Err("DIF header block must specify a pilot frame of 0 or 1.".to_string());
            }
        }
        Ok(())
    }

    pub(super) fn parse_binary(block_bytes: &[u8]) -> Result<Self, BlockError> {
        let b = block_bytes;
        if b[0] & 0x40 != 0 {
            return Err(BlockError::Invalid {
                message: "Zero bit in DIF header block is unexpectedly not zero.".to_string(),
            });
        }
        if b[0] & 0x3F != 0x3F
            || (b[1] >> 3) & 0x1 != 0x1
            || (b[2] >> 3) & 0xF != 0xF
            || (b[3] >> 3) & 0xF != 0xF
            || (b[4] >> 3) & 0xF != 0xF
            || b[5..].iter().any(|&v| v != 0xFF)
        {
            return Err(BlockError::Invalid {
                message: "Reserved bits in DIF header block are unexpectedly in use.".to_string(),
            });
        }

        let dftia = (b[1] >> 4) & 0xF;
        let (track_pitch, pilot_frame) = if dftia == 0xF {
            (None, None)
        } else if dftia > 0x7 {
            return Err(BlockError::Invalid {
                message: "Unexpected values in the track information area of the DIF header block."
                    .to_string(),
            });
        } else {
            (Some(TrackPitch::from_bits(dftia >> 1)), Some(dftia & 0x1))
        };

        let apt = b[1] & 0x7;
        let tf1 = (b[2] >> 7) & 0x1;
        let ap1 = b[2] & 0x7;
        let tf2 = (b[3] >> 7) & 0x1;
        let ap2 = b[3] & 0x7;
        let tf3 = (b[4] >> 7) & 0x1;
        let ap3 = b[4] & 0x7;
        if tf1 != 0 || tf2 != 0 || tf3 != 0 {
            return Err(BlockError::Invalid {
                message: "Transmitting flags for some DIF blocks are off in the DIF header block."
                    .to_string(),
            });
        }

        Ok(Self {
            video_frame_dif_sequence_count: if (b[0] >> 7) & 0x1 == 1 { 12 } else { 10 },
            track_pitch,
            pilot_frame,
            application_id_track: ApplicationIdTrack::from_bits(apt),
            application_id_1: ApplicationId1::from_bits(ap1),
            application_id_2: ApplicationId2::from_bits(ap2),
            application_id_3: ApplicationId3::from_bits(ap3),
        })
    }

    pub(super) fn to_binary(&self) -> Vec<u8> {
        let dsf = u8::from(self.video_frame_dif_sequence_count == 12);
        let dftia = match (self.track_pitch, self.pilot_frame) {
            (Some(tp), Some(pf)) => (tp.to_bits() << 1) | (pf & 0x1),
            _ => 0xF,
        };
        let apt = self.application_id_track.map_or(0x7, ApplicationIdTrack::to_bits);
        let ap1 = self.application_id_1.map_or(0x7, ApplicationId1::to_bits);
        let ap2 = self.application_id_2.map_or(0x7, ApplicationId2::to_bits);
        let ap3 = self.application_id_3.map_or(0x7, ApplicationId3::to_bits);

        let mut out = vec![
            (dsf << 7) | 0x3F,
            (dftia << 4) | 0x08 | apt,
            0x78 | ap1,
            0x78 | ap2,
            0x78 | ap3,
        ];
        out.resize(5 + 72, 0xFF);
        out
    }
}

#[cfg(test)]
mod tests {
    use googletest::prelude::*;

    use super::*;
    use crate::block::testutil::ntsc_info;

    #[googletest::test]
    fn test_round_trip_full() {
        let header = Header {
            video_frame_dif_sequence_count: 10,
            track_pitch: Some(TrackPitch::StandardPlay),
            pilot_frame: Some(0),
            application_id_track: Some(ApplicationIdTrack::ConsumerDigitalVcr),
            application_id_1: Some(ApplicationId1::ConsumerDigitalVcr),
            application_id_2: Some(ApplicationId2::ConsumerDigitalVcr),
            application_id_3: Some(ApplicationId3::ConsumerDigitalVcr),
        };
        let raw = header.to_binary();
        let parsed = Header::parse_binary(&raw).unwrap();
        expect_that!(parsed, eq(header));
        expect_that!(header.validate(&ntsc_info()), ok(()));
    }

    #[googletest::test]
    fn test_round_trip_all_absent() {
        let header = Header {
            video_frame_dif_sequence_count: 12,
            track_pitch: None,
            pilot_frame: None,
            application_id_track: None,
            application_id_1: None,
            application_id_2: None,
            application_id_3: None,
        };
        let raw = header.to_binary();
        let parsed = Header::parse_binary(&raw).unwrap();
        expect_that!(parsed, eq(header));
    }

    #[googletest::test]
    fn test_validate_rejects_wrong_system() {
        let header = Header {
            video_frame_dif_sequence_count: 12,
            track_pitch: None,
            pilot_frame: None,
            application_id_track: None,
            application_id_1: None,
            application_id_2: None,
            application_id_3: None,
        };
        expect_that!(header.validate(&ntsc_info()), err(anything()));
    }
}
