use snafu::prelude::*;

/// Identifies which section of the tape track a DIF block belongs to.
///
/// - IEC 61834-2:1998 Section 11.4.1 - ID part
/// - SMPTE 306M-2002 Section 11.2.1 - ID
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BlockType {
    /// Exactly one per DIF sequence.
    Header,
    /// Two per DIF sequence.
    Subcode,
    /// Three per DIF sequence.
    VAUX,
    /// Nine per DIF sequence.
    Audio,
    /// 135 per DIF sequence.
    Video,
}

impl BlockType {
    fn section_type(self) -> u8 {
        match self {
            Self::Header => 0,
            Self::Subcode => 1,
            Self::VAUX => 2,
            Self::Audio => 3,
            Self::Video => 4,
        }
    }

    fn from_section_type(value: u8) -> Result<Self, BlockError> {
        match value {
            0 => Ok(Self::Header),
            1 => Ok(Self::Subcode),
            2 => Ok(Self::VAUX),
            3 => Ok(Self::Audio),
            4 => Ok(Self::Video),
            unk => UnknownSectionTypeSnafu { value: unk }.fail(),
        }
    }
}

/// The identifier prefixed to every 80-byte DIF block, identifying its position within the DIF
/// sequence and the video frame.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct BlockId {
    /// Which kind of section this DIF block belongs to.
    pub section_type: BlockType,

    /// A nonce shared by every block of a given frame, except [`BlockType::Header`] and
    /// [`BlockType::Subcode`] blocks, where it is always `0xF`. Lets a reader confirm that blocks
    /// scattered across the tape truly belong to the same frame.
    pub sequence: u8,

    /// Which half of the channel's DIF sequences this block was transmitted from; only
    /// meaningful for multi-channel formats. Normally `0`.
    pub channel: u8,

    /// DIF sequence number (a.k.a. track number) within the video frame; `0..12`.
    pub dif_sequence: u8,

    /// DIF block number within the section; `0` for [`BlockType::Header`], `0..2` for
    /// [`BlockType::Subcode`], `0..3` for [`BlockType::VAUX`], `0..9` for [`BlockType::Audio`],
    /// `0..135` for [`BlockType::Video`].
    pub dif_block: u8,
}

/// Error parsing a DIF block ID or block contents.
#[derive(Debug, Snafu)]
#[allow(missing_docs)]
pub enum BlockError {
    #[snafu(display("Unknown DIF block section type {value:#x}."))]
    UnknownSectionType { value: u8 },

    #[snafu(display("{message}"))]
    Invalid { message: String },
}

impl BlockId {
    /// Parses a 3-byte DIF block ID.
    pub fn parse_binary(id_bytes: &[u8; 3]) -> Result<Self, BlockError> {
        let section_type = BlockType::from_section_type((id_bytes[0] >> 5) & 0x7)?;
        let sequence = (id_bytes[0] >> 1) & 0xF;
        let channel = id_bytes[0] & 0x1;
        if id_bytes[1] & 0xF != 0xF {
            return Err(BlockError::Invalid {
                message: "Reserved bits in DIF block ID are unexpectedly not set.".to_string(),
            });
        }
        let dif_sequence = (id_bytes[1] >> 4) & 0xF;
        let dif_block = id_bytes[2];
        Ok(Self { section_type, sequence, channel, dif_sequence, dif_block })
    }

    /// Serializes this block ID back to its 3-byte binary representation.
    pub fn to_binary(self) -> [u8; 3] {
        [
            (self.section_type.section_type() << 5) | ((self.sequence & 0xF) << 1) | (self.channel & 0x1),
            ((self.dif_sequence & 0xF) << 4) | 0xF,
            self.dif_block,
        ]
    }
}

#[cfg(test)]
mod tests {
    use googletest::prelude::*;

    use super::*;

    #[googletest::test]
    fn test_round_trip() {
        let id = BlockId {
            section_type: BlockType::Video,
            sequence: 0x3,
            channel: 0,
            dif_sequence: 9,
            dif_block: 134,
        };
        let raw = id.to_binary();
        let parsed = BlockId::parse_binary(&raw).unwrap();
        expect_that!(parsed, eq(id));
    }

    #[googletest::test]
    fn test_unknown_section_type() {
        let result = BlockId::parse_binary(&[0xFF, 0x00, 0xFF]);
        expect_that!(result, err(anything()));
    }
}
