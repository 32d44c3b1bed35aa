use super::BlockError;
use crate::file;

/// DIF video block: 135 per DIF sequence, each holding one compressed macro block.
///
/// - IEC 61834-2:1998 Section 11.4.2 - Data part - Video section
/// - SMPTE 306M-2002 Section 11.2.2.5 - Video section
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Video {
    /// Status nibble (STA). Non-zero indicates a tape read error affecting this macro block.
    pub status: u8,
    /// Quantization number (QNO) applied to the macro block.
    pub quantization_number: u8,
    /// Compressed DCT data; always 76 bytes.
    pub dct_blocks: [u8; 76],
}

impl Video {
    pub(super) fn parse_binary(block_bytes: &[u8]) -> Result<Self, BlockError> {
        let status = (block_bytes[0] >> 4) & 0xF;
        let quantization_number = block_bytes[0] & 0xF;
        let dct_blocks: [u8; 76] = block_bytes[1..77].try_into().unwrap();
        Ok(Self { status, quantization_number, dct_blocks })
    }

    pub(super) fn to_binary(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(77);
        out.push((self.status << 4) | self.quantization_number);
        out.extend_from_slice(&self.dct_blocks);
        out
    }

    pub fn validate(&self, _file_info: &file::ValidInfo) -> Result<(), String> {
        Ok(())
    }

    /// Returns whether this macro block was flagged with a tape read error.
    pub fn has_video_errors(&self) -> bool {
        self.status != 0x0
    }
}

#[cfg(test)]
mod tests {
    use googletest::prelude::*;

    use super::*;

    #[googletest::test]
    fn test_round_trip() {
        let video = Video { status: 0x3, quantization_number: 0xA, dct_blocks: [0x5A; 76] };
        let raw = video.to_binary();
        let parsed = Video::parse_binary(&raw).unwrap();
        expect_that!(parsed, eq(video));
    }

    #[googletest::test]
    fn test_has_video_errors_when_status_nonzero() {
        let video = Video { status: 0x1, quantization_number: 0, dct_blocks: [0; 76] };
        expect_that!(video.has_video_errors(), eq(true));
    }

    #[googletest::test]
    fn test_no_video_errors_when_status_zero() {
        let video = Video { status: 0x0, quantization_number: 0, dct_blocks: [0; 76] };
        expect_that!(video.has_video_errors(), eq(false));
    }
}
