//! Model structures for working with 80-byte DIF (Digital Interface Format) blocks: the tape
//! track's atomic unit of transmission, as defined in
//! [IEC 61834-2](https://webstore.iec.ch/en/publication/5984) and other related standards.
//!
//! Each DIF sequence (tape track) is a fixed-length run of these blocks: one [`Header`], two
//! [`Subcode`], three [`VAUX`], and 144 interleaved [`Audio`]/[`Video`] blocks. Use [`parse_binary`]
//! to deserialize a single 80-byte block, and [`Block::to_binary`] to serialize it back.

pub use audio::Audio;
pub use header::{ApplicationId1, ApplicationId2, ApplicationId3, ApplicationIdTrack, Header, TrackPitch};
pub use id::{BlockError, BlockId, BlockType};
pub use subcode::{BlankFlag, Subcode};
pub use vaux::VAUX;
pub use video::Video;

mod audio;
mod header;
mod id;
mod subcode;
#[cfg(test)]
mod testutil;
mod vaux;
mod video;

use crate::pack;

/// Size, in bytes, of a single DIF block, including its 3-byte ID.
pub const BLOCK_SIZE: usize = 80;

/// The fully parsed contents of a single DIF block, tagged with its [`BlockId`].
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Block {
    /// See [`Header`].
    Header(BlockId, Header),
    /// See [`Subcode`].
    Subcode(BlockId, Subcode),
    /// See [`VAUX`].
    VAUX(BlockId, VAUX),
    /// See [`Audio`].
    Audio(BlockId, Audio),
    /// See [`Video`].
    Video(BlockId, Video),
}

impl Block {
    /// The ID common to every block variant.
    pub fn block_id(&self) -> BlockId {
        match *self {
            Self::Header(id, _)
            | Self::Subcode(id, _)
            | Self::VAUX(id, _)
            | Self::Audio(id, _)
            | Self::Video(id, _) => id,
        }
    }

    /// Serializes this block back to its 80-byte binary representation.
    ///
    /// `video_frame_dif_sequence_count` is the number of DIF sequences per channel in the
    /// enclosing video frame (10 or 12); [`Subcode`] needs it to compute its `fr` bit.
    pub fn to_binary(&self, ctx: &pack::PackContext, video_frame_dif_sequence_count: u8) -> [u8; BLOCK_SIZE] {
        let id = self.block_id();
        let contents: Vec<u8> = match self {
            Self::Header(_, h) => h.to_binary(),
            Self::Subcode(id, s) => {
                s.to_binary(id.dif_block, video_frame_dif_sequence_count, id.dif_sequence, ctx)
            }
            Self::VAUX(_, v) => v.to_binary(ctx),
            Self::Audio(_, a) => a.to_binary(ctx),
            Self::Video(_, v) => v.to_binary(),
        };
        let mut out = [0u8; BLOCK_SIZE];
        out[0..3].copy_from_slice(&id.to_binary());
        out[3..].copy_from_slice(&contents);
        out
    }
}

/// Deserializes a single 80-byte DIF block.
///
/// `video_frame_dif_sequence_count` is the number of DIF sequences per channel in the enclosing
/// video frame (10 or 12, per the tape's system); the caller knows this from the file's
/// [`crate::file::ValidInfo`], and [`Subcode`] needs it to decode its `fr` bit.
pub fn parse_binary(
    block_bytes: &[u8; BLOCK_SIZE],
    ctx: &pack::PackContext,
    video_frame_dif_sequence_count: u8,
) -> Result<Block, BlockError> {
    let id = BlockId::parse_binary(block_bytes[0..3].try_into().unwrap())?;
    let contents = &block_bytes[3..];
    match id.section_type {
        BlockType::Header => Ok(Block::Header(id, Header::parse_binary(contents)?)),
        BlockType::Subcode => Ok(Block::Subcode(
            id,
            Subcode::parse_binary(
                contents,
                id.dif_sequence,
                id.dif_block,
                video_frame_dif_sequence_count,
                ctx,
            )?,
        )),
        BlockType::VAUX => Ok(Block::VAUX(id, VAUX::parse_binary(contents, ctx)?)),
        BlockType::Audio => Ok(Block::Audio(id, Audio::parse_binary(contents, ctx)?)),
        BlockType::Video => Ok(Block::Video(id, Video::parse_binary(contents)?)),
    }
}

#[cfg(test)]
mod tests {
    use googletest::prelude::*;

    use super::*;
    use crate::block::testutil::ntsc_ctx;

    #[googletest::test]
    fn test_dispatch_header() {
        let ctx = ntsc_ctx();
        let id = BlockId { section_type: BlockType::Header, sequence: 0xF, channel: 0, dif_sequence: 3, dif_block: 0 };
        let mut raw = [0u8; BLOCK_SIZE];
        raw[0..3].copy_from_slice(&id.to_binary());
        raw[3] = 0x3F;
        raw[4] = 0xFF;
        raw[5..8].copy_from_slice(&[0x7F, 0x7F, 0x7F]);
        raw[8..].copy_from_slice(&[0xFF; 72]);

        let block = parse_binary(&raw, &ctx, 10).unwrap();
        assert_that!(block.block_id(), eq(id));
        let written = block.to_binary(&ctx, 10);
        expect_that!(written, eq(raw));
    }

    #[googletest::test]
    fn test_dispatch_video() {
        let ctx = ntsc_ctx();
        let id = BlockId { section_type: BlockType::Video, sequence: 0x2, channel: 0, dif_sequence: 3, dif_block: 50 };
        let mut raw = [0u8; BLOCK_SIZE];
        raw[0..3].copy_from_slice(&id.to_binary());
        raw[3] = 0x00;
        raw[4..].copy_from_slice(&[0xCC; 76]);

        let block = parse_binary(&raw, &ctx, 10).unwrap();
        assert_that!(block.block_id(), eq(id));
        let written = block.to_binary(&ctx, 10);
        expect_that!(written, eq(raw));
    }

    #[googletest::test]
    fn test_unknown_block_type_is_rejected() {
        let ctx = ntsc_ctx();
        let raw = [0xA0u8; BLOCK_SIZE];
        expect_that!(parse_binary(&raw, &ctx, 10), err(anything()));
    }
}
