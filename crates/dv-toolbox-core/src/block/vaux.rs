use super::BlockError;
use crate::{file, pack};

/// VAUX (video auxiliary) DIF block: three per DIF sequence, holding 15 packs of auxiliary data
/// about the recorded video.
///
/// - IEC 61834-2:1998 Section 11.4.2 - Data part - VAUX section
/// - SMPTE 306M-2002 Section 11.2.2.3 - VAUX section
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct VAUX {
    /// Parsed packs. A pack that failed to parse or validate is reported as [`pack::Pack::Invalid`]
    /// rather than being dropped, so that its raw bytes and type are preserved.
    pub packs: [pack::Pack; 15],
}

impl VAUX {
    pub(super) fn parse_binary(
        block_bytes: &[u8],
        ctx: &pack::PackContext,
    ) -> Result<Self, BlockError> {
        if block_bytes[75..].iter().any(|&v| v != 0xFF) {
            return Err(BlockError::Invalid {
                message: "Reserved bits in DIF VAUX block are unexpectedly in use.".to_string(),
            });
        }

        let mut packs = [pack::Pack::Unknown(0xFF, pack::ValidPack::try_from_raw(&[0xFF; 4], ctx).unwrap()); 15];
        for (i, pack) in packs.iter_mut().enumerate() {
            let raw: [u8; 5] = block_bytes[i * 5..i * 5 + 5].try_into().unwrap();
            let (parsed, _err) = pack::Pack::from_raw(&raw, ctx);
            *pack = parsed;
        }

        Ok(Self { packs })
    }

    pub(super) fn to_binary(&self, ctx: &pack::PackContext) -> Vec<u8> {
        let mut out = Vec::with_capacity(77);
        for pack in &self.packs {
            out.extend_from_slice(&pack.to_raw(ctx));
        }
        out.extend_from_slice(&[0xFF, 0xFF]);
        out
    }

    /// No cross-field invariants beyond the fixed array size, which is enforced by the type.
    pub fn validate(&self, _file_info: &file::ValidInfo) -> Result<(), String> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use googletest::prelude::*;

    use super::*;
    use crate::block::testutil::ntsc_ctx;

    #[googletest::test]
    fn test_round_trip_all_no_info() {
        let ctx = ntsc_ctx();
        let vaux = VAUX::parse_binary(&[0xFF; 77], &ctx).unwrap();
        let raw = vaux.to_binary(&ctx);
        expect_that!(raw.as_slice(), eq([0xFF; 77].as_slice()));
        expect_that!(VAUX::parse_binary(&raw, &ctx).unwrap(), eq(vaux));
    }

    #[googletest::test]
    fn test_reserved_bits_must_be_0xff() {
        let ctx = ntsc_ctx();
        let mut raw = [0xFFu8; 77];
        raw[75] = 0x00;
        expect_that!(VAUX::parse_binary(&raw, &ctx), err(anything()));
    }
}
