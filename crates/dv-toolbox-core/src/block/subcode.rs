use super::{
    header::{ApplicationId3, ApplicationIdTrack},
    BlockError,
};
use crate::{file, pack};

/// Whether there is a discontinuity in the absolute track number prior to the current track.
///
/// - IEC 61834-2:1998 Section 8.4.4 - Absolute track number - Numbering of absolute track number
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BlankFlag {
    /// There is a discontinuity in absolute track numbers prior to this track.
    Discontinuous,
    /// Absolute track numbers are sequential up to this track.
    Continuous,
}

/// DIF subcode block: two per DIF sequence, each holding 6 of the 12 subcode sync blocks for a
/// track.
///
/// - IEC 61834-2:1998 Section 11.4.2 - Data part - Subcode section
/// - SMPTE 306M-2002 Section 11.2.2.2 - Subcode section
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Subcode {
    /// Index search marker, one per non-application-ID sync block. `None` means a read error.
    pub index: [Option<bool>; 5],
    /// Skip search marker, one per non-application-ID sync block. `None` means a read error.
    pub skip: [Option<bool>; 5],
    /// Still picture marker, one per non-application-ID sync block. `None` means a read error.
    pub picture: [Option<bool>; 5],

    /// Track application ID, reproduced from the header; only physically present in DIF subcode
    /// block 1.
    pub application_id_track: Option<ApplicationIdTrack>,
    /// Area 3 application ID, reproduced from the header; present in both DIF subcode blocks.
    pub application_id_3: Option<ApplicationId3>,

    /// Absolute track number, least significant byte, one per ABST copy (2 per DIF block).
    pub absolute_track_number_0: [Option<u8>; 2],
    /// Absolute track number, middle byte, one per ABST copy (2 per DIF block).
    pub absolute_track_number_1: [Option<u8>; 2],
    /// Absolute track number, most significant byte, one per ABST copy (2 per DIF block).
    pub absolute_track_number_2: [Option<u8>; 2],
    /// Blank flag, one per ABST copy (2 per DIF block).
    pub blank_flag: [Option<BlankFlag>; 2],

    /// Parsed packs, one per sync block (6 per DIF block). Reported as [`pack::Pack::Invalid`]
    /// rather than dropped if a pack failed to parse or validate.
    pub packs: [pack::Pack; 6],
}

impl Subcode {
    /// Checks this block's contents for internal consistency.
    ///
    /// `dif_block` is the DIF block number (`0` or `1`) that this subcode block was found at,
    /// since the number of tag-bit slots (5 vs. 4) and the application ID layout both depend on
    /// it.
    pub fn validate(&self, dif_block: u8) -> Result<(), String> {
        if dif_block > 1 {
            return Err("Unexpected number of DIF blocks in DIF sequence; expected 2.".to_string());
        }

        let tag_count = if dif_block == 0 { 5 } else { 4 };
        for dif_sync_block_number in 0..6usize {
            let id_part_missing = if dif_sync_block_number == 0 {
                self.application_id_3.is_none()
            } else if dif_block == 1 && dif_sync_block_number == 5 {
                self.application_id_track.is_none()
            } else {
                let tag_index = dif_sync_block_number - 1;
                if tag_index >= tag_count {
                    continue;
                }
                let missing = self.index[tag_index].is_none();
                if (self.skip[tag_index].is_none()) != missing
                    || (self.picture[tag_index].is_none()) != missing
                {
                    return Err(format!(
                        "All parts of sync block {} must be all present or absent.",
                        dif_block as usize * 6 + dif_sync_block_number
                    ));
                }
                missing
            };

            let abst_index = dif_sync_block_number / 3;
            let uneven = format!(
                "All parts of sync block {} must be all present or absent.",
                dif_block as usize * 6 + dif_sync_block_number
            );
            match dif_sync_block_number % 3 {
                0 => {
                    if (self.absolute_track_number_0[abst_index].is_none()) != id_part_missing
                        || (self.blank_flag[abst_index].is_none()) != id_part_missing
                    {
                        return Err(uneven);
                    }
                }
                1 => {
                    if (self.absolute_track_number_1[abst_index].is_none()) != id_part_missing {
                        return Err(uneven);
                    }
                }
                _ => {
                    if (self.absolute_track_number_2[abst_index].is_none()) != id_part_missing {
                        return Err(uneven);
                    }
                }
            }
        }

        Ok(())
    }

    pub(super) fn parse_binary(
        block_bytes: &[u8],
        dif_sequence: u8,
        dif_block: u8,
        video_frame_dif_sequence_count: u8,
        ctx: &pack::PackContext,
    ) -> Result<Self, BlockError> {
        let mut index = [None; 5];
        let mut skip = [None; 5];
        let mut picture = [None; 5];
        let mut application_id_track = None;
        let mut application_id_3 = None;
        let mut absolute_track_number_0 = [None; 2];
        let mut absolute_track_number_1 = [None; 2];
        let mut absolute_track_number_2 = [None; 2];
        let mut blank_flag = [None; 2];

        let expected_first_half_id: u8 =
            u8::from(dif_sequence < video_frame_dif_sequence_count / 2);

        for dif_sync_block_number in 0..6usize {
            let sync_block = &block_bytes[dif_sync_block_number * 8..dif_sync_block_number * 8 + 8];
            let id0 = sync_block[0];
            let id1 = sync_block[1];
            let parity = sync_block[2];

            let expected_syb = dif_block as usize * 6 + dif_sync_block_number;
            let fr = (id0 >> 7) & 0x1;
            let syb = id1 & 0xF;
            if fr != expected_first_half_id || syb != expected_syb as u8 {
                continue;
            }
            let application_id = (id0 >> 4) & 0x7;
            if dif_sync_block_number == 0 && application_id == 0x7 {
                continue;
            }
            if dif_block == 1 && dif_sync_block_number == 5 && application_id == 0x7 {
                continue;
            }
            if parity != 0xFF {
                return Err(BlockError::Invalid {
                    message: format!(
                        "Sync block parity byte is not 0xFF for sync block {expected_syb}."
                    ),
                });
            }

            if dif_sync_block_number == 0 {
                application_id_3 = super::header::ApplicationId3::from_bits(application_id);
            } else if dif_block == 1 && dif_sync_block_number == 5 {
                application_id_track = ApplicationIdTrack::from_bits(application_id);
            } else {
                let tag_index = dif_sync_block_number - 1;
                index[tag_index] = Some((id0 >> 6) & 0x1 == 0);
                skip[tag_index] = Some((id0 >> 5) & 0x1 == 0);
                picture[tag_index] = Some((id0 >> 4) & 0x1 == 0);
            }

            let abst_index = dif_sync_block_number / 3;
            match dif_sync_block_number % 3 {
                0 => {
                    let abst_upper = id0 & 0xF;
                    let abst_lower = (id1 >> 5) & 0x7;
                    absolute_track_number_0[abst_index] = Some((abst_upper << 3) | abst_lower);
                    blank_flag[abst_index] = Some(if (id1 >> 4) & 0x1 == 1 {
                        BlankFlag::Continuous
                    } else {
                        BlankFlag::Discontinuous
                    });
                }
                1 => {
                    let abst_upper = id0 & 0xF;
                    let abst_lower = (id1 >> 4) & 0xF;
                    absolute_track_number_1[abst_index] = Some((abst_upper << 4) | abst_lower);
                }
                _ => {
                    let abst_upper = id0 & 0xF;
                    let abst_lower = (id1 >> 4) & 0xF;
                    absolute_track_number_2[abst_index] = Some((abst_upper << 4) | abst_lower);
                }
            }
        }

        let mut packs = [pack::Pack::Unknown(0xFF, pack::ValidPack::try_from_raw(&[0xFF; 4], ctx).unwrap()); 6];
        for (i, pack_slot) in packs.iter_mut().enumerate() {
            let raw: [u8; 5] = block_bytes[48 + i * 5..48 + i * 5 + 5].try_into().unwrap();
            let (parsed, _err) = pack::Pack::from_raw(&raw, ctx);
            *pack_slot = parsed;
        }

        if block_bytes[78..].iter().any(|&v| v != 0xFF) {
            return Err(BlockError::Invalid {
                message: "Reserved bits in DIF subcode block are unexpectedly in use.".to_string(),
            });
        }

        Ok(Self {
            index,
            skip,
            picture,
            application_id_track,
            application_id_3,
            absolute_track_number_0,
            absolute_track_number_1,
            absolute_track_number_2,
            blank_flag,
            packs,
        })
    }

    pub(super) fn to_binary(&self, dif_block: u8, video_frame_dif_sequence_count: u8, dif_sequence: u8, ctx: &pack::PackContext) -> Vec<u8> {
        let mut out = Vec::with_capacity(77);

        for dif_sync_block_number in 0..6usize {
            let mut id_block_valid = true;
            let (application_id, index, skip, picture) = if dif_sync_block_number == 0 {
                id_block_valid &= self.application_id_3.is_some();
                (self.application_id_3.map_or(0x7, ApplicationId3::to_bits), None, None, None)
            } else if dif_block == 1 && dif_sync_block_number == 5 {
                id_block_valid &= self.application_id_track.is_some();
                (self.application_id_track.map_or(0x7, ApplicationIdTrack::to_bits), None, None, None)
            } else {
                let tag_index = dif_sync_block_number - 1;
                id_block_valid &= self.index[tag_index].is_some()
                    && self.skip[tag_index].is_some()
                    && self.picture[tag_index].is_some();
                (
                    0,
                    Some(u8::from(!self.index[tag_index].unwrap_or(false))),
                    Some(u8::from(!self.skip[tag_index].unwrap_or(false))),
                    Some(u8::from(!self.picture[tag_index].unwrap_or(false))),
                )
            };

            let abst_index = dif_sync_block_number / 3;
            let (abst_upper, abst_lower, bf) = match dif_sync_block_number % 3 {
                0 => {
                    let atn = self.absolute_track_number_0[abst_index];
                    id_block_valid &= atn.is_some() && self.blank_flag[abst_index].is_some();
                    let abst = atn.unwrap_or(0x7F);
                    let bf = self.blank_flag[abst_index]
                        .map(|b| matches!(b, BlankFlag::Continuous) as u8)
                        .unwrap_or(0x1);
                    (abst >> 3, abst & 0x7, Some(bf))
                }
                1 => {
                    let atn = self.absolute_track_number_1[abst_index];
                    id_block_valid &= atn.is_some();
                    let abst = atn.unwrap_or(0xFF);
                    (abst >> 4, abst & 0xF, None)
                }
                _ => {
                    let atn = self.absolute_track_number_2[abst_index];
                    id_block_valid &= atn.is_some();
                    let abst = atn.unwrap_or(0xFF);
                    (abst >> 4, abst & 0xF, None)
                }
            };

            let fr = if id_block_valid {
                u8::from(dif_sequence < video_frame_dif_sequence_count / 2)
            } else {
                1
            };
            let syb = if id_block_valid { (dif_block as usize * 6 + dif_sync_block_number) as u8 } else { 0xF };

            let id0 = match (index, skip, picture) {
                (Some(index), Some(skip), Some(picture)) => {
                    (fr << 7) | (index << 6) | (skip << 5) | (picture << 4) | abst_upper
                }
                _ => (fr << 7) | (application_id << 4) | abst_upper,
            };
            let id1 = match bf {
                Some(bf) => (abst_lower << 5) | (bf << 4) | syb,
                None => (abst_lower << 4) | syb,
            };

            out.push(id0);
            out.push(id1);
            out.push(0xFF);
            out.extend_from_slice(&self.packs[dif_sync_block_number].to_raw(ctx));
        }

        out.extend_from_slice(&[0xFF; 29]);
        out
    }
}

#[cfg(test)]
mod tests {
    use googletest::prelude::*;

    use super::*;
    use crate::block::testutil::ntsc_ctx;

    fn no_info_packs(ctx: &pack::PackContext) -> [pack::Pack; 6] {
        [pack::Pack::from_raw(&[0xFF; 5], ctx).0; 6]
    }

    #[googletest::test]
    fn test_round_trip_dif_block_0() {
        let ctx = ntsc_ctx();
        let subcode = Subcode {
            index: [Some(true), Some(false), Some(true), Some(false), Some(true)],
            skip: [Some(false), Some(true), Some(false), Some(true), Some(false)],
            picture: [Some(true), Some(true), Some(false), Some(false), Some(true)],
            application_id_track: None,
            application_id_3: Some(ApplicationId3::ConsumerDigitalVcr),
            absolute_track_number_0: [Some(0x10), Some(0x20)],
            absolute_track_number_1: [Some(0x11), Some(0x22)],
            absolute_track_number_2: [Some(0x33), Some(0x44)],
            blank_flag: [Some(BlankFlag::Continuous), Some(BlankFlag::Discontinuous)],
            packs: no_info_packs(&ctx),
        };
        let raw = subcode.to_binary(0, 10, 2, &ctx);
        let parsed = Subcode::parse_binary(&raw, 2, 0, 10, &ctx).unwrap();
        expect_that!(parsed, eq(subcode));
        expect_that!(subcode.validate(0), ok(()));
    }

    #[googletest::test]
    fn test_round_trip_dif_block_1() {
        let ctx = ntsc_ctx();
        let subcode = Subcode {
            index: [Some(true), Some(false), Some(true), Some(false), None],
            skip: [Some(false), Some(true), Some(false), Some(true), None],
            picture: [Some(true), Some(true), Some(false), Some(false), None],
            application_id_track: Some(ApplicationIdTrack::ConsumerDigitalVcr),
            application_id_3: Some(ApplicationId3::ConsumerDigitalVcr),
            absolute_track_number_0: [Some(0x10), Some(0x20)],
            absolute_track_number_1: [Some(0x11), Some(0x22)],
            absolute_track_number_2: [Some(0x33), Some(0x44)],
            blank_flag: [Some(BlankFlag::Continuous), Some(BlankFlag::Discontinuous)],
            packs: no_info_packs(&ctx),
        };
        let raw = subcode.to_binary(1, 10, 2, &ctx);
        let parsed = Subcode::parse_binary(&raw, 2, 1, 10, &ctx).unwrap();
        expect_that!(parsed, eq(subcode));
        expect_that!(subcode.validate(1), ok(()));
    }

    #[googletest::test]
    fn test_validate_rejects_partially_present_sync_block() {
        let ctx = ntsc_ctx();
        let mut subcode = Subcode {
            index: [Some(true); 5],
            skip: [Some(true); 5],
            picture: [Some(true); 5],
            application_id_track: None,
            application_id_3: Some(ApplicationId3::ConsumerDigitalVcr),
            absolute_track_number_0: [Some(0x10), Some(0x20)],
            absolute_track_number_1: [Some(0x11), Some(0x22)],
            absolute_track_number_2: [Some(0x33), Some(0x44)],
            blank_flag: [Some(BlankFlag::Continuous), Some(BlankFlag::Discontinuous)],
            packs: no_info_packs(&ctx),
        };
        subcode.index[0] = None;
        expect_that!(subcode.validate(0), err(anything()));
    }

    #[googletest::test]
    fn test_dropout_pruning_blanks_whole_sync_block() {
        // Sync block 0 carries application_id_3 plus the first copy of the absolute track
        // number/blank flag. If the ABST byte is missing, the whole sync block's ID part must be
        // emitted such that re-parsing drops every part of it together: the second round of
        // parse -> write must be idempotent.
        let ctx = ntsc_ctx();
        let mut subcode = Subcode {
            index: [Some(true); 5],
            skip: [Some(true); 5],
            picture: [Some(true); 5],
            application_id_track: None,
            application_id_3: Some(ApplicationId3::ConsumerDigitalVcr),
            absolute_track_number_0: [Some(0x10), Some(0x20)],
            absolute_track_number_1: [Some(0x11), Some(0x22)],
            absolute_track_number_2: [Some(0x33), Some(0x44)],
            blank_flag: [Some(BlankFlag::Continuous), Some(BlankFlag::Discontinuous)],
            packs: no_info_packs(&ctx),
        };
        subcode.absolute_track_number_0[0] = None;

        let raw = subcode.to_binary(0, 10, 2, &ctx);
        let parsed = Subcode::parse_binary(&raw, 2, 0, 10, &ctx).unwrap();

        expect_that!(parsed.application_id_3, none());
        expect_that!(parsed.absolute_track_number_0[0], none());
        expect_that!(parsed.blank_flag[0], none());
        // Sync block 1's tag bits are unaffected by sync block 0's dropout.
        expect_that!(parsed.index[0], some(eq(true)));

        // Re-serializing the already-pruned result must not change further.
        let raw2 = parsed.to_binary(0, 10, 2, &ctx);
        expect_that!(raw2, eq(raw));
    }
}
