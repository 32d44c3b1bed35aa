//! Common data types shared between multiple camera packs.

use std::{
    collections::{HashMap, HashSet},
    sync::LazyLock,
};

use arbitrary_int::u7;
use bitbybit::bitenum;
use serde::{Deserialize, Serialize};

super::util::required_enum! {
    /// Focus mode of the camera
    #[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
    pub enum FocusMode {
        /// Automatic focus
        Automatic = 0x0,

        /// Manual focus
        Manual = 0x1,
    }

    #[bitenum(u1, exhaustive = true)]
    pub(crate) enum RawFocusMode;
}

pub(crate) static FOCUS_POSITION_BITS_TO_CENTIMETERS: LazyLock<[Option<u16>; 128]> =
    LazyLock::new(|| {
        let mut positions = [None; 128];

        // Special defined focus positions
        positions[0x7F] = None; // no information

        // Focus positions follow a simple exponential formula
        for position_bits in 0x0_u16..=0x7E_u16 {
            let msb = position_bits >> 2;
            let lsb = position_bits & 0x03;
            let position = msb * 10_u16.checked_pow(lsb.into()).unwrap();
            positions[usize::from(position_bits)] = Some(position);
        }
        positions
    });

pub(crate) static FOCUS_POSITION_CENTIMETERS_TO_BITS: LazyLock<HashMap<Option<u16>, u7>> =
    LazyLock::new(|| {
        HashMap::<Option<u16>, u7>::from_iter(
            FOCUS_POSITION_BITS_TO_CENTIMETERS.iter().enumerate().rev().map(
                |(focus_bits, position)| (*position, u7::new(u8::try_from(focus_bits).unwrap())),
            ),
        )
    });

pub(crate) static VALID_FOCUS_POSITIONS: LazyLock<HashSet<u16>> = LazyLock::new(|| {
    HashSet::<u16>::from_iter(FOCUS_POSITION_CENTIMETERS_TO_BITS.clone().into_keys().flatten())
});

pub(crate) fn check_focus_position(
    focus_position: &Option<u16>,
    _ctx: &super::PackContext,
) -> garde::Result {
    match focus_position {
        Some(position) => VALID_FOCUS_POSITIONS.contains(position).then_some(()).ok_or_else(|| {
            garde::Error::new(format!(
                "focus position {position} not supported: only focus positions returned by the \
                    valid_focus_positions function are supported",
            ))
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use googletest::prelude::*;

    use super::*;

    #[googletest::test]
    fn test_focus_position_no_information_is_none() {
        expect_that!(FOCUS_POSITION_BITS_TO_CENTIMETERS[0x7F], eq(None));
    }

    #[googletest::test]
    fn test_focus_position_bits_round_trip_through_centimeters() {
        // msb == 0 (bits 0x00..=0x03) all collapse to a position of 0 centimeters regardless of
        // lsb, so only bit patterns with a nonzero msb round-trip back to the same bits.
        for bits in 0x04_u8..=0x7E {
            let position = FOCUS_POSITION_BITS_TO_CENTIMETERS[usize::from(bits)];
            assert_that!(position, some(anything()));
            let back = FOCUS_POSITION_CENTIMETERS_TO_BITS.get(&position).unwrap();
            expect_that!(back.value(), eq(bits));
        }
    }

    #[googletest::test]
    fn test_focus_position_zero_msb_collapses_to_bits_zero() {
        // bits 0x00..=0x03 all decode to Some(0) centimeters; the reverse table picks bits 0x00.
        for bits in 0x00_u8..=0x03 {
            expect_that!(FOCUS_POSITION_BITS_TO_CENTIMETERS[usize::from(bits)], some(eq(0)));
        }
        let back = FOCUS_POSITION_CENTIMETERS_TO_BITS.get(&Some(0)).unwrap();
        expect_that!(back.value(), eq(0x00));
    }

    #[googletest::test]
    fn test_check_focus_position_accepts_none() {
        let ctx = *super::super::testutil::NTSC;
        expect_that!(check_focus_position(&None, &ctx), ok(anything()));
    }

    #[googletest::test]
    fn test_check_focus_position_rejects_unsupported_value() {
        let ctx = *super::super::testutil::NTSC;
        expect_that!(check_focus_position(&Some(0xFFFF), &ctx), err(anything()));
    }

    #[googletest::test]
    fn test_check_focus_position_accepts_known_value() {
        let ctx = *super::super::testutil::NTSC;
        let known = FOCUS_POSITION_BITS_TO_CENTIMETERS[0x00];
        expect_that!(check_focus_position(&known, &ctx), ok(anything()));
    }
}
