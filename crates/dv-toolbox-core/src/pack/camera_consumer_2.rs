use std::{
    collections::{HashMap, HashSet},
    sync::LazyLock,
};

use arbitrary_int::{u1, u5, u6, u7, Number};
use bitbybit::{bitenum, bitfield};
use garde::Validate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

#[cfg(test)]
mod tests;

super::util::required_enum! {
    /// Direction that the camera is panning.
    #[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
    pub enum PanningDirection {
        /// Same direction as the scanning direction of the video signal.
        SameDirectionAsScanning = 0x0,

        /// Opposite direction of the scanning direction of the video signal.
        OppositeDirectionOfScanning = 0x1,
    }

    #[bitenum(u1, exhaustive = true)]
    pub(crate) enum RawPanningDirection;
}

static FOCAL_LENGTH_BITS_TO_MILLIMETERS: LazyLock<[Option<u16>; 256]> = LazyLock::new(|| {
    let mut lengths = [None; 256];

    lengths[0xFF] = None; // no information

    // Focal lengths follow a simple exponential formula
    for bits in 0x00_u16..=0xFE_u16 {
        let msb = bits >> 1;
        let lsb = bits & 0x1;
        lengths[usize::from(bits)] = Some(msb * 10_u16.checked_pow(lsb.into()).unwrap());
    }
    lengths
});

static FOCAL_LENGTH_MILLIMETERS_TO_BITS: LazyLock<HashMap<Option<u16>, u8>> = LazyLock::new(|| {
    HashMap::<Option<u16>, u8>::from_iter(
        FOCAL_LENGTH_BITS_TO_MILLIMETERS
            .iter()
            .enumerate()
            .rev()
            .map(|(bits, length)| (*length, u8::try_from(bits).unwrap())),
    )
});

static VALID_FOCAL_LENGTHS: LazyLock<HashSet<u16>> = LazyLock::new(|| {
    HashSet::<u16>::from_iter(FOCAL_LENGTH_MILLIMETERS_TO_BITS.clone().into_keys().flatten())
});

fn check_focal_length(focal_length: &Option<u16>, _ctx: &super::PackContext) -> garde::Result {
    match focal_length {
        Some(length) => VALID_FOCAL_LENGTHS.contains(length).then_some(()).ok_or_else(|| {
            garde::Error::new(format!(
                "focal length {length} not supported: only focal lengths returned by the \
                    valid_focal_lengths function are supported",
            ))
        }),
        None => Ok(()),
    }
}

static ELECTRIC_ZOOM_BITS_TO_MAGNIFICATION: LazyLock<[Option<Decimal>; 128]> = LazyLock::new(|| {
    let mut magnifications = [None; 128];

    for units in 0_u8..8 {
        for tenths in 0_u8..10 {
            let bits = (units << 4) | tenths;
            magnifications[usize::from(bits)] =
                Some(Decimal::from(units) + Decimal::new(i64::from(tenths), 1));
        }
    }
    magnifications[0x7E] = Some(dec!(8.0)); // means >= 8.0
    magnifications[0x7F] = None; // no information

    magnifications
});

static ELECTRIC_ZOOM_MAGNIFICATION_TO_BITS: LazyLock<HashMap<Option<Decimal>, u7>> =
    LazyLock::new(|| {
        HashMap::<Option<Decimal>, u7>::from_iter(
            ELECTRIC_ZOOM_BITS_TO_MAGNIFICATION
                .iter()
                .enumerate()
                .map(|(bits, m)| (*m, u7::new(u8::try_from(bits).unwrap()))),
        )
    });

static VALID_ELECTRIC_ZOOM_MAGNIFICATIONS: LazyLock<HashSet<Decimal>> = LazyLock::new(|| {
    HashSet::<Decimal>::from_iter(ELECTRIC_ZOOM_MAGNIFICATION_TO_BITS.clone().into_keys().flatten())
});

fn check_electric_zoom_magnification(
    magnification: &Option<Decimal>,
    _ctx: &super::PackContext,
) -> garde::Result {
    match magnification {
        Some(m) => VALID_ELECTRIC_ZOOM_MAGNIFICATIONS.contains(m).then_some(()).ok_or_else(|| {
            garde::Error::new(format!(
                "electric zoom magnification {m} not supported: only values returned by the \
                    valid_electric_zoom_magnifications function are supported",
            ))
        }),
        None => Ok(()),
    }
}

fn check_vertical_panning_speed(
    speed: &Option<u5>,
    _ctx: &super::PackContext,
) -> garde::Result {
    if *speed == Some(u5::MAX) {
        Err(garde::Error::new(
            "instead of specifying Some(0x1F), use None to indicate no information",
        ))
    } else {
        Ok(())
    }
}

fn check_horizontal_panning_speed(
    speed: &Option<u8>,
    _ctx: &super::PackContext,
) -> garde::Result {
    match speed {
        Some(s) if *s > 0x3E * 2 => Err(garde::Error::new(format!(
            "horizontal panning speed {s} is out of range: maximum value is {}",
            0x3E * 2
        ))),
        Some(s) if s % 2 != 0 => {
            Err(garde::Error::new("horizontal panning speed must be an even number"))
        }
        _ => Ok(()),
    }
}

/// Additional settings used by a consumer camera to record the video.
///
/// DV standards:
///
/// - IEC 61834-4:1998 Section 10.2 - Consumer Camera 2 (CAMERA)
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Validate, Serialize, Deserialize)]
#[garde(context(super::PackContext))]
pub struct CameraConsumer2 {
    /// Direction of vertical panning.
    #[garde(skip)]
    pub vertical_panning_direction: PanningDirection,

    /// Vertical panning speed, in lines per field.
    ///
    /// A value of `0x1E` (30) means the speed is at least that fast.
    #[garde(custom(check_vertical_panning_speed))]
    pub vertical_panning_speed: Option<u5>,

    /// Direction of horizontal panning.
    #[garde(skip)]
    pub horizontal_panning_direction: PanningDirection,

    /// Horizontal panning speed, in pixels per field.  Always an even number.
    ///
    /// A value of `124` means the speed is at least that fast.
    #[garde(custom(check_horizontal_panning_speed))]
    pub horizontal_panning_speed: Option<u8>,

    /// Whether the camera's image stabilizer is turned on.
    #[garde(skip)]
    pub image_stabilizer_on: bool,

    /// Focal length of the lens, in millimeters, as if mounted on a 35 mm film camera.
    #[garde(custom(check_focal_length))]
    pub focal_length: Option<u16>,

    /// Whether electric (digital) zoom is turned on.
    #[garde(skip)]
    pub electric_zoom_on: bool,

    /// Electric zoom magnification factor.
    ///
    /// A value of `8.0` means the magnification is at least that much.
    #[garde(custom(check_electric_zoom_magnification))]
    pub electric_zoom_magnification: Option<Decimal>,

    /// Reserved bits; should normally be set to `0x3`.
    #[garde(skip)]
    pub reserved: arbitrary_int::u2,
}

#[bitfield(u32)]
struct RawCameraConsumer2 {
    // PC1
    #[bits(0..=4, rw)]
    v_panning_speed: u5,
    #[bit(5, rw)]
    vpd: RawPanningDirection,
    #[bits(6..=7, rw)]
    reserved: arbitrary_int::u2,

    // PC2
    #[bits(8..=13, rw)]
    h_panning_speed: u6,
    #[bit(14, rw)]
    hpd: RawPanningDirection,
    #[bit(15, rw)]
    is_en: u1,

    // PC3
    #[bits(16..=23, rw)]
    focal_length: u8,

    // PC4
    #[bits(24..=30, rw)]
    e_zoom: u7,
    #[bit(31, rw)]
    zen: u1,
}

impl CameraConsumer2 {
    /// Returns the list of valid focal lengths recognized by [`CameraConsumer2::focal_length`].
    pub fn valid_focal_lengths() -> &'static HashSet<u16> {
        &VALID_FOCAL_LENGTHS
    }

    /// Returns the list of valid electric zoom magnifications recognized by
    /// [`CameraConsumer2::electric_zoom_magnification`].
    pub fn valid_electric_zoom_magnifications() -> &'static HashSet<Decimal> {
        &VALID_ELECTRIC_ZOOM_MAGNIFICATIONS
    }
}

fn format_panning_direction(value: PanningDirection) -> String {
    match value {
        PanningDirection::SameDirectionAsScanning => "SameDirectionAsScanning",
        PanningDirection::OppositeDirectionOfScanning => "OppositeDirectionOfScanning",
    }
    .to_string()
}

fn parse_panning_direction(text: &str) -> Result<PanningDirection, String> {
    Ok(match text {
        "SameDirectionAsScanning" => PanningDirection::SameDirectionAsScanning,
        "OppositeDirectionOfScanning" => PanningDirection::OppositeDirectionOfScanning,
        other => return Err(format!("{other:?} is not a valid panning direction")),
    })
}

impl super::TextFields for CameraConsumer2 {
    fn field_names() -> &'static [&'static str] {
        &[
            "vertical_panning_direction",
            "vertical_panning_speed",
            "horizontal_panning_direction",
            "horizontal_panning_speed",
            "image_stabilizer_on",
            "focal_length",
            "electric_zoom_on",
            "electric_zoom_magnification",
            "reserved",
        ]
    }

    fn default_for_text() -> Self {
        CameraConsumer2 {
            vertical_panning_direction: PanningDirection::SameDirectionAsScanning,
            vertical_panning_speed: None,
            horizontal_panning_direction: PanningDirection::SameDirectionAsScanning,
            horizontal_panning_speed: None,
            image_stabilizer_on: false,
            focal_length: None,
            electric_zoom_on: false,
            electric_zoom_magnification: None,
            reserved: arbitrary_int::u2::new(0x3),
        }
    }

    fn parse_text_value(
        &mut self,
        field_name: &str,
        text: &str,
    ) -> Result<(), super::TextFieldError> {
        macro_rules! parse {
            ($text:expr, $parse:expr) => {
                $parse($text).map_err(|e| super::text::invalid(field_name, $text, e))?
            };
        }
        macro_rules! parse_bool {
            ($text:expr) => {
                parse!($text, |s: &str| match s {
                    "TRUE" => Ok(true),
                    "FALSE" => Ok(false),
                    other => Err(format!("{other:?} is not TRUE or FALSE")),
                })
            };
        }
        match field_name {
            "vertical_panning_direction" => {
                self.vertical_panning_direction = parse!(text, parse_panning_direction);
            }
            "vertical_panning_speed" => {
                self.vertical_panning_speed = parse!(text, |s| super::text::parse_optional(s, |s: &str| {
                    let v: u8 = s.parse().map_err(|_| format!("{s:?} is not an integer"))?;
                    if v > u5::MAX.value() {
                        return Err(format!("{v} is out of range for a 5-bit field"));
                    }
                    Ok(u5::new(v))
                }));
            }
            "horizontal_panning_direction" => {
                self.horizontal_panning_direction = parse!(text, parse_panning_direction);
            }
            "horizontal_panning_speed" => {
                self.horizontal_panning_speed =
                    parse!(text, |s| super::text::parse_optional(s, |s: &str| s
                        .parse::<u8>()
                        .map_err(|e| e.to_string())));
            }
            "image_stabilizer_on" => self.image_stabilizer_on = parse_bool!(text),
            "focal_length" => {
                self.focal_length =
                    parse!(text, |s| super::text::parse_optional(s, |s: &str| s
                        .parse::<u16>()
                        .map_err(|e| e.to_string())));
            }
            "electric_zoom_on" => self.electric_zoom_on = parse_bool!(text),
            "electric_zoom_magnification" => {
                self.electric_zoom_magnification =
                    parse!(text, |s| super::text::parse_optional(s, |s: &str| s
                        .parse::<Decimal>()
                        .map_err(|e| e.to_string())));
            }
            "reserved" => {
                let v = parse!(text, |s: &str| s.parse::<u8>().map_err(|e| e.to_string()));
                if v > arbitrary_int::u2::MAX.value() {
                    return Err(super::text::invalid(field_name, text, "out of range for a 2-bit field"));
                }
                self.reserved = arbitrary_int::u2::new(v);
            }
            other => return Err(super::text::unknown(other)),
        }
        Ok(())
    }

    fn to_text_value(&self, field_name: &str) -> Result<String, super::TextFieldError> {
        Ok(match field_name {
            "vertical_panning_direction" => format_panning_direction(self.vertical_panning_direction),
            "vertical_panning_speed" => {
                super::text::format_optional(&self.vertical_panning_speed.map(|v| v.value().to_string()))
            }
            "horizontal_panning_direction" => format_panning_direction(self.horizontal_panning_direction),
            "horizontal_panning_speed" => super::text::format_optional(&self.horizontal_panning_speed),
            "image_stabilizer_on" => if self.image_stabilizer_on { "TRUE" } else { "FALSE" }.to_string(),
            "focal_length" => super::text::format_optional(&self.focal_length),
            "electric_zoom_on" => if self.electric_zoom_on { "TRUE" } else { "FALSE" }.to_string(),
            "electric_zoom_magnification" => super::text::format_optional(&self.electric_zoom_magnification),
            "reserved" => self.reserved.value().to_string(),
            other => return Err(super::text::unknown(other)),
        })
    }
}

impl super::PackData for CameraConsumer2 {
    fn try_from_raw(
        raw: &super::RawPackData,
        _ctx: &super::PackContext,
    ) -> Result<Self, super::RawError> {
        let raw = RawCameraConsumer2::new_with_raw_value(u32::from_le_bytes(*raw));
        Ok(Self {
            vertical_panning_direction: raw.vpd().into(),
            vertical_panning_speed: if raw.v_panning_speed() == u5::MAX {
                None
            } else {
                Some(raw.v_panning_speed())
            },
            horizontal_panning_direction: raw.hpd().into(),
            horizontal_panning_speed: if raw.h_panning_speed() == u6::MAX {
                None
            } else {
                Some(u8::from(raw.h_panning_speed()) * 2)
            },
            image_stabilizer_on: raw.is_en() == u1::new(0),
            focal_length: FOCAL_LENGTH_BITS_TO_MILLIMETERS[usize::from(raw.focal_length())],
            electric_zoom_on: raw.zen() == u1::new(0),
            electric_zoom_magnification: ELECTRIC_ZOOM_BITS_TO_MAGNIFICATION
                [usize::from(raw.e_zoom().value())],
            reserved: raw.reserved(),
        })
    }
}

impl super::ValidPackDataTrait<CameraConsumer2> for super::ValidPack<CameraConsumer2> {
    fn to_raw(&self, _ctx: &super::PackContext) -> super::RawPackData {
        RawCameraConsumer2::builder()
            .with_v_panning_speed(self.vertical_panning_speed.unwrap_or(u5::MAX))
            .with_vpd(self.vertical_panning_direction.into())
            .with_reserved(self.reserved)
            .with_h_panning_speed(
                self.horizontal_panning_speed.map_or(u6::MAX, |s| u6::new(s / 2)),
            )
            .with_hpd(self.horizontal_panning_direction.into())
            .with_is_en(if self.image_stabilizer_on { u1::new(0) } else { u1::new(1) })
            .with_focal_length(FOCAL_LENGTH_MILLIMETERS_TO_BITS[&self.focal_length])
            .with_e_zoom(ELECTRIC_ZOOM_MAGNIFICATION_TO_BITS[&self.electric_zoom_magnification])
            .with_zen(if self.electric_zoom_on { u1::new(0) } else { u1::new(1) })
            .build()
            .raw_value()
            .to_le_bytes()
    }
}
