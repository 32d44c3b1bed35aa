use arbitrary_int::{u1, u7};
use bitbybit::bitfield;
use garde::Validate;
use serde::{Deserialize, Serialize};

#[cfg(test)]
mod tests;

/// Sentinel raw value of [`CameraShutter::shutter_speed_consumer`]'s binary encoding meaning
/// "no information".
const NO_INFO_SHUTTER_SPEED_CONSUMER: u16 = 0x7FFF;

fn check_shutter_speed_consumer(
    shutter_speed: &Option<u16>,
    _ctx: &super::PackContext,
) -> garde::Result {
    match shutter_speed {
        Some(speed) if *speed < 1 || *speed > 0x7FFE => Err(garde::Error::new(format!(
            "consumer shutter speed {speed} is out of range: must be between 1 and 0x7FFE",
        ))),
        _ => Ok(()),
    }
}

fn check_shutter_speed_professional(
    shutter_speed: &Option<u8>,
    _ctx: &super::PackContext,
) -> garde::Result {
    match shutter_speed {
        Some(0xFF) => Err(garde::Error::new(
            "instead of specifying Some(0xFF), use None to indicate no information",
        )),
        _ => Ok(()),
    }
}

/// Shutter speed used by the camera while recording the video.
///
/// DV standards:
///
/// - IEC 61834-4:1998 Section 10.16 - Shutter (CAMERA)
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Validate, Serialize, Deserialize)]
#[garde(context(super::PackContext))]
pub struct CameraShutter {
    /// Shutter speed, expressed as the denominator of a fraction of a second (e.g. a value of
    /// `60` means 1/60th of a second), as reported by a consumer camera.
    #[garde(custom(check_shutter_speed_consumer))]
    pub shutter_speed_consumer: Option<u16>,

    /// Shutter speed, expressed as the number of horizontal scanning lines accumulated by the
    /// shutter, as reported by a professional camera's upper line.
    #[garde(custom(check_shutter_speed_professional))]
    pub shutter_speed_professional_upper_line: Option<u8>,

    /// Shutter speed, expressed as the number of horizontal scanning lines accumulated by the
    /// shutter, as reported by a professional camera's lower line.
    #[garde(custom(check_shutter_speed_professional))]
    pub shutter_speed_professional_lower_line: Option<u8>,

    /// Reserved bit; should normally be set to `true`.
    #[garde(skip)]
    pub reserved: bool,
}

#[bitfield(u32)]
struct RawCameraShutter {
    // PC1
    #[bits(0..=7, rw)]
    ssp1: u8,

    // PC2
    #[bits(8..=15, rw)]
    ssp2: u8,

    // PC3
    #[bits(16..=23, rw)]
    ssp_consumer_lsb: u8,

    // PC4
    #[bits(24..=30, rw)]
    ssp_consumer_msb: u7,
    #[bit(31, rw)]
    one: u1,
}

impl super::TextFields for CameraShutter {
    fn field_names() -> &'static [&'static str] {
        &[
            "shutter_speed_consumer",
            "shutter_speed_professional_upper_line",
            "shutter_speed_professional_lower_line",
            "reserved",
        ]
    }

    fn default_for_text() -> Self {
        CameraShutter {
            shutter_speed_consumer: None,
            shutter_speed_professional_upper_line: None,
            shutter_speed_professional_lower_line: None,
            reserved: true,
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
        match field_name {
            "shutter_speed_consumer" => {
                self.shutter_speed_consumer =
                    parse!(text, |s| super::text::parse_optional(s, |s: &str| s
                        .parse::<u16>()
                        .map_err(|e| e.to_string())));
            }
            "shutter_speed_professional_upper_line" => {
                self.shutter_speed_professional_upper_line =
                    parse!(text, |s| super::text::parse_optional(s, |s: &str| s
                        .parse::<u8>()
                        .map_err(|e| e.to_string())));
            }
            "shutter_speed_professional_lower_line" => {
                self.shutter_speed_professional_lower_line =
                    parse!(text, |s| super::text::parse_optional(s, |s: &str| s
                        .parse::<u8>()
                        .map_err(|e| e.to_string())));
            }
            "reserved" => {
                self.reserved = parse!(text, |s: &str| match s {
                    "TRUE" => Ok(true),
                    "FALSE" => Ok(false),
                    other => Err(format!("{other:?} is not TRUE or FALSE")),
                });
            }
            other => return Err(super::text::unknown(other)),
        }
        Ok(())
    }

    fn to_text_value(&self, field_name: &str) -> Result<String, super::TextFieldError> {
        Ok(match field_name {
            "shutter_speed_consumer" => super::text::format_optional(&self.shutter_speed_consumer),
            "shutter_speed_professional_upper_line" => {
                super::text::format_optional(&self.shutter_speed_professional_upper_line)
            }
            "shutter_speed_professional_lower_line" => {
                super::text::format_optional(&self.shutter_speed_professional_lower_line)
            }
            "reserved" => if self.reserved { "TRUE" } else { "FALSE" }.to_string(),
            other => return Err(super::text::unknown(other)),
        })
    }
}

impl super::PackData for CameraShutter {
    fn try_from_raw(
        raw: &super::RawPackData,
        _ctx: &super::PackContext,
    ) -> Result<Self, super::RawError> {
        let raw = RawCameraShutter::new_with_raw_value(u32::from_le_bytes(*raw));

        let ssp_consumer =
            (u16::from(raw.ssp_consumer_msb().value()) << 8) | u16::from(raw.ssp_consumer_lsb());

        Ok(Self {
            shutter_speed_consumer: if ssp_consumer == NO_INFO_SHUTTER_SPEED_CONSUMER {
                None
            } else {
                Some(ssp_consumer)
            },
            shutter_speed_professional_upper_line: if raw.ssp1() == 0xFF {
                None
            } else {
                Some(raw.ssp1())
            },
            shutter_speed_professional_lower_line: if raw.ssp2() == 0xFF {
                None
            } else {
                Some(raw.ssp2())
            },
            reserved: raw.one() == u1::new(1),
        })
    }
}

impl super::ValidPackDataTrait<CameraShutter> for super::ValidPack<CameraShutter> {
    fn to_raw(&self, _ctx: &super::PackContext) -> super::RawPackData {
        let ssp_consumer = self.shutter_speed_consumer.unwrap_or(NO_INFO_SHUTTER_SPEED_CONSUMER);
        RawCameraShutter::builder()
            .with_ssp1(self.shutter_speed_professional_upper_line.unwrap_or(0xFF))
            .with_ssp2(self.shutter_speed_professional_lower_line.unwrap_or(0xFF))
            .with_ssp_consumer_lsb((ssp_consumer & 0xFF) as u8)
            .with_ssp_consumer_msb(u7::new(((ssp_consumer >> 8) & 0x7F) as u8))
            .with_one(if self.reserved { u1::new(1) } else { u1::new(0) })
            .build()
            .raw_value()
            .to_le_bytes()
    }
}
