use std::fmt::Display;

use arbitrary_int::{u4, Number};
use snafu::prelude::*;

#[cfg(test)]
mod tests;

/// Convert binary-coded decimal value into a normal number.
///
/// If every bit in the digits is set, then the number is assumed to be absent (None).
pub(crate) fn from_bcd_hundreds<THundreds>(
    hundreds: THundreds,
    tens: u4,
    units: u4,
) -> Result<Option<u16>, FastWhatever>
where
    THundreds: Display + PartialOrd + Copy + Number,
    u8: From<THundreds> + From<u4>,
{
    if hundreds == THundreds::MAX && tens == u4::MAX && units == u4::MAX {
        return Ok(None);
    }
    if u8::from(hundreds) > 9u8 {
        whatever!("hundreds place value of {} is greater than 9", hundreds);
    }
    if tens.value() > 9u8 {
        whatever!("tens place value of {} is greater than 9", tens);
    }
    if units.value() > 9u8 {
        whatever!("units place value of {} is greater than 9", units);
    }
    Ok(Some(
        u16::from(u8::from(hundreds)) * 100
            + u16::from(tens.value()) * 10
            + u16::from(units.value()),
    ))
}

/// Convert binary-coded decimal value into a normal number.
///
/// If every bit in the digits is set, then the number is assumed to be absent (None).
pub(crate) fn from_bcd_tens<TTens>(tens: TTens, units: u4) -> Result<Option<u8>, FastWhatever>
where
    TTens: Display + PartialOrd + Copy + Number,
    u8: From<TTens>,
{
    if tens == TTens::MAX && units == u4::MAX {
        return Ok(None);
    }
    if u8::from(tens) > 9u8 {
        whatever!("tens place value of {} is greater than 9", tens);
    }
    if units.value() > 9u8 {
        whatever!("units place value of {} is greater than 9", units);
    }
    Ok(Some(u8::from(tens) * 10 + units.value()))
}

/// Declares a pack field enumeration that always has a value on tape: a plain Rust `enum` plus a
/// `bitenum`-derived raw counterpart with the exact same variants, along with [`From`]
/// implementations converting between the two.
///
/// The raw enum declaration must be empty; its variants are generated automatically to match the
/// plain enum.
macro_rules! required_enum {
    (
        $(#[$attr:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vattr:meta])* $variant:ident = $val:expr,)*
        }

        #[bitenum($raw_ty:ty, exhaustive = true)]
        $raw_vis:vis enum $raw_name:ident;
    ) => {
        $(#[$attr])*
        $vis enum $name {
            $($(#[$vattr])* $variant = $val,)*
        }

        #[derive(Debug, PartialEq, Eq, Clone, Copy)]
        #[bitbybit::bitenum($raw_ty, exhaustive = true)]
        $raw_vis enum $raw_name {
            $($variant = $val,)*
        }

        impl From<$name> for $raw_name {
            fn from(value: $name) -> Self {
                match value {
                    $($name::$variant => $raw_name::$variant,)*
                }
            }
        }

        impl From<$raw_name> for $name {
            fn from(value: $raw_name) -> Self {
                match value {
                    $($raw_name::$variant => $name::$variant,)*
                }
            }
        }
    };
}
pub(crate) use required_enum;

/// Declares a pack field enumeration that may be absent from tape (recorded as "no information"):
/// a plain Rust `enum` plus a `bitenum`-derived raw counterpart with one extra `NoInfo` variant,
/// along with [`From`] implementations converting between the raw enum and `Option` of the plain
/// enum.
macro_rules! optional_enum {
    (
        $(#[$attr:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vattr:meta])* $variant:ident = $val:expr,)*
        }

        #[bitenum($raw_ty:ty, exhaustive = true)]
        $raw_vis:vis enum $raw_name:ident {
            NoInfo = $noinfo_val:expr,
        }
    ) => {
        $(#[$attr])*
        $vis enum $name {
            $($(#[$vattr])* $variant = $val,)*
        }

        #[derive(Debug, PartialEq, Eq, Clone, Copy)]
        #[bitbybit::bitenum($raw_ty, exhaustive = true)]
        $raw_vis enum $raw_name {
            $($variant = $val,)*
            NoInfo = $noinfo_val,
        }

        impl From<$raw_name> for Option<$name> {
            fn from(value: $raw_name) -> Self {
                match value {
                    $($raw_name::$variant => Some($name::$variant),)*
                    $raw_name::NoInfo => None,
                }
            }
        }

        impl From<Option<$name>> for $raw_name {
            fn from(value: Option<$name>) -> Self {
                match value {
                    $(Some($name::$variant) => $raw_name::$variant,)*
                    None => $raw_name::NoInfo,
                }
            }
        }
    };
}
pub(crate) use optional_enum;

/// Error type similar to [`snafu::Whatever`] but without the (slow to gather) backtrace.
#[derive(Debug, Snafu)]
#[allow(missing_docs)]
pub(crate) enum FastWhatever {
    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
        // There is intentionally not a backtrace here, since they are slow and we could encounter
        // a lot of these errors when reading bad videotapes.
    },
}
