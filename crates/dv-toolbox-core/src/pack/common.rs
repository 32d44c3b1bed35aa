//! Common data types shared between multiple packs.

use arbitrary_int::{u7, Number};
use bitbybit::bitenum;
use serde::{Deserialize, Serialize};

use crate::file::{System, ValidInfoMethods};

super::util::required_enum! {
    /// Determines which video system type is in use.
    ///
    /// The video system is also determined in conjunction with the `field_count` pack field.
    ///
    /// DV standards:
    ///
    /// - AAUX source
    ///   - IEC 61834-4:1998 Section 8.1 - Source (AAUX)
    ///   - SMPTE 306M-2002 Section 7.4.1 - AAUX source pack (AS)
    /// - VAUX source
    ///   - IEC 61834-4:1998 Section 9.1 - Source (VAUX)
    ///   - SMPTE 306M-2002 Section 8.9.1 - VAUX source pack (VS)
    #[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
    #[allow(missing_docs)]
    pub enum SourceType {
        /// Defines a 525 line, 60 field system, or a 625 line, 50 field system
        ///
        /// 25 mbps bitrate, 4:1:1 chroma subsampling on NTSC
        ///
        /// Relevant standards:
        ///
        /// - IEC 61834-2:1998 - SD format for 525-60 and 625-50 systems
        /// - SMPTE 306M-2002 - 6.35-mm Type D-7 Component Format - Video Compression at 25 Mb/s and
        ///   50 Mb/s - 525/60 and 625/50
        StandardDefinitionCompressedChroma = 0x00,

        Reserved1 = 0x01,

        /// Defines a 1125 line, 60 field system, or a 1250, 50 field system
        ///
        /// Relevant standards:
        ///
        /// - IEC 61834-3:1999 - HD format for 1125-60 and 1250-50 systems
        AnalogHighDefinition1125_1250 = 0x02,

        Reserved3 = 0x03,

        /// Defines a higher-bitrate 525 line, 60 field system, or a 625 line, 50 field system
        ///
        /// 50 mbps bitrate, 4:2:2 chroma subsampling in SMPTE 306M
        ///
        /// Relevant standards:
        ///
        /// - SMPTE 306M-2002 - 6.35-mm Type D-7 Component Format - Video Compression at 25 Mb/s and
        ///   50 Mb/s - 525/60 and 625/50
        StandardDefinitionMoreChroma = 0x04,

        Reserved5 = 0x05,
        Reserved6 = 0x06,
        Reserved7 = 0x07,
        Reserved8 = 0x08,
        Reserved9 = 0x09,
        Reserved10 = 0x0A,
        Reserved11 = 0x0B,
        Reserved12 = 0x0C,
        Reserved13 = 0x0D,
        Reserved14 = 0x0E,
        Reserved15 = 0x0F,
        Reserved16 = 0x10,
        Reserved17 = 0x11,
        Reserved18 = 0x12,
        Reserved19 = 0x13,
        Reserved20 = 0x14,
        Reserved21 = 0x15,
        Reserved22 = 0x16,
        Reserved23 = 0x17,
        Reserved24 = 0x18,
        Reserved25 = 0x19,
        Reserved26 = 0x1A,
        Reserved27 = 0x1B,
        Reserved28 = 0x1C,
        Reserved29 = 0x1D,
        Reserved30 = 0x1E,
        Reserved31 = 0x1F,
    }

    #[bitenum(u5, exhaustive = true)]
    pub(crate) enum RawSourceType;
}

super::util::required_enum! {
    /// Copy protection flags
    ///
    /// This flag is used by equipment to restrict copies from being made.  From the days before
    /// copy protection used encryption.
    #[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
    pub enum CopyProtection {
        /// The content may be copied without restriction.  Copies shall also have this flag.
        NoRestriction = 0x0,

        #[allow(missing_docs)]
        Reserved = 0x1,

        /// Only one copy of the content may be made.  Copies made of this content shall be flagged
        /// with [`CopyProtection::NotPermitted`].
        OneGenerationOnly = 0x2,

        /// No copies of the content shall be allowed to be made.
        NotPermitted = 0x3,
    }

    #[bitenum(u2, exhaustive = true)]
    pub(crate) enum RawCopyProtection;
}

super::util::optional_enum! {
    /// Indicates whether the source was scrambled and whether it was descrambled when recorded.
    #[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
    pub enum SourceSituation {
        /// The source was scrambled with audience restrictions, and was recorded without
        /// descrambling.
        ScrambledSourceWithAudienceRestrictions = 0b00,

        /// The source was scrambled without audience restrictions, and was recorded without
        /// descrambling.
        ScrambledSourceWithoutAudienceRestrictions = 0b01,

        /// The source has audience restrictions.  If it was scrambled, then it was descrambled.  In
        /// this scenario, the `TitleKey` pack should be recorded in the AAUX optional area.
        SourceWithAudienceRestrictions = 0b10,
    }

    #[bitenum(u2, exhaustive = true)]
    pub(crate) enum RawSourceSituation {
        NoInfo = 0b11,
    }
}

super::util::optional_enum! {
    /// Input source of the recorded content.
    #[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
    pub enum InputSource {
        /// Analog input was used to record the content.
        Analog = 0b00,

        /// Digital input was used to record the content.
        Digital = 0b01,

        #[allow(missing_docs)]
        Reserved = 0b10,
    }

    #[bitenum(u2, exhaustive = true)]
    pub(crate) enum RawInputSource {
        NoInfo = 0b11,
    }
}

super::util::optional_enum! {
    /// The number of times the content has been compressed.
    #[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
    pub enum CompressionCount {
        /// One generation of compression.
        Compressed1 = 0b00,

        /// Two generations of compression.
        Compressed2 = 0b01,

        /// Three or more generations of compression.
        Compressed3OrMore = 0b10,
    }

    #[bitenum(u2, exhaustive = true)]
    pub(crate) enum RawCompressionCount {
        NoInfo = 0b11,
    }
}

/// Formats a [`SourceType`] as its variant name.
pub(crate) fn format_source_type(value: SourceType) -> String {
    match value {
        SourceType::StandardDefinitionCompressedChroma => "StandardDefinitionCompressedChroma",
        SourceType::Reserved1 => "Reserved1",
        SourceType::AnalogHighDefinition1125_1250 => "AnalogHighDefinition1125_1250",
        SourceType::Reserved3 => "Reserved3",
        SourceType::StandardDefinitionMoreChroma => "StandardDefinitionMoreChroma",
        SourceType::Reserved5 => "Reserved5",
        SourceType::Reserved6 => "Reserved6",
        SourceType::Reserved7 => "Reserved7",
        SourceType::Reserved8 => "Reserved8",
        SourceType::Reserved9 => "Reserved9",
        SourceType::Reserved10 => "Reserved10",
        SourceType::Reserved11 => "Reserved11",
        SourceType::Reserved12 => "Reserved12",
        SourceType::Reserved13 => "Reserved13",
        SourceType::Reserved14 => "Reserved14",
        SourceType::Reserved15 => "Reserved15",
        SourceType::Reserved16 => "Reserved16",
        SourceType::Reserved17 => "Reserved17",
        SourceType::Reserved18 => "Reserved18",
        SourceType::Reserved19 => "Reserved19",
        SourceType::Reserved20 => "Reserved20",
        SourceType::Reserved21 => "Reserved21",
        SourceType::Reserved22 => "Reserved22",
        SourceType::Reserved23 => "Reserved23",
        SourceType::Reserved24 => "Reserved24",
        SourceType::Reserved25 => "Reserved25",
        SourceType::Reserved26 => "Reserved26",
        SourceType::Reserved27 => "Reserved27",
        SourceType::Reserved28 => "Reserved28",
        SourceType::Reserved29 => "Reserved29",
        SourceType::Reserved30 => "Reserved30",
        SourceType::Reserved31 => "Reserved31",
    }
    .to_string()
}

/// Parses a [`SourceType`] from its variant name.
pub(crate) fn parse_source_type(text: &str) -> Result<SourceType, String> {
    Ok(match text {
        "StandardDefinitionCompressedChroma" => SourceType::StandardDefinitionCompressedChroma,
        "Reserved1" => SourceType::Reserved1,
        "AnalogHighDefinition1125_1250" => SourceType::AnalogHighDefinition1125_1250,
        "Reserved3" => SourceType::Reserved3,
        "StandardDefinitionMoreChroma" => SourceType::StandardDefinitionMoreChroma,
        "Reserved5" => SourceType::Reserved5,
        "Reserved6" => SourceType::Reserved6,
        "Reserved7" => SourceType::Reserved7,
        "Reserved8" => SourceType::Reserved8,
        "Reserved9" => SourceType::Reserved9,
        "Reserved10" => SourceType::Reserved10,
        "Reserved11" => SourceType::Reserved11,
        "Reserved12" => SourceType::Reserved12,
        "Reserved13" => SourceType::Reserved13,
        "Reserved14" => SourceType::Reserved14,
        "Reserved15" => SourceType::Reserved15,
        "Reserved16" => SourceType::Reserved16,
        "Reserved17" => SourceType::Reserved17,
        "Reserved18" => SourceType::Reserved18,
        "Reserved19" => SourceType::Reserved19,
        "Reserved20" => SourceType::Reserved20,
        "Reserved21" => SourceType::Reserved21,
        "Reserved22" => SourceType::Reserved22,
        "Reserved23" => SourceType::Reserved23,
        "Reserved24" => SourceType::Reserved24,
        "Reserved25" => SourceType::Reserved25,
        "Reserved26" => SourceType::Reserved26,
        "Reserved27" => SourceType::Reserved27,
        "Reserved28" => SourceType::Reserved28,
        "Reserved29" => SourceType::Reserved29,
        "Reserved30" => SourceType::Reserved30,
        "Reserved31" => SourceType::Reserved31,
        other => return Err(format!("{other:?} is not a valid source type")),
    })
}

/// Formats a [`CopyProtection`] as its variant name.
pub(crate) fn format_copy_protection(value: CopyProtection) -> String {
    match value {
        CopyProtection::NoRestriction => "NoRestriction",
        CopyProtection::Reserved => "Reserved",
        CopyProtection::OneGenerationOnly => "OneGenerationOnly",
        CopyProtection::NotPermitted => "NotPermitted",
    }
    .to_string()
}

/// Parses a [`CopyProtection`] from its variant name.
pub(crate) fn parse_copy_protection(text: &str) -> Result<CopyProtection, String> {
    Ok(match text {
        "NoRestriction" => CopyProtection::NoRestriction,
        "Reserved" => CopyProtection::Reserved,
        "OneGenerationOnly" => CopyProtection::OneGenerationOnly,
        "NotPermitted" => CopyProtection::NotPermitted,
        other => return Err(format!("{other:?} is not a valid copy protection value")),
    })
}

/// Formats a [`SourceSituation`] as its variant name.
pub(crate) fn format_source_situation(value: SourceSituation) -> String {
    match value {
        SourceSituation::ScrambledSourceWithAudienceRestrictions => {
            "ScrambledSourceWithAudienceRestrictions"
        }
        SourceSituation::ScrambledSourceWithoutAudienceRestrictions => {
            "ScrambledSourceWithoutAudienceRestrictions"
        }
        SourceSituation::SourceWithAudienceRestrictions => "SourceWithAudienceRestrictions",
    }
    .to_string()
}

/// Parses a [`SourceSituation`] from its variant name.
pub(crate) fn parse_source_situation(text: &str) -> Result<SourceSituation, String> {
    Ok(match text {
        "ScrambledSourceWithAudienceRestrictions" => {
            SourceSituation::ScrambledSourceWithAudienceRestrictions
        }
        "ScrambledSourceWithoutAudienceRestrictions" => {
            SourceSituation::ScrambledSourceWithoutAudienceRestrictions
        }
        "SourceWithAudienceRestrictions" => SourceSituation::SourceWithAudienceRestrictions,
        other => return Err(format!("{other:?} is not a valid source situation")),
    })
}

/// Formats an [`InputSource`] as its variant name.
pub(crate) fn format_input_source(value: InputSource) -> String {
    match value {
        InputSource::Analog => "Analog",
        InputSource::Digital => "Digital",
        InputSource::Reserved => "Reserved",
    }
    .to_string()
}

/// Parses an [`InputSource`] from its variant name.
pub(crate) fn parse_input_source(text: &str) -> Result<InputSource, String> {
    Ok(match text {
        "Analog" => InputSource::Analog,
        "Digital" => InputSource::Digital,
        "Reserved" => InputSource::Reserved,
        other => return Err(format!("{other:?} is not a valid input source")),
    })
}

/// Formats a [`CompressionCount`] as its variant name.
pub(crate) fn format_compression_count(value: CompressionCount) -> String {
    match value {
        CompressionCount::Compressed1 => "Compressed1",
        CompressionCount::Compressed2 => "Compressed2",
        CompressionCount::Compressed3OrMore => "Compressed3OrMore",
    }
    .to_string()
}

/// Parses a [`CompressionCount`] from its variant name.
pub(crate) fn parse_compression_count(text: &str) -> Result<CompressionCount, String> {
    Ok(match text {
        "Compressed1" => CompressionCount::Compressed1,
        "Compressed2" => CompressionCount::Compressed2,
        "Compressed3OrMore" => CompressionCount::Compressed3OrMore,
        other => return Err(format!("{other:?} is not a valid compression count")),
    })
}

/// Validate that the field count is 50 or 60, and matches with the system.
pub(crate) fn check_field_count(field_count: &u8, ctx: &super::PackContext) -> garde::Result {
    let system = ctx.file_info.system();
    let expected_field_count = match system {
        System::Sys525_60 => 60,
        System::Sys625_50 => 50,
    };
    if *field_count != expected_field_count {
        Err(garde::Error::new(format!(
            "field count of {field_count} does not match the expected value of \
            {expected_field_count} for system {system}"
        )))
    } else {
        Ok(())
    }
}

/// Ensure that no information genre category values are specified as None, instead of Some(0x7F).
pub(crate) fn check_genre_category(
    genre_category: &Option<u7>,
    _ctx: &super::PackContext,
) -> garde::Result {
    if *genre_category == Some(u7::MAX) {
        Err(garde::Error::new(
            "instead of specifying Some(0x7F), use None to indicate no information",
        ))
    } else {
        Ok(())
    }
}
