use super::BlockError;
use crate::{file, pack, shuffle};

/// DIF audio block: nine per DIF sequence, each holding one AAUX pack and 72 bytes of PCM audio
/// samples.
///
/// - IEC 61834-2:1998 Section 11.4.2 - Data part - Audio section
/// - SMPTE 306M-2002 Section 11.2.2.4 - Audio section
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Audio {
    /// Parsed AAUX pack. Reported as [`pack::Pack::Invalid`] rather than dropped if it failed to
    /// parse or validate.
    pub pack_data: pack::Pack,

    /// Raw PCM audio samples; always 72 bytes.
    pub audio_data: [u8; 72],
}

impl Audio {
    pub(super) fn parse_binary(
        block_bytes: &[u8],
        ctx: &pack::PackContext,
    ) -> Result<Self, BlockError> {
        let raw: [u8; 5] = block_bytes[0..5].try_into().unwrap();
        let (pack_data, _err) = pack::Pack::from_raw(&raw, ctx);
        let audio_data: [u8; 72] = block_bytes[5..77].try_into().unwrap();
        Ok(Self { pack_data, audio_data })
    }

    pub(super) fn to_binary(&self, ctx: &pack::PackContext) -> Vec<u8> {
        let mut out = Vec::with_capacity(77);
        out.extend_from_slice(&self.pack_data.to_raw(ctx));
        out.extend_from_slice(&self.audio_data);
        out
    }

    pub fn validate(&self, _file_info: &file::ValidInfo) -> Result<(), String> {
        Ok(())
    }

    /// Checks whether this block's audio samples contain any dropout error markers, per
    /// IEC 61834-2:1998 Section 6.4.3 - Error code.
    ///
    /// `dif_sequence_offset`/`dif_block` identify this block's position within its audio block
    /// half (see [`shuffle`]); `frame_sample_count` is the number of real samples in the frame
    /// (samples beyond this count are padding and are not checked); `quantization` indicates
    /// whether samples are 16-bit linear or 12-bit non-linear.
    pub fn has_audio_errors(
        &self,
        video_frame_dif_sequence_count: u32,
        dif_sequence_offset: u32,
        dif_block: u32,
        frame_sample_count: u32,
        quantization: pack::AudioQuantization,
    ) -> bool {
        let sample_numbers = &shuffle::SAMPLE_POSITIONS_TO_NUMBERS[&video_frame_dif_sequence_count]
            [&shuffle::BlockPosition { dif_sequence_offset, dif_block }];
        let data = &self.audio_data;
        match quantization {
            pack::AudioQuantization::Linear16Bit => {
                for block_sample_pos in 0..(72 / 2) {
                    let Some(&overall_sample_number) = sample_numbers.get(block_sample_pos) else {
                        break;
                    };
                    if overall_sample_number >= frame_sample_count {
                        break;
                    }
                    let msb = data[2 * block_sample_pos];
                    let lsb = data[2 * block_sample_pos + 1];
                    if msb == 0x80 && lsb == 0x00 {
                        return true;
                    }
                }
            }
            pack::AudioQuantization::NonLinear12Bit => {
                for block_sample_pos in 0..(72 / 3) {
                    let Some(&overall_sample_number) = sample_numbers.get(block_sample_pos) else {
                        break;
                    };
                    if overall_sample_number >= frame_sample_count {
                        break;
                    }
                    let msb_y = data[3 * block_sample_pos];
                    let msb_z = data[3 * block_sample_pos + 1];
                    let lsb = data[3 * block_sample_pos + 2];
                    if (msb_y == 0x80 && lsb & 0xF0 == 0x00) || (msb_z == 0x80 && lsb & 0x0F == 0x00) {
                        return true;
                    }
                }
            }
            _ => {}
        }
        false
    }
}
