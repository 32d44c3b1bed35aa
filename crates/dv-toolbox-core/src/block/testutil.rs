use num::rational::Ratio;

use crate::{file, pack};

pub(super) fn ntsc_info() -> file::ValidInfo {
    file::UnvalidatedInfo::new(file::Info {
        file_size: 120_000,
        video_frame_rate: Ratio::<u32>::new(30_000, 1_001),
        video_duration: Ratio::<u128>::new(1_001, 30_000),
        audio_stereo_stream_count: 1,
        audio_sample_rate: Some(48_000),
    })
    .validate()
    .unwrap()
}

pub(super) fn ntsc_ctx() -> pack::PackContext {
    pack::PackContext { file_info: ntsc_info() }
}
