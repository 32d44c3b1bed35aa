//! Structures and functions related to working with entire DV files.

mod info;

pub use info::CheckSimilarError;
pub use info::Info;
pub use info::System;
pub use info::UnvalidatedInfo;
pub use info::ValidInfo;
pub use info::ValidInfoMethods;
