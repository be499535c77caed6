//! Platform fee resolution for business accounts

pub mod ports;
pub mod qualifier;

pub use ports::VolumeStatsRepository;
pub use qualifier::{month_key, qualify, window_start, FeeTierQualifier};
