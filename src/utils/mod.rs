pub mod time_utils;

pub use time_utils::{
    TimeUtils, align_to_interval, epoch_ms_to_utc, in_timestamp_range, is_aligned, now_timestamp_ms,
};
