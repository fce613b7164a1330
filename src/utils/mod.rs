pub mod utils;

pub use self::utils::{format_time, measure_time};
