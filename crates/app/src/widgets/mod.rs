pub mod limit_notice;
pub mod usage_meter;

pub use limit_notice::limit_notice;
pub use usage_meter::{usage_meter, UsageMeterAction};
