//! Drive segmentation.

pub mod segmenter;

pub use segmenter::{correct_turnover_on_downs, segment, Drive};
