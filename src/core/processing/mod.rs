pub mod axes;
pub mod features;
pub mod resize;
