pub mod recording;
pub mod shared;
