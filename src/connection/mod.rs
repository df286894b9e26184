//! Long-lived link handles built on the driver and control tasks

pub mod video;

pub use video::VideoLink;
