pub mod channel;
pub mod channel_file;
pub mod dataset;
pub mod logger_file;

pub use channel::Channel;
pub use channel_file::{ChannelDescriptor, ChannelFile, FileOpener};
pub use dataset::{ChannelData, Dataset};
pub use logger_file::{LoggerFile, Tob1Opener};
