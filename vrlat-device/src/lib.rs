pub mod channel;
pub mod frame;
pub mod mock;

pub use channel::{ChannelError, SerialChannel, SyncChannel, SYNC_MARKER};
pub use frame::{FrameError, decode_frame, encode_frame};
pub use mock::MockChannel;
