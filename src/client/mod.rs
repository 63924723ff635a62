pub mod cache;
pub mod changes;
pub mod transport;

pub use cache::TaskCache;
pub use changes::{ChangeSource, PollingSource, PushSource};
pub use transport::{HttpTransport, LocalTransport, SyncTransport};
