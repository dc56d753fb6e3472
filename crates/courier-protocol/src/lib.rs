pub mod dispatcher;
pub mod envelope;
pub mod error;
pub mod queue;
pub mod sender;

pub use dispatcher::{DispatchError, Dispatcher, Disposition, ListenerConfig};
pub use envelope::{CommandEnvelope, EnvelopeKind};
pub use error::ProtocolError;
pub use queue::{connect, ChannelQueues, QueueHandle};
pub use sender::{Sender, SenderConfig};
