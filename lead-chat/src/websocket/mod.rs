pub mod machine;
pub mod message_log;
pub mod message_types;
pub mod session;
pub mod transport;

pub use machine::{ConnectionState, HistoryState, SessionMachine, SessionSnapshot};
pub use message_log::MessageLog;
pub use message_types::InboundFrame;
pub use session::{ChatSession, Notice, NoticeLevel, SessionConfig, SessionEvent};
pub use transport::{Connection, Connector, FrameSink, FrameStream, TungsteniteConnector};
