//! JSON event protocol spoken over the WebSocket

pub mod events;
pub mod router;

pub use events::{EventSink, InboundEvent, OutboundEvent};
pub use router::EventRouter;
