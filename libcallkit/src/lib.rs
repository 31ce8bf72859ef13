//! Callkit - state core for calling and chat UI composites
//!
//! A single-writer store with reducers and middlewares, the coordinators
//! that turn state changes into host notifications, and the adapters the
//! store drives (calling SDK, audio routing).

pub mod composite;
pub mod config;
pub mod error;
pub mod handler;
pub mod logging;
pub mod persona;
pub mod redux;
pub mod sdk;
pub mod types;

// Re-export commonly used types
pub use composite::{CallComposite, Collaborators, CompositeSession};
pub use config::{CallConfiguration, Config};
pub use error::{CallkitError, Result};
pub use handler::EventHandlers;
pub use redux::{Action, AppState, AppStore};
pub use types::{CallCompositeError, CallStateError, ErrorCode, InstanceId};
