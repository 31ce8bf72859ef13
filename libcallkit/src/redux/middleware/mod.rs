//! Middlewares bridging actions to the SDK and platform adapters
//!
//! Each middleware inspects the action, starts whatever side effect it owns
//! and always forwards the action to `next`. Asynchronous results come back
//! as new actions through `dispatch`.

mod audio;
mod bridge;
mod calling;

pub use audio::AudioMiddleware;
pub use calling::CallingMiddleware;
