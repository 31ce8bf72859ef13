//! Unidirectional state core
//!
//! ```text
//! event ─► Action ─► dispatch ─► middleware chain ─► reduce ─► AppState ─► subscribers
//!                        ▲              │
//!                        └── effects ◄──┘
//! ```

pub mod action;
pub mod middleware;
pub mod reducer;
pub mod state;
pub mod store;

pub use action::Action;
pub use state::AppState;
pub use store::{Middleware, Next, Reducer, StateSubscription, Store};

/// Store holding a composite session's state
pub type AppStore = Store<AppState>;
