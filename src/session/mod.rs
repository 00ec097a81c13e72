pub mod store;

pub use store::{InMemorySessionStore, SessionState, SessionStore};
