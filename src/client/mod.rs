//! Client side of the sign-in flow: durable token storage, the session
//! store that gates signed-in UI, and the HTTP sign-in client.

pub mod api;
pub mod session;
pub mod store;

pub use api::{ClientError, SignInClient};
pub use session::{SessionState, SessionStore, TOKEN_KEY};
pub use store::{DurableError, DurableStore, FileStore, MemoryStore};
