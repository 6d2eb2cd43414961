//! OAuth data model, credential persistence and per-session storage.

pub mod credential;
pub mod session;
pub mod store;
pub mod types;

pub use credential::StoredCredential;
pub use session::{MemorySessionStore, SessionStore};
pub use store::{CredentialStore, FileCredentialStore};
pub use types::{AccessTokenResult, AuthorizationRequest, UserProfile};
