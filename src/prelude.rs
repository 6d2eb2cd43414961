//! Convenience re-exports for common use.

pub use crate::auth::{
    AccessTokenResult, AuthorizationRequest, CredentialStore, FileCredentialStore,
    MemorySessionStore, SessionStore, StoredCredential, UserProfile,
};
pub use crate::config::ServiceConfig;
pub use crate::error::{NewstlerError, Result};
pub use crate::flow::{AuthorizationFlow, CallbackParams, FlowError, FlowState, FlowStep, NewsPage};
pub use crate::news::{NewsArticle, NewsStorage};
pub use crate::provider::{ProviderClient, ProviderSession};
pub use crate::registry::{ConfigDrivenRegistry, ServiceRegistry};
