//! Newstler: a news feed personalized by a linked LinkedIn profile.
//!
//! The crate holds the account-linking core: an OAuth2 authorization-code
//! client for LinkedIn, token-bound sessions for profile reads, a registry
//! that hands out the configured services, and the flow controller that
//! request handlers call.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use newstler::prelude::*;
//!
//! # async fn example(callback: CallbackParams) -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let config = ServiceConfig::load(None)?;
//! let credentials = Arc::new(FileCredentialStore::new(config.storage.credentials_dir()));
//! let registry = Arc::new(ConfigDrivenRegistry::new(config)?);
//! let flow = AuthorizationFlow::new(registry, credentials);
//!
//! let session = MemorySessionStore::new();
//! flow.start("42", &session).await?;
//! // ... the user consents and LinkedIn redirects back ...
//! flow.complete("42", &session, &callback).await?;
//! if let NewsPage::Feed { articles, .. } = flow.news("42").await? {
//!     println!("{} articles", articles.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod flow;
pub mod news;
pub mod prelude;
pub mod provider;
pub mod registry;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;
