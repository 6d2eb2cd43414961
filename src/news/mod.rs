//! News storage consumed by the feed page.
//!
//! Articles are tagged by technology; a profile's position selects which
//! tags it is interested in.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::auth::UserProfile;
use crate::error::{NewstlerError, Result};

/// A news item as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub id: u64,
    pub title: String,
    pub link: String,
}

/// Interest tags attached to catalog items.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Tag {
    Python,
    Javascript,
}

impl Tag {
    /// Tags whose name occurs in `position`, case-insensitively.
    pub fn matching(position: &str) -> Vec<Tag> {
        let position = position.to_lowercase();
        Tag::iter()
            .filter(|tag| position.contains(&tag.to_string()))
            .collect()
    }
}

/// Source of news for a profile.
#[async_trait]
pub trait NewsStorage: Send + Sync {
    async fn get_news_by_profile(&self, profile: &UserProfile) -> Result<Vec<NewsArticle>>;
}

/// Storage returning one canned article, for development without a catalog.
#[derive(Debug, Clone, Default)]
pub struct FakeNewsStorage;

#[async_trait]
impl NewsStorage for FakeNewsStorage {
    async fn get_news_by_profile(&self, _profile: &UserProfile) -> Result<Vec<NewsArticle>> {
        Ok(vec![NewsArticle {
            id: 0,
            title: "Python".to_string(),
            link: "http://www.fake.ru".to_string(),
        }])
    }
}

/// Catalog entry with its tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: u64,
    pub title: String,
    pub link: String,
    pub tag: Tag,
}

impl From<&NewsItem> for NewsArticle {
    fn from(item: &NewsItem) -> Self {
        Self {
            id: item.id,
            title: item.title.clone(),
            link: item.link.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    news: Vec<NewsItem>,
}

/// In-process tagged news catalog.
///
/// Profiles whose position names a known tag get the items carrying those
/// tags; any other profile gets the whole catalog.
///
/// # Example
/// ```
/// use newstler::news::{CatalogNewsStorage, NewsItem, Tag};
///
/// let storage = CatalogNewsStorage::from_items(vec![NewsItem {
///     id: 1,
///     title: "Async Rust in practice".to_string(),
///     link: "https://example.com/async".to_string(),
///     tag: Tag::Python,
/// }]);
/// assert_eq!(storage.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CatalogNewsStorage {
    items: Vec<NewsItem>,
}

impl CatalogNewsStorage {
    pub fn from_items(items: Vec<NewsItem>) -> Self {
        Self { items }
    }

    /// Parse a catalog of `[[news]]` tables.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(raw)
            .map_err(|err| NewstlerError::Storage(format!("invalid news catalog: {err}")))?;
        Ok(Self::from_items(file.news))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let storage = Self::from_toml_str(&raw)?;
        tracing::debug!(
            path = %path.display(),
            items = storage.len(),
            "news catalog loaded"
        );
        Ok(storage)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[async_trait]
impl NewsStorage for CatalogNewsStorage {
    async fn get_news_by_profile(&self, profile: &UserProfile) -> Result<Vec<NewsArticle>> {
        let tags = profile
            .position
            .as_deref()
            .map(Tag::matching)
            .unwrap_or_default();
        let articles = if tags.is_empty() {
            self.items.iter().map(NewsArticle::from).collect()
        } else {
            self.items
                .iter()
                .filter(|item| tags.contains(&item.tag))
                .map(NewsArticle::from)
                .collect()
        };
        Ok(articles)
    }
}
