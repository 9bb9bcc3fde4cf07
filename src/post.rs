//! Defines the [`Post`] type: the read-only post reference that tag pages
//! list. Posts are owned by the caller; pages only borrow them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A post as seen by tag pages. Serializes into the template value exposed
/// as each entry of `page.posts`, i.e. `{title, url, date, tags}` with `date`
/// formatted as `YYYY-MM-DD`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// The title of the post.
    pub title: String,

    /// The site-relative (or absolute) URL of the rendered post.
    pub url: String,

    /// The publication date of the post.
    pub date: NaiveDate,

    /// The raw tag names associated with the post.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Post {
    /// Creates an untagged post.
    pub fn new<T: Into<String>, U: Into<String>>(
        title: T,
        url: U,
        date: NaiveDate,
    ) -> Post {
        Post {
            title: title.into(),
            url: url.into(),
            date,
            tags: Vec::new(),
        }
    }

    /// Returns the post with `tags` appended to its tag list.
    pub fn with_tags<I, S>(mut self, tags: I) -> Post
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }
}
