//! Indexes posts by tag and renders and writes one [`TagPage`] per tag.

use crate::layout::{self, Layouts};
use crate::page::{self, Renderable, Writable};
use crate::pager::Pager;
use crate::post::Post;
use crate::site::Site;
use crate::tag::{InvalidTagError, Tag};
use crate::tag_page::TagPage;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Responsible for indexing posts by tag and rendering and writing a tag page
/// for each tag.
pub struct Writer<'a> {
    /// The site the pages belong to.
    pub site: &'a Site,

    /// The layouts tag pages render through.
    pub layouts: &'a Layouts,

    /// The root directory pages are written under. A tag page is written to
    /// `{destination}/tag/{tag}/index.html`.
    pub destination: &'a Path,

    /// An optional subdirectory of `destination` to write into instead, e.g.
    /// for a localized copy of the site.
    pub dest_suffix: Option<&'a Path>,
}

impl Writer<'_> {
    /// Indexes `posts` by tag and writes a tag page for each tag, in tag
    /// order. Returns the paths written. Stops at the first page that fails.
    pub fn write_tag_pages(&self, posts: &[Post]) -> Result<Vec<PathBuf>> {
        let site_payload = self.site.payload(posts)?;
        let indices = index_posts(posts, self.site.config().slugify_tags)?;

        let mut written = Vec::with_capacity(indices.len());
        for index in indices {
            let tag = index.tag.to_string();
            let path = self
                .write_page(index, &site_payload)
                .map_err(|err| Error::Page { tag, err })?;
            written.push(path);
        }

        tracing::info!(
            pages = written.len(),
            destination = %self.destination.display(),
            "wrote tag pages"
        );
        Ok(written)
    }

    /// Builds, renders, and writes the page for a single [`Index`].
    fn write_page(&self, index: Index<'_>, site_payload: &Value) -> page::Result<PathBuf> {
        let pager = Pager::single(index.posts.len());
        let mut page = TagPage::with_tag(self.site, index.tag, index.posts)?;
        page.set_pager(&pager);
        page.render(self.layouts, site_payload)?;
        page.write(self.destination, self.dest_suffix)?;

        let dest = match self.dest_suffix {
            Some(suffix) => self.destination.join(suffix),
            None => self.destination.to_owned(),
        };
        Ok(page.destination(&dest))
    }
}

/// Loads the layouts from the site's layouts directory and writes every tag
/// page under the site's destination directory.
pub fn generate(site: &Site, posts: &[Post]) -> Result<Vec<PathBuf>> {
    let layouts = site.load_layouts()?;
    Writer {
        site,
        layouts: &layouts,
        destination: &site.config().destination_directory,
        dest_suffix: None,
    }
    .write_tag_pages(posts)
}

/// The posts associated with a single tag.
struct Index<'a> {
    tag: Tag,
    posts: Vec<&'a Post>,
}

/// Groups `posts` by tag, keeping each group in `posts` order. A post lists
/// under a tag once even if it names the tag more than once. With `slugify`,
/// tags are slugified first, so `macOS` and `MacOS` share a page.
fn index_posts(posts: &[Post], slugify: bool) -> Result<Vec<Index<'_>>> {
    let mut indices: BTreeMap<String, Index<'_>> = BTreeMap::new();

    for post in posts {
        for name in post.tags.iter() {
            let tag = match slugify {
                true => Tag::slugified(name),
                false => Tag::new(name.as_str()),
            }
            .map_err(|err| Error::InvalidTag {
                title: post.title.clone(),
                err,
            })?;

            match indices.get_mut(tag.name()) {
                None => {
                    indices.insert(
                        tag.name().to_owned(),
                        Index {
                            tag,
                            posts: vec![post],
                        },
                    );
                }
                Some(index) => {
                    if !index.posts.iter().any(|p| std::ptr::eq(*p, post)) {
                        index.posts.push(post);
                    }
                }
            }
        }
    }

    Ok(indices.into_values().collect())
}

/// The result of a fallible tag page generation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error generating tag pages.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a post carries a tag that can't be used in a path.
    #[error("post `{title}`: {err}")]
    InvalidTag { title: String, err: InvalidTagError },

    /// Returned when building, rendering, or writing a tag's page fails.
    #[error("tag `{tag}`: {err}")]
    Page { tag: String, err: page::Error },

    /// Returned when the site payload can't be built.
    #[error("building site payload: {0}")]
    Payload(#[from] serde_json::Error),

    /// Returned when the layouts can't be loaded.
    #[error(transparent)]
    Layout(#[from] layout::Error),
}
