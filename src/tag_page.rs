//! Defines [`TagPage`], the page listing every post under one tag. Its URL is
//! always `/tag/{tag}/index.html`.

use crate::layout::Layouts;
use crate::page::{self, page_payload, render_with_layouts, write_output, Error, Renderable, Writable};
use crate::pager::Pager;
use crate::post::Post;
use crate::site::Site;
use crate::tag::{self, Tag};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// The template every tag page renders: one list entry per post, in the order
/// the posts were given.
const CONTENT: &str = r#"<ul class="posts">
{% for post in page.posts %}
<li class="tag">
<span>{{ post.date | date("%B %e, %Y") }}</span>
<a href="{{ post.url }}" >{{ post.title }}</a></li>
{% endfor %}
</ul>
"#;

/// The layout tag pages render into.
pub const LAYOUT: &str = "tag";

/// A listing page for the posts under one tag. Constructed once per tag,
/// rendered once and written once.
pub struct TagPage<'a> {
    site: &'a Site,
    tag: Tag,
    posts: Vec<&'a Post>,
    data: Map<String, Value>,
    pager: Option<&'a Pager>,
    output: Option<String>,
}

impl<'a> TagPage<'a> {
    /// Creates the page for `tag` listing `posts`. Fails if `tag` isn't safe
    /// to embed in the page's path; no I/O happens here.
    pub fn new<I>(site: &'a Site, tag: &str, posts: I) -> page::Result<TagPage<'a>>
    where
        I: IntoIterator<Item = &'a Post>,
    {
        TagPage::with_tag(site, Tag::new(tag)?, posts)
    }

    /// Like [`TagPage::new`] for an already validated [`Tag`].
    pub fn with_tag<I>(site: &'a Site, tag: Tag, posts: I) -> page::Result<TagPage<'a>>
    where
        I: IntoIterator<Item = &'a Post>,
    {
        let posts: Vec<&Post> = posts.into_iter().collect();
        let mut data = Map::new();
        data.insert("layout".to_owned(), Value::from(LAYOUT));
        data.insert("type".to_owned(), Value::from("tag"));
        data.insert("title".to_owned(), Value::String(format!("Tag - {}", tag)));
        data.insert("posts".to_owned(), serde_json::to_value(&posts)?);
        Ok(TagPage {
            site,
            tag,
            posts,
            data,
            pager: None,
            output: None,
        })
    }

    /// Attaches the pagination descriptor forwarded to templates as
    /// `paginator`.
    pub fn set_pager(&mut self, pager: &'a Pager) {
        self.pager = Some(pager);
    }

    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    pub fn posts(&self) -> &[&'a Post] {
        &self.posts
    }

    /// The page metadata: `layout`, `type`, `title` and `posts`.
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// The unrendered page template.
    pub fn content(&self) -> &'static str {
        CONTENT
    }
}

impl Renderable for TagPage<'_> {
    fn to_value(&self) -> Value {
        let mut value = self.data.clone();
        value.insert("url".to_owned(), Value::String(self.url()));
        value.insert("content".to_owned(), Value::from(CONTENT));
        Value::Object(value)
    }

    fn render(&mut self, layouts: &Layouts, site_payload: &Value) -> page::Result<&str> {
        let paginator = match self.pager {
            Some(pager) => serde_json::to_value(pager)?,
            None => Value::Null,
        };
        let payload = page_payload(self.to_value(), paginator, site_payload);
        let layout = self.data.get("layout").and_then(Value::as_str);
        let output = render_with_layouts(
            self.site.renderer(),
            &format!("tag page `{}`", self.tag),
            CONTENT,
            layout,
            layouts,
            payload,
        )?;
        tracing::debug!(tag = %self.tag, posts = self.posts.len(), "rendered tag page");
        Ok(self.output.insert(output).as_str())
    }

    fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }
}

impl Writable for TagPage<'_> {
    fn url(&self) -> String {
        format!("/tag/{}/index.html", self.tag)
    }

    /// Joins `dest` with the percent-decoded URL, so a tag such as
    /// `hello%20world` is written to `tag/hello world/index.html`.
    fn destination(&self, dest: &Path) -> PathBuf {
        let url = self.url();
        // Tags are validated to decode to UTF-8 on construction.
        let decoded = tag::decode(&url).unwrap_or_else(|| url.clone());
        dest.join(decoded.trim_start_matches('/'))
    }

    fn write(&self, dest: &Path, dest_suffix: Option<&Path>) -> page::Result<()> {
        let output = self
            .output
            .as_deref()
            .ok_or_else(|| Error::NotRendered(self.url()))?;
        let dest = match dest_suffix {
            Some(suffix) => dest.join(suffix),
            None => dest.to_owned(),
        };
        let path = self.destination(&dest);
        write_output(&path, output)?;
        tracing::debug!(tag = %self.tag, path = %path.display(), "wrote tag page");
        Ok(())
    }

    fn is_html(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::Config;
    use crate::layout::Layout;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::fs;

    type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

    fn site() -> Site {
        Site::new(Config::default())
    }

    fn posts() -> Vec<Post> {
        vec![
            Post::new("Post A", "/2021/a", NaiveDate::from_ymd_opt(2021, 1, 1).unwrap()),
            Post::new("Post B", "/2021/b", NaiveDate::from_ymd_opt(2021, 2, 2).unwrap()),
        ]
    }

    fn layouts() -> Layouts {
        vec![Layout {
            name: LAYOUT.to_owned(),
            data: Map::new(),
            content: "<h1>{{ page.title }}</h1>\n{{ content }}".to_owned(),
        }]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_url() -> Result<()> {
        let site = site();
        for tag in &["ruby", "releases", "c++", "hello%20world"] {
            let page = TagPage::new(&site, tag, &[])?;
            assert_eq!(format!("/tag/{}/index.html", tag), page.url());
        }
        Ok(())
    }

    #[test]
    fn test_destination_decodes_url() -> Result<()> {
        let site = site();
        let root = Path::new("/srv/site");
        let page = TagPage::new(&site, "hello%20world", &[])?;
        assert_eq!(root.join("tag/hello world/index.html"), page.destination(root));
        let page = TagPage::new(&site, "ruby", &[])?;
        assert_eq!(root.join("tag/ruby/index.html"), page.destination(root));
        Ok(())
    }

    #[test]
    fn test_rejects_unsafe_tag() {
        let site = site();
        for tag in &["", "..", "../etc", "%2E%2E"] {
            match TagPage::new(&site, tag, &[]) {
                Err(Error::InvalidTag(err)) => assert_eq!(*tag, err.tag),
                Err(err) => panic!("unexpected error for {:?}: {}", tag, err),
                Ok(_) => panic!("accepted unsafe tag {:?}", tag),
            }
        }
    }

    #[test]
    fn test_data() -> Result<()> {
        let site = site();
        let posts = posts();
        let page = TagPage::new(&site, "ruby", &posts)?;
        assert_eq!(Some(&Value::from("tag")), page.data().get("layout"));
        assert_eq!(Some(&Value::from("tag")), page.data().get("type"));
        assert_eq!(Some(&Value::from("Tag - ruby")), page.data().get("title"));
        assert_eq!(Some(&serde_json::to_value(&posts)?), page.data().get("posts"));
        Ok(())
    }

    #[test]
    fn test_to_value_keys() -> Result<()> {
        let site = site();
        let posts = posts();
        let mut page = TagPage::new(&site, "ruby", &posts)?;
        page.render(&layouts(), &json!({}))?;

        let value = page.to_value();
        let mut keys: Vec<&str> = value
            .as_object()
            .map(|obj| obj.keys().map(String::as_str).collect())
            .unwrap_or_default();
        keys.sort_unstable();
        assert_eq!(vec!["content", "layout", "posts", "title", "type", "url"], keys);
        assert_eq!(Some(&Value::from(CONTENT)), value.get("content"));
        assert_eq!(Some(&Value::from("/tag/ruby/index.html")), value.get("url"));
        Ok(())
    }

    #[test]
    fn test_render_lists_posts_in_order() -> Result<()> {
        let site = site();
        let posts = posts();
        let mut page = TagPage::new(&site, "ruby", &posts)?;
        let output = page.render(&layouts(), &json!({}))?.to_owned();

        assert!(output.starts_with("<h1>Tag - ruby</h1>\n<ul class=\"posts\">"));
        assert_eq!(2, output.matches("<li class=\"tag\">").count());
        let a = output.find("<a href=\"/2021/a\" >Post A</a>").ok_or("missing Post A")?;
        let b = output.find("<a href=\"/2021/b\" >Post B</a>").ok_or("missing Post B")?;
        assert!(a < b);
        assert!(output.contains("<span>January  1, 2021</span>"));
        assert!(output.contains("<span>February  2, 2021</span>"));
        assert_eq!(Some(output.as_str()), page.output());
        Ok(())
    }

    #[test]
    fn test_render_empty_tag() -> Result<()> {
        let site = site();
        let mut page = TagPage::new(&site, "releases", &[])?;
        let output = page.render(&layouts(), &json!({}))?;
        assert!(output.contains("<ul class=\"posts\">"));
        assert!(!output.contains("<li"));
        Ok(())
    }

    #[test]
    fn test_render_forwards_site_and_paginator() -> Result<()> {
        let site = site();
        let posts = posts();
        let pager = Pager::single(posts.len());
        let mut page = TagPage::new(&site, "ruby", &posts)?;
        page.set_pager(&pager);
        let layouts: Layouts = vec![Layout {
            name: LAYOUT.to_owned(),
            data: Map::new(),
            content: "{{ site.title }}|{{ paginator.total_posts }}|{{ paginator.total_pages }}"
                .to_owned(),
        }]
        .into_iter()
        .collect();
        let output = page.render(&layouts, &json!({"site": {"title": "Blog"}}))?;
        assert_eq!("Blog|2|1", output);
        Ok(())
    }

    #[test]
    fn test_render_missing_layout() -> Result<()> {
        let site = site();
        let mut page = TagPage::new(&site, "ruby", &[])?;
        match page.render(&Layouts::new(), &json!({})) {
            Err(Error::MissingLayout { layout, requested_by }) => {
                assert_eq!("tag", layout);
                assert!(requested_by.contains("ruby"));
            }
            other => panic!("expected a missing layout error, got {:?}", other.map(str::len)),
        }
        assert_eq!(None, page.output());
        Ok(())
    }

    #[test]
    fn test_render_layout_syntax_error() -> Result<()> {
        let site = site();
        let mut page = TagPage::new(&site, "ruby", &[])?;
        let layouts: Layouts = vec![Layout {
            name: LAYOUT.to_owned(),
            data: Map::new(),
            content: "<main>{% for x in %}{{ content }}</main>".to_owned(),
        }]
        .into_iter()
        .collect();
        match page.render(&layouts, &json!({})) {
            Err(Error::Template(err)) => {
                assert_eq!(minijinja::ErrorKind::SyntaxError, err.kind());
            }
            other => panic!("expected a template error, got {:?}", other.map(str::len)),
        }
        assert_eq!(None, page.output());
        Ok(())
    }

    #[test]
    fn test_write_is_idempotent() -> Result<()> {
        let site = site();
        let posts = posts();
        let dir = tempfile::tempdir()?;
        let mut page = TagPage::new(&site, "ruby", &posts)?;
        page.render(&layouts(), &json!({}))?;

        page.write(dir.path(), None)?;
        let path = dir.path().join("tag").join("ruby").join("index.html");
        let first = fs::read_to_string(&path)?;
        page.write(dir.path(), None)?;
        assert_eq!(first, fs::read_to_string(&path)?);
        assert_eq!(page.output(), Some(first.as_str()));
        Ok(())
    }

    #[test]
    fn test_write_with_suffix() -> Result<()> {
        let site = site();
        let dir = tempfile::tempdir()?;
        let mut page = TagPage::new(&site, "ruby", &[])?;
        page.render(&layouts(), &json!({}))?;
        page.write(dir.path(), Some(Path::new("de")))?;
        assert!(dir.path().join("de/tag/ruby/index.html").is_file());
        Ok(())
    }

    #[test]
    fn test_write_before_render() -> Result<()> {
        let site = site();
        let dir = tempfile::tempdir()?;
        let page = TagPage::new(&site, "ruby", &[])?;
        match page.write(dir.path(), None) {
            Err(Error::NotRendered(url)) => assert_eq!("/tag/ruby/index.html", url),
            other => panic!("expected a not rendered error, got {:?}", other),
        }
        assert!(!dir.path().join("tag").exists());
        Ok(())
    }

    #[test]
    fn test_is_html() -> Result<()> {
        let site = site();
        assert!(TagPage::new(&site, "ruby", &[])?.is_html());
        Ok(())
    }
}
