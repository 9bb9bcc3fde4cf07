//! Defines [`Site`], the handle pages keep to the site being built.

use crate::config::Config;
use crate::layout::{self, Layouts};
use crate::post::Post;
use crate::render::Renderer;
use chrono::Utc;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// The site being built: its configuration and the template renderer pages
/// are evaluated with.
pub struct Site {
    config: Config,
    renderer: Renderer,
}

impl Site {
    pub fn new(config: Config) -> Site {
        Site {
            config,
            renderer: Renderer::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Loads the layouts from the configured layouts directory.
    pub fn load_layouts(&self) -> layout::Result<Layouts> {
        Layouts::load(&self.config.layouts_directory)
    }

    /// Builds the site-wide template context:
    ///
    /// ```text
    /// {"site": {<config variables>, "time", "posts", "tags": {tag: [post]}}}
    /// ```
    ///
    /// `tags` groups posts by their raw tag names, each group in `posts`
    /// order.
    pub fn payload(&self, posts: &[Post]) -> serde_json::Result<Value> {
        let mut tags: BTreeMap<&str, Vec<Value>> = BTreeMap::new();
        for post in posts {
            let post_value = serde_json::to_value(post)?;
            for tag in &post.tags {
                tags.entry(tag.as_str()).or_default().push(post_value.clone());
            }
        }
        let tags: Map<String, Value> = tags
            .into_iter()
            .map(|(tag, group)| (tag.to_owned(), Value::Array(group)))
            .collect();

        let mut site = self.config.variables.clone();
        site.insert("time".to_owned(), Value::String(Utc::now().to_rfc3339()));
        site.insert("posts".to_owned(), serde_json::to_value(posts)?);
        site.insert("tags".to_owned(), Value::Object(tags));
        Ok(json!({ "site": site }))
    }
}
