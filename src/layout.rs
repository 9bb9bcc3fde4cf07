//! Defines [`Layout`] and the [`Layouts`] registry. A layout is a named
//! wrapper template whose optional YAML front matter may name a parent
//! layout via its `layout` key, for example:
//!
//! ```html
//! ---
//! layout: default
//! ---
//! <section class="tag-index">{{ content }}</section>
//! ```

use crate::util::open;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::ffi::OsStr;
use std::io::Read;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const FENCE: &str = "---";

/// A named wrapper template.
#[derive(Clone, Debug, PartialEq)]
pub struct Layout {
    /// The name pages and other layouts refer to this layout by.
    pub name: String,

    /// The layout's front matter. Made available to templates as `layout`.
    pub data: Map<String, Value>,

    /// The template source, without front matter.
    pub content: String,
}

impl Layout {
    /// Parses a layout from its source text. Front matter is optional; when
    /// present it must open the text with a `---` line and be closed by
    /// another `---` line.
    pub fn parse(name: &str, input: &str) -> Result<Layout> {
        let (data, content) = match split_front_matter(input)? {
            None => (Map::new(), input),
            Some((yaml, body)) => {
                let data = match yaml.trim().is_empty() {
                    true => Map::new(),
                    false => serde_yaml::from_str(yaml).map_err(|err| {
                        Error::Yaml {
                            layout: name.to_owned(),
                            err,
                        }
                    })?,
                };
                (data, body)
            }
        };
        Ok(Layout {
            name: name.to_owned(),
            data,
            content: content.to_owned(),
        })
    }

    /// The name of the parent layout, if the front matter declares one.
    pub fn parent(&self) -> Option<&str> {
        self.data.get("layout").and_then(Value::as_str)
    }
}

/// Returns `(front matter, body)` or `None` when `input` has no front matter.
fn split_front_matter(input: &str) -> Result<Option<(&str, &str)>> {
    if !input.starts_with(FENCE) {
        return Ok(None);
    }
    let yaml_start = match input[FENCE.len()..].find('\n') {
        Some(offset) if input[FENCE.len()..FENCE.len() + offset].trim().is_empty() => {
            FENCE.len() + offset + 1
        }
        _ => return Ok(None),
    };

    let mut line_start = yaml_start;
    for line in input[yaml_start..].split_inclusive('\n') {
        if line.trim_end() == FENCE {
            let body_start = line_start + line.len();
            return Ok(Some((&input[yaml_start..line_start], &input[body_start..])));
        }
        line_start += line.len();
    }
    Err(Error::FrontMatterMissingEndFence)
}

/// The registry of layouts available to pages, keyed by name.
#[derive(Clone, Debug, Default)]
pub struct Layouts(HashMap<String, Layout>);

impl Layouts {
    pub fn new() -> Layouts {
        Layouts::default()
    }

    /// Adds `layout`, replacing any layout of the same name.
    pub fn insert(&mut self, layout: Layout) {
        self.0.insert(layout.name.clone(), layout);
    }

    pub fn get(&self, name: &str) -> Option<&Layout> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Loads every file under `dir` as a layout. Each layout is named after
    /// its path relative to `dir` less the extension, so
    /// `{dir}/blog/post.html` is named `blog/post`. Hidden entries and editor
    /// backups (`*~`, `#*#`) are skipped.
    pub fn load(dir: &Path) -> Result<Layouts> {
        let mut layouts = Layouts::new();
        let walker = WalkDir::new(dir)
            .sort_by(|a, b| a.file_name().cmp(b.file_name()))
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_ignored(entry.file_name()));
        for result in walker {
            let entry = result?;
            if !entry.file_type().is_file() {
                continue;
            }
            let annotate = |e| Error::Annotated(entry.path().to_owned(), Box::new(e));
            let name = layout_name(dir, entry.path())?;
            let contents = read(entry.path()).map_err(|e| annotate(Error::Io(e)))?;
            layouts.insert(Layout::parse(&name, &contents).map_err(annotate)?);
        }
        tracing::debug!("loaded {} layouts from {}", layouts.len(), dir.display());
        Ok(layouts)
    }
}

fn read(path: &Path) -> std::io::Result<String> {
    let mut contents = String::new();
    open(path, "layout")?.read_to_string(&mut contents)?;
    Ok(contents)
}

/// Dotfiles (`.DS_Store`, `.tag.html.swp`) and backups (`tag.html~`,
/// `#tag.html#`) aren't layouts.
fn is_ignored(file_name: &OsStr) -> bool {
    match file_name.to_str() {
        Some(name) => {
            name.starts_with('.')
                || name.ends_with('~')
                || (name.len() > 1 && name.starts_with('#') && name.ends_with('#'))
        }
        None => false,
    }
}

impl std::iter::FromIterator<Layout> for Layouts {
    fn from_iter<I: IntoIterator<Item = Layout>>(iter: I) -> Layouts {
        let mut layouts = Layouts::new();
        for layout in iter {
            layouts.insert(layout);
        }
        layouts
    }
}

fn layout_name(dir: &Path, path: &Path) -> Result<String> {
    let invalid = || InvalidFileNameError(path.to_owned());
    // strip_prefix shouldn't fail since `dir` is always an ancestor of `path`
    let relative = path.strip_prefix(dir).map_err(|_| invalid())?;
    let components = relative
        .with_extension("")
        .components()
        .map(|c| c.as_os_str().to_str().map(str::to_owned))
        .collect::<Option<Vec<String>>>()
        .ok_or_else(invalid)?;
    Ok(components.join("/"))
}

/// Returned when a layout file's path isn't valid UTF-8.
#[derive(Debug, thiserror::Error)]
#[error("invalid layout file name: {0:?}")]
pub struct InvalidFileNameError(PathBuf);

/// Represents the result of loading or parsing a [`Layout`].
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading or parsing a [`Layout`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a layout opens a front matter block but never closes it.
    #[error("missing closing `---` for front matter")]
    FrontMatterMissingEndFence,

    /// Returned when the front matter isn't a valid YAML mapping.
    #[error("parsing front matter of layout `{layout}`: {err}")]
    Yaml {
        layout: String,
        err: serde_yaml::Error,
    },

    /// Returned when a layout file name isn't valid UTF-8.
    #[error(transparent)]
    InvalidFileName(#[from] InvalidFileNameError),

    /// Returned for WalkDir I/O errors.
    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),

    /// Returned for other I/O errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// An error annotated with the layout file it occurred in.
    #[error("{}: {}", .0.display(), .1)]
    Annotated(PathBuf, Box<Error>),
}
