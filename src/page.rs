//! The page contract shared by every generated page type. A page is
//! [`Renderable`] (it projects itself into a template value and renders
//! through the layout chain) and [`Writable`] (it knows its URL, where that
//! URL lands on disk, and how to write its output there).
//!
//! [`render_with_layouts`] and [`write_output`] hold the machinery the trait
//! implementations share.

use crate::layout::Layouts;
use crate::render::Renderer;
use crate::tag::InvalidTagError;
use crate::util::deep_merge;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// A page that can be rendered to a string.
pub trait Renderable {
    /// Projects the page into its template value. This is what templates see
    /// as `page`. It never includes the rendered output.
    fn to_value(&self) -> Value;

    /// Renders the page through its layout chain with `site_payload` as the
    /// site-wide template context. The output is stored on the page and
    /// returned.
    fn render(&mut self, layouts: &Layouts, site_payload: &Value) -> Result<&str>;

    /// The rendered output, if [`Renderable::render`] has succeeded.
    fn output(&self) -> Option<&str>;
}

/// A page that can be written to disk.
pub trait Writable {
    /// The site-relative URL of the page.
    fn url(&self) -> String;

    /// The path the page is written to under `dest`.
    fn destination(&self, dest: &Path) -> PathBuf;

    /// Writes the rendered output to [`Writable::destination`], joining
    /// `dest_suffix` onto `dest` first when given.
    fn write(&self, dest: &Path, dest_suffix: Option<&Path>) -> Result<()>;

    /// Whether the page is HTML, for output-type dispatch by the host.
    fn is_html(&self) -> bool;
}

/// Evaluates `content` against `payload`, then wraps the result in the layout
/// named `page_layout` and in each parent layout it declares.
///
/// For each layout, the payload gains `content` (the output so far) and
/// `layout` (the layout's front matter, with values from more specific
/// layouts taking precedence). The chain stops at the first layout without a
/// parent, or at the first layout that was already applied. A layout name
/// that isn't in `layouts` is an error.
pub fn render_with_layouts(
    renderer: &Renderer,
    name: &str,
    content: &str,
    page_layout: Option<&str>,
    layouts: &Layouts,
    mut payload: Value,
) -> Result<String> {
    let mut output = renderer.render(name, content, &payload)?;

    let mut requested_by = name.to_owned();
    let mut next = page_layout;
    let mut used: HashSet<&str> = HashSet::new();
    let mut layout_data = Value::Object(Default::default());

    while let Some(layout_name) = next {
        let layout = layouts.get(layout_name).ok_or_else(|| Error::MissingLayout {
            layout: layout_name.to_owned(),
            requested_by: requested_by.clone(),
        })?;
        if !used.insert(&layout.name) {
            tracing::warn!(
                "layout chain loops back to `{}` from {}; stopping there",
                layout.name,
                requested_by,
            );
            break;
        }

        layout_data = deep_merge(Value::Object(layout.data.clone()), layout_data);
        if let Value::Object(obj) = &mut payload {
            obj.insert("content".to_owned(), Value::String(output));
            obj.insert("layout".to_owned(), layout_data.clone());
        }
        requested_by = format!("layout `{}`", layout.name);
        output = renderer.render(&requested_by, &layout.content, &payload)?;

        next = layout.parent();
    }

    Ok(output)
}

/// Writes `output` to `path`, creating any missing parent directories and
/// truncating any existing file.
pub fn write_output(path: &Path, output: &str) -> io::Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    File::create(path)?.write_all(output.as_bytes())
}

/// The payload a page renders with: `{page, paginator}` merged over
/// `site_payload`, with the page-local keys winning.
pub fn page_payload(page: Value, paginator: Value, site_payload: &Value) -> Value {
    deep_merge(
        site_payload.clone(),
        json!({
            "page": page,
            "paginator": paginator,
        }),
    )
}

/// The result of a fallible page operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error constructing, rendering, or writing a page.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a page is constructed with a tag that isn't safe to use
    /// as a path component.
    #[error(transparent)]
    InvalidTag(#[from] InvalidTagError),

    /// Returned when a page or layout requests a layout that doesn't exist.
    #[error("layout `{layout}` requested by {requested_by} does not exist")]
    MissingLayout {
        layout: String,
        requested_by: String,
    },

    /// Returned when a page is written before it was rendered.
    #[error("page `{0}` has not been rendered")]
    NotRendered(String),

    /// Returned when the template engine fails to parse or evaluate a
    /// template.
    #[error(transparent)]
    Template(#[from] minijinja::Error),

    /// Returned when page data can't be converted into a template value.
    #[error(transparent)]
    Serialize(#[from] serde_json::Error),

    /// Returned for I/O errors writing the output file.
    #[error(transparent)]
    Io(#[from] io::Error),
}
