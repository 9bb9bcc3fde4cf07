//! The template layer. [`Renderer`] wraps a [`minijinja::Environment`] set up
//! for page and layout templates: no auto-escaping (layouts embed already
//! rendered HTML through `{{ content }}`) and a `date` filter for formatting
//! post dates, e.g. `{{ post.date | date("%B %e, %Y") }}`.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use minijinja::{AutoEscape, Environment, Error, ErrorKind};
use serde::Serialize;
use std::fmt::Write;

/// Evaluates page and layout templates.
pub struct Renderer {
    env: Environment<'static>,
}

impl Renderer {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_keep_trailing_newline(true);
        env.add_filter("date", date);
        Self { env }
    }

    /// Evaluates the template `source` against `ctx`. `name` identifies the
    /// template in error messages.
    pub fn render<S: Serialize>(
        &self,
        name: &str,
        source: &str,
        ctx: S,
    ) -> Result<String, Error> {
        self.env.render_named_str(name, source, ctx)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Formats `value` with the strftime-style `format`. `value` is either a
/// calendar date (`YYYY-MM-DD`, taken as midnight UTC) or an RFC 3339
/// timestamp.
fn date(value: &str, format: &str) -> Result<String, Error> {
    let datetime = parse_date(value).ok_or_else(|| {
        Error::new(
            ErrorKind::InvalidOperation,
            format!("cannot interpret `{}` as a date", value),
        )
    })?;

    // Formatting through `write!` reports bad format strings as an error
    // instead of panicking the way `to_string()` would.
    let mut out = String::new();
    write!(out, "{}", datetime.format(format)).map_err(|_| {
        Error::new(
            ErrorKind::InvalidOperation,
            format!("invalid date format `{}`", format),
        )
    })?;
    Ok(out)
}

fn parse_date(value: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(datetime);
    }
    let naive = match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(date) => date.and_hms_opt(0, 0, 0)?,
        Err(_) => NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").ok()?,
    };
    Some(Utc.fix().from_utc_datetime(&naive))
}
