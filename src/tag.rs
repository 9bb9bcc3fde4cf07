//! Defines the [`Tag`] type, a validated tag name that is safe to embed in an
//! output path.

use percent_encoding::percent_decode_str;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A [`crate::post::Post`] tag. The name is checked on construction so that
/// `/tag/{name}/index.html` can never point outside of the tag directory.
#[derive(Clone, Debug)]
pub struct Tag {
    name: String,
}

impl Tag {
    /// Validates `name` and wraps it in a [`Tag`]. The name is used verbatim;
    /// see [`Tag::slugified`] for the normalizing constructor.
    pub fn new<S: Into<String>>(name: S) -> Result<Tag, InvalidTagError> {
        let name = name.into();
        check(&name)?;
        let decoded = decode(&name).ok_or_else(|| InvalidTagError {
            tag: name.clone(),
            reason: "percent-decodes to invalid UTF-8",
        })?;
        check(&decoded).map_err(|e| InvalidTagError {
            tag: name.clone(),
            reason: e.reason,
        })?;
        Ok(Tag { name })
    }

    /// Slugifies `name` before validating it, so e.g. `macOS` and `MacOS`
    /// resolve to the same tag.
    pub fn slugified(name: &str) -> Result<Tag, InvalidTagError> {
        match slug::slugify(name) {
            slugged if slugged.is_empty() => Err(InvalidTagError {
                tag: name.to_owned(),
                reason: "slugifies to an empty string",
            }),
            slugged => Tag::new(slugged),
        }
    }

    /// The tag's name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.name.fmt(f)
    }
}

impl Hash for Tag {
    /// Implements [`Hash`] for [`Tag`] by delegating directly to the `name`
    /// field.
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state)
    }
}

impl PartialEq for Tag {
    /// Implements [`PartialEq`] and [`Eq`] for [`Tag`] by delegating directly
    /// to the `name` field.
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}
impl Eq for Tag {}

/// Percent-decodes `s` the way a form-encoded path component is decoded:
/// `+` becomes a space and `%XX` escapes become bytes. Returns `None` if the
/// result isn't valid UTF-8.
pub(crate) fn decode(s: &str) -> Option<String> {
    let plus_decoded = s.replace('+', " ");
    percent_decode_str(&plus_decoded)
        .decode_utf8()
        .ok()
        .map(|decoded| decoded.into_owned())
}

fn check(name: &str) -> Result<(), InvalidTagError> {
    let reason = if name.is_empty() {
        "tag is empty"
    } else if name == "." || name == ".." {
        "tag is a relative path component"
    } else if name.contains('/') || name.contains('\\') {
        "tag contains a path separator"
    } else if name.chars().any(char::is_control) {
        "tag contains a control character"
    } else {
        return Ok(());
    };
    Err(InvalidTagError {
        tag: name.to_owned(),
        reason,
    })
}

/// Returned when a tag name can't be safely used as a path component.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid tag `{tag}`: {reason}")]
pub struct InvalidTagError {
    /// The rejected tag, as given.
    pub tag: String,

    /// Why the tag was rejected.
    pub reason: &'static str,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_accepts_plain_names() -> Result<(), InvalidTagError> {
        for name in &["rust", "releases", "c++", "hello world", "café", "v1.0"] {
            assert_eq!(*name, Tag::new(*name)?.name());
        }
        Ok(())
    }

    #[test]
    fn test_rejects_path_escapes() {
        for name in &["", ".", "..", "a/b", "..\\x", "nul\0", "%2E%2E", "a%2Fb"] {
            assert!(Tag::new(*name).is_err(), "accepted {:?}", name);
        }
    }

    #[test]
    fn test_rejects_invalid_utf8_escape() {
        let err = Tag::new("%FF").unwrap_err();
        assert_eq!("%FF", err.tag);
    }

    #[test]
    fn test_slugified() -> Result<(), InvalidTagError> {
        assert_eq!(Tag::slugified("macOS")?, Tag::slugified("MacOS")?);
        assert_eq!("hello-world", Tag::slugified("Hello World")?.name());
        assert!(Tag::slugified("///").is_err());
        Ok(())
    }

    #[test]
    fn test_decode() {
        assert_eq!(Some("a b c".to_owned()), decode("a+b%20c"));
        assert_eq!(None, decode("%C3"));
    }
}
