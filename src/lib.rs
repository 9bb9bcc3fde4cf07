//! Generates tag listing pages for a static blog. For every tag used by the
//! site's posts, a [`tag_page::TagPage`] lists the posts under that tag and
//! is written to `{destination}/tag/{tag}/index.html`.
//!
//! A page goes through three steps, in order:
//!
//! 1. Construction from a [`site::Site`] handle, a tag, and the tagged
//!    [`post::Post`]s. The tag is validated here so it can't escape the tag
//!    directory ([`tag`]).
//! 2. Rendering ([`page::Renderable`]): the page's view model and pager are
//!    merged over the site-wide payload ([`util::deep_merge`]), the page
//!    template is evaluated ([`render`]), and the result is wrapped in the
//!    `tag` layout and each parent layout it declares ([`layout`]).
//! 3. Writing ([`page::Writable`]) the output to its destination path.
//!
//! [`write::Writer`] drives these steps for every tag in a set of posts, and
//! [`write::generate`] does the same using the directories from a
//! [`config::Config`].

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod config;
pub mod layout;
pub mod page;
pub mod pager;
pub mod post;
pub mod render;
pub mod site;
pub mod tag;
pub mod tag_page;
pub mod util;
pub mod write;
