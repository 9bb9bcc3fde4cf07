//! Defines [`Pager`], the pagination descriptor forwarded into templates as
//! `paginator`.

use serde::Serialize;

/// Pagination state for a listing page. Page numbers are 1-based.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Pager {
    pub page: usize,
    pub per_page: usize,
    pub total_posts: usize,
    pub total_pages: usize,
    pub previous_page: Option<usize>,
    pub next_page: Option<usize>,
}

impl Pager {
    /// Describes page `page` of a listing of `total_posts` posts split into
    /// pages of `per_page` posts. A `per_page` of zero is treated as one.
    pub fn new(page: usize, per_page: usize, total_posts: usize) -> Pager {
        let per_page = per_page.max(1);
        let total_pages = match total_posts % per_page {
            0 => total_posts / per_page,
            _ => total_posts / per_page + 1,
        }
        .max(1);
        Pager {
            page,
            per_page,
            total_posts,
            total_pages,
            previous_page: match page > 1 {
                true => Some(page - 1),
                false => None,
            },
            next_page: match page < total_pages {
                true => Some(page + 1),
                false => None,
            },
        }
    }

    /// Describes a listing where all `total_posts` posts fit on one page.
    pub fn single(total_posts: usize) -> Pager {
        Pager::new(1, total_posts, total_posts)
    }
}
