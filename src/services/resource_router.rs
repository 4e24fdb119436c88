//! Resource Router for Marksync.
//!
//! Classifies `content://org.marksync.provider/...` addresses into a
//! [`ResourceKind`] against an immutable pattern table. Pure, no I/O.

use url::Url;

use crate::types::errors::AddressError;
use crate::types::resource::ResourceKind;

/// URI scheme of every store address.
pub const SCHEME: &str = "content";

/// Authority that every store address must carry.
pub const AUTHORITY: &str = "org.marksync.provider";

/// Query parameter carrying the label filter on the bookmarks collection.
pub const LABEL_ID_PARAM: &str = "label_id";

/// Query parameter carrying full-text search input.
pub const SEARCH_PARAM: &str = "q";

#[derive(Debug, Clone, Copy)]
enum Segment {
    Lit(&'static str),
    Id,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Bookmarks,
    BookmarkSearch,
    BookmarkItem,
    Labels,
    LabelItem,
    QuickFolder,
}

use Segment::{Id, Lit};

/// Registered path patterns. A literal wins over `Id` only because
/// `Id` never matches a non-numeric segment, so order does not matter.
const ROUTES: &[(&[Segment], Route)] = &[
    (&[Lit("bookmarks")], Route::Bookmarks),
    (&[Lit("bookmarks"), Lit("search")], Route::BookmarkSearch),
    (&[Lit("bookmarks"), Id], Route::BookmarkItem),
    (&[Lit("labels")], Route::Labels),
    (&[Lit("labels"), Id], Route::LabelItem),
    (&[Lit("live_folders"), Lit("bookmarks")], Route::QuickFolder),
];

fn parse_id(segment: &str) -> Option<i64> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

/// Matches path segments against the table, returning the route and the id
/// captured by an `Id` segment, if any.
fn match_route(segments: &[&str]) -> Option<(Route, Option<i64>)> {
    'routes: for (pattern, route) in ROUTES {
        if pattern.len() != segments.len() {
            continue;
        }
        let mut captured = None;
        for (seg, actual) in pattern.iter().zip(segments) {
            match seg {
                Lit(lit) if lit == actual => {}
                Id => match parse_id(actual) {
                    Some(id) => captured = Some(id),
                    None => continue 'routes,
                },
                _ => continue 'routes,
            }
        }
        return Some((*route, captured));
    }
    None
}

/// Resolves an address to its resource kind.
///
/// # Errors
/// `AddressError::InvalidAddress` (carrying the original address) when the
/// scheme, authority or path shape is not registered, or when an id or
/// `label_id` is not a number.
pub fn resolve(address: &str) -> Result<ResourceKind, AddressError> {
    let invalid = || AddressError::InvalidAddress(address.to_string());

    let url = Url::parse(address).map_err(|_| invalid())?;
    if url.scheme() != SCHEME || url.host_str() != Some(AUTHORITY) {
        return Err(invalid());
    }

    let segments: Vec<&str> = url.path_segments().ok_or_else(invalid)?.collect();
    let (route, id) = match_route(&segments).ok_or_else(invalid)?;
    let param = |name: &str| {
        url.query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    };

    let kind = match route {
        Route::Bookmarks => match param(LABEL_ID_PARAM) {
            Some(raw) => ResourceKind::FilteredCollection {
                label_id: parse_id(raw.trim()).ok_or_else(invalid)?,
            },
            None => ResourceKind::Collection,
        },
        Route::BookmarkSearch => ResourceKind::Search {
            query: param(SEARCH_PARAM),
        },
        Route::BookmarkItem => ResourceKind::Item(id.ok_or_else(invalid)?),
        Route::Labels => ResourceKind::LabelCollection,
        Route::LabelItem => ResourceKind::LabelItem(id.ok_or_else(invalid)?),
        Route::QuickFolder => ResourceKind::QuickFolder,
    };
    Ok(kind)
}

/// Builds the canonical address for a resource kind.
pub fn address(kind: &ResourceKind) -> String {
    let base = format!("{}://{}", SCHEME, AUTHORITY);
    match kind {
        ResourceKind::Collection => format!("{}/bookmarks", base),
        ResourceKind::Item(id) => format!("{}/bookmarks/{}", base, id),
        ResourceKind::Search { query: None } => format!("{}/bookmarks/search", base),
        ResourceKind::Search { query: Some(q) } => {
            let query: String = url::form_urlencoded::Serializer::new(String::new())
                .append_pair(SEARCH_PARAM, q)
                .finish();
            format!("{}/bookmarks/search?{}", base, query)
        }
        ResourceKind::FilteredCollection { label_id } => {
            format!("{}/bookmarks?{}={}", base, LABEL_ID_PARAM, label_id)
        }
        ResourceKind::LabelCollection => format!("{}/labels", base),
        ResourceKind::LabelItem(id) => format!("{}/labels/{}", base, id),
        ResourceKind::QuickFolder => format!("{}/live_folders/bookmarks", base),
    }
}

/// Shorthand for the bookmarks collection address.
pub fn bookmarks_address() -> String {
    address(&ResourceKind::Collection)
}

/// Shorthand for a single bookmark address.
pub fn bookmark_address(id: i64) -> String {
    address(&ResourceKind::Item(id))
}

/// Shorthand for the labels collection address.
pub fn labels_address() -> String {
    address(&ResourceKind::LabelCollection)
}
