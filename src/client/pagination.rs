//! Pagination loop for listing queries
//!
//! SuperOps listing queries are page-numbered and report `hasMore`. The loop
//! here walks every page and enforces a hard safety cap so a misbehaving
//! source can never spin the engine forever.

use std::future::Future;

use log::warn;

use crate::client::models::Page;
use crate::error::Result;

/// Hard cap on pages fetched for a single listing
pub const MAX_PAGES: usize = 50;

/// Fetch every page of a listing, starting at page 1.
///
/// Stops when the source reports no more pages or when [`MAX_PAGES`] is
/// reached (logged, not an error). Items are returned in page order.
pub async fn fetch_all_pages<T, F, Fut>(fetch: F) -> Result<Vec<T>>
where
    F: Fn(usize) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let mut items = Vec::new();
    let mut page = 1;

    loop {
        let response = fetch(page).await?;
        items.extend(response.items);

        if !response.has_more {
            break;
        }

        page += 1;
        if page > MAX_PAGES {
            warn!("Hit pagination safety limit ({} pages)", MAX_PAGES);
            break;
        }
    }

    Ok(items)
}
