//! Paginated query execution.
//!
//! The first page is fetched up front to learn `TotalResultCount`; the
//! remaining pages fan out concurrently (bounded, to avoid overwhelming the
//! service) and are reassembled by ascending start index so the final
//! ordering matches the server-side sort regardless of network timing.

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::debug;

use crate::client::RallyClient;
use crate::error::Result;
use crate::request::Request;
use crate::results::QueryResult;

/// In-flight bound for sub-page fetches of one logical query.
pub(crate) const MAX_CONCURRENT_PAGE_REQUESTS: usize = 6;

pub(crate) async fn run(client: &RallyClient, request: &Request) -> Result<QueryResult> {
    let first = client.fetch_page(request).await?;

    let page_size = request.effective_page_size();
    let plan = page_plan(
        request.start,
        page_size,
        request.limit,
        first.total_result_count,
    );
    if plan.is_empty() {
        return Ok(first);
    }

    debug!(
        sub_pages = plan.len(),
        total = first.total_result_count,
        page_size,
        "fanning out paginated query"
    );

    // Any sub-page failure short-circuits the collect and aborts the whole
    // query; there is no partial-result degradation.
    let mut pages: Vec<(u32, QueryResult)> = stream::iter(plan.into_iter().map(|(start, size)| {
        let sub_request = request.clone_for_page(start, size);
        async move {
            client
                .fetch_page(&sub_request)
                .await
                .map(|page| (start, page))
        }
    }))
    .buffer_unordered(MAX_CONCURRENT_PAGE_REQUESTS)
    .try_collect()
    .await?;

    // Reassemble in request order, not completion order.
    pages.sort_by_key(|(start, _)| *start);

    let mut assembled = first;
    for (_, page) in pages {
        assembled.results.extend(page.results);
        assembled.operation.errors.extend(page.operation.errors);
        assembled.operation.warnings.extend(page.operation.warnings);
    }
    Ok(assembled)
}

/// Compute the (start, size) of every sub-page after the first.
///
/// `already` tracks how many rows the pages issued so far cover, counted
/// from index 1; the final page is capped to whatever remains under the
/// smaller of the caller's limit and the server's total.
fn page_plan(start: u32, page_size: u32, limit: u32, total: i64) -> Vec<(u32, u32)> {
    let max_results_allowed = (limit as i64).min(total);
    let mut already = (start as i64 - 1) + page_size as i64;
    let mut next_start = start;
    let mut plan = Vec::new();

    while max_results_allowed - already > 0 {
        let remaining = (max_results_allowed - already) as u32;
        next_start += page_size;
        let size = remaining.min(page_size);
        plan.push((next_start, size));
        already += size as i64;
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_page_when_total_fits() {
        assert!(page_plan(1, 200, 200, 150).is_empty());
        assert!(page_plan(1, 200, 1000, 0).is_empty());
    }

    #[test]
    fn test_full_and_partial_sub_pages() {
        // 450 rows, pages of 200: first page covers 1..=200, then two
        // sub-pages with the last one partial.
        assert_eq!(page_plan(1, 200, 1000, 450), vec![(201, 200), (401, 50)]);
    }

    #[test]
    fn test_limit_caps_the_plan() {
        assert_eq!(page_plan(1, 100, 300, 1000), vec![(101, 100), (201, 100)]);
    }

    #[test]
    fn test_offset_start() {
        assert_eq!(
            page_plan(101, 100, 1000, 350),
            vec![(201, 100), (301, 50)]
        );
    }

    #[test]
    fn test_page_count_law() {
        // Total fetches (first page + plan) = ceil((min(limit, total) - (start-1)) / page_size)
        for (start, page_size, limit, total) in [
            (1u32, 200u32, 1000u32, 450i64),
            (1, 50, 120, 500),
            (11, 25, 100, 77),
            (1, 200, 200, 1000),
        ] {
            let expected = {
                let max_allowed = (limit as i64).min(total);
                let span = max_allowed - (start as i64 - 1);
                // ceil(span / page_size); span and page_size are positive in
                // every case below, so this matches i64::div_ceil exactly.
                (span + page_size as i64 - 1) / page_size as i64
            };
            let actual = 1 + page_plan(start, page_size, limit, total).len() as i64;
            assert_eq!(actual, expected.max(1), "case ({start},{page_size},{limit},{total})");
        }
    }
}
