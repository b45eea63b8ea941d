//! Page dependency collector for L1 cache invalidation.
//!
//! Handlers record the logical pages their response feeds; the response
//! cache middleware collects them at request end and registers the cached
//! response under those pages.

use std::cell::RefCell;
use std::collections::HashSet;
use std::future::Future;

use super::keys::PagePath;

tokio::task_local! {
    static DEPS: RefCell<HashSet<PagePath>>;
}

/// Record a page dependency. A no-op outside a collector scope.
pub fn record(page: impl AsRef<str>) {
    let _ = DEPS.try_with(|deps| {
        deps.borrow_mut().insert(PagePath::new(page));
    });
}

/// Run `f` with a fresh collector and return its output with the recorded pages.
pub async fn with_collector<F, R>(f: F) -> (R, HashSet<PagePath>)
where
    F: Future<Output = R>,
{
    DEPS.scope(RefCell::new(HashSet::new()), async move {
        let result = f.await;
        let collected = DEPS.with(|deps| deps.take());
        (result, collected)
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn record_without_collector_is_no_op() {
        record("/");
    }

    #[tokio::test]
    async fn with_collector_captures_and_deduplicates() {
        let ((), deps) = with_collector(async {
            record("/");
            record("/products");
            record("/products/");
            tokio::task::yield_now().await;
            record("/");
        })
        .await;

        assert_eq!(deps.len(), 2);
        assert!(deps.contains(&PagePath::new("/products")));
    }

    #[tokio::test]
    async fn collectors_do_not_leak_between_scopes() {
        let (_, first) = with_collector(async { record("/about-us") }).await;
        let (_, second) = with_collector(async {}).await;

        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
    }
}
