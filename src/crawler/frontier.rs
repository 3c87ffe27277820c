//! Crawl frontier
//!
//! FIFO queue of `(url, depth)` entries shared by all workers. URLs are
//! de-duplicated by their normalized form when an entry is claimed, so a URL
//! discovered twice before its first visit is still fetched only once.

use parking_lot::Mutex;
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::url::resolve;

/// A pending visit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: String,
    /// Seeds are depth 0; links found on a page sit one deeper
    pub depth: u32,
}

pub struct Frontier {
    queue: Mutex<VecDeque<FrontierEntry>>,
    visited: Mutex<HashSet<String>>,
    max_depth: u32,
    max_pages: Option<u64>,
    claimed: AtomicU64,
    closed: AtomicBool,
}

impl Frontier {
    pub fn new(max_depth: u32, max_pages: Option<u64>) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            visited: Mutex::new(HashSet::new()),
            max_depth,
            max_pages,
            claimed: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        }
    }

    /// Enqueues every seed at depth 0, normalizing it first
    pub fn seed<I, S>(&self, seeds: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        seeds
            .into_iter()
            .filter(|seed| self.push(resolve(seed.as_ref(), ""), 0))
            .count()
    }

    /// Enqueues a URL; returns false if it was dropped
    ///
    /// Entries are dropped when the frontier is closed, when `depth` exceeds
    /// the maximum, when the URL is not http(s), or when the URL has already
    /// been claimed.
    pub fn push(&self, url: String, depth: u32) -> bool {
        if self.is_closed() || depth > self.max_depth {
            return false;
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            tracing::trace!(url, "Not enqueuing non-http URL");
            return false;
        }
        if self.visited.lock().contains(&url) {
            return false;
        }

        self.queue.lock().push_back(FrontierEntry { url, depth });
        true
    }

    /// Claims the next unvisited entry
    ///
    /// Returns `None` when the queue is drained, the frontier is closed, or
    /// the page ceiling has been reached. Entries may be pushed again later,
    /// so `None` does not mean the crawl is over while pages are in flight.
    pub fn claim(&self) -> Option<FrontierEntry> {
        if self.is_closed() || self.ceiling_reached() {
            return None;
        }

        let mut queue = self.queue.lock();
        // The ceiling may have been hit while waiting on the lock
        if self.ceiling_reached() {
            return None;
        }
        while let Some(entry) = queue.pop_front() {
            if !self.visited.lock().insert(entry.url.clone()) {
                continue;
            }

            self.claimed.fetch_add(1, Ordering::AcqRel);
            return Some(entry);
        }
        None
    }

    /// Stops accepting and handing out entries
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Whether `max-pages` entries have been claimed
    pub fn ceiling_reached(&self) -> bool {
        self.max_pages
            .is_some_and(|max| self.claimed.load(Ordering::Acquire) >= max)
    }

    pub fn claimed(&self) -> u64 {
        self.claimed.load(Ordering::Acquire)
    }

    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let frontier = Frontier::new(5, None);
        frontier.push("http://a.com/1".to_string(), 0);
        frontier.push("http://a.com/2".to_string(), 1);

        assert_eq!(frontier.claim().unwrap().url, "http://a.com/1");
        assert_eq!(frontier.claim().unwrap().url, "http://a.com/2");
        assert!(frontier.claim().is_none());
    }

    #[test]
    fn test_duplicates_claimed_once() {
        let frontier = Frontier::new(5, None);
        frontier.push("http://a.com/".to_string(), 0);
        frontier.push("http://a.com/".to_string(), 1);

        let entry = frontier.claim().unwrap();
        assert_eq!(entry.depth, 0);
        assert!(frontier.claim().is_none());
        assert!(!frontier.push("http://a.com/".to_string(), 2));
    }

    #[test]
    fn test_depth_limit() {
        let frontier = Frontier::new(1, None);
        assert!(frontier.push("http://a.com/".to_string(), 1));
        assert!(!frontier.push("http://a.com/deep".to_string(), 2));
        assert_eq!(frontier.pending(), 1);
    }

    #[test]
    fn test_non_http_dropped() {
        let frontier = Frontier::new(1, None);
        assert!(!frontier.push("mailto:bot@example.com".to_string(), 0));
        assert!(!frontier.push("ftp://example.com/file".to_string(), 0));
    }

    #[test]
    fn test_seed_normalizes() {
        let frontier = Frontier::new(0, None);
        let seeded = frontier.seed(["http://a.com/x#top", " http://b.com/ "]);

        assert_eq!(seeded, 2);
        assert_eq!(frontier.claim().unwrap().url, "http://a.com/x");
        assert_eq!(
            frontier.claim().unwrap(),
            FrontierEntry {
                url: "http://b.com/".to_string(),
                depth: 0
            }
        );
    }

    #[test]
    fn test_page_ceiling() {
        let frontier = Frontier::new(5, Some(2));
        for n in 0..4 {
            frontier.push(format!("http://a.com/{}", n), 0);
        }

        assert!(frontier.claim().is_some());
        assert!(frontier.claim().is_some());
        assert!(frontier.ceiling_reached());
        assert!(frontier.claim().is_none());
        assert_eq!(frontier.claimed(), 2);
    }

    #[test]
    fn test_closed_frontier() {
        let frontier = Frontier::new(5, None);
        frontier.push("http://a.com/".to_string(), 0);
        frontier.close();

        assert!(frontier.claim().is_none());
        assert!(!frontier.push("http://b.com/".to_string(), 0));
    }
}
