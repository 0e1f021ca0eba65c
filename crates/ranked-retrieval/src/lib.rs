//! Popularity-ranked prefix completion over a [`PrefixIndex`].
//!
//! Ranking holds no state of its own. Every call:
//!
//! 1. **Locates** the subtree root for the prefix (no match → empty result).
//! 2. **Collects** every terminal node below it with an explicit work stack,
//!    rebuilding each key in a path buffer as it goes.
//! 3. **Deduplicates** by key.
//! 4. **Orders** by popularity descending, ties broken by ascending key.
//! 5. **Returns** the payloads only. Keys never leave this crate.
//!
//! Since popularity is read straight from the nodes on each call, a
//! selection report is visible to the very next ranking.

use std::collections::BTreeMap;

use log::trace;
use prefix_index::{NodeRef, PrefixIndex};
use sealed_payload::Payload;

#[cfg(test)]
mod proptests;

/// A terminal node found under the prefix.
#[derive(Debug)]
struct Candidate<'a> {
    key: String,
    popularity: u64,
    payload: &'a Payload,
}

/// All payloads whose keys start with `prefix`, most popular first.
///
/// Equal popularity falls back to ascending key order, so repeated calls over
/// unchanged state return identical sequences.
///
/// # Example
///
/// ```
/// use prefix_index::PrefixIndex;
/// use ranked_retrieval::rank;
/// use sealed_payload::Payload;
///
/// let mut index = PrefixIndex::new();
/// index.insert("apple", Payload::new(b"sealed-apple".to_vec()));
/// index.insert("apex", Payload::new(b"sealed-apex".to_vec()));
/// index.record_selection("apple");
///
/// let ranked = rank(&index, "ap");
/// assert_eq!(ranked[0], Payload::new(b"sealed-apple".to_vec()));
/// assert!(rank(&index, "xyz").is_empty());
/// ```
pub fn rank(index: &PrefixIndex, prefix: &str) -> Vec<Payload> {
    rank_limited(index, prefix, usize::MAX)
}

/// Like [`rank`], truncated to the first `limit` payloads.
pub fn rank_limited(index: &PrefixIndex, prefix: &str, limit: usize) -> Vec<Payload> {
    let Some(start) = index.locate(prefix) else {
        trace!("no subtree for prefix of {} chars", prefix.chars().count());
        return Vec::new();
    };

    let candidates = order(collect(index, start, prefix));
    trace!(
        "ranked {} candidates for prefix of {} chars",
        candidates.len(),
        prefix.chars().count()
    );

    candidates
        .into_iter()
        .take(limit)
        .map(|c| c.payload.clone())
        .collect()
}

/// Depth-first walk of the subtree rooted at `start`.
///
/// `start` itself is reached by `prefix`. Each stack entry carries the length
/// of its node's key so the shared path buffer can be cut back when the walk
/// jumps to a sibling branch.
///
/// # Panics
/// Panics if the walk visits more nodes than the arena holds, which only a
/// corrupted index (a node with two parents) can cause.
fn collect<'a>(index: &'a PrefixIndex, start: NodeRef, prefix: &str) -> Vec<Candidate<'a>> {
    let mut path: Vec<char> = prefix.chars().collect();
    let mut stack: Vec<(NodeRef, usize)> = vec![(start, path.len())];
    let mut found = Vec::new();
    let mut visited = 0usize;

    while let Some((node_ref, depth)) = stack.pop() {
        visited += 1;
        assert!(
            visited <= index.node_count(),
            "prefix index corrupted: subtree walk visited {visited} of {} nodes",
            index.node_count()
        );

        let node = index.node(node_ref);
        if node_ref != start {
            path.truncate(depth - 1);
            path.push(node.ch);
        }

        if let Some(terminal) = node.terminal() {
            found.push(Candidate {
                key: path.iter().collect(),
                popularity: terminal.popularity(),
                payload: terminal.payload(),
            });
        }

        for &child in index.children(node_ref) {
            stack.push((child, depth + 1));
        }
    }

    found
}

/// Deduplicate by key, then sort by popularity descending and key ascending.
fn order(candidates: Vec<Candidate<'_>>) -> Vec<Candidate<'_>> {
    let mut by_key: BTreeMap<String, Candidate<'_>> = BTreeMap::new();
    for candidate in candidates {
        let replace = by_key
            .get(&candidate.key)
            .is_none_or(|kept| kept.popularity < candidate.popularity);
        if replace {
            by_key.insert(candidate.key.clone(), candidate);
        }
    }

    let mut ordered: Vec<Candidate<'_>> = by_key.into_values().collect();
    ordered.sort_by(|a, b| {
        b.popularity
            .cmp(&a.popularity)
            .then_with(|| a.key.cmp(&b.key))
    });
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sealed(key: &str) -> Payload {
        Payload::new(format!("sealed:{key}").into_bytes())
    }

    fn keys_of(payloads: &[Payload]) -> Vec<String> {
        payloads
            .iter()
            .map(|p| {
                String::from_utf8(p.as_bytes().to_vec())
                    .unwrap()
                    .trim_start_matches("sealed:")
                    .to_string()
            })
            .collect()
    }

    fn fruit_index() -> PrefixIndex {
        let mut index = PrefixIndex::new();
        for key in ["apple", "app", "application", "apex", "banana"] {
            index.insert(key, sealed(key));
        }
        index
    }

    #[test]
    fn equal_popularity_is_lexicographic() {
        let index = fruit_index();
        assert_eq!(
            keys_of(&rank(&index, "ap")),
            vec!["apex", "app", "apple", "application"]
        );
    }

    #[test]
    fn popular_key_moves_to_front() {
        let mut index = fruit_index();
        for _ in 0..3 {
            index.record_selection("app");
        }

        assert_eq!(
            keys_of(&rank(&index, "ap")),
            vec!["app", "apex", "apple", "application"]
        );
        assert!(rank(&index, "xyz").is_empty());
    }

    #[test]
    fn higher_popularity_wins_over_key_order() {
        let mut index = fruit_index();
        index.record_selection("application");
        index.record_selection("application");
        index.record_selection("apple");

        assert_eq!(
            keys_of(&rank(&index, "ap")),
            vec!["application", "apple", "apex", "app"]
        );
    }

    #[test]
    fn exact_key_prefix_includes_itself() {
        let index = fruit_index();
        assert_eq!(
            keys_of(&rank(&index, "app")),
            vec!["app", "apple", "application"]
        );
        assert_eq!(keys_of(&rank(&index, "banana")), vec!["banana"]);
    }

    #[test]
    fn empty_prefix_ranks_everything() {
        let index = fruit_index();
        assert_eq!(
            keys_of(&rank(&index, "")),
            vec!["apex", "app", "apple", "application", "banana"]
        );
    }

    #[test]
    fn unmatched_prefix_is_empty() {
        let index = fruit_index();
        assert!(rank(&index, "apz").is_empty());
        assert!(rank(&index, "bananas").is_empty());
        assert!(rank(&PrefixIndex::new(), "a").is_empty());
    }

    #[test]
    fn limit_truncates_after_ordering() {
        let mut index = fruit_index();
        index.record_selection("apple");

        assert_eq!(keys_of(&rank_limited(&index, "ap", 2)), vec!["apple", "apex"]);
        assert!(rank_limited(&index, "ap", 0).is_empty());
        assert_eq!(rank_limited(&index, "ap", 10).len(), 4);
    }

    #[test]
    fn repeated_ranking_does_not_change_popularity() {
        let mut index = fruit_index();
        index.record_selection("apex");
        for _ in 0..5 {
            rank(&index, "ap");
        }
        index.record_selection("apex");
        assert_eq!(index.popularity("apex"), Some(2));
    }

    #[test]
    fn collect_rebuilds_keys_across_branches() {
        let index = fruit_index();
        let start = index.locate("a").unwrap();
        let mut keys: Vec<String> = collect(&index, start, "a")
            .into_iter()
            .map(|c| c.key)
            .collect();
        keys.sort();
        assert_eq!(keys, vec!["apex", "app", "apple", "application"]);
    }

    #[test]
    fn order_drops_duplicate_keys() {
        let first = sealed("dup-low");
        let second = sealed("dup-high");
        let other = sealed("other");
        let candidates = vec![
            Candidate {
                key: "dup".into(),
                popularity: 1,
                payload: &first,
            },
            Candidate {
                key: "other".into(),
                popularity: 2,
                payload: &other,
            },
            Candidate {
                key: "dup".into(),
                popularity: 4,
                payload: &second,
            },
        ];

        let ordered = order(candidates);
        assert_eq!(ordered.len(), 2);
        assert_eq!(ordered[0].key, "dup");
        assert_eq!(ordered[0].payload, &second);
        assert_eq!(ordered[1].key, "other");
    }

    #[test]
    fn long_keys_do_not_recurse() {
        let mut index = PrefixIndex::new();
        let long: String = std::iter::repeat_n('x', 100_000).collect();
        index.insert(&long, sealed("long"));
        index.insert("x", sealed("short"));

        let ranked = rank(&index, "x");
        assert_eq!(ranked, vec![sealed("short"), sealed("long")]);
    }
}
