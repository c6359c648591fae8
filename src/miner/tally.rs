//! Ranking over group-by tables that remember first-seen order.

use std::cmp::Ordering;
use std::hash::Hash;

use indexmap::IndexMap;

/// Per-key metrics, iterated in the order keys were first seen.
pub(crate) type Tally<'a, K, M> = IndexMap<&'a K, M>;

/// Sort `tally` best-first and keep the top `k` keys.
///
/// `by_metric` orders two metrics ascending; the result is descending by it.
/// Equal metrics fall back to `name` ascending, then to first-seen order
/// (the sort is stable).
pub(crate) fn top_k<'a, K, M, F, N>(
    mut tally: Tally<'a, K, M>,
    k: usize,
    by_metric: F,
    name: N,
) -> Vec<&'a K>
where
    K: Eq + Hash + ?Sized,
    F: Fn(&M, &M) -> Ordering,
    N: Fn(&K) -> &str,
{
    tally.sort_by(|ka, ma, kb, mb| by_metric(mb, ma).then_with(|| name(*ka).cmp(name(*kb))));
    tally.into_keys().take(k).collect()
}
