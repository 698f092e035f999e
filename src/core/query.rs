//! Search and sort algorithms over record slices
//!
//! Everything here is stateless and never mutates its input. Sorts hand back
//! a new vector; pass a slice of references (`&[&T]`) to avoid cloning the
//! records themselves.
//!
//! | algorithm       | cost                      | notes                              |
//! |-----------------|---------------------------|------------------------------------|
//! | `linear_search` | O(n)                      | all matches, input order           |
//! | `exact_search`  | O(n)                      | first match                        |
//! | `binary_search` | O(log n)                  | input must be sorted by the key    |
//! | `bubble_sort`   | O(n²), O(n) when sorted   | stable                             |
//! | `quick_sort`    | O(n log n) avg, O(n²) max | Lomuto, last element pivot, unstable |

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

/// Direction of a sort
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    /// Orient an ordering produced by an ascending comparator
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    }

    pub fn from_descending(descending: bool) -> Self {
        if descending {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortOrder::Ascending => write!(f, "ascending"),
            SortOrder::Descending => write!(f, "descending"),
        }
    }
}

/// Which sorting algorithm to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortAlgorithm {
    /// Stable, quadratic
    Bubble,
    /// Unstable, n log n on average
    #[default]
    Quick,
}

impl SortAlgorithm {
    pub fn sort<T, F>(self, items: &[T], cmp: F) -> Vec<T>
    where
        T: Clone,
        F: FnMut(&T, &T) -> Ordering,
    {
        match self {
            SortAlgorithm::Bubble => bubble_sort(items, cmp),
            SortAlgorithm::Quick => quick_sort(items, cmp),
        }
    }
}

/// Return every item matching `predicate`, in input order
pub fn linear_search<'a, T, P>(items: &'a [T], mut predicate: P) -> Vec<&'a T>
where
    P: FnMut(&T) -> bool,
{
    let matches: Vec<&T> = items.iter().filter(|item| predicate(item)).collect();
    debug!(
        comparisons = items.len(),
        matches = matches.len(),
        "linear search complete"
    );
    matches
}

/// Index of the first item whose key equals `target`
pub fn position_of<T, K, F>(items: &[T], key_fn: F, target: &K) -> Option<usize>
where
    K: PartialEq + ?Sized,
    F: Fn(&T) -> &K,
{
    items.iter().position(|item| key_fn(item) == target)
}

/// First item whose key equals `target`
pub fn exact_search<'a, T, K, F>(items: &'a [T], key_fn: F, target: &K) -> Option<&'a T>
where
    K: PartialEq + ?Sized,
    F: Fn(&T) -> &K,
{
    let found = position_of(items, key_fn, target);
    debug!(
        comparisons = found.map_or(items.len(), |i| i + 1),
        found = found.is_some(),
        "exact search complete"
    );
    found.map(|i| &items[i])
}

/// Binary search over a slice sorted ascending by `key_fn`.
///
/// If `sorted` is not ordered by the same key the result is unspecified;
/// sort first.
pub fn binary_search<'a, T, K, F>(sorted: &'a [T], key_fn: F, target: &K) -> Option<&'a T>
where
    K: Ord,
    F: Fn(&T) -> K,
{
    let mut low = 0usize;
    let mut high = sorted.len();
    let mut comparisons = 0usize;

    // Half-open [low, high)
    while low < high {
        let mid = low + (high - low) / 2;
        comparisons += 1;
        match key_fn(&sorted[mid]).cmp(target) {
            Ordering::Equal => {
                debug!(comparisons, len = sorted.len(), "binary search hit");
                return Some(&sorted[mid]);
            }
            Ordering::Less => low = mid + 1,
            Ordering::Greater => high = mid,
        }
    }

    debug!(comparisons, len = sorted.len(), "binary search miss");
    None
}

/// Stable bubble sort with early exit after a pass without swaps
pub fn bubble_sort<T, F>(items: &[T], mut cmp: F) -> Vec<T>
where
    T: Clone,
    F: FnMut(&T, &T) -> Ordering,
{
    let mut sorted = items.to_vec();
    let n = sorted.len();
    let mut comparisons = 0usize;
    let mut swaps = 0usize;
    let mut passes = 0usize;

    for pass in 0..n.saturating_sub(1) {
        passes = pass + 1;
        let mut swapped = false;
        for j in 0..n - pass - 1 {
            comparisons += 1;
            // Strictly greater keeps equal elements in input order
            if cmp(&sorted[j], &sorted[j + 1]) == Ordering::Greater {
                sorted.swap(j, j + 1);
                swaps += 1;
                swapped = true;
            }
        }
        if !swapped {
            break;
        }
    }

    debug!(len = n, passes, comparisons, swaps, "bubble sort complete");
    sorted
}

/// Quick sort with the Lomuto partition scheme (pivot = last element).
///
/// Not stable. Recurses into the smaller partition and loops over the larger
/// one, so stack depth stays logarithmic even on adversarial input.
pub fn quick_sort<T, F>(items: &[T], mut cmp: F) -> Vec<T>
where
    T: Clone,
    F: FnMut(&T, &T) -> Ordering,
{
    let mut sorted = items.to_vec();
    let mut comparisons = 0usize;
    quick_sort_range(&mut sorted, &mut cmp, &mut comparisons);
    debug!(len = sorted.len(), comparisons, "quick sort complete");
    sorted
}

fn quick_sort_range<T, F>(mut items: &mut [T], cmp: &mut F, comparisons: &mut usize)
where
    F: FnMut(&T, &T) -> Ordering,
{
    while items.len() > 1 {
        let pivot = partition(items, cmp, comparisons);
        let (left, rest) = items.split_at_mut(pivot);
        let right = &mut rest[1..];
        if left.len() < right.len() {
            quick_sort_range(left, cmp, comparisons);
            items = right;
        } else {
            quick_sort_range(right, cmp, comparisons);
            items = left;
        }
    }
}

fn partition<T, F>(items: &mut [T], cmp: &mut F, comparisons: &mut usize) -> usize
where
    F: FnMut(&T, &T) -> Ordering,
{
    let high = items.len() - 1;
    let mut store = 0;
    for j in 0..high {
        *comparisons += 1;
        if cmp(&items[j], &items[high]) != Ordering::Greater {
            items.swap(store, j);
            store += 1;
        }
    }
    items.swap(store, high);
    store
}

/// Check that `items` is non-decreasing under `cmp`
pub fn is_sorted_by<T, F>(items: &[T], mut cmp: F) -> bool
where
    F: FnMut(&T, &T) -> Ordering,
{
    items
        .windows(2)
        .all(|pair| cmp(&pair[0], &pair[1]) != Ordering::Greater)
}

/// Compose two comparators: `second` breaks ties left by `first`
pub fn then_by<T, A, B>(mut first: A, mut second: B) -> impl FnMut(&T, &T) -> Ordering
where
    A: FnMut(&T, &T) -> Ordering,
    B: FnMut(&T, &T) -> Ordering,
{
    move |a, b| first(a, b).then_with(|| second(a, b))
}

/// Case-insensitive string ordering
pub fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

/// Total ordering for money and other float fields
pub fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.total_cmp(&b)
}

/// Case-insensitive substring test used by the text filters
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
