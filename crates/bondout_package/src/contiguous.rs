//! Contiguous pin allocation.
//!
//! Allocation prefers pins that sit next to each other in a package's
//! canonical ordering. The available pins are split into maximal runs of
//! ordering-adjacent pins and the runs are grouped by length, in the order
//! each length is first seen. Iteration starts at the group holding the
//! longest run and then wraps through the remaining groups in their original
//! order, consuming whole runs until the last one needed, from which only a
//! prefix is taken.

use crate::error::PackageError;
use std::collections::{BTreeSet, HashMap};
use std::hash::Hash;

/// Allocates `width` pins from `available`, as contiguously as possible with
/// respect to `ordering`.
///
/// Pins in `available` that do not appear in `ordering` are never returned.
/// Fails with [`PackageError::UnableToAllocate`] when fewer than `width`
/// usable pins remain; no partial allocation is returned.
pub fn allocate_contiguous<P>(
    ordering: &[P],
    available: &BTreeSet<P>,
    width: usize,
) -> Result<Vec<P>, PackageError>
where
    P: Clone + Ord + Hash,
{
    let position: HashMap<&P, usize> = ordering.iter().enumerate().map(|(i, p)| (p, i)).collect();
    let mut indices: Vec<usize> = available
        .iter()
        .filter_map(|p| position.get(p).copied())
        .collect();
    indices.sort_unstable();

    if indices.len() < width {
        return Err(PackageError::UnableToAllocate {
            requested: width,
            available: indices.len(),
        });
    }

    let mut groups = group_runs_by_length(&indices);
    if let Some(longest) = groups
        .iter()
        .enumerate()
        .max_by_key(|(i, (len, _))| (*len, std::cmp::Reverse(*i)))
        .map(|(i, _)| i)
    {
        groups.rotate_left(longest);
    }

    let mut picked: Vec<usize> = Vec::with_capacity(width);
    'outer: for (_, runs) in &groups {
        for run in runs {
            let need = width - picked.len();
            if need == 0 {
                break 'outer;
            }
            let take = need.min(run.len());
            picked.extend_from_slice(&run[..take]);
        }
    }

    Ok(picked.into_iter().map(|i| ordering[i].clone()).collect())
}

/// Splits sorted ordering indices into maximal runs of consecutive indices and
/// groups the runs by length, keeping lengths in first-seen order.
fn group_runs_by_length(indices: &[usize]) -> Vec<(usize, Vec<&[usize]>)> {
    let mut groups: Vec<(usize, Vec<&[usize]>)> = Vec::new();
    let mut start = 0;
    for end in 1..=indices.len() {
        let breaks = end == indices.len() || indices[end] != indices[end - 1] + 1;
        if !breaks {
            continue;
        }
        let run = &indices[start..end];
        match groups.iter_mut().find(|(len, _)| *len == run.len()) {
            Some((_, runs)) => runs.push(run),
            None => groups.push((run.len(), vec![run])),
        }
        start = end;
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(pins: &[u32]) -> BTreeSet<u32> {
        pins.iter().copied().collect()
    }

    fn ordering(n: u32) -> Vec<u32> {
        (1..=n).collect()
    }

    #[test]
    fn longest_run_then_next() {
        let got = allocate_contiguous(&ordering(10), &set(&[2, 3, 4, 7, 8, 10]), 5).unwrap();
        assert_eq!(got, vec![2, 3, 4, 7, 8]);
    }

    #[test]
    fn fits_in_longest_run() {
        let got = allocate_contiguous(&ordering(10), &set(&[1, 4, 5, 6, 7, 9]), 3).unwrap();
        assert_eq!(got, vec![4, 5, 6]);
    }

    #[test]
    fn exhaustion_is_an_error() {
        let err = allocate_contiguous(&ordering(10), &set(&[1, 2, 3]), 4).unwrap_err();
        assert_eq!(
            err,
            PackageError::UnableToAllocate {
                requested: 4,
                available: 3
            }
        );
    }

    #[test]
    fn rotation_wraps_to_earlier_groups() {
        // Lengths discovered in order 1, 3, 2; iteration runs 3, 2, then 1.
        let avail = set(&[1, 3, 4, 5, 8, 9]);
        let got = allocate_contiguous(&ordering(20), &avail, 5).unwrap();
        assert_eq!(got, vec![3, 4, 5, 8, 9]);
        let got = allocate_contiguous(&ordering(20), &avail, 6).unwrap();
        assert_eq!(got, vec![3, 4, 5, 8, 9, 1]);
    }

    #[test]
    fn runs_of_equal_length_stay_in_discovery_order() {
        let got = allocate_contiguous(&ordering(10), &set(&[1, 2, 5, 6, 9]), 3).unwrap();
        assert_eq!(got, vec![1, 2, 5]);
    }

    #[test]
    fn adjacency_follows_ordering_not_value() {
        // 4 and 9 are neighbours in this ordering.
        let ordering = vec![1, 4, 9, 12];
        let got = allocate_contiguous(&ordering, &set(&[1, 4, 9]), 3).unwrap();
        assert_eq!(got, vec![1, 4, 9]);
        let got = allocate_contiguous(&ordering, &set(&[4, 9, 12]), 2).unwrap();
        assert_eq!(got, vec![4, 9]);
    }

    #[test]
    fn pins_outside_ordering_are_ignored() {
        let err = allocate_contiguous(&ordering(4), &set(&[3, 4, 50]), 3).unwrap_err();
        assert!(matches!(
            err,
            PackageError::UnableToAllocate { available: 2, .. }
        ));
    }

    #[test]
    fn zero_width_allocates_nothing() {
        let got = allocate_contiguous(&ordering(4), &set(&[]), 0).unwrap();
        assert!(got.is_empty());
    }

    #[test]
    fn group_runs() {
        let groups = group_runs_by_length(&[0, 1, 2, 5, 6, 9]);
        let lens: Vec<usize> = groups.iter().map(|(l, _)| *l).collect();
        assert_eq!(lens, vec![3, 2, 1]);
        assert_eq!(groups[0].1, vec![&[0usize, 1, 2][..]]);
    }
}
