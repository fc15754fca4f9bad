//! Subset restrictions
//!
//! A `Restriction` describes which positions of a parent node set belong to
//! a child subset, plus the local⇄parent position conversions. Four
//! representations cover the density spectrum:
//!
//! - **Full**: every position `0..len`.
//! - **Range**: one contiguous run, half-open.
//! - **Sparse**: an arbitrary ascending position list, membership by binary
//!   search.
//! - **SparseRuns**: run-length encoding — disjoint ascending runs plus a
//!   prefix-sum offsets table; both conversion directions resolve with a
//!   binary search over run starts / cumulative sizes.
//!
//! The representation is picked once at construction (see
//! [`Restriction::from_mask`]) and immutable afterwards. For every variant
//! and every selected parent position `p` with local position `j`:
//! `to_parent(to_local(p)) == p` and `to_local(to_parent(j)) == j`, and
//! `len()` equals the number of selected positions.

use crate::error::{Error, Result};
use std::ops::Range;

/// Which representation a restriction uses (see module docs)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RestrictionKind {
    Full,
    Range,
    Sparse,
    SparseRuns,
}

/// Selection of parent positions forming a child subset
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Restriction {
    repr: Repr,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Repr {
    Full {
        len: usize,
    },
    Range {
        start: usize,
        end: usize,
    },
    Sparse {
        /// Strictly ascending selected parent positions
        positions: Box<[usize]>,
    },
    SparseRuns {
        /// Disjoint, ascending, non-empty, non-adjacent runs
        runs: Box<[Range<usize>]>,
        /// `offsets[i]` = selected count before run `i`; one extra slot
        /// holding the total
        offsets: Box<[usize]>,
    },
}

impl Restriction {
    /// Select every position of a parent of size `len`
    pub fn full(len: usize) -> Self {
        Restriction {
            repr: Repr::Full { len },
        }
    }

    /// Select the contiguous half-open run `start..end`
    pub fn range(start: usize, end: usize) -> Result<Self> {
        if start > end {
            return Err(Error::shape(format!(
                "restriction range {start}..{end} is inverted"
            )));
        }
        Ok(Restriction {
            repr: Repr::Range { start, end },
        })
    }

    /// Build from a boolean mask over the parent positions
    ///
    /// One scan collects both the selected positions and the maximal runs;
    /// the representation is then chosen deterministically: exactly one run
    /// gives `Range`; otherwise `Sparse` while the position list is no
    /// bigger than three entries per run, `SparseRuns` beyond that.
    pub fn from_mask(mask: &[bool]) -> Self {
        let mut positions = Vec::new();
        let mut runs: Vec<Range<usize>> = Vec::new();
        for (p, &selected) in mask.iter().enumerate() {
            if !selected {
                continue;
            }
            positions.push(p);
            match runs.last_mut() {
                Some(run) if run.end == p => run.end = p + 1,
                _ => runs.push(p..p + 1),
            }
        }
        Restriction {
            repr: select_repr(positions, runs),
        }
    }

    /// Build from a strictly ascending position list
    ///
    /// Applies the same representation heuristic as
    /// [`from_mask`](Restriction::from_mask).
    pub fn from_positions(positions: &[usize]) -> Result<Self> {
        let mut runs: Vec<Range<usize>> = Vec::new();
        for (i, &p) in positions.iter().enumerate() {
            if i > 0 && positions[i - 1] >= p {
                return Err(Error::shape(format!(
                    "restriction positions not strictly ascending at {p}"
                )));
            }
            match runs.last_mut() {
                Some(run) if run.end == p => run.end = p + 1,
                _ => runs.push(p..p + 1),
            }
        }
        Ok(Restriction {
            repr: select_repr(positions.to_vec(), runs),
        })
    }

    /// Representation tag (pinned by tests; the choice is observable)
    pub fn kind(&self) -> RestrictionKind {
        match &self.repr {
            Repr::Full { .. } => RestrictionKind::Full,
            Repr::Range { .. } => RestrictionKind::Range,
            Repr::Sparse { .. } => RestrictionKind::Sparse,
            Repr::SparseRuns { .. } => RestrictionKind::SparseRuns,
        }
    }

    /// Number of selected positions
    pub fn len(&self) -> usize {
        match &self.repr {
            Repr::Full { len } => *len,
            Repr::Range { start, end } => end - start,
            Repr::Sparse { positions } => positions.len(),
            Repr::SparseRuns { offsets, .. } => offsets[offsets.len() - 1],
        }
    }

    /// Whether no position is selected
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a parent position is selected
    pub fn contains(&self, parent_pos: usize) -> bool {
        self.to_local(parent_pos).is_some()
    }

    /// Local position of a selected parent position
    ///
    /// `None` when the parent position is not a member.
    pub fn to_local(&self, parent_pos: usize) -> Option<usize> {
        match &self.repr {
            Repr::Full { len } => (parent_pos < *len).then_some(parent_pos),
            Repr::Range { start, end } => (*start..*end)
                .contains(&parent_pos)
                .then(|| parent_pos - start),
            Repr::Sparse { positions } => positions.binary_search(&parent_pos).ok(),
            Repr::SparseRuns { runs, offsets } => {
                let i = runs.partition_point(|r| r.start <= parent_pos);
                if i == 0 {
                    return None;
                }
                let run = &runs[i - 1];
                (parent_pos < run.end).then(|| offsets[i - 1] + (parent_pos - run.start))
            }
        }
    }

    /// Parent position of a local position
    ///
    /// `None` when `local >= len()`.
    pub fn to_parent(&self, local: usize) -> Option<usize> {
        match &self.repr {
            Repr::Full { len } => (local < *len).then_some(local),
            Repr::Range { start, end } => (local < end - start).then(|| start + local),
            Repr::Sparse { positions } => positions.get(local).copied(),
            Repr::SparseRuns { runs, offsets } => {
                if local >= self.len() {
                    return None;
                }
                let i = offsets.partition_point(|&o| o <= local) - 1;
                Some(runs[i].start + (local - offsets[i]))
            }
        }
    }

    /// Iterate the selected parent positions, ascending
    pub fn iter(&self) -> PositionIter<'_> {
        let repr = match &self.repr {
            Repr::Full { len } => IterRepr::Span(0..*len),
            Repr::Range { start, end } => IterRepr::Span(*start..*end),
            Repr::Sparse { positions } => IterRepr::Sparse(positions.iter()),
            Repr::SparseRuns { runs, .. } => IterRepr::Runs {
                runs: runs.iter(),
                current: 0..0,
            },
        };
        PositionIter { repr }
    }

    /// Compose with the parent's own restriction
    ///
    /// `self` selects positions of the parent's local space; `parent`
    /// selects positions of the grandparent's. The result selects, in the
    /// grandparent's space, exactly the positions `self` reaches through
    /// `parent`. Fails when `self` selects past the end of `parent`.
    pub fn compose(&self, parent: &Restriction) -> Result<Restriction> {
        let mut positions = Vec::with_capacity(self.len());
        for p in self.iter() {
            match parent.to_parent(p) {
                Some(g) => positions.push(g),
                None => {
                    return Err(Error::size(
                        "composed restriction selection",
                        parent.len(),
                        p + 1,
                    ))
                }
            }
        }
        Restriction::from_positions(&positions)
    }

    /// One past the highest selected position; 0 when nothing is selected
    pub fn upper_bound(&self) -> usize {
        match &self.repr {
            Repr::Full { len } => *len,
            Repr::Range { start, end } => {
                if start == end {
                    0
                } else {
                    *end
                }
            }
            Repr::Sparse { positions } => positions.last().map_or(0, |&p| p + 1),
            Repr::SparseRuns { runs, .. } => runs.last().map_or(0, |r| r.end),
        }
    }

    /// Whether every selected position lies below `parent_len`
    pub fn fits_within(&self, parent_len: usize) -> bool {
        self.upper_bound() <= parent_len
    }
}

/// Pick the representation for a selection (see [`Restriction::from_mask`])
fn select_repr(positions: Vec<usize>, runs: Vec<Range<usize>>) -> Repr {
    if runs.len() == 1 {
        let run = runs[0].clone();
        return Repr::Range {
            start: run.start,
            end: run.end,
        };
    }
    if positions.len() <= 3 * runs.len() {
        return Repr::Sparse {
            positions: positions.into_boxed_slice(),
        };
    }
    let mut offsets = Vec::with_capacity(runs.len() + 1);
    let mut total = 0;
    for run in &runs {
        offsets.push(total);
        total += run.len();
    }
    offsets.push(total);
    Repr::SparseRuns {
        runs: runs.into_boxed_slice(),
        offsets: offsets.into_boxed_slice(),
    }
}

/// Iterator over selected parent positions
pub struct PositionIter<'a> {
    repr: IterRepr<'a>,
}

enum IterRepr<'a> {
    Span(Range<usize>),
    Sparse(std::slice::Iter<'a, usize>),
    Runs {
        runs: std::slice::Iter<'a, Range<usize>>,
        current: Range<usize>,
    },
}

impl Iterator for PositionIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        match &mut self.repr {
            IterRepr::Span(range) => range.next(),
            IterRepr::Sparse(iter) => iter.next().copied(),
            IterRepr::Runs { runs, current } => loop {
                if let Some(p) = current.next() {
                    return Some(p);
                }
                *current = runs.next()?.clone();
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Mask with three runs and eleven selected positions, which the
    /// heuristic must store as runs (11 > 3 × 3)
    fn runs_mask() -> Vec<bool> {
        let mut mask = vec![false; 20];
        for p in (1..5).chain(8..12).chain(15..18) {
            mask[p] = true;
        }
        mask
    }

    fn roundtrip(r: &Restriction, parent_len: usize, mask: &[bool]) {
        assert_eq!(r.len(), mask.iter().filter(|&&b| b).count());
        for p in 0..parent_len {
            assert_eq!(r.contains(p), mask[p], "contains({p})");
            match r.to_local(p) {
                Some(j) => assert_eq!(r.to_parent(j), Some(p)),
                None => assert!(!mask[p]),
            }
        }
        for j in 0..r.len() {
            let p = r.to_parent(j).unwrap();
            assert_eq!(r.to_local(p), Some(j));
        }
        assert_eq!(r.to_parent(r.len()), None);
        assert_eq!(r.iter().count(), r.len());
        let positions: Vec<usize> = r.iter().collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_full_roundtrip() {
        let r = Restriction::full(6);
        assert_eq!(r.kind(), RestrictionKind::Full);
        roundtrip(&r, 6, &[true; 6]);
    }

    #[test]
    fn test_range_roundtrip() {
        let r = Restriction::range(2, 5).unwrap();
        assert_eq!(r.kind(), RestrictionKind::Range);
        roundtrip(&r, 7, &[false, false, true, true, true, false, false]);
    }

    #[test]
    fn test_sparse_roundtrip() {
        let mask = [true, false, true, false, false, true, false];
        let r = Restriction::from_mask(&mask);
        assert_eq!(r.kind(), RestrictionKind::Sparse);
        roundtrip(&r, mask.len(), &mask);
    }

    #[test]
    fn test_sparse_runs_roundtrip() {
        let mask = runs_mask();
        let r = Restriction::from_mask(&mask);
        assert_eq!(r.kind(), RestrictionKind::SparseRuns);
        roundtrip(&r, mask.len(), &mask);
    }

    #[test]
    fn test_from_mask_pins_representation_choice() {
        // one run → Range, even when it covers everything
        assert_eq!(
            Restriction::from_mask(&[true, true, true]).kind(),
            RestrictionKind::Range
        );
        // two runs, six selected: 6 ≤ 3 × 2 keeps the sparse list
        let two_runs = [true, true, true, false, true, true, true];
        assert_eq!(
            Restriction::from_mask(&two_runs).kind(),
            RestrictionKind::Sparse
        );
        // two runs, seven selected: 7 > 3 × 2 tips into runs
        let mut wide = vec![true, true, true, true, false];
        wide.extend([true, true, true]);
        assert_eq!(
            Restriction::from_mask(&wide).kind(),
            RestrictionKind::SparseRuns
        );
    }

    #[test]
    fn test_from_mask_empty_selection() {
        let r = Restriction::from_mask(&[false, false]);
        assert_eq!(r.kind(), RestrictionKind::Sparse);
        assert!(r.is_empty());
        assert_eq!(r.iter().count(), 0);
        assert_eq!(r.to_parent(0), None);
    }

    #[test]
    fn test_from_positions_matches_from_mask() {
        let mask = runs_mask();
        let positions: Vec<usize> = (0..mask.len()).filter(|&p| mask[p]).collect();
        assert_eq!(
            Restriction::from_positions(&positions).unwrap(),
            Restriction::from_mask(&mask)
        );
    }

    #[test]
    fn test_from_positions_rejects_unsorted() {
        assert!(Restriction::from_positions(&[3, 1]).is_err());
        assert!(Restriction::from_positions(&[1, 1]).is_err());
    }

    #[test]
    fn test_compose() {
        // grandparent of 10; parent selects odd positions; child selects
        // parent-local {0, 2, 4} → grandparent {1, 5, 9}
        let parent = Restriction::from_mask(&[
            false, true, false, true, false, true, false, true, false, true,
        ]);
        let child = Restriction::from_positions(&[0, 2, 4]).unwrap();
        let composed = child.compose(&parent).unwrap();
        assert_eq!(composed.iter().collect::<Vec<_>>(), vec![1, 5, 9]);
        assert_eq!(composed.len(), 3);
    }

    #[test]
    fn test_compose_rejects_overreach() {
        let parent = Restriction::range(0, 2).unwrap();
        let child = Restriction::from_positions(&[0, 3]).unwrap();
        assert!(child.compose(&parent).is_err());
    }

    #[test]
    fn test_fits_within() {
        let r = Restriction::from_mask(&runs_mask());
        assert!(r.fits_within(20));
        assert!(r.fits_within(18));
        assert!(!r.fits_within(17));
        assert!(Restriction::full(3).fits_within(3));
        assert!(!Restriction::full(4).fits_within(3));
    }
}
