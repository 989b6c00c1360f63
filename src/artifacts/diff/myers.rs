//! Myers shortest edit script
//!
//! Greedy forward search over diagonals `k = x - y`, recording the furthest reaching
//! `x` of every diagonal per edit distance `d`, then backtracking through the recorded
//! rounds from the end of both sequences.
//!
//! Each round only keeps the diagonals `-d..=d`, so memory grows with the square of the
//! edit distance rather than with the input size. Searches beyond `max_distance` give up
//! and the caller falls back to a wholesale replacement.

use derive_new::new;
use std::fmt::Display;

/// Edit distance above which the search is abandoned
pub const MAX_EDIT_DISTANCE: usize = 2000;

/// One step of an edit script
///
/// `a_pos` and `b_pos` are the 0-based positions in the old and new sequence at which
/// the step happens: the element itself for the side it consumes, the insertion point
/// for the side it does not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit<T> {
    Delete { a_pos: usize, b_pos: usize, value: T },
    Insert { a_pos: usize, b_pos: usize, value: T },
    Equal { a_pos: usize, b_pos: usize, value: T },
}

impl<T> Edit<T> {
    pub fn a_pos(&self) -> usize {
        match self {
            Edit::Delete { a_pos, .. } | Edit::Insert { a_pos, .. } | Edit::Equal { a_pos, .. } => {
                *a_pos
            }
        }
    }

    pub fn b_pos(&self) -> usize {
        match self {
            Edit::Delete { b_pos, .. } | Edit::Insert { b_pos, .. } | Edit::Equal { b_pos, .. } => {
                *b_pos
            }
        }
    }

    pub fn value(&self) -> &T {
        match self {
            Edit::Delete { value, .. } | Edit::Insert { value, .. } | Edit::Equal { value, .. } => {
                value
            }
        }
    }

    pub fn is_equal(&self) -> bool {
        matches!(self, Edit::Equal { .. })
    }

    fn shifted(self, offset: usize) -> Self {
        match self {
            Edit::Delete { a_pos, b_pos, value } => Edit::Delete {
                a_pos: a_pos + offset,
                b_pos: b_pos + offset,
                value,
            },
            Edit::Insert { a_pos, b_pos, value } => Edit::Insert {
                a_pos: a_pos + offset,
                b_pos: b_pos + offset,
                value,
            },
            Edit::Equal { a_pos, b_pos, value } => Edit::Equal {
                a_pos: a_pos + offset,
                b_pos: b_pos + offset,
                value,
            },
        }
    }
}

impl<T: Display> Display for Edit<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Edit::Delete { value, .. } => write!(f, "-{value}"),
            Edit::Insert { value, .. } => write!(f, "+{value}"),
            Edit::Equal { value, .. } => write!(f, " {value}"),
        }
    }
}

pub trait DiffAlgorithm<T> {
    type Trace;
    type EditPath;
    type EditScript;

    fn compute_shortest_edit(&self) -> Option<Self::Trace>;
    fn backtrack(&self) -> Option<Self::EditPath>;
    fn diff(&self) -> Option<Self::EditScript>;
}

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct MyersDiff<'d, T> {
    a: &'d [T],
    b: &'d [T],
    max_distance: usize,
}

impl<T: Eq + Clone> DiffAlgorithm<T> for MyersDiff<'_, T> {
    /// `trace[d][k + d]` is the furthest `x` on diagonal `k` before round `d`
    type Trace = Vec<Vec<isize>>;
    type EditPath = Vec<(isize, isize, isize, isize)>;
    type EditScript = Vec<Edit<T>>;

    fn compute_shortest_edit(&self) -> Option<Self::Trace> {
        let (n, m) = (self.a.len() as isize, self.b.len() as isize);
        let max = (n + m).min(self.max_distance as isize);
        // one diagonal of margin on both sides for the k-1 and k+1 lookups
        let offset = max + 1;

        let mut v = vec![0; (2 * offset + 1) as usize];
        let mut trace = Vec::new();

        for d in 0..=max {
            trace.push(v[(offset - d) as usize..=(offset + d) as usize].to_vec());

            for k in (-d..=d).step_by(2) {
                let idx = (offset + k) as usize;

                let mut x = if k == -d {
                    // we could have only come from k+1, thus an insertion
                    v[idx + 1]
                } else if k == d {
                    // we could have only come from k-1, thus a deletion
                    v[idx - 1] + 1
                } else {
                    let x_del = v[idx - 1] + 1;
                    let x_ins = v[idx + 1];
                    if x_del > x_ins { x_del } else { x_ins }
                };

                let mut y = x - k;
                while x < n && y < m && self.a[x as usize] == self.b[y as usize] {
                    // snake
                    x += 1;
                    y += 1;
                }

                v[idx] = x;

                if x >= n && y >= m {
                    return Some(trace);
                }
            }
        }

        None
    }

    fn backtrack(&self) -> Option<Self::EditPath> {
        let (mut x, mut y) = (self.a.len() as isize, self.b.len() as isize);
        let mut edit_path = Vec::new();

        let trace = self.compute_shortest_edit()?;

        for (d, v) in trace.iter().enumerate().rev() {
            let d = d as isize;
            if d == 0 {
                while x > 0 && y > 0 {
                    edit_path.push((x - 1, y - 1, x, y));
                    x -= 1;
                    y -= 1;
                }
                break;
            }

            let k = x - y;
            let furthest = |k: isize| v[(k + d) as usize];

            let prev_k = if k == -d {
                k + 1
            } else if k == d {
                k - 1
            } else if furthest(k - 1) + 1 > furthest(k + 1) {
                k - 1
            } else {
                k + 1
            };

            let prev_x = furthest(prev_k);
            let prev_y = prev_x - prev_k;

            while x > prev_x && y > prev_y {
                edit_path.push((x - 1, y - 1, x, y));
                x -= 1;
                y -= 1;
            }

            edit_path.push((prev_x, prev_y, x, y));
            (x, y) = (prev_x, prev_y);
        }

        Some(edit_path)
    }

    fn diff(&self) -> Option<Self::EditScript> {
        let mut diff = Vec::new();

        for (prev_x, prev_y, x, y) in self.backtrack()? {
            let (a_pos, b_pos) = (prev_x as usize, prev_y as usize);

            if x == prev_x {
                // only y increased
                if let Some(value) = self.b.get(b_pos) {
                    diff.push(Edit::Insert {
                        a_pos,
                        b_pos,
                        value: value.clone(),
                    });
                }
            } else if y == prev_y {
                // only x increased
                if let Some(value) = self.a.get(a_pos) {
                    diff.push(Edit::Delete {
                        a_pos,
                        b_pos,
                        value: value.clone(),
                    });
                }
            } else if let Some(value) = self.a.get(a_pos) {
                // diagonal move
                diff.push(Edit::Equal {
                    a_pos,
                    b_pos,
                    value: value.clone(),
                });
            }
        }

        diff.reverse();
        Some(diff)
    }
}

/// Edit script of two sequences with the common prefix and suffix taken out of the search
///
/// When the remaining middle is further apart than `max_distance`, it is deleted and
/// inserted wholesale.
pub fn diff_sequences<T: Eq + Clone>(a: &[T], b: &[T], max_distance: usize) -> Vec<Edit<T>> {
    let prefix = a.iter().zip(b).take_while(|(x, y)| x == y).count();
    let suffix = a[prefix..]
        .iter()
        .rev()
        .zip(b[prefix..].iter().rev())
        .take_while(|(x, y)| x == y)
        .count();

    let (a_middle, b_middle) = (&a[prefix..a.len() - suffix], &b[prefix..b.len() - suffix]);

    let middle = MyersDiff::new(a_middle, b_middle, max_distance)
        .diff()
        .unwrap_or_else(|| {
            tracing::debug!(
                old_lines = a_middle.len(),
                new_lines = b_middle.len(),
                "edit distance too large, replacing the changed region"
            );
            a_middle
                .iter()
                .enumerate()
                .map(|(i, value)| Edit::Delete {
                    a_pos: i,
                    b_pos: 0,
                    value: value.clone(),
                })
                .chain(b_middle.iter().enumerate().map(|(i, value)| Edit::Insert {
                    a_pos: a_middle.len(),
                    b_pos: i,
                    value: value.clone(),
                }))
                .collect()
        });

    let head = a[..prefix]
        .iter()
        .enumerate()
        .map(|(i, value)| Edit::Equal {
            a_pos: i,
            b_pos: i,
            value: value.clone(),
        });
    let tail = a[a.len() - suffix..]
        .iter()
        .enumerate()
        .map(|(i, value)| Edit::Equal {
            a_pos: a.len() - suffix + i,
            b_pos: b.len() - suffix + i,
            value: value.clone(),
        });

    head.chain(middle.into_iter().map(|edit| edit.shifted(prefix)))
        .chain(tail)
        .collect()
}
