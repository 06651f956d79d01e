//! Shortest edit script (Myers, O(ND))

/// One step of an edit script, indices into the old and new sequences
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    Equal { old: usize, new: usize },
    Delete { old: usize },
    Insert { new: usize },
}

impl Edit {
    pub fn is_change(&self) -> bool {
        !matches!(self, Edit::Equal { .. })
    }
}

/// Compute a minimal edit script turning `a` into `b`.
///
/// Common prefix and suffix are matched directly; the search only runs on
/// the differing middle. Deletions are emitted before insertions at the same
/// position.
pub fn diff_slices<T: PartialEq>(a: &[T], b: &[T]) -> Vec<Edit> {
    let prefix = a.iter().zip(b).take_while(|(x, y)| x == y).count();
    let suffix = a[prefix..]
        .iter()
        .rev()
        .zip(b[prefix..].iter().rev())
        .take_while(|(x, y)| x == y)
        .count();

    let mut edits = Vec::with_capacity(a.len().max(b.len()));
    edits.extend((0..prefix).map(|i| Edit::Equal { old: i, new: i }));

    let mid_a = &a[prefix..a.len() - suffix];
    let mid_b = &b[prefix..b.len() - suffix];
    for edit in middle(mid_a, mid_b) {
        edits.push(match edit {
            Edit::Equal { old, new } => Edit::Equal {
                old: old + prefix,
                new: new + prefix,
            },
            Edit::Delete { old } => Edit::Delete { old: old + prefix },
            Edit::Insert { new } => Edit::Insert { new: new + prefix },
        });
    }

    let (a_tail, b_tail) = (a.len() - suffix, b.len() - suffix);
    edits.extend((0..suffix).map(|i| Edit::Equal {
        old: a_tail + i,
        new: b_tail + i,
    }));
    edits
}

fn middle<T: PartialEq>(a: &[T], b: &[T]) -> Vec<Edit> {
    if a.is_empty() {
        return (0..b.len()).map(|new| Edit::Insert { new }).collect();
    }
    if b.is_empty() {
        return (0..a.len()).map(|old| Edit::Delete { old }).collect();
    }

    let n = a.len() as isize;
    let m = b.len() as isize;
    let max = n + m;
    // furthest x reached on each diagonal k, stored at k + max + 1
    let mut v = vec![0isize; 2 * max as usize + 3];
    let at = |k: isize| (k + max + 1) as usize;
    // trace[d] holds diagonals -d-1..=d+1 of v as they were before round d
    let mut trace: Vec<Vec<isize>> = Vec::new();

    'search: for d in 0..=max {
        trace.push(v[at(-d - 1)..=at(d + 1)].to_vec());
        let mut k = -d;
        while k <= d {
            let mut x = if k == -d || (k != d && v[at(k - 1)] < v[at(k + 1)]) {
                v[at(k + 1)]
            } else {
                v[at(k - 1)] + 1
            };
            let mut y = x - k;
            while x < n && y < m && a[x as usize] == b[y as usize] {
                x += 1;
                y += 1;
            }
            v[at(k)] = x;
            if x >= n && y >= m {
                break 'search;
            }
            k += 2;
        }
    }

    let mut edits = Vec::new();
    let (mut x, mut y) = (n, m);
    for (d, snapshot) in trace.iter().enumerate().rev() {
        let d = d as isize;
        let get = |k: isize| snapshot[(k + d + 1) as usize];
        let k = x - y;
        let prev_k = if k == -d || (k != d && get(k - 1) < get(k + 1)) {
            k + 1
        } else {
            k - 1
        };
        let prev_x = get(prev_k);
        let prev_y = prev_x - prev_k;

        while x > prev_x && y > prev_y {
            x -= 1;
            y -= 1;
            edits.push(Edit::Equal {
                old: x as usize,
                new: y as usize,
            });
        }
        if d > 0 {
            if x == prev_x {
                edits.push(Edit::Insert {
                    new: (y - 1) as usize,
                });
            } else {
                edits.push(Edit::Delete {
                    old: (x - 1) as usize,
                });
            }
        }
        x = prev_x;
        y = prev_y;
    }
    edits.reverse();
    edits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply<'a>(a: &[&'a str], b: &[&'a str], edits: &[Edit]) -> Vec<&'a str> {
        let mut out = Vec::new();
        for e in edits {
            match e {
                Edit::Equal { old, new } => {
                    assert_eq!(a[*old], b[*new]);
                    out.push(a[*old]);
                }
                Edit::Insert { new } => out.push(b[*new]),
                Edit::Delete { .. } => {}
            }
        }
        out
    }

    fn cost(edits: &[Edit]) -> usize {
        edits.iter().filter(|e| e.is_change()).count()
    }

    #[test]
    fn test_reconstructs_target() {
        let a = ["a", "b", "c", "a", "b", "b", "a"];
        let b = ["c", "b", "a", "b", "a", "c"];
        let edits = diff_slices(&a, &b);
        assert_eq!(apply(&a, &b, &edits), b.to_vec());
        // classic example: D = 5
        assert_eq!(cost(&edits), 5);
    }

    #[test]
    fn test_empty_sides() {
        assert!(diff_slices::<&str>(&[], &[]).is_empty());
        assert_eq!(cost(&diff_slices(&["x", "y"], &[])), 2);
        assert_eq!(cost(&diff_slices(&[], &["x"])), 1);
    }

    #[test]
    fn test_identical() {
        let a = ["1", "2", "3"];
        let edits = diff_slices(&a, &a);
        assert_eq!(cost(&edits), 0);
        assert_eq!(edits.len(), 3);
    }

    #[test]
    fn test_single_replacement() {
        let edits = diff_slices(&["a", "b", "c"], &["a", "x", "c"]);
        assert_eq!(
            edits,
            vec![
                Edit::Equal { old: 0, new: 0 },
                Edit::Delete { old: 1 },
                Edit::Insert { new: 1 },
                Edit::Equal { old: 2, new: 2 },
            ]
        );
    }
}
