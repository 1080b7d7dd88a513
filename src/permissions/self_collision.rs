use std::collections::HashMap;

/// Which pairs of collision links are exempt from self-collision checking.
///
/// An entry `(i, j)` set to `true` means the self-collision check between the
/// `i`-th and `j`-th collision links is disabled, i.e., they are allowed to
/// touch. Every pair starts disabled: enabling checks is done by
/// [`add_group`](Self::add_group).
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct SelfCollisionMatrix {
    rows: Vec<Vec<bool>>,
}

impl SelfCollisionMatrix {
    /// A `n × n` matrix with every check disabled.
    pub fn new(n: usize) -> Self {
        Self {
            rows: vec![vec![true; n]; n],
        }
    }

    /// The number of collision links covered by this matrix.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if this matrix covers no link.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The row of the `i`-th collision link.
    pub fn row(&self, i: usize) -> Option<&[bool]> {
        self.rows.get(i).map(|r| &r[..])
    }

    /// Returns `true` if links `i` and `j` may touch, as seen from `i`.
    ///
    /// Out-of-range indices are reported as allowed.
    pub fn touch_allowed(&self, i: usize, j: usize) -> bool {
        self.rows
            .get(i)
            .and_then(|r| r.get(j))
            .copied()
            .unwrap_or(true)
    }

    /// Sets both the `(i, j)` and `(j, i)` entries.
    pub fn set_touch_allowed(&mut self, i: usize, j: usize, allowed: bool) {
        if i < self.len() && j < self.len() {
            self.rows[i][j] = allowed;
            self.rows[j][i] = allowed;
        }
    }

    /// Enables self-collision checks between every link of `group1` and every link of `group2`.
    ///
    /// `indices` maps collision link names to their index. Unknown names are
    /// skipped with a warning.
    pub fn add_group(
        &mut self,
        indices: &HashMap<String, usize>,
        group1: &[String],
        group2: &[String],
    ) {
        self.set_group(indices, group1, group2, false)
    }

    /// Disables the self-collision checks enabled by [`add_group`](Self::add_group).
    pub fn remove_group(
        &mut self,
        indices: &HashMap<String, usize>,
        group1: &[String],
        group2: &[String],
    ) {
        self.set_group(indices, group1, group2, true)
    }

    fn set_group(
        &mut self,
        indices: &HashMap<String, usize>,
        group1: &[String],
        group2: &[String],
        allowed: bool,
    ) {
        let lookup = |name: &String| {
            let index = indices.get(name).copied();
            if index.is_none() {
                log::warn!("Unknown link '{}' in self-collision group.", name);
            }
            index
        };

        let group2: Vec<_> = group2.iter().filter_map(lookup).collect();
        for i in group1.iter().filter_map(lookup) {
            for j in &group2 {
                self.set_touch_allowed(i, *j, allowed);
            }
        }
    }
}
