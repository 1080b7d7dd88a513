use crate::kinematics::AttachedBodyModel;
use std::collections::HashMap;

use super::{AllowedCollisionMatrix, SelfCollisionMatrix};

/// The allowed-touch table of one robot link.
///
/// Row `0` tells which collision links the link itself may touch; row `k`
/// tells which collision links its `k`-th attached body may touch. All rows
/// are indexed by collision link index.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct AllowedTouch {
    rows: Vec<Vec<bool>>,
}

impl AllowedTouch {
    /// The table derived from the self-collision matrix and the touch links
    /// declared by each attached body.
    pub fn from_self_collision(
        matrix: &SelfCollisionMatrix,
        link_index: usize,
        bodies: &[AttachedBodyModel],
        link_indices: &HashMap<String, usize>,
        num_links: usize,
    ) -> Self {
        let mut rows = Vec::with_capacity(bodies.len() + 1);
        rows.push(
            (0..num_links)
                .map(|j| matrix.touch_allowed(link_index, j))
                .collect(),
        );

        for body in bodies {
            let mut row = vec![false; num_links];
            for touch in &body.touch_links {
                match link_indices.get(touch) {
                    Some(j) if *j < num_links => row[*j] = true,
                    _ => log::warn!("Unknown link '{}' specified as touch link.", touch),
                }
            }
            rows.push(row);
        }

        Self { rows }
    }

    /// The table overridden by an allowed-collision matrix.
    ///
    /// If `link_name` is missing from the matrix, the link row of `current`
    /// is kept. Bodies missing from the matrix may touch nothing.
    pub fn from_override(
        matrix: &AllowedCollisionMatrix,
        link_name: &str,
        link_index: usize,
        bodies: &[AttachedBodyModel],
        num_links: usize,
        current: &AllowedTouch,
    ) -> Self {
        let matrix_row = |index: usize| -> Vec<bool> {
            let row = &matrix.entries()[index];
            (0..num_links)
                .map(|j| row.get(j).copied().unwrap_or(false))
                .collect()
        };

        let mut rows = Vec::with_capacity(bodies.len() + 1);
        match matrix.index_of(link_name) {
            Some(index) => {
                if index != link_index {
                    log::error!(
                        "Index of link '{}' changed from {} to {} in the collision matrix.",
                        link_name,
                        link_index,
                        index
                    );
                }
                rows.push(matrix_row(index));
            }
            None => {
                log::warn!("Link '{}' is not part of the collision matrix.", link_name);
                let mut row = current.link_row().to_vec();
                row.resize(num_links, false);
                rows.push(row);
            }
        }

        for body in bodies {
            match matrix.index_of(&body.name) {
                Some(index) => rows.push(matrix_row(index)),
                None => {
                    log::warn!(
                        "Attached body '{}' is not part of the collision matrix.",
                        body.name
                    );
                    rows.push(vec![false; num_links]);
                }
            }
        }

        Self { rows }
    }

    /// Which collision links the link itself may touch.
    pub fn link_row(&self) -> &[bool] {
        self.rows.first().map(|r| &r[..]).unwrap_or(&[])
    }

    /// Which collision links the attached body `ordinal` (1-based) may touch.
    pub fn body_row(&self, ordinal: usize) -> Option<&[bool]> {
        if ordinal == 0 {
            return None;
        }
        self.rows.get(ordinal).map(|r| &r[..])
    }

    /// The number of rows, the link row included.
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the link may touch the collision link `other`.
    pub fn link_allows(&self, other: usize) -> bool {
        self.link_row().get(other).copied().unwrap_or(false)
    }

    /// Returns `true` if the attached body `ordinal` may touch the collision link `other`.
    pub fn body_allows(&self, ordinal: usize, other: usize) -> bool {
        self.body_row(ordinal)
            .and_then(|r| r.get(other))
            .copied()
            .unwrap_or(false)
    }
}

/// The pairs `(i, j)`, `i < j`, of collision link indices whose link rows disagree.
pub fn asymmetric_link_pairs<'a>(
    tables: impl IntoIterator<Item = (usize, &'a AllowedTouch)>,
) -> Vec<(usize, usize)> {
    let rows: HashMap<usize, &AllowedTouch> = tables.into_iter().collect();
    let mut result = vec![];

    for (i, a) in &rows {
        for (j, b) in &rows {
            if i < j && a.link_allows(*j) != b.link_allows(*i) {
                result.push((*i, *j));
            }
        }
    }

    result.sort();
    result
}
