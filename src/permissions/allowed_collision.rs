use crate::environment::EnvironmentError;
use crate::kinematics::AttachedBodyModel;
use std::collections::HashMap;

/// A square permission matrix over named entities (links, namespaces and
/// attached bodies), set from outside of the environment.
///
/// An entry set to `true` means the two entities are allowed to collide.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct AllowedCollisionMatrix {
    entries: Vec<Vec<bool>>,
    indices: HashMap<String, usize>,
}

impl AllowedCollisionMatrix {
    /// Creates a matrix from its entries and the index of each named entity.
    ///
    /// Fails if `entries` is not square or if an index is out of range.
    pub fn new(
        entries: Vec<Vec<bool>>,
        indices: HashMap<String, usize>,
    ) -> Result<Self, EnvironmentError> {
        let result = Self { entries, indices };
        result.validate()?;
        Ok(result)
    }

    /// Checks that this matrix is square and that every index is in range.
    pub fn validate(&self) -> Result<(), EnvironmentError> {
        let size = self.entries.len();
        if let Some((row, r)) = self.entries.iter().enumerate().find(|(_, r)| r.len() != size) {
            return Err(EnvironmentError::MalformedCollisionMatrix {
                row,
                len: r.len(),
                expected: size,
            });
        }

        if let Some((name, index)) = self.indices.iter().find(|(_, i)| **i >= size) {
            return Err(EnvironmentError::CollisionMatrixIndexOutOfRange {
                name: name.clone(),
                index: *index,
                size,
            });
        }

        Ok(())
    }

    /// Derives a matrix from the current allowed-touch tables.
    ///
    /// Links come first, with the rows of `link_rows`, then one entry per
    /// namespace, then one entry per attached body. An attached body and
    /// each of its touch links are allowed to collide, in both directions.
    pub fn derive<'a, 'b>(
        link_names: &[String],
        link_rows: &[Vec<bool>],
        namespaces: impl IntoIterator<Item = &'a str>,
        bodies: impl IntoIterator<Item = &'b AttachedBodyModel>,
    ) -> Self {
        let namespaces: Vec<_> = namespaces.into_iter().collect();
        let bodies: Vec<_> = bodies.into_iter().collect();
        let num_links = link_names.len();
        let size = num_links + namespaces.len() + bodies.len();
        let mut entries = vec![vec![false; size]; size];
        let mut indices: HashMap<String, usize> = link_names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i))
            .collect();

        for (i, row) in link_rows.iter().enumerate().take(num_links) {
            for (j, allowed) in row.iter().enumerate().take(num_links) {
                entries[i][j] = *allowed;
            }
        }

        let mut next = num_links;
        for ns in namespaces {
            let _ = indices.insert(ns.to_string(), next);
            next += 1;
        }

        for body in bodies {
            let _ = indices.insert(body.name.clone(), next);
            for touch in &body.touch_links {
                if let Some(j) = indices.get(touch).copied() {
                    entries[j][next] = true;
                    entries[next][j] = true;
                }
            }
            next += 1;
        }

        Self { entries, indices }
    }

    /// The number of entities covered by this matrix.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if this matrix covers no entity.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The raw matrix entries.
    pub fn entries(&self) -> &[Vec<bool>] {
        &self.entries
    }

    /// The index of every named entity.
    pub fn indices(&self) -> &HashMap<String, usize> {
        &self.indices
    }

    /// The index of the entity `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.indices.get(name).copied()
    }

    /// The row of the entity `name`.
    pub fn row(&self, name: &str) -> Option<&[bool]> {
        self.index_of(name).map(|i| &self.entries[i][..])
    }

    /// Whether `a` is allowed to collide with `b`, or `None` if one of them is unknown.
    pub fn allowed(&self, a: &str, b: &str) -> Option<bool> {
        let i = self.index_of(a)?;
        let j = self.index_of(b)?;
        Some(self.entries[i][j])
    }

    /// Sets the permission between `a` and `b`, in both directions.
    ///
    /// Returns `false` if one of them is unknown.
    pub fn set_allowed(&mut self, a: &str, b: &str, allowed: bool) -> bool {
        match (self.index_of(a), self.index_of(b)) {
            (Some(i), Some(j)) => {
                self.entries[i][j] = allowed;
                self.entries[j][i] = allowed;
                true
            }
            _ => false,
        }
    }
}
