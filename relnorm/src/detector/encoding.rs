//! Dictionary encoding of a profile's cells.
//!
//! Every distinct cell value of a column (null included) maps to a dense
//! `u32` code, so grouping rows by an attribute set hashes small integer
//! vectors instead of strings.

use std::collections::{HashMap, HashSet};

use crate::model::{AttributeSet, TableProfile};

#[derive(Debug, Clone)]
pub struct EncodedTable {
    columns: Vec<Vec<u32>>,
    cardinalities: Vec<usize>,
    has_nulls: Vec<bool>,
    row_count: usize,
}

impl EncodedTable {
    pub fn encode(profile: &TableProfile) -> Self {
        let column_count = profile.column_count();
        let row_count = profile.row_count();
        let mut columns = Vec::with_capacity(column_count);
        let mut cardinalities = Vec::with_capacity(column_count);
        let mut has_nulls = Vec::with_capacity(column_count);

        for index in 0..column_count {
            let mut dictionary: HashMap<Option<&str>, u32> = HashMap::new();
            let mut codes = Vec::with_capacity(row_count);
            let mut nulls = false;
            for row in profile.rows() {
                let cell = row[index].as_deref();
                nulls |= cell.is_none();
                let next = dictionary.len() as u32;
                codes.push(*dictionary.entry(cell).or_insert(next));
            }
            cardinalities.push(dictionary.len());
            has_nulls.push(nulls);
            columns.push(codes);
        }

        Self {
            columns,
            cardinalities,
            has_nulls,
            row_count,
        }
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, index: usize) -> &[u32] {
        &self.columns[index]
    }

    /// Distinct values in one column, null counted as a value.
    pub fn cardinality(&self, index: usize) -> usize {
        self.cardinalities[index]
    }

    pub fn has_nulls(&self, index: usize) -> bool {
        self.has_nulls[index]
    }

    /// Columns without nulls, in index order.
    pub fn null_free_columns(&self) -> Vec<usize> {
        (0..self.columns.len())
            .filter(|&i| !self.has_nulls[i])
            .collect()
    }

    /// Codes of `row` restricted to `attrs`, in index order.
    pub fn key(&self, row: usize, attrs: &AttributeSet) -> Vec<u32> {
        attrs.iter().map(|i| self.columns[i][row]).collect()
    }

    /// Number of distinct projected tuples over `attrs`.
    pub fn distinct_count(&self, attrs: &AttributeSet) -> usize {
        if attrs.len() == 1 {
            if let Some(index) = attrs.first() {
                return self.cardinalities[index];
            }
        }
        let mut seen: HashSet<Vec<u32>> = HashSet::with_capacity(self.row_count);
        for row in 0..self.row_count {
            seen.insert(self.key(row, attrs));
        }
        seen.len()
    }

    /// Whether `attrs` identifies every row.
    pub fn is_unique(&self, attrs: &AttributeSet) -> bool {
        self.distinct_count(attrs) == self.row_count
    }

    /// Row indices of the first occurrence of each distinct full row.
    pub fn distinct_rows(&self) -> Vec<usize> {
        let all = AttributeSet::full(self.columns.len());
        let mut seen: HashSet<Vec<u32>> = HashSet::with_capacity(self.row_count);
        (0..self.row_count)
            .filter(|&row| seen.insert(self.key(row, &all)))
            .collect()
    }
}
