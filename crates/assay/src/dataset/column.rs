//! A single typed column of cells.

use indexmap::IndexMap;

use super::stats::NumericSummary;
use super::types::ColumnType;
use super::value::Value;

/// A column: declared type plus row-aligned cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Column {
    dtype: ColumnType,
    values: Vec<Value>,
}

impl Column {
    /// Create a column with an explicit type.
    pub fn new(dtype: ColumnType, values: Vec<Value>) -> Self {
        let mut column = Self { dtype, values };
        column.widen_integers();
        column
    }

    /// Create a column whose type is derived from its non-null values.
    pub fn from_values(values: Vec<Value>) -> Self {
        Self::new(infer_dtype(&values), values)
    }

    /// Declared type of the column.
    pub fn dtype(&self) -> ColumnType {
        self.dtype
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the column has no cells.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All cells in row order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Cell at `row`.
    pub fn get(&self, row: usize) -> Option<&Value> {
        self.values.get(row)
    }

    /// Whether only numeric (or null) cells can appear in this column.
    pub fn is_numeric(&self) -> bool {
        self.dtype.is_numeric()
    }

    /// Number of null cells.
    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_null()).count()
    }

    /// `true` for every row whose cell is null.
    pub fn null_mask(&self) -> Vec<bool> {
        self.values.iter().map(Value::is_null).collect()
    }

    /// Non-null numeric cells as floats, in row order.
    pub fn numeric_values(&self) -> Vec<f64> {
        self.values.iter().filter_map(Value::as_f64).collect()
    }

    /// Summary statistics over the non-null numeric cells.
    pub fn numeric_summary(&self) -> Option<NumericSummary> {
        NumericSummary::from_values(&self.numeric_values())
    }

    /// Most frequent non-null value; the first one encountered wins ties.
    pub fn mode(&self) -> Option<Value> {
        let mut counts: IndexMap<&Value, usize> = IndexMap::new();
        for value in self.values.iter().filter(|v| !v.is_null()) {
            *counts.entry(value).or_insert(0) += 1;
        }

        let mut best: Option<(&Value, usize)> = None;
        for (value, count) in counts {
            if best.is_none_or(|(_, c)| count > c) {
                best = Some((value, count));
            }
        }
        best.map(|(value, _)| value.clone())
    }

    /// Replace every null with `value`. Returns the number of cells filled.
    pub fn fill_nulls(&mut self, value: &Value) -> usize {
        if value.is_null() {
            return 0;
        }
        let fill = self.conform(value);
        let mut filled = 0;
        for cell in self.values.iter_mut().filter(|v| v.is_null()) {
            *cell = fill.clone();
            filled += 1;
        }
        filled
    }

    /// Propagate the last non-null value forward. Leading nulls stay null.
    pub fn fill_forward(&mut self) -> usize {
        let mut last: Option<Value> = None;
        let mut filled = 0;
        for cell in self.values.iter_mut() {
            if cell.is_null() {
                if let Some(ref donor) = last {
                    *cell = donor.clone();
                    filled += 1;
                }
            } else {
                last = Some(cell.clone());
            }
        }
        filled
    }

    /// Propagate the next non-null value backward. Trailing nulls stay null.
    pub fn fill_backward(&mut self) -> usize {
        let mut next: Option<Value> = None;
        let mut filled = 0;
        for cell in self.values.iter_mut().rev() {
            if cell.is_null() {
                if let Some(ref donor) = next {
                    *cell = donor.clone();
                    filled += 1;
                }
            } else {
                next = Some(cell.clone());
            }
        }
        filled
    }

    /// Cast every cell to `target`, nulling cells that fail.
    ///
    /// Returns the number of non-null cells that could not be converted.
    pub fn cast(&mut self, target: ColumnType) -> usize {
        let mut failures = 0;
        for cell in self.values.iter_mut() {
            match cell.cast(target) {
                Some(converted) => *cell = converted,
                None => {
                    *cell = Value::Null;
                    failures += 1;
                }
            }
        }
        self.dtype = target;
        failures
    }

    /// Keep only the rows whose mask entry is `true`.
    pub(crate) fn retain_rows(&mut self, keep: &[bool]) {
        let mut mask = keep.iter();
        self.values.retain(|_| mask.next().copied().unwrap_or(false));
    }

    /// Bring a fill value in line with the column's type.
    ///
    /// Integral floats fill integer columns as integers; anything else that does
    /// not fit widens an integer column to float.
    fn conform(&mut self, value: &Value) -> Value {
        match (self.dtype, value) {
            (ColumnType::Integer, Value::Float(_)) => match value.cast(ColumnType::Integer) {
                Some(int) => int,
                None => {
                    self.cast(ColumnType::Float);
                    value.clone()
                }
            },
            (ColumnType::Float, Value::Int(i)) => Value::Float(*i as f64),
            (ColumnType::Unknown, _) => {
                self.dtype = value.column_type();
                value.clone()
            }
            _ => {
                self.dtype = self.dtype.unify(value.column_type());
                self.widen_integers();
                value.clone()
            }
        }
    }

    /// Store integer cells of a float column as floats, so equal numbers
    /// compare and hash alike.
    fn widen_integers(&mut self) {
        if self.dtype != ColumnType::Float {
            return;
        }
        for cell in self.values.iter_mut() {
            if let Value::Int(i) = *cell {
                *cell = Value::Float(i as f64);
            }
        }
    }
}

fn infer_dtype(values: &[Value]) -> ColumnType {
    values
        .iter()
        .filter(|v| !v.is_null())
        .fold(ColumnType::Unknown, |acc, v| acc.unify(v.column_type()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[Option<i64>]) -> Column {
        Column::from_values(values.iter().map(|v| Value::from(*v)).collect())
    }

    #[test]
    fn test_infer_dtype() {
        assert_eq!(ints(&[Some(1), None]).dtype(), ColumnType::Integer);
        let mixed = Column::from_values(vec![Value::Int(1), Value::Float(2.5)]);
        assert_eq!(mixed.dtype(), ColumnType::Float);
        assert_eq!(ints(&[None, None]).dtype(), ColumnType::Unknown);
    }

    #[test]
    fn test_mixed_numeric_cells_share_float_representation() {
        let column = Column::from_values(vec![Value::Int(1), Value::Float(1.0), Value::Float(2.5)]);
        assert_eq!(column.dtype(), ColumnType::Float);
        assert_eq!(
            column.values(),
            &[Value::Float(1.0), Value::Float(1.0), Value::Float(2.5)]
        );
        assert_eq!(column.values()[0], column.values()[1]);
        assert_eq!(column.mode(), Some(Value::Float(1.0)));
    }

    #[test]
    fn test_explicit_float_column_widens_integers() {
        let column = Column::new(ColumnType::Float, vec![Value::Int(3), Value::Null]);
        assert_eq!(column.values(), &[Value::Float(3.0), Value::Null]);
    }

    #[test]
    fn test_fill_integral_float_keeps_integers() {
        let mut column = ints(&[Some(10), None, Some(30)]);
        assert_eq!(column.fill_nulls(&Value::Float(20.0)), 1);
        assert_eq!(column.dtype(), ColumnType::Integer);
        assert_eq!(column.values()[1], Value::Int(20));
    }

    #[test]
    fn test_fill_fractional_float_widens() {
        let mut column = ints(&[Some(10), None, Some(15)]);
        column.fill_nulls(&Value::Float(12.5));
        assert_eq!(column.dtype(), ColumnType::Float);
        assert_eq!(
            column.values(),
            &[Value::Float(10.0), Value::Float(12.5), Value::Float(15.0)]
        );
    }

    #[test]
    fn test_fill_forward_and_backward() {
        let mut forward = ints(&[None, Some(1), None, None, Some(4), None]);
        assert_eq!(forward.fill_forward(), 3);
        assert_eq!(forward.values()[0], Value::Null);
        assert_eq!(forward.values()[3], Value::Int(1));
        assert_eq!(forward.values()[5], Value::Int(4));

        let mut backward = ints(&[None, Some(1), None, Some(4), None]);
        assert_eq!(backward.fill_backward(), 2);
        assert_eq!(backward.values()[0], Value::Int(1));
        assert_eq!(backward.values()[2], Value::Int(4));
        assert_eq!(backward.values()[4], Value::Null);
    }

    #[test]
    fn test_mode_first_wins_ties() {
        let column = Column::from_values(vec![
            Value::from("b"),
            Value::from("a"),
            Value::Null,
            Value::from("a"),
            Value::from("b"),
        ]);
        assert_eq!(column.mode(), Some(Value::from("b")));
        assert_eq!(ints(&[None]).mode(), None);
    }

    #[test]
    fn test_cast_counts_failures() {
        let mut column = Column::from_values(vec![
            Value::from("1"),
            Value::from("2"),
            Value::from("3.5"),
            Value::from("invalid"),
            Value::Null,
        ]);
        assert_eq!(column.cast(ColumnType::Float), 1);
        assert_eq!(column.dtype(), ColumnType::Float);
        assert_eq!(column.values()[2], Value::Float(3.5));
        assert!(column.values()[3].is_null());
    }

    #[test]
    fn test_retain_rows() {
        let mut column = ints(&[Some(1), Some(2), Some(3)]);
        column.retain_rows(&[true, false, true]);
        assert_eq!(column.values(), &[Value::Int(1), Value::Int(3)]);
    }
}
