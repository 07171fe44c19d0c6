//! Ordered record sets and the forward-only cursor over them

use crate::error::{Error, Result};
use crate::schema::types::ColumnRecord;

/// A record that can be placed in an [`OrderedRecordSet`]
pub trait Keyed {
    /// Total-order key identifying the object across both sides
    fn compare_name(&self) -> &str;
}

impl Keyed for ColumnRecord {
    fn compare_name(&self) -> &str {
        &self.compare_name
    }
}

/// One side's records, sorted by compare_name with no duplicate keys
#[derive(Debug, Clone)]
pub struct OrderedRecordSet<R> {
    records: Vec<R>,
}

impl<R: Keyed> OrderedRecordSet<R> {
    /// Sort records by compare_name (plain byte order)
    pub fn build(mut records: Vec<R>) -> Result<Self> {
        records.sort_by(|a, b| a.compare_name().cmp(b.compare_name()));

        if let Some(pair) = records
            .windows(2)
            .find(|pair| pair[0].compare_name() == pair[1].compare_name())
        {
            return Err(Error::DuplicateKey(pair[0].compare_name().to_string()));
        }

        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    /// Start a cursor positioned before the first record
    pub fn into_cursor(self) -> Cursor<R> {
        Cursor {
            records: self.records,
            position: None,
            done: false,
        }
    }
}

/// Forward-only position over an ordered record set
#[derive(Debug, Clone)]
pub struct Cursor<R> {
    records: Vec<R>,
    position: Option<usize>,
    done: bool,
}

impl<R: Keyed> Cursor<R> {
    /// Step forward; returns whether a current record exists
    ///
    /// Once this returns `false` the cursor stays exhausted.
    pub fn advance(&mut self) -> bool {
        if self.done {
            return false;
        }
        let next = self.position.map_or(0, |p| p + 1);
        if next >= self.records.len() {
            self.position = Some(self.records.len());
            self.done = true;
        } else {
            self.position = Some(next);
        }
        !self.done
    }

    pub fn is_exhausted(&self) -> bool {
        self.done
    }

    /// The record under the cursor, if any
    pub fn current(&self) -> Option<&R> {
        if self.done {
            return None;
        }
        self.position.and_then(|p| self.records.get(p))
    }

    /// Read a field of the current record, or `""` when there is none
    pub fn field<'a>(&'a self, get: impl FnOnce(&'a R) -> &'a str) -> &'a str {
        self.current().map(get).unwrap_or("")
    }

    /// compare_name of the current record, or `""` when there is none
    pub fn compare_name(&self) -> &str {
        self.field(|r| r.compare_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Key(&'static str);

    impl Keyed for Key {
        fn compare_name(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn build_sorts_by_byte_order() {
        let set = OrderedRecordSet::build(vec![Key("b.00002x"), Key("B.00001y"), Key("a.00010z")])
            .unwrap();
        let keys: Vec<_> = set.records().iter().map(|k| k.0).collect();
        assert_eq!(keys, vec!["B.00001y", "a.00010z", "b.00002x"]);
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn build_rejects_duplicates() {
        let err = OrderedRecordSet::build(vec![Key("t.00001a"), Key("t.00001a")]).unwrap_err();
        assert!(matches!(err, Error::DuplicateKey(ref key) if key == "t.00001a"));
    }

    #[test]
    fn cursor_exhausts_permanently() {
        let mut cursor = OrderedRecordSet::build(vec![Key("a"), Key("b")])
            .unwrap()
            .into_cursor();

        assert_eq!(cursor.compare_name(), "");
        assert!(cursor.advance());
        assert_eq!(cursor.compare_name(), "a");
        assert!(cursor.advance());
        assert_eq!(cursor.compare_name(), "b");
        assert!(!cursor.advance());
        assert!(cursor.is_exhausted());
        assert_eq!(cursor.compare_name(), "");
        assert!(!cursor.advance());
        assert!(cursor.current().is_none());
    }

    #[test]
    fn empty_set_is_exhausted_on_first_advance() {
        let mut cursor = OrderedRecordSet::<Key>::build(Vec::new()).unwrap().into_cursor();
        assert!(!cursor.advance());
        assert_eq!(cursor.compare_name(), "");
    }
}
