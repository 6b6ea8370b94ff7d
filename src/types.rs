//! Decoded record model: one [`Record`] per status message or listing row,
//! collected in an append-only [`RecordStore`].

use crate::schema::Schema;

/// One decoded message: a schema reference plus the field values in the
/// schema's declared order.
///
/// The value count always equals the schema's field count; a `None` value is
/// a declared-but-absent optional field. Records are immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    schema: &'static Schema,
    values: Vec<Option<String>>,
}

impl Record {
    /// Builds a record, padding `values` so the arity invariant holds even
    /// if a decoder hands in a short vector.
    pub(crate) fn new(schema: &'static Schema, mut values: Vec<Option<String>>) -> Self {
        values.resize(schema.field_count(), None);
        Self { schema, values }
    }

    /// The message-type keyword this record was decoded as.
    pub fn keyword(&self) -> &'static str {
        self.schema.keyword
    }

    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    /// Looks up a field value by name. `None` when the field is not declared
    /// by this record's schema or was absent from the input.
    pub fn get(&self, field: &str) -> Option<&str> {
        let idx = self.schema.field_index(field)?;
        self.values[idx].as_deref()
    }

    /// Field values in declared order, paired with their names.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, Option<&str>)> + '_ {
        self.schema
            .fields
            .iter()
            .zip(self.values.iter())
            .map(|(f, v)| (f.name, v.as_deref()))
    }

    /// True for records describing decode anomalies rather than GPG output.
    pub fn is_diagnostic(&self) -> bool {
        self.keyword().starts_with("DECODER_")
    }
}

/// An ordered, append-only collection of decoded records.
///
/// Insertion order matches the emission order of the underlying gpg process,
/// which time-based and causal queries depend on. One store belongs to one
/// decode session; it is never shared between sessions.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecordStore {
    records: Vec<Record>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a RecordStore {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// The result of one decode pass: the populated store plus every line that
/// matched no recognized pattern, preserved in original order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub records: RecordStore,
    pub plain: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;

    #[test]
    fn test_record_arity_is_padded() {
        let goodsig = schema::lookup("GOODSIG").unwrap();
        let record = Record::new(goodsig, vec![Some("ABCDEF0123456789".to_string())]);
        assert_eq!(record.get("long_keyid"), Some("ABCDEF0123456789"));
        assert_eq!(record.get("username"), None);
        assert_eq!(record.fields().count(), 2);
    }

    #[test]
    fn test_record_get_undeclared_field() {
        let newsig = schema::lookup("NEWSIG").unwrap();
        let record = Record::new(newsig, vec![]);
        assert_eq!(record.get("anything"), None);
    }

    #[test]
    fn test_is_diagnostic() {
        let diag = Record::new(
            schema::lookup(schema::UNKNOWN_KEYWORD).unwrap(),
            vec![Some("BOGUS".to_string()), None],
        );
        assert!(diag.is_diagnostic());

        let data = Record::new(schema::lookup("NEWSIG").unwrap(), vec![]);
        assert!(!data.is_diagnostic());
    }

    #[test]
    fn test_store_preserves_insertion_order() {
        let mut store = RecordStore::new();
        store.push(Record::new(schema::lookup("NEWSIG").unwrap(), vec![]));
        store.push(Record::new(
            schema::lookup("GOODSIG").unwrap(),
            vec![Some("KEY".into()), Some("User".into())],
        ));
        let keywords: Vec<_> = store.iter().map(|r| r.keyword()).collect();
        assert_eq!(keywords, vec!["NEWSIG", "GOODSIG"]);
        assert_eq!(store.len(), 2);
    }
}
