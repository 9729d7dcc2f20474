//! Name index over a store.
//!
//! Holds the identifiers present in the store and loads a payload only when it
//! is asked for. Loads always read from disk; the index never keeps payloads.

use crate::core::error::SylteError;
use crate::core::ident::CallId;
use crate::core::store::Store;
use crate::core::value::Payload;
use std::collections::BTreeSet;

#[derive(Debug, Clone)]
pub struct Index {
    store: Store,
    names: BTreeSet<String>,
}

impl Index {
    /// Scan `store` and index every entry found.
    pub fn open(store: Store) -> Result<Self, SylteError> {
        let mut index = Self {
            store,
            names: BTreeSet::new(),
        };
        index.refresh()?;
        Ok(index)
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Re-scan the store, picking up entries written through other handles.
    pub fn refresh(&mut self) -> Result<(), SylteError> {
        self.names = self.store.stems()?.into_iter().collect();
        Ok(())
    }

    /// Indexed identifiers in name order. Use [`Index::list`] for time order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.names.contains(identifier)
    }

    /// Load the payload of an indexed identifier.
    pub fn get(&self, identifier: &str) -> Result<Payload, SylteError> {
        if !self.contains(identifier) {
            return Err(SylteError::NotFound(format!(
                "'{}' is not in the index",
                identifier
            )));
        }
        self.store.unsylt(identifier)
    }

    /// Capture through the index so the new entry is immediately visible.
    pub fn capture(
        &mut self,
        caller: &str,
        function: &str,
        payload: &Payload,
    ) -> Result<CallId, SylteError> {
        let id = self.store.capture(caller, function, payload)?;
        self.record(&id);
        Ok(id)
    }

    pub fn record(&mut self, id: &CallId) {
        self.names.insert(id.as_str().to_string());
    }

    pub fn list(&self, substring: &str) -> Result<Vec<CallId>, SylteError> {
        self.store.list(substring)
    }

    pub fn latest(&self, substring: &str) -> Result<Option<Payload>, SylteError> {
        self.store.latest(substring)
    }

    /// Clear the store and forget every indexed name.
    pub fn clear(&mut self) -> Result<usize, SylteError> {
        let removed = self.store.clear()?;
        self.names.clear();
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_open_indexes_existing_entries() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("test_sylte-func-2022-01-14-15-16-00.pickle"), b"").unwrap();
        fs::write(tmp.path().join("test_sylte-func-2022-01-14-15-16-01.pickle"), b"").unwrap();

        let index = Index::open(Store::new(tmp.path())).unwrap();
        assert!(index.contains("test_sylte-func-2022-01-14-15-16-00"));
        assert!(index.contains("test_sylte-func-2022-01-14-15-16-01"));
        assert_eq!(index.len(), 2);
        assert_eq!(
            index.names().collect::<Vec<_>>(),
            vec![
                "test_sylte-func-2022-01-14-15-16-00",
                "test_sylte-func-2022-01-14-15-16-01",
            ]
        );
    }

    #[test]
    fn test_get_reads_current_disk_contents() {
        let tmp = tempdir().unwrap();
        let store = Store::new(tmp.path());
        let mut index = Index::open(store.clone()).unwrap();
        let id = index.capture("a.rs", "f", &Payload::new().arg(1)).unwrap();
        assert_eq!(index.get(id.as_str()).unwrap(), Payload::new().arg(1));

        fs::write(store.entry_path(&id), br#"[[{"int":9}],{}]"#).unwrap();
        assert_eq!(index.get(id.as_str()).unwrap(), Payload::new().arg(9));
    }

    #[test]
    fn test_get_unknown_name_is_not_found() {
        let tmp = tempdir().unwrap();
        let index = Index::open(Store::new(tmp.path())).unwrap();
        assert!(matches!(
            index.get("nope-f-2022-01-14-15-16-00"),
            Err(SylteError::NotFound(_))
        ));
    }

    #[test]
    fn test_refresh_sees_foreign_writes() {
        let tmp = tempdir().unwrap();
        let store = Store::new(tmp.path());
        let mut index = Index::open(store.clone()).unwrap();
        let id = store.capture("b.rs", "g", &Payload::new()).unwrap();
        assert!(!index.contains(id.as_str()));
        index.refresh().unwrap();
        assert!(index.contains(id.as_str()));
    }

    #[test]
    fn test_clear_empties_index_and_store() {
        let tmp = tempdir().unwrap();
        let mut index = Index::open(Store::new(tmp.path())).unwrap();
        index.capture("a.rs", "f", &Payload::new()).unwrap();
        assert_eq!(index.clear().unwrap(), 1);
        assert!(index.is_empty());
        assert!(index.list("").unwrap().is_empty());
    }
}
