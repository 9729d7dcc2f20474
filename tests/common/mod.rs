use sylte::{Store, Sylted};

fn add(a: i64, b: i64) -> i64 {
    a + b
}

/// A wrapper built here and called from other test files.
pub fn shared_add(store: &Store) -> Sylted<fn(i64, i64) -> i64> {
    Sylted::new(store.clone(), "add", add as fn(i64, i64) -> i64)
}
