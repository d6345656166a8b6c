//! Declared join relations between tables.

use std::sync::{Arc, OnceLock, PoisonError, RwLock};

/// A join-eligible pair of `(table, field)` endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub table1: String,
    pub field1: String,
    pub table2: String,
    pub field2: String,
}

impl Relation {
    /// Whether this relation connects `a` and `b`, in either orientation.
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.table1 == a && self.table2 == b) || (self.table2 == a && self.table1 == b)
    }

    /// Whether either endpoint uses `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.field1 == field || self.field2 == field
    }
}

/// Ordered registry of relations, consulted when rendering joins.
///
/// Lookups return the first matching relation in registration order. The
/// registry is internally locked, so one instance can be shared (via `Arc`) by
/// many schemas and threads.
#[derive(Debug, Default)]
pub struct RelationRegistry {
    relations: RwLock<Vec<Relation>>,
}

static GLOBAL: OnceLock<Arc<RelationRegistry>> = OnceLock::new();

impl RelationRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    pub fn global() -> Arc<RelationRegistry> {
        GLOBAL.get_or_init(|| Arc::new(RelationRegistry::new())).clone()
    }

    /// Declare that `table1.field1` joins `table2.field2`.
    pub fn add(
        &self,
        table1: impl Into<String>,
        field1: impl Into<String>,
        table2: impl Into<String>,
        field2: impl Into<String>,
    ) -> &Self {
        let relation = Relation {
            table1: table1.into(),
            field1: field1.into(),
            table2: table2.into(),
            field2: field2.into(),
        };
        self.relations
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(relation);
        self
    }

    /// Find the first relation between `a` and `b`.
    ///
    /// With `join_field`, relations that don't use that field on either side
    /// are skipped.
    pub fn find(&self, a: &str, b: &str, join_field: Option<&str>) -> Option<Relation> {
        let relations = self.relations.read().unwrap_or_else(PoisonError::into_inner);
        relations
            .iter()
            .filter(|rel| rel.connects(a, b))
            .find(|rel| join_field.is_none_or(|field| rel.has_field(field)))
            .cloned()
    }

    /// Snapshot of all relations in registration order.
    pub fn relations(&self) -> Vec<Relation> {
        self.relations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of registered relations.
    pub fn len(&self) -> usize {
        self.relations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no relation is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> RelationRegistry {
        let reg = RelationRegistry::new();
        reg.add("orders", "user_id", "users", "id")
            .add("orders", "reviewer_id", "users", "id")
            .add("items", "order_id", "orders", "id");
        reg
    }

    #[test]
    fn find_matches_either_orientation() {
        let reg = registry();
        let rel = reg.find("users", "orders", None).unwrap();
        assert_eq!(rel.field1, "user_id");
        let rel = reg.find("orders", "items", None).unwrap();
        assert_eq!(rel.table1, "items");
    }

    #[test]
    fn find_returns_first_registered() {
        let reg = registry();
        assert_eq!(reg.find("orders", "users", None).unwrap().field1, "user_id");
    }

    #[test]
    fn join_field_skips_non_matching_relations() {
        let reg = registry();
        let rel = reg.find("orders", "users", Some("reviewer_id")).unwrap();
        assert_eq!(rel.field1, "reviewer_id");
        assert!(reg.find("orders", "users", Some("missing")).is_none());
    }

    #[test]
    fn unrelated_tables() {
        let reg = registry();
        assert!(reg.find("items", "users", None).is_none());
        assert_eq!(reg.len(), 3);
        assert!(RelationRegistry::new().is_empty());
    }

    #[test]
    fn shared_across_threads() {
        let reg = Arc::new(RelationRegistry::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let reg = Arc::clone(&reg);
                std::thread::spawn(move || {
                    reg.add(format!("t{i}"), "id", "root", "t_id");
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(reg.len(), 4);
        assert!(reg.find("root", "t2", None).is_some());
    }
}
