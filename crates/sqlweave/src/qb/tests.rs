//! Integration tests for the qb module.

use crate::config::QbConfig;
use crate::dialect::{AnsiDialect, Database, Dialect, Escaped, MySqlDialect};
use crate::error::{WeaveError, WeaveResult};
use crate::qb::{JoinType, Schema, StatementKind, TableRef};
use crate::value::Value;
use std::sync::Mutex;

fn shop() -> Schema {
    let schema = Schema::default();
    schema
        .relate("orders", "user_id", "users", "id")
        .relate("items", "order_id", "orders", "id")
        .relate("items", "product_id", "products", "id");
    schema
}

/// Records every statement it is asked to run.
#[derive(Default)]
struct RecordingDb {
    statements: Mutex<Vec<String>>,
}

impl Dialect for RecordingDb {
    fn qualify(&self, ident: &str) -> String {
        AnsiDialect.qualify(ident)
    }

    fn escape(&self, value: &Value) -> Escaped {
        AnsiDialect.escape(value)
    }
}

impl Database for RecordingDb {
    type Output = usize;

    fn query(&self, sql: &str) -> WeaveResult<usize> {
        let mut statements = self.statements.lock().unwrap();
        statements.push(sql.to_string());
        Ok(statements.len())
    }
}

// ==================== SELECT & joins ====================

#[test]
fn test_select_all_defaults_to_star() {
    let sql = shop().table("users").select_all().to_sql();
    assert_eq!(sql, "SELECT * FROM users AS users");
}

#[test]
fn test_join_chain_infers_each_on_clause() {
    let sql = shop()
        .table("users")
        .select(["users.name", "products.title"])
        .join("orders")
        .join("items")
        .join("products")
        .to_sql();

    assert_eq!(
        sql,
        "SELECT users.name, products.title FROM users AS users \
         JOIN orders AS orders ON orders.user_id = users.id \
         JOIN items AS items ON items.order_id = orders.id \
         JOIN products AS products ON items.product_id = products.id"
    );
    assert_eq!(sql.matches("JOIN").count(), 3);
}

#[test]
fn test_join_type_prefix() {
    let sql = shop()
        .table("users")
        .select_all()
        .join(TableRef::new("orders").join_type(JoinType::Left))
        .inner_join("items")
        .to_sql();

    assert!(sql.contains("LEFT JOIN orders AS orders ON orders.user_id = users.id"));
    assert!(sql.contains("INNER JOIN items AS items ON items.order_id = orders.id"));
}

#[test]
fn test_join_searches_all_earlier_tables() {
    // items relates to orders (index 1), not to users (index 0)
    let sql = shop()
        .table("users")
        .select_all()
        .join("orders")
        .join("items")
        .to_sql();
    assert!(sql.ends_with("JOIN items AS items ON items.order_id = orders.id"));
}

#[test]
fn test_first_matching_earlier_table_wins() {
    let schema = shop();
    schema.relate("items", "user_id", "users", "id");
    let sql = schema
        .table("users")
        .select_all()
        .join("orders")
        .join("items")
        .to_sql();
    // users comes first in the table list, so its relation is used
    assert!(sql.ends_with("JOIN items AS items ON items.user_id = users.id"));
}

#[test]
fn test_join_field_selects_relation() {
    let schema = Schema::default();
    schema
        .relate("tickets", "author_id", "people", "id")
        .relate("tickets", "assignee_id", "people", "id");

    let by_default = schema.table("tickets").select_all().join("people").to_sql();
    assert!(by_default.ends_with("ON tickets.author_id = people.id"));

    let by_field = schema
        .table("tickets")
        .select_all()
        .join(TableRef::new("people").via("assignee_id"))
        .to_sql();
    assert!(by_field.ends_with("ON tickets.assignee_id = people.id"));
}

#[test]
fn test_self_join_aliases() {
    let schema = Schema::default();
    schema.relate("employees", "manager_id", "employees", "id");

    let sql = schema
        .table("employees")
        .select(["employees.name", "employees#2.name"])
        .left_join("employees")
        .to_sql();

    assert_eq!(
        sql,
        r#"SELECT employees.name, "employees#2".name FROM employees AS employees LEFT JOIN employees AS "employees#2" ON "employees#2".manager_id = employees.id"#
    );
}

#[test]
fn test_repeated_table_uses_latest_alias() {
    let schema = shop();
    let sql = schema
        .table("orders")
        .select_all()
        .join("users")
        .join("orders")
        .to_sql();

    assert!(sql.contains("JOIN users AS users ON orders.user_id = users.id"));
    assert!(sql.contains(r#"JOIN orders AS "orders#2" ON "orders#2".user_id = users.id"#));
}

#[test]
fn test_third_occurrence_alias() {
    let schema = Schema::default();
    schema.relate("nodes", "parent_id", "nodes", "id");
    let sql = schema
        .table("nodes")
        .select_all()
        .join("nodes")
        .join("nodes")
        .to_sql();
    assert!(sql.contains(r#"JOIN nodes AS "nodes#3" ON "nodes#3".parent_id = nodes.id"#));
}

#[test]
fn test_missing_relation_renders_cross_join() {
    let sql = shop().table("users").select_all().join("products").to_sql();
    assert_eq!(sql, "SELECT * FROM users AS users JOIN products AS products");
}

#[test]
fn test_strict_joins_reject_missing_relation() {
    let schema = shop().with_config(QbConfig::new().strict_joins(true));
    let query = schema.table("users").select_all().join("products");

    let err = query.validate().unwrap_err();
    assert!(err.is_missing_relation());
    assert!(matches!(err, WeaveError::MissingRelation { ref table, .. } if table == "products"));

    let db = RecordingDb::default();
    assert!(query.execute(&db).is_err());
    assert!(db.statements.lock().unwrap().is_empty());
}

#[test]
fn test_lenient_joins_still_execute() {
    let db = RecordingDb::default();
    let query = shop().table("users").select_all().join("products");
    assert!(query.validate().is_ok());
    assert_eq!(query.execute(&db).unwrap(), 1);
}

#[test]
fn test_render_is_idempotent() {
    let query = shop()
        .table("orders")
        .select_all()
        .join("users")
        .join("orders")
        .where_raw("users.id = 1");
    let first = query.to_sql();
    assert_eq!(first, query.to_sql());
    assert_eq!(first, query.to_string());
}

#[test]
fn test_registries_are_isolated() {
    let a = Schema::default();
    let b = Schema::default();
    a.relate("x", "y_id", "y", "id");

    assert!(a.table("x").select_all().join("y").to_sql().contains(" ON "));
    assert!(!b.table("x").select_all().join("y").to_sql().contains(" ON "));
}

// ==================== Clauses ====================

#[test]
fn test_select_clause_order() {
    let sql = shop()
        .table("orders")
        .select_all()
        .field_fmt("COUNT(%f)", ["orders.id"])
        .where_fmt("%f = %s", ["orders.status", "paid"])
        .group("orders.user_id")
        .having_fmt("COUNT(%f) > %n", ["orders.id", "5"])
        .order("orders.user_id DESC")
        .offset(20)
        .limit(10)
        .to_sql();

    assert_eq!(
        sql,
        "SELECT COUNT(orders.id) FROM orders AS orders \
         WHERE orders.status = 'paid' \
         GROUP BY orders.user_id \
         HAVING COUNT(orders.id) > 5 \
         ORDER BY orders.user_id DESC \
         LIMIT 10 OFFSET 20"
    );
}

#[test]
fn test_having_is_separate_from_where() {
    let sql = shop()
        .table("orders")
        .select_all()
        .having_raw("SUM(total) > 100")
        .to_sql();
    assert!(!sql.contains("WHERE"));
    assert!(sql.ends_with("HAVING SUM(total) > 100"));
}

#[test]
fn test_order_fmt_and_multiple_orders() {
    let sql = shop()
        .table("users")
        .select_all()
        .order_fmt("%f ASC", ["users.name"])
        .order("users.id DESC")
        .to_sql();
    assert!(sql.ends_with("ORDER BY users.name ASC, users.id DESC"));
}

#[test]
fn test_where_template_unknown_directive_is_literal() {
    let sql = shop()
        .table("users")
        .select_all()
        .where_fmt("name LIKE 'a%%' AND %q", Vec::<Value>::new())
        .to_sql();
    assert!(sql.ends_with("WHERE name LIKE 'a%' AND q"));
}

#[test]
fn test_template_missing_argument_fails_validation() {
    let query = shop()
        .table("users")
        .select_all()
        .where_fmt("%f = %s", ["users.id"]);

    assert!(query.to_sql().ends_with("WHERE users.id = NULL"));
    let err = query.validate().unwrap_err();
    assert!(matches!(err, WeaveError::Template(_)));

    let db = RecordingDb::default();
    assert!(query.execute(&db).is_err());
}

// ==================== INSERT / UPDATE / DELETE ====================

#[test]
fn test_insert_keeps_pair_order() {
    let sql = shop().table("t").insert([("a", 1), ("b", 2)]).to_sql();
    assert_eq!(sql, "INSERT INTO t (a, b) VALUES (1, 2)");

    let sql = shop().table("t").insert([("b", 2), ("a", 1)]).to_sql();
    assert_eq!(sql, "INSERT INTO t (b, a) VALUES (2, 1)");
}

#[test]
fn test_insert_escapes_values() {
    let sql = shop()
        .table("people")
        .insert([
            ("name", Value::from("O'Brien")),
            ("nickname", Value::Null),
            ("active", Value::from(true)),
        ])
        .to_sql();
    assert_eq!(
        sql,
        "INSERT INTO people (name, nickname, active) VALUES ('O''Brien', NULL, TRUE)"
    );
}

#[test]
fn test_insert_raw_value() {
    let sql = shop()
        .table("events")
        .insert([("kind", "login")])
        .field("created_at")
        .value_raw("NOW()")
        .to_sql();
    assert_eq!(
        sql,
        "INSERT INTO events (kind, created_at) VALUES ('login', NOW())"
    );
}

#[test]
fn test_insert_json_preserves_key_order() {
    let object = serde_json::json!({ "zeta": 1, "alpha": "x", "tags": ["a"] });
    let sql = shop().table("t").insert_json(&object).unwrap().to_sql();
    assert_eq!(
        sql,
        r#"INSERT INTO t (zeta, alpha, tags) VALUES (1, 'x', '["a"]')"#
    );
}

#[test]
fn test_insert_json_rejects_non_objects() {
    let err = shop().table("t").insert_json(&serde_json::json!([1])).unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn test_update_pairs_fields_and_values() {
    let sql = shop()
        .table("users")
        .update([("name", Value::from("ann")), ("age", Value::from(30))])
        .where_fmt("%f = %n", [Value::from("id"), Value::from(7)])
        .order("id")
        .limit(1)
        .to_sql();
    assert_eq!(
        sql,
        "UPDATE users SET name='ann', age=30 WHERE id = 7 ORDER BY id LIMIT 1"
    );
}

#[test]
fn test_update_json() {
    let sql = shop()
        .table("users")
        .update_json(&serde_json::json!({ "score": 1.5 }))
        .unwrap()
        .to_sql();
    assert_eq!(sql, "UPDATE users SET score=1.5");
}

#[test]
fn test_field_value_mismatch_fails_validation() {
    let query = shop().table("users").update([("name", "x")]).field("age");
    let err = query.validate().unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn test_delete() {
    let sql = shop()
        .table("sessions")
        .delete()
        .where_fmt("%f < %s", ["expires_at", "2024-01-01"])
        .limit(100)
        .to_sql();
    assert_eq!(
        sql,
        "DELETE FROM sessions WHERE expires_at < '2024-01-01' LIMIT 100"
    );
    assert_eq!(shop().table("x").remove().to_sql(), "DELETE FROM x");
}

#[test]
fn test_statement_kinds() {
    let table = shop().table("t");
    assert_eq!(table.select_all().kind(), StatementKind::Select);
    assert_eq!(table.insert([("a", 1)]).kind(), StatementKind::Insert);
    assert_eq!(table.update([("a", 1)]).kind(), StatementKind::Update);
    assert_eq!(table.delete().kind(), StatementKind::Delete);
    assert_eq!(table.select_all().tables()[0].name, "t");
}

#[test]
fn test_schema_query_without_anchor() {
    let schema = shop();
    let sql = schema
        .query(StatementKind::Select)
        .table("users")
        .join("orders")
        .to_sql();
    assert!(sql.contains("ON orders.user_id = users.id"));
}

// ==================== Dialects & execution ====================

#[test]
fn test_mysql_dialect_rendering() {
    let schema = Schema::new(MySqlDialect);
    schema.relate("t", "parent_id", "t", "id");
    let sql = schema
        .table("t")
        .select_all()
        .join("t")
        .where_fmt("%f = %s", ["t.name", r"a\b"])
        .to_sql();
    assert_eq!(
        sql,
        r"SELECT * FROM t AS t JOIN t AS `t#2` ON `t#2`.parent_id = t.id WHERE t.name = 'a\\b'"
    );
}

#[test]
fn test_execute_forwards_rendered_sql() {
    let db = RecordingDb::default();
    let query = shop().table("t").insert([("a", 1)]);

    assert_eq!(query.execute(&db).unwrap(), 1);
    assert_eq!(query.execute(&db).unwrap(), 2);
    assert_eq!(
        *db.statements.lock().unwrap(),
        vec!["INSERT INTO t (a) VALUES (1)", "INSERT INTO t (a) VALUES (1)"]
    );
}
