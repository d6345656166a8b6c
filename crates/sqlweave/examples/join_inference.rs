//! Join inference example for sqlweave
//!
//! Run with: cargo run --example join_inference -p sqlweave

use sqlweave::{
    AnsiDialect, Database, Dialect, Escaped, JoinType, QbConfig, Schema, TableRef, Value,
    WeaveResult,
};

/// Prints every statement instead of running it.
struct Printer;

impl Dialect for Printer {
    fn qualify(&self, ident: &str) -> String {
        AnsiDialect.qualify(ident)
    }

    fn escape(&self, value: &Value) -> Escaped {
        AnsiDialect.escape(value)
    }
}

impl Database for Printer {
    type Output = ();

    fn query(&self, sql: &str) -> WeaveResult<()> {
        println!("  {sql}");
        Ok(())
    }
}

fn main() -> WeaveResult<()> {
    let schema = Schema::default().with_config(QbConfig::new().strict_joins(true));
    schema
        .relate("orders", "customer_id", "customers", "id")
        .relate("order_lines", "order_id", "orders", "id")
        .relate("order_lines", "product_id", "products", "id")
        .relate("employees", "manager_id", "employees", "id");

    // ============================================
    // Chained joins
    // ============================================
    println!("=== Chained joins ===");
    schema
        .table("customers")
        .select(["customers.name", "products.title"])
        .join("orders")
        .join("order_lines")
        .join("products")
        .where_fmt("%f = %s", ["customers.country", "NZ"])
        .order("customers.name")
        .execute(&Printer)?;

    // ============================================
    // Self join
    // ============================================
    println!("=== Self join ===");
    schema
        .table("employees")
        .select(["employees.name", "employees#2.name"])
        .join(TableRef::new("employees").join_type(JoinType::Left))
        .execute(&Printer)?;

    // ============================================
    // Writes
    // ============================================
    println!("=== Writes ===");
    let customers = schema.table("customers");
    customers
        .insert([("name", Value::from("O'Brien")), ("country", Value::from("IE"))])
        .execute(&Printer)?;
    customers
        .update([("country", "NZ")])
        .where_fmt("%f = %n", [Value::from("id"), Value::from(7)])
        .execute(&Printer)?;
    customers
        .delete()
        .where_raw("country IS NULL")
        .execute(&Printer)?;

    // ============================================
    // Missing relation
    // ============================================
    println!("=== Missing relation ===");
    match schema.table("customers").select_all().join("warehouses").execute(&Printer) {
        Ok(()) => println!("  unexpected success"),
        Err(err) => println!("  rejected: {err}"),
    }

    Ok(())
}
