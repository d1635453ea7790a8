//! Rendering tests for the statement layer.

use crate::statement::{Combination, Expr, ExprGroup, Placeholder, StatementBuilder, Task, TaskKind};
use crate::value::Value;

fn sql() -> StatementBuilder {
    StatementBuilder::new("user")
}

#[test]
fn select_all() {
    let task = Task::from(sql().select());
    assert_eq!(task.kind(), TaskKind::Select);
    assert_eq!(task.build_sql(), "SELECT * FROM user");
}

#[test]
fn select_with_conditions_order_and_limit() {
    let task = Task::from(
        sql()
            .select()
            .eq("status", "active")
            .and_expr(Expr::gt("age", 18))
            .order_by("id DESC")
            .limit(10)
            .offset(20),
    );
    let built = task.build(Placeholder::Dollar).unwrap();
    assert_eq!(
        built.sql,
        "SELECT * FROM user WHERE status = $1 AND age > $2 ORDER BY id DESC LIMIT 10 OFFSET 20"
    );
    assert_eq!(built.params, vec![Value::from("active"), Value::Int(18)]);
}

#[test]
fn select_where_group_or() {
    let mut select = sql().select();
    select.where_group_mut().set_combination(Combination::Or);
    select.where_group_mut().eq("name", "Ann").eq("name", "Bob");
    let task = Task::from(select);
    assert_eq!(task.build_sql(), "SELECT * FROM user WHERE name = $1 OR name = $2");
}

#[test]
fn insert_with_generated_key() {
    let task = Task::from(
        sql()
            .insert()
            .values([("name", Value::from("Ann")), ("age", Value::Int(3))])
            .generated_key("id"),
    );
    assert_eq!(
        task.build_sql(),
        "INSERT INTO user (name, age) VALUES ($1, $2) RETURNING id"
    );
}

#[test]
fn insert_question_dialect_skips_returning() {
    let task = Task::from(sql().insert().set("name", "Ann").generated_key("id"));
    let built = task.build(Placeholder::Question).unwrap();
    assert_eq!(built.sql, "INSERT INTO user (name) VALUES (?)");
}

#[test]
fn insert_without_columns_uses_defaults() {
    let task = Task::from(sql().insert());
    assert_eq!(task.build_sql(), "INSERT INTO user DEFAULT VALUES");
}

#[test]
fn update_shares_numbering_between_set_and_where() {
    let task = Task::from(
        sql()
            .update()
            .set_all([("name", Value::from("Ann")), ("age", Value::Int(4))])
            .eq("id", 7i64),
    );
    let built = task.build(Placeholder::Dollar).unwrap();
    assert_eq!(built.sql, "UPDATE user SET name = $1, age = $2 WHERE id = $3");
    assert_eq!(built.params.len(), 3);
}

#[test]
fn update_requires_set() {
    let task = Task::from(sql().update().eq("id", 1i64));
    let err = task.build(Placeholder::Dollar).unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn delete_by_id() {
    let task = Task::from(sql().delete().eq("id", 1i64));
    assert_eq!(task.build_sql(), "DELETE FROM user WHERE id = $1");
}

#[test]
fn delete_without_where_is_a_noop() {
    let task = Task::from(sql().delete());
    assert_eq!(task.build_sql(), "DELETE FROM user WHERE 1=0");
    let task = Task::from(sql().delete().allow_delete_all(true));
    assert_eq!(task.build_sql(), "DELETE FROM user");
}

#[test]
fn question_dialect_placeholders() {
    let builder = StatementBuilder::with_placeholder("user", Placeholder::Question);
    let task = Task::from(builder.update().set("name", "Ann").eq("id", 1i64));
    let built = task.build(builder.placeholder()).unwrap();
    assert_eq!(built.sql, "UPDATE user SET name = ? WHERE id = ?");
}

#[test]
fn owned_where_group_chains_equality() {
    let mut group = ExprGroup::new();
    group.eq("name", "Ann").ne("role", "guest");
    let mut select = sql().select();
    *select.where_group_mut() = group;
    let built = Task::from(select).build(Placeholder::Dollar).unwrap();
    assert_eq!(built.sql, "SELECT * FROM user WHERE name = $1 AND role != $2");
    assert_eq!(built.params, vec![Value::from("Ann"), Value::from("guest")]);
}
