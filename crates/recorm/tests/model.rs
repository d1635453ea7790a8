mod common;

use common::{FakeHandle, FakeMetadata, connection, connection_with, user_metadata};
use recorm::{
    CoercionPolicy, ConnectionConfig, Entity, HookRegistry, Model, OrmError, Row, TaskKind, Value,
    WriteOutcome,
};

#[derive(Debug, Default, Entity)]
struct User {
    id: Option<i64>,
    name: String,
}

#[derive(Debug, Default, Entity)]
#[orm(table = "accounts", hooks = account_hooks)]
struct Account {
    id: i64,
    name: String,
    email: String,
    #[orm(skip)]
    cache: Option<String>,
}

fn account_hooks(hooks: &mut HookRegistry<Account>) {
    hooks
        .accessor("name", |_, value| match value {
            Value::Text(s) => Value::Text(s.to_uppercase()),
            other => other,
        })
        .mutator("email", |account, value| {
            let email = value.as_str().unwrap_or_default().trim().to_lowercase();
            if !email.contains('@') {
                return Err(OrmError::validation(format!("invalid email {email:?}")));
            }
            account.email = email;
            Ok(())
        });
}

#[derive(Debug, Default, Entity)]
#[orm(table = "stats")]
struct Stat {
    id: Option<i64>,
    score: String,
}

fn accounts_metadata() -> FakeMetadata {
    FakeMetadata::new().table(
        "accounts",
        &[
            ("id", "bigint"),
            ("name", "text"),
            ("created_at", "timestamp with time zone"),
            ("score", "integer"),
        ],
    )
}

fn user(id: Option<i64>, name: &str) -> User {
    User {
        id,
        name: name.to_string(),
    }
}

#[test]
fn save_without_id_inserts() {
    let handle = FakeHandle::new();
    let mut model = Model::on(connection(&handle, user_metadata()), user(None, "Ann"));

    assert!(model.save().unwrap());
    assert_eq!(handle.kinds(), vec![TaskKind::Insert]);
    assert_eq!(
        handle.sql(),
        vec!["INSERT INTO user (name) VALUES ($1) RETURNING id".to_string()]
    );
}

#[test]
fn save_with_id_updates() {
    let handle = FakeHandle::new();
    let mut model = Model::on(connection(&handle, user_metadata()), user(Some(5), "Bo"));

    assert!(model.save().unwrap());
    assert_eq!(handle.kinds(), vec![TaskKind::Update]);
    assert_eq!(
        handle.sql(),
        vec!["UPDATE user SET id = $1, name = $2 WHERE id = $3".to_string()]
    );
}

#[test]
fn zero_id_counts_as_unset() {
    let handle = FakeHandle::new();
    let mut model = Model::on(
        connection(&handle, accounts_metadata()),
        Account::default(),
    );

    model.save().unwrap();
    assert_eq!(handle.kinds(), vec![TaskKind::Insert]);
}

#[test]
fn insert_records_generated_id_without_assigning_it() {
    let handle = FakeHandle::new();
    handle.push_write(WriteOutcome::inserted(41i64));
    let mut model = Model::on(connection(&handle, user_metadata()), user(None, "Ann"));

    assert!(model.save().unwrap());
    assert_eq!(model.generated_id(), Some(&Value::Int(41)));
    assert_eq!(model.id(), Value::Null);
    assert_eq!(model.id, None);
}

#[test]
fn insert_without_generated_id_is_false() {
    let handle = FakeHandle::new();
    handle.push_write(WriteOutcome::affected(1));
    let mut model = Model::on(connection(&handle, user_metadata()), user(None, "Ann"));

    assert!(!model.save().unwrap());
    assert!(model.generated_id().is_none());
}

#[test]
fn insert_keeps_an_explicit_id() {
    let handle = FakeHandle::new();
    let mut model = Model::on(connection(&handle, user_metadata()), user(Some(9), "Cy"));
    let data = model.columns_data().unwrap();

    model.insert(data).unwrap();
    assert_eq!(
        handle.sql(),
        vec!["INSERT INTO user (id, name) VALUES ($1, $2) RETURNING id".to_string()]
    );
}

#[test]
fn update_affecting_nothing_is_false() {
    let handle = FakeHandle::new();
    handle.push_write(WriteOutcome::affected(0));
    let mut model = Model::on(connection(&handle, user_metadata()), user(Some(5), "Bo"));

    assert!(!model.save().unwrap());
}

#[test]
fn delete_without_id_is_a_silent_success() {
    let handle = FakeHandle::new();
    let mut model = Model::on(connection(&handle, user_metadata()), user(None, "Ann"));

    assert!(model.delete().unwrap());
    assert!(handle.executed().is_empty());
    assert!(model.query().task().is_none());
}

#[test]
fn delete_with_id() {
    let handle = FakeHandle::new();
    handle.push_write(WriteOutcome::affected(1));
    handle.push_write(WriteOutcome::affected(0));
    let mut model = Model::on(connection(&handle, user_metadata()), user(Some(3), "Di"));

    assert!(model.delete().unwrap());
    assert!(!model.delete().unwrap());
    assert_eq!(handle.sql()[0], "DELETE FROM user WHERE id = $1");
    assert_eq!(model.query().task().map(|t| t.kind()), Some(TaskKind::Delete));
}

#[test]
fn write_replaces_the_pending_task() {
    let handle = FakeHandle::new();
    let mut model = Model::on(connection(&handle, user_metadata()), user(None, "Ann"));

    model.save().unwrap();
    assert_eq!(model.query().task().map(|t| t.kind()), Some(TaskKind::Insert));
}

#[test]
fn accessor_transforms_reads() {
    let handle = FakeHandle::new();
    let mut model = Model::on(connection(&handle, accounts_metadata()), Account::default());

    model.set("name", "ann").unwrap();
    assert_eq!(model.get("name"), Value::from("ANN"));
    assert_eq!(model.name, "ann");
}

#[test]
fn mutator_owns_writes() {
    let handle = FakeHandle::new();
    let mut model = Model::on(connection(&handle, accounts_metadata()), Account::default());

    model.set("email", "  Ann@Example.COM ").unwrap();
    assert_eq!(model.get("email"), Value::from("ann@example.com"));

    let err = model.set("email", "nope").unwrap_err();
    assert!(err.is_validation());
    assert_eq!(model.email, "ann@example.com");
}

#[test]
fn plain_and_dynamic_attributes_round_trip() {
    let handle = FakeHandle::new();
    let mut model = Model::on(connection(&handle, user_metadata()), User::default());

    model.set("name", "Cy").unwrap();
    assert_eq!(model.get("name"), Value::from("Cy"));

    model.set("nickname", "C").unwrap();
    assert_eq!(model.get("nickname"), Value::from("C"));
    assert_eq!(model.get("missing"), Value::Null);
}

#[test]
fn wrong_type_for_a_declared_field_is_a_decode_error() {
    let handle = FakeHandle::new();
    let mut model = Model::on(connection(&handle, user_metadata()), User::default());

    let err = model.set("name", 5).unwrap_err();
    assert!(matches!(err, OrmError::Decode { ref column, .. } if column == "name"));
}

#[test]
fn columns_data_follows_described_columns() {
    let handle = FakeHandle::new();
    let mut model = Model::on(
        connection(&handle, accounts_metadata()),
        Account {
            id: 4,
            name: "Ann".into(),
            email: "ann@example.com".into(),
            cache: Some("ignored".into()),
        },
    );
    model.set("score", 10).unwrap();

    let data = model.columns_data().unwrap();
    let keys: Vec<&str> = data.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys, vec!["id", "name", "created_at", "score"]);
    assert_eq!(
        data,
        vec![
            ("id".to_string(), Value::Int(4)),
            ("name".to_string(), Value::from("Ann")),
            ("created_at".to_string(), Value::Null),
            ("score".to_string(), Value::Int(10)),
        ]
    );
}

#[test]
fn metadata_failure_aborts_save() {
    let handle = FakeHandle::new();
    let mut model = Model::on(connection(&handle, FakeMetadata::new()), user(None, "Ann"));

    let err = model.save().unwrap_err();
    assert!(err.is_metadata());
    assert!(handle.executed().is_empty());
}

#[test]
fn columns_are_described_once_per_table() {
    let handle = FakeHandle::new();
    let metadata = user_metadata();
    let conn = connection(&handle, metadata.clone());

    Model::on(conn.clone(), user(None, "Ann")).save().unwrap();
    Model::on(conn.clone(), user(Some(1), "Ann")).save().unwrap();
    assert_eq!(metadata.calls(), 1);

    conn.schema_cache().invalidate("user");
    Model::on(conn, user(Some(1), "Ann")).save().unwrap();
    assert_eq!(metadata.calls(), 2);
}

#[test]
fn values_are_preserved_by_default() {
    let handle = FakeHandle::new();
    let metadata = FakeMetadata::new().table("stats", &[("id", "bigint"), ("score", "integer")]);
    let model = Model::on(
        connection(&handle, metadata),
        Stat {
            id: None,
            score: "42".into(),
        },
    );

    assert_eq!(model.columns_data().unwrap()[1].1, Value::from("42"));
}

#[test]
fn coercion_converts_to_declared_types() {
    let handle = FakeHandle::new();
    let metadata = FakeMetadata::new().table("stats", &[("id", "bigint"), ("score", "integer")]);
    let conn = connection_with(
        &handle,
        metadata,
        ConnectionConfig::new().coercion(CoercionPolicy::Coerce),
    );

    let mut model = Model::on(conn.clone(), Stat { id: None, score: "42".into() });
    assert_eq!(model.columns_data().unwrap()[1].1, Value::Int(42));
    model.save().unwrap();
    let built = handle.last_task().unwrap().build(recorm::Placeholder::Dollar).unwrap();
    assert_eq!(built.params, vec![Value::Int(42)]);

    let model = Model::on(conn, Stat { id: None, score: "many".into() });
    assert!(model.columns_data().unwrap_err().is_validation());
}

#[test]
fn hydration_maps_columns_and_keeps_unknown_ones() {
    let handle = FakeHandle::new();
    handle.push_rows(vec![Row::new().with("id", 1i64).with("name", "Ann").with("rank", 3i64)]);
    let conn = connection(&handle, user_metadata());

    let model = recorm::QueryBuilder::<User>::on(conn)
        .select_all()
        .first()
        .unwrap()
        .unwrap();

    assert_eq!(model.name, "Ann");
    assert_eq!(model.get("rank"), Value::Int(3));
    assert_eq!(model.attributes().len(), 1);
}

#[test]
fn hydration_type_mismatch_names_the_column() {
    let handle = FakeHandle::new();
    handle.push_rows(vec![Row::new().with("id", 1i64).with("name", 5i64)]);
    let conn = connection(&handle, user_metadata());

    let err = recorm::QueryBuilder::<User>::on(conn)
        .select_all()
        .first()
        .unwrap_err();
    assert!(matches!(err, OrmError::Decode { ref column, .. } if column == "name"));
}
