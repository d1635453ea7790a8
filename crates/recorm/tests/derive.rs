#![allow(dead_code)]

use chrono::NaiveDate;
use recorm::{Entity, FieldDef, HookRegistry, Value};

#[derive(Debug, Default, Entity)]
struct BlogPost {
    id: i64,
    title: String,
}

#[derive(Debug, Default, Entity)]
#[orm(table = "people", connection = "reporting")]
struct Person {
    #[orm(id)]
    person_id: i32,
    #[orm(column = "full_name")]
    name: String,
    nickname: Option<String>,
    born: Option<chrono::NaiveDateTime>,
    #[orm(skip)]
    scratch: Vec<u8>,
}

#[derive(Debug, Default, Entity)]
#[orm(hooks = shout_hooks)]
struct Shout {
    id: i64,
    text: String,
}

fn shout_hooks(hooks: &mut HookRegistry<Shout>) {
    hooks.accessor("text", |_, v| Value::from(format!("{v}!")));
}

#[test]
fn table_defaults_to_lowercased_type_name() {
    let schema = BlogPost::schema();
    assert_eq!(schema.type_name(), "BlogPost");
    assert_eq!(schema.table(), "blogpost");
    assert_eq!(schema.connection(), "default");
    assert_eq!(schema.id_field(), "id");
}

#[test]
fn attributes_configure_the_schema() {
    let schema = Person::schema();
    assert_eq!(schema.table(), "people");
    assert_eq!(schema.connection(), "reporting");
    assert_eq!(schema.id_field(), "person_id");
    assert_eq!(
        schema.fields(),
        &[
            FieldDef::new("person_id", "person_id"),
            FieldDef::new("name", "full_name"),
            FieldDef::new("nickname", "nickname"),
            FieldDef::new("born", "born"),
        ]
    );
}

#[test]
fn fields_read_and_write_by_name() {
    let mut person = Person::default();
    let born = NaiveDate::from_ymd_opt(1990, 5, 17)
        .unwrap()
        .and_hms_opt(8, 30, 0)
        .unwrap();

    person.write_field("person_id", Value::Int(12)).unwrap();
    person.write_field("name", Value::from("Ann Lee")).unwrap();
    person.write_field("born", Value::Timestamp(born)).unwrap();

    assert_eq!(person.person_id, 12);
    assert_eq!(person.read_field("name"), Some(Value::from("Ann Lee")));
    assert_eq!(person.read_field("nickname"), Some(Value::Null));
    assert_eq!(person.read_field("born"), Some(Value::Timestamp(born)));
    assert_eq!(person.read_field("scratch"), None);
}

#[test]
fn writing_an_undeclared_field_fails() {
    let mut person = Person::default();
    assert!(person.write_field("scratch", Value::Null).unwrap_err().is_validation());
}

#[test]
fn out_of_range_integer_is_a_decode_error() {
    let mut person = Person::default();
    let err = person.write_field("person_id", Value::Int(i64::MAX)).unwrap_err();
    assert!(matches!(err, recorm::OrmError::Decode { .. }));
}

#[test]
fn hooks_path_is_registered() {
    let hooks = HookRegistry::<Shout>::for_type();
    let accessor = hooks.get_accessor("text").unwrap();
    assert_eq!(accessor(&Shout::default(), Value::from("hi")), Value::from("hi!"));
    assert!(hooks.get_mutator("text").is_none());
    assert!(HookRegistry::<BlogPost>::for_type().is_empty());
}
