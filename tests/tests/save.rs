use nestdoc::{doc, Query, Resource, Value};
use pretty_assertions::assert_eq;
use tests::{models, DbTest, DriverOp};

#[tokio::test]
async fn save_creates_new_resources_and_cleans_them() {
    let mut test = DbTest::new();
    let cx = test.adapter.connection_stack();

    let mut user = Resource::new(&models::user());
    user.assign(doc! { "name" => "a", "items" => vec![Value::from(doc! { "x" => 1 })] })
        .unwrap();

    assert!(test.adapter.save(&cx, &mut user).await.unwrap());
    assert!(matches!(test.log().pop(), Some(DriverOp::Insert { .. })));

    assert!(!user.is_new());
    assert!(!user.is_dirty());
    assert!(user.get("id").is_some_and(Value::is_id));

    let items = user.embedded_many("items").unwrap();
    assert!(items.iter().all(|item| !item.is_dirty()));
}

#[tokio::test]
async fn saving_a_clean_resource_writes_nothing() {
    let mut test = DbTest::new();
    let cx = test.adapter.connection_stack();

    let mut user = Resource::new(&models::user());
    user.set("name", "a").unwrap();
    test.adapter.save(&cx, &mut user).await.unwrap();
    test.log().clear();

    assert!(!test.adapter.save(&cx, &mut user).await.unwrap());
    assert!(test.log().is_empty());
}

#[tokio::test]
async fn nested_change_is_saved_through_the_parent() {
    let mut test = DbTest::new();
    let cx = test.adapter.connection_stack();

    let mut user = Resource::new(&models::user());
    user.assign(doc! {
        "name" => "a",
        "items" => vec![Value::from(doc! { "x" => 1 }), Value::from(doc! { "x" => 2 })],
    })
    .unwrap();
    test.adapter.save(&cx, &mut user).await.unwrap();
    test.log().clear();

    user.embedded_many("items").unwrap()[1].set("x", 5).unwrap();
    assert!(user.is_dirty());
    assert!(!user.is_dirty_self());

    assert!(test.adapter.save(&cx, &mut user).await.unwrap());

    let id = user.get("id").cloned().unwrap();
    assert_eq!(
        test.log().pop(),
        Some(DriverOp::Update {
            collection: "users".to_string(),
            filter: doc! { "_id" => id.clone() },
            document: doc! {
                "name" => "a",
                "items" => vec![
                    Value::from(doc! { "x" => 1i64 }),
                    Value::from(doc! { "x" => 5i64 }),
                ],
            },
        })
    );
    assert!(!user.is_dirty());

    // A fresh read sees the change
    let mut users = test
        .adapter
        .read(&cx, &Query::new(&models::user()))
        .await
        .unwrap();
    let items = users[0].embedded_many("items").unwrap();
    assert_eq!(items[1].get("x"), Some(&Value::I64(5)));
}

#[tokio::test]
async fn replacing_an_embedment_is_saved() {
    let mut test = DbTest::new();
    let cx = test.adapter.connection_stack();

    let mut user = Resource::new(&models::user());
    user.assign(doc! { "name" => "a", "phone" => doc! { "number" => "1" } })
        .unwrap();
    test.adapter.save(&cx, &mut user).await.unwrap();
    test.log().clear();

    user.embed("phone", Value::Null).unwrap();
    assert!(user.is_dirty_self());
    assert!(test.adapter.save(&cx, &mut user).await.unwrap());

    let Some(DriverOp::Update { document, .. }) = test.log().pop() else {
        panic!("expected an update");
    };
    assert_eq!(document, doc! { "name" => "a", "phone" => Value::Null });
    assert_eq!(test.store.documents("users")[0]["phone"], Value::Null);
}

#[tokio::test]
async fn failed_save_stays_dirty() {
    let test = DbTest::new();
    let cx = test.adapter.connection_stack();
    test.store.inject(tests::Fault::Write);

    let mut user = Resource::new(&models::user());
    user.set("name", "a").unwrap();

    assert!(test.adapter.save(&cx, &mut user).await.is_err());
    assert!(user.is_new());
    assert!(user.is_dirty());
}
