use nestdoc::{doc, Id, Resource, Value};
use pretty_assertions::assert_eq;
use tests::{assert_err, assert_err_is, models, DbTest, DriverOp};

fn stored_post(test: &DbTest) -> Resource {
    let document = doc! { "_id" => 7i64, "title" => "t", "views" => 1i64 };
    test.store.seed("posts", document.clone());
    Resource::load(&models::post(), document).unwrap()
}

#[tokio::test]
async fn update_merges_attributes_over_the_resource() {
    let mut test = DbTest::new();
    let cx = test.adapter.connection_stack();
    let post = stored_post(&test);

    let updated = test
        .adapter
        .update(&cx, &doc! { "views" => 2 }, std::slice::from_ref(&post))
        .await
        .unwrap();
    assert_eq!(updated, 1);

    assert_eq!(
        test.log().pop(),
        Some(DriverOp::Update {
            collection: "posts".to_string(),
            filter: doc! { "_id" => 7i64 },
            document: doc! { "title" => "t", "views" => 2i64 },
        })
    );
    assert!(test.log().is_empty());

    assert_eq!(
        test.store.documents("posts"),
        [doc! { "_id" => 7i64, "title" => "t", "views" => 2i64 }]
    );
}

#[tokio::test]
async fn update_keeps_unloaded_embedments() {
    let mut test = DbTest::new();
    let cx = test.adapter.connection_stack();

    let stored = doc! {
        "_id" => Id::new("u1"),
        "name" => "a",
        "items" => vec![Value::from(doc! { "x" => 1i64 })],
    };
    test.store.seed("users", stored);

    let mut user = Resource::load(
        &models::user(),
        test.store.documents("users").remove(0),
    )
    .unwrap();
    user.set("name", "b").unwrap();

    test.adapter
        .update(&cx, &doc! {}, std::slice::from_ref(&user))
        .await
        .unwrap();

    let Some(DriverOp::Update { filter, document, .. }) = test.log().pop() else {
        panic!("expected an update");
    };
    assert_eq!(filter, doc! { "_id" => Id::new("u1") });
    assert_eq!(document, doc! { "name" => "b" });

    assert_eq!(
        test.store.documents("users"),
        [doc! {
            "_id" => Id::new("u1"),
            "name" => "b",
            "items" => vec![Value::from(doc! { "x" => 1i64 })],
        }]
    );
}

#[tokio::test]
async fn update_by_composite_key() {
    let mut test = DbTest::new();
    let cx = test.adapter.connection_stack();

    let stored = doc! { "org" => "acme", "member" => "bob", "role" => "user" };
    test.store.seed("memberships", stored.clone());
    let membership = Resource::load(&models::membership(), stored).unwrap();

    test.adapter
        .update(&cx, &doc! { "role" => "admin" }, std::slice::from_ref(&membership))
        .await
        .unwrap();

    let Some(DriverOp::Update { filter, .. }) = test.log().pop() else {
        panic!("expected an update");
    };
    assert_eq!(filter, doc! { "org" => "acme", "member" => "bob" });
    assert_eq!(test.store.documents("memberships")[0]["role"], Value::from("admin"));
}

#[tokio::test]
async fn update_rejects_unknown_attributes() {
    let mut test = DbTest::new();
    let cx = test.adapter.connection_stack();
    let post = stored_post(&test);

    assert_err_is!(
        test.adapter
            .update(&cx, &doc! { "likes" => 3 }, std::slice::from_ref(&post))
            .await,
        is_unknown_property
    );
    assert!(test.log().is_empty());
    assert_eq!(cx.depth(), 0);
    assert_eq!(test.log().closes(), 1);
}

#[tokio::test]
async fn update_without_key_is_missing_key() {
    let mut test = DbTest::new();
    let cx = test.adapter.connection_stack();

    let mut post = Resource::new(&models::post());
    post.set("title", "t").unwrap();

    let err = assert_err_is!(
        test.adapter
            .update(&cx, &doc! {}, std::slice::from_ref(&post))
            .await,
        is_missing_key
    );
    assert_eq!(
        err.to_string(),
        "resource of model `Post` has no value for key field `id`"
    );
    assert!(test.log().is_empty());
}

#[tokio::test]
async fn delete_removes_by_key() {
    let mut test = DbTest::new();
    let cx = test.adapter.connection_stack();
    let post = stored_post(&test);

    let deleted = test
        .adapter
        .delete(&cx, std::slice::from_ref(&post))
        .await
        .unwrap();
    assert_eq!(deleted, 1);

    assert_eq!(
        test.log().pop(),
        Some(DriverOp::Remove {
            collection: "posts".to_string(),
            filter: doc! { "_id" => 7i64 },
        })
    );
    assert!(test.store.documents("posts").is_empty());
}

#[tokio::test]
async fn delete_without_key_writes_nothing() {
    let mut test = DbTest::new();
    let cx = test.adapter.connection_stack();
    stored_post(&test);

    assert_err!(
        test.adapter
            .delete(&cx, &[Resource::new(&models::post())])
            .await
    );
    assert!(test.log().is_empty());
    assert_eq!(test.store.documents("posts").len(), 1);
}
