use nestdoc::{Query, Resource};
use std::time::Duration;
use tests::{assert_err, assert_err_is, models, DbTest, Fault};

fn named_user(name: &str) -> Resource {
    let mut user = Resource::new(&models::user());
    user.set("name", name).unwrap();
    user
}

#[tokio::test]
async fn nested_acquires_share_one_connection() {
    let mut test = DbTest::new();
    let cx = test.adapter.connection_stack();

    for _ in 0..3 {
        test.adapter.acquire(&cx).await.unwrap();
    }
    assert_eq!(cx.depth(), 3);
    assert_eq!(test.log().connects(), 1);

    test.adapter.release(&cx).await.unwrap();
    test.adapter.release(&cx).await.unwrap();
    assert_eq!(cx.depth(), 1);
    assert_eq!(test.log().closes(), 0);

    test.adapter.release(&cx).await.unwrap();
    assert!(cx.is_empty());
    assert_eq!(test.log().closes(), 1);
}

#[tokio::test]
async fn operations_inside_a_frame_reuse_its_connection() {
    let mut test = DbTest::new();
    let cx = test.adapter.connection_stack();
    let query = Query::new(&models::user());

    test.adapter.acquire(&cx).await.unwrap();

    let mut users = vec![named_user("a")];
    test.adapter.create(&cx, &mut users).await.unwrap();
    let users = test.adapter.read(&cx, &query).await.unwrap();
    test.adapter.delete(&cx, &users).await.unwrap();

    assert_eq!(cx.depth(), 1);
    assert_eq!(test.log().connects(), 1);
    assert_eq!(test.log().closes(), 0);

    test.adapter.release(&cx).await.unwrap();
    assert_eq!(test.log().closes(), 1);
}

#[tokio::test]
async fn operations_without_a_frame_connect_each_time() {
    let mut test = DbTest::new();
    let cx = test.adapter.connection_stack();

    let mut users = vec![named_user("a")];
    test.adapter.create(&cx, &mut users).await.unwrap();
    test.adapter
        .read(&cx, &Query::new(&models::user()))
        .await
        .unwrap();

    assert_eq!(test.log().connects(), 2);
    assert_eq!(test.log().closes(), 2);
    assert!(cx.is_empty());
}

#[tokio::test]
async fn failure_inside_a_frame_keeps_the_outer_connection() {
    let mut test = DbTest::new();
    let cx = test.adapter.connection_stack();

    test.adapter.acquire(&cx).await.unwrap();
    test.store.inject(Fault::Write);

    let mut users = vec![named_user("a")];
    assert_err_is!(test.adapter.create(&cx, &mut users).await, is_driver);
    assert_eq!(cx.depth(), 1);
    assert_eq!(test.log().closes(), 0);

    // The connection is still usable
    test.store.clear_faults();
    test.adapter.create(&cx, &mut users).await.unwrap();
    assert_eq!(test.log().connects(), 1);

    test.adapter.release(&cx).await.unwrap();
    assert_eq!(test.log().closes(), 1);
}

#[tokio::test]
async fn failure_at_the_bottom_closes_the_connection() {
    let mut test = DbTest::new();
    let cx = test.adapter.connection_stack();
    test.store.inject(Fault::Write);

    let mut users = vec![named_user("a")];
    assert_err_is!(test.adapter.create(&cx, &mut users).await, is_driver);

    assert!(cx.is_empty());
    assert_eq!(test.log().connects(), 1);
    assert_eq!(test.log().closes(), 1);
}

#[tokio::test]
async fn connect_failure_leaves_the_stack_empty() {
    let mut test = DbTest::new();
    let cx = test.adapter.connection_stack();
    test.store.inject(Fault::Connect);

    let mut users = vec![named_user("a")];
    assert_err_is!(test.adapter.create(&cx, &mut users).await, is_connection);

    assert!(cx.is_empty());
    assert_eq!(test.log().connects(), 0);
    assert_eq!(test.log().closes(), 0);
    assert!(test.log().is_empty());
}

#[tokio::test]
async fn collection_failure_releases_the_frame() {
    let mut test = DbTest::new();
    let cx = test.adapter.connection_stack();
    test.store.inject(Fault::Collection("users".to_string()));

    let err = assert_err_is!(
        test.adapter
            .read(&cx, &Query::new(&models::user()))
            .await,
        is_driver
    );
    assert_eq!(err.to_string(), "injected failure opening collection `users`");

    assert!(cx.is_empty());
    assert_eq!(test.log().closes(), 1);
}

#[tokio::test]
async fn close_failure_is_returned_after_the_write() {
    let mut test = DbTest::new();
    let cx = test.adapter.connection_stack();
    test.store.inject(Fault::Close);

    let mut users = vec![named_user("a")];
    assert_err_is!(test.adapter.create(&cx, &mut users).await, is_connection);

    assert!(cx.is_empty());
    assert_eq!(test.log().closes(), 1);
    assert_eq!(test.store.documents("users").len(), 1);
}

#[tokio::test]
async fn operation_error_wins_over_close_error() {
    let test = DbTest::new();
    let cx = test.adapter.connection_stack();
    test.store.inject(Fault::Write);
    test.store.inject(Fault::Close);

    let mut users = vec![named_user("a")];
    assert_err_is!(test.adapter.create(&cx, &mut users).await, is_driver);
    assert!(cx.is_empty());
}

#[tokio::test]
async fn stack_cannot_be_used_with_another_adapter() {
    let mut test = DbTest::new();
    let other = DbTest::new();
    let cx = other.adapter.connection_stack();

    let mut users = vec![named_user("a")];
    let err = assert_err!(test.adapter.create(&cx, &mut users).await);
    assert_eq!(
        err.to_string(),
        "connection stack used with an adapter that did not create it"
    );

    assert!(cx.is_empty());
    assert_eq!(test.log().connects(), 0);
}

#[tokio::test]
async fn clones_share_the_adapter_instance() {
    let mut test = DbTest::new();
    let adapter = test.adapter.clone();
    let cx = test.adapter.connection_stack();

    adapter.acquire(&cx).await.unwrap();
    test.adapter.acquire(&cx).await.unwrap();
    assert_eq!(test.log().connects(), 1);

    adapter.release(&cx).await.unwrap();
    test.adapter.release(&cx).await.unwrap();
    assert_eq!(test.log().closes(), 1);
}

#[tokio::test]
async fn releasing_an_empty_stack_is_an_error() {
    let mut test = DbTest::new();
    let cx = test.adapter.connection_stack();

    assert_err!(test.adapter.release(&cx).await);
    assert_eq!(test.log().closes(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn each_execution_context_gets_its_own_connection() {
    let mut test = DbTest::new();

    let tasks: Vec<_> = (0..2)
        .map(|_| {
            let adapter = test.adapter.clone();
            tokio::spawn(async move {
                let cx = adapter.connection_stack();
                adapter.acquire(&cx).await.unwrap();
                adapter.acquire(&cx).await.unwrap();
                tokio::task::yield_now().await;
                adapter.release(&cx).await.unwrap();
                adapter.release(&cx).await.unwrap();
            })
        })
        .collect();

    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(test.log().connects(), 2);
    assert_eq!(test.log().closes(), 2);
}

#[tokio::test]
async fn concurrent_operations_on_one_stack_share_a_connection() {
    let mut test = DbTest::new();
    let cx = test.adapter.connection_stack();

    let mut first = vec![named_user("a")];
    let mut second = vec![named_user("b")];
    let (first, second) = tokio::join!(
        test.adapter.create(&cx, &mut first),
        test.adapter.create(&cx, &mut second),
    );
    first.unwrap();
    second.unwrap();

    assert!(cx.is_empty());
    assert_eq!(test.log().connects(), 1);
    assert_eq!(test.log().closes(), 1);
    assert_eq!(test.store.documents("users").len(), 2);
}

#[tokio::test]
async fn concurrent_acquires_inside_a_frame_share_a_connection() {
    let mut test = DbTest::new();
    let cx = test.adapter.connection_stack();

    let (first, second) = tokio::join!(test.adapter.acquire(&cx), test.adapter.acquire(&cx));
    first.unwrap();
    second.unwrap();
    assert_eq!(cx.depth(), 2);
    assert_eq!(test.log().connects(), 1);

    test.adapter.release(&cx).await.unwrap();
    test.adapter.release(&cx).await.unwrap();
    assert_eq!(test.log().closes(), 1);
}

async fn wait_for_closes(test: &mut DbTest, closes: usize) {
    for _ in 0..10 {
        if test.log().closes() == closes {
            return;
        }
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn cancelled_operation_releases_its_frame() {
    let mut test = DbTest::new();
    let cx = test.adapter.connection_stack();
    test.store.inject(Fault::StallInsert);

    let mut users = vec![named_user("a")];
    let timed_out = tokio::time::timeout(
        Duration::from_millis(20),
        test.adapter.create(&cx, &mut users),
    )
    .await;
    assert!(timed_out.is_err());

    assert!(cx.is_empty());
    wait_for_closes(&mut test, 1).await;
    assert_eq!(test.log().connects(), 1);
    assert_eq!(test.log().closes(), 1);
}

#[tokio::test]
async fn cancelled_operation_inside_a_frame_keeps_the_outer_connection() {
    let mut test = DbTest::new();
    let cx = test.adapter.connection_stack();
    test.adapter.acquire(&cx).await.unwrap();
    test.store.inject(Fault::StallInsert);

    let mut users = vec![named_user("a")];
    let timed_out = tokio::time::timeout(
        Duration::from_millis(20),
        test.adapter.create(&cx, &mut users),
    )
    .await;
    assert!(timed_out.is_err());
    assert_eq!(cx.depth(), 1);

    test.store.clear_faults();
    test.adapter.create(&cx, &mut users).await.unwrap();
    assert_eq!(test.log().connects(), 1);
    assert_eq!(test.log().closes(), 0);

    test.adapter.release(&cx).await.unwrap();
    assert_eq!(test.log().closes(), 1);
}
