//! Exercises `PgStore` against a real database.
//!
//! Run with `DATABASE_URL` pointing at a disposable Postgres instance:
//! `cargo test --test postgres_store -- --ignored`

use chrono::Utc;
use dotenv::dotenv;
use kanban_board::error::AppError;
use kanban_board::models::{NewTask, NewUser, Role};
use kanban_board::store::{PgStore, Store};
use pretty_assertions::assert_eq;

async fn connect() -> PgStore {
    dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    let store = PgStore::connect(&database_url)
        .await
        .expect("Failed to connect to test DB");
    store.migrate().await.expect("Failed to run migrations");
    store
}

fn unique_email(prefix: &str) -> String {
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    format!("{}_{}@example.com", prefix, nanos)
}

fn member(email: &str) -> NewUser {
    NewUser {
        full_name: "Pg Tester".into(),
        email: email.into(),
        password_hash: "not-a-real-hash".into(),
        role: Role::Member,
    }
}

#[actix_rt::test]
#[ignore = "requires DATABASE_URL"]
async fn test_user_lifecycle() {
    let store = connect().await;
    let email = unique_email("lifecycle");

    let user = store.create_user(member(&email)).await.unwrap();
    assert_eq!(user.role, Role::Member);
    assert!(matches!(
        store.create_user(member(&email)).await,
        Err(AppError::DatabaseError(_))
    ));

    let renamed = store
        .update_user(user.id, Some("Renamed"), None)
        .await
        .unwrap();
    assert_eq!(renamed.full_name, "Renamed");
    assert_eq!(renamed.email, email);
    assert!(renamed.updated_at >= user.updated_at);

    let found = store.find_user_by_email(&email).await.unwrap().unwrap();
    assert_eq!(found.id, user.id);

    assert!(store.delete_user(user.id).await.unwrap());
    assert!(!store.delete_user(user.id).await.unwrap());
    assert!(store.find_user_by_email(&email).await.unwrap().is_none());
}

#[actix_rt::test]
#[ignore = "requires DATABASE_URL"]
async fn test_task_and_category_contract() {
    let store = connect().await;
    let owner = store
        .create_user(member(&unique_email("owner")))
        .await
        .unwrap();
    let todo = store.create_category("Todo").await.unwrap();
    let done = store.create_category("Done").await.unwrap();

    let task = store
        .create_task(NewTask {
            title: "Persist me".into(),
            description: String::new(),
            user_id: owner.id,
            category_id: todo.id,
        })
        .await
        .unwrap();
    assert!(!task.status);
    assert_eq!(store.count_tasks_for_user(owner.id).await.unwrap(), 1);

    let task = store.set_task_status(task.id, true).await.unwrap();
    assert!(task.status);
    let task = store.set_task_category(task.id, done.id).await.unwrap();
    assert_eq!(task.category_id, done.id);
    let task = store
        .update_task_details(task.id, None, Some("Now with words"))
        .await
        .unwrap();
    assert_eq!(task.title, "Persist me");
    assert_eq!(task.description, "Now with words");

    let owned = store.list_tasks_with_owner(owner.id).await.unwrap();
    assert_eq!(owned.len(), 1);
    assert_eq!(owned[0].owner.email, owner.email);

    // A category that still holds tasks cannot be removed on its own.
    assert!(store.delete_category(done.id).await.is_err());
    assert_eq!(store.delete_tasks_by_category(done.id).await.unwrap(), 1);
    assert!(store.delete_category(done.id).await.unwrap());
    assert!(store.find_category(done.id).await.unwrap().is_none());

    assert!(store.update_category(todo.id, "Doing").await.unwrap().is_some());
    assert!(store.delete_category(todo.id).await.unwrap());
    assert!(store.delete_user(owner.id).await.unwrap());
}

#[actix_rt::test]
#[ignore = "requires DATABASE_URL"]
async fn test_deleting_user_cascades_to_tasks() {
    let store = connect().await;
    let owner = store
        .create_user(member(&unique_email("cascade")))
        .await
        .unwrap();
    let category = store.create_category("Cascade").await.unwrap();
    let task = store
        .create_task(NewTask {
            title: "Goes away".into(),
            description: String::new(),
            user_id: owner.id,
            category_id: category.id,
        })
        .await
        .unwrap();

    assert!(store.delete_user(owner.id).await.unwrap());
    assert!(store.find_task(task.id).await.unwrap().is_none());
    assert!(store.delete_category(category.id).await.unwrap());
}
