mod common;

use serde_json::json;
use testcontainers::clients::Cli;

use demo_generator::store::{NewFileUpload, NewProject, ProjectChanges, StoreError};

fn project(name: &str) -> NewProject {
    NewProject {
        name: name.to_string(),
        description: None,
    }
}

#[tokio::test]
async fn test_schema_is_idempotent() {
    let docker = Cli::default();
    let container = docker.run(common::create_postgres_container());
    let store = common::connect_store(container.get_host_port_ipv4(common::POSTGRES_PORT)).await;

    // A restarted server applies it again
    store.apply_schema().await.expect("Second schema pass failed");
}

#[tokio::test]
async fn test_duplicate_username_conflicts() {
    let docker = Cli::default();
    let container = docker.run(common::create_postgres_container());
    let store = common::connect_store(container.get_host_port_ipv4(common::POSTGRES_PORT)).await;

    let user = store.create_user("alice", "hash", false).await.unwrap();
    assert!(user.is_active);
    assert!(!user.is_admin);

    let err = store.create_user("alice", "other", false).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));

    assert!(store.insert_admin_if_missing("root", "hash").await.unwrap());
    assert!(!store.insert_admin_if_missing("root", "hash").await.unwrap());
    let root = store.find_user_by_username("root").await.unwrap().unwrap();
    assert!(root.is_admin);
    assert!(store.find_user_by_username("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn test_generate_license_replaces_previous() {
    let docker = Cli::default();
    let container = docker.run(common::create_postgres_container());
    let store = common::connect_store(container.get_host_port_ipv4(common::POSTGRES_PORT)).await;

    let user = store.create_user("bob", "hash", false).await.unwrap();
    let first = store.generate_license("bob", 5, 30).await.unwrap();
    let second = store.generate_license("bob", 2, 7).await.unwrap();

    assert_ne!(first.license.license_key, second.license.license_key);
    assert_eq!(second.license.license_key.len(), 16);
    assert_eq!(second.username, "bob");

    let active = store.find_active_license(user.id).await.unwrap().unwrap();
    assert_eq!(active.id, second.license.id);
    assert_eq!(active.max_calls, 2);
    assert_eq!(active.used_calls, 0);

    let all = store.list_licenses().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].license.id, second.license.id);
    assert!(!all[1].license.is_active);

    let err = store.generate_license("ghost", 5, 30).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn test_consume_call_stops_at_quota() {
    let docker = Cli::default();
    let container = docker.run(common::create_postgres_container());
    let store = common::connect_store(container.get_host_port_ipv4(common::POSTGRES_PORT)).await;

    store.create_user("carol", "hash", false).await.unwrap();
    let record = store.generate_license("carol", 2, 30).await.unwrap();
    let id = record.license.id;

    assert!(store.consume_call(id).await.unwrap());
    assert!(store.consume_call(id).await.unwrap());
    assert!(!store.consume_call(id).await.unwrap());

    let license = store
        .find_active_license(record.license.user_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(license.used_calls, 2);
    assert!(license.is_exhausted());
}

#[tokio::test]
async fn test_consume_call_refuses_expired_license() {
    let docker = Cli::default();
    let container = docker.run(common::create_postgres_container());
    let store = common::connect_store(container.get_host_port_ipv4(common::POSTGRES_PORT)).await;

    store.create_user("cora", "hash", false).await.unwrap();
    let record = store.generate_license("cora", 5, -1).await.unwrap();

    assert!(!store.consume_call(record.license.id).await.unwrap());

    let license = store
        .find_active_license(record.license.user_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(license.used_calls, 0);
    assert!(license.is_expired(chrono::Utc::now()));
}

#[tokio::test]
async fn test_concurrent_calls_never_exceed_quota() {
    let docker = Cli::default();
    let container = docker.run(common::create_postgres_container());
    let store = common::connect_store(container.get_host_port_ipv4(common::POSTGRES_PORT)).await;

    store.create_user("dave", "hash", false).await.unwrap();
    let id = store.generate_license("dave", 3, 30).await.unwrap().license.id;

    let attempts: Vec<_> = (0..10)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.consume_call(id).await.unwrap() })
        })
        .collect();

    let mut granted = 0;
    for attempt in attempts {
        if attempt.await.unwrap() {
            granted += 1;
        }
    }
    assert_eq!(granted, 3);
}

#[tokio::test]
async fn test_project_crud_is_owner_scoped() {
    let docker = Cli::default();
    let container = docker.run(common::create_postgres_container());
    let store = common::connect_store(container.get_host_port_ipv4(common::POSTGRES_PORT)).await;

    let owner = store.create_user("erin", "hash", false).await.unwrap();
    let other = store.create_user("frank", "hash", false).await.unwrap();

    let created = store.create_project(owner.id, &project("Todo app")).await.unwrap();
    assert_eq!(created.user_id, Some(owner.id));
    assert!(created.requirements_doc.is_none());

    let err = store.get_project(other.id, created.id).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));

    let changes = ProjectChanges {
        requirements_doc: Some("# Requirements".to_string()),
        ..ProjectChanges::default()
    };
    let updated = store
        .update_project(owner.id, created.id, &changes)
        .await
        .unwrap();
    assert_eq!(updated.name, "Todo app");
    assert_eq!(updated.requirements_doc.as_deref(), Some("# Requirements"));
    assert!(updated.updated_at >= created.updated_at);

    // Absent fields keep their values
    let renamed = store
        .update_project(
            owner.id,
            created.id,
            &ProjectChanges {
                name: Some("Tasks".to_string()),
                ..ProjectChanges::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.requirements_doc.as_deref(), Some("# Requirements"));

    assert!(store
        .update_project(other.id, created.id, &changes)
        .await
        .is_err());
    assert!(store.delete_project(other.id, created.id).await.is_err());

    store.delete_project(owner.id, created.id).await.unwrap();
    let err = store.delete_project(owner.id, created.id).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn test_list_projects_newest_first_with_paging() {
    let docker = Cli::default();
    let container = docker.run(common::create_postgres_container());
    let store = common::connect_store(container.get_host_port_ipv4(common::POSTGRES_PORT)).await;

    let user = store.create_user("gina", "hash", false).await.unwrap();
    let a = store.create_project(user.id, &project("A")).await.unwrap();
    let b = store.create_project(user.id, &project("B")).await.unwrap();
    let c = store.create_project(user.id, &project("C")).await.unwrap();

    // Touching A moves it to the front
    store
        .update_project(
            user.id,
            a.id,
            &ProjectChanges {
                tech_doc: Some("tech".to_string()),
                ..ProjectChanges::default()
            },
        )
        .await
        .unwrap();

    let ids: Vec<i64> = store
        .list_projects(user.id, 0, 100)
        .await
        .unwrap()
        .iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(ids, vec![a.id, c.id, b.id]);

    let page = store.list_projects(user.id, 1, 1).await.unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].id, c.id);

    let stranger = store.create_user("hank", "hash", false).await.unwrap();
    assert!(store.list_projects(stranger.id, 0, 100).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_publish_keeps_share_token() {
    let docker = Cli::default();
    let container = docker.run(common::create_postgres_container());
    let store = common::connect_store(container.get_host_port_ipv4(common::POSTGRES_PORT)).await;

    let user = store.create_user("ivy", "hash", false).await.unwrap();
    let created = store.create_project(user.id, &project("Shop")).await.unwrap();

    let token = store.publish_project(user.id, created.id).await.unwrap();
    let again = store.publish_project(user.id, created.id).await.unwrap();
    assert_eq!(token, again);

    let shared = store.find_by_share_token(&token).await.unwrap();
    assert_eq!(shared.id, created.id);

    let err = store.find_by_share_token("missing").await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn test_demo_data_upsert_and_cascade() {
    let docker = Cli::default();
    let container = docker.run(common::create_postgres_container());
    let store = common::connect_store(container.get_host_port_ipv4(common::POSTGRES_PORT)).await;

    assert_eq!(store.first_project_id().await.unwrap(), None);

    let user = store.create_user("jack", "hash", false).await.unwrap();
    let created = store.create_project(user.id, &project("Board")).await.unwrap();
    assert_eq!(store.first_project_id().await.unwrap(), Some(created.id));

    assert!(store.get_demo_data(created.id, "tasks").await.unwrap().is_none());

    store
        .put_demo_data(created.id, "tasks", &json!([{ "title": "one" }]))
        .await
        .unwrap();
    store
        .put_demo_data(created.id, "tasks", &json!([{ "title": "two" }]))
        .await
        .unwrap();

    let data = store.get_demo_data(created.id, "tasks").await.unwrap().unwrap();
    assert_eq!(data.data_content, json!([{ "title": "two" }]));

    assert_eq!(store.clear_demo_data(created.id, "tasks").await.unwrap(), 1);
    assert_eq!(store.clear_demo_data(created.id, "tasks").await.unwrap(), 0);

    store
        .put_demo_data(created.id, "users", &json!({ "count": 1 }))
        .await
        .unwrap();
    store.delete_project(user.id, created.id).await.unwrap();
    assert!(store.get_demo_data(created.id, "users").await.unwrap().is_none());

    // Writes for a project that does not exist are rejected
    let err = store
        .put_demo_data(created.id, "users", &json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::ValidationError(_)));
}

#[tokio::test]
async fn test_file_metadata_listing() {
    let docker = Cli::default();
    let container = docker.run(common::create_postgres_container());
    let store = common::connect_store(container.get_host_port_ipv4(common::POSTGRES_PORT)).await;

    let user = store.create_user("kate", "hash", false).await.unwrap();
    let created = store.create_project(user.id, &project("Docs")).await.unwrap();

    let first = store
        .insert_file(&NewFileUpload {
            filename: "spec.pdf".to_string(),
            file_path: "/tmp/uploads/1_spec.pdf".to_string(),
            file_type: "application/pdf".to_string(),
            user_id: user.id,
            project_id: Some(created.id),
        })
        .await
        .unwrap();
    store
        .insert_file(&NewFileUpload {
            filename: "notes.txt".to_string(),
            file_path: "/tmp/uploads/2_notes.txt".to_string(),
            file_type: "text/plain".to_string(),
            user_id: user.id,
            project_id: Some(created.id),
        })
        .await
        .unwrap();
    store
        .insert_file(&NewFileUpload {
            filename: "loose.txt".to_string(),
            file_path: "/tmp/uploads/3_loose.txt".to_string(),
            file_type: "text/plain".to_string(),
            user_id: user.id,
            project_id: None,
        })
        .await
        .unwrap();

    let listed = store.list_project_files(user.id, created.id).await.unwrap();
    let names: Vec<&str> = listed.iter().map(|f| f.filename.as_str()).collect();
    assert_eq!(names, vec!["spec.pdf", "notes.txt"]);

    let fetched = store.get_file(first.id).await.unwrap();
    assert_eq!(fetched.file_type, "application/pdf");

    let err = store.get_file(first.id + 100).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));

    let err = store
        .insert_file(&NewFileUpload {
            filename: "orphan.txt".to_string(),
            file_path: "/tmp/uploads/4_orphan.txt".to_string(),
            file_type: "text/plain".to_string(),
            user_id: user.id,
            project_id: Some(created.id + 100),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::ValidationError(_)));
}
