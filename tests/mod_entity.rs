use bson::doc;
use repolite::Repository;
use repolite::driver::TransformOptions;
use repolite::errors::RepoError;
use repolite::options::{Configure, OptionsPatch, Serialization};
use repolite::test_support::MemStore;

fn seeded_store() -> std::sync::Arc<MemStore> {
    MemStore::new(vec![
        doc! {"_id": "507f191e810c19729de860ea", "name": "alice", "email": "alice@example.com", "role": "admin"},
        doc! {"_id": "607f191e810c19729de860eb", "name": "bob", "email": "bob@example.com", "role": "user"},
    ])
}

#[tokio::test]
async fn lookup_returns_live_handle_by_default() {
    let store = seeded_store();
    let repo = Repository::new(store);

    let found = repo.find_one(doc! {"name": "alice"}).exec().await.unwrap();
    let item = found.unwrap();
    // The transform is opt-in for single-entity lookups.
    assert!(!item.is_plain());
    assert_eq!(item.as_live().unwrap().data.get_str("email").unwrap(), "alice@example.com");
}

#[tokio::test]
async fn transform_with_options_yields_plain_document() {
    let store = seeded_store();
    let repo = Repository::new(store);

    let mut query = repo.find_one(doc! {"name": "alice"});
    query.options(OptionsPatch {
        serialization: Some(Serialization::TransformWith(TransformOptions::default())),
        ..OptionsPatch::default()
    });
    let item = query.exec().await.unwrap().unwrap();
    assert!(item.is_plain());
    assert_eq!(item.as_document().unwrap().get_str("name").unwrap(), "alice");
}

#[tokio::test]
async fn find_by_id_applies_selection() {
    let store = seeded_store();
    let repo = Repository::new(store);

    let mut query = repo.find_by_id("507f191e810c19729de860ea");
    query.select(["name"]);
    let item = query.exec().await.unwrap().unwrap();
    let data = &item.as_live().unwrap().data;
    assert_eq!(data.get_str("name").unwrap(), "alice");
    assert!(data.get("email").is_none());
}

#[tokio::test]
async fn miss_is_none_raw_and_404_envelope() {
    let store = seeded_store();
    let repo = Repository::new(store);

    let mut query = repo.find_one(doc! {"name": "nobody"});
    assert!(query.exec().await.unwrap().is_none());

    let result = query.data_result().await;
    assert_eq!(result.status, 404);
    assert_eq!(result.message, "Not Found");
    assert_eq!(result.errors[0].code, "not_found");
    assert_eq!(result.errors[0].text, "Resource not found");

    // The envelope carries an explicit null, not an omitted field.
    let json = serde_json::to_value(&result).unwrap();
    assert!(json.as_object().unwrap().contains_key("data"));
    assert_eq!(json["data"], serde_json::Value::Null);
}

#[tokio::test]
async fn configuration_failure_propagates() {
    let store = seeded_store();
    store.fail_select("select rejected");
    let repo = Repository::new(store);

    let mut query = repo.find_one(doc! {"name": "alice"});
    query.select("name");
    let err = query.exec().await.unwrap_err();
    assert!(err.is_config_apply());
}

#[tokio::test]
async fn driver_failure_wraps_as_server_envelope() {
    let store = seeded_store();
    store.fail_exec("socket closed");
    let repo = Repository::new(store);

    let mut query = repo.find_one(doc! {"name": "alice"});
    let err = query.exec().await.unwrap_err();
    assert!(matches!(err, RepoError::Driver(_)));

    let result = query.data_result().await;
    assert_eq!(result.status, 500);
    assert_eq!(result.errors[0].code, "server");
    assert!(result.errors[0].text.contains("socket closed"));
}
