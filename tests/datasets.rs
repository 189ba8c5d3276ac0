mod common;

use common::{graph, ok};
use labgraph::DatasetIn;
use serde_json::Value;

#[tokio::test]
async fn dataset_records_live_in_the_metadata_database() {
    let g = graph();
    let created = ok(g
        .datasets()
        .save_dataset(DatasetIn {
            name: "pilot".to_owned(),
        })
        .await
        .unwrap());
    assert_eq!(created.name, "pilot");

    let fetched = ok(g.datasets().get_dataset(&created.id).await.unwrap());
    assert_eq!(fetched.id, created.id);

    let listed = g.datasets().get_datasets().await.unwrap();
    assert_eq!(
        listed
            .iter()
            .filter_map(|d| d.get("name"))
            .filter_map(Value::as_str)
            .collect::<Vec<_>>(),
        vec!["pilot"]
    );

    ok(g.datasets().delete_dataset(&created.id).await.unwrap());
    assert!(!g.datasets().get_dataset(&created.id).await.unwrap().is_ok());
}

#[tokio::test]
async fn preparing_a_dataset_twice_is_harmless() {
    let g = graph();
    ok(g.datasets()
        .save_dataset(DatasetIn {
            name: "pilot".to_owned(),
        })
        .await
        .unwrap());
    // a second dataset record with the same name prepares the same database
    ok(g.datasets()
        .save_dataset(DatasetIn {
            name: "pilot".to_owned(),
        })
        .await
        .unwrap());
    assert_eq!(g.datasets().get_datasets().await.unwrap().len(), 2);
}
