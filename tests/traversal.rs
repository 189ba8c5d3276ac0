mod common;

use common::{graph, ok, DATASET};
use labgraph::{
    ChannelIn, ObjectId, Outcome, RegisteredChannelIn, RegisteredDataIn, ServiceGraph,
};
use serde_json::Value;

async fn channel_chain(g: &ServiceGraph) -> (String, String, String) {
    let channel = ok(g
        .channels()
        .save_channel(
            ChannelIn {
                channel_type: "ECG".to_owned(),
            },
            DATASET,
        )
        .await
        .unwrap());
    let registered_data = ok(g
        .registered_data()
        .save_registered_data(
            RegisteredDataIn {
                source: "chest strap".to_owned(),
                additional_properties: Vec::new(),
            },
            DATASET,
        )
        .await
        .unwrap());
    let registered_channel = ok(g
        .registered_channels()
        .save_registered_channel(
            RegisteredChannelIn {
                channel_id: Some(channel.id.clone()),
                registered_data_id: Some(registered_data.id.clone()),
            },
            DATASET,
        )
        .await
        .unwrap());
    (channel.id, registered_data.id, registered_channel.id)
}

#[tokio::test]
async fn depth_zero_returns_bare_document() {
    let g = graph();
    let (channel_id, _, _) = channel_chain(&g).await;

    let channel = ok(g
        .channels()
        .get_channel(&channel_id, DATASET, 0)
        .await
        .unwrap());
    assert_eq!(channel.channel_type, "ECG");
    assert!(channel.registered_channels.is_none());
}

#[tokio::test]
async fn depth_one_expands_direct_neighbours_only() {
    let g = graph();
    let (channel_id, registered_data_id, registered_channel_id) = channel_chain(&g).await;

    let registered_channel = ok(g
        .registered_channels()
        .get_registered_channel(&registered_channel_id, DATASET, 1)
        .await
        .unwrap());

    let channel = registered_channel.channel.as_ref().and_then(Value::as_object);
    assert_eq!(
        channel.and_then(|c| c.get("id")).and_then(Value::as_str),
        Some(channel_id.as_str())
    );
    // the neighbours were fetched with zero remaining depth
    assert!(channel.is_some_and(|c| !c.contains_key("registered_channels")));

    let registered_data = registered_channel
        .registered_data
        .as_ref()
        .and_then(Value::as_object);
    assert_eq!(
        registered_data
            .and_then(|d| d.get("id"))
            .and_then(Value::as_str),
        Some(registered_data_id.as_str())
    );
}

#[tokio::test]
async fn back_edge_is_not_followed() {
    let g = graph();
    let (channel_id, _, registered_channel_id) = channel_chain(&g).await;

    let channel = ok(g
        .channels()
        .get_channel(&channel_id, DATASET, 3)
        .await
        .unwrap());
    let registered_channels = channel
        .registered_channels
        .as_ref()
        .and_then(Value::as_array)
        .expect("registered channels hydrated");
    assert_eq!(registered_channels.len(), 1);

    let registered_channel = registered_channels[0].as_object().unwrap();
    assert_eq!(
        registered_channel.get("id").and_then(Value::as_str),
        Some(registered_channel_id.as_str())
    );
    // the edge back to the channel we came from is suppressed
    assert!(!registered_channel.contains_key("channel"));
    // the sideways edge still expands, and it too stops at its origin
    let registered_data = registered_channel
        .get("registered_data")
        .and_then(Value::as_object)
        .expect("registered data hydrated");
    assert!(!registered_data.contains_key("registered_channels"));
}

#[tokio::test]
async fn hydration_miss_is_absorbed() {
    let g = graph();
    let (channel_id, registered_data_id, registered_channel_id) = channel_chain(&g).await;

    ok(g.registered_data()
        .delete_registered_data(&registered_data_id, DATASET)
        .await
        .unwrap());

    let registered_channel = ok(g
        .registered_channels()
        .get_registered_channel(&registered_channel_id, DATASET, 1)
        .await
        .unwrap());
    // the dangling reference is simply left out
    assert!(registered_channel.registered_data.is_none());
    assert_eq!(
        registered_channel
            .channel
            .as_ref()
            .and_then(Value::as_object)
            .and_then(|c| c.get("id"))
            .and_then(Value::as_str),
        Some(channel_id.as_str())
    );
}

#[tokio::test]
async fn malformed_and_unknown_ids_miss() {
    let g = graph();
    channel_chain(&g).await;

    match g.channels().get_channel("zzz", DATASET, 0).await.unwrap() {
        Outcome::NotFound(nf) => assert_eq!(nf.errors, "not a valid document id"),
        other => panic!("expected not found, got {other:?}"),
    }

    let unknown = ObjectId::new().to_hex();
    match g.channels().get_channel(&unknown, DATASET, 0).await.unwrap() {
        Outcome::NotFound(nf) => assert_eq!(nf.errors, "document not found"),
        other => panic!("expected not found, got {other:?}"),
    }
}

#[tokio::test]
async fn dataset_isolation() {
    let g = graph();
    let (channel_id, _, _) = channel_chain(&g).await;

    let elsewhere = g
        .channels()
        .get_channel(&channel_id, "other", 0)
        .await
        .unwrap();
    assert!(!elsewhere.is_ok());
    assert_eq!(g.channels().get_channels("other").await.unwrap().len(), 0);
}
