mod common;

use common::{graph, ok, DATASET};
use labgraph::{
    ActivityExecutionIn, ActivityIn, AdditionalProperty, ExperimentIn, MeasureIn, MeasureNameIn,
    ObservableInformationIn, ParticipantIn, ParticipantStateIn, ParticipationIn, RecordingIn,
    ScenarioIn, ServiceGraph, SignalIn, SignalValue, TimeSeriesIn, TimeSeriesPropertyIn,
    TimeSeriesRelationIn, TimeSeriesType,
};
use serde_json::{json, Value};

fn signal(timestamp: i64, value: Value) -> SignalIn {
    SignalIn {
        timestamp: Some(timestamp),
        start_timestamp: None,
        end_timestamp: None,
        signal_value: SignalValue {
            value,
            additional_properties: Vec::new(),
        },
    }
}

fn series_in(oi_id: &str, measure_id: &str, signals: Vec<SignalIn>) -> TimeSeriesIn {
    TimeSeriesIn {
        series_type: TimeSeriesType::Timestamp,
        measure_id: Some(measure_id.to_owned()),
        observable_information_ids: vec![oi_id.to_owned()],
        observable_information_id: None,
        signal_values: signals,
        additional_properties: Vec::new(),
    }
}

/// Everything a series hangs off: experiment -> scenario -> execution ->
/// participation -> recording -> observable information, plus a measure.
struct Fixture {
    g: ServiceGraph,
    experiment_id: String,
    recording_id: String,
    oi_id: String,
    measure_id: String,
}

async fn fixture(participant_name: &str) -> Fixture {
    let g = graph();
    let experiment = ok(g
        .experiments()
        .save_experiment(
            ExperimentIn {
                experiment_name: "emotion study".to_owned(),
                additional_properties: Vec::new(),
            },
            DATASET,
        )
        .await
        .unwrap());
    let activity = ok(g
        .activities()
        .save_activity(
            ActivityIn {
                activity: "individual".to_owned(),
                additional_properties: Vec::new(),
            },
            DATASET,
        )
        .await
        .unwrap());
    let execution = ok(g
        .activity_executions()
        .save_activity_execution(
            ActivityExecutionIn {
                activity_id: Some(activity.id.clone()),
                arrangement_id: None,
                additional_properties: Vec::new(),
            },
            DATASET,
        )
        .await
        .unwrap());
    ok(g.scenarios()
        .save_scenario(
            ScenarioIn {
                experiment_id: Some(experiment.id.clone()),
                activity_executions: Vec::new(),
            },
            DATASET,
        )
        .await
        .unwrap());
    ok(g.scenarios()
        .put_after(&experiment.id, &execution.id, DATASET)
        .await
        .unwrap());

    let participant = ok(g
        .participants()
        .save_participant(
            ParticipantIn {
                name: participant_name.to_owned(),
                date_of_birth: None,
                sex: None,
                disorder: None,
                additional_properties: Vec::new(),
            },
            DATASET,
        )
        .await
        .unwrap());
    let state = ok(g
        .participant_states()
        .save_participant_state(
            ParticipantStateIn {
                participant_id: Some(participant.id.clone()),
                age: Some(30),
                personality_ids: Vec::new(),
                appearance_ids: Vec::new(),
                additional_properties: Vec::new(),
            },
            DATASET,
        )
        .await
        .unwrap());
    let participation = ok(g
        .participations()
        .save_participation(
            ParticipationIn {
                activity_execution_id: Some(execution.id.clone()),
                participant_state_id: Some(state.id.clone()),
            },
            DATASET,
        )
        .await
        .unwrap());
    let recording = ok(g
        .recordings()
        .save_recording(
            RecordingIn {
                participation_id: Some(participation.id.clone()),
                registered_channel_id: None,
                additional_properties: Vec::new(),
            },
            DATASET,
        )
        .await
        .unwrap());
    let oi = ok(g
        .observable_informations()
        .save_observable_information(
            ObservableInformationIn {
                recording_id: Some(recording.id.clone()),
                modality_id: None,
                life_activity_id: None,
            },
            DATASET,
        )
        .await
        .unwrap());
    let measure_name = ok(g
        .measure_names()
        .save_measure_name(
            MeasureNameIn {
                name: "heart rate".to_owned(),
                measure_type: "continuous".to_owned(),
            },
            DATASET,
        )
        .await
        .unwrap());
    let measure = ok(g
        .measures()
        .save_measure(
            MeasureIn {
                measure_name_id: Some(measure_name.id.clone()),
                datatype: "float".to_owned(),
                range: None,
                unit: Some("bpm".to_owned()),
                additional_properties: Vec::new(),
            },
            DATASET,
        )
        .await
        .unwrap());

    Fixture {
        g,
        experiment_id: experiment.id,
        recording_id: recording.id,
        oi_id: oi.id,
        measure_id: measure.id,
    }
}

#[tokio::test]
async fn series_round_trips_with_coerced_values() {
    let f = fixture("Alice").await;
    let saved = ok(f
        .g
        .time_series()
        .save_time_series(
            series_in(
                &f.oi_id,
                &f.measure_id,
                vec![
                    signal(100, json!(5)),
                    signal(200, json!(10)),
                    signal(300, json!("15")),
                ],
            ),
            DATASET,
        )
        .await
        .unwrap());

    let fetched = ok(f
        .g
        .time_series()
        .get_time_series(&saved.id, DATASET, 0, None, None)
        .await
        .unwrap());
    assert_eq!(fetched.signal_values.len(), 3);
    assert_eq!(fetched.signal_values[0].timestamp, Some(100));
    // numeric strings are stored as numbers
    assert_eq!(fetched.signal_values[2].signal_value.value, json!(15));
    assert_eq!(fetched.observable_information_ids, vec![f.oi_id.clone()]);
}

#[tokio::test]
async fn value_range_trims_signals_but_keeps_the_series() {
    let f = fixture("Alice").await;
    let saved = ok(f
        .g
        .time_series()
        .save_time_series(
            series_in(
                &f.oi_id,
                &f.measure_id,
                vec![
                    signal(100, json!(5)),
                    signal(200, json!(10)),
                    signal(300, json!(15)),
                ],
            ),
            DATASET,
        )
        .await
        .unwrap());

    let trimmed = ok(f
        .g
        .time_series()
        .get_time_series(&saved.id, DATASET, 0, Some(6.0), Some(12.0))
        .await
        .unwrap());
    assert_eq!(trimmed.signal_values.len(), 1);
    assert_eq!(trimmed.signal_values[0].signal_value.value, json!(10));

    // a range excluding every sample still finds the series
    let empty = ok(f
        .g
        .time_series()
        .get_time_series(&saved.id, DATASET, 0, Some(1000.0), None)
        .await
        .unwrap());
    assert!(empty.signal_values.is_empty());
    assert_eq!(empty.id, saved.id);
    assert_eq!(empty.series_type, TimeSeriesType::Timestamp);
    assert_eq!(empty.measure_id.as_deref(), Some(f.measure_id.as_str()));
}

#[tokio::test]
async fn metadata_and_signals_update_independently() {
    let f = fixture("Alice").await;
    let saved = ok(f
        .g
        .time_series()
        .save_time_series(
            series_in(&f.oi_id, &f.measure_id, vec![signal(100, json!(5))]),
            DATASET,
        )
        .await
        .unwrap());

    let retagged = ok(f
        .g
        .time_series()
        .update_time_series(
            &saved.id,
            TimeSeriesPropertyIn {
                series_type: TimeSeriesType::Timestamp,
                additional_properties: vec![AdditionalProperty {
                    key: "sampling".to_owned(),
                    value: json!("256Hz"),
                }],
            },
            DATASET,
        )
        .await
        .unwrap());
    assert_eq!(retagged.additional_properties.len(), 1);
    assert_eq!(retagged.signal_values.len(), 1);

    // the replacement payload names no relations at all
    let replaced = ok(f
        .g
        .time_series()
        .update_time_series_signals(
            &saved.id,
            TimeSeriesIn {
                series_type: TimeSeriesType::Timestamp,
                measure_id: None,
                observable_information_ids: Vec::new(),
                observable_information_id: None,
                signal_values: vec![signal(400, json!(1)), signal(500, json!(2))],
                additional_properties: Vec::new(),
            },
            DATASET,
        )
        .await
        .unwrap());
    assert_eq!(replaced.id, saved.id);
    assert_eq!(replaced.signal_values.len(), 2);
    // identity and relations survive a signal replace
    assert_eq!(replaced.measure_id.as_deref(), Some(f.measure_id.as_str()));
    assert_eq!(replaced.observable_information_ids, vec![f.oi_id.clone()]);
}

#[tokio::test]
async fn relationship_update_rebinds_observations() {
    let f = fixture("Alice").await;
    let saved = ok(f
        .g
        .time_series()
        .save_time_series(
            series_in(&f.oi_id, &f.measure_id, vec![signal(100, json!(5))]),
            DATASET,
        )
        .await
        .unwrap());
    let other_oi = ok(f
        .g
        .observable_informations()
        .save_observable_information(
            ObservableInformationIn {
                recording_id: Some(f.recording_id.clone()),
                modality_id: None,
                life_activity_id: None,
            },
            DATASET,
        )
        .await
        .unwrap());

    let rebound = ok(f
        .g
        .time_series()
        .update_time_series_relationships(
            &saved.id,
            TimeSeriesRelationIn {
                measure_id: Some(f.measure_id.clone()),
                observable_information_ids: vec![other_oi.id.clone()],
            },
            DATASET,
        )
        .await
        .unwrap());
    assert_eq!(rebound.observable_information_ids, vec![other_oi.id]);
}

#[tokio::test]
async fn observation_read_embeds_its_series() {
    let f = fixture("Alice").await;
    let saved = ok(f
        .g
        .time_series()
        .save_time_series(
            series_in(&f.oi_id, &f.measure_id, vec![signal(100, json!(5))]),
            DATASET,
        )
        .await
        .unwrap());

    let oi = ok(f
        .g
        .observable_informations()
        .get_observable_information(&f.oi_id, DATASET, 1)
        .await
        .unwrap());
    let series = oi
        .time_series
        .as_ref()
        .and_then(Value::as_array)
        .expect("series hydrated");
    assert_eq!(
        series[0].as_object().and_then(|s| s.get("id")).and_then(Value::as_str),
        Some(saved.id.as_str())
    );
}

#[tokio::test]
async fn filters_intersect_across_entity_kinds() {
    let f = fixture("Alice").await;
    let here = ok(f
        .g
        .time_series()
        .save_time_series(
            series_in(&f.oi_id, &f.measure_id, vec![signal(100, json!(5))]),
            DATASET,
        )
        .await
        .unwrap());
    // a second series under an unrelated recording
    let stray_recording = ok(f
        .g
        .recordings()
        .save_recording(
            RecordingIn {
                participation_id: None,
                registered_channel_id: None,
                additional_properties: Vec::new(),
            },
            DATASET,
        )
        .await
        .unwrap());
    let stray_oi = ok(f
        .g
        .observable_informations()
        .save_observable_information(
            ObservableInformationIn {
                recording_id: Some(stray_recording.id.clone()),
                modality_id: None,
                life_activity_id: None,
            },
            DATASET,
        )
        .await
        .unwrap());
    ok(f.g
        .time_series()
        .save_time_series(
            series_in(&stray_oi.id, &f.measure_id, vec![signal(100, json!(7))]),
            DATASET,
        )
        .await
        .unwrap());

    let all = f.g.time_series().get_time_series_nodes(DATASET, &[]).await.unwrap();
    assert_eq!(all.len(), 2);

    let by_recording = f
        .g
        .time_series()
        .get_time_series_nodes(
            DATASET,
            &[("recording_id".to_owned(), f.recording_id.clone())],
        )
        .await
        .unwrap();
    assert_eq!(by_recording.len(), 1);
    assert_eq!(
        by_recording[0].get("id").and_then(Value::as_str),
        Some(here.id.as_str())
    );

    let by_participant = f
        .g
        .time_series()
        .get_time_series_nodes(
            DATASET,
            &[("participant_name".to_owned(), "Alice".to_owned())],
        )
        .await
        .unwrap();
    assert_eq!(by_participant.len(), 1);

    let by_experiment = f
        .g
        .time_series()
        .get_time_series_nodes(
            DATASET,
            &[("experiment_id".to_owned(), f.experiment_id.clone())],
        )
        .await
        .unwrap();
    assert_eq!(by_experiment.len(), 1);

    // conjunction across kinds
    let combined = f
        .g
        .time_series()
        .get_time_series_nodes(
            DATASET,
            &[
                ("recording_id".to_owned(), f.recording_id.clone()),
                ("participant_name".to_owned(), "Bob".to_owned()),
            ],
        )
        .await
        .unwrap();
    assert!(combined.is_empty());
}

#[tokio::test]
async fn delete_removes_every_sample() {
    let f = fixture("Alice").await;
    let saved = ok(f
        .g
        .time_series()
        .save_time_series(
            series_in(
                &f.oi_id,
                &f.measure_id,
                vec![signal(100, json!(5)), signal(200, json!(6))],
            ),
            DATASET,
        )
        .await
        .unwrap());

    let deleted = ok(f
        .g
        .time_series()
        .delete_time_series(&saved.id, DATASET)
        .await
        .unwrap());
    assert_eq!(deleted.signal_values.len(), 2);
    assert!(!f
        .g
        .time_series()
        .get_time_series(&saved.id, DATASET, 0, None, None)
        .await
        .unwrap()
        .is_ok());
    assert!(f
        .g
        .time_series()
        .get_time_series_nodes(DATASET, &[])
        .await
        .unwrap()
        .is_empty());
}
