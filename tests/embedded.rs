mod common;

use common::{graph, ok, DATASET};
use labgraph::{
    ActivityExecutionIn, ActivityExecutionRelationIn, ActivityIn, ObservableInformationIn,
    ParticipantIn, ParticipantStateIn, ParticipantStatePropertyIn,
    ParticipantStateRelationIn, RecordingIn,
};
use serde_json::Value;

fn activity_in(name: &str) -> ActivityIn {
    ActivityIn {
        activity: name.to_owned(),
        additional_properties: Vec::new(),
    }
}

fn execution_in(activity_id: &str) -> ActivityExecutionIn {
    ActivityExecutionIn {
        activity_id: Some(activity_id.to_owned()),
        arrangement_id: None,
        additional_properties: Vec::new(),
    }
}

fn participant_in(name: &str) -> ParticipantIn {
    ParticipantIn {
        name: name.to_owned(),
        date_of_birth: None,
        sex: None,
        disorder: None,
        additional_properties: Vec::new(),
    }
}

fn embedded_ids(doc: &Option<Value>) -> Vec<String> {
    doc.as_ref()
        .and_then(Value::as_array)
        .map(|children| {
            children
                .iter()
                .filter_map(Value::as_object)
                .filter_map(|c| c.get("id"))
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn execution_lives_inside_its_activity() {
    let g = graph();
    let activity = ok(g
        .activities()
        .save_activity(activity_in("individual"), DATASET)
        .await
        .unwrap());
    let execution = ok(g
        .activity_executions()
        .save_activity_execution(execution_in(&activity.id), DATASET)
        .await
        .unwrap());

    // reachable through its own id even though it has no collection
    let fetched = ok(g
        .activity_executions()
        .get_activity_execution(&execution.id, DATASET, 1)
        .await
        .unwrap());
    assert_eq!(fetched.id, execution.id);
    assert_eq!(
        fetched
            .activity
            .as_ref()
            .and_then(Value::as_object)
            .and_then(|a| a.get("id"))
            .and_then(Value::as_str),
        Some(activity.id.as_str())
    );

    // and visible through the parent document
    let parent = ok(g
        .activities()
        .get_activity(&activity.id, DATASET, 0)
        .await
        .unwrap());
    assert_eq!(embedded_ids(&parent.activity_executions), vec![execution.id]);
}

#[tokio::test]
async fn relationship_update_moves_execution_between_activities() {
    let g = graph();
    let first = ok(g
        .activities()
        .save_activity(activity_in("individual"), DATASET)
        .await
        .unwrap());
    let second = ok(g
        .activities()
        .save_activity(activity_in("group"), DATASET)
        .await
        .unwrap());
    let execution = ok(g
        .activity_executions()
        .save_activity_execution(execution_in(&first.id), DATASET)
        .await
        .unwrap());

    let moved = ok(g
        .activity_executions()
        .update_activity_execution_relationships(
            &execution.id,
            ActivityExecutionRelationIn {
                activity_id: Some(second.id.clone()),
                arrangement_id: None,
            },
            DATASET,
        )
        .await
        .unwrap());
    assert_eq!(moved.activity_id.as_deref(), Some(second.id.as_str()));

    let old_parent = ok(g
        .activities()
        .get_activity(&first.id, DATASET, 0)
        .await
        .unwrap());
    assert!(embedded_ids(&old_parent.activity_executions).is_empty());
    let new_parent = ok(g
        .activities()
        .get_activity(&second.id, DATASET, 0)
        .await
        .unwrap());
    assert_eq!(
        embedded_ids(&new_parent.activity_executions),
        vec![execution.id]
    );
}

#[tokio::test]
async fn deleting_execution_splices_the_parent() {
    let g = graph();
    let activity = ok(g
        .activities()
        .save_activity(activity_in("individual"), DATASET)
        .await
        .unwrap());
    let kept = ok(g
        .activity_executions()
        .save_activity_execution(execution_in(&activity.id), DATASET)
        .await
        .unwrap());
    let dropped = ok(g
        .activity_executions()
        .save_activity_execution(execution_in(&activity.id), DATASET)
        .await
        .unwrap());

    ok(g.activity_executions()
        .delete_activity_execution(&dropped.id, DATASET)
        .await
        .unwrap());

    let parent = ok(g
        .activities()
        .get_activity(&activity.id, DATASET, 0)
        .await
        .unwrap());
    assert_eq!(embedded_ids(&parent.activity_executions), vec![kept.id]);
    assert!(!g
        .activity_executions()
        .get_activity_execution(&dropped.id, DATASET, 0)
        .await
        .unwrap()
        .is_ok());
}

#[tokio::test]
async fn observable_information_lives_inside_its_recording() {
    let g = graph();
    let recording = ok(g
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

    let fetched = ok(g
        .observable_informations()
        .get_observable_information(&oi.id, DATASET, 1)
        .await
        .unwrap());
    assert_eq!(
        fetched
            .recording
            .as_ref()
            .and_then(Value::as_object)
            .and_then(|r| r.get("id"))
            .and_then(Value::as_str),
        Some(recording.id.as_str())
    );

    let parent = ok(g
        .recordings()
        .get_recording(&recording.id, DATASET, 0)
        .await
        .unwrap());
    assert_eq!(embedded_ids(&parent.observable_informations), vec![oi.id]);
}

#[tokio::test]
async fn participant_state_updates_in_place_and_moves() {
    let g = graph();
    let alice = ok(g
        .participants()
        .save_participant(participant_in("Alice"), DATASET)
        .await
        .unwrap());
    let bob = ok(g
        .participants()
        .save_participant(participant_in("Bob"), DATASET)
        .await
        .unwrap());
    let state = ok(g
        .participant_states()
        .save_participant_state(
            ParticipantStateIn {
                participant_id: Some(alice.id.clone()),
                age: Some(30),
                personality_ids: Vec::new(),
                appearance_ids: Vec::new(),
                additional_properties: Vec::new(),
            },
            DATASET,
        )
        .await
        .unwrap());

    // property update keeps the state inside the same participant
    let updated = ok(g
        .participant_states()
        .update_participant_state(
            &state.id,
            ParticipantStatePropertyIn {
                age: Some(31),
                additional_properties: Vec::new(),
            },
            DATASET,
        )
        .await
        .unwrap());
    assert_eq!(updated.age, Some(31));
    assert_eq!(updated.participant_id.as_deref(), Some(alice.id.as_str()));

    // relationship update re-homes it
    let moved = ok(g
        .participant_states()
        .update_participant_state_relationships(
            &state.id,
            ParticipantStateRelationIn {
                participant_id: Some(bob.id.clone()),
                personality_ids: Vec::new(),
                appearance_ids: Vec::new(),
            },
            DATASET,
        )
        .await
        .unwrap());
    assert_eq!(moved.participant_id.as_deref(), Some(bob.id.as_str()));
    assert_eq!(moved.age, Some(31));

    let alice_doc = ok(g
        .participants()
        .get_participant(&alice.id, DATASET, 0)
        .await
        .unwrap());
    assert!(embedded_ids(&alice_doc.participant_states).is_empty());
    let bob_doc = ok(g
        .participants()
        .get_participant(&bob.id, DATASET, 0)
        .await
        .unwrap());
    assert_eq!(embedded_ids(&bob_doc.participant_states), vec![state.id]);
}

#[tokio::test]
async fn listing_embedded_kind_crosses_all_parents() {
    let g = graph();
    for name in ["individual", "group"] {
        let activity = ok(g
            .activities()
            .save_activity(activity_in(name), DATASET)
            .await
            .unwrap());
        ok(g.activity_executions()
            .save_activity_execution(execution_in(&activity.id), DATASET)
            .await
            .unwrap());
    }
    let executions = g
        .activity_executions()
        .get_activity_executions(DATASET)
        .await
        .unwrap();
    assert_eq!(executions.len(), 2);
}
