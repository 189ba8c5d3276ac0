mod common;

use common::{graph, ok, DATASET};
use labgraph::{
    AppearanceOcclusionIn, AppearanceSomatotypeIn, MeasureIn, ObjectId,
    ObservableInformationIn, Outcome, ParticipantStateIn, ParticipationIn,
    PersonalityBigFiveIn, PersonalityPanasIn, RegisteredChannelIn, TimeSeriesIn, TimeSeriesType,
};

fn invalid_message<T: std::fmt::Debug>(outcome: Outcome<T>) -> String {
    match outcome {
        Outcome::Invalid(msg) => msg,
        other => panic!("expected invalid, got {other:?}"),
    }
}

fn big_five(openess: f64) -> PersonalityBigFiveIn {
    PersonalityBigFiveIn {
        agreeableness: 0.5,
        conscientiousness: 0.5,
        extroversion: 0.5,
        neuroticism: 0.5,
        openess,
    }
}

#[tokio::test]
async fn personality_factors_must_be_normalized() {
    let g = graph();
    let outcome = g
        .personalities()
        .save_personality_big_five(big_five(1.5), DATASET)
        .await
        .unwrap();
    assert_eq!(
        invalid_message(outcome),
        "personality factor values must be between 0 and 1"
    );

    let outcome = g
        .personalities()
        .save_personality_panas(
            PersonalityPanasIn {
                negative_affect: -0.1,
                positive_affect: 0.4,
            },
            DATASET,
        )
        .await
        .unwrap();
    assert_eq!(
        invalid_message(outcome),
        "personality factor values must be between 0 and 1"
    );

    // the range is closed: both endpoints are accepted
    assert!(g
        .personalities()
        .save_personality_big_five(
            PersonalityBigFiveIn {
                agreeableness: 0.0,
                conscientiousness: 1.0,
                extroversion: 0.0,
                neuroticism: 1.0,
                openess: 0.0,
            },
            DATASET,
        )
        .await
        .unwrap()
        .is_ok());
    assert!(g
        .personalities()
        .save_personality_panas(
            PersonalityPanasIn {
                negative_affect: 0.0,
                positive_affect: 1.0,
            },
            DATASET,
        )
        .await
        .unwrap()
        .is_ok());
}

#[tokio::test]
async fn somatotype_axes_must_be_in_scale() {
    let g = graph();
    let outcome = g
        .appearances()
        .save_appearance_somatotype(
            AppearanceSomatotypeIn {
                ectomorph: 0.5,
                endomorph: 3.0,
                mesomorph: 3.0,
            },
            DATASET,
        )
        .await
        .unwrap();
    assert_eq!(
        invalid_message(outcome),
        "somatotype values must be between 1 and 7"
    );
    let outcome = g
        .appearances()
        .save_appearance_somatotype(
            AppearanceSomatotypeIn {
                ectomorph: 3.0,
                endomorph: 7.1,
                mesomorph: 3.0,
            },
            DATASET,
        )
        .await
        .unwrap();
    assert_eq!(
        invalid_message(outcome),
        "somatotype values must be between 1 and 7"
    );

    // the scale endpoints themselves are valid
    assert!(g
        .appearances()
        .save_appearance_somatotype(
            AppearanceSomatotypeIn {
                ectomorph: 1.0,
                endomorph: 7.0,
                mesomorph: 4.0,
            },
            DATASET,
        )
        .await
        .unwrap()
        .is_ok());
}

#[tokio::test]
async fn sub_kind_updates_do_not_cross() {
    let g = graph();
    let panas = ok(g
        .personalities()
        .save_personality_panas(
            PersonalityPanasIn {
                negative_affect: 0.2,
                positive_affect: 0.8,
            },
            DATASET,
        )
        .await
        .unwrap());
    let panas_id = match &panas {
        labgraph::PersonalityOut::Panas { id, .. } => id.clone(),
        other => panic!("expected panas, got {other:?}"),
    };
    // a big-five update cannot rewrite a panas document
    assert!(!g
        .personalities()
        .update_personality_big_five(&panas_id, big_five(0.5), DATASET)
        .await
        .unwrap()
        .is_ok());

    let somatotype = ok(g
        .appearances()
        .save_appearance_somatotype(
            AppearanceSomatotypeIn {
                ectomorph: 2.0,
                endomorph: 3.0,
                mesomorph: 4.0,
            },
            DATASET,
        )
        .await
        .unwrap());
    let somatotype_id = match &somatotype {
        labgraph::AppearanceOut::Somatotype { id, .. } => id.clone(),
        other => panic!("expected somatotype, got {other:?}"),
    };
    assert!(!g
        .appearances()
        .update_appearance_occlusion(
            &somatotype_id,
            AppearanceOcclusionIn {
                beard: "none".to_owned(),
                moustache: "none".to_owned(),
                glasses: false,
            },
            DATASET,
        )
        .await
        .unwrap()
        .is_ok());
}

#[tokio::test]
async fn writes_check_referenced_entities_exist() {
    let g = graph();
    let dangling = ObjectId::new().to_hex();

    let outcome = g
        .registered_channels()
        .save_registered_channel(
            RegisteredChannelIn {
                channel_id: Some(dangling.clone()),
                registered_data_id: None,
            },
            DATASET,
        )
        .await
        .unwrap();
    assert_eq!(invalid_message(outcome), "given channel does not exist");

    let outcome = g
        .participations()
        .save_participation(
            ParticipationIn {
                activity_execution_id: Some(dangling.clone()),
                participant_state_id: None,
            },
            DATASET,
        )
        .await
        .unwrap();
    assert_eq!(
        invalid_message(outcome),
        "given activity execution does not exist"
    );

    let outcome = g
        .participant_states()
        .save_participant_state(
            ParticipantStateIn {
                participant_id: Some(dangling.clone()),
                age: None,
                personality_ids: Vec::new(),
                appearance_ids: Vec::new(),
                additional_properties: Vec::new(),
            },
            DATASET,
        )
        .await
        .unwrap();
    assert_eq!(invalid_message(outcome), "given participant does not exist");

    let outcome = g
        .measures()
        .save_measure(
            MeasureIn {
                measure_name_id: Some(dangling.clone()),
                datatype: "float".to_owned(),
                range: None,
                unit: None,
                additional_properties: Vec::new(),
            },
            DATASET,
        )
        .await
        .unwrap();
    assert_eq!(
        invalid_message(outcome),
        "given measure name does not exist"
    );

    let outcome = g
        .time_series()
        .save_time_series(
            TimeSeriesIn {
                series_type: TimeSeriesType::Timestamp,
                measure_id: None,
                observable_information_ids: vec![dangling.clone()],
                observable_information_id: None,
                signal_values: Vec::new(),
                additional_properties: Vec::new(),
            },
            DATASET,
        )
        .await
        .unwrap();
    assert_eq!(
        invalid_message(outcome),
        "given observable information does not exist"
    );
}

#[tokio::test]
async fn observation_requires_a_recording() {
    let g = graph();
    let outcome = g
        .observable_informations()
        .save_observable_information(
            ObservableInformationIn {
                recording_id: None,
                modality_id: None,
                life_activity_id: None,
            },
            DATASET,
        )
        .await
        .unwrap();
    assert_eq!(invalid_message(outcome), "given recording does not exist");
}

#[tokio::test]
async fn state_checks_personalities_and_appearances() {
    let g = graph();
    let participant = ok(g
        .participants()
        .save_participant(
            labgraph::ParticipantIn {
                name: "Alice".to_owned(),
                date_of_birth: None,
                sex: None,
                disorder: None,
                additional_properties: Vec::new(),
            },
            DATASET,
        )
        .await
        .unwrap());
    let real = ok(g
        .personalities()
        .save_personality_panas(
            PersonalityPanasIn {
                negative_affect: 0.2,
                positive_affect: 0.8,
            },
            DATASET,
        )
        .await
        .unwrap());
    let real_id = match real {
        labgraph::PersonalityOut::Panas { id, .. } => id,
        other => panic!("expected panas, got {other:?}"),
    };

    let outcome = g
        .participant_states()
        .save_participant_state(
            ParticipantStateIn {
                participant_id: Some(participant.id.clone()),
                age: None,
                personality_ids: vec![real_id, ObjectId::new().to_hex()],
                appearance_ids: Vec::new(),
                additional_properties: Vec::new(),
            },
            DATASET,
        )
        .await
        .unwrap();
    assert_eq!(invalid_message(outcome), "given personality does not exist");
}
