mod common;

use common::{graph, ok, DATASET};
use labgraph::{
    ActivityExecutionIn, ActivityIn, ExperimentIn, ObjectId, OrderChangeIn, Outcome, ScenarioIn,
    ScenarioOut, ServiceGraph,
};
use serde_json::Value;

struct Fixture {
    g: ServiceGraph,
    experiment_id: String,
    activity_id: String,
}

async fn fixture() -> Fixture {
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
    Fixture {
        g,
        experiment_id: experiment.id,
        activity_id: activity.id,
    }
}

impl Fixture {
    fn execution_in(&self) -> ActivityExecutionIn {
        ActivityExecutionIn {
            activity_id: Some(self.activity_id.clone()),
            arrangement_id: None,
            additional_properties: Vec::new(),
        }
    }

    async fn scenario_with(&self, executions: usize) -> ScenarioOut {
        ok(self
            .g
            .scenarios()
            .save_scenario(
                ScenarioIn {
                    experiment_id: Some(self.experiment_id.clone()),
                    activity_executions: (0..executions).map(|_| self.execution_in()).collect(),
                },
                DATASET,
            )
            .await
            .unwrap())
    }

    async fn plan(&self, element_id: &str) -> Vec<Vec<String>> {
        let scenario = ok(self
            .g
            .scenarios()
            .get_scenario(element_id, DATASET, 1)
            .await
            .unwrap());
        branch_ids(&scenario)
    }
}

fn branch_ids(scenario: &ScenarioOut) -> Vec<Vec<String>> {
    scenario
        .activity_executions
        .as_ref()
        .and_then(Value::as_array)
        .map(|branches| {
            branches
                .iter()
                .filter_map(Value::as_array)
                .map(|branch| {
                    branch
                        .iter()
                        .filter_map(Value::as_object)
                        .filter_map(|e| e.get("id"))
                        .filter_map(Value::as_str)
                        .map(str::to_owned)
                        .collect()
                })
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn scenario_resolves_through_any_element() {
    let f = fixture().await;
    let scenario = f.scenario_with(2).await;
    let ids = branch_ids(&scenario);
    assert_eq!(ids.len(), 1);
    assert_eq!(ids[0].len(), 2);
    assert!(scenario.experiment.is_some());

    // by its own id, by the experiment's id, and by any execution's id
    for element in [&scenario.id, &f.experiment_id, &ids[0][1]] {
        let found = ok(f
            .g
            .scenarios()
            .get_scenario(element, DATASET, 1)
            .await
            .unwrap());
        assert_eq!(found.id, scenario.id);
    }

    let unknown = ObjectId::new().to_hex();
    assert!(!f
        .g
        .scenarios()
        .get_scenario(&unknown, DATASET, 1)
        .await
        .unwrap()
        .is_ok());
}

#[tokio::test]
async fn insert_after_element_and_after_experiment_anchor() {
    let f = fixture().await;
    let scenario = f.scenario_with(2).await;
    let initial = branch_ids(&scenario)[0].clone();

    // after a concrete element
    let inserted = ok(f
        .g
        .scenarios()
        .add_activity_execution(&initial[0], f.execution_in(), DATASET)
        .await
        .unwrap());
    assert_eq!(
        f.plan(&scenario.id).await[0],
        vec![initial[0].clone(), inserted.id.clone(), initial[1].clone()]
    );

    // the experiment id anchors insertion at the very front
    let front = ok(f
        .g
        .scenarios()
        .add_activity_execution(&f.experiment_id, f.execution_in(), DATASET)
        .await
        .unwrap());
    assert_eq!(f.plan(&scenario.id).await[0][0], front.id);
}

#[tokio::test]
async fn change_order_moves_an_execution() {
    let f = fixture().await;
    let scenario = f.scenario_with(3).await;
    let initial = branch_ids(&scenario)[0].clone();

    ok(f.g
        .scenarios()
        .change_order(
            OrderChangeIn {
                previous_id: initial[2].clone(),
                activity_execution_id: initial[0].clone(),
            },
            DATASET,
        )
        .await
        .unwrap());
    assert_eq!(
        f.plan(&scenario.id).await[0],
        vec![initial[1].clone(), initial[2].clone(), initial[0].clone()]
    );

    match f
        .g
        .scenarios()
        .change_order(
            OrderChangeIn {
                previous_id: initial[0].clone(),
                activity_execution_id: initial[0].clone(),
            },
            DATASET,
        )
        .await
        .unwrap()
    {
        Outcome::Invalid(msg) => assert!(msg.contains("identical")),
        other => panic!("expected invalid, got {other:?}"),
    }
}

#[tokio::test]
async fn removing_from_plan_keeps_the_execution_itself() {
    let f = fixture().await;
    let scenario = f.scenario_with(2).await;
    let initial = branch_ids(&scenario)[0].clone();

    ok(f.g
        .scenarios()
        .delete_activity_execution(&initial[0], DATASET)
        .await
        .unwrap());

    assert_eq!(f.plan(&scenario.id).await[0], vec![initial[1].clone()]);
    // still reachable through its activity
    assert!(f
        .g
        .activity_executions()
        .get_activity_execution(&initial[0], DATASET, 0)
        .await
        .unwrap()
        .is_ok());
}

#[tokio::test]
async fn parallel_branches_are_added_and_dropped_whole() {
    let f = fixture().await;
    let scenario = f.scenario_with(1).await;

    let widened = ok(f
        .g
        .scenarios()
        .add_scenario_execution(
            &scenario.id,
            ScenarioIn {
                experiment_id: None,
                activity_executions: vec![f.execution_in(), f.execution_in()],
            },
            DATASET,
        )
        .await
        .unwrap());
    let branches = branch_ids(&widened);
    assert_eq!(branches.len(), 2);
    assert_eq!(branches[1].len(), 2);

    let narrowed = ok(f
        .g
        .scenarios()
        .delete_scenario_execution(&branches[1][0], DATASET)
        .await
        .unwrap());
    assert_eq!(branch_ids(&narrowed), vec![branches[0].clone()]);
}

#[tokio::test]
async fn experiment_read_embeds_its_scenario() {
    let f = fixture().await;
    let scenario = f.scenario_with(1).await;

    let experiment = ok(f
        .g
        .experiments()
        .get_experiment(&f.experiment_id, DATASET, 1)
        .await
        .unwrap());
    let scenarios = experiment
        .scenarios
        .as_ref()
        .and_then(Value::as_array)
        .expect("scenarios hydrated");
    assert_eq!(scenarios.len(), 1);
    let embedded = scenarios[0].as_object().unwrap();
    assert_eq!(
        embedded.get("id").and_then(Value::as_str),
        Some(scenario.id.as_str())
    );
    // arrived from the experiment, so the scenario does not embed it back
    assert!(!embedded.contains_key("experiment"));
}

#[tokio::test]
async fn execution_read_surfaces_its_experiments() {
    let f = fixture().await;
    let scenario = f.scenario_with(1).await;
    let execution_id = branch_ids(&scenario)[0][0].clone();

    let execution = ok(f
        .g
        .activity_executions()
        .get_activity_execution(&execution_id, DATASET, 1)
        .await
        .unwrap());
    let experiments = execution
        .experiments
        .as_ref()
        .and_then(Value::as_array)
        .expect("experiments hydrated");
    assert_eq!(
        experiments[0]
            .as_object()
            .and_then(|e| e.get("id"))
            .and_then(Value::as_str),
        Some(f.experiment_id.as_str())
    );
}

#[tokio::test]
async fn scenario_requires_an_existing_experiment() {
    let f = fixture().await;
    let outcome = f
        .g
        .scenarios()
        .save_scenario(
            ScenarioIn {
                experiment_id: Some(ObjectId::new().to_hex()),
                activity_executions: Vec::new(),
            },
            DATASET,
        )
        .await
        .unwrap();
    match outcome {
        Outcome::Invalid(msg) => assert_eq!(msg, "given experiment does not exist"),
        other => panic!("expected invalid, got {other:?}"),
    }
}
