use std::sync::{Arc, OnceLock};

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use super::activity_execution::ActivityExecutionService;
use super::experiment::ExperimentService;
use super::generic::EntityService;
use super::wired;
use crate::model::{
    doc_id, field_str, ActivityExecutionIn, ActivityExecutionOut, Collection, Document, ObjectId,
    OrderChangeIn, Outcome, ScenarioIn, ScenarioOut, Source,
};
use crate::store::{DocStore, Query};
use crate::try_outcome;

/// Scenarios hold the ordered plan of an experiment as branches of activity
/// execution ids. Most operations address a scenario through any of its
/// elements: its own id, its experiment's id, or any execution id it
/// contains.
pub struct ScenarioService {
    store: DocStore,
    pub(crate) activity_execution_service: OnceLock<Arc<ActivityExecutionService>>,
    pub(crate) experiment_service: OnceLock<Arc<ExperimentService>>,
}

impl ScenarioService {
    pub fn new(store: DocStore) -> Self {
        ScenarioService {
            store,
            activity_execution_service: OnceLock::new(),
            experiment_service: OnceLock::new(),
        }
    }

    fn activity_executions(&self) -> &Arc<ActivityExecutionService> {
        wired(&self.activity_execution_service)
    }

    fn experiments(&self) -> &Arc<ExperimentService> {
        wired(&self.experiment_service)
    }

    /// Resolves an element id to the raw scenario owning it, trying scenario
    /// id, experiment id, then execution membership.
    async fn find_by_element(&self, element_id: &str, dataset: &str) -> Result<Outcome<Document>> {
        let oid = match ObjectId::parse_str(element_id) {
            Ok(oid) => oid,
            Err(_) => return Ok(Outcome::not_found(element_id, "not a valid document id")),
        };
        if let Outcome::Ok(scenario) = self
            .store
            .get_document(element_id, Collection::Scenarios, dataset)
            .await?
        {
            return Ok(Outcome::Ok(scenario));
        }
        let experiment = self
            .store
            .get_document(element_id, Collection::Experiments, dataset)
            .await?;
        if experiment.is_ok() {
            let mut scenarios = self
                .store
                .get_documents(
                    Query::eq("experiment_id", oid.to_hex()),
                    Collection::Scenarios,
                    dataset,
                )
                .await?;
            return Ok(match scenarios.pop() {
                Some(scenario) => Outcome::Ok(scenario),
                None => Outcome::not_found(
                    element_id,
                    "given experiment is not assigned to any scenario",
                ),
            });
        }
        let mut scenarios = self
            .store
            .get_documents(
                Query::eq("activity_executions", oid.to_hex()),
                Collection::Scenarios,
                dataset,
            )
            .await?;
        Ok(match scenarios.pop() {
            Some(scenario) => Outcome::Ok(scenario),
            None => Outcome::not_found(
                element_id,
                "no scenario contains an element with the given id",
            ),
        })
    }

    /// Converts the stored id branches to hydrated execution objects and
    /// attaches the experiment. Resolution itself costs one hop; a miss on an
    /// individual execution leaves a null in its slot so branch positions
    /// stay aligned.
    async fn resolve(
        &self,
        mut doc: Document,
        dataset: &str,
        depth: u32,
        source: Source,
    ) -> Result<Document> {
        let inner = depth.saturating_sub(1);
        let source = source.or(Collection::Scenarios);
        if source.is(Collection::ActivityExecutions) {
            doc.insert("activity_executions".to_owned(), Value::Null);
        } else {
            let branches = branches_of(&doc);
            let mut hydrated = Vec::with_capacity(branches.len());
            for branch in branches {
                let mut objects = Vec::with_capacity(branch.len());
                for execution_id in branch {
                    match self
                        .activity_executions()
                        .get_single_dict(&execution_id, dataset, inner, source)
                        .await?
                    {
                        Outcome::Ok(execution) => objects.push(Value::Object(execution)),
                        _ => objects.push(Value::Null),
                    }
                }
                hydrated.push(Value::Array(objects));
            }
            doc.insert("activity_executions".to_owned(), Value::Array(hydrated));
        }
        if !source.is(Collection::Experiments) {
            if let Some(experiment_id) = field_str(&doc, "experiment_id").map(str::to_owned) {
                if let Outcome::Ok(experiment) = self
                    .experiments()
                    .get_single_dict(&experiment_id, dataset, inner, source)
                    .await?
                {
                    doc.insert("experiment".to_owned(), Value::Object(experiment));
                }
            }
        }
        Ok(doc)
    }

    /// Creates the executions of the plan in order and stores them as the
    /// scenario's first branch.
    pub async fn save_scenario(
        &self,
        scenario: ScenarioIn,
        dataset: &str,
    ) -> Result<Outcome<ScenarioOut>> {
        let Some(experiment_id) = scenario.experiment_id.clone() else {
            return Ok(Outcome::Invalid("given experiment does not exist".to_owned()));
        };
        let experiment = self
            .experiments()
            .get_single_dict(&experiment_id, dataset, 0, Source::NONE)
            .await?;
        if !experiment.is_ok() {
            return Ok(Outcome::Invalid("given experiment does not exist".to_owned()));
        }
        let mut branch = Vec::with_capacity(scenario.activity_executions.len());
        for execution in &scenario.activity_executions {
            let saved: ActivityExecutionOut = try_outcome!(
                self.activity_executions()
                    .save_activity_execution(execution.clone(), dataset)
                    .await?
            );
            branch.push(Value::String(saved.id));
        }
        let mut doc = Document::new();
        doc.insert("experiment_id".to_owned(), Value::String(experiment_id));
        doc.insert(
            "activity_executions".to_owned(),
            Value::Array(vec![Value::Array(branch)]),
        );
        let id = self
            .store
            .create_document_in(doc, Collection::Scenarios, dataset)
            .await?;
        self.get_scenario(&id, dataset, 1).await
    }

    pub async fn get_scenario(
        &self,
        element_id: &str,
        dataset: &str,
        depth: u32,
    ) -> Result<Outcome<ScenarioOut>> {
        let doc = try_outcome!(self.find_by_element(element_id, dataset).await?);
        let resolved = self.resolve(doc, dataset, depth, Source::NONE).await?;
        Outcome::Ok(resolved).parse()
    }

    pub async fn get_scenarios(&self, dataset: &str) -> Result<Vec<Document>> {
        self.store
            .get_documents(Query::new(), Collection::Scenarios, dataset)
            .await
    }

    pub async fn get_scenarios_by_experiment(
        &self,
        experiment_id: &str,
        dataset: &str,
        depth: u32,
        source: Source,
    ) -> Result<Outcome<Vec<Document>>> {
        let oid = match ObjectId::parse_str(experiment_id) {
            Ok(oid) => oid,
            Err(_) => return Ok(Outcome::not_found(experiment_id, "not a valid document id")),
        };
        let scenarios = self
            .store
            .get_documents(
                Query::eq("experiment_id", oid.to_hex()),
                Collection::Scenarios,
                dataset,
            )
            .await?;
        if scenarios.is_empty() {
            return Ok(Outcome::not_found(
                experiment_id,
                "given experiment is not assigned to any scenario",
            ));
        }
        let mut resolved = Vec::with_capacity(scenarios.len());
        for scenario in scenarios {
            resolved.push(self.resolve(scenario, dataset, depth, source).await?);
        }
        Ok(Outcome::Ok(resolved))
    }

    pub async fn get_scenarios_by_activity_execution(
        &self,
        execution_id: &str,
        dataset: &str,
        depth: u32,
        source: Source,
    ) -> Result<Outcome<Vec<Document>>> {
        let oid = match ObjectId::parse_str(execution_id) {
            Ok(oid) => oid,
            Err(_) => return Ok(Outcome::not_found(execution_id, "not a valid document id")),
        };
        let scenarios = self
            .store
            .get_documents(
                Query::eq("activity_executions", oid.to_hex()),
                Collection::Scenarios,
                dataset,
            )
            .await?;
        if scenarios.is_empty() {
            return Ok(Outcome::not_found(
                execution_id,
                "given activity execution is not assigned to any scenario",
            ));
        }
        let mut resolved = Vec::with_capacity(scenarios.len());
        for scenario in scenarios {
            resolved.push(self.resolve(scenario, dataset, depth, source).await?);
        }
        Ok(Outcome::Ok(resolved))
    }

    /// Creates the execution and splices it into the plan directly after the
    /// given element.
    pub async fn add_activity_execution(
        &self,
        previous_id: &str,
        execution: ActivityExecutionIn,
        dataset: &str,
    ) -> Result<Outcome<ActivityExecutionOut>> {
        let saved: ActivityExecutionOut = try_outcome!(
            self.activity_executions()
                .save_activity_execution(execution, dataset)
                .await?
        );
        try_outcome!(self.put_after(previous_id, &saved.id, dataset).await?);
        self.activity_executions()
            .get_activity_execution(&saved.id, dataset, 0)
            .await
    }

    /// Inserts an execution id directly after the given element. An
    /// experiment or scenario id as the anchor prepends to the first branch.
    pub async fn put_after(
        &self,
        previous_id: &str,
        execution_id: &str,
        dataset: &str,
    ) -> Result<Outcome<()>> {
        let scenario = try_outcome!(self.find_by_element(previous_id, dataset).await?);
        let scenario_id = doc_id(&scenario).unwrap_or_default().to_owned();
        let previous_hex = match ObjectId::parse_str(previous_id) {
            Ok(oid) => oid.to_hex(),
            Err(_) => return Ok(Outcome::not_found(previous_id, "not a valid document id")),
        };
        let execution_hex = match ObjectId::parse_str(execution_id) {
            Ok(oid) => oid.to_hex(),
            Err(_) => return Ok(Outcome::not_found(execution_id, "not a valid document id")),
        };

        let mut branches = branches_of(&scenario);
        if branches.is_empty() {
            branches.push(Vec::new());
        }
        let position = branches
            .iter()
            .enumerate()
            .find_map(|(branch_index, branch)| {
                branch
                    .iter()
                    .position(|id| *id == previous_hex)
                    .map(|element_index| (branch_index, element_index + 1))
            })
            .unwrap_or((0, 0));
        branches[position.0].insert(position.1, execution_hex);

        self.write_branches(&scenario_id, scenario, branches, dataset)
            .await
    }

    /// Removes the first occurrence of the execution from the plan. The
    /// execution itself survives inside its activity; an emptied branch is
    /// kept in place.
    pub async fn delete_activity_execution(
        &self,
        execution_id: &str,
        dataset: &str,
    ) -> Result<Outcome<Document>> {
        let execution_hex = match ObjectId::parse_str(execution_id) {
            Ok(oid) => oid.to_hex(),
            Err(_) => return Ok(Outcome::not_found(execution_id, "not a valid document id")),
        };
        let mut scenarios = self
            .store
            .get_documents(
                Query::eq("activity_executions", execution_hex.clone()),
                Collection::Scenarios,
                dataset,
            )
            .await?;
        let Some(scenario) = scenarios.pop() else {
            return Ok(Outcome::not_found(
                execution_id,
                "given activity execution is not assigned to any scenario",
            ));
        };
        let scenario_id = doc_id(&scenario).unwrap_or_default().to_owned();
        let mut branches = branches_of(&scenario);
        'outer: for branch in branches.iter_mut() {
            for (index, id) in branch.iter().enumerate() {
                if *id == execution_hex {
                    branch.remove(index);
                    break 'outer;
                }
            }
        }
        try_outcome!(
            self.write_branches(&scenario_id, scenario, branches, dataset)
                .await?
        );
        self.activity_executions()
            .get_single_dict(execution_id, dataset, 0, Source::NONE)
            .await
    }

    /// Moves an execution directly after another element: remove, then
    /// reinsert at the target position.
    pub async fn change_order(
        &self,
        order: OrderChangeIn,
        dataset: &str,
    ) -> Result<Outcome<()>> {
        if order.previous_id == order.activity_execution_id {
            return Ok(Outcome::Invalid(
                "given ids for order change are identical".to_owned(),
            ));
        }
        try_outcome!(
            self.delete_activity_execution(&order.activity_execution_id, dataset)
                .await?
        );
        self.put_after(&order.previous_id, &order.activity_execution_id, dataset)
            .await
    }

    /// Appends the plan's executions as a new parallel branch.
    pub async fn add_scenario_execution(
        &self,
        scenario_id: &str,
        scenario: ScenarioIn,
        dataset: &str,
    ) -> Result<Outcome<ScenarioOut>> {
        let existing = try_outcome!(
            self.store
                .get_document(scenario_id, Collection::Scenarios, dataset)
                .await?
        );
        let mut branch = Vec::with_capacity(scenario.activity_executions.len());
        for execution in &scenario.activity_executions {
            let saved: ActivityExecutionOut = try_outcome!(
                self.activity_executions()
                    .save_activity_execution(execution.clone(), dataset)
                    .await?
            );
            branch.push(saved.id);
        }
        let mut branches = branches_of(&existing);
        branches.push(branch);
        try_outcome!(
            self.write_branches(scenario_id, existing, branches, dataset)
                .await?
        );
        self.get_scenario(scenario_id, dataset, 1).await
    }

    /// Removes the whole branch containing the given execution.
    pub async fn delete_scenario_execution(
        &self,
        execution_id: &str,
        dataset: &str,
    ) -> Result<Outcome<ScenarioOut>> {
        let execution_hex = match ObjectId::parse_str(execution_id) {
            Ok(oid) => oid.to_hex(),
            Err(_) => return Ok(Outcome::not_found(execution_id, "not a valid document id")),
        };
        let mut scenarios = self
            .store
            .get_documents(
                Query::eq("activity_executions", execution_hex.clone()),
                Collection::Scenarios,
                dataset,
            )
            .await?;
        let Some(scenario) = scenarios.pop() else {
            return Ok(Outcome::not_found(
                execution_id,
                "given activity execution is not assigned to any scenario",
            ));
        };
        let scenario_id = doc_id(&scenario).unwrap_or_default().to_owned();
        let branches: Vec<Vec<String>> = branches_of(&scenario)
            .into_iter()
            .filter(|branch| !branch.iter().any(|id| *id == execution_hex))
            .collect();
        try_outcome!(
            self.write_branches(&scenario_id, scenario, branches, dataset)
                .await?
        );
        self.get_scenario(&scenario_id, dataset, 1).await
    }

    /// Property update; the stored execution branches survive the replace.
    pub async fn update_scenario(
        &self,
        scenario_id: &str,
        experiment_id: Option<String>,
        dataset: &str,
    ) -> Result<Outcome<ScenarioOut>> {
        let mut existing = try_outcome!(
            self.store
                .get_document(scenario_id, Collection::Scenarios, dataset)
                .await?
        );
        if let Some(experiment_id) = experiment_id {
            let experiment = self
                .experiments()
                .get_single_dict(&experiment_id, dataset, 0, Source::NONE)
                .await?;
            if !experiment.is_ok() {
                return Ok(Outcome::Invalid("given experiment does not exist".to_owned()));
            }
            existing.insert("experiment_id".to_owned(), Value::String(experiment_id));
        }
        try_outcome!(
            self.store
                .replace_document(scenario_id, existing, Collection::Scenarios, dataset)
                .await?
        );
        self.get_scenario(scenario_id, dataset, 1).await
    }

    async fn write_branches(
        &self,
        scenario_id: &str,
        mut scenario: Document,
        branches: Vec<Vec<String>>,
        dataset: &str,
    ) -> Result<Outcome<()>> {
        scenario.insert(
            "activity_executions".to_owned(),
            serde_json::to_value(&branches)?,
        );
        self.store
            .replace_document(scenario_id, scenario, Collection::Scenarios, dataset)
            .await
    }
}

/// The stored branch lists, as plain id strings.
fn branches_of(scenario: &Document) -> Vec<Vec<String>> {
    scenario
        .get("activity_executions")
        .and_then(Value::as_array)
        .map(|branches| {
            branches
                .iter()
                .filter_map(Value::as_array)
                .map(|branch| {
                    branch
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_owned)
                        .collect()
                })
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl EntityService for ScenarioService {
    fn collection(&self) -> Collection {
        Collection::Scenarios
    }

    fn store(&self) -> &DocStore {
        &self.store
    }

    // hydration happens in `resolve`, which getters call explicitly
    async fn add_related(
        &self,
        _doc: &mut Document,
        _dataset: &str,
        _depth: u32,
        _source: Source,
        _parent: Option<&Document>,
    ) -> Result<()> {
        Ok(())
    }
}
