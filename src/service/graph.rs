use std::sync::Arc;

use super::{
    ActivityExecutionService, ActivityService, AppearanceService, ArrangementService,
    ChannelService, DatasetService, ExperimentService, LifeActivityService, MeasureNameService,
    MeasureService, ModalityService, ObservableInformationService, ParticipantService,
    ParticipantStateService, ParticipationService, PersonalityService, RecordingService,
    RegisteredChannelService, RegisteredDataService, ScenarioService, TimeSeriesService,
};
use crate::store::DocStore;

/// All entity services over one store, with their cross references wired.
///
/// Hydration makes the service graph cyclic (a recording reaches back to its
/// participation, which reaches forward to recordings), so services hold each
/// other through `OnceLock<Arc<_>>` slots filled here, once.
pub struct ServiceGraph {
    activities: Arc<ActivityService>,
    activity_executions: Arc<ActivityExecutionService>,
    appearances: Arc<AppearanceService>,
    arrangements: Arc<ArrangementService>,
    channels: Arc<ChannelService>,
    datasets: Arc<DatasetService>,
    experiments: Arc<ExperimentService>,
    life_activities: Arc<LifeActivityService>,
    measures: Arc<MeasureService>,
    measure_names: Arc<MeasureNameService>,
    modalities: Arc<ModalityService>,
    observable_informations: Arc<ObservableInformationService>,
    participants: Arc<ParticipantService>,
    participant_states: Arc<ParticipantStateService>,
    participations: Arc<ParticipationService>,
    personalities: Arc<PersonalityService>,
    recordings: Arc<RecordingService>,
    registered_channels: Arc<RegisteredChannelService>,
    registered_data: Arc<RegisteredDataService>,
    scenarios: Arc<ScenarioService>,
    time_series: Arc<TimeSeriesService>,
}

impl ServiceGraph {
    pub fn new(store: DocStore, metadata_dataset: impl Into<String>) -> Self {
        let activities = Arc::new(ActivityService::new(store.clone()));
        let activity_executions = Arc::new(ActivityExecutionService::new(store.clone()));
        let appearances = Arc::new(AppearanceService::new(store.clone()));
        let arrangements = Arc::new(ArrangementService::new(store.clone()));
        let channels = Arc::new(ChannelService::new(store.clone()));
        let datasets = Arc::new(DatasetService::new(store.clone(), metadata_dataset));
        let experiments = Arc::new(ExperimentService::new(store.clone()));
        let life_activities = Arc::new(LifeActivityService::new(store.clone()));
        let measures = Arc::new(MeasureService::new(store.clone()));
        let measure_names = Arc::new(MeasureNameService::new(store.clone()));
        let modalities = Arc::new(ModalityService::new(store.clone()));
        let observable_informations = Arc::new(ObservableInformationService::new(store.clone()));
        let participants = Arc::new(ParticipantService::new(store.clone()));
        let participant_states = Arc::new(ParticipantStateService::new(store.clone()));
        let participations = Arc::new(ParticipationService::new(store.clone()));
        let personalities = Arc::new(PersonalityService::new(store.clone()));
        let recordings = Arc::new(RecordingService::new(store.clone()));
        let registered_channels = Arc::new(RegisteredChannelService::new(store.clone()));
        let registered_data = Arc::new(RegisteredDataService::new(store.clone()));
        let scenarios = Arc::new(ScenarioService::new(store.clone()));
        let time_series = Arc::new(TimeSeriesService::new(store));

        let _ = activities
            .activity_execution_service
            .set(activity_executions.clone());

        let _ = activity_executions.activity_service.set(activities.clone());
        let _ = activity_executions
            .arrangement_service
            .set(arrangements.clone());
        let _ = activity_executions.scenario_service.set(scenarios.clone());
        let _ = activity_executions
            .participation_service
            .set(participations.clone());

        let _ = appearances
            .participant_state_service
            .set(participant_states.clone());

        let _ = arrangements
            .activity_execution_service
            .set(activity_executions.clone());

        let _ = channels
            .registered_channel_service
            .set(registered_channels.clone());

        let _ = experiments.scenario_service.set(scenarios.clone());

        let _ = life_activities
            .observable_information_service
            .set(observable_informations.clone());

        let _ = measures.measure_name_service.set(measure_names.clone());
        let _ = measures.time_series_service.set(time_series.clone());

        let _ = measure_names.measure_service.set(measures.clone());

        let _ = modalities
            .observable_information_service
            .set(observable_informations.clone());

        let _ = observable_informations
            .recording_service
            .set(recordings.clone());
        let _ = observable_informations
            .modality_service
            .set(modalities.clone());
        let _ = observable_informations
            .life_activity_service
            .set(life_activities.clone());
        let _ = observable_informations
            .time_series_service
            .set(time_series.clone());

        let _ = participants
            .participant_state_service
            .set(participant_states.clone());

        let _ = participant_states
            .participant_service
            .set(participants.clone());
        let _ = participant_states
            .personality_service
            .set(personalities.clone());
        let _ = participant_states
            .appearance_service
            .set(appearances.clone());
        let _ = participant_states
            .participation_service
            .set(participations.clone());

        let _ = participations
            .activity_execution_service
            .set(activity_executions.clone());
        let _ = participations
            .participant_state_service
            .set(participant_states.clone());
        let _ = participations.recording_service.set(recordings.clone());

        let _ = personalities
            .participant_state_service
            .set(participant_states.clone());

        let _ = recordings
            .participation_service
            .set(participations.clone());
        let _ = recordings
            .registered_channel_service
            .set(registered_channels.clone());
        let _ = recordings
            .observable_information_service
            .set(observable_informations.clone());

        let _ = registered_channels.channel_service.set(channels.clone());
        let _ = registered_channels
            .registered_data_service
            .set(registered_data.clone());
        let _ = registered_channels
            .recording_service
            .set(recordings.clone());

        let _ = registered_data
            .registered_channel_service
            .set(registered_channels.clone());

        let _ = scenarios
            .activity_execution_service
            .set(activity_executions.clone());
        let _ = scenarios.experiment_service.set(experiments.clone());

        let _ = time_series.measure_service.set(measures.clone());
        let _ = time_series
            .observable_information_service
            .set(observable_informations.clone());

        ServiceGraph {
            activities,
            activity_executions,
            appearances,
            arrangements,
            channels,
            datasets,
            experiments,
            life_activities,
            measures,
            measure_names,
            modalities,
            observable_informations,
            participants,
            participant_states,
            participations,
            personalities,
            recordings,
            registered_channels,
            registered_data,
            scenarios,
            time_series,
        }
    }

    pub fn activities(&self) -> &Arc<ActivityService> {
        &self.activities
    }

    pub fn activity_executions(&self) -> &Arc<ActivityExecutionService> {
        &self.activity_executions
    }

    pub fn appearances(&self) -> &Arc<AppearanceService> {
        &self.appearances
    }

    pub fn arrangements(&self) -> &Arc<ArrangementService> {
        &self.arrangements
    }

    pub fn channels(&self) -> &Arc<ChannelService> {
        &self.channels
    }

    pub fn datasets(&self) -> &Arc<DatasetService> {
        &self.datasets
    }

    pub fn experiments(&self) -> &Arc<ExperimentService> {
        &self.experiments
    }

    pub fn life_activities(&self) -> &Arc<LifeActivityService> {
        &self.life_activities
    }

    pub fn measures(&self) -> &Arc<MeasureService> {
        &self.measures
    }

    pub fn measure_names(&self) -> &Arc<MeasureNameService> {
        &self.measure_names
    }

    pub fn modalities(&self) -> &Arc<ModalityService> {
        &self.modalities
    }

    pub fn observable_informations(&self) -> &Arc<ObservableInformationService> {
        &self.observable_informations
    }

    pub fn participants(&self) -> &Arc<ParticipantService> {
        &self.participants
    }

    pub fn participant_states(&self) -> &Arc<ParticipantStateService> {
        &self.participant_states
    }

    pub fn participations(&self) -> &Arc<ParticipationService> {
        &self.participations
    }

    pub fn personalities(&self) -> &Arc<PersonalityService> {
        &self.personalities
    }

    pub fn recordings(&self) -> &Arc<RecordingService> {
        &self.recordings
    }

    pub fn registered_channels(&self) -> &Arc<RegisteredChannelService> {
        &self.registered_channels
    }

    pub fn registered_data(&self) -> &Arc<RegisteredDataService> {
        &self.registered_data
    }

    pub fn scenarios(&self) -> &Arc<ScenarioService> {
        &self.scenarios
    }

    pub fn time_series(&self) -> &Arc<TimeSeriesService> {
        &self.time_series
    }
}
