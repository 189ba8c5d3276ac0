//! Entity services and the relationship hydration that runs after every
//! read. Services reference each other through `OnceLock` slots that
//! [`graph::ServiceGraph`] wires once at startup.

pub mod activity;
pub mod activity_execution;
pub mod appearance;
pub mod arrangement;
pub mod channel;
pub mod dataset;
mod embedded;
pub mod experiment;
pub mod generic;
pub mod graph;
pub mod life_activity;
pub mod measure;
pub mod measure_name;
pub mod modality;
pub mod observable_information;
pub mod participant;
pub mod participant_state;
pub mod participation;
pub mod personality;
pub mod recording;
pub mod registered_channel;
pub mod registered_data;
pub mod scenario;
pub mod time_series;

pub use activity::ActivityService;
pub use activity_execution::ActivityExecutionService;
pub use appearance::AppearanceService;
pub use arrangement::ArrangementService;
pub use channel::ChannelService;
pub use dataset::DatasetService;
pub use experiment::ExperimentService;
pub use generic::EntityService;
pub use graph::ServiceGraph;
pub use life_activity::LifeActivityService;
pub use measure::MeasureService;
pub use measure_name::MeasureNameService;
pub use modality::ModalityService;
pub use observable_information::ObservableInformationService;
pub use participant::ParticipantService;
pub use participant_state::ParticipantStateService;
pub use participation::ParticipationService;
pub use personality::PersonalityService;
pub use recording::RecordingService;
pub use registered_channel::RegisteredChannelService;
pub use registered_data::RegisteredDataService;
pub use scenario::ScenarioService;
pub use time_series::TimeSeriesService;

use std::sync::{Arc, OnceLock};

/// A neighbor slot is filled exactly once, during [`ServiceGraph::new`].
/// Using a service outside a wired graph is a programming error.
pub(crate) fn wired<T>(slot: &OnceLock<Arc<T>>) -> &Arc<T> {
    slot.get().expect("service graph not wired")
}
