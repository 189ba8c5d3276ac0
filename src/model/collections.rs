use std::fmt;

/// Every collection the store knows about. Adding an entity kind means
/// adding a variant here, so an unmapped kind cannot exist at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Activities,
    ActivityExecutions,
    Appearances,
    Arrangements,
    Channels,
    Datasets,
    Experiments,
    LifeActivities,
    Measures,
    MeasureNames,
    Modalities,
    ObservableInformations,
    Participants,
    ParticipantStates,
    Participations,
    Personalities,
    Recordings,
    RegisteredChannels,
    RegisteredData,
    Scenarios,
    TimeSeries,
}

impl Collection {
    /// Physical collection name; also the field name under which embedded
    /// children live inside their parent document.
    pub const fn name(self) -> &'static str {
        match self {
            Collection::Activities => "activities",
            Collection::ActivityExecutions => "activity_executions",
            Collection::Appearances => "appearances",
            Collection::Arrangements => "arrangements",
            Collection::Channels => "channels",
            Collection::Datasets => "datasets",
            Collection::Experiments => "experiments",
            Collection::LifeActivities => "life_activities",
            Collection::Measures => "measures",
            Collection::MeasureNames => "measure_names",
            Collection::Modalities => "modalities",
            Collection::ObservableInformations => "observable_informations",
            Collection::Participants => "participants",
            Collection::ParticipantStates => "participant_states",
            Collection::Participations => "participations",
            Collection::Personalities => "personalities",
            Collection::Recordings => "recordings",
            Collection::RegisteredChannels => "registered_channels",
            Collection::RegisteredData => "registered_data",
            Collection::Scenarios => "scenarios",
            Collection::TimeSeries => "timeSeries",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Marks which collection a traversal arrived from, so hydration can skip
/// the direct back-edge instead of bouncing between two neighbours until
/// the depth budget runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Source(Option<Collection>);

impl Source {
    pub const NONE: Source = Source(None);

    pub fn is_none(self) -> bool {
        self.0.is_none()
    }

    pub fn is(self, collection: Collection) -> bool {
        self.0 == Some(collection)
    }

    /// Fills an unset source with a default origin.
    pub fn or(self, fallback: Collection) -> Source {
        match self.0 {
            Some(_) => self,
            None => Source(Some(fallback)),
        }
    }
}

impl From<Collection> for Source {
    fn from(collection: Collection) -> Self {
        Source(Some(collection))
    }
}

/// Ties a model type to its collection at compile time.
pub trait StoredModel {
    const COLLECTION: Collection;
}
