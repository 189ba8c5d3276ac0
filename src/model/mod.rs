pub mod activity;
pub mod activity_execution;
pub mod appearance;
pub mod arrangement;
pub mod channel;
pub mod collections;
pub mod common;
pub mod dataset;
pub mod experiment;
pub mod id;
pub mod life_activity;
pub mod measure;
pub mod measure_name;
pub mod modality;
pub mod observable_information;
pub mod outcome;
pub mod participant;
pub mod participant_state;
pub mod participation;
pub mod personality;
pub mod recording;
pub mod registered_channel;
pub mod registered_data;
pub mod scenario;
pub mod time_series;

pub use activity::*;
pub use activity_execution::*;
pub use appearance::*;
pub use arrangement::*;
pub use channel::*;
pub use collections::*;
pub use common::*;
pub use dataset::*;
pub use experiment::*;
pub use id::*;
pub use life_activity::*;
pub use measure::*;
pub use measure_name::*;
pub use modality::*;
pub use observable_information::*;
pub use outcome::*;
pub use participant::*;
pub use participant_state::*;
pub use participation::*;
pub use personality::*;
pub use recording::*;
pub use registered_channel::*;
pub use registered_data::*;
pub use scenario::*;
pub use time_series::*;
