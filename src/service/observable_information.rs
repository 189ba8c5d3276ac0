use std::sync::{Arc, OnceLock};

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use super::embedded::{find_child, push_child, remove_child, replace_child};
use super::generic::EntityService;
use super::life_activity::LifeActivityService;
use super::modality::ModalityService;
use super::recording::RecordingService;
use super::time_series::TimeSeriesService;
use super::wired;
use crate::model::{
    doc_id, docs_to_array, field_str, to_document, Collection, Document, ObjectId,
    ObservableInformationIn, ObservableInformationOut, Outcome, Source,
};
use crate::store::{DocStore, Query};

/// Observable informations live embedded inside their recording document;
/// reads locate them through the parent collection and writes splice the
/// parent's child array.
pub struct ObservableInformationService {
    store: DocStore,
    pub(crate) recording_service: OnceLock<Arc<RecordingService>>,
    pub(crate) modality_service: OnceLock<Arc<ModalityService>>,
    pub(crate) life_activity_service: OnceLock<Arc<LifeActivityService>>,
    pub(crate) time_series_service: OnceLock<Arc<TimeSeriesService>>,
}

impl ObservableInformationService {
    pub fn new(store: DocStore) -> Self {
        ObservableInformationService {
            store,
            recording_service: OnceLock::new(),
            modality_service: OnceLock::new(),
            life_activity_service: OnceLock::new(),
            time_series_service: OnceLock::new(),
        }
    }

    fn recordings(&self) -> &Arc<RecordingService> {
        wired(&self.recording_service)
    }

    fn modalities(&self) -> &Arc<ModalityService> {
        wired(&self.modality_service)
    }

    fn life_activities(&self) -> &Arc<LifeActivityService> {
        wired(&self.life_activity_service)
    }

    fn time_series(&self) -> &Arc<TimeSeriesService> {
        wired(&self.time_series_service)
    }

    fn child_field(&self) -> &'static str {
        Collection::ObservableInformations.name()
    }

    /// The recording is mandatory; modality and life activity only need to
    /// exist when given.
    async fn check_relations(
        &self,
        oi: &ObservableInformationIn,
        dataset: &str,
    ) -> Result<Option<String>> {
        match &oi.recording_id {
            Some(recording_id) => {
                let recording = self
                    .recordings()
                    .get_single_dict(recording_id, dataset, 0, Source::NONE)
                    .await?;
                if !recording.is_ok() {
                    return Ok(Some("given recording does not exist".to_owned()));
                }
            }
            None => return Ok(Some("given recording does not exist".to_owned())),
        }
        if let Some(modality_id) = &oi.modality_id {
            let modality = self
                .modalities()
                .get_single_dict(modality_id, dataset, 0, Source::NONE)
                .await?;
            if !modality.is_ok() {
                return Ok(Some("given modality does not exist".to_owned()));
            }
        }
        if let Some(life_activity_id) = &oi.life_activity_id {
            let life_activity = self
                .life_activities()
                .get_single_dict(life_activity_id, dataset, 0, Source::NONE)
                .await?;
            if !life_activity.is_ok() {
                return Ok(Some("given life activity does not exist".to_owned()));
            }
        }
        Ok(None)
    }

    /// Raw parent recording containing the child, straight from the store.
    async fn parent_of(&self, child_id: &str, dataset: &str) -> Result<Outcome<Document>> {
        let oid = match ObjectId::parse_str(child_id) {
            Ok(oid) => oid,
            Err(_) => return Ok(Outcome::not_found(child_id, "not a valid document id")),
        };
        let parents = self
            .store
            .get_documents(
                Query::eq(format!("{}.id", self.child_field()), oid.to_hex()),
                Collection::Recordings,
                dataset,
            )
            .await?;
        match parents.into_iter().next() {
            Some(parent) => Ok(Outcome::Ok(parent)),
            None => Ok(Outcome::not_found(child_id, "document not found")),
        }
    }

    pub async fn save_observable_information(
        &self,
        oi: ObservableInformationIn,
        dataset: &str,
    ) -> Result<Outcome<ObservableInformationOut>> {
        if let Some(error) = self.check_relations(&oi, dataset).await? {
            return Ok(Outcome::Invalid(error));
        }
        let recording_id = oi.recording_id.clone().unwrap_or_default();
        let mut parent = match self
            .store
            .get_document(&recording_id, Collection::Recordings, dataset)
            .await?
        {
            Outcome::Ok(doc) => doc,
            other => return other.parse(),
        };
        let mut child = to_document(&oi)?;
        let child_id = ObjectId::new().to_hex();
        child.insert("id".to_owned(), Value::String(child_id.clone()));
        push_child(&mut parent, self.child_field(), child);
        match self
            .store
            .replace_document(&recording_id, parent, Collection::Recordings, dataset)
            .await?
        {
            Outcome::Ok(()) => self.get_observable_information(&child_id, dataset, 0).await,
            Outcome::NotFound(nf) => Ok(Outcome::NotFound(nf)),
            Outcome::Invalid(msg) => Ok(Outcome::Invalid(msg)),
        }
    }

    pub async fn get_observable_information(
        &self,
        id: &str,
        dataset: &str,
        depth: u32,
    ) -> Result<Outcome<ObservableInformationOut>> {
        self.get_single_dict(id, dataset, depth, Source::NONE)
            .await?
            .parse()
    }

    pub async fn get_observable_informations(&self, dataset: &str) -> Result<Vec<Document>> {
        self.get_multiple(dataset, Query::new(), 0, Source::NONE)
            .await
    }

    /// Overlays the relation fields; a changed `recording_id` moves the
    /// child to its new parent.
    pub async fn update_observable_information(
        &self,
        id: &str,
        oi: ObservableInformationIn,
        dataset: &str,
    ) -> Result<Outcome<ObservableInformationOut>> {
        if let Some(error) = self.check_relations(&oi, dataset).await? {
            return Ok(Outcome::Invalid(error));
        }
        let mut parent = match self.parent_of(id, dataset).await? {
            Outcome::Ok(doc) => doc,
            other => return other.parse(),
        };
        let parent_id = doc_id(&parent).unwrap_or_default().to_owned();
        let oid = ObjectId::parse_str(id)?;
        let mut child = match find_child(&parent, self.child_field(), &oid.to_hex()) {
            Some(child) => child,
            None => return Ok(Outcome::not_found(id, "document not found")),
        };
        for (key, value) in to_document(&oi)? {
            child.insert(key, value);
        }

        let target_id = oi.recording_id.clone().unwrap_or_default();
        let moved = ObjectId::parse_str(&target_id)
            .map(|t| ObjectId::parse_str(&parent_id).map(|p| t != p).unwrap_or(true))
            .unwrap_or(false);
        if moved {
            remove_child(&mut parent, self.child_field(), &oid.to_hex());
            let outcome = self
                .store
                .replace_document(&parent_id, parent, Collection::Recordings, dataset)
                .await?;
            if let Outcome::Ok(()) = outcome {
                let mut target = match self
                    .store
                    .get_document(&target_id, Collection::Recordings, dataset)
                    .await?
                {
                    Outcome::Ok(doc) => doc,
                    other => return other.parse(),
                };
                push_child(&mut target, self.child_field(), child);
                self.store
                    .replace_document(&target_id, target, Collection::Recordings, dataset)
                    .await?;
            }
        } else {
            replace_child(&mut parent, self.child_field(), &oid.to_hex(), child);
            self.store
                .replace_document(&parent_id, parent, Collection::Recordings, dataset)
                .await?;
        }
        self.get_observable_information(id, dataset, 0).await
    }

    pub async fn delete_observable_information(
        &self,
        id: &str,
        dataset: &str,
    ) -> Result<Outcome<Document>> {
        let mut parent = match self.parent_of(id, dataset).await? {
            Outcome::Ok(doc) => doc,
            Outcome::NotFound(nf) => return Ok(Outcome::NotFound(nf)),
            Outcome::Invalid(msg) => return Ok(Outcome::Invalid(msg)),
        };
        let parent_id = doc_id(&parent).unwrap_or_default().to_owned();
        let oid = ObjectId::parse_str(id)?;
        let Some(child) = remove_child(&mut parent, self.child_field(), &oid.to_hex()) else {
            return Ok(Outcome::not_found(id, "document not found"));
        };
        self.store
            .replace_document(&parent_id, parent, Collection::Recordings, dataset)
            .await?;
        Ok(Outcome::Ok(child))
    }
}

#[async_trait]
impl EntityService for ObservableInformationService {
    fn collection(&self) -> Collection {
        Collection::ObservableInformations
    }

    fn store(&self) -> &DocStore {
        &self.store
    }

    async fn get_single_dict(
        &self,
        id: &str,
        dataset: &str,
        depth: u32,
        source: Source,
    ) -> Result<Outcome<Document>> {
        let oid = match ObjectId::parse_str(id) {
            Ok(oid) => oid,
            Err(_) => return Ok(Outcome::not_found(id, "not a valid document id")),
        };
        let parents = self
            .recordings()
            .get_multiple(
                dataset,
                Query::eq(format!("{}.id", self.child_field()), oid.to_hex()),
                depth.saturating_sub(1),
                Collection::ObservableInformations.into(),
            )
            .await?;
        let Some(mut parent) = parents.into_iter().next() else {
            return Ok(Outcome::not_found(id, "document not found"));
        };
        let Some(mut child) = find_child(&parent, self.child_field(), &oid.to_hex()) else {
            return Ok(Outcome::not_found(id, "document not found"));
        };
        parent.remove(self.child_field());
        self.add_related(&mut child, dataset, depth, source, Some(&parent))
            .await?;
        Ok(Outcome::Ok(child))
    }

    async fn get_multiple(
        &self,
        dataset: &str,
        query: Query,
        depth: u32,
        source: Source,
    ) -> Result<Vec<Document>> {
        let parents = self
            .recordings()
            .get_multiple(
                dataset,
                query.clone().prefixed(self.child_field()).normalize_ids(),
                depth.saturating_sub(1),
                Collection::ObservableInformations.into(),
            )
            .await?;
        let child_query = query.normalize_ids();
        let mut children = Vec::new();
        for mut parent in parents {
            let own: Vec<Document> = super::embedded::children_of(&parent, self.child_field());
            parent.remove(self.child_field());
            for mut child in own.into_iter().filter(|c| child_query.matches(c)) {
                self.add_related(&mut child, dataset, depth, source, Some(&parent))
                    .await?;
                children.push(child);
            }
        }
        Ok(children)
    }

    async fn add_related(
        &self,
        doc: &mut Document,
        dataset: &str,
        depth: u32,
        source: Source,
        parent: Option<&Document>,
    ) -> Result<()> {
        if depth == 0 {
            return Ok(());
        }
        let origin: Source = Collection::ObservableInformations.into();
        if !source.is(Collection::TimeSeries) {
            if let Some(id) = doc_id(doc).map(str::to_owned) {
                let series = self
                    .time_series()
                    .get_time_series_for_observable_information(
                        &id,
                        dataset,
                        depth - 1,
                        origin,
                    )
                    .await?;
                doc.insert(
                    Collection::TimeSeries.name().to_owned(),
                    docs_to_array(series),
                );
            }
        }
        if !source.is(Collection::Modalities) {
            if let Some(modality_id) = field_str(doc, "modality_id").map(str::to_owned) {
                if let Outcome::Ok(modality) = self
                    .modalities()
                    .get_single_dict(&modality_id, dataset, depth - 1, origin)
                    .await?
                {
                    doc.insert("modality".to_owned(), Value::Object(modality));
                }
            }
        }
        if !source.is(Collection::LifeActivities) {
            if let Some(life_activity_id) = field_str(doc, "life_activity_id").map(str::to_owned) {
                if let Outcome::Ok(life_activity) = self
                    .life_activities()
                    .get_single_dict(&life_activity_id, dataset, depth - 1, origin)
                    .await?
                {
                    doc.insert("life_activity".to_owned(), Value::Object(life_activity));
                }
            }
        }
        if !source.is(Collection::Recordings) {
            if let Some(parent) = parent {
                doc.insert("recording".to_owned(), Value::Object(parent.clone()));
            }
        }
        Ok(())
    }
}
