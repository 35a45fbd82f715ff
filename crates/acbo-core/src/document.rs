//! Document and entity domain models.
//!
//! Documents are produced in batch by the simulated processing pipeline and
//! never mutated afterwards. Entities are aggregated from the
//! `extracted_entities` of completed documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Processing status of an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DocumentStatus {
    Pending,
    Processing,
    Completed,
    Error,
}

/// An uploaded document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Unique identifier (UUID format)
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub uploaded_at: DateTime<Utc>,
    pub status: DocumentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_entities: Option<Vec<String>>,
}

impl Document {
    /// Creates a pending document with a fresh id.
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            mime_type: mime_type.into(),
            size_bytes,
            uploaded_at: Utc::now(),
            status: DocumentStatus::Pending,
            chunk_count: None,
            extracted_entities: None,
        }
    }

    /// Marks the document completed with its chunk count and extracted entities.
    pub fn completed(mut self, chunk_count: u32, entities: Vec<String>) -> Self {
        self.status = DocumentStatus::Completed;
        self.chunk_count = Some(chunk_count);
        self.extracted_entities = Some(entities);
        self
    }
}

/// Kind of a named entity found in documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EntityKind {
    Person,
    Organization,
    Date,
    Location,
    Policy,
    Clause,
}

impl EntityKind {
    /// Best-effort classification of an extracted entity name.
    pub fn classify(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.contains("date") {
            EntityKind::Date
        } else if lower.contains("holder") || lower.contains("person") {
            EntityKind::Person
        } else if lower.contains("exclusion") || lower.contains("clause") || lower.contains("section") {
            EntityKind::Clause
        } else {
            EntityKind::Policy
        }
    }
}

/// A named entity aggregated across documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub id: String,
    pub name: String,
    pub kind: EntityKind,
    /// Number of documents mentioning this entity.
    pub count: u32,
    pub document_ids: Vec<String>,
}

impl Entity {
    pub fn new(name: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            kind,
            count: 0,
            document_ids: Vec::new(),
        }
    }

    /// Folds `other` into `self`: counts add up, document ids are unioned.
    pub fn merge(&mut self, other: Entity) {
        self.count += other.count;
        for id in other.document_ids {
            if !self.document_ids.contains(&id) {
                self.document_ids.push(id);
            }
        }
    }
}

/// Aggregates the extracted entities of completed documents.
///
/// Output order follows first appearance.
pub fn entities_from_documents(docs: &[Document]) -> Vec<Entity> {
    let mut entities: Vec<Entity> = Vec::new();
    for doc in docs.iter().filter(|d| d.status == DocumentStatus::Completed) {
        for name in doc.extracted_entities.iter().flatten() {
            let mut incoming = Entity::new(name.clone(), EntityKind::classify(name));
            incoming.count = 1;
            incoming.document_ids.push(doc.id.clone());

            match entities.iter_mut().find(|e| e.name == *name) {
                Some(existing) => existing.merge(incoming),
                None => entities.push(incoming),
            }
        }
    }
    entities
}
