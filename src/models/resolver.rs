//! Built-in detail resolver

use super::fields::{scalar_string, string, u32_field};
use super::records::{Amendment, Bill, Committee, CommitteeMeeting, Hearing, Member};
use crate::client::CongressClient;
use crate::entities::{Detail, DetailResolver, EntityKind, EntityQuery};
use crate::error::Result;
use crate::types::{JsonObject, JsonValue};
use async_trait::async_trait;
use serde::Serialize;

/// Any typed detail record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    Hearing(Hearing),
    CommitteeMeeting(CommitteeMeeting),
    Committee(Committee),
    Bill(Bill),
    Member(Member),
    Amendment(Amendment),
}

impl Record {
    /// Entity kind of this record
    pub fn kind(&self) -> EntityKind {
        match self {
            Record::Hearing(_) => EntityKind::Hearing,
            Record::CommitteeMeeting(_) => EntityKind::CommitteeMeeting,
            Record::Committee(_) => EntityKind::Committee,
            Record::Bill(_) => EntityKind::Bill,
            Record::Member(_) => EntityKind::Member,
            Record::Amendment(_) => EntityKind::Amendment,
        }
    }
}

impl Detail for Record {
    fn raw(&self) -> Option<&JsonValue> {
        let raw = match self {
            Record::Hearing(r) => &r.raw,
            Record::CommitteeMeeting(r) => &r.raw,
            Record::Committee(r) => &r.raw,
            Record::Bill(r) => &r.raw,
            Record::Member(r) => &r.raw,
            Record::Amendment(r) => &r.raw,
        };
        raw.is_object().then_some(raw)
    }
}

/// Resolves list items through the client's detail fetchers
#[derive(Debug, Clone, Copy)]
pub struct ModelResolver<'c> {
    client: &'c CongressClient,
    include_cosponsors: bool,
}

impl<'c> ModelResolver<'c> {
    /// Create a resolver over `client`
    pub fn new(client: &'c CongressClient) -> Self {
        Self {
            client,
            include_cosponsors: false,
        }
    }

    /// Also walk cosponsor lists for bills and amendments
    #[must_use]
    pub fn include_cosponsors(mut self, include: bool) -> Self {
        self.include_cosponsors = include;
        self
    }
}

/// Item chamber, falling back to the query's, lowercased
fn item_chamber(item: &JsonObject, query: &EntityQuery) -> Option<String> {
    string(item, "chamber")
        .map(|c| c.to_lowercase())
        .or_else(|| query.chamber.map(|c| c.as_str().to_string()))
}

#[async_trait]
impl DetailResolver for ModelResolver<'_> {
    type Detail = Record;

    async fn resolve(
        &self,
        kind: EntityKind,
        item: &JsonValue,
        query: &EntityQuery,
    ) -> Result<Option<Record>> {
        let Some(item) = item.as_object() else {
            return Ok(None);
        };
        let client = self.client;

        let record = match kind {
            EntityKind::Hearing => {
                let (Some(jacket), Some(congress), Some(chamber)) = (
                    item.get("jacketNumber").and_then(scalar_string),
                    u32_field(item, "congress"),
                    item_chamber(item, query),
                ) else {
                    return Ok(None);
                };
                Record::Hearing(client.get_hearing(congress, &chamber, &jacket).await?)
            }
            EntityKind::CommitteeMeeting => {
                let (Some(event_id), Some(congress), Some(chamber)) = (
                    string(item, "eventId"),
                    u32_field(item, "congress"),
                    item_chamber(item, query),
                ) else {
                    return Ok(None);
                };
                Record::CommitteeMeeting(
                    client
                        .get_committee_meeting(congress, &chamber, &event_id)
                        .await?,
                )
            }
            EntityKind::Committee => {
                let (Some(system_code), Some(chamber)) =
                    (string(item, "systemCode"), item_chamber(item, query))
                else {
                    return Ok(None);
                };
                Record::Committee(client.get_committee(&chamber, &system_code).await?)
            }
            EntityKind::Bill => {
                let (Some(congress), Some(bill_type), Some(number)) = (
                    u32_field(item, "congress"),
                    string(item, "type").or_else(|| string(item, "billType")),
                    u32_field(item, "number"),
                ) else {
                    return Ok(None);
                };
                Record::Bill(
                    client
                        .get_bill(congress, &bill_type, number, self.include_cosponsors)
                        .await?,
                )
            }
            EntityKind::Member => {
                let Some(bioguide_id) = string(item, "bioguideId") else {
                    return Ok(None);
                };
                Record::Member(client.get_member(&bioguide_id).await?)
            }
            EntityKind::Amendment => {
                let (Some(congress), Some(amendment_type), Some(number)) = (
                    u32_field(item, "congress"),
                    string(item, "type"),
                    u32_field(item, "number"),
                ) else {
                    return Ok(None);
                };
                Record::Amendment(
                    client
                        .get_amendment(congress, &amendment_type, number, self.include_cosponsors)
                        .await?,
                )
            }
        };

        Ok(Some(record))
    }
}
