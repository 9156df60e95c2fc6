//! Typed records
//!
//! Built from normalized payloads. Every record keeps the payload it was
//! built from in `raw`, which is not serialized.

use super::fields::{bool_field, object, objects, string, text_list, u32_field, u64_field, values};
use crate::auth::ApiKeyAuth;
use crate::types::{JsonObject, JsonValue};
use serde::Serialize;

// ============================================================================
// Shared pieces
// ============================================================================

/// Name and system code of a referenced committee
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommitteeRef {
    pub name: Option<String>,
    pub system_code: Option<String>,
}

impl CommitteeRef {
    fn list(obj: &JsonObject, key: &str) -> Vec<Self> {
        objects(obj, key)
            .iter()
            .map(|c| Self {
                name: string(c, "name"),
                system_code: string(c, "systemCode"),
            })
            .collect()
    }
}

/// Link to a related sub-collection, with its size
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RelatedLink {
    pub url: Option<String>,
    pub count: Option<u64>,
}

impl RelatedLink {
    fn from_block(obj: &JsonObject, key: &str, auth: &ApiKeyAuth) -> Option<Self> {
        let block = object(obj, key)?;
        let link = Self {
            url: auth.with_auth_opt(string(block, "url").as_deref()),
            count: u64_field(block, "count"),
        };
        (link.url.is_some() || link.count.is_some()).then_some(link)
    }
}

/// `latestAction` text and date
fn latest_action(obj: &JsonObject) -> (Option<String>, Option<String>) {
    match object(obj, "latestAction") {
        Some(action) => (string(action, "text"), string(action, "actionDate")),
        None => (None, None),
    }
}

/// Sponsors from the `sponsors` list plus a lone `sponsor` not already in it
fn sponsors(obj: &JsonObject, auth: &ApiKeyAuth) -> Vec<Member> {
    let listed = objects(obj, "sponsors");
    let mut out: Vec<Member> = listed.iter().map(|s| Member::from_payload(s, auth)).collect();
    if let Some(single) = object(obj, "sponsor") {
        if !listed.contains(single) {
            out.push(Member::from_payload(single, auth));
        }
    }
    out
}

fn api_url(obj: &JsonObject, auth: &ApiKeyAuth) -> Option<String> {
    auth.with_auth_opt(string(obj, "url").as_deref())
}

// ============================================================================
// Members
// ============================================================================

/// One term or role held by a member
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MemberRole {
    pub congress: Option<u32>,
    pub chamber: Option<String>,
    pub title: Option<String>,
    pub state: Option<String>,
    pub district: Option<String>,
    pub start_year: Option<u32>,
    pub end_year: Option<u32>,
    #[serde(skip)]
    pub raw: JsonValue,
}

impl MemberRole {
    pub fn from_payload(obj: &JsonObject) -> Self {
        Self {
            congress: u32_field(obj, "congress"),
            chamber: string(obj, "chamber"),
            title: string(obj, "title").or_else(|| string(obj, "memberType")),
            state: string(obj, "state").or_else(|| string(obj, "stateCode")),
            district: string(obj, "district"),
            start_year: u32_field(obj, "startYear"),
            end_year: u32_field(obj, "endYear"),
            raw: JsonValue::Object(obj.clone()),
        }
    }
}

/// A member of Congress, also used for sponsors and cosponsors
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Member {
    pub bioguide_id: String,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: Option<String>,
    pub party: Option<String>,
    pub state: Option<String>,
    pub district: Option<String>,
    pub chamber: Option<String>,
    pub is_current: Option<bool>,
    pub roles: Vec<MemberRole>,
    /// Date the member joined as sponsor or cosponsor
    pub sponsorship_date: Option<String>,
    /// Date a cosponsorship was withdrawn
    pub sponsorship_withdrawn_date: Option<String>,
    pub is_original_cosponsor: Option<bool>,
    pub api_url: Option<String>,
    #[serde(skip)]
    pub raw: JsonValue,
}

impl Member {
    pub fn from_payload(obj: &JsonObject, auth: &ApiKeyAuth) -> Self {
        let mut roles: Vec<MemberRole> = objects(obj, "roles")
            .iter()
            .map(MemberRole::from_payload)
            .collect();
        if roles.is_empty() {
            roles = objects(obj, "terms")
                .iter()
                .map(MemberRole::from_payload)
                .collect();
        }

        Self {
            bioguide_id: string(obj, "bioguideId").unwrap_or_default(),
            first_name: string(obj, "firstName"),
            middle_name: string(obj, "middleName"),
            last_name: string(obj, "lastName"),
            full_name: string(obj, "fullName")
                .or_else(|| string(obj, "name"))
                .or_else(|| string(obj, "directOrderName")),
            party: string(obj, "party").or_else(|| string(obj, "partyName")),
            state: string(obj, "state"),
            district: string(obj, "district"),
            chamber: string(obj, "chamber"),
            is_current: bool_field(obj, "isCurrent").or_else(|| bool_field(obj, "currentMember")),
            roles,
            sponsorship_date: string(obj, "sponsorshipDate"),
            sponsorship_withdrawn_date: string(obj, "sponsorshipWithdrawnDate"),
            is_original_cosponsor: bool_field(obj, "isOriginalCosponsor"),
            api_url: api_url(obj, auth),
            raw: JsonValue::Object(obj.clone()),
        }
    }
}

// ============================================================================
// Hearings
// ============================================================================

/// A published format of a hearing transcript
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HearingFormat {
    pub format_type: Option<String>,
    /// Document URL, left as published
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Hearing {
    pub jacket_number: Option<String>,
    pub title: Option<String>,
    pub congress: Option<u32>,
    pub chamber: Option<String>,
    pub citation: Option<String>,
    pub committees: Vec<CommitteeRef>,
    pub dates: Vec<String>,
    pub formats: Vec<HearingFormat>,
    pub api_url: Option<String>,
    #[serde(skip)]
    pub raw: JsonValue,
}

impl Hearing {
    pub fn from_payload(obj: &JsonObject, auth: &ApiKeyAuth) -> Self {
        Self {
            jacket_number: string(obj, "jacketNumber"),
            title: string(obj, "title"),
            congress: u32_field(obj, "congress"),
            chamber: string(obj, "chamber"),
            citation: string(obj, "citation"),
            committees: CommitteeRef::list(obj, "committees"),
            dates: text_list(obj, "dates"),
            formats: objects(obj, "formats")
                .iter()
                .map(|f| HearingFormat {
                    format_type: string(f, "type"),
                    url: string(f, "url"),
                })
                .collect(),
            api_url: api_url(obj, auth),
            raw: JsonValue::Object(obj.clone()),
        }
    }
}

// ============================================================================
// Committees
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Subcommittee {
    pub system_code: Option<String>,
    pub name: Option<String>,
    pub api_url: Option<String>,
    #[serde(skip)]
    pub raw: JsonValue,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Committee {
    pub system_code: Option<String>,
    pub name: Option<String>,
    pub chamber: Option<String>,
    /// `committeeTypeCode` on lists, `type` on details
    pub committee_type: Option<String>,
    pub parent_system_code: Option<String>,
    pub parent_name: Option<String>,
    pub subcommittees: Vec<Subcommittee>,
    pub api_url: Option<String>,
    #[serde(skip)]
    pub raw: JsonValue,
}

impl Committee {
    pub fn from_payload(obj: &JsonObject, auth: &ApiKeyAuth) -> Self {
        // Detail payloads carry the name only in the open-ended history entry
        let name = string(obj, "name").or_else(|| {
            objects(obj, "history")
                .iter()
                .find(|h| string(h, "startDate").is_some() && string(h, "endDate").is_none())
                .and_then(|h| {
                    string(h, "libraryOfCongressName").or_else(|| string(h, "officialName"))
                })
        });
        let parent = object(obj, "parent");

        Self {
            system_code: string(obj, "systemCode"),
            name,
            chamber: string(obj, "chamber"),
            committee_type: string(obj, "committeeTypeCode").or_else(|| string(obj, "type")),
            parent_system_code: parent.and_then(|p| string(p, "systemCode")),
            parent_name: parent.and_then(|p| string(p, "name")),
            subcommittees: objects(obj, "subcommittees")
                .iter()
                .map(|s| Subcommittee {
                    system_code: string(s, "systemCode"),
                    name: string(s, "name"),
                    api_url: api_url(s, auth),
                    raw: JsonValue::Object(s.clone()),
                })
                .collect(),
            api_url: api_url(obj, auth),
            raw: JsonValue::Object(obj.clone()),
        }
    }
}

// ============================================================================
// Committee meetings
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CommitteeMeeting {
    pub event_id: Option<String>,
    pub meeting_type: Option<String>,
    pub title: Option<String>,
    pub meeting_status: Option<String>,
    pub date: Option<String>,
    pub chamber: Option<String>,
    pub congress: Option<u32>,
    pub committees: Vec<CommitteeRef>,
    pub location: Option<JsonValue>,
    pub room: Option<String>,
    pub hearing_transcript: Vec<JsonValue>,
    pub witnesses: Vec<JsonValue>,
    pub documents: Vec<JsonValue>,
    pub videos: Vec<JsonValue>,
    pub related_bills: Vec<JsonValue>,
    pub related_nominations: Vec<JsonValue>,
    pub related_treaties: Vec<JsonValue>,
    pub api_url: Option<String>,
    #[serde(skip)]
    pub raw: JsonValue,
}

impl CommitteeMeeting {
    pub fn from_payload(obj: &JsonObject, auth: &ApiKeyAuth) -> Self {
        let related = object(obj, "relatedItems");
        let related_items = |key: &str| match related {
            Some(block) if block.contains_key(key) => values(block, key),
            _ => values(obj, key),
        };
        let location = obj.get("location").filter(|v| !v.is_null()).cloned();
        let room = string(obj, "room").or_else(|| {
            location
                .as_ref()
                .and_then(JsonValue::as_object)
                .and_then(|l| string(l, "room"))
        });

        Self {
            event_id: string(obj, "eventId"),
            meeting_type: string(obj, "type"),
            title: string(obj, "title"),
            meeting_status: string(obj, "meetingStatus"),
            date: string(obj, "date"),
            chamber: string(obj, "chamber"),
            congress: u32_field(obj, "congress"),
            committees: CommitteeRef::list(obj, "committees"),
            location,
            room,
            hearing_transcript: values(obj, "hearingTranscript"),
            witnesses: values(obj, "witnesses"),
            documents: values(obj, "meetingDocuments"),
            videos: values(obj, "videos"),
            related_bills: related_items("bills"),
            related_nominations: related_items("nominations"),
            related_treaties: related_items("treaties"),
            api_url: api_url(obj, auth),
            raw: JsonValue::Object(obj.clone()),
        }
    }
}

// ============================================================================
// Legislation
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BillTextVersion {
    pub version_type: Option<String>,
    /// Document URL, left as published
    pub url: Option<String>,
    pub date: Option<String>,
    #[serde(skip)]
    pub raw: JsonValue,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Amendment {
    pub congress: Option<u32>,
    pub amendment_type: Option<String>,
    pub number: Option<u32>,
    pub description: Option<String>,
    pub purpose: Option<String>,
    pub latest_action: Option<String>,
    pub latest_action_date: Option<String>,
    pub chamber: Option<String>,
    pub proposed_date: Option<String>,
    pub submitted_date: Option<String>,
    /// The bill this amendment modifies
    pub amended_bill: Option<JsonValue>,
    pub sponsors: Vec<Member>,
    /// Filled only when cosponsors were requested
    pub cosponsors: Vec<Member>,
    pub cosponsors_count: Option<u64>,
    pub cosponsors_count_including_withdrawn: Option<u64>,
    pub cosponsors_link: Option<RelatedLink>,
    pub actions: Option<RelatedLink>,
    pub amendments: Option<RelatedLink>,
    pub text_versions: Option<RelatedLink>,
    pub update_date: Option<String>,
    pub api_url: Option<String>,
    #[serde(skip)]
    pub raw: JsonValue,
}

impl Amendment {
    pub fn from_payload(obj: &JsonObject, auth: &ApiKeyAuth) -> Self {
        let (latest_action, latest_action_date) = latest_action(obj);
        let cosponsors = object(obj, "cosponsors");

        Self {
            congress: u32_field(obj, "congress"),
            amendment_type: string(obj, "type"),
            number: u32_field(obj, "number"),
            description: string(obj, "description"),
            purpose: string(obj, "purpose"),
            latest_action,
            latest_action_date,
            chamber: string(obj, "chamber"),
            proposed_date: string(obj, "proposedDate"),
            submitted_date: string(obj, "submittedDate"),
            amended_bill: obj.get("amendedBill").filter(|v| !v.is_null()).cloned(),
            sponsors: sponsors(obj, auth),
            cosponsors: Vec::new(),
            cosponsors_count: cosponsors.and_then(|c| u64_field(c, "count")),
            cosponsors_count_including_withdrawn: cosponsors
                .and_then(|c| u64_field(c, "countIncludingWithdrawnCosponsors")),
            cosponsors_link: RelatedLink::from_block(obj, "cosponsors", auth),
            actions: RelatedLink::from_block(obj, "actions", auth),
            amendments: RelatedLink::from_block(obj, "amendments", auth),
            text_versions: RelatedLink::from_block(obj, "textVersions", auth),
            update_date: string(obj, "updateDate"),
            api_url: api_url(obj, auth),
            raw: JsonValue::Object(obj.clone()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Bill {
    pub congress: Option<u32>,
    pub bill_type: Option<String>,
    pub number: Option<u32>,
    pub title: Option<String>,
    pub introduced_date: Option<String>,
    pub origin_chamber: Option<String>,
    pub origin_chamber_code: Option<String>,
    pub latest_action: Option<String>,
    pub latest_action_date: Option<String>,
    /// `sponsors` list merged with a lone `sponsor`
    pub sponsors: Vec<Member>,
    pub policy_area: Option<String>,
    pub laws: Vec<JsonValue>,
    pub constitutional_authority_statement: Option<String>,
    pub cbo_cost_estimates: Vec<JsonValue>,
    pub committee_reports: Vec<JsonValue>,
    pub cosponsors_count: Option<u64>,
    pub cosponsors_count_including_withdrawn: Option<u64>,
    /// Filled only when cosponsors were requested
    pub cosponsors: Vec<Member>,
    pub cosponsors_link: Option<RelatedLink>,
    pub actions: Option<RelatedLink>,
    pub amendments: Option<RelatedLink>,
    pub committees: Option<RelatedLink>,
    pub related_bills: Option<RelatedLink>,
    pub subjects: Option<RelatedLink>,
    pub summaries: Option<RelatedLink>,
    pub titles: Option<RelatedLink>,
    pub texts: Vec<BillTextVersion>,
    /// Public congress.gov page
    pub legislation_url: Option<String>,
    pub update_date: Option<String>,
    pub update_date_including_text: Option<String>,
    pub api_url: Option<String>,
    #[serde(skip)]
    pub raw: JsonValue,
}

impl Bill {
    pub fn from_payload(obj: &JsonObject, auth: &ApiKeyAuth) -> Self {
        let (latest_action, latest_action_date) = latest_action(obj);
        let cosponsors = object(obj, "cosponsors");

        Self {
            congress: u32_field(obj, "congress"),
            bill_type: string(obj, "type").or_else(|| string(obj, "billType")),
            number: u32_field(obj, "number"),
            title: string(obj, "title"),
            introduced_date: string(obj, "introducedDate"),
            origin_chamber: string(obj, "originChamber"),
            origin_chamber_code: string(obj, "originChamberCode"),
            latest_action,
            latest_action_date,
            sponsors: sponsors(obj, auth),
            policy_area: object(obj, "policyArea").and_then(|p| string(p, "name")),
            laws: values(obj, "laws"),
            constitutional_authority_statement: string(obj, "constitutionalAuthorityStatementText"),
            cbo_cost_estimates: values(obj, "cboCostEstimates"),
            committee_reports: values(obj, "committeeReports"),
            cosponsors_count: cosponsors.and_then(|c| u64_field(c, "count")),
            cosponsors_count_including_withdrawn: cosponsors
                .and_then(|c| u64_field(c, "countIncludingWithdrawnCosponsors")),
            cosponsors: Vec::new(),
            cosponsors_link: RelatedLink::from_block(obj, "cosponsors", auth),
            actions: RelatedLink::from_block(obj, "actions", auth),
            amendments: RelatedLink::from_block(obj, "amendments", auth),
            committees: RelatedLink::from_block(obj, "committees", auth),
            related_bills: RelatedLink::from_block(obj, "relatedBills", auth),
            subjects: RelatedLink::from_block(obj, "subjects", auth),
            summaries: RelatedLink::from_block(obj, "summaries", auth),
            titles: RelatedLink::from_block(obj, "titles", auth),
            texts: objects(obj, "textVersions")
                .iter()
                .map(|tv| BillTextVersion {
                    version_type: string(tv, "type"),
                    url: string(tv, "url"),
                    date: string(tv, "date"),
                    raw: JsonValue::Object(tv.clone()),
                })
                .collect(),
            legislation_url: string(obj, "legislationUrl"),
            update_date: string(obj, "updateDate"),
            update_date_including_text: string(obj, "updateDateIncludingText"),
            api_url: api_url(obj, auth),
            raw: JsonValue::Object(obj.clone()),
        }
    }
}
