//! Entity streaming types

use crate::error::{Error, Result};
use crate::types::{Chamber, JsonValue, QueryParams};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Filter applied to raw items, or to a detail record's raw payload
pub type Predicate = Arc<dyn Fn(&JsonValue) -> bool + Send + Sync>;

/// Kinds of entity the streamer can list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Committee hearings
    Hearing,
    /// Committee meetings
    CommitteeMeeting,
    /// Committees
    Committee,
    /// Bills and resolutions
    Bill,
    /// Members of Congress
    Member,
    /// Amendments
    Amendment,
}

impl EntityKind {
    /// Every kind, in declaration order
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Hearing,
        EntityKind::CommitteeMeeting,
        EntityKind::Committee,
        EntityKind::Bill,
        EntityKind::Member,
        EntityKind::Amendment,
    ];

    /// Snake-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hearing => "hearing",
            Self::CommitteeMeeting => "committee_meeting",
            Self::Committee => "committee",
            Self::Bill => "bill",
            Self::Member => "member",
            Self::Amendment => "amendment",
        }
    }

    /// Key of the collection block in list responses
    pub fn data_key(&self) -> &'static str {
        match self {
            Self::Hearing => "hearings",
            Self::CommitteeMeeting => "committeeMeetings",
            Self::Committee => "committees",
            Self::Bill => "bills",
            Self::Member => "members",
            Self::Amendment => "amendments",
        }
    }

    /// Whether listing requires a congress number
    pub fn is_congress_scoped(&self) -> bool {
        matches!(
            self,
            Self::Hearing | Self::CommitteeMeeting | Self::Bill | Self::Amendment
        )
    }

    /// List request for one congress (or none, for unscoped kinds)
    pub fn list_request(&self, congress: Option<u32>, query: &EntityQuery) -> ListRequest {
        let chamber = query.chamber.map(|c| c.as_str());

        match self {
            Self::Hearing | Self::CommitteeMeeting | Self::Bill | Self::Amendment => {
                let root = match self {
                    Self::Hearing => "hearing",
                    Self::CommitteeMeeting => "committee-meeting",
                    Self::Bill => "bill",
                    _ => "amendment",
                };
                let mut path = match congress {
                    Some(congress) => format!("{root}/{congress}"),
                    None => root.to_string(),
                };
                let sub = match self {
                    Self::Bill => query.bill_type.as_deref().map(str::to_lowercase),
                    Self::Amendment => query.amendment_type.as_deref().map(str::to_lowercase),
                    _ => chamber.map(str::to_string),
                };
                if let (Some(sub), Some(_)) = (sub, congress) {
                    path.push('/');
                    path.push_str(&sub);
                }

                let params = if *self == Self::Bill {
                    QueryParams::new()
                        .set_opt("introducedDateStart", query.introduced_start.as_deref())
                        .set_opt("introducedDateEnd", query.introduced_end.as_deref())
                } else {
                    QueryParams::new()
                };
                ListRequest { path, params }
            }
            Self::Committee => match (congress, chamber) {
                (Some(congress), Some(chamber)) => {
                    ListRequest::new(format!("committee/{congress}/{chamber}"))
                }
                _ => ListRequest::new("committee"),
            },
            Self::Member => match (congress, chamber) {
                (Some(congress), Some(chamber)) => {
                    ListRequest::new(format!("member/{congress}/{chamber}"))
                }
                _ => ListRequest {
                    path: "member".to_string(),
                    params: QueryParams::new()
                        .set_opt("congress", congress)
                        .set_opt("chamber", chamber)
                        .set_opt("state", query.state.as_deref())
                        .set_opt("district", query.district.as_deref())
                        .set_opt("currentMember", query.current),
                },
            },
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| Error::invalid_value("entity", format!("unknown entity kind '{s}'")))
    }
}

/// Path and query of one collection walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    /// Path relative to the base URL
    pub path: String,
    /// Caller parameters for the first page
    pub params: QueryParams,
}

impl ListRequest {
    fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            params: QueryParams::new(),
        }
    }
}

/// Scoping parameters for a stream
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityQuery {
    /// Single congress
    pub congress: Option<u32>,
    /// Inclusive congress range, in either order; wins over `congress`
    pub congress_range: Option<(u32, u32)>,
    /// Chamber filter
    pub chamber: Option<Chamber>,
    /// Bill type (`hr`, `s`, `hjres`, ...)
    pub bill_type: Option<String>,
    /// Amendment type (`hamdt`, `samdt`, ...)
    pub amendment_type: Option<String>,
    /// Earliest introduced date for bills
    pub introduced_start: Option<String>,
    /// Latest introduced date for bills
    pub introduced_end: Option<String>,
    /// Member state
    pub state: Option<String>,
    /// Member district
    pub district: Option<String>,
    /// Only current members
    pub current: Option<bool>,
}

impl EntityQuery {
    /// Create an empty query
    pub fn new() -> Self {
        Self::default()
    }

    /// Scope to one congress
    #[must_use]
    pub fn congress(mut self, congress: u32) -> Self {
        self.congress = Some(congress);
        self
    }

    /// Scope to an inclusive range of congresses
    #[must_use]
    pub fn congress_range(mut self, from: u32, to: u32) -> Self {
        self.congress_range = Some((from, to));
        self
    }

    /// Filter by chamber
    #[must_use]
    pub fn chamber(mut self, chamber: Chamber) -> Self {
        self.chamber = Some(chamber);
        self
    }

    /// Filter bills by type
    #[must_use]
    pub fn bill_type(mut self, bill_type: impl Into<String>) -> Self {
        self.bill_type = Some(bill_type.into());
        self
    }

    /// Filter amendments by type
    #[must_use]
    pub fn amendment_type(mut self, amendment_type: impl Into<String>) -> Self {
        self.amendment_type = Some(amendment_type.into());
        self
    }

    /// Earliest introduced date for bills (`YYYY-MM-DDT00:00:00Z`)
    #[must_use]
    pub fn introduced_start(mut self, start: impl Into<String>) -> Self {
        self.introduced_start = Some(start.into());
        self
    }

    /// Latest introduced date for bills
    #[must_use]
    pub fn introduced_end(mut self, end: impl Into<String>) -> Self {
        self.introduced_end = Some(end.into());
        self
    }

    /// Filter members by state
    #[must_use]
    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Filter members by district
    #[must_use]
    pub fn district(mut self, district: impl Into<String>) -> Self {
        self.district = Some(district.into());
        self
    }

    /// Filter members by current status
    #[must_use]
    pub fn current(mut self, current: bool) -> Self {
        self.current = Some(current);
        self
    }

    /// Congress numbers to walk, in order
    pub fn congresses(&self) -> Vec<u32> {
        match self.congress_range {
            Some((a, b)) => (a.min(b)..=a.max(b)).collect(),
            None => self.congress.into_iter().collect(),
        }
    }
}

/// How a stream treats its items
#[derive(Clone)]
pub struct StreamOptions {
    /// Resolve every item into a detail record
    pub hydrate: bool,
    /// Skip items whose detail fetch fails at the transport level
    pub continue_on_error: bool,
    /// Optional filter
    pub predicate: Option<Predicate>,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            hydrate: false,
            continue_on_error: true,
            predicate: None,
        }
    }
}

impl StreamOptions {
    /// Fast path, no filter, continue on error
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable hydration
    #[must_use]
    pub fn hydrate(mut self, hydrate: bool) -> Self {
        self.hydrate = hydrate;
        self
    }

    /// Set the detail-fetch error policy
    #[must_use]
    pub fn continue_on_error(mut self, continue_on_error: bool) -> Self {
        self.continue_on_error = continue_on_error;
        self
    }

    /// Only yield items the predicate accepts
    #[must_use]
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&JsonValue) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    pub(crate) fn accepts(&self, probe: &JsonValue) -> bool {
        self.predicate.as_ref().map_or(true, |p| p(probe))
    }
}

impl fmt::Debug for StreamOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamOptions")
            .field("hydrate", &self.hydrate)
            .field("continue_on_error", &self.continue_on_error)
            .field("predicate", &self.predicate.is_some())
            .finish()
    }
}

/// One streamed entity: a raw list item or a resolved detail record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EntityRecord<D> {
    /// Raw list item (fast path)
    Item(JsonValue),
    /// Resolved detail record (hydrated path)
    Detail(D),
}

impl<D> EntityRecord<D> {
    /// The raw item, if this is one
    pub fn as_item(&self) -> Option<&JsonValue> {
        match self {
            Self::Item(item) => Some(item),
            Self::Detail(_) => None,
        }
    }

    /// Take the detail record, if this is one
    pub fn into_detail(self) -> Option<D> {
        match self {
            Self::Item(_) => None,
            Self::Detail(detail) => Some(detail),
        }
    }
}
