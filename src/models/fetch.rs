//! Detail fetchers

use super::fields::{string, u32_field};
use super::records::{Amendment, Bill, Committee, CommitteeMeeting, Hearing, Member};
use crate::client::CongressClient;
use crate::error::Result;
use crate::types::{JsonObject, QueryParams};
use futures::{StreamExt, TryStreamExt};
use serde_json::Value;
use tracing::debug;

/// The object under `key`, or an empty one
fn detail_block(mut body: JsonObject, key: &str) -> JsonObject {
    match body.remove(key) {
        Some(Value::Object(block)) => block,
        _ => JsonObject::new(),
    }
}

impl CongressClient {
    /// Committee detail (`committee/{chamber}/{systemCode}`)
    pub async fn get_committee(&self, chamber: &str, system_code: &str) -> Result<Committee> {
        let path = format!("committee/{}/{system_code}", chamber.to_lowercase());
        let body = self.get(&path, &QueryParams::new()).await?;
        let mut committee = Committee::from_payload(&detail_block(body, "committee"), self.auth());
        committee.api_url.get_or_insert_with(|| self.with_auth(&self.url_for(&path)));
        Ok(committee)
    }

    /// Hearing detail (`hearing/{congress}/{chamber}/{jacketNumber}`)
    pub async fn get_hearing(
        &self,
        congress: u32,
        chamber: &str,
        jacket_number: &str,
    ) -> Result<Hearing> {
        let path = format!("hearing/{congress}/{}/{jacket_number}", chamber.to_lowercase());
        let body = self.get(&path, &QueryParams::new()).await?;
        let mut hearing = Hearing::from_payload(&detail_block(body, "hearing"), self.auth());
        hearing.api_url.get_or_insert_with(|| self.with_auth(&self.url_for(&path)));
        Ok(hearing)
    }

    /// Committee meeting detail (`committee-meeting/{congress}/{chamber}/{eventId}`)
    pub async fn get_committee_meeting(
        &self,
        congress: u32,
        chamber: &str,
        event_id: &str,
    ) -> Result<CommitteeMeeting> {
        let path = format!(
            "committee-meeting/{congress}/{}/{event_id}",
            chamber.to_lowercase()
        );
        let body = self.get(&path, &QueryParams::new()).await?;
        let mut meeting =
            CommitteeMeeting::from_payload(&detail_block(body, "committeeMeeting"), self.auth());
        meeting.api_url.get_or_insert_with(|| self.with_auth(&self.url_for(&path)));
        Ok(meeting)
    }

    /// Member detail (`member/{bioguideId}`)
    pub async fn get_member(&self, bioguide_id: &str) -> Result<Member> {
        let path = format!("member/{bioguide_id}");
        let body = self.get(&path, &QueryParams::new()).await?;
        let mut member = Member::from_payload(&detail_block(body, "member"), self.auth());
        member.api_url.get_or_insert_with(|| self.with_auth(&self.url_for(&path)));
        Ok(member)
    }

    /// Bill detail (`bill/{congress}/{type}/{number}`).
    ///
    /// With `include_cosponsors` the full cosponsor list is walked too,
    /// when the bill advertises one.
    pub async fn get_bill(
        &self,
        congress: u32,
        bill_type: &str,
        number: u32,
        include_cosponsors: bool,
    ) -> Result<Bill> {
        let bill_type = bill_type.to_lowercase();
        let path = format!("bill/{congress}/{bill_type}/{number}");
        let body = self.get(&path, &QueryParams::new()).await?;
        let mut bill = Bill::from_payload(&detail_block(body, "bill"), self.auth());
        bill.api_url.get_or_insert_with(|| self.with_auth(&self.url_for(&path)));

        if include_cosponsors && bill.cosponsors_link.is_some() {
            bill.cosponsors = self.get_bill_cosponsors(congress, &bill_type, number).await?;
        }
        Ok(bill)
    }

    /// All cosponsors of a bill
    pub async fn get_bill_cosponsors(
        &self,
        congress: u32,
        bill_type: &str,
        number: u32,
    ) -> Result<Vec<Member>> {
        let path = format!("bill/{congress}/{}/{number}/cosponsors", bill_type.to_lowercase());
        self.collect_members(&path).await
    }

    /// Amendments to a bill (`bill/{congress}/{type}/{number}/amendments`).
    ///
    /// List entries become summary-level amendments. With `hydrate`, every
    /// entry carrying congress, type and number is replaced by its full
    /// detail, cosponsors included. `limit` caps how many are returned and
    /// stops the walk early; `None` or zero means all.
    pub async fn get_bill_amendments(
        &self,
        congress: u32,
        bill_type: &str,
        number: u32,
        hydrate: bool,
        limit: Option<usize>,
    ) -> Result<Vec<Amendment>> {
        let path = format!("bill/{congress}/{}/{number}/amendments", bill_type.to_lowercase());
        let limit = limit.filter(|&n| n > 0).unwrap_or(usize::MAX);

        let items: Vec<JsonObject> = self
            .page(&path, "amendments", QueryParams::new())
            .try_filter_map(|item| async move {
                Ok(match item {
                    Value::Object(obj) => Some(obj),
                    _ => None,
                })
            })
            .take(limit)
            .try_collect()
            .await?;

        let mut amendments = Vec::with_capacity(items.len());
        for item in items {
            if hydrate {
                if let (Some(congress), Some(amendment_type), Some(number)) = (
                    u32_field(&item, "congress"),
                    string(&item, "type"),
                    u32_field(&item, "number"),
                ) {
                    amendments.push(
                        self.get_amendment(congress, &amendment_type, number, true)
                            .await?,
                    );
                    continue;
                }
            }
            amendments.push(Amendment::from_payload(&item, self.auth()));
        }
        Ok(amendments)
    }

    /// Amendment detail (`amendment/{congress}/{type}/{number}`).
    ///
    /// With `include_cosponsors` the cosponsor list is fetched as well; a
    /// failure there leaves the list empty instead of failing the call.
    pub async fn get_amendment(
        &self,
        congress: u32,
        amendment_type: &str,
        number: u32,
        include_cosponsors: bool,
    ) -> Result<Amendment> {
        let amendment_type = amendment_type.to_lowercase();
        let path = format!("amendment/{congress}/{amendment_type}/{number}");
        let body = self.get(&path, &QueryParams::new()).await?;
        let mut amendment = Amendment::from_payload(&detail_block(body, "amendment"), self.auth());
        amendment.api_url.get_or_insert_with(|| self.with_auth(&self.url_for(&path)));

        if include_cosponsors {
            match self
                .get_amendment_cosponsors(congress, &amendment_type, number)
                .await
            {
                Ok(cosponsors) => amendment.cosponsors = cosponsors,
                Err(e) => debug!(
                    congress,
                    amendment_type = %amendment_type,
                    number,
                    error = %e,
                    "Could not fetch amendment cosponsors"
                ),
            }
        }
        Ok(amendment)
    }

    /// All cosponsors of an amendment
    pub async fn get_amendment_cosponsors(
        &self,
        congress: u32,
        amendment_type: &str,
        number: u32,
    ) -> Result<Vec<Member>> {
        let path = format!(
            "amendment/{congress}/{}/{number}/cosponsors",
            amendment_type.to_lowercase()
        );
        self.collect_members(&path).await
    }

    async fn collect_members(&self, path: &str) -> Result<Vec<Member>> {
        self.page(path, "cosponsors", QueryParams::new())
            .try_filter_map(|item| async move {
                Ok(match item {
                    Value::Object(obj) => Some(Member::from_payload(&obj, self.auth())),
                    _ => None,
                })
            })
            .try_collect()
            .await
    }
}
