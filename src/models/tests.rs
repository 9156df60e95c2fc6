//! Tests for the typed records

use super::*;
use crate::auth::ApiKeyAuth;
use crate::client::CongressClient;
use crate::config::ClientConfig;
use crate::decode::Normalizer;
use crate::entities::{Detail, DetailResolver, EntityKind, EntityQuery};
use crate::types::{JsonObject, JsonValue};
use pretty_assertions::assert_eq;
use serde_json::json;

fn auth() -> ApiKeyAuth {
    ApiKeyAuth::new("KEY", "https://api.congress.gov/v3").unwrap()
}

fn obj(value: JsonValue) -> JsonObject {
    match value {
        JsonValue::Object(map) => map,
        other => panic!("not an object: {other}"),
    }
}

#[test]
fn test_bill_from_json_payload() {
    let payload = obj(json!({
        "congress": 118,
        "type": "HR",
        "number": "3076",
        "title": "Postal Service Reform Act",
        "introducedDate": "2023-05-05",
        "originChamber": "House",
        "latestAction": {"text": "Became Public Law", "actionDate": "2023-06-01"},
        "policyArea": {"name": "Government Operations and Politics"},
        "sponsors": [{"bioguideId": "M000087", "fullName": "Rep. Maloney", "party": "D"}],
        "sponsor": {"bioguideId": "C000001", "fullName": "Rep. Other"},
        "cosponsors": {"count": 2, "countIncludingWithdrawnCosponsors": 3,
                       "url": "https://api.congress.gov/v3/bill/118/hr/3076/cosponsors?format=json"},
        "actions": {"count": 12, "url": "https://api.congress.gov/v3/bill/118/hr/3076/actions"},
        "textVersions": {"item": {"type": "Enrolled", "date": "2023-06-01",
                                  "url": "https://www.congress.gov/118/bills/hr3076/BILLS-118hr3076enr.pdf"}},
        "url": "https://api.congress.gov/v3/bill/118/hr/3076?format=json"
    }));

    let bill = Bill::from_payload(&payload, &auth());

    assert_eq!(bill.congress, Some(118));
    assert_eq!(bill.bill_type.as_deref(), Some("HR"));
    assert_eq!(bill.number, Some(3076));
    assert_eq!(bill.latest_action.as_deref(), Some("Became Public Law"));
    assert_eq!(bill.latest_action_date.as_deref(), Some("2023-06-01"));
    assert_eq!(
        bill.policy_area.as_deref(),
        Some("Government Operations and Politics")
    );
    assert_eq!(
        bill.sponsors
            .iter()
            .map(|m| m.bioguide_id.as_str())
            .collect::<Vec<_>>(),
        vec!["M000087", "C000001"]
    );
    assert_eq!(bill.cosponsors_count, Some(2));
    assert_eq!(bill.cosponsors_count_including_withdrawn, Some(3));
    assert_eq!(
        bill.cosponsors_link.as_ref().and_then(|l| l.url.as_deref()),
        Some("https://api.congress.gov/v3/bill/118/hr/3076/cosponsors?format=json&api_key=KEY")
    );
    assert_eq!(bill.actions.as_ref().and_then(|l| l.count), Some(12));
    assert!(bill.subjects.is_none());

    // Document links on another host stay as published
    assert_eq!(bill.texts.len(), 1);
    assert_eq!(
        bill.texts[0].url.as_deref(),
        Some("https://www.congress.gov/118/bills/hr3076/BILLS-118hr3076enr.pdf")
    );
    assert_eq!(
        bill.api_url.as_deref(),
        Some("https://api.congress.gov/v3/bill/118/hr/3076?format=json&api_key=KEY")
    );
    assert_eq!(bill.raw, JsonValue::Object(payload));
}

#[test]
fn test_sponsor_already_listed_is_not_duplicated() {
    let sponsor = json!({"bioguideId": "M000087"});
    let payload = obj(json!({"sponsors": [sponsor.clone()], "sponsor": sponsor}));
    let bill = Bill::from_payload(&payload, &auth());
    assert_eq!(bill.sponsors.len(), 1);
}

#[test]
fn test_member_from_xml_shaped_payload() {
    // XML payloads carry every scalar as a string
    let payload = obj(json!({
        "bioguideId": "S000148",
        "directOrderName": "Charles E. Schumer",
        "partyName": "Democratic",
        "state": "New York",
        "currentMember": "True",
        "terms": {"item": [
            {"chamber": "House of Representatives", "congress": "97", "startYear": "1981", "endYear": "1983"},
            {"chamber": "Senate", "congress": "118", "startYear": "2023"}
        ]}
    }));

    let member = Member::from_payload(&payload, &auth());

    assert_eq!(member.bioguide_id, "S000148");
    assert_eq!(member.full_name.as_deref(), Some("Charles E. Schumer"));
    assert_eq!(member.party.as_deref(), Some("Democratic"));
    assert_eq!(member.is_current, Some(true));
    assert_eq!(member.roles.len(), 2);
    assert_eq!(member.roles[0].congress, Some(97));
    assert_eq!(member.roles[0].start_year, Some(1981));
    assert_eq!(member.roles[1].end_year, None);
    assert!(member.api_url.is_none());
}

#[test]
fn test_cosponsor_metadata() {
    let payload = obj(json!({
        "bioguideId": "A000370",
        "sponsorshipDate": "2023-05-05",
        "isOriginalCosponsor": true
    }));
    let member = Member::from_payload(&payload, &auth());
    assert_eq!(member.sponsorship_date.as_deref(), Some("2023-05-05"));
    assert_eq!(member.is_original_cosponsor, Some(true));
    assert_eq!(member.sponsorship_withdrawn_date, None);
}

#[test]
fn test_hearing_single_wrapped_blocks() {
    let payload = obj(json!({
        "jacketNumber": 51314,
        "congress": 118,
        "chamber": "House",
        "title": "Oversight Hearing",
        "committees": {"item": {"name": "Natural Resources", "systemCode": "hsii00"}},
        "dates": {"item": {"date": "2023-03-09"}},
        "formats": {"item": [
            {"type": "PDF", "url": "https://www.congress.gov/118/chrg/CHRG-118hhrg51314/CHRG-118hhrg51314.pdf"},
            {"type": "Formatted Text", "url": "https://www.congress.gov/118/chrg/CHRG-118hhrg51314/generated/CHRG-118hhrg51314.htm"}
        ]}
    }));

    let hearing = Hearing::from_payload(&payload, &auth());

    assert_eq!(hearing.jacket_number.as_deref(), Some("51314"));
    assert_eq!(
        hearing.committees,
        vec![CommitteeRef {
            name: Some("Natural Resources".into()),
            system_code: Some("hsii00".into()),
        }]
    );
    assert_eq!(hearing.dates, vec!["2023-03-09".to_string()]);
    assert_eq!(hearing.formats.len(), 2);
    assert_eq!(hearing.formats[0].format_type.as_deref(), Some("PDF"));
}

#[test]
fn test_committee_name_from_current_history() {
    let payload = obj(json!({
        "systemCode": "hsag00",
        "type": "Standing",
        "history": [
            {"libraryOfCongressName": "Agriculture (old)", "startDate": "1900-01-01", "endDate": "1990-01-01"},
            {"libraryOfCongressName": "Agriculture", "startDate": "1990-01-02"}
        ],
        "subcommittees": [
            {"systemCode": "hsag15", "name": "Conservation",
             "url": "https://api.congress.gov/v3/committee/house/hsag15"}
        ],
        "parent": null
    }));

    let committee = Committee::from_payload(&payload, &auth());

    assert_eq!(committee.name.as_deref(), Some("Agriculture"));
    assert_eq!(committee.committee_type.as_deref(), Some("Standing"));
    assert_eq!(committee.parent_system_code, None);
    assert_eq!(committee.subcommittees.len(), 1);
    assert_eq!(
        committee.subcommittees[0].api_url.as_deref(),
        Some("https://api.congress.gov/v3/committee/house/hsag15?api_key=KEY")
    );
}

#[test]
fn test_committee_meeting_related_items() {
    let payload = obj(json!({
        "eventId": "115538",
        "congress": 118,
        "chamber": "House",
        "meetingStatus": "Scheduled",
        "location": {"building": "Rayburn", "room": "2123"},
        "witnesses": {"item": [{"name": "A"}, {"name": "B"}]},
        "relatedItems": {"bills": {"item": {"number": "1"}}, "nominations": [], "treaties": null}
    }));

    let meeting = CommitteeMeeting::from_payload(&payload, &auth());

    assert_eq!(meeting.event_id.as_deref(), Some("115538"));
    assert_eq!(meeting.room.as_deref(), Some("2123"));
    assert_eq!(meeting.witnesses.len(), 2);
    assert_eq!(meeting.related_bills, vec![json!({"number": "1"})]);
    assert!(meeting.related_nominations.is_empty());
    assert!(meeting.related_treaties.is_empty());
}

#[test]
fn test_amendment_from_payload() {
    let payload = obj(json!({
        "congress": "117",
        "type": "SAMDT",
        "number": "2137",
        "purpose": "In the nature of a substitute.",
        "amendedBill": {"congress": 117, "type": "HR", "number": "3684"},
        "sponsors": {"item": {"bioguideId": "S001191"}},
        "cosponsors": {"count": "0"}
    }));

    let amendment = Amendment::from_payload(&payload, &auth());

    assert_eq!(amendment.congress, Some(117));
    assert_eq!(amendment.number, Some(2137));
    assert_eq!(amendment.sponsors[0].bioguide_id, "S001191");
    assert_eq!(amendment.cosponsors_count, Some(0));
    assert!(amendment.cosponsors_link.is_some());
    assert_eq!(amendment.amended_bill.as_ref().unwrap()["number"], "3684");
}

#[test]
fn test_record_serializes_with_kind_and_exposes_raw() {
    let payload = obj(json!({"bioguideId": "X000001", "name": "X"}));
    let record = Record::Member(Member::from_payload(&payload, &auth()));

    assert_eq!(record.kind(), EntityKind::Member);
    assert_eq!(record.raw(), Some(&JsonValue::Object(payload.clone())));

    let serialized = serde_json::to_value(&record).unwrap();
    assert_eq!(serialized["kind"], "member");
    assert_eq!(serialized["bioguide_id"], "X000001");
    assert!(serialized.get("raw").is_none());
}

#[tokio::test]
async fn test_model_resolver_skips_items_without_keys() {
    let config = ClientConfig::builder()
        .api_key("KEY")
        .base_url("http://127.0.0.1:1/v3")
        .build();
    let client = CongressClient::with_normalizer(config, Normalizer::json_only()).unwrap();
    let resolver = ModelResolver::new(&client);
    let query = EntityQuery::new();

    let cases = [
        (EntityKind::Hearing, json!({"jacketNumber": 1, "congress": 118})),
        (EntityKind::CommitteeMeeting, json!({"congress": 118, "chamber": "House"})),
        (EntityKind::Committee, json!({"systemCode": "hsag00"})),
        (EntityKind::Bill, json!({"congress": 118, "number": 1})),
        (EntityKind::Member, json!({"name": "no id"})),
        (EntityKind::Amendment, json!({"congress": 118, "type": "samdt"})),
        (EntityKind::Bill, json!("not an object")),
    ];

    for (kind, item) in cases {
        let resolved = resolver.resolve(kind, &item, &query).await.unwrap();
        assert!(resolved.is_none(), "{kind} {item} should be skipped");
    }
}
