//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: client → rate gate → HTTP → normalizer → pager → entity stream

use congress_client::{
    ClientConfig, CongressClient, EntityKind, EntityQuery, EntityRecord, Error, ModelResolver,
    QueryParams, Record, StreamOptions,
};
use futures::{StreamExt, TryStreamExt};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY: &str = "test-key";

fn client_for(server: &MockServer) -> CongressClient {
    let config = ClientConfig::builder()
        .api_key(KEY)
        .base_url(format!("{}/v3", server.uri()))
        .min_interval(Duration::ZERO)
        .hourly_budget(0, 0.0)
        .max_attempts(2)
        .backoff(Duration::from_millis(1), Duration::from_millis(5))
        .page_limit(2)
        .build();
    CongressClient::new(config).unwrap()
}

fn details(records: Vec<EntityRecord<Record>>) -> Vec<Record> {
    records
        .into_iter()
        .filter_map(EntityRecord::into_detail)
        .collect()
}

fn numbers(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .map(|item| match &item["number"] {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect()
}

// ============================================================================
// Pagination
// ============================================================================

#[tokio::test]
async fn test_pager_follows_next_link_with_credentials() {
    let server = MockServer::start().await;
    let next = format!("{}/v3/bill/118?offset=2&limit=2&format=json", server.uri());

    Mock::given(method("GET"))
        .and(path("/v3/bill/118"))
        .and(query_param("api_key", KEY))
        .and(query_param("limit", "2"))
        .and(query_param_is_missing("offset"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "bills": [{"number": "1"}, {"number": "2"}],
            "pagination": {"count": 3, "next": next}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v3/bill/118"))
        .and(query_param("offset", "2"))
        .and(query_param("api_key", KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "bills": [{"number": "3"}],
            "pagination": {"count": 3}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let items: Vec<Value> = client
        .stream_items(EntityKind::Bill, &EntityQuery::new().congress(118))
        .unwrap()
        .try_collect()
        .await
        .unwrap();

    assert_eq!(numbers(&items), vec!["1", "2", "3"]);
}

#[tokio::test]
async fn test_pager_stops_on_repeated_next_link() {
    let server = MockServer::start().await;
    let next = format!("{}/v3/member?offset=2", server.uri());

    Mock::given(method("GET"))
        .and(path("/v3/member"))
        .and(query_param_is_missing("offset"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "members": [{"bioguideId": "A000001"}],
            "pagination": {"next": next}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v3/member"))
        .and(query_param("offset", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "members": [{"bioguideId": "B000002"}],
            "pagination": {"next": next}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let items: Vec<Value> = client
        .stream_items(EntityKind::Member, &EntityQuery::new())
        .unwrap()
        .try_collect()
        .await
        .unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[1]["bioguideId"], "B000002");
}

#[tokio::test]
async fn test_xml_page_is_normalized() {
    let server = MockServer::start().await;
    let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<api-root>
  <bills>
    <item><congress>118</congress><number>10</number><type>HR</type></item>
    <item><congress>118</congress><number>11</number><type>HR</type></item>
  </bills>
  <pagination><count>2</count></pagination>
</api-root>"#;

    Mock::given(method("GET"))
        .and(path("/v3/bill/118/hr"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(xml, "application/xml"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let query = EntityQuery::new().congress(118).bill_type("HR");
    let items: Vec<Value> = client
        .stream_items(EntityKind::Bill, &query)
        .unwrap()
        .try_collect()
        .await
        .unwrap();

    assert_eq!(numbers(&items), vec!["10", "11"]);
    assert_eq!(items[0]["type"], "HR");
}

#[tokio::test]
async fn test_congress_range_walks_in_order() {
    let server = MockServer::start().await;

    for congress in [117, 118] {
        Mock::given(method("GET"))
            .and(path(format!("/v3/hearing/{congress}/house")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "hearings": [{"jacketNumber": congress * 10, "congress": congress}],
                "pagination": {}
            })))
            .expect(1)
            .mount(&server)
            .await;
    }

    let client = client_for(&server);
    let query = EntityQuery::new()
        .congress_range(118, 117)
        .chamber(congress_client::Chamber::House);
    let items: Vec<Value> = client
        .stream_items(EntityKind::Hearing, &query)
        .unwrap()
        .try_collect()
        .await
        .unwrap();

    let congresses: Vec<u64> = items.iter().filter_map(|i| i["congress"].as_u64()).collect();
    assert_eq!(congresses, vec![117, 118]);
}

// ============================================================================
// Transport
// ============================================================================

#[tokio::test]
async fn test_rate_limited_request_retries_after_hint() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3/committee/house/hsag00"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0.05"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v3/committee/house/hsag00"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "committee": {"systemCode": "hsag00", "name": "Agriculture"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let start = Instant::now();
    let committee = client.get_committee("House", "hsag00").await.unwrap();

    assert!(start.elapsed() >= Duration::from_millis(50));
    assert_eq!(committee.system_code.as_deref(), Some("hsag00"));
}

#[tokio::test]
async fn test_missing_resource_fails_without_retry() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3/member/Z999999"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.get_member("Z999999").await.unwrap_err();

    assert!(matches!(err, Error::HttpStatus { status: 404, .. }));
    assert!(!err.to_string().contains(KEY));
}

#[tokio::test]
async fn test_raw_get_passes_extra_params() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3/bill/118/hr/3076/actions"))
        .and(query_param("api_key", KEY))
        .and(query_param("limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "actions": [{"text": "Became Public Law"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let body = client
        .get("bill/118/hr/3076/actions", &QueryParams::new().set("limit", 50))
        .await
        .unwrap();

    assert_eq!(body["actions"][0]["text"], "Became Public Law");
}

// ============================================================================
// Hydration
// ============================================================================

async fn mount_bill_list(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v3/bill/118/hr"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "bills": [
                {"congress": 118, "type": "HR", "number": "1"},
                {"congress": 118, "type": "HR", "number": "2"},
                {"congress": 118, "type": "HR", "number": "3"}
            ],
            "pagination": {"count": 3}
        })))
        .mount(server)
        .await;

    for number in [1, 3] {
        Mock::given(method("GET"))
            .and(path(format!("/v3/bill/118/hr/{number}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "bill": {
                    "congress": 118,
                    "type": "HR",
                    "number": number.to_string(),
                    "title": format!("Bill {number}")
                }
            })))
            .mount(server)
            .await;
    }

    Mock::given(method("GET"))
        .and(path("/v3/bill/118/hr/2"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_hydration_skips_failed_details() {
    let server = MockServer::start().await;
    mount_bill_list(&server).await;

    let client = client_for(&server);
    let query = EntityQuery::new().congress(118).bill_type("hr");
    let records: Vec<EntityRecord<Record>> = client
        .stream_entities(EntityKind::Bill, &query, StreamOptions::new().hydrate(true))
        .unwrap()
        .try_collect()
        .await
        .unwrap();
    let records = details(records);

    let titles: Vec<Option<String>> = records
        .iter()
        .map(|record| match record {
            Record::Bill(bill) => bill.title.clone(),
            other => panic!("unexpected record: {other:?}"),
        })
        .collect();
    assert_eq!(
        titles,
        vec![Some("Bill 1".to_string()), Some("Bill 3".to_string())]
    );
}

#[tokio::test]
async fn test_hydration_fail_fast_ends_stream() {
    let server = MockServer::start().await;
    mount_bill_list(&server).await;

    let client = client_for(&server);
    let query = EntityQuery::new().congress(118).bill_type("hr");
    let options = StreamOptions::new().hydrate(true).continue_on_error(false);
    let results: Vec<_> = client
        .stream_entities(EntityKind::Bill, &query, options)
        .unwrap()
        .collect()
        .await;

    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    assert!(matches!(
        results[1],
        Err(Error::HttpStatus { status: 500, .. })
    ));
}

#[tokio::test]
async fn test_bill_with_cosponsors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3/bill/118/hr/3076"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "bill": {
                "congress": 118,
                "type": "HR",
                "number": "3076",
                "title": "Postal Service Reform Act",
                "cosponsors": {
                    "count": 2,
                    "url": format!("{}/v3/bill/118/hr/3076/cosponsors?format=json", server.uri())
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v3/bill/118/hr/3076/cosponsors"))
        .and(query_param("api_key", KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cosponsors": [
                {"bioguideId": "C001", "fullName": "Rep. One", "isOriginalCosponsor": true},
                {"bioguideId": "C002", "fullName": "Rep. Two", "isOriginalCosponsor": false}
            ],
            "pagination": {"count": 2}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let bill = client.get_bill(118, "HR", 3076, true).await.unwrap();

    assert_eq!(bill.number, Some(3076));
    assert_eq!(bill.cosponsors_count, Some(2));
    let ids: Vec<&str> = bill.cosponsors.iter().map(|m| m.bioguide_id.as_str()).collect();
    assert_eq!(ids, vec!["C001", "C002"]);
    assert_eq!(bill.cosponsors[0].is_original_cosponsor, Some(true));
    assert!(bill
        .cosponsors_link
        .as_ref()
        .and_then(|link| link.url.as_deref())
        .is_some_and(|url| url.contains("api_key=test-key")));
}

#[tokio::test]
async fn test_resolver_with_cosponsors_through_stream() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3/amendment/117/samdt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "amendments": [{"congress": 117, "type": "SAMDT", "number": "2137"}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v3/amendment/117/samdt/2137"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "amendment": {"congress": 117, "type": "SAMDT", "number": "2137"}
        })))
        .mount(&server)
        .await;

    // Cosponsor failures leave the list empty
    Mock::given(method("GET"))
        .and(path("/v3/amendment/117/samdt/2137/cosponsors"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let query = EntityQuery::new().congress(117).amendment_type("samdt");
    let resolver = ModelResolver::new(&client).include_cosponsors(true);
    let records: Vec<EntityRecord<Record>> = client
        .stream_entities_with(
            EntityKind::Amendment,
            &query,
            StreamOptions::new().hydrate(true),
            resolver,
        )
        .unwrap()
        .try_collect()
        .await
        .unwrap();
    let records = details(records);

    assert_eq!(records.len(), 1);
    match &records[0] {
        Record::Amendment(amendment) => {
            assert_eq!(amendment.number, Some(2137));
            assert!(amendment.cosponsors.is_empty());
        }
        other => panic!("unexpected record: {other:?}"),
    }
}

// ============================================================================
// Bill amendments
// ============================================================================

async fn mount_bill_amendments(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v3/bill/117/hr/3684/amendments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "amendments": [
                {
                    "congress": 117,
                    "type": "SAMDT",
                    "number": "2137",
                    "description": "In the nature of a substitute.",
                    "latestAction": {"actionDate": "2021-08-01", "text": "Agreed to."}
                },
                {"congress": 117, "type": "SAMDT", "number": "2138"},
                {"congress": 117, "type": "SAMDT", "number": "2139"}
            ],
            "pagination": {"count": 3}
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_bill_amendments_summaries_with_limit() {
    let server = MockServer::start().await;
    mount_bill_amendments(&server).await;

    let client = client_for(&server);
    let amendments = client
        .get_bill_amendments(117, "HR", 3684, false, Some(2))
        .await
        .unwrap();

    let numbers: Vec<Option<u32>> = amendments.iter().map(|a| a.number).collect();
    assert_eq!(numbers, vec![Some(2137), Some(2138)]);
    assert_eq!(amendments[0].amendment_type.as_deref(), Some("SAMDT"));
    assert_eq!(amendments[0].latest_action.as_deref(), Some("Agreed to."));
    assert_eq!(amendments[0].latest_action_date.as_deref(), Some("2021-08-01"));
    assert!(amendments[0].cosponsors.is_empty());
}

#[tokio::test]
async fn test_bill_amendments_hydrated() {
    let server = MockServer::start().await;
    mount_bill_amendments(&server).await;

    for number in [2137, 2138, 2139] {
        Mock::given(method("GET"))
            .and(path(format!("/v3/amendment/117/samdt/{number}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "amendment": {
                    "congress": 117,
                    "type": "SAMDT",
                    "number": number.to_string(),
                    "purpose": format!("Purpose {number}")
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path(format!("/v3/amendment/117/samdt/{number}/cosponsors")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "cosponsors": [{"bioguideId": format!("S{number}")}]
            })))
            .expect(1)
            .mount(&server)
            .await;
    }

    let client = client_for(&server);
    let amendments = client
        .get_bill_amendments(117, "hr", 3684, true, None)
        .await
        .unwrap();

    assert_eq!(amendments.len(), 3);
    assert_eq!(amendments[2].purpose.as_deref(), Some("Purpose 2139"));
    assert_eq!(amendments[2].cosponsors.len(), 1);
    assert_eq!(amendments[2].cosponsors[0].bioguide_id, "S2139");
}
