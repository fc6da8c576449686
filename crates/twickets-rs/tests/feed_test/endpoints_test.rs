use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use reqwest::StatusCode;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use twickets_rs::feed::models::{FetchTicketListingsInput, MaxNumber};
use twickets_rs::location::{Country, Region};
use twickets_rs::transport::{FeedRequest, FeedResponse, Transport};
use twickets_rs::{ClientConfig, TwicketsClient, TwicketsError};

use crate::common::*;

fn uk_input() -> FetchTicketListingsInput {
    FetchTicketListingsInput::new(Country::UnitedKingdom)
}

fn event_names(listings: &twickets_rs::TicketListings) -> Vec<String> {
    listings.iter().map(|l| l.event.name.clone()).collect()
}

/// FETCH TESTS
#[tokio::test]
async fn test_fetch_listings_default_max_number() {
    let test_time = test_time();
    let transport = MockTransport::new();
    register_page(&transport, &TEST_EVENTS[..10], test_time, Duration::minutes(1));
    let client = setup_client(transport.clone());

    let listings = client
        .fetch_ticket_listings(
            &CancellationToken::new(),
            &FetchTicketListingsInput {
                created_before: Some(test_time),
                ..uk_input()
            },
        )
        .await
        .unwrap();

    assert_eq!(listings.len(), 10);
    assert_eq!(event_names(&listings), TEST_EVENTS[..10]);
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn test_fetch_listings_stops_at_max_number_within_page() {
    let test_time = test_time();
    let transport = MockTransport::new();
    register_page(&transport, &TEST_EVENTS[..10], test_time, Duration::minutes(1));
    let client = setup_client(transport.clone());

    let listings = client
        .fetch_ticket_listings(
            &CancellationToken::new(),
            &FetchTicketListingsInput {
                max_number: MaxNumber::Limit(4),
                created_before: Some(test_time),
                ..uk_input()
            },
        )
        .await
        .unwrap();

    assert_eq!(event_names(&listings), TEST_EVENTS[..4]);
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn test_fetch_listings_paginated_max_number() {
    let test_time1 = test_time();
    let test_time2 = test_time1 - Duration::minutes(10);
    let test_time3 = test_time2 - Duration::minutes(10);

    let transport = MockTransport::new();
    register_page(&transport, &TEST_EVENTS[..10], test_time1, Duration::minutes(1));
    register_page(&transport, &TEST_EVENTS[10..20], test_time2, Duration::minutes(1));
    register_page(&transport, &TEST_EVENTS[20..23], test_time3, Duration::minutes(1));
    let client = setup_client(transport.clone());

    let listings = client
        .fetch_ticket_listings(
            &CancellationToken::new(),
            &FetchTicketListingsInput {
                max_number: MaxNumber::Limit(23),
                created_before: Some(test_time1),
                ..uk_input()
            },
        )
        .await
        .unwrap();

    assert_eq!(listings.len(), 23);
    assert_eq!(event_names(&listings), TEST_EVENTS[..23]);
    assert_eq!(
        transport.request_urls(),
        vec![mock_url(test_time1), mock_url(test_time2), mock_url(test_time3)]
    );
    for pair in listings.windows(2) {
        assert!(pair[0].created_at > pair[1].created_at);
    }
}

#[tokio::test]
async fn test_fetch_listings_paginated_created_after() {
    let test_time1 = test_time();
    let test_time2 = test_time1 - Duration::minutes(10);

    let transport = MockTransport::new();
    register_page(&transport, &TEST_EVENTS[..10], test_time1, Duration::minutes(1));
    register_page(&transport, &TEST_EVENTS[10..20], test_time2, Duration::minutes(1));
    let client = setup_client(transport.clone());

    let created_after = test_time1 - Duration::minutes(16);
    let listings = client
        .fetch_ticket_listings(
            &CancellationToken::new(),
            &FetchTicketListingsInput {
                max_number: MaxNumber::Limit(100),
                created_before: Some(test_time1),
                created_after: Some(created_after),
                ..uk_input()
            },
        )
        .await
        .unwrap();

    assert_eq!(listings.len(), 15);
    assert_eq!(event_names(&listings), TEST_EVENTS[..15]);
    assert!(listings.iter().all(|l| l.created_at > created_after));
}

#[tokio::test]
async fn test_fetch_listings_unbounded_relies_on_created_after() {
    let test_time1 = test_time();
    let test_time2 = test_time1 - Duration::minutes(10);
    let test_time3 = test_time2 - Duration::minutes(10);

    let transport = MockTransport::new();
    register_page(&transport, &TEST_EVENTS[..10], test_time1, Duration::minutes(1));
    register_page(&transport, &TEST_EVENTS[10..20], test_time2, Duration::minutes(1));
    register_page(&transport, &TEST_EVENTS[20..], test_time3, Duration::minutes(1));
    let client = setup_client(transport);

    let listings = client
        .fetch_ticket_listings(
            &CancellationToken::new(),
            &FetchTicketListingsInput {
                max_number: MaxNumber::Unbounded,
                created_before: Some(test_time1),
                created_after: Some(test_time1 - Duration::minutes(22)),
                ..uk_input()
            },
        )
        .await
        .unwrap();

    assert_eq!(event_names(&listings), TEST_EVENTS[..21]);
}

#[tokio::test]
async fn test_fetch_listings_created_after_latest_listing_returns_nothing() {
    let test_time = test_time();
    let transport = MockTransport::new();
    register_page(&transport, &TEST_EVENTS[..10], test_time, Duration::minutes(1));
    let client = setup_client(transport);

    let listings = client
        .fetch_ticket_listings(
            &CancellationToken::new(),
            &FetchTicketListingsInput {
                max_number: MaxNumber::Limit(100),
                created_before: Some(test_time),
                // Same instant as the newest listing
                created_after: Some(test_time - Duration::minutes(1)),
                ..uk_input()
            },
        )
        .await
        .unwrap();

    assert!(listings.is_empty());
}

#[tokio::test]
async fn test_fetch_listings_queries_regions() {
    let test_time = test_time();
    let transport = MockTransport::new();
    transport.enqueue(json_response(&mock_page(
        &TEST_EVENTS[..10],
        test_time,
        Duration::minutes(1),
    )));
    let client = setup_client(transport.clone());

    client
        .fetch_ticket_listings(
            &CancellationToken::new(),
            &FetchTicketListingsInput {
                regions: vec![Region::London, Region::South],
                created_before: Some(test_time),
                ..uk_input()
            },
        )
        .await
        .unwrap();

    let urls = transport.request_urls();
    assert_eq!(urls.len(), 1);
    assert!(urls[0].contains("q=countryCode%3DGB%2CregionCode%3DGBLO%2CregionCode%3DGBSO"));
    assert!(urls[0].contains(&format!("maxTime={}", test_time.timestamp_millis())));
}

/// DELISTED ENTRY TESTS
#[tokio::test]
async fn test_fetch_listings_skips_delisted_entries_across_pages() {
    let test_time1 = test_time();
    let transport = MockTransport::new();

    // First page ends in a run of delisted entries
    let created = |minutes: i64| test_time1 - Duration::minutes(minutes);
    transport.register(
        mock_url(test_time1),
        json_response(&json!({"responseData": [
            {"catalogBlockSummary": null},
            {"catalogBlockSummary": listing_json("a", "Adele", created(1))},
            {"catalogBlockSummary": listing_json("b", "Drake", created(2))},
            {"catalogBlockSummary": null},
            {"catalogBlockSummary": null},
            {"catalogBlockSummary": null},
        ]})),
    );
    transport.register(
        mock_url(created(2)),
        json_response(&json!({"responseData": [
            {"catalogBlockSummary": null},
            {"catalogBlockSummary": listing_json("c", "Coldplay", created(3))},
            {},
            {"catalogBlockSummary": listing_json("d", "Sum 41", created(4))},
        ]})),
    );
    let client = setup_client(transport);

    let listings = client
        .fetch_ticket_listings(
            &CancellationToken::new(),
            &FetchTicketListingsInput {
                max_number: MaxNumber::Limit(4),
                created_before: Some(test_time1),
                ..uk_input()
            },
        )
        .await
        .unwrap();

    let ids: Vec<&str> = listings.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c", "d"]);
}

#[tokio::test]
async fn test_fetch_listings_continues_past_page_of_only_delisted_entries() {
    let test_time = test_time();
    let transport = MockTransport::new();
    transport.enqueue(json_response(&json!({"responseData": [
        {"catalogBlockSummary": null},
        {"catalogBlockSummary": null},
    ]})));
    transport.enqueue(json_response(&mock_page(
        &TEST_EVENTS[..3],
        test_time,
        Duration::minutes(1),
    )));
    let client = setup_client(transport.clone());

    let listings = client
        .fetch_ticket_listings(
            &CancellationToken::new(),
            &FetchTicketListingsInput {
                max_number: MaxNumber::Limit(3),
                created_before: Some(test_time),
                ..uk_input()
            },
        )
        .await
        .unwrap();

    assert_eq!(event_names(&listings), TEST_EVENTS[..3]);
    // Nothing was appended, so the bound is unchanged
    assert_eq!(
        transport.request_urls(),
        vec![mock_url(test_time), mock_url(test_time)]
    );
}

#[tokio::test]
async fn test_fetch_listings_stops_after_two_pages_of_only_delisted_entries() {
    let transport = MockTransport::new();
    for _ in 0..2 {
        transport.enqueue(json_response(&json!({"responseData": [
            {"catalogBlockSummary": null},
            {"catalogBlockSummary": null},
        ]})));
    }
    transport.enqueue(json_response(&mock_page(
        &TEST_EVENTS[..3],
        test_time(),
        Duration::minutes(1),
    )));
    let client = setup_client(transport.clone());

    let listings = client
        .fetch_ticket_listings(&CancellationToken::new(), &uk_input())
        .await
        .unwrap();

    assert!(listings.is_empty());
    assert_eq!(transport.requests().len(), 2);
}

/// BOUNDARY TESTS
#[tokio::test]
async fn test_fetch_listings_does_not_duplicate_boundary_listing() {
    let test_time1 = test_time();
    let created = |minutes: i64| test_time1 - Duration::minutes(minutes);
    let transport = MockTransport::new();

    transport.register(
        mock_url(test_time1),
        json_response(&json!({"responseData": [
            {"catalogBlockSummary": listing_json("a", "Adele", created(1))},
            {"catalogBlockSummary": listing_json("b", "Drake", created(2))},
        ]})),
    );
    // Inclusive upper bound: the boundary listing comes back first, alongside
    // a listing sharing its millisecond.
    transport.register(
        mock_url(created(2)),
        json_response(&json!({"responseData": [
            {"catalogBlockSummary": listing_json("b", "Drake", created(2))},
            {"catalogBlockSummary": listing_json("b2", "Dua Lipa", created(2))},
            {"catalogBlockSummary": listing_json("c", "Coldplay", created(3))},
        ]})),
    );
    let client = setup_client(transport);

    let listings = client
        .fetch_ticket_listings(
            &CancellationToken::new(),
            &FetchTicketListingsInput {
                max_number: MaxNumber::Limit(4),
                created_before: Some(test_time1),
                created_after: Some(created(3)),
                ..uk_input()
            },
        )
        .await
        .unwrap();

    let ids: Vec<&str> = listings.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "b2"]);
}

#[tokio::test]
async fn test_fetch_listings_feed_ignoring_cursor_terminates() {
    let test_time = test_time();
    let transport = MockTransport::new();
    // Same page whatever the cursor
    for _ in 0..3 {
        transport.enqueue(json_response(&mock_page(
            &TEST_EVENTS[..5],
            test_time,
            Duration::minutes(1),
        )));
    }
    let client = setup_client(transport.clone());

    let listings = client
        .fetch_ticket_listings(
            &CancellationToken::new(),
            &FetchTicketListingsInput {
                max_number: MaxNumber::Limit(50),
                created_before: Some(test_time),
                ..uk_input()
            },
        )
        .await
        .unwrap();

    assert_eq!(event_names(&listings), TEST_EVENTS[..5]);
    assert_eq!(transport.requests().len(), 2);
}

#[tokio::test]
async fn test_fetch_listings_out_of_order_page_stops_at_first_old_listing() {
    let test_time = test_time();
    let created = |minutes: i64| test_time - Duration::minutes(minutes);
    let transport = MockTransport::new();
    transport.enqueue(json_response(&json!({"responseData": [
        {"catalogBlockSummary": listing_json("a", "Adele", created(1))},
        {"catalogBlockSummary": listing_json("old", "Drake", created(30))},
        {"catalogBlockSummary": listing_json("b", "Coldplay", created(2))},
    ]})));
    let client = setup_client(transport.clone());

    let listings = client
        .fetch_ticket_listings(
            &CancellationToken::new(),
            &FetchTicketListingsInput {
                max_number: MaxNumber::Limit(10),
                created_before: Some(test_time),
                created_after: Some(created(10)),
                ..uk_input()
            },
        )
        .await
        .unwrap();

    let ids: Vec<&str> = listings.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["a"]);
    assert_eq!(transport.requests().len(), 1);
}

/// ERROR TESTS
#[tokio::test]
async fn test_fetch_listings_invalid_input_makes_no_request() {
    let transport = MockTransport::new();
    let client = setup_client(transport.clone());
    let now = test_time();

    let inputs = [
        FetchTicketListingsInput {
            max_number: MaxNumber::Unbounded,
            ..uk_input()
        },
        FetchTicketListingsInput {
            max_number: MaxNumber::Limit(0),
            ..uk_input()
        },
        FetchTicketListingsInput {
            created_before: Some(now - Duration::minutes(5)),
            created_after: Some(now),
            ..uk_input()
        },
    ];
    for input in inputs {
        let result = client
            .fetch_ticket_listings(&CancellationToken::new(), &input)
            .await;
        assert!(
            matches!(result, Err(TwicketsError::InvalidInput(_))),
            "expected invalid input for {:?}, got {:?}",
            input,
            result
        );
    }
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_fetch_listings_empty_page_is_an_error() {
    let transport = MockTransport::new();
    transport.enqueue(json_response(&json!({"responseData": []})));
    let client = setup_client(transport);

    let result = client
        .fetch_ticket_listings(&CancellationToken::new(), &uk_input())
        .await;
    assert!(matches!(result, Err(TwicketsError::EmptyFeed)));
}

#[tokio::test]
async fn test_fetch_listings_error_on_later_page_discards_earlier_pages() {
    let test_time1 = test_time();
    let transport = MockTransport::new();
    register_page(&transport, &TEST_EVENTS[..10], test_time1, Duration::minutes(1));
    transport.register(
        mock_url(test_time1 - Duration::minutes(10)),
        FeedResponse::ok(r#"{"unexpected": true}"#),
    );
    let client = setup_client(transport);

    let result = client
        .fetch_ticket_listings(
            &CancellationToken::new(),
            &FetchTicketListingsInput {
                max_number: MaxNumber::Limit(15),
                created_before: Some(test_time1),
                ..uk_input()
            },
        )
        .await;
    assert!(matches!(result, Err(TwicketsError::ParseError(_))));
}

#[tokio::test]
async fn test_fetch_feed_page_non_success_status_renders_body() {
    let transport = MockTransport::new();
    transport.enqueue(FeedResponse {
        status: StatusCode::FORBIDDEN,
        body: "<html><head><title>Blocked</title></head><body><h1>Access denied</h1><p>Ray ID 42</p></body></html>"
            .to_string(),
    });
    let client = setup_client(transport);

    let result = client
        .fetch_feed_page(&CancellationToken::new(), &mock_url(test_time()))
        .await;
    match result {
        Err(TwicketsError::Http { status, body }) => {
            assert_eq!(status, StatusCode::FORBIDDEN);
            assert!(body.contains("Access denied"));
            assert!(body.contains("Ray ID 42"));
            assert!(!body.contains("<h1>"));
        }
        other => panic!("expected http error, got {:?}", other),
    }
}

/// CANCELLATION TESTS
struct CancelOnSecondRequest {
    inner: Arc<MockTransport>,
    cancel: CancellationToken,
    calls: AtomicUsize,
}

#[async_trait]
impl Transport for CancelOnSecondRequest {
    async fn execute(&self, request: FeedRequest) -> Result<FeedResponse, TwicketsError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            return self.inner.execute(request).await;
        }
        self.cancel.cancel();
        std::future::pending().await
    }
}

#[tokio::test]
async fn test_fetch_listings_cancelled_mid_pagination_returns_no_listings() {
    let test_time = test_time();
    let cancel = CancellationToken::new();
    let inner = MockTransport::new();
    register_page(&inner, &TEST_EVENTS[..10], test_time, Duration::minutes(1));
    let transport = CancelOnSecondRequest {
        inner,
        cancel: cancel.clone(),
        calls: AtomicUsize::new(0),
    };
    let client =
        TwicketsClient::with_transport(TEST_API_KEY, ClientConfig::default(), transport).unwrap();

    let result = client
        .fetch_ticket_listings(
            &cancel,
            &FetchTicketListingsInput {
                max_number: MaxNumber::Limit(20),
                created_before: Some(test_time),
                ..uk_input()
            },
        )
        .await;
    assert!(matches!(result, Err(TwicketsError::Cancelled)));
}

#[tokio::test]
async fn test_fetch_listings_already_cancelled() {
    let transport = MockTransport::new();
    let client = setup_client(transport);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = client.fetch_ticket_listings(&cancel, &uk_input()).await;
    assert!(matches!(result, Err(TwicketsError::Cancelled)));
}

#[tokio::test]
async fn test_concurrent_fetches_are_independent() {
    let test_time = test_time();
    let transport = MockTransport::new();
    register_page(&transport, &TEST_EVENTS[..10], test_time, Duration::minutes(1));
    let client = setup_client(transport);

    let cancel = CancellationToken::new();
    let small = FetchTicketListingsInput {
        max_number: MaxNumber::Limit(3),
        created_before: Some(test_time),
        ..uk_input()
    };
    let large = FetchTicketListingsInput {
        max_number: MaxNumber::Limit(7),
        created_before: Some(test_time),
        ..uk_input()
    };
    let (a, b) = tokio::join!(
        client.fetch_ticket_listings(&cancel, &small),
        client.fetch_ticket_listings(&cancel, &large),
    );
    assert_eq!(a.unwrap().len(), 3);
    assert_eq!(b.unwrap().len(), 7);
}
