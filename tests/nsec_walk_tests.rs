mod common;

use common::{MockDns, answer, nsec_denial};
use ratatoskr::dns::enums::DNSResourceType;
use ratatoskr::error::WalkError;
use ratatoskr::walk::CancelToken;
use ratatoskr::walk::nsec::ChainWalker;

#[tokio::test]
async fn test_walk_closed_chain() {
    let mut mock = MockDns::new();
    mock.respond(
        "example.com",
        DNSResourceType::NSEC,
        nsec_denial("example.com", "a.example.com. A NS SOA RRSIG NSEC"),
    );
    mock.respond(
        "a.example.com",
        DNSResourceType::NSEC,
        nsec_denial("a.example.com", "z.example.com. A RRSIG NSEC"),
    );
    mock.respond(
        "z.example.com",
        DNSResourceType::NSEC,
        nsec_denial("z.example.com", "example.com. TXT RRSIG NSEC"),
    );
    mock.respond(
        "example.com",
        DNSResourceType::A,
        answer("example.com", DNSResourceType::A, "192.0.2.1"),
    );
    mock.respond(
        "a.example.com",
        DNSResourceType::A,
        answer("a.example.com", DNSResourceType::A, "192.0.2.2"),
    );
    mock.respond(
        "z.example.com",
        DNSResourceType::TXT,
        answer("z.example.com", DNSResourceType::TXT, "\"hello\""),
    );

    let mut walker = ChainWalker::new(&mock, "example.com", CancelToken::new());
    let mut discovered = Vec::new();
    let summary = walker
        .run(&mut |owner| discovered.push(owner))
        .await
        .unwrap();

    assert_eq!(summary.visited, 3);
    assert!(!summary.cancelled);

    let names: Vec<&str> = discovered.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["example.com", "a.example.com", "z.example.com"]);

    // The apex resolved its attested non-DNSSEC types
    let apex = &discovered[0];
    assert!(
        apex.records
            .iter()
            .any(|r| r.rtype == DNSResourceType::A && r.data == "192.0.2.1")
    );

    // The TXT-only owner resolved its TXT record
    assert!(
        discovered[2]
            .records
            .iter()
            .any(|r| r.rtype == DNSResourceType::TXT && r.data == "\"hello\"")
    );
}

#[tokio::test]
async fn test_walk_falls_back_to_transformed_names() {
    let mut mock = MockDns::new();
    // The as-is query yields nothing; the "0."-prefixed variant does
    mock.respond(
        "0.example.com",
        DNSResourceType::NSEC,
        nsec_denial("example.com", "example.com. SOA RRSIG NSEC"),
    );

    let mut walker = ChainWalker::new(&mock, "example.com", CancelToken::new());
    let mut discovered = Vec::new();
    let summary = walker
        .run(&mut |owner| discovered.push(owner))
        .await
        .unwrap();

    assert_eq!(summary.visited, 1);
    assert_eq!(discovered[0].name, "example.com");

    let queried = mock.queried_names();
    assert_eq!(queried[0], "example.com");
    assert_eq!(queried[1], "0.example.com");
}

#[tokio::test]
async fn test_walk_breaks_loops_with_synthetic_alias() {
    let mut mock = MockDns::new();
    mock.respond(
        "example.com",
        DNSResourceType::NSEC,
        nsec_denial("example.com", "b.example.com. A RRSIG NSEC"),
    );
    // Misconfigured: b points back at itself instead of closing the chain
    mock.respond(
        "b.example.com",
        DNSResourceType::NSEC,
        nsec_denial("b.example.com", "b.example.com. A RRSIG NSEC"),
    );
    // The rewritten alias lands past the collision and closes the chain
    mock.respond(
        "ba.example.com",
        DNSResourceType::NSEC,
        nsec_denial("b.example.com", "example.com. A RRSIG NSEC"),
    );

    let mut walker = ChainWalker::new(&mock, "example.com", CancelToken::new());
    let mut discovered = Vec::new();
    let summary = walker
        .run(&mut |owner| discovered.push(owner))
        .await
        .unwrap();

    // The synthetic alias is walked but never reported
    assert_eq!(summary.visited, 2);
    assert!(discovered.iter().all(|o| o.name != "ba.example.com"));
    assert!(mock.queried_names().contains(&"ba.example.com".to_string()));
}

#[tokio::test]
async fn test_walk_stops_at_black_lie_tarpit() {
    let mut mock = MockDns::new();
    mock.respond(
        "example.com",
        DNSResourceType::NSEC,
        nsec_denial("example.com", "\\000.example.com. RRSIG NSEC"),
    );

    let mut walker = ChainWalker::new(&mock, "example.com", CancelToken::new());
    let mut discovered = Vec::new();
    let err = walker
        .run(&mut |owner| discovered.push(owner))
        .await
        .unwrap_err();

    assert!(matches!(err, WalkError::Tarpit));
    assert!(discovered.is_empty());
    // Detection happens on the very first response; no queries are wasted
    assert_eq!(mock.query_count(), 1);
}

#[tokio::test]
async fn test_walk_honors_cancellation() {
    let mock = MockDns::new();
    let cancel = CancelToken::new();
    cancel.cancel();

    let mut walker = ChainWalker::new(&mock, "example.com", cancel);
    let summary = walker.run(&mut |_| {}).await.unwrap();

    assert!(summary.cancelled);
    assert_eq!(summary.visited, 0);
    assert_eq!(mock.query_count(), 0);
}

#[tokio::test]
async fn test_walk_ignores_foreign_nsec_owners() {
    let mut mock = MockDns::new();
    // A wildcard-covering NSEC for an unrelated name must not derail the
    // walk; with nothing pertinent the target is dropped
    mock.respond(
        "example.com",
        DNSResourceType::NSEC,
        nsec_denial("unrelated.org", "other.unrelated.org. A RRSIG NSEC"),
    );

    let mut walker = ChainWalker::new(&mock, "example.com", CancelToken::new());
    let mut discovered = Vec::new();
    let summary = walker
        .run(&mut |owner| discovered.push(owner))
        .await
        .unwrap();

    assert_eq!(summary.visited, 0);
    assert!(discovered.is_empty());
}
