use std::sync::Arc;
use std::time::Duration;

use onepass_catalog::InMemoryCatalog;
use onepass_core::{ClientSignals, MismatchReason, Resource, ResourceId};
use onepass_link::{AccessLinks, LinkError, LinkService, LinkSettings};
use onepass_store::MokaTokenStore;

fn catalog() -> InMemoryCatalog {
    InMemoryCatalog::with_resources([Resource {
        id: ResourceId(7),
        name: "Annual Report".to_string(),
        target_location: "/files/7.pdf".to_string(),
    }])
}

fn service(ttl: Duration) -> LinkService<MokaTokenStore, InMemoryCatalog> {
    LinkService::new(
        MokaTokenStore::new(),
        catalog(),
        LinkSettings::builder().ttl(ttl).build(),
    )
}

fn browser() -> ClientSignals {
    ClientSignals::new("Mozilla/5.0", "10.0.0.1")
}

#[tokio::test]
async fn redeem_once_then_used() {
    let service = service(Duration::from_secs(60));

    let link = service.issue_link(ResourceId(7), &browser()).await.unwrap();
    assert!(link.verify_url.contains(link.token.as_str()));

    let target = service.redeem(link.token.as_str(), &browser()).await.unwrap();
    assert_eq!(target, "/files/7.pdf");

    let err = service.redeem(link.token.as_str(), &browser()).await.unwrap_err();
    assert!(matches!(err, LinkError::LinkExpiredOrUsed));
}

#[tokio::test]
async fn address_mismatch_burns_the_token() {
    let service = service(Duration::from_secs(60));
    let link = service.issue_link(ResourceId(7), &browser()).await.unwrap();

    let moved = ClientSignals::new("Mozilla/5.0", "10.0.0.2");
    let err = service.redeem(link.token.as_str(), &moved).await.unwrap_err();
    assert!(matches!(
        err,
        LinkError::ClientMismatch(MismatchReason::ClientAddress)
    ));

    let err = service.redeem(link.token.as_str(), &browser()).await.unwrap_err();
    assert!(matches!(err, LinkError::LinkExpiredOrUsed));
}

#[tokio::test]
async fn user_agent_mismatch_burns_the_token() {
    let service = service(Duration::from_secs(60));
    let link = service.issue_link(ResourceId(7), &browser()).await.unwrap();

    let other_browser = ClientSignals::new("Mozilla/5.0 (X11)", "10.0.0.1");
    let err = service
        .redeem(link.token.as_str(), &other_browser)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LinkError::ClientMismatch(MismatchReason::UserAgent)
    ));

    let err = service.redeem(link.token.as_str(), &browser()).await.unwrap_err();
    assert!(matches!(err, LinkError::LinkExpiredOrUsed));
}

#[tokio::test]
async fn expired_link_reads_as_used() {
    let service = service(Duration::from_millis(50));
    let link = service.issue_link(ResourceId(7), &browser()).await.unwrap();

    tokio::time::sleep(Duration::from_millis(150)).await;

    let err = service.redeem(link.token.as_str(), &browser()).await.unwrap_err();
    assert!(matches!(err, LinkError::LinkExpiredOrUsed));
}

#[tokio::test]
async fn never_issued_token_reads_as_used() {
    let service = service(Duration::from_secs(60));
    let other = service.issue_link(ResourceId(7), &browser()).await.unwrap();

    // Same shape as a real token, never stored.
    let forged: String = other
        .token
        .as_str()
        .chars()
        .map(|c| if c == 'A' { 'B' } else { 'A' })
        .collect();

    let err = service.redeem(&forged, &browser()).await.unwrap_err();
    assert!(matches!(err, LinkError::LinkExpiredOrUsed));
}

#[tokio::test]
async fn tokens_are_distinct_per_issuance() {
    let service = service(Duration::from_secs(60));

    let a = service.issue_link(ResourceId(7), &browser()).await.unwrap();
    let b = service.issue_link(ResourceId(7), &browser()).await.unwrap();
    assert_ne!(a.token, b.token);

    assert_eq!(
        service.redeem(b.token.as_str(), &browser()).await.unwrap(),
        "/files/7.pdf"
    );
    assert_eq!(
        service.redeem(a.token.as_str(), &browser()).await.unwrap(),
        "/files/7.pdf"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_redemption_has_one_winner() {
    let service = Arc::new(service(Duration::from_secs(60)));

    for n in [1usize, 2, 8, 32] {
        for trial in 0..25 {
            let link = service.issue_link(ResourceId(7), &browser()).await.unwrap();

            let mut handles = vec![];
            for _ in 0..n {
                let service = Arc::clone(&service);
                let token = link.token.as_str().to_string();
                handles.push(tokio::spawn(async move {
                    service.redeem(&token, &browser()).await
                }));
            }

            let mut winners = 0;
            let mut used = 0;
            for handle in handles {
                match handle.await.unwrap() {
                    Ok(target) => {
                        assert_eq!(target, "/files/7.pdf");
                        winners += 1;
                    }
                    Err(LinkError::LinkExpiredOrUsed) => used += 1,
                    Err(other) => panic!("unexpected error: {other}"),
                }
            }

            assert_eq!(winners, 1, "n={n} trial={trial}");
            assert_eq!(used, n - 1, "n={n} trial={trial}");
        }
    }
}
