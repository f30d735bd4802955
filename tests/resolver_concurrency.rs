//! Concurrency behavior of the resolver against a real (in-memory) store.

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use snaplink::domain::repositories::LinkRepository;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_visits_lose_no_updates() {
    let state = common::test_state();
    let link = state
        .links
        .resolve_or_create("https://example.com")
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..100 {
        let links = Arc::clone(&state.links);
        let code = link.code.clone();
        handles.push(tokio::spawn(async move {
            links.visit(&code).await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let stored = state.store.find_by_code(&link.code).await.unwrap().unwrap();
    assert_eq!(stored.visits, 100);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_visits_each_observe_a_distinct_count() {
    let state = common::test_state();
    let link = state
        .links
        .resolve_or_create("https://example.com")
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..50 {
        let links = Arc::clone(&state.links);
        let code = link.code.clone();
        handles.push(tokio::spawn(
            async move { links.visit(&code).await.unwrap().visits },
        ));
    }

    let mut seen = HashSet::new();
    for handle in handles {
        assert!(
            seen.insert(handle.await.unwrap()),
            "two visits observed the same count"
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creators_converge_on_one_code() {
    let state = common::test_state();

    let mut handles = Vec::new();
    for _ in 0..20 {
        let links = Arc::clone(&state.links);
        handles.push(tokio::spawn(async move {
            links
                .resolve_or_create("https://example.com/contested")
                .await
                .unwrap()
                .code
        }));
    }

    let mut codes = HashSet::new();
    for handle in handles {
        codes.insert(handle.await.unwrap());
    }

    assert_eq!(codes.len(), 1, "racing creators minted more than one code");
    assert_eq!(state.store.count().await.unwrap(), 1);
}
