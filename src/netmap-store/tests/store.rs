//! Contract tests run against every [`Store`] backend. Mirrors the
//! generic-constructor-closure shape used to test multiple backends against
//! one assertion set: each `test_*` function takes a closure that builds a
//! fresh backend, so a future on-disk backend can opt into the same suite.

use std::future::Future;
use std::net::IpAddr;

use netmap_store::{MemoryStore, Store};
use netmap_types::{id, Direction, ExpArgs, Exception, Options, RecArgs, Relation, SockAddr, SockTable};

fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}

fn sample(local_ip: &str, local_name: &str, remote_ip: &str, remote_name: &str, port: u16) -> SockTable {
    SockTable {
        id: id::record_id(&ip(local_ip), &ip(remote_ip), "tcp", port),
        timestamp: 0,
        local_addr: SockAddr::new(ip(local_ip), local_name),
        remote_addr: SockAddr::new(ip(remote_ip), remote_name),
        relation: Relation {
            mode: "tcp".into(),
            port,
            command: None,
            result: 0,
            response: 0.0,
            trace: 0,
        },
        options: Options::default(),
        kind: Some(Direction::Out),
    }
}

async fn test_identity_collapse<F, Fut, S>(f: F)
where
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
    S: Store,
{
    let store = f().await;
    let rec_a = sample("10.0.0.1", "h1", "10.0.0.2", "h2", 443);
    store.save_netstat(vec![rec_a.clone()]).await.unwrap();

    let rec_b = sample("10.0.0.1", "h1b", "10.0.0.2", "h2b", 443);
    assert_eq!(rec_a.id, rec_b.id);
    store.save_netstat(vec![rec_b]).await.unwrap();

    let loaded = store
        .load_records(RecArgs {
            src_name: Some("h1b".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    // `h1b` was never indexed; the record is still indexed under `h1`,
    // confirming identity collapsed onto the original row rather than
    // creating a second one.
    assert!(loaded.is_empty());

    let loaded = store
        .load_records(RecArgs {
            src_name: Some("h1".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, rec_a.id);
}

async fn test_status_only_no_create<F, Fut, S>(f: F)
where
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
    S: Store,
{
    let store = f().await;
    let mut rec = sample("10.0.0.1", "h1", "10.0.0.2", "h2", 443);

    store.save_status(vec![rec.clone()]).await.unwrap();
    let loaded = store.load_records(RecArgs::default()).await.unwrap();
    assert!(loaded.is_empty(), "save_status must not create rows");

    store.save_netstat(vec![rec.clone()]).await.unwrap();
    let loaded = store.load_records(RecArgs::default()).await.unwrap();
    assert_eq!(loaded.len(), 1);

    rec.relation.result = 1;
    store.save_status(vec![rec.clone()]).await.unwrap();
    let loaded = store.load_records(RecArgs::default()).await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].relation.result, 1);
}

async fn test_netstat_idempotent<F, Fut, S>(f: F)
where
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
    S: Store,
{
    let store = f().await;
    let mut rec = sample("10.0.0.1", "h1", "10.0.0.2", "h2", 443);
    rec.relation.response = 1.5;
    store.save_netstat(vec![rec.clone()]).await.unwrap();

    let mut changed = rec.clone();
    changed.relation.response = 9.9;
    store.save_netstat(vec![changed]).await.unwrap();

    let loaded = store.load_records(RecArgs::default()).await.unwrap();
    assert_eq!(loaded.len(), 1);
    // Only the timestamp may move; the relation observed on first insert is
    // retained.
    assert_eq!(loaded[0].relation.response, 1.5);
}

async fn test_save_records_limit<F, Fut, S>(f: F)
where
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
    S: Store,
{
    let store = f().await;
    let a = sample("10.0.0.1", "h1", "10.0.0.2", "h2", 443);
    let b = sample("10.0.0.1", "h1", "10.0.0.3", "h3", 443);

    store.save_records(vec![a.clone()]).await.unwrap();
    let err = store.save_records(vec![b]).await.unwrap_err();
    assert_eq!(err, netmap_store::StoreError::LimitExceeded);

    // Updating the existing id must still succeed despite being at the limit.
    let mut updated = a;
    updated.relation.result = 2;
    store.save_records(vec![updated]).await.unwrap();
}

async fn test_del_records<F, Fut, S>(f: F)
where
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
    S: Store,
{
    let store = f().await;
    let rec = sample("10.0.0.1", "h1", "10.0.0.2", "h2", 443);
    store.save_records(vec![rec.clone()]).await.unwrap();
    store.del_records(vec![rec.id.clone()]).await.unwrap();
    let loaded = store.load_records(RecArgs::default()).await.unwrap();
    assert!(loaded.is_empty());

    // Deleting an id that was never present is a no-op, not an error.
    store.del_records(vec!["missing".into()]).await.unwrap();
}

async fn test_exceptions<F, Fut, S>(f: F)
where
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
    S: Store,
{
    let store = f().await;
    let exc = Exception {
        id: id::exception_id(7, ".*", "db\\.internal:5432"),
        account_id: 7,
        host_mask: ".*".into(),
        ignore_mask: "db\\.internal:5432".into(),
    };
    store.save_exceptions(vec![exc.clone()]).await.unwrap();

    let loaded = store
        .load_exceptions(ExpArgs {
            account_id: Some(7),
            src_name: Some("any-agent".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, exc.id);

    let loaded = store
        .load_exceptions(ExpArgs {
            account_id: Some(8),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(loaded.is_empty());

    store.del_exceptions(vec![exc.id]).await.unwrap();
    let loaded = store.load_exceptions(ExpArgs::default()).await.unwrap();
    assert!(loaded.is_empty());
}

async fn run_all<F, Fut, S>(f: F)
where
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
    S: Store,
{
    test_identity_collapse(&f).await;
    test_status_only_no_create(&f).await;
    test_netstat_idempotent(&f).await;
    test_save_records_limit(&f).await;
    test_del_records(&f).await;
    test_exceptions(&f).await;
}

#[tokio::test]
async fn test_memory_store() {
    run_all(|| async { MemoryStore::new(1) }).await;
}
