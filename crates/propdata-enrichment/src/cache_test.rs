use super::*;
use propdata_core::PropertyRecord;

fn success(parcel: &str) -> LookupResult {
    LookupResult::Success {
        record: PropertyRecord {
            parcel_number: Some(parcel.to_owned()),
            ..PropertyRecord::default()
        },
    }
}

#[test]
fn canonicalize_trims_uppercases_and_collapses() {
    assert_eq!(canonicalize("  la   verne\t"), "LA VERNE");
    assert_eq!(canonicalize(""), "");
}

#[test]
fn equivalent_addresses_share_a_key() {
    let a = CacheKey::address("2116 Fulton Rd", Some("La Verne"), Some("ca"), Some("91750"));
    let b = CacheKey::address(" 2116  FULTON RD ", Some("LA VERNE"), Some("CA"), Some("91750 "));
    assert_eq!(a, b);
}

#[test]
fn absent_and_blank_parts_share_a_key() {
    let a = CacheKey::address("1 Main", Some("Pomona"), None, None);
    let b = CacheKey::address("1 Main", Some("Pomona"), Some(" "), Some(""));
    assert_eq!(a, b);
}

#[test]
fn different_parts_produce_different_keys() {
    let a = CacheKey::address("1 Main", Some("Pomona"), None, None);
    let b = CacheKey::address("1 Main", None, Some("Pomona"), None);
    assert_ne!(a, b);
}

#[test]
fn namespaces_never_collide() {
    let parcel = CacheKey::parcel("8678-012-034", "06037");
    let address = CacheKey::address("8678-012-034", Some("06037"), None, None);
    assert_ne!(parcel, address);
    assert_eq!(parcel.namespace(), Namespace::Parcel);
    assert_eq!(address.namespace(), Namespace::Address);
}

#[test]
fn display_shows_namespace_and_short_digest() {
    let key = CacheKey::parcel("1", "2").to_string();
    assert!(key.starts_with("parcel:"));
    assert_eq!(key.len(), "parcel:".len() + 12);
}

#[tokio::test(start_paused = true)]
async fn entry_is_served_until_ttl_elapses() {
    let cache = LookupCache::new(Duration::from_secs(60));
    let key = CacheKey::parcel("1", "06037");
    cache.put(key.clone(), success("1")).await;

    tokio::time::advance(Duration::from_secs(59)).await;
    assert_eq!(cache.get(&key).await, Some(success("1")));

    tokio::time::advance(Duration::from_secs(1)).await;
    assert_eq!(cache.get(&key).await, None);
    assert_eq!(cache.len().await, 0, "expired entry is evicted on read");
}

#[tokio::test(start_paused = true)]
async fn put_overwrites_and_restarts_ttl() {
    let cache = LookupCache::new(Duration::from_secs(60));
    let key = CacheKey::parcel("1", "06037");
    cache.put(key.clone(), success("old")).await;

    tokio::time::advance(Duration::from_secs(45)).await;
    cache.put(key.clone(), success("new")).await;

    tokio::time::advance(Duration::from_secs(45)).await;
    assert_eq!(cache.get(&key).await, Some(success("new")));
    assert_eq!(cache.len().await, 1);
}

#[tokio::test(start_paused = true)]
async fn purge_expired_removes_only_stale_entries() {
    let cache = LookupCache::new(Duration::from_secs(60));
    cache.put(CacheKey::parcel("old", "1"), LookupResult::NotFound).await;
    tokio::time::advance(Duration::from_secs(30)).await;
    cache.put(CacheKey::parcel("new", "1"), LookupResult::NotFound).await;
    tokio::time::advance(Duration::from_secs(31)).await;

    assert_eq!(cache.purge_expired().await, 1);
    assert_eq!(cache.len().await, 1);
    assert!(cache.get(&CacheKey::parcel("new", "1")).await.is_some());
}

#[tokio::test]
async fn clear_drops_everything() {
    let cache = LookupCache::new(Duration::from_secs(60));
    cache.put(CacheKey::parcel("a", "1"), LookupResult::NotFound).await;
    cache.put(CacheKey::parcel("b", "1"), LookupResult::NotFound).await;
    cache.clear().await;
    assert!(cache.is_empty().await);
}

#[tokio::test]
async fn zero_ttl_stores_nothing() {
    let cache = LookupCache::new(Duration::ZERO);
    let key = CacheKey::parcel("1", "06037");
    cache.put(key.clone(), success("1")).await;
    assert_eq!(cache.get(&key).await, None);
    assert!(cache.is_empty().await);
}
