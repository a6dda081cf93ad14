mod support;
use support::*;

use std::collections::HashMap;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

use reqbuild::dns::{GaiResolver, Name, OverridesResolver, Resolve};
use reqbuild::Method;

#[tokio::test]
async fn overrides_answer_without_lookup() {
    let addr = SocketAddr::from(([10, 1, 2, 3], 8080));
    let mut table = HashMap::new();
    table.insert("api.test".to_owned(), vec![addr]);
    let resolver = OverridesResolver::new(GaiResolver::new(), table);

    let name = Name::from_str("api.test").unwrap();
    let addrs: Vec<_> = resolver.resolve(name).await.unwrap().collect();
    assert_eq!(addrs, vec![addr]);
}

#[tokio::test]
async fn overrides_fall_back_to_inner_resolver() {
    let resolver = OverridesResolver::new(GaiResolver::new(), HashMap::new());

    let name = Name::from_str("localhost").unwrap();
    let addrs: Vec<_> = resolver.resolve(name).await.unwrap().collect();
    assert!(addrs.iter().all(|addr| addr.ip().is_loopback()));
}

#[tokio::test]
async fn default_resolver_looks_up_the_request_host() {
    let request = builder(Method::GET, "http://localhost:8080/status")
        .build()
        .unwrap();

    let name = Name::from_str(request.url().host_str().unwrap()).unwrap();
    let addrs: Vec<_> = request.name_resolver().resolve(name).await.unwrap().collect();
    assert!(!addrs.is_empty());
    assert!(addrs.iter().all(|addr| addr.ip().is_loopback()));
}

#[tokio::test]
async fn request_carries_its_resolver() {
    let addr = SocketAddr::from(([127, 0, 0, 1], 9999));
    let mut table = HashMap::new();
    table.insert("svc.local".to_owned(), vec![addr]);

    let request = builder(Method::GET, "http://svc.local/health")
        .set_name_resolver(Arc::new(OverridesResolver::new(GaiResolver::new(), table)))
        .build()
        .unwrap();

    let name = Name::from_str(request.url().host_str().unwrap()).unwrap();
    let addrs: Vec<_> = request.name_resolver().resolve(name).await.unwrap().collect();
    assert_eq!(addrs, vec![addr]);
}
