use issuer_endpoint::{BoundIssuer, Handoff, IssuerConfig, IssuerEndpoint};
use issuer_test::{fetch_discovery, http_client, TestIssuer, VerifyError};

async fn start(config: IssuerConfig) -> TestIssuer {
    TestIssuer::start(config).await.unwrap()
}

#[tokio::test]
async fn default_issuer_serves_discovery_over_http() {
    let issuer = start(IssuerConfig::with_defaults()).await;
    let url = issuer.url();
    assert!(url.starts_with("http://localhost:"));
    assert!(url.ends_with("/default"));

    let discovery = issuer.discovery().await.unwrap();
    assert_eq!(discovery.issuer, url);
    assert_eq!(discovery.jwks_uri, format!("{url}/.well-known/jwks.json"));
    assert_eq!(discovery.subject_types_supported, ["public"]);
    assert_eq!(discovery.id_token_signing_alg_values_supported, ["RS256"]);

    issuer.stop().await;
}

#[tokio::test]
async fn secured_issuer_serves_discovery_over_https() {
    let issuer = start(IssuerConfig::secured_defaults()).await;
    let url = issuer.url();
    assert!(url.starts_with("https://localhost:"));

    let discovery = issuer.discovery().await.unwrap();
    assert_eq!(discovery.issuer, url);
    assert_eq!(discovery.jwks_uri, issuer.jwks_url());

    issuer.stop().await;
}

#[tokio::test]
async fn both_listeners_serve_identical_discovery() {
    let issuer = start(IssuerConfig::new("custom", true)).await;
    let client = issuer.client();
    let http_url = issuer.running().http_url();
    let https_url = issuer.running().https_url();

    let over_http = fetch_discovery(client, &http_url).await.unwrap();
    let over_https = fetch_discovery(client, &https_url).await.unwrap();
    assert_eq!(over_http, over_https);
    assert_eq!(over_http.issuer, https_url);

    issuer.stop().await;
}

#[tokio::test]
async fn jwks_publishes_one_key() {
    let issuer = start(IssuerConfig::with_defaults()).await;
    let jwks: serde_json::Value = issuer
        .client()
        .get(issuer.jwks_url())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let keys = jwks["keys"].as_array().unwrap();
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0]["kid"], "test");
    assert_eq!(keys[0]["kty"], "RSA");
    assert_eq!(keys[0]["e"], "AQAB");

    let verifier = issuer.verifier().await.unwrap();
    assert_eq!(verifier.key_ids().collect::<Vec<_>>(), ["test"]);

    issuer.stop().await;
}

#[tokio::test]
async fn static_content_over_https() {
    let issuer = start(IssuerConfig::secured_defaults()).await;
    let response = issuer
        .client()
        .get(format!("{}/index.html", issuer.url()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert!(response.text().await.unwrap().contains("Test issuer"));

    let missing = issuer
        .client()
        .get(format!("{}/missing.html", issuer.url()))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);

    issuer.stop().await;
}

#[tokio::test]
async fn handoff_url_is_announced() {
    let bound = BoundIssuer::bind(IssuerConfig::with_defaults())
        .await
        .unwrap();
    let local = bound.url();
    let issuer = bound.start(Handoff::new("http://issuer.example:32768/default"));

    let client = http_client(false).unwrap();
    let discovery = fetch_discovery(&client, &local).await.unwrap();
    assert_eq!(discovery.issuer, "http://issuer.example:32768/default");
    assert_eq!(
        discovery.jwks_uri,
        "http://issuer.example:32768/default/.well-known/jwks.json"
    );

    issuer.stop().await;
}

#[tokio::test]
async fn untrusted_client_cannot_reach_https() {
    let issuer = start(IssuerConfig::secured_defaults()).await;
    let client = http_client(false).unwrap();

    let result = fetch_discovery(&client, &issuer.url()).await;
    assert!(matches!(result, Err(VerifyError::Fetch { .. })));

    issuer.stop().await;
}
