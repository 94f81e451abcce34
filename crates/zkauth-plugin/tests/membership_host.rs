//! End-to-end membership flow through the host: fetch public inputs, prove,
//! verify, mutate the tree, and detect the stale output.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use zkauth_core::{PluginName, RoleRule, Validity};
use zkauth_crypto::{hash_secret, FieldElement, InMemoryWitnessStore, WitnessStore};
use zkauth_plugin::plugins::merkle_memberships::{
    fetch_public_inputs, prove_memberships, MembershipArgs, MerkleMembershipsPlugin, TreeSet,
};
use zkauth_plugin::{PluginError, PluginHost, PluginRegistry, VerifyInput};
use zkauth_zkp::MembershipPrivateInput;

fn leaf(n: u64) -> FieldElement {
    hash_secret(&FieldElement::from_u64(n))
}

fn name() -> PluginName {
    PluginName::new("members").unwrap()
}

fn setup() -> (PluginHost, MerkleMembershipsPlugin) {
    let mut trees = TreeSet::new();
    let store = InMemoryWitnessStore::with_leaves(4, (0..10).map(leaf)).unwrap();
    trees.insert("members", Arc::new(store)).unwrap();
    let plugin = MerkleMembershipsPlugin::new(trees);
    let registry = PluginRegistry::builder()
        .register(name(), Arc::new(plugin.clone()), RoleRule::default())
        .unwrap()
        .build();
    (PluginHost::new(registry), plugin)
}

#[tokio::test]
async fn stale_output_is_detected_after_adding_a_leaf() {
    let (host, plugin) = setup();
    let trees = plugin.trees();
    let secret = FieldElement::from_decimal("0").unwrap();

    let (root, witness) = fetch_public_inputs(&trees, "members", &secret).unwrap();
    assert_eq!(witness.calculate_index(), 0);
    let proof = plugin
        .program()
        .prove_chain(&[root], &[MembershipPrivateInput { witness, secret }])
        .unwrap();

    let input = VerifyInput {
        public_input_args: serde_json::to_value(MembershipArgs { roots: vec![root] }).unwrap(),
        proof: serde_json::to_value(&proof).unwrap(),
    };
    let output = host.verify(&name(), input).unwrap();
    assert_eq!(output["roots"][0], json!(trees.get("members").unwrap().root()));
    assert_eq!(
        host.check_output_validity(&name(), output.clone()).unwrap(),
        Validity::Valid
    );

    trees.add_leaf("members", leaf(10)).unwrap();

    let mut batch = BTreeMap::new();
    batch.insert(name(), output);
    let results = host.check_output_validity_batch(batch).await;
    let validity = results[&name()].clone().unwrap();
    assert!(validity.reason().unwrap().contains("root mismatch"));
}

#[tokio::test]
async fn verification_is_deterministic() {
    let (host, plugin) = setup();
    let (args, proof) = prove_memberships(
        plugin.program(),
        &plugin.trees(),
        &[("members", FieldElement::from_u64(5))],
    )
    .unwrap();
    let input = VerifyInput {
        public_input_args: serde_json::to_value(&args).unwrap(),
        proof: serde_json::to_value(&proof).unwrap(),
    };
    let first = host.verify(&name(), input.clone()).unwrap();
    let second = host.verify(&name(), input).unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn malformed_args_and_proofs_are_classified() {
    let (host, _) = setup();
    let bad_args = VerifyInput {
        public_input_args: json!({"roots": "nope"}),
        proof: json!({}),
    };
    assert!(matches!(
        host.verify(&name(), bad_args),
        Err(PluginError::MalformedInput(_))
    ));
    let bad_proof = VerifyInput {
        public_input_args: json!({"roots": [FieldElement::zero()]}),
        proof: json!({"garbage": true}),
    };
    assert!(matches!(
        host.verify(&name(), bad_proof),
        Err(PluginError::ProofInvalid(_))
    ));
    assert!(matches!(
        host.check_output_validity(&name(), json!([1, 2])),
        Err(PluginError::MalformedOutput(_))
    ));
}

async fn get_json(host: &PluginHost, uri: &str) -> (StatusCode, Value) {
    let response = host
        .routes("/v1/plugins")
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn auxiliary_routes_serve_public_tree_data() {
    let (host, plugin) = setup();
    let root = plugin.trees().get("members").unwrap().root();

    let (status, trees) = get_json(&host, "/v1/plugins/members/trees").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(trees[0]["name"], "members");
    assert_eq!(trees[0]["leaf_count"], 10);
    assert_eq!(trees[0]["root"], json!(root));

    let (status, leaves) = get_json(&host, "/v1/plugins/members/trees/members/leaves").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(leaves["leaves"].as_array().unwrap().len(), 10);

    let (status, witness) =
        get_json(&host, "/v1/plugins/members/trees/members/witness/3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(witness["root"], json!(root));
    assert_eq!(witness["witness"]["path"].as_array().unwrap().len(), 4);

    let (status, body) = get_json(&host, "/v1/plugins/members/trees/members/witness/12").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, _) = get_json(&host, "/v1/plugins/members/trees/nope/leaves").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

async fn post_json(host: &PluginHost, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = host
        .routes("/v1/plugins")
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn leaf_route_appends_and_stales_earlier_outputs() {
    let (host, plugin) = setup();
    let (args, proof) = prove_memberships(
        plugin.program(),
        &plugin.trees(),
        &[("members", FieldElement::from_u64(1))],
    )
    .unwrap();
    let output = host
        .verify(
            &name(),
            VerifyInput {
                public_input_args: serde_json::to_value(&args).unwrap(),
                proof: serde_json::to_value(&proof).unwrap(),
            },
        )
        .unwrap();

    let (status, body) = post_json(
        &host,
        "/v1/plugins/members/trees/members/leaves",
        json!({"value": leaf(42)}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["index"], 10);
    let root = plugin.trees().get("members").unwrap().root();
    assert_eq!(body["root"], json!(root));
    assert!(plugin.trees().get("members").unwrap().has_leaf(10));

    let validity = host.check_output_validity(&name(), output).unwrap();
    assert!(validity.reason().unwrap().contains("root mismatch"));
}

#[tokio::test]
async fn leaf_route_rejects_unknown_tree_bad_body_and_full_tree() {
    let (host, _) = setup();
    let (status, body) = post_json(
        &host,
        "/v1/plugins/members/trees/nope/leaves",
        json!({"value": leaf(1)}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, body) = post_json(
        &host,
        "/v1/plugins/members/trees/members/leaves",
        json!({"value": "zz"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    // Height 4 holds 16 leaves and 10 are taken.
    for n in 0..6 {
        let (status, _) = post_json(
            &host,
            "/v1/plugins/members/trees/members/leaves",
            json!({"value": leaf(100 + n)}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let (status, body) = post_json(
        &host,
        "/v1/plugins/members/trees/members/leaves",
        json!({"value": leaf(200)}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "TREE_FULL");
}
