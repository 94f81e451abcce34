//! # Merkle-Memberships Plugin
//!
//! Authenticates a prover who knows secrets committed in one or more of the
//! plugin's Merkle trees, using a single chained membership proof.
//!
//! ## Verification
//!
//! Public input is the ordered list of roots the proof was built over. Each
//! root must be the *current* root of one of the plugin's trees (otherwise
//! `"tree missing"`), the proof's recursive hash must equal the fold over
//! those roots, and the proof must verify under the membership program's key.
//!
//! ## Validity
//!
//! An output names the trees and roots it was accepted against. It stays
//! valid while every named tree still has exactly that root. Any mutation of
//! a tree (for example [`TreeSet::add_leaf`]) changes its root and makes
//! older outputs stale.
//!
//! ## Auxiliary routes
//!
//! | Route                              | Returns                          |
//! |------------------------------------|----------------------------------|
//! | `GET /trees`                       | name, height, root, leaf count   |
//! | `GET /trees/:tree/leaves`          | root and leaves (with holes)     |
//! | `GET /trees/:tree/witness/:index`  | root and witness for one leaf    |
//! | `POST /trees/:tree/leaves`         | append `{value}`, new index/root |
//!
//! The `POST` route is the administrative "lock" action. It is mounted with
//! the other plugin routes; deployments restrict it at the edge.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use zkauth_core::{PluginName, Validity, VerificationKey};
use zkauth_crypto::{
    hash_secret, CryptoError, FieldElement, InMemoryWitnessStore, MerkleWitness, WitnessStore,
};
use zkauth_zkp::{
    expected_recursive_hash, MembershipPrivateInput, MembershipProgram, MembershipProof,
    ProofError,
};

use crate::error::{PluginError, RegistryError};
use crate::plugin::{DynPlugin, ProofPlugin};

/// Configuration key of this implementation.
pub const IMPLEMENTATION: &str = "merkle-memberships";

/// Errors from tree administration and client-side proof building.
#[derive(Debug, thiserror::Error)]
pub enum MembershipError {
    /// No tree with this name.
    #[error("unknown tree: {0}")]
    UnknownTree(String),

    /// The secret's leaf is not in the tree.
    #[error("leaf not found in tree {tree}")]
    LeafNotFound {
        /// Tree searched.
        tree: String,
    },

    /// Two trees were given the same name.
    #[error("duplicate tree name: {0}")]
    DuplicateTree(String),

    /// Tree-level failure.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Proof construction failed.
    #[error(transparent)]
    Proof(#[from] ProofError),
}

// ---------------------------------------------------------------------------
// Trees
// ---------------------------------------------------------------------------

/// Named trees backing one plugin instance.
#[derive(Clone, Default)]
pub struct TreeSet {
    trees: BTreeMap<String, Arc<dyn WitnessStore>>,
}

impl std::fmt::Debug for TreeSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.trees.iter().map(|(name, store)| (name, store.root())))
            .finish()
    }
}

impl TreeSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tree under `name`.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        store: Arc<dyn WitnessStore>,
    ) -> Result<(), MembershipError> {
        let name = name.into();
        if self.trees.contains_key(&name) {
            return Err(MembershipError::DuplicateTree(name));
        }
        self.trees.insert(name, store);
        Ok(())
    }

    /// The tree named `name`.
    pub fn get(&self, name: &str) -> Result<&Arc<dyn WitnessStore>, MembershipError> {
        self.trees
            .get(name)
            .ok_or_else(|| MembershipError::UnknownTree(name.to_string()))
    }

    /// The tree whose current root is `root`.
    pub fn find_by_root(&self, root: &FieldElement) -> Option<(&str, &Arc<dyn WitnessStore>)> {
        self.trees
            .iter()
            .find(|(_, store)| store.root() == *root)
            .map(|(name, store)| (name.as_str(), store))
    }

    /// Tree names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.trees.keys().map(String::as_str)
    }

    /// Append `value` to `tree` (the "lock" action) and return its index.
    pub fn add_leaf(&self, tree: &str, value: FieldElement) -> Result<u64, MembershipError> {
        let index = self.get(tree)?.append_leaf(value)?;
        tracing::info!(tree = %tree, index, "leaf added");
        Ok(index)
    }
}

/// Root and witness for the leaf committing `secret` in `tree`.
///
/// This is the prover's first step: the pair is read from one tree state.
pub fn fetch_public_inputs(
    trees: &TreeSet,
    tree: &str,
    secret: &FieldElement,
) -> Result<(FieldElement, MerkleWitness), MembershipError> {
    let store = trees.get(tree)?;
    let index = store
        .find_leaf(&hash_secret(secret))
        .ok_or_else(|| MembershipError::LeafNotFound {
            tree: tree.to_string(),
        })?;
    Ok(store.public_inputs(index)?)
}

/// Build public input args and a chained proof over `claims`, in order.
pub fn prove_memberships(
    program: &MembershipProgram,
    trees: &TreeSet,
    claims: &[(&str, FieldElement)],
) -> Result<(MembershipArgs, MembershipProof), MembershipError> {
    let mut roots = Vec::with_capacity(claims.len());
    let mut privates = Vec::with_capacity(claims.len());
    for (tree, secret) in claims {
        let (root, witness) = fetch_public_inputs(trees, tree, secret)?;
        roots.push(root);
        privates.push(MembershipPrivateInput {
            witness,
            secret: *secret,
        });
    }
    let proof = program.prove_chain(&roots, &privates)?;
    Ok((MembershipArgs { roots }, proof))
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

/// Configuration blob.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MerkleMembershipsConfig {
    /// Trees to create.
    pub trees: Vec<TreeConfig>,
}

/// One configured tree.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TreeConfig {
    /// Tree name, unique within the plugin.
    pub name: String,
    /// Fixed height.
    pub height: u8,
    /// Initial leaves at indices `0..leaves.len()`.
    #[serde(default)]
    pub leaves: Vec<FieldElement>,
}

/// Public input arguments: roots in proving order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MembershipArgs {
    /// Roots, first proven first.
    pub roots: Vec<FieldElement>,
}

/// What a verified membership proof attests to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MembershipOutput {
    /// Tree each root belonged to at verification time.
    pub trees: Vec<String>,
    /// Roots in proving order.
    pub roots: Vec<FieldElement>,
    /// The proof's recursive hash.
    pub recursive_hash: FieldElement,
}

/// The plugin.
#[derive(Debug, Clone)]
pub struct MerkleMembershipsPlugin {
    trees: Arc<TreeSet>,
    program: MembershipProgram,
}

impl MerkleMembershipsPlugin {
    /// A plugin over `trees`.
    pub fn new(trees: TreeSet) -> Self {
        Self {
            trees: Arc::new(trees),
            program: MembershipProgram::compile(),
        }
    }

    /// Build from a configuration blob.
    pub fn from_config(config: MerkleMembershipsConfig) -> Result<Self, MembershipError> {
        let mut trees = TreeSet::new();
        for tree in config.trees {
            let store = InMemoryWitnessStore::with_leaves(tree.height, tree.leaves)?;
            trees.insert(tree.name, Arc::new(store))?;
        }
        Ok(Self::new(trees))
    }

    /// Shared handle to the backing trees.
    pub fn trees(&self) -> Arc<TreeSet> {
        Arc::clone(&self.trees)
    }

    /// The membership program, for building proofs client-side.
    pub fn program(&self) -> &MembershipProgram {
        &self.program
    }
}

/// Registry factory.
pub fn factory(name: &PluginName, config: &Value) -> Result<Arc<dyn DynPlugin>, RegistryError> {
    let invalid = |reason: String| RegistryError::InvalidConfig {
        plugin: name.clone(),
        reason,
    };
    let config: MerkleMembershipsConfig =
        serde_json::from_value(config.clone()).map_err(|e| invalid(e.to_string()))?;
    let plugin = MerkleMembershipsPlugin::from_config(config).map_err(|e| invalid(e.to_string()))?;
    Ok(Arc::new(plugin))
}

impl ProofPlugin for MerkleMembershipsPlugin {
    type PublicInputArgs = MembershipArgs;
    type Proof = MembershipProof;
    type Output = MembershipOutput;

    fn verification_key(&self) -> VerificationKey {
        self.program.verification_key()
    }

    fn verify_and_get_output(
        &self,
        args: MembershipArgs,
        proof: MembershipProof,
    ) -> Result<MembershipOutput, PluginError> {
        if args.roots.is_empty() {
            return Err(PluginError::MalformedInput("roots must not be empty".into()));
        }
        let trees = args
            .roots
            .iter()
            .map(|root| {
                self.trees
                    .find_by_root(root)
                    .map(|(name, _)| name.to_string())
                    .ok_or_else(|| PluginError::ProofInvalid(format!("tree missing for root {root}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.program
            .verify_against_roots(&proof, &args.roots)
            .map_err(|e| PluginError::ProofInvalid(e.to_string()))?;

        Ok(MembershipOutput {
            trees,
            roots: args.roots,
            recursive_hash: proof.public_output,
        })
    }

    fn check_output_validity(&self, output: &MembershipOutput) -> Result<Validity, PluginError> {
        if output.trees.len() != output.roots.len() {
            return Err(PluginError::MalformedOutput(format!(
                "{} trees but {} roots",
                output.trees.len(),
                output.roots.len()
            )));
        }
        for (tree, root) in output.trees.iter().zip(&output.roots) {
            let Ok(store) = self.trees.get(tree) else {
                return Ok(Validity::invalid(format!("tree missing: {tree}")));
            };
            let current = store.root();
            if current != *root {
                return Ok(Validity::invalid(format!(
                    "root mismatch for tree {tree}: output has {root}, current root is {current}"
                )));
            }
        }
        if expected_recursive_hash(&output.roots) != Some(output.recursive_hash) {
            return Ok(Validity::invalid("recursive hash does not match roots"));
        }
        Ok(Validity::Valid)
    }

    fn routes(&self) -> Option<Router> {
        Some(
            Router::new()
                .route("/trees", get(list_trees))
                .route("/trees/:tree/leaves", get(tree_leaves).post(add_tree_leaf))
                .route("/trees/:tree/witness/:index", get(tree_witness))
                .with_state(self.trees()),
        )
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// Summary of one tree.
#[derive(Debug, Serialize, Deserialize)]
pub struct TreeSummary {
    /// Tree name.
    pub name: String,
    /// Fixed height.
    pub height: u8,
    /// Current root.
    pub root: FieldElement,
    /// Occupied slots.
    pub leaf_count: usize,
}

/// Request body for appending a leaf.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddLeafRequest {
    /// Leaf value, usually `hash_secret(secret)`.
    pub value: FieldElement,
}

/// Where an appended leaf landed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddLeafResponse {
    pub tree: String,
    pub index: u64,
    /// Root observed right after the append.
    pub root: FieldElement,
}

/// Error body for auxiliary routes.
struct RouteError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl From<MembershipError> for RouteError {
    fn from(err: MembershipError) -> Self {
        let (status, code) = match &err {
            MembershipError::UnknownTree(_)
            | MembershipError::LeafNotFound { .. }
            | MembershipError::Crypto(CryptoError::LeafNotFound { .. }) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND")
            }
            MembershipError::Crypto(CryptoError::TreeFull { .. }) => {
                (StatusCode::CONFLICT, "TREE_FULL")
            }
            _ => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
        };
        Self {
            status,
            code,
            message: err.to_string(),
        }
    }
}

impl From<JsonRejection> for RouteError {
    fn from(err: JsonRejection) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "BAD_REQUEST",
            message: err.body_text(),
        }
    }
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        let body = json!({"error": {"code": self.code, "message": self.message}});
        (self.status, Json(body)).into_response()
    }
}

async fn list_trees(State(trees): State<Arc<TreeSet>>) -> Json<Vec<TreeSummary>> {
    let summaries = trees
        .trees
        .iter()
        .map(|(name, store)| TreeSummary {
            name: name.clone(),
            height: store.height(),
            root: store.root(),
            leaf_count: store.leaves().iter().flatten().count(),
        })
        .collect();
    Json(summaries)
}

async fn tree_leaves(
    State(trees): State<Arc<TreeSet>>,
    Path(tree): Path<String>,
) -> Result<Json<Value>, RouteError> {
    let store = trees.get(&tree)?;
    let leaves = store.leaves();
    let root = store.root();
    Ok(Json(json!({"tree": tree, "root": root, "leaves": leaves})))
}

async fn tree_witness(
    State(trees): State<Arc<TreeSet>>,
    Path((tree, index)): Path<(String, u64)>,
) -> Result<Json<Value>, RouteError> {
    let store = trees.get(&tree)?;
    let (root, witness) = store.public_inputs(index).map_err(MembershipError::from)?;
    Ok(Json(
        json!({"tree": tree, "index": index, "root": root, "witness": witness}),
    ))
}

async fn add_tree_leaf(
    State(trees): State<Arc<TreeSet>>,
    Path(tree): Path<String>,
    body: Result<Json<AddLeafRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AddLeafResponse>), RouteError> {
    let Json(req) = body?;
    let index = trees.add_leaf(&tree, req.value)?;
    let root = trees.get(&tree)?.root();
    Ok((StatusCode::CREATED, Json(AddLeafResponse { tree, index, root })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(n: u64) -> FieldElement {
        hash_secret(&FieldElement::from_u64(n))
    }

    fn plugin_with(trees: &[(&str, std::ops::Range<u64>)]) -> MerkleMembershipsPlugin {
        let mut set = TreeSet::new();
        for (name, range) in trees {
            let store = InMemoryWitnessStore::with_leaves(4, range.clone().map(leaf)).unwrap();
            set.insert(*name, Arc::new(store)).unwrap();
        }
        MerkleMembershipsPlugin::new(set)
    }

    #[test]
    fn verifies_single_tree_membership() {
        let plugin = plugin_with(&[("members", 0..10)]);
        let trees = plugin.trees();
        let (args, proof) =
            prove_memberships(plugin.program(), &trees, &[("members", FieldElement::from_u64(0))])
                .unwrap();
        let output = plugin.verify_and_get_output(args, proof).unwrap();
        assert_eq!(output.trees, vec!["members".to_string()]);
        assert_eq!(output.roots, vec![trees.get("members").unwrap().root()]);
        assert_eq!(
            ProofPlugin::check_output_validity(&plugin, &output).unwrap(),
            Validity::Valid
        );
    }

    #[test]
    fn unknown_root_is_tree_missing() {
        let plugin = plugin_with(&[("members", 0..4)]);
        let other = plugin_with(&[("elsewhere", 0..5)]);
        let (args, proof) = prove_memberships(
            other.program(),
            &other.trees(),
            &[("elsewhere", FieldElement::from_u64(1))],
        )
        .unwrap();
        match plugin.verify_and_get_output(args, proof) {
            Err(PluginError::ProofInvalid(msg)) => assert!(msg.contains("tree missing")),
            other => panic!("expected tree missing, got {other:?}"),
        }
    }

    #[test]
    fn reordered_roots_are_rejected() {
        let plugin = plugin_with(&[("a", 0..4), ("b", 10..14)]);
        let trees = plugin.trees();
        let (mut args, proof) = prove_memberships(
            plugin.program(),
            &trees,
            &[("a", FieldElement::from_u64(1)), ("b", FieldElement::from_u64(11))],
        )
        .unwrap();
        args.roots.reverse();
        assert!(matches!(
            plugin.verify_and_get_output(args, proof),
            Err(PluginError::ProofInvalid(_))
        ));
    }

    #[test]
    fn empty_roots_are_malformed_input() {
        let plugin = plugin_with(&[("a", 0..4)]);
        let trees = plugin.trees();
        let (_, proof) =
            prove_memberships(plugin.program(), &trees, &[("a", FieldElement::from_u64(0))])
                .unwrap();
        assert!(matches!(
            plugin.verify_and_get_output(MembershipArgs { roots: vec![] }, proof),
            Err(PluginError::MalformedInput(_))
        ));
    }

    #[test]
    fn fetch_public_inputs_for_absent_secret_fails() {
        let plugin = plugin_with(&[("a", 0..3)]);
        let err = fetch_public_inputs(&plugin.trees(), "a", &FieldElement::from_u64(3)).unwrap_err();
        assert!(matches!(err, MembershipError::LeafNotFound { .. }));
        let err = fetch_public_inputs(&plugin.trees(), "zz", &FieldElement::from_u64(0)).unwrap_err();
        assert!(matches!(err, MembershipError::UnknownTree(_)));
    }

    #[test]
    fn adding_a_leaf_stales_prior_outputs() {
        let plugin = plugin_with(&[("a", 0..3)]);
        let trees = plugin.trees();
        let (args, proof) =
            prove_memberships(plugin.program(), &trees, &[("a", FieldElement::from_u64(2))])
                .unwrap();
        let output = plugin.verify_and_get_output(args, proof).unwrap();
        assert_eq!(trees.add_leaf("a", leaf(3)).unwrap(), 3);
        let validity = ProofPlugin::check_output_validity(&plugin, &output).unwrap();
        assert!(validity.reason().unwrap().contains("root mismatch"));
    }

    #[test]
    fn inconsistent_output_is_malformed() {
        let plugin = plugin_with(&[("a", 0..3)]);
        let output = MembershipOutput {
            trees: vec!["a".into()],
            roots: vec![],
            recursive_hash: FieldElement::zero(),
        };
        assert!(matches!(
            ProofPlugin::check_output_validity(&plugin, &output),
            Err(PluginError::MalformedOutput(_))
        ));
    }

    #[test]
    fn tampered_recursive_hash_is_invalid() {
        let plugin = plugin_with(&[("a", 0..3)]);
        let root = plugin.trees().get("a").unwrap().root();
        let output = MembershipOutput {
            trees: vec!["a".into()],
            roots: vec![root],
            recursive_hash: FieldElement::from_u64(1),
        };
        let validity = ProofPlugin::check_output_validity(&plugin, &output).unwrap();
        assert!(!validity.is_valid());
    }

    #[test]
    fn factory_rejects_bad_config() {
        let name = PluginName::new("m").unwrap();
        assert!(factory(&name, &json!({"trees": [{"name": "a", "height": 0}]})).is_err());
        assert!(factory(
            &name,
            &json!({"trees": [{"name": "a", "height": 4}, {"name": "a", "height": 4}]})
        )
        .is_err());
        assert!(factory(&name, &json!({"trees": [{"name": "a", "height": 4}]})).is_ok());
    }

    #[test]
    fn output_round_trips_through_json() {
        let output = MembershipOutput {
            trees: vec!["a".into(), "b".into()],
            roots: vec![leaf(1), leaf(2)],
            recursive_hash: leaf(3),
        };
        let back: MembershipOutput =
            serde_json::from_value(serde_json::to_value(&output).unwrap()).unwrap();
        assert_eq!(back, output);
    }
}
