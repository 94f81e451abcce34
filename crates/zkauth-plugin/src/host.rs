//! # Plugin Host
//!
//! Dispatches verification and validity-check requests to registered
//! plugins. The host itself holds no per-request state.
//!
//! ## Batches
//!
//! A batch maps plugin names to inputs. Every entry is processed on its own
//! blocking task, concurrently with the others, and its outcome lands in its
//! own result slot:
//!
//! - an unknown name yields `PluginError::NotFound` for that entry only;
//! - a plugin error stays in that entry's slot;
//! - a panicking plugin yields `PluginError::Internal` for that entry only.
//!
//! Nothing in one entry can abort another, and no ordering between entries
//! is assumed.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::Router;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::task::JoinSet;
use zkauth_core::{PluginName, RoleRule, Validity, VerificationKey};

use crate::error::PluginError;
use crate::plugin::DynPlugin;
use crate::registry::PluginRegistry;

/// Inputs for one verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyInput {
    /// Plugin-defined public input arguments.
    pub public_input_args: Value,
    /// Plugin-defined proof.
    pub proof: Value,
}

/// Per-plugin outcomes of a batch.
pub type BatchResult<T> = BTreeMap<PluginName, Result<T, PluginError>>;

/// Long-lived dispatcher over an immutable registry.
#[derive(Debug, Clone)]
pub struct PluginHost {
    registry: Arc<PluginRegistry>,
}

impl PluginHost {
    /// Wrap a registry.
    pub fn new(registry: PluginRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// The underlying registry.
    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    /// Names of every registered plugin, sorted.
    pub fn active_plugin_names(&self) -> Vec<PluginName> {
        self.registry.names()
    }

    /// Role rule configured for a plugin.
    pub fn role_rule(&self, name: &PluginName) -> Option<&RoleRule> {
        self.registry.get(name).map(|p| &p.roles)
    }

    /// Verification key of a plugin.
    pub fn verification_key(&self, name: &PluginName) -> Result<VerificationKey, PluginError> {
        Ok(self.lookup(name)?.verification_key())
    }

    /// Verify one proof on the calling thread.
    pub fn verify(&self, name: &PluginName, input: VerifyInput) -> Result<Value, PluginError> {
        let plugin = self.lookup(name)?;
        run_verify(name, plugin.as_ref(), input)
    }

    /// Re-check one stored output on the calling thread.
    pub fn check_output_validity(
        &self,
        name: &PluginName,
        output: Value,
    ) -> Result<Validity, PluginError> {
        let plugin = self.lookup(name)?;
        run_check(name, plugin.as_ref(), output)
    }

    /// Verify every entry concurrently.
    pub async fn verify_batch(&self, batch: BTreeMap<PluginName, VerifyInput>) -> BatchResult<Value> {
        self.fan_out(batch, run_verify).await
    }

    /// Re-check every stored output concurrently.
    ///
    /// Each check reads the plugin's state at the time it runs, not a snapshot
    /// taken when the batch started.
    pub async fn check_output_validity_batch(
        &self,
        batch: BTreeMap<PluginName, Value>,
    ) -> BatchResult<Validity> {
        self.fan_out(batch, run_check).await
    }

    /// Every plugin's auxiliary routes, each nested under `{base}/{name}`.
    pub fn routes(&self, base: &str) -> Router {
        let base = base.trim_end_matches('/');
        self.registry
            .iter()
            .filter_map(|(name, registered)| {
                registered
                    .plugin
                    .routes()
                    .map(|router| (format!("{base}/{name}"), router))
            })
            .fold(Router::new(), |app, (path, router)| app.nest(&path, router))
    }

    fn lookup(&self, name: &PluginName) -> Result<Arc<dyn DynPlugin>, PluginError> {
        self.registry
            .get(name)
            .map(|p| Arc::clone(&p.plugin))
            .ok_or_else(|| {
                tracing::warn!(plugin = %name, "plugin not found");
                PluginError::NotFound(name.clone())
            })
    }

    async fn fan_out<I, T>(
        &self,
        batch: BTreeMap<PluginName, I>,
        op: fn(&PluginName, &dyn DynPlugin, I) -> Result<T, PluginError>,
    ) -> BatchResult<T>
    where
        I: Send + 'static,
        T: Send + 'static,
    {
        let mut results = BatchResult::new();
        let mut tasks = JoinSet::new();
        let requested: Vec<PluginName> = batch.keys().cloned().collect();

        for (name, input) in batch {
            let plugin = match self.lookup(&name) {
                Ok(plugin) => plugin,
                Err(e) => {
                    results.insert(name, Err(e));
                    continue;
                }
            };
            tasks.spawn(async move {
                let task_name = name.clone();
                let outcome =
                    tokio::task::spawn_blocking(move || op(&task_name, plugin.as_ref(), input))
                        .await;
                let result = outcome.unwrap_or_else(|join_err| {
                    tracing::error!(plugin = %name, error = %join_err, "plugin task failed");
                    Err(PluginError::Internal(format!("plugin task failed: {join_err}")))
                });
                (name, result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((name, result)) => {
                    results.insert(name, result);
                }
                // The outer task only awaits the blocking one, so this is a
                // runtime shutdown. The entry is filled in below.
                Err(e) => tracing::error!(error = %e, "batch task aborted"),
            }
        }
        fill_missing(&requested, &mut results);
        results
    }
}

/// Give every requested entry a result slot; a lost task counts as internal.
fn fill_missing<T>(requested: &[PluginName], results: &mut BatchResult<T>) {
    for name in requested {
        results.entry(name.clone()).or_insert_with(|| {
            tracing::error!(plugin = %name, "plugin produced no result");
            Err(PluginError::Internal("plugin task aborted".into()))
        });
    }
}

fn run_verify(
    name: &PluginName,
    plugin: &dyn DynPlugin,
    input: VerifyInput,
) -> Result<Value, PluginError> {
    let result = plugin.verify(input.public_input_args, input.proof);
    log_outcome(name, "verify", &result);
    result
}

fn run_check(
    name: &PluginName,
    plugin: &dyn DynPlugin,
    output: Value,
) -> Result<Validity, PluginError> {
    let result = plugin.check_output_validity(output);
    if let Ok(Validity::Invalid { reason }) = &result {
        tracing::info!(plugin = %name, reason = %reason, "output is stale");
    }
    log_outcome(name, "check_output_validity", &result);
    result
}

fn log_outcome<T>(name: &PluginName, op: &'static str, result: &Result<T, PluginError>) {
    match result {
        Ok(_) => tracing::debug!(plugin = %name, op, "plugin call succeeded"),
        Err(PluginError::Internal(detail)) => {
            tracing::error!(plugin = %name, op, detail = %detail, "plugin internal error")
        }
        Err(e) => tracing::info!(plugin = %name, op, code = e.code(), error = %e, "plugin call rejected"),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::plugin::ProofPlugin;

    /// Accepts a proof equal to the public input; output echoes it.
    struct Echo;

    impl ProofPlugin for Echo {
        type PublicInputArgs = u64;
        type Proof = u64;
        type Output = u64;

        fn verification_key(&self) -> VerificationKey {
            VerificationKey {
                program: "echo".into(),
                fingerprint: "ee".into(),
            }
        }

        fn verify_and_get_output(&self, args: u64, proof: u64) -> Result<u64, PluginError> {
            if args == 666 {
                panic!("plugin bug");
            }
            if args != proof {
                return Err(PluginError::ProofInvalid("mismatch".into()));
            }
            Ok(args)
        }

        fn check_output_validity(&self, output: &u64) -> Result<Validity, PluginError> {
            Ok(if *output % 2 == 0 {
                Validity::Valid
            } else {
                Validity::invalid("odd")
            })
        }
    }

    fn name(s: &str) -> PluginName {
        PluginName::new(s).unwrap()
    }

    fn host() -> PluginHost {
        let registry = PluginRegistry::builder()
            .register(name("a"), Arc::new(Echo), RoleRule::default())
            .unwrap()
            .register(name("b"), Arc::new(Echo), RoleRule::default())
            .unwrap()
            .build();
        PluginHost::new(registry)
    }

    fn input(args: u64, proof: u64) -> VerifyInput {
        VerifyInput {
            public_input_args: json!(args),
            proof: json!(proof),
        }
    }

    #[test]
    fn single_verify_and_not_found() {
        let host = host();
        assert_eq!(host.verify(&name("a"), input(3, 3)).unwrap(), json!(3));
        assert_eq!(
            host.verify(&name("zz"), input(3, 3)).unwrap_err(),
            PluginError::NotFound(name("zz"))
        );
        assert_eq!(host.active_plugin_names(), vec![name("a"), name("b")]);
    }

    #[test]
    fn lost_entries_become_internal_errors() {
        let mut results: BatchResult<Value> = BatchResult::new();
        results.insert(name("a"), Ok(json!(1)));
        fill_missing(&[name("a"), name("b")], &mut results);
        assert_eq!(results.len(), 2);
        assert_eq!(results[&name("a")], Ok(json!(1)));
        assert!(matches!(results[&name("b")], Err(PluginError::Internal(_))));
    }

    #[tokio::test]
    async fn batch_keeps_failures_in_their_slots() {
        let host = host();
        let mut batch = BTreeMap::new();
        batch.insert(name("a"), input(4, 4));
        batch.insert(name("b"), input(4, 5));
        batch.insert(name("ghost"), input(1, 1));
        let results = host.verify_batch(batch).await;
        assert_eq!(results.len(), 3);
        assert_eq!(results[&name("a")], Ok(json!(4)));
        assert!(matches!(results[&name("b")], Err(PluginError::ProofInvalid(_))));
        assert!(matches!(results[&name("ghost")], Err(PluginError::NotFound(_))));
    }

    #[tokio::test]
    async fn panicking_plugin_is_internal_error_for_its_entry_only() {
        let host = host();
        let mut batch = BTreeMap::new();
        batch.insert(name("a"), input(666, 666));
        batch.insert(name("b"), input(2, 2));
        let results = host.verify_batch(batch).await;
        assert!(matches!(results[&name("a")], Err(PluginError::Internal(_))));
        assert_eq!(results[&name("b")], Ok(json!(2)));
    }

    #[tokio::test]
    async fn empty_batch_yields_empty_results() {
        assert!(host().verify_batch(BTreeMap::new()).await.is_empty());
    }

    #[tokio::test]
    async fn validity_batch() {
        let host = host();
        let mut batch = BTreeMap::new();
        batch.insert(name("a"), json!(2));
        batch.insert(name("b"), json!(3));
        batch.insert(name("c"), json!(4));
        let results = host.check_output_validity_batch(batch).await;
        assert_eq!(results[&name("a")], Ok(Validity::Valid));
        assert_eq!(results[&name("b")], Ok(Validity::invalid("odd")));
        assert!(matches!(results[&name("c")], Err(PluginError::NotFound(_))));
    }

    #[test]
    fn plugins_without_routes_mount_nothing() {
        let _router: Router = host().routes("/v1/plugins/");
    }
}
