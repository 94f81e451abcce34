//! # Authenticator
//!
//! Runs a verification batch through the [`PluginHost`], maps each success to
//! roles, and derives the [`AuthenticationResult`].
//!
//! ## Re-validation
//!
//! A previously issued bundle of outputs is re-checked plugin by plugin.
//! Outputs that are no longer valid, or that fail to check at all, lose their
//! roles entirely and move to `errors`; the status rule is then reapplied.
//! Roles for outputs that remain valid are recomputed from the output with
//! the current mapping. The roles carried in the submitted bundle are never
//! trusted.

use std::collections::BTreeMap;

use serde_json::Value;
use zkauth_core::{PluginName, Validity};
use zkauth_plugin::{BatchResult, ErrorReport, PluginHost, VerifyInput};

use crate::mapper::RoleMapper;
use crate::result::{AuthenticatedOutput, AuthenticationResult};

/// Error code for an output that no longer holds.
pub const OUTPUT_STALE: &str = "OUTPUT_STALE";

/// Host plus role mapping.
#[derive(Debug, Clone)]
pub struct Authenticator {
    host: PluginHost,
    mapper: RoleMapper,
}

impl Authenticator {
    /// Use configured role rules only.
    pub fn new(host: PluginHost) -> Self {
        Self::with_mapper(host, RoleMapper::new())
    }

    /// Use a custom mapper.
    pub fn with_mapper(host: PluginHost, mapper: RoleMapper) -> Self {
        Self { host, mapper }
    }

    /// The underlying host.
    pub fn host(&self) -> &PluginHost {
        &self.host
    }

    /// Verify every entry and derive the authentication result.
    pub async fn authenticate(
        &self,
        batch: BTreeMap<PluginName, VerifyInput>,
    ) -> AuthenticationResult {
        let results = self.host.verify_batch(batch).await;
        let result = self.aggregate(results);
        tracing::info!(
            status = ?result.status(),
            roles = result.roles().len(),
            "authentication evaluated"
        );
        result
    }

    /// Partition host results and apply the status rule.
    pub fn aggregate(&self, results: BatchResult<Value>) -> AuthenticationResult {
        let mut outputs = BTreeMap::new();
        let mut errors = BTreeMap::new();
        for (name, result) in results {
            match result {
                Ok(output) => {
                    let roles = self.mapper.roles_for(&self.host, &name, &output);
                    outputs.insert(name, AuthenticatedOutput { output, roles });
                }
                Err(e) => {
                    errors.insert(name, e.report());
                }
            }
        }
        AuthenticationResult::from_parts(outputs, errors)
    }

    /// Re-check a previously issued bundle against current state.
    pub async fn revalidate(
        &self,
        bundle: BTreeMap<PluginName, AuthenticatedOutput>,
    ) -> AuthenticationResult {
        let outputs: BTreeMap<PluginName, Value> = bundle
            .into_iter()
            .map(|(name, issued)| (name, issued.output))
            .collect();
        let checks = self
            .host
            .check_output_validity_batch(outputs.clone())
            .await;

        let mut still_valid = BTreeMap::new();
        let mut errors = BTreeMap::new();
        for (name, output) in outputs {
            match checks.get(&name) {
                Some(Ok(Validity::Valid)) => {
                    let roles = self.mapper.roles_for(&self.host, &name, &output);
                    still_valid.insert(name, AuthenticatedOutput { output, roles });
                }
                Some(Ok(Validity::Invalid { reason })) => {
                    errors.insert(
                        name,
                        ErrorReport {
                            code: OUTPUT_STALE.to_string(),
                            message: reason.clone(),
                        },
                    );
                }
                Some(Err(e)) => {
                    errors.insert(name, e.report());
                }
                None => {
                    tracing::error!(plugin = %name, "validity check produced no result");
                    errors.insert(
                        name,
                        ErrorReport {
                            code: "INTERNAL_ERROR".to_string(),
                            message: "internal error".to_string(),
                        },
                    );
                }
            }
        }

        let result = AuthenticationResult::from_parts(still_valid, errors);
        tracing::info!(
            status = ?result.status(),
            roles = result.roles().len(),
            "re-validation evaluated"
        );
        result
    }
}
