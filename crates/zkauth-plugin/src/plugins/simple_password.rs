//! # Simple-Password Plugin
//!
//! Grants a role to whoever proves knowledge of that role's password: a field
//! element whose Poseidon hash is configured for the role.
//!
//! ```yaml
//! implementation: simple-password
//! config:
//!   roles:
//!     admin: "<hex of Poseidon([password])>"
//! roles:
//!   field: { pointer: /role }
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{anyhow, bail, ensure};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use subtle::ConstantTimeEq;
use zkauth_core::{PluginName, Role, Validity, VerificationKey};
use zkauth_crypto::FieldElement;
use zkauth_zkp::{PasswordProgram, PasswordProof};

use crate::error::RegistryError;
use crate::plugin::{DynPlugin, FallibleAdapter, FalliblePlugin};

/// Configuration key of this implementation.
pub const IMPLEMENTATION: &str = "simple-password";

/// Configuration blob.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimplePasswordConfig {
    /// Role -> Poseidon hash of its password.
    #[serde(default)]
    pub roles: BTreeMap<Role, FieldElement>,
}

/// Public input: the role being claimed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PasswordArgs {
    /// Claimed role.
    pub role: Role,
}

/// A verified role claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PasswordOutput {
    /// The role proven.
    pub role: Role,
    /// The hash the proof was checked against.
    pub password_hash: FieldElement,
}

/// The plugin.
#[derive(Debug, Clone)]
pub struct SimplePasswordPlugin {
    config: SimplePasswordConfig,
    program: PasswordProgram,
}

impl SimplePasswordPlugin {
    /// A plugin over the given role table.
    pub fn new(config: SimplePasswordConfig) -> Self {
        Self {
            config,
            program: PasswordProgram::compile(),
        }
    }

    /// The password program, for building proofs client-side.
    pub fn program(&self) -> &PasswordProgram {
        &self.program
    }
}

/// Registry factory.
pub fn factory(name: &PluginName, config: &Value) -> Result<Arc<dyn DynPlugin>, RegistryError> {
    let config: SimplePasswordConfig = if config.is_null() {
        SimplePasswordConfig::default()
    } else {
        serde_json::from_value(config.clone()).map_err(|e| RegistryError::InvalidConfig {
            plugin: name.clone(),
            reason: e.to_string(),
        })?
    };
    Ok(Arc::new(FallibleAdapter(SimplePasswordPlugin::new(config))))
}

fn same_hash(a: &FieldElement, b: &FieldElement) -> bool {
    a.to_bytes()[..].ct_eq(&b.to_bytes()[..]).into()
}

impl FalliblePlugin for SimplePasswordPlugin {
    type PublicInputArgs = PasswordArgs;
    type Proof = PasswordProof;
    type Output = PasswordOutput;

    fn verification_key(&self) -> VerificationKey {
        self.program.verification_key()
    }

    fn verify_and_get_output(
        &self,
        args: PasswordArgs,
        proof: PasswordProof,
    ) -> anyhow::Result<PasswordOutput> {
        let expected = self
            .config
            .roles
            .get(&args.role)
            .ok_or_else(|| anyhow!("no password configured for role {}", args.role))?;
        ensure!(
            same_hash(expected, &proof.password_hash),
            "proof is for a different password"
        );
        if !self.program.verify(&proof)? {
            bail!("password proof does not verify");
        }
        Ok(PasswordOutput {
            role: args.role,
            password_hash: proof.password_hash,
        })
    }

    fn check_output_validity(&self, output: &PasswordOutput) -> anyhow::Result<Validity> {
        Ok(match self.config.roles.get(&output.role) {
            None => Validity::invalid(format!("role {} is no longer configured", output.role)),
            Some(current) if !same_hash(current, &output.password_hash) => {
                Validity::invalid(format!("password for role {} has changed", output.role))
            }
            Some(_) => Validity::Valid,
        })
    }
}
