//! # Plugin Capability Traits
//!
//! A plugin verifies one kind of proof, turns it into an output, and later
//! re-checks that output against current state. Authors can write it in
//! either of two conventions:
//!
//! - [`ProofPlugin`]: every operation returns `Result<_, PluginError>`; the
//!   author classifies each failure.
//! - [`FalliblePlugin`]: operations return `anyhow::Result` and use `?`,
//!   `bail!`, and `ensure!` freely. [`FallibleAdapter`] lifts such a plugin
//!   into a `ProofPlugin` when it is registered.
//!
//! The host sees neither directly. It dispatches through [`DynPlugin`], the
//! object-safe, JSON-in/JSON-out form implemented for every `ProofPlugin`.
//! Decoding lives there, so every plugin classifies bad input the same way:
//!
//! - public input that fails to decode is `MalformedInput`;
//! - a proof that fails to decode is `ProofInvalid` (an undecodable proof
//!   proves nothing);
//! - a stored output that fails to decode is `MalformedOutput`.

use axum::Router;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use zkauth_core::{Validity, VerificationKey};

use crate::error::PluginError;

/// A plugin written with explicit, classified results.
pub trait ProofPlugin: Send + Sync + 'static {
    /// Public input arguments supplied alongside a proof.
    type PublicInputArgs: DeserializeOwned;
    /// The proof artifact.
    type Proof: DeserializeOwned;
    /// What a successful verification attests to.
    type Output: Serialize + DeserializeOwned;

    /// Identity of the verification key the plugin checks proofs against.
    fn verification_key(&self) -> VerificationKey;

    /// Verify `proof` against `args` and compute the output.
    fn verify_and_get_output(
        &self,
        args: Self::PublicInputArgs,
        proof: Self::Proof,
    ) -> Result<Self::Output, PluginError>;

    /// Re-derive whether `output` still holds against current state.
    ///
    /// Must not mutate state and must not re-run proof verification.
    fn check_output_validity(&self, output: &Self::Output) -> Result<Validity, PluginError>;

    /// Auxiliary routes provers use to fetch public data. Paths are relative
    /// to the plugin's namespace.
    fn routes(&self) -> Option<Router> {
        None
    }
}

/// A plugin written in plain fallible style.
///
/// Errors that are a [`PluginError`] keep their class. Verification errors
/// of any other type become [`PluginError::ProofInvalid`]; validity-check
/// errors of any other type become [`PluginError::Internal`].
pub trait FalliblePlugin: Send + Sync + 'static {
    /// Public input arguments supplied alongside a proof.
    type PublicInputArgs: DeserializeOwned;
    /// The proof artifact.
    type Proof: DeserializeOwned;
    /// What a successful verification attests to.
    type Output: Serialize + DeserializeOwned;

    /// Identity of the verification key.
    fn verification_key(&self) -> VerificationKey;

    /// Verify and compute the output.
    fn verify_and_get_output(
        &self,
        args: Self::PublicInputArgs,
        proof: Self::Proof,
    ) -> anyhow::Result<Self::Output>;

    /// Re-derive whether `output` still holds.
    fn check_output_validity(&self, output: &Self::Output) -> anyhow::Result<Validity>;

    /// Auxiliary routes.
    fn routes(&self) -> Option<Router> {
        None
    }
}

/// Lifts a [`FalliblePlugin`] into a [`ProofPlugin`].
#[derive(Debug)]
pub struct FallibleAdapter<P>(pub P);

impl<P: FalliblePlugin> ProofPlugin for FallibleAdapter<P> {
    type PublicInputArgs = P::PublicInputArgs;
    type Proof = P::Proof;
    type Output = P::Output;

    fn verification_key(&self) -> VerificationKey {
        self.0.verification_key()
    }

    fn verify_and_get_output(
        &self,
        args: Self::PublicInputArgs,
        proof: Self::Proof,
    ) -> Result<Self::Output, PluginError> {
        self.0
            .verify_and_get_output(args, proof)
            .map_err(|e| classify(e, PluginError::ProofInvalid))
    }

    fn check_output_validity(&self, output: &Self::Output) -> Result<Validity, PluginError> {
        self.0
            .check_output_validity(output)
            .map_err(|e| classify(e, PluginError::Internal))
    }

    fn routes(&self) -> Option<Router> {
        self.0.routes()
    }
}

fn classify(err: anyhow::Error, fallback: fn(String) -> PluginError) -> PluginError {
    match err.downcast::<PluginError>() {
        Ok(structured) => structured,
        Err(other) => fallback(format!("{other:#}")),
    }
}

/// Object-safe, JSON-level plugin interface the host dispatches through.
pub trait DynPlugin: Send + Sync {
    /// Identity of the verification key.
    fn verification_key(&self) -> VerificationKey;

    /// Decode, verify, and return the encoded output.
    fn verify(&self, public_input_args: Value, proof: Value) -> Result<Value, PluginError>;

    /// Decode a stored output and re-check it.
    fn check_output_validity(&self, output: Value) -> Result<Validity, PluginError>;

    /// Auxiliary routes, relative to the plugin's namespace.
    fn routes(&self) -> Option<Router>;
}

impl<P: ProofPlugin> DynPlugin for P {
    fn verification_key(&self) -> VerificationKey {
        ProofPlugin::verification_key(self)
    }

    fn verify(&self, public_input_args: Value, proof: Value) -> Result<Value, PluginError> {
        let args: P::PublicInputArgs = serde_json::from_value(public_input_args)
            .map_err(|e| PluginError::MalformedInput(e.to_string()))?;
        let proof: P::Proof = serde_json::from_value(proof)
            .map_err(|e| PluginError::ProofInvalid(format!("undecodable proof: {e}")))?;
        let output = self.verify_and_get_output(args, proof)?;
        serde_json::to_value(output)
            .map_err(|e| PluginError::Internal(format!("output encoding failed: {e}")))
    }

    fn check_output_validity(&self, output: Value) -> Result<Validity, PluginError> {
        let output: P::Output = serde_json::from_value(output)
            .map_err(|e| PluginError::MalformedOutput(e.to_string()))?;
        ProofPlugin::check_output_validity(self, &output)
    }

    fn routes(&self) -> Option<Router> {
        ProofPlugin::routes(self)
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Deserialize)]
    struct Args {
        n: u64,
    }

    #[derive(Serialize, Deserialize)]
    struct Out {
        n: u64,
    }

    fn vk() -> VerificationKey {
        VerificationKey {
            program: "even".into(),
            fingerprint: "00".into(),
        }
    }

    /// Accepts proofs equal to `n * 2`.
    struct Even;

    impl FalliblePlugin for Even {
        type PublicInputArgs = Args;
        type Proof = u64;
        type Output = Out;

        fn verification_key(&self) -> VerificationKey {
            vk()
        }

        fn verify_and_get_output(&self, args: Args, proof: u64) -> anyhow::Result<Out> {
            if args.n == 13 {
                return Err(PluginError::MalformedInput("unlucky".into()).into());
            }
            anyhow::ensure!(proof == args.n * 2, "proof {proof} is not twice {}", args.n);
            Ok(Out { n: args.n })
        }

        fn check_output_validity(&self, output: &Out) -> anyhow::Result<Validity> {
            anyhow::ensure!(output.n != 99, "backing store unreachable");
            Ok(if output.n < 100 {
                Validity::Valid
            } else {
                Validity::invalid("too large")
            })
        }
    }

    fn erased() -> Box<dyn DynPlugin> {
        Box::new(FallibleAdapter(Even))
    }

    #[test]
    fn fallible_success_round_trips_through_json() {
        let out = erased().verify(json!({"n": 4}), json!(8)).unwrap();
        assert_eq!(out, json!({"n": 4}));
    }

    #[test]
    fn untyped_verification_error_is_proof_invalid() {
        let err = erased().verify(json!({"n": 4}), json!(7)).unwrap_err();
        assert!(matches!(err, PluginError::ProofInvalid(ref m) if m.contains("not twice")));
    }

    #[test]
    fn structured_error_keeps_its_class() {
        let err = erased().verify(json!({"n": 13}), json!(26)).unwrap_err();
        assert_eq!(err, PluginError::MalformedInput("unlucky".into()));
    }

    #[test]
    fn bad_args_are_malformed_input_and_bad_proof_is_invalid() {
        let p = erased();
        assert!(matches!(
            p.verify(json!({"m": 1}), json!(2)),
            Err(PluginError::MalformedInput(_))
        ));
        assert!(matches!(
            p.verify(json!({"n": 1}), json!("two")),
            Err(PluginError::ProofInvalid(_))
        ));
    }

    #[test]
    fn validity_paths() {
        let p = erased();
        assert_eq!(p.check_output_validity(json!({"n": 1})).unwrap(), Validity::Valid);
        assert!(!p.check_output_validity(json!({"n": 100})).unwrap().is_valid());
        assert!(matches!(
            p.check_output_validity(json!({"x": 1})),
            Err(PluginError::MalformedOutput(_))
        ));
        assert!(matches!(
            p.check_output_validity(json!({"n": 99})),
            Err(PluginError::Internal(_))
        ));
    }

    #[test]
    fn adapter_forwards_key_and_routes() {
        let p = erased();
        assert_eq!(p.verification_key(), vk());
        assert!(p.routes().is_none());
    }
}
