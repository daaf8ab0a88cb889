//! Program-derived address resolution from live form values.

use std::collections::BTreeMap;

use heck::MixedCase;
use serde_json::Value;
use solana_explorer_idl::dialect::modern::IdlSeed;
use solana_sdk::pubkey::Pubkey;

use crate::form::FormState;

pub mod provider;
pub mod seeds;

pub use provider::{AnchorPdaProvider, PdaAccount, PdaInstruction, PdaProvider};
pub use seeds::{build_seeds_with_info, derive, PdaArgument, PdaDerivationResult, SeedInfo, SeedInputs};

/// Providers in lookup order. The first one that handles a descriptor wins.
pub struct PdaProviderRegistry {
    providers: Vec<Box<dyn PdaProvider>>,
}

impl Default for PdaProviderRegistry {
    fn default() -> Self {
        Self {
            providers: vec![Box::new(AnchorPdaProvider)],
        }
    }
}

impl PdaProviderRegistry {
    pub fn empty() -> Self {
        Self { providers: vec![] }
    }

    pub fn register(&mut self, provider: Box<dyn PdaProvider>) {
        self.providers.push(provider);
    }

    pub fn find_provider(&self, idl: &Value) -> Option<&dyn PdaProvider> {
        self.providers
            .iter()
            .find(|p| p.can_handle(idl))
            .map(|p| p.as_ref())
    }

    /// Derives every PDA account of an instruction, keyed by camel-cased account name.
    ///
    /// Anything that cannot be found yields an empty map, never an error.
    pub fn compute_pdas(
        &self,
        idl: &Value,
        instruction_name: &str,
        form: &FormState,
    ) -> BTreeMap<String, PdaDerivationResult> {
        let mut results = BTreeMap::new();
        let provider = match self.find_provider(idl) {
            Some(provider) => provider,
            None => {
                log::trace!("no PDA provider for descriptor");
                return results;
            }
        };
        let (program_id, instruction) = match (
            provider.program_id(idl),
            provider.find_instruction(idl, instruction_name),
        ) {
            (Some(program_id), Some(instruction)) => (program_id, instruction),
            _ => return results,
        };
        let inputs = SeedInputs {
            args: form.instruction_arguments(instruction_name),
            accounts: form.instruction_accounts(instruction_name),
            arg_defs: &instruction.args,
        };
        for account in &instruction.accounts {
            if let Some(pda) = &account.pda {
                let owner = seed_program(pda.program.as_ref()).unwrap_or(program_id);
                results.insert(
                    account.name.to_mixed_case(),
                    derive(&owner, &pda.seeds, &inputs),
                );
            }
        }
        results
    }
}

/// A constant 32-byte `program` seed overrides the owning program, so
/// cross-program PDAs derive against that program instead of the instruction's.
pub(crate) fn seed_program(seed: Option<&IdlSeed>) -> Option<Pubkey> {
    match seed? {
        IdlSeed::Const { value } => Pubkey::try_from(value.as_slice()).ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    fn idl() -> Value {
        json!({
            "address": "Count3AcZucFDPSFBAeHkQ6AvttieKUkyJ8HiQGhQwe",
            "instructions": [{
                "name": "increment",
                "accounts": [
                    {"name": "counter", "writable": true, "pda": {"seeds": [
                        {"kind": "const", "value": [99]},
                        {"kind": "account", "path": "authority"}
                    ]}},
                    {"name": "authority", "signer": true}
                ],
                "args": []
            }]
        })
    }

    #[test]
    fn computes_keyed_by_account() {
        let authority = Pubkey::new_unique();
        let form: FormState = serde_json::from_value(json!({
            "accounts": {"increment": {"authority": authority.to_string()}}
        }))
        .unwrap();
        let registry = PdaProviderRegistry::default();
        let pdas = registry.compute_pdas(&idl(), "increment", &form);
        let program = Pubkey::from_str("Count3AcZucFDPSFBAeHkQ6AvttieKUkyJ8HiQGhQwe").unwrap();
        let expected = Pubkey::find_program_address(&[&[99u8], authority.as_ref()], &program).0;
        assert_eq!(pdas["counter"].generated, Some(expected.to_string()));
        assert_eq!(pdas.len(), 1);
    }

    #[test]
    fn unknown_inputs_give_empty_results() {
        let registry = PdaProviderRegistry::default();
        let form = FormState::default();
        assert!(registry.compute_pdas(&json!({}), "increment", &form).is_empty());
        assert!(registry.compute_pdas(&idl(), "decrement", &form).is_empty());
        assert!(PdaProviderRegistry::empty()
            .compute_pdas(&idl(), "increment", &form)
            .is_empty());
    }

    #[test]
    fn program_seed_overrides_owner() {
        let other = Pubkey::new_unique();
        let seed = IdlSeed::Const {
            value: other.to_bytes().to_vec(),
        };
        assert_eq!(seed_program(Some(&seed)), Some(other));
        assert_eq!(seed_program(None), None);
    }
}
