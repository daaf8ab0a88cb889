use std::sync::Arc;

use heck::MixedCase;
use serde_json::Value;
use solana_explorer_idl::format::InstructionData;

use crate::form::{FieldPath, FormState};
use crate::pda::PdaProviderRegistry;
use crate::prefill::{account_path, traverse_instruction_accounts, FieldFill, PrefillDependency};

/// Fills PDA accounts with the address derived from the current form values.
pub struct PdaPrefill {
    idl: Option<Value>,
    instruction: String,
    registry: Arc<PdaProviderRegistry>,
    paths: Vec<(String, FieldPath)>,
}

impl PdaPrefill {
    pub fn new(
        idl: Option<Value>,
        instruction: &InstructionData,
        registry: Arc<PdaProviderRegistry>,
    ) -> Self {
        let mut paths = vec![];
        traverse_instruction_accounts(instruction, |account, group| {
            if account.pda {
                paths.push((
                    account.name.to_mixed_case(),
                    account_path(instruction, account, group),
                ));
            }
        });
        Self {
            idl,
            instruction: instruction.name.clone(),
            registry,
            paths,
        }
    }
}

impl PrefillDependency for PdaPrefill {
    fn id(&self) -> &str {
        "pda-prefill"
    }

    fn current_value(&self) -> Option<String> {
        Some(self.instruction.clone())
    }

    fn watches_form_values(&self) -> bool {
        true
    }

    fn fill(&self, form: &FormState) -> Vec<FieldFill> {
        let idl = match &self.idl {
            Some(idl) => idl,
            None => return vec![],
        };
        let pdas = self.registry.compute_pdas(idl, &self.instruction, form);
        self.paths
            .iter()
            .filter_map(|(name, path)| {
                let generated = pdas.get(name)?.generated.as_ref()?;
                if form.get(path).as_ref() == Some(generated) {
                    return None;
                }
                Some(FieldFill {
                    path: path.clone(),
                    value: generated.clone(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use solana_explorer_idl::format_idl;
    use solana_sdk::pubkey::Pubkey;
    use std::str::FromStr;

    fn idl() -> Value {
        json!({
            "address": "Count3AcZucFDPSFBAeHkQ6AvttieKUkyJ8HiQGhQwe",
            "metadata": {"name": "counter", "version": "0.1.0", "spec": "0.1.0"},
            "instructions": [{
                "name": "create_counter",
                "discriminator": [0, 0, 0, 0, 0, 0, 0, 0],
                "accounts": [
                    {"name": "counter", "writable": true, "pda": {"seeds": [
                        {"kind": "const", "value": [1, 2]},
                        {"kind": "arg", "path": "seed_id"}
                    ]}}
                ],
                "args": [{"name": "seed_id", "type": "u32"}]
            }]
        })
    }

    #[test]
    fn fills_generated_address_once() {
        let idl = idl();
        let (formatted, _) = format_idl(&idl, None).unwrap();
        let instruction = &formatted.instructions[0];
        assert_eq!(instruction.name, "createCounter");
        let prefill = PdaPrefill::new(Some(idl), instruction, Arc::new(PdaProviderRegistry::default()));

        let mut form = FormState::default();
        assert!(prefill.fill(&form).is_empty());

        form.set(&FieldPath::argument("createCounter", "seedId"), "7");
        let fills = prefill.fill(&form);
        let program = Pubkey::from_str("Count3AcZucFDPSFBAeHkQ6AvttieKUkyJ8HiQGhQwe").unwrap();
        let expected = Pubkey::find_program_address(&[&[1u8, 2], &7u32.to_le_bytes()], &program).0;
        assert_eq!(fills.len(), 1);
        assert_eq!(fills[0].value, expected.to_string());

        form.set(&fills[0].path, fills[0].value.clone());
        assert!(prefill.fill(&form).is_empty());
    }
}
