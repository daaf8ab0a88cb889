use solana_explorer_idl::format::InstructionData;

use crate::form::{FieldPath, FormState};
use crate::prefill::names::KnownAccounts;
use crate::prefill::{account_path, traverse_instruction_accounts, FieldFill, PrefillDependency};

/// Fills program and mint accounts whose names identify a well-known address.
///
/// Runs when the instruction changes and never overwrites user input.
pub struct KnownAccountsPrefill {
    instruction: String,
    paths: Vec<(String, FieldPath)>,
}

impl KnownAccountsPrefill {
    pub fn new(instruction: &InstructionData, known: &KnownAccounts) -> Self {
        let mut paths = vec![];
        traverse_instruction_accounts(instruction, |account, group| {
            if let Some(address) = known.find_address(&account.name) {
                paths.push((address.to_string(), account_path(instruction, account, group)));
            }
        });
        Self {
            instruction: instruction.name.clone(),
            paths,
        }
    }
}

impl PrefillDependency for KnownAccountsPrefill {
    fn id(&self) -> &str {
        "known-accounts"
    }

    fn current_value(&self) -> Option<String> {
        Some(self.instruction.clone())
    }

    fn fill(&self, form: &FormState) -> Vec<FieldFill> {
        self.paths
            .iter()
            .filter(|(_, path)| form.get(path).map_or(true, |v| v.trim().is_empty()))
            .map(|(address, path)| FieldFill {
                path: path.clone(),
                value: address.clone(),
            })
            .collect()
    }
}
