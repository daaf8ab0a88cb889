//! Automatic filling of instruction form fields.
//!
//! Each [PrefillDependency] watches one external value (the wallet, the
//! selected instruction ...) and proposes field values when it changes.
//! [FormPrefill] tracks those values between runs and applies the fills;
//! hosts call [FormPrefill::apply] whenever the form or a dependency changes.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use solana_explorer_idl::format::{
    InstructionAccountData, InstructionAccountItem, InstructionData, NestedInstructionAccountsData,
};
use solana_sdk::pubkey::Pubkey;

use crate::config::ExplorerConfig;
use crate::form::{FieldPath, FormState};
use crate::pda::PdaProviderRegistry;

pub mod arguments;
pub mod known_accounts;
pub mod names;
pub mod pda;
pub mod wallet;

pub use arguments::{default_argument_value, ArgumentDefaultsPrefill};
pub use known_accounts::KnownAccountsPrefill;
pub use names::{generate_name_variations, KnownAccounts, KNOWN_ACCOUNTS};
pub use pda::PdaPrefill;
pub use wallet::WalletPrefill;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFill {
    pub path: FieldPath,
    pub value: String,
}

pub trait PrefillDependency {
    fn id(&self) -> &str;

    /// The watched value. A change triggers [PrefillDependency::fill].
    fn current_value(&self) -> Option<String>;

    /// Also fill on every run, not only when the watched value changes.
    fn watches_form_values(&self) -> bool {
        false
    }

    fn fill(&self, form: &FormState) -> Vec<FieldFill>;
}

#[derive(Debug, Default)]
pub struct FormPrefill {
    previous: HashMap<String, Option<String>>,
}

impl FormPrefill {
    /// Runs the dependencies in order and writes their fills into `form`.
    pub fn apply(
        &mut self,
        dependencies: &[Box<dyn PrefillDependency>],
        form: &mut FormState,
    ) -> Vec<FieldFill> {
        let mut applied = vec![];
        for dependency in dependencies {
            let value = dependency.current_value();
            let changed = self.previous.get(dependency.id()) != Some(&value);
            if changed {
                self.previous.insert(dependency.id().to_string(), value);
            }
            if !changed && !dependency.watches_form_values() {
                continue;
            }
            for fill in dependency.fill(form) {
                log::trace!("{} fills {} = {}", dependency.id(), fill.path, fill.value);
                form.set(&fill.path, fill.value.clone());
                applied.push(fill);
            }
        }
        applied
    }
}

/// Visits every account, descending one level into nested groups.
pub fn traverse_instruction_accounts<'a>(
    instruction: &'a InstructionData,
    mut callback: impl FnMut(&'a InstructionAccountData, Option<&'a NestedInstructionAccountsData>),
) {
    for item in &instruction.accounts {
        match item {
            InstructionAccountItem::Group(group) => {
                for account in &group.accounts {
                    callback(account, Some(group));
                }
            }
            InstructionAccountItem::Single(account) => callback(account, None),
        }
    }
}

pub(crate) fn account_path(
    instruction: &InstructionData,
    account: &InstructionAccountData,
    group: Option<&NestedInstructionAccountsData>,
) -> FieldPath {
    match group {
        Some(group) => FieldPath::nested_account(&instruction.name, &group.name, &account.name),
        None => FieldPath::account(&instruction.name, &account.name),
    }
}

/// Known accounts, wallet, argument defaults and PDAs, in that order.
pub fn default_dependencies(
    idl: Option<&Value>,
    instruction: &InstructionData,
    wallet: Option<Pubkey>,
    config: &ExplorerConfig,
) -> Vec<Box<dyn PrefillDependency>> {
    let known = KnownAccounts::with_extra(&config.known_accounts);
    vec![
        Box::new(KnownAccountsPrefill::new(instruction, &known)),
        Box::new(WalletPrefill::new(instruction, wallet, &known)),
        Box::new(ArgumentDefaultsPrefill::new(instruction)),
        Box::new(PdaPrefill::new(
            idl.cloned(),
            instruction,
            Arc::new(PdaProviderRegistry::default()),
        )),
    ]
}
