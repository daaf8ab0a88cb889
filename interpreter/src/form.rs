//! Instruction form values as a UI holds them.
//!
//! Values are kept in JSON objects so the field order the user sees is the
//! order arguments are passed in.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `accounts.<ix>.<account>` (or `accounts.<ix>.<group>.<account>`) and
/// `arguments.<ix>.<argument>` values.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct FormState {
    #[serde(default)]
    pub accounts: Map<String, Value>,
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldPath {
    Account {
        instruction: String,
        group: Option<String>,
        account: String,
    },
    Argument {
        instruction: String,
        argument: String,
    },
}

impl FieldPath {
    pub fn account(instruction: impl Into<String>, account: impl Into<String>) -> Self {
        FieldPath::Account {
            instruction: instruction.into(),
            group: None,
            account: account.into(),
        }
    }

    pub fn nested_account(
        instruction: impl Into<String>,
        group: impl Into<String>,
        account: impl Into<String>,
    ) -> Self {
        FieldPath::Account {
            instruction: instruction.into(),
            group: Some(group.into()),
            account: account.into(),
        }
    }

    pub fn argument(instruction: impl Into<String>, argument: impl Into<String>) -> Self {
        FieldPath::Argument {
            instruction: instruction.into(),
            argument: argument.into(),
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldPath::Account {
                instruction,
                group: Some(group),
                account,
            } => write!(f, "accounts.{instruction}.{group}.{account}"),
            FieldPath::Account {
                instruction,
                group: None,
                account,
            } => write!(f, "accounts.{instruction}.{account}"),
            FieldPath::Argument {
                instruction,
                argument,
            } => write!(f, "arguments.{instruction}.{argument}"),
        }
    }
}

/// Form values are strings, but JSON scalars are accepted too.
pub(crate) fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl FormState {
    pub fn instruction_accounts(&self, instruction: &str) -> Option<&Map<String, Value>> {
        self.accounts.get(instruction).and_then(Value::as_object)
    }

    pub fn instruction_arguments(&self, instruction: &str) -> Option<&Map<String, Value>> {
        self.arguments.get(instruction).and_then(Value::as_object)
    }

    pub fn get(&self, path: &FieldPath) -> Option<String> {
        let value = match path {
            FieldPath::Account {
                instruction,
                group,
                account,
            } => {
                let accounts = self.instruction_accounts(instruction)?;
                match group {
                    Some(group) => accounts.get(group)?.as_object()?.get(account)?,
                    None => accounts.get(account)?,
                }
            }
            FieldPath::Argument {
                instruction,
                argument,
            } => self.instruction_arguments(instruction)?.get(argument)?,
        };
        value_as_string(value)
    }

    pub fn set(&mut self, path: &FieldPath, value: impl Into<String>) {
        let value = Value::String(value.into());
        let (record, field) = match path {
            FieldPath::Account {
                instruction,
                group,
                account,
            } => {
                let accounts = object_entry(&mut self.accounts, instruction);
                let record = match group {
                    Some(group) => accounts.and_then(|accounts| object_entry(accounts, group)),
                    None => accounts,
                };
                (record, account)
            }
            FieldPath::Argument {
                instruction,
                argument,
            } => (object_entry(&mut self.arguments, instruction), argument),
        };
        if let Some(record) = record {
            record.insert(field.clone(), value);
        }
    }

    /// Account values keyed `<ix>.<account>` or `<ix>.<group>.<account>`.
    pub fn flatten_accounts(&self, instruction: &str) -> Map<String, Value> {
        let mut out = Map::new();
        if let Some(accounts) = self.instruction_accounts(instruction) {
            flatten_into(&mut out, instruction, accounts);
        }
        out
    }

    /// Argument values keyed `<ix>.<argument>`, in form order.
    pub fn flatten_arguments(&self, instruction: &str) -> Map<String, Value> {
        let mut out = Map::new();
        if let Some(arguments) = self.instruction_arguments(instruction) {
            flatten_into(&mut out, instruction, arguments);
        }
        out
    }
}

fn flatten_into(out: &mut Map<String, Value>, prefix: &str, record: &Map<String, Value>) {
    for (key, value) in record {
        let path = format!("{prefix}.{key}");
        match value {
            Value::Object(nested) => flatten_into(out, &path, nested),
            other => {
                out.insert(path, other.clone());
            }
        }
    }
}

/// The object under `key`, replacing a scalar if one is there.
fn object_entry<'a>(map: &'a mut Map<String, Value>, key: &str) -> Option<&'a mut Map<String, Value>> {
    let entry = map
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !entry.is_object() {
        *entry = Value::Object(Map::new());
    }
    entry.as_object_mut()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn paths_render_dotted() {
        assert_eq!(
            FieldPath::nested_account("deposit", "pool", "vault").to_string(),
            "accounts.deposit.pool.vault"
        );
        assert_eq!(
            FieldPath::argument("deposit", "amount").to_string(),
            "arguments.deposit.amount"
        );
    }

    #[test]
    fn set_then_get() {
        let mut form = FormState::default();
        let vault = FieldPath::nested_account("deposit", "pool", "vault");
        form.set(&vault, "abc");
        form.set(&FieldPath::argument("deposit", "amount"), "5");
        assert_eq!(form.get(&vault).as_deref(), Some("abc"));
        assert_eq!(
            form.flatten_accounts("deposit"),
            json!({"deposit.pool.vault": "abc"}).as_object().unwrap().clone()
        );
        assert_eq!(form.get(&FieldPath::account("deposit", "missing")), None);
    }

    #[test]
    fn set_replaces_scalar_records() {
        let mut form: FormState = serde_json::from_value(json!({
            "accounts": {"deposit": {"pool": "stale"}},
            "arguments": {"deposit": 3}
        }))
        .unwrap();
        let vault = FieldPath::nested_account("deposit", "pool", "vault");
        form.set(&vault, "abc");
        form.set(&FieldPath::argument("deposit", "amount"), "5");
        assert_eq!(form.get(&vault).as_deref(), Some("abc"));
        assert_eq!(
            form.get(&FieldPath::argument("deposit", "amount")).as_deref(),
            Some("5")
        );
    }

    #[test]
    fn flatten_keeps_form_order() {
        let form: FormState = serde_json::from_value(json!({
            "arguments": {"ix": {"zeta": "1", "alpha": 2}}
        }))
        .unwrap();
        let keys: Vec<_> = form.flatten_arguments("ix").keys().cloned().collect();
        assert_eq!(keys, vec!["ix.zeta", "ix.alpha"]);
    }
}
