use solana_explorer_idl::format::InstructionData;
use solana_sdk::pubkey::Pubkey;

use crate::form::{FieldPath, FormState};
use crate::prefill::names::{is_wallet_account, KnownAccounts};
use crate::prefill::{account_path, traverse_instruction_accounts, FieldFill, PrefillDependency};

/// Fills accounts the connected wallet most likely owns: signers,
/// `authority`-like names and writable accounts that are not PDAs.
pub struct WalletPrefill {
    wallet: Option<Pubkey>,
    paths: Vec<FieldPath>,
}

impl WalletPrefill {
    pub fn new(instruction: &InstructionData, wallet: Option<Pubkey>, known: &KnownAccounts) -> Self {
        let mut paths = vec![];
        traverse_instruction_accounts(instruction, |account, group| {
            if known.is_known(&account.name) {
                return;
            }
            if account.signer || is_wallet_account(&account.name) || (account.writable && !account.pda) {
                paths.push(account_path(instruction, account, group));
            }
        });
        Self { wallet, paths }
    }
}

impl PrefillDependency for WalletPrefill {
    fn id(&self) -> &str {
        "wallet"
    }

    fn current_value(&self) -> Option<String> {
        self.wallet.map(|w| w.to_string())
    }

    fn fill(&self, _: &FormState) -> Vec<FieldFill> {
        let wallet = match self.wallet {
            Some(wallet) => wallet.to_string(),
            None => return vec![],
        };
        self.paths
            .iter()
            .map(|path| FieldFill {
                path: path.clone(),
                value: wallet.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_explorer_idl::format::{InstructionAccountData, InstructionAccountItem};

    fn instruction() -> InstructionData {
        let accounts = vec![
            InstructionAccountData {
                name: "payer".into(),
                signer: true,
                writable: true,
                ..Default::default()
            },
            InstructionAccountData {
                name: "authority".into(),
                ..Default::default()
            },
            InstructionAccountData {
                name: "receipt".into(),
                writable: true,
                ..Default::default()
            },
            InstructionAccountData {
                name: "counter".into(),
                writable: true,
                pda: true,
                ..Default::default()
            },
            InstructionAccountData {
                name: "systemProgram".into(),
                signer: true,
                ..Default::default()
            },
            InstructionAccountData {
                name: "mintInfo".into(),
                ..Default::default()
            },
        ];
        InstructionData {
            docs: vec![],
            name: "open".into(),
            accounts: accounts.into_iter().map(InstructionAccountItem::Single).collect(),
            args: vec![],
        }
    }

    #[test]
    fn selects_wallet_owned_accounts() {
        let wallet = Pubkey::new_unique();
        let prefill = WalletPrefill::new(&instruction(), Some(wallet), &KnownAccounts::builtin());
        let filled: Vec<_> = prefill
            .fill(&FormState::default())
            .into_iter()
            .map(|f| {
                assert_eq!(f.value, wallet.to_string());
                f.path.to_string()
            })
            .collect();
        assert_eq!(
            filled,
            vec!["accounts.open.payer", "accounts.open.authority", "accounts.open.receipt"]
        );
    }

    #[test]
    fn no_wallet_no_fills() {
        let prefill = WalletPrefill::new(&instruction(), None, &KnownAccounts::builtin());
        assert_eq!(prefill.current_value(), None);
        assert!(prefill.fill(&FormState::default()).is_empty());
    }
}
