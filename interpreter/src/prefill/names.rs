//! Well-known accounts and the naming conventions used to recognize them.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use solana_sdk::pubkey;
use solana_sdk::pubkey::Pubkey;

pub const SYSTEM_PROGRAM: Pubkey = pubkey!("11111111111111111111111111111111");
pub const TOKEN_PROGRAM: Pubkey = pubkey!("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");
pub const ASSOCIATED_TOKEN_PROGRAM: Pubkey = pubkey!("ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL");
pub const NATIVE_MINT: Pubkey = pubkey!("So11111111111111111111111111111111111111112");

/// camelCase, snake_case, space separated and concatenated forms of `words`,
/// followed by `extra`.
pub fn generate_name_variations(words: &[&str], extra: &[&str]) -> Vec<String> {
    let lower: Vec<String> = words.iter().map(|w| w.to_lowercase()).collect();
    let camel = lower
        .iter()
        .enumerate()
        .map(|(i, w)| {
            if i == 0 {
                return w.clone();
            }
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<String>();
    let mut variations = vec![camel, lower.join("_"), lower.join(" "), lower.join("")];
    variations.extend(extra.iter().map(|k| k.to_string()));
    variations
}

fn matches_pattern(name: &str, patterns: &[String]) -> bool {
    let normalized = name.trim().to_lowercase();
    patterns.iter().any(|p| p.to_lowercase() == normalized)
}

/// Addresses paired with the account names that should resolve to them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownAccounts {
    entries: Vec<(String, Vec<String>)>,
}

impl KnownAccounts {
    pub fn builtin() -> Self {
        let associated = [
            generate_name_variations(&["associated", "token", "program"], &["associated"]),
            generate_name_variations(&["ata", "program"], &["ata"]),
        ]
        .concat();
        Self {
            entries: vec![
                (
                    NATIVE_MINT.to_string(),
                    generate_name_variations(&["wsol", "mint"], &["mint"]),
                ),
                (
                    SYSTEM_PROGRAM.to_string(),
                    generate_name_variations(&["system", "program"], &["system"]),
                ),
                (ASSOCIATED_TOKEN_PROGRAM.to_string(), associated),
                (
                    TOKEN_PROGRAM.to_string(),
                    generate_name_variations(&["token", "program"], &["token"]),
                ),
            ],
        }
    }

    /// Built-in entries followed by configured ones.
    pub fn with_extra(extra: &BTreeMap<String, Vec<String>>) -> Self {
        let mut known = Self::builtin();
        known
            .entries
            .extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        known
    }

    pub fn find_address(&self, account_name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, patterns)| matches_pattern(account_name, patterns))
            .map(|(address, _)| address.as_str())
    }

    pub fn is_known(&self, account_name: &str) -> bool {
        self.find_address(account_name).is_some()
    }
}

impl Default for KnownAccounts {
    fn default() -> Self {
        Self::builtin()
    }
}

lazy_static! {
    pub static ref KNOWN_ACCOUNTS: KnownAccounts = KnownAccounts::builtin();
    pub static ref WALLET_ACCOUNT_PATTERNS: Vec<String> =
        generate_name_variations(&["authority"], &[]);
}

pub fn is_wallet_account(account_name: &str) -> bool {
    matches_pattern(account_name, &WALLET_ACCOUNT_PATTERNS)
}
