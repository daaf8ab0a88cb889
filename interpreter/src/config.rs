use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signer::Signer;

pub const DEFAULT_CLUSTER: &str = "https://api.mainnet-beta.solana.com";

pub fn normalize_to_url_if_moniker<T: AsRef<str>>(url_or_moniker: T) -> String {
    match url_or_moniker.as_ref() {
        "m" | "mainnet-beta" => "https://api.mainnet-beta.solana.com",
        "t" | "testnet" => "https://api.testnet.solana.com",
        "d" | "devnet" => "https://api.devnet.solana.com",
        "l" | "localhost" => "http://localhost:8899",
        url => url,
    }
    .to_string()
}

/// Settings shared by the interpreters and the prefill providers.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExplorerConfig {
    /// RPC URL or one of the cluster monikers.
    pub cluster: String,
    /// Reject fixed-size array arguments whose element count differs from the declared length.
    pub enforce_fixed_array_len: bool,
    /// Extra `address -> name patterns` entries for the known-accounts prefill.
    pub known_accounts: BTreeMap<String, Vec<String>>,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            cluster: DEFAULT_CLUSTER.to_string(),
            enforce_fixed_array_len: false,
            known_accounts: BTreeMap::new(),
        }
    }
}

impl ExplorerConfig {
    pub fn from_file(p: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = p.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("could not read config file {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("could not deserialize config file {}", path.display()))
    }

    pub fn rpc_url(&self) -> String {
        normalize_to_url_if_moniker(&self.cluster)
    }
}

pub type SharedSigner = Arc<dyn Signer + Send + Sync>;

/// The network target and signer a program handle is bound to.
#[derive(Clone)]
pub struct ProgramContext {
    pub rpc_url: String,
    pub wallet: Option<SharedSigner>,
}

impl ProgramContext {
    pub fn new(url_or_moniker: impl AsRef<str>) -> Self {
        Self {
            rpc_url: normalize_to_url_if_moniker(url_or_moniker),
            wallet: None,
        }
    }

    pub fn with_wallet(mut self, wallet: SharedSigner) -> Self {
        self.wallet = Some(wallet);
        self
    }

    pub fn wallet_pubkey(&self) -> Option<Pubkey> {
        self.wallet.as_ref().map(|w| w.pubkey())
    }
}

impl From<&ExplorerConfig> for ProgramContext {
    fn from(config: &ExplorerConfig) -> Self {
        ProgramContext::new(&config.cluster)
    }
}

impl fmt::Debug for ProgramContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgramContext")
            .field("rpc_url", &self.rpc_url)
            .field("wallet", &self.wallet_pubkey())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::signature::Keypair;
    use test_case::test_case;

    #[test_case("m", "https://api.mainnet-beta.solana.com")]
    #[test_case("mainnet-beta", "https://api.mainnet-beta.solana.com")]
    #[test_case("t", "https://api.testnet.solana.com")]
    #[test_case("devnet", "https://api.devnet.solana.com")]
    #[test_case("l", "http://localhost:8899")]
    #[test_case("https://rpc.example.com", "https://rpc.example.com")]
    fn monikers_expand(input: &str, expected: &str) {
        assert_eq!(normalize_to_url_if_moniker(input), expected);
    }

    #[test]
    fn config_defaults_fill_missing_fields() {
        let config: ExplorerConfig = serde_json::from_str(r#"{"cluster": "d"}"#).unwrap();
        assert_eq!(config.rpc_url(), "https://api.devnet.solana.com");
        assert!(!config.enforce_fixed_array_len);
        assert!(config.known_accounts.is_empty());
    }

    #[test]
    fn context_reports_wallet() {
        let keypair = Arc::new(Keypair::new());
        let ctx = ProgramContext::new("l").with_wallet(keypair.clone());
        assert_eq!(ctx.rpc_url, "http://localhost:8899");
        assert_eq!(ctx.wallet_pubkey(), Some(keypair.pubkey()));
    }
}
