use heck::SnakeCase;
use solana_program::hash::hash;

pub type Discriminator = [u8; 8];

const SIGHASH_GLOBAL_NAMESPACE: &str = "global";

fn sighash(preimage: &str) -> Discriminator {
    let mut discriminator = [0u8; 8];
    discriminator.copy_from_slice(&hash(preimage.as_bytes()).to_bytes()[..8]);
    discriminator
}

/// Calculates the discriminator for an account based on its name,
/// which would be found in an IDL.
pub fn account_discriminator(name: &str) -> Discriminator {
    sighash(&format!("account:{}", name))
}

/// Calculates the discriminator for an instruction based on its name,
/// which would be found in an IDL. Names are snake-cased first.
pub fn ix_discriminator(name: &str) -> Discriminator {
    sighash(&format!("{}:{}", SIGHASH_GLOBAL_NAMESPACE, name.to_snake_case()))
}

/// Calculates the discriminator for an event based on its name.
pub fn event_discriminator(name: &str) -> Discriminator {
    sighash(&format!("event:{}", name))
}
