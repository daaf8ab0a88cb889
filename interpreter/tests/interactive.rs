use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use serde_json::{json, Value};
use solana_explorer_idl::discriminator::ix_discriminator;
use solana_explorer_idl::{format_idl, read_descriptor};
use solana_explorer_interpreter::prefill::{default_dependencies, FormPrefill};
use solana_explorer_interpreter::{
    populate_accounts, populate_arguments, ExplorerConfig, FieldPath, FormState, IdlExecutor,
    InterpreterError, PdaProviderRegistry, ProgramContext,
};
use solana_program::instruction::AccountMeta;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};

fn fixture(name: &str) -> Value {
    read_descriptor(format!("tests/fixtures/{name}")).unwrap()
}

fn borsh_string(s: &str) -> Vec<u8> {
    let mut out = (s.len() as u32).to_le_bytes().to_vec();
    out.extend_from_slice(s.as_bytes());
    out
}

#[test]
fn prefilled_form_builds_instruction() {
    let idl = fixture("escrow.json");
    let wallet = Arc::new(Keypair::new());
    let config = ExplorerConfig::default();

    let (formatted, _) = format_idl(&idl, None).unwrap();
    let instruction = &formatted.instructions[0];
    assert_eq!(instruction.name, "makeOffer");

    let mut form = FormState::default();
    let dependencies = default_dependencies(Some(&idl), instruction, Some(wallet.pubkey()), &config);
    let fills = FormPrefill::default().apply(&dependencies, &mut form);
    assert!(!fills.is_empty());

    let program_id = Pubkey::from_str("Count3AcZucFDPSFBAeHkQ6AvttieKUkyJ8HiQGhQwe").unwrap();
    let offer = Pubkey::find_program_address(
        &[b"offer", wallet.pubkey().as_ref(), &1u64.to_le_bytes()],
        &program_id,
    )
    .0;
    let value = |path: FieldPath| form.get(&path).unwrap();
    assert_eq!(value(FieldPath::account("makeOffer", "maker")), wallet.pubkey().to_string());
    assert_eq!(value(FieldPath::account("makeOffer", "offer")), offer.to_string());
    assert_eq!(
        value(FieldPath::account("makeOffer", "systemProgram")),
        "11111111111111111111111111111111"
    );
    assert_eq!(value(FieldPath::argument("makeOffer", "offerId")), "1");
    assert_eq!(value(FieldPath::argument("makeOffer", "memo")), "default");

    let executor = IdlExecutor::new(&config);
    let context = ProgramContext::from(&config).with_wallet(wallet.clone());
    let program = executor
        .initialize_program(&idl, &program_id.to_string(), context, None)
        .unwrap();
    let accounts = populate_accounts(&form.flatten_accounts("makeOffer"), "makeOffer").unwrap();
    let args = populate_arguments(&form.flatten_arguments("makeOffer"), "makeOffer").unwrap();
    let ix = executor
        .get_instruction(program.as_ref(), "makeOffer", &accounts, &args, &idl, None)
        .unwrap();

    let mut data = ix_discriminator("make_offer").to_vec();
    data.extend_from_slice(&1u64.to_le_bytes());
    data.push(1);
    data.extend(borsh_string("default"));
    data.extend_from_slice(&1u32.to_le_bytes());
    data.extend_from_slice(&1u32.to_le_bytes());
    assert_eq!(ix.data, data);
    assert_eq!(
        ix.accounts,
        vec![
            AccountMeta::new(wallet.pubkey(), true),
            AccountMeta::new(offer, false),
            AccountMeta::new_readonly(
                Pubkey::from_str("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA").unwrap(),
                false
            ),
            AccountMeta::new_readonly(Pubkey::default(), false),
        ]
    );
}

#[test]
fn pda_tracks_form_edits() {
    let idl = fixture("escrow.json");
    let registry = PdaProviderRegistry::default();
    let maker = Pubkey::new_unique();
    let mut form: FormState = serde_json::from_value(json!({
        "accounts": {"makeOffer": {"maker": maker.to_string()}},
        "arguments": {"makeOffer": {"offerId": "9"}}
    }))
    .unwrap();

    let first = registry.compute_pdas(&idl, "makeOffer", &form);
    assert_eq!(first["offer"].seeds.len(), 3);
    assert_eq!(first["offer"].seeds[1].name, "maker");
    assert_eq!(first, registry.compute_pdas(&idl, "makeOffer", &form));

    form.set(&FieldPath::argument("makeOffer", "offerId"), "");
    let partial = registry.compute_pdas(&idl, "makeOffer", &form);
    assert_eq!(partial["offer"].generated, None);
    assert_eq!(partial["offer"].seeds[2].name, "offerId");
    assert_eq!(partial["offer"].seeds[2].value, None);
}

#[test]
fn legacy_descriptor_runs_through_named_interpreter() {
    let idl = fixture("legacy_voting.json");
    let executor = IdlExecutor::default();
    let wallet = Arc::new(Keypair::new());
    let context = ProgramContext::new("l").with_wallet(wallet.clone());
    let address = "Vote111111111111111111111111111111111111111";

    assert!(matches!(
        executor.initialize_program(&idl, address, context.clone(), None),
        Err(InterpreterError::NoInterpreterFound)
    ));
    let program = executor
        .initialize_program(&idl, address, context, Some("anchor"))
        .unwrap();

    let accounts = BTreeMap::from([
        ("signer".to_string(), wallet.pubkey().to_string()),
        (
            "systemProgram".to_string(),
            "11111111111111111111111111111111".to_string(),
        ),
    ]);
    let args = vec![json!("7"), json!("hello"), json!("[1,2]"), json!("[]")];
    let ix = executor
        .get_instruction(program.as_ref(), "initializePoll", &accounts, &args, &idl, Some("anchor"))
        .unwrap();

    let mut data = ix_discriminator("initialize_poll").to_vec();
    data.extend_from_slice(&7u64.to_le_bytes());
    data.extend(borsh_string("hello"));
    data.push(1);
    data.extend_from_slice(&1u64.to_le_bytes());
    data.extend_from_slice(&2u64.to_le_bytes());
    data.extend_from_slice(&0u32.to_le_bytes());
    assert_eq!(ix.data, data);

    let program_id = Pubkey::from_str(address).unwrap();
    let poll = Pubkey::find_program_address(&[b"poll", &7u64.to_le_bytes()], &program_id).0;
    assert_eq!(ix.accounts[1], AccountMeta::new(poll, false));
}

#[test]
fn nested_accounts_and_defined_arguments() {
    let idl = fixture("legacy_voting.json");
    let executor = IdlExecutor::default();
    let context = ProgramContext::new("l").with_wallet(Arc::new(Keypair::new()));
    let address = "Vote111111111111111111111111111111111111111";
    let program = executor
        .initialize_program(&idl, address, context, Some("anchor"))
        .unwrap();

    let voter = Pubkey::new_unique();
    let candidate = Pubkey::new_unique();
    let poll = Pubkey::new_unique();
    let accounts = BTreeMap::from([
        ("voter".to_string(), voter.to_string()),
        ("ballot.candidate".to_string(), candidate.to_string()),
        ("ballot.pollAccount".to_string(), poll.to_string()),
    ]);
    let ix = executor
        .get_instruction(program.as_ref(), "vote", &accounts, &[json!([2, 9])], &idl, Some("anchor"))
        .unwrap();
    assert_eq!(ix.data[8..].to_vec(), vec![2u8, 9]);
    assert_eq!(
        ix.accounts,
        vec![
            AccountMeta::new_readonly(voter, true),
            AccountMeta::new(candidate, false),
            AccountMeta::new(poll, false),
        ]
    );

    let grouped = BTreeMap::from([("ballot".to_string(), poll.to_string())]);
    let err = executor
        .get_instruction(program.as_ref(), "vote", &grouped, &[], &idl, Some("anchor"))
        .unwrap_err();
    assert!(matches!(err, InterpreterError::AccountNotFound { .. }));
}

#[test]
fn codama_descriptors_are_not_interactive() {
    let idl = json!({"kind": "rootNode", "standard": "codama", "version": "1.2.11"});
    let context = ProgramContext::new("d").with_wallet(Arc::new(Keypair::new()));
    let err = IdlExecutor::default()
        .initialize_program(&idl, "11111111111111111111111111111111", context, None)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Codama IDL format is not yet supported for interactive features."
    );
}
