//! Program handles: a normalized descriptor bound to a program address,
//! able to build instructions from coerced values.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use heck::MixedCase;
use serde_json::{Map, Value};
use solana_explorer_idl::dialect::modern::{
    IdlInstruction, IdlInstructionAccount, IdlInstructionAccountItem, IdlSeed,
};
use solana_explorer_idl::discriminator::ix_discriminator;
use solana_explorer_idl::Idl;
use solana_program::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;

use crate::config::ProgramContext;
use crate::error::{InterpreterError, Result};
use crate::pda::{derive, seed_program, PdaArgument, SeedInputs};
use crate::value::{serialize_typed_value, TypedValue};

/// What every interpreter hands back from `create_program`.
pub trait UnifiedProgram: fmt::Debug + Send + Sync {
    fn program_id(&self) -> Pubkey;

    fn idl(&self) -> &Idl;

    fn context(&self) -> &ProgramContext;

    /// Accounts are keyed by name, or `<group>.<name>` for nested accounts.
    fn build_instruction(
        &self,
        instruction_name: &str,
        accounts: &BTreeMap<String, Option<Pubkey>>,
        args: &[TypedValue],
    ) -> Result<Instruction>;
}

fn camel_case_path(path: &str) -> String {
    path.split('.')
        .map(|segment| segment.to_mixed_case())
        .collect::<Vec<_>>()
        .join(".")
}

fn camel_case_seed(seed: &mut IdlSeed) {
    match seed {
        IdlSeed::Arg { path } | IdlSeed::Account { path, .. } => *path = camel_case_path(path),
        IdlSeed::Const { .. } => {}
    }
}

fn camel_case_accounts(items: &mut [IdlInstructionAccountItem]) {
    for item in items {
        match item {
            IdlInstructionAccountItem::Composite(group) => {
                group.name = group.name.to_mixed_case();
                camel_case_accounts(&mut group.accounts);
            }
            IdlInstructionAccountItem::Single(account) => {
                account.name = account.name.to_mixed_case();
                if let Some(pda) = account.pda.as_mut() {
                    pda.seeds.iter_mut().for_each(camel_case_seed);
                    if let Some(program) = pda.program.as_mut() {
                        camel_case_seed(program);
                    }
                }
            }
        }
    }
}

/// Rewrites instruction, argument and account names (and seed paths) to
/// camelCase, the way form fields name them.
pub fn camel_case_idl(mut idl: Idl) -> Idl {
    for ix in idl.instructions.iter_mut() {
        if ix.discriminator.is_empty() {
            ix.discriminator = ix_discriminator(&ix.name).to_vec();
        }
        ix.name = ix.name.to_mixed_case();
        for arg in ix.args.iter_mut() {
            arg.name = arg.name.to_mixed_case();
        }
        camel_case_accounts(&mut ix.accounts);
    }
    idl
}

/// Accounts with their lookup keys, in declaration order.
fn keyed_accounts(instruction: &IdlInstruction) -> Vec<(String, &IdlInstructionAccount)> {
    fn walk<'a>(
        items: &'a [IdlInstructionAccountItem],
        prefix: Option<&str>,
        out: &mut Vec<(String, &'a IdlInstructionAccount)>,
    ) {
        for item in items {
            let key = match prefix {
                Some(prefix) => format!("{prefix}.{}", item.name()),
                None => item.name().to_string(),
            };
            match item {
                IdlInstructionAccountItem::Single(account) => out.push((key, account)),
                IdlInstructionAccountItem::Composite(group) => walk(&group.accounts, Some(&key), out),
            }
        }
    }
    let mut out = vec![];
    walk(&instruction.accounts, None, &mut out);
    out
}

/// An anchor program whose descriptor went through the serialization normalizer.
#[derive(Debug)]
pub struct AnchorProgram {
    program_id: Pubkey,
    idl: Idl,
    context: ProgramContext,
}

impl AnchorProgram {
    pub fn new(context: ProgramContext, program_id: Pubkey, idl: Idl) -> Self {
        Self {
            program_id,
            idl: camel_case_idl(idl),
            context,
        }
    }

    fn encode_args(&self, instruction: &IdlInstruction, args: &[TypedValue]) -> Result<Vec<u8>> {
        let mut data = instruction.discriminator.clone();
        for (index, def) in instruction.args.iter().enumerate() {
            let value = args.get(index).unwrap_or(&TypedValue::Null);
            serialize_typed_value(value, &def.ty, &mut data).map_err(|e| {
                InterpreterError::Serialization(format!("{}.{}: {e:#}", instruction.name, def.name))
            })?;
        }
        Ok(data)
    }

    fn derive_missing(
        &self,
        account: &IdlInstructionAccount,
        seed_args: &Map<String, Value>,
        seed_accounts: &Map<String, Value>,
        arg_defs: &[PdaArgument],
    ) -> Option<Pubkey> {
        let pda = account.pda.as_ref()?;
        let owner = seed_program(pda.program.as_ref()).unwrap_or(self.program_id);
        let inputs = SeedInputs {
            args: Some(seed_args),
            accounts: Some(seed_accounts),
            arg_defs,
        };
        let result = derive(&owner, &pda.seeds, &inputs);
        log::debug!("derived {} = {:?}", account.name, result.generated);
        result.generated.and_then(|generated| Pubkey::from_str(&generated).ok())
    }
}

impl UnifiedProgram for AnchorProgram {
    fn program_id(&self) -> Pubkey {
        self.program_id
    }

    fn idl(&self) -> &Idl {
        &self.idl
    }

    fn context(&self) -> &ProgramContext {
        &self.context
    }

    fn build_instruction(
        &self,
        instruction_name: &str,
        accounts: &BTreeMap<String, Option<Pubkey>>,
        args: &[TypedValue],
    ) -> Result<Instruction> {
        let instruction = self
            .idl
            .find_instruction(instruction_name)
            .ok_or_else(|| InterpreterError::InstructionNotFound(instruction_name.to_string()))?;
        let data = self.encode_args(instruction, args)?;

        let arg_defs: Vec<PdaArgument> = instruction
            .args
            .iter()
            .map(|arg| PdaArgument {
                name: arg.name.clone(),
                ty: arg.ty.as_primitive(),
            })
            .collect();
        let seed_args: Map<String, Value> = instruction
            .args
            .iter()
            .zip(args)
            .filter_map(|(def, value)| Some((def.name.clone(), Value::String(value.seed_input()?))))
            .collect();
        let mut seed_accounts: Map<String, Value> = accounts
            .iter()
            .filter_map(|(key, value)| Some((key.clone(), Value::String(value.as_ref()?.to_string()))))
            .collect();

        let mut metas = vec![];
        for (key, account) in keyed_accounts(instruction) {
            let pubkey = match accounts.get(&key) {
                Some(Some(pubkey)) => *pubkey,
                _ if account.optional => self.program_id,
                _ => {
                    let fixed = account.address.as_deref().and_then(|a| Pubkey::from_str(a).ok());
                    fixed
                        .or_else(|| self.derive_missing(account, &seed_args, &seed_accounts, &arg_defs))
                        .ok_or_else(|| InterpreterError::MissingAccount {
                            account: key.clone(),
                            instruction: instruction.name.clone(),
                        })?
                }
            };
            seed_accounts
                .entry(key)
                .or_insert_with(|| Value::String(pubkey.to_string()));
            // an omitted optional account is passed as the program id, read-only
            let omitted = account.optional && pubkey == self.program_id;
            let signer = account.signer && !omitted;
            metas.push(if account.writable && !omitted {
                AccountMeta::new(pubkey, signer)
            } else {
                AccountMeta::new_readonly(pubkey, signer)
            });
        }

        Ok(Instruction {
            program_id: self.program_id,
            accounts: metas,
            data,
        })
    }
}
