//! Discovery of the wallet keys that must sign a transaction.
//!
//! Candidates are collected from every place a transaction can name a key,
//! in this order: inputs, certificates, native scripts, required signers,
//! collateral. The candidates are then filtered down to the wallet's own
//! key hashes. Order is preserved and duplicates are kept.

use std::collections::HashSet;

use tracing::{debug, trace};

use crate::address::Credential;
use crate::keys::KeyHash;
use crate::script::{MAX_SCRIPT_DEPTH, NativeScript};
use crate::transaction::{Certificate, MirTarget, TransactionInput, TransactionView, Utxo};
use crate::Error;

/// Compute the subset of `own_key_hashes` that must sign `tx`.
///
/// Inputs and collateral are resolved against `own_utxos`; an input with no
/// matching UTXO belongs to someone else and contributes nothing. Script
/// credentials never contribute. Every child of every native script is
/// visited regardless of thresholds.
///
/// The result is a subsequence of the candidates in source order. A key
/// referenced from several places appears once per reference.
///
/// # Errors
///
/// [`Error::ScriptTooDeep`] if a native script nests deeper than
/// [`MAX_SCRIPT_DEPTH`].
pub fn discover_signers<T: TransactionView + ?Sized>(
    tx: &T,
    own_key_hashes: &[KeyHash],
    own_utxos: &[Utxo],
) -> Result<Vec<KeyHash>, Error> {
    let mut candidates = Vec::new();

    collect_inputs(tx.inputs(), own_utxos, &mut candidates);
    trace!(count = candidates.len(), "collected input signers");

    let mark = candidates.len();
    for certificate in tx.certificates() {
        collect_certificate(certificate, &mut candidates);
    }
    trace!(count = candidates.len() - mark, "collected certificate signers");

    let mark = candidates.len();
    for script in tx.native_scripts() {
        collect_script(script, &mut candidates)?;
    }
    trace!(count = candidates.len() - mark, "collected native script signers");

    candidates.extend_from_slice(tx.required_signers());
    trace!(count = tx.required_signers().len(), "collected required signers");

    let mark = candidates.len();
    collect_inputs(tx.collateral(), own_utxos, &mut candidates);
    trace!(count = candidates.len() - mark, "collected collateral signers");

    let own: HashSet<&KeyHash> = own_key_hashes.iter().collect();
    let signers: Vec<KeyHash> = candidates
        .iter()
        .filter(|hash| own.contains(hash))
        .copied()
        .collect();

    debug!(
        candidates = candidates.len(),
        signers = signers.len(),
        "discovered transaction signers"
    );
    Ok(signers)
}

fn collect_inputs(inputs: &[TransactionInput], own_utxos: &[Utxo], out: &mut Vec<KeyHash>) {
    for input in inputs {
        let Some(utxo) = own_utxos.iter().find(|utxo| utxo.input == *input) else {
            continue;
        };
        if let Some(Credential::Key(hash)) = utxo.address.payment_credential() {
            out.push(*hash);
        }
    }
}

fn collect_certificate(certificate: &Certificate, out: &mut Vec<KeyHash>) {
    match certificate {
        Certificate::StakeRegistration(stake)
        | Certificate::StakeDeregistration(stake)
        | Certificate::StakeDelegation { stake, .. } => {
            if let Credential::Key(hash) = stake {
                out.push(*hash);
            }
        }
        Certificate::PoolRegistration(params) => out.extend_from_slice(&params.pool_owners),
        Certificate::MoveInstantaneousRewards(mir) => {
            if let MirTarget::StakeCredentials(rewards) = &mir.target {
                out.extend(rewards.keys().filter_map(Credential::key_hash));
            }
        }
        Certificate::PoolRetirement { .. } | Certificate::GenesisKeyDelegation { .. } => {}
    }
}

/// Pre-order walk over every node, children in declaration order.
fn collect_script(root: &NativeScript, out: &mut Vec<KeyHash>) -> Result<(), Error> {
    let mut stack = vec![(root, 0usize)];
    while let Some((script, depth)) = stack.pop() {
        if depth >= MAX_SCRIPT_DEPTH {
            return Err(Error::ScriptTooDeep { depth });
        }
        if let NativeScript::ScriptPubkey(hash) = script {
            out.push(*hash);
        }
        stack.extend(script.children().iter().rev().map(|child| (child, depth + 1)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::address::Address;
    use crate::keys::ScriptHash;
    use crate::transaction::{
        MirPot, MoveInstantaneousReward, PoolParams, Transaction, TransactionBody, TransactionHash,
    };
    use crate::Network;

    const PAYMENT: KeyHash = KeyHash::from_bytes(hex_literal::hex!(
        "b283ab772b9ea72e18524afcc991b440640bfb03bcfa5df9fa29ca57"
    ));
    const STAKE: KeyHash = KeyHash::from_bytes(hex_literal::hex!(
        "d64e578bb6ce3ea0725e815e10fab40ba5839be2371be03552136e46"
    ));
    const FOREIGN: KeyHash = KeyHash::from_bytes([0x11; 28]);
    const OWN: [KeyHash; 2] = [PAYMENT, STAKE];

    fn input(byte: u8, index: u32) -> TransactionInput {
        TransactionInput::new(TransactionHash::from_bytes([byte; 32]), index)
    }

    fn own_utxos() -> Vec<Utxo> {
        vec![Utxo {
            input: input(0xaa, 0),
            address: Address::Base {
                network: Network::Mainnet,
                payment: Credential::Key(PAYMENT),
                stake: Credential::Key(STAKE),
            },
        }]
    }

    fn discover(tx: &Transaction) -> Vec<KeyHash> {
        discover_signers(tx, &OWN, &own_utxos()).unwrap()
    }

    fn with_certificates(certificates: Vec<Certificate>) -> Transaction {
        Transaction::new(TransactionBody {
            certificates: Some(certificates),
            ..TransactionBody::default()
        })
    }

    #[test]
    fn test_owned_input_yields_payment_hash() {
        let tx = Transaction::new(TransactionBody {
            inputs: vec![input(0xaa, 0)],
            ..TransactionBody::default()
        });
        assert_eq!(discover(&tx), vec![PAYMENT]);
    }

    #[test]
    fn test_unmatched_input_contributes_nothing() {
        let tx = Transaction::new(TransactionBody {
            inputs: vec![input(0xaa, 1), input(0xbb, 0)],
            ..TransactionBody::default()
        });
        assert!(discover(&tx).is_empty());
    }

    #[test]
    fn test_script_address_input_contributes_nothing() {
        let utxos = vec![Utxo {
            input: input(0xcc, 0),
            address: Address::Enterprise {
                network: Network::Mainnet,
                payment: Credential::Script(ScriptHash::from_bytes(*PAYMENT.as_bytes())),
            },
        }];
        let tx = Transaction::new(TransactionBody {
            inputs: vec![input(0xcc, 0)],
            ..TransactionBody::default()
        });
        assert!(discover_signers(&tx, &OWN, &utxos).unwrap().is_empty());
    }

    #[test]
    fn test_stake_certificates() {
        let tx = with_certificates(vec![
            Certificate::StakeRegistration(Credential::Key(STAKE)),
            Certificate::StakeDelegation {
                stake: Credential::Key(STAKE),
                pool: FOREIGN,
            },
            Certificate::StakeDeregistration(Credential::Key(STAKE)),
        ]);
        assert_eq!(discover(&tx), vec![STAKE, STAKE, STAKE]);
    }

    #[test]
    fn test_script_stake_deregistration_contributes_nothing() {
        let tx = with_certificates(vec![Certificate::StakeDeregistration(Credential::Script(
            ScriptHash::from_bytes(*STAKE.as_bytes()),
        ))]);
        assert!(discover(&tx).is_empty());
    }

    #[test]
    fn test_pool_registration_owners() {
        let params = PoolParams {
            operator: FOREIGN,
            vrf_keyhash: [0u8; 32],
            pledge: 1_000_000,
            cost: 340_000_000,
            margin: (1, 100),
            reward_account: Address::Reward {
                network: Network::Mainnet,
                stake: Credential::Key(STAKE),
            },
            pool_owners: vec![FOREIGN, STAKE, PAYMENT],
        };
        let tx = with_certificates(vec![
            Certificate::PoolRegistration(Box::new(params)),
            Certificate::PoolRetirement {
                pool: PAYMENT,
                epoch: 300,
            },
        ]);
        assert_eq!(discover(&tx), vec![STAKE, PAYMENT]);
    }

    #[test]
    fn test_mir_key_credentials_only() {
        let rewards = BTreeMap::from([
            (Credential::Script(ScriptHash::from_bytes(*PAYMENT.as_bytes())), 5),
            (Credential::Key(STAKE), 10),
            (Credential::Key(PAYMENT), -3),
        ]);
        let tx = with_certificates(vec![
            Certificate::MoveInstantaneousRewards(MoveInstantaneousReward {
                pot: MirPot::Reserves,
                target: MirTarget::StakeCredentials(rewards),
            }),
            Certificate::MoveInstantaneousRewards(MoveInstantaneousReward {
                pot: MirPot::Treasury,
                target: MirTarget::OtherPot(1),
            }),
        ]);
        // credential order: PAYMENT (b2..) sorts before STAKE (d6..)
        assert_eq!(discover(&tx), vec![PAYMENT, STAKE]);
    }

    #[test]
    fn test_all_script_keeps_leaf_order() {
        let tx = Transaction::default().with_native_scripts(vec![NativeScript::ScriptAll(vec![
            NativeScript::ScriptPubkey(STAKE),
            NativeScript::ScriptPubkey(PAYMENT),
        ])]);
        assert_eq!(discover(&tx), vec![STAKE, PAYMENT]);
    }

    #[test]
    fn test_scripts_visit_every_child() {
        let tx = Transaction::default().with_native_scripts(vec![
            NativeScript::ScriptNOfK {
                n: 1,
                scripts: vec![
                    NativeScript::ScriptPubkey(PAYMENT),
                    NativeScript::ScriptAny(vec![
                        NativeScript::TimelockExpiry(100),
                        NativeScript::ScriptPubkey(FOREIGN),
                        NativeScript::ScriptPubkey(STAKE),
                    ]),
                ],
            },
            NativeScript::TimelockStart(5),
            NativeScript::ScriptPubkey(PAYMENT),
        ]);
        assert_eq!(discover(&tx), vec![PAYMENT, STAKE, PAYMENT]);
    }

    #[test]
    fn test_deep_script_fails_closed() {
        let mut script = NativeScript::ScriptPubkey(PAYMENT);
        for _ in 0..MAX_SCRIPT_DEPTH {
            script = NativeScript::ScriptAll(vec![script]);
        }
        let tx = Transaction::default().with_native_scripts(vec![script]);
        assert!(matches!(
            discover_signers(&tx, &OWN, &[]),
            Err(Error::ScriptTooDeep { depth }) if depth == MAX_SCRIPT_DEPTH
        ));
    }

    #[test]
    fn test_depth_bound_allows_limit() {
        let mut script = NativeScript::ScriptPubkey(PAYMENT);
        for _ in 0..MAX_SCRIPT_DEPTH - 1 {
            script = NativeScript::ScriptAny(vec![script]);
        }
        let tx = Transaction::default().with_native_scripts(vec![script]);
        assert_eq!(discover(&tx), vec![PAYMENT]);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let tx = Transaction::new(TransactionBody {
            inputs: vec![input(0xaa, 0)],
            required_signers: Some(vec![PAYMENT]),
            collateral: Some(vec![input(0xaa, 0)]),
            ..TransactionBody::default()
        });
        assert_eq!(discover(&tx), vec![PAYMENT, PAYMENT, PAYMENT]);
    }

    #[test]
    fn test_source_order() {
        let tx = Transaction::new(TransactionBody {
            inputs: vec![input(0xaa, 0)],
            certificates: Some(vec![Certificate::StakeRegistration(Credential::Key(STAKE))]),
            required_signers: Some(vec![FOREIGN, STAKE]),
            collateral: Some(vec![input(0xaa, 0)]),
        })
        .with_native_scripts(vec![NativeScript::ScriptPubkey(PAYMENT)]);
        assert_eq!(discover(&tx), vec![PAYMENT, STAKE, PAYMENT, STAKE, PAYMENT]);
    }

    #[test]
    fn test_result_is_subset_of_own() {
        let tx = Transaction::new(TransactionBody {
            inputs: vec![input(0xaa, 0)],
            required_signers: Some(vec![FOREIGN, STAKE, FOREIGN]),
            ..TransactionBody::default()
        })
        .with_native_scripts(vec![NativeScript::ScriptPubkey(FOREIGN)]);

        let signers = discover(&tx);
        assert!(signers.iter().all(|hash| OWN.contains(hash)));

        // Nothing owned: nothing signs, even for an owned UTXO's input.
        assert!(discover_signers(&tx, &[], &own_utxos()).unwrap().is_empty());
    }

    #[test]
    fn test_first_matching_utxo_wins() {
        let mut utxos = own_utxos();
        utxos.push(Utxo {
            input: input(0xaa, 0),
            address: Address::Enterprise {
                network: Network::Mainnet,
                payment: Credential::Key(STAKE),
            },
        });
        let tx = Transaction::new(TransactionBody {
            inputs: vec![input(0xaa, 0)],
            ..TransactionBody::default()
        });
        assert_eq!(discover_signers(&tx, &OWN, &utxos).unwrap(), vec![PAYMENT]);
    }
}
