// Protocol Tests
// The three components wired together, driven end to end

use delphi::identity::{AccountId, QuestionId};
use delphi::ledger::Role;
use delphi::oracle::{OracleConfig, Outcome, ResolutionState};
use delphi::{Amount, ErrorKind, Event, Protocol, ProtocolConfig, Timestamp, TOKEN_UNIT};
use tracing_subscriber::EnvFilter;

const START: Timestamp = 1_700_000_000;
const FUNDING: Amount = 5_000 * TOKEN_UNIT;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn owner() -> AccountId {
    AccountId::from_label("owner")
}

fn minter() -> AccountId {
    AccountId::from_label("minter")
}

fn alice() -> AccountId {
    AccountId::from_label("alice")
}

fn bob() -> AccountId {
    AccountId::from_label("bob")
}

fn carol() -> AccountId {
    AccountId::from_label("carol")
}

fn question() -> QuestionId {
    QuestionId::from_text("Will the referendum pass?")
}

/// Protocol with a minter and three funded participants
fn funded_protocol() -> Protocol {
    init_tracing();
    let mut protocol = Protocol::new(ProtocolConfig::new(owner())).unwrap();
    protocol
        .add_member(&owner(), START, Role::Minter, minter())
        .unwrap();
    for account in [alice(), bob(), carol()] {
        protocol.mint(&minter(), START, account, FUNDING).unwrap();
    }
    protocol.poll_events();
    protocol
}

fn stake(protocol: &mut Protocol, account: AccountId, amount: Amount) {
    let custody = *protocol.arbiter().custody_account();
    protocol.approve(&account, START, custody, amount).unwrap();
    protocol.stake(&account, START, amount).unwrap();
}

// ============================================================================
// GENESIS
// ============================================================================

#[test]
fn test_genesis_wiring() {
    let protocol = Protocol::new(ProtocolConfig::new(owner())).unwrap();
    let config = ProtocolConfig::default();

    assert_eq!(protocol.ledger().get_member(Role::Owner).unwrap(), owner());
    assert_eq!(protocol.oracle().escrow_account(), &config.oracle_account);
    assert_eq!(protocol.oracle().arbiter(), &config.arbiter_account);
    assert_eq!(protocol.arbiter().custody_account(), &config.arbiter_account);
    assert_eq!(protocol.arbiter().oracle(), &config.oracle_account);
    assert_eq!(protocol.ledger().total_supply(), 0);
    assert!(protocol.conservation_holds());
}

#[test]
fn test_invalid_config_rejected() {
    let shared = AccountId::from_label("shared");
    let same_accounts = ProtocolConfig::new(owner())
        .with_oracle_account(shared)
        .with_arbiter_account(shared);
    let owner_is_component = ProtocolConfig::new(shared).with_oracle_account(shared);
    let no_voting = ProtocolConfig::new(owner()).with_voting_period_seconds(0);
    let no_window = ProtocolConfig::new(owner())
        .with_oracle(OracleConfig::default().with_dispute_window_seconds(0));

    for config in [same_accounts, owner_is_component, no_voting, no_window] {
        let err = Protocol::new(config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
    }
}

// ============================================================================
// UNDISPUTED LIFECYCLE
// ============================================================================

#[test]
fn test_undisputed_question_finalizes() {
    let mut protocol = funded_protocol();
    let bond = protocol.oracle().proposal_bond();
    let window = protocol.oracle().config().dispute_window_seconds;

    protocol
        .propose_outcome(&alice(), START, question(), Outcome::Yes, bond)
        .unwrap();
    assert!(protocol.conservation_holds());

    let err = protocol
        .finalize_outcome(&bob(), START + window, question())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);

    let outcome = protocol
        .finalize_outcome(&bob(), START + window + 1, question())
        .unwrap();

    assert_eq!(outcome, Outcome::Yes);
    assert_eq!(protocol.get_outcome(&question()).unwrap(), Outcome::Yes);
    assert_eq!(protocol.ledger().balance_of(&alice()), FUNDING);
    assert!(protocol.conservation_holds());

    let names: Vec<_> = protocol.poll_events().iter().map(Event::name).collect();
    assert_eq!(
        names,
        vec!["Transfer", "QuestionProposed", "Transfer", "QuestionResolved"]
    );
}

#[test]
fn test_get_outcome_unresolved_fails() {
    let protocol = funded_protocol();

    let err = protocol.get_outcome(&question()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotResolved);
}

// ============================================================================
// DISPUTED LIFECYCLE
// ============================================================================

#[test]
fn test_disputed_question_resolved_by_vote() {
    let mut protocol = funded_protocol();
    stake(&mut protocol, alice(), 1000 * TOKEN_UNIT);
    stake(&mut protocol, bob(), 1100 * TOKEN_UNIT);
    stake(&mut protocol, carol(), 300 * TOKEN_UNIT);
    protocol.poll_events();

    let proposal_bond = protocol.oracle().proposal_bond();
    let dispute_bond = protocol.oracle().dispute_bond();

    protocol
        .propose_outcome(&alice(), START, question(), Outcome::No, proposal_bond)
        .unwrap();
    let deadline = protocol
        .dispute_outcome(&bob(), START + 60, question(), dispute_bond)
        .unwrap();
    assert_eq!(protocol.oracle().state(&question()), ResolutionState::Disputed);
    assert!(protocol.conservation_holds());

    protocol
        .vote(&alice(), START + 120, question(), Outcome::Yes)
        .unwrap();
    protocol
        .vote(&bob(), START + 180, question(), Outcome::No)
        .unwrap();
    protocol
        .vote(&carol(), START + 240, question(), Outcome::Yes)
        .unwrap();

    let err = protocol
        .tally_and_resolve(&carol(), deadline, question())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);

    let winner = protocol
        .tally_and_resolve(&carol(), deadline + 1, question())
        .unwrap();

    assert_eq!(winner, Outcome::Yes);
    assert_eq!(protocol.get_outcome(&question()).unwrap(), Outcome::Yes);

    // NO was proposed, YES won: the disputer takes both bonds
    let staked_alice = 1000 * TOKEN_UNIT;
    let staked_bob = 1100 * TOKEN_UNIT;
    assert_eq!(
        protocol.ledger().balance_of(&alice()),
        FUNDING - staked_alice - proposal_bond
    );
    assert_eq!(
        protocol.ledger().balance_of(&bob()),
        FUNDING - staked_bob + proposal_bond
    );
    assert_eq!(protocol.oracle().escrowed_total(), 0);
    assert!(protocol.conservation_holds());

    let events = protocol.poll_events();
    assert!(events.contains(&Event::DisputeCreated {
        question_id: question(),
        deadline
    }));
    assert!(events.contains(&Event::DisputeResolved {
        question_id: question(),
        winning_outcome: Outcome::Yes
    }));
    assert_eq!(
        events.last(),
        Some(&Event::QuestionResolved {
            question_id: question(),
            final_outcome: Outcome::Yes
        })
    );
}

#[test]
fn test_direct_resolve_only_from_arbiter() {
    let mut protocol = funded_protocol();
    let proposal_bond = protocol.oracle().proposal_bond();
    let dispute_bond = protocol.oracle().dispute_bond();
    protocol
        .propose_outcome(&alice(), START, question(), Outcome::Yes, proposal_bond)
        .unwrap();
    protocol
        .dispute_outcome(&bob(), START + 1, question(), dispute_bond)
        .unwrap();

    let err = protocol
        .resolve(&alice(), START + 2, question(), Outcome::Yes)
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert_eq!(protocol.oracle().state(&question()), ResolutionState::Disputed);
}

#[test]
fn test_direct_create_dispute_only_from_oracle() {
    let mut protocol = funded_protocol();

    let err = protocol
        .create_dispute(&alice(), START, question())
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert!(protocol.arbiter().dispute(&question()).is_none());
}

#[test]
fn test_arbiter_handover_through_protocol() {
    let mut protocol = funded_protocol();
    let arbiter = *protocol.oracle().arbiter();
    let successor = AccountId::from_label("council");

    protocol
        .set_arbiter(&arbiter, START, successor)
        .unwrap();
    assert_eq!(protocol.oracle().arbiter(), &successor);

    let proposal_bond = protocol.oracle().proposal_bond();
    let dispute_bond = protocol.oracle().dispute_bond();
    protocol
        .propose_outcome(&alice(), START, question(), Outcome::Yes, proposal_bond)
        .unwrap();
    let deadline = protocol
        .dispute_outcome(&bob(), START + 1, question(), dispute_bond)
        .unwrap();

    // The DAO no longer holds the capability, so its verdict cannot land
    let err = protocol
        .tally_and_resolve(&carol(), deadline + 1, question())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);

    protocol
        .resolve(&successor, deadline + 1, question(), Outcome::Split)
        .unwrap();
    assert_eq!(protocol.get_outcome(&question()).unwrap(), Outcome::Split);
    assert_eq!(protocol.ledger().balance_of(&alice()), FUNDING);
    assert_eq!(protocol.ledger().balance_of(&bob()), FUNDING);
    assert!(protocol.conservation_holds());
}

// ============================================================================
// LEDGER THROUGH THE PROTOCOL
// ============================================================================

#[test]
fn test_snapshot_scenario() {
    let mut protocol = funded_protocol();
    let dave = AccountId::from_label("dave");
    let erin = AccountId::from_label("erin");

    protocol.mint(&minter(), START, dave, 1000).unwrap();
    protocol.transfer(&dave, START, erin, 100).unwrap();
    let id = protocol.snapshot(&erin, START).unwrap();
    protocol.transfer(&dave, START, erin, 100).unwrap();

    assert_eq!(id, 1);
    assert_eq!(protocol.ledger().balance_of_at(&dave, 1).unwrap(), 900);
    assert_eq!(protocol.ledger().balance_of_at(&erin, 1).unwrap(), 100);
    assert_eq!(protocol.ledger().balance_of(&dave), 800);
    assert_eq!(protocol.ledger().balance_of(&erin), 200);
}

#[test]
fn test_burner_and_transfer_from_through_protocol() {
    let mut protocol = funded_protocol();
    protocol
        .add_member(&owner(), START, Role::Burner, alice())
        .unwrap();
    protocol.burn(&alice(), START, 1000 * TOKEN_UNIT).unwrap();
    assert_eq!(protocol.ledger().total_supply(), 3 * FUNDING - 1000 * TOKEN_UNIT);

    protocol.approve(&bob(), START, carol(), 10).unwrap();
    protocol
        .transfer_from(&carol(), START, bob(), alice(), 10)
        .unwrap();
    assert_eq!(protocol.ledger().allowance(&bob(), &carol()), 0);

    protocol
        .remove_member(&owner(), START, Role::Burner, alice())
        .unwrap();
    let err = protocol.burn(&alice(), START, 1).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);

    protocol
        .reset_member(&owner(), START, Role::Owner, carol())
        .unwrap();
    assert_eq!(protocol.ledger().get_member(Role::Owner).unwrap(), carol());
    assert!(protocol.conservation_holds());
}

#[test]
fn test_unstake_through_protocol() {
    let mut protocol = funded_protocol();
    stake(&mut protocol, alice(), 100);

    protocol.unstake(&alice(), START, 40).unwrap();

    assert_eq!(protocol.arbiter().staked_balance(&alice()), 60);
    assert!(protocol.conservation_holds());

    let err = protocol.unstake(&alice(), START, 61).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientStake);
}
