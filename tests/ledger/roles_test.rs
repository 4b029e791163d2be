// Ledger Role Tests
// Owner-managed Minter/Burner membership and the exclusive Owner role

use delphi::call::Call;
use delphi::identity::AccountId;
use delphi::ledger::{Ledger, LedgerError, Role, RoleError, TokenMetadata};
use delphi::{ErrorKind, Event};

struct Harness {
    ledger: Ledger,
    events: Vec<Event>,
}

impl Harness {
    fn new(owner: AccountId) -> Self {
        Self {
            ledger: Ledger::new(owner, TokenMetadata::default()),
            events: Vec::new(),
        }
    }

    fn call<T>(&mut self, caller: AccountId, op: impl FnOnce(&mut Ledger, &mut Call<'_>) -> T) -> T {
        let mut call = Call::new(caller, 0, &mut self.events);
        op(&mut self.ledger, &mut call)
    }
}

fn accounts() -> (AccountId, AccountId, AccountId) {
    (
        AccountId::from_label("owner"),
        AccountId::from_label("alice"),
        AccountId::from_label("bob"),
    )
}

// ============================================================================
// INITIAL ROLES
// ============================================================================

#[test]
fn test_owner_holds_owner_role_only() {
    let (owner, _, _) = accounts();
    let harness = Harness::new(owner);

    assert!(harness.ledger.holds_role(Role::Owner, &owner));
    assert!(!harness.ledger.holds_role(Role::Minter, &owner));
    assert!(!harness.ledger.holds_role(Role::Burner, &owner));
    assert_eq!(harness.ledger.get_member(Role::Owner).unwrap(), owner);
}

#[test]
fn test_get_member_of_shared_role_fails() {
    let (owner, _, _) = accounts();
    let harness = Harness::new(owner);

    let err = harness.ledger.get_member(Role::Minter).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidRoleOperation);
}

// ============================================================================
// SHARED ROLE MEMBERSHIP
// ============================================================================

#[test]
fn test_owner_adds_and_removes_minter() {
    let (owner, alice, _) = accounts();
    let mut harness = Harness::new(owner);

    harness
        .call(owner, |ledger, call| ledger.add_member(call, Role::Minter, alice))
        .unwrap();
    assert!(harness.ledger.holds_role(Role::Minter, &alice));
    assert_eq!(harness.ledger.roles().members(Role::Minter), vec![alice]);

    harness
        .call(owner, |ledger, call| ledger.remove_member(call, Role::Minter, alice))
        .unwrap();
    assert!(!harness.ledger.holds_role(Role::Minter, &alice));

    assert_eq!(
        harness.events,
        vec![
            Event::RoleMemberAdded {
                role: Role::Minter,
                member: alice
            },
            Event::RoleMemberRemoved {
                role: Role::Minter,
                member: alice
            },
        ]
    );
}

#[test]
fn test_add_existing_member_is_silent() {
    let (owner, alice, _) = accounts();
    let mut harness = Harness::new(owner);

    harness
        .call(owner, |ledger, call| ledger.add_member(call, Role::Burner, alice))
        .unwrap();
    harness
        .call(owner, |ledger, call| ledger.add_member(call, Role::Burner, alice))
        .unwrap();

    assert_eq!(harness.events.len(), 1);
    assert_eq!(harness.ledger.roles().members(Role::Burner).len(), 1);
}

#[test]
fn test_non_owner_cannot_add_member() {
    let (owner, alice, bob) = accounts();
    let mut harness = Harness::new(owner);

    let result = harness.call(alice, |ledger, call| ledger.add_member(call, Role::Minter, bob));

    assert_eq!(
        result,
        Err(LedgerError::Role(RoleError::MissingRole { role: Role::Owner }))
    );
    assert!(harness.events.is_empty());
}

#[test]
fn test_add_member_to_owner_role_fails() {
    let (owner, alice, _) = accounts();
    let mut harness = Harness::new(owner);

    let err = harness
        .call(owner, |ledger, call| ledger.add_member(call, Role::Owner, alice))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidRoleOperation);
}

#[test]
fn test_remove_member_from_owner_role_fails() {
    let (owner, _, _) = accounts();
    let mut harness = Harness::new(owner);

    let err = harness
        .call(owner, |ledger, call| ledger.remove_member(call, Role::Owner, owner))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidRoleOperation);
    assert!(harness.ledger.holds_role(Role::Owner, &owner));
}

// ============================================================================
// EXCLUSIVE ROLE TRANSFER
// ============================================================================

#[test]
fn test_reset_owner_hands_over_control() {
    let (owner, alice, bob) = accounts();
    let mut harness = Harness::new(owner);

    harness
        .call(owner, |ledger, call| ledger.reset_member(call, Role::Owner, alice))
        .unwrap();

    assert_eq!(harness.ledger.get_member(Role::Owner).unwrap(), alice);
    assert!(!harness.ledger.holds_role(Role::Owner, &owner));
    assert_eq!(
        harness.events.last(),
        Some(&Event::RoleReset {
            role: Role::Owner,
            previous: owner,
            member: alice
        })
    );

    // The former owner has lost the capability
    let err = harness
        .call(owner, |ledger, call| ledger.add_member(call, Role::Minter, bob))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);

    harness
        .call(alice, |ledger, call| ledger.add_member(call, Role::Minter, bob))
        .unwrap();
    assert!(harness.ledger.holds_role(Role::Minter, &bob));
}

#[test]
fn test_reset_shared_role_fails() {
    let (owner, alice, _) = accounts();
    let mut harness = Harness::new(owner);

    let err = harness
        .call(owner, |ledger, call| ledger.reset_member(call, Role::Minter, alice))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidRoleOperation);
}

#[test]
fn test_minter_cannot_manage_roles() {
    let (owner, alice, bob) = accounts();
    let mut harness = Harness::new(owner);

    harness
        .call(owner, |ledger, call| ledger.add_member(call, Role::Minter, alice))
        .unwrap();
    let err = harness
        .call(alice, |ledger, call| ledger.add_member(call, Role::Minter, bob))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Unauthorized);
}
