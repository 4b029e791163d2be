// Ledger State - role-gated balances with lazily reconstructed snapshots

use crate::call::Call;
use crate::error::ErrorKind;
use crate::event::Event;
use crate::identity::AccountId;
use crate::ledger::checkpoint::Checkpoints;
use crate::ledger::roles::{Role, RoleError, RoleSet};
use crate::types::{Amount, SnapshotId, DECIMALS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur during ledger operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error(transparent)]
    Role(#[from] RoleError),

    #[error("Insufficient balance: available {available}, required {required}")]
    InsufficientBalance { available: Amount, required: Amount },

    #[error("Insufficient allowance: approved {approved}, required {required}")]
    InsufficientAllowance { approved: Amount, required: Amount },

    #[error("Invalid snapshot {requested}: current snapshot is {current}")]
    InvalidSnapshot { requested: SnapshotId, current: SnapshotId },

    #[error("Balance or supply would overflow")]
    Overflow,
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::Role(RoleError::MissingRole { .. }) => ErrorKind::Unauthorized,
            LedgerError::Role(RoleError::InvalidRoleOperation { .. }) => ErrorKind::InvalidRoleOperation,
            LedgerError::InsufficientBalance { .. } => ErrorKind::InsufficientBalance,
            LedgerError::InsufficientAllowance { .. } => ErrorKind::InsufficientAllowance,
            LedgerError::InvalidSnapshot { .. } => ErrorKind::InvalidSnapshot,
            LedgerError::Overflow => ErrorKind::Overflow,
        }
    }
}

/// Descriptive token metadata
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl Default for TokenMetadata {
    fn default() -> Self {
        Self {
            name: "Delphi Voting Token v1".to_string(),
            symbol: "DELPHI".to_string(),
            decimals: DECIMALS,
        }
    }
}

/// Summary of the ledger, for operators and tests
#[derive(Clone, Debug)]
pub struct LedgerStatistics {
    pub holders: usize,
    pub total_supply: Amount,
    pub snapshot_id: SnapshotId,
    pub checkpoint_entries: usize,
}

/// The token ledger
///
/// Balances are checkpointed on every change. A snapshot only bumps a
/// counter; historical values are rebuilt from the checkpoint sequences.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    metadata: TokenMetadata,
    roles: RoleSet,
    balances: BTreeMap<AccountId, Amount>,
    /// (owner, spender) -> remaining allowance
    allowances: BTreeMap<(AccountId, AccountId), Amount>,
    total_supply: Amount,
    snapshot_counter: SnapshotId,
    balance_history: BTreeMap<AccountId, Checkpoints>,
    supply_history: Checkpoints,
}

impl Ledger {
    /// Create an empty ledger with `owner` holding the Owner role
    pub fn new(owner: AccountId, metadata: TokenMetadata) -> Self {
        Self {
            metadata,
            roles: RoleSet::new(owner),
            balances: BTreeMap::new(),
            allowances: BTreeMap::new(),
            total_supply: 0,
            snapshot_counter: 0,
            balance_history: BTreeMap::new(),
            supply_history: Checkpoints::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn symbol(&self) -> &str {
        &self.metadata.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.metadata.decimals
    }

    // ========================================================================
    // ROLES
    // ========================================================================

    pub fn roles(&self) -> &RoleSet {
        &self.roles
    }

    pub fn holds_role(&self, role: Role, account: &AccountId) -> bool {
        self.roles.holds(role, account)
    }

    /// Holder of an exclusive role; shared roles fail `InvalidRoleOperation`
    pub fn get_member(&self, role: Role) -> Result<AccountId, LedgerError> {
        Ok(self.roles.exclusive_holder(role)?)
    }

    /// Add `member` to a shared role (Owner only)
    pub fn add_member(&mut self, call: &mut Call<'_>, role: Role, member: AccountId) -> Result<(), LedgerError> {
        self.roles.require(Role::Owner, &call.caller())?;
        if self.roles.add_member(role, member)? {
            call.emit(Event::RoleMemberAdded { role, member });
        }
        Ok(())
    }

    /// Remove `member` from a shared role (Owner only)
    pub fn remove_member(&mut self, call: &mut Call<'_>, role: Role, member: AccountId) -> Result<(), LedgerError> {
        self.roles.require(Role::Owner, &call.caller())?;
        if self.roles.remove_member(role, &member)? {
            call.emit(Event::RoleMemberRemoved { role, member });
        }
        Ok(())
    }

    /// Hand an exclusive role to `member` (Owner only)
    pub fn reset_member(&mut self, call: &mut Call<'_>, role: Role, member: AccountId) -> Result<(), LedgerError> {
        self.roles.require(Role::Owner, &call.caller())?;
        let previous = self.roles.reset_member(role, member)?;
        call.emit(Event::RoleReset { role, previous, member });
        Ok(())
    }

    // ========================================================================
    // BALANCE QUERIES
    // ========================================================================

    pub fn balance_of(&self, account: &AccountId) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    pub fn allowance(&self, owner: &AccountId, spender: &AccountId) -> Amount {
        self.allowances.get(&(*owner, *spender)).copied().unwrap_or(0)
    }

    /// Accounts with a non-zero balance, with their balances
    pub fn holders(&self) -> impl Iterator<Item = (&AccountId, &Amount)> {
        self.balances.iter()
    }

    /// Sum of every live balance
    pub fn sum_of_balances(&self) -> Option<Amount> {
        self.balances
            .values()
            .try_fold(0u128, |acc, v| acc.checked_add(*v))
    }

    // ========================================================================
    // SUPPLY CHANGES
    // ========================================================================

    /// Create `amount` new tokens for `to` (Minter only)
    pub fn mint(&mut self, call: &mut Call<'_>, to: AccountId, amount: Amount) -> Result<(), LedgerError> {
        self.roles.require(Role::Minter, &call.caller())?;

        let new_balance = self
            .balance_of(&to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        let new_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;

        self.set_balance(to, new_balance);
        self.set_total_supply(new_supply);

        call.emit(Event::Transfer {
            from: None,
            to: Some(to),
            amount,
        });
        Ok(())
    }

    /// Destroy `amount` of the caller's own tokens (Burner only)
    pub fn burn(&mut self, call: &mut Call<'_>, amount: Amount) -> Result<(), LedgerError> {
        let burner = call.caller();
        self.roles.require(Role::Burner, &burner)?;

        let available = self.balance_of(&burner);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                available,
                required: amount,
            });
        }

        self.set_balance(burner, available - amount);
        self.set_total_supply(self.total_supply - amount);

        call.emit(Event::Transfer {
            from: Some(burner),
            to: None,
            amount,
        });
        Ok(())
    }

    // ========================================================================
    // TRANSFERS
    // ========================================================================

    /// Move `amount` from the caller to `to`
    pub fn transfer(&mut self, call: &mut Call<'_>, to: AccountId, amount: Amount) -> Result<(), LedgerError> {
        let from = call.caller();
        self.move_balance(from, to, amount)?;
        call.emit(Event::Transfer {
            from: Some(from),
            to: Some(to),
            amount,
        });
        Ok(())
    }

    /// Set the caller's allowance for `spender`, replacing any previous value
    pub fn approve(&mut self, call: &mut Call<'_>, spender: AccountId, amount: Amount) -> Result<(), LedgerError> {
        let owner = call.caller();
        if amount == 0 {
            self.allowances.remove(&(owner, spender));
        } else {
            self.allowances.insert((owner, spender), amount);
        }
        call.emit(Event::Approval { owner, spender, amount });
        Ok(())
    }

    /// Move `amount` from `from` to `to`, spending the caller's allowance
    pub fn transfer_from(
        &mut self,
        call: &mut Call<'_>,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let spender = call.caller();
        let approved = self.allowance(&from, &spender);
        if approved < amount {
            return Err(LedgerError::InsufficientAllowance {
                approved,
                required: amount,
            });
        }

        self.move_balance(from, to, amount)?;

        let remaining = approved - amount;
        if remaining == 0 {
            self.allowances.remove(&(from, spender));
        } else {
            self.allowances.insert((from, spender), remaining);
        }

        call.emit(Event::Transfer {
            from: Some(from),
            to: Some(to),
            amount,
        });
        Ok(())
    }

    /// Validate then apply a balance move; nothing changes on error
    fn move_balance(&mut self, from: AccountId, to: AccountId, amount: Amount) -> Result<(), LedgerError> {
        let available = self.balance_of(&from);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                available,
                required: amount,
            });
        }
        if from == to {
            return Ok(());
        }

        let credited = self
            .balance_of(&to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;

        self.set_balance(from, available - amount);
        self.set_balance(to, credited);
        Ok(())
    }

    // ========================================================================
    // SNAPSHOTS
    // ========================================================================

    /// Take a snapshot, returning its id (the first snapshot is 1)
    pub fn snapshot(&mut self, call: &mut Call<'_>) -> SnapshotId {
        self.snapshot_counter += 1;
        call.emit(Event::Snapshot {
            id: self.snapshot_counter,
        });
        self.snapshot_counter
    }

    pub fn current_snapshot_id(&self) -> SnapshotId {
        self.snapshot_counter
    }

    /// Balance of `account` at the moment snapshot `snapshot_id` was taken
    pub fn balance_of_at(&self, account: &AccountId, snapshot_id: SnapshotId) -> Result<Amount, LedgerError> {
        self.check_snapshot(snapshot_id)?;
        Ok(self
            .balance_history
            .get(account)
            .map(|history| history.value_at(snapshot_id))
            .unwrap_or(0))
    }

    /// Total supply at the moment snapshot `snapshot_id` was taken
    pub fn total_supply_at(&self, snapshot_id: SnapshotId) -> Result<Amount, LedgerError> {
        self.check_snapshot(snapshot_id)?;
        Ok(self.supply_history.value_at(snapshot_id))
    }

    fn check_snapshot(&self, snapshot_id: SnapshotId) -> Result<(), LedgerError> {
        if snapshot_id == 0 || snapshot_id > self.snapshot_counter {
            return Err(LedgerError::InvalidSnapshot {
                requested: snapshot_id,
                current: self.snapshot_counter,
            });
        }
        Ok(())
    }

    /// Snapshot id under which a change made now becomes visible
    fn pending_snapshot_id(&self) -> SnapshotId {
        self.snapshot_counter + 1
    }

    fn set_balance(&mut self, account: AccountId, value: Amount) {
        if value == 0 {
            self.balances.remove(&account);
        } else {
            self.balances.insert(account, value);
        }
        let pending = self.pending_snapshot_id();
        self.balance_history
            .entry(account)
            .or_default()
            .record(pending, value);
    }

    fn set_total_supply(&mut self, value: Amount) {
        self.total_supply = value;
        let pending = self.pending_snapshot_id();
        self.supply_history.record(pending, value);
    }

    /// Get statistics about the ledger
    pub fn statistics(&self) -> LedgerStatistics {
        LedgerStatistics {
            holders: self.balances.len(),
            total_supply: self.total_supply,
            snapshot_id: self.snapshot_counter,
            checkpoint_entries: self.balance_history.values().map(Checkpoints::len).sum::<usize>()
                + self.supply_history.len(),
        }
    }
}
