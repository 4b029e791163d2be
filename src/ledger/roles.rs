// Role sets - one exclusive Owner plus shared Minter/Burner memberships

use crate::identity::AccountId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// Roles recognised by the ledger
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    Owner,
    Minter,
    Burner,
}

/// Whether a role has exactly one holder or a set of holders
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoleKind {
    Exclusive,
    Shared,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Owner, Role::Minter, Role::Burner];

    pub fn kind(&self) -> RoleKind {
        match self {
            Role::Owner => RoleKind::Exclusive,
            Role::Minter | Role::Burner => RoleKind::Shared,
        }
    }

    pub fn index(&self) -> u8 {
        match self {
            Role::Owner => 0,
            Role::Minter => 1,
            Role::Burner => 2,
        }
    }

    pub fn from_index(index: u8) -> Option<Role> {
        Role::ALL.get(index as usize).copied()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Owner => "Owner",
            Role::Minter => "Minter",
            Role::Burner => "Burner",
        };
        f.write_str(name)
    }
}

/// Errors from role checks and role management
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoleError {
    #[error("Caller does not hold the {role} role")]
    MissingRole { role: Role },

    #[error("{operation} is not valid for the {role} role")]
    InvalidRoleOperation { role: Role, operation: &'static str },
}

/// Current holders of every role
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSet {
    owner: AccountId,
    minters: BTreeSet<AccountId>,
    burners: BTreeSet<AccountId>,
}

impl RoleSet {
    /// Create a role set with `owner` as the sole Owner and no shared members
    pub fn new(owner: AccountId) -> Self {
        Self {
            owner,
            minters: BTreeSet::new(),
            burners: BTreeSet::new(),
        }
    }

    /// Check whether `account` currently holds `role`
    pub fn holds(&self, role: Role, account: &AccountId) -> bool {
        match role {
            Role::Owner => &self.owner == account,
            Role::Minter => self.minters.contains(account),
            Role::Burner => self.burners.contains(account),
        }
    }

    /// Fail unless `account` holds `role`
    pub fn require(&self, role: Role, account: &AccountId) -> Result<(), RoleError> {
        if self.holds(role, account) {
            Ok(())
        } else {
            Err(RoleError::MissingRole { role })
        }
    }

    /// The sole holder of an exclusive role
    pub fn exclusive_holder(&self, role: Role) -> Result<AccountId, RoleError> {
        match role {
            Role::Owner => Ok(self.owner),
            Role::Minter | Role::Burner => Err(RoleError::InvalidRoleOperation {
                role,
                operation: "getMember",
            }),
        }
    }

    /// All holders of a role, in ascending identity order
    pub fn members(&self, role: Role) -> Vec<AccountId> {
        match role {
            Role::Owner => vec![self.owner],
            Role::Minter => self.minters.iter().copied().collect(),
            Role::Burner => self.burners.iter().copied().collect(),
        }
    }

    fn shared_mut(&mut self, role: Role, operation: &'static str) -> Result<&mut BTreeSet<AccountId>, RoleError> {
        match role {
            Role::Minter => Ok(&mut self.minters),
            Role::Burner => Ok(&mut self.burners),
            Role::Owner => Err(RoleError::InvalidRoleOperation { role, operation }),
        }
    }

    /// Add a member to a shared role. Returns false if already a member.
    pub fn add_member(&mut self, role: Role, account: AccountId) -> Result<bool, RoleError> {
        Ok(self.shared_mut(role, "addMember")?.insert(account))
    }

    /// Remove a member from a shared role. Returns false if not a member.
    pub fn remove_member(&mut self, role: Role, account: &AccountId) -> Result<bool, RoleError> {
        Ok(self.shared_mut(role, "removeMember")?.remove(account))
    }

    /// Replace the holder of an exclusive role, returning the previous holder
    pub fn reset_member(&mut self, role: Role, account: AccountId) -> Result<AccountId, RoleError> {
        match role {
            Role::Owner => Ok(std::mem::replace(&mut self.owner, account)),
            Role::Minter | Role::Burner => Err(RoleError::InvalidRoleOperation {
                role,
                operation: "resetMember",
            }),
        }
    }
}
