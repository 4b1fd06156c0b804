//! Console roles and role sets.
//!
//! Roles form a small closed set. Membership checks compare the raw role
//! string carried in a token against this set exactly: there is no hierarchy
//! and no case folding, so `"admin"` is never a member of `{ADMIN}` and a
//! `SUPER_ADMIN` is not implicitly an `ADMIN`.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

/// A console role identifier as issued in the `role` claim.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    AsRefStr,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Travel agents booking on behalf of guests.
    Agent,
    /// Site administrators managing rates, inventory and bookings.
    Admin,
    /// Platform operators managing every site.
    SuperAdmin,
}

impl Role {
    /// Returns the claim identifier of this role.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// An ordered set of roles required by a protected section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet(BTreeSet<Role>);

impl RoleSet {
    /// Creates an empty role set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a role set containing a single role.
    #[must_use]
    pub fn only(role: Role) -> Self {
        Self(BTreeSet::from([role]))
    }

    /// Returns `true` if the set contains the given role.
    #[must_use]
    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    /// Returns `true` if the raw claim value names a role in this set.
    ///
    /// The comparison is exact: the claim must spell a role identifier
    /// byte-for-byte. Unknown identifiers are never members.
    #[must_use]
    pub fn contains_role(&self, claim: &str) -> bool {
        Role::from_str(claim).is_ok_and(|role| self.contains(role))
    }

    /// Returns `true` if no role is allowed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of roles in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates over the roles in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[Role; N]> for RoleSet {
    fn from(roles: [Role; N]) -> Self {
        roles.into_iter().collect()
    }
}

impl fmt::Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (index, role) in self.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            f.write_str(role.as_str())?;
        }
        f.write_str("}")
    }
}
