/*
 * Responsibility
 * - 権限レベル (Role) の定義
 * - 全順序: User(0) < Merchant(1) < Admin(2)。上位は下位の権限をすべて含む
 * - token claim / route rule の両方で ordinal (u8) として serde される
 */
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum Role {
    User = 0,
    Merchant = 1,
    Admin = 2,
}

impl Role {
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Role satisfies a route that requires `required`.
    pub fn satisfies(self, required: Role) -> bool {
        self >= required
    }

    pub fn is_admin(self) -> bool {
        self >= Role::Admin
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown role ordinal: {0}")]
pub struct UnknownRole(pub u8);

impl TryFrom<u8> for Role {
    type Error = UnknownRole;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Role::User),
            1 => Ok(Role::Merchant),
            2 => Ok(Role::Admin),
            other => Err(UnknownRole(other)),
        }
    }
}

impl From<Role> for u8 {
    fn from(role: Role) -> Self {
        role.ordinal()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::User => "user",
            Role::Merchant => "merchant",
            Role::Admin => "admin",
        };
        f.write_str(name)
    }
}
