// SPDX-License-Identifier: MIT OR Apache-2.0

//! The fixed role hierarchy and its precedence table.
//!
//! Every role carries two numbers. The _precedence_ ranks the role itself,
//! lower values being more senior. The _permission_ bounds which precedence
//! values a holder of the role may affect in others: an actor may grant,
//! confirm or revoke a role exactly when their permission number is less than
//! or equal to the target role's precedence number.
//!
//! The numbers live in a constant table next to the enum rather than on the
//! variants themselves; the hierarchy changes by redeploying this table, never
//! at runtime.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The six role titles a user can hold within an event or track.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RoleTitle {
    GeneralChair,
    PcChair,
    PcMember,
    SubReviewer,
    Author,
    Attendee,
}

/// Seniority table: (role, precedence, permission).
///
/// Permission is never smaller than precedence: a role reaches at most as high
/// as its own rank. Equal precedence values are legal and make the titles
/// interchangeable for authorization purposes (author and attendee below).
const ROLE_TABLE: [(RoleTitle, u8, u8); 6] = [
    (RoleTitle::GeneralChair, 0, 0),
    (RoleTitle::PcChair, 1, 1),
    (RoleTitle::PcMember, 2, 3),
    (RoleTitle::SubReviewer, 3, 4),
    (RoleTitle::Author, 4, 4),
    (RoleTitle::Attendee, 4, 4),
];

fn entry(role: RoleTitle) -> &'static (RoleTitle, u8, u8) {
    ROLE_TABLE
        .iter()
        .find(|(title, _, _)| *title == role)
        .expect("every role title has a table entry")
}

/// Rank of the role itself; lower is more senior.
pub fn precedence_of(role: RoleTitle) -> u8 {
    entry(role).1
}

/// Highest (least senior) precedence value a holder of this role may affect.
pub fn permission_of(role: RoleTitle) -> u8 {
    entry(role).2
}

/// The single authorization rule: may a holder of `actor` grant, confirm or
/// revoke the `target` role in someone else?
///
/// Compares numbers only. Two titles with the same precedence are mutually
/// interchangeable here regardless of their names.
pub fn permits(actor: RoleTitle, target: RoleTitle) -> bool {
    permission_of(actor) <= precedence_of(target)
}

impl RoleTitle {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleTitle::GeneralChair => "general-chair",
            RoleTitle::PcChair => "pc-chair",
            RoleTitle::PcMember => "pc-member",
            RoleTitle::SubReviewer => "sub-reviewer",
            RoleTitle::Author => "author",
            RoleTitle::Attendee => "attendee",
        }
    }
}

impl Display for RoleTitle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A string did not name any known role title.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("unknown role title: {0}")]
pub struct UnknownRoleTitle(String);

impl FromStr for RoleTitle {
    type Err = UnknownRoleTitle;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "general-chair" => Ok(RoleTitle::GeneralChair),
            "pc-chair" => Ok(RoleTitle::PcChair),
            "pc-member" => Ok(RoleTitle::PcMember),
            "sub-reviewer" => Ok(RoleTitle::SubReviewer),
            "author" => Ok(RoleTitle::Author),
            "attendee" => Ok(RoleTitle::Attendee),
            other => Err(UnknownRoleTitle(other.to_string())),
        }
    }
}
