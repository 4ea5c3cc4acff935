//! User roles and role requirements.
//!
//! Roles form a flat, closed set. The only distinguished role is
//! [`Role::SuperAdmin`], the sole role allowed to manage other users and book
//! categories. Route requirements are expressed as a [`RoleSet`] so a route
//! can permit several roles without scattering equality checks.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a role label is not one of the four known roles.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid role: {0}")]
pub struct RoleParseError(pub String);

/// A user's role. The sole axis of authorization.
///
/// Serialized (and stored) as its human-readable label, e.g. `"Super Admin"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Manages user accounts and book categories.
    #[serde(rename = "Super Admin")]
    SuperAdmin,
    /// Receives incoming document submissions and validates checklists.
    #[serde(rename = "Admin Dokumen")]
    AdminDokumen,
    /// Records book-printing production logs.
    #[serde(rename = "Admin Buku")]
    AdminBuku,
    /// Read-only reviewer.
    #[serde(rename = "Reviewer")]
    Reviewer,
}

impl Role {
    /// All roles, highest privilege first.
    pub const ALL: [Self; 4] = [
        Self::SuperAdmin,
        Self::AdminDokumen,
        Self::AdminBuku,
        Self::Reviewer,
    ];

    /// The lowest-privilege role, used when a stored role is missing.
    pub const LOWEST: Self = Self::Reviewer;

    /// The stored / wire label of this role.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::SuperAdmin => "Super Admin",
            Self::AdminDokumen => "Admin Dokumen",
            Self::AdminBuku => "Admin Buku",
            Self::Reviewer => "Reviewer",
        }
    }

    /// Dashboard summary of what this role is responsible for.
    #[must_use]
    pub const fn overview(self) -> Option<&'static str> {
        match self {
            Self::AdminDokumen => Some(
                "Receives incoming book submissions, validates checklists and manages drafts.",
            ),
            Self::AdminBuku => Some(
                "Records book-printing progress, production status and revision notes.",
            ),
            Self::SuperAdmin => Some("Manages user access and maintains book categories."),
            Self::Reviewer => None,
        }
    }

    const fn bit(self) -> u8 {
        match self {
            Self::SuperAdmin => 1,
            Self::AdminDokumen => 1 << 1,
            Self::AdminBuku => 1 << 2,
            Self::Reviewer => 1 << 3,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.label() == s)
            .ok_or_else(|| RoleParseError(s.to_owned()))
    }
}

// SQLx support (with postgres feature). Roles live in a TEXT column guarded by
// a CHECK constraint, so they are encoded through their label.
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Role {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Role {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(s.parse()?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Role {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.label(), buf)
    }
}

/// The set of roles a route or capability permits.
///
/// ```
/// use berkasman_core::{Role, RoleSet};
///
/// assert!(RoleSet::SUPER_ADMIN.permits(Role::SuperAdmin));
/// assert!(!RoleSet::SUPER_ADMIN.permits(Role::AdminBuku));
///
/// let editors = RoleSet::any_of(&[Role::AdminDokumen, Role::AdminBuku]);
/// assert!(editors.permits(Role::AdminBuku));
/// assert!(RoleSet::ANY.permits(Role::Reviewer));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoleSet(u8);

impl RoleSet {
    /// Every role; i.e. "any authenticated session".
    pub const ANY: Self = Self::any_of(&Role::ALL);

    /// Managing users and book categories.
    pub const SUPER_ADMIN: Self = Self::only(Role::SuperAdmin);

    /// A set containing exactly one role.
    #[must_use]
    pub const fn only(role: Role) -> Self {
        Self(role.bit())
    }

    /// A set containing each of the given roles.
    #[must_use]
    pub const fn any_of(roles: &[Role]) -> Self {
        let mut bits = 0;
        let mut rest = roles;
        while let [role, tail @ ..] = rest {
            bits |= role.bit();
            rest = tail;
        }
        Self(bits)
    }

    /// Whether `role` satisfies this requirement.
    #[must_use]
    pub const fn permits(self, role: Role) -> bool {
        self.0 & role.bit() != 0
    }

    /// Roles in this set, highest privilege first.
    pub fn roles(self) -> impl Iterator<Item = Role> {
        Role::ALL.into_iter().filter(move |role| self.permits(*role))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_label_roundtrip() {
        for role in Role::ALL {
            assert_eq!(role.label().parse::<Role>().unwrap(), role);
            assert_eq!(role.to_string(), role.label());
        }
    }

    #[test]
    fn test_parse_rejects_unknown_and_case_variants() {
        assert!("Admin".parse::<Role>().is_err());
        assert!("super admin".parse::<Role>().is_err());
        assert!("SuperAdmin".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn test_serde_uses_labels() {
        let json = serde_json::to_string(&Role::AdminDokumen).unwrap();
        assert_eq!(json, "\"Admin Dokumen\"");

        let role: Role = serde_json::from_str("\"Super Admin\"").unwrap();
        assert_eq!(role, Role::SuperAdmin);

        assert!(serde_json::from_str::<Role>("\"Owner\"").is_err());
    }

    #[test]
    fn test_only_permits_exactly_one_role() {
        for required in Role::ALL {
            let set = RoleSet::only(required);
            for role in Role::ALL {
                assert_eq!(set.permits(role), role == required);
            }
        }
    }

    #[test]
    fn test_any_permits_every_role() {
        assert!(Role::ALL.into_iter().all(|r| RoleSet::ANY.permits(r)));
        assert_eq!(RoleSet::ANY.roles().count(), 4);
    }

    #[test]
    fn test_any_of_and_roles() {
        let set = RoleSet::any_of(&[Role::Reviewer, Role::AdminBuku]);
        let roles: Vec<Role> = set.roles().collect();
        assert_eq!(roles, vec![Role::AdminBuku, Role::Reviewer]);
        assert!(!set.permits(Role::SuperAdmin));
    }

    #[test]
    fn test_any_of_tolerates_repeats() {
        let set = RoleSet::any_of(&[Role::AdminDokumen, Role::AdminDokumen, Role::SuperAdmin]);
        assert_eq!(set, RoleSet::any_of(&[Role::SuperAdmin, Role::AdminDokumen]));
        assert_eq!(set.roles().count(), 2);
    }

    #[test]
    fn test_empty_set_permits_nothing() {
        let set = RoleSet::any_of(&[]);
        assert!(Role::ALL.into_iter().all(|r| !set.permits(r)));
    }

    #[test]
    fn test_lowest_is_reviewer_without_overview() {
        assert_eq!(Role::LOWEST, Role::Reviewer);
        assert!(Role::LOWEST.overview().is_none());
        assert!(Role::SuperAdmin.overview().is_some());
    }
}
