//! Role-to-capability rules
//!
//! An `AccessRule` maps each unit role to a capability mask for one resource
//! kind. Rules are built once at process start and passed by reference into
//! every authorization check; they are never mutated afterwards.

use serde::{Deserialize, Serialize};

use crate::caps::{self, ALL, NONE, READ, READ_UPDATE};

/// Authority levels a caller can hold within an organizational unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Owner,
    ManageMembers,
    ManageTools,
    Viewer,
}

impl Role {
    /// Stable numeric code used by external storage
    pub fn code(self) -> u64 {
        match self {
            Role::Owner => 1,
            Role::ManageMembers => 2,
            Role::ManageTools => 3,
            Role::Viewer => 4,
        }
    }

    /// Decode a stored role code. Unknown codes yield `None`, which
    /// `resolve` treats as "no relevant role held".
    pub fn from_code(code: u64) -> Option<Role> {
        match code {
            1 => Some(Role::Owner),
            2 => Some(Role::ManageMembers),
            3 => Some(Role::ManageTools),
            4 => Some(Role::Viewer),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::ManageMembers => "manage-members",
            Role::ManageTools => "manage-tools",
            Role::Viewer => "viewer",
        }
    }
}

/// Per-resource rule: role → capability mask, with default and admin overrides
#[derive(Debug, Clone)]
pub struct AccessRule {
    default_caps: u64,
    admin_caps: u64,
    role_caps: Vec<(Role, u64)>,
    heritable: bool,
}

impl AccessRule {
    pub fn new(default_caps: u64, admin_caps: u64, role_caps: Vec<(Role, u64)>, heritable: bool) -> Self {
        AccessRule { default_caps, admin_caps, role_caps, heritable }
    }

    pub fn default_caps(&self) -> u64 {
        self.default_caps
    }

    pub fn admin_caps(&self) -> u64 {
        self.admin_caps
    }

    /// Whether a role held on a unit also grants on resources scoped beneath
    /// it. Carried as configuration only; no hierarchy walking happens here.
    pub fn applies_to_descendants(&self) -> bool {
        self.heritable
    }
}

/// Resolve the effective capability mask for a caller.
///
/// Total over its inputs: admins get the admin mask regardless of role, a
/// recognized role gets its entry, and everything else (no role, unknown
/// role) falls to the rule's default.
pub fn resolve(rule: &AccessRule, role: Option<Role>, is_admin: bool) -> u64 {
    if is_admin {
        return rule.admin_caps;
    }
    role.and_then(|r| rule.role_caps.iter().find(|(k, _)| *k == r).map(|(_, m)| *m))
        .unwrap_or(rule.default_caps)
}

/// Resource kinds the directory API exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Units,
    People,
    Memberships,
    Tools,
}

/// One rule per resource kind, constructed once at process start
#[derive(Debug, Clone)]
pub struct RuleSet {
    units: AccessRule,
    people: AccessRule,
    memberships: AccessRule,
    tools: AccessRule,
}

impl RuleSet {
    /// The directory API's standard policy.
    ///
    /// Owners hold everything on their unit. Member managers administer
    /// memberships, tool managers administer tools, viewers read. Callers
    /// with no relevant role can read units and people but touch nothing.
    pub fn standard() -> RuleSet {
        RuleSet {
            units: AccessRule::new(
                READ,
                ALL,
                vec![
                    (Role::Owner, ALL),
                    (Role::ManageMembers, READ_UPDATE),
                    (Role::ManageTools, READ),
                    (Role::Viewer, READ),
                ],
                true,
            ),
            people: AccessRule::new(
                READ,
                ALL,
                vec![
                    (Role::Owner, READ_UPDATE),
                    (Role::ManageMembers, READ_UPDATE),
                    (Role::ManageTools, READ),
                    (Role::Viewer, READ),
                ],
                false,
            ),
            memberships: AccessRule::new(
                NONE,
                ALL,
                vec![
                    (Role::Owner, ALL),
                    (Role::ManageMembers, ALL),
                    (Role::ManageTools, READ),
                    (Role::Viewer, READ),
                ],
                true,
            ),
            tools: AccessRule::new(
                NONE,
                ALL,
                vec![
                    (Role::Owner, ALL),
                    (Role::ManageTools, ALL),
                    (Role::Viewer, READ),
                ],
                false,
            ),
        }
    }

    pub fn rule(&self, resource: Resource) -> &AccessRule {
        match resource {
            Resource::Units => &self.units,
            Resource::People => &self.people,
            Resource::Memberships => &self.memberships,
            Resource::Tools => &self.tools,
        }
    }
}

/// Names of the capabilities a mask denies out of a requested set
pub fn denied_names(mask: u64, requested: u64) -> Vec<&'static str> {
    caps::caps_to_names(requested & !mask)
}
