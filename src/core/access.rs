//! Access policy: the global owner gate and the elevated tier for form management.

use crate::config::settings::AccessConfig;

/// Reply sent to everyone but the owner while the owner gate is active.
pub const OWNER_ONLY_MESSAGE: &str =
    "This bot is currently in development mode and only responds to its owner.";
/// Reply sent when a member lacks the elevated tier.
pub const PERMISSION_DENIED_MESSAGE: &str =
    "You do not have permission to manage the form. This command requires an authorized role.";

/// Resolved access rules shared by the dispatcher and the admin commands.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AccessPolicy {
    restrict_to_owner: bool,
    owner_id: Option<String>,
    elevated_roles: Vec<String>,
}

impl AccessPolicy {
    /// Builds a policy; role names are stored lowercased.
    #[must_use]
    pub fn new(restrict_to_owner: bool, owner_id: Option<String>, elevated_roles: &[String]) -> Self {
        Self {
            restrict_to_owner,
            owner_id,
            elevated_roles: elevated_roles.iter().map(|r| r.to_lowercase()).collect(),
        }
    }

    /// Whether the owner gate lets `user_id` run commands at all.
    #[must_use]
    pub fn admits_invoker(&self, user_id: &str) -> bool {
        !self.restrict_to_owner || self.owner_id.as_deref() == Some(user_id)
    }

    /// Elevated tier: platform administrator OR any allow-listed role name.
    pub fn grants_elevated<'a, I>(&self, is_administrator: bool, role_names: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        is_administrator
            || role_names
                .into_iter()
                .any(|name| self.elevated_roles.contains(&name.to_lowercase()))
    }
}

impl From<&AccessConfig> for AccessPolicy {
    fn from(config: &AccessConfig) -> Self {
        Self::new(
            config.restrict_to_owner,
            config.owner_id.clone(),
            &config.form_admin_roles,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| (*n).to_string()).collect()
    }

    #[test]
    fn test_owner_gate_disabled_admits_everyone() {
        let policy = AccessPolicy::new(false, Some("1".to_string()), &[]);
        assert!(policy.admits_invoker("1"));
        assert!(policy.admits_invoker("2"));
    }

    #[test]
    fn test_owner_gate_enabled_admits_only_owner() {
        let policy = AccessPolicy::new(true, Some("1".to_string()), &[]);
        assert!(policy.admits_invoker("1"));
        assert!(!policy.admits_invoker("2"));

        let no_owner = AccessPolicy::new(true, None, &[]);
        assert!(!no_owner.admits_invoker("1"));
    }

    #[test]
    fn test_elevated_by_administrator() {
        let policy = AccessPolicy::new(false, None, &roles(&["leadership"]));
        assert!(policy.grants_elevated(true, []));
    }

    #[test]
    fn test_elevated_roles_match_case_insensitively() {
        let policy = AccessPolicy::new(false, None, &roles(&["leadership", "admin", "R4+"]));
        assert!(policy.grants_elevated(false, ["Member", "LEADERSHIP"]));
        assert!(policy.grants_elevated(false, ["r4+"]));
        assert!(policy.grants_elevated(false, ["R4+"]));
        assert!(!policy.grants_elevated(false, ["Member", "R4"]));
        assert!(!policy.grants_elevated(false, []));
    }

    #[test]
    fn test_from_config() {
        let config = AccessConfig {
            restrict_to_owner: true,
            owner_id: Some("9".to_string()),
            form_admin_roles: roles(&["Officer"]),
        };
        let policy = AccessPolicy::from(&config);
        assert!(policy.admits_invoker("9"));
        assert!(policy.grants_elevated(false, ["officer"]));
    }
}
