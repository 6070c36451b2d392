use serde::{Deserialize, Serialize};

use crate::Role;
use crate::policy::PolicyError;

/// Permission rule: `subject` (an account subject or a role name) may perform
/// `action` on channels matching `resource`.
///
/// `resource` may contain `*`, which matches any run of characters (including
/// none): `news:*` matches `news:` and `news:sport`, `*` matches every channel.
/// `action` is either an exact action name or `*` for any action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PolicyRule {
    pub subject: String,
    pub resource: String,
    pub action: String,
}

impl PolicyRule {
    pub fn new(subject: impl Into<String>, resource: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            resource: resource.into(),
            action: action.into(),
        }
    }

    /// Does this rule grant `action` on `resource` (subject already matched)?
    pub fn grants(&self, resource: &str, action: &str) -> bool {
        (self.action == "*" || self.action == action) && pattern_matches(&self.resource, resource)
    }

    pub(crate) fn validate(&self) -> Result<(), PolicyError> {
        for (field, value) in [
            ("subject", &self.subject),
            ("resource", &self.resource),
            ("action", &self.action),
        ] {
            if value.trim().is_empty() {
                return Err(PolicyError::InvalidRule(format!(
                    "rule {self:?} has an empty {field}"
                )));
            }
        }
        Ok(())
    }
}

/// Grouping: `subject` inherits every rule naming `role`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub subject: String,
    pub role: Role,
}

impl RoleAssignment {
    pub fn new(subject: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            role: Role::new(role.into()),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), PolicyError> {
        if self.subject.trim().is_empty() || self.role.as_str().trim().is_empty() {
            return Err(PolicyError::InvalidRule(format!(
                "role assignment {self:?} has an empty field"
            )));
        }
        if self.subject == self.role.as_str() {
            return Err(PolicyError::InvalidRule(format!(
                "role assignment {self:?} assigns a role to itself"
            )));
        }
        Ok(())
    }
}

/// Everything a policy store returns in one load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicySet {
    pub rules: Vec<PolicyRule>,
    pub assignments: Vec<RoleAssignment>,
}

/// Glob match where `*` matches any (possibly empty) run of characters and
/// every other character matches itself.
pub fn pattern_matches(pattern: &str, value: &str) -> bool {
    if !pattern.contains('*') {
        return pattern == value;
    }

    let mut segments = pattern.split('*');
    let head = segments.next().unwrap_or_default();
    let Some(mut rest) = value.strip_prefix(head) else {
        return false;
    };

    let tail: Vec<&str> = segments.collect();
    let Some((last, middle)) = tail.split_last() else {
        return true;
    };

    for segment in middle {
        match rest.find(segment) {
            Some(at) => rest = &rest[at + segment.len()..],
            None => return false,
        }
    }

    rest.len() >= last.len() && rest.ends_with(last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn exact_patterns_match_only_themselves() {
        assert!(pattern_matches("news", "news"));
        assert!(!pattern_matches("news", "news:sport"));
        assert!(!pattern_matches("news", "New"));
    }

    #[test]
    fn star_matches_any_run() {
        assert!(pattern_matches("*", ""));
        assert!(pattern_matches("*", "anything"));
        assert!(pattern_matches("news:*", "news:"));
        assert!(pattern_matches("news:*", "news:sport"));
        assert!(!pattern_matches("news:*", "news"));
        assert!(pattern_matches("personal:user#*", "personal:user#42"));
        assert!(pattern_matches("*:feed", "alice:feed"));
        assert!(!pattern_matches("*:feed", "alice:feeds"));
        assert!(pattern_matches("a*b*c", "abc"));
        assert!(pattern_matches("a*b*c", "a-b-b-c"));
        assert!(!pattern_matches("a*a", "a"));
    }

    #[test]
    fn rule_grants_checks_action_and_resource() {
        let rule = PolicyRule::new("editor", "news:*", "subscribe");
        assert!(rule.grants("news:world", "subscribe"));
        assert!(!rule.grants("news:world", "publish"));
        assert!(!rule.grants("sport", "subscribe"));

        let any = PolicyRule::new("admin", "*", "*");
        assert!(any.grants("sport", "publish"));
    }

    #[test]
    fn validation_rejects_blank_fields_and_self_assignment() {
        assert!(PolicyRule::new("editor", " ", "subscribe").validate().is_err());
        assert!(PolicyRule::new("editor", "news", "subscribe").validate().is_ok());
        assert!(RoleAssignment::new("", "editor").validate().is_err());
        assert!(RoleAssignment::new("editor", "editor").validate().is_err());
    }

    proptest! {
        #[test]
        fn prefix_star_matches_every_extension(prefix in "[a-z:#]{0,12}", suffix in "[a-z0-9:#]{0,12}") {
            let pattern = format!("{prefix}*");
            let value = format!("{prefix}{suffix}");
            prop_assert!(pattern_matches(&pattern, &value));
        }

        #[test]
        fn patterns_without_star_are_equality(a in "[a-z:]{0,8}", b in "[a-z:]{0,8}") {
            prop_assert_eq!(pattern_matches(&a, &b), a == b);
        }
    }
}
