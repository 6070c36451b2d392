use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use chrono::{DateTime, Utc};

use crate::Role;
use crate::policy::{PolicyError, PolicyRule, PolicySet};

/// How many role-to-role hops are followed when resolving inherited roles.
pub const MAX_ROLE_DEPTH: usize = 10;

/// Immutable, indexed view of one successfully loaded policy set.
///
/// Snapshots are never mutated after construction; the engine replaces them
/// wholesale.
#[derive(Debug, Clone)]
pub struct PolicySnapshot {
    rules_by_subject: HashMap<String, Vec<PolicyRule>>,
    roles_by_subject: HashMap<String, BTreeSet<Role>>,
    rule_count: usize,
    assignment_count: usize,
    loaded_at: DateTime<Utc>,
}

impl PolicySnapshot {
    /// Validate and index a policy set. Duplicate entries collapse.
    pub fn build(set: PolicySet, loaded_at: DateTime<Utc>) -> Result<Self, PolicyError> {
        let mut seen_rules = HashSet::new();
        let mut rules_by_subject: HashMap<String, Vec<PolicyRule>> = HashMap::new();
        for rule in set.rules {
            rule.validate()?;
            if seen_rules.insert(rule.clone()) {
                rules_by_subject.entry(rule.subject.clone()).or_default().push(rule);
            }
        }

        let mut assignment_count = 0;
        let mut roles_by_subject: HashMap<String, BTreeSet<Role>> = HashMap::new();
        for assignment in set.assignments {
            assignment.validate()?;
            if roles_by_subject
                .entry(assignment.subject)
                .or_default()
                .insert(assignment.role)
            {
                assignment_count += 1;
            }
        }

        Ok(Self {
            rules_by_subject,
            roles_by_subject,
            rule_count: seen_rules.len(),
            assignment_count,
            loaded_at,
        })
    }

    pub fn rule_count(&self) -> usize {
        self.rule_count
    }

    pub fn assignment_count(&self) -> usize {
        self.assignment_count
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Roles assigned directly to `subject`. Empty when none.
    pub fn roles_for(&self, subject: &str) -> BTreeSet<Role> {
        self.roles_by_subject.get(subject).cloned().unwrap_or_default()
    }

    /// Roles reachable from `subject` through assignments, up to
    /// [`MAX_ROLE_DEPTH`] hops. Cycles are tolerated.
    pub fn implicit_roles_for(&self, subject: &str) -> BTreeSet<Role> {
        let mut found = BTreeSet::new();
        let mut queue: VecDeque<(&str, usize)> = VecDeque::from([(subject, 0)]);

        while let Some((current, depth)) = queue.pop_front() {
            if depth >= MAX_ROLE_DEPTH {
                continue;
            }
            let Some(roles) = self.roles_by_subject.get(current) else {
                continue;
            };
            for role in roles {
                if role.as_str() != subject && found.insert(role.clone()) {
                    queue.push_back((role.as_str(), depth + 1));
                }
            }
        }

        found
    }

    /// The first rule granting the request, if any.
    ///
    /// Rules naming the subject directly are checked before role-derived
    /// rules; this only affects which rule is reported, never the outcome.
    pub fn explain(&self, subject: &str, resource: &str, action: &str) -> Option<&PolicyRule> {
        if let Some(rule) = self.direct_grant(subject, resource, action) {
            return Some(rule);
        }
        self.implicit_roles_for(subject)
            .iter()
            .find_map(|role| self.direct_grant(role.as_str(), resource, action))
    }

    pub fn enforce(&self, subject: &str, resource: &str, action: &str) -> bool {
        self.explain(subject, resource, action).is_some()
    }

    fn direct_grant(&self, subject: &str, resource: &str, action: &str) -> Option<&PolicyRule> {
        self.rules_by_subject
            .get(subject)?
            .iter()
            .find(|rule| rule.grants(resource, action))
    }
}
