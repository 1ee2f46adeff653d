//! Conflict registry for one section.
//!
//! Holds the declared peer courses with their severities and the candidate
//! pool of courses that could still be declared, scoped to one prefix.

use std::cmp::Ordering;

use super::error::{WorkbenchError, WorkbenchResult};
use super::selector::PoolItem;
use crate::models::{
    course_names_of, sort_section_names, ConflictEntry, CourseId, CourseName, GroupedConflicts,
    OrderingRules, SectionId, Severity,
};

#[derive(Debug, Clone)]
pub struct ConflictRegistry {
    owner: SectionId,
    entries: Vec<ConflictEntry>,
    candidate_scope: Option<String>,
    candidates: Vec<CourseName>,
    rules: OrderingRules,
}

impl ConflictRegistry {
    pub fn new(owner: SectionId, rules: OrderingRules) -> Self {
        Self {
            owner,
            entries: Vec::new(),
            candidate_scope: None,
            candidates: Vec::new(),
            rules,
        }
    }

    pub fn owner(&self) -> &SectionId {
        &self.owner
    }

    pub fn entries(&self) -> &[ConflictEntry] {
        &self.entries
    }

    pub fn candidates(&self) -> &[CourseName] {
        &self.candidates
    }

    pub fn candidate_scope(&self) -> Option<&str> {
        self.candidate_scope.as_deref()
    }

    pub fn grouped(&self) -> GroupedConflicts {
        GroupedConflicts::from_entries(&self.entries)
    }

    pub fn severity_of(&self, peer: &CourseName) -> Option<Severity> {
        self.find(peer).map(|i| self.entries[i].severity)
    }

    /// Replace the declared conflicts with the store's copy.
    pub fn load(&mut self, entries: impl IntoIterator<Item = ConflictEntry>) {
        self.entries.clear();
        for entry in entries {
            if self.find(&entry.peer).is_none() {
                self.entries.push(entry);
            }
        }
        let entries = &self.entries;
        self.candidates
            .retain(|c| !entries.iter().any(|e| same_course(&e.peer, c)));
    }

    /// Declare a Heavy conflict with `peer`.
    pub fn add_conflict(&mut self, peer: CourseName) -> WorkbenchResult<&ConflictEntry> {
        let (course, _, _) = peer.parse()?;
        if self.owner.same_course(&course) {
            return Err(WorkbenchError::invalid(format!(
                "{} cannot conflict with its own course",
                self.owner
            )));
        }
        if self.find(&peer).is_some() {
            return Err(WorkbenchError::invalid(format!(
                "Conflict with {} is already declared",
                peer
            )));
        }

        self.candidates.retain(|c| !same_course(c, &peer));
        self.entries.push(ConflictEntry::new(peer, Severity::default()));
        Ok(&self.entries[self.entries.len() - 1])
    }

    /// Remove the conflict with `peer`, returning it when it existed.
    pub fn remove_conflict(&mut self, peer: &CourseName) -> Option<ConflictEntry> {
        let index = self.find(peer)?;
        let entry = self.entries.remove(index);

        if self.candidate_scope.as_deref() == Some(entry.peer.prefix()) {
            let rules = self.rules;
            let at = self
                .candidates
                .partition_point(|c| c.compare(&entry.peer, &rules) != Ordering::Greater);
            self.candidates.insert(at, entry.peer.clone());
        }
        Some(entry)
    }

    /// Change the severity of an existing conflict. Returns whether it changed.
    pub fn set_severity(&mut self, peer: &CourseName, severity: Severity) -> WorkbenchResult<bool> {
        let index = self.find(peer).ok_or_else(|| {
            WorkbenchError::invalid(format!("No conflict with {} is declared", peer))
        })?;
        let entry = &mut self.entries[index];
        if entry.severity == severity {
            return Ok(false);
        }
        entry.severity = severity;
        Ok(true)
    }

    /// Offer the courses of `prefix` as candidates, projected from `section_names`.
    pub fn set_candidate_scope<I, S>(&mut self, prefix: impl Into<String>, section_names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let prefix = prefix.into();
        let sections = sort_section_names(section_names, self.rules.section_ordering);
        let owner = self.owner.course();

        self.candidates = course_names_of(sections.iter().filter(|s| s.prefix == prefix))
            .into_iter()
            .filter(|c| !is_course(c, &owner))
            .filter(|c| !self.entries.iter().any(|e| same_course(&e.peer, c)))
            .collect();
        self.candidate_scope = Some(prefix);
    }

    fn find(&self, peer: &CourseName) -> Option<usize> {
        self.entries.iter().position(|e| same_course(&e.peer, peer))
    }
}

/// Two course names denote the same `(prefix, number)`.
fn same_course(a: &CourseName, b: &CourseName) -> bool {
    match (a.parse(), b.parse()) {
        (Ok((x, _, _)), Ok((y, _, _))) => x == y,
        _ => a == b,
    }
}

fn is_course(name: &CourseName, course: &CourseId) -> bool {
    name.parse().map_or(false, |(c, _, _)| &c == course)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SectionKind;

    fn registry() -> ConflictRegistry {
        let owner = SectionId::new("CMS", "171", SectionKind::Lecture, 1);
        let mut registry = ConflictRegistry::new(owner, OrderingRules::default());
        registry.set_candidate_scope(
            "CMS",
            [
                "CMS 171 - Lecture 1",
                "CMS 171 - Lab 1",
                "CMS 200 - Lecture H1X",
                "CMS 170 - Lecture 1",
                "MAT 140 - Lecture 1",
            ],
        );
        registry
    }

    fn names(courses: &[CourseName]) -> Vec<&str> {
        courses.iter().map(|c| c.as_str()).collect()
    }

    #[test]
    fn test_candidates_exclude_owner_and_other_prefixes() {
        let registry = registry();
        assert_eq!(names(registry.candidates()), vec!["CMS 170", "CMS 200 - H/X"]);
    }

    #[test]
    fn test_add_then_remove_restores_state() {
        let mut registry = registry();
        let peer = CourseName::new("CMS 200 - H/X");

        let entry = registry.add_conflict(peer.clone()).unwrap();
        assert_eq!(entry.severity, Severity::Heavy);
        assert_eq!(names(registry.candidates()), vec!["CMS 170"]);
        assert_eq!(registry.grouped().heavy, vec!["CMS 200 - H/X"]);

        let removed = registry.remove_conflict(&peer).unwrap();
        assert_eq!(removed.peer, peer);
        assert!(registry.entries().is_empty());
        assert_eq!(names(registry.candidates()), vec!["CMS 170", "CMS 200 - H/X"]);
    }

    #[test]
    fn test_self_conflict_and_duplicates_are_rejected() {
        let mut registry = registry();
        let err = registry.add_conflict(CourseName::new("CMS 171")).unwrap_err();
        assert!(matches!(err, WorkbenchError::InvalidTransition(_)));

        registry.add_conflict(CourseName::new("CMS 170")).unwrap();
        assert!(registry.add_conflict(CourseName::new("CMS 170")).is_err());
        assert!(matches!(
            registry.add_conflict(CourseName::new("CMS")),
            Err(WorkbenchError::MalformedIdentifier(_))
        ));
    }

    #[test]
    fn test_removed_peer_outside_scope_is_dropped() {
        let mut registry = registry();
        let peer = CourseName::new("MAT 140");
        registry.add_conflict(peer.clone()).unwrap();
        registry.remove_conflict(&peer).unwrap();
        assert!(!registry.candidates().contains(&peer));
        assert!(registry.remove_conflict(&peer).is_none());
    }

    #[test]
    fn test_set_severity_reports_change() {
        let mut registry = registry();
        let peer = CourseName::new("CMS 170");
        registry.add_conflict(peer.clone()).unwrap();

        assert!(!registry.set_severity(&peer, Severity::Heavy).unwrap());
        assert!(registry.set_severity(&peer, Severity::Light).unwrap());
        assert_eq!(registry.severity_of(&peer), Some(Severity::Light));
        assert_eq!(registry.grouped().light, vec!["CMS 170"]);

        assert!(registry
            .set_severity(&CourseName::new("BIO 101"), Severity::Medium)
            .is_err());
    }

    #[test]
    fn test_load_replaces_entries_and_prunes_candidates() {
        let mut registry = registry();
        registry.load(vec![ConflictEntry::new("CMS 170", Severity::Medium)]);
        assert_eq!(registry.entries().len(), 1);
        assert_eq!(names(registry.candidates()), vec!["CMS 200 - H/X"]);

        registry.load(Vec::new());
        assert!(registry.entries().is_empty());
    }
}
