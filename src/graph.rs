//! Family relationship graph.
//!
//! The graph owns the keyed collection of [`Person`] members and answers
//! spouse/children/parents queries by id lookup through the members'
//! relationship fields. Lookups are tolerant: unknown ids and dangling
//! references resolve to nothing rather than an error, so partially
//! populated seed data never panics a query.
//!
//! The graph carries no concurrency contract of its own. It is intended to
//! be populated once at startup and treated as read-only afterwards; share
//! it behind external synchronization if that ever changes.

use std::collections::HashMap;

use crate::model::Person;

/// Keyed collection of family members
#[derive(Debug, Clone, Default)]
pub struct FamilyGraph {
    members: HashMap<String, Person>,
}

impl FamilyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a member under its id. Last write wins.
    pub fn add_member(&mut self, person: Person) {
        self.members.insert(person.id.clone(), person);
    }

    /// Look up a member by id
    pub fn member(&self, id: &str) -> Option<&Person> {
        self.members.get(id)
    }

    /// Look up a member by display name
    ///
    /// Names are not required to be unique; when they are not, which member
    /// is returned is unspecified.
    pub fn member_named(&self, name: &str) -> Option<&Person> {
        self.members.values().find(|p| p.name == name)
    }

    /// Resolve a member's spouse
    ///
    /// Returns `None` when the member is unknown, has no spouse reference,
    /// or the reference does not resolve.
    pub fn spouse_of(&self, id: &str) -> Option<&Person> {
        self.members
            .get(id)
            .and_then(|p| p.spouse_id.as_deref())
            .and_then(|spouse_id| self.members.get(spouse_id))
    }

    /// Resolve a member's children, silently dropping unresolved ids
    pub fn children_of(&self, id: &str) -> Vec<&Person> {
        self.resolve_ids(self.members.get(id).map(|p| p.children_ids.as_slice()))
    }

    /// Resolve a member's parents, silently dropping unresolved ids
    pub fn parents_of(&self, id: &str) -> Vec<&Person> {
        self.resolve_ids(self.members.get(id).map(|p| p.parent_ids.as_slice()))
    }

    /// All members, in no particular order
    pub fn members(&self) -> impl Iterator<Item = &Person> {
        self.members.values()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    fn resolve_ids(&self, ids: Option<&[String]>) -> Vec<&Person> {
        ids.unwrap_or_default()
            .iter()
            .filter_map(|id| self.members.get(id))
            .collect()
    }
}
