//! Person model.
//!
//! A `Person` is a node in the family relationship graph. Identity and
//! descriptive attributes are fixed at construction; only the relationship
//! fields (spouse, parents, children) grow incrementally afterwards.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Upper bound of the love-level scale.
pub const MAX_LOVE_LEVEL: u8 = 5;

/// Gender tag for a family member
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Gender {
    Female,
    Male,
    #[default]
    Unspecified,
}

/// A member of the family relationship graph
///
/// The id is generated once at construction and never changes. Relationship
/// fields reference other members by id; the graph resolves them tolerantly,
/// so a dangling reference is skipped rather than reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Unique identifier, stable for the member's lifetime
    pub id: String,

    /// Display name, also used as the subject key of memory events
    pub name: String,

    /// Gender tag
    #[serde(default)]
    pub gender: Gender,

    /// Generation layer the member belongs to (0 = oldest seeded generation)
    pub generation: i32,

    /// Position index within the generation
    pub position: i32,

    /// Spouse member id, if any. Symmetry with the spouse's own reference is
    /// the caller's responsibility.
    #[serde(default)]
    pub spouse_id: Option<String>,

    /// Parent member ids, insertion-ordered, duplicate-free
    #[serde(default)]
    pub parent_ids: Vec<String>,

    /// Child member ids, insertion-ordered, duplicate-free
    #[serde(default)]
    pub children_ids: Vec<String>,

    /// Free-form trait description shown alongside the member
    #[serde(default)]
    pub traits: String,

    /// Number of memory events attributed to this member
    #[serde(default)]
    pub memory_count: u32,

    /// Affection score on a 0-5 scale
    #[serde(default)]
    pub love_level: u8,

    /// Year of birth, if known
    #[serde(default)]
    pub birth_year: Option<i32>,
}

impl Person {
    /// Create a new member with a generated id
    pub fn new(name: &str, gender: Gender, generation: i32, position: i32) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            gender,
            generation,
            position,
            spouse_id: None,
            parent_ids: Vec::new(),
            children_ids: Vec::new(),
            traits: String::new(),
            memory_count: 0,
            love_level: 0,
            birth_year: None,
        }
    }

    /// Replace the generated id with a fixed one (seed data, fixtures)
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    /// Set the trait description
    pub fn with_traits(mut self, traits: &str) -> Self {
        self.traits = traits.to_string();
        self
    }

    /// Set the love level, clamped to the 0-5 scale
    pub fn with_love_level(mut self, love_level: u8) -> Self {
        self.love_level = love_level.min(MAX_LOVE_LEVEL);
        self
    }

    /// Set the birth year
    pub fn with_birth_year(mut self, year: i32) -> Self {
        self.birth_year = Some(year);
        self
    }

    /// Set the spouse reference. Only this side is updated.
    pub fn set_spouse(&mut self, spouse_id: &str) {
        self.spouse_id = Some(spouse_id.to_string());
    }

    /// Add a parent reference
    pub fn add_parent(&mut self, parent_id: &str) {
        if !self.parent_ids.contains(&parent_id.to_string()) {
            self.parent_ids.push(parent_id.to_string());
        }
    }

    /// Add a child reference
    pub fn add_child(&mut self, child_id: &str) {
        if !self.children_ids.contains(&child_id.to_string()) {
            self.children_ids.push(child_id.to_string());
        }
    }
}
