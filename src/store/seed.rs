//! Deterministic example dataset.
//!
//! When the store finds no durable payload, or the payload fails to decode,
//! it installs this dataset and immediately persists it, so a first launch
//! (or a corrupted file) never presents an empty collection. Ids, dates,
//! and timestamps are all fixed so repeated seeding is byte-identical.

use chrono::{DateTime, NaiveDate, Utc};

use crate::graph::FamilyGraph;
use crate::model::{Gender, MemoryEvent, Person};

fn seed_date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("static seed date")
}

fn seed_timestamp(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(9, 0, 0).expect("static seed time").and_utc()
}

fn seed_event(
    id: &str,
    subject: &str,
    date: NaiveDate,
    title: &str,
    content: &str,
) -> MemoryEvent {
    MemoryEvent::new(subject, date, title, content)
        .with_id(id)
        .with_created_at(seed_timestamp(date))
}

/// The example memory records installed on first launch
pub fn example_events() -> Vec<MemoryEvent> {
    vec![
        seed_event(
            "seed-0001",
            "Grandpa",
            seed_date(2023, 6, 18),
            "Fishing at the reservoir",
            "He taught me how to tie the hook and we stayed until sunset.",
        ),
        seed_event(
            "seed-0002",
            "Grandma",
            seed_date(2023, 9, 30),
            "Sunday dumplings",
            "The whole kitchen smelled of chives. Mine were the ugly ones.",
        ),
        seed_event(
            "seed-0003",
            "Mom",
            seed_date(2024, 1, 10),
            "Snow day walk",
            "School was cancelled, so we walked to the bakery in the snow.",
        ),
        seed_event(
            "seed-0004",
            "Dad",
            seed_date(2024, 2, 15),
            "Kite weekend",
            "The dragon kite finally flew after three failed Saturdays.",
        ),
        seed_event(
            "seed-0005",
            "Mom",
            seed_date(2024, 3, 1),
            "Picnic by the lake",
            "She packed lemon cake. We fed most of the crusts to the ducks.",
        ),
    ]
}

/// The example three-generation family graph
///
/// Spouse references are set symmetrically here because seed data is
/// caller-authored like any other data; the graph itself never repairs
/// one-sided references.
pub fn example_graph() -> FamilyGraph {
    let mut grandpa = Person::new("Grandpa", Gender::Male, 0, 0)
        .with_id("seed-grandpa")
        .with_traits("Patient, tells the same three stories")
        .with_love_level(5)
        .with_birth_year(1946);
    let mut grandma = Person::new("Grandma", Gender::Female, 0, 1)
        .with_id("seed-grandma")
        .with_traits("Feeds everyone within reach")
        .with_love_level(5)
        .with_birth_year(1949);
    let mut dad = Person::new("Dad", Gender::Male, 1, 0)
        .with_id("seed-dad")
        .with_traits("Weekend project starter")
        .with_love_level(4)
        .with_birth_year(1975);
    let mut mom = Person::new("Mom", Gender::Female, 1, 1)
        .with_id("seed-mom")
        .with_traits("Remembers every birthday")
        .with_love_level(5)
        .with_birth_year(1978);
    let mut me = Person::new("Me", Gender::Unspecified, 2, 0)
        .with_id("seed-me")
        .with_birth_year(2005);

    grandpa.set_spouse("seed-grandma");
    grandma.set_spouse("seed-grandpa");
    dad.set_spouse("seed-mom");
    mom.set_spouse("seed-dad");

    grandpa.add_child("seed-mom");
    grandma.add_child("seed-mom");
    mom.add_parent("seed-grandpa");
    mom.add_parent("seed-grandma");

    dad.add_child("seed-me");
    mom.add_child("seed-me");
    me.add_parent("seed-dad");
    me.add_parent("seed-mom");

    grandpa.memory_count = 1;
    grandma.memory_count = 1;
    dad.memory_count = 1;
    mom.memory_count = 2;

    let mut graph = FamilyGraph::new();
    graph.add_member(grandpa);
    graph.add_member(grandma);
    graph.add_member(dad);
    graph.add_member(mom);
    graph.add_member(me);
    graph
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_is_deterministic() {
        assert_eq!(example_events(), example_events());
    }

    #[test]
    fn test_seed_subjects_resolve_in_seed_graph() {
        let graph = example_graph();
        for event in example_events() {
            assert!(
                graph.member_named(&event.subject).is_some(),
                "seed event subject {} missing from seed graph",
                event.subject
            );
        }
    }

    #[test]
    fn test_seed_ids_are_unique() {
        let events = example_events();
        let mut ids: Vec<_> = events.iter().map(|e| e.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), events.len());
    }

    #[test]
    fn test_seed_graph_relationships() {
        let graph = example_graph();

        let spouse = graph.spouse_of("seed-grandpa").map(|p| p.name.clone());
        assert_eq!(spouse.as_deref(), Some("Grandma"));

        let children = graph.children_of("seed-mom");
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].name, "Me");

        let parents = graph.parents_of("seed-me");
        assert_eq!(parents.len(), 2);
    }
}
