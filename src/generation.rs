use crate::config::GenerationConfig;
use crate::model::{Person, RelationType, Relationship};
use log::{debug, warn};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

/// `Person.id -> generation`; lower values are older.
pub type GenerationMap = BTreeMap<String, i32>;

#[derive(Debug, Default)]
pub(crate) struct Lineage<'a> {
    parents_of: HashMap<&'a str, Vec<&'a str>>,
    children_of: HashMap<&'a str, Vec<&'a str>>,
}

impl<'a> Lineage<'a> {
    /// Only links between known people count; `source` is the child.
    pub(crate) fn build(known: &HashSet<&'a str>, relationships: &'a [Relationship]) -> Self {
        let mut lineage = Self::default();
        for rel in relationships {
            if rel.kind != RelationType::ParentChild || !rel.is_valid() {
                continue;
            }
            let child = rel.source.as_str();
            let parent = rel.target.as_str();
            if child == parent || !known.contains(child) || !known.contains(parent) {
                continue;
            }
            push_unique(lineage.parents_of.entry(child).or_default(), parent);
            push_unique(lineage.children_of.entry(parent).or_default(), child);
        }
        lineage
    }

    pub(crate) fn parents(&self, id: &str) -> &[&'a str] {
        self.parents_of.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn children(&self, id: &str) -> &[&'a str] {
        self.children_of.get(id).map(Vec::as_slice).unwrap_or(&[])
    }
}

fn push_unique<'a>(list: &mut Vec<&'a str>, id: &'a str) {
    if !list.contains(&id) {
        list.push(id);
    }
}

/// Assigns a generation to every valid person. Never fails; people with an
/// empty or repeated id are skipped.
pub fn resolve(
    people: &[Person],
    relationships: &[Relationship],
    config: &GenerationConfig,
) -> GenerationMap {
    let mut ordered: Vec<&Person> = Vec::with_capacity(people.len());
    let mut known: HashSet<&str> = HashSet::with_capacity(people.len());
    for person in people {
        if !person.is_valid() {
            warn!("Skipping person without id");
            continue;
        }
        if !known.insert(person.id.as_str()) {
            warn!(id = person.id.as_str(); "Skipping duplicate person id");
            continue;
        }
        ordered.push(person);
    }
    if ordered.is_empty() {
        return GenerationMap::new();
    }

    let lineage = Lineage::build(&known, relationships);

    let mut generations: HashMap<&str, i32> = HashMap::with_capacity(ordered.len());
    for person in &ordered {
        if let Some(hint) = person.generation {
            generations.insert(person.id.as_str(), hint);
        }
    }

    let roots = select_roots(&ordered, &lineage);
    for &root in &roots {
        generations.entry(root).or_insert(config.default_generation);
    }
    debug!(roots:?; "Propagating generations");

    let budget = config
        .max_steps
        .unwrap_or(ordered.len() + relationships.len() + 1);
    propagate(&roots, &lineage, &mut generations, budget);

    ordered
        .iter()
        .map(|person| {
            let rank = match generations.get(person.id.as_str()) {
                Some(rank) => *rank,
                None => {
                    debug!(
                        id = person.id.as_str();
                        "Person unreachable from roots, using default generation"
                    );
                    config.default_generation
                }
            };
            (person.id.clone(), rank)
        })
        .collect()
}

/// Roots in priority order: everyone at the lowest explicit hint, else the
/// patients, else people without recorded parents, else the first person.
fn select_roots<'a>(people: &[&'a Person], lineage: &Lineage<'_>) -> Vec<&'a str> {
    if let Some(lowest) = people.iter().filter_map(|p| p.generation).min() {
        return people
            .iter()
            .filter(|p| p.generation == Some(lowest))
            .map(|p| p.id.as_str())
            .collect();
    }

    let patients: Vec<&str> = people
        .iter()
        .filter(|p| p.attributes.patient())
        .map(|p| p.id.as_str())
        .collect();
    if !patients.is_empty() {
        return patients;
    }

    let parentless: Vec<&str> = people
        .iter()
        .filter(|p| lineage.parents(&p.id).is_empty())
        .map(|p| p.id.as_str())
        .collect();
    if !parentless.is_empty() {
        return parentless;
    }

    people.iter().take(1).map(|p| p.id.as_str()).collect()
}

fn propagate<'a>(
    roots: &[&'a str],
    lineage: &Lineage<'a>,
    generations: &mut HashMap<&'a str, i32>,
    budget: usize,
) {
    let mut queue: VecDeque<&'a str> = roots.iter().copied().collect();
    let mut settled: HashSet<&'a str> = HashSet::new();
    let mut steps = 0usize;

    while let Some(current) = queue.pop_front() {
        if !settled.insert(current) {
            continue;
        }
        if steps >= budget {
            warn!(budget; "Generation propagation budget exhausted");
            break;
        }
        steps += 1;

        let Some(&rank) = generations.get(current) else {
            continue;
        };

        let parent_rank = rank.saturating_sub(1);
        for &parent in lineage.parents(current) {
            let tightened = match generations.get(parent) {
                None => true,
                Some(&existing) => parent_rank < existing,
            };
            if tightened {
                generations.insert(parent, parent_rank);
                if !settled.contains(parent) {
                    queue.push_back(parent);
                }
            }
        }

        let child_rank = rank.saturating_add(1);
        for &child in lineage.children(current) {
            let tightened = match generations.get(child) {
                None => true,
                Some(&existing) => child_rank > existing,
            };
            if tightened {
                generations.insert(child, child_rank);
                if !settled.contains(child) {
                    queue.push_back(child);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PersonAttributes;

    fn patient(id: &str) -> Person {
        Person::new(id).with_attributes(PersonAttributes {
            is_patient: Some(true),
            ..Default::default()
        })
    }

    fn child_of(child: &str, parent: &str) -> Relationship {
        Relationship::parent_child(format!("{child}->{parent}"), child, parent)
    }

    fn run(people: &[Person], rels: &[Relationship]) -> GenerationMap {
        resolve(people, rels, &GenerationConfig::default())
    }

    #[test]
    fn empty_input_gives_empty_map() {
        assert!(run(&[], &[]).is_empty());
    }

    #[test]
    fn isolated_person_gets_default() {
        let map = run(&[Person::new("solo")], &[]);
        assert_eq!(map.get("solo"), Some(&3));
    }

    #[test]
    fn patient_anchors_ancestors_and_descendants() {
        let people = vec![
            patient("ego"),
            Person::new("mom"),
            Person::new("grandma"),
            Person::new("kid"),
        ];
        let rels = vec![
            child_of("ego", "mom"),
            child_of("mom", "grandma"),
            child_of("kid", "ego"),
        ];
        let map = run(&people, &rels);
        assert_eq!(map["grandma"], 1);
        assert_eq!(map["mom"], 2);
        assert_eq!(map["ego"], 3);
        assert_eq!(map["kid"], 4);
    }

    #[test]
    fn source_is_child_and_target_is_parent() {
        let people = vec![Person::new("a").with_generation(0), Person::new("b")];
        let map = run(&people, &[child_of("b", "a")]);
        assert_eq!(map["b"], 1);
    }

    #[test]
    fn lowest_hint_selects_roots_over_patients() {
        let people = vec![
            patient("ego"),
            Person::new("elder").with_generation(1),
            Person::new("elder_kid"),
        ];
        let rels = vec![child_of("elder_kid", "elder")];
        let map = run(&people, &rels);
        assert_eq!(map["elder"], 1);
        assert_eq!(map["elder_kid"], 2);
        // Not reachable from the hinted root.
        assert_eq!(map["ego"], 3);
    }

    #[test]
    fn parentless_people_are_roots_without_hints() {
        let people = vec![
            Person::new("root"),
            Person::new("child"),
            Person::new("grandchild"),
        ];
        let rels = vec![child_of("child", "root"), child_of("grandchild", "child")];
        let map = run(&people, &rels);
        assert_eq!(map["root"], 3);
        assert_eq!(map["child"], 4);
        assert_eq!(map["grandchild"], 5);
    }

    #[test]
    fn co_parent_inherits_rank_through_child() {
        let people = vec![
            Person::new("p1").with_generation(0),
            Person::new("p2"),
            Person::new("kid"),
        ];
        let rels = vec![child_of("kid", "p1"), child_of("kid", "p2")];
        let map = run(&people, &rels);
        assert_eq!(map["kid"], 1);
        assert_eq!(map["p2"], 0);
    }

    #[test]
    fn deeper_descendant_hint_is_kept() {
        let people = vec![
            Person::new("a").with_generation(0),
            Person::new("c").with_generation(4),
        ];
        let map = run(&people, &[child_of("c", "a")]);
        assert_eq!(map["a"], 0);
        assert_eq!(map["c"], 4);
    }

    #[test]
    fn siblings_of_hinted_child_get_parent_rank_minus_one() {
        let people = vec![
            Person::new("kid1").with_generation(5),
            Person::new("kid2"),
            Person::new("parent"),
        ];
        let rels = vec![child_of("kid1", "parent"), child_of("kid2", "parent")];
        let map = run(&people, &rels);
        assert_eq!(map["parent"], 4);
        assert_eq!(map["kid2"], 5);
    }

    #[test]
    fn cycles_terminate() {
        let people = vec![Person::new("a").with_generation(1), Person::new("b")];
        let rels = vec![child_of("b", "a"), child_of("a", "b")];
        let map = run(&people, &rels);
        assert_eq!(map.len(), 2);
        assert_eq!(map["b"], 2);
    }

    #[test]
    fn unknown_and_invalid_entries_are_ignored() {
        let people = vec![
            Person::new(""),
            Person::new("x"),
            Person::new("x").with_generation(9),
        ];
        let rels = vec![
            child_of("x", "ghost"),
            Relationship::parent_child("r", "", "x"),
        ];
        let map = run(&people, &rels);
        assert_eq!(map.len(), 1);
        assert_eq!(map["x"], 3);
    }

    #[test]
    fn budget_bounds_propagation() {
        let people = vec![
            Person::new("a").with_generation(0),
            Person::new("b"),
            Person::new("c"),
        ];
        let rels = vec![child_of("b", "a"), child_of("c", "b")];
        let config = GenerationConfig {
            default_generation: 7,
            max_steps: Some(1),
        };
        let map = resolve(&people, &rels, &config);
        assert_eq!(map["a"], 0);
        assert_eq!(map["b"], 1);
        // c is only reached by expanding b, which the budget forbids.
        assert_eq!(map["c"], 7);
    }

    #[test]
    fn resolution_is_deterministic() {
        let people = vec![
            patient("p"),
            Person::new("m"),
            Person::new("f"),
            Person::new("s"),
        ];
        let rels = vec![child_of("p", "m"), child_of("p", "f"), child_of("s", "m")];
        assert_eq!(run(&people, &rels), run(&people, &rels));
    }
}
