//! Display names for anonymized and generated cluster objects.
use std::collections::{
    BTreeSet,
    HashMap,
};

use rand::seq::SliceRandom;
use rand::Rng;

mod words;

/// Raw identifiers that are still present upstream, grouped by kind.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawNames {
    pub nodes: BTreeSet<String>,
    pub namespaces: BTreeSet<String>,
    pub pods: BTreeSet<String>,
}

/// Maps opaque source identifiers to display names.  Implementations must return the same name for
/// the same input until it is forgotten, and never hand the same name to two different inputs.
pub trait NameGenerator: Send + Sync {
    fn node_name(&mut self, raw: &str) -> String;
    fn namespace_name(&mut self, raw: &str) -> String;
    fn pod_name(&mut self, raw: &str) -> String;

    /// Drop every remembered name whose raw identifier is not in `live`.
    fn retain(&mut self, _live: &RawNames) {}
}

/// Walks shuffled copies of the descriptor and animal word lists, so consecutive names look random.
/// Once the animal list wraps, names carry the lap number (`heron`, ..., `heron1`, ...) and so never
/// repeat.
#[derive(Clone, Debug)]
struct Moniker {
    descriptors: Vec<&'static str>,
    animals: Vec<&'static str>,
    next_descriptor: usize,
    next_animal: usize,
}

impl Moniker {
    fn new<R: Rng>(rng: &mut R) -> Moniker {
        let mut descriptors = words::DESCRIPTORS.to_vec();
        let mut animals = words::ANIMALS.to_vec();
        descriptors.shuffle(rng);
        animals.shuffle(rng);
        Moniker { descriptors, animals, next_descriptor: 0, next_animal: 0 }
    }

    fn short_name(&mut self) -> String {
        let lap = self.next_animal / self.animals.len();
        let animal = self.animals[self.next_animal % self.animals.len()];
        self.next_animal += 1;
        match lap {
            0 => animal.into(),
            _ => format!("{animal}{lap}"),
        }
    }

    fn long_name(&mut self) -> String {
        let animal = self.short_name();
        let desc = self.descriptors[self.next_descriptor % self.descriptors.len()];
        self.next_descriptor += 1;
        format!("{desc}_{animal}")
    }
}

/// The default [`NameGenerator`]: nodes get zone-striped `cluster-NN-azZ-XXX` names, namespaces a
/// two-word moniker, and pods a single animal name.
#[derive(Clone, Debug)]
pub struct RandomNameGenerator {
    cluster_name: String,
    next_node: usize,
    nodes: HashMap<String, String>,
    namespaces: HashMap<String, String>,
    pods: HashMap<String, String>,
    moniker: Moniker,
}

impl RandomNameGenerator {
    pub fn new<R: Rng>(rng: &mut R) -> RandomNameGenerator {
        RandomNameGenerator {
            cluster_name: format!("cluster-{}", rng.gen_range(10..100)),
            next_node: 0,
            nodes: HashMap::new(),
            namespaces: HashMap::new(),
            pods: HashMap::new(),
            moniker: Moniker::new(rng),
        }
    }

    pub fn cluster_name(&self) -> &str {
        &self.cluster_name
    }
}

impl NameGenerator for RandomNameGenerator {
    fn node_name(&mut self, raw: &str) -> String {
        let (cluster_name, next_node) = (&self.cluster_name, &mut self.next_node);
        self.nodes
            .entry(raw.into())
            .or_insert_with(|| {
                let number = *next_node;
                *next_node += 1;
                format!("{cluster_name}-az{}-{:x}", number % 3, 256 + 10 * number)
            })
            .clone()
    }

    fn namespace_name(&mut self, raw: &str) -> String {
        let moniker = &mut self.moniker;
        self.namespaces.entry(raw.into()).or_insert_with(|| moniker.long_name()).clone()
    }

    fn pod_name(&mut self, raw: &str) -> String {
        let moniker = &mut self.moniker;
        self.pods.entry(raw.into()).or_insert_with(|| moniker.short_name()).clone()
    }

    fn retain(&mut self, live: &RawNames) {
        self.nodes.retain(|raw, _| live.nodes.contains(raw));
        self.namespaces.retain(|raw, _| live.namespaces.contains(raw));
        self.pods.retain(|raw, _| live.pods.contains(raw));
    }
}
