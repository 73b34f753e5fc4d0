use eventide_types::{EntityKey, Record};
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

/// An ordered collection of entities as of some point in the log.
///
/// Entities keep the order in which they were created. Keys are unique within
/// a projection; lookups are linear scans by key equality.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projection {
    entities: Vec<(EntityKey, Record)>,
}

impl Projection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// The entity with the given key, if any.
    pub fn get(&self, key: &EntityKey) -> Option<&Record> {
        self.position(key).map(|i| &self.entities[i].1)
    }

    pub fn contains(&self, key: &EntityKey) -> bool {
        self.position(key).is_some()
    }

    /// Entities in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.entities.iter().map(|(_, record)| record)
    }

    /// Keys in creation order.
    pub fn keys(&self) -> impl Iterator<Item = &EntityKey> {
        self.entities.iter().map(|(key, _)| key)
    }

    /// Copies the entities out of the projection.
    pub fn to_records(&self) -> Vec<Record> {
        self.iter().cloned().collect()
    }

    pub(crate) fn position(&self, key: &EntityKey) -> Option<usize> {
        self.entities.iter().position(|(k, _)| k == key)
    }

    pub(crate) fn push(&mut self, key: EntityKey, record: Record) {
        self.entities.push((key, record));
    }

    pub(crate) fn entity_mut(&mut self, index: usize) -> Option<&mut Record> {
        self.entities.get_mut(index).map(|(_, record)| record)
    }

    pub(crate) fn remove(&mut self, index: usize) -> Record {
        self.entities.remove(index).1
    }
}

type EntityRef<'a> = fn(&'a (EntityKey, Record)) -> &'a Record;

impl<'a> IntoIterator for &'a Projection {
    type Item = &'a Record;
    type IntoIter = std::iter::Map<std::slice::Iter<'a, (EntityKey, Record)>, EntityRef<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        let entity: EntityRef<'a> = |(_, record)| record;
        self.entities.iter().map(entity)
    }
}

/// Serializes as a JSON array of entities.
impl Serialize for Projection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for record in self.iter() {
            seq.serialize_element(record)?;
        }
        seq.end()
    }
}
