use std::hash::Hash;
use std::ops::{Index, IndexMut};

use hashbrown::HashMap;
use serde::de::Error as SerdeError;
use serde::{Deserialize, Serialize};

use crate::is_debug;

pub trait KeyIndexKey<K> {
    fn key(&self) -> &K;
}

/// Insertion-ordered vector with O(1) lookup by key.
///
/// Iteration follows insertion order; replacing an item keeps its position.
#[derive(Debug, Clone)]
pub struct KeyIndexVec<K: Copy + Eq + Hash, V: KeyIndexKey<K>> {
    items: Vec<V>,
    idx_by_key: HashMap<K, usize>,
}

impl<K, V> Default for KeyIndexVec<K, V>
where
    K: Copy + Eq + Hash,
    V: KeyIndexKey<K>,
{
    fn default() -> Self {
        Self {
            items: Vec::new(),
            idx_by_key: HashMap::new(),
        }
    }
}

impl<K, V> KeyIndexVec<K, V>
where
    K: Copy + Eq + Hash,
    V: KeyIndexKey<K>,
{
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            idx_by_key: HashMap::with_capacity(capacity),
        }
    }

    /// Appends `v`, or replaces the item with the same key in place.
    /// Returns the replaced item.
    pub fn insert(&mut self, v: V) -> Option<V> {
        let key = *v.key();
        match self.idx_by_key.get(&key).copied() {
            Some(idx) => Some(std::mem::replace(&mut self.items[idx], v)),
            None => {
                self.idx_by_key.insert(key, self.items.len());
                self.items.push(v);
                None
            }
        }
    }

    /// Replaces the item with the same key. Unknown keys are handed back.
    pub fn replace(&mut self, v: V) -> Result<V, V> {
        match self.idx_by_key.get(v.key()).copied() {
            Some(idx) => Ok(std::mem::replace(&mut self.items[idx], v)),
            None => Err(v),
        }
    }

    pub fn remove_by_key(&mut self, key: &K) -> Option<V> {
        let idx = self.idx_by_key.remove(key)?;
        let removed = self.items.remove(idx);
        assert!(*removed.key() == *key);

        for (pos, item) in self.items.iter().enumerate().skip(idx) {
            self.idx_by_key.insert(*item.key(), pos);
        }

        self.debug_check();
        Some(removed)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, V> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, V> {
        self.items.iter_mut()
    }

    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.items.iter().map(|item| *item.key())
    }

    pub fn len(&self) -> usize {
        assert_eq!(self.items.len(), self.idx_by_key.len());
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        assert_eq!(self.items.len(), self.idx_by_key.len());
        self.items.is_empty()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.idx_by_key.contains_key(key)
    }

    pub fn index_of_key(&self, key: &K) -> Option<usize> {
        self.idx_by_key.get(key).copied()
    }

    pub fn by_key(&self, key: &K) -> Option<&V> {
        self.index_of_key(key).map(|idx| &self.items[idx])
    }

    pub fn by_key_mut(&mut self, key: &K) -> Option<&mut V> {
        let idx = self.index_of_key(key)?;
        Some(&mut self.items[idx])
    }

    fn debug_check(&self) {
        if is_debug() {
            assert_eq!(self.items.len(), self.idx_by_key.len());
            for (idx, v) in self.items.iter().enumerate() {
                assert_eq!(Some(idx), self.index_of_key(v.key()));
            }
        }
    }
}

impl<K, V> FromIterator<V> for KeyIndexVec<K, V>
where
    K: Copy + Eq + Hash,
    V: KeyIndexKey<K>,
{
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        let mut vec = Self::default();
        for item in iter {
            vec.insert(item);
        }
        vec
    }
}

impl<'a, K, V> IntoIterator for &'a KeyIndexVec<K, V>
where
    K: Copy + Eq + Hash,
    V: KeyIndexKey<K>,
{
    type Item = &'a V;
    type IntoIter = std::slice::Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<K, V> Index<usize> for KeyIndexVec<K, V>
where
    K: Copy + Eq + Hash,
    V: KeyIndexKey<K>,
{
    type Output = V;

    fn index(&self, idx: usize) -> &Self::Output {
        assert!(idx < self.items.len());
        &self.items[idx]
    }
}

impl<K, V> IndexMut<usize> for KeyIndexVec<K, V>
where
    K: Copy + Eq + Hash,
    V: KeyIndexKey<K>,
{
    fn index_mut(&mut self, idx: usize) -> &mut Self::Output {
        assert!(idx < self.items.len());
        &mut self.items[idx]
    }
}

impl<K, V> Serialize for KeyIndexVec<K, V>
where
    K: Copy + Eq + Hash,
    V: KeyIndexKey<K> + Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.items.serialize(serializer)
    }
}

impl<'de, K, V> Deserialize<'de> for KeyIndexVec<K, V>
where
    K: Copy + Eq + Hash,
    V: KeyIndexKey<K> + Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let items: Vec<V> = Vec::deserialize(deserializer)?;
        let mut idx_by_key = HashMap::with_capacity(items.len());
        for (idx, item) in items.iter().enumerate() {
            if idx_by_key.insert(*item.key(), idx).is_some() {
                return Err(SerdeError::custom("Duplicate key in KeyIndexVec"));
            }
        }

        Ok(Self { items, idx_by_key })
    }
}
