use std::collections::HashMap;

/// An item that is addressed by a string key inside its container.
pub trait Keyed {
    fn key(&self) -> &str;
}

/// An insertion-ordered store of [`Keyed`] items with a key index.
///
/// The `KeyedStore` keeps two views of the same data:
/// - the items in the order they were inserted, which fixes the order in
///   which machinetags are generated and searched
/// - an index from each item's key to its position
///
/// Keys are unique. [`KeyedStore::try_insert`] refuses an item whose key is
/// already present and hands it back to the caller, so duplicate handling is
/// decided by the container that owns the store.
#[derive(Clone, Debug)]
pub struct KeyedStore<T> {
    items: Vec<T>,
    positions_by_key: HashMap<String, usize>,
}

impl<T: Keyed> KeyedStore<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            positions_by_key: HashMap::new(),
        }
    }

    /// Inserts an item, or returns it unchanged if its key is taken.
    pub fn try_insert(&mut self, item: T) -> Result<(), T> {
        if self.positions_by_key.contains_key(item.key()) {
            return Err(item);
        }
        self.positions_by_key
            .insert(item.key().to_string(), self.items.len());
        self.items.push(item);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.positions_by_key
            .get(key)
            .map(|&position| &self.items[position])
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.positions_by_key.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.key())
    }

    pub fn values(&self) -> std::slice::Iter<'_, T> { self.items.iter() }

    pub fn len(&self) -> usize { self.items.len() }

    pub fn is_empty(&self) -> bool { self.items.is_empty() }
}

impl<T: Keyed> Default for KeyedStore<T> {
    fn default() -> Self { Self::new() }
}

impl<T: PartialEq> PartialEq for KeyedStore<T> {
    /// Two stores are equal when they hold equal items under the same keys,
    /// regardless of insertion order.
    fn eq(&self, other: &Self) -> bool {
        self.items.len() == other.items.len()
            && self.positions_by_key.iter().all(|(key, &position)| {
                other
                    .positions_by_key
                    .get(key)
                    .is_some_and(|&other_position| {
                        self.items[position] == other.items[other_position]
                    })
            })
    }
}

/// Read-only access to a container of [`Keyed`] items.
///
/// Implemented by [`Predicate`](crate::Predicate) over its entries,
/// [`Taxonomy`](crate::Taxonomy) over its predicates and
/// [`TaxonomyCatalog`](crate::TaxonomyCatalog) over its taxonomies.
pub trait KeyedCollection {
    type Item: Keyed;

    fn store(&self) -> &KeyedStore<Self::Item>;

    fn get(&self, key: &str) -> Option<&Self::Item> { self.store().get(key) }

    fn contains_key(&self, key: &str) -> bool { self.store().contains_key(key) }

    fn keys(&self) -> impl Iterator<Item = &str> { self.store().keys() }

    fn values(&self) -> std::slice::Iter<'_, Self::Item> {
        self.store().values()
    }

    fn len(&self) -> usize { self.store().len() }

    fn is_empty(&self) -> bool { self.store().is_empty() }
}
