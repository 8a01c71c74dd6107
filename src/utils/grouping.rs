use std::collections::HashMap;
use std::hash::Hash;

/// Groups `items` by the key `key` computes for each one.
///
/// Items keep their input order within a group.
pub fn group_by<T, K, I, F>(items: I, mut key: F) -> HashMap<K, Vec<T>>
where
    I: IntoIterator<Item = T>,
    K: Eq + Hash,
    F: FnMut(&T) -> K,
{
    let mut groups: HashMap<K, Vec<T>> = HashMap::new();
    for item in items {
        groups.entry(key(&item)).or_default().push(item);
    }
    groups
}
