use serde::{de::DeserializeOwned, Serialize};
use strsim::levenshtein;
use uuid::Uuid;

/// A persisted ledger entity with a stable identifier.
///
/// `KIND` names the entity in logs, errors, and storage file names.
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    const KIND: &'static str;

    fn id(&self) -> Uuid;
}

/// Provides access to a human-friendly entity name.
pub trait NamedEntity {
    fn name(&self) -> &str;
}

/// Case-insensitive name comparison used as the join key between sales and stock.
pub fn names_match(left: &str, right: &str) -> bool {
    left.to_lowercase() == right.to_lowercase()
}

/// Positions of every entity whose name matches `name`, in list order.
pub fn positions_named<T: NamedEntity>(entities: &[T], name: &str) -> Vec<usize> {
    entities
        .iter()
        .enumerate()
        .filter(|(_, entity)| names_match(entity.name(), name))
        .map(|(idx, _)| idx)
        .collect()
}

/// The entity name closest to `name` within `max_distance` edits, ignoring case.
pub fn closest_name<T: NamedEntity>(
    entities: &[T],
    name: &str,
    max_distance: usize,
) -> Option<String> {
    let wanted = name.to_lowercase();
    entities
        .iter()
        .map(|entity| {
            let distance = levenshtein(&entity.name().to_lowercase(), &wanted);
            (distance, entity.name())
        })
        .filter(|(distance, _)| *distance <= max_distance)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, name)| name.to_string())
}
