use crate::models::EntityId;

/// Allocates the next identifier for a collection: one greater than the
/// largest identifier currently present. An empty collection starts at 1.
pub fn next_id<I>(existing: I) -> EntityId
where
    I: IntoIterator<Item = EntityId>,
{
    existing.into_iter().max().map_or(1, |max| max + 1)
}
