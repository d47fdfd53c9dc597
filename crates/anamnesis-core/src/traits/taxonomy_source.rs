use crate::models::{TaskId, TaxonomyGroups};

/// Pure lookup of the taxonomy level for a task.
pub trait TaxonomySource: Send + Sync {
    /// Ordered class subsets for `task`, or `None` if the taxonomy has no
    /// level for it.
    fn groups_for_task(&self, task: TaskId) -> Option<TaxonomyGroups>;
}
