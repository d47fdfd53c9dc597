//! Which classes each task introduces.

use serde::{Deserialize, Serialize};

use super::{ClassId, TaskId};
use crate::errors::ConfigError;

/// Disjoint per-task class sets over a fixed label universe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSchedule {
    num_classes: usize,
    tasks: Vec<Vec<ClassId>>,
}

impl ClassSchedule {
    /// Build a schedule. Every class must be `< num_classes` and appear in at
    /// most one task.
    pub fn new(num_classes: usize, tasks: Vec<Vec<ClassId>>) -> Result<Self, ConfigError> {
        let mut owner = vec![None; num_classes];
        for (task, classes) in tasks.iter().enumerate() {
            for &class in classes {
                if class >= num_classes {
                    return Err(ConfigError::ValidationFailed {
                        field: format!("schedule.tasks[{task}]"),
                        message: format!("class {class} >= num_classes {num_classes}"),
                    });
                }
                if let Some(prev) = owner[class].replace(task) {
                    return Err(ConfigError::ValidationFailed {
                        field: format!("schedule.tasks[{task}]"),
                        message: format!("class {class} already introduced by task {prev}"),
                    });
                }
            }
        }
        Ok(Self { num_classes, tasks })
    }

    /// Split `0..num_classes` into `num_tasks` contiguous, equally sized tasks.
    /// The last task absorbs the remainder.
    pub fn contiguous(num_classes: usize, num_tasks: usize) -> Self {
        let num_tasks = num_tasks.max(1);
        let per_task = num_classes / num_tasks;
        let tasks = (0..num_tasks)
            .map(|t| {
                let start = t * per_task;
                let end = if t + 1 == num_tasks { num_classes } else { start + per_task };
                (start..end).collect()
            })
            .collect();
        Self { num_classes, tasks }
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    pub fn num_tasks(&self) -> usize {
        self.tasks.len()
    }

    pub fn task_classes(&self, task: TaskId) -> Option<&[ClassId]> {
        self.tasks.get(task).map(|c| c.as_slice())
    }

    /// Classes introduced by tasks `0..=task`, in task order.
    pub fn classes_through(&self, task: TaskId) -> Vec<ClassId> {
        self.tasks
            .iter()
            .take(task.saturating_add(1))
            .flat_map(|c| c.iter().copied())
            .collect()
    }

    /// The task that introduces `class`.
    pub fn task_of(&self, class: ClassId) -> Option<TaskId> {
        self.tasks.iter().position(|c| c.contains(&class))
    }

    /// `mask[c]` is true when class `c` has not been introduced by task `task`.
    pub fn unseen_mask(&self, task: TaskId) -> Vec<bool> {
        let mut mask = vec![true; self.num_classes];
        for class in self.classes_through(task) {
            mask[class] = false;
        }
        mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contiguous_split() {
        let schedule = ClassSchedule::contiguous(10, 3);
        assert_eq!(schedule.task_classes(0).unwrap(), &[0, 1, 2]);
        assert_eq!(schedule.task_classes(2).unwrap(), &[6, 7, 8, 9]);
        assert_eq!(schedule.classes_through(1), vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(schedule.task_of(7), Some(2));
    }

    #[test]
    fn overlapping_tasks_rejected() {
        let err = ClassSchedule::new(4, vec![vec![0, 1], vec![1, 2]]).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationFailed { .. }));
    }

    #[test]
    fn unseen_mask_excludes_prefix() {
        let schedule = ClassSchedule::new(4, vec![vec![3, 1], vec![0, 2]]).unwrap();
        assert_eq!(schedule.unseen_mask(0), vec![true, false, true, false]);
        assert_eq!(schedule.unseen_mask(1), vec![false; 4]);
    }
}
