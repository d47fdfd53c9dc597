//! Class taxonomy: a fixed hierarchy per task, flattened into leaf groups
//! that scope the contrastive objective.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{ClassId, TaskId};
use crate::errors::ConfigError;
use crate::traits::TaxonomySource;

/// A node of the taxonomy tree. In JSON a bare number is a class and an
/// object `{ "label": ..., "children": [...] }` is a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaxonomyNode {
    Class(ClassId),
    Group {
        #[serde(default)]
        label: Option<String>,
        children: Vec<TaxonomyNode>,
    },
}

impl TaxonomyNode {
    /// Flatten into leaf groups: for every group node, its direct class
    /// children form one subset (in declaration order). Groups without
    /// direct classes contribute nothing themselves.
    pub fn leaf_groups(&self) -> TaxonomyGroups {
        let mut groups = Vec::new();
        match self {
            Self::Class(id) => groups.push(vec![*id]),
            Self::Group { .. } => collect_leaf_groups(self, &mut groups),
        }
        TaxonomyGroups(groups)
    }
}

fn collect_leaf_groups(node: &TaxonomyNode, out: &mut Vec<Vec<ClassId>>) {
    if let TaxonomyNode::Group { children, .. } = node {
        let leaves: Vec<ClassId> = children
            .iter()
            .filter_map(|c| match c {
                TaxonomyNode::Class(id) => Some(*id),
                TaxonomyNode::Group { .. } => None,
            })
            .collect();
        if !leaves.is_empty() {
            out.push(leaves);
        }
        for child in children {
            collect_leaf_groups(child, out);
        }
    }
}

/// Ordered class-id subsets for one point in the task sequence.
/// Membership need not be exclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyGroups(pub Vec<Vec<ClassId>>);

impl TaxonomyGroups {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &[ClassId]> {
        self.0.iter().map(|g| g.as_slice())
    }

    /// Index of the first group containing `class`.
    pub fn group_of(&self, class: ClassId) -> Option<usize> {
        self.0.iter().position(|g| g.contains(&class))
    }
}

impl From<Vec<Vec<ClassId>>> for TaxonomyGroups {
    fn from(groups: Vec<Vec<ClassId>>) -> Self {
        Self(groups)
    }
}

/// Taxonomy levels keyed by task index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticTaxonomy {
    pub levels: BTreeMap<TaskId, TaxonomyNode>,
}

impl StaticTaxonomy {
    pub fn new(levels: BTreeMap<TaskId, TaxonomyNode>) -> Self {
        Self { levels }
    }

    /// Parse a taxonomy from JSON of the form `{ "levels": { "0": node, ... } }`.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::ParseError {
            path: "<taxonomy>".to_string(),
            message: e.to_string(),
        })
    }
}

impl TaxonomySource for StaticTaxonomy {
    fn groups_for_task(&self, task: TaskId) -> Option<TaxonomyGroups> {
        self.levels.get(&task).map(TaxonomyNode::leaf_groups)
    }
}
