/*
Workaround for error: https://doc.rust-lang.org/error_codes/E0116.html
Cannot define inherent `impl` for a type outside of the crate where the type is defined

define a trait that has the desired associated functions/types/constants and implement the trait for the type in question
 */
use termtree::Tree;
use tracing::instrument;

use crate::domain::{ConfigSection, TreeNode};

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeNodeConvert for ConfigSection {
    #[instrument(level = "debug", skip_all, fields(path = %self.path()))]
    fn to_tree_string(&self) -> Tree<String> {
        let label = if self.path().is_empty() {
            ".".to_string()
        } else {
            self.path().to_string()
        };
        labelled(label, &self.to_node())
    }
}

impl TreeNodeConvert for TreeNode {
    fn to_tree_string(&self) -> Tree<String> {
        labelled(".".to_string(), self)
    }
}

// Scalars render inline as `key: value`; containers become branches.
fn labelled(label: String, node: &TreeNode) -> Tree<String> {
    match node {
        TreeNode::Mapping(map) => {
            let leaves: Vec<_> = map
                .borrow()
                .iter()
                .map(|(key, child)| labelled(key.to_string(), child))
                .collect();
            Tree::new(label).with_leaves(leaves)
        }
        TreeNode::Sequence(items) => {
            let leaves: Vec<_> = items
                .iter()
                .enumerate()
                .map(|(i, child)| labelled(format!("[{i}]"), child))
                .collect();
            Tree::new(label).with_leaves(leaves)
        }
        leaf => Tree::new(format!("{label}: {leaf}")),
    }
}
