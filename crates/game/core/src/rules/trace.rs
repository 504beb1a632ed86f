/// One evaluated node of a requirement tree.
///
/// Children cut off by short-circuiting are absent.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TraceNode {
    pub label: String,
    pub passed: bool,
    pub note: Option<String>,
    pub children: Vec<TraceNode>,
}

impl TraceNode {
    pub fn leaf(label: impl Into<String>, passed: bool, note: Option<String>) -> Self {
        Self {
            label: label.into(),
            passed,
            note,
            children: Vec::new(),
        }
    }

    pub fn branch(label: impl Into<String>, passed: bool, children: Vec<TraceNode>) -> Self {
        Self {
            label: label.into(),
            passed,
            note: None,
            children,
        }
    }

    /// Depth-first count of nodes, this one included.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(TraceNode::node_count).sum::<usize>()
    }

    /// Finds the first node with `label`, depth first.
    pub fn find(&self, label: &str) -> Option<&TraceNode> {
        if self.label == label {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(label))
    }
}
