//! ASCII tree rendering for page outlines and menus.

/// A labelled node ready for rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub label: String,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn leaf(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(label: impl Into<String>, children: Vec<TreeNode>) -> Self {
        Self {
            label: label.into(),
            children,
        }
    }
}

/// Render a forest as ASCII art.
///
/// Example output:
/// ```text
/// Services
/// ├── Web Design
/// ├── SEO Audit
/// │   └── Local SEO
/// └── Pricing
/// ```
pub fn render_tree(nodes: &[TreeNode]) -> String {
    let mut output = String::new();
    for node in nodes {
        output.push_str(&node.label);
        output.push('\n');
        render_children(&mut output, &node.children, "");
    }
    output
}

fn render_children(output: &mut String, children: &[TreeNode], prefix: &str) {
    for (i, child) in children.iter().enumerate() {
        let is_last = i == children.len() - 1;
        let branch = if is_last { "└── " } else { "├── " };
        output.push_str(prefix);
        output.push_str(branch);
        output.push_str(&child.label);
        output.push('\n');

        let continuation = if is_last { "    " } else { "│   " };
        render_children(output, &child.children, &format!("{}{}", prefix, continuation));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_root() {
        assert_eq!(render_tree(&[TreeNode::leaf("About")]), "About\n");
    }

    #[test]
    fn test_multiple_roots() {
        let output = render_tree(&[TreeNode::leaf("About"), TreeNode::leaf("Contact")]);
        assert_eq!(output, "About\nContact\n");
    }

    #[test]
    fn test_nested_children() {
        let tree = vec![TreeNode::with_children(
            "Services",
            vec![
                TreeNode::leaf("Web Design"),
                TreeNode::with_children(
                    "SEO Audit",
                    vec![TreeNode::leaf("Local SEO"), TreeNode::leaf("Technical SEO")],
                ),
                TreeNode::leaf("Pricing"),
            ],
        )];
        let expected = "Services\n├── Web Design\n├── SEO Audit\n│   ├── Local SEO\n│   └── Technical SEO\n└── Pricing\n";
        assert_eq!(render_tree(&tree), expected);
    }
}
