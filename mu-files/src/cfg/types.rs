use std::fmt;

/// A node of KSP's text configuration format (`.cfg`, `.craft`).
///
/// Values and child nodes keep their file order and duplicates are allowed: a craft file
/// holds one `PART` node per placed part and parts repeat keys like `link`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigNode {
    pub values: Vec<(String, String)>,
    pub nodes: Vec<(String, ConfigNode)>,
}

impl ConfigNode {
    /// First value stored under `key`.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn values_of<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.values
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn has_value(&self, key: &str) -> bool {
        self.values.iter().any(|(k, _)| k == key)
    }

    pub fn first_value(&self) -> Option<(&str, &str)> {
        self.values.first().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn node(&self, name: &str) -> Option<&ConfigNode> {
        self.nodes.iter().find(|(n, _)| n == name).map(|(_, node)| node)
    }

    pub fn nodes_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ConfigNode> + 'a {
        self.nodes
            .iter()
            .filter(move |(n, _)| n == name)
            .map(|(_, node)| node)
    }

    pub fn first_node(&self) -> Option<(&str, &ConfigNode)> {
        self.nodes.first().map(|(name, node)| (name.as_str(), node))
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let indent = "\t".repeat(depth);
        for (key, value) in &self.values {
            writeln!(f, "{}{} = {}", indent, key, value)?;
        }
        for (name, node) in &self.nodes {
            writeln!(f, "{}{}", indent, name)?;
            writeln!(f, "{}{{", indent)?;
            node.write_indented(f, depth + 1)?;
            writeln!(f, "{}}}", indent)?;
        }
        Ok(())
    }
}

impl fmt::Display for ConfigNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}
