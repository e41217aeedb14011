use playd_protocol::paths;

/// A node in the resource tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A leaf whose content comes from the loaded track.
    Entry,
    /// A listing of child paths, in listing order.
    Directory(Vec<&'static str>),
}

/// Immutable parent-to-child links describing the addressable hierarchy.
///
/// A path with the single child `""` is an entry; any other path with
/// children is a directory. Children are listed in link order.
#[derive(Debug)]
pub struct ResourceTree {
    links: &'static [(&'static str, &'static str)],
}

/// The tree the player serves.
pub static RESOURCES: ResourceTree = ResourceTree::new(&[
    (paths::ROOT, paths::CONTROL),
    (paths::ROOT, paths::PLAYER),
    (paths::CONTROL, paths::STATE),
    (paths::STATE, ""),
    (paths::PLAYER, paths::FILE),
    (paths::PLAYER, paths::TIME),
    (paths::FILE, ""),
    (paths::TIME, paths::ELAPSED),
    (paths::ELAPSED, ""),
]);

impl ResourceTree {
    pub const fn new(links: &'static [(&'static str, &'static str)]) -> Self {
        Self { links }
    }

    pub fn children<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'static str> + 'a {
        self.links
            .iter()
            .filter(move |(parent, _)| *parent == path)
            .map(|(_, child)| *child)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.children(path).next().is_some()
    }

    pub fn lookup(&self, path: &str) -> Option<Node> {
        let children: Vec<&'static str> = self.children(path).collect();
        match children.as_slice() {
            [] => None,
            [""] => Some(Node::Entry),
            _ => Some(Node::Directory(children)),
        }
    }
}
