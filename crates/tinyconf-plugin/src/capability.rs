use tinyconf_tree::Path;

/// A permission declared by a transform when it is registered.
///
/// Write capabilities are scoped: `Set(server)` allows setting
/// `server.port` but not `client.port`. The root path grants the whole
/// document.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Capability {
    Read,
    Set(Path),
    Insert(Path),
    Delete(Path),
    Reorder(Path),
    Rename(Path),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Operation {
    Read,
    Set,
    Insert,
    Delete,
    Reorder,
    Rename,
}

impl Operation {
    pub(crate) fn name(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Set => "set",
            Self::Insert => "insert into",
            Self::Delete => "delete",
            Self::Reorder => "reorder",
            Self::Rename => "rename",
        }
    }
}

impl Capability {
    pub(crate) fn allows(&self, operation: Operation, path: &Path) -> bool {
        let scope = match (self, operation) {
            (Self::Read, Operation::Read) => return true,
            (Self::Set(scope), Operation::Set)
            | (Self::Insert(scope), Operation::Insert)
            | (Self::Delete(scope), Operation::Delete)
            | (Self::Reorder(scope), Operation::Reorder)
            | (Self::Rename(scope), Operation::Rename) => scope,
            _ => return false,
        };
        path.starts_with(scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_capabilities_are_prefix_scoped() {
        let set = Capability::Set(Path::from(["server"]));
        assert!(set.allows(Operation::Set, &Path::from(["server", "port"])));
        assert!(set.allows(Operation::Set, &Path::from(["server"])));
        assert!(!set.allows(Operation::Set, &Path::from(["client", "port"])));
        assert!(!set.allows(Operation::Delete, &Path::from(["server", "port"])));
        assert!(!set.allows(Operation::Read, &Path::root()));

        assert!(Capability::Delete(Path::root()).allows(Operation::Delete, &Path::from(["a"])));
        assert!(Capability::Read.allows(Operation::Read, &Path::from(["a"])));
    }
}
