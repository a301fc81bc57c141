use crate::SyntaxKind;

/// A bitset of token kinds, usable in `const` context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyntaxSet {
    bits: u64,
}

impl SyntaxSet {
    pub const EMPTY: Self = Self { bits: 0 };

    const fn mask(kind: SyntaxKind) -> u64 {
        let bit = kind as u16;
        debug_assert!(bit < u64::BITS as u16, "SyntaxKind no longer fits in a u64 bitset");
        1 << bit
    }

    pub const fn new<const N: usize>(kinds: [SyntaxKind; N]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < kinds.len() {
            bits |= Self::mask(kinds[i]);
            i += 1;
        }
        Self { bits }
    }

    pub const fn union(self, other: &Self) -> Self {
        Self { bits: self.bits | other.bits }
    }

    pub const fn contains(&self, kind: SyntaxKind) -> bool {
        self.bits & Self::mask(kind) != 0
    }

    pub const fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Renders the set as "a, b or c" using [`SyntaxKind::describe`], without
    /// repeating names shared by several kinds.
    pub fn describe(&self) -> String {
        let mut names: Vec<&str> = Vec::new();
        for kind in SyntaxKind::ALL.into_iter().filter(|kind| self.contains(*kind)) {
            let name = kind.describe();
            if !names.contains(&name) {
                names.push(name);
            }
        }

        match names.split_last() {
            None => String::new(),
            Some((last, [])) => (*last).to_string(),
            Some((last, rest)) => format!("{} or {last}", rest.join(", ")),
        }
    }
}
