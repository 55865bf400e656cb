use crate::clause::{ClauseNode, NodeKey, WhereClause};

/// An iterator that walks a [`WhereClause`] from head to tail by following links.
///
/// Iterative, so arbitrarily long chains are fine. A link pointing outside the arena ends
/// the walk early instead of panicking.
pub struct ChainIter<'a> {
    clause: &'a WhereClause,
    next: Option<NodeKey>,
}

impl<'a> ChainIter<'a> {
    pub(crate) fn new(clause: &'a WhereClause) -> Self {
        Self {
            clause,
            next: Some(clause.head),
        }
    }
}

impl<'a> Iterator for ChainIter<'a> {
    type Item = (NodeKey, &'a ClauseNode);

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.next.take()?;
        let node = self.clause.nodes.get(key)?;
        self.next = node.link.map(|link| link.next);
        Some((key, node))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.next {
            Some(_) => (0, Some(self.clause.nodes.len())),
            None => (0, Some(0)),
        }
    }
}

impl std::iter::FusedIterator for ChainIter<'_> {}
