//! Token storage for the rewriting phases
//!
//! Macro expansion and rule application keep replacing subsequences in
//! the middle of a file. `TokenList` is an index-stable arena threaded as
//! a doubly-linked list: splicing costs O(replaced + inserted) regardless
//! of where in the file it happens, removed nodes are tombstoned, and a
//! `NodeId` stays valid across inserts next to it.

use super::lexer::Token;

/// Stable handle to a token inside a [`TokenList`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct Node {
    token: Token,
    prev: Option<usize>,
    next: Option<usize>,
    alive: bool,
}

/// Doubly-linked token arena
#[derive(Debug, Clone, Default)]
pub struct TokenList {
    nodes: Vec<Node>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl TokenList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list from tokens in order
    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        let mut list = Self::new();
        for token in tokens {
            list.push_back(token);
        }
        list
    }

    /// Live tokens in order
    pub fn to_vec(&self) -> Vec<Token> {
        self.iter().map(|(_, t)| t.clone()).collect()
    }

    /// Consume the list, returning live tokens in order
    pub fn into_vec(mut self) -> Vec<Token> {
        let mut out = Vec::with_capacity(self.len);
        let mut cur = self.head;
        while let Some(i) = cur {
            cur = self.nodes[i].next;
            out.push(std::mem::replace(&mut self.nodes[i].token, Token::bare("")));
        }
        out
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn head(&self) -> Option<NodeId> {
        self.head.map(NodeId)
    }

    pub fn tail(&self) -> Option<NodeId> {
        self.tail.map(NodeId)
    }

    pub fn next(
        &self,
        id: NodeId,
    ) -> Option<NodeId> {
        self.nodes[id.0].next.map(NodeId)
    }

    pub fn prev(
        &self,
        id: NodeId,
    ) -> Option<NodeId> {
        self.nodes[id.0].prev.map(NodeId)
    }

    pub fn get(
        &self,
        id: NodeId,
    ) -> &Token {
        &self.nodes[id.0].token
    }

    pub fn is_alive(
        &self,
        id: NodeId,
    ) -> bool {
        self.nodes[id.0].alive
    }

    /// Iterate live tokens with their handles
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            list: self,
            cur: self.head,
        }
    }

    /// Iterate live tokens starting at `id`
    pub fn iter_from(
        &self,
        id: NodeId,
    ) -> Iter<'_> {
        Iter {
            list: self,
            cur: Some(id.0),
        }
    }

    pub fn push_back(
        &mut self,
        token: Token,
    ) -> NodeId {
        let idx = self.alloc(token, self.tail, None);
        match self.tail {
            Some(t) => self.nodes[t].next = Some(idx),
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);
        NodeId(idx)
    }

    /// Insert `token` directly before `at`
    pub fn insert_before(
        &mut self,
        at: NodeId,
        token: Token,
    ) -> NodeId {
        let prev = self.nodes[at.0].prev;
        let idx = self.alloc(token, prev, Some(at.0));
        self.nodes[at.0].prev = Some(idx);
        match prev {
            Some(p) => self.nodes[p].next = Some(idx),
            None => self.head = Some(idx),
        }
        NodeId(idx)
    }

    /// Insert `token` directly after `at`
    pub fn insert_after(
        &mut self,
        at: NodeId,
        token: Token,
    ) -> NodeId {
        let next = self.nodes[at.0].next;
        let idx = self.alloc(token, Some(at.0), next);
        self.nodes[at.0].next = Some(idx);
        match next {
            Some(n) => self.nodes[n].prev = Some(idx),
            None => self.tail = Some(idx),
        }
        NodeId(idx)
    }

    /// Unlink a token, leaving a tombstone; returns the following handle
    pub fn remove(
        &mut self,
        id: NodeId,
    ) -> Option<NodeId> {
        let node = &mut self.nodes[id.0];
        if !node.alive {
            return None;
        }
        node.alive = false;
        let (prev, next) = (node.prev, node.next);
        match prev {
            Some(p) => self.nodes[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.nodes[n].prev = prev,
            None => self.tail = prev,
        }
        self.len -= 1;
        next.map(NodeId)
    }

    /// Replace `count` tokens starting at `first` with `replacement`.
    ///
    /// Returns the handle of the first inserted token, or of the token
    /// after the removed span when the replacement is empty.
    pub fn splice(
        &mut self,
        first: NodeId,
        count: usize,
        replacement: Vec<Token>,
    ) -> Option<NodeId> {
        let mut after = Some(first);
        for _ in 0..count {
            match after {
                Some(id) => after = self.remove(id),
                None => break,
            }
        }
        self.insert_all_before(after, replacement).or(after)
    }

    /// Insert tokens before `at` (or at the end when `at` is `None`),
    /// returning the handle of the first inserted token
    pub fn insert_all_before(
        &mut self,
        at: Option<NodeId>,
        tokens: Vec<Token>,
    ) -> Option<NodeId> {
        let mut first = None;
        for token in tokens {
            let id = match at {
                Some(at) => self.insert_before(at, token),
                None => self.push_back(token),
            };
            first.get_or_insert(id);
        }
        first
    }

    /// Texts of up to `n` live tokens starting at `id`
    pub fn window(
        &self,
        id: NodeId,
        n: usize,
    ) -> Vec<&Token> {
        self.iter_from(id).take(n).map(|(_, t)| t).collect()
    }

    fn alloc(
        &mut self,
        token: Token,
        prev: Option<usize>,
        next: Option<usize>,
    ) -> usize {
        self.nodes.push(Node {
            token,
            prev,
            next,
            alive: true,
        });
        self.len += 1;
        self.nodes.len() - 1
    }
}

/// Iterator over live tokens
pub struct Iter<'a> {
    list: &'a TokenList,
    cur: Option<usize>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (NodeId, &'a Token);

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.cur?;
        let node = &self.list.nodes[idx];
        self.cur = node.next;
        Some((NodeId(idx), &node.token))
    }
}
