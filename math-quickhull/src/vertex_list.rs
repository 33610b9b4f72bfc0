//! Intrusive vertex lists used to partition the points during construction
//!
//! Every input point gets one [`HullVertex`] in an arena. The `prev`/`next`
//! links of a vertex are owned by whichever [`VertexList`] it currently sits
//! in, so moving vertices between lists never allocates.

use crate::halfedge::FaceId;
use crate::types::Point;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a vertex in the vertex arena (equal to the input point index)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VertexId(pub usize);

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VertexId({})", self.0)
    }
}

/// A point taking part in hull construction
#[derive(Debug, Clone)]
pub(crate) struct HullVertex {
    pub point: Point,
    /// Face that currently sees this vertex
    pub face: Option<FaceId>,
    pub prev: Option<VertexId>,
    pub next: Option<VertexId>,
}

impl HullVertex {
    pub fn new(point: Point) -> Self {
        Self {
            point,
            face: None,
            prev: None,
            next: None,
        }
    }
}

/// Doubly-linked list threaded through the vertex arena
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct VertexList {
    head: Option<VertexId>,
    tail: Option<VertexId>,
}

impl VertexList {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn first(&self) -> Option<VertexId> {
        self.head
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Forget all members. Their links are left as they are.
    pub fn clear(&mut self) {
        self.head = None;
        self.tail = None;
    }

    /// Insert `vertex` in front of `target`
    pub fn insert_before(&mut self, arena: &mut [HullVertex], target: VertexId, vertex: VertexId) {
        let prev = arena[target.0].prev;
        arena[vertex.0].prev = prev;
        arena[vertex.0].next = Some(target);

        match prev {
            None => self.head = Some(vertex),
            Some(p) => arena[p.0].next = Some(vertex),
        }

        arena[target.0].prev = Some(vertex);
    }

    /// Push `vertex` at the tail
    pub fn append(&mut self, arena: &mut [HullVertex], vertex: VertexId) {
        match self.tail {
            None => self.head = Some(vertex),
            Some(t) => arena[t.0].next = Some(vertex),
        }

        arena[vertex.0].prev = self.tail;
        arena[vertex.0].next = None;

        self.tail = Some(vertex);
    }

    /// Splice the chain starting at `vertex` onto the tail. The chain's own
    /// `next` links are followed to find its last member.
    pub fn append_chain(&mut self, arena: &mut [HullVertex], vertex: VertexId) {
        match self.tail {
            None => self.head = Some(vertex),
            Some(t) => arena[t.0].next = Some(vertex),
        }

        arena[vertex.0].prev = self.tail;

        let mut last = vertex;
        while let Some(next) = arena[last.0].next {
            last = next;
        }

        self.tail = Some(last);
    }

    /// Unlink `vertex`; its own links are reset
    pub fn remove(&mut self, arena: &mut [HullVertex], vertex: VertexId) {
        let (prev, next) = (arena[vertex.0].prev, arena[vertex.0].next);

        match prev {
            None => self.head = next,
            Some(p) => arena[p.0].next = next,
        }

        match next {
            None => self.tail = prev,
            Some(n) => arena[n.0].prev = prev,
        }

        arena[vertex.0].prev = None;
        arena[vertex.0].next = None;
    }

    /// Detach the run `a..=b`. The run keeps its inner links and becomes a
    /// free-standing chain (`a.prev` and `b.next` are cleared).
    pub fn remove_chain(&mut self, arena: &mut [HullVertex], a: VertexId, b: VertexId) {
        let (prev, next) = (arena[a.0].prev, arena[b.0].next);

        match prev {
            None => self.head = next,
            Some(p) => arena[p.0].next = next,
        }

        match next {
            None => self.tail = prev,
            Some(n) => arena[n.0].prev = prev,
        }

        arena[a.0].prev = None;
        arena[b.0].next = None;
    }

    /// Iterate over the members from head to tail
    pub fn iter<'a>(&self, arena: &'a [HullVertex]) -> VertexListIter<'a> {
        VertexListIter {
            arena,
            current: self.head,
        }
    }
}

pub(crate) struct VertexListIter<'a> {
    arena: &'a [HullVertex],
    current: Option<VertexId>,
}

impl Iterator for VertexListIter<'_> {
    type Item = VertexId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.arena[id.0].next;
        Some(id)
    }
}
