use crate::location;

use super::kind::AstNodeKind;

/// Identity of a syntax node. Two structurally identical nodes built by the
/// parser still carry distinct ids, and the lowering guard keys on this.
pub type NodeId = usize;

#[derive(Clone, PartialEq)]
pub struct AstNode {
    id: NodeId,
    pub kind: AstNodeKind,
    pub location: Option<location::Location>,
    pub span: Option<location::Span>,
}

impl AstNode {

    fn create_id() -> NodeId {
        use std::sync::atomic::{AtomicUsize, Ordering};
        static COUNTER: AtomicUsize = AtomicUsize::new(1);
        COUNTER.fetch_add(1, Ordering::Relaxed)
    }

    pub fn new(
        node_type: AstNodeKind,
        location: Option<location::Location>,
        span: Option<location::Span>,
    ) -> Self {
        AstNode {
            id: Self::create_id(),
            kind: node_type,
            location,
            span,
        }
    }

    /// Node without source position, used by hand-built trees.
    pub fn bare(kind: AstNodeKind) -> Self {
        Self::new(kind, None, None)
    }

    pub fn get_id(&self) -> NodeId {
        self.id
    }
    pub fn get_kind(&self) -> &AstNodeKind {
        &self.kind
    }
    pub fn get_location(&self) -> Option<&crate::location::Location> {
        self.location.as_ref()
    }
    pub fn get_span(&self) -> Option<&crate::location::Span> {
        self.span.as_ref()
    }
}

use std::fmt;

impl fmt::Display for AstNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(loc) => write!(f, "{}#{} at {}", self.kind, self.id, loc),
            None => write!(f, "{}#{}", self.kind, self.id),
        }
    }
}

impl fmt::Debug for AstNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // `{:#?}` dumps the whole subtree; positions are reduced to line:column.
        let position = self
            .location
            .as_ref()
            .map(|loc| format!("{}:{}", loc.line, loc.column))
            .unwrap_or_else(|| "-".to_string());
        f.debug_struct("AstNode")
            .field("id", &self.id)
            .field("at", &position)
            .field("kind", &self.kind)
            .finish()
    }
}
