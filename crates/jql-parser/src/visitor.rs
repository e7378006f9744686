use crate::ast::Node;
use crate::error::ParseError;
use crate::message::MessageTape;
use crate::message::ParserMessage;

/// What the walk should do after visiting a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Descend into the node's children.
    Continue,
    /// Do not descend into this node's children; continue with siblings.
    Skip,
    /// Stop the entire walk, successfully.
    SkipAll,
}

/// An AST visitor, invoked once per node in depth-first pre-order.
///
/// Children are visited in a deterministic order: `And`/`Or` left then
/// right, `Not`/`Subdoc` into the inner expression; `Expr` is a leaf.
/// Returning an error aborts the walk immediately.
pub trait Visitor {
    fn visit(&mut self, node: &Node) -> Result<Flow, ParseError>;
}

impl<F> Visitor for F
where
    F: FnMut(&Node) -> Result<Flow, ParseError>,
{
    fn visit(&mut self, node: &Node) -> Result<Flow, ParseError> {
        self(node)
    }
}

/// Walk `node` depth-first with `visitor`.
pub fn walk(visitor: &mut dyn Visitor, node: &Node) -> Result<(), ParseError> {
    walk_node(visitor, node).map(|_| ())
}

fn walk_node(visitor: &mut dyn Visitor, node: &Node) -> Result<Flow, ParseError> {
    match visitor.visit(node)? {
        Flow::Skip => return Ok(Flow::Continue),
        Flow::SkipAll => return Ok(Flow::SkipAll),
        Flow::Continue => {}
    }
    match node {
        Node::And { left, right } | Node::Or { left, right } => {
            if walk_node(visitor, left)? == Flow::SkipAll {
                return Ok(Flow::SkipAll);
            }
            walk_node(visitor, right)
        }
        Node::Not { expr } | Node::Subdoc { expr, .. } => walk_node(visitor, expr),
        Node::Expr(_) => Ok(Flow::Continue),
    }
}

/// A visitor that accumulates [`ParserMessage`]s on a [`MessageTape`].
///
/// The callback receives each node together with the tape; after the walk,
/// the messages can be retrieved with [`MessageVisitor::messages`], and the
/// parser surfaces the tape's first error as a compilation failure.
pub struct MessageVisitor {
    f: Box<dyn FnMut(&Node, &mut MessageTape) -> Result<Flow, ParseError>>,
    tape: MessageTape,
}

impl MessageVisitor {
    pub fn new<F>(f: F) -> Self
    where
        F: FnMut(&Node, &mut MessageTape) -> Result<Flow, ParseError> + 'static,
    {
        Self {
            f: Box::new(f),
            tape: MessageTape::new(),
        }
    }

    pub fn messages(&self) -> &[ParserMessage] {
        self.tape.messages()
    }

    pub fn into_messages(self) -> Vec<ParserMessage> {
        self.tape.into_messages()
    }

    pub(crate) fn first_error(&self) -> Option<&ParserMessage> {
        self.tape.first_error()
    }
}

impl Visitor for MessageVisitor {
    fn visit(&mut self, node: &Node) -> Result<Flow, ParseError> {
        (self.f)(node, &mut self.tape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn names(query: &str, flow_on_and: Flow) -> Vec<String> {
        let node = parse(query).unwrap();
        let mut seen = Vec::new();
        let mut visitor = |n: &Node| -> Result<Flow, ParseError> {
            seen.push(match n {
                Node::And { .. } => "AND".to_string(),
                Node::Or { .. } => "OR".to_string(),
                Node::Not { .. } => "NOT".to_string(),
                Node::Subdoc { .. } => "SUBDOC".to_string(),
                Node::Expr(e) => e.friendly(),
            });
            if matches!(n, Node::And { .. }) {
                return Ok(flow_on_and);
            }
            Ok(Flow::Continue)
        };
        walk(&mut visitor, &node).unwrap();
        seen
    }

    #[test]
    fn depth_first_preorder() {
        let seen = names(r#"a:1 AND b:2 OR !c:3"#, Flow::Continue);
        assert_eq!(seen, vec!["OR", "AND", "a: 1", "b: 2", "NOT", "c: 3"]);
    }

    #[test]
    fn skip_children() {
        let seen = names(r#"a:1 AND b:2 OR !c:3"#, Flow::Skip);
        assert_eq!(seen, vec!["OR", "AND", "NOT", "c: 3"]);
    }

    #[test]
    fn skip_all_stops_walk() {
        let seen = names(r#"a:1 AND b:2 OR !c:3"#, Flow::SkipAll);
        assert_eq!(seen, vec!["OR", "AND"]);
    }

    #[test]
    fn errors_abort() {
        let node = parse("a:1 AND b:2").unwrap();
        let mut count = 0;
        let mut visitor = |_: &Node| -> Result<Flow, ParseError> {
            count += 1;
            Err(ParseError::unpositioned("boom"))
        };
        let err = walk(&mut visitor, &node).unwrap_err();
        assert_eq!(err.message, "boom");
        assert_eq!(count, 1);
    }
}
