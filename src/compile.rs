//! Lowers a parsed pattern into a node chain.
//!
//! The chain is built back to front: every node is created after the node
//! that follows it, so `next` is always known.

use log::debug;

use crate::ast::{ClassItem, ClassNode, RegexNode};
use crate::class::{case_variants, CharClass};
use crate::decompose::{compose, Decomposition};
use crate::flags::Flags;
use crate::line::LineTerminator;
use crate::matcher::{Limits, Program};
use crate::node::{Anchor, Leaf, Node, NodeId};
use crate::quantifier::{Policy, Quantifier};

pub struct Compiler {
    flags: Flags,
    line: &'static LineTerminator,
    limits: Limits,
    auto_possessive: bool,
    nodes: Vec<Node>,
}

impl Compiler {
    pub fn new(flags: Flags) -> Compiler {
        Compiler {
            flags,
            line: LineTerminator::from_flags(flags),
            limits: Limits::default(),
            auto_possessive: true,
            nodes: Vec::new(),
        }
    }

    pub fn limits(mut self, limits: Limits) -> Compiler {
        self.limits = limits;
        self
    }

    /// Turn greedy leaf repetitions that can never give anything useful back
    /// into possessive ones.
    pub fn auto_possessive(mut self, yes: bool) -> Compiler {
        self.auto_possessive = yes;
        self
    }

    pub fn compile(mut self, ast: &RegexNode) -> Program {
        let done = self.push(Node::Final);
        let root = self.node(ast, done);
        debug!(
            "compiled pattern into {} nodes (root {}, flags {:?})",
            self.nodes.len(),
            root,
            self.flags
        );
        Program::new(self.nodes, root, self.flags, self.limits)
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    fn node(&mut self, ast: &RegexNode, next: NodeId) -> NodeId {
        match ast {
            RegexNode::Seq(nodes) => self.seq(nodes, next),
            RegexNode::Alt(branches) => {
                let branches = branches.iter().map(|b| self.node(b, next)).collect();
                self.push(Node::Alternation { branches })
            }
            RegexNode::Group { node, .. } => self.node(node, next),
            RegexNode::Repeat {
                node,
                quantifier,
                policy,
            } => self.repeat(node, *quantifier, *policy, next),
            RegexNode::StartAnchor if self.flags.contains(Flags::MULTILINE) => {
                self.anchor(Anchor::StartOfLine, next)
            }
            RegexNode::StartAnchor | RegexNode::StartOfInput => self.anchor(Anchor::StartOfInput, next),
            RegexNode::EndAnchor if self.flags.contains(Flags::MULTILINE) => {
                self.anchor(Anchor::MultiLineEnd, next)
            }
            RegexNode::EndAnchor | RegexNode::EndOfInputOrLine => self.anchor(Anchor::EndOfLine, next),
            RegexNode::EndOfInput => self.anchor(Anchor::EndOfInput, next),
            RegexNode::Literal(c) => {
                let leaf = self.literal_leaf(*c);
                self.push(Node::Leaf { leaf, next })
            }
            RegexNode::Dot => {
                let leaf = self.dot_leaf();
                self.push(Node::Leaf { leaf, next })
            }
            RegexNode::Class(class) => {
                let leaf = self.class_leaf(class);
                self.push(Node::Leaf { leaf, next })
            }
        }
    }

    fn seq(&mut self, nodes: &[RegexNode], next: NodeId) -> NodeId {
        let mut next = next;
        if self.flags.contains(Flags::CANON_EQ) {
            for node in recompose(nodes).iter().rev() {
                next = self.node(node, next);
            }
        } else {
            for node in nodes.iter().rev() {
                next = self.node(node, next);
            }
        }
        next
    }

    fn anchor(&mut self, anchor: Anchor, next: NodeId) -> NodeId {
        let line = self.line;
        self.push(Node::Anchor { anchor, line, next })
    }

    fn repeat(&mut self, node: &RegexNode, quantifier: Quantifier, policy: Policy, next: NodeId) -> NodeId {
        let inner = unwrap_single(node);
        if let Some(leaf) = self.leaf(inner) {
            if leaf.is_single_char() {
                return self.leaf_repeat(inner, leaf, quantifier, policy, next);
            }
        }
        // The quantifier's id must exist before its body can point back at it.
        let id = self.push(Node::Final);
        let end = self.push(Node::GroupEnd { quantifier: id });
        let body = self.node(node, end);
        self.nodes[id.index()] = Node::CompositeQuantifier {
            body,
            quantifier,
            policy,
            next,
        };
        id
    }

    fn leaf_repeat(
        &mut self,
        inner: &RegexNode,
        leaf: Leaf,
        quantifier: Quantifier,
        policy: Policy,
        next: NodeId,
    ) -> NodeId {
        if matches!(inner, RegexNode::Dot) && policy == Policy::Greedy && quantifier.is_unbounded() {
            if quantifier.min() == 0 {
                return self.dot_star(next);
            }
            if quantifier.min() == 1 {
                let star = self.dot_star(next);
                return self.push(Node::Leaf { leaf, next: star });
            }
        }
        let policy = if policy == Policy::Greedy && self.auto_possessive && self.is_disjoint_from_next(&leaf, next) {
            debug!("repetition before {} cannot backtrack usefully; made possessive", next);
            Policy::Possessive
        } else {
            policy
        };
        let node = match policy {
            Policy::Greedy => Node::GreedyQuantifier { leaf, quantifier, next },
            Policy::Reluctant => Node::ReluctantQuantifier { leaf, quantifier, next },
            Policy::Possessive => Node::PossessiveQuantifier { leaf, quantifier, next },
        };
        self.push(node)
    }

    fn dot_star(&mut self, next: NodeId) -> NodeId {
        if self.flags.contains(Flags::DOTALL) {
            self.push(Node::DotAllQuantifier { next })
        } else {
            let line = self.line;
            self.push(Node::DotQuantifier { line, next })
        }
    }

    /// Whether the node after a repetition of `leaf` is a leaf that can never
    /// accept a character `leaf` accepts.
    fn is_disjoint_from_next(&self, leaf: &Leaf, next: NodeId) -> bool {
        let follow = match &self.nodes[next.index()] {
            Node::Leaf { leaf, .. } => leaf,
            _ => return false,
        };
        match (leaf.class(), follow.class()) {
            (Some(a), Some(b)) => !CharClass::intersects(&a, &b),
            _ => false,
        }
    }

    /// The leaf for a single-character node.
    fn leaf(&self, ast: &RegexNode) -> Option<Leaf> {
        match ast {
            RegexNode::Literal(c) => Some(self.literal_leaf(*c)),
            RegexNode::Dot => Some(self.dot_leaf()),
            RegexNode::Class(class) => Some(self.class_leaf(class)),
            _ => None,
        }
    }

    fn literal_leaf(&self, c: char) -> Leaf {
        let fold = self.flags.contains(Flags::CASE_INSENSITIVE);
        if self.flags.contains(Flags::CANON_EQ) {
            if let Some(d) = Decomposition::new(c, fold) {
                return Leaf::Decomposition(d);
            }
        }
        if fold && case_variants(c).iter().any(Option::is_some) {
            Leaf::CharFold(c)
        } else {
            Leaf::Char(c)
        }
    }

    fn dot_leaf(&self) -> Leaf {
        if self.flags.contains(Flags::DOTALL) {
            Leaf::DotAll
        } else {
            Leaf::Dot(self.line)
        }
    }

    fn class_leaf(&self, class: &ClassNode) -> Leaf {
        Leaf::Class {
            class: build_class(class),
            fold: self.flags.contains(Flags::CASE_INSENSITIVE),
        }
    }
}

/// Strips grouping around a lone node.
fn unwrap_single(node: &RegexNode) -> &RegexNode {
    match node {
        RegexNode::Group { node, .. } => unwrap_single(node),
        RegexNode::Seq(nodes) if nodes.len() == 1 => unwrap_single(&nodes[0]),
        _ => node,
    }
}

/// Merges a literal base letter followed by a literal combining mark into the
/// precomposed literal.
fn recompose(nodes: &[RegexNode]) -> Vec<RegexNode> {
    let mut out: Vec<RegexNode> = Vec::with_capacity(nodes.len());
    for node in nodes {
        if let (Some(RegexNode::Literal(base)), RegexNode::Literal(mark)) = (out.last(), node) {
            if let Some(composed) = compose(*base, *mark) {
                out.pop();
                out.push(RegexNode::Literal(composed));
                continue;
            }
        }
        out.push(node.clone());
    }
    out
}

pub(crate) fn build_class(class: &ClassNode) -> CharClass {
    match class {
        ClassNode::Digit { negated } => negate_if(CharClass::digit(), *negated),
        ClassNode::Word { negated } => negate_if(CharClass::word(), *negated),
        ClassNode::Space { negated } => negate_if(CharClass::space(), *negated),
        ClassNode::Set {
            items,
            intersections,
            negated,
        } => {
            let mut ranges = Vec::new();
            let mut nested = Vec::new();
            for item in items {
                match item {
                    ClassItem::Literal(c) => ranges.push((*c, *c)),
                    ClassItem::Range(lo, hi) => ranges.push((*lo, *hi)),
                    ClassItem::Nested(n) => nested.push(build_class(n)),
                }
            }
            let base = if nested.is_empty() {
                CharClass::from_ranges(ranges)
            } else {
                if !ranges.is_empty() {
                    nested.push(CharClass::from_ranges(ranges));
                }
                if nested.len() == 1 {
                    nested.swap_remove(0)
                } else {
                    CharClass::union(nested)
                }
            };
            let base = if intersections.is_empty() {
                base
            } else {
                let mut operands = vec![base];
                operands.extend(intersections.iter().map(build_class));
                CharClass::intersection(operands)
            };
            negate_if(base, *negated)
        }
    }
}

fn negate_if(class: CharClass, negated: bool) -> CharClass {
    if negated {
        class.negate()
    } else {
        class
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn compile(pattern: &str, flags: Flags) -> Program {
        let ast = Parser::new(pattern).parse().unwrap();
        Compiler::new(flags).compile(&ast)
    }

    fn root(prog: &Program) -> &Node {
        prog.at(prog.root())
    }

    #[test]
    fn dot_star_fast_paths() {
        assert!(matches!(root(&compile(".*a", Flags::empty())), Node::DotQuantifier { .. }));
        assert!(matches!(root(&compile(".*a", Flags::DOTALL)), Node::DotAllQuantifier { .. }));
        assert!(matches!(root(&compile(".*?a", Flags::empty())), Node::ReluctantQuantifier { .. }));
        let prog = compile(".+", Flags::empty());
        match root(&prog) {
            Node::Leaf { leaf: Leaf::Dot(_), next } => {
                assert!(matches!(prog.at(*next), Node::DotQuantifier { .. }));
            }
            other => panic!("unexpected root {:?}", other),
        }
    }

    #[test]
    fn leaf_and_composite_quantifiers() {
        assert!(matches!(root(&compile("a*a", Flags::empty())), Node::GreedyQuantifier { .. }));
        assert!(matches!(root(&compile("(a)*?", Flags::empty())), Node::ReluctantQuantifier { .. }));
        assert!(matches!(
            root(&compile("(ab)*", Flags::empty())),
            Node::CompositeQuantifier { policy: Policy::Greedy, .. }
        ));
        assert!(matches!(
            root(&compile("(?:a|b){2,3}+", Flags::empty())),
            Node::CompositeQuantifier { policy: Policy::Possessive, .. }
        ));
    }

    #[test]
    fn auto_possessive() {
        assert!(matches!(root(&compile("[a-z]*[0-9]", Flags::empty())), Node::PossessiveQuantifier { .. }));
        assert!(matches!(root(&compile("[a-z]*[a0]", Flags::empty())), Node::GreedyQuantifier { .. }));
        assert!(matches!(root(&compile("\\d+x", Flags::empty())), Node::PossessiveQuantifier { .. }));

        let ast = Parser::new("[a-z]*[0-9]").parse().unwrap();
        let prog = Compiler::new(Flags::empty()).auto_possessive(false).compile(&ast);
        assert!(matches!(root(&prog), Node::GreedyQuantifier { .. }));
    }

    #[test]
    fn anchors_follow_multiline() {
        assert!(matches!(
            root(&compile("^", Flags::empty())),
            Node::Anchor { anchor: Anchor::StartOfInput, .. }
        ));
        assert!(matches!(
            root(&compile("^", Flags::MULTILINE)),
            Node::Anchor { anchor: Anchor::StartOfLine, .. }
        ));
        assert!(matches!(
            root(&compile("$", Flags::empty())),
            Node::Anchor { anchor: Anchor::EndOfLine, .. }
        ));
        assert!(matches!(
            root(&compile("$", Flags::MULTILINE)),
            Node::Anchor { anchor: Anchor::MultiLineEnd, .. }
        ));
        assert!(matches!(
            root(&compile("\\Z", Flags::MULTILINE)),
            Node::Anchor { anchor: Anchor::EndOfLine, .. }
        ));
    }

    #[test]
    fn canonical_equivalence_leaves() {
        match root(&compile("e\u{301}", Flags::CANON_EQ)) {
            Node::Leaf { leaf: Leaf::Decomposition(d), .. } => assert_eq!(d.source(), 'é'),
            other => panic!("unexpected root {:?}", other),
        }
        assert!(matches!(
            root(&compile("é*", Flags::CANON_EQ)),
            Node::CompositeQuantifier { .. }
        ));
    }

    #[test]
    fn classes() {
        let class = |p: &str| match Parser::new(p).parse().unwrap() {
            RegexNode::Seq(nodes) => match &nodes[0] {
                RegexNode::Class(c) => build_class(c),
                other => panic!("unexpected node {:?}", other),
            },
            other => panic!("unexpected node {:?}", other),
        };
        let consonants = class("[a-z&&[^aeiou]]");
        assert!(consonants.contains('b'));
        assert!(!consonants.contains('a'));
        let mixed = class("[^\\d_x]");
        assert!(!mixed.contains('5'));
        assert!(!mixed.contains('_'));
        assert!(mixed.contains('y'));
    }
}
