//! End-to-end compilation tests

use contracts_core::{
    ArithmeticKind, Ast, BitwiseKind, ClassName, EqualityKind, LiteralValue, LogicalKind, Node,
    NodeId, NodeKind, Position, RelationalKind, ShiftKind, UnaryKind, Visitor,
};
use contracts_parser::{compile, Compilation, ParseError};
use pretty_assertions::assert_eq;

fn pos(line: u32, column: u32) -> Position {
    Position::new(line, column).unwrap()
}

fn compiled(source: &str) -> Compilation {
    match compile(source) {
        Ok(compilation) => compilation,
        Err(err) => panic!("{source:?} failed to compile: {err}"),
    }
}

fn sexpr(source: &str) -> String {
    let compilation = compiled(source);
    compilation.ast.to_sexpr(compilation.root)
}

/// Expression asserted by the precondition
fn precondition_expression(compilation: &Compilation) -> NodeId {
    let ast = &compilation.ast;
    match ast.node(compilation.root) {
        Some(Node::Clause {
            precondition: Some(pre),
            ..
        }) => match ast.node(*pre) {
            Some(Node::Assertion { expression, .. }) => *expression,
            other => panic!("precondition is not an assertion: {other:?}"),
        },
        other => panic!("root is not a clause with precondition: {other:?}"),
    }
}

fn messages(err: &ParseError) -> Vec<String> {
    err.diagnostics().iter().map(|d| d.to_string()).collect()
}

// ===== Tree Shape Tests =====

#[test]
fn test_guard_expression() {
    assert_eq!(
        sexpr("a > 0 && (b == null || b.isValid())"),
        "(CLAUSE (ASSERTION (LOGICAL_OP AND (RELATIONAL_OP GT (ID_REFERENCE a) (LITERAL 0)) \
         (LOGICAL_OP OR (EQUALITY_OP EQUAL (ID_REFERENCE b) (LITERAL null)) \
         (METHOD_CALL isValid (ID_REFERENCE b))))))"
    );
}

#[test]
fn test_empty_clause() {
    assert_eq!(sexpr(""), "(CLAUSE)");
    assert_eq!(sexpr("   "), "(CLAUSE)");
}

#[test]
fn test_postconditions_in_order() {
    assert_eq!(
        sexpr("=> x; finally y; z()"),
        "(CLAUSE (ASSERTION (ID_REFERENCE x)) (ASSERTION finally (ID_REFERENCE y)) \
         (ASSERTION (METHOD_CALL z)))"
    );
}

#[test]
fn test_throw_forms() {
    assert_eq!(
        sexpr("=> throw IllegalArgumentException as e e != null"),
        "(CLAUSE (THROW IllegalArgumentException as e (EQUALITY_OP NOT_EQUAL \
         (ID_REFERENCE e) (LITERAL null))))"
    );

    let compilation = compiled("=> throw java.lang.IllegalStateException");
    let throw = compilation
        .ast
        .iter()
        .find_map(|(_, node)| match node {
            Node::Throw { exception, .. } => Some(exception.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(
        throw,
        ClassName::for_binary("java.lang.IllegalStateException").unwrap()
    );
}

#[test]
fn test_if_forms() {
    assert_eq!(
        sexpr("if (x < 0) throw java.lang.IllegalArgumentException"),
        "(CLAUSE (IF_EXPRESSION (RELATIONAL_OP LT (ID_REFERENCE x) (LITERAL 0)) \
         (THROW java.lang.IllegalArgumentException)))"
    );
    assert_eq!(
        sexpr("if (a) b"),
        "(CLAUSE (ASSERTION (IMPLY (ID_REFERENCE a) (ID_REFERENCE b))))"
    );
    assert_eq!(
        sexpr("=> if (a) finally b"),
        "(CLAUSE (IF_EXPRESSION (ID_REFERENCE a) (ASSERTION finally (ID_REFERENCE b))))"
    );
    assert_eq!(
        sexpr("x && (if (a) b)"),
        "(CLAUSE (ASSERTION (LOGICAL_OP AND (ID_REFERENCE x) \
         (IMPLY (ID_REFERENCE a) (ID_REFERENCE b)))))"
    );
}

#[test]
fn test_conditional_and_unary() {
    assert_eq!(
        sexpr("a ? -1 : !b"),
        "(CLAUSE (ASSERTION (CONDITIONAL_OP (ID_REFERENCE a) (UNARY_OP NEG (LITERAL 1)) \
         (UNARY_OP LOGICAL_NOT (ID_REFERENCE b)))))"
    );
}

#[test]
fn test_array_access_and_arguments() {
    assert_eq!(
        sexpr("m(a, b[1]).f"),
        "(CLAUSE (ASSERTION (ID_REFERENCE f (METHOD_CALL m (ID_REFERENCE a) \
         (ARRAY_ACCESS (ID_REFERENCE b) (LITERAL 1))))))"
    );
}

// ===== Operator Mapping Tests =====

fn binary_node(source: &str) -> Node {
    let compilation = compiled(source);
    let id = precondition_expression(&compilation);
    compilation.ast.node(id).cloned().unwrap()
}

#[test]
fn test_every_binary_operator_maps_to_its_kind() {
    for &kind in LogicalKind::ALL {
        let node = binary_node(&format!("a {} b", kind.symbol()));
        assert!(matches!(node, Node::LogicalOp { kind: k, .. } if k == kind), "{kind}");
    }
    for &kind in BitwiseKind::ALL {
        let node = binary_node(&format!("a {} b", kind.symbol()));
        assert!(matches!(node, Node::BitwiseOp { kind: k, .. } if k == kind), "{kind}");
    }
    for &kind in EqualityKind::ALL {
        let node = binary_node(&format!("a {} b", kind.symbol()));
        assert!(matches!(node, Node::EqualityOp { kind: k, .. } if k == kind), "{kind}");
    }
    for &kind in RelationalKind::ALL {
        let node = binary_node(&format!("a {} b", kind.symbol()));
        assert!(matches!(node, Node::RelationalOp { kind: k, .. } if k == kind), "{kind}");
    }
    for &kind in ShiftKind::ALL {
        let node = binary_node(&format!("a {} b", kind.symbol()));
        assert!(matches!(node, Node::ShiftOp { kind: k, .. } if k == kind), "{kind}");
    }
    for &kind in ArithmeticKind::ALL {
        let node = binary_node(&format!("a {} b", kind.symbol()));
        assert!(matches!(node, Node::ArithmeticOp { kind: k, .. } if k == kind), "{kind}");
    }
}

#[test]
fn test_every_unary_operator_maps_to_its_kind() {
    for &kind in UnaryKind::ALL {
        let node = binary_node(&format!("{}a", kind.symbol()));
        assert!(matches!(node, Node::UnaryOp { kind: k, .. } if k == kind), "{kind}");
    }
}

#[test]
fn test_precedence_ladder() {
    assert_eq!(
        sexpr("a | b ^ c & d == e < f << g + h * i"),
        "(CLAUSE (ASSERTION (BITWISE_OP OR (ID_REFERENCE a) (BITWISE_OP XOR (ID_REFERENCE b) \
         (BITWISE_OP AND (ID_REFERENCE c) (EQUALITY_OP EQUAL (ID_REFERENCE d) \
         (RELATIONAL_OP LT (ID_REFERENCE e) (SHIFT_OP LEFT (ID_REFERENCE f) \
         (ARITHMETIC_OP ADD (ID_REFERENCE g) (ARITHMETIC_OP MUL (ID_REFERENCE h) \
         (ID_REFERENCE i)))))))))))"
    );
}

// ===== Literal Tests =====

fn literal_value(source: &str) -> LiteralValue {
    match binary_node(source) {
        Node::Literal(literal) => literal.value().clone(),
        other => panic!("{source:?} is not a literal: {other:?}"),
    }
}

#[test]
fn test_literal_values() {
    assert_eq!(literal_value("123L"), LiteralValue::Long(123));
    assert_eq!(literal_value("0x10"), LiteralValue::Int(16));
    assert_eq!(literal_value("2.5f"), LiteralValue::Float(2.5));
    assert_eq!(literal_value("2.5"), LiteralValue::Double(2.5));
    assert_eq!(literal_value(r#""\u0041""#), LiteralValue::String("A".into()));
    assert_eq!(literal_value(r"'\101'c"), LiteralValue::Char('A'));
    assert_eq!(literal_value("'abc'"), LiteralValue::String("abc".into()));
    assert_eq!(literal_value("false"), LiteralValue::Boolean(false));
}

#[test]
fn test_out_of_range_literal_fails_compilation() {
    let err = compile("x == 2147483648").unwrap_err();
    assert_eq!(
        messages(&err),
        vec!["1:5: integer/long literal out of range: 2147483648"]
    );
}

// ===== Fail-Fast Tests =====

#[test]
fn test_syntax_error_fails_compilation() {
    let err = compile("a > && b").unwrap_err();
    assert!(matches!(err, ParseError::Syntax { .. }));
    assert_eq!(
        messages(&err),
        vec!["1:4: no viable alternative at input '&&'"]
    );
}

#[test]
fn test_all_diagnostics_are_reported_in_order() {
    let err = compile("=> a > ; b +").unwrap_err();
    assert_eq!(
        messages(&err),
        vec![
            "1:7: no viable alternative at input ';'",
            "1:12: no viable alternative at input '<EOF>'",
        ]
    );
}

#[test]
fn test_lexical_error_fails_compilation() {
    let err = compile("a # 1").unwrap_err();
    assert_eq!(err.diagnostics()[0].message, "token recognition error at: '#'");
}

#[test]
fn test_error_on_later_line() {
    let err = compile("a > 0 &&\n   b ==").unwrap_err();
    assert_eq!(err.diagnostics()[0].position, pos(2, 7));
}

#[test]
fn test_long_operator_chain_is_rejected() {
    let chain = format!("a{}", " + a".repeat(50_000));
    let err = compile(&chain).unwrap_err();
    assert!(matches!(err, ParseError::Syntax { .. }));
    assert_eq!(err.diagnostics().len(), 1);
    assert!(err.diagnostics()[0]
        .message
        .contains("exceeds maximum depth of 100"));
}

#[test]
fn test_long_selector_chain_is_rejected() {
    let chain = format!("a{}", ".b".repeat(50_000));
    let err = compile(&chain).unwrap_err();
    assert!(matches!(err, ParseError::Syntax { .. }));
    assert!(err.diagnostics()[0]
        .message
        .contains("exceeds maximum depth of 100"));
}

#[test]
fn test_operator_chain_within_limit_compiles() {
    let chain = format!("a{}", " + a".repeat(50));
    let compilation = compiled(&chain);
    assert!(!compilation.ast.has_errors());
}

// ===== Position Tests =====

fn root_position(source: &str) -> Position {
    let compilation = compiled(source);
    compilation.ast.position(compilation.root).unwrap()
}

#[test]
fn test_clause_positions() {
    assert_eq!(root_position("a\n  && b => c"), pos(2, 2));
    assert_eq!(root_position("  => c"), pos(1, 2));
    assert_eq!(root_position(""), pos(1, 0));
}

#[test]
fn test_node_positions() {
    let compilation = compiled("if (a) b.c");
    let ast = &compilation.ast;
    let imply = precondition_expression(&compilation);
    // The implication sits at its condition
    assert_eq!(ast.position(imply), Some(pos(1, 4)));
    let [_, implied] = ast.children(imply) else {
        panic!("implication has two children");
    };
    assert_eq!(ast.position(*implied), Some(pos(1, 9)));
}

// ===== Tree Utility Tests =====

#[test]
fn test_structural_equality_ignores_layout() {
    let a = compiled("a > 0 && b");
    let b = compiled("a  >  0\n&&  b");
    let c = compiled("a > 1 && b");
    assert!(a.ast.structurally_equal(a.root, &b.ast, b.root));
    assert!(!a.ast.structurally_equal(a.root, &c.ast, c.root));
}

#[derive(Default)]
struct IdentifierCollector {
    names: Vec<String>,
}

impl Visitor for IdentifierCollector {
    fn visit_node(&mut self, ast: &Ast, node_id: NodeId, node: &Node) {
        if let Node::IdReference { identifier, .. } = node {
            self.names.push(identifier.clone());
        }
        self.visit_children(ast, node_id);
    }
}

#[test]
fn test_visitor_walks_compiled_tree() {
    let compilation = compiled("a.b > c => d[e]");
    let mut collector = IdentifierCollector::default();
    collector.visit_ast(&compilation.ast);
    assert_eq!(collector.names, vec!["b", "a", "c", "d", "e"]);
    assert!(compilation
        .ast
        .iter()
        .all(|(_, node)| node.kind() != NodeKind::Blank));
}
