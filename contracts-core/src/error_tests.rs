use super::*;
use crate::class_name::NameForm;

// ===== Display Tests =====

#[test]
fn test_invalid_position_error() {
    let err = Error::InvalidPosition { line: 0, column: 4 };
    assert_eq!(err.to_string(), "Invalid position 0:4: lines start at 1");
}

#[test]
fn test_ownership_error() {
    let err = Error::Ownership {
        child: NodeId::new(2).unwrap(),
        owner: NodeId::new(5).unwrap(),
    };
    assert_eq!(err.to_string(), "Node n2 is already owned by n5");
}

#[test]
fn test_node_not_found_error() {
    let err = Error::NodeNotFound(NodeId::new(9).unwrap());
    assert_eq!(err.to_string(), "Node n9 does not exist in this tree");
}

#[test]
fn test_incompatible_literal_error() {
    let err = Error::IncompatibleLiteral {
        kind: LiteralKind::Int,
        found: "\"text\"".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "Value \"text\" is not compatible with literal kind INT"
    );
}

#[test]
fn test_not_a_root_error() {
    let err = Error::NotARoot(NodeId::new(1).unwrap());
    assert_eq!(err.to_string(), "Node n1 has a parent and cannot be the root");
}

// ===== Conversion Tests =====

#[test]
fn test_illegal_class_name_is_transparent() {
    let inner = IllegalClassNameError {
        form: NameForm::Descriptor,
        name: "[V".to_string(),
    };
    let err: Error = inner.clone().into();
    assert_eq!(err.to_string(), inner.to_string());
    assert_eq!(err, Error::IllegalClassName(inner));
}

#[test]
fn test_result_alias_propagates() {
    fn positioned() -> Result<crate::Position> {
        let position = crate::Position::new(0, 0)?;
        Ok(position)
    }
    assert!(matches!(positioned(), Err(Error::InvalidPosition { .. })));
}
