//! Canonical names for types of the target platform
//!
//! A [`ClassName`] is stored as its internal (slash separated) name plus an
//! array depth and a one letter type code. Binary, internal and descriptor
//! notations are derived from that and parse back to an equal value.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;

/// The notation a class name was written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NameForm {
    /// `java.lang.String`, `[Ljava.lang.String;`
    Binary,
    /// `java/lang/String`, `[Ljava/lang/String;`
    Internal,
    /// `Ljava/lang/String;`, `I`, `[[I`
    Descriptor,
}

impl fmt::Display for NameForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NameForm::Binary => "binary",
            NameForm::Internal => "internal",
            NameForm::Descriptor => "descriptor",
        })
    }
}

/// A textual class name that is not well formed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Illegal {form} class name: '{name}'")]
pub struct IllegalClassNameError {
    pub form: NameForm,
    pub name: String,
}

impl IllegalClassNameError {
    fn new(form: NameForm, name: &str) -> Self {
        Self {
            form,
            name: name.to_string(),
        }
    }
}

const REFERENCE_CODE: char = 'L';

/// A reference to a primitive, class or array type
///
/// Two names are equal when their internal name and array depth are equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClassName {
    name: Cow<'static, str>,
    array_depth: u32,
    code: char,
}

impl ClassName {
    pub const BOOLEAN: ClassName = ClassName::primitive("boolean", 'Z');
    pub const BYTE: ClassName = ClassName::primitive("byte", 'B');
    pub const SHORT: ClassName = ClassName::primitive("short", 'S');
    pub const INT: ClassName = ClassName::primitive("int", 'I');
    pub const LONG: ClassName = ClassName::primitive("long", 'J');
    pub const CHAR: ClassName = ClassName::primitive("char", 'C');
    pub const FLOAT: ClassName = ClassName::primitive("float", 'F');
    pub const DOUBLE: ClassName = ClassName::primitive("double", 'D');
    pub const VOID: ClassName = ClassName::primitive("void", 'V');

    pub const BOOLEAN_WRAPPER: ClassName = ClassName::reference("java/lang/Boolean");
    pub const BYTE_WRAPPER: ClassName = ClassName::reference("java/lang/Byte");
    pub const SHORT_WRAPPER: ClassName = ClassName::reference("java/lang/Short");
    pub const INT_WRAPPER: ClassName = ClassName::reference("java/lang/Integer");
    pub const LONG_WRAPPER: ClassName = ClassName::reference("java/lang/Long");
    pub const CHAR_WRAPPER: ClassName = ClassName::reference("java/lang/Character");
    pub const FLOAT_WRAPPER: ClassName = ClassName::reference("java/lang/Float");
    pub const DOUBLE_WRAPPER: ClassName = ClassName::reference("java/lang/Double");
    pub const VOID_WRAPPER: ClassName = ClassName::reference("java/lang/Void");

    pub const OBJECT: ClassName = ClassName::reference("java/lang/Object");
    pub const STRING: ClassName = ClassName::reference("java/lang/String");
    pub const SERIALIZABLE: ClassName = ClassName::reference("java/io/Serializable");
    pub const CLONEABLE: ClassName = ClassName::reference("java/lang/Cloneable");

    /// All primitive types including `void`
    pub const PRIMITIVES: [ClassName; 9] = [
        Self::BOOLEAN,
        Self::BYTE,
        Self::SHORT,
        Self::INT,
        Self::LONG,
        Self::CHAR,
        Self::FLOAT,
        Self::DOUBLE,
        Self::VOID,
    ];

    const fn primitive(name: &'static str, code: char) -> Self {
        Self {
            name: Cow::Borrowed(name),
            array_depth: 0,
            code,
        }
    }

    const fn reference(name: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            array_depth: 0,
            code: REFERENCE_CODE,
        }
    }

    fn by_code(code: char) -> Option<ClassName> {
        Self::PRIMITIVES.into_iter().find(|p| p.code == code)
    }

    fn by_keyword(name: &str) -> Option<ClassName> {
        Self::PRIMITIVES.into_iter().find(|p| p.name == name)
    }

    /// Parses a binary name such as `java.util.Map.Entry` or `[[I`
    pub fn for_binary(text: &str) -> Result<Self, IllegalClassNameError> {
        Self::parse_named(text, NameForm::Binary, '.')
    }

    /// Parses an internal name such as `java/util/Map` or `[Ljava/lang/String;`
    pub fn for_internal(text: &str) -> Result<Self, IllegalClassNameError> {
        Self::parse_named(text, NameForm::Internal, '/')
    }

    /// Parses a type descriptor such as `I`, `Ljava/lang/String;` or `[[J`
    pub fn for_descriptor(text: &str) -> Result<Self, IllegalClassNameError> {
        let illegal = || IllegalClassNameError::new(NameForm::Descriptor, text);
        match text.chars().next() {
            None => Err(illegal()),
            // array descriptors are identical to internal array names
            Some('[') => Self::parse_named(text, NameForm::Descriptor, '/'),
            Some(REFERENCE_CODE) => {
                let body = reference_body(text).ok_or_else(illegal)?;
                let name = join_segments(body, '/').ok_or_else(illegal)?;
                Ok(Self::owned(name, 0, REFERENCE_CODE))
            }
            Some(code) if text.len() == 1 => Self::by_code(code).ok_or_else(illegal),
            Some(_) => Err(illegal()),
        }
    }

    fn parse_named(text: &str, form: NameForm, separator: char) -> Result<Self, IllegalClassNameError> {
        let illegal = || IllegalClassNameError::new(form, text);
        let rest = text.trim_start_matches('[');
        let depth = u32::try_from(text.len() - rest.len()).map_err(|_| illegal())?;
        if rest.is_empty() {
            return Err(illegal());
        }

        if depth == 0 {
            let name = join_segments(rest, separator).ok_or_else(illegal)?;
            return Ok(Self::by_keyword(&name).unwrap_or_else(|| Self::owned(name, 0, REFERENCE_CODE)));
        }

        if rest.starts_with(REFERENCE_CODE) {
            let body = reference_body(rest).ok_or_else(illegal)?;
            let name = join_segments(body, separator).ok_or_else(illegal)?;
            return Ok(Self::owned(name, depth, REFERENCE_CODE));
        }

        let mut chars = rest.chars();
        match (chars.next(), chars.next()) {
            (Some(code), None) => match Self::by_code(code) {
                Some(element) if element != Self::VOID => Ok(element.with_array_depth(depth)),
                _ => Err(illegal()),
            },
            _ => Err(illegal()),
        }
    }

    fn owned(name: String, array_depth: u32, code: char) -> Self {
        Self {
            name: Cow::Owned(name),
            array_depth,
            code,
        }
    }

    /// Internal name of the element type, e.g. `java/lang/String` or `int`
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn array_depth(&self) -> u32 {
        self.array_depth
    }

    /// Descriptor code of the element type; `L` for references
    pub fn code(&self) -> char {
        self.code
    }

    pub fn is_primitive(&self) -> bool {
        self.array_depth == 0 && self.code != REFERENCE_CODE
    }

    pub fn is_array(&self) -> bool {
        self.array_depth > 0
    }

    /// The same element type at the given array depth
    pub fn with_array_depth(&self, array_depth: u32) -> ClassName {
        ClassName {
            name: self.name.clone(),
            array_depth,
            code: self.code,
        }
    }

    /// The type of this array's elements, one dimension less
    pub fn element_type(&self) -> Option<ClassName> {
        self.array_depth
            .checked_sub(1)
            .map(|depth| self.with_array_depth(depth))
    }

    /// Last segment of the element type's name
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    pub fn to_binary(&self) -> String {
        if self.is_array() {
            self.array_string(&self.name.replace('/', "."))
        } else {
            self.name.replace('/', ".")
        }
    }

    pub fn to_internal(&self) -> String {
        if self.is_array() {
            self.to_descriptor()
        } else {
            self.name.to_string()
        }
    }

    pub fn to_descriptor(&self) -> String {
        if self.is_array() {
            self.array_string(&self.name)
        } else if self.is_primitive() {
            self.code.to_string()
        } else {
            format!("L{};", self.name)
        }
    }

    fn array_string(&self, element_name: &str) -> String {
        let mut out = "[".repeat(self.array_depth as usize);
        if self.code == REFERENCE_CODE {
            out.push(REFERENCE_CODE);
            out.push_str(element_name);
            out.push(';');
        } else {
            out.push(self.code);
        }
        out
    }
}

/// Strips `L` and `;` from a reference descriptor
fn reference_body(text: &str) -> Option<&str> {
    let body = text.strip_prefix(REFERENCE_CODE)?.strip_suffix(';')?;
    (!body.is_empty()).then_some(body)
}

/// Validates every segment and joins them with `/`
fn join_segments(text: &str, separator: char) -> Option<String> {
    let mut out = String::with_capacity(text.len());
    for segment in text.split(separator) {
        if !is_identifier(segment) {
            return None;
        }
        if !out.is_empty() {
            out.push('/');
        }
        out.push_str(segment);
    }
    Some(out)
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' || first == '$' => {
            chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    }
}

impl PartialEq for ClassName {
    fn eq(&self, other: &Self) -> bool {
        self.array_depth == other.array_depth && self.name == other.name
    }
}

impl Eq for ClassName {}

impl Hash for ClassName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.array_depth.hash(state);
    }
}

impl fmt::Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name.replace('/', "."))?;
        for _ in 0..self.array_depth {
            f.write_str("[]")?;
        }
        Ok(())
    }
}

impl TryFrom<String> for ClassName {
    type Error = IllegalClassNameError;

    fn try_from(descriptor: String) -> Result<Self, Self::Error> {
        ClassName::for_descriptor(&descriptor)
    }
}

impl From<ClassName> for String {
    fn from(name: ClassName) -> String {
        name.to_descriptor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_primitive_forms() {
        for primitive in ClassName::PRIMITIVES {
            let descriptor = primitive.to_descriptor();
            assert_eq!(descriptor.len(), 1);
            assert_eq!(ClassName::for_descriptor(&descriptor).unwrap(), primitive);
            assert_eq!(ClassName::for_binary(primitive.name()).unwrap(), primitive);
            assert!(primitive.is_primitive());
        }
        assert_eq!(ClassName::for_binary("int").unwrap().code(), 'I');
    }

    #[test]
    fn test_reference_forms() {
        let name = ClassName::for_binary("pkg.Outer.Inner").unwrap();
        assert_eq!(name.to_binary(), "pkg.Outer.Inner");
        assert_eq!(name.to_internal(), "pkg/Outer/Inner");
        assert_eq!(name.to_descriptor(), "Lpkg/Outer/Inner;");
        assert_eq!(name.simple_name(), "Inner");
        assert!(!name.is_primitive());
        assert_eq!(ClassName::for_descriptor("Ljava/lang/String;").unwrap(), ClassName::STRING);
    }

    #[test]
    fn test_array_forms() {
        let ints = ClassName::for_descriptor("[[I").unwrap();
        assert_eq!(ints, ClassName::INT.with_array_depth(2));
        assert_eq!(ints.to_binary(), "[[I");
        assert_eq!(ints.to_internal(), "[[I");
        assert!(!ints.is_primitive());
        assert_eq!(ints.element_type(), Some(ClassName::INT.with_array_depth(1)));

        let strings = ClassName::for_binary("[Ljava.lang.String;").unwrap();
        assert_eq!(strings.to_internal(), "[Ljava/lang/String;");
        assert_eq!(strings.to_string(), "java.lang.String[]");
        assert_eq!(strings.element_type(), Some(ClassName::STRING));
        assert_eq!(ClassName::STRING.element_type(), None);
    }

    #[test]
    fn test_illegal_names() {
        let cases = [
            (NameForm::Descriptor, ""),
            (NameForm::Descriptor, "Q"),
            (NameForm::Descriptor, "[V"),
            (NameForm::Descriptor, "L;"),
            (NameForm::Descriptor, "Ljava/lang/String"),
            (NameForm::Binary, "java..String"),
            (NameForm::Binary, "java/lang/String"),
            (NameForm::Binary, "[["),
            (NameForm::Internal, "1abc"),
            (NameForm::Internal, "[II"),
        ];
        for (form, text) in cases {
            let result = match form {
                NameForm::Binary => ClassName::for_binary(text),
                NameForm::Internal => ClassName::for_internal(text),
                NameForm::Descriptor => ClassName::for_descriptor(text),
            };
            assert_eq!(result, Err(IllegalClassNameError::new(form, text)), "{text}");
        }
    }

    #[test]
    fn test_with_array_depth_unchanged() {
        let name = ClassName::for_internal("a/B").unwrap();
        assert_eq!(name.with_array_depth(0), name);
        assert_ne!(name.with_array_depth(1), name);
    }

    #[test]
    fn test_serde_uses_descriptor() {
        let name = ClassName::LONG.with_array_depth(1);
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"[J\"");
        let back: ClassName = serde_json::from_str(&json).unwrap();
        assert_eq!(back, name);
        assert!(serde_json::from_str::<ClassName>("\"[V\"").is_err());
    }
}
