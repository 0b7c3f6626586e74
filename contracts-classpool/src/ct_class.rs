//! Resolved class descriptions

use crate::class_file::{ClassFileHeader, ACC_ABSTRACT, ACC_INTERFACE, ACC_PUBLIC};
use contracts_core::ClassName;
use std::fmt;
use std::sync::Arc;

/// A resolved class with its supertypes already resolved
///
/// Instances are shared through `Arc` and never change after creation, so
/// a pool can hand out the same instance to every caller.
#[derive(Clone)]
pub struct CtClass {
    name: ClassName,
    /// Where the class was loaded from; `None` for synthesized classes
    origin: Option<String>,
    access_flags: u16,
    super_class: Option<Arc<CtClass>>,
    interfaces: Vec<Arc<CtClass>>,
    component_type: Option<Arc<CtClass>>,
}

impl CtClass {
    pub fn primitive(name: ClassName) -> Self {
        Self {
            name,
            origin: None,
            access_flags: ACC_PUBLIC | ACC_ABSTRACT,
            super_class: None,
            interfaces: Vec::new(),
            component_type: None,
        }
    }

    /// An array class; its supertypes are always `Object`, `Cloneable` and
    /// `Serializable`
    pub fn array(
        component_type: Arc<CtClass>,
        object: Arc<CtClass>,
        interfaces: Vec<Arc<CtClass>>,
    ) -> Self {
        Self {
            name: component_type.name.with_array_depth(component_type.name.array_depth() + 1),
            origin: None,
            access_flags: ACC_PUBLIC | ACC_ABSTRACT,
            super_class: Some(object),
            interfaces,
            component_type: Some(component_type),
        }
    }

    pub fn loaded(
        name: ClassName,
        header: &ClassFileHeader,
        origin: impl Into<String>,
        super_class: Option<Arc<CtClass>>,
        interfaces: Vec<Arc<CtClass>>,
    ) -> Self {
        Self {
            name,
            origin: Some(origin.into()),
            access_flags: header.access_flags,
            super_class,
            interfaces,
            component_type: None,
        }
    }

    pub fn name(&self) -> &ClassName {
        &self.name
    }

    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    pub fn access_flags(&self) -> u16 {
        self.access_flags
    }

    pub fn super_class(&self) -> Option<&Arc<CtClass>> {
        self.super_class.as_ref()
    }

    pub fn interfaces(&self) -> &[Arc<CtClass>] {
        &self.interfaces
    }

    pub fn component_type(&self) -> Option<&Arc<CtClass>> {
        self.component_type.as_ref()
    }

    pub fn is_primitive(&self) -> bool {
        self.name.is_primitive()
    }

    pub fn is_array(&self) -> bool {
        self.name.is_array()
    }

    pub fn is_interface(&self) -> bool {
        self.access_flags & ACC_INTERFACE != 0
    }

    /// The superclass chain, nearest first
    pub fn superclasses(&self) -> impl Iterator<Item = &CtClass> {
        std::iter::successors(self.super_class.as_deref(), |c| c.super_class.as_deref())
    }

    /// Whether values of this class can be assigned to `target`
    pub fn is_subtype_of(&self, target: &ClassName) -> bool {
        if &self.name == target {
            return true;
        }
        self.super_class
            .iter()
            .chain(&self.interfaces)
            .any(|s| s.is_subtype_of(target))
    }
}

impl PartialEq for CtClass {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for CtClass {}

impl fmt::Debug for CtClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CtClass")
            .field("name", &self.name.to_string())
            .field("origin", &self.origin)
            .field("super_class", &self.super_class.as_ref().map(|s| s.name.to_string()))
            .field(
                "interfaces",
                &self.interfaces.iter().map(|i| i.name.to_string()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl fmt::Display for CtClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
