//! Caching, delegating class resolver

use crate::class_file::ClassFileHeader;
use crate::ct_class::CtClass;
use crate::error::{NotFoundError, Result};
use crate::source::{ClassLocation, ClassSource};
use contracts_core::ClassName;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::fmt;
use std::io;
use std::sync::Arc;
use tracing::{debug, trace};

#[derive(Default)]
struct PoolState {
    sources: Vec<Arc<dyn ClassSource>>,
    classes: FxHashMap<ClassName, Arc<CtClass>>,
}

/// Resolves class names to linked [`CtClass`]es
///
/// Lookups go to the cache first, then to the parent pool, then to this
/// pool's sources in the order they were added. Resolved classes are cached
/// for the lifetime of the pool and every lookup of the same name returns
/// the same `Arc`.
///
/// The pool lock only guards the cache and the source list. It is released
/// before calling the parent, reading from sources or resolving supertypes.
pub struct ClassPool {
    parent: Option<Arc<ClassPool>>,
    state: Mutex<PoolState>,
}

impl ClassPool {
    pub fn new(parent: Option<Arc<ClassPool>>) -> Self {
        Self {
            parent,
            state: Mutex::new(PoolState::default()),
        }
    }

    /// A root pool reading from the given sources
    pub fn with_sources<I, S>(sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ClassSource + 'static,
    {
        let pool = Self::new(None);
        for source in sources {
            pool.add_source(source);
        }
        pool
    }

    pub fn add_source(&self, source: impl ClassSource + 'static) {
        self.add_shared_source(Arc::new(source));
    }

    /// Adds a source that may also be used by other pools
    pub fn add_shared_source(&self, source: Arc<dyn ClassSource>) {
        debug!("Adding class source {:?}", source);
        self.state.lock().sources.push(source);
    }

    pub fn parent(&self) -> Option<&Arc<ClassPool>> {
        self.parent.as_ref()
    }

    /// Whether `name` is already resolved in this pool
    pub fn contains(&self, name: &ClassName) -> bool {
        self.state.lock().classes.contains_key(name)
    }

    /// Number of classes cached by this pool, not counting the parent
    pub fn len(&self) -> usize {
        self.state.lock().classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().classes.is_empty()
    }

    pub fn get(&self, name: &ClassName) -> Result<Arc<CtClass>> {
        self.resolve(name, &mut Vec::new())
    }

    /// `loading` holds the classes whose supertypes are being resolved
    fn resolve(&self, name: &ClassName, loading: &mut Vec<ClassName>) -> Result<Arc<CtClass>> {
        if name.is_array() && name.code() == ClassName::VOID.code() {
            return Err(NotFoundError::NotFound { name: name.clone() });
        }
        if let Some(class) = self.cached(name) {
            return Ok(class);
        }

        if let Some(parent) = &self.parent {
            match parent.get(name) {
                Ok(class) => return Ok(class),
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(e),
            }
        }

        let class = if let Some(element) = name.element_type() {
            let component = self.resolve(&element, loading)?;
            let object = self.resolve(&ClassName::OBJECT, loading)?;
            let interfaces = vec![
                self.resolve(&ClassName::CLONEABLE, loading)?,
                self.resolve(&ClassName::SERIALIZABLE, loading)?,
            ];
            CtClass::array(component, object, interfaces)
        } else if name.is_primitive() {
            CtClass::primitive(name.clone())
        } else {
            self.load(name, loading)?
        };

        Ok(self.intern(class))
    }

    fn cached(&self, name: &ClassName) -> Option<Arc<CtClass>> {
        let state = self.state.lock();
        match state.classes.get(name) {
            Some(class) => {
                trace!("Cache hit for class: {}", name);
                Some(class.clone())
            }
            None => {
                trace!("Cache miss for class: {}", name);
                None
            }
        }
    }

    /// Caches `class` unless another thread got there first
    fn intern(&self, class: CtClass) -> Arc<CtClass> {
        let mut state = self.state.lock();
        state
            .classes
            .entry(class.name().clone())
            .or_insert_with(|| Arc::new(class))
            .clone()
    }

    fn load(&self, name: &ClassName, loading: &mut Vec<ClassName>) -> Result<CtClass> {
        if loading.contains(name) {
            return Err(NotFoundError::Circular { name: name.clone() });
        }

        let (location, header) = self.read_header(name)?;
        let found = header.name().map_err(|e| NotFoundError::Malformed {
            name: name.clone(),
            source: e.into(),
        })?;
        if &found != name {
            return Err(NotFoundError::Mismatch {
                expected: name.clone(),
                found,
            });
        }

        loading.push(name.clone());
        let supertypes = self.resolve_supertypes(name, &header, loading);
        loading.pop();
        let (super_class, interfaces) = supertypes?;

        debug!("Loaded class {} from {}", name, location);
        Ok(CtClass::loaded(
            name.clone(),
            &header,
            location.to_string(),
            super_class,
            interfaces,
        ))
    }

    fn read_header(&self, name: &ClassName) -> Result<(ClassLocation, ClassFileHeader)> {
        let sources = self.state.lock().sources.clone();
        let io_error = |source: io::Error| NotFoundError::Io {
            name: name.clone(),
            source,
        };

        for source in &sources {
            let Some(location) = source.find_class(name).map_err(io_error)? else {
                continue;
            };
            let bytes = location.read().map_err(io_error)?;
            let header = ClassFileHeader::parse(&bytes).map_err(|source| NotFoundError::Malformed {
                name: name.clone(),
                source,
            })?;
            return Ok((location, header));
        }
        Err(NotFoundError::NotFound { name: name.clone() })
    }

    fn resolve_supertypes(
        &self,
        name: &ClassName,
        header: &ClassFileHeader,
        loading: &mut Vec<ClassName>,
    ) -> Result<(Option<Arc<CtClass>>, Vec<Arc<CtClass>>)> {
        let mut resolve_internal = |internal: &str| -> Result<Arc<CtClass>> {
            let supertype =
                ClassName::for_internal(internal).map_err(|e| NotFoundError::Malformed {
                    name: name.clone(),
                    source: e.into(),
                })?;
            self.resolve(&supertype, loading)
        };

        let super_class = header
            .super_class
            .as_deref()
            .map(&mut resolve_internal)
            .transpose()?;
        let interfaces = header
            .interfaces
            .iter()
            .map(|i| resolve_internal(i.as_str()))
            .collect::<Result<Vec<_>>>()?;
        Ok((super_class, interfaces))
    }
}

impl Default for ClassPool {
    fn default() -> Self {
        Self::new(None)
    }
}

impl fmt::Debug for ClassPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ClassPool")
            .field("parent", &self.parent.is_some())
            .field("sources", &state.sources)
            .field("classes", &state.classes.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
