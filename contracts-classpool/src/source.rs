//! Places class files are looked up in

use crate::class_file::ClassFileHeader;
use contracts_core::{ClassName, IllegalClassNameError};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::trace;

/// Where the bytes of a class live
#[derive(Debug, Clone)]
pub enum ClassLocation {
    File(PathBuf),
    Memory { name: ClassName, bytes: Arc<[u8]> },
}

impl ClassLocation {
    pub fn read(&self) -> io::Result<Vec<u8>> {
        match self {
            ClassLocation::File(path) => fs::read(path),
            ClassLocation::Memory { bytes, .. } => Ok(bytes.to_vec()),
        }
    }
}

impl fmt::Display for ClassLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassLocation::File(path) => write!(f, "{}", path.display()),
            ClassLocation::Memory { name, .. } => write!(f, "memory:{name}"),
        }
    }
}

/// A lookup location for class files
pub trait ClassSource: Send + Sync + fmt::Debug {
    /// Finds the class file for `name`, `Ok(None)` if this source lacks it
    fn find_class(&self, name: &ClassName) -> io::Result<Option<ClassLocation>>;
}

/// Class files laid out by package under a root directory
#[derive(Debug, Clone)]
pub struct FileClassSource {
    root: PathBuf,
}

impl FileClassSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path `java/lang/String` maps to under the root
    pub fn path_for(&self, name: &ClassName) -> PathBuf {
        let mut path = self.root.clone();
        path.extend(name.name().split('/'));
        path.set_extension("class");
        path
    }
}

impl ClassSource for FileClassSource {
    fn find_class(&self, name: &ClassName) -> io::Result<Option<ClassLocation>> {
        if name.is_array() || name.is_primitive() {
            return Ok(None);
        }
        let path = self.path_for(name);
        match fs::metadata(&path) {
            Ok(meta) if meta.is_file() => {
                trace!("Found {} at {}", name, path.display());
                Ok(Some(ClassLocation::File(path)))
            }
            Ok(_) => Ok(None),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Class files held in memory, keyed by class name
#[derive(Default)]
pub struct MemoryClassSource {
    classes: RwLock<FxHashMap<ClassName, Arc<[u8]>>>,
}

impl MemoryClassSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers raw class file bytes under `name`
    pub fn insert(&self, name: ClassName, bytes: impl Into<Arc<[u8]>>) {
        self.classes.write().insert(name, bytes.into());
    }

    /// Registers a generated class file declaring the given binary names
    pub fn define(
        &self,
        binary_name: &str,
        super_class: Option<&str>,
        interfaces: &[&str],
    ) -> Result<ClassName, IllegalClassNameError> {
        self.define_with_flags(binary_name, super_class, interfaces, None)
    }

    /// Like [`define`](Self::define) with explicit access flags
    pub fn define_with_flags(
        &self,
        binary_name: &str,
        super_class: Option<&str>,
        interfaces: &[&str],
        access_flags: Option<u16>,
    ) -> Result<ClassName, IllegalClassNameError> {
        let name = ClassName::for_binary(binary_name)?;
        let super_class = super_class
            .map(|s| ClassName::for_binary(s).map(|n| n.to_internal()))
            .transpose()?;
        let interfaces = interfaces
            .iter()
            .map(|i| ClassName::for_binary(i).map(|n| n.to_internal()))
            .collect::<Result<Vec<_>, _>>()?;
        let interfaces: Vec<&str> = interfaces.iter().map(String::as_str).collect();

        let mut header =
            ClassFileHeader::new(&name.to_internal(), super_class.as_deref(), &interfaces);
        if let Some(flags) = access_flags {
            header = header.with_access_flags(flags);
        }
        self.insert(name.clone(), header.to_bytes());
        Ok(name)
    }

    pub fn len(&self) -> usize {
        self.classes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.read().is_empty()
    }
}

impl fmt::Debug for MemoryClassSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryClassSource")
            .field("classes", &self.len())
            .finish()
    }
}

impl ClassSource for MemoryClassSource {
    fn find_class(&self, name: &ClassName) -> io::Result<Option<ClassLocation>> {
        Ok(self.classes.read().get(name).map(|bytes| ClassLocation::Memory {
            name: name.clone(),
            bytes: bytes.clone(),
        }))
    }
}
