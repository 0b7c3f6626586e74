use super::*;
use crate::class_file::{ACC_ABSTRACT, ACC_INTERFACE, ACC_PUBLIC};
use crate::error::ClassFormatError;
use crate::source::MemoryClassSource;
use pretty_assertions::assert_eq;
use std::thread;

const INTERFACE: Option<u16> = Some(ACC_PUBLIC | ACC_INTERFACE | ACC_ABSTRACT);

fn name(binary: &str) -> ClassName {
    ClassName::for_binary(binary).unwrap()
}

/// The classes every array and every other class depends on
fn runtime() -> MemoryClassSource {
    let source = MemoryClassSource::new();
    source.define("java.lang.Object", None, &[]).unwrap();
    source
        .define_with_flags("java.lang.Cloneable", Some("java.lang.Object"), &[], INTERFACE)
        .unwrap();
    source
        .define_with_flags("java.io.Serializable", Some("java.lang.Object"), &[], INTERFACE)
        .unwrap();
    source
}

fn runtime_pool() -> ClassPool {
    ClassPool::with_sources([runtime()])
}

fn names(classes: &[Arc<CtClass>]) -> Vec<String> {
    classes.iter().map(|c| c.to_string()).collect()
}

// ===== Resolution Tests =====

#[test]
fn test_get_is_idempotent() {
    let pool = runtime_pool();
    let first = pool.get(&ClassName::OBJECT).unwrap();
    let second = pool.get(&ClassName::OBJECT).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(pool.len(), 1);
}

#[test]
fn test_loaded_class_links_supertypes() {
    let source = runtime();
    source
        .define("com.example.Base", Some("java.lang.Object"), &[])
        .unwrap();
    source
        .define(
            "com.example.Derived",
            Some("com.example.Base"),
            &["java.io.Serializable"],
        )
        .unwrap();
    let pool = ClassPool::with_sources([source]);

    let derived = pool.get(&name("com.example.Derived")).unwrap();
    let chain: Vec<String> = derived.superclasses().map(|c| c.to_string()).collect();
    assert_eq!(chain, vec!["com.example.Base", "java.lang.Object"]);
    assert_eq!(names(derived.interfaces()), vec!["java.io.Serializable"]);
    assert_eq!(derived.origin(), Some("memory:com.example.Derived"));
    assert!(!derived.is_interface());

    // Supertypes went through the same cache
    let base = pool.get(&name("com.example.Base")).unwrap();
    assert!(Arc::ptr_eq(derived.super_class().unwrap(), &base));
    assert!(pool.get(&ClassName::SERIALIZABLE).unwrap().is_interface());
}

#[test]
fn test_primitives_are_synthesized() {
    let pool = ClassPool::default();
    for primitive in ClassName::PRIMITIVES {
        let class = pool.get(&primitive).unwrap();
        assert!(class.is_primitive());
        assert!(class.super_class().is_none());
        assert!(class.origin().is_none());
    }
    assert_eq!(pool.len(), ClassName::PRIMITIVES.len());
}

#[test]
fn test_nested_array_resolves_every_depth() {
    let pool = runtime_pool();
    let matrix_name = ClassName::INT.with_array_depth(2);
    let matrix = pool.get(&matrix_name).unwrap();

    assert_eq!(matrix.to_string(), "int[][]");
    assert!(pool.contains(&ClassName::INT.with_array_depth(1)));
    assert!(pool.contains(&ClassName::INT));

    let row = pool.get(&ClassName::INT.with_array_depth(1)).unwrap();
    let int = pool.get(&ClassName::INT).unwrap();
    assert!(Arc::ptr_eq(matrix.component_type().unwrap(), &row));
    assert!(Arc::ptr_eq(row.component_type().unwrap(), &int));
    assert!(Arc::ptr_eq(&pool.get(&matrix_name).unwrap(), &matrix));
}

#[test]
fn test_array_supertypes() {
    let pool = runtime_pool();
    let objects = pool.get(&ClassName::OBJECT.with_array_depth(1)).unwrap();

    assert_eq!(
        objects.super_class().map(|s| s.to_string()),
        Some("java.lang.Object".to_string())
    );
    assert_eq!(
        names(objects.interfaces()),
        vec!["java.lang.Cloneable", "java.io.Serializable"]
    );
    assert!(objects.is_subtype_of(&ClassName::SERIALIZABLE));
}

#[test]
fn test_array_of_unknown_class_is_not_found() {
    let pool = runtime_pool();
    let err = pool
        .get(&name("com.example.Missing").with_array_depth(1))
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.name(), &name("com.example.Missing"));
}

#[test]
fn test_void_arrays_are_not_found() {
    let pool = runtime_pool();
    let void_array = ClassName::VOID.with_array_depth(1);
    let err = pool.get(&void_array).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.name(), &void_array);
    assert!(!pool.contains(&void_array));
    assert!(!pool.contains(&ClassName::VOID));
    assert!(pool.get(&ClassName::VOID).unwrap().is_primitive());
}

#[test]
fn test_first_source_wins() {
    let first = runtime();
    first
        .define("com.example.Dup", Some("java.lang.Object"), &[])
        .unwrap();
    let second = MemoryClassSource::new();
    second
        .define("com.example.Dup", Some("java.lang.Object"), &["java.io.Serializable"])
        .unwrap();

    let pool = ClassPool::with_sources([first, second]);
    let dup = pool.get(&name("com.example.Dup")).unwrap();
    assert!(dup.interfaces().is_empty());
}

// ===== Delegation Tests =====

#[test]
fn test_parent_first_delegation() {
    let parent_source = runtime();
    parent_source
        .define("com.example.Shared", Some("java.lang.Object"), &[])
        .unwrap();
    let parent = Arc::new(ClassPool::with_sources([parent_source]));

    let child_source = MemoryClassSource::new();
    child_source
        .define("com.example.Shared", Some("java.lang.Object"), &["java.io.Serializable"])
        .unwrap();
    let child = ClassPool::new(Some(parent.clone()));
    child.add_source(child_source);

    let shared = name("com.example.Shared");
    let from_child = child.get(&shared).unwrap();
    assert!(Arc::ptr_eq(&from_child, &parent.get(&shared).unwrap()));
    assert!(from_child.interfaces().is_empty());
    assert!(parent.contains(&shared));
    assert!(!child.contains(&shared));
}

#[test]
fn test_child_sources_link_to_parent_classes() {
    let parent = Arc::new(runtime_pool());
    let child_source = MemoryClassSource::new();
    child_source
        .define("com.example.Local", Some("java.lang.Object"), &[])
        .unwrap();
    let child = ClassPool::new(Some(parent.clone()));
    child.add_source(child_source);

    let local = child.get(&name("com.example.Local")).unwrap();
    let object = parent.get(&ClassName::OBJECT).unwrap();
    assert!(Arc::ptr_eq(local.super_class().unwrap(), &object));
    assert!(child.contains(&name("com.example.Local")));
    assert!(!parent.contains(&name("com.example.Local")));
    assert!(Arc::ptr_eq(child.parent().unwrap(), &parent));
}

#[test]
fn test_parent_failures_other_than_not_found_propagate() {
    let parent_source = MemoryClassSource::new();
    parent_source.insert(name("com.example.Broken"), b"not a class".to_vec());
    let parent = Arc::new(ClassPool::with_sources([parent_source]));

    let child_source = runtime();
    child_source
        .define("com.example.Broken", Some("java.lang.Object"), &[])
        .unwrap();
    let child = ClassPool::new(Some(parent));
    child.add_source(child_source);

    let err = child.get(&name("com.example.Broken")).unwrap_err();
    assert!(matches!(err, NotFoundError::Malformed { .. }), "{err:?}");
}

// ===== Failure Tests =====

#[test]
fn test_not_found() {
    let pool = runtime_pool();
    let missing = name("com.example.Missing");
    let err = pool.get(&missing).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "Class com.example.Missing not found");
    assert!(!pool.contains(&missing));
}

#[test]
fn test_missing_supertype_is_not_found() {
    let source = runtime();
    source
        .define("com.example.Orphan", Some("com.example.Gone"), &[])
        .unwrap();
    let pool = ClassPool::with_sources([source]);

    let err = pool.get(&name("com.example.Orphan")).unwrap_err();
    assert_eq!(err.name(), &name("com.example.Gone"));
    assert!(!pool.contains(&name("com.example.Orphan")));
}

#[test]
fn test_malformed_bytes() {
    let source = MemoryClassSource::new();
    source.insert(name("com.example.Broken"), b"not a class".to_vec());
    let pool = ClassPool::with_sources([source]);

    match pool.get(&name("com.example.Broken")).unwrap_err() {
        NotFoundError::Malformed { name: n, source } => {
            assert_eq!(n, name("com.example.Broken"));
            assert_eq!(source, ClassFormatError::BadMagic(0x6E6F_7420));
        }
        other => panic!("expected malformed, got {other:?}"),
    }
}

#[test]
fn test_circular_hierarchy() {
    let source = runtime();
    source
        .define("com.example.A", Some("com.example.B"), &[])
        .unwrap();
    source
        .define("com.example.B", Some("com.example.A"), &[])
        .unwrap();
    let pool = ClassPool::with_sources([source]);

    let err = pool.get(&name("com.example.A")).unwrap_err();
    assert!(matches!(err, NotFoundError::Circular { .. }), "{err:?}");
    assert_eq!(err.name(), &name("com.example.A"));
    assert!(!pool.contains(&name("com.example.A")));
    assert!(!pool.contains(&name("com.example.B")));

    // The pool stays usable
    assert!(pool.get(&ClassName::OBJECT).is_ok());
}

#[test]
fn test_class_file_declaring_another_name() {
    let source = runtime();
    let other = ClassFileHeader::new("com/example/Other", Some("java/lang/Object"), &[]);
    source.insert(name("com.example.Expected"), other.to_bytes());
    let pool = ClassPool::with_sources([source]);

    let err = pool.get(&name("com.example.Expected")).unwrap_err();
    match err {
        NotFoundError::Mismatch { expected, found } => {
            assert_eq!(expected, name("com.example.Expected"));
            assert_eq!(found, name("com.example.Other"));
        }
        other => panic!("expected mismatch, got {other:?}"),
    }
}

#[derive(Debug)]
struct FailingSource;

impl ClassSource for FailingSource {
    fn find_class(&self, _name: &ClassName) -> io::Result<Option<ClassLocation>> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
    }
}

#[test]
fn test_source_failure_is_io_error() {
    let pool = ClassPool::with_sources([FailingSource]);
    let err = pool.get(&ClassName::OBJECT).unwrap_err();
    assert!(matches!(err, NotFoundError::Io { .. }), "{err:?}");
    assert_eq!(err.to_string(), "Error loading class java.lang.Object");
}

// ===== Concurrency Tests =====

#[test]
fn test_pool_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ClassPool>();
    assert_send_sync::<Arc<CtClass>>();
}

#[test]
fn test_concurrent_gets_share_instances() {
    let source = runtime();
    source
        .define("com.example.Base", Some("java.lang.Object"), &["java.lang.Cloneable"])
        .unwrap();
    source
        .define("com.example.Leaf", Some("com.example.Base"), &[])
        .unwrap();
    let pool = Arc::new(ClassPool::with_sources([source]));
    let leaf = name("com.example.Leaf").with_array_depth(2);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let pool = pool.clone();
            let leaf = leaf.clone();
            thread::spawn(move || pool.get(&leaf).unwrap())
        })
        .collect();
    let results: Vec<Arc<CtClass>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    for class in &results[1..] {
        assert!(Arc::ptr_eq(class, &results[0]));
    }
    assert!(Arc::ptr_eq(&results[0], &pool.get(&leaf).unwrap()));
}

#[test]
fn test_debug_summarizes_cache() {
    let pool = runtime_pool();
    pool.get(&ClassName::OBJECT).unwrap();
    let debug = format!("{pool:?}");
    assert!(debug.starts_with("ClassPool"));
    assert!(debug.contains("classes: 1"));
}
