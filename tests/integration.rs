//! Integration tests exercising the public API end to end.
//!
//! These tests verify that:
//! 1. Locators resolve to the right backend handle, and no handle leaks
//! 2. Resolution failures name the step that failed
//! 3. Lustre attribute extraction produces complete records for every entry type
//! 4. Identifiers can be serialized contiguously into caller buffers

use fsindex_backend::lustre::header::LayoutFormat;
use fsindex_backend::lustre::layout::OST_NOT_INSTANTIATED;
use fsindex_backend::lustre::retention::RETENTION_KEY;
use fsindex_backend::value::find;
use fsindex_backend::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

// =============================================================================
// Mock Backend
// =============================================================================

/// Handle accounting shared by every handle a plugin hands out.
#[derive(Default)]
struct Handles {
    opened: AtomicUsize,
    dropped: AtomicUsize,
    lookups: AtomicUsize,
}

impl Handles {
    fn live(&self) -> usize {
        self.opened.load(Ordering::SeqCst) - self.dropped.load(Ordering::SeqCst)
    }

    fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

/// An in-memory tree: absolute path → id.
struct TreeFs {
    fsname: String,
    root: Id,
    paths: Arc<RwLock<HashMap<String, Id>>>,
    handles: Arc<Handles>,
}

impl TreeFs {
    fn open(
        fsname: &str,
        root: Id,
        paths: Arc<RwLock<HashMap<String, Id>>>,
        handles: Arc<Handles>,
    ) -> Self {
        handles.opened.fetch_add(1, Ordering::SeqCst);
        Self {
            fsname: fsname.to_string(),
            root,
            paths,
            handles,
        }
    }
}

impl Drop for TreeFs {
    fn drop(&mut self) {
        self.handles.dropped.fetch_add(1, Ordering::SeqCst);
    }
}

impl Backend for TreeFs {
    fn name(&self) -> &str {
        "posix"
    }

    fn fsentry_from_path(&self, path: &str, mask: FsEntryMask) -> Result<FsEntry, MetaError> {
        self.handles.lookups.fetch_add(1, Ordering::SeqCst);
        if path == "/" {
            return Ok(FsEntry {
                id: mask.contains(FsEntryMask::ID).then(|| self.root.clone()),
                name: mask.contains(FsEntryMask::NAME).then(|| self.fsname.clone()),
                ..Default::default()
            });
        }

        let paths = self.paths.read().unwrap();
        let id = paths.get(path).ok_or_else(|| MetaError::NotFound {
            path: path.to_string(),
        })?;
        Ok(FsEntry {
            id: mask.contains(FsEntryMask::ID).then(|| id.clone()),
            name: mask
                .contains(FsEntryMask::NAME)
                .then(|| path.rsplit('/').next().unwrap_or_default().to_string()),
            ..Default::default()
        })
    }

    fn branch(&self, id: &Id) -> Result<Box<dyn Backend>, MetaError> {
        let known = self.paths.read().unwrap().values().any(|known| known == id);
        if !known {
            return Err(MetaError::NotFound {
                path: id.to_string(),
            });
        }
        Ok(Box::new(TreeFs::open(
            &self.fsname,
            id.clone(),
            Arc::clone(&self.paths),
            Arc::clone(&self.handles),
        )))
    }
}

struct PosixPlugin {
    paths: Arc<RwLock<HashMap<String, Id>>>,
    handles: Arc<Handles>,
}

impl BackendPlugin for PosixPlugin {
    fn name(&self) -> &str {
        "posix"
    }

    fn new_backend(&self, fsname: &str) -> Result<Box<dyn Backend>, MetaError> {
        if fsname != "myfs" {
            return Err(MetaError::NotFound {
                path: fsname.to_string(),
            });
        }
        Ok(Box::new(TreeFs::open(
            fsname,
            Id::new(b"root").unwrap(),
            Arc::clone(&self.paths),
            Arc::clone(&self.handles),
        )))
    }
}

/// A plugin built against a future API.
struct FuturePlugin;

impl BackendPlugin for FuturePlugin {
    fn name(&self) -> &str {
        "future"
    }

    fn api_version(&self) -> u32 {
        BACKEND_API_VERSION + 1
    }

    fn new_backend(&self, _fsname: &str) -> Result<Box<dyn Backend>, MetaError> {
        panic!("incompatible plugins must never be instantiated")
    }
}

fn some_dir_id() -> Id {
    Id::new(&[0x00, 0x11, 0x22, 0x33]).unwrap()
}

fn registry() -> (PluginRegistry, Arc<Handles>) {
    let mut paths = HashMap::new();
    paths.insert("/some".to_string(), Id::new(b"some").unwrap());
    paths.insert("/some/dir".to_string(), some_dir_id());
    paths.insert("/with space".to_string(), Id::new(b"space").unwrap());

    let handles = Arc::new(Handles::default());
    let mut registry = PluginRegistry::new();
    registry.register(PosixPlugin {
        paths: Arc::new(RwLock::new(paths)),
        handles: Arc::clone(&handles),
    });
    registry.register(FuturePlugin);
    (registry, handles)
}

// =============================================================================
// Tests: URI Resolution
// =============================================================================

#[test]
fn resolve_by_path_branches_and_drops_unscoped() {
    let (registry, handles) = registry();
    let backend = backend_from_uri(&registry, "posix://myfs/some/dir").unwrap();

    // one id-only lookup, one branch, the unscoped handle is gone
    assert_eq!(handles.lookups(), 1);
    assert_eq!(handles.opened.load(Ordering::SeqCst), 2);
    assert_eq!(handles.live(), 1);

    let root = backend.fsentry_from_path("/", FsEntryMask::ID).unwrap();
    assert_eq!(root.id, Some(some_dir_id()));

    drop(backend);
    assert_eq!(handles.live(), 0);
}

#[test]
fn resolve_by_fragment_path() {
    let (registry, handles) = registry();
    let backend = backend_from_uri(&registry, "posix://myfs#/with%20space").unwrap();
    let root = backend.fsentry_from_path("/", FsEntryMask::ID).unwrap();
    assert_eq!(root.id, Some(Id::new(b"space").unwrap()));
    assert_eq!(handles.live(), 1);
}

#[test]
fn resolve_by_embedded_id_skips_lookup() {
    let (registry, handles) = registry();
    let backend = backend_from_uri(&registry, "posix://myfs#[%00%11%22%33]").unwrap();

    assert_eq!(handles.lookups(), 0);
    assert_eq!(handles.live(), 1);
    let root = backend.fsentry_from_path("/", FsEntryMask::ID).unwrap();
    assert_eq!(root.id, Some(some_dir_id()));
}

#[test]
fn resolve_bare_locator_returns_unscoped() {
    let (registry, handles) = registry();
    let backend = backend_from_uri(&registry, "posix://myfs").unwrap();

    assert_eq!(handles.lookups(), 0);
    assert_eq!(handles.opened.load(Ordering::SeqCst), 1);
    let root = backend
        .fsentry_from_path("/", FsEntryMask::ID.union(FsEntryMask::NAME))
        .unwrap();
    assert_eq!(root.id, Some(Id::new(b"root").unwrap()));
    assert_eq!(root.name.as_deref(), Some("myfs"));
}

#[test]
fn malformed_locator_creates_no_handle() {
    let (registry, handles) = registry();
    for locator in ["", "myfs", "posix:myfs", "posix://", "posix://myfs/a#b", "posix://myfs#[%0"] {
        let err = backend_from_uri(&registry, locator).err().unwrap();
        assert_eq!(err.step, ResolveStep::Parse, "{locator}");
        assert!(matches!(err.source, MetaError::InvalidUri { .. }));
    }
    assert_eq!(handles.opened.load(Ordering::SeqCst), 0);
}

#[test]
fn unknown_backend_creates_no_handle() {
    let (registry, handles) = registry();
    let err = backend_from_uri(&registry, "nfs://myfs/some/dir").err().unwrap();
    assert_eq!(err.step, ResolveStep::Load);
    match err.source {
        MetaError::PluginNotFound { name } => assert_eq!(name, "nfs"),
        other => panic!("expected PluginNotFound, got {other:?}"),
    }
    assert_eq!(handles.opened.load(Ordering::SeqCst), 0);
}

#[test]
fn incompatible_plugin_is_rejected() {
    let (registry, _handles) = registry();
    let err = backend_from_uri(&registry, "future://myfs").err().unwrap();
    assert_eq!(err.step, ResolveStep::Load);
    assert!(matches!(
        err.source,
        MetaError::PluginIncompatible { found, expected, .. }
            if found == BACKEND_API_VERSION + 1 && expected == BACKEND_API_VERSION
    ));
}

#[test]
fn unknown_filesystem_fails_instantiation() {
    let (registry, handles) = registry();
    let err = backend_from_uri(&registry, "posix://otherfs").err().unwrap();
    assert_eq!(err.step, ResolveStep::Instantiate);
    assert_eq!(err.to_string(), "instantiate: not found: otherfs");
    assert_eq!(handles.live(), 0);
}

#[test]
fn unknown_path_drops_unscoped() {
    let (registry, handles) = registry();
    let err = backend_from_uri(&registry, "posix://myfs/nowhere").err().unwrap();
    assert_eq!(err.step, ResolveStep::Resolve);
    assert_eq!(handles.opened.load(Ordering::SeqCst), 1);
    assert_eq!(handles.live(), 0);
}

#[test]
fn unknown_id_fails_branch_and_drops_unscoped() {
    let (registry, handles) = registry();
    let err = backend_from_uri(&registry, "posix://myfs#[%ff]").err().unwrap();
    assert_eq!(err.step, ResolveStep::Branch);
    assert_eq!(handles.live(), 0);
}

#[test]
fn backend_ext_resolves_ids() {
    let (registry, _handles) = registry();
    let backend = backend_from_uri(&registry, "posix://myfs").unwrap();
    assert_eq!(backend.fsentry_id("/some/dir").unwrap(), some_dir_id());
    let branch = backend.branch(&backend.fsentry_id("/some").unwrap()).unwrap();
    assert_eq!(branch.fsentry_id("/").unwrap(), Id::new(b"some").unwrap());
}

// =============================================================================
// Fake Lustre Entries
// =============================================================================

#[derive(Clone)]
struct FakeComponent {
    id: u32,
    stripe_count: u64,
    flags: u32,
    osts: Vec<u64>,
    pool: String,
    extent: (u64, u64),
    mirror_id: u32,
}

impl FakeComponent {
    fn plain(osts: &[u64]) -> Self {
        Self {
            id: 0,
            stripe_count: osts.len() as u64,
            flags: 0,
            osts: osts.to_vec(),
            pool: String::new(),
            extent: (0, u64::MAX),
            mirror_id: 0,
        }
    }
}

impl LayoutComponent for FakeComponent {
    fn stripe_count(&self) -> Result<u64, MetaError> {
        Ok(self.stripe_count)
    }
    fn stripe_size(&self) -> Result<u64, MetaError> {
        Ok(1 << 20)
    }
    fn pattern(&self) -> Result<u64, MetaError> {
        Ok(1)
    }
    fn comp_flags(&self) -> Result<u32, MetaError> {
        Ok(self.flags)
    }
    fn pool_name(&self) -> Result<String, MetaError> {
        Ok(self.pool.clone())
    }
    fn ost_index(&self, stripe: u64) -> Result<Option<u64>, MetaError> {
        Ok(self.osts.get(stripe as usize).copied())
    }
    fn extent(&self) -> Result<(u64, u64), MetaError> {
        Ok(self.extent)
    }
    fn mirror_id(&self) -> Result<u32, MetaError> {
        Ok(self.mirror_id)
    }
}

/// A layout whose per-component getters read the current component.
#[derive(Clone)]
struct FakeLayout {
    composite: bool,
    mirror_count: u16,
    components: Vec<FakeComponent>,
    current: usize,
}

impl FakeLayout {
    fn current(&self) -> &FakeComponent {
        &self.components[self.current]
    }
}

impl LayoutComponent for FakeLayout {
    fn stripe_count(&self) -> Result<u64, MetaError> {
        self.current().stripe_count()
    }
    fn stripe_size(&self) -> Result<u64, MetaError> {
        self.current().stripe_size()
    }
    fn pattern(&self) -> Result<u64, MetaError> {
        self.current().pattern()
    }
    fn comp_flags(&self) -> Result<u32, MetaError> {
        self.current().comp_flags()
    }
    fn pool_name(&self) -> Result<String, MetaError> {
        self.current().pool_name()
    }
    fn ost_index(&self, stripe: u64) -> Result<Option<u64>, MetaError> {
        self.current().ost_index(stripe)
    }
    fn extent(&self) -> Result<(u64, u64), MetaError> {
        self.current().extent()
    }
    fn mirror_id(&self) -> Result<u32, MetaError> {
        self.current().mirror_id()
    }
}

impl Layout for FakeLayout {
    fn flags(&self) -> Result<u32, MetaError> {
        Ok(0)
    }

    fn is_composite(&self) -> bool {
        self.composite
    }

    fn mirror_count(&self) -> Result<u16, MetaError> {
        Ok(self.mirror_count)
    }

    fn select_component(&mut self, which: ComponentSelect) -> Result<(), MetaError> {
        self.current = match which {
            ComponentSelect::First => 0,
            ComponentSelect::Last => self.components.len() - 1,
        };
        Ok(())
    }

    fn component_id(&self) -> Result<u32, MetaError> {
        Ok(self.current().id)
    }

    fn iterate_components(&mut self, visitor: &mut dyn ComponentVisitor) -> Result<(), MetaError> {
        for component in &self.components {
            visitor.visit(component)?;
        }
        Ok(())
    }
}

struct FakeEntry {
    layout: FakeLayout,
    lov: Vec<u8>,
    dir_stripe: Option<DirStripe>,
}

const FID: LuFid = LuFid {
    seq: 0x200000bd1,
    oid: 0x2a,
    ver: 0,
};

impl LustreEntry for FakeEntry {
    fn fid(&self) -> Result<LuFid, MetaError> {
        Ok(FID)
    }

    fn hsm_state(&self) -> Result<HsmState, MetaError> {
        Ok(HsmState {
            states: 0x1,
            archive_id: 4,
        })
    }

    fn layout(&self) -> Result<Box<dyn Layout + '_>, MetaError> {
        Ok(Box::new(self.layout.clone()))
    }

    fn get_xattr(&self, name: &str) -> Result<Vec<u8>, MetaError> {
        if name == XATTR_LUSTRE_LOV {
            Ok(self.lov.clone())
        } else {
            Err(MetaError::NoData {
                operation: "getxattr",
            })
        }
    }

    fn dir_stripe(&self) -> Result<DirStripe, MetaError> {
        self.dir_stripe.clone().ok_or(MetaError::NoData {
            operation: "LL_IOC_LMV_GETSTRIPE",
        })
    }

    fn mdt_index(&self) -> Result<i32, MetaError> {
        Ok(1)
    }
}

const S_IFREG: u32 = 0o100000;
const S_IFDIR: u32 = 0o040000;
const S_IFLNK: u32 = 0o120000;

fn plain_v1_lov(generation: u16) -> Vec<u8> {
    let mut lov = vec![0u8; 32];
    lov[..4].copy_from_slice(&LayoutFormat::V1.magic().to_le_bytes());
    lov[30..32].copy_from_slice(&generation.to_le_bytes());
    lov
}

fn comp_v1_lov(generation: u32) -> Vec<u8> {
    let mut lov = vec![0u8; 32];
    lov[..4].copy_from_slice(&LayoutFormat::CompV1.magic().to_le_bytes());
    lov[8..12].copy_from_slice(&generation.to_le_bytes());
    lov
}

fn plain_file() -> FakeEntry {
    FakeEntry {
        layout: FakeLayout {
            composite: false,
            mirror_count: 0,
            components: vec![FakeComponent::plain(&[7, 2, 5])],
            current: 0,
        },
        lov: plain_v1_lov(3),
        dir_stripe: None,
    }
}

fn composite_file() -> FakeEntry {
    let first = FakeComponent {
        id: 1,
        stripe_count: 2,
        flags: LCME_FL_INIT,
        osts: vec![0, 1],
        pool: "flash".to_string(),
        extent: (0, 1 << 26),
        mirror_id: 0,
    };
    let second = FakeComponent {
        id: 2,
        stripe_count: 8,
        flags: 0,
        osts: Vec::new(),
        pool: "disk".to_string(),
        extent: (1 << 26, u64::MAX),
        mirror_id: 0,
    };
    FakeEntry {
        layout: FakeLayout {
            composite: true,
            mirror_count: 1,
            components: vec![first, second],
            current: 0,
        },
        lov: comp_v1_lov(9),
        dir_stripe: None,
    }
}

fn keys<'p>(pairs: &'p [ValuePair<'_>]) -> Vec<&'p str> {
    pairs.iter().map(|pair| pair.key).collect()
}

fn sequence_len(pairs: &[ValuePair<'_>], key: &str) -> usize {
    find(pairs, key)
        .and_then(Value::as_sequence)
        .map(<[_]>::len)
        .unwrap_or_else(|| panic!("{key} is not a sequence"))
}

// =============================================================================
// Tests: Lustre Attribute Extraction
// =============================================================================

#[test]
fn plain_file_record() {
    let arena = Arena::new();
    let entry = plain_file();
    let mut pairs = Vec::new();

    let count = ns_xattrs(&entry, S_IFREG | 0o644, &mut pairs, &arena).unwrap();
    assert_eq!(count, pairs.len());
    assert!(count <= MAX_NS_XATTRS);
    assert_eq!(
        keys(&pairs),
        [
            "fid",
            "hsm_state",
            "hsm_archive_id",
            "flags",
            "magic",
            "gen",
            "stripe_count",
            "stripe_size",
            "pattern",
            "comp_flags",
            "pool",
            "ost",
            "mdt_index",
        ]
    );

    assert_eq!(
        find(&pairs, "fid").and_then(Value::as_binary),
        Some(&FID.to_ne_bytes()[..])
    );
    assert_eq!(find(&pairs, "magic"), Some(&Value::String("LOV_USER_MAGIC_V1")));
    assert_eq!(find(&pairs, "gen"), Some(&Value::Uint32(3)));
    assert_eq!(sequence_len(&pairs, "stripe_count"), 1);
    assert_eq!(
        find(&pairs, "ost"),
        Some(&Value::Sequence(vec![
            Value::Uint64(7),
            Value::Uint64(2),
            Value::Uint64(5)
        ]))
    );
    assert_eq!(find(&pairs, "mdt_index"), Some(&Value::Int32(1)));
}

#[test]
fn composite_file_record() {
    let arena = Arena::new();
    let entry = composite_file();
    let mut pairs = Vec::new();

    let count = ns_xattrs(&entry, S_IFREG | 0o600, &mut pairs, &arena).unwrap();
    assert!(count <= MAX_NS_XATTRS);

    assert_eq!(find(&pairs, "magic"), Some(&Value::String("LOV_USER_MAGIC_COMP_V1")));
    assert_eq!(find(&pairs, "gen"), Some(&Value::Uint32(9)));
    assert_eq!(find(&pairs, "mirror_count"), Some(&Value::Uint32(1)));

    for key in [
        "stripe_count",
        "stripe_size",
        "pattern",
        "comp_flags",
        "pool",
        "mirror_id",
        "begin",
        "end",
    ] {
        assert_eq!(sequence_len(&pairs, key), 2, "{key}");
    }

    assert_eq!(
        find(&pairs, "ost"),
        Some(&Value::Sequence(vec![
            Value::Uint64(0),
            Value::Uint64(1),
            Value::Uint64(OST_NOT_INSTANTIATED),
        ]))
    );
    assert_eq!(OST_NOT_INSTANTIATED, u64::MAX);
    assert_eq!(
        find(&pairs, "pool"),
        Some(&Value::Sequence(vec![
            Value::String("flash"),
            Value::String("disk")
        ]))
    );
}

#[test]
fn striped_directory_record() {
    let arena = Arena::new();
    let mut entry = plain_file();
    entry.dir_stripe = Some(DirStripe {
        hash_type: 2,
        mdt_indices: vec![1, 0],
    });
    let mut pairs = Vec::new();

    ns_xattrs(&entry, S_IFDIR | 0o755, &mut pairs, &arena).unwrap();
    let keys = keys(&pairs);
    assert!(!keys.contains(&"hsm_state"));
    assert!(!keys.contains(&"magic"));
    assert!(!keys.contains(&"mdt_index"));
    assert!(keys.contains(&"flags"));
    assert_eq!(find(&pairs, "mdt_count"), Some(&Value::Uint32(2)));
    assert_eq!(find(&pairs, "mdt_hash"), Some(&Value::Uint32(2)));
}

#[test]
fn unstriped_directory_is_not_an_error() {
    let arena = Arena::new();
    let entry = plain_file();
    let mut pairs = Vec::new();

    ns_xattrs(&entry, S_IFDIR | 0o755, &mut pairs, &arena).unwrap();
    assert!(find(&pairs, "mdt_idx").is_none());
    assert!(find(&pairs, "mdt_index").is_none());
}

#[test]
fn directory_with_default_stripe_count() {
    const LLAPI_LAYOUT_DEFAULT: u64 = 0x1000_0000_0000_0002;
    let arena = Arena::new();
    let mut entry = plain_file();
    entry.layout.components[0].stripe_count = LLAPI_LAYOUT_DEFAULT;
    entry.layout.components[0].osts = vec![3, 4];
    let mut pairs = Vec::new();

    ns_xattrs(&entry, S_IFDIR | 0o755, &mut pairs, &arena).unwrap();
    assert_eq!(
        find(&pairs, "stripe_count"),
        Some(&Value::Sequence(vec![Value::Uint64(LLAPI_LAYOUT_DEFAULT)]))
    );
    assert_eq!(
        find(&pairs, "ost"),
        Some(&Value::Sequence(vec![Value::Uint64(3), Value::Uint64(4)]))
    );
}

#[test]
fn component_with_extra_flags_is_not_instantiated() {
    let arena = Arena::new();
    let mut entry = composite_file();
    entry.layout.components[1].flags = LCME_FL_INIT | 0x8;
    entry.layout.components[1].osts = vec![6, 7];
    let mut pairs = Vec::new();

    ns_xattrs(&entry, S_IFREG | 0o600, &mut pairs, &arena).unwrap();
    assert_eq!(
        find(&pairs, "ost"),
        Some(&Value::Sequence(vec![
            Value::Uint64(0),
            Value::Uint64(1),
            Value::Uint64(OST_NOT_INSTANTIATED),
        ]))
    );
}

#[test]
fn symlink_record_is_fid_only() {
    let arena = Arena::new();
    let entry = plain_file();
    let mut pairs = Vec::new();

    assert_eq!(ns_xattrs(&entry, S_IFLNK | 0o777, &mut pairs, &arena).unwrap(), 1);
    assert_eq!(keys(&pairs), ["fid"]);
}

#[test]
fn retention_attribute_is_normalized() {
    let arena = Arena::new();
    let entry = plain_file();
    let mut pairs = vec![
        ValuePair::new("user.project", Value::Binary(b"climate")),
        ValuePair::new(RETENTION_KEY, Value::Binary(b"1767225600")),
    ];

    let count = ns_xattrs(&entry, S_IFREG | 0o644, &mut pairs, &arena).unwrap();
    assert_eq!(pairs.len(), count + 2);
    assert_eq!(pairs[0].value, Value::Binary(b"climate"));
    assert_eq!(pairs[1].value, Value::Uint64(1_767_225_600));
}

#[test]
fn corrupt_layout_discards_record() {
    let arena = Arena::new();
    let mut entry = plain_file();
    entry.lov = 0x1234_5678u32.to_le_bytes().to_vec();
    let mut pairs = vec![ValuePair::new(RETENTION_KEY, Value::Binary(b"42"))];

    let err = ns_xattrs(&entry, S_IFREG | 0o644, &mut pairs, &arena).unwrap_err();
    assert!(matches!(err, MetaError::InvalidFormat { .. }));
    assert_eq!(
        pairs,
        vec![ValuePair::new(RETENTION_KEY, Value::Binary(b"42"))]
    );
}

#[test]
fn arena_is_recycled_between_entries() {
    let mut arena = Arena::with_chunk_size(64);
    let entries = [plain_file(), composite_file(), plain_file()];

    for entry in &entries {
        let mut pairs = Vec::with_capacity(MAX_NS_XATTRS);
        ns_xattrs(entry, S_IFREG | 0o644, &mut pairs, &arena).unwrap();
        assert!(arena.used() > 0);
        drop(pairs);
        arena.reset();
        assert_eq!(arena.used(), 0);
    }
}

// =============================================================================
// Tests: Identifiers
// =============================================================================

#[test]
fn ids_pack_into_one_buffer() {
    let ids = [
        Id::from_lu_fid(&FID).unwrap(),
        some_dir_id(),
        Id::root_parent(),
    ];
    let total: usize = ids.iter().map(Id::len).sum();

    let mut storage = vec![0u8; total];
    let mut cursor = &mut storage[..];
    let mut packed = Vec::new();
    for id in &ids {
        packed.push(id.copy_into(&mut cursor).unwrap());
    }
    assert!(cursor.is_empty());

    for (id, copy) in ids.iter().zip(&packed) {
        assert_eq!(id, copy);
    }

    let err = ids[1].copy_into(&mut cursor).unwrap_err();
    assert!(matches!(
        err,
        MetaError::OutOfBuffer {
            needed: 4,
            available: 0
        }
    ));
}

#[test]
fn fid_locator_matches_fid_id() {
    let uri: Uri = format!("lustre://scratch#{FID}").parse().unwrap();
    assert_eq!(uri.id(), &Id::from_lu_fid(&FID).unwrap());
    assert_eq!(uri.id().len(), 4 + 2 * LU_FID_SIZE);
    assert_eq!(uri.id().as_bytes()[..4], FILEID_LUSTRE.to_ne_bytes());
}

// =============================================================================
// Tests: Serialization
// =============================================================================

#[cfg(feature = "serde")]
#[test]
fn record_renders_as_json() {
    let arena = Arena::new();
    let entry = plain_file();
    let mut pairs = Vec::new();
    ns_xattrs(&entry, S_IFREG | 0o644, &mut pairs, &arena).unwrap();

    let json = value::pairs_to_json(&pairs).unwrap();
    assert_eq!(json["mdt_index"]["int32"], 1);
    assert_eq!(json["magic"]["string"], "LOV_USER_MAGIC_V1");
    assert_eq!(json["ost"]["sequence"][2]["uint64"], 5);
}

#[test]
fn public_types_are_thread_safe() {
    fn assert_send_sync<T: Send + Sync>() {}
    fn assert_send<T: Send>() {}

    assert_send_sync::<Id>();
    assert_send_sync::<MetaError>();
    assert_send_sync::<ResolveError>();
    assert_send_sync::<PluginRegistry>();
    assert_send_sync::<Uri>();
    assert_send::<Arena>();
    assert_send::<Box<dyn Backend>>();
}
