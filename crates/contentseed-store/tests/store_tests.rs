use contentseed_core::{
    AccessControlEntry, AccessControlList, AuthInfo, Branch, ContentPath, ContentStore,
    ContextFactory, CreateContent, ElevatingContextFactory, FolderSpec, Permission, PrincipalKey,
    SeedConfig, SeedContext, StoreError,
};
use contentseed_store::MemoryContentStore;

fn admin() -> SeedContext {
    ElevatingContextFactory::new()
        .build(SeedConfig::default().context_request())
        .unwrap()
}

fn as_user(principals: Vec<PrincipalKey>) -> SeedContext {
    SeedContext {
        auth: AuthInfo {
            user: principals[0].clone(),
            principals,
        },
        ..admin()
    }
}

fn path(raw: &str) -> ContentPath {
    ContentPath::parse(raw).unwrap()
}

fn seeded_store() -> MemoryContentStore {
    let store = MemoryContentStore::new();
    store
        .create(
            &admin(),
            FolderSpec::new("site", "Site", ContentPath::root())
                .with_permissions(AccessControlList::demo_defaults())
                .into(),
        )
        .unwrap();
    store
        .create(&admin(), FolderSpec::new("about", "About", path("/site")).into())
        .unwrap();
    store
}

#[test]
fn test_anonymous_reads_but_cannot_write() {
    let store = seeded_store();
    let anonymous = as_user(vec![PrincipalKey::Anonymous]);

    assert!(store.get_by_path(&anonymous, &path("/site/about")).unwrap().is_some());

    let err = store
        .create(&anonymous, FolderSpec::new("x", "X", path("/site")).into())
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::AccessDenied {
            permission: "CREATE",
            ..
        }
    ));
}

#[test]
fn test_authenticated_can_create_below_site() {
    let store = seeded_store();
    let user = as_user(vec![
        PrincipalKey::User {
            store: "system".to_string(),
            name: "jo".to_string(),
        },
        PrincipalKey::authenticated(),
    ]);

    let created = store
        .create(&user, FolderSpec::new("news", "News", path("/site")).into())
        .unwrap();
    assert_eq!(created.creator.to_string(), "user:system:jo");
}

#[test]
fn test_unreadable_content_is_hidden() {
    let store = MemoryContentStore::new();
    store
        .create(
            &admin(),
            FolderSpec::new("private", "Private", ContentPath::root())
                .with_permissions(AccessControlList::of([AccessControlEntry::allow_all(
                    PrincipalKey::system_admin(),
                )]))
                .into(),
        )
        .unwrap();

    let everyone = as_user(vec![PrincipalKey::everyone()]);
    assert!(store.get_by_path(&everyone, &path("/private")).unwrap().is_none());
    assert!(store.get_by_path(&admin(), &path("/private")).unwrap().is_some());
}

#[test]
fn test_update_requires_write_permissions_for_acl_change() {
    let store = MemoryContentStore::new();
    let editor_role = PrincipalKey::Role("editors".to_string());
    store
        .create(
            &admin(),
            FolderSpec::new("site", "Site", ContentPath::root())
                .with_permissions(AccessControlList::of([AccessControlEntry::allow(
                    editor_role.clone(),
                    [Permission::Read, Permission::Modify],
                )]))
                .into(),
        )
        .unwrap();
    let editor = as_user(vec![editor_role]);

    let site = store.get_by_path(&editor, &path("/site")).unwrap().unwrap();
    let mut renamed = site.clone();
    renamed.display_name = "Renamed".to_string();
    assert_eq!(store.update(&editor, renamed).unwrap().display_name, "Renamed");

    let err = store
        .update(&editor, site.with_permissions(&AccessControlList::demo_defaults()))
        .unwrap_err();
    assert!(matches!(err, StoreError::AccessDenied { .. }));
}

#[test]
fn test_apply_stops_at_non_inheriting_nodes() {
    let store = seeded_store();
    let ctx = admin();
    let own_acl = AccessControlList::of([AccessControlEntry::allow_all(PrincipalKey::system_admin())]);
    store
        .create(
            &ctx,
            FolderSpec::new("locked", "Locked", path("/site"))
                .with_permissions(own_acl.clone())
                .into(),
        )
        .unwrap();
    store
        .create(&ctx, FolderSpec::new("inner", "Inner", path("/site/locked")).into())
        .unwrap();

    let site = store.get_by_path(&ctx, &path("/site")).unwrap().unwrap();
    let replaced = AccessControlList::of([AccessControlEntry::allow(
        PrincipalKey::everyone(),
        [Permission::Read],
    )]);
    store.update(&ctx, site.with_permissions(&replaced)).unwrap();
    store.apply_permissions(&ctx, &site.id).unwrap();

    let about = store.get_by_path(&ctx, &path("/site/about")).unwrap().unwrap();
    let locked = store.get_by_path(&ctx, &path("/site/locked")).unwrap().unwrap();
    let inner = store.get_by_path(&ctx, &path("/site/locked/inner")).unwrap().unwrap();
    assert_eq!(about.permissions, replaced);
    assert_eq!(locked.permissions, own_acl);
    assert_eq!(inner.permissions, own_acl);
}

#[test]
fn test_preassigned_ids() {
    let store = MemoryContentStore::new();
    let ctx = admin();
    let params = CreateContent::builder()
        .name("a")
        .parent(ContentPath::root())
        .id(contentseed_core::ContentId::new("fixed"))
        .build()
        .unwrap();
    let created = store.create(&ctx, params.clone()).unwrap();
    assert_eq!(created.id.as_str(), "fixed");

    let mut clash = params;
    clash.name = "b".to_string();
    assert!(matches!(
        store.create(&ctx, clash),
        Err(StoreError::IdInUse { .. })
    ));
}

#[test]
fn test_generated_ids_skip_preassigned_ones() {
    let store = MemoryContentStore::new();
    let ctx = admin();
    let preassigned = CreateContent::builder()
        .name("a")
        .parent(ContentPath::root())
        .id(contentseed_core::ContentId::new("0000000000000001"))
        .build()
        .unwrap();
    let a = store.create(&ctx, preassigned).unwrap();
    let b = store
        .create(&ctx, FolderSpec::new("other", "Other", ContentPath::root()).into())
        .unwrap();

    assert_ne!(a.id, b.id);
    assert_eq!(b.id.as_str(), "0000000000000002");
    assert_eq!(store.get_by_id(&ctx, &a.id).unwrap().unwrap().path, path("/a"));
    assert_eq!(store.get_by_id(&ctx, &b.id).unwrap().unwrap().path, path("/other"));
}

#[test]
fn test_update_unknown_id() {
    let store = seeded_store();
    let ctx = admin();
    let mut ghost = store.get_by_path(&ctx, &path("/site")).unwrap().unwrap();
    ghost.id = contentseed_core::ContentId::new("ghost");
    assert!(matches!(
        store.update(&ctx, ghost),
        Err(StoreError::NotFound { .. })
    ));
}

#[test]
fn test_operation_count_and_snapshot() {
    let store = seeded_store();
    let ctx = admin();
    let before = store.operation_count();
    store.get_by_path(&ctx, &path("/site")).unwrap();
    assert_eq!(store.operation_count(), before + 1);

    let snapshot = store.snapshot(&ctx);
    assert_eq!(store.operation_count(), before + 1);
    let paths: Vec<_> = snapshot.iter().map(|c| c.path.to_string()).collect();
    assert_eq!(paths, vec!["/site", "/site/about"]);

    let mut other = ctx.clone();
    other.branch = Branch::new("master");
    assert!(store.snapshot(&other).is_empty());

    let json = serde_json::to_string(&snapshot).unwrap();
    assert!(json.contains("\"/site/about\""));
}
