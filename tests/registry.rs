//! Registry behavior tests against the in-memory store.
//!
//! These cover the semantics shared by both resource kinds: tenant
//! isolation, soft deletion, the silent-fallback normalization of list
//! parameters, and best-effort bulk actions.

use std::sync::Arc;

use uuid::Uuid;

use api_connect_admin::error::AppError;
use api_connect_admin::models::{ApiKey, ApiKeyDraft, Webhook, WebhookDraft};
use api_connect_admin::registry::{ListParams, TenantRegistry};
use api_connect_admin::store::memory::MemoryStore;

fn key_registry() -> TenantRegistry<ApiKey> {
    TenantRegistry::new(Arc::new(MemoryStore::new()))
}

fn hook_registry() -> TenantRegistry<Webhook> {
    TenantRegistry::new(Arc::new(MemoryStore::new()))
}

fn key_draft(name: &str) -> ApiKeyDraft {
    ApiKeyDraft {
        name: name.to_string(),
        key_prefix: "ci_".to_string(),
        key_hash: "abc123".to_string(),
        ..ApiKeyDraft::default()
    }
}

fn hook_draft(name: &str) -> WebhookDraft {
    WebhookDraft {
        name: name.to_string(),
        url: "https://example.com/hook".to_string(),
        events: vec!["order.created".to_string()],
        ..WebhookDraft::default()
    }
}

fn list_params(pairs: &[(&str, &str)]) -> ListParams {
    let mut params = ListParams::default();
    for (k, v) in pairs {
        match *k {
            "q" => params.q = v.to_string(),
            "sort" => params.sort = Some(v.to_string()),
            "dir" => params.dir = Some(v.to_string()),
            "page" => params.page = Some(v.to_string()),
            "per_page" => params.per_page = Some(v.to_string()),
            "view" => params.view = Some(v.to_string()),
            other => panic!("unknown param {other}"),
        }
    }
    params
}

// ====================================================================
// Tenant isolation
// ====================================================================

#[tokio::test]
async fn listing_never_crosses_tenants() {
    let registry = key_registry();
    let t1 = Uuid::new_v4();
    let t2 = Uuid::new_v4();

    registry.create(t1, key_draft("T1 Key A")).await.unwrap();
    registry.create(t1, key_draft("T1 Key B")).await.unwrap();
    registry.create(t2, key_draft("T2 Key")).await.unwrap();

    let page_t1 = registry.list(t1, &ListParams::default()).await.unwrap();
    assert_eq!(page_t1.total, 2);
    assert!(page_t1.items.iter().all(|k| k.hub_id == t1));

    let page_t2 = registry.list(t2, &ListParams::default()).await.unwrap();
    assert_eq!(page_t2.total, 1);
    assert_eq!(page_t2.items[0].name, "T2 Key");
}

#[tokio::test]
async fn cross_tenant_mutations_fail_with_not_found() {
    let registry = key_registry();
    let owner = Uuid::new_v4();
    let intruder = Uuid::new_v4();

    let record = registry.create(owner, key_draft("Owned")).await.unwrap();

    let edit = registry
        .edit(intruder, record.id, key_draft("Hijacked"))
        .await;
    assert!(matches!(edit, Err(AppError::NotFound)));

    let delete = registry.soft_delete(intruder, record.id).await;
    assert!(matches!(delete, Err(AppError::NotFound)));

    let toggle = registry.toggle_active(intruder, record.id).await;
    assert!(matches!(toggle, Err(AppError::NotFound)));

    // The record is untouched.
    let unchanged = registry.get(owner, record.id).await.unwrap();
    assert_eq!(unchanged.name, "Owned");
    assert!(unchanged.is_active);
}

// ====================================================================
// Soft deletion
// ====================================================================

#[tokio::test]
async fn soft_delete_is_one_way_and_not_idempotent() {
    let registry = key_registry();
    let hub = Uuid::new_v4();
    let record = registry.create(hub, key_draft("Doomed")).await.unwrap();

    let deleted = registry.soft_delete(hub, record.id).await.unwrap();
    assert!(deleted.is_deleted);
    assert!(deleted.deleted_at.is_some());

    // The lookup predicate excludes deleted records, so a second delete
    // misses.
    let again = registry.soft_delete(hub, record.id).await;
    assert!(matches!(again, Err(AppError::NotFound)));
}

#[tokio::test]
async fn deleted_records_leave_default_reads_but_stay_fetchable() {
    let registry = key_registry();
    let hub = Uuid::new_v4();
    let record = registry.create(hub, key_draft("Audit Me")).await.unwrap();

    registry.soft_delete(hub, record.id).await.unwrap();

    assert_eq!(registry.list(hub, &ListParams::default()).await.unwrap().total, 0);
    assert_eq!(registry.count(hub).await.unwrap(), 0);
    assert!(matches!(
        registry.get(hub, record.id).await,
        Err(AppError::NotFound)
    ));

    let audited = registry.get_with_deleted(hub, record.id).await.unwrap();
    assert!(audited.is_deleted);
    assert!(audited.deleted_at.is_some());
}

#[tokio::test]
async fn deleted_flag_and_timestamp_move_together() {
    let registry = key_registry();
    let hub = Uuid::new_v4();

    let live = registry.create(hub, key_draft("Alive")).await.unwrap();
    assert!(!live.is_deleted);
    assert_eq!(live.deleted_at, None);

    let toggled = registry.toggle_active(hub, live.id).await.unwrap();
    assert!(!toggled.is_deleted);
    assert_eq!(toggled.deleted_at, None);

    let deleted = registry.soft_delete(hub, live.id).await.unwrap();
    assert!(deleted.is_deleted);
    assert!(deleted.deleted_at.is_some());
}

// ====================================================================
// Toggle
// ====================================================================

#[tokio::test]
async fn toggling_twice_restores_the_original_flag() {
    let registry = key_registry();
    let hub = Uuid::new_v4();
    let record = registry.create(hub, key_draft("Flip")).await.unwrap();
    assert!(record.is_active);

    let once = registry.toggle_active(hub, record.id).await.unwrap();
    assert!(!once.is_active);

    let twice = registry.toggle_active(hub, record.id).await.unwrap();
    assert!(twice.is_active);
}

// ====================================================================
// Edit
// ====================================================================

#[tokio::test]
async fn edit_is_a_full_overwrite() {
    let registry = key_registry();
    let hub = Uuid::new_v4();

    let mut draft = key_draft("Before");
    draft.expires_at = Some(chrono::Utc::now());
    let record = registry.create(hub, draft).await.unwrap();
    assert!(record.expires_at.is_some());

    // The new draft omits expires_at; the overwrite clears it.
    let edited = registry
        .edit(hub, record.id, key_draft("After"))
        .await
        .unwrap();
    assert_eq!(edited.name, "After");
    assert_eq!(edited.expires_at, None);
    assert!(edited.updated_at >= record.updated_at);
}

#[tokio::test]
async fn webhook_create_validates_the_url() {
    let registry = hook_registry();
    let hub = Uuid::new_v4();

    let mut bad = hook_draft("Bad Hook");
    bad.url = "not a url".to_string();
    assert!(matches!(
        registry.create(hub, bad).await,
        Err(AppError::Validation(_))
    ));

    assert_eq!(registry.count(hub).await.unwrap(), 0);
}

// ====================================================================
// List normalization
// ====================================================================

#[tokio::test]
async fn unknown_sort_field_behaves_like_name() {
    let registry = key_registry();
    let hub = Uuid::new_v4();
    for name in ["Charlie", "Alpha", "Bravo"] {
        registry.create(hub, key_draft(name)).await.unwrap();
    }

    let by_name = registry
        .list(hub, &list_params(&[("sort", "name")]))
        .await
        .unwrap();
    let by_unknown = registry
        .list(hub, &list_params(&[("sort", "nonexistent")]))
        .await
        .unwrap();

    let names = |page: &api_connect_admin::registry::Page<ApiKey>| {
        page.items.iter().map(|k| k.name.clone()).collect::<Vec<_>>()
    };
    assert_eq!(names(&by_name), vec!["Alpha", "Bravo", "Charlie"]);
    assert_eq!(names(&by_unknown), names(&by_name));

    // The raw sort key is still echoed back for the controls.
    assert_eq!(by_unknown.sort_field, "nonexistent");
}

#[tokio::test]
async fn descending_sort_reverses_the_order() {
    let registry = key_registry();
    let hub = Uuid::new_v4();
    for name in ["Alpha", "Bravo", "Charlie"] {
        registry.create(hub, key_draft(name)).await.unwrap();
    }

    let page = registry
        .list(hub, &list_params(&[("sort", "name"), ("dir", "desc")]))
        .await
        .unwrap();
    let names: Vec<_> = page.items.iter().map(|k| k.name.as_str()).collect();
    assert_eq!(names, vec!["Charlie", "Bravo", "Alpha"]);
}

#[tokio::test]
async fn per_page_outside_the_allow_list_behaves_like_the_default() {
    let registry = key_registry();
    let hub = Uuid::new_v4();
    for i in 0..12 {
        registry
            .create(hub, key_draft(&format!("Key {i:02}")))
            .await
            .unwrap();
    }

    let odd = registry
        .list(hub, &list_params(&[("per_page", "37")]))
        .await
        .unwrap();
    let default = registry
        .list(hub, &list_params(&[("per_page", "10")]))
        .await
        .unwrap();

    assert_eq!(odd.per_page, 10);
    assert_eq!(odd.items.len(), 10);
    assert_eq!(odd.total_pages, 2);
    let names = |page: &api_connect_admin::registry::Page<ApiKey>| {
        page.items.iter().map(|k| k.name.clone()).collect::<Vec<_>>()
    };
    assert_eq!(names(&odd), names(&default));
}

#[tokio::test]
async fn out_of_range_page_clamps_to_the_last_page() {
    let registry = key_registry();
    let hub = Uuid::new_v4();
    for i in 0..15 {
        registry
            .create(hub, key_draft(&format!("Key {i:02}")))
            .await
            .unwrap();
    }

    let page = registry
        .list(hub, &list_params(&[("page", "99")]))
        .await
        .unwrap();
    assert_eq!(page.page, 2);
    assert_eq!(page.items.len(), 5);
    assert_eq!(page.total, 15);

    // An empty result set still produces one empty page.
    let empty_hub = Uuid::new_v4();
    let empty = registry
        .list(empty_hub, &list_params(&[("page", "5")]))
        .await
        .unwrap();
    assert_eq!(empty.page, 1);
    assert!(empty.items.is_empty());
}

#[tokio::test]
async fn search_is_case_insensitive_and_covers_credential_fields() {
    let registry = key_registry();
    let hub = Uuid::new_v4();

    let mut draft = key_draft("Deploy Key");
    draft.key_prefix = "dk_live_".to_string();
    registry.create(hub, draft).await.unwrap();
    registry.create(hub, key_draft("CI Key")).await.unwrap();

    let by_name = registry
        .list(hub, &list_params(&[("q", "deploy")]))
        .await
        .unwrap();
    assert_eq!(by_name.total, 1);

    let by_prefix = registry
        .list(hub, &list_params(&[("q", "DK_LIVE")]))
        .await
        .unwrap();
    assert_eq!(by_prefix.total, 1);

    let none = registry
        .list(hub, &list_params(&[("q", "nomatch")]))
        .await
        .unwrap();
    assert_eq!(none.total, 0);
    assert!(none.items.is_empty());
}

// ====================================================================
// Bulk actions
// ====================================================================

#[tokio::test]
async fn bulk_actions_are_best_effort() {
    let registry = key_registry();
    let hub = Uuid::new_v4();
    let other = Uuid::new_v4();

    let mine_a = registry.create(hub, key_draft("Mine A")).await.unwrap();
    let mine_b = registry.create(hub, key_draft("Mine B")).await.unwrap();
    let foreign = registry.create(other, key_draft("Foreign")).await.unwrap();

    let ids = vec![mine_a.id, mine_b.id, foreign.id, Uuid::new_v4()];
    let affected = registry.bulk(hub, &ids, "deactivate").await.unwrap();
    assert_eq!(affected, 2);

    assert!(!registry.get(hub, mine_a.id).await.unwrap().is_active);
    assert!(!registry.get(hub, mine_b.id).await.unwrap().is_active);
    // The other tenant's record is untouched.
    assert!(registry.get(other, foreign.id).await.unwrap().is_active);
}

#[tokio::test]
async fn bulk_unknown_action_is_a_no_op() {
    let registry = key_registry();
    let hub = Uuid::new_v4();
    let record = registry.create(hub, key_draft("Stays")).await.unwrap();

    let affected = registry.bulk(hub, &[record.id], "explode").await.unwrap();
    assert_eq!(affected, 0);

    let unchanged = registry.get(hub, record.id).await.unwrap();
    assert!(unchanged.is_active);
    assert!(!unchanged.is_deleted);
}

#[tokio::test]
async fn bulk_delete_soft_deletes_the_whole_set() {
    let registry = key_registry();
    let hub = Uuid::new_v4();
    let a = registry.create(hub, key_draft("A")).await.unwrap();
    let b = registry.create(hub, key_draft("B")).await.unwrap();

    let affected = registry.bulk(hub, &[a.id, b.id], "delete").await.unwrap();
    assert_eq!(affected, 2);
    assert_eq!(registry.count(hub).await.unwrap(), 0);

    let audited = registry.get_with_deleted(hub, a.id).await.unwrap();
    assert!(audited.is_deleted);
    assert!(audited.deleted_at.is_some());

    // Already-deleted records are skipped by a second bulk delete.
    let again = registry.bulk(hub, &[a.id, b.id], "delete").await.unwrap();
    assert_eq!(again, 0);
}

#[tokio::test]
async fn bulk_activate_after_deactivate() {
    let registry = key_registry();
    let hub = Uuid::new_v4();
    let a = registry.create(hub, key_draft("A")).await.unwrap();

    registry.bulk(hub, &[a.id], "deactivate").await.unwrap();
    assert!(!registry.get(hub, a.id).await.unwrap().is_active);

    registry.bulk(hub, &[a.id], "activate").await.unwrap();
    assert!(registry.get(hub, a.id).await.unwrap().is_active);
}

// ====================================================================
// Spec scenarios
// ====================================================================

#[tokio::test]
async fn api_key_lifecycle_scenario() {
    let registry = key_registry();
    let hub = Uuid::new_v4();

    let created = registry.create(hub, key_draft("CI Key")).await.unwrap();
    assert!(created.is_active);

    let page = registry.list(hub, &ListParams::default()).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].name, "CI Key");
    assert!(page.items[0].is_active);

    let toggled = registry.toggle_active(hub, created.id).await.unwrap();
    assert!(!toggled.is_active);

    registry.soft_delete(hub, created.id).await.unwrap();
    assert_eq!(registry.list(hub, &ListParams::default()).await.unwrap().total, 0);

    let audited = registry.get_with_deleted(hub, created.id).await.unwrap();
    assert!(audited.is_deleted);
}

#[tokio::test]
async fn webhook_search_scenario() {
    let registry = hook_registry();
    let hub = Uuid::new_v4();

    registry.create(hub, hook_draft("Hook A")).await.unwrap();

    let hit = registry
        .list(hub, &list_params(&[("q", "Hook")]))
        .await
        .unwrap();
    assert_eq!(hit.total, 1);
    assert_eq!(hit.items[0].name, "Hook A");
    assert_eq!(hit.items[0].events, vec!["order.created"]);

    let miss = registry
        .list(hub, &list_params(&[("q", "nomatch")]))
        .await
        .unwrap();
    assert_eq!(miss.total, 0);
    assert!(miss.items.is_empty());
}

#[tokio::test]
async fn webhook_failure_count_sorting() {
    let registry = hook_registry();
    let hub = Uuid::new_v4();

    for (name, failures) in [("Steady", 0), ("Flaky", 7), ("Wobbly", 3)] {
        let mut draft = hook_draft(name);
        draft.failure_count = failures;
        registry.create(hub, draft).await.unwrap();
    }

    let page = registry
        .list(
            hub,
            &list_params(&[("sort", "failure_count"), ("dir", "desc")]),
        )
        .await
        .unwrap();
    let names: Vec<_> = page.items.iter().map(|h| h.name.as_str()).collect();
    assert_eq!(names, vec!["Flaky", "Wobbly", "Steady"]);
}

#[tokio::test]
async fn dashboard_counts_follow_live_records() {
    let keys = key_registry();
    let hooks = hook_registry();
    let hub = Uuid::new_v4();

    keys.create(hub, key_draft("K1")).await.unwrap();
    keys.create(hub, key_draft("K2")).await.unwrap();
    let hook = hooks.create(hub, hook_draft("H1")).await.unwrap();

    assert_eq!(keys.count(hub).await.unwrap(), 2);
    assert_eq!(hooks.count(hub).await.unwrap(), 1);

    hooks.soft_delete(hub, hook.id).await.unwrap();
    assert_eq!(hooks.count(hub).await.unwrap(), 0);
}
