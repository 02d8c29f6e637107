//! Integration tests for permission validation and selection.

use lumos_cli::models::AppSettings;
use lumos_cli::resolve::{resolve_permissions, validate_permission_ids};
use lumos_cli::AppError;

use super::test_helpers::{app, permission, session, user, Answer, FakeGateway, ScriptedConsole};

// ── Explicit IDs ─────────────────────────────────────────────

#[tokio::test]
async fn two_ids_on_single_select_app_are_rejected() {
    let gateway = FakeGateway::new(user("Ada", "ada@example.com"));
    let target = app("AWS", false);
    let admin = permission(&target, "Admin", &[]);
    let viewer = permission(&target, "Viewer", &[]);
    gateway.add_permission(admin.clone());
    gateway.add_permission(viewer.clone());
    let session = session(&gateway);

    let valid = validate_permission_ids(&session, &target, &[admin.id, viewer.id])
        .await
        .expect("no transport error");

    assert!(valid.is_empty());
    assert_eq!(gateway.call_count("get_permission"), 0);
}

#[tokio::test]
async fn repeated_id_on_single_select_app_is_rejected() {
    let gateway = FakeGateway::new(user("Ada", "ada@example.com"));
    let target = app("AWS", false);
    let admin = permission(&target, "Admin", &[]);
    gateway.add_permission(admin.clone());
    let session = session(&gateway);

    let valid = validate_permission_ids(&session, &target, &[admin.id, admin.id])
        .await
        .expect("no transport error");

    assert!(valid.is_empty());
    assert_eq!(gateway.call_count("get_permission"), 0);
}

#[tokio::test]
async fn repeated_id_on_multi_select_app_is_fetched_once() {
    let gateway = FakeGateway::new(user("Ada", "ada@example.com"));
    let target = app("AWS", true);
    let admin = permission(&target, "Admin", &[]);
    gateway.add_permission(admin.clone());
    let session = session(&gateway);

    let valid = validate_permission_ids(&session, &target, &[admin.id, admin.id])
        .await
        .expect("no transport error");

    assert_eq!(valid, vec![admin]);
    assert_eq!(gateway.call_count("get_permission"), 1);
}

#[tokio::test]
async fn foreign_permission_id_rejects_the_whole_set() {
    let gateway = FakeGateway::new(user("Ada", "ada@example.com"));
    let target = app("AWS", true);
    let other = app("GCP", true);
    let admin = permission(&target, "Admin", &[]);
    let foreign = permission(&other, "Owner", &[]);
    gateway.add_permission(admin.clone());
    gateway.add_permission(foreign.clone());
    let session = session(&gateway);

    let valid = validate_permission_ids(&session, &target, &[admin.id, foreign.id])
        .await
        .expect("no transport error");
    assert!(valid.is_empty());
}

#[tokio::test]
async fn valid_ids_skip_search() {
    let gateway = FakeGateway::new(user("Ada", "ada@example.com"));
    let target = app("AWS", true);
    let admin = permission(&target, "Admin", &[]);
    let viewer = permission(&target, "Viewer", &[]);
    gateway.add_permission(admin.clone());
    gateway.add_permission(viewer.clone());
    let session = session(&gateway);
    let mut console = ScriptedConsole::default();

    let resolved = resolve_permissions(&session, &mut console, &target, &[admin.id, viewer.id], None)
        .await
        .expect("resolved");

    assert_eq!(resolved, Some(vec![admin, viewer]));
    assert_eq!(gateway.call_count("search_permissions"), 0);
}

#[tokio::test]
async fn rejected_ids_fall_back_to_search() {
    let gateway = FakeGateway::new(user("Ada", "ada@example.com"));
    let target = app("AWS", false);
    let admin = permission(&target, "Admin", &[]);
    gateway.add_permission(admin.clone());
    let session = session(&gateway);
    let mut console = ScriptedConsole::default();

    let resolved = resolve_permissions(
        &session,
        &mut console,
        &target,
        &[uuid::Uuid::new_v4()],
        None,
    )
    .await
    .expect("resolved");

    assert_eq!(resolved, Some(vec![admin]));
    assert_eq!(gateway.call_count("search_permissions"), 1);
}

// ── Interactive search ───────────────────────────────────────

#[tokio::test]
async fn app_without_permissions_is_requested_alone() {
    let gateway = FakeGateway::new(user("Ada", "ada@example.com"));
    let target = app("Zoom", false);
    let session = session(&gateway);
    let mut console = ScriptedConsole::default();

    let resolved = resolve_permissions(&session, &mut console, &target, &[], None)
        .await
        .expect("resolved");

    assert_eq!(resolved, None);
    assert!(console.said("you're just requesting the app"));
}

#[tokio::test]
async fn foreign_search_results_are_never_selected() {
    let gateway = FakeGateway::new(user("Ada", "ada@example.com"));
    let target = app("AWS", true);
    let other = app("GCP", true);
    let admin = permission(&target, "Admin", &[]);
    let foreign = permission(&other, "Owner", &[]);
    gateway.add_permission(admin.clone());
    gateway.leak_into_search(foreign.clone());
    let session = session(&gateway);
    let mut console = ScriptedConsole::new([Answer::PickMany(vec![0, 1])]);

    let resolved = resolve_permissions(&session, &mut console, &target, &[], None)
        .await
        .expect("resolved")
        .expect("some permissions");

    assert_eq!(resolved, vec![admin]);
    assert!(resolved.iter().all(|p| p.app_id == target.id));
}

#[tokio::test]
async fn only_foreign_picks_is_a_validation_error() {
    let gateway = FakeGateway::new(user("Ada", "ada@example.com"));
    let target = app("AWS", false);
    let other = app("GCP", false);
    gateway.leak_into_search(permission(&other, "Owner", &[]));
    let session = session(&gateway);
    let mut console = ScriptedConsole::default();

    let err = resolve_permissions(&session, &mut console, &target, &[], None)
        .await
        .expect_err("nothing usable");
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn multi_select_app_collects_over_several_rounds() {
    let gateway = FakeGateway::new(user("Ada", "ada@example.com"));
    let target = app("AWS", false).with_settings(&AppSettings {
        allow_multiple_permission_selection: true,
        ..AppSettings::default()
    });
    let read = permission(&target, "S3 Read", &[]);
    let write = permission(&target, "S3 Write", &[]);
    let ec2 = permission(&target, "EC2 Admin", &[]);
    gateway.add_permission(read.clone());
    gateway.add_permission(write.clone());
    gateway.add_permission(ec2.clone());
    let session = session(&gateway);
    let mut console = ScriptedConsole::new([
        Answer::PickMany(vec![0]),
        Answer::No,
        Answer::text("ec2"),
    ]);

    let resolved = resolve_permissions(&session, &mut console, &target, &[], Some("S3".into()))
        .await
        .expect("resolved")
        .expect("some permissions");

    assert_eq!(resolved, vec![read, ec2]);
    assert!(console.was_asked("Done selecting permissions?"));
    assert_eq!(console.unused_answers(), 0);
}

#[tokio::test]
async fn single_select_app_stops_after_one_pick() {
    let gateway = FakeGateway::new(user("Ada", "ada@example.com"));
    let target = app("AWS", false);
    let read = permission(&target, "S3 Read", &[]);
    let write = permission(&target, "S3 Write", &[]);
    gateway.add_permission(read.clone());
    gateway.add_permission(write.clone());
    let session = session(&gateway);
    let mut console = ScriptedConsole::new([Answer::Pick(1)]);

    let resolved = resolve_permissions(&session, &mut console, &target, &[], Some("S3".into()))
        .await
        .expect("resolved");

    assert_eq!(resolved, Some(vec![write]));
    assert!(!console.was_asked("Done selecting permissions?"));
}
