//! End-to-end tests of the `request` flow against the fake backend.

use lumos_cli::models::{AccessRequestStatus, AppSettings, GroupsProvisioning};
use lumos_cli::request::{run_request, RequestArgs, RequestOutcome, Target};
use lumos_cli::AppError;

use super::test_helpers::{
    access_request, app, permission, session, user, Answer, FakeGateway, ScriptedConsole,
};

fn settings(multiple: bool, durations: &[&str]) -> AppSettings {
    AppSettings {
        allow_multiple_permission_selection: multiple,
        time_based_access: durations.iter().map(|d| (*d).to_owned()).collect(),
        ..AppSettings::default()
    }
}

#[tokio::test]
async fn dry_run_with_full_flags_asks_nothing() {
    let gateway = FakeGateway::new(user("Ada", "ada@example.com"));
    let aws = app("AWS", false);
    let admin = permission(&aws, "Admin", &["3 days", "1 hour"]);
    gateway.add_app(aws.clone(), Some(settings(false, &[])));
    gateway.add_permission(admin.clone());
    let session = session(&gateway);
    let mut console = ScriptedConsole::default();

    let args = RequestArgs {
        app_id: Some(aws.id),
        permission_ids: vec![admin.id],
        length: Some("3600".into()),
        reason: Some("on-call \"incident\"".into()),
        for_me: true,
        wait: Some(false),
        dry_run: true,
        ..RequestArgs::default()
    };
    let outcome = run_request(&session, &mut console, args)
        .await
        .expect("dry run");

    let RequestOutcome::DryRun(plan) = outcome else {
        panic!("expected a dry run");
    };
    assert_eq!(plan.duration.seconds, Some(3600));
    assert_eq!(plan.target, Target::Caller);
    assert!(console.prompts.is_empty());
    assert_eq!(gateway.call_count("create_access_request"), 0);
    assert!(console.said("COMMAND"));
    assert!(console.said(&format!(
        "lumos request --app {} --permission {} --reason \"on-call \\\"incident\\\"\" --length 3600 --for-me --no-wait",
        aws.id, admin.id
    )));
}

#[tokio::test]
async fn app_only_request_submits_and_waits() {
    let me = user("Ada", "ada@example.com");
    let gateway = FakeGateway::new(me.clone());
    let zoom = app("Zoom", false);
    gateway.add_app(zoom.clone(), Some(settings(false, &["unlimited"])));
    let created = access_request("Zoom", AccessRequestStatus::Pending, &me, 0);
    gateway.on_create(created.clone());
    gateway.script_statuses(created.id, &[AccessRequestStatus::Completed]);
    let session = session(&gateway);
    let mut console = ScriptedConsole::new([
        Answer::Yes,
        Answer::text("need to join the all-hands"),
        Answer::Yes,
    ]);

    let outcome = run_request(
        &session,
        &mut console,
        RequestArgs {
            app_like: Some("zoom".into()),
            ..RequestArgs::default()
        },
    )
    .await
    .expect("submitted");

    let RequestOutcome::Submitted { request, poll } = outcome else {
        panic!("expected a submission");
    };
    assert_eq!(request.id, created.id);
    assert!(poll.expect("waited").is_success());

    let submission = gateway.submissions().pop().expect("one submission");
    assert_eq!(submission.app_id, zoom.id);
    assert_eq!(submission.permission_ids, None);
    assert_eq!(submission.expiration_in_seconds, None);
    assert_eq!(submission.target_user_id, None);
    assert_eq!(submission.note, "need to join the all-hands");
    assert!(console.said("DURATION: unlimited"));
    assert!(console.said("If you need to make this same request in the future, use:"));
    assert!(console.said("Request completed!"));
}

#[tokio::test]
async fn request_for_another_user() {
    let gateway = FakeGateway::new(user("Ada", "ada@example.com"));
    let grace = user("Grace", "grace@example.com");
    gateway.add_user(grace.clone());
    let aws = app("AWS", false);
    let admin = permission(&aws, "Admin", &["1 hour", "12 hours"]);
    gateway.add_app(aws.clone(), None);
    gateway.add_permission(admin.clone());
    gateway.on_create(access_request("AWS", AccessRequestStatus::Pending, &grace, 0));
    let session = session(&gateway);
    let mut console = ScriptedConsole::default();

    let outcome = run_request(
        &session,
        &mut console,
        RequestArgs {
            app_id: Some(aws.id),
            permission_like: Some("admin".into()),
            length: Some("12 h".into()),
            reason: Some("debugging".into()),
            user_like: Some("grace".into()),
            wait: Some(false),
            ..RequestArgs::default()
        },
    )
    .await
    .expect("submitted");

    assert!(matches!(outcome, RequestOutcome::Submitted { poll: None, .. }));
    let submission = gateway.submissions().pop().expect("one submission");
    assert_eq!(submission.target_user_id, Some(grace.id));
    assert_eq!(submission.expiration_in_seconds, Some(43_200));
    assert_eq!(submission.permission_ids, Some(vec![admin.id]));
    assert!(console.said("TARGET USER"));
}

#[tokio::test]
async fn picking_yourself_targets_the_caller() {
    let me = user("Ada", "ada@example.com");
    let gateway = FakeGateway::new(me.clone());
    gateway.add_user(me.clone());
    let zoom = app("Zoom", false);
    gateway.add_app(zoom.clone(), None);
    gateway.on_create(access_request("Zoom", AccessRequestStatus::Pending, &me, 0));
    let session = session(&gateway);
    let mut console = ScriptedConsole::new([Answer::No]);

    run_request(
        &session,
        &mut console,
        RequestArgs {
            app_id: Some(zoom.id),
            reason: Some("meeting".into()),
            wait: Some(false),
            ..RequestArgs::default()
        },
    )
    .await
    .expect("submitted");

    assert_eq!(gateway.submissions().pop().expect("submitted").target_user_id, None);
    assert!(!console.said("TARGET USER"));
    assert_eq!(gateway.call_count("current_user"), 1);
}

#[tokio::test]
async fn permissions_without_shared_length_are_rejected() {
    let gateway = FakeGateway::new(user("Ada", "ada@example.com"));
    let aws = app("AWS", false);
    let read = permission(&aws, "Read", &["1 hour"]);
    let write = permission(&aws, "Write", &["3 days"]);
    gateway.add_app(aws.clone(), Some(settings(true, &[])));
    gateway.add_permission(read.clone());
    gateway.add_permission(write.clone());
    let session = session(&gateway);
    let mut console = ScriptedConsole::default();

    let err = run_request(
        &session,
        &mut console,
        RequestArgs {
            app_id: Some(aws.id),
            permission_ids: vec![read.id, write.id],
            for_me: true,
            reason: Some("audit".into()),
            wait: Some(false),
            ..RequestArgs::default()
        },
    )
    .await
    .expect_err("no common length");

    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(gateway.call_count("create_access_request"), 0);
}

#[tokio::test]
async fn empty_create_response_reports_failure_without_error() {
    let gateway = FakeGateway::new(user("Ada", "ada@example.com"));
    let zoom = app("Zoom", false);
    gateway.add_app(zoom.clone(), None);
    let session = session(&gateway);
    let mut console = ScriptedConsole::default();

    let outcome = run_request(
        &session,
        &mut console,
        RequestArgs {
            app_id: Some(zoom.id),
            for_me: true,
            reason: Some("meeting".into()),
            wait: Some(true),
            ..RequestArgs::default()
        },
    )
    .await
    .expect("not an error");

    assert!(matches!(outcome, RequestOutcome::Failed(ref plan) if plan.app.id == zoom.id));
    assert!(console.said("Request failed"));
    assert!(!console.said("is in progress"));
    assert_eq!(gateway.call_count("get_access_request"), 0);
}

#[tokio::test]
async fn hidden_permissions_request_the_app_only() {
    let gateway = FakeGateway::new(user("Ada", "ada@example.com"));
    let vault = app("Vault", false);
    let reader = permission(&vault, "Reader", &["1 hour"]);
    gateway.add_app(
        vault.clone(),
        Some(AppSettings {
            time_based_access: vec!["2 days".into()],
            groups_provisioning: GroupsProvisioning::GroupsAndHidden,
            ..AppSettings::default()
        }),
    );
    gateway.add_permission(reader.clone());
    let session = session(&gateway);
    let mut console = ScriptedConsole::default();

    let args = RequestArgs {
        app_id: Some(vault.id),
        permission_ids: vec![reader.id],
        length: Some("2 days".into()),
        reason: Some("audit".into()),
        for_me: true,
        wait: Some(false),
        dry_run: true,
        ..RequestArgs::default()
    };
    let outcome = run_request(&session, &mut console, args)
        .await
        .expect("dry run");

    let RequestOutcome::DryRun(plan) = outcome else {
        panic!("expected a dry run");
    };
    assert_eq!(plan.permissions, None);
    assert_eq!(plan.duration.seconds, Some(2 * 86_400));
    assert_eq!(gateway.call_count("get_permission"), 0);
    assert_eq!(gateway.call_count("search_permissions"), 0);
    assert!(console.said("does not expose permissions"));
}
