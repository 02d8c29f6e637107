//! Integration tests for request inspection.

use lumos_cli::models::AccessRequestStatus;
use lumos_cli::request::{show_status, StatusView};
use lumos_cli::AppError;

use super::test_helpers::{
    access_request, app, permission, session, user, FakeGateway, ScriptedConsole,
};

#[tokio::test]
async fn full_view_attaches_permissions() {
    let me = user("Ada", "ada@example.com");
    let gateway = FakeGateway::new(me.clone());
    let aws = app("AWS", true);
    let admin = permission(&aws, "Admin", &[]);
    gateway.add_permission(admin.clone());
    let mut request = access_request("AWS", AccessRequestStatus::Approved, &me, 5);
    request.requestable_permission_ids = vec![admin.id];
    gateway.add_request(request.clone());
    let session = session(&gateway);
    let mut console = ScriptedConsole::default();

    let shown = show_status(&session, &mut console, Some(request.id), false, StatusView::Full)
        .await
        .expect("shown")
        .expect("request");

    assert_eq!(shown.permissions, vec![admin]);
    assert!(console.said("Permissions:  Admin"));
    assert!(console.said("Status:       APPROVED"));
    assert!(console.said("For:          (self)"));
    assert!(console.said("Requested at: 2024-05-01 09:05 UTC"));
}

#[tokio::test]
async fn status_only_prints_one_line() {
    let me = user("Ada", "ada@example.com");
    let gateway = FakeGateway::new(me.clone());
    let request = access_request("AWS", AccessRequestStatus::Denied, &me, 5);
    gateway.add_request(request.clone());
    let session = session(&gateway);
    let mut console = ScriptedConsole::default();

    show_status(&session, &mut console, Some(request.id), false, StatusView::StatusOnly)
        .await
        .expect("shown");

    assert_eq!(console.output, vec!["DENIED".to_owned()]);
}

#[tokio::test]
async fn last_picks_the_newest_request() {
    let me = user("Ada", "ada@example.com");
    let gateway = FakeGateway::new(me.clone());
    gateway.add_request(access_request("AWS", AccessRequestStatus::Completed, &me, 1));
    let newest = access_request("GCP", AccessRequestStatus::Pending, &me, 9);
    gateway.add_request(newest.clone());
    let session = session(&gateway);
    let mut console = ScriptedConsole::default();

    show_status(&session, &mut console, None, true, StatusView::IdOnly)
        .await
        .expect("shown");

    assert_eq!(console.output, vec![newest.id.to_string()]);
    assert_eq!(gateway.call_count("current_user"), 1);
}

#[tokio::test]
async fn last_without_requests_is_not_an_error() {
    let gateway = FakeGateway::new(user("Ada", "ada@example.com"));
    let session = session(&gateway);
    let mut console = ScriptedConsole::default();

    let shown = show_status(&session, &mut console, None, true, StatusView::Full)
        .await
        .expect("no error");

    assert!(shown.is_none());
    assert!(console.said("No requests found"));
}

#[tokio::test]
async fn unknown_request_is_not_found() {
    let gateway = FakeGateway::new(user("Ada", "ada@example.com"));
    let session = session(&gateway);
    let mut console = ScriptedConsole::default();

    let err = show_status(
        &session,
        &mut console,
        Some(uuid::Uuid::new_v4()),
        false,
        StatusView::Full,
    )
    .await
    .expect_err("missing");
    assert!(matches!(err, AppError::NotFound(_)));
}
