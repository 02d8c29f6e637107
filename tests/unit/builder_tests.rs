//! Unit tests for request plans: confirmation, command echo, and payload.

use uuid::Uuid;

use lumos_cli::duration::ResolvedDuration;
use lumos_cli::models::{App, Permission};
use lumos_cli::request::{RequestPlan, Target};

fn plan() -> RequestPlan {
    let app = App {
        id: Uuid::new_v4(),
        user_friendly_label: "AWS".into(),
        app_class_id: "aws".into(),
        instance_id: "prod".into(),
        allows_multiple_permission_selection: true,
    };
    let permissions = ["S3 Read", "EC2 Admin"]
        .iter()
        .map(|label| Permission {
            id: Uuid::new_v4(),
            label: (*label).into(),
            app_id: app.id,
            app_class_id: "aws".into(),
            duration_options: vec!["12 hours".into()],
        })
        .collect();
    RequestPlan {
        app,
        permissions: Some(permissions),
        duration: ResolvedDuration {
            seconds: Some(43_200),
            label: "12 hours".into(),
        },
        reason: "deploy $release".into(),
        target: Target::Caller,
        wait: true,
    }
}

#[test]
fn submission_carries_every_resolved_field() {
    let plan = plan();
    let grace = Uuid::new_v4();
    let plan = RequestPlan {
        target: Target::User {
            id: grace,
            display: None,
        },
        ..plan
    };

    let submission = plan.submission();
    assert_eq!(submission.app_id, plan.app.id);
    assert_eq!(submission.note, "deploy $release");
    assert_eq!(
        submission.permission_ids,
        Some(plan.permission_slice().iter().map(|p| p.id).collect())
    );
    assert_eq!(submission.expiration_in_seconds, Some(43_200));
    assert_eq!(submission.target_user_id, Some(grace));
}

#[test]
fn app_only_plan_sends_no_permission_ids() {
    let plan = RequestPlan {
        permissions: None,
        duration: ResolvedDuration::unlimited(),
        ..plan()
    };
    let submission = plan.submission();
    assert_eq!(submission.permission_ids, None);
    assert_eq!(submission.expiration_in_seconds, None);
    assert!(!plan.confirmation().iter().any(|line| line == "PERMISSIONS"));
}

#[test]
fn command_repeats_the_request_without_prompts() {
    let plan = plan();
    let ids: Vec<String> = plan
        .permission_slice()
        .iter()
        .map(|p| format!("--permission {}", p.id))
        .collect();

    assert_eq!(
        plan.equivalent_command(),
        format!(
            "lumos request --app {} {} --reason \"deploy \\$release\" --length 43200 --for-me --wait",
            plan.app.id,
            ids.join(" ")
        )
    );
}

#[test]
fn command_names_label_when_length_is_not_scaled() {
    let plan = RequestPlan {
        duration: ResolvedDuration {
            seconds: None,
            label: "Until revoked".into(),
        },
        wait: false,
        ..plan()
    };
    let command = plan.equivalent_command();
    assert!(command.contains("--length \"untilrevoked\""), "got: {command}");
    assert!(command.ends_with("--no-wait"));
}

#[test]
fn confirmation_lists_sections_in_order() {
    let user = Uuid::new_v4();
    let plan = RequestPlan {
        target: Target::User {
            id: user,
            display: Some("Grace Hopper (grace@example.com)".into()),
        },
        ..plan()
    };
    let lines = plan.confirmation();
    let headers: Vec<&str> = lines
        .iter()
        .map(String::as_str)
        .filter(|line| !line.is_empty() && !line.starts_with(' '))
        .collect();

    assert_eq!(headers, vec!["APP", "PERMISSIONS", "DURATION", "REASON", "TARGET USER"]);
    assert!(lines.contains(&"   12 hours (43200 seconds)".to_owned()));
    assert!(lines.contains(&format!("   Grace Hopper (grace@example.com) [{user}]")));
}
