// ==========================================
// ComplaintApi 集成测试
// ==========================================
// 测试目标: 提交、查询、人工变更状态/优先级的校验与持久化
// ==========================================

mod test_helpers;

use chrono::{Duration, Local};
use fixit_complaints::api::{ApiError, SubmitComplaintRequest};
use fixit_complaints::domain::types::{ComplaintStatus, Priority};
use test_helpers::*;

fn request(
    priority: &str,
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> SubmitComplaintRequest {
    SubmitComplaintRequest {
        user_id: TEST_USER_ID,
        complaint_type: "pothole".to_string(),
        priority: priority.to_string(),
        department: "Roads".to_string(),
        description: Some("Deep pothole near the bus stop".to_string()),
        image_url: None,
        latitude,
        longitude,
    }
}

// ==========================================
// 提交
// ==========================================

#[test]
fn test_submit_and_get_complaint() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let state = build_state(&db_path);

    let id = state
        .complaint_api
        .submit_complaint(request("High", Some(12.90), Some(77.58)))
        .unwrap();

    let complaint = state.complaint_api.get_complaint(id).unwrap();
    assert_eq!(complaint.status, ComplaintStatus::Reported);
    assert_eq!(complaint.priority, Priority::High);
    assert_eq!(complaint.location.unwrap().latitude, 12.90);
    assert!(complaint.escalated_at.is_none());

    let conn = open_test_connection(&db_path).unwrap();
    assert_eq!(count_action_logs(&conn, "Submit"), 1);
}

#[test]
fn test_submit_rejects_invalid_input() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let state = build_state(&db_path);
    let api = &state.complaint_api;

    let mut unknown_user = request("High", None, None);
    unknown_user.user_id = 404;
    assert!(matches!(
        api.submit_complaint(unknown_user),
        Err(ApiError::NotFound(_))
    ));

    assert!(matches!(
        api.submit_complaint(request("Urgent", None, None)),
        Err(ApiError::InvalidParameter(_))
    ));
    assert!(matches!(
        api.submit_complaint(request("Low", Some(12.9), None)),
        Err(ApiError::InvalidParameter(_))
    ));

    let mut blank_type = request("Low", None, None);
    blank_type.complaint_type = "   ".to_string();
    assert!(matches!(
        api.submit_complaint(blank_type),
        Err(ApiError::InvalidParameter(_))
    ));

    // 无坐标的工单合法
    assert!(api.submit_complaint(request("Low", None, None)).is_ok());
}

#[test]
fn test_list_user_complaints_newest_first() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_test_connection(&db_path).unwrap();
    let older = seed_complaint(&conn, "garbage", "Low", "Reported", None, base_time()).unwrap();
    let newer = seed_complaint(
        &conn,
        "pothole",
        "High",
        "Acknowledged",
        None,
        base_time() + Duration::hours(3),
    )
    .unwrap();

    let state = build_state(&db_path);
    let ids: Vec<i64> = state
        .complaint_api
        .list_user_complaints(TEST_USER_ID)
        .unwrap()
        .iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(ids, vec![newer, older]);
}

#[test]
fn test_list_all_complaints_across_users() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_test_connection(&db_path).unwrap();
    insert_user(&conn, 2, "second-user").unwrap();
    let mine = seed_complaint(&conn, "garbage", "Low", "Resolved", None, base_time()).unwrap();
    conn.execute(
        "INSERT INTO complaints (user_id, type, status, priority, department, reported_at)
         VALUES (2, 'streetlight', 'Reported', 'High', 'Electrical', ?1)",
        [fmt_ts(base_time() + Duration::hours(1))],
    )
    .unwrap();
    let theirs = conn.last_insert_rowid();

    let state = build_state(&db_path);
    let ids: Vec<i64> = state
        .complaint_api
        .list_all_complaints()
        .unwrap()
        .iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(ids, vec![theirs, mine]);
    assert_eq!(state.complaint_api.list_user_complaints(2).unwrap().len(), 1);
}

#[test]
fn test_get_missing_complaint() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let state = build_state(&db_path);
    assert!(matches!(
        state.complaint_api.get_complaint(99),
        Err(ApiError::NotFound(_))
    ));
}

// ==========================================
// 人工变更
// ==========================================

#[test]
fn test_update_status_error_taxonomy() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_test_connection(&db_path).unwrap();
    let id = seed_complaint(&conn, "pothole", "Medium", "Reported", None, base_time()).unwrap();
    let state = build_state(&db_path);
    let api = &state.complaint_api;

    assert!(matches!(api.update_status(id, None, None), Err(ApiError::NoOp(_))));
    assert!(matches!(
        api.update_status(id, Some(""), Some("  ")),
        Err(ApiError::NoOp(_))
    ));
    assert!(matches!(
        api.update_status(id, Some("Closed"), None),
        Err(ApiError::UnknownStatus(_))
    ));
    assert!(matches!(
        api.update_status(id, None, Some("Urgent")),
        Err(ApiError::InvalidParameter(_))
    ));
    assert!(matches!(
        api.update_status(999, Some("Acknowledged"), None),
        Err(ApiError::NotFound(_))
    ));
    assert!(matches!(
        api.update_status(id, Some("Reported"), None),
        Err(ApiError::InvalidTransition { .. })
    ));

    // 校验失败不产生任何写入
    assert_eq!(read_status(&conn, id), "Reported");
    assert_eq!(count_action_logs(&conn, "StatusUpdate"), 0);
}

#[test]
fn test_resolved_is_terminal() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_test_connection(&db_path).unwrap();
    let id = seed_complaint(&conn, "pothole", "Medium", "Resolved", None, base_time()).unwrap();
    let state = build_state(&db_path);

    for status in ["Acknowledged", "InProgress", "Escalated", "Resolved"] {
        let result = state.complaint_api.update_status(id, Some(status), None);
        assert!(
            matches!(result, Err(ApiError::InvalidTransition { .. })),
            "Resolved -> {} should be rejected",
            status
        );
    }
    assert!(matches!(
        state.complaint_api.update_status(id, None, Some("High")),
        Err(ApiError::InvalidTransition { .. })
    ));

    let complaint = state.complaint_api.get_complaint(id).unwrap();
    assert_eq!(complaint.priority, Priority::Medium);
}

#[test]
fn test_status_and_priority_update() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_test_connection(&db_path).unwrap();
    let id = seed_complaint(&conn, "pothole", "Low", "Reported", None, base_time()).unwrap();
    let state = build_state(&db_path);

    let before = Local::now().naive_local() - Duration::seconds(1);
    let updated = state
        .complaint_api
        .update_status(id, Some("Acknowledged"), Some("High"))
        .unwrap();
    assert_eq!(updated.status, ComplaintStatus::Acknowledged);
    assert_eq!(updated.priority, Priority::High);

    let stored = state.complaint_api.get_complaint(id).unwrap();
    assert_eq!(stored.status, ComplaintStatus::Acknowledged);
    assert_eq!(stored.priority, Priority::High);
    assert!(stored.acknowledged_at.unwrap() >= before);

    let logs = state.action_log_repo.list_by_complaint(id).unwrap();
    let mut types: Vec<String> = logs.into_iter().map(|l| l.action_type).collect();
    types.sort();
    assert_eq!(types, vec!["PriorityUpdate", "StatusUpdate"]);
}

#[test]
fn test_timestamp_not_overwritten_on_reentry() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_test_connection(&db_path).unwrap();
    let id = seed_complaint(&conn, "pothole", "Low", "InProgress", None, base_time()).unwrap();
    let first_ack = base_time() + Duration::hours(1);
    conn.execute(
        "UPDATE complaints SET acknowledged_at = ?1, in_progress_at = ?2 WHERE id = ?3",
        rusqlite::params![
            fmt_ts(first_ack),
            fmt_ts(base_time() + Duration::hours(2)),
            id
        ],
    )
    .unwrap();
    let state = build_state(&db_path);

    let updated = state
        .complaint_api
        .update_status(id, Some("Acknowledged"), None)
        .unwrap();
    assert_eq!(updated.acknowledged_at, Some(first_ack));

    let stored = state.complaint_api.get_complaint(id).unwrap();
    assert_eq!(stored.status, ComplaintStatus::Acknowledged);
    assert_eq!(stored.acknowledged_at, Some(first_ack));
    assert_eq!(stored.in_progress_at, Some(base_time() + Duration::hours(2)));
}

#[test]
fn test_same_status_is_invalid_but_escalated_is_noop() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_test_connection(&db_path).unwrap();
    let ack = seed_complaint(&conn, "pothole", "Low", "Acknowledged", None, base_time()).unwrap();
    let esc = seed_complaint(&conn, "pothole", "Low", "Escalated", None, base_time()).unwrap();
    let state = build_state(&db_path);

    assert!(matches!(
        state.complaint_api.update_status(ack, Some("Acknowledged"), None),
        Err(ApiError::InvalidTransition { .. })
    ));

    let same = state
        .complaint_api
        .update_status(esc, Some("Escalated"), None)
        .unwrap();
    assert_eq!(same.status, ComplaintStatus::Escalated);
    assert_eq!(count_action_logs(&conn, "StatusUpdate"), 0);

    // Escalated 仍可人工推进
    let progressed = state
        .complaint_api
        .update_status(esc, Some("InProgress"), None)
        .unwrap();
    assert_eq!(progressed.status, ComplaintStatus::InProgress);
}
