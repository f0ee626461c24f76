use super::{ClusterRule, EscalationEngine, TemporalRule, MAX_AGE_THRESHOLD_HOURS};
use crate::domain::complaint::{Complaint, GeoPoint};
use crate::domain::types::{ComplaintStatus, Priority};
use chrono::{Duration, NaiveDate, NaiveDateTime};

// ==========================================
// 测试辅助函数
// ==========================================

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, 10)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

fn make_complaint(
    id: i64,
    complaint_type: &str,
    status: ComplaintStatus,
    location: Option<GeoPoint>,
    age_hours: i64,
) -> Complaint {
    Complaint {
        id,
        user_id: 1,
        complaint_type: complaint_type.to_string(),
        description: None,
        image_url: None,
        department: "Public Works".to_string(),
        priority: Priority::Medium,
        status,
        location,
        reported_at: now() - Duration::hours(age_hours),
        acknowledged_at: None,
        in_progress_at: None,
        resolved_at: None,
        escalated_at: None,
    }
}

/// 以 (12.90, 77.58) 为中心,每个工单向北偏移 i * 100m
fn clustered(count: i64, complaint_type: &str, first_id: i64) -> Vec<Complaint> {
    (0..count)
        .map(|i| {
            make_complaint(
                first_id + i,
                complaint_type,
                ComplaintStatus::Reported,
                Some(GeoPoint::new(12.90 + (i as f64) * 0.0009, 77.58)),
                1,
            )
        })
        .collect()
}

fn engine() -> EscalationEngine {
    EscalationEngine::new(TemporalRule::default(), ClusterRule::default())
}

// ==========================================
// 超时规则
// ==========================================

#[test]
fn test_temporal_selects_only_overdue_active() {
    let complaints = vec![
        make_complaint(1, "pothole", ComplaintStatus::Reported, None, 25),
        make_complaint(2, "pothole", ComplaintStatus::Acknowledged, None, 48),
        make_complaint(3, "pothole", ComplaintStatus::InProgress, None, 24),
        make_complaint(4, "pothole", ComplaintStatus::Reported, None, 23),
        make_complaint(5, "pothole", ComplaintStatus::Resolved, None, 100),
        make_complaint(6, "pothole", ComplaintStatus::Escalated, None, 100),
    ];

    let selected = TemporalRule::default().select(&complaints, now());
    assert_eq!(selected, vec![1, 2, 3]);
}

#[test]
fn test_temporal_run_stamps_escalated_at_and_keeps_previous_status() {
    let complaints = vec![make_complaint(
        1,
        "garbage",
        ComplaintStatus::Acknowledged,
        None,
        30,
    )];

    let updates = engine().run_temporal(complaints, now()).unwrap();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].expected_status, ComplaintStatus::Acknowledged);
    assert_eq!(updates[0].complaint.status, ComplaintStatus::Escalated);
    assert_eq!(updates[0].complaint.escalated_at, Some(now()));
}

#[test]
fn test_temporal_rerun_is_idempotent() {
    let complaints = vec![
        make_complaint(1, "garbage", ComplaintStatus::Reported, None, 30),
        make_complaint(2, "garbage", ComplaintStatus::Reported, None, 2),
    ];

    let first = engine().run_temporal(complaints, now()).unwrap();
    assert_eq!(first.len(), 1);

    let after_first: Vec<Complaint> = vec![
        first[0].complaint.clone(),
        make_complaint(2, "garbage", ComplaintStatus::Reported, None, 2),
    ];
    let second = engine()
        .run_temporal(after_first, now() + Duration::minutes(5))
        .unwrap();
    assert!(second.is_empty());
}

#[test]
fn test_temporal_custom_threshold() {
    let rule = TemporalRule::try_from_hours(2).unwrap();
    let c = make_complaint(1, "garbage", ComplaintStatus::Reported, None, 3);
    assert!(rule.is_overdue(&c, now()));
    assert!(!TemporalRule::default().is_overdue(&c, now()));
}

#[test]
fn test_temporal_threshold_bounds() {
    assert!(TemporalRule::try_from_hours(0).is_none());
    assert!(TemporalRule::try_from_hours(-1).is_none());
    assert!(TemporalRule::try_from_hours(MAX_AGE_THRESHOLD_HOURS + 1).is_none());
    assert!(TemporalRule::try_from_hours(i64::MAX).is_none());

    let widest = TemporalRule::try_from_hours(MAX_AGE_THRESHOLD_HOURS).unwrap();
    let c = make_complaint(1, "garbage", ComplaintStatus::Reported, None, 48);
    assert!(!widest.is_overdue(&c, now()));
}

#[test]
fn test_temporal_cutoff_before_earliest_date_is_not_overdue() {
    let rule = TemporalRule::try_from_hours(24).unwrap();
    let earliest = NaiveDate::MIN.and_hms_opt(6, 0, 0).unwrap();
    let mut c = make_complaint(1, "garbage", ComplaintStatus::Reported, None, 0);
    c.reported_at = earliest;
    assert!(!rule.is_overdue(&c, earliest));
}

// ==========================================
// 聚集规则
// ==========================================

#[test]
fn test_six_mutual_neighbors_all_escalate() {
    let mut complaints = clustered(6, "pothole", 1);
    // 不同类型、同一位置: 不参与 pothole 聚集
    complaints.push(make_complaint(
        7,
        "garbage",
        ComplaintStatus::Reported,
        Some(GeoPoint::new(12.90, 77.58)),
        1,
    ));

    let selected = ClusterRule::default().select(&complaints);
    assert_eq!(selected, vec![1, 2, 3, 4, 5, 6]);

    let updates = engine().run_cluster(complaints, now()).unwrap();
    assert_eq!(updates.len(), 6);
    assert!(updates.iter().all(|u| u.complaint.status == ComplaintStatus::Escalated));
    assert!(updates.iter().all(|u| u.complaint.id != 7));
}

#[test]
fn test_five_neighbors_do_not_reach_threshold() {
    let complaints = clustered(5, "pothole", 1);
    assert!(ClusterRule::default().select(&complaints).is_empty());
}

#[test]
fn test_cluster_ignores_non_reported_and_unlocated() {
    let mut complaints = clustered(5, "pothole", 1);
    complaints.push(make_complaint(
        6,
        "pothole",
        ComplaintStatus::Acknowledged,
        Some(GeoPoint::new(12.90, 77.58)),
        1,
    ));
    complaints.push(make_complaint(7, "pothole", ComplaintStatus::Reported, None, 1));

    let sizes = ClusterRule::default().cluster_sizes(&complaints);
    assert_eq!(sizes.len(), 5);
    assert!(sizes.values().all(|s| *s == 5));
    assert!(ClusterRule::default().select(&complaints).is_empty());
}

#[test]
fn test_cluster_radius_is_inclusive_and_pairwise() {
    // 一条直线上 7 个点,间隔 2km: 中间点 5km 内有 4 个邻居,端点只有 2 个
    let complaints: Vec<Complaint> = (0..7)
        .map(|i| {
            make_complaint(
                i + 1,
                "streetlight",
                ComplaintStatus::Reported,
                Some(GeoPoint::new(12.90 + (i as f64) * 2.0 / 111.195, 77.58)),
                1,
            )
        })
        .collect();

    let sizes = ClusterRule::default().cluster_sizes(&complaints);
    assert_eq!(sizes[&1], 3);
    assert_eq!(sizes[&4], 5);
    assert!(ClusterRule::default().select(&complaints).is_empty());

    // 阈值降到 4: 只有中间三个点的规模 = 5
    let rule = ClusterRule::new(5.0, 4);
    assert_eq!(rule.select(&complaints), vec![3, 4, 5]);
}
