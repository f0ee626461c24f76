// ==========================================
// 配置层集成测试
// ==========================================
// 测试目标: config_kv 读写、默认值回退、配置对 AppState 的生效
// ==========================================

mod test_helpers;

use chrono::Duration;
use fixit_complaints::config::{
    config_keys, ConfigManager, EscalationConfigReader, EscalationSettings,
};
use test_helpers::*;

#[test]
fn test_defaults_when_table_empty() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let manager = ConfigManager::new(&db_path).unwrap();

    let settings = manager.load_escalation_settings().unwrap();
    assert_eq!(settings, EscalationSettings::default());
    assert_eq!(settings.age_threshold_hours, 24);
    assert_eq!(settings.cluster_neighbor_threshold, 5);
}

#[test]
fn test_malformed_values_fall_back() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let manager = ConfigManager::new(&db_path).unwrap();

    manager
        .set_config_value(config_keys::ESCALATION_AGE_HOURS, "soon")
        .unwrap();
    manager
        .set_config_value(config_keys::NEARBY_DEFAULT_LIMIT, "500")
        .unwrap();
    manager
        .set_config_value(config_keys::CLUSTER_RADIUS_KM, "2.5")
        .unwrap();

    let settings = manager.load_escalation_settings().unwrap();
    assert_eq!(settings.age_threshold_hours, 24);
    assert_eq!(settings.nearby_default_limit, 50);
    assert_eq!(settings.cluster_radius_km, 2.5);

    let snapshot = manager.get_config_snapshot().unwrap();
    assert!(snapshot.contains("cluster_radius_km"));
}

#[test]
fn test_configured_threshold_reaches_escalation() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let manager = ConfigManager::new(&db_path).unwrap();
    manager
        .set_config_value(config_keys::CLUSTER_NEIGHBOR_THRESHOLD, "2")
        .unwrap();

    let conn = open_test_connection(&db_path).unwrap();
    let now = base_time();
    for i in 0..3 {
        let lng = 77.58 + 0.002 * i as f64;
        seed_complaint(&conn, "water_leak", "Medium", "Reported", Some((12.90, lng)), now).unwrap();
    }

    // 默认阈值 5 下三条不会升级;配置为 2 后聚集规模 3 > 2
    let state = build_state(&db_path);
    let report = state.escalation_api.run_auto_escalation_at(now).unwrap();
    assert_eq!(report.temporal.escalated_count(), 0);
    assert_eq!(report.cluster.escalated_count(), 3);
}

#[test]
fn test_oversized_age_threshold_does_not_block_startup() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let manager = ConfigManager::new(&db_path).unwrap();
    manager
        .set_config_value(config_keys::ESCALATION_AGE_HOURS, "9223372036854775807")
        .unwrap();

    let conn = open_test_connection(&db_path).unwrap();
    let now = base_time();
    let overdue =
        seed_complaint(&conn, "pothole", "Low", "Reported", None, now - Duration::hours(30))
            .unwrap();

    // 回退到默认 24 小时
    let state = build_state(&db_path);
    let report = state.escalation_api.escalate_overdue_at(None, now).unwrap();
    assert_eq!(report.escalated_ids, vec![overdue]);
}

#[tokio::test]
async fn test_scheduler_settings_via_reader() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let manager = ConfigManager::new(&db_path).unwrap();

    assert_eq!(manager.get_escalation_interval_secs().await.unwrap(), 3_600);
    assert_eq!(manager.get_store_timeout_secs().await.unwrap(), 30);

    manager
        .set_config_value(config_keys::ESCALATION_INTERVAL_SECS, "120")
        .unwrap();
    manager
        .set_config_value(config_keys::STORE_TIMEOUT_SECS, "0")
        .unwrap();
    assert_eq!(manager.get_escalation_interval_secs().await.unwrap(), 120);
    assert_eq!(manager.get_store_timeout_secs().await.unwrap(), 30);
}
