// ==========================================
// 市政投诉工单系统 - 展示文本格式化
// ==========================================
// 职责: 上报时间（"3rd Jan, 4:15pm"）与等待时长（"1 days 2 hrs"）
// ==========================================

use chrono::{Datelike, NaiveDateTime};

/// 日期序数后缀（11/12/13 一律 th）
pub fn day_suffix(day: u32) -> &'static str {
    if (11..=13).contains(&day) {
        return "th";
    }
    match day % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

/// 上报时间: "<日><后缀> <月>, <h:mm am/pm>"
pub fn format_reported_time(dt: NaiveDateTime) -> String {
    let day = dt.day();
    format!(
        "{}{} {}, {}",
        day,
        day_suffix(day),
        dt.format("%b"),
        dt.format("%-I:%M%P")
    )
}

/// 等待时长: "<d> days <h> hrs",为零的部分省略,都为零时为 "Just now"
///
/// 上报时间晚于 now（时钟偏差）按零处理。
pub fn format_waiting_time(reported_at: NaiveDateTime, now: NaiveDateTime) -> String {
    let elapsed_secs = (now - reported_at).num_seconds().max(0);
    let days = elapsed_secs / 86_400;
    let hours = (elapsed_secs % 86_400) / 3_600;

    let mut parts = Vec::with_capacity(2);
    if days > 0 {
        parts.push(format!("{} days", days));
    }
    if hours > 0 {
        parts.push(format!("{} hrs", hours));
    }

    if parts.is_empty() {
        "Just now".to_string()
    } else {
        parts.join(" ")
    }
}
