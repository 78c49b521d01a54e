use chrono::{DateTime, Local};
use tracing_subscriber::fmt::{format::Writer, time::FormatTime};

const LOG_TIME_PATTERN: &str = "%Y-%m-%d %H:%M:%S%:z";

pub fn now_local() -> DateTime<Local> {
    Local::now()
}

pub fn format_local(now: &DateTime<Local>, pattern: &str) -> String {
    now.format(pattern).to_string()
}

/// 日志时间戳使用本地时区
pub struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", format_local(&now_local(), LOG_TIME_PATTERN))
    }
}
