use chrono::{Local, NaiveDateTime, NaiveTime};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::info;

/// Logs each local-midnight rollover. Reports always filter by the caller's
/// "today", so nothing needs resetting here.
pub(crate) fn spawn_midnight_ticker() -> JoinHandle<()> {
    tokio::spawn(async {
        loop {
            tokio::time::sleep(until_next_midnight(Local::now().naive_local())).await;
            info!(day = %Local::now().date_naive(), "absence day rolled over");
        }
    })
}

pub(crate) fn until_next_midnight(now: NaiveDateTime) -> Duration {
    let Some(next_day) = now.date().succ_opt() else {
        return Duration::from_secs(24 * 60 * 60);
    };
    (next_day.and_time(NaiveTime::default()) - now)
        .to_std()
        .unwrap_or(Duration::from_secs(1))
        .max(Duration::from_secs(1))
}
