use chrono::{DateTime, Datelike, FixedOffset, Local};
use glib::MainContext;
use once_cell::sync::Lazy;

pub static RUNTIME: Lazy<tokio::runtime::Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to build Tokio runtime")
});

pub fn spawn_async<F>(fut: F)
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    RUNTIME.spawn(fut);
}

pub fn glib_channel<T: Send + 'static>() -> (glib::Sender<T>, glib::Receiver<T>) {
    MainContext::channel(glib::Priority::default())
}

pub fn run_async_to_main<T, E, Fut>(fut: Fut) -> glib::Receiver<Result<T, E>>
where
    T: Send + 'static,
    E: Send + 'static,
    Fut: std::future::Future<Output = Result<T, E>> + Send + 'static,
{
    let (tx, rx) = glib_channel::<Result<T, E>>();
    spawn_async(async move {
        let res = fut.await;
        let _ = tx.send(res);
    });
    rx
}

pub fn normalize_url(input: &str) -> String {
    let trimmed = input.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return String::new();
    }
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

/// Long date-time for the groups table, e.g. `October 18th 2026, 3:04:05 pm`.
pub fn format_long_date<Tz>(date: &DateTime<Tz>) -> String
where
    Tz: chrono::TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let day = date.day();
    format!(
        "{} {}{} {}",
        date.format("%B"),
        day,
        ordinal_suffix(day),
        date.format("%Y, %-I:%M:%S %P")
    )
}

pub fn format_modified_date(date: Option<&DateTime<FixedOffset>>) -> String {
    match date {
        Some(d) => format_long_date(&d.with_timezone(&Local)),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_adds_scheme_and_drops_trailing_slash() {
        assert_eq!(normalize_url(" 127.0.0.1:3333/ "), "https://127.0.0.1:3333");
        assert_eq!(normalize_url("http://phish.local"), "http://phish.local");
        assert_eq!(normalize_url("   "), "");
    }

    #[test]
    fn long_date_uses_ordinals_and_twelve_hour_clock() {
        let date = DateTime::parse_from_rfc3339("2026-10-18T15:04:05-04:00").unwrap();
        assert_eq!(format_long_date(&date), "October 18th 2026, 3:04:05 pm");

        let date = DateTime::parse_from_rfc3339("2026-03-01T09:30:00+00:00").unwrap();
        assert_eq!(format_long_date(&date), "March 1st 2026, 9:30:00 am");
    }

    #[test]
    fn teens_take_th() {
        assert_eq!(ordinal_suffix(11), "th");
        assert_eq!(ordinal_suffix(12), "th");
        assert_eq!(ordinal_suffix(13), "th");
        assert_eq!(ordinal_suffix(22), "nd");
        assert_eq!(ordinal_suffix(23), "rd");
    }

    #[test]
    fn missing_date_renders_empty() {
        assert_eq!(format_modified_date(None), "");
    }
}
