use chrono::Timelike;

/// `m:ss`, as shown for run times and the grid countdown.
pub fn format_total_time(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// `h:mm AM` for the fake phone status bar.
pub fn format_time_12_hour<T: Timelike>(time: &T) -> String {
    let (is_pm, hour) = time.hour12();
    format!(
        "{}:{:02} {}",
        hour,
        time.minute(),
        if is_pm { "PM" } else { "AM" }
    )
}

pub fn format_best_time(best: Option<u32>) -> String {
    match best {
        Some(seconds) => format!("Best time: {}", format_total_time(seconds)),
        None => "Best time: --:--".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn test_format_total_time() {
        assert_eq!(format_total_time(0), "0:00");
        assert_eq!(format_total_time(59), "0:59");
        assert_eq!(format_total_time(300), "5:00");
        assert_eq!(format_total_time(3_725), "62:05");
    }

    #[test]
    fn test_format_time_12_hour() {
        let midnight = NaiveTime::from_hms_opt(0, 5, 0).unwrap();
        let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap();
        let evening = NaiveTime::from_hms_opt(21, 42, 10).unwrap();

        assert_eq!(format_time_12_hour(&midnight), "12:05 AM");
        assert_eq!(format_time_12_hour(&noon), "12:00 PM");
        assert_eq!(format_time_12_hour(&evening), "9:42 PM");
    }

    #[test]
    fn test_format_best_time() {
        assert_eq!(format_best_time(None), "Best time: --:--");
        assert_eq!(format_best_time(Some(83)), "Best time: 1:23");
    }
}
