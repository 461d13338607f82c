use chrono::{DateTime, Utc};
use contracts::system::tasks::aggregate::TaskDefinition;
use cron::Schedule;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid schedule '{expression}': {reason}")]
pub struct ScheduleError {
    pub expression: String,
    pub reason: String,
}

const WEEKDAYS: [&str; 7] = ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];

/// Разбирает cron-выражение.
///
/// Классические 5 полей (минуты первыми) дополняются нулевыми секундами, а
/// день недели переводится из нумерации 0-7 (воскресенье = 0 или 7) в имена:
/// `cron` считает воскресенье первым днём (1-7).
/// Выражения из 6-7 полей и сокращения вида `@daily` передаются как есть.
pub fn parse_schedule(expression: &str) -> Result<Schedule, ScheduleError> {
    let trimmed = expression.trim();
    let fields: Vec<&str> = trimmed.split_whitespace().collect();
    let normalized = if !trimmed.starts_with('@') && fields.len() == 5 {
        format!(
            "0 {} {} {} {} {}",
            fields[0],
            fields[1],
            fields[2],
            fields[3],
            classic_day_of_week(fields[4])
        )
    } else {
        trimmed.to_string()
    };

    Schedule::from_str(&normalized).map_err(|e| ScheduleError {
        expression: expression.to_string(),
        reason: e.to_string(),
    })
}

fn classic_day_of_week(field: &str) -> String {
    field
        .split(',')
        .map(classic_weekday_item)
        .collect::<Vec<_>>()
        .join(",")
}

/// Один элемент списка: `*`, `N`, `N-M`, любой из них с `/шаг`.
/// Имена дней и то, что не удалось разобрать, остаются как есть.
fn classic_weekday_item(item: &str) -> String {
    let (range, step) = match item.split_once('/') {
        Some((range, step)) => (range, Some(step)),
        None => (item, None),
    };
    let step = match step.map(str::parse::<usize>) {
        None => 1,
        Some(Ok(step)) if step > 0 => step,
        _ => return item.to_string(),
    };

    let bounds = if range == "*" {
        if step == 1 {
            return item.to_string();
        }
        Some((0, 6))
    } else if let Some((from, to)) = range.split_once('-') {
        from.parse::<usize>().ok().zip(to.parse::<usize>().ok())
    } else {
        // `N/шаг` идёт от N до конца недели
        range
            .parse::<usize>()
            .ok()
            .map(|day| if step == 1 { (day, day) } else { (day, 6) })
    };

    match bounds {
        Some((from, to)) if from <= to && to <= 7 => {
            let mut days: Vec<usize> = (from..=to).step_by(step).map(|day| day % 7).collect();
            days.sort_unstable();
            days.dedup();
            days.iter()
                .map(|day| WEEKDAYS[*day])
                .collect::<Vec<_>>()
                .join(",")
        }
        _ => item.to_string(),
    }
}

/// Дата следующего запуска.
///
/// Ни разу не запускавшееся задание должно выполниться сразу (`now`), иначе
/// берётся первое срабатывание расписания после последнего запуска.
/// `None`: расписание больше не сработает.
pub fn next_run_date(
    task: &TaskDefinition,
    now: DateTime<Utc>,
) -> Result<Option<DateTime<Utc>>, ScheduleError> {
    let schedule = parse_schedule(&task.schedule)?;
    Ok(match task.last_run_dt {
        None => Some(now),
        Some(last) => schedule.after(&last).next(),
    })
}

/// Пора ли запускать задание. Флаг `run_now` срабатывает независимо от расписания.
pub fn is_due(task: &TaskDefinition, now: DateTime<Utc>) -> Result<bool, ScheduleError> {
    if task.run_now {
        return Ok(true);
    }
    Ok(next_run_date(task, now)?.is_some_and(|next| next <= now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone, Weekday};

    fn task(schedule: &str, last_run: Option<DateTime<Utc>>) -> TaskDefinition {
        let mut task = TaskDefinition::new_for_insert(
            "t".to_string(),
            "tasks/t.task".to_string(),
            schedule.to_string(),
        );
        task.last_run_dt = last_run;
        task
    }

    #[test]
    fn test_accepts_common_forms() {
        assert!(parse_schedule("*/5 * * * *").is_ok());
        assert!(parse_schedule("0 0 3 * * *").is_ok());
        assert!(parse_schedule("@hourly").is_ok());
        assert!(parse_schedule("every tuesday").is_err());
        assert!(parse_schedule("").is_err());
    }

    fn weekdays_after(expression: &str, from: DateTime<Utc>, count: usize) -> Vec<Weekday> {
        parse_schedule(expression)
            .unwrap()
            .after(&from)
            .take(count)
            .map(|at| at.weekday())
            .collect()
    }

    #[test]
    fn test_classic_day_of_week_numbering() {
        // среда
        let wednesday = Utc.with_ymd_and_hms(2024, 5, 1, 3, 0, 0).unwrap();

        let next = parse_schedule("0 3 * * 1").unwrap().after(&wednesday).next().unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 5, 6, 3, 0, 0).unwrap());
        assert_eq!(next.weekday(), Weekday::Mon);

        assert_eq!(weekdays_after("0 3 * * 0", wednesday, 2), vec![Weekday::Sun; 2]);
        assert_eq!(weekdays_after("0 3 * * 7", wednesday, 1), vec![Weekday::Sun]);
        assert_eq!(
            weekdays_after("0 3 * * 1-5", wednesday, 5),
            vec![Weekday::Thu, Weekday::Fri, Weekday::Mon, Weekday::Tue, Weekday::Wed]
        );
        assert_eq!(
            weekdays_after("0 3 * * 5-7", wednesday, 3),
            vec![Weekday::Fri, Weekday::Sat, Weekday::Sun]
        );
        assert_eq!(
            weekdays_after("0 3 * * */2", wednesday, 4),
            vec![Weekday::Thu, Weekday::Sat, Weekday::Sun, Weekday::Tue]
        );
        assert_eq!(
            weekdays_after("0 3 * * 0,3", wednesday, 2),
            vec![Weekday::Sun, Weekday::Wed]
        );
        assert_eq!(
            weekdays_after("0 3 * * Mon-Fri", wednesday, 1),
            vec![Weekday::Thu]
        );
    }

    #[test]
    fn test_day_of_week_out_of_range_is_rejected() {
        assert!(parse_schedule("0 3 * * 8").is_err());
        assert!(parse_schedule("0 3 * * 5-9").is_err());
    }

    #[test]
    fn test_never_run_task_is_due_now() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let t = task("0 3 * * *", None);
        assert_eq!(next_run_date(&t, now).unwrap(), Some(now));
        assert!(is_due(&t, now).unwrap());
    }

    #[test]
    fn test_next_fire_after_last_run() {
        let last = Utc.with_ymd_and_hms(2024, 5, 1, 3, 0, 0).unwrap();
        let t = task("0 3 * * *", Some(last));

        let expected = Utc.with_ymd_and_hms(2024, 5, 2, 3, 0, 0).unwrap();
        let before = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        assert_eq!(next_run_date(&t, before).unwrap(), Some(expected));
        assert!(!is_due(&t, before).unwrap());

        let after = Utc.with_ymd_and_hms(2024, 5, 2, 3, 0, 30).unwrap();
        assert!(is_due(&t, after).unwrap());
    }

    #[test]
    fn test_run_now_overrides_schedule() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut t = task("0 3 * * *", Some(now));
        assert!(!is_due(&t, now).unwrap());
        t.run_now = true;
        assert!(is_due(&t, now).unwrap());

        t.schedule = "broken".to_string();
        assert!(is_due(&t, now).unwrap());
        t.run_now = false;
        assert!(is_due(&t, now).is_err());
    }
}
