//! Parsers for free-text user input.

use chrono::NaiveDateTime;
use thiserror::Error;

/// Date format users type for group trainings.
pub const INPUT_DATETIME_FORMAT: &str = "%d.%m.%Y %H:%M";

/// Storage format of `scheduled_at`.
pub const STORED_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A parsed `name / sets / reps / weight` block.
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseInput {
    pub name: String,
    pub sets: i64,
    pub reps: i64,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExerciseParseError {
    #[error("Неверный формат. Пожалуйста, укажите:\nНазвание\nПодходы\nПовторения\nВес")]
    WrongLineCount,

    /// Lists every field that failed, so one reply covers the whole block.
    #[error("Ошибка в числовых значениях ({}). Проверьте формат.", .0.join(", "))]
    InvalidNumbers(Vec<&'static str>),
}

fn non_empty_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Parse an exercise entry. Weight accepts a comma as decimal separator.
pub fn parse_exercise(text: &str) -> Result<ExerciseInput, ExerciseParseError> {
    let lines = non_empty_lines(text);
    if lines.len() < 4 {
        return Err(ExerciseParseError::WrongLineCount);
    }

    let name = lines[0].to_string();
    let sets = lines[1].parse::<i64>().ok().filter(|v| *v > 0);
    let reps = lines[2].parse::<i64>().ok().filter(|v| *v > 0);
    let weight = lines[3]
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0);

    let mut invalid = Vec::new();
    if sets.is_none() {
        invalid.push("подходы");
    }
    if reps.is_none() {
        invalid.push("повторения");
    }
    if weight.is_none() {
        invalid.push("вес");
    }

    match (sets, reps, weight) {
        (Some(sets), Some(reps), Some(weight)) => Ok(ExerciseInput {
            name,
            sets,
            reps,
            weight,
        }),
        _ => Err(ExerciseParseError::InvalidNumbers(invalid)),
    }
}

/// A parsed group training block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupTrainingInput {
    pub name: String,
    pub description: String,
    pub scheduled_at: NaiveDateTime,
    pub max_participants: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GroupTrainingParseError {
    #[error("Неверный формат. Отправьте четыре строки: название, описание, дата, участники.")]
    WrongLineCount,

    #[error("Ошибка в формате даты. Используйте ДД.ММ.ГГГГ ЧЧ:ММ")]
    InvalidDate,

    #[error("Дата тренировки должна быть в будущем.")]
    InPast,

    #[error("Ошибка в количестве участников.")]
    InvalidCapacity,
}

/// Parse `name / description / DD.MM.YYYY HH:MM / max participants`.
///
/// `now` is the local time the date must lie after.
pub fn parse_group_training(
    text: &str,
    now: NaiveDateTime,
) -> Result<GroupTrainingInput, GroupTrainingParseError> {
    let lines = non_empty_lines(text);
    if lines.len() < 4 {
        return Err(GroupTrainingParseError::WrongLineCount);
    }

    let scheduled_at = NaiveDateTime::parse_from_str(lines[2], INPUT_DATETIME_FORMAT)
        .map_err(|_| GroupTrainingParseError::InvalidDate)?;
    if scheduled_at <= now {
        return Err(GroupTrainingParseError::InPast);
    }

    let max_participants = lines[3]
        .parse::<i64>()
        .ok()
        .filter(|v| *v > 0)
        .ok_or(GroupTrainingParseError::InvalidCapacity)?;

    Ok(GroupTrainingInput {
        name: lines[0].to_string(),
        description: lines[1].to_string(),
        scheduled_at,
        max_participants,
    })
}

/// Parse a 1-based list number into a 0-based index below `len`.
pub fn parse_index(text: &str, len: usize) -> Option<usize> {
    let n = text.trim().parse::<usize>().ok()?;
    (1..=len).contains(&n).then(|| n - 1)
}

/// Strip the "удалить" prefix of a removal command, returning the rest.
pub fn strip_remove_command(text: &str) -> Option<&str> {
    let text = text.trim();
    let (word, rest) = text.split_once(char::is_whitespace)?;
    (word.to_lowercase() == "удалить").then(|| rest.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 20)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_exercise() {
        let input = parse_exercise("Жим лежа\n4\n10\n80").unwrap();
        assert_eq!(input.name, "Жим лежа");
        assert_eq!(input.sets, 4);
        assert_eq!(input.reps, 10);
        assert_eq!(input.weight, 80.0);
    }

    #[test]
    fn test_parse_exercise_comma_and_blank_lines() {
        let input = parse_exercise("  Присед \n\n5\n5\n102,5\n").unwrap();
        assert_eq!(input.name, "Присед");
        assert_eq!(input.weight, 102.5);
    }

    #[test]
    fn test_parse_exercise_reports_all_bad_numbers() {
        assert_eq!(
            parse_exercise("Жим лежа\nX\n10\nabc"),
            Err(ExerciseParseError::InvalidNumbers(vec!["подходы", "вес"]))
        );
        let err = parse_exercise("Жим лежа\nX\n10\n80").unwrap_err();
        assert!(err.to_string().contains("подходы"));
    }

    #[test]
    fn test_parse_exercise_too_short() {
        assert_eq!(
            parse_exercise("Жим лежа\n4\n10"),
            Err(ExerciseParseError::WrongLineCount)
        );
    }

    #[test]
    fn test_parse_group_training() {
        let input = parse_group_training(
            "Функциональный тренинг\nИнтенсивная тренировка\n25.01.2026 18:00\n15",
            now(),
        )
        .unwrap();
        assert_eq!(input.name, "Функциональный тренинг");
        assert_eq!(input.max_participants, 15);
        assert_eq!(
            input.scheduled_at.format(STORED_DATETIME_FORMAT).to_string(),
            "2026-01-25 18:00:00"
        );
    }

    #[test]
    fn test_parse_group_training_errors() {
        assert_eq!(
            parse_group_training("A\nB\n2026-01-25\n15", now()),
            Err(GroupTrainingParseError::InvalidDate)
        );
        assert_eq!(
            parse_group_training("A\nB\n19.01.2026 18:00\n15", now()),
            Err(GroupTrainingParseError::InPast)
        );
        assert_eq!(
            parse_group_training("A\nB\n25.01.2026 18:00\n0", now()),
            Err(GroupTrainingParseError::InvalidCapacity)
        );
        assert_eq!(
            parse_group_training("A\nB", now()),
            Err(GroupTrainingParseError::WrongLineCount)
        );
    }

    #[test]
    fn test_parse_index() {
        assert_eq!(parse_index("1", 3), Some(0));
        assert_eq!(parse_index(" 3 ", 3), Some(2));
        assert_eq!(parse_index("0", 3), None);
        assert_eq!(parse_index("4", 3), None);
        assert_eq!(parse_index("два", 3), None);
    }

    #[test]
    fn test_strip_remove_command() {
        assert_eq!(strip_remove_command("удалить 2"), Some("2"));
        assert_eq!(strip_remove_command("Удалить  3 "), Some("3"));
        assert_eq!(strip_remove_command("2"), None);
        assert_eq!(strip_remove_command("удалить"), None);
    }
}
