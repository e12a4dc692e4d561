//! Reply texts and list rendering.

use bot_core::escape_html;
use database::{
    ClientAccess, ClientSummary, ExerciseStat, GroupTrainingListing, OrgAccess, Organization,
    RoleGrant, WorkoutDetails,
};

pub const GREETING: &str = "Добро пожаловать! Выберите действие:";

pub const HELP: &str = r#"Я помогаю вести тренировки.

Команды:
• /start - главное меню
• /workout - записать свою тренировку
• /stats - прогресс по упражнению
• /cancel - отменить текущее действие
• /help - эта справка

Кнопка "🔙 Главное меню" работает из любого шага."#;

pub const ABOUT: &str = r#"🏋️ Бот для учёта тренировок.

Администратор создаёт организации, менеджеры добавляют тренеров, тренеры добавляют клиентов по @username. Клиенты записывают тренировки и следят за прогрессом."#;

pub const APOLOGY: &str = "❌ Произошла ошибка. Попробуйте /start";

pub const CANCELLED: &str = "Отменено.";

pub const NOT_ADMIN: &str = "❌ У вас нет прав администратора.";

pub const ACCESS_REVOKED: &str = "❌ Ваш доступ изменился. Действие прервано.";

pub const ALL_ACCESS_ARCHIVED: &str = "❌ Все ваши доступы к организациям были деактивированы.";

pub const STATE_EXPIRED: &str = "⌛ Кнопка устарела. Откройте список заново.";

pub const UNKNOWN_COMMAND: &str = "Неизвестная команда. Отправьте /help, чтобы увидеть список.";

pub const USE_MENU: &str = "Пожалуйста, выберите действие на клавиатуре.";

pub const WRONG_NUMBER: &str = "❌ Неверный номер. Попробуйте ещё раз.";

pub const STALE_NUMBER: &str = "❌ Неверный номер или список устарел.";

pub const TRY_AGAIN: &str = "❌ Не удалось сохранить. Попробуйте ещё раз.";

pub const ORG_NAME_PROMPT: &str = "Введите название новой организации:";

pub const ORG_CODE_PROMPT: &str = "Введите уникальный код организации (латиницей, без пробелов):";

pub const ORG_CODE_TAKEN: &str = "❌ Организация с таким кодом уже существует. Введите другой код:";

pub const NO_ORGANIZATIONS: &str = "Организаций пока нет. Создайте первую!";

pub const BAD_USERNAME: &str = "❌ Некорректный username. Введите в формате @username:";

pub const MUSCLE_PROMPT: &str = "Выберите группу мышц для тренировки:";

pub const MUSCLE_RETRY: &str = "Пожалуйста, выберите группу мышц из списка.";

pub const EXERCISE_FORMAT: &str = "Название\nПодходы\nПовторения\nВес (кг)\n\nНапример:\nЖим лежа\n4\n10\n80";

pub const PHOTO_STAGED: &str = "📷 Фото сохранено! Теперь отправьте данные упражнения.";
pub const PHOTO_KEPT: &str = "📷 Фото сохранено, отправьте данные упражнения текстом.";

pub const STATS_PROMPT: &str = "Введите название упражнения для просмотра прогресса:\n\nНапример: Жим лежа";

pub const GROUP_TRAINING_FORMAT: &str = "Отправьте данные в формате:\nНазвание\nОписание\nДата и время (ДД.ММ.ГГГГ ЧЧ:ММ)\nМакс. участников\n\nНапример:\nФункциональный тренинг\nИнтенсивная тренировка\n25.01.2026 18:00\n15";

pub const NO_GROUP_TRAININGS: &str = "Пока нет запланированных групповых тренировок.";

pub const NO_WORKOUTS: &str = "Тренировок пока нет.";

/// Shown to identities without any grant.
pub fn no_access(handle: &str) -> String {
    let handle = if handle.is_empty() {
        "не указан".to_string()
    } else {
        format!("@{}", handle)
    };
    format!(
        "👋 Привет! У вас пока нет доступа.\n\nВаш username: {}\nПопросите тренера или менеджера добавить вас по @username, затем отправьте /start.",
        handle
    )
}

/// Noun for a grant kind, capitalized.
pub fn role_noun(kind: database::GrantKind) -> &'static str {
    match kind {
        database::GrantKind::Manager => "Менеджер",
        database::GrantKind::Trainer => "Тренер",
        database::GrantKind::Client => "Клиент",
    }
}

/// Handle prompt for a grant kind.
pub fn handle_prompt(kind: database::GrantKind) -> &'static str {
    match kind {
        database::GrantKind::Manager => "Введите @username менеджера (например: @ivan_boss):",
        database::GrantKind::Trainer => "Введите @username тренера (например: @trainer_ivan):",
        database::GrantKind::Client => "Введите @username клиента (например: @client_ivan):",
    }
}

fn status_mark(active: bool) -> &'static str {
    if active {
        "✅"
    } else {
        "❌"
    }
}

pub fn organization_list(organizations: &[Organization]) -> String {
    let mut text = String::from("🏢 Выберите организацию для управления:\n\n");
    for (i, org) in organizations.iter().enumerate() {
        text.push_str(&format!("{}. {} (код: {})\n", i + 1, org.name, org.code));
    }
    text.push_str("\nОтправьте номер организации.");
    text
}

pub fn org_access_list(organizations: &[OrgAccess]) -> String {
    let mut text = String::from("🏢 Выберите организацию:\n\n");
    for (i, org) in organizations.iter().enumerate() {
        text.push_str(&format!("{}. {}\n", i + 1, org.organization_name));
    }
    text.push_str("\nОтправьте номер организации.");
    text
}

/// Numbered grant list for removal.
pub fn grant_list(heading: &str, grants: &[RoleGrant], noun: &str) -> String {
    let mut text = format!("{}\n\n", heading);
    for (i, grant) in grants.iter().enumerate() {
        text.push_str(&format!(
            "{}. @{} {}\n",
            i + 1,
            grant.username,
            status_mark(grant.status.is_active())
        ));
    }
    text.push_str(&format!("\nДля удаления {} отправьте его номер.", noun));
    text
}

pub fn client_list(organization_name: &str, clients: &[ClientSummary]) -> String {
    let mut text = format!("👥 Ваши клиенты в организации {}:\n\n", organization_name);
    for (i, client) in clients.iter().enumerate() {
        text.push_str(&format!("{}. @{}", i + 1, client.username));
        if let Some(name) = client.full_name.as_deref().filter(|n| !n.is_empty()) {
            text.push_str(&format!(" ({})", name));
        }
        text.push_str(&format!(
            " {} | {} тренировок",
            status_mark(client.status.is_active()),
            client.workout_count
        ));
        if let Some(last) = &client.last_workout {
            text.push_str(&format!(" | последняя: {}", last));
        }
        text.push('\n');
    }
    text.push_str("\n📊 Для просмотра клиента отправьте его номер.");
    text.push_str("\n❌ Для удаления: удалить [номер]");
    text
}

pub fn client_card(client: &ClientSummary) -> String {
    let status = if client.status.is_active() {
        "Активен ✅"
    } else {
        "Деактивирован ❌"
    };
    let mut text = format!("👤 @{}\n", client.username);
    if let Some(name) = client.full_name.as_deref().filter(|n| !n.is_empty()) {
        text.push_str(&format!("Имя: {}\n", name));
    }
    text.push_str(&format!(
        "Статус: {}\nТренировок: {}\n",
        status, client.workout_count
    ));
    if let Some(last) = &client.last_workout {
        text.push_str(&format!("Последняя: {}\n", last));
    }
    text.push_str("\nДействия:\n");
    for (number, action) in crate::menu::CLIENT_ACTIONS {
        text.push_str(&format!("{}. {}\n", number, action.title()));
    }
    text
}

pub fn trainer_choice_list(trainers: &[ClientAccess]) -> String {
    let mut text = String::from("🏋️ Выберите тренера:\n\n");
    for (i, access) in trainers.iter().enumerate() {
        text.push_str(&format!(
            "{}. @{} ({})\n",
            i + 1,
            access.trainer_username,
            access.organization_name
        ));
    }
    text.push_str("\nОтправьте номер тренера.");
    text
}

pub fn archive_list(archived: &[ClientAccess]) -> String {
    let mut text = String::from("📚 Архив тренировок\nДоступ завершён, но история сохранена.\n\n");
    for (i, access) in archived.iter().enumerate() {
        text.push_str(&format!(
            "{}. @{} ({})\n",
            i + 1,
            access.trainer_username,
            access.organization_name
        ));
    }
    text.push_str("\nВыберите номер для просмотра истории:");
    text
}

/// HTML history of recent workouts.
pub fn workout_history(title: &str, workouts: &[WorkoutDetails]) -> String {
    if workouts.is_empty() {
        return NO_WORKOUTS.to_string();
    }

    let mut text = format!("<b>{}</b>\n", escape_html(title));
    for details in workouts {
        text.push_str(&format!(
            "\n📅 {} - {}\n",
            details.workout.date,
            details.workout.muscle_group.as_str()
        ));
        for exercise in &details.exercises {
            text.push_str(&format!(
                "  • {}: {} x {} ({:.1} кг)\n",
                escape_html(&exercise.name),
                exercise.sets,
                exercise.reps,
                exercise.weight
            ));
        }
    }
    text
}

pub fn group_training_list(trainings: &[GroupTrainingListing], with_join_hint: bool) -> String {
    if trainings.is_empty() {
        return NO_GROUP_TRAININGS.to_string();
    }

    let mut text = String::from("📅 Групповые тренировки:\n\n");
    for (i, training) in trainings.iter().enumerate() {
        text.push_str(&format!("{}. {}\n", i + 1, training.name));
        if !training.description.is_empty() {
            text.push_str(&format!("   📝 {}\n", training.description));
        }
        text.push_str(&format!(
            "   📅 {}\n   👥 {}/{} участников\n   🏋️ @{}\n\n",
            training.scheduled_at,
            training.participants,
            training.max_participants,
            training.trainer_username
        ));
    }
    if with_join_hint {
        text.push_str("Чтобы записаться, отправьте номер тренировки.");
    }
    text
}

/// HTML progress summary. `stats` are newest first.
pub fn exercise_progress(exercise: &str, label: &str, months: u32, stats: &[ExerciseStat]) -> String {
    let mut text = format!(
        "📊 <b>{}</b> ({}), последние {} мес.\n\n",
        escape_html(exercise),
        escape_html(label),
        months
    );

    for stat in stats.iter().rev() {
        text.push_str(&format!(
            "{}: {}×{}, {:.1} кг\n",
            stat.date, stat.sets, stat.reps, stat.weight
        ));
    }

    let best = stats.iter().map(|s| s.weight).fold(f64::MIN, f64::max);
    text.push_str(&format!("\n🏆 Лучший вес: {:.1} кг", best));

    if let (Some(newest), Some(oldest)) = (stats.first(), stats.last()) {
        if stats.len() > 1 {
            text.push_str(&format!(
                "\n📈 Прогресс: {:+.1} кг",
                newest.weight - oldest.weight
            ));
        }
    }
    text
}
