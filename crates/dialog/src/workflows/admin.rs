//! Organization provisioning and manager grants.

use bot_core::Messenger;
use database::{grant, organization, validation, DatabaseError, GrantKind, Organization, RoleGrant};
use tracing::{debug, info};

use crate::engine::{DialogEngine, Turn};
use crate::error::Result;
use crate::menu;
use crate::parse::parse_index;
use crate::state::{DialogState, OrgContext};
use crate::texts;

impl<M: Messenger> DialogEngine<M> {
    pub(crate) async fn admin_panel(&self, turn: &Turn<'_>) -> Result<()> {
        if !turn.access.is_admin {
            return self.reply(turn, texts::NOT_ADMIN).await;
        }

        let count = organization::count_organizations(self.db.pool()).await?;
        let text = format!("👑 Админ-панель\n\nОрганизаций: {}\n\nВыберите действие:", count);
        self.clear(turn).await;
        self.messenger
            .send_with_menu(turn.chat_id, &text, &menu::admin_menu())
            .await?;
        Ok(())
    }

    pub(crate) async fn begin_create_org(&self, turn: &Turn<'_>) -> Result<()> {
        self.enter(turn, DialogState::AdminCreatingOrgName, texts::ORG_NAME_PROMPT)
            .await
    }

    pub(crate) async fn org_name_entered(&self, turn: &Turn<'_>, text: &str) -> Result<()> {
        match validation::validate_org_name(text) {
            Ok(name) => {
                let prompt = format!("Название: {}\n\n{}", name, texts::ORG_CODE_PROMPT);
                self.enter(turn, DialogState::AdminCreatingOrgCode { name }, &prompt)
                    .await
            }
            Err(e) => {
                log_rejected(turn, &e);
                self.reply(turn, "❌ Название не может быть пустым. Введите название организации:")
                    .await
            }
        }
    }

    /// Commit the organization. A taken code re-prompts and keeps the name.
    pub(crate) async fn org_code_entered(
        &self,
        turn: &Turn<'_>,
        name: &str,
        text: &str,
    ) -> Result<()> {
        match organization::create_organization(self.db.pool(), name, text).await {
            Ok(org) => {
                info!("Admin {} created organization {} ({})", turn.user_id(), org.name, org.code);
                let text = format!(
                    "✅ Организация создана!\n\nНазвание: {}\nКод: {}",
                    org.name, org.code
                );
                self.clear(turn).await;
                self.messenger
                    .send_with_menu(turn.chat_id, &text, &menu::admin_menu())
                    .await?;
                Ok(())
            }
            Err(DatabaseError::AlreadyExists { .. }) => self.reply(turn, texts::ORG_CODE_TAKEN).await,
            Err(DatabaseError::Invalid(e)) => {
                log_rejected(turn, &e);
                self.reply(turn, "❌ Некорректный код. Используйте буквы и цифры без пробелов:")
                    .await
            }
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) async fn list_organizations(&self, turn: &Turn<'_>) -> Result<()> {
        let organizations = organization::list_organizations(self.db.pool()).await?;
        if organizations.is_empty() {
            self.clear(turn).await;
            self.messenger
                .send_with_menu(turn.chat_id, texts::NO_ORGANIZATIONS, &menu::admin_menu())
                .await?;
            return Ok(());
        }

        let text = texts::organization_list(&organizations);
        let buttons = menu::numbered_buttons(
            "org",
            "select",
            organizations.iter().map(|o| (o.id, o.name.as_str())),
        );
        self.enter(turn, DialogState::AdminSelectingOrg { organizations }, &text)
            .await?;
        self.send_transient(turn, "Или нажмите на организацию:", &buttons)
            .await
    }

    pub(crate) async fn admin_org_chosen(
        &self,
        turn: &Turn<'_>,
        organizations: &[Organization],
        text: &str,
    ) -> Result<()> {
        match parse_index(text, organizations.len()) {
            Some(i) => self.open_admin_org(turn, OrgContext::from(&organizations[i])).await,
            None => self.reply(turn, texts::WRONG_NUMBER).await,
        }
    }

    pub(crate) async fn open_admin_org(&self, turn: &Turn<'_>, org: OrgContext) -> Result<()> {
        let managers =
            grant::count_active_grants(self.db.pool(), GrantKind::Manager, org.organization_id)
                .await?;
        let text = format!(
            "🏢 {}\n\nАктивных менеджеров: {}\n\nВыберите действие:",
            org.organization_name, managers
        );
        self.enter(turn, DialogState::AdminManagingOrg { org }, &text)
            .await
    }

    pub(crate) async fn admin_managing(
        &self,
        turn: &Turn<'_>,
        org: OrgContext,
        text: &str,
    ) -> Result<()> {
        match text {
            menu::ADD_MANAGER => {
                let prompt = texts::handle_prompt(GrantKind::Manager);
                self.enter(turn, DialogState::AdminAddingManager { org }, prompt)
                    .await
            }
            menu::LIST_MANAGERS => self.list_managers(turn, org).await,
            menu::BACK_TO_ORGS => self.list_organizations(turn).await,
            _ => self.reply(turn, texts::USE_MENU).await,
        }
    }

    pub(crate) async fn manager_entered(
        &self,
        turn: &Turn<'_>,
        org: OrgContext,
        text: &str,
    ) -> Result<()> {
        let (scope_id, scope_name) = (org.organization_id, org.organization_name.clone());
        self.grant_from_text(
            turn,
            GrantKind::Manager,
            scope_id,
            &scope_name,
            text,
            DialogState::AdminManagingOrg { org },
        )
        .await
    }

    async fn list_managers(&self, turn: &Turn<'_>, org: OrgContext) -> Result<()> {
        let managers =
            grant::list_grants(self.db.pool(), GrantKind::Manager, org.organization_id).await?;
        if managers.is_empty() {
            return self.reply(turn, "Менеджеров пока нет.").await;
        }

        let heading = format!("👥 Менеджеры организации {}:", org.organization_name);
        let text = texts::grant_list(&heading, &managers, "менеджера");
        let buttons = removal_buttons("manager", &managers);
        self.enter(turn, DialogState::AdminRemovingManager { org, managers }, &text)
            .await?;
        if !buttons.is_empty() {
            self.send_transient(turn, "Удалить менеджера:", &buttons)
                .await?;
        }
        Ok(())
    }

    pub(crate) async fn manager_to_remove(
        &self,
        turn: &Turn<'_>,
        org: OrgContext,
        managers: &[RoleGrant],
        text: &str,
    ) -> Result<()> {
        if matches!(text, menu::ADD_MANAGER | menu::LIST_MANAGERS | menu::BACK_TO_ORGS) {
            return self.admin_managing(turn, org, text).await;
        }

        match parse_index(text, managers.len()) {
            Some(i) => self.remove_manager(turn, org, &managers[i]).await,
            None => self.reply(turn, texts::WRONG_NUMBER).await,
        }
    }

    /// Archive a manager from the stored list, even if it changed since.
    pub(crate) async fn remove_manager(
        &self,
        turn: &Turn<'_>,
        org: OrgContext,
        manager: &RoleGrant,
    ) -> Result<()> {
        let text = self
            .archive_outcome(
                GrantKind::Manager,
                org.organization_id,
                &org.organization_name,
                &manager.username,
            )
            .await;
        self.enter(turn, DialogState::AdminManagingOrg { org }, &text)
            .await
    }
}

/// Inline remove buttons for the active grants of a list.
pub(super) fn removal_buttons(prefix: &str, grants: &[RoleGrant]) -> bot_core::InlineKeyboard {
    menu::numbered_buttons(
        prefix,
        "remove",
        grants
            .iter()
            .filter(|g| g.status.is_active())
            .map(|g| (g.id, g.username.as_str())),
    )
}

fn log_rejected(turn: &Turn<'_>, e: &validation::ValidationError) {
    debug!("Rejected input from {}: {}", turn.user_id(), e);
}
