//! Trainer grants managed by organization managers.

use bot_core::Messenger;
use database::{grant, GrantKind, OrgAccess, RoleGrant};

use super::admin::removal_buttons;
use crate::engine::{DialogEngine, Turn};
use crate::error::Result;
use crate::menu;
use crate::parse::parse_index;
use crate::state::{DialogState, OrgContext};
use crate::texts;

impl<M: Messenger> DialogEngine<M> {
    /// Open the only managed organization, or ask which one.
    pub(crate) async fn manager_panel(&self, turn: &Turn<'_>) -> Result<()> {
        let organizations: Vec<OrgAccess> =
            turn.access.active_managers().into_iter().cloned().collect();

        match organizations.as_slice() {
            [] => self.reply(turn, "❌ У вас нет организаций для управления.").await,
            [only] => self.open_manager_org(turn, OrgContext::from(only)).await,
            _ => {
                let text = texts::org_access_list(&organizations);
                let buttons = org_buttons(&organizations);
                self.enter(turn, DialogState::ManagerSelectingOrg { organizations }, &text)
                    .await?;
                self.send_transient(turn, "Или нажмите на организацию:", &buttons)
                    .await
            }
        }
    }

    pub(crate) async fn manager_org_chosen(
        &self,
        turn: &Turn<'_>,
        organizations: &[OrgAccess],
        text: &str,
    ) -> Result<()> {
        match parse_index(text, organizations.len()) {
            Some(i) => self.open_manager_org(turn, OrgContext::from(&organizations[i])).await,
            None => self.reply(turn, texts::WRONG_NUMBER).await,
        }
    }

    pub(crate) async fn open_manager_org(&self, turn: &Turn<'_>, org: OrgContext) -> Result<()> {
        let trainers =
            grant::count_active_grants(self.db.pool(), GrantKind::Trainer, org.organization_id)
                .await?;
        let text = format!(
            "🏢 Управление организацией {}\n\nАктивных тренеров: {}\n\nВыберите действие:",
            org.organization_name, trainers
        );
        self.enter(turn, DialogState::ManagerManagingOrg { org }, &text)
            .await
    }

    pub(crate) async fn manager_managing(
        &self,
        turn: &Turn<'_>,
        org: OrgContext,
        text: &str,
    ) -> Result<()> {
        match text {
            menu::ADD_TRAINER => {
                let prompt = texts::handle_prompt(GrantKind::Trainer);
                self.enter(turn, DialogState::ManagerAddingTrainer { org }, prompt)
                    .await
            }
            menu::LIST_TRAINERS => self.list_trainers(turn, org).await,
            _ => self.reply(turn, texts::USE_MENU).await,
        }
    }

    pub(crate) async fn trainer_entered(
        &self,
        turn: &Turn<'_>,
        org: OrgContext,
        text: &str,
    ) -> Result<()> {
        let (scope_id, scope_name) = (org.organization_id, org.organization_name.clone());
        self.grant_from_text(
            turn,
            GrantKind::Trainer,
            scope_id,
            &scope_name,
            text,
            DialogState::ManagerManagingOrg { org },
        )
        .await
    }

    async fn list_trainers(&self, turn: &Turn<'_>, org: OrgContext) -> Result<()> {
        let trainers =
            grant::list_grants(self.db.pool(), GrantKind::Trainer, org.organization_id).await?;
        if trainers.is_empty() {
            return self.reply(turn, "Тренеров пока нет.").await;
        }

        let heading = format!("🏋️ Тренеры организации {}:", org.organization_name);
        let text = texts::grant_list(&heading, &trainers, "тренера");
        let buttons = removal_buttons("trainer", &trainers);
        self.enter(turn, DialogState::ManagerRemovingTrainer { org, trainers }, &text)
            .await?;
        if !buttons.is_empty() {
            self.send_transient(turn, "Удалить тренера:", &buttons)
                .await?;
        }
        Ok(())
    }

    pub(crate) async fn trainer_to_remove(
        &self,
        turn: &Turn<'_>,
        org: OrgContext,
        trainers: &[RoleGrant],
        text: &str,
    ) -> Result<()> {
        if matches!(text, menu::ADD_TRAINER | menu::LIST_TRAINERS) {
            return self.manager_managing(turn, org, text).await;
        }

        match parse_index(text, trainers.len()) {
            Some(i) => self.remove_trainer(turn, org, &trainers[i]).await,
            None => self.reply(turn, texts::WRONG_NUMBER).await,
        }
    }

    pub(crate) async fn remove_trainer(
        &self,
        turn: &Turn<'_>,
        org: OrgContext,
        trainer: &RoleGrant,
    ) -> Result<()> {
        let text = self
            .archive_outcome(
                GrantKind::Trainer,
                org.organization_id,
                &org.organization_name,
                &trainer.username,
            )
            .await;
        self.enter(turn, DialogState::ManagerManagingOrg { org }, &text)
            .await
    }
}

/// Inline `org:<id>:select` buttons for an org choice.
pub(super) fn org_buttons(organizations: &[OrgAccess]) -> bot_core::InlineKeyboard {
    menu::numbered_buttons(
        "org",
        "select",
        organizations
            .iter()
            .map(|o| (o.organization_id, o.organization_name.as_str())),
    )
}
