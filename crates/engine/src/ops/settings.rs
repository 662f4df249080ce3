use sea_orm::{ActiveValue, QueryFilter, prelude::*, sea_query::OnConflict};

use crate::{
    EngineError, ResultEngine,
    cache::CacheScope,
    commands::{GetStatementDay, Handler, SetStatementDay},
    period::{STATEMENT_DAY_MAX, STATEMENT_DAY_MIN, clamp_statement_day},
    settings::{self, DEFAULT_STATEMENT_DAY, STATEMENT_DAY_KEY},
};

use super::Engine;

impl Engine {
    /// Configured bank-statement anchor day, falling back to the default when
    /// unset or unreadable.
    pub(super) async fn statement_day(&self) -> ResultEngine<u32> {
        let row = settings::Entity::find()
            .filter(settings::Column::Key.eq(STATEMENT_DAY_KEY))
            .one(&self.database)
            .await?;
        let Some(row) = row else {
            return Ok(DEFAULT_STATEMENT_DAY);
        };
        match row.content.trim().parse::<u32>() {
            Ok(day) => Ok(clamp_statement_day(day)),
            Err(_) => {
                tracing::warn!(value = %row.content, "unreadable statement_day setting, using default");
                Ok(DEFAULT_STATEMENT_DAY)
            }
        }
    }
}

impl Handler<SetStatementDay> for Engine {
    async fn handle(&self, cmd: SetStatementDay) -> ResultEngine<()> {
        if !(STATEMENT_DAY_MIN..=STATEMENT_DAY_MAX).contains(&cmd.day) {
            return Err(EngineError::validation(
                "Validation.Failed",
                "one or more fields are invalid",
            )
            .with_metadata(
                "day",
                format!("day must be between {STATEMENT_DAY_MIN} and {STATEMENT_DAY_MAX}"),
            ));
        }

        let row = settings::ActiveModel {
            key: ActiveValue::Set(STATEMENT_DAY_KEY.to_string()),
            content: ActiveValue::Set(cmd.day.to_string()),
        };
        settings::Entity::insert(row)
            .on_conflict(
                OnConflict::column(settings::Column::Key)
                    .update_column(settings::Column::Content)
                    .to_owned(),
            )
            .exec_without_returning(&self.database)
            .await?;

        tracing::info!(day = cmd.day, "statement day updated");
        self.cache
            .invalidate_after("set_statement_day", &[CacheScope::Summaries]);
        Ok(())
    }
}

impl Handler<GetStatementDay> for Engine {
    async fn handle(&self, _query: GetStatementDay) -> ResultEngine<u32> {
        self.statement_day().await
    }
}
