use std::sync::Arc;

use anyhow::Context as _;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};

use pubportal_auth_schema::{admins, audit_logs};
use pubportal_domain::audit::AuditAction;
use pubportal_domain::email::Email;
use pubportal_domain::pagination::PageRequest;

use crate::domain::repository::CredentialStore;
use crate::domain::types::{AdminRecord, AuditLogEntry};
use crate::error::AuthServiceError;

/// Admin allow-list and audit trail in Postgres.
#[derive(Clone)]
pub struct DbCredentialStore {
    pub db: Arc<DatabaseConnection>,
}

impl CredentialStore for DbCredentialStore {
    async fn is_admin(&self, email: &Email) -> Result<bool, AuthServiceError> {
        let model = admins::Entity::find_by_id(email.as_str())
            .one(self.db.as_ref())
            .await
            .context("find admin by email")?;
        Ok(model.is_some())
    }

    async fn append_audit_log(
        &self,
        email: &Email,
        action: AuditAction,
        details: &str,
    ) -> Result<(), AuthServiceError> {
        audit_logs::ActiveModel {
            user_email: Set(email.as_str().to_owned()),
            action: Set(action.as_str().to_owned()),
            details: Set(details.to_owned()),
            timestamp: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await
        .context("append audit log")?;
        Ok(())
    }

    async fn list_admins(&self) -> Result<Vec<AdminRecord>, AuthServiceError> {
        let models = admins::Entity::find()
            .order_by_asc(admins::Column::CreatedAt)
            .order_by_asc(admins::Column::Email)
            .all(self.db.as_ref())
            .await
            .context("list admins")?;
        Ok(models.into_iter().map(admin_from_model).collect())
    }

    async fn add_admin(&self, email: &Email) -> Result<bool, AuthServiceError> {
        let inserted = admins::Entity::insert(admins::ActiveModel {
            email: Set(email.as_str().to_owned()),
            created_at: Set(Utc::now()),
        })
        .on_conflict(
            OnConflict::column(admins::Column::Email)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(self.db.as_ref())
        .await
        .context("insert admin")?;
        Ok(inserted == 1)
    }

    async fn remove_admin(&self, email: &Email) -> Result<bool, AuthServiceError> {
        let result = admins::Entity::delete_many()
            .filter(admins::Column::Email.eq(email.as_str()))
            .exec(self.db.as_ref())
            .await
            .context("delete admin")?;
        Ok(result.rows_affected > 0)
    }

    async fn list_audit_logs(
        &self,
        page: PageRequest,
    ) -> Result<(Vec<AuditLogEntry>, u64), AuthServiceError> {
        let total = audit_logs::Entity::find()
            .count(self.db.as_ref())
            .await
            .context("count audit logs")?;
        let models = audit_logs::Entity::find()
            .order_by_desc(audit_logs::Column::Timestamp)
            .order_by_desc(audit_logs::Column::Id)
            .offset(page.offset())
            .limit(u64::from(page.limit))
            .all(self.db.as_ref())
            .await
            .context("list audit logs")?;
        Ok((models.into_iter().map(audit_from_model).collect(), total))
    }
}

fn admin_from_model(model: admins::Model) -> AdminRecord {
    AdminRecord {
        email: Email::normalize(&model.email),
        created_at: model.created_at,
    }
}

fn audit_from_model(model: audit_logs::Model) -> AuditLogEntry {
    AuditLogEntry {
        id: model.id,
        user_email: model.user_email,
        action: model.action,
        details: model.details,
        timestamp: model.timestamp,
    }
}
