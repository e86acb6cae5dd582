//! Account repository for balance-holder database operations.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, Set,
};
use uuid::Uuid;

use crate::entities::{accounts, employees, sea_orm_active_enums::AccountKind};

/// Error types for account operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// Account not found.
    #[error("Account not found: {0}")]
    NotFound(Uuid),

    /// Employee not found.
    #[error("Employee not found: {0}")]
    EmployeeNotFound(Uuid),

    /// Employee has no route, so no cash fund can be resolved.
    #[error("Employee {0} is not assigned to a route")]
    EmployeeWithoutRoute(Uuid),

    /// No cash fund account exists for the route.
    #[error("No cash fund account for route {0}")]
    RouteCashAccountNotFound(Uuid),

    /// No bank account exists.
    #[error("No bank account configured")]
    BankAccountNotFound,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// The two accounts a field agent's collections land on.
#[derive(Debug, Clone)]
pub struct RouteAccounts {
    /// The route's cash fund.
    pub cash: accounts::Model,
    /// The shared bank account.
    pub bank: accounts::Model,
}

/// Account repository for reads and materialized-balance writes.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Gets an account by ID on the repository's own connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the account does not exist.
    pub async fn get_account(&self, account_id: Uuid) -> Result<accounts::Model, AccountError> {
        Self::find_account(&self.db, account_id).await
    }

    /// Gets an account by ID on the supplied connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the account does not exist.
    pub async fn find_account<C: ConnectionTrait>(
        conn: &C,
        account_id: Uuid,
    ) -> Result<accounts::Model, AccountError> {
        accounts::Entity::find_by_id(account_id)
            .one(conn)
            .await?
            .ok_or(AccountError::NotFound(account_id))
    }

    /// Lists every account.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_accounts<C: ConnectionTrait>(
        conn: &C,
    ) -> Result<Vec<accounts::Model>, AccountError> {
        Ok(accounts::Entity::find().all(conn).await?)
    }

    /// Resolves a field agent's cash and bank accounts through its route.
    ///
    /// The cash fund is the one owned by the agent's route; the bank account
    /// is shared across routes.
    ///
    /// # Errors
    ///
    /// Returns an error when the agent, its route, or either account is
    /// missing.
    pub async fn agent_accounts<C: ConnectionTrait>(
        conn: &C,
        agent_id: Uuid,
    ) -> Result<RouteAccounts, AccountError> {
        let employee = employees::Entity::find_by_id(agent_id)
            .one(conn)
            .await?
            .ok_or(AccountError::EmployeeNotFound(agent_id))?;

        let route_id = employee
            .route_id
            .ok_or(AccountError::EmployeeWithoutRoute(agent_id))?;

        Self::route_accounts(conn, route_id).await
    }

    /// Resolves a route's cash fund and the shared bank account.
    ///
    /// # Errors
    ///
    /// Returns an error when either account is missing.
    pub async fn route_accounts<C: ConnectionTrait>(
        conn: &C,
        route_id: Uuid,
    ) -> Result<RouteAccounts, AccountError> {
        let cash = accounts::Entity::find()
            .filter(accounts::Column::Kind.eq(AccountKind::CashFund))
            .filter(accounts::Column::RouteId.eq(route_id))
            .one(conn)
            .await?
            .ok_or(AccountError::RouteCashAccountNotFound(route_id))?;

        let bank = accounts::Entity::find()
            .filter(accounts::Column::Kind.eq(AccountKind::Bank))
            .one(conn)
            .await?
            .ok_or(AccountError::BankAccountNotFound)?;

        Ok(RouteAccounts { cash, bank })
    }

    /// Applies a signed delta to an account's materialized balance.
    ///
    /// A zero delta is a no-op that returns the current row. This is the
    /// ONLY code path that writes `accounts.amount`; every caller reaches it
    /// through a ledger operation so the balance stays in lock-step with the
    /// entry log.
    ///
    /// # Errors
    ///
    /// Returns an error if the account does not exist.
    pub async fn apply_balance_delta<C: ConnectionTrait>(
        conn: &C,
        account_id: Uuid,
        delta: Decimal,
    ) -> Result<accounts::Model, AccountError> {
        let account = Self::find_account(conn, account_id).await?;
        if delta.is_zero() {
            return Ok(account);
        }

        let new_amount = account.amount + delta;
        let mut active: accounts::ActiveModel = account.into();
        active.amount = Set(new_amount);
        active.updated_at = Set(chrono::Utc::now().into());

        Ok(active.update(conn).await?)
    }
}
