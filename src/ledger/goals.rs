// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::info;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Account, Goal, GoalStatus, Transaction, TxKind};
use crate::money::ensure_positive;
use crate::session::Session;
use crate::store::{encode, Batch, Collection, LedgerStore, Patch};

use super::{accounts, commit_funded, ensure_funds, fetch, load_all, non_empty};

#[derive(Debug, Clone)]
pub struct NewGoal {
    pub goal_name: String,
    pub target_amount: Decimal,
    pub target_date: Option<NaiveDate>,
}

pub fn create(store: &dyn LedgerStore, session: &Session, new: NewGoal) -> LedgerResult<Goal> {
    let goal = Goal {
        id: store.new_id(),
        user_id: session.user_id().to_string(),
        goal_name: non_empty(&new.goal_name, "goal name")?,
        target_amount: ensure_positive(new.target_amount, "target amount")?,
        target_date: new.target_date,
        saved_amount: Decimal::ZERO,
        status: GoalStatus::Active,
        created_at: Utc::now(),
    };
    let mut batch = Batch::new();
    batch.insert(Collection::Goals, goal.id.clone(), encode(&goal)?);
    store.commit(batch)?;
    info!(id = %goal.id, name = %goal.goal_name, "goal created");
    Ok(goal)
}

#[derive(Debug, Clone, Default)]
pub struct GoalEdit {
    pub goal_name: Option<String>,
    pub target_amount: Option<Decimal>,
    pub target_date: Option<NaiveDate>,
}

pub fn edit(
    store: &dyn LedgerStore,
    session: &Session,
    id: &str,
    changes: GoalEdit,
) -> LedgerResult<Goal> {
    let mut goal: Goal = fetch(store, session, Collection::Goals, id, "goal")?;
    let mut patch = Patch::new();
    if let Some(name) = changes.goal_name {
        goal.goal_name = non_empty(&name, "goal name")?;
        patch = patch.set("goalName", Value::String(goal.goal_name.clone()));
    }
    if let Some(target) = changes.target_amount {
        goal.target_amount = ensure_positive(target, "target amount")?;
        patch = patch.set("targetAmount", Value::String(goal.target_amount.to_string()));
    }
    if let Some(date) = changes.target_date {
        goal.target_date = Some(date);
        patch = patch.set("targetDate", Value::String(date.to_string()));
    }
    if patch.is_empty() {
        return Err(LedgerError::validation("nothing to change"));
    }
    store.update(Collection::Goals, id, patch)?;
    info!(id, "goal edited");
    Ok(goal)
}

/// Removes a goal. Money already contributed stays spent.
pub fn delete(store: &dyn LedgerStore, session: &Session, id: &str) -> LedgerResult<()> {
    let _: Goal = fetch(store, session, Collection::Goals, id, "goal")?;
    store.delete(Collection::Goals, id)?;
    info!(id, "goal deleted");
    Ok(())
}

pub fn list(store: &dyn LedgerStore, session: &Session) -> LedgerResult<Vec<Goal>> {
    let mut goals: Vec<Goal> = load_all(store, session, Collection::Goals)?;
    goals.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    Ok(goals)
}

/// Looks a goal up by id, then by case-insensitive name.
pub fn resolve(store: &dyn LedgerStore, session: &Session, key: &str) -> LedgerResult<Goal> {
    if let Ok(goal) = fetch(store, session, Collection::Goals, key, "goal") {
        return Ok(goal);
    }
    let wanted = key.trim().to_lowercase();
    list(store, session)?
        .into_iter()
        .find(|g| g.goal_name.to_lowercase() == wanted)
        .ok_or_else(|| LedgerError::not_found("goal", key))
}

#[derive(Debug, Clone)]
pub struct Contribution {
    pub goal: Goal,
    pub transaction: Transaction,
}

/// Moves `amount` from an account into a goal's savings.
pub fn contribute(
    store: &dyn LedgerStore,
    session: &Session,
    goal_id: &str,
    amount: Decimal,
    funding_account_id: &str,
) -> LedgerResult<Contribution> {
    let amount = ensure_positive(amount, "contribution")?;
    let mut goal: Goal = fetch(store, session, Collection::Goals, goal_id, "goal")?;
    let account: Account = fetch(store, session, Collection::Accounts, funding_account_id, "account")?;
    let available = ensure_funds(store, session, &account.id, amount)?;

    let tx = Transaction {
        id: store.new_id(),
        user_id: session.user_id().to_string(),
        amount,
        kind: TxKind::Expense,
        category: goal.goal_name.clone(),
        account_id: Some(account.id.clone()),
        description: Some(format!("Contribution to goal: {}", goal.goal_name)),
        created_at: Utc::now(),
    };

    let mut batch = Batch::new();
    batch.update(
        Collection::Goals,
        goal.id.clone(),
        Patch::new().increment("savedAmount", amount),
    );
    batch.insert(Collection::Transactions, tx.id.clone(), encode(&tx)?);
    batch.update(
        Collection::Accounts,
        account.id.clone(),
        Patch::new().guarded_increment("balance", -amount, Decimal::ZERO),
    );
    commit_funded(store, batch, &account.id, available, amount)?;

    goal.saved_amount += amount;
    info!(goal = %goal.id, account = %account.id, %amount, "goal contribution");
    Ok(Contribution {
        goal,
        transaction: tx,
    })
}

/// Where the savings of a completed goal end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// A fresh account named after the goal.
    NewAccount { reserve: bool },
    Existing(String),
}

#[derive(Debug, Clone)]
pub struct Completion {
    pub account: Account,
    pub transaction: Transaction,
    pub created_account: bool,
}

/// Releases the saved amount into an account and removes the goal. Reaching
/// the target is not required; an empty goal cannot be completed.
pub fn complete(
    store: &dyn LedgerStore,
    session: &Session,
    goal_id: &str,
    destination: Destination,
) -> LedgerResult<Completion> {
    let goal: Goal = fetch(store, session, Collection::Goals, goal_id, "goal")?;
    if goal.saved_amount <= Decimal::ZERO {
        return Err(LedgerError::validation(format!(
            "goal '{}' has no savings to release",
            goal.goal_name
        )));
    }
    let now = Utc::now();
    let mut batch = Batch::new();

    let (mut account, created_account) = match destination {
        Destination::NewAccount { reserve } => {
            accounts::ensure_unique_name(store, session, &goal.goal_name, None)?;
            let account = Account {
                id: store.new_id(),
                user_id: session.user_id().to_string(),
                account_name: goal.goal_name.clone(),
                balance: goal.saved_amount,
                is_reserve: reserve,
                is_default: false,
                created_at: now,
            };
            batch.insert(Collection::Accounts, account.id.clone(), encode(&account)?);
            (account, true)
        }
        Destination::Existing(account_id) => {
            let account: Account =
                fetch(store, session, Collection::Accounts, &account_id, "account")?;
            batch.update(
                Collection::Accounts,
                account.id.clone(),
                Patch::new().increment("balance", goal.saved_amount),
            );
            (account, false)
        }
    };

    let tx = Transaction {
        id: store.new_id(),
        user_id: session.user_id().to_string(),
        amount: goal.saved_amount,
        kind: TxKind::Income,
        category: goal.goal_name.clone(),
        account_id: Some(account.id.clone()),
        description: Some(format!("Goal completed: {}", goal.goal_name)),
        created_at: now,
    };
    batch.insert(Collection::Transactions, tx.id.clone(), encode(&tx)?);
    batch.delete(Collection::Goals, goal.id.clone());
    store.commit(batch)?;

    if !created_account {
        account.balance += goal.saved_amount;
    }
    info!(goal = %goal.id, account = %account.id, amount = %goal.saved_amount, created_account, "goal completed");
    Ok(Completion {
        account,
        transaction: tx,
        created_account,
    })
}
