//! Inventory line items and the (name, condition) grouping used for bulk edits.
//!
//! Groups are a read-only projection; every item stays individually
//! addressable by id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::WorkflowError;
use crate::permission::{self, Action, Role};
use crate::state_machine::{Job, JobStatus};

/// Condition recorded for items added in bulk.
pub const PACKED_BY_OWNER: &str = "PBO (Packed by Owner)";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    /// Free-text condition or exception note.
    pub condition: String,
    pub verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl InventoryItem {
    pub fn new(name: impl Into<String>, condition: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            condition: condition.into(),
            verified: false,
            location: None,
        }
    }

    pub fn group_key(&self) -> String {
        group_key(&self.name, &self.condition)
    }
}

/// Items sharing a case-insensitive (name, condition).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryGroup {
    pub key: String,
    pub name: String,
    pub condition: String,
    pub item_ids: Vec<String>,
    pub verified_count: usize,
}

impl InventoryGroup {
    pub fn quantity(&self) -> usize {
        self.item_ids.len()
    }

    pub fn is_fully_verified(&self) -> bool {
        self.verified_count == self.item_ids.len()
    }
}

pub fn group_key(name: &str, condition: &str) -> String {
    format!("{}|{}", name.to_lowercase(), condition.to_lowercase())
}

/// Group items in first-seen order.
pub fn groups(items: &[InventoryItem]) -> Vec<InventoryGroup> {
    let mut out: Vec<InventoryGroup> = Vec::new();
    for item in items {
        let key = item.group_key();
        let idx = match out.iter().position(|g| g.key == key) {
            Some(idx) => idx,
            None => {
                out.push(InventoryGroup {
                    key,
                    name: item.name.clone(),
                    condition: item.condition.clone(),
                    item_ids: Vec::new(),
                    verified_count: 0,
                });
                out.len() - 1
            }
        };
        let group = &mut out[idx];
        group.item_ids.push(item.id.clone());
        if item.verified {
            group.verified_count += 1;
        }
    }
    out
}

fn ensure_editable(job: &Job, role: Role) -> Result<(), WorkflowError> {
    job.ensure_open()?;
    permission::authorize(role, Action::EditInventory)?;
    match job.status {
        JobStatus::Dispatched | JobStatus::ArrivedOrigin | JobStatus::SurveyWalkthrough => Ok(()),
        other => Err(WorkflowError::InventoryLocked(other)),
    }
}

fn ensure_group(job: &Job, key: &str) -> Result<(), WorkflowError> {
    if job.inventory.iter().any(|i| i.group_key() == key) {
        Ok(())
    } else {
        Err(WorkflowError::GroupNotFound(key.to_string()))
    }
}

/// Add `quantity` copies of an item. Condition defaults to packed-by-owner.
pub fn add_items(
    job: &Job,
    role: Role,
    name: &str,
    condition: Option<&str>,
    quantity: u32,
    at: DateTime<Utc>,
) -> Result<Job, WorkflowError> {
    ensure_editable(job, role)?;
    let name = name.trim();
    if name.is_empty() {
        return Err(WorkflowError::InvalidItem("item name must not be empty"));
    }
    if quantity == 0 {
        return Err(WorkflowError::InvalidItem("quantity must be at least 1"));
    }
    let condition = condition.unwrap_or(PACKED_BY_OWNER);

    let mut next = job.clone();
    next.inventory
        .extend((0..quantity).map(|_| InventoryItem::new(name, condition)));
    next.updated_at = at;
    Ok(next)
}

/// Mark every item of a group verified (or not). Driver only, during survey or loading.
pub fn set_group_verified(
    job: &Job,
    role: Role,
    key: &str,
    verified: bool,
    at: DateTime<Utc>,
) -> Result<Job, WorkflowError> {
    job.ensure_open()?;
    permission::authorize(role, Action::VerifyInventory)?;
    if !matches!(
        job.status,
        JobStatus::SurveyWalkthrough | JobStatus::Loading
    ) {
        return Err(WorkflowError::InventoryLocked(job.status));
    }
    ensure_group(job, key)?;

    let mut next = job.clone();
    for item in next.inventory.iter_mut().filter(|i| i.group_key() == key) {
        item.verified = verified;
    }
    next.updated_at = at;
    Ok(next)
}

/// Rename or re-describe every item of a group.
pub fn edit_group(
    job: &Job,
    role: Role,
    key: &str,
    name: &str,
    condition: &str,
    at: DateTime<Utc>,
) -> Result<Job, WorkflowError> {
    ensure_editable(job, role)?;
    ensure_group(job, key)?;
    if name.trim().is_empty() {
        return Err(WorkflowError::InvalidItem("item name must not be empty"));
    }

    let mut next = job.clone();
    for item in next.inventory.iter_mut().filter(|i| i.group_key() == key) {
        item.name = name.trim().to_string();
        item.condition = condition.trim().to_string();
    }
    next.updated_at = at;
    Ok(next)
}

pub fn delete_group(job: &Job, role: Role, key: &str, at: DateTime<Utc>) -> Result<Job, WorkflowError> {
    ensure_editable(job, role)?;
    ensure_group(job, key)?;

    let mut next = job.clone();
    next.inventory.retain(|i| i.group_key() != key);
    next.updated_at = at;
    Ok(next)
}
