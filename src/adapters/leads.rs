use crate::adapters::storage::read_optional;
use crate::domain::model::{Lead, LeadAction, LeadFilter, LeadStats, LeadStatus};
use crate::domain::ports::Storage;
use crate::utils::error::{GateError, Result};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;

pub const DEFAULT_LEADS_FILE: &str = "leads.csv";

const RECURRING_PREFIX: &str = "[RECURRING WEEKLY]";

/// Result of a provider action: the updated lead, plus the next weekly visit when
/// completing a subscriber booked one.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionResult {
    pub lead: Lead,
    pub next_visit: Option<Lead>,
}

/// Accepted contact-form leads, persisted as a CSV file.
///
/// Clones share one write lock, so concurrent appends and actions through the same
/// store never interleave their read-modify-write cycles.
#[derive(Debug, Clone)]
pub struct LeadStore<S: Storage> {
    storage: S,
    path: String,
    write_lock: Arc<Mutex<()>>,
}

impl<S: Storage> LeadStore<S> {
    pub fn new(storage: S, path: impl Into<String>) -> Self {
        Self {
            storage,
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// All leads in insertion order.
    pub async fn list(&self) -> Result<Vec<Lead>> {
        let Some(data) = read_optional(&self.storage, &self.path).await? else {
            return Ok(Vec::new());
        };

        let mut reader = csv::Reader::from_reader(data.as_slice());
        let mut leads = Vec::new();
        for row in reader.deserialize::<Lead>() {
            leads.push(row?);
        }
        Ok(leads)
    }

    /// Newest first, restricted to one provider view.
    pub async fn list_recent(&self, filter: LeadFilter) -> Result<Vec<Lead>> {
        let mut leads = self.list().await?;
        leads.retain(|lead| filter.matches(lead));
        leads.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(leads)
    }

    pub async fn stats(&self) -> Result<LeadStats> {
        let leads = self.list().await?;
        Ok(LeadStats {
            completed: count(&leads, LeadFilter::Completed),
            rejected: count(&leads, LeadFilter::Rejected),
            subscribers: count(&leads, LeadFilter::Subscribers),
        })
    }

    /// Persists a new lead. The id is assigned here; whatever the caller set is ignored.
    pub async fn append(&self, lead: Lead) -> Result<Lead> {
        let _guard = self.write_lock.lock().await;

        let mut leads = self.list().await?;
        let lead = push_with_next_id(&mut leads, lead);
        self.save(&leads).await?;

        tracing::info!("Lead {} saved for ZIP {}", lead.id, lead.zip);
        Ok(lead)
    }

    pub async fn apply(&self, id: u64, action: LeadAction) -> Result<ActionResult> {
        self.apply_at(id, action, Utc::now()).await
    }

    /// Applies `action` as if it happened at `now`.
    pub async fn apply_at(
        &self,
        id: u64,
        action: LeadAction,
        now: DateTime<Utc>,
    ) -> Result<ActionResult> {
        let _guard = self.write_lock.lock().await;

        let mut leads = self.list().await?;
        let lead = leads
            .iter_mut()
            .find(|lead| lead.id == id)
            .ok_or_else(|| GateError::ValidationError {
                message: format!("Lead {} not found", id),
            })?;

        match action {
            LeadAction::Complete => lead.status = LeadStatus::Completed,
            LeadAction::Reject => lead.status = LeadStatus::Rejected,
            LeadAction::Tomorrow => {
                lead.status = LeadStatus::Scheduled;
                lead.follow_up_date = Some((now + Duration::days(1)).date_naive());
            }
            LeadAction::Weekly => lead.recurring = !lead.recurring,
        }
        let updated = lead.clone();

        let next_visit = if action == LeadAction::Complete && updated.recurring {
            Some(push_with_next_id(&mut leads, next_weekly_visit(&updated, now)))
        } else {
            None
        };

        self.save(&leads).await?;

        match (&action, &next_visit) {
            (LeadAction::Weekly, _) => tracing::info!(
                "Lead {} {} weekly schedule",
                id,
                if updated.recurring { "added to" } else { "removed from" }
            ),
            (_, Some(next)) => tracing::info!(
                "Lead {} completed; next weekly visit booked as lead {}",
                id,
                next.id
            ),
            _ => tracing::info!("Lead {} marked as {}", id, updated.status),
        }

        Ok(ActionResult {
            lead: updated,
            next_visit,
        })
    }

    async fn save(&self, leads: &[Lead]) -> Result<()> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for lead in leads {
            writer.serialize(lead)?;
        }
        let data = writer
            .into_inner()
            .map_err(|e| GateError::IoError(e.into_error()))?;
        self.storage.write_file(&self.path, &data).await
    }
}

fn count(leads: &[Lead], filter: LeadFilter) -> usize {
    leads.iter().filter(|lead| filter.matches(lead)).count()
}

fn push_with_next_id(leads: &mut Vec<Lead>, mut lead: Lead) -> Lead {
    lead.id = leads.iter().map(|l| l.id).max().unwrap_or(0) + 1;
    leads.push(lead.clone());
    lead
}

fn next_weekly_visit(done: &Lead, now: DateTime<Utc>) -> Lead {
    let body = done
        .message
        .as_deref()
        .map(|m| m.strip_prefix(RECURRING_PREFIX).unwrap_or(m).trim())
        .unwrap_or("");

    Lead {
        id: 0,
        message: Some(format!("{} {}", RECURRING_PREFIX, body).trim().to_string()),
        status: LeadStatus::Scheduled,
        created_at: now + Duration::days(7),
        recurring: true,
        follow_up_date: None,
        ..done.clone()
    }
}
