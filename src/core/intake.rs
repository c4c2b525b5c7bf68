use crate::adapters::leads::LeadStore;
use crate::adapters::service_areas::ServiceAreaStore;
use crate::core::gate::ProximityGate;
use crate::domain::model::{ContactSubmission, DecisionReason, Lead, LeadStatus};
use crate::domain::ports::Storage;
use crate::utils::error::{GateError, Result};
use crate::utils::validation::validate_non_empty_string;
use chrono::Utc;

/// Why a submission was turned away. Each reason gets its own user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    InvalidZip,
    UnknownZip,
    ConfigEmpty,
    OutOfRange,
}

impl RejectReason {
    pub fn code(self) -> &'static str {
        match self {
            RejectReason::InvalidZip => "invalid_zip",
            RejectReason::UnknownZip => "unknown_zip",
            RejectReason::ConfigEmpty => "config_empty",
            RejectReason::OutOfRange => "out_of_range",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            RejectReason::InvalidZip => "Enter a valid 5-digit ZIP.",
            RejectReason::UnknownZip => "We couldn't find that ZIP code.",
            RejectReason::ConfigEmpty => "We're not accepting requests online right now.",
            RejectReason::OutOfRange => "Sorry, that ZIP is outside our service area.",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum IntakeOutcome {
    Accepted(Lead),
    Rejected(RejectReason),
}

/// Contact form → proximity gate → lead.
pub struct LeadIntake<S: Storage> {
    gate: ProximityGate,
    areas: ServiceAreaStore<S>,
    leads: LeadStore<S>,
}

impl<S: Storage> LeadIntake<S> {
    pub fn new(gate: ProximityGate, areas: ServiceAreaStore<S>, leads: LeadStore<S>) -> Self {
        Self { gate, areas, leads }
    }

    pub async fn submit(&self, form: ContactSubmission) -> Result<IntakeOutcome> {
        validate_non_empty_string("name", &form.name)?;
        validate_non_empty_string("email", &form.email)?;

        let zip = form.zip.trim().to_string();

        // 每次請求都重新讀取設定快照
        let areas = self.areas.load().await?;

        let decision = match self.gate.evaluate(&zip, &areas).await {
            Ok(decision) => decision,
            Err(GateError::InvalidZip { .. }) => {
                tracing::info!("Contact rejected: malformed ZIP '{}'", zip);
                return Ok(IntakeOutcome::Rejected(RejectReason::InvalidZip));
            }
            Err(GateError::UnknownZip { .. }) => {
                tracing::info!("Contact rejected: unknown ZIP {}", zip);
                return Ok(IntakeOutcome::Rejected(RejectReason::UnknownZip));
            }
            Err(e) => return Err(e),
        };

        if !decision.accepted {
            let reason = match decision.reason {
                DecisionReason::ConfigEmpty => RejectReason::ConfigEmpty,
                _ => RejectReason::OutOfRange,
            };
            tracing::info!("Contact rejected: ZIP {} ({})", zip, reason.code());
            return Ok(IntakeOutcome::Rejected(reason));
        }

        let lead = Lead {
            id: 0,
            name: form.name.trim().to_string(),
            email: form.email.trim().to_lowercase(),
            phone: non_empty(form.phone),
            zip,
            address: non_empty(form.address),
            service: non_empty(form.service),
            message: non_empty(form.message),
            status: LeadStatus::New,
            matched_zip: decision
                .matched_entry
                .map(|entry| entry.zip_code.to_string()),
            distance_miles: decision.distance_miles,
            created_at: Utc::now(),
            recurring: false,
            follow_up_date: None,
        };

        let lead = self.leads.append(lead).await?;
        Ok(IntakeOutcome::Accepted(lead))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
