use crate::domain::model::Lead;
use crate::utils::error::{GateError, Result};
use std::io::Write;

pub const EXPORT_HEADERS: [&str; 7] = [
    "name",
    "email",
    "phone",
    "zip",
    "address",
    "message",
    "created_at",
];

/// Writes leads as CSV, newest first, with the provider-facing columns only.
pub fn write_leads_csv<W: Write>(leads: &[Lead], writer: W) -> Result<()> {
    let mut sorted: Vec<&Lead> = leads.iter().collect();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(EXPORT_HEADERS)?;

    for lead in sorted {
        let created_at = lead.created_at.to_rfc3339();
        csv_writer.write_record([
            lead.name.as_str(),
            lead.email.as_str(),
            lead.phone.as_deref().unwrap_or(""),
            lead.zip.as_str(),
            lead.address.as_deref().unwrap_or(""),
            lead.message.as_deref().unwrap_or(""),
            created_at.as_str(),
        ])?;
    }

    csv_writer.flush()?;
    tracing::debug!("Exported {} leads", leads.len());
    Ok(())
}

pub fn leads_to_csv_string(leads: &[Lead]) -> Result<String> {
    let mut buffer = Vec::new();
    write_leads_csv(leads, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| GateError::ValidationError {
        message: format!("Export produced invalid UTF-8: {}", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::LeadStatus;
    use chrono::{TimeZone, Utc};

    fn lead(name: &str, hour: u32, message: Option<&str>) -> Lead {
        Lead {
            id: 1,
            name: name.to_string(),
            email: "maria.g@email.com".to_string(),
            phone: Some("(555) 555-6666".to_string()),
            zip: "85375".to_string(),
            address: None,
            service: None,
            message: message.map(str::to_string),
            status: LeadStatus::New,
            matched_zip: Some("85375".to_string()),
            distance_miles: Some(0.0),
            created_at: Utc.with_ymd_and_hms(2026, 10, 1, hour, 0, 0).unwrap(),
            recurring: false,
            follow_up_date: None,
        }
    }

    #[test]
    fn test_export_header_and_order() {
        let leads = vec![
            lead("Early", 8, Some("Lawn mowing")),
            lead("Late", 17, Some("Weekly, large \"backyard\"")),
        ];

        let csv = leads_to_csv_string(&leads).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "name,email,phone,zip,address,message,created_at");
        assert!(lines[1].starts_with("Late,"));
        assert!(lines[1].contains("\"Weekly, large \"\"backyard\"\"\""));
        assert!(lines[2].starts_with("Early,"));
    }

    #[test]
    fn test_export_empty_has_header_only() {
        let csv = leads_to_csv_string(&[]).unwrap();
        assert_eq!(csv, "name,email,phone,zip,address,message,created_at\n");
    }
}
