use crate::domain::model::{
    new_id, require_amount, require_text, Anchored, AnchorState, Entity, EntityKind, FieldError,
    Validate,
};
use crate::domain::status::{ClaimStatus, PolicyStatus};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsurancePolicy {
    pub id: String,
    pub policy_number: String,
    pub document_id: Option<String>,
    pub insured_id: String,
    pub coverage_type: String,
    pub coverage_amount: String,
    pub premium: String,
    pub currency: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: PolicyStatus,
    #[serde(flatten)]
    pub anchor: AnchorState,
    /// The insurer who issued the policy.
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for InsurancePolicy {
    const TABLE: &'static str = "insurance_policies";

    fn id(&self) -> &str {
        &self.id
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.policy_number.clone())
    }
}

impl Anchored for InsurancePolicy {
    fn entity_kind(&self) -> EntityKind {
        EntityKind::InsurancePolicy
    }

    fn anchor(&self) -> &AnchorState {
        &self.anchor
    }

    fn anchor_mut(&mut self) -> &mut AnchorState {
        &mut self.anchor
    }

    fn created_by(&self) -> &str {
        &self.created_by
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewInsurancePolicy {
    pub policy_number: String,
    pub document_id: Option<String>,
    pub insured_id: String,
    pub coverage_type: String,
    pub coverage_amount: String,
    pub premium: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl NewInsurancePolicy {
    pub fn into_policy(self, insurer_id: &str) -> InsurancePolicy {
        let now = Utc::now();
        InsurancePolicy {
            id: new_id(),
            policy_number: self.policy_number.trim().to_string(),
            document_id: self.document_id,
            insured_id: self.insured_id,
            coverage_type: self.coverage_type,
            coverage_amount: self.coverage_amount.trim().to_string(),
            premium: self.premium.trim().to_string(),
            currency: self.currency.trim().to_uppercase(),
            start_date: self.start_date,
            end_date: self.end_date,
            status: PolicyStatus::Active,
            anchor: AnchorState::default(),
            created_by: insurer_id.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Validate for NewInsurancePolicy {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        require_text(&mut errors, "policyNumber", &self.policy_number);
        require_text(&mut errors, "insuredId", &self.insured_id);
        require_text(&mut errors, "coverageType", &self.coverage_type);
        require_amount(&mut errors, "coverageAmount", &self.coverage_amount);
        require_amount(&mut errors, "premium", &self.premium);
        if self.end_date < self.start_date {
            errors.push(FieldError::new("endDate", "must not be before startDate"));
        }
        errors
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PolicyStatusUpdate {
    pub status: PolicyStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsuranceClaim {
    pub id: String,
    pub claim_number: String,
    pub policy_id: String,
    pub incident_type: String,
    pub incident_date: NaiveDate,
    pub description: String,
    pub claim_amount: String,
    pub status: ClaimStatus,
    pub resolution_notes: Option<String>,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub anchor: AnchorState,
    /// The claimant.
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for InsuranceClaim {
    const TABLE: &'static str = "insurance_claims";

    fn id(&self) -> &str {
        &self.id
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.claim_number.clone())
    }
}

impl Anchored for InsuranceClaim {
    fn entity_kind(&self) -> EntityKind {
        EntityKind::InsuranceClaim
    }

    fn anchor(&self) -> &AnchorState {
        &self.anchor
    }

    fn anchor_mut(&mut self) -> &mut AnchorState {
        &mut self.anchor
    }

    fn created_by(&self) -> &str {
        &self.created_by
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewInsuranceClaim {
    pub claim_number: Option<String>,
    pub policy_id: String,
    pub incident_type: String,
    pub incident_date: NaiveDate,
    pub description: String,
    pub claim_amount: String,
}

impl NewInsuranceClaim {
    pub fn into_claim(self, claimant_id: &str) -> InsuranceClaim {
        let now = Utc::now();
        let id = new_id();
        let claim_number = self
            .claim_number
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| format!("CLM-{}-{}", now.format("%Y"), &id[..8].to_uppercase()));
        InsuranceClaim {
            id,
            claim_number,
            policy_id: self.policy_id,
            incident_type: self.incident_type,
            incident_date: self.incident_date,
            description: self.description,
            claim_amount: self.claim_amount.trim().to_string(),
            status: ClaimStatus::Submitted,
            resolution_notes: None,
            reviewed_by: None,
            reviewed_at: None,
            anchor: AnchorState::default(),
            created_by: claimant_id.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Validate for NewInsuranceClaim {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        require_text(&mut errors, "policyId", &self.policy_id);
        require_text(&mut errors, "incidentType", &self.incident_type);
        require_text(&mut errors, "description", &self.description);
        require_amount(&mut errors, "claimAmount", &self.claim_amount);
        errors
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClaimReview {
    pub status: ClaimStatus,
    #[serde(alias = "notes")]
    pub resolution_notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn policy_dates_must_be_ordered() {
        let p: NewInsurancePolicy = serde_json::from_value(json!({
            "policyNumber": "POL-1",
            "insuredId": "shipper-1",
            "coverageType": "all_risk",
            "coverageAmount": "100000",
            "premium": "1200.50",
            "startDate": "2024-03-01",
            "endDate": "2024-02-01"
        }))
        .unwrap();
        let errors = p.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "endDate");
        assert_eq!(p.into_policy("insurer-1").currency, "USD");
    }

    #[test]
    fn claim_numbers_are_generated_when_missing() {
        let c: NewInsuranceClaim = serde_json::from_value(json!({
            "policyId": "p-1",
            "incidentType": "water_damage",
            "incidentDate": "2024-02-10",
            "description": "Container flooded",
            "claimAmount": "5000"
        }))
        .unwrap();
        let claim = c.into_claim("shipper-1");
        assert!(claim.claim_number.starts_with("CLM-"));
        assert_eq!(claim.status, ClaimStatus::Submitted);
        assert_eq!(claim.created_by, "shipper-1");
    }

    #[test]
    fn review_accepts_notes_alias() {
        let r: ClaimReview =
            serde_json::from_value(json!({"status": "approved", "notes": "ok"})).unwrap();
        assert_eq!(r.resolution_notes.as_deref(), Some("ok"));
    }
}
