use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Participant roles. The set is closed; anything else fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Shipper,
    Carrier,
    Customs,
    PortAuthority,
    Bank,
    #[serde(alias = "insurance")]
    Insurer,
    FreightForwarder,
    Admin,
}

impl Role {
    pub const ALL: [Role; 8] = [
        Role::Shipper,
        Role::Carrier,
        Role::Customs,
        Role::PortAuthority,
        Role::Bank,
        Role::Insurer,
        Role::FreightForwarder,
        Role::Admin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Shipper => "shipper",
            Role::Carrier => "carrier",
            Role::Customs => "customs",
            Role::PortAuthority => "port_authority",
            Role::Bank => "bank",
            Role::Insurer => "insurer",
            Role::FreightForwarder => "freight_forwarder",
            Role::Admin => "admin",
        }
    }

    /// Roles a user may pick for themselves. Authorities that review other
    /// parties' records, and admin, are granted by an admin.
    pub fn is_self_assignable(&self) -> bool {
        matches!(self, Role::Shipper | Role::Carrier | Role::FreightForwarder)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "insurance" => return Ok(Role::Insurer),
            "port" => return Ok(Role::PortAuthority),
            _ => {}
        }
        Role::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == normalized)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_names_and_aliases() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert_eq!("insurance".parse::<Role>().unwrap(), Role::Insurer);
        assert_eq!("Port Authority".parse::<Role>().unwrap(), Role::PortAuthority);
        assert_eq!("freight-forwarder".parse::<Role>().unwrap(), Role::FreightForwarder);
    }

    #[test]
    fn unknown_roles_are_rejected() {
        assert!("consignee".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn serde_uses_snake_case_and_accepts_the_insurance_alias() {
        let json = serde_json::to_string(&Role::PortAuthority).unwrap();
        assert_eq!(json, "\"port_authority\"");
        let parsed: Role = serde_json::from_str("\"insurance\"").unwrap();
        assert_eq!(parsed, Role::Insurer);
    }

    #[test]
    fn only_trading_parties_pick_their_own_role() {
        let chosen: Vec<Role> = Role::ALL
            .into_iter()
            .filter(Role::is_self_assignable)
            .collect();
        assert_eq!(chosen, vec![Role::Shipper, Role::Carrier, Role::FreightForwarder]);
    }
}
