// Service Names

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Logical services the gateway can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceName {
    Node,
    Mesh,
    Smesher,
}

impl ServiceName {
    pub const ALL: [ServiceName; 3] = [ServiceName::Node, ServiceName::Mesh, ServiceName::Smesher];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceName::Node => "node",
            ServiceName::Mesh => "mesh",
            ServiceName::Smesher => "smesher",
        }
    }
}

impl FromStr for ServiceName {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "node" => Ok(ServiceName::Node),
            "mesh" => Ok(ServiceName::Mesh),
            "smesher" => Ok(ServiceName::Smesher),
            other => Err(AppError::UnknownService(other.to_string())),
        }
    }
}

impl std::fmt::Display for ServiceName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_round_trips_every_name() {
        for name in ServiceName::ALL {
            assert_eq!(name.as_str().parse::<ServiceName>().unwrap(), name);
        }
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let err = "Node".parse::<ServiceName>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownService);
        assert!(err.to_string().contains("Node"));
    }
}
