//! Resource containers: the account or zone a request is scoped to

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::api::error::{Error, Result};

/// Level a resource lives at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceLevel {
    Account,
    Zone,
}

impl ResourceLevel {
    /// Path segment used when addressing the level (`accounts` / `zones`)
    pub fn path_segment(self) -> &'static str {
        match self {
            ResourceLevel::Account => "accounts",
            ResourceLevel::Zone => "zones",
        }
    }
}

impl fmt::Display for ResourceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceLevel::Account => f.write_str("account"),
            ResourceLevel::Zone => f.write_str("zone"),
        }
    }
}

/// Scope and identifier of a request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceContainer {
    pub level: ResourceLevel,
    pub identifier: String,
}

impl ResourceContainer {
    pub fn account(id: impl Into<String>) -> Self {
        Self {
            level: ResourceLevel::Account,
            identifier: id.into(),
        }
    }

    pub fn zone(id: impl Into<String>) -> Self {
        Self {
            level: ResourceLevel::Zone,
            identifier: id.into(),
        }
    }

    /// Check the identifier is present.
    pub fn validate(&self) -> Result<()> {
        if self.identifier.is_empty() {
            return Err(match self.level {
                ResourceLevel::Account => Error::MissingAccountId,
                ResourceLevel::Zone => Error::MissingZoneId,
            });
        }
        Ok(())
    }

    /// Reject anything but a non-empty account container.
    pub fn require_account(&self) -> Result<()> {
        self.require(ResourceLevel::Account)
    }

    /// Reject anything but a non-empty zone container.
    pub fn require_zone(&self) -> Result<()> {
        self.require(ResourceLevel::Zone)
    }

    fn require(&self, level: ResourceLevel) -> Result<()> {
        if self.level != level {
            return Err(Error::UnsupportedContainer { level: self.level });
        }
        self.validate()
    }

    /// Render `/{accounts|zones}/{identifier}`
    pub fn path(&self) -> String {
        format!("/{}/{}", self.level.path_segment(), self.identifier)
    }
}

impl fmt::Display for ResourceContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.level, self.identifier)
    }
}
