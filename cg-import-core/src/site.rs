//! CG deployment identification.
//!
//! The same profile markup is served by several Cardinal Gate instances.
//! Which one we are talking to decides the BATCH-MANUAL `service` string and
//! the site tag in export file names.

use url::Url;

use crate::error::ParseError;

const SERVICE_BASE: &str = "kt-cg-iidx-importer";

/// A known Cardinal Gate deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Site {
    Dev,
    Main,
    Ganymede,
    Nageki,
}

impl Site {
    /// Identify the deployment from a profile URL host.
    pub fn from_url(url: &Url) -> Result<Self, ParseError> {
        let host = url
            .host_str()
            .ok_or_else(|| ParseError::UnknownSite(url.to_string()))?;
        let host = host.strip_prefix("www.").unwrap_or(host);

        match host {
            "dev.cardinal-gate.net" => Ok(Self::Dev),
            "cgate.dev" => Ok(Self::Main),
            "ganymede-cg.net" => Ok(Self::Ganymede),
            "nageki-cg.net" => Ok(Self::Nageki),
            _ => Err(ParseError::UnknownSite(url.to_string())),
        }
    }

    /// BATCH-MANUAL `service` value for this deployment.
    pub fn service_name(self) -> String {
        match self {
            Self::Dev => format!("{SERVICE_BASE} (Dev)"),
            Self::Main => SERVICE_BASE.to_string(),
            Self::Ganymede => format!("{SERVICE_BASE} (GAN)"),
            Self::Nageki => format!("{SERVICE_BASE} (NAG)"),
        }
    }

    /// Short tag used in export file names.
    pub fn slug(self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Main => "cgate",
            Self::Ganymede => "gan",
            Self::Nageki => "nag",
        }
    }
}
