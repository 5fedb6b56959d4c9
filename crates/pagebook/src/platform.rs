//! Platform tags naming which driver session owns a page.

use crate::result::PagebookError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Driver session family servicing a page's elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Browser session
    Web,
    /// Native mobile session (Android or iOS)
    Mobile,
}

impl Platform {
    /// All platforms
    pub const ALL: [Self; 2] = [Self::Web, Self::Mobile];

    /// Canonical tag
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Web => "web",
            Self::Mobile => "mobile",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = PagebookError;

    /// Map a repository tag onto a platform. Unknown tags never default.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "web" | "browser" => Ok(Self::Web),
            "mobile" | "android" | "ios" | "app" => Ok(Self::Mobile),
            _ => Err(PagebookError::UnsupportedPlatform {
                value: s.to_string(),
            }),
        }
    }
}

/// UI framework a page tag names, used to pick how text entries compile.
/// Generic `mobile` and `app` tags are treated as Android.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UiFramework {
    /// DOM pages
    Web,
    /// Android view hierarchy
    Android,
    /// iOS accessibility tree
    Ios,
}

impl UiFramework {
    /// All frameworks
    pub const ALL: [Self; 3] = [Self::Web, Self::Android, Self::Ios];

    /// Canonical tag
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Web => "web",
            Self::Android => "android",
            Self::Ios => "ios",
        }
    }

    /// Session family that drives this framework
    #[must_use]
    pub const fn platform(&self) -> Platform {
        match self {
            Self::Web => Platform::Web,
            Self::Android | Self::Ios => Platform::Mobile,
        }
    }
}

impl fmt::Display for UiFramework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UiFramework {
    type Err = PagebookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "web" | "browser" => Ok(Self::Web),
            "android" | "mobile" | "app" => Ok(Self::Android),
            "ios" => Ok(Self::Ios),
            _ => Err(PagebookError::UnsupportedPlatform {
                value: s.to_string(),
            }),
        }
    }
}
