//! Platform detection and support matching.
//!
//! Pure domain logic - no I/O.

use serde::{Deserialize, Serialize};

/// The identified platform the process runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Platform {
    Windows,
    Linux,
    MacOs,
    FreeBsd,
    Unknown,
}

impl Platform {
    /// The platform this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "linux") {
            Platform::Linux
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(target_os = "freebsd") {
            Platform::FreeBsd
        } else {
            Platform::Unknown
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Platform::Windows => "WINDOWS",
            Platform::Linux => "LINUX",
            Platform::MacOs => "MACOS",
            Platform::FreeBsd => "FREEBSD",
            Platform::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A platform (or family of platforms) a method declares support for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlatformTag {
    /// Wildcard: supported everywhere.
    Any,
    Windows,
    Linux,
    MacOs,
    FreeBsd,
    /// Linux and FreeBSD.
    UnixLikeFoss,
    /// FreeBSD and macOS.
    Bsd,
}

impl PlatformTag {
    pub fn label(&self) -> &'static str {
        match self {
            PlatformTag::Any => "ANY",
            PlatformTag::Windows => "WINDOWS",
            PlatformTag::Linux => "LINUX",
            PlatformTag::MacOs => "MACOS",
            PlatformTag::FreeBsd => "FREEBSD",
            PlatformTag::UnixLikeFoss => "UNIX_LIKE_FOSS",
            PlatformTag::Bsd => "BSD",
        }
    }

    /// Whether this tag covers a known platform.
    fn covers(&self, platform: Platform) -> bool {
        match self {
            PlatformTag::Any => true,
            PlatformTag::Windows => platform == Platform::Windows,
            PlatformTag::Linux => platform == Platform::Linux,
            PlatformTag::MacOs => platform == Platform::MacOs,
            PlatformTag::FreeBsd => platform == Platform::FreeBsd,
            PlatformTag::UnixLikeFoss => {
                matches!(platform, Platform::Linux | Platform::FreeBsd)
            }
            PlatformTag::Bsd => matches!(platform, Platform::FreeBsd | Platform::MacOs),
        }
    }
}

impl std::fmt::Display for PlatformTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Answer of the support matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformSupport {
    Supported,
    Unsupported,
    /// The current platform is not recognized; the method is still tried.
    Unknown,
}

impl PlatformSupport {
    /// Only a positive "unsupported" keeps a method from being attempted.
    pub fn possibly_supported(&self) -> bool {
        !matches!(self, PlatformSupport::Unsupported)
    }
}

/// Decide whether a method declaring `supported` can run on `platform`.
pub fn platform_support(platform: Platform, supported: &[PlatformTag]) -> PlatformSupport {
    if supported.contains(&PlatformTag::Any) {
        return PlatformSupport::Supported;
    }

    if platform == Platform::Unknown {
        return PlatformSupport::Unknown;
    }

    if supported.iter().any(|tag| tag.covers(platform)) {
        PlatformSupport::Supported
    } else {
        PlatformSupport::Unsupported
    }
}

/// Render a tag set as `A, B, C` for failure reasons.
pub fn format_tags(tags: &[PlatformTag]) -> String {
    tags.iter()
        .map(PlatformTag::label)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_is_always_supported() {
        for platform in [Platform::Windows, Platform::Linux, Platform::Unknown] {
            assert_eq!(
                platform_support(platform, &[PlatformTag::Any]),
                PlatformSupport::Supported
            );
        }
    }

    #[test]
    fn test_known_platform_not_in_set_is_unsupported() {
        assert_eq!(
            platform_support(Platform::Linux, &[PlatformTag::Windows]),
            PlatformSupport::Unsupported
        );
        assert_eq!(
            platform_support(Platform::Windows, &[PlatformTag::Linux]),
            PlatformSupport::Unsupported
        );
    }

    #[test]
    fn test_unknown_platform_is_possibly_supported() {
        let support = platform_support(Platform::Unknown, &[PlatformTag::Windows]);
        assert_eq!(support, PlatformSupport::Unknown);
        assert!(support.possibly_supported());
    }

    #[test]
    fn test_platform_families() {
        assert_eq!(
            platform_support(Platform::FreeBsd, &[PlatformTag::UnixLikeFoss]),
            PlatformSupport::Supported
        );
        assert_eq!(
            platform_support(Platform::MacOs, &[PlatformTag::UnixLikeFoss]),
            PlatformSupport::Unsupported
        );
        assert_eq!(
            platform_support(Platform::MacOs, &[PlatformTag::Bsd]),
            PlatformSupport::Supported
        );
    }

    #[test]
    fn test_empty_set_is_unsupported_on_known_platform() {
        assert_eq!(
            platform_support(Platform::MacOs, &[]),
            PlatformSupport::Unsupported
        );
    }

    #[test]
    fn test_format_tags() {
        assert_eq!(
            format_tags(&[PlatformTag::Linux, PlatformTag::FreeBsd]),
            "LINUX, FREEBSD"
        );
    }
}
