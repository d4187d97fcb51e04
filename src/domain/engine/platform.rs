//! Prebuilt ffmpeg download table

use std::fmt;

use crate::domain::error::PlatformError;

const JOHN_VAN_SICKLE_URL: &str = "https://johnvansickle.com/ffmpeg/releases/ffmpeg-release-";
const BTBN_WINDOWS_URL: &str = "https://github.com/BtbN/FFmpeg-Builds/releases/download/latest/ffmpeg-n5.1-latest-win64-gpl-5.1.zip";

/// Container format of a downloaded ffmpeg release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    TarXz,
    Zip,
}

impl ArchiveFormat {
    /// Guess the format from a URL's file extension
    pub fn from_url(url: &str) -> Option<Self> {
        if url.ends_with(".tar.xz") {
            Some(Self::TarXz)
        } else if url.ends_with(".zip") {
            Some(Self::Zip)
        } else {
            None
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TarXz => write!(f, "tar.xz"),
            Self::Zip => write!(f, "zip"),
        }
    }
}

/// Where to download ffmpeg from, and how to unpack it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineDownload {
    pub url: String,
    pub format: ArchiveFormat,
}

impl EngineDownload {
    fn static_linux(variant: &str) -> Self {
        Self {
            url: format!("{JOHN_VAN_SICKLE_URL}{variant}-static.tar.xz"),
            format: ArchiveFormat::TarXz,
        }
    }
}

/// Floating point capabilities of 32-bit ARM CPUs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArmFeatures {
    pub vfp: bool,
    pub vfpv3: bool,
}

impl ArmFeatures {
    /// Read the capabilities of the running CPU.
    ///
    /// Only meaningful on 32-bit ARM Linux; everywhere else this is empty.
    pub fn detect() -> Self {
        if std::env::consts::ARCH != "arm" {
            return Self::default();
        }
        std::fs::read_to_string("/proc/cpuinfo")
            .map(|cpuinfo| Self::from_cpuinfo(&cpuinfo))
            .unwrap_or_default()
    }

    /// Parse the `Features` line of `/proc/cpuinfo`
    pub fn from_cpuinfo(cpuinfo: &str) -> Self {
        let mut features = Self::default();
        let lines = cpuinfo
            .lines()
            .filter(|line| line.trim_start().starts_with("Features"));
        for line in lines {
            let Some((_, flags)) = line.split_once(':') else {
                continue;
            };
            for flag in flags.split_whitespace() {
                match flag {
                    "vfp" => features.vfp = true,
                    "vfpv3" | "vfpv3d16" => features.vfpv3 = true,
                    _ => {}
                }
            }
        }
        features
    }

    fn hard_float(&self) -> bool {
        self.vfp || self.vfpv3
    }
}

/// The running OS and CPU, in `std::env::consts` spelling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub os: String,
    pub arch: String,
    pub arm: ArmFeatures,
}

impl Platform {
    pub fn new(os: impl Into<String>, arch: impl Into<String>, arm: ArmFeatures) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
            arm,
        }
    }

    pub fn current() -> Self {
        Self::new(
            std::env::consts::OS,
            std::env::consts::ARCH,
            ArmFeatures::detect(),
        )
    }

    /// Map this platform to a prebuilt ffmpeg release.
    ///
    /// Linux gets the static builds, Windows x86_64 the GPL shared build.
    pub fn resolve(&self) -> Result<EngineDownload, PlatformError> {
        match (self.os.as_str(), self.arch.as_str()) {
            ("linux", "x86_64") => Ok(EngineDownload::static_linux("amd64")),
            ("linux", "aarch64") => Ok(EngineDownload::static_linux("arm64")),
            ("linux", "x86") => Ok(EngineDownload::static_linux("i686")),
            // armv6 and armv7 have VFP, armv5 does not
            ("linux", "arm") if self.arm.hard_float() => Ok(EngineDownload::static_linux("armhf")),
            ("linux", "arm") => Ok(EngineDownload::static_linux("armel")),
            ("windows", "x86_64") => Ok(EngineDownload {
                url: BTBN_WINDOWS_URL.to_string(),
                format: ArchiveFormat::Zip,
            }),
            _ => Err(PlatformError {
                os: self.os.clone(),
                arch: self.arch.clone(),
            }),
        }
    }
}
