use std::fmt;
use std::path::Path;

/// Host serving released Gradle distributions
pub const DISTRIBUTION_URL_PATH: &str = "services.gradle.org/distributions";

/// Host path serving nightly/snapshot distributions
pub const SNAPSHOT_DISTRIBUTION_URL_PATH: &str = "services.gradle.org/distributions-snapshots";

/// Where the distribution tasks write their archives, relative to the checkout
pub const BUILD_DIRECTORY: &str = "subprojects/distributions-full/build/distributions";

/// Kind of Gradle distribution archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Distribution {
    Bin,
    Src,
}

impl Distribution {
    /// Gradle task building this archive, e.g. `binDistributionZip`
    pub fn build_task(&self) -> String {
        format!("{}DistributionZip", self)
    }

    /// Archive location after [Distribution::build_task] ran
    pub fn build_output(&self, version: &str) -> std::path::PathBuf {
        Path::new(BUILD_DIRECTORY).join(self.file_name(version))
    }

    /// Archive name, e.g. `gradle-8.4-bin.zip`
    pub fn file_name(&self, version: &str) -> String {
        format!("gradle-{}-{}.zip", version, self)
    }

    /// `distributionUrl` value for the wrapper properties file.
    ///
    /// The colon is escaped as the properties format requires.
    pub fn wrapper_url(&self, version: &str) -> String {
        format!(
            "https\\://{}/{}",
            DISTRIBUTION_URL_PATH,
            self.file_name(version)
        )
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Distribution::Bin => f.write_str("bin"),
            Distribution::Src => f.write_str("src"),
        }
    }
}
