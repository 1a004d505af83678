//! License model and type-dependent validation rules.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use regex_lite::Regex;

use crate::error::{LicenseError, LicenseResult};

/// Date format of the `expiration` property.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// License information as a set of named string properties.
///
/// A license starts empty and is populated through the property accessors.
/// Construction never fails; checking the license against a date and
/// application version is a separate, explicit [`License::validate`] call.
/// Keys without built-in semantics are preserved and round-trip through
/// license files untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct License {
    properties: BTreeMap<String, String>,
}

impl License {
    /// Property key for the opaque license identifier.
    pub const ID: &'static str = "id";
    /// Property key for the licensee display name.
    pub const NAME: &'static str = "name";
    /// Property key for the licensee contact email.
    pub const EMAIL: &'static str = "email";
    /// Property key for the opaque serial number.
    pub const LICENSE_NUMBER: &'static str = "licenseNumber";
    /// Property key selecting which validation rules apply.
    pub const LICENSE_TYPE: &'static str = "licenseType";
    /// Property key for the expiration date. Required with [`Self::TYPE_TRIAL`].
    pub const EXPIRATION: &'static str = "expiration";
    /// Property key for the version pattern. Required with
    /// [`Self::TYPE_SINGLE_VERSION`].
    pub const VERSION: &'static str = "version";

    /// License type for a lifetime version. Always valid.
    pub const TYPE_LIFETIME: &'static str = "lifetime";
    /// License type for a single version. Valid for the matching versions.
    pub const TYPE_SINGLE_VERSION: &'static str = "single-version";
    /// License type for a trial version. Valid until the expiration date.
    pub const TYPE_TRIAL: &'static str = "trial";

    /// Creates an empty license.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the property value.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Sets the property value. `None` removes the key.
    pub fn set_property(&mut self, key: &str, value: Option<&str>) {
        match value {
            Some(value) => {
                self.properties.insert(key.to_string(), value.to_string());
            }
            None => {
                self.properties.remove(key);
            }
        }
    }

    /// Returns the properties, ordered by key.
    #[must_use]
    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    pub(crate) fn from_properties(properties: BTreeMap<String, String>) -> Self {
        Self { properties }
    }

    /// Returns the expiration date, or `None` when the property is absent,
    /// blank, or not a `yyyy-mm-dd` date.
    #[must_use]
    pub fn expiration(&self) -> Option<NaiveDate> {
        let value = self.property(Self::EXPIRATION)?.trim();
        if value.is_empty() {
            return None;
        }
        NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
    }

    /// Sets the license expiration date. `None` removes the property.
    pub fn set_expiration(&mut self, expiration: Option<NaiveDate>) {
        let formatted = expiration.map(|date| date.format(DATE_FORMAT).to_string());
        self.set_property(Self::EXPIRATION, formatted.as_deref());
    }

    /// Checks the license against the current date and application version.
    ///
    /// Which rules apply depends on the `licenseType` property:
    ///
    /// - `trial`: the license must not be past its expiration date
    /// - `single-version`: the version pattern must match `current_version`
    /// - `lifetime`, absent, or unrecognized: no checks at all
    ///
    /// The expiration rule runs first. Validation has no side effects and
    /// can be repeated freely.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::Expired`] or [`LicenseError::VersionExpired`]
    /// when the corresponding rule fails.
    pub fn validate(
        &self,
        current_date: NaiveDate,
        current_version: Option<&str>,
    ) -> LicenseResult<()> {
        self.validate_expiration(current_date)?;
        self.validate_version(current_version)
    }

    fn validate_expiration(&self, current_date: NaiveDate) -> LicenseResult<()> {
        if self.property(Self::LICENSE_TYPE) == Some(Self::TYPE_TRIAL) {
            match self.expiration() {
                Some(expiration) if current_date <= expiration => {}
                // A missing or unreadable date counts as expired.
                _ => return Err(LicenseError::Expired),
            }
        }
        // The expiration date doesn't matter for a single-version or
        // lifetime license.
        Ok(())
    }

    fn validate_version(&self, current_version: Option<&str>) -> LicenseResult<()> {
        if self.property(Self::LICENSE_TYPE) == Some(Self::TYPE_SINGLE_VERSION) {
            let pattern = self
                .property(Self::VERSION)
                .ok_or(LicenseError::VersionExpired)?;
            let current = current_version.ok_or(LicenseError::VersionExpired)?;
            // The whole version string must match, as with an anchored pattern.
            let regex = Regex::new(&format!(r"\A(?:{pattern})\z"))
                .map_err(|_| LicenseError::VersionExpired)?;
            if !regex.is_match(current) {
                return Err(LicenseError::VersionExpired);
            }
        }
        Ok(())
    }
}
