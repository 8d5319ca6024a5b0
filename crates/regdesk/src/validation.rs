//! Field validation for registration forms.
//!
//! Validation is pure: it never touches the record store. Uniqueness of
//! email and phone is checked separately by [`crate::dedup`].
//!
//! All rules are evaluated and every failure is reported, so an attendee
//! can fix the whole form in one pass.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::registration::RegistrationForm;

/// Placeholder value of the department drop-down.
pub const DEPARTMENT_PLACEHOLDER: &str = "Select Department";

/// Placeholder value of the year drop-down.
pub const YEAR_PLACEHOLDER: &str = "Select Year";

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$")
        .expect("email pattern is valid")
});

static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{10}$").expect("phone pattern is valid"));

/// Check an email address against the accepted format.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Check that a phone number is exactly ten ASCII digits.
#[must_use]
pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_PATTERN.is_match(phone)
}

/// A single failed validation rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// Full name is empty.
    MissingFullName,
    /// Email is empty.
    MissingEmail,
    /// Phone is empty.
    MissingPhone,
    /// Department is empty or still the placeholder.
    MissingDepartment,
    /// Year is empty or still the placeholder.
    MissingYear,
    /// Year is not one of the configured years of study.
    UnknownYear {
        /// The submitted value.
        year: String,
    },
    /// Email does not look like an email address.
    EmailFormat,
    /// Phone is not exactly ten digits.
    PhoneFormat,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFullName => write!(f, "Full name is required."),
            Self::MissingEmail => write!(f, "Email is required."),
            Self::MissingPhone => write!(f, "Phone is required."),
            Self::MissingDepartment => write!(f, "Please select a department."),
            Self::MissingYear => write!(f, "Please select your year of study."),
            Self::UnknownYear { year } => {
                write!(f, "'{year}' is not a recognized year of study.")
            }
            Self::EmailFormat => write!(f, "Please enter a valid email address."),
            Self::PhoneFormat => write!(f, "Phone number must be exactly 10 digits."),
        }
    }
}

/// Every rule a form failed, in rule order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    violations: Vec<Violation>,
}

impl Rejection {
    /// The failed rules.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Check whether a specific rule failed.
    #[must_use]
    pub fn contains(&self, violation: &Violation) -> bool {
        self.violations.contains(violation)
    }
}

impl From<Vec<Violation>> for Rejection {
    fn from(violations: Vec<Violation>) -> Self {
        Self { violations }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Rejection {}

/// Stateless field checks for registration forms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validator {
    /// Accepted years of study. Empty means any non-placeholder value.
    years_of_study: Vec<String>,
}

impl Validator {
    /// Create a validator that only accepts the given years of study.
    #[must_use]
    pub fn new(years_of_study: Vec<String>) -> Self {
        Self { years_of_study }
    }

    /// Validate a form.
    ///
    /// Values are trimmed before checking. Format rules for a field are
    /// skipped when that field is missing.
    ///
    /// # Errors
    ///
    /// Returns a [`Rejection`] listing every failed rule.
    pub fn validate(&self, form: &RegistrationForm) -> Result<(), Rejection> {
        let full_name = form.full_name.trim();
        let email = form.email.trim();
        let phone = form.phone.trim();
        let department = form.department.trim();
        let year = form.year.trim();

        let mut violations = Vec::new();

        if full_name.is_empty() {
            violations.push(Violation::MissingFullName);
        }
        if email.is_empty() {
            violations.push(Violation::MissingEmail);
        }
        if phone.is_empty() {
            violations.push(Violation::MissingPhone);
        }
        if department.is_empty() || department == DEPARTMENT_PLACEHOLDER {
            violations.push(Violation::MissingDepartment);
        }
        if year.is_empty() || year == YEAR_PLACEHOLDER {
            violations.push(Violation::MissingYear);
        } else if !self.years_of_study.is_empty()
            && !self.years_of_study.iter().any(|y| y == year)
        {
            violations.push(Violation::UnknownYear {
                year: year.to_string(),
            });
        }
        if !email.is_empty() && !is_valid_email(email) {
            violations.push(Violation::EmailFormat);
        }
        if !phone.is_empty() && !is_valid_phone(phone) {
            violations.push(Violation::PhoneFormat);
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(Rejection::from(violations))
        }
    }
}
