//! Collected result of a secret enumeration

use crate::error::SecretError;
use crate::paths::SecretPath;

/// Names and per-position errors of a listing
///
/// Both sequences always have the same length. Position `i` holds either a
/// secret name and no error, or an empty placeholder name and the error that
/// occurred at that point of the enumeration.
#[derive(Debug, Default)]
pub struct SecretListing {
    names: Vec<String>,
    errors: Vec<Option<SecretError>>,
}

impl SecretListing {
    pub fn push(&mut self, item: Result<SecretPath, SecretError>) {
        match item {
            Ok(path) => {
                self.names.push(path.to_string());
                self.errors.push(None);
            }
            Err(e) => {
                self.names.push(String::new());
                self.errors.push(Some(e));
            }
        }
    }

    /// Secret names in backend order, `""` where an error occurred
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Errors aligned with [`names`](Self::names)
    pub fn errors(&self) -> &[Option<SecretError>] {
        &self.errors
    }

    /// Positions as `(name, error)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&SecretError>)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.errors.iter().map(Option::as_ref))
    }

    /// Names of the successfully listed secrets only
    pub fn secrets(&self) -> impl Iterator<Item = &str> {
        self.iter()
            .filter_map(|(name, error)| error.is_none().then_some(name))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.errors.iter().any(Option::is_some)
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<Option<SecretError>>) {
        (self.names, self.errors)
    }
}

impl Extend<Result<SecretPath, SecretError>> for SecretListing {
    fn extend<I: IntoIterator<Item = Result<SecretPath, SecretError>>>(&mut self, iter: I) {
        for item in iter {
            self.push(item);
        }
    }
}

impl FromIterator<Result<SecretPath, SecretError>> for SecretListing {
    fn from_iter<I: IntoIterator<Item = Result<SecretPath, SecretError>>>(iter: I) -> Self {
        let mut listing = Self::default();
        listing.extend(iter);
        listing
    }
}
