//! Shared helpers for working with `figment::Jail` in tests.
//!
//! A jail gives each test a private working directory and restores any
//! environment variables it sets. Settings discovery walks real
//! directories, so these helpers also expose the jail root as a
//! [`Utf8PathBuf`].

use anyhow::{Result, anyhow};
use camino::Utf8PathBuf;

/// Executes `f` inside a [`figment::Jail`], returning the closure's output.
///
/// The jail is torn down once the closure completes, even when it returns
/// an error.
///
/// # Errors
///
/// Returns an error if the jail initialisation fails or the closure returns a
/// [`figment::error::Error`].
pub fn with_jail<F, T>(f: F) -> Result<T>
where
    F: FnOnce(&mut figment::Jail) -> figment::error::Result<T>,
{
    let mut output = None;
    figment::Jail::try_with(|j| {
        output = Some(f(j)?);
        Ok(())
    })
    .map_err(|err| anyhow!(err.to_string()))?;
    output.ok_or_else(|| anyhow!("jail closure did not return a value"))
}

/// Root directory of `jail` as a UTF-8 path.
///
/// # Errors
///
/// Returns a [`figment::Error`] when the directory is not valid UTF-8.
pub fn jail_root(jail: &figment::Jail) -> figment::error::Result<Utf8PathBuf> {
    Utf8PathBuf::from_path_buf(jail.directory().to_path_buf())
        .map_err(|path| figment_error(format!("jail path is not UTF-8: {}", path.display())))
}

/// Converts any error implementing [`ToString`] into a [`figment::Error`].
///
/// Lets jail closures use `?` on the crate's own error types.
#[expect(
    clippy::needless_pass_by_value,
    reason = "callers usually own the error and hand it over from map_err"
)]
#[must_use]
pub fn figment_error<E: ToString>(err: E) -> figment::Error {
    figment::Error::from(err.to_string())
}
