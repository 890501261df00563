use crate::account::Account;

use super::AuthenticationError;

/// Ban gate, evaluated at login and refresh only.
///
/// Ordinary authenticated requests never re-check this flag, so an access
/// token issued before a ban keeps working for up to its full lifetime;
/// only new logins and refresh exchanges are blocked immediately. Keep
/// access lifetimes short if that window matters.
pub fn ensure_not_banned(account: &Account) -> Result<(), AuthenticationError> {
    if account.banned {
        return Err(AuthenticationError::Banned);
    }
    Ok(())
}
