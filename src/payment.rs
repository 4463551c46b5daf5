//! Premium unlock through a mobile-money transaction code.
//!
//! There is no payment backend; a well-formed code is accepted as proof of
//! payment and flips the premium flag.

use tracing::info;

use crate::error::{Error, Result};
use crate::prefs::{PreferenceStore, UserPreferences};

pub const MIN_CODE_LEN: usize = 8;
pub const EXAMPLE_CODE: &str = "SKL1234567";

/// Where voluntary support goes. Opening these is fire-and-forget.
pub const MPESA_NUMBER: &str = "0791085514";
pub const MPESA_USSD_URL: &str = "tel:*334#";
pub const PAYPAL_EMAIL: &str = "gadbahati7@gmail.com";

pub fn paypal_donation_url() -> String {
    format!(
        "https://www.paypal.com/cgi-bin/webscr?cmd=_donations&business={}&currency_code=USD",
        PAYPAL_EMAIL.replace('@', "%40")
    )
}

/// Normalized (trimmed, uppercase) code, or `ValidationFailed`.
pub fn validate_transaction_code(code: &str) -> Result<String> {
    let code = code.trim().to_uppercase();
    if code.len() < MIN_CODE_LEN || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(Error::ValidationFailed(format!(
            "Please enter a valid M-PESA transaction code (e.g., {EXAMPLE_CODE})"
        )));
    }
    Ok(code)
}

pub fn unlock_premium(
    prefs: &mut UserPreferences,
    store: &PreferenceStore,
    code: &str,
) -> Result<()> {
    let code = validate_transaction_code(code)?;
    prefs.set_premium_unlocked(store, true)?;
    info!(code_len = code.len(), "premium unlocked");
    Ok(())
}
