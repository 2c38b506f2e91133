//! Payment configuration (YooKassa, Telegram Stars)

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Payment configuration
///
/// A provider is enabled when its credentials are present; the service
/// starts with whichever subset is configured.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// YooKassa shop identifier
    pub yookassa_shop_id: Option<String>,

    /// YooKassa secret key
    pub yookassa_secret_key: Option<SecretString>,

    /// Shared secret for webhook body signatures; unsigned webhooks are
    /// accepted when unset
    pub yookassa_webhook_secret: Option<SecretString>,

    /// Where the payer lands after the YooKassa checkout page
    #[serde(default = "default_return_url")]
    pub yookassa_return_url: String,

    /// Telegram Bot API token
    pub telegram_bot_token: Option<SecretString>,

    /// Value Telegram echoes in `X-Telegram-Bot-Api-Secret-Token`
    pub telegram_webhook_secret_token: Option<SecretString>,

    /// Upper bound on a provider checkout call
    #[serde(default = "default_checkout_timeout")]
    pub checkout_timeout_secs: u64,

    /// Roubles per Telegram Star
    #[serde(default = "default_stars_rate")]
    pub stars_per_currency_unit: i64,
}

impl PaymentConfig {
    pub fn checkout_timeout(&self) -> Duration {
        Duration::from_secs(self.checkout_timeout_secs)
    }

    pub fn yookassa_enabled(&self) -> bool {
        self.yookassa_shop_id
            .as_deref()
            .is_some_and(|id| !id.trim().is_empty())
    }

    pub fn telegram_enabled(&self) -> bool {
        self.telegram_bot_token
            .as_ref()
            .is_some_and(|token| !token.expose_secret().is_empty())
    }

    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.yookassa_enabled() {
            let has_key = self
                .yookassa_secret_key
                .as_ref()
                .is_some_and(|key| !key.expose_secret().is_empty());
            if !has_key {
                return Err(ValidationError::MissingRequired("PAYMENT__YOOKASSA_SECRET_KEY"));
            }
            if self.yookassa_return_url.is_empty() {
                return Err(ValidationError::MissingRequired("PAYMENT__YOOKASSA_RETURN_URL"));
            }
        }
        if self.checkout_timeout_secs == 0 {
            return Err(ValidationError::InvalidCheckoutTimeout);
        }
        if self.stars_per_currency_unit <= 0 {
            return Err(ValidationError::InvalidStarsRate);
        }
        Ok(())
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            yookassa_shop_id: None,
            yookassa_secret_key: None,
            yookassa_webhook_secret: None,
            yookassa_return_url: default_return_url(),
            telegram_bot_token: None,
            telegram_webhook_secret_token: None,
            checkout_timeout_secs: default_checkout_timeout(),
            stars_per_currency_unit: default_stars_rate(),
        }
    }
}

fn default_return_url() -> String {
    "https://t.me".to_string()
}

fn default_checkout_timeout() -> u64 {
    10
}

fn default_stars_rate() -> i64 {
    2
}
