use std::env;
use std::time::Duration;
use url::Url;

const DEFAULT_SALT_INDEX: &str = "1";
const DEFAULT_BASE_URL: &str = "https://api-preprod.phonepe.com/apis/pg-sandbox";
const DEFAULT_CALLBACK_URL: &str =
    "https://your-vercel-project-name.vercel.app/api/phonepe-callback";
const DEFAULT_STATUS_PAGE_URL: &str = "https://joyrentals.store/payment-status.html";
const DEFAULT_ALLOWED_ORIGIN: &str = "https://joyrentals.store";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PORT: u16 = 8000;

#[derive(Clone)]
pub struct GatewayConfig {
    /// Merchant id issued by PhonePe, sent in the payload and `X-MERCHANT-ID`
    pub merchant_id: String,
    /// Shared secret appended to the signing input
    pub salt_key: String,
    /// Which salt key version signed the request
    pub salt_index: String,
    /// Gateway host, e.g. the UAT sandbox or production
    pub base_url: String,
    /// Server-to-server notification URL
    pub callback_url: String,
    /// Customer-facing page the gateway redirects back to
    pub status_page_url: Url,
    /// The one site origin allowed to call us from a browser
    pub allowed_origin: String,
    /// Upper bound on the outbound create-payment call
    pub timeout: Duration,
    pub port: u16,
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("merchant_id", &self.merchant_id)
            .field("salt_key", &"[REDACTED]")
            .field("salt_index", &self.salt_index)
            .field("base_url", &self.base_url)
            .field("callback_url", &self.callback_url)
            .field("status_page_url", &self.status_page_url.as_str())
            .field("allowed_origin", &self.allowed_origin)
            .field("timeout", &self.timeout)
            .field("port", &self.port)
            .finish()
    }
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests need not touch the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let merchant_id = var("PHONEPE_MERCHANT_ID")
            .ok_or(ConfigError::MissingRequired("PHONEPE_MERCHANT_ID"))?;
        let salt_key =
            var("PHONEPE_SALT_KEY").ok_or(ConfigError::MissingRequired("PHONEPE_SALT_KEY"))?;

        let salt_index = var("PHONEPE_SALT_INDEX").unwrap_or_else(|| DEFAULT_SALT_INDEX.into());
        if salt_index.parse::<u32>().is_err() {
            return Err(ConfigError::InvalidSaltIndex(salt_index));
        }

        let url_or = |key: &str, default: &str| -> Result<String, ConfigError> {
            let raw = var(key).unwrap_or_else(|| default.into());
            parse_url(&raw)?;
            Ok(raw)
        };
        let base_url = url_or("PHONEPE_BASE_URL", DEFAULT_BASE_URL)?;
        let callback_url = url_or("PHONEPE_CALLBACK_URL", DEFAULT_CALLBACK_URL)?;
        let status_page_url = parse_url(&url_or("PAYMENT_STATUS_URL", DEFAULT_STATUS_PAGE_URL)?)?;
        let allowed_origin = url_or("ALLOWED_ORIGIN", DEFAULT_ALLOWED_ORIGIN)?;

        let timeout_secs = match var("PHONEPE_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => return Err(ConfigError::InvalidNumber("PHONEPE_TIMEOUT_SECS", raw)),
            },
            None => DEFAULT_TIMEOUT_SECS,
        };

        let port = match var("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| ConfigError::InvalidNumber("PORT", raw))?,
            None => DEFAULT_PORT,
        };

        if base_url == DEFAULT_BASE_URL {
            warn!("PHONEPE_BASE_URL not set, using the UAT sandbox");
        }
        if callback_url == DEFAULT_CALLBACK_URL {
            warn!("PHONEPE_CALLBACK_URL not set, the gateway will notify a placeholder host");
        }

        Ok(Self {
            merchant_id,
            salt_key,
            salt_index,
            base_url,
            callback_url,
            status_page_url,
            allowed_origin,
            timeout: Duration::from_secs(timeout_secs),
            port,
        })
    }
}

fn parse_url(raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|_| ConfigError::InvalidUrl(raw.to_string()))
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingRequired(&'static str),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("invalid salt index (expected an unsigned integer): {0}")]
    InvalidSaltIndex(String),

    #[error("invalid value for {0}: {1}")]
    InvalidNumber(&'static str, String),
}
