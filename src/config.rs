use std::env;

/// SMTP credentials plus the sender identity stamped on outgoing mail.
#[derive(Clone, Debug)]
pub struct SmtpConfig {
    pub host: String,
    pub username: String,
    pub password: String,
    pub from_name: String,
    pub from_email: String,
}

/// Runtime configuration, read once at startup from the environment.
#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub db_pool_size: u32,
    pub bind_addr: String,
    pub stripe_secret_key: Option<String>,
    pub rmq_url: Option<String>,
    pub smtp: Option<SmtpConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url =
            env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;
        let jwt_secret = env::var("JWT_SECRET").map_err(|_| "JWT_SECRET must be set".to_string())?;

        let token_ttl_hours = match env::var("TOKEN_TTL_HOURS") {
            Ok(raw) => raw
                .parse::<i64>()
                .map_err(|_| format!("TOKEN_TTL_HOURS is not a number: {raw}"))?,
            Err(_) => 24,
        };
        let db_pool_size = match env::var("DB_POOL_SIZE") {
            Ok(raw) => raw
                .parse::<u32>()
                .map_err(|_| format!("DB_POOL_SIZE is not a number: {raw}"))?,
            Err(_) => 10,
        };
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let stripe_secret_key = env::var("STRIPE_SECRET_KEY").ok();
        let rmq_url = env::var("RMQ_URL").ok();

        // Mail is only enabled when the full credential set is present.
        let smtp = match (
            env::var("SMTP_HOST"),
            env::var("SMTP_USERNAME"),
            env::var("SMTP_PASSWORD"),
        ) {
            (Ok(host), Ok(username), Ok(password)) => Some(SmtpConfig {
                host,
                username,
                password,
                from_name: env::var("MAIL_FROM_NAME")
                    .unwrap_or_else(|_| "Tailor Shop".to_string()),
                from_email: env::var("MAIL_FROM_EMAIL")
                    .unwrap_or_else(|_| "no-reply@tailorshop.local".to_string()),
            }),
            _ => None,
        };

        Ok(Config {
            database_url,
            jwt_secret,
            token_ttl_hours,
            db_pool_size,
            bind_addr,
            stripe_secret_key,
            rmq_url,
            smtp,
        })
    }
}
