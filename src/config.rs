use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    /// Base URL clients use to fetch stored objects.
    pub public_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    pub workers: usize,
    pub queue_capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub storage: StorageConfig,
    pub audit: AuditConfig,
    pub mail_sender: String,
    pub dev_seed: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "dompetku".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "dompetku-users".into()),
            ttl_minutes: env_parse("JWT_TTL_MINUTES", 60 * 24),
        };
        let endpoint =
            std::env::var("MINIO_ENDPOINT").unwrap_or_else(|_| "http://localhost:9000".into());
        let bucket = std::env::var("MINIO_BUCKET").unwrap_or_else(|_| "dompetku".into());
        let storage = StorageConfig {
            public_url: std::env::var("MINIO_PUBLIC_URL")
                .unwrap_or_else(|_| format!("{}/{}", endpoint.trim_end_matches('/'), bucket)),
            endpoint,
            bucket,
            access_key: std::env::var("MINIO_ACCESS_KEY").unwrap_or_default(),
            secret_key: std::env::var("MINIO_SECRET_KEY").unwrap_or_default(),
        };
        let audit = AuditConfig {
            workers: env_parse("AUDIT_WORKERS", 2),
            queue_capacity: env_parse("AUDIT_QUEUE_CAPACITY", 256),
        };
        Ok(Self {
            database_url,
            jwt,
            storage,
            audit,
            mail_sender: std::env::var("MAIL_DEFAULT_SENDER")
                .unwrap_or_else(|_| "no-reply@dompetku.local".into()),
            dev_seed: std::env::var("DEV_SEED").map(|v| v == "true").unwrap_or(false),
        })
    }

    /// Whether the process should run against the in-process store instead of Postgres.
    pub fn uses_memory_store(&self) -> bool {
        self.database_url.starts_with("memory:")
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "memory:".into(),
        jwt: JwtConfig {
            secret: "test-secret".into(),
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
            ttl_minutes: 5,
        },
        storage: StorageConfig {
            endpoint: "fake".into(),
            bucket: "fake".into(),
            access_key: "fake".into(),
            secret_key: "fake".into(),
            public_url: "https://fake.local".into(),
        },
        audit: AuditConfig {
            workers: 1,
            queue_capacity: 16,
        },
        mail_sender: "test@dompetku.local".into(),
        dev_seed: false,
    }
}
