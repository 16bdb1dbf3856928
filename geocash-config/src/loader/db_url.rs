use url::Url;

use crate::{ConfigLoadError, sources::EnvConfig, sources::FileDatabaseConfig};

const DEFAULT_DB_PORT: u16 = 5432;

/// Resolves the PostgreSQL URL: `DATABASE_URL`, then `[database] url` in
/// the config file, then a URL assembled from `DB_HOST`, `DB_PORT`,
/// `DB_USER`, `DB_PASSWORD` and `DB_NAME`. Returns `None` when none of
/// these is configured.
pub fn resolve_database_url(
    env: &EnvConfig,
    file_database: &FileDatabaseConfig,
) -> Result<Option<String>, ConfigLoadError> {
    if let Some(url) = env
        .database_url
        .clone()
        .filter(|value| !value.trim().is_empty())
    {
        return Ok(Some(url));
    }

    if let Some(ref stored_url) = file_database.url {
        let trimmed = stored_url.trim();
        if !trimmed.is_empty() {
            let mut parsed = Url::parse(trimmed).map_err(|source| {
                ConfigLoadError::InvalidDatabaseUrl { source }
            })?;
            if parsed.password().is_none()
                && let Some(password) = database_password(env)
            {
                parsed.set_password(Some(&password)).map_err(|_| {
                    ConfigLoadError::InvalidDatabasePassword
                })?;
            }
            return Ok(Some(parsed.to_string()));
        }
    }

    let (Some(host), Some(user), Some(name)) = (
        env.database_host.clone(),
        env.database_user.clone(),
        env.database_name.clone(),
    ) else {
        return Ok(None);
    };

    let port = env.database_port.unwrap_or(DEFAULT_DB_PORT);
    let mut url = Url::parse(&format!("postgresql://{host}:{port}/{name}"))
        .map_err(|source| ConfigLoadError::InvalidDatabaseUrl { source })?;
    url.set_username(&user).map_err(|_| {
        ConfigLoadError::InvalidDatabaseUsername {
            username: user.clone(),
        }
    })?;
    if let Some(password) = database_password(env) {
        url.set_password(Some(&password))
            .map_err(|_| ConfigLoadError::InvalidDatabasePassword)?;
    }
    url.query_pairs_mut().append_pair("sslmode", "disable");
    Ok(Some(url.to_string()))
}

fn database_password(env: &EnvConfig) -> Option<String> {
    env.database_password
        .clone()
        .filter(|value| !value.is_empty())
}
