use anyhow::Error;
use dotenv::dotenv;
use std::env;

pub fn get_env_var(key: &str) -> Result<String, Error> {
    dotenv().ok();
    Ok(env::var(key)?)
}

// unset and blank values are both treated as absent
pub fn get_optional_env_var(key: &str) -> Option<String> {
    match get_env_var(key) {
        Ok(raw) if !raw.trim().is_empty() => Some(raw.trim().to_string()),
        _ => None,
    }
}
