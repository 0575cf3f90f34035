/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/
use std::env;
use std::fmt::Debug;
use std::str::FromStr;
use tracing::error;

/// Gets an environment variable or returns a default value if not found or cannot be parsed
///
/// A value that fails to parse is logged at `error` level.
pub fn get_env_or_default<T: FromStr>(env_var: &str, default: T) -> T
where
    <T as FromStr>::Err: Debug,
{
    match env::var(env_var) {
        Ok(val) => parse_or_default(env_var, &val, default),
        Err(_) => default,
    }
}

/// Whitespace separated list from an environment variable, empty when unset
pub fn get_env_list(env_var: &str) -> Vec<String> {
    env::var(env_var)
        .map(|val| split_list(&val))
        .unwrap_or_default()
}

fn parse_or_default<T: FromStr>(env_var: &str, raw: &str, default: T) -> T
where
    <T as FromStr>::Err: Debug,
{
    raw.trim().parse::<T>().unwrap_or_else(|e| {
        error!("Failed to parse {}: {} ({:?}), using default", env_var, raw, e);
        default
    })
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}
