use crate::constants::RUN_ID_LENGTH;

/// Generates a run identifier
///
/// 30 characters of `A-Z` and `0-9` from `nanoid`, attached to every log line
/// of a scheduled cycle.
///
/// # Examples
/// ```
/// use bank_agent::utils::id::new_run_id;
/// let id = new_run_id();
/// assert_eq!(id.len(), 30);
/// ```
#[must_use]
pub fn new_run_id() -> String {
    let alphabet: Vec<char> = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789".chars().collect();
    nanoid::nanoid!(RUN_ID_LENGTH, &alphabet)
}
