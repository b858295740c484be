//! JIRA ticket key discovery.

use anyhow::{Context, Result};
use regex::Regex;

/// Collects ticket keys matching `pattern` from `texts`, in first-seen order
/// and without duplicates.
pub fn extract_tickets<'a, I>(pattern: &str, texts: I) -> Result<Vec<String>>
where
    I: IntoIterator<Item = &'a str>,
{
    let re = Regex::new(pattern).with_context(|| format!("Invalid JIRA pattern '{pattern}'"))?;

    let mut tickets: Vec<String> = Vec::new();
    for text in texts {
        for found in re.find_iter(text) {
            let key = found.as_str().to_string();
            if !tickets.contains(&key) {
                tickets.push(key);
            }
        }
    }
    Ok(tickets)
}

/// Explicit tickets first, then discovered ones not already listed.
pub fn merge_tickets(explicit: &[String], discovered: Vec<String>) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(explicit.len() + discovered.len());
    for key in explicit.iter().cloned().chain(discovered) {
        let key = key.trim().to_string();
        if !key.is_empty() && !merged.contains(&key) {
            merged.push(key);
        }
    }
    merged
}
