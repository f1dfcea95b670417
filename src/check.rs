//! The `models` command: verify the API key is present and print the
//! provider's model table.

use std::io::{self, Write};

use tracing::{info, warn};

use crate::models::{ModelLister, ModelRecord, ProviderError};

const ID_WIDTH: usize = 35;
const OWNER_WIDTH: usize = 15;
const RULE_WIDTH: usize = 55;
const KEY_PREVIEW_CHARS: usize = 10;

/// How a check run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The key variable was unset or empty; no request was made.
    MissingKey,
    /// The request failed.
    ApiError,
    /// Models were listed; holds the number of rows printed.
    Listed(usize),
}

impl CheckOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Listed(_))
    }
}

/// Parameters for a check run.
#[derive(Debug, Clone)]
pub struct CheckOptions<'a> {
    /// Provider display name.
    pub provider: &'a str,
    /// Name of the environment variable the key comes from.
    pub key_env: &'a str,
    /// Hide models the provider marks inactive.
    pub active_only: bool,
}

/// First characters of the key, cut on a character boundary.
fn key_preview(key: &str) -> &str {
    match key.char_indices().nth(KEY_PREVIEW_CHARS) {
        Some((idx, _)) => &key[..idx],
        None => key,
    }
}

fn write_table<W: Write>(out: &mut W, provider: &str, models: &[&ModelRecord]) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "--- 📋 Available {provider} Models ---")?;
    writeln!(
        out,
        "{:<ID_WIDTH$} | {:<OWNER_WIDTH$}",
        "Model ID", "Developer"
    )?;
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
    for model in models {
        writeln!(
            out,
            "{:<ID_WIDTH$} | {:<OWNER_WIDTH$}",
            model.id, model.owned_by
        )?;
    }
    Ok(())
}

/// Runs the check and writes the console report to `out`.
///
/// `api_key` is the raw value of the key variable, if set. `connect` builds
/// the lister and is only invoked once a key is present, so a missing key
/// never reaches the network.
pub fn run_check<W, L, F>(
    out: &mut W,
    opts: &CheckOptions<'_>,
    api_key: Option<&str>,
    connect: F,
) -> io::Result<CheckOutcome>
where
    W: Write,
    L: ModelLister,
    F: FnOnce(String) -> Result<L, ProviderError>,
{
    let Some(key) = api_key.filter(|k| !k.is_empty()) else {
        warn!(key_env = %opts.key_env, "api_key_missing");
        writeln!(out, "❌ Error: {} not found in .env file.", opts.key_env)?;
        writeln!(out, "Please add: {}=gsk_... to your .env file.", opts.key_env)?;
        return Ok(CheckOutcome::MissingKey);
    };

    writeln!(
        out,
        "✅ Using {} Key: {}... (verified present)",
        opts.provider,
        key_preview(key)
    )?;
    writeln!(out)?;
    writeln!(out, "Connecting to {} API...", opts.provider)?;

    let listed = connect(key.to_string()).and_then(|lister| lister.list_models());
    let models = match listed {
        Ok(models) => models,
        Err(e) => {
            warn!(error = %e, "list_models_failed");
            writeln!(out)?;
            writeln!(out, "❌ Error accessing {} API: {}", opts.provider, e)?;
            return Ok(CheckOutcome::ApiError);
        }
    };

    let shown: Vec<&ModelRecord> = models
        .iter()
        .filter(|m| !opts.active_only || m.is_active())
        .collect();
    write_table(out, opts.provider, &shown)?;

    info!(total = models.len(), shown = shown.len(), "models_listed");
    Ok(CheckOutcome::Listed(shown.len()))
}
