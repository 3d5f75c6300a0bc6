//! Caption setup: config loading, CLI overrides, trigger word resolution.

use std::path::Path;

use captioner_core::{Config, TriggerWord};

use super::CaptionArgs;

/// Load the config file (explicit `--config` or the default location) and
/// apply the command-line overrides on top.
pub fn load_config(args: &CaptionArgs) -> anyhow::Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load_from(&captioner_core::config::expand_path(path))?,
        None => Config::load()?,
    };
    apply_overrides(&mut config, args)?;
    config.validate()?;
    Ok(config)
}

/// Apply CLI flags to a loaded config.
pub fn apply_overrides(config: &mut Config, args: &CaptionArgs) -> anyhow::Result<()> {
    if let Some(template) = args.template {
        config.caption.template = template.into();
        // An explicit built-in choice wins over a prompt from the config file.
        config.caption.prompt = None;
    }
    if let Some(ref path) = args.prompt_file {
        let text = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Failed to read prompt file {}: {e}", path.display())
        })?;
        config.caption.prompt = Some(text);
    }
    if let Some(ref model) = args.model {
        config.llm.openai.model = model.clone();
    }
    if let Some(max_tokens) = args.max_tokens {
        config.caption.max_tokens = max_tokens;
    }
    if let Some(retries) = args.retries {
        config.pipeline.retry_attempts = retries;
    }
    Ok(())
}

/// Use `--trigger-word` if given, else the directory's own name.
pub fn resolve_trigger_word(explicit: Option<&str>, dir: &Path) -> anyhow::Result<TriggerWord> {
    let word = match explicit {
        Some(word) => word.to_string(),
        None => {
            let name = dir.file_name().map(|n| n.to_owned()).or_else(|| {
                dir.canonicalize()
                    .ok()
                    .and_then(|p| p.file_name().map(|n| n.to_owned()))
            });
            match name {
                Some(name) => name.to_string_lossy().into_owned(),
                None => anyhow::bail!(
                    "Cannot derive a trigger word from {:?}\n\n  Hint: pass --trigger-word.",
                    dir
                ),
            }
        }
    };

    TriggerWord::new(&word).ok_or_else(|| anyhow::anyhow!("Trigger word must not be empty"))
}
