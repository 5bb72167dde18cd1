//! Free-text feature settings stored in the key/value store.

use crate::cli::settings::error::SettingError;
use crate::cli::settings::helpers::{read_store, success_set, success_unset, write_store};
use crate::cli::settings::{SetContext, SettingHandler};

pub const DEFAULT_PROMPT_ID: &str = "default";

/// Handler for the `prompt-id` setting: which prompt library entry the
/// assistant uses as its system prompt.
pub struct PromptIdHandler;

const PROMPT_ID_STORE_KEY: &str = "promptId";

impl SettingHandler for PromptIdHandler {
    fn key(&self) -> &'static str {
        "prompt-id"
    }

    fn set(&self, args: &[String], ctx: &mut SetContext<'_>) -> Result<String, SettingError> {
        let value = args.join(" ");
        if value.trim().is_empty() {
            return Err(SettingError::MissingArgs {
                hint: "To choose a system prompt, provide its id:",
                example: "chatkeep features set prompt-id optimized",
            });
        }

        write_store(ctx.kv, PROMPT_ID_STORE_KEY, value.trim())?;
        Ok(success_set("prompt-id", value.trim()))
    }

    fn unset(&self, ctx: &mut SetContext<'_>) -> Result<String, SettingError> {
        write_store(ctx.kv, PROMPT_ID_STORE_KEY, DEFAULT_PROMPT_ID)?;
        Ok(success_unset("prompt-id", DEFAULT_PROMPT_ID))
    }

    fn format(&self, ctx: &SetContext<'_>) -> Result<String, SettingError> {
        Ok(match read_store(&*ctx.kv, PROMPT_ID_STORE_KEY)? {
            Some(id) => format!("  prompt-id: {id}"),
            None => format!("  prompt-id: (unset, default: {DEFAULT_PROMPT_ID})"),
        })
    }
}
