//! Confirmation capability for destructive commands.
//!
//! # Responsibility
//! - Let hosts decide how a yes/no prompt is shown (terminal, dialog, test).
//! - Keep core logic free of any rendering technology.
//!
//! # Invariants
//! - Destructive operations mutate state only after `confirm` returns `true`.

/// Host-provided yes/no prompt.
pub trait Confirmer {
    /// Asks the user to approve `prompt`. Returns `true` to proceed.
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirmer for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Confirmer that approves every prompt. Used by hosts whose user already
/// confirmed out of band.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Confirmer for AssumeYes {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// Confirmer that declines every prompt.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeNo;

impl Confirmer for AssumeNo {
    fn confirm(&self, _prompt: &str) -> bool {
        false
    }
}

/// Prompt shown before clearing all data.
pub const CLEAR_ALL_PROMPT: &str = "确定要清除所有档案数据吗？此操作不可恢复。";
/// Prompt shown before resetting to a single blank page.
pub const RESET_PROMPT: &str = "确定要重置档案吗？此操作将清除所有数据并保留一个空白页面。";

/// Prompt shown before deleting `page`.
pub fn delete_page_prompt(page: u32) -> String {
    format!("确定要删除第 {page} 页吗？")
}
