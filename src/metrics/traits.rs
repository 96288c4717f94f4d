//! Traits at the seam between scrape orchestration and tool execution.

use crate::freeipmi::ToolOutput;

/// Runs an external FreeIPMI command for a scrape.
///
/// The production implementation is [`crate::freeipmi::FreeipmiExecutor`];
/// tests substitute canned outputs.
pub trait Executor: Send + Sync {
    /// Run `command` with `args`, delivering `config` as the FreeIPMI config
    /// file. An empty `target` addresses the local BMC.
    fn execute(
        &self,
        command: &str,
        args: &[String],
        config: &str,
        target: &str,
    ) -> impl std::future::Future<Output = ToolOutput> + Send;
}
