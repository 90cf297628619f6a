//! Startup scripts
//!
//! A script is handed the session manager and nothing else. How its source is
//! turned into something runnable is up to the `ScriptLoader` the shell
//! installs; the core never resolves code by name.

use crate::manager::SessionManager;

pub trait Script {
    fn execute(&self, manager: &mut SessionManager) -> anyhow::Result<()>;
}

pub trait ScriptLoader {
    /// Compile or otherwise prepare `source` for execution
    fn load(&self, source: &str) -> anyhow::Result<Box<dyn Script>>;
}

impl<F> Script for F
where
    F: Fn(&mut SessionManager) -> anyhow::Result<()>,
{
    fn execute(&self, manager: &mut SessionManager) -> anyhow::Result<()> {
        self(manager)
    }
}
