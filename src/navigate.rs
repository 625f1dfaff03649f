//! Handing the selected URL off once a boot sequence completes

use anyhow::{Context, Result};
use std::process::{Command, Stdio};
use tracing::debug;

/// Where a finished boot sequence sends its URL
pub trait Navigator {
    fn navigate(&mut self, url: &str) -> Result<()>;
}

/// Opens URLs with the desktop's default handler
#[derive(Debug, Default)]
pub struct SystemOpener;

impl SystemOpener {
    fn command(url: &str) -> Command {
        if cfg!(target_os = "macos") {
            let mut cmd = Command::new("open");
            cmd.arg(url);
            cmd
        } else if cfg!(target_os = "windows") {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", "start", "", url]);
            cmd
        } else {
            let mut cmd = Command::new("xdg-open");
            cmd.arg(url);
            cmd
        }
    }
}

impl Navigator for SystemOpener {
    fn navigate(&mut self, url: &str) -> Result<()> {
        debug!("Opening {}", url);
        Self::command(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("Failed to launch URL opener for {url}"))?;
        Ok(())
    }
}

/// Records URLs instead of opening them (`--print-url` and tests)
#[derive(Debug, Default)]
pub struct DeferredNavigator {
    visited: Vec<String>,
}

impl DeferredNavigator {
    pub fn visited(&self) -> &[String] {
        &self.visited
    }

    pub fn into_visited(self) -> Vec<String> {
        self.visited
    }
}

impl Navigator for DeferredNavigator {
    fn navigate(&mut self, url: &str) -> Result<()> {
        self.visited.push(url.to_string());
        Ok(())
    }
}
