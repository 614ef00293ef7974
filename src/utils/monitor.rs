//! Independent view of the current process, used to cross-check what the raw
//! syscall path reports.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessIdentity {
    pub pid: u32,
    pub name: Option<String>,
}

#[cfg(feature = "cli")]
impl ProcessIdentity {
    /// Asks the OS process table, not the C library, who we are.
    pub fn current() -> Option<Self> {
        use sysinfo::{ProcessesToUpdate, System};

        let pid = sysinfo::get_current_pid().ok()?;

        let mut system = System::new();
        system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
        let name = system
            .process(pid)
            .map(|process| process.name().to_string_lossy().into_owned());

        Some(Self {
            pid: pid.as_u32(),
            name,
        })
    }
}

// 非 CLI 環境下退回標準庫
#[cfg(not(feature = "cli"))]
impl ProcessIdentity {
    pub fn current() -> Option<Self> {
        Some(Self {
            pid: std::process::id(),
            name: None,
        })
    }
}

impl ProcessIdentity {
    pub fn matches(&self, raw_pid: i64) -> bool {
        i64::from(self.pid) == raw_pid
    }

    pub fn log(&self) {
        tracing::info!(
            "📊 Process {} ({})",
            self.pid,
            self.name.as_deref().unwrap_or("unknown")
        );
    }
}
