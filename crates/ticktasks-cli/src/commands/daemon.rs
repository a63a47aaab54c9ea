//! Daemon management commands.
//!
//! The daemon records its process id in `daemon.pid` inside the config
//! directory; these commands read that file instead of searching by name.

use std::fs;
use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use ticktasks_core::Config;

pub async fn run_start() -> Result<()> {
    match running_pid() {
        Ok(Some(pid)) => {
            println!("\u{2139}  Daemon is already running (pid {}).", pid);
            return Ok(());
        }
        Ok(None) => {}
        Err(e) => {
            println!("\u{26a0}  Could not check daemon status: {}", e);
            println!("  Attempting to start anyway...");
        }
    }

    let daemon_path = std::env::current_exe()?
        .parent()
        .ok_or_else(|| anyhow::anyhow!("Could not determine executable directory"))?
        .join(if cfg!(windows) { "ticktasks-daemon.exe" } else { "ticktasks-daemon" });

    if !daemon_path.exists() {
        println!("\u{2717} Daemon binary not found at {:?}", daemon_path);
        println!("  Run `cargo build -p ticktasks-daemon` first.");
        return Ok(());
    }

    let config_dir = Config::config_dir()?;
    fs::create_dir_all(&config_dir)
        .with_context(|| format!("Failed to create config directory: {}", config_dir.display()))?;
    let log_path = config_dir.join("daemon.log");
    let log = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open daemon log: {}", log_path.display()))?;

    let child = Command::new(&daemon_path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(log)
        .spawn()
        .map_err(|e| anyhow::anyhow!("Failed to start daemon: {}", e))?;

    println!("\u{2713} Daemon started (pid {}).", child.id());
    println!("  Logging to {}", log_path.display());
    Ok(())
}

pub async fn run_stop() -> Result<()> {
    let Some(pid) = running_pid()? else {
        println!("\u{2139}  Daemon was not running.");
        remove_pid_file()?;
        return Ok(());
    };

    #[cfg(unix)]
    let output = Command::new("kill").arg(pid.to_string()).output();

    #[cfg(windows)]
    let output = Command::new("taskkill")
        .args(["/F", "/PID", &pid.to_string()])
        .output();

    match output {
        Ok(o) if o.status.success() => {
            remove_pid_file()?;
            println!("\u{2713} Daemon stopped.");
        }
        Ok(o) => println!(
            "\u{26a0}  Stopping pid {} exited with unexpected status: {:?}",
            pid,
            o.status.code()
        ),
        Err(e) => return Err(anyhow::anyhow!("Failed to stop daemon: {}", e)),
    }

    Ok(())
}

pub async fn run_status() -> Result<()> {
    match running_pid() {
        Ok(Some(pid)) => {
            println!("\u{2713} Daemon is running (pid {}).", pid);
        }
        Ok(None) => {
            println!("\u{2717} Daemon is not running.");
            println!("  Run `ticktasks daemon start` to start it.");
        }
        Err(e) => {
            println!("\u{26a0}  Could not determine daemon status: {}", e);
        }
    }
    Ok(())
}

fn remove_pid_file() -> Result<()> {
    let path = Config::pid_path()?;
    if path.exists() {
        fs::remove_file(&path)
            .with_context(|| format!("Failed to remove pid file: {}", path.display()))?;
    }
    Ok(())
}

/// The recorded daemon pid, if that process is still alive.
fn running_pid() -> Result<Option<u32>> {
    let path = Config::pid_path()?;
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read pid file: {}", path.display()))?;
    let Ok(pid) = content.trim().parse::<u32>() else {
        return Ok(None);
    };

    Ok(is_alive(pid)?.then_some(pid))
}

fn is_alive(pid: u32) -> Result<bool> {
    #[cfg(unix)]
    {
        let output = Command::new("kill")
            .args(["-0", &pid.to_string()])
            .stderr(Stdio::null())
            .output()
            .map_err(|e| anyhow::anyhow!("Failed to execute kill: {}", e))?;

        Ok(output.status.success())
    }

    #[cfg(windows)]
    {
        let output = Command::new("tasklist")
            .args(["/FI", &format!("PID eq {}", pid)])
            .output()
            .map_err(|e| anyhow::anyhow!("Failed to execute tasklist: {}", e))?;

        Ok(String::from_utf8_lossy(&output.stdout).contains("ticktasks-daemon"))
    }
}
