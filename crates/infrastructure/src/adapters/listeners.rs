//! Discovery of processes listening on a TCP port
//!
//! On Linux the kernel socket tables under `/proc/net` are matched against
//! the socket inodes in `/proc/<pid>/fd`. Elsewhere, or when `/proc` is not
//! readable, `lsof` is asked instead.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::process::Command;

use tracing::debug;

/// TCP state code of a listening socket in `/proc/net/tcp`
const TCP_LISTEN: &str = "0A";

/// Socket inodes listening on `port` in one `/proc/net/tcp`-style table
///
/// The local address column is `ADDR:PORT` with the port in hex; the state
/// is column 4 and the inode column 10.
pub fn listening_inodes(table: &str, port: u16) -> HashSet<u64> {
    table
        .lines()
        .skip(1)
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            let local = fields.get(1)?;
            let state = fields.get(3)?;
            let inode = fields.get(9)?;

            let (_, port_hex) = local.rsplit_once(':')?;
            let local_port = u16::from_str_radix(port_hex, 16).ok()?;

            (local_port == port && *state == TCP_LISTEN)
                .then(|| inode.parse::<u64>().ok())
                .flatten()
                .filter(|inode| *inode != 0)
        })
        .collect()
}

/// Inode from an fd link target such as `socket:[12345]`
pub fn socket_inode(link: &str) -> Option<u64> {
    link.strip_prefix("socket:[")?
        .strip_suffix(']')?
        .parse()
        .ok()
}

/// Pids holding one of `inodes` open, scanning `proc_root`
fn pids_holding(proc_root: &Path, inodes: &HashSet<u64>) -> Vec<u32> {
    let Ok(entries) = fs::read_dir(proc_root) else {
        return Vec::new();
    };

    let mut pids: Vec<u32> = entries
        .filter_map(Result::ok)
        .filter_map(|entry| entry.file_name().to_str()?.parse::<u32>().ok())
        .filter(|pid| {
            let Ok(fds) = fs::read_dir(proc_root.join(pid.to_string()).join("fd")) else {
                // Not ours to inspect
                return false;
            };
            fds.filter_map(Result::ok).any(|fd| {
                fs::read_link(fd.path())
                    .ok()
                    .and_then(|target| socket_inode(&target.to_string_lossy()))
                    .is_some_and(|inode| inodes.contains(&inode))
            })
        })
        .collect();
    pids.sort_unstable();
    pids
}

/// Listening pids from `/proc`; `None` when the socket tables are missing
fn from_procfs(port: u16) -> Option<Vec<u32>> {
    let proc_root = Path::new("/proc");
    let mut inodes = HashSet::new();
    let mut found_table = false;

    for table in ["net/tcp", "net/tcp6"] {
        if let Ok(contents) = fs::read_to_string(proc_root.join(table)) {
            found_table = true;
            inodes.extend(listening_inodes(&contents, port));
        }
    }

    if !found_table {
        return None;
    }
    if inodes.is_empty() {
        return Some(Vec::new());
    }
    Some(pids_holding(proc_root, &inodes))
}

/// Parse `lsof -t` output: one pid per line
pub fn parse_pid_lines(output: &str) -> Vec<u32> {
    let mut pids: Vec<u32> = Vec::new();
    for line in output.lines() {
        if let Ok(pid) = line.trim().parse::<u32>()
            && !pids.contains(&pid)
        {
            pids.push(pid);
        }
    }
    pids
}

fn from_lsof(port: u16) -> Vec<u32> {
    let output = Command::new("lsof")
        .args(["-t", "-n", "-P", &format!("-iTCP:{port}"), "-sTCP:LISTEN"])
        .output();

    match output {
        Ok(output) => parse_pid_lines(&String::from_utf8_lossy(&output.stdout)),
        Err(e) => {
            debug!(error = %e, "lsof unavailable");
            Vec::new()
        },
    }
}

/// Pids of processes listening on `port`
///
/// Blocking; run it off the async runtime.
pub fn find_listeners(port: u16) -> Vec<u32> {
    from_procfs(port).unwrap_or_else(|| from_lsof(port))
}
