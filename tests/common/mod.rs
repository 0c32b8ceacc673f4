//! Common test utilities for mbo-installer integration tests

#![allow(dead_code)]

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::path::PathBuf;

use assert_cmd::Command;
use serde_json::{Value, json};
use tempfile::TempDir;

/// A test workspace: a host snapshot file plus the owning module's directory
pub struct TestWorkspace {
    /// Temporary directory
    pub temp: TempDir,
    /// Path to workspace root
    pub path: PathBuf,
}

impl TestWorkspace {
    /// Create a new test workspace
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        std::fs::create_dir_all(path.join("ps_checkout")).expect("Failed to create module dir");
        Self { temp, path }
    }

    /// A workspace whose host runs the given platform version with no modules
    pub fn with_platform(platform_version: &str) -> Self {
        let workspace = Self::new();
        workspace.write_host(&host_snapshot(platform_version, json!([])));
        workspace.write_manifest(r#"{"dependencies": {}}"#);
        workspace
    }

    /// Write a file in workspace
    pub fn write_file(&self, path: &str, content: &str) {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
    }

    /// Read a file from workspace
    pub fn read_file(&self, path: &str) -> String {
        std::fs::read_to_string(self.path.join(path)).expect("Failed to read file")
    }

    /// Write the owning module's `ps_dependencies.json`
    pub fn write_manifest(&self, content: &str) {
        self.write_file("ps_checkout/ps_dependencies.json", content);
    }

    pub fn write_host(&self, snapshot: &Value) {
        self.write_file(
            "host.json",
            &serde_json::to_string_pretty(snapshot).expect("Failed to render snapshot"),
        );
    }

    pub fn read_host(&self) -> Value {
        serde_json::from_str(&self.read_file("host.json")).expect("Snapshot is not JSON")
    }

    /// A registry row of the snapshot, by module name
    pub fn host_module(&self, name: &str) -> Option<Value> {
        self.read_host()["modules"]
            .as_array()?
            .iter()
            .find(|m| m["name"] == name)
            .cloned()
    }

    pub fn module_dir(&self) -> PathBuf {
        self.path.join("ps_checkout")
    }

    /// The binary, pointed at this workspace, with a marketplace nothing listens on
    #[allow(deprecated)]
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("mbo-installer").expect("binary is built");
        cmd.env_remove("MBO_INSTALLER_LOG")
            .env_remove("MBO_INSTALLER_DOWNLOAD_DIR")
            .env_remove("MBO_INSTALLER_TIMEOUT_SECS")
            .env("MBO_INSTALLER_MARKETPLACE_URL", unused_local_url())
            .arg("--host")
            .arg(self.path.join("host.json"))
            .arg("--module-dir")
            .arg(self.module_dir());
        cmd
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// A host snapshot with one shop, an admin URL and `ps_checkout` as owner
pub fn host_snapshot(platform_version: &str, modules: Value) -> Value {
    json!({
        "platform_version": platform_version,
        "runtime_version": "8.1.27",
        "shop_ids": [1],
        "admin_url": "https://shop.test/admin-dev",
        "owner": {
            "name": "ps_checkout",
            "display_name": "PrestaShop Checkout",
            "version": "4.0.0"
        },
        "modules": modules
    })
}

/// Parse a command's stdout as JSON
pub fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

/// URL of a local port nothing listens on
pub fn unused_local_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind unused socket");
    let url = format!("http://{}", listener.local_addr().expect("local address"));
    drop(listener);
    url
}

/// Bytes of a minimal module package
pub fn module_package(name: &str, version: &str) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    writer
        .start_file(format!("{name}/config.xml"), options)
        .expect("Failed to start config.xml");
    writer
        .write_all(format!("<module><version>{version}</version></module>").as_bytes())
        .expect("Failed to write config.xml");
    writer.finish().expect("Failed to finish archive").into_inner()
}

/// Serve a single HTTP 200 response with `body` and return the server URL
pub fn serve_package_once(body: Vec<u8>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind test server");
    let url = format!("http://{}", listener.local_addr().expect("local address"));

    std::thread::spawn(move || {
        let Ok((stream, _)) = listener.accept() else {
            return;
        };
        let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
        let mut content_length = 0usize;
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line).unwrap_or(0) == 0 || line == "\r\n" {
                break;
            }
            if let Some(value) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
        let mut request_body = vec![0; content_length];
        let _ = reader.read_exact(&mut request_body);

        let mut stream = stream;
        let head = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/zip\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        let _ = stream.write_all(head.as_bytes());
        let _ = stream.write_all(&body);
        let _ = stream.flush();
    });

    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_creation() {
        let workspace = TestWorkspace::new();
        assert!(workspace.path.exists());
        assert!(workspace.module_dir().is_dir());
    }

    #[test]
    fn test_workspace_file_operations() {
        let workspace = TestWorkspace::with_platform("8.1.0");
        assert_eq!(
            workspace.read_file("ps_checkout/ps_dependencies.json"),
            r#"{"dependencies": {}}"#
        );
        assert_eq!(workspace.read_host()["platform_version"], "8.1.0");
        assert!(workspace.host_module("ps_mbo").is_none());
    }
}
