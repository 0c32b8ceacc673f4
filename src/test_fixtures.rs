//! Test fixtures and utilities for reducing test setup duplication.
//!
//! This module provides:
//! - temp directories that never land under the current working directory
//! - module package archives built on the fly
//! - [`FakeHost`], an in-memory host with a call log and failure injection
//! - [`FakeMarketplace`], a marketplace serving canned packages
//! - a one-shot local HTTP server for transport tests
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_fixtures::{FakeHost, FakeMarketplace};
//!
//! let host = FakeHost::new("8.1.0").with_module("ps_mbo", "4.0.0", false);
//! let marketplace = FakeMarketplace::serving_module("ps_mbo", "4.11.0");
//! ```

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;

use tempfile::TempDir;
use zip::write::SimpleFileOptions;

use crate::config::settings::temp_dir_base;
use crate::error::{Result, host, transport};
use crate::host::snapshot::{HostSnapshot, OwnerModule, SnapshotHost, SnapshotModule};
use crate::host::{
    ContextProvider, InstallSource, ModuleAction, ModuleInstance, ModuleManager, ModuleRecord,
    ModuleRegistry, Router, ShopId,
};
use crate::marketplace::{DownloadRequest, MarketplaceClient};

/// Create a temp directory in the system temp location.
///
/// # Panics
///
/// Panics if the temp directory cannot be created.
#[must_use]
pub fn create_temp_dir() -> TempDir {
    TempDir::new_in(temp_dir_base()).expect("Failed to create temp directory")
}

/// Bytes of a minimal module package: `<name>/config.xml` and `<name>/<name>.php`
#[must_use]
pub fn module_archive_bytes(name: &str, version: &str) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    writer
        .start_file(format!("{name}/config.xml"), options)
        .expect("Failed to start config.xml");
    writer
        .write_all(
            format!("<module><name>{name}</name><version>{version}</version></module>")
                .as_bytes(),
        )
        .expect("Failed to write config.xml");

    writer
        .start_file(format!("{name}/{name}.php"), options)
        .expect("Failed to start main file");
    writer
        .write_all(b"<?php\n")
        .expect("Failed to write main file");

    writer.finish().expect("Failed to finish archive").into_inner()
}

/// Bytes of an uncompressed module package whose second entry fails its CRC check.
/// The central directory is intact, so the archive opens and lists fine.
#[must_use]
pub fn corrupt_module_archive_bytes(name: &str) -> Vec<u8> {
    const PAYLOAD: &[u8] = b"<?php // original module body";
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);

    writer
        .start_file(format!("{name}/config.xml"), options)
        .expect("Failed to start config.xml");
    writer
        .write_all(b"<module><version>1.0.0</version></module>")
        .expect("Failed to write config.xml");
    writer
        .start_file(format!("{name}/{name}.php"), options)
        .expect("Failed to start main file");
    writer.write_all(PAYLOAD).expect("Failed to write main file");
    let mut bytes = writer.finish().expect("Failed to finish archive").into_inner();

    let offset = bytes
        .windows(PAYLOAD.len())
        .position(|window| window == PAYLOAD)
        .expect("payload is stored uncompressed");
    bytes[offset..offset + PAYLOAD.len()].fill(b'X');
    bytes
}

/// Write a minimal module package to `path`
pub fn write_module_archive(path: &Path, name: &str, version: &str) {
    std::fs::write(path, module_archive_bytes(name, version)).expect("Failed to write archive");
}

/// Create a module directory holding a manifest
#[must_use]
pub fn create_module_dir(manifest: &str) -> TempDir {
    let temp = create_temp_dir();
    std::fs::write(temp.path().join("ps_dependencies.json"), manifest)
        .expect("Failed to write manifest");
    temp
}

/// In-memory host with a call log and failure injection
pub struct FakeHost {
    inner: SnapshotHost,
    calls: RefCell<Vec<String>>,
    archives_seen: RefCell<Vec<PathBuf>>,
    fail_install: RefCell<Option<String>>,
    reject_install: Cell<bool>,
}

impl FakeHost {
    /// A single-shop host on the given platform version with no modules
    pub fn new(platform_version: &str) -> Self {
        Self::from_snapshot(HostSnapshot {
            platform_version: platform_version.to_string(),
            runtime_version: "8.2.10".to_string(),
            locale: None,
            shop_ids: vec![1],
            admin_url: Some("https://shop.test/admin".to_string()),
            owner: OwnerModule {
                name: "ps_checkout".to_string(),
                display_name: "PrestaShop Checkout".to_string(),
                version: "4.0.0".to_string(),
            },
            modules: Vec::new(),
            catalog: BTreeMap::new(),
        })
    }

    pub fn from_snapshot(snapshot: HostSnapshot) -> Self {
        Self {
            inner: SnapshotHost::new(snapshot),
            calls: RefCell::new(Vec::new()),
            archives_seen: RefCell::new(Vec::new()),
            fail_install: RefCell::new(None),
            reject_install: Cell::new(false),
        }
    }

    fn edit(self, f: impl FnOnce(&mut HostSnapshot)) -> Self {
        let mut snapshot = self.inner.snapshot();
        f(&mut snapshot);
        self.inner.replace(snapshot);
        self
    }

    fn push_module(self, module: SnapshotModule) -> Self {
        self.edit(|s| {
            s.modules.retain(|m| m.name != module.name);
            s.modules.push(module);
        })
    }

    /// A module present on disk but never installed
    #[must_use]
    pub fn with_on_disk(self, name: &str, version: &str) -> Self {
        self.push_module(SnapshotModule {
            name: name.to_string(),
            id: 0,
            version: version.to_string(),
            on_disk: true,
            installed: false,
            active: false,
            active_shops: Vec::new(),
        })
    }

    /// An installed module, active in every shop when `active`
    #[must_use]
    pub fn with_module(self, name: &str, version: &str, active: bool) -> Self {
        let shops = if active {
            self.inner.shop_ids()
        } else {
            Vec::new()
        };
        self.with_module_in_shops(name, version, active, &shops)
    }

    /// An installed module with an explicit registry flag and shop association
    #[must_use]
    pub fn with_module_in_shops(
        self,
        name: &str,
        version: &str,
        active: bool,
        active_shops: &[ShopId],
    ) -> Self {
        let id = self.inner.snapshot().modules.len() as u64 + 10;
        self.push_module(SnapshotModule {
            name: name.to_string(),
            id,
            version: version.to_string(),
            on_disk: true,
            installed: true,
            active,
            active_shops: active_shops.to_vec(),
        })
    }

    #[must_use]
    pub fn with_shops(self, shops: &[ShopId]) -> Self {
        self.edit(|s| s.shop_ids = shops.to_vec())
    }

    #[must_use]
    pub fn with_locale(self, locale: &str) -> Self {
        self.edit(|s| s.locale = Some(locale.to_string()))
    }

    #[must_use]
    pub fn with_catalog(self, name: &str, version: &str) -> Self {
        self.edit(|s| {
            s.catalog.insert(name.to_string(), version.to_string());
        })
    }

    #[must_use]
    pub fn without_router(self) -> Self {
        self.edit(|s| s.admin_url = None)
    }

    /// Make the install primitive raise
    pub fn fail_install(&self, reason: &str) {
        *self.fail_install.borrow_mut() = Some(reason.to_string());
    }

    /// Make the install primitive report `false`
    pub fn reject_install(&self) {
        self.reject_install.set(true);
    }

    /// Flip the registry active flag of an installed module
    pub fn set_active(&self, name: &str, active: bool) {
        if active {
            self.inner.enable(name).unwrap();
        } else {
            let mut snapshot = self.inner.snapshot();
            for module in snapshot.modules.iter_mut().filter(|m| m.name == name) {
                module.active = false;
                module.active_shops.clear();
            }
            self.inner.replace(snapshot);
        }
    }

    /// Host primitive calls, in order (`install ps_mbo archive`, `enable ps_mbo`, ...)
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Archive paths handed to the install primitive
    pub fn archives_seen(&self) -> Vec<PathBuf> {
        self.archives_seen.borrow().clone()
    }

    /// Current state
    pub fn snapshot(&self) -> HostSnapshot {
        self.inner.snapshot()
    }
}

impl ModuleRegistry for FakeHost {
    fn find(&self, name: &str) -> Result<Option<ModuleRecord>> {
        self.inner.find(name)
    }

    fn count_active_shops(&self, module_id: u64, shop_ids: &[ShopId]) -> Result<usize> {
        self.inner.count_active_shops(module_id, shop_ids)
    }

    fn instance(&self, name: &str) -> Option<ModuleInstance> {
        self.inner.instance(name)
    }

    fn is_installed(&self, name: &str) -> bool {
        self.inner.is_installed(name)
    }

    fn is_enabled(&self, name: &str) -> bool {
        self.inner.is_enabled(name)
    }
}

impl ModuleManager for FakeHost {
    fn install(&self, name: &str, source: InstallSource<'_>) -> Result<bool> {
        let kind = match source {
            InstallSource::Name => "name",
            InstallSource::Archive(path) => {
                assert!(path.is_file(), "archive must exist while installing");
                self.archives_seen.borrow_mut().push(path.to_path_buf());
                "archive"
            }
        };
        self.calls.borrow_mut().push(format!("install {name} {kind}"));

        if let Some(reason) = self.fail_install.borrow().clone() {
            return Err(host::operation_failed("install", name, reason));
        }
        if self.reject_install.get() {
            return Ok(false);
        }
        self.inner.install(name, source)
    }

    fn enable(&self, name: &str) -> Result<bool> {
        self.calls.borrow_mut().push(format!("enable {name}"));
        self.inner.enable(name)
    }

    fn uninstall(&self, name: &str) -> Result<bool> {
        self.calls.borrow_mut().push(format!("uninstall {name}"));
        self.inner.uninstall(name)
    }
}

impl Router for FakeHost {
    fn module_action(&self, action: ModuleAction, module_name: &str) -> Result<String> {
        self.inner.module_action(action, module_name)
    }
}

impl ContextProvider for FakeHost {
    fn platform_version(&self) -> String {
        self.inner.platform_version()
    }

    fn runtime_version(&self) -> String {
        self.inner.runtime_version()
    }

    fn operator_locale(&self) -> Option<String> {
        self.inner.operator_locale()
    }

    fn shop_ids(&self) -> Vec<ShopId> {
        self.inner.shop_ids()
    }
}

/// Marketplace serving canned packages by module id
#[derive(Default)]
pub struct FakeMarketplace {
    packages: BTreeMap<u64, Vec<u8>>,
    unreachable: bool,
    requests: RefCell<Vec<DownloadRequest>>,
}

impl FakeMarketplace {
    /// Serve a valid package of `name` under its default marketplace id
    pub fn serving_module(name: &str, version: &str) -> Self {
        let id = crate::config::Settings::default()
            .marketplace_id(name)
            .expect("module has a known marketplace id");
        Self::default().with_package(id, module_archive_bytes(name, version))
    }

    #[must_use]
    pub fn with_package(mut self, module_id: u64, bytes: Vec<u8>) -> Self {
        self.packages.insert(module_id, bytes);
        self
    }

    /// Every download fails with a transport error
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    pub fn requests(&self) -> Vec<DownloadRequest> {
        self.requests.borrow().clone()
    }
}

impl MarketplaceClient for FakeMarketplace {
    fn download(&self, request: &DownloadRequest) -> Result<Vec<u8>> {
        self.requests.borrow_mut().push(request.clone());
        let url = format!("fake://marketplace/?{}", request.query_string());
        if self.unreachable {
            return Err(transport::failed(url, "connection refused"));
        }
        self.packages
            .get(&request.module_id)
            .cloned()
            .ok_or_else(|| transport::status(url, 404))
    }
}

/// A local HTTP server answering exactly one request
pub struct OneShotServer {
    pub url: String,
    request_line: mpsc::Receiver<String>,
}

impl OneShotServer {
    /// The request line received (`POST /?id_module=... HTTP/1.1`)
    pub fn request_line(&self) -> String {
        self.request_line
            .recv_timeout(std::time::Duration::from_secs(5))
            .expect("server received no request")
    }
}

/// Serve one HTTP response with the given status and body
pub fn serve_once(status: u16, body: Vec<u8>) -> OneShotServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind test server");
    let url = format!("http://{}", listener.local_addr().unwrap());
    let (sender, receiver) = mpsc::channel();

    thread::spawn(move || {
        let Ok((stream, _)) = listener.accept() else {
            return;
        };
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();

        let mut content_length = 0usize;
        loop {
            let mut header = String::new();
            if reader.read_line(&mut header).unwrap() == 0 || header == "\r\n" {
                break;
            }
            if let Some(value) = header.to_ascii_lowercase().strip_prefix("content-length:") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
        let mut request_body = vec![0; content_length];
        reader.read_exact(&mut request_body).unwrap();

        let mut stream = stream;
        let head = format!(
            "HTTP/1.1 {status} Test\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        stream.write_all(head.as_bytes()).unwrap();
        stream.write_all(&body).unwrap();
        stream.flush().unwrap();
        let _ = sender.send(request_line.trim_end().to_string());
    });

    OneShotServer {
        url,
        request_line: receiver,
    }
}

/// URL of a local port nothing listens on
pub fn unused_local_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind unused socket");
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_temp_dir() {
        let temp = create_temp_dir();
        assert!(temp.path().exists());
    }

    #[test]
    fn test_fake_host_builders() {
        let host = FakeHost::new("1.7.6")
            .with_shops(&[1, 2, 3])
            .with_module_in_shops("bar", "1.0.0", true, &[1, 2])
            .with_on_disk("ps_mbo", "4.0.0");
        let record = host.find("bar").unwrap().unwrap();
        assert_eq!(host.count_active_shops(record.id, &[1, 2, 3]).unwrap(), 2);
        assert!(host.instance("ps_mbo").is_some());
        assert!(host.calls().is_empty());
    }

    #[test]
    fn test_fake_marketplace_missing_package_is_404() {
        let marketplace = FakeMarketplace::default();
        let err = marketplace
            .download(&DownloadRequest::new(1, "8.0.0"))
            .unwrap_err();
        assert!(err.to_string().contains("404"));
        assert_eq!(marketplace.requests().len(), 1);
    }
}
