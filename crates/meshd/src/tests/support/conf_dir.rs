//! Temporary configuration base directories.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use mesh_config::ConfPaths;
use tempfile::TempDir;

use super::keys::{private_pkcs1_pem, public_pkcs1_pem};

/// A configuration base under a temporary directory, removed on drop.
pub struct TestConfDir {
    _dir: TempDir,
    paths: ConfPaths,
}

impl TestConfDir {
    /// Creates an empty configuration base with a `hosts/` directory.
    pub fn new() -> Self {
        Self::for_network(None)
    }

    /// Creates a configuration base for the named network.
    pub fn for_network(netname: Option<&str>) -> Self {
        let dir = TempDir::new().expect("temp dir");
        let root =
            Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 temp dir path");
        let paths = ConfPaths::new(root, netname.map(str::to_owned));
        fs::create_dir_all(paths.hosts_dir()).expect("hosts dir");
        set_mode(&paths.hosts_dir(), 0o755);
        Self { _dir: dir, paths }
    }

    /// Paths rooted at this directory.
    pub fn paths(&self) -> &ConfPaths {
        &self.paths
    }

    /// Configuration base.
    pub fn root(&self) -> &Utf8Path {
        self.paths.confbase()
    }

    /// Writes `contents` to `relative` with permission bits `mode` and
    /// returns the absolute path.
    pub fn write_key(&self, relative: &str, contents: &str, mode: u32) -> Utf8PathBuf {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("parent dir");
        }
        fs::write(&path, contents).expect("write file");
        set_mode(&path, mode);
        path
    }

    /// Writes the global configuration file.
    pub fn write_config(&self, contents: &str) {
        fs::write(self.paths.config_file(), contents).expect("write config");
    }

    /// Provisions node `name`: global settings, private key, and a host
    /// file holding `host` settings followed by the public key.
    pub fn provision_node(&self, name: &str, global: &str, host: &str) {
        self.write_config(&format!("Name = {name}\n{global}"));
        self.write_key("rsa_key.priv", &private_pkcs1_pem(), 0o600);
        self.write_key(
            &format!("hosts/{name}"),
            &format!("{host}\n{}", public_pkcs1_pem()),
            0o644,
        );
    }
}

#[cfg(unix)]
fn set_mode(path: &Utf8Path, mode: u32) {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).expect("chmod");
}

#[cfg(not(unix))]
fn set_mode(_path: &Utf8Path, _mode: u32) {}
