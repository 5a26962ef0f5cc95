//! Shared fixtures for the behaviour suites.

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

/// Package path reported by the scripted `cargo deb`.
pub const PACKAGE_PATH: &str = "target/debian/tool_2.0.0_amd64.deb";

/// Create a temporary directory and return it with its UTF-8 path.
pub fn utf8_temp_dir() -> (TempDir, Utf8PathBuf) {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = Utf8PathBuf::try_from(dir.path().to_path_buf()).expect("UTF-8 temp dir");
    (dir, path)
}

/// Lay out a project as it looks after `cargo build --release` and
/// `cargo deb`: binaries for every platform, the documents, and a package.
pub fn write_built_project(root: &Utf8Path, tool: &str) {
    let release = root.join("target").join("release");
    std::fs::create_dir_all(&release).expect("create release dir");
    std::fs::write(release.join(tool), b"unix binary").expect("write binary");
    std::fs::write(release.join(format!("{tool}.exe")), b"windows binary").expect("write exe");

    let package = root.join(PACKAGE_PATH);
    let package_dir = package.parent().expect("package path has a parent");
    std::fs::create_dir_all(package_dir).expect("create package dir");
    std::fs::write(&package, b"debian package").expect("write package");

    for document in ["README.md", "CHANGELOG.md", "LICENSE"] {
        std::fs::write(root.join(document), document.as_bytes()).expect("write document");
    }
}
