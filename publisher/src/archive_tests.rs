//! Unit tests for release archive creation.

use super::*;
use rstest::{fixture, rstest};
use std::collections::BTreeMap;
use std::path::Path;
use tempfile::TempDir;

struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

#[fixture]
fn workspace() -> Workspace {
    let dir = TempDir::new().expect("temp dir creation succeeds");
    let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).expect("utf-8 temp dir");
    Workspace { _dir: dir, root }
}

/// Build a staging tree with a binary, documents, and a nested directory.
fn staging_tree(root: &Utf8Path) -> Utf8PathBuf {
    let staging = root.join("tool-1.0.0-linux");
    fs::create_dir_all(staging.join("completions")).expect("mkdir");
    fs::write(staging.join("tool"), b"\x7fELF binary").expect("write binary");
    fs::write(staging.join("README.md"), b"# tool\n").expect("write readme");
    fs::write(staging.join("LICENSE"), b"ISC").expect("write license");
    fs::write(staging.join("completions").join("tool.bash"), b"complete -F _tool tool")
        .expect("write completion");
    staging
}

/// Map every file under `dir` to its contents, keyed by `/`-separated
/// relative path.
fn snapshot(dir: &Path) -> BTreeMap<String, Vec<u8>> {
    fn visit(base: &Path, dir: &Path, out: &mut BTreeMap<String, Vec<u8>>) {
        for entry in fs::read_dir(dir).expect("read_dir") {
            let path = entry.expect("entry").path();
            if path.is_dir() {
                visit(base, &path, out);
            } else {
                let relative = path
                    .strip_prefix(base)
                    .expect("under base")
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join("/");
                out.insert(relative, fs::read(&path).expect("read file"));
            }
        }
    }
    let mut out = BTreeMap::new();
    visit(dir, dir, &mut out);
    out
}

fn extract(archive: &Utf8Path, format: ArchiveFormat, dest: &Path) {
    let file = fs::File::open(archive).expect("open archive");
    match format {
        ArchiveFormat::TarGz => {
            let decoder = flate2::read::GzDecoder::new(file);
            tar::Archive::new(decoder).unpack(dest).expect("unpack tar.gz");
        }
        ArchiveFormat::Zip => {
            zip::ZipArchive::new(file)
                .expect("read zip")
                .extract(dest)
                .expect("extract zip");
        }
    }
}

fn member_names(archive: &Utf8Path, format: ArchiveFormat) -> Vec<String> {
    let file = fs::File::open(archive).expect("open archive");
    match format {
        ArchiveFormat::TarGz => {
            let mut archive = tar::Archive::new(flate2::read::GzDecoder::new(file));
            let names: Vec<String> = archive
                .entries()
                .expect("entries")
                .map(|e| {
                    let entry = e.expect("entry");
                    entry.path().expect("path").to_string_lossy().into_owned()
                })
                .collect();
            names
        }
        ArchiveFormat::Zip => {
            let archive = zip::ZipArchive::new(file).expect("read zip");
            let names: Vec<String> = archive.file_names().map(str::to_owned).collect();
            names
        }
    }
}

#[rstest]
#[case::tar_gz(ArchiveFormat::TarGz)]
#[case::zip(ArchiveFormat::Zip)]
fn extracting_reproduces_the_staging_tree(workspace: Workspace, #[case] format: ArchiveFormat) {
    let staging = staging_tree(&workspace.root);
    let archive = create_archive(&staging, format).expect("archive creation succeeds");

    let out = TempDir::new().expect("extraction dir");
    extract(&archive, format, out.path());

    let extracted = snapshot(&out.path().join("tool-1.0.0-linux"));
    assert_eq!(extracted, snapshot(staging.as_std_path()));
}

#[rstest]
#[case::tar_gz(ArchiveFormat::TarGz, "tool-1.0.0-linux.tar.gz")]
#[case::zip(ArchiveFormat::Zip, "tool-1.0.0-linux.zip")]
fn archive_is_a_sibling_named_after_the_staging_dir(
    workspace: Workspace,
    #[case] format: ArchiveFormat,
    #[case] expected: &str,
) {
    let staging = staging_tree(&workspace.root);
    let archive = create_archive(&staging, format).expect("archive creation succeeds");

    assert_eq!(archive, workspace.root.join(expected));
    assert!(archive.is_file());
}

#[rstest]
fn tar_members_are_sorted_under_a_single_top_level_dir(workspace: Workspace) {
    let staging = staging_tree(&workspace.root);
    let archive = create_archive(&staging, ArchiveFormat::TarGz).expect("archive");

    let names = member_names(&archive, ArchiveFormat::TarGz);
    let files: Vec<_> = names.iter().map(|n| n.trim_end_matches('/')).collect();
    assert_eq!(
        files,
        [
            "tool-1.0.0-linux",
            "tool-1.0.0-linux/LICENSE",
            "tool-1.0.0-linux/README.md",
            "tool-1.0.0-linux/completions",
            "tool-1.0.0-linux/completions/tool.bash",
            "tool-1.0.0-linux/tool",
        ]
    );
}

#[rstest]
#[case::tar_gz(ArchiveFormat::TarGz)]
#[case::zip(ArchiveFormat::Zip)]
fn repeated_runs_list_identical_members(workspace: Workspace, #[case] format: ArchiveFormat) {
    let staging = staging_tree(&workspace.root);

    let first = create_archive(&staging, format).expect("first archive");
    let first_names = member_names(&first, format);
    let second = create_archive(&staging, format).expect("second archive");

    assert_eq!(first_names, member_names(&second, format));
}

#[cfg(unix)]
#[rstest]
fn zip_preserves_executable_bit(workspace: Workspace) {
    use std::os::unix::fs::PermissionsExt;

    let staging = staging_tree(&workspace.root);
    let binary = staging.join("tool");
    fs::set_permissions(&binary, fs::Permissions::from_mode(0o755)).expect("chmod");

    let archive = create_archive(&staging, ArchiveFormat::Zip).expect("archive");
    let mut zip = zip::ZipArchive::new(fs::File::open(&archive).expect("open")).expect("zip");
    let entry = zip.by_name("tool-1.0.0-linux/tool").expect("binary entry");

    assert_eq!(entry.unix_mode().map(|m| m & 0o777), Some(0o755));
}

#[rstest]
fn missing_staging_dir_is_an_io_error(workspace: Workspace) {
    let missing = workspace.root.join("tool-9.9.9-linux");
    let err = create_archive(&missing, ArchiveFormat::TarGz).expect_err("must fail");
    assert!(matches!(err, ArchiveError::Io(_)));
}

#[test]
fn staging_path_without_name_is_rejected() {
    let err = create_archive(Utf8Path::new("/"), ArchiveFormat::Zip).expect_err("must fail");
    assert!(matches!(err, ArchiveError::InvalidStagingPath(_)));
}
