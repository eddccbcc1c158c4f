//! Integration tests for checkout, checkin, acquire and pull.
//!
//! Every test builds a throwaway library plus real upstream and project
//! repositories, then drives the engine directly.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

use librarian::core::config::{LibraryConfig, Registration};
use librarian::core::paths::LibraryPaths;
use librarian::core::types::{ModuleName, ProjectName};
use librarian::engine::{
    self, AcquireReport, BranchUpdate, KindUpdate, SyncError, SyncOutcome, SyncSession,
};
use librarian::git::Git;

// =============================================================================
// Test Fixtures
// =============================================================================

/// A real git repository with an identity configured.
struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    /// Create a repository on `master` with the given files committed.
    fn with_files(files: &[(&str, &str)]) -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");

        run_git(dir.path(), &["init", "-b", "master"]);
        run_git(dir.path(), &["config", "user.email", "test@example.com"]);
        run_git(dir.path(), &["config", "user.name", "Test User"]);
        run_git(dir.path(), &["config", "core.editor", "true"]);

        let repo = Self { dir };
        for (path, content) in files {
            repo.write(path, content);
        }
        run_git(repo.path(), &["add", "-A"]);
        run_git(repo.path(), &["commit", "-m", "Initial commit"]);
        repo
    }

    /// A project with nothing but a README.
    fn project() -> Self {
        Self::with_files(&[("README.md", "# Puppy Park\n")])
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn write(&self, path: &str, content: &str) {
        let full = self.path().join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }

    /// Write a file and commit it.
    fn commit_file(&self, path: &str, content: &str, message: &str) {
        self.write(path, content);
        run_git(self.path(), &["add", "-A"]);
        run_git(self.path(), &["commit", "-m", message]);
    }

    /// Commit whatever is in the working tree.
    fn commit_all(&self, message: &str) {
        run_git(self.path(), &["add", "-A"]);
        run_git(self.path(), &["commit", "-m", message]);
    }

    fn commit_count(&self) -> usize {
        git_output(self.path(), &["rev-list", "--count", "HEAD"])
            .parse()
            .unwrap()
    }

    fn head_message(&self) -> String {
        git_output(self.path(), &["log", "-1", "--format=%B"])
    }
}

/// A library rooted in a temporary directory.
struct TestLibrary {
    _dir: TempDir,
    paths: LibraryPaths,
    config: LibraryConfig,
}

impl TestLibrary {
    fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let paths = LibraryPaths::new(dir.path().to_path_buf());
        Self {
            _dir: dir,
            paths,
            config: LibraryConfig::default(),
        }
    }

    /// Configure the `love` kind used throughout these tests.
    fn with_love_kind() -> Self {
        let mut library = Self::new();
        engine::configure_kind(
            &mut library.config,
            "love",
            KindUpdate {
                lib_path: Some("src/lib/".into()),
                include_pattern: Some(r".*\.lua|LICENSE.*".into()),
                exclude_pattern: Some("tests?|demos?".into()),
                root_marker: Some("init.lua".into()),
                rename_pattern: Some(r".*\.lua".into()),
            },
        )
        .unwrap();
        library
    }

    fn acquire(&mut self, module: &str, upstream: &TestRepo) -> AcquireReport {
        engine::acquire(
            &self.paths,
            &mut self.config,
            "love",
            &ModuleName::new(module).unwrap(),
            &upstream.path().display().to_string(),
        )
        .expect("acquire failed")
    }

    fn clone_path(&self, module: &str) -> PathBuf {
        self.paths.clone_path(&ModuleName::new(module).unwrap())
    }
}

fn session(project: &TestRepo, module: &str) -> SyncSession {
    SyncSession {
        project: ProjectName::new("puppypark").unwrap(),
        module: ModuleName::new(module).unwrap(),
        project_root: project.path().to_path_buf(),
    }
}

/// A module with a root marker, tests, and files the kind never copies.
fn windfield_upstream() -> TestRepo {
    TestRepo::with_files(&[
        ("init.lua", "return require('windfield.world')\n"),
        ("world.lua", "local World = {}\nreturn World\n"),
        ("LICENSE", "MIT\n"),
        ("README.md", "# windfield\n"),
        ("tests/world_test.lua", "assert(true)\n"),
    ])
}

/// A module that is a single Lua file.
fn classic_upstream() -> TestRepo {
    TestRepo::with_files(&[
        ("classic.lua", "local Object = {}\nreturn Object\n"),
        ("README.md", "# classic\n"),
    ])
}

/// A module whose root marker sits below the top of its repository.
fn nested_upstream() -> TestRepo {
    TestRepo::with_files(&[
        ("lua/nested/init.lua", "return require('nested.world')\n"),
        ("lua/nested/world.lua", "local World = {}\nreturn World\n"),
        ("lua/nested/tests/t.lua", "assert(true)\n"),
        ("docs/guide.md", "# Guide\n"),
        ("README.md", "# nested\n"),
    ])
}

fn run_git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git command failed");

    if !output.status.success() {
        panic!(
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

fn git_output(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git command failed");
    String::from_utf8(output.stdout).unwrap().trim().to_string()
}

// =============================================================================
// Acquire
// =============================================================================

mod acquire {
    use super::*;

    #[test]
    fn clones_upstream_master() {
        let upstream = windfield_upstream();
        let mut library = TestLibrary::with_love_kind();

        let report = library.acquire("windfield", &upstream);

        match report {
            AcquireReport::Cloned {
                registration,
                upstream: tracking,
                head,
            } => {
                assert!(registration.is_created());
                assert_eq!(tracking, "origin/master");
                assert_eq!(head.summary, "Initial commit");
            }
            other => panic!("expected a fresh clone, got {:?}", other),
        }

        let clone = library.clone_path("windfield");
        assert!(clone.join("init.lua").is_file());
        assert!(clone.join("tests/world_test.lua").is_file());
        let record = library
            .config
            .module(&ModuleName::new("windfield").unwrap())
            .unwrap();
        assert_eq!(record.kind, "love");
        assert_eq!(record.clone, clone);
    }

    #[test]
    fn second_acquire_keeps_existing_clone() {
        let upstream = windfield_upstream();
        let mut library = TestLibrary::with_love_kind();
        library.acquire("windfield", &upstream);

        let report = library.acquire("windfield", &upstream);

        match report {
            AcquireReport::AlreadyCloned {
                registration: Registration::Existing(record),
            } => assert_eq!(record.kind, "love"),
            other => panic!("expected an existing clone, got {:?}", other),
        }
    }

    #[test]
    fn unknown_kind_is_refused() {
        let upstream = windfield_upstream();
        let mut library = TestLibrary::new();

        let result = engine::acquire(
            &library.paths,
            &mut library.config,
            "love",
            &ModuleName::new("windfield").unwrap(),
            &upstream.path().display().to_string(),
        );

        assert!(matches!(result, Err(SyncError::UnknownKind { .. })));
        assert!(library.config.modules.is_empty());
    }

    #[test]
    fn failed_fetch_leaves_no_remote() {
        let missing = TempDir::new().unwrap();
        let mut library = TestLibrary::with_love_kind();
        let module = ModuleName::new("ghost").unwrap();

        let result = engine::acquire(
            &library.paths,
            &mut library.config,
            "love",
            &module,
            &missing.path().join("nope").display().to_string(),
        );

        assert!(result.is_err());
        let clone = Git::open_exact(&library.paths.clone_path(&module)).unwrap();
        assert!(clone.remote_names().unwrap().is_empty());
    }
}

// =============================================================================
// Checkout
// =============================================================================

mod checkout {
    use super::*;

    #[test]
    fn copies_filtered_module_and_commits() {
        let upstream = windfield_upstream();
        let project = TestRepo::project();
        let mut library = TestLibrary::with_love_kind();
        library.acquire("windfield", &upstream);

        let report = engine::checkout(
            &library.paths,
            &mut library.config,
            &session(&project, "windfield"),
        )
        .unwrap();

        let dest = project.path().join("src/lib/windfield");
        assert_eq!(report.destination, dest);
        assert!(dest.join("init.lua").is_file());
        assert!(dest.join("world.lua").is_file());
        assert!(dest.join("LICENSE").is_file());
        assert!(!dest.join("README.md").exists());
        assert!(!dest.join("tests").exists());
        assert!(!dest.join(".git").exists());

        assert_eq!(report.branch, BranchUpdate::Created);
        assert!(report.outcome.is_committed());
        assert_eq!(project.commit_count(), 2);

        let message = project.head_message();
        assert!(message.starts_with("Librarian: Added module windfield"));
        assert!(message.contains(&format!("windfield@{}", report.upstream.oid)));

        let clone = Git::open_exact(&library.clone_path("windfield")).unwrap();
        assert!(clone.branch_oid("puppypark").unwrap().is_some());
        assert!(Git::open(project.path()).unwrap().worktree_status().unwrap().is_clean());
    }

    #[test]
    fn repeated_checkout_is_a_no_op() {
        let upstream = windfield_upstream();
        let project = TestRepo::project();
        let mut library = TestLibrary::with_love_kind();
        library.acquire("windfield", &upstream);
        let session = session(&project, "windfield");

        engine::checkout(&library.paths, &mut library.config, &session).unwrap();
        let again = engine::checkout(&library.paths, &mut library.config, &session).unwrap();

        assert_eq!(again.outcome, SyncOutcome::NoChanges);
        assert_eq!(again.branch, BranchUpdate::UpToDate);
        assert!(again.updated_existing);
        assert_eq!(project.commit_count(), 2);
    }

    #[test]
    fn single_file_module_is_renamed_to_marker() {
        let upstream = classic_upstream();
        let project = TestRepo::project();
        let mut library = TestLibrary::with_love_kind();
        library.acquire("classic", &upstream);

        let report = engine::checkout(
            &library.paths,
            &mut library.config,
            &session(&project, "classic"),
        )
        .unwrap();

        let dest = project.path().join("src/lib/classic");
        assert!(dest.join("init.lua").is_file());
        assert!(!dest.join("classic.lua").exists());
        assert_eq!(report.renamed_from.as_deref(), Some("classic.lua"));

        let record = library
            .config
            .module(&ModuleName::new("classic").unwrap())
            .unwrap();
        assert_eq!(record.renamed_root_marker.as_deref(), Some("classic.lua"));
    }

    #[test]
    fn dirty_project_is_refused() {
        let upstream = windfield_upstream();
        let project = TestRepo::project();
        let mut library = TestLibrary::with_love_kind();
        library.acquire("windfield", &upstream);
        project.write("scratch.txt", "wip\n");

        let err = engine::checkout(
            &library.paths,
            &mut library.config,
            &session(&project, "windfield"),
        )
        .unwrap_err();

        assert!(matches!(err, SyncError::DirtyRepository { .. }));
        assert_eq!(err.exit_code(), 3);
        assert!(!project.path().join("src/lib/windfield").exists());
        assert_eq!(project.commit_count(), 1);
    }

    #[test]
    fn unknown_module_is_refused() {
        let project = TestRepo::project();
        let mut library = TestLibrary::with_love_kind();

        let err = engine::checkout(
            &library.paths,
            &mut library.config,
            &session(&project, "windfield"),
        )
        .unwrap_err();

        assert!(matches!(err, SyncError::UnknownModule { .. }));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn project_branch_follows_pulled_master() {
        let upstream = windfield_upstream();
        let project = TestRepo::project();
        let mut library = TestLibrary::with_love_kind();
        library.acquire("windfield", &upstream);
        let session = session(&project, "windfield");
        engine::checkout(&library.paths, &mut library.config, &session).unwrap();

        upstream.commit_file("world.lua", "local World = {gravity = 9}\nreturn World\n", "Add gravity");
        engine::pull(
            &library.paths,
            &library.config,
            &ModuleName::new("windfield").unwrap(),
            None,
        )
        .unwrap();

        let report = engine::checkout(&library.paths, &mut library.config, &session).unwrap();

        assert_eq!(report.branch, BranchUpdate::FastForwarded);
        assert!(report.outcome.is_committed());
        assert!(project.head_message().starts_with("Librarian: Updated module windfield"));
        let world = fs::read_to_string(project.path().join("src/lib/windfield/world.lua")).unwrap();
        assert!(world.contains("gravity"));
    }
}

// =============================================================================
// Checkin
// =============================================================================

mod checkin {
    use super::*;

    #[test]
    fn checkin_right_after_checkout_changes_nothing() {
        let upstream = windfield_upstream();
        let project = TestRepo::project();
        let mut library = TestLibrary::with_love_kind();
        library.acquire("windfield", &upstream);
        let session = session(&project, "windfield");
        engine::checkout(&library.paths, &mut library.config, &session).unwrap();

        let report = engine::checkin(&library.paths, &library.config, &session).unwrap();

        assert_eq!(report.outcome, SyncOutcome::NoChanges);
        assert!(report.relocated_git_dir);
        let clone = library.clone_path("windfield");
        assert!(clone.join(".git").is_dir());
        assert!(clone.join("README.md").is_file());
        assert!(clone.join("tests/world_test.lua").is_file());
    }

    #[test]
    fn project_edits_land_on_project_branch() {
        let upstream = windfield_upstream();
        let project = TestRepo::project();
        let mut library = TestLibrary::with_love_kind();
        library.acquire("windfield", &upstream);
        let session = session(&project, "windfield");
        engine::checkout(&library.paths, &mut library.config, &session).unwrap();

        project.commit_file(
            "src/lib/windfield/world.lua",
            "local World = {fixed = true}\nreturn World\n",
            "Fix windfield world",
        );
        let report = engine::checkin(&library.paths, &library.config, &session).unwrap();

        assert!(report.outcome.is_committed());
        let clone_path = library.clone_path("windfield");
        let clone = Git::open_exact(&clone_path).unwrap();
        let branch = clone.branch_commit("puppypark").unwrap();
        assert!(branch
            .message
            .starts_with("Librarian: Update with puppypark's latest"));
        assert!(branch.message.contains("Fix windfield world"));
        assert_ne!(
            clone.branch_oid("puppypark").unwrap(),
            clone.branch_oid("master").unwrap()
        );

        let world = fs::read_to_string(clone_path.join("world.lua")).unwrap();
        assert!(world.contains("fixed"));
        // Files the project never had are still tracked.
        assert!(clone_path.join("README.md").is_file());
        assert!(clone_path.join("tests/world_test.lua").is_file());
        assert!(clone.worktree_status().unwrap().is_clean());

        // The branch now carries project work, so checkout leaves it be.
        let again = engine::checkout(&library.paths, &mut library.config, &session).unwrap();
        assert_eq!(again.branch, BranchUpdate::Ahead);
        assert_eq!(again.outcome, SyncOutcome::NoChanges);
    }

    #[test]
    fn project_deletions_of_copied_files_are_kept() {
        let upstream = windfield_upstream();
        let project = TestRepo::project();
        let mut library = TestLibrary::with_love_kind();
        library.acquire("windfield", &upstream);
        let session = session(&project, "windfield");
        engine::checkout(&library.paths, &mut library.config, &session).unwrap();

        fs::remove_file(project.path().join("src/lib/windfield/LICENSE")).unwrap();
        project.commit_all("Drop license copy");
        let report = engine::checkin(&library.paths, &library.config, &session).unwrap();

        assert!(report.outcome.is_committed());
        let clone_path = library.clone_path("windfield");
        assert!(!clone_path.join("LICENSE").exists());
        assert!(clone_path.join("README.md").is_file());
        let mut restored = report.restored_paths.clone();
        restored.sort();
        assert_eq!(
            restored,
            vec![
                PathBuf::from("README.md"),
                PathBuf::from("tests/world_test.lua")
            ]
        );
    }

    #[test]
    fn renamed_single_file_round_trips() {
        let upstream = classic_upstream();
        let project = TestRepo::project();
        let mut library = TestLibrary::with_love_kind();
        library.acquire("classic", &upstream);
        let session = session(&project, "classic");
        engine::checkout(&library.paths, &mut library.config, &session).unwrap();

        let report = engine::checkin(&library.paths, &library.config, &session).unwrap();

        assert!(report.restored_name);
        assert_eq!(report.outcome, SyncOutcome::NoChanges);
        let clone = library.clone_path("classic");
        assert!(clone.join("classic.lua").is_file());
        assert!(!clone.join("init.lua").exists());
        assert!(clone.join("README.md").is_file());
    }

    #[test]
    fn nested_root_round_trips_without_relocation() {
        let upstream = nested_upstream();
        let project = TestRepo::project();
        let mut library = TestLibrary::with_love_kind();
        library.acquire("nested", &upstream);
        let session = session(&project, "nested");
        engine::checkout(&library.paths, &mut library.config, &session).unwrap();

        let dest = project.path().join("src/lib/nested");
        assert!(dest.join("init.lua").is_file());
        assert!(!dest.join("tests").exists());

        let report = engine::checkin(&library.paths, &library.config, &session).unwrap();

        let clone_path = library.clone_path("nested");
        assert_eq!(report.outcome, SyncOutcome::NoChanges);
        assert!(!report.relocated_git_dir);
        assert_eq!(report.library_root, clone_path.join("lua/nested"));
        assert_eq!(
            report.restored_paths,
            vec![PathBuf::from("lua/nested/tests/t.lua")]
        );

        project.commit_file(
            "src/lib/nested/world.lua",
            "local World = {nested = true}\nreturn World\n",
            "Tune nested world",
        );
        let report = engine::checkin(&library.paths, &library.config, &session).unwrap();

        assert!(report.outcome.is_committed());
        let world = fs::read_to_string(clone_path.join("lua/nested/world.lua")).unwrap();
        assert!(world.contains("nested = true"));
        assert!(clone_path.join("lua/nested/tests/t.lua").is_file());
        assert!(clone_path.join("docs/guide.md").is_file());
        assert!(clone_path.join("README.md").is_file());
        let clone = Git::open_exact(&clone_path).unwrap();
        assert!(clone.worktree_status().unwrap().is_clean());

        // Staging directories live next to the root and must not linger.
        let leftovers: Vec<_> = fs::read_dir(clone_path.join("lua"))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("nested")]);
    }

    #[cfg(unix)]
    #[test]
    fn tracked_symlink_survives_round_trip() {
        let upstream = TestRepo::with_files(&[("world.lua", "return {}\n")]);
        std::os::unix::fs::symlink("world.lua", upstream.path().join("init.lua")).unwrap();
        upstream.commit_all("Add entry alias");
        let project = TestRepo::project();
        let mut library = TestLibrary::with_love_kind();
        library.acquire("aliased", &upstream);
        let session = session(&project, "aliased");
        engine::checkout(&library.paths, &mut library.config, &session).unwrap();

        let link = project.path().join("src/lib/aliased/init.lua");
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());

        let report = engine::checkin(&library.paths, &library.config, &session).unwrap();

        assert_eq!(report.outcome, SyncOutcome::NoChanges);
        let clone_link = library.clone_path("aliased").join("init.lua");
        assert_eq!(fs::read_link(clone_link).unwrap(), PathBuf::from("world.lua"));
    }

    #[test]
    fn missing_project_branch_is_refused() {
        let upstream = windfield_upstream();
        let project = TestRepo::project();
        let mut library = TestLibrary::with_love_kind();
        library.acquire("windfield", &upstream);

        let err = engine::checkin(&library.paths, &library.config, &session(&project, "windfield"))
            .unwrap_err();

        assert!(matches!(err, SyncError::MissingProjectBranch { .. }));
        assert_eq!(err.exit_code(), 5);
    }

    #[test]
    fn module_missing_from_project_is_refused() {
        let upstream = windfield_upstream();
        let project = TestRepo::project();
        let mut library = TestLibrary::with_love_kind();
        library.acquire("windfield", &upstream);
        let session = session(&project, "windfield");
        engine::checkout(&library.paths, &mut library.config, &session).unwrap();

        fs::remove_dir_all(project.path().join("src/lib/windfield")).unwrap();
        project.commit_all("Remove windfield");
        let err = engine::checkin(&library.paths, &library.config, &session).unwrap_err();

        assert!(matches!(err, SyncError::ModuleNotInProject { .. }));
        assert_eq!(err.exit_code(), 6);
    }

    #[test]
    fn dirty_clone_is_refused() {
        let upstream = windfield_upstream();
        let project = TestRepo::project();
        let mut library = TestLibrary::with_love_kind();
        library.acquire("windfield", &upstream);
        let session = session(&project, "windfield");
        engine::checkout(&library.paths, &mut library.config, &session).unwrap();

        fs::write(library.clone_path("windfield").join("notes.txt"), "todo\n").unwrap();
        let err = engine::checkin(&library.paths, &library.config, &session).unwrap_err();

        assert!(matches!(err, SyncError::DirtyRepository { .. }));
    }
}

// =============================================================================
// Pull
// =============================================================================

mod pull {
    use super::*;

    #[test]
    fn reports_new_commits_oldest_first() {
        let upstream = windfield_upstream();
        let mut library = TestLibrary::with_love_kind();
        library.acquire("windfield", &upstream);
        let module = ModuleName::new("windfield").unwrap();

        upstream.commit_file("body.lua", "return {}\n", "Add bodies");
        upstream.commit_file("joint.lua", "return {}\n", "Add joints");
        let report = engine::pull(&library.paths, &library.config, &module, None).unwrap();

        assert_eq!(report.remote, "origin");
        assert_eq!(report.upstream, "origin/master");
        assert!(!report.is_up_to_date());
        assert_eq!(report.changelog, vec!["Add bodies", "Add joints"]);
        assert_eq!(report.head.summary, "Add joints");
        assert!(library.clone_path("windfield").join("joint.lua").is_file());

        let again = engine::pull(&library.paths, &library.config, &module, None).unwrap();
        assert!(again.is_up_to_date());
        assert!(again.changelog.is_empty());
    }

    #[test]
    fn unknown_remote_is_refused() {
        let upstream = windfield_upstream();
        let mut library = TestLibrary::with_love_kind();
        library.acquire("windfield", &upstream);

        let result = engine::pull(
            &library.paths,
            &library.config,
            &ModuleName::new("windfield").unwrap(),
            Some("fork"),
        );

        assert!(result.is_err());
    }

    #[test]
    fn unknown_module_is_refused() {
        let library = TestLibrary::with_love_kind();
        let result = engine::pull(
            &library.paths,
            &library.config,
            &ModuleName::new("windfield").unwrap(),
            None,
        );
        assert!(matches!(result, Err(SyncError::UnknownModule { .. })));
    }
}
