use assert_cmd::Command;
use chatshelf::config::SessionConfig;
use chatshelf::session::{Message, SessionStore, Thread};
use chatshelf::storage::{StateBackend, ThreadCodec};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const KEY: &str = "ai-tutor-chats";

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

#[allow(dead_code)]
pub fn store_over(backend: Box<dyn StateBackend>) -> SessionStore {
    let mut store = SessionStore::new(ThreadCodec::new(backend, KEY), SessionConfig::default());
    store.init();
    store
}

/// A thread whose messages alternate user/assistant, starting with user
#[allow(dead_code)]
pub fn thread_with(title: &str, messages: &[&str]) -> Thread {
    let mut thread = Thread::new(title);
    for (i, text) in messages.iter().enumerate() {
        if i % 2 == 0 {
            thread.messages.push(Message::user(*text));
        } else {
            thread.messages.push(Message::assistant(*text));
        }
    }
    thread
}

/// The binary, isolated from the caller's environment and config file
#[allow(dead_code)]
pub fn chatshelf(storage_dir: &Path) -> Command {
    chatshelf_with_config(storage_dir, &storage_dir.join("missing-config.yaml"))
}

#[allow(dead_code)]
pub fn chatshelf_with_config(storage_dir: &Path, config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("chatshelf").expect("binary should build");
    for var in [
        "CHATSHELF_STORAGE_BACKEND",
        "CHATSHELF_STORAGE_PATH",
        "CHATSHELF_RECORD_KEY",
        "CHATSHELF_DEFAULT_TITLE",
        "CHATSHELF_TITLE_MAX_CHARS",
        "CHATSHELF_DATE_FORMAT",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd.arg("--config")
        .arg(config)
        .arg("--storage-path")
        .arg(storage_dir);
    cmd
}
