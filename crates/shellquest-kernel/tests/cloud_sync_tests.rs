//! Accounts and cloud sync across two simulated devices sharing one remote.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};

use shellquest_kernel::store::{FileStore, KeyValueStore, MemoryStore};
use shellquest_kernel::sync::StoreRemote;
use shellquest_kernel::{Collaborators, Kernel, KernelConfig};

fn at(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 10, minute, 0).single().unwrap()
}

fn device(remote: &Arc<StoreRemote>, created: DateTime<Utc>) -> Kernel {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    Kernel::new(
        KernelConfig::default(),
        Collaborators::with_remote(store, remote.clone()),
        created,
    )
    .unwrap()
}

#[tokio::test]
async fn test_local_account_without_remote() {
    let mut kernel = Kernel::in_memory();
    let turn = kernel.execute_at("signup Hero_One", at(1)).await;
    assert!(turn.result.ok(), "{:?}", turn.result);
    assert_eq!(
        kernel.execute_at("whoami", at(2)).await.result.lines,
        vec!["hero_one (local)"]
    );
    assert_eq!(
        kernel.execute_at("signup bad-name", at(3)).await.result.status,
        shellquest_kernel::Status::Error
    );
}

#[tokio::test(start_paused = true)]
async fn test_progress_follows_the_player_between_devices() {
    let dir = tempfile::tempdir().unwrap();
    let remote = Arc::new(StoreRemote::new(Arc::new(FileStore::new(dir.path()))));

    let mut laptop = device(&remote, at(0));
    let signup = laptop.execute_at("signup hero", at(1)).await;
    assert_eq!(
        signup.result.lines,
        vec!["Cloud profile created for hero.", "Progress synced."]
    );
    laptop.execute_at("pwd", at(3)).await;
    laptop.shutdown().await;

    // the phone's guest save predates the laptop's last push
    let mut phone = device(&remote, at(0));
    let login = phone.execute_at("login hero", at(10)).await;
    assert_eq!(login.result.lines[1], "Loaded newer progress from the cloud.");
    assert!(phone.progression().is_complete("plains-pwd"));
    assert_eq!(
        phone.execute_at("whoami", at(11)).await.result.lines,
        vec!["hero (cloud)"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_failed_autosave_is_retried_on_reconnect() {
    let remote = Arc::new(StoreRemote::new(Arc::new(MemoryStore::new())));
    let mut kernel = device(&remote, at(0));
    kernel.execute_at("signup hero", at(1)).await;
    // the turn queues an autosave; let it land
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert!(!kernel.pending_sync());

    remote.set_online(false);
    kernel.execute_at("ls", at(2)).await;
    assert!(kernel.pending_sync());
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert!(kernel.pending_sync());

    let sync = kernel.execute_at("sync", at(3)).await;
    assert!(sync.result.lines[0].starts_with("Cloud sync pending"));

    remote.set_online(true);
    assert!(kernel.retry_pending_sync().await.unwrap());
    assert!(!kernel.pending_sync());
    assert!(!kernel.retry_pending_sync().await.unwrap());
}

#[tokio::test]
async fn test_duplicate_cloud_username_is_rejected() {
    let remote = Arc::new(StoreRemote::new(Arc::new(MemoryStore::new())));
    let mut first = device(&remote, at(0));
    let mut second = device(&remote, at(0));

    assert!(first.execute_at("signup hero", at(1)).await.result.ok());
    let dup = second.execute_at("signup hero", at(2)).await;
    assert_eq!(dup.result.lines, vec!["Username hero is taken"]);
}
