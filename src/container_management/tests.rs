#[cfg(test)]
mod tests {
    use crate::configuration::types::OsFamily;
    use crate::container_management::fake::{FakeApi, FAKE_ADDRESS};
    use crate::container_management::{ContainerHandle, ContainerManager, ContainerStatus};
    use crate::error_handling::types::ContainerError;
    use crate::prompt::scripted::{Answer, ScriptedPrompter};
    use std::net::Ipv4Addr;
    use std::time::Duration;
    use tokio_test::{assert_err, assert_ok};

    const SERVER: &str = "https://images.example.org";

    fn manager(api: FakeApi) -> ContainerManager<FakeApi> {
        ContainerManager::new(api, SERVER)
    }

    fn handle(name: &str) -> ContainerHandle {
        ContainerHandle::new(name, "fp-bionic")
    }

    fn fake_address() -> Ipv4Addr {
        FAKE_ADDRESS.parse().unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_address_on_last_allowed_poll_succeeds() {
        let manager = manager(FakeApi::new().address_after(29));
        let mut handle = handle("late-net");

        let address = assert_ok!(manager.start_container(&mut handle).await);

        assert_eq!(address, fake_address());
        assert_eq!(manager.api().state_polls(), 30);
        assert_eq!(handle.status, ContainerStatus::Running);
        assert_eq!(handle.address, Some(fake_address()));
        assert_eq!(manager.api().count("delete"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_address_times_out_and_deletes_once() {
        let manager = manager(FakeApi::new().never_address());
        let mut handle = handle("no-net");
        let started = tokio::time::Instant::now();

        let err = assert_err!(manager.start_container(&mut handle).await);

        assert!(matches!(err, ContainerError::NetworkTimeout(_)));
        assert_eq!(manager.api().state_polls(), 30);
        assert_eq!(manager.api().count("delete no-net"), 1);
        assert_eq!(handle.status, ContainerStatus::Deleted);
        assert!(started.elapsed() <= Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_error_triggers_single_restart() {
        let manager = manager(FakeApi::new().failing_starts(1).address_after(2));
        let mut handle = handle("flaky");

        let address = assert_ok!(manager.start_container(&mut handle).await);

        assert_eq!(address, fake_address());
        assert_eq!(manager.api().count("start flaky"), 2);
        assert_eq!(manager.api().count("stop flaky"), 1);
        assert_eq!(manager.api().count("delete"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_restart_deletes_container() {
        let manager = manager(FakeApi::new().failing_starts(2));
        let mut handle = handle("broken");

        let err = assert_err!(manager.start_container(&mut handle).await);

        assert!(matches!(err, ContainerError::Api(_)));
        assert_eq!(manager.api().count("start broken"), 2);
        assert_eq!(manager.api().count("delete broken"), 1);
        assert_eq!(manager.api().state_polls(), 0);
    }

    #[tokio::test]
    async fn test_image_lookup_is_case_insensitive() {
        let manager = manager(FakeApi::new().with_image("Ubuntu", "Bionic", "fp-1"));
        let prompter = ScriptedPrompter::new(vec![]);

        assert!(manager.image_exists(OsFamily::Ubuntu, "bionic").await.unwrap());
        assert!(!manager.image_exists(OsFamily::Centos, "8").await.unwrap());
        assert_eq!(
            manager
                .resolve_fingerprint(&prompter, OsFamily::Ubuntu, "bionic")
                .await
                .unwrap(),
            "fp-1"
        );
        assert!(prompter.asked().is_empty());
    }

    #[tokio::test]
    async fn test_several_images_ask_the_user() {
        let manager = manager(
            FakeApi::new()
                .with_image("ubuntu", "focal", "fp-old")
                .with_image("ubuntu", "focal", "fp-new"),
        );
        let prompter = ScriptedPrompter::new(vec![Answer::Pick(1)]);

        let fingerprint = manager
            .resolve_fingerprint(&prompter, OsFamily::Ubuntu, "focal")
            .await
            .unwrap();

        assert_eq!(fingerprint, "fp-new");
        assert_eq!(prompter.asked(), vec!["Choose image".to_string()]);
    }

    #[tokio::test]
    async fn test_unknown_image_is_not_found() {
        let manager = manager(FakeApi::new());
        let prompter = ScriptedPrompter::new(vec![]);

        let err = manager
            .resolve_fingerprint(&prompter, OsFamily::Centos, "8")
            .await
            .unwrap_err();
        assert!(matches!(err, ContainerError::ImageNotFound(ref alias) if alias == "centos/8"));
    }

    #[tokio::test]
    async fn test_download_uses_alias_and_server() {
        let manager = manager(FakeApi::new());

        manager.download_image(OsFamily::Ubuntu, "xenial").await.unwrap();

        assert_eq!(
            manager.api().calls(),
            vec![format!("download {} ubuntu/xenial", SERVER)]
        );
        assert!(manager.image_exists(OsFamily::Ubuntu, "xenial").await.unwrap());
    }

    #[tokio::test]
    async fn test_create_with_unknown_fingerprint_fails() {
        let manager = manager(FakeApi::new().with_image("ubuntu", "bionic", "fp-1"));

        assert_ok!(manager.create_container("box", "fp-1").await);
        assert!(manager.container_exists("box").await.unwrap());
        assert_err!(manager.create_container("other", "missing").await);
    }

    #[tokio::test]
    async fn test_command_failure_carries_exit_code() {
        let manager = manager(FakeApi::new().failing_command("false", 7));
        let handle = handle("box");

        let err = manager.run_command(&handle, "false").await.unwrap_err();
        match err {
            ContainerError::CommandFailed {
                command, exit_code, ..
            } => {
                assert_eq!(command, "false");
                assert_eq!(exit_code, 7);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_install_ssh_server_per_family() {
        let ubuntu = manager(FakeApi::new());
        ubuntu
            .install_ssh_server(&handle("u"), OsFamily::Ubuntu)
            .await
            .unwrap();
        assert_eq!(
            ubuntu.api().calls(),
            vec![
                "exec u apt-get update".to_string(),
                "exec u apt-get -y install openssh-server".to_string(),
            ]
        );

        let centos = manager(FakeApi::new());
        centos
            .install_ssh_server(&handle("c"), OsFamily::Centos)
            .await
            .unwrap();
        let calls = centos.api().calls();
        assert!(calls[0].contains("yum -y install openssh-server"));
        assert!(calls.iter().any(|c| c.contains("systemctl start sshd")));
    }

    #[tokio::test]
    async fn test_install_failure_stops_sequence() {
        let manager = manager(FakeApi::new().failing_command("apt-get update", 100));

        let err = manager
            .install_ssh_server(&handle("u"), OsFamily::Ubuntu)
            .await
            .unwrap_err();

        assert!(matches!(err, ContainerError::CommandFailed { exit_code: 100, .. }));
        assert_eq!(manager.api().count("exec"), 1);
    }

    #[tokio::test]
    async fn test_push_key_tolerates_existing_ssh_dir() {
        let manager = manager(FakeApi::new().failing_command("mkdir /root/.ssh", 1));
        let handle = handle("box");

        manager
            .push_public_key(&handle, b"ssh-rsa AAAA test\n")
            .await
            .unwrap();

        assert_eq!(
            manager.api().pushed("/root/.ssh/authorized_keys"),
            Some(b"ssh-rsa AAAA test\n".to_vec())
        );
        let calls = manager.api().calls();
        assert!(calls.contains(&"exec box chmod 700 /root/.ssh".to_string()));
        assert!(calls.contains(&"push box /root/.ssh/authorized_keys 600".to_string()));
        assert_eq!(
            calls.last().map(String::as_str),
            Some("exec box chmod 600 /root/.ssh/authorized_keys")
        );
    }

    #[tokio::test]
    async fn test_push_key_fails_on_chmod_error() {
        let manager = manager(FakeApi::new().failing_command("chmod 700", 1));

        let err = manager
            .push_public_key(&handle("box"), b"key")
            .await
            .unwrap_err();
        assert!(matches!(err, ContainerError::CommandFailed { .. }));
        assert!(manager.api().pushed("/root/.ssh/authorized_keys").is_none());
    }

    #[tokio::test]
    async fn test_delete_stops_first() {
        let manager = manager(FakeApi::new().with_container("box"));
        let mut handle = handle("box");

        manager.delete_container(&mut handle).await.unwrap();

        assert_eq!(
            manager.api().calls(),
            vec!["stop box".to_string(), "delete box".to_string()]
        );
        assert_eq!(handle.status, ContainerStatus::Deleted);
        assert!(!manager.container_exists("box").await.unwrap());
    }
}
