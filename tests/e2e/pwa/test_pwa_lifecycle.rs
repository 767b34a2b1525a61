//! E2E Test: Worker Lifecycle
//!
//! Deploying, upgrading and failing installs:
//! 1. First deploy precaches the manifest and claims open windows
//! 2. Re-running install leaves the same entries
//! 3. Upgrading leaves exactly one cache generation
//! 4. A failed install keeps the previous worker serving

#[cfg(test)]
mod tests {
    use pearl_e2e_tests::{run, PearlFixtures, TestHost};
    use pearl_sw::{CacheStorage, DeployOutcome, NetworkError, WorkerError, WorkerState};

    #[test]
    fn test_first_deploy_precaches_and_claims() {
        let mut host = TestHost::new();
        let window = host.clients.add_window(&PearlFixtures::url("/"));
        host.install(PearlFixtures::config());

        assert_eq!(
            run(host.caches.entries("pearl-verse-v1")).unwrap(),
            vec![
                "http://localhost:5000/",
                "http://localhost:5000/static/css/style.css",
                "http://localhost:5000/static/images/avatar-placeholder.png",
                "http://localhost:5000/static/js/script.js",
            ]
        );
        assert_eq!(
            host.clients.get(window).unwrap().controller.as_deref(),
            Some("pearl-verse-v1")
        );
        assert_eq!(
            host.registration.active_state(),
            Some(WorkerState::Active)
        );
    }

    #[test]
    fn test_install_is_idempotent() {
        let mut host = TestHost::new();
        host.install(PearlFixtures::config());
        let worker = host.registration.active().unwrap();
        let before = run(host.caches.entries("pearl-verse-v1")).unwrap();

        for _ in 0..3 {
            run(worker.handle_install()).unwrap();
        }

        assert_eq!(run(host.caches.entries("pearl-verse-v1")).unwrap(), before);
        assert_eq!(host.caches.cache_names(), vec!["pearl-verse-v1"]);
    }

    #[test]
    fn test_upgrade_leaves_single_generation() {
        let mut host = TestHost::new();
        host.install(PearlFixtures::config());
        run(host.caches.open("scratch")).unwrap();

        host.install(PearlFixtures::config_version(2));

        assert_eq!(host.caches.cache_names(), vec!["pearl-verse-v2"]);
        assert_eq!(host.registration.retired().len(), 1);
    }

    #[test]
    fn test_same_script_is_not_reinstalled() {
        let mut host = TestHost::new();
        let config = PearlFixtures::config();
        let script = PearlFixtures::script_for(&config);
        host.install(config.clone());
        host.network.clear_log();

        let outcome = run(host.registration.deploy(&script, config)).unwrap();
        assert_eq!(outcome, DeployOutcome::Unchanged);
        assert_eq!(host.network.request_count(), 0);
    }

    #[test]
    fn test_failed_install_keeps_previous_worker() {
        let mut host = TestHost::new();
        host.install(PearlFixtures::config());
        let previous = host.registration.active().unwrap().id();

        host.network.set_online(false);
        let config = PearlFixtures::config_version(2);
        let script = PearlFixtures::script_for(&config);
        let outcome = run(host.registration.deploy(&script, config)).unwrap();

        assert_eq!(
            outcome,
            DeployOutcome::Rejected(WorkerError::Network(NetworkError::Offline))
        );
        assert_eq!(host.registration.active().unwrap().id(), previous);
        assert!(run(host.caches.has("pearl-verse-v1")).unwrap());
    }

    #[test]
    fn test_missing_asset_fails_install() {
        let mut host = TestHost::new();
        let config = PearlFixtures::config().with_manifest(["/", "/static/js/missing.js"]);
        let script = PearlFixtures::script_for(&config);

        let outcome = run(host.registration.deploy(&script, config)).unwrap();
        match outcome {
            DeployOutcome::Rejected(WorkerError::BadStatus { url, status }) => {
                assert_eq!(url, "http://localhost:5000/static/js/missing.js");
                assert_eq!(status, 404);
            }
            other => panic!("expected rejection, got {:?}", other),
        }
        assert!(host.registration.active().is_none());
    }

    #[test]
    fn test_waiting_worker_activates_on_request() {
        let mut host = TestHost::new();
        host.install(PearlFixtures::config());

        let config = PearlFixtures::config_version(2).with_skip_waiting(false);
        let script = PearlFixtures::script_for(&config);
        let outcome = run(host.registration.deploy(&script, config)).unwrap();
        assert!(matches!(outcome, DeployOutcome::Waiting(_)));

        // Old generation keeps serving until activation
        assert_eq!(
            host.registration.active().unwrap().cache_name(),
            "pearl-verse-v1"
        );
        let mut names = host.caches.cache_names();
        names.sort();
        assert_eq!(names, vec!["pearl-verse-v1", "pearl-verse-v2"]);

        let report = run(host.registration.activate_waiting()).unwrap();
        assert_eq!(report.deleted, vec!["pearl-verse-v1"]);
        assert_eq!(host.caches.cache_names(), vec!["pearl-verse-v2"]);
    }
}
